//! Free-text AI verdict parsing
//!
//! Scans the response for the first `VERDICT:`, `CONFIDENCE:` and `ANALYSIS:`
//! markers (case-insensitive, markdown emphasis tolerated). The verdict token
//! is matched against a closed vocabulary, most specific token first.
//!
//! Fallback order:
//! 1. verdict marker with a vocabulary token → that label
//! 2. strong risk keywords anywhere → most severe label
//! 3. moderate risk keywords anywhere → middle label
//! 4. otherwise → `LEGITIMATE` / `AUTHENTIC`
//!
//! Missing or unparsable confidence defaults to 50%.

use crate::types::{ContentKind, ProviderKind, Verdict, VerdictLabel};
use once_cell::sync::Lazy;
use regex::Regex;

/// Confidence used when the marker is absent or unparsable
pub const DEFAULT_CONFIDENCE_PCT: u8 = 50;

/// Maximum evidence lines kept
pub const MAX_EVIDENCE: usize = 5;

/// Maximum rationale length (chars)
pub const MAX_RATIONALE_CHARS: usize = 2000;

static VERDICT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)verdict[*_ \t]*:(.*)").expect("valid regex"));
static CONFIDENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)confidence[*_ \t]*:(.*)").expect("valid regex"));
static ANALYSIS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)analysis[*_ \t]*:(.*)").expect("valid regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));
static BULLET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+\S").expect("valid regex"));

const TEXT_VOCABULARY: &[(&str, VerdictLabel)] = &[
    ("moderately fake", VerdictLabel::ModeratelyFake),
    ("moderately_fake", VerdictLabel::ModeratelyFake),
    ("fake news", VerdictLabel::FakeNews),
    ("fake_news", VerdictLabel::FakeNews),
    ("fake", VerdictLabel::FakeNews),
    ("legitimate", VerdictLabel::Legitimate),
];

const MEDIA_VOCABULARY: &[(&str, VerdictLabel)] = &[
    ("likely fake", VerdictLabel::LikelyFake),
    ("likely_fake", VerdictLabel::LikelyFake),
    ("manipulated", VerdictLabel::Manipulated),
    ("suspicious", VerdictLabel::Suspicious),
    ("authentic", VerdictLabel::Authentic),
];

const STRONG_INDICATORS: &[&str] = &[
    "high risk",
    "manipulated",
    "manipulation",
    "deepfake",
    "fabricated",
    "fake news",
];

const MODERATE_INDICATORS: &[&str] = &[
    "medium risk",
    "suspicious",
    "misleading",
    "questionable",
    "unverified",
];

/// Parse a free-text AI response into a verdict
pub fn parse(text: &str, kind: ContentKind) -> Verdict {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Verdict::unknown(ProviderKind::AiVerdict, "Empty AI response");
    }

    let label = VERDICT_MARKER
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .and_then(|m| match_vocabulary(m.as_str(), kind))
        .unwrap_or_else(|| keyword_fallback(trimmed, kind));

    let confidence_pct = CONFIDENCE_MARKER
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_confidence(m.as_str()))
        .unwrap_or(DEFAULT_CONFIDENCE_PCT);

    let rationale_source = ANALYSIS_MARKER
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed);
    let rationale: String = rationale_source.chars().take(MAX_RATIONALE_CHARS).collect();

    Verdict {
        provider: ProviderKind::AiVerdict,
        label,
        confidence_pct,
        evidence: extract_evidence(trimmed),
        rationale,
        coverage: None,
    }
}

fn vocabulary(kind: ContentKind) -> &'static [(&'static str, VerdictLabel)] {
    if kind.is_media() {
        MEDIA_VOCABULARY
    } else {
        TEXT_VOCABULARY
    }
}

fn match_vocabulary(token: &str, kind: ContentKind) -> Option<VerdictLabel> {
    let lower = token.to_lowercase();
    vocabulary(kind)
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| *label)
}

fn keyword_fallback(text: &str, kind: ContentKind) -> VerdictLabel {
    let lower = text.to_lowercase();
    let (severe, middle, benign) = if kind.is_media() {
        (
            VerdictLabel::Manipulated,
            VerdictLabel::Suspicious,
            VerdictLabel::Authentic,
        )
    } else {
        (
            VerdictLabel::FakeNews,
            VerdictLabel::ModeratelyFake,
            VerdictLabel::Legitimate,
        )
    };

    if STRONG_INDICATORS.iter().any(|k| lower.contains(k)) {
        severe
    } else if MODERATE_INDICATORS.iter().any(|k| lower.contains(k)) {
        middle
    } else {
        benign
    }
}

/// First number after the marker, clamped to 0..=100
fn parse_confidence(rest: &str) -> Option<u8> {
    let value: f64 = NUMBER.find(rest)?.as_str().parse().ok()?;
    Some(value.clamp(0.0, 100.0).round() as u8)
}

/// Bullet lines, verbatim (trimmed), at most [`MAX_EVIDENCE`]
fn extract_evidence(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| BULLET_LINE.is_match(line))
        .take(MAX_EVIDENCE)
        .map(str::to_string)
        .collect()
}
