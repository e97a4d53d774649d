//! Core Types for CyberGuard AI
//!
//! Data model shared by every stage of the analysis pipeline:
//! - **Input:** `AnalysisInput` (text, image or video)
//! - **Providers:** `ProviderOutcome` (one per provider per request)
//! - **Normalization:** `Verdict` (structured provider output)
//! - **Scoring:** `ComponentScore`, `ScoreCard`, `RiskAssessment`
//! - **Video:** `FrameSample`
//!
//! Values produced by one stage are never mutated by a later stage. Outcomes and
//! assessments expose read-only accessors.

use crate::extractors::{LinguisticSignals, SentimentSignals, TechnicalSummary};
use chrono::{DateTime, Utc};
use cyberguard_common::fingerprint::{content_fingerprint, normalize_text};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Maximum characters kept in a text preview
pub const PREVIEW_CHARS: usize = 200;

// ============================================================================
// Input
// ============================================================================

/// Kind of content under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Video,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
        }
    }

    /// Image and video share the media scoring table
    pub fn is_media(&self) -> bool {
        !matches!(self, ContentKind::Text)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw content carried by an [`AnalysisInput`]
#[derive(Debug, Clone)]
enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

/// One piece of content submitted for analysis
///
/// Immutable once built; owned by a single pipeline invocation.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    kind: ContentKind,
    payload: Payload,
    file_name: Option<String>,
}

impl AnalysisInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            payload: Payload::Text(text.into()),
            file_name: None,
        }
    }

    pub fn image(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ContentKind::Image,
            payload: Payload::Bytes(bytes.into()),
            file_name: None,
        }
    }

    pub fn video(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ContentKind::Video,
            payload: Payload::Bytes(bytes.into()),
            file_name: None,
        }
    }

    /// Attach the original upload name (used for previews only)
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes(bytes) => Some(bytes),
            Payload::Text(_) => None,
        }
    }

    /// Content fingerprint (hash of normalized content + analysis kind)
    pub fn fingerprint(&self) -> String {
        match &self.payload {
            Payload::Text(text) => {
                content_fingerprint(self.kind.as_str(), normalize_text(text).as_bytes())
            }
            Payload::Bytes(bytes) => content_fingerprint(self.kind.as_str(), bytes),
        }
    }

    /// Short human-readable preview for history listings
    pub fn preview(&self) -> String {
        match &self.payload {
            Payload::Text(text) => {
                if text.chars().count() > PREVIEW_CHARS {
                    let head: String = text.chars().take(PREVIEW_CHARS).collect();
                    format!("{}...", head)
                } else {
                    text.clone()
                }
            }
            Payload::Bytes(bytes) => match &self.file_name {
                Some(name) => name.clone(),
                None => format!("{} file ({} bytes)", self.kind, bytes.len()),
            },
        }
    }
}

// ============================================================================
// Provider outcomes
// ============================================================================

/// External analysis source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Generative-AI verdict (Gemini)
    AiVerdict,
    /// Claims database (Google Fact Check Tools)
    Claims,
    /// News index (NewsAPI)
    News,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::AiVerdict => "ai_verdict",
            ProviderKind::Claims => "claims",
            ProviderKind::News => "news",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution of a single provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Success,
    Error,
    Timeout,
    /// Never configured (missing credential); no call attempted
    Unavailable,
}

/// Opaque payload returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Free-form text (AI provider, or an unparsable body)
    Text(String),
    /// Structured JSON body
    Json(serde_json::Value),
    Empty,
}

/// Outcome of one provider for one request
///
/// Produced once by the fan-out coordinator and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    provider: ProviderKind,
    status: ProviderStatus,
    raw_payload: RawPayload,
    message: Option<String>,
    elapsed: Duration,
}

impl ProviderOutcome {
    pub fn success(provider: ProviderKind, payload: RawPayload, elapsed: Duration) -> Self {
        Self {
            provider,
            status: ProviderStatus::Success,
            raw_payload: payload,
            message: None,
            elapsed,
        }
    }

    pub fn error(provider: ProviderKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            provider,
            status: ProviderStatus::Error,
            raw_payload: RawPayload::Empty,
            message: Some(message.into()),
            elapsed,
        }
    }

    pub fn timeout(provider: ProviderKind, elapsed: Duration) -> Self {
        Self {
            provider,
            status: ProviderStatus::Timeout,
            raw_payload: RawPayload::Empty,
            message: Some(format!("No response within {} ms", elapsed.as_millis())),
            elapsed,
        }
    }

    pub fn unavailable(provider: ProviderKind) -> Self {
        Self {
            provider,
            status: ProviderStatus::Unavailable,
            raw_payload: RawPayload::Empty,
            message: Some(format!("{} provider not configured", provider)),
            elapsed: Duration::ZERO,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn status(&self) -> ProviderStatus {
        self.status
    }

    pub fn raw_payload(&self) -> &RawPayload {
        &self.raw_payload
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_success(&self) -> bool {
        self.status == ProviderStatus::Success
    }

    /// Explainability record for the assessment
    pub fn report(&self) -> SourceReport {
        SourceReport {
            provider: self.provider,
            status: self.status,
            elapsed_ms: self.elapsed.as_millis() as u64,
            message: self.message.clone(),
        }
    }
}

/// Per-provider status line attached to an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub provider: ProviderKind,
    pub status: ProviderStatus,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Verdicts
// ============================================================================

/// Closed vocabulary of verdict labels
///
/// The AI provider uses the text set (`FAKE NEWS`, `MODERATELY FAKE`,
/// `LEGITIMATE`) or the media set (`AUTHENTIC`, `SUSPICIOUS`, `LIKELY FAKE`,
/// `MANIPULATED`). Claims and news providers have their own labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictLabel {
    #[serde(rename = "FAKE NEWS")]
    FakeNews,
    #[serde(rename = "MODERATELY FAKE")]
    ModeratelyFake,
    #[serde(rename = "LEGITIMATE")]
    Legitimate,
    #[serde(rename = "AUTHENTIC")]
    Authentic,
    #[serde(rename = "SUSPICIOUS")]
    Suspicious,
    #[serde(rename = "LIKELY FAKE")]
    LikelyFake,
    #[serde(rename = "MANIPULATED")]
    Manipulated,
    #[serde(rename = "DISPUTED")]
    Disputed,
    #[serde(rename = "CLAIMS FOUND")]
    ClaimsFound,
    #[serde(rename = "NO CLAIMS")]
    NoClaims,
    #[serde(rename = "CORROBORATED")]
    Corroborated,
    #[serde(rename = "UNCORROBORATED")]
    Uncorroborated,
    #[serde(rename = "NO COVERAGE")]
    NoCoverage,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::FakeNews => "FAKE NEWS",
            VerdictLabel::ModeratelyFake => "MODERATELY FAKE",
            VerdictLabel::Legitimate => "LEGITIMATE",
            VerdictLabel::Authentic => "AUTHENTIC",
            VerdictLabel::Suspicious => "SUSPICIOUS",
            VerdictLabel::LikelyFake => "LIKELY FAKE",
            VerdictLabel::Manipulated => "MANIPULATED",
            VerdictLabel::Disputed => "DISPUTED",
            VerdictLabel::ClaimsFound => "CLAIMS FOUND",
            VerdictLabel::NoClaims => "NO CLAIMS",
            VerdictLabel::Corroborated => "CORROBORATED",
            VerdictLabel::Uncorroborated => "UNCORROBORATED",
            VerdictLabel::NoCoverage => "NO COVERAGE",
            VerdictLabel::Unknown => "UNKNOWN",
        }
    }

    /// Risk severity of an AI label (0.0 benign .. 1.0 most severe)
    pub fn severity(&self) -> f64 {
        match self {
            VerdictLabel::FakeNews | VerdictLabel::Manipulated => 1.0,
            VerdictLabel::LikelyFake => 0.75,
            VerdictLabel::ModeratelyFake | VerdictLabel::Suspicious => 0.5,
            _ => 0.0,
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item counts extracted from structured (claims/news) payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Items returned by the provider
    pub found: usize,
    /// Items whose source is on the reputable-domain allow-list
    pub reputable: usize,
    /// Claims whose review rating marks them false or misleading
    pub flagged: usize,
}

impl Coverage {
    /// Fraction of returned items from reputable sources (0 when nothing was found)
    pub fn reputable_ratio(&self) -> f64 {
        if self.found == 0 {
            0.0
        } else {
            self.reputable as f64 / self.found as f64
        }
    }
}

/// Normalized provider output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub provider: ProviderKind,
    pub label: VerdictLabel,
    /// Provider confidence, 0..=100
    pub confidence_pct: u8,
    /// Ordered evidence lines (at most 5)
    pub evidence: Vec<String>,
    pub rationale: String,
    /// Present for structured providers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
}

impl Verdict {
    /// Degraded verdict for a payload that could not be interpreted
    pub fn unknown(provider: ProviderKind, rationale: impl Into<String>) -> Self {
        Self {
            provider,
            label: VerdictLabel::Unknown,
            confidence_pct: 0,
            evidence: Vec::new(),
            rationale: rationale.into(),
            coverage: None,
        }
    }

    /// Confidence as a 0.0-1.0 fraction
    pub fn confidence(&self) -> f64 {
        f64::from(self.confidence_pct.min(100)) / 100.0
    }
}

/// A provider's status paired with its verdict (present only on success)
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSource {
    pub provider: ProviderKind,
    pub status: ProviderStatus,
    pub verdict: Option<Verdict>,
}

// ============================================================================
// Scoring
// ============================================================================

/// Scoring dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Linguistic,
    Sentiment,
    FactCheck,
    News,
    AiVerdict,
    Technical,
}

impl Dimension {
    /// Every dimension, in breakdown order
    pub const ALL: [Dimension; 6] = [
        Dimension::Linguistic,
        Dimension::Sentiment,
        Dimension::FactCheck,
        Dimension::News,
        Dimension::AiVerdict,
        Dimension::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Linguistic => "linguistic",
            Dimension::Sentiment => "sentiment",
            Dimension::FactCheck => "fact_check",
            Dimension::News => "news",
            Dimension::AiVerdict => "ai_verdict",
            Dimension::Technical => "technical",
        }
    }
}

/// One dimension's weighted contribution to the final score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub name: String,
    pub dimension: Dimension,
    /// Declared weight, 0..=1
    pub weight: f64,
    /// Contribution, 0..=weight
    pub contribution: f64,
    /// Which rule fired
    pub detail: String,
}

/// Coarse risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Deterministic output of the scoring engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Risk score, 0..=1
    pub score: f64,
    /// Confidence in the score, 0..=1
    pub confidence: f64,
    pub risk_level: RiskLevel,
    /// Every dimension, including zero contributions
    pub breakdown: Vec<ComponentScore>,
    pub verdict_label: String,
    pub recommendations: Vec<String>,
}

/// Extractor and provider signals kept for explainability
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignalReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linguistic: Option<LinguisticSignals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentSignals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalSummary>,
    pub verdicts: Vec<Verdict>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameSample>,
}

/// Terminal artifact returned to the caller
///
/// Built once by the pipeline and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    id: Uuid,
    kind: ContentKind,
    fingerprint: String,
    preview: String,
    #[serde(flatten)]
    card: ScoreCard,
    sources: Vec<SourceReport>,
    signals: SignalReport,
    created_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn new(
        input: &AnalysisInput,
        card: ScoreCard,
        sources: Vec<SourceReport>,
        signals: SignalReport,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: input.kind(),
            fingerprint: input.fingerprint(),
            preview: input.preview(),
            card,
            sources,
            signals,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn card(&self) -> &ScoreCard {
        &self.card
    }

    pub fn score(&self) -> f64 {
        self.card.score
    }

    pub fn confidence(&self) -> f64 {
        self.card.confidence
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.card.risk_level
    }

    pub fn breakdown(&self) -> &[ComponentScore] {
        &self.card.breakdown
    }

    pub fn verdict_label(&self) -> &str {
        &self.card.verdict_label
    }

    pub fn recommendations(&self) -> &[String] {
        &self.card.recommendations
    }

    pub fn sources(&self) -> &[SourceReport] {
        &self.sources
    }

    pub fn signals(&self) -> &SignalReport {
        &self.signals
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Contribution of one dimension (0 when absent)
    pub fn contribution(&self, dimension: Dimension) -> f64 {
        self.card
            .breakdown
            .iter()
            .find(|c| c.dimension == dimension)
            .map(|c| c.contribution)
            .unwrap_or(0.0)
    }

    /// Status of one provider, if it was applicable to this request
    pub fn source_status(&self, provider: ProviderKind) -> Option<ProviderStatus> {
        self.sources
            .iter()
            .find(|s| s.provider == provider)
            .map(|s| s.status)
    }
}

// ============================================================================
// Video
// ============================================================================

/// Temporal section of a video a sampled frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSection {
    Beginning,
    Middle,
    End,
}

/// Sampled frame position within a video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Frame index, unique and `< total_frames`
    pub position: u64,
    pub timestamp_sec: f64,
    pub section: FrameSection,
}
