//! Recommendation text
//!
//! Pure lookup keyed by content kind, score band and the AI verdict.

use crate::types::{ContentKind, Verdict, VerdictLabel};

/// Half-open score bands: `[0,0.2) [0.2,0.4) [0.4,0.6) [0.6,0.8) [0.8,1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    VeryLow,
    Low,
    Moderate,
    High,
    Critical,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ScoreBand::Critical
        } else if score >= 0.6 {
            ScoreBand::High
        } else if score >= 0.4 {
            ScoreBand::Moderate
        } else if score >= 0.2 {
            ScoreBand::Low
        } else {
            ScoreBand::VeryLow
        }
    }
}

fn text_band(band: ScoreBand) -> [&'static str; 2] {
    match band {
        ScoreBand::Critical => [
            "Critical risk: this content shows strong signs of misinformation. Do not share it.",
            "Verify every claim with several reputable sources before acting on it.",
        ],
        ScoreBand::High => [
            "High risk: treat this content with significant skepticism.",
            "Cross-check the key claims with established fact-checking organizations.",
        ],
        ScoreBand::Moderate => [
            "Moderate risk: some claims may be misleading or missing context.",
            "Look for the original source and check the publication date.",
        ],
        ScoreBand::Low => [
            "Low risk: no major warning signs, but stay critical.",
            "Confirm important details with a second source.",
        ],
        ScoreBand::VeryLow => [
            "Very low risk: the content appears credible.",
            "Standard caution still applies when sharing.",
        ],
    }
}

fn media_band(band: ScoreBand) -> [&'static str; 2] {
    match band {
        ScoreBand::Critical => [
            "Critical risk: strong signs of manipulation or synthetic generation. Do not share.",
            "Run a reverse image search to find the original source.",
        ],
        ScoreBand::High => [
            "High risk: visual inconsistencies suggest possible manipulation.",
            "Compare against other photos or footage of the same event.",
        ],
        ScoreBand::Moderate => [
            "Moderate risk: some technical anomalies were detected.",
            "Check where the media was first published before trusting it.",
        ],
        ScoreBand::Low => [
            "Low risk: only minor anomalies were detected.",
            "Quality issues alone do not prove manipulation.",
        ],
        ScoreBand::VeryLow => [
            "Very low risk: the media appears authentic.",
            "Standard caution still applies when sharing.",
        ],
    }
}

fn label_line(label: VerdictLabel) -> &'static str {
    match label {
        VerdictLabel::FakeNews => "AI verdict: the content was classified as fake news.",
        VerdictLabel::ModeratelyFake => {
            "AI verdict: the content mixes accurate and misleading elements."
        }
        VerdictLabel::Legitimate => "AI verdict: no misinformation detected.",
        VerdictLabel::Manipulated => "AI verdict: the media appears manipulated.",
        VerdictLabel::LikelyFake => "AI verdict: the media is likely synthetic or altered.",
        VerdictLabel::Suspicious => "AI verdict: the media contains elements worth a closer look.",
        VerdictLabel::Authentic => "AI verdict: the media appears authentic.",
        _ => "AI verdict: the AI response could not be interpreted.",
    }
}

fn general_lines(kind: ContentKind) -> &'static [&'static str] {
    match kind {
        ContentKind::Text => &[
            "Check the author and publisher credentials.",
            "Be wary of emotionally charged language designed to provoke a reaction.",
        ],
        ContentKind::Image => &[
            "Check the image metadata and look for the earliest upload.",
            "Zoom in on edges, hands, text and reflections for artifacts.",
        ],
        ContentKind::Video => &[
            "Watch for lip-sync mismatches, unnatural blinking and lighting changes.",
            "Look for the same footage from an independent source.",
        ],
    }
}

/// Recommendations for an assessment
///
/// `ai` is the AI verdict when the AI provider succeeded.
pub fn recommendations(kind: ContentKind, score: f64, ai: Option<&Verdict>) -> Vec<String> {
    let band = ScoreBand::from_score(score);
    let band_lines = if kind.is_media() {
        media_band(band)
    } else {
        text_band(band)
    };
    let mut lines: Vec<String> = band_lines.iter().map(|s| s.to_string()).collect();

    match ai {
        Some(verdict) => {
            lines.push(label_line(verdict.label).to_string());
            if verdict.label != VerdictLabel::Unknown {
                let pct = verdict.confidence_pct;
                if pct >= 90 {
                    lines.push(format!("The AI assessment is highly confident ({}%).", pct));
                } else if pct >= 70 {
                    lines.push(format!("The AI assessment is fairly confident ({}%).", pct));
                } else if pct < 50 {
                    lines.push(format!(
                        "The AI assessment has low confidence ({}%); weigh the other signals more heavily.",
                        pct
                    ));
                }
            }
        }
        None => lines.push(
            "AI analysis was unavailable; this assessment relies on the remaining signals only."
                .to_string(),
        ),
    }

    lines.extend(general_lines(kind).iter().map(|s| s.to_string()));
    lines
}
