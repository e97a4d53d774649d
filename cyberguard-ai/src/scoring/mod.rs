//! Scoring Engine
//!
//! Combines extractor signals and normalized provider verdicts into one
//! bounded, explainable score.
//!
//! # Algorithm
//! Each dimension yields a risk fraction in `[0, 1]`, which is multiplied by
//! the dimension's weight. Fractions are clamped before weighting, so no
//! dimension can contribute more than its weight and
//! `Σ contribution ≤ Σ weight ≤ 1`.
//!
//! | Dimension  | Fraction                                                     |
//! |------------|--------------------------------------------------------------|
//! | linguistic | high 1.0, medium 0.5, low 0                                  |
//! | sentiment  | subjectivity >0.7 +0.5 (>0.5 +0.25); \|polarity\| >0.5 +0.5 (>0.3 +0.25) |
//! | fact_check | flagged 1.0; ≥3 claims 0.9; 1-2 claims 0.7; none 0.5; failed 0.25 |
//! | news       | no articles 0.8; else 0.7 × (1 − reputable ratio); failed 0.25 |
//! | ai_verdict | label severity × confidence                                  |
//! | technical  | mean per-frame technical risk                                |
//!
//! Unavailable providers contribute nothing.
//!
//! # Confidence
//! Text: `clamp(0.1, 0.95, (score·0.8 + 0.2) · (0.5 + 0.5·coverage))`, where
//! coverage is the share of provider weight whose provider produced a usable
//! verdict. Without any usable verdict text confidence stays below 0.5 (at most
//! 0.49). Media: the AI verdict's confidence, or 0.3 without one.

pub mod recommendations;
pub mod weights;

pub use recommendations::{recommendations, ScoreBand};
pub use weights::{DimensionWeights, WeightTable};

use crate::extractors::ExtractorOutputs;
use crate::types::{
    ComponentScore, Dimension, NormalizedSource, ProviderKind, ProviderStatus, RiskLevel,
    ScoreCard, Verdict, VerdictLabel,
};
use cyberguard_common::{Error, Result};
use tracing::debug;

/// Fixed fraction charged for a provider that failed or timed out
pub const PROVIDER_FAILURE_FRACTION: f64 = 0.25;

/// Media confidence when no AI verdict is available
pub const DEGRADED_MEDIA_CONFIDENCE: f64 = 0.3;

const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;
/// Text confidence ceiling when no provider produced a usable verdict
const UNCOVERED_MAX_CONFIDENCE: f64 = 0.49;

/// Score at which risk becomes high
pub const HIGH_RISK_SCORE: f64 = 0.6;
/// Score at which risk becomes medium
pub const MEDIUM_RISK_SCORE: f64 = 0.3;

/// Provider feeding each external dimension
const PROVIDER_DIMENSIONS: [(Dimension, ProviderKind); 3] = [
    (Dimension::FactCheck, ProviderKind::Claims),
    (Dimension::News, ProviderKind::News),
    (Dimension::AiVerdict, ProviderKind::AiVerdict),
];

/// Deterministic weighted scorer
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: WeightTable,
}

impl ScoringEngine {
    /// Create an engine, rejecting invalid weight tables
    pub fn new(weights: WeightTable) -> Result<Self> {
        weights.validate().map_err(Error::Config)?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Score one fully-resolved set of signals
    pub fn score(&self, extractors: &ExtractorOutputs, sources: &[NormalizedSource]) -> ScoreCard {
        let kind = extractors.kind;
        let weights = self.weights.for_kind(kind);

        let breakdown: Vec<ComponentScore> = Dimension::ALL
            .iter()
            .map(|&dimension| {
                let weight = weights.get(dimension);
                let (fraction, detail) = dimension_fraction(dimension, extractors, sources);
                ComponentScore {
                    name: dimension.as_str().to_string(),
                    dimension,
                    weight,
                    contribution: weight * fraction.clamp(0.0, 1.0),
                    detail,
                }
            })
            .collect();

        let total: f64 = breakdown.iter().map(|c| c.contribution).sum();
        let score = total.clamp(0.0, 1.0);

        let ai = usable_verdict(sources, ProviderKind::AiVerdict);
        let confidence = if kind.is_media() {
            ai.map(Verdict::confidence)
                .unwrap_or(DEGRADED_MEDIA_CONFIDENCE)
                .clamp(0.0, 1.0)
        } else {
            let coverage = provider_coverage(weights, sources);
            let ceiling = if coverage > 0.0 {
                MAX_CONFIDENCE
            } else {
                UNCOVERED_MAX_CONFIDENCE
            };
            ((score * 0.8 + 0.2) * (0.5 + 0.5 * coverage)).clamp(MIN_CONFIDENCE, ceiling)
        };

        let risk_level = if score >= HIGH_RISK_SCORE {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_SCORE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let ai_verdict = verdict_of(sources, ProviderKind::AiVerdict);
        let verdict_label = ai_verdict
            .map(|v| v.label)
            .unwrap_or(VerdictLabel::Unknown)
            .as_str()
            .to_string();

        debug!(
            kind = %kind,
            score,
            confidence,
            level = risk_level.as_str(),
            verdict = %verdict_label,
            "Assessment scored"
        );

        ScoreCard {
            score,
            confidence,
            risk_level,
            breakdown,
            verdict_label,
            recommendations: recommendations(kind, score, ai_verdict),
        }
    }
}

fn source_of(sources: &[NormalizedSource], provider: ProviderKind) -> Option<&NormalizedSource> {
    sources.iter().find(|s| s.provider == provider)
}

fn verdict_of(sources: &[NormalizedSource], provider: ProviderKind) -> Option<&Verdict> {
    source_of(sources, provider).and_then(|s| s.verdict.as_ref())
}

/// Verdict that carries information (not `UNKNOWN`)
fn usable_verdict(sources: &[NormalizedSource], provider: ProviderKind) -> Option<&Verdict> {
    verdict_of(sources, provider).filter(|v| v.label != VerdictLabel::Unknown)
}

/// Share of provider weight backed by a usable verdict
fn provider_coverage(weights: &DimensionWeights, sources: &[NormalizedSource]) -> f64 {
    let mut total = 0.0;
    let mut covered = 0.0;
    for (dimension, provider) in PROVIDER_DIMENSIONS {
        let weight = weights.get(dimension);
        if weight <= 0.0 {
            continue;
        }
        total += weight;
        if usable_verdict(sources, provider).is_some() {
            covered += weight;
        }
    }
    if total > 0.0 {
        covered / total
    } else {
        0.0
    }
}

/// Risk fraction and explanation for one dimension
fn dimension_fraction(
    dimension: Dimension,
    extractors: &ExtractorOutputs,
    sources: &[NormalizedSource],
) -> (f64, String) {
    match dimension {
        Dimension::Linguistic => match &extractors.linguistic {
            Some(signals) => {
                let fraction = match signals.risk_level {
                    RiskLevel::High => 1.0,
                    RiskLevel::Medium => 0.5,
                    RiskLevel::Low => 0.0,
                };
                (
                    fraction,
                    format!(
                        "{} linguistic risk ({} points)",
                        signals.risk_level.as_str(),
                        signals.risk_score
                    ),
                )
            }
            None => (0.0, "not applicable".to_string()),
        },
        Dimension::Sentiment => match &extractors.sentiment {
            Some(signals) => {
                let mut fraction = 0.0;
                if signals.subjectivity > 0.7 {
                    fraction += 0.5;
                } else if signals.subjectivity > 0.5 {
                    fraction += 0.25;
                }
                if signals.polarity.abs() > 0.5 {
                    fraction += 0.5;
                } else if signals.polarity.abs() > 0.3 {
                    fraction += 0.25;
                }
                (
                    fraction,
                    format!(
                        "polarity {:.2}, subjectivity {:.2}",
                        signals.polarity, signals.subjectivity
                    ),
                )
            }
            None => (0.0, "not applicable".to_string()),
        },
        Dimension::FactCheck => provider_fraction(sources, ProviderKind::Claims, |verdict| {
            match verdict.coverage {
                Some(c) if c.flagged > 0 => (1.0, format!("{} claim(s) rated false or misleading", c.flagged)),
                Some(c) if c.found >= 3 => (0.9, format!("{} related claims already fact-checked", c.found)),
                Some(c) if c.found >= 1 => (0.7, format!("{} related claim(s) already fact-checked", c.found)),
                Some(_) => (0.5, "no matching fact-checks".to_string()),
                None => (PROVIDER_FAILURE_FRACTION, "unreadable claims response".to_string()),
            }
        }),
        Dimension::News => provider_fraction(sources, ProviderKind::News, |verdict| {
            match verdict.coverage {
                Some(c) if c.found == 0 => (0.8, "no news coverage found".to_string()),
                Some(c) => (
                    0.7 * (1.0 - c.reputable_ratio()),
                    format!("{} of {} articles from reputable outlets", c.reputable, c.found),
                ),
                None => (PROVIDER_FAILURE_FRACTION, "unreadable news response".to_string()),
            }
        }),
        Dimension::AiVerdict => match source_of(sources, ProviderKind::AiVerdict) {
            Some(NormalizedSource {
                verdict: Some(verdict),
                ..
            }) => (
                verdict.label.severity() * verdict.confidence(),
                format!("{} at {}% confidence", verdict.label, verdict.confidence_pct),
            ),
            Some(source) => (0.0, status_detail(source.status)),
            None => (0.0, "not applicable".to_string()),
        },
        Dimension::Technical => match &extractors.technical {
            Some(summary) => (
                summary.mean_risk,
                format!(
                    "mean technical risk {:.2} over {} frame(s)",
                    summary.mean_risk,
                    summary.frames.len()
                ),
            ),
            None => (0.0, "not applicable".to_string()),
        },
    }
}

/// Fraction for a structured provider: verdict rule on success, fixed
/// penalty on failure, nothing when unavailable or not applicable
fn provider_fraction(
    sources: &[NormalizedSource],
    provider: ProviderKind,
    rule: impl Fn(&Verdict) -> (f64, String),
) -> (f64, String) {
    match source_of(sources, provider) {
        None => (0.0, "not applicable".to_string()),
        Some(source) => match (&source.verdict, source.status) {
            (Some(verdict), _) => rule(verdict),
            (None, ProviderStatus::Error | ProviderStatus::Timeout) => {
                (PROVIDER_FAILURE_FRACTION, status_detail(source.status))
            }
            (None, status) => (0.0, status_detail(status)),
        },
    }
}

fn status_detail(status: ProviderStatus) -> String {
    match status {
        ProviderStatus::Success => "no verdict".to_string(),
        ProviderStatus::Error => "provider error".to_string(),
        ProviderStatus::Timeout => "provider timed out".to_string(),
        ProviderStatus::Unavailable => "provider unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{TechnicalSignals, TechnicalSummary};
    use crate::types::{ContentKind, Coverage};

    fn source(provider: ProviderKind, status: ProviderStatus, verdict: Option<Verdict>) -> NormalizedSource {
        NormalizedSource {
            provider,
            status,
            verdict,
        }
    }

    fn verdict(provider: ProviderKind, label: VerdictLabel, pct: u8, coverage: Option<Coverage>) -> Verdict {
        Verdict {
            provider,
            label,
            confidence_pct: pct,
            evidence: Vec::new(),
            rationale: String::new(),
            coverage,
        }
    }

    fn all_unavailable() -> Vec<NormalizedSource> {
        [ProviderKind::AiVerdict, ProviderKind::Claims, ProviderKind::News]
            .into_iter()
            .map(|p| source(p, ProviderStatus::Unavailable, None))
            .collect()
    }

    fn contribution(card: &ScoreCard, dimension: Dimension) -> f64 {
        card.breakdown
            .iter()
            .find(|c| c.dimension == dimension)
            .map(|c| c.contribution)
            .unwrap()
    }

    #[test]
    fn test_all_unavailable_text() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs::for_text("BREAKING NEWS!!! SHOCKING TRUTH they don't want you to know!!!");
        let card = engine.score(&outputs, &all_unavailable());

        assert_eq!(card.breakdown.len(), Dimension::ALL.len());
        assert!((contribution(&card, Dimension::Linguistic) - 0.30).abs() < 1e-9);
        assert_eq!(contribution(&card, Dimension::FactCheck), 0.0);
        assert_eq!(contribution(&card, Dimension::News), 0.0);
        assert_eq!(contribution(&card, Dimension::AiVerdict), 0.0);
        assert!(card.confidence < 0.5, "confidence {}", card.confidence);
        assert_eq!(card.verdict_label, "UNKNOWN");
    }

    #[test]
    fn test_uncovered_confidence_below_half_at_full_score() {
        let only_linguistic = DimensionWeights {
            linguistic: 1.0,
            sentiment: 0.0,
            fact_check: 0.0,
            news: 0.0,
            ai_verdict: 0.0,
            technical: 0.0,
        };
        let engine = ScoringEngine::new(WeightTable {
            text: only_linguistic,
            media: DimensionWeights::media_defaults(),
        })
        .unwrap();
        let outputs = ExtractorOutputs::for_text("BREAKING NEWS!!! SHOCKING TRUTH they don't want you to know!!!");
        let card = engine.score(&outputs, &all_unavailable());

        assert_eq!(card.score, 1.0);
        assert!(card.confidence < 0.5, "confidence {}", card.confidence);
        assert_eq!(card.confidence, UNCOVERED_MAX_CONFIDENCE);
    }

    #[test]
    fn test_claims_error_penalty() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs::for_text("The council met on Tuesday.");
        let sources = vec![
            source(ProviderKind::AiVerdict, ProviderStatus::Unavailable, None),
            source(ProviderKind::Claims, ProviderStatus::Error, None),
            source(ProviderKind::News, ProviderStatus::Timeout, None),
        ];
        let card = engine.score(&outputs, &sources);
        assert!((contribution(&card, Dimension::FactCheck) - 0.025).abs() < 1e-9);
        assert!((contribution(&card, Dimension::News) - 0.025).abs() < 1e-9);
    }

    #[test]
    fn test_ai_verdict_scaled_by_confidence() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs::for_text("The council met on Tuesday.");
        let mut sources = all_unavailable();
        sources[0] = source(
            ProviderKind::AiVerdict,
            ProviderStatus::Success,
            Some(verdict(ProviderKind::AiVerdict, VerdictLabel::FakeNews, 92, None)),
        );

        let card = engine.score(&outputs, &sources);
        assert!((contribution(&card, Dimension::AiVerdict) - 0.35 * 0.92).abs() < 1e-9);
        assert_eq!(card.verdict_label, "FAKE NEWS");
    }

    #[test]
    fn test_structured_rules() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs::for_text("The council met on Tuesday.");
        let claims = Coverage {
            found: 2,
            reputable: 1,
            flagged: 0,
        };
        let news = Coverage {
            found: 4,
            reputable: 2,
            flagged: 0,
        };
        let sources = vec![
            source(ProviderKind::AiVerdict, ProviderStatus::Unavailable, None),
            source(
                ProviderKind::Claims,
                ProviderStatus::Success,
                Some(verdict(ProviderKind::Claims, VerdictLabel::ClaimsFound, 70, Some(claims))),
            ),
            source(
                ProviderKind::News,
                ProviderStatus::Success,
                Some(verdict(ProviderKind::News, VerdictLabel::Corroborated, 90, Some(news))),
            ),
        ];

        let card = engine.score(&outputs, &sources);
        assert!((contribution(&card, Dimension::FactCheck) - 0.07).abs() < 1e-9);
        assert!((contribution(&card, Dimension::News) - 0.035).abs() < 1e-9);
    }

    #[test]
    fn test_media_confidence_follows_ai() {
        let engine = ScoringEngine::default();
        let frame = TechnicalSignals {
            width: 640,
            height: 480,
            sharpness: 20.0,
            brightness: 120.0,
            contrast: 50.0,
            quality_score: 2.0,
            anomalies: vec!["blur".into()],
            risk: 0.4,
        };
        let outputs = ExtractorOutputs::for_media(ContentKind::Image, vec![frame]);

        let degraded = engine.score(&outputs, &[source(ProviderKind::AiVerdict, ProviderStatus::Timeout, None)]);
        assert_eq!(degraded.confidence, DEGRADED_MEDIA_CONFIDENCE);
        assert!((degraded.score - 0.35 * 0.4).abs() < 1e-9);

        let sources = [source(
            ProviderKind::AiVerdict,
            ProviderStatus::Success,
            Some(verdict(ProviderKind::AiVerdict, VerdictLabel::Manipulated, 80, None)),
        )];
        let card = engine.score(&outputs, &sources);
        assert!((card.confidence - 0.8).abs() < 1e-9);
        assert!((card.score - (0.65 * 0.8 + 0.35 * 0.4)).abs() < 1e-9);
        assert_eq!(card.risk_level, RiskLevel::High);
        assert_eq!(contribution(&card, Dimension::Linguistic), 0.0);
        assert_eq!(card.breakdown.len(), 6);
    }

    #[test]
    fn test_contributions_never_exceed_weights() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs::for_text(
            "BREAKING NEWS!!! SHOCKING TRUTH exposed, a terrible, horrible conspiracy! Act now, share immediately!",
        );
        let flagged = Coverage {
            found: 5,
            reputable: 5,
            flagged: 5,
        };
        let sources = vec![
            source(
                ProviderKind::AiVerdict,
                ProviderStatus::Success,
                Some(verdict(ProviderKind::AiVerdict, VerdictLabel::FakeNews, 100, None)),
            ),
            source(
                ProviderKind::Claims,
                ProviderStatus::Success,
                Some(verdict(ProviderKind::Claims, VerdictLabel::Disputed, 90, Some(flagged))),
            ),
            source(
                ProviderKind::News,
                ProviderStatus::Success,
                Some(verdict(ProviderKind::News, VerdictLabel::NoCoverage, 50, Some(Coverage::default()))),
            ),
        ];

        let card = engine.score(&outputs, &sources);
        for component in &card.breakdown {
            assert!(component.contribution <= component.weight + 1e-12, "{:?}", component);
        }
        let weight_sum: f64 = card.breakdown.iter().map(|c| c.weight).sum();
        assert!(weight_sum <= 1.0 + 1e-9);
        assert!(card.score <= 1.0);
        assert!(card.confidence <= MAX_CONFIDENCE);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs::for_text("Doctors hate this one secret revealed!");
        let sources = all_unavailable();
        assert_eq!(engine.score(&outputs, &sources), engine.score(&outputs, &sources));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut table = WeightTable::default();
        table.text.ai_verdict = 0.9;
        assert!(ScoringEngine::new(table).is_err());
        assert!(ScoringEngine::new(WeightTable::default()).is_ok());
    }

    #[test]
    fn test_empty_technical_summary() {
        let engine = ScoringEngine::default();
        let outputs = ExtractorOutputs {
            kind: ContentKind::Video,
            linguistic: None,
            sentiment: None,
            technical: Some(TechnicalSummary::from_frames(Vec::new())),
        };
        let card = engine.score(&outputs, &[]);
        assert_eq!(card.score, 0.0);
        assert_eq!(card.verdict_label, "UNKNOWN");
    }
}
