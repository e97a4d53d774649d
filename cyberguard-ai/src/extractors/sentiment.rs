//! Lexicon-based sentiment
//!
//! Each lexicon hit contributes a (polarity, subjectivity) pair. A preceding
//! intensifier scales the pair, a preceding negation flips and halves the
//! polarity. The text score is the mean over all hits; text without hits is
//! neutral and objective (0, 0).

use super::word_tokens;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// word → (polarity, subjectivity)
static LEXICON: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    [
        ("good", (0.7, 0.6)),
        ("great", (0.8, 0.75)),
        ("excellent", (1.0, 1.0)),
        ("wonderful", (1.0, 1.0)),
        ("best", (1.0, 0.3)),
        ("happy", (0.8, 1.0)),
        ("love", (0.5, 0.6)),
        ("amazing", (0.6, 0.9)),
        ("incredible", (0.9, 0.9)),
        ("miraculous", (0.7, 1.0)),
        ("stunning", (0.5, 1.0)),
        ("beautiful", (0.85, 1.0)),
        ("safe", (0.5, 0.5)),
        ("true", (0.35, 0.65)),
        ("important", (0.4, 1.0)),
        ("success", (0.3, 0.0)),
        ("successful", (0.75, 0.95)),
        ("positive", (0.23, 0.55)),
        ("bad", (-0.7, 0.67)),
        ("terrible", (-1.0, 1.0)),
        ("awful", (-1.0, 1.0)),
        ("horrible", (-1.0, 1.0)),
        ("worst", (-1.0, 1.0)),
        ("shocking", (-1.0, 1.0)),
        ("outrageous", (-0.6, 1.0)),
        ("devastating", (-0.8, 1.0)),
        ("horrifying", (-1.0, 1.0)),
        ("terrifying", (-1.0, 1.0)),
        ("disgusting", (-1.0, 1.0)),
        ("insane", (-1.0, 1.0)),
        ("hate", (-0.8, 0.9)),
        ("evil", (-1.0, 1.0)),
        ("dangerous", (-0.6, 0.9)),
        ("scary", (-0.5, 1.0)),
        ("sad", (-0.5, 1.0)),
        ("angry", (-0.5, 1.0)),
        ("corrupt", (-0.5, 0.5)),
        ("fake", (-0.5, 1.0)),
        ("false", (-0.4, 0.6)),
        ("wrong", (-0.5, 0.9)),
        ("secret", (-0.4, 0.4)),
        ("crisis", (-0.4, 0.6)),
        ("deadly", (-0.2, 0.7)),
        ("negative", (-0.3, 0.4)),
    ]
    .into_iter()
    .collect()
});

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.2),
        ("so", 1.2),
        ("extremely", 1.5),
        ("incredibly", 1.5),
        ("totally", 1.3),
        ("absolutely", 1.4),
    ]
    .into_iter()
    .collect()
});

const NEGATIONS: &[&str] = &["not", "no", "never", "nothing", "hardly"];

/// Polarity magnitude above which text is labelled positive/negative
const LABEL_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Sentiment signals for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignals {
    /// -1.0 (negative) .. 1.0 (positive)
    pub polarity: f64,
    /// 0.0 (objective) .. 1.0 (subjective)
    pub subjectivity: f64,
    pub label: SentimentLabel,
    /// Number of lexicon hits the scores were averaged over
    pub hits: usize,
}

pub struct SentimentExtractor;

impl SentimentExtractor {
    pub fn analyze(text: &str) -> SentimentSignals {
        let tokens = word_tokens(text);
        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        let mut hits = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&(mut polarity, mut subjectivity)) = LEXICON.get(token.as_str()) else {
                continue;
            };

            let mut lookback = i;
            if i > 0 {
                if let Some(&factor) = INTENSIFIERS.get(tokens[i - 1].as_str()) {
                    polarity *= factor;
                    subjectivity *= factor;
                    lookback = i - 1;
                }
            }
            if lookback > 0 && is_negation(&tokens[lookback - 1]) {
                polarity *= -0.5;
            }

            polarity_sum += polarity.clamp(-1.0, 1.0);
            subjectivity_sum += subjectivity.clamp(0.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            return SentimentSignals {
                polarity: 0.0,
                subjectivity: 0.0,
                label: SentimentLabel::Neutral,
                hits: 0,
            };
        }

        let polarity = (polarity_sum / hits as f64).clamp(-1.0, 1.0);
        let subjectivity = (subjectivity_sum / hits as f64).clamp(0.0, 1.0);
        let label = if polarity > LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if polarity < -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        SentimentSignals {
            polarity,
            subjectivity,
            label,
            hits,
        }
    }
}

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hits_is_neutral() {
        let signals = SentimentExtractor::analyze("The meeting starts at nine.");
        assert_eq!(signals.hits, 0);
        assert_eq!(signals.polarity, 0.0);
        assert_eq!(signals.subjectivity, 0.0);
        assert_eq!(signals.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_negative_text() {
        let signals = SentimentExtractor::analyze("This is a terrible, horrible, shocking story.");
        assert_eq!(signals.hits, 3);
        assert_eq!(signals.polarity, -1.0);
        assert_eq!(signals.subjectivity, 1.0);
        assert_eq!(signals.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let plain = SentimentExtractor::analyze("good");
        let negated = SentimentExtractor::analyze("not good");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!((negated.polarity + plain.polarity * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_negation_through_intensifier() {
        let signals = SentimentExtractor::analyze("it isn't very good");
        assert!(signals.polarity < 0.0, "polarity {}", signals.polarity);
    }

    #[test]
    fn test_intensifier_scores_stay_bounded() {
        let signals = SentimentExtractor::analyze("extremely excellent");
        assert_eq!(signals.polarity, 1.0);
        assert_eq!(signals.subjectivity, 1.0);
        assert_eq!(signals.label, SentimentLabel::Positive);
    }
}
