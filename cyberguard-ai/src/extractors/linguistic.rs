//! Linguistic manipulation markers
//!
//! Counts clickbait phrases, shouting (caps and exclamation marks) and loaded
//! vocabulary, then maps the counts onto a tiered point table:
//!
//! | Signal               | Points                         |
//! |----------------------|--------------------------------|
//! | suspicious phrases   | ≥3 → 3, 2 → 2, 1 → 1           |
//! | caps ratio           | >0.30 → 2, >0.15 → 1           |
//! | exclamation marks    | >3 → 1                         |
//! | emotional words      | >2 → 1                         |
//! | absolute words       | >2 → 1                         |
//! | urgency words        | >1 → 1                         |
//!
//! Total ≥4 is high risk, ≥2 medium, otherwise low.

use super::word_tokens;
use crate::types::RiskLevel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Clickbait phrases matched as case-insensitive substrings
pub const SUSPICIOUS_PATTERNS: &[&str] = &[
    "breaking news",
    "shocking truth",
    "they don't want you to know",
    "doctors hate this",
    "secret revealed",
    "urgent warning",
    "must read",
    "viral",
    "exposed",
    "conspiracy",
];

const EMOTIONAL_WORDS: &[&str] = &[
    "amazing",
    "shocking",
    "unbelievable",
    "incredible",
    "outrageous",
    "devastating",
    "horrifying",
    "terrifying",
    "miraculous",
    "stunning",
    "insane",
    "disgusting",
];

const ABSOLUTE_WORDS: &[&str] = &[
    "always",
    "never",
    "everyone",
    "everybody",
    "nobody",
    "completely",
    "totally",
    "absolutely",
    "definitely",
    "guaranteed",
    "proven",
    "undeniable",
];

const URGENCY_WORDS: &[&str] = &[
    "urgent",
    "urgently",
    "immediately",
    "now",
    "hurry",
    "asap",
    "deadline",
    "warning",
    "alert",
    "act",
    "share",
];

/// Points at which the level becomes high
const HIGH_POINTS: u32 = 4;
/// Points at which the level becomes medium
const MEDIUM_POINTS: u32 = 2;

/// Linguistic signals for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticSignals {
    pub suspicious_phrases: usize,
    pub exclamation_marks: usize,
    pub question_marks: usize,
    /// Uppercase characters / all characters (0 for empty text)
    pub caps_ratio: f64,
    pub emotional_words: usize,
    pub absolute_words: usize,
    pub urgency_words: usize,
    /// Words per sentence (0 when there are no sentences)
    pub avg_sentence_length: f64,
    /// Tier points
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    /// Matched clickbait phrases, in table order
    pub matched_phrases: Vec<String>,
}

/// Linguistic manipulation extractor
pub struct LinguisticExtractor;

impl LinguisticExtractor {
    pub fn analyze(text: &str) -> LinguisticSignals {
        let lower = text.to_lowercase();

        let matched_phrases: Vec<String> = SUSPICIOUS_PATTERNS
            .iter()
            .filter(|p| lower.contains(*p))
            .map(|p| p.to_string())
            .collect();

        let total_chars = text.chars().count();
        let upper_chars = text.chars().filter(|c| c.is_uppercase()).count();
        let caps_ratio = if total_chars == 0 {
            0.0
        } else {
            upper_chars as f64 / total_chars as f64
        };

        let tokens = word_tokens(text);
        let emotional_words = count_listed(&tokens, EMOTIONAL_WORDS);
        let absolute_words = count_listed(&tokens, ABSOLUTE_WORDS);
        let urgency_words = count_listed(&tokens, URGENCY_WORDS);

        let sentences = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();
        let avg_sentence_length = if sentences == 0 {
            0.0
        } else {
            tokens.len() as f64 / sentences as f64
        };

        let exclamation_marks = text.matches('!').count();
        let question_marks = text.matches('?').count();

        let mut risk_score = match matched_phrases.len() {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 3,
        };
        if caps_ratio > 0.30 {
            risk_score += 2;
        } else if caps_ratio > 0.15 {
            risk_score += 1;
        }
        if exclamation_marks > 3 {
            risk_score += 1;
        }
        if emotional_words > 2 {
            risk_score += 1;
        }
        if absolute_words > 2 {
            risk_score += 1;
        }
        if urgency_words > 1 {
            risk_score += 1;
        }

        let risk_level = if risk_score >= HIGH_POINTS {
            RiskLevel::High
        } else if risk_score >= MEDIUM_POINTS {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        debug!(
            phrases = matched_phrases.len(),
            caps_ratio,
            exclamation_marks,
            risk_score,
            level = risk_level.as_str(),
            "Linguistic analysis complete"
        );

        LinguisticSignals {
            suspicious_phrases: matched_phrases.len(),
            exclamation_marks,
            question_marks,
            caps_ratio,
            emotional_words,
            absolute_words,
            urgency_words,
            avg_sentence_length,
            risk_score,
            risk_level,
            matched_phrases,
        }
    }
}

/// Number of distinct list words present among the tokens
fn count_listed(tokens: &[String], words: &[&str]) -> usize {
    words
        .iter()
        .filter(|w| tokens.iter().any(|t| t == *w))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clickbait_headline_is_high_risk() {
        let signals =
            LinguisticExtractor::analyze("BREAKING NEWS!!! SHOCKING TRUTH they don't want you to know!!!");

        assert_eq!(signals.suspicious_phrases, 3);
        assert!(signals.caps_ratio > 0.30, "caps ratio {}", signals.caps_ratio);
        assert_eq!(signals.exclamation_marks, 6);
        assert_eq!(signals.urgency_words, 0, "'know' must not match 'now'");
        assert_eq!(signals.risk_level, RiskLevel::High);
        assert_eq!(signals.risk_score, 6);
    }

    #[test]
    fn test_empty_text_has_zero_ratios() {
        let signals = LinguisticExtractor::analyze("");
        assert_eq!(signals.caps_ratio, 0.0);
        assert_eq!(signals.avg_sentence_length, 0.0);
        assert_eq!(signals.risk_score, 0);
        assert_eq!(signals.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_punctuation_only_text() {
        let signals = LinguisticExtractor::analyze("!!!!");
        assert_eq!(signals.avg_sentence_length, 0.0);
        assert_eq!(signals.exclamation_marks, 4);
        assert_eq!(signals.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_neutral_reporting_is_low_risk() {
        let signals = LinguisticExtractor::analyze(
            "The city council approved the annual budget on Tuesday. \
             The vote passed seven to two after a short debate.",
        );
        assert_eq!(signals.suspicious_phrases, 0);
        assert_eq!(signals.risk_level, RiskLevel::Low);
        assert!(signals.avg_sentence_length > 8.0);
    }

    #[test]
    fn test_loaded_vocabulary_reaches_medium() {
        let signals = LinguisticExtractor::analyze(
            "Everyone knows this is absolutely guaranteed and completely proven. \
             Act now and share immediately.",
        );
        assert!(signals.absolute_words > 2);
        assert!(signals.urgency_words > 1);
        assert_eq!(signals.risk_score, 2);
        assert_eq!(signals.risk_level, RiskLevel::Medium);
    }
}
