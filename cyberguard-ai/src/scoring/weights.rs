//! Scoring weight tables
//!
//! One table for text, one shared by image and video. Weights are validated
//! when configuration loads: each in `[0, 1]`, each table summing to at most 1.

use crate::types::{ContentKind, Dimension};
use serde::{Deserialize, Serialize};

/// Float slack allowed when checking a table's sum
const SUM_TOLERANCE: f64 = 1e-9;

/// Weight per scoring dimension
///
/// A table given in configuration must name every dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub linguistic: f64,
    pub sentiment: f64,
    pub fact_check: f64,
    pub news: f64,
    pub ai_verdict: f64,
    pub technical: f64,
}

impl DimensionWeights {
    pub const fn text_defaults() -> Self {
        Self {
            linguistic: 0.30,
            sentiment: 0.15,
            fact_check: 0.10,
            news: 0.10,
            ai_verdict: 0.35,
            technical: 0.0,
        }
    }

    pub const fn media_defaults() -> Self {
        Self {
            linguistic: 0.0,
            sentiment: 0.0,
            fact_check: 0.0,
            news: 0.0,
            ai_verdict: 0.65,
            technical: 0.35,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Linguistic => self.linguistic,
            Dimension::Sentiment => self.sentiment,
            Dimension::FactCheck => self.fact_check,
            Dimension::News => self.news,
            Dimension::AiVerdict => self.ai_verdict,
            Dimension::Technical => self.technical,
        }
    }

    pub fn total(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    fn validate(&self, table: &str) -> Result<(), String> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !(0.0..=1.0).contains(&weight) {
                return Err(format!(
                    "{} weight for {} must be within [0, 1], got {}",
                    table,
                    dimension.as_str(),
                    weight
                ));
            }
        }
        let total = self.total();
        if total > 1.0 + SUM_TOLERANCE {
            return Err(format!(
                "{} weights sum to {:.3}, must not exceed 1.0",
                table, total
            ));
        }
        Ok(())
    }
}

/// Weights for every content kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    #[serde(default = "DimensionWeights::text_defaults")]
    pub text: DimensionWeights,
    #[serde(default = "DimensionWeights::media_defaults")]
    pub media: DimensionWeights,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            text: DimensionWeights::text_defaults(),
            media: DimensionWeights::media_defaults(),
        }
    }
}

impl WeightTable {
    pub fn for_kind(&self, kind: ContentKind) -> &DimensionWeights {
        if kind.is_media() {
            &self.media
        } else {
            &self.text
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.text.validate("text")?;
        self.media.validate("media")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let table = WeightTable::default();
        assert!(table.validate().is_ok());
        assert!((table.text.total() - 1.0).abs() < 1e-9);
        assert!((table.media.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overweight_table_rejected() {
        let mut table = WeightTable::default();
        table.text.linguistic = 0.5;
        let err = table.validate().unwrap_err();
        assert!(err.contains("text weights sum"), "{}", err);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut table = WeightTable::default();
        table.media.technical = -0.1;
        assert!(table.validate().unwrap_err().contains("technical"));
    }

    #[test]
    fn test_missing_table_keeps_defaults() {
        let toml_str = r#"
            [text]
            linguistic = 0.25
            sentiment = 0.20
            fact_check = 0.10
            news = 0.10
            ai_verdict = 0.35
            technical = 0.0
        "#;
        let table: WeightTable = toml::from_str(toml_str).unwrap();
        assert_eq!(table.text.linguistic, 0.25);
        assert_eq!(table.media, DimensionWeights::media_defaults());
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_incomplete_table_rejected() {
        let result: Result<WeightTable, _> = toml::from_str("[text]\nlinguistic = 0.25\n");
        assert!(result.is_err());
    }
}
