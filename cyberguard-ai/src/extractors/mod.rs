//! Local heuristic extractors
//!
//! Pure, synchronous signal extraction that never touches the network:
//! - [`linguistic`]: manipulation markers in text
//! - [`sentiment`]: lexicon-based polarity and subjectivity
//! - [`technical`]: image quality outliers (blur, exposure, contrast, size)

pub mod linguistic;
pub mod sentiment;
pub mod technical;

pub use linguistic::{LinguisticExtractor, LinguisticSignals};
pub use sentiment::{SentimentExtractor, SentimentLabel, SentimentSignals};
pub use technical::{TechnicalExtractor, TechnicalSignals, TechnicalSummary};

use crate::types::ContentKind;

/// Everything the local extractors produced for one input
///
/// Text inputs fill `linguistic` and `sentiment`; image and video inputs fill
/// `technical`.
#[derive(Debug, Clone)]
pub struct ExtractorOutputs {
    pub kind: ContentKind,
    pub linguistic: Option<LinguisticSignals>,
    pub sentiment: Option<SentimentSignals>,
    pub technical: Option<TechnicalSummary>,
}

impl ExtractorOutputs {
    /// Run the text extractors
    pub fn for_text(text: &str) -> Self {
        Self {
            kind: ContentKind::Text,
            linguistic: Some(LinguisticExtractor::analyze(text)),
            sentiment: Some(SentimentExtractor::analyze(text)),
            technical: None,
        }
    }

    /// Wrap per-frame technical signals for an image or video
    pub fn for_media(kind: ContentKind, frames: Vec<TechnicalSignals>) -> Self {
        Self {
            kind,
            linguistic: None,
            sentiment: None,
            technical: Some(TechnicalSummary::from_frames(frames)),
        }
    }
}

/// Lower-cased word tokens; apostrophes stay inside words ("don't")
pub(crate) fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokens_keep_contractions() {
        let tokens = word_tokens("They DON'T want you to know... 'now'!");
        assert_eq!(tokens, vec!["they", "don't", "want", "you", "to", "know", "now"]);
    }

    #[test]
    fn test_word_tokens_empty() {
        assert!(word_tokens("").is_empty());
        assert!(word_tokens("!!! ??").is_empty());
    }

    #[test]
    fn test_for_text_fills_text_signals_only() {
        let outputs = ExtractorOutputs::for_text("Hello world.");
        assert!(outputs.linguistic.is_some());
        assert!(outputs.sentiment.is_some());
        assert!(outputs.technical.is_none());
    }
}
