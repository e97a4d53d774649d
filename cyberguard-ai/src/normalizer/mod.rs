//! Response normalization
//!
//! Turns each provider's raw payload into a [`Verdict`]. Normalization never
//! fails: anything that cannot be interpreted degrades to an `UNKNOWN`
//! verdict with confidence 0. Outcomes that did not succeed yield no verdict.

pub mod ai_verdict;
pub mod structured;

use crate::types::{
    ContentKind, NormalizedSource, ProviderKind, ProviderOutcome, ProviderStatus, RawPayload,
    Verdict,
};
use tracing::debug;

/// Normalize one raw payload
pub fn normalize(provider: ProviderKind, kind: ContentKind, payload: &RawPayload) -> Verdict {
    match (provider, payload) {
        (ProviderKind::AiVerdict, RawPayload::Text(text)) => ai_verdict::parse(text, kind),
        (ProviderKind::Claims, RawPayload::Json(value)) => structured::normalize_claims(value),
        (ProviderKind::News, RawPayload::Json(value)) => structured::normalize_news(value),
        (_, RawPayload::Empty) => Verdict::unknown(provider, "Empty provider response"),
        (_, other) => {
            debug!(provider = %provider, payload = ?payload_shape(other), "Unexpected payload shape");
            Verdict::unknown(provider, "Unrecognized provider response")
        }
    }
}

/// Pair an outcome's status with its verdict (present only on success)
pub fn normalize_outcome(outcome: &ProviderOutcome, kind: ContentKind) -> NormalizedSource {
    let verdict = match outcome.status() {
        ProviderStatus::Success => Some(normalize(outcome.provider(), kind, outcome.raw_payload())),
        _ => None,
    };
    NormalizedSource {
        provider: outcome.provider(),
        status: outcome.status(),
        verdict,
    }
}

fn payload_shape(payload: &RawPayload) -> &'static str {
    match payload {
        RawPayload::Text(_) => "text",
        RawPayload::Json(_) => "json",
        RawPayload::Empty => "empty",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VerdictLabel;
    use std::time::Duration;

    #[test]
    fn test_failed_outcome_yields_no_verdict() {
        let outcome = ProviderOutcome::error(ProviderKind::Claims, "403", Duration::from_millis(5));
        let source = normalize_outcome(&outcome, ContentKind::Text);
        assert_eq!(source.status, ProviderStatus::Error);
        assert!(source.verdict.is_none());

        let timeout = ProviderOutcome::timeout(ProviderKind::AiVerdict, Duration::from_secs(60));
        assert!(normalize_outcome(&timeout, ContentKind::Text).verdict.is_none());
    }

    #[test]
    fn test_claims_text_body_degrades_to_unknown() {
        let verdict = normalize(
            ProviderKind::Claims,
            ContentKind::Text,
            &RawPayload::Text("<html>oops</html>".into()),
        );
        assert_eq!(verdict.label, VerdictLabel::Unknown);
        assert_eq!(verdict.confidence_pct, 0);
    }

    #[test]
    fn test_success_outcome_is_normalized() {
        let outcome = ProviderOutcome::success(
            ProviderKind::AiVerdict,
            RawPayload::Text("VERDICT: FAKE NEWS\nCONFIDENCE: 92%".into()),
            Duration::from_millis(10),
        );
        let source = normalize_outcome(&outcome, ContentKind::Text);
        let verdict = source.verdict.unwrap();
        assert_eq!(verdict.label, VerdictLabel::FakeNews);
        assert_eq!(verdict.confidence_pct, 92);
    }
}
