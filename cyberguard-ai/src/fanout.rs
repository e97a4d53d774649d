//! Fan-out coordinator
//!
//! Sends one request to every applicable provider concurrently and waits for
//! all of them, bounded by a per-call timeout and an aggregate deadline
//! (the earlier of the two wins for each call).
//!
//! Every provider resolves to exactly one [`ProviderOutcome`]: a failure,
//! timeout or panic in one provider never affects its siblings. Providers
//! that are not configured resolve to `Unavailable` without being called.
//! There are no retries.

use crate::providers::{Provider, ProviderRequest};
use crate::types::ProviderOutcome;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Extra time granted past a provider deadline before its task is aborted
const ABORT_GRACE: Duration = Duration::from_millis(250);

/// Timeout policy for one fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutPolicy {
    /// Budget for any single provider call
    pub per_call: Duration,
    /// Budget for the whole batch
    pub aggregate: Duration,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            per_call: Duration::from_secs(60),
            aggregate: Duration::from_secs(90),
        }
    }
}

/// Concurrent provider fan-out
#[derive(Clone)]
pub struct FanOut {
    providers: Vec<Arc<dyn Provider>>,
}

impl FanOut {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// Query every provider that supports the request's content kind
    ///
    /// Outcomes are returned in provider registration order. Providers that do
    /// not support the content kind are not part of the result.
    pub async fn assess(&self, request: ProviderRequest, policy: FanOutPolicy) -> Vec<ProviderOutcome> {
        let kind = request.kind();
        let start = Instant::now();
        let aggregate_deadline = start + policy.aggregate;
        let request = Arc::new(request);

        let applicable: Vec<&Arc<dyn Provider>> = self
            .providers
            .iter()
            .filter(|p| p.supports(kind))
            .collect();
        debug!(kind = %kind, providers = applicable.len(), "Starting provider fan-out");

        let units = applicable.into_iter().map(|provider| {
            let provider = Arc::clone(provider);
            let request = Arc::clone(&request);
            async move {
                let provider_kind = provider.kind();
                if !provider.is_configured() {
                    return ProviderOutcome::unavailable(provider_kind);
                }

                let per_call = provider
                    .call_timeout()
                    .map_or(policy.per_call, |t| t.min(policy.per_call));
                let deadline = (start + per_call).min(aggregate_deadline);

                let handle = tokio::spawn(async move { provider.invoke(&request, deadline).await });
                let abort = handle.abort_handle();

                match tokio::time::timeout_at(deadline + ABORT_GRACE, handle).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(join_error)) => {
                        warn!(provider = %provider_kind, error = %join_error, "Provider task failed");
                        ProviderOutcome::error(
                            provider_kind,
                            format!("Provider task failed: {}", join_error),
                            start.elapsed(),
                        )
                    }
                    Err(_) => {
                        // The provider ignored cancellation; stop waiting for it
                        abort.abort();
                        warn!(provider = %provider_kind, "Provider task aborted past deadline");
                        ProviderOutcome::timeout(provider_kind, start.elapsed())
                    }
                }
            }
        });

        let outcomes = join_all(units).await;

        info!(
            kind = %kind,
            elapsed_ms = start.elapsed().as_millis() as u64,
            succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
            total = outcomes.len(),
            "Provider fan-out complete"
        );
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{MockBehavior, MockProvider};
    use crate::types::{ContentKind, ProviderKind, ProviderStatus, RawPayload};

    fn text_request() -> ProviderRequest {
        ProviderRequest::Text("Some claim to check".into())
    }

    fn respond(kind: ProviderKind) -> MockProvider {
        MockProvider::new(kind, MockBehavior::Respond(RawPayload::Text("ok".into())))
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_in_registration_order() {
        let fanout = FanOut::new(vec![
            Arc::new(respond(ProviderKind::AiVerdict).with_delay(Duration::from_secs(3))),
            Arc::new(respond(ProviderKind::Claims).with_delay(Duration::from_secs(1))),
            Arc::new(respond(ProviderKind::News)),
        ]);

        let outcomes = fanout.assess(text_request(), FanOutPolicy::default()).await;
        let kinds: Vec<ProviderKind> = outcomes.iter().map(|o| o.provider()).collect();
        assert_eq!(
            kinds,
            vec![ProviderKind::AiVerdict, ProviderKind::Claims, ProviderKind::News]
        );
        assert!(outcomes.iter().all(|o| o.is_success()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_run_concurrently() {
        let fanout = FanOut::new(vec![
            Arc::new(respond(ProviderKind::AiVerdict).with_delay(Duration::from_secs(5))),
            Arc::new(respond(ProviderKind::Claims).with_delay(Duration::from_secs(5))),
            Arc::new(respond(ProviderKind::News).with_delay(Duration::from_secs(5))),
        ]);

        let start = Instant::now();
        fanout.assess(text_request(), FanOutPolicy::default()).await;
        assert!(start.elapsed() < Duration::from_secs(6), "elapsed {:?}", start.elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_aggregate_deadline_wins() {
        let fanout = FanOut::new(vec![
            Arc::new(respond(ProviderKind::AiVerdict).with_delay(Duration::from_secs(30))),
            Arc::new(respond(ProviderKind::News)),
        ]);
        let policy = FanOutPolicy {
            per_call: Duration::from_secs(60),
            aggregate: Duration::from_secs(10),
        };

        let outcomes = fanout.assess(text_request(), policy).await;
        assert_eq!(outcomes[0].status(), ProviderStatus::Timeout);
        assert_eq!(outcomes[1].status(), ProviderStatus::Success);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let fanout = FanOut::new(vec![
            Arc::new(MockProvider::new(ProviderKind::AiVerdict, MockBehavior::Panic)),
            Arc::new(respond(ProviderKind::Claims)),
        ]);

        let outcomes = fanout.assess(text_request(), FanOutPolicy::default()).await;
        assert_eq!(outcomes[0].status(), ProviderStatus::Error);
        assert!(outcomes[0].message().unwrap().contains("Provider task failed"));
        assert_eq!(outcomes[1].status(), ProviderStatus::Success);
    }

    #[tokio::test]
    async fn test_unconfigured_and_unsupported() {
        let claims = MockProvider::unconfigured(ProviderKind::Claims);
        let calls = claims.calls.clone();
        let fanout = FanOut::new(vec![Arc::new(respond(ProviderKind::AiVerdict)), Arc::new(claims)]);

        let text = fanout.assess(text_request(), FanOutPolicy::default()).await;
        assert_eq!(text[1].status(), ProviderStatus::Unavailable);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let image = fanout
            .assess(
                ProviderRequest::Media {
                    kind: ContentKind::Image,
                    frames: Vec::new(),
                },
                FanOutPolicy::default(),
            )
            .await;
        assert_eq!(image.len(), 1, "claims provider does not take images");
        assert_eq!(image[0].provider(), ProviderKind::AiVerdict);
    }
}
