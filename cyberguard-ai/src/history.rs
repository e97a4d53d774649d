//! Assessment history
//!
//! Completed assessments are handed to an [`AssessmentSink`] keyed by content
//! fingerprint. The shipped sink keeps a bounded in-memory list, newest first;
//! re-analysing the same content replaces its previous entry.

use crate::types::RiskAssessment;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

/// Default number of assessments kept in memory
pub const DEFAULT_CAPACITY: usize = 200;

/// Persistence collaborator for completed assessments
#[async_trait]
pub trait AssessmentSink: Send + Sync {
    async fn record(&self, assessment: &RiskAssessment);

    /// Latest assessment for a fingerprint
    async fn get(&self, fingerprint: &str) -> Option<RiskAssessment>;

    /// Up to `limit` assessments, newest first
    async fn recent(&self, limit: usize) -> Vec<RiskAssessment>;
}

/// Bounded in-memory history
pub struct MemoryHistory {
    capacity: usize,
    entries: RwLock<VecDeque<RiskAssessment>>,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl AssessmentSink for MemoryHistory {
    async fn record(&self, assessment: &RiskAssessment) {
        let mut entries = self.entries.write().await;
        entries.retain(|a| a.fingerprint() != assessment.fingerprint());
        entries.push_front(assessment.clone());
        entries.truncate(self.capacity);
        debug!(
            fingerprint = assessment.fingerprint(),
            entries = entries.len(),
            "Assessment recorded"
        );
    }

    async fn get(&self, fingerprint: &str) -> Option<RiskAssessment> {
        self.entries
            .read()
            .await
            .iter()
            .find(|a| a.fingerprint() == fingerprint)
            .cloned()
    }

    async fn recent(&self, limit: usize) -> Vec<RiskAssessment> {
        self.entries.read().await.iter().take(limit).cloned().collect()
    }
}
