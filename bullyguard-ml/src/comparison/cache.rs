//! Ranked results cache (the leaderboard).
//!
//! The cache holds an immutable `Arc<Vec<_>>` behind a lock. Writers build the
//! next sequence while holding the write lock and swap it in whole, so a reader
//! only ever sees a fully sorted sequence.

use crate::data::DatasetId;
use crate::training::MetricsRecord;
use crate::zoo::ModelKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of training one model on one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub model_key: ModelKey,
    pub model_name: String,
    pub dataset_id: DatasetId,
    pub metrics: MetricsRecord,
    #[serde(default)]
    pub is_best: bool,
    pub trained_at: DateTime<Utc>,
}

impl ComparisonResult {
    pub fn new(
        model_key: ModelKey,
        model_name: impl Into<String>,
        dataset_id: DatasetId,
        metrics: MetricsRecord,
    ) -> Self {
        Self {
            model_key,
            model_name: model_name.into(),
            dataset_id,
            metrics,
            is_best: false,
            trained_at: Utc::now(),
        }
    }
}

/// Ranked results plus the leading entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub results: Vec<ComparisonResult>,
    pub best_model: Option<ComparisonResult>,
}

impl Leaderboard {
    /// Wrap an already ranked sequence; the first entry is the best.
    pub fn from_ranked(results: Vec<ComparisonResult>) -> Self {
        let best_model = results.first().cloned();
        Self {
            results,
            best_model,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Stable sort, highest f1 first. Equal scores keep their relative order.
pub fn rank_by_f1(results: &mut [ComparisonResult]) {
    results.sort_by(|a, b| b.metrics.f1_score.total_cmp(&a.metrics.f1_score));
}

/// Flag the first entry as best and clear the flag everywhere else.
pub fn mark_best(results: &mut [ComparisonResult]) {
    for (i, result) in results.iter_mut().enumerate() {
        result.is_best = i == 0;
    }
}

/// Process-lifetime leaderboard, unique by model key.
#[derive(Debug, Default)]
pub struct ResultsCache {
    entries: RwLock<Arc<Vec<ComparisonResult>>>,
}

impl ResultsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current sequence. Never blocks on training, only on a concurrent swap.
    pub async fn snapshot(&self) -> Arc<Vec<ComparisonResult>> {
        Arc::clone(&*self.entries.read().await)
    }

    pub async fn leaderboard(&self) -> Leaderboard {
        Leaderboard::from_ranked(self.snapshot().await.as_ref().clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop any entry for the same model, append `result`, and re-rank.
    ///
    /// Existing `is_best` flags are left as they are; only a full batch run
    /// assigns that flag.
    pub async fn upsert(&self, result: ComparisonResult) {
        let mut guard = self.entries.write().await;
        let mut next: Vec<ComparisonResult> = guard
            .iter()
            .filter(|r| r.model_key != result.model_key)
            .cloned()
            .collect();
        next.push(result);
        rank_by_f1(&mut next);
        *guard = Arc::new(next);
    }

    /// Swap in a complete, already ranked sequence.
    pub async fn replace(&self, results: Vec<ComparisonResult>) {
        *self.entries.write().await = Arc::new(results);
    }
}
