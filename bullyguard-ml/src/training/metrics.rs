//! Per-run evaluation metrics.

use crate::algorithms::ConfusionMatrix;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Held-out metrics from one training run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    /// Ranking criterion for the leaderboard.
    pub f1_score: f64,
    /// `[[tn, fp], [fn, tp]]` with cyberbullying as the positive class.
    pub confusion_matrix: [[usize; 2]; 2],
    pub train_samples: usize,
    pub test_samples: usize,
    pub training_time_secs: f64,
}

impl MetricsRecord {
    pub fn from_confusion(cm: &ConfusionMatrix, train_samples: usize, elapsed: Duration) -> Self {
        Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1_score: cm.f1_score(),
            confusion_matrix: cm.as_rows(),
            train_samples,
            test_samples: cm.total(),
            training_time_secs: elapsed.as_secs_f64(),
        }
    }
}
