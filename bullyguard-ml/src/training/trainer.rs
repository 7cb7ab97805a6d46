//! The model trainer abstraction and its inference verdict.

use crate::data::TrainTestSplit;
use crate::error::MlError;
use crate::training::metrics::MetricsRecord;
use crate::zoo::ModelKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const BULLYING_LABEL: &str = "Cyberbullying";
pub const NOT_BULLYING_LABEL: &str = "Not Cyberbullying";

/// A classification of one cleaned text by one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub model_key: ModelKey,
    pub model_name: String,
    /// `1` for cyberbullying, `0` otherwise.
    pub prediction: u8,
    pub label: String,
    /// Probability of the predicted class; absent for margin-only models.
    pub confidence: Option<f64>,
    /// The cleaned text the model actually saw.
    pub text: String,
}

impl Verdict {
    pub fn new(
        model_key: ModelKey,
        model_name: impl Into<String>,
        bullying: bool,
        confidence: Option<f64>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            model_key,
            model_name: model_name.into(),
            prediction: u8::from(bullying),
            label: if bullying {
                BULLYING_LABEL
            } else {
                NOT_BULLYING_LABEL
            }
            .to_string(),
            confidence,
            text: text.into(),
        }
    }

    pub fn is_bullying(&self) -> bool {
        self.prediction == 1
    }
}

/// Fits models and runs inference with them.
///
/// Implementations decide whether a key is known and whether it has been
/// trained; they report those cases as `MlError::UnknownModel` and
/// `MlError::ModelNotTrained` respectively.
#[async_trait]
pub trait ModelTrainer: Send + Sync {
    /// Fit the model for `key` on `split.train` and evaluate it on `split.test`.
    async fn train(
        &self,
        key: &ModelKey,
        split: Arc<TrainTestSplit>,
    ) -> Result<MetricsRecord, MlError>;

    /// Classify already-cleaned text with the most recently fitted model for `key`.
    async fn predict(&self, key: &ModelKey, cleaned_text: &str) -> Result<Verdict, MlError>;
}
