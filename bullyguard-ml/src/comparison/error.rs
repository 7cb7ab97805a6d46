//! Classified errors raised by the comparison orchestrator.

use crate::data::{DatasetId, ParseDatasetIdError};
use crate::error::MlError;
use crate::zoo::ModelKey;
use serde::Serialize;

/// Who is responsible for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The request named something unknown or carried unusable input.
    Validation,
    /// A collaborator failed while serving a well-formed request.
    Failure,
}

#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("Unknown model: {key}")]
    InvalidModelKey { key: ModelKey },

    #[error(transparent)]
    InvalidDatasetId(#[from] ParseDatasetIdError),

    #[error("Text cannot be empty")]
    EmptyInput,

    #[error("Model '{key}' has not been trained yet")]
    ModelNotTrained { key: ModelKey },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Training failed ({context}): {source}")]
    TrainingFailure {
        context: String,
        #[source]
        source: MlError,
    },

    #[error("Prediction with {key} failed: {source}")]
    InferenceFailure {
        key: ModelKey,
        #[source]
        source: MlError,
    },

    #[error("Dataset {dataset} is unavailable: {source}")]
    DatasetUnavailable {
        dataset: DatasetId,
        #[source]
        source: MlError,
    },
}

impl ComparisonError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidModelKey { .. }
            | Self::InvalidDatasetId(_)
            | Self::EmptyInput
            | Self::ModelNotTrained { .. }
            | Self::InvalidInput { .. } => ErrorClass::Validation,
            Self::TrainingFailure { .. }
            | Self::InferenceFailure { .. }
            | Self::DatasetUnavailable { .. } => ErrorClass::Failure,
        }
    }

    /// Stable snake_case name of the variant, for API bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidModelKey { .. } => "invalid_model_key",
            Self::InvalidDatasetId(_) => "invalid_dataset_id",
            Self::EmptyInput => "empty_input",
            Self::ModelNotTrained { .. } => "model_not_trained",
            Self::InvalidInput { .. } => "invalid_input",
            Self::TrainingFailure { .. } => "training_failure",
            Self::InferenceFailure { .. } => "inference_failure",
            Self::DatasetUnavailable { .. } => "dataset_unavailable",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::Validation
    }

    pub(crate) fn training(context: impl Into<String>, source: MlError) -> Self {
        Self::TrainingFailure {
            context: context.into(),
            source,
        }
    }

    /// Classify a trainer error raised during inference.
    pub(crate) fn from_prediction(key: &ModelKey, source: MlError) -> Self {
        match source {
            MlError::UnknownModel(_) => Self::InvalidModelKey { key: key.clone() },
            MlError::ModelNotTrained(_) => Self::ModelNotTrained { key: key.clone() },
            MlError::InvalidInput(message) => Self::InvalidInput { message },
            other => Self::InferenceFailure {
                key: key.clone(),
                source: other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_errors_are_classified() {
        let key = ModelKey::from("nb_bow");
        let err = ComparisonError::from_prediction(&key, MlError::UnknownModel("nb_bow".into()));
        assert!(matches!(err, ComparisonError::InvalidModelKey { .. }));
        assert_eq!(err.class(), ErrorClass::Validation);

        let err = ComparisonError::from_prediction(&key, MlError::ModelNotTrained("nb_bow".into()));
        assert_eq!(err.kind(), "model_not_trained");
        assert!(err.is_client_error());

        let err = ComparisonError::from_prediction(&key, MlError::invalid_input("too long"));
        assert_eq!(err.kind(), "invalid_input");

        let err = ComparisonError::from_prediction(&key, MlError::inference("matrix exploded"));
        assert_eq!(err.class(), ErrorClass::Failure);
        assert!(err.to_string().contains("matrix exploded"));
    }

    #[test]
    fn test_training_failure_keeps_source() {
        use std::error::Error;

        let err = ComparisonError::training("loading dataset 1", MlError::dataset("no file"));
        assert_eq!(err.kind(), "training_failure");
        assert!(!err.is_client_error());
        assert!(err.source().unwrap().to_string().contains("no file"));
    }

    #[test]
    fn test_dataset_parse_error_is_validation() {
        let err: ComparisonError = "7".parse::<DatasetId>().unwrap_err().into();
        assert_eq!(err.kind(), "invalid_dataset_id");
        assert!(err.is_client_error());
        assert!(err.to_string().contains("'7'"));
    }
}
