//! Configuration types for the bullyguard-ml crate.
//!
//! These are the ML-specific sub-configs embedded in the service-level `AppConfig`.

use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level ML configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MlConfig {
    /// Dataset loading and splitting.
    #[serde(default)]
    pub data: DataConfig,
    /// Hyperparameters shared by the native classifiers.
    #[serde(default)]
    pub training: TrainingConfig,
}

impl MlConfig {
    /// Reject settings the provider or engine cannot work with.
    pub fn validate(&self) -> Result<(), MlError> {
        let ratio = self.data.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(MlError::Config(format!(
                "data.test_ratio must be strictly between 0 and 1, got {ratio}"
            )));
        }
        if self.training.max_features == 0 {
            return Err(MlError::Config(
                "training.max_features must be positive".to_string(),
            ));
        }
        if self.training.epochs == 0 {
            return Err(MlError::Config("training.epochs must be positive".to_string()));
        }
        if self.training.learning_rate <= 0.0 || !self.training.learning_rate.is_finite() {
            return Err(MlError::Config(
                "training.learning_rate must be a positive number".to_string(),
            ));
        }
        if self.training.nb_alpha <= 0.0 {
            return Err(MlError::Config("training.nb_alpha must be positive".to_string()));
        }
        Ok(())
    }
}

/// Dataset loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the dataset CSV files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Fraction of each class held out for evaluation.
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Seed for the stratified shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Drop common English stopwords while cleaning text.
    #[serde(default = "default_true")]
    pub remove_stopwords: bool,
    /// First dataset (`"1"`).
    #[serde(default = "default_dataset_one")]
    pub dataset_one: DatasetFileConfig,
    /// Second dataset (`"2"`).
    #[serde(default = "default_dataset_two")]
    pub dataset_two: DatasetFileConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
            remove_stopwords: true,
            dataset_one: default_dataset_one(),
            dataset_two: default_dataset_two(),
        }
    }
}

/// Where one labeled CSV lives and which columns to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFileConfig {
    /// Display name reported in dataset statistics.
    pub name: String,
    /// File name relative to `data_dir` (absolute paths are used as-is).
    pub file: PathBuf,
    #[serde(default = "default_text_column")]
    pub text_column: String,
    #[serde(default = "default_label_column")]
    pub label_column: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_true() -> bool {
    true
}

fn default_text_column() -> String {
    "text".to_string()
}

fn default_label_column() -> String {
    "label".to_string()
}

fn default_dataset_one() -> DatasetFileConfig {
    DatasetFileConfig {
        name: "Cyberbullying Tweets".to_string(),
        file: PathBuf::from("dataset_1.csv"),
        text_column: default_text_column(),
        label_column: default_label_column(),
    }
}

fn default_dataset_two() -> DatasetFileConfig {
    DatasetFileConfig {
        name: "Social Media Comments".to_string(),
        file: PathBuf::from("dataset_2.csv"),
        text_column: default_text_column(),
        label_column: default_label_column(),
    }
}

/// Hyperparameters for the native vectorizers and classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Vocabulary cap (most frequent terms win).
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    /// Minimum number of training documents a term must appear in.
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    /// Passes over the training set for the SGD-based models.
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Initial step size for logistic regression.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// L2 penalty (logistic regression) and Pegasos lambda (linear SVM).
    #[serde(default = "default_l2")]
    pub l2: f64,
    /// Laplace smoothing for multinomial Naive Bayes.
    #[serde(default = "default_nb_alpha")]
    pub nb_alpha: f64,
    /// Seed for the per-epoch sample shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_df: default_min_df(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            l2: default_l2(),
            nb_alpha: default_nb_alpha(),
            seed: default_seed(),
        }
    }
}

fn default_max_features() -> usize {
    5000
}

fn default_min_df() -> usize {
    1
}

fn default_epochs() -> usize {
    15
}

fn default_learning_rate() -> f64 {
    0.5
}

fn default_l2() -> f64 {
    1e-4
}

fn default_nb_alpha() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data.test_ratio, 0.2);
        assert_eq!(config.data.seed, 42);
        assert_eq!(config.training.max_features, 5000);
        assert_eq!(config.data.dataset_one.file, PathBuf::from("dataset_1.csv"));
    }

    #[test]
    fn test_rejects_bad_test_ratio() {
        let mut config = MlConfig::default();
        config.data.test_ratio = 1.0;
        assert!(matches!(config.validate(), Err(MlError::Config(_))));
        config.data.test_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_epochs() {
        let mut config = MlConfig::default();
        config.training.epochs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"data": {"seed": 7}, "training": {"epochs": 3}}"#;
        let config: MlConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.data.seed, 7);
        assert_eq!(config.data.test_ratio, 0.2);
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.max_features, 5000);
        assert_eq!(config.data.dataset_two.text_column, "text");
    }
}
