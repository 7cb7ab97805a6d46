//! # bullyguard-ml: Cyberbullying Classifier Comparison
//!
//! This crate trains several text classifiers on labeled social-media datasets,
//! ranks them by F1 score, and serves predictions from the trained models.
//!
//! ## Collaborators
//!
//! The [`ComparisonOrchestrator`] only talks to narrow traits:
//! 1. **Dataset Provider**: fixed train/test splits and statistics ([`DatasetProvider`])
//! 2. **Text Normalizer**: canonical cleaned text ([`TextNormalizer`])
//! 3. **Model Trainer**: fitting and inference ([`ModelTrainer`])
//! 4. **Model Registry**: the ordered set of known configurations ([`ModelRegistry`])
//!
//! Default in-process implementations of all four ship with the crate.

// Foundation
pub mod config;
pub mod error;

// Data Engineering
pub mod data;
pub mod features;

// Model Zoo & Algorithms
pub mod algorithms;
pub mod zoo;

// Training
pub mod training;

// Comparison
pub mod comparison;

// Re-exports
pub use comparison::{
    ComparisonError, ComparisonOrchestrator, ComparisonResult, ErrorClass, Leaderboard,
    Prediction, ResultsCache,
};
pub use config::MlConfig;
pub use data::{DatasetId, DatasetProvider, DatasetStats, TextCleaner, TextNormalizer};
pub use error::MlError;
pub use training::{MetricsRecord, ModelTrainer, Verdict};
pub use zoo::{ModelDescriptor, ModelKey, ModelRegistry};
