//! Training: the trainer abstraction, per-run metrics and the native engine.

pub mod engine;
pub mod metrics;
pub mod trainer;

pub use engine::{ClassifierEngine, TrainedModel, fit_and_evaluate};
pub use metrics::MetricsRecord;
pub use trainer::{BULLYING_LABEL, ModelTrainer, NOT_BULLYING_LABEL, Verdict};
