//! Classical classifiers and their evaluation.

pub mod classical;
pub mod evaluation;

pub use classical::{ClassicalAlgorithm, FittedClassifier};
pub use evaluation::ConfusionMatrix;
