//! Model comparison: the orchestrator and its ranked results cache.

pub mod cache;
pub mod error;
pub mod orchestrator;

pub use cache::{ComparisonResult, Leaderboard, ResultsCache, mark_best, rank_by_f1};
pub use error::{ComparisonError, ErrorClass};
pub use orchestrator::{ComparisonOrchestrator, Prediction};
