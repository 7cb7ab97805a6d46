//! Data layer: dataset identifiers, CSV loading and splitting, text cleaning.

pub mod dataset;
pub mod normalize;
pub mod source;

pub use dataset::{DatasetId, DatasetStats, ParseDatasetIdError, Sample, TrainTestSplit};
pub use normalize::{TextCleaner, TextNormalizer};
pub use source::{CsvDatasetProvider, DatasetProvider, parse_label};
