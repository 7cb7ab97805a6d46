//! Dataset provider abstraction and the CSV-backed implementation.

use crate::config::{DataConfig, DatasetFileConfig};
use crate::data::dataset::{DatasetId, DatasetStats, Sample, TrainTestSplit};
use crate::data::normalize::TextNormalizer;
use crate::error::MlError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Supplies the fixed train/test split and summary statistics per dataset.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Return the train/test split for `id`. Repeated calls return the same split.
    async fn split(&self, id: DatasetId) -> Result<Arc<TrainTestSplit>, MlError>;

    /// Return summary statistics for `id`.
    async fn stats(&self, id: DatasetId) -> Result<DatasetStats, MlError>;
}

/// Parse a label cell into `true` (cyberbullying) or `false`.
pub fn parse_label(raw: &str) -> Option<bool> {
    let norm = raw.trim().to_lowercase().replace(['-', ' '], "_");
    match norm.as_str() {
        "1" | "1.0" | "true" | "yes" | "bullying" | "cyberbullying" => Some(true),
        "0" | "0.0" | "false" | "no" | "none" | "not_bullying" | "not_cyberbullying" => {
            Some(false)
        }
        _ => None,
    }
}

struct LoadedDataset {
    name: String,
    samples: Vec<Sample>,
    split: Arc<TrainTestSplit>,
}

/// Reads the two configured CSV files; `Combined` concatenates them.
///
/// Texts are cleaned with the given normalizer at load time and each dataset
/// is memoized for the lifetime of the provider.
pub struct CsvDatasetProvider {
    config: DataConfig,
    normalizer: Arc<dyn TextNormalizer>,
    loaded: Mutex<HashMap<DatasetId, Arc<LoadedDataset>>>,
}

impl CsvDatasetProvider {
    pub fn new(config: DataConfig, normalizer: Arc<dyn TextNormalizer>) -> Self {
        Self {
            config,
            normalizer,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, file: &DatasetFileConfig) -> PathBuf {
        if file.file.is_absolute() {
            file.file.clone()
        } else {
            self.config.data_dir.join(&file.file)
        }
    }

    async fn read_samples(&self, file: &DatasetFileConfig) -> Result<Vec<Sample>, MlError> {
        let path = self.resolve(file);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            MlError::dataset(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    MlError::dataset(format!(
                        "{} has no '{name}' column",
                        path.display()
                    ))
                })
        };
        let text_idx = column(&file.text_column)?;
        let label_idx = column(&file.label_column)?;

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = record?;
            let (Some(raw_text), Some(raw_label)) = (record.get(text_idx), record.get(label_idx))
            else {
                skipped += 1;
                continue;
            };
            let Some(bullying) = parse_label(raw_label) else {
                skipped += 1;
                continue;
            };
            let text = self.normalizer.normalize(raw_text);
            if text.is_empty() {
                skipped += 1;
                continue;
            }
            samples.push(Sample { text, bullying });
        }

        if skipped > 0 {
            tracing::debug!(
                path = %path.display(),
                skipped,
                "Skipped rows with unusable text or label"
            );
        }
        if samples.is_empty() {
            return Err(MlError::dataset(format!(
                "{} contains no usable rows",
                path.display()
            )));
        }
        Ok(samples)
    }

    async fn load(&self, id: DatasetId) -> Result<Arc<LoadedDataset>, MlError> {
        let mut loaded = self.loaded.lock().await;
        if let Some(dataset) = loaded.get(&id) {
            return Ok(Arc::clone(dataset));
        }

        let (name, samples) = match id {
            DatasetId::One => (
                self.config.dataset_one.name.clone(),
                self.read_samples(&self.config.dataset_one).await?,
            ),
            DatasetId::Two => (
                self.config.dataset_two.name.clone(),
                self.read_samples(&self.config.dataset_two).await?,
            ),
            DatasetId::Combined => {
                let mut samples = self.read_samples(&self.config.dataset_one).await?;
                samples.extend(self.read_samples(&self.config.dataset_two).await?);
                let name = format!(
                    "Combined ({} + {})",
                    self.config.dataset_one.name, self.config.dataset_two.name
                );
                (name, samples)
            }
        };

        let split = TrainTestSplit::stratified(
            id,
            &samples,
            self.config.test_ratio,
            self.config.seed,
        );
        tracing::info!(
            dataset = %id,
            samples = samples.len(),
            train = split.train.len(),
            test = split.test.len(),
            "Loaded dataset"
        );

        let dataset = Arc::new(LoadedDataset {
            name,
            samples,
            split: Arc::new(split),
        });
        loaded.insert(id, Arc::clone(&dataset));
        Ok(dataset)
    }
}

#[async_trait]
impl DatasetProvider for CsvDatasetProvider {
    async fn split(&self, id: DatasetId) -> Result<Arc<TrainTestSplit>, MlError> {
        Ok(Arc::clone(&self.load(id).await?.split))
    }

    async fn stats(&self, id: DatasetId) -> Result<DatasetStats, MlError> {
        let dataset = self.load(id).await?;
        Ok(DatasetStats::compute(
            &dataset.name,
            &dataset.samples,
            &dataset.split,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::TextCleaner;
    use std::path::Path;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    fn provider(dir: &Path) -> CsvDatasetProvider {
        let config = DataConfig {
            data_dir: dir.to_path_buf(),
            ..DataConfig::default()
        };
        CsvDatasetProvider::new(config, Arc::new(TextCleaner::new(false)))
    }

    fn seed_files(dir: &Path) {
        write(
            dir,
            "dataset_1.csv",
            "text,label\n\
             \"you are pathetic, loser\",1\n\
             nobody likes you,1\n\
             great game today,0\n\
             see you at lunch,0\n\
             ???,1\n\
             thanks friend,maybe\n",
        );
        write(
            dir,
            "dataset_2.csv",
            "id,Text,Label\n\
             1,go away freak,cyberbullying\n\
             2,lovely photo,not_cyberbullying\n\
             3,what a nice idea,Not Cyberbullying\n",
        );
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("1"), Some(true));
        assert_eq!(parse_label(" TRUE "), Some(true));
        assert_eq!(parse_label("Cyberbullying"), Some(true));
        assert_eq!(parse_label("0"), Some(false));
        assert_eq!(parse_label("not-cyberbullying"), Some(false));
        assert_eq!(parse_label("Not Cyberbullying"), Some(false));
        assert_eq!(parse_label("maybe"), None);
    }

    #[tokio::test]
    async fn test_loads_and_skips_unusable_rows() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path());
        let provider = provider(dir.path());

        let stats = provider.stats(DatasetId::One).await.unwrap();
        assert_eq!(stats.total_samples, 4);
        assert_eq!(stats.bullying_count, 2);
        assert_eq!(stats.name, "Cyberbullying Tweets");

        let split = provider.split(DatasetId::One).await.unwrap();
        assert_eq!(split.train.len() + split.test.len(), 4);
        assert!(
            split
                .train
                .iter()
                .chain(split.test.iter())
                .any(|s| s.text == "you are pathetic loser")
        );
    }

    #[tokio::test]
    async fn test_column_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path());
        let provider = provider(dir.path());
        let stats = provider.stats(DatasetId::Two).await.unwrap();
        assert_eq!(stats.total_samples, 3);
        assert_eq!(stats.bullying_count, 1);
    }

    #[tokio::test]
    async fn test_combined_concatenates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path());
        let provider = provider(dir.path());
        let stats = provider.stats(DatasetId::Combined).await.unwrap();
        assert_eq!(stats.total_samples, 7);
        assert_eq!(stats.dataset_id, DatasetId::Combined);
        assert!(stats.name.starts_with("Combined"));
    }

    #[tokio::test]
    async fn test_split_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path());
        let provider = provider(dir.path());
        let a = provider.split(DatasetId::One).await.unwrap();
        std::fs::remove_file(dir.path().join("dataset_1.csv")).unwrap();
        let b = provider.split(DatasetId::One).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_missing_file_is_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(dir.path());
        let err = provider.split(DatasetId::One).await.unwrap_err();
        assert!(matches!(err, MlError::Dataset(_)));
    }

    #[tokio::test]
    async fn test_missing_column_is_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "dataset_1.csv", "body,label\nhello,0\n");
        let provider = provider(dir.path());
        let err = provider.split(DatasetId::One).await.unwrap_err();
        assert!(err.to_string().contains("'text'"));
    }
}
