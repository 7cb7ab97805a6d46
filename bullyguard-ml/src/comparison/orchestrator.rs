//! The comparison orchestrator.
//!
//! Owns the results cache and coordinates the dataset provider, text
//! normalizer, trainer and registry. It is the only writer of the cache.

use crate::comparison::cache::{
    ComparisonResult, Leaderboard, ResultsCache, mark_best, rank_by_f1,
};
use crate::comparison::error::ComparisonError;
use crate::config::MlConfig;
use crate::data::{
    CsvDatasetProvider, DatasetId, DatasetProvider, DatasetStats, TextCleaner, TextNormalizer,
};
use crate::error::MlError;
use crate::training::{ClassifierEngine, ModelTrainer, Verdict};
use crate::zoo::{ModelDescriptor, ModelKey, ModelRegistry, ModelZoo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// A verdict together with the text exactly as the caller sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub original_text: String,
}

pub struct ComparisonOrchestrator {
    datasets: Arc<dyn DatasetProvider>,
    normalizer: Arc<dyn TextNormalizer>,
    trainer: Arc<dyn ModelTrainer>,
    registry: Arc<dyn ModelRegistry>,
    cache: ResultsCache,
    /// Held from the trainer call until the cache write, so the cached
    /// metrics for a key always describe the model the trainer will serve.
    model_locks: Mutex<HashMap<ModelKey, Arc<Mutex<()>>>>,
}

impl ComparisonOrchestrator {
    pub fn new(
        datasets: Arc<dyn DatasetProvider>,
        normalizer: Arc<dyn TextNormalizer>,
        trainer: Arc<dyn ModelTrainer>,
        registry: Arc<dyn ModelRegistry>,
    ) -> Self {
        Self {
            datasets,
            normalizer,
            trainer,
            registry,
            cache: ResultsCache::new(),
            model_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_model(&self, key: &ModelKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.model_locks.lock().await;
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Wire the CSV provider, the text cleaner and the native engine from config.
    pub fn from_config(config: &MlConfig) -> Result<Self, MlError> {
        config.validate()?;
        let normalizer: Arc<dyn TextNormalizer> =
            Arc::new(TextCleaner::new(config.data.remove_stopwords));
        let datasets = Arc::new(CsvDatasetProvider::new(
            config.data.clone(),
            Arc::clone(&normalizer),
        ));
        let engine = Arc::new(ClassifierEngine::new(
            ModelZoo::standard(),
            config.training.clone(),
        ));
        Ok(Self::new(datasets, normalizer, engine.clone(), engine))
    }

    /// Train a single model and merge its result into the cache.
    pub async fn train_one(
        &self,
        key: &ModelKey,
        dataset_id: DatasetId,
    ) -> Result<ComparisonResult, ComparisonError> {
        let descriptor = self
            .registry
            .describe(key)
            .await
            .ok_or_else(|| ComparisonError::InvalidModelKey { key: key.clone() })?;

        let split = self.datasets.split(dataset_id).await.map_err(|e| {
            warn!(dataset = %dataset_id, error = %e, "Failed to load dataset split");
            ComparisonError::training(format!("loading dataset {dataset_id}"), e)
        })?;

        let _guard = self.lock_model(key).await;
        info!(model = %key, dataset = %dataset_id, "Training model");
        let metrics = self.trainer.train(key, split).await.map_err(|e| {
            warn!(model = %key, dataset = %dataset_id, error = %e, "Training failed");
            ComparisonError::training(format!("training {key} on dataset {dataset_id}"), e)
        })?;

        let result =
            ComparisonResult::new(key.clone(), descriptor.config.name, dataset_id, metrics);
        self.cache.upsert(result.clone()).await;
        debug!(model = %key, f1 = result.metrics.f1_score, "Cache updated");
        Ok(result)
    }

    /// Train every registered model in registry order and replace the cache.
    ///
    /// The first failure aborts the batch and the cache keeps its previous
    /// contents.
    pub async fn train_all(&self, dataset_id: DatasetId) -> Result<Leaderboard, ComparisonError> {
        let split = self.datasets.split(dataset_id).await.map_err(|e| {
            warn!(dataset = %dataset_id, error = %e, "Failed to load dataset split");
            ComparisonError::training(format!("loading dataset {dataset_id}"), e)
        })?;

        let models = self.registry.available_models().await;
        info!(dataset = %dataset_id, models = models.len(), "Training all models");
        let started = Instant::now();

        // Registry order, so concurrent batches acquire in the same order.
        let mut guards = Vec::with_capacity(models.len());
        for descriptor in &models {
            guards.push(self.lock_model(&descriptor.config.key).await);
        }

        let mut results = Vec::with_capacity(models.len());
        for descriptor in models {
            let key = descriptor.config.key;
            let metrics = self
                .trainer
                .train(&key, Arc::clone(&split))
                .await
                .map_err(|e| {
                    warn!(
                        model = %key,
                        dataset = %dataset_id,
                        error = %e,
                        "Batch training aborted"
                    );
                    ComparisonError::training(format!("training {key} on dataset {dataset_id}"), e)
                })?;
            results.push(ComparisonResult::new(
                key,
                descriptor.config.name,
                dataset_id,
                metrics,
            ));
        }

        rank_by_f1(&mut results);
        mark_best(&mut results);
        let leaderboard = Leaderboard::from_ranked(results.clone());
        self.cache.replace(results).await;
        drop(guards);

        info!(
            dataset = %dataset_id,
            best = leaderboard.best_model.as_ref().map(|b| b.model_key.as_str()).unwrap_or("-"),
            secs = started.elapsed().as_secs_f64(),
            "Comparison complete"
        );
        Ok(leaderboard)
    }

    /// The last comparison, without training anything.
    pub async fn cached_results(&self) -> Leaderboard {
        self.cache.leaderboard().await
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.len().await
    }

    /// Clean `text` and classify it with the model for `key`.
    pub async fn predict(&self, text: &str, key: &ModelKey) -> Result<Prediction, ComparisonError> {
        if text.trim().is_empty() {
            return Err(ComparisonError::EmptyInput);
        }
        let cleaned = self.normalizer.normalize(text);
        let verdict = self
            .trainer
            .predict(key, &cleaned)
            .await
            .map_err(|e| ComparisonError::from_prediction(key, e))?;
        debug!(model = %key, prediction = verdict.prediction, "Prediction served");
        Ok(Prediction {
            verdict,
            original_text: text.to_string(),
        })
    }

    /// Summary statistics for every dataset, in `DatasetId::ALL` order.
    pub async fn dataset_stats(&self) -> Result<Vec<DatasetStats>, ComparisonError> {
        let mut stats = Vec::with_capacity(DatasetId::ALL.len());
        for id in DatasetId::ALL {
            let s = self
                .datasets
                .stats(id)
                .await
                .map_err(|source| ComparisonError::DatasetUnavailable {
                    dataset: id,
                    source,
                })?;
            stats.push(s);
        }
        Ok(stats)
    }

    pub async fn available_models(&self) -> Vec<ModelDescriptor> {
        self.registry.available_models().await
    }
}
