//! In-process classifier engine, the default trainer and registry.

use crate::algorithms::{ConfusionMatrix, FittedClassifier};
use crate::config::TrainingConfig;
use crate::data::{DatasetId, TrainTestSplit};
use crate::error::MlError;
use crate::features::{SparseVector, Vectorizer};
use crate::training::metrics::MetricsRecord;
use crate::training::trainer::{ModelTrainer, Verdict};
use crate::zoo::{ModelConfig, ModelDescriptor, ModelKey, ModelRegistry, ModelZoo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// A vectorizer and classifier fitted together.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub config: ModelConfig,
    pub vectorizer: Vectorizer,
    pub classifier: FittedClassifier,
    pub dataset_id: DatasetId,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    fn classify(&self, cleaned_text: &str) -> (bool, Option<f64>) {
        let x = self.vectorizer.transform(cleaned_text);
        (self.classifier.predict(&x), self.classifier.confidence(&x))
    }
}

/// Fit `config` on the training half of `split` and score it on the test half.
pub fn fit_and_evaluate(
    config: &ModelConfig,
    split: &TrainTestSplit,
    params: &TrainingConfig,
) -> Result<(TrainedModel, MetricsRecord), MlError> {
    if split.train.is_empty() {
        return Err(MlError::training(format!(
            "dataset {} has an empty training set",
            split.dataset_id
        )));
    }
    if split.test.is_empty() {
        return Err(MlError::training(format!(
            "dataset {} has an empty test set",
            split.dataset_id
        )));
    }

    let started = Instant::now();
    let vectorizer = Vectorizer::fit(
        config.vectorizer,
        &split.train_texts(),
        params.max_features,
        params.min_df,
    );
    let features: Vec<SparseVector> = split
        .train
        .iter()
        .map(|s| vectorizer.transform(&s.text))
        .collect();
    let labels: Vec<bool> = split.train.iter().map(|s| s.bullying).collect();
    let classifier = FittedClassifier::fit(
        config.classifier,
        &features,
        &labels,
        vectorizer.num_features(),
        params,
    )?;
    let elapsed = started.elapsed();

    let cm = ConfusionMatrix::from_pairs(split.test.iter().map(|s| {
        let predicted = classifier.predict(&vectorizer.transform(&s.text));
        (predicted, s.bullying)
    }));
    let metrics = MetricsRecord::from_confusion(&cm, split.train.len(), elapsed);

    let model = TrainedModel {
        config: config.clone(),
        vectorizer,
        classifier,
        dataset_id: split.dataset_id,
        trained_at: Utc::now(),
    };
    Ok((model, metrics))
}

/// Trains the zoo's configurations natively and keeps the latest fit per key.
///
/// Concurrent `train` calls for one key race on the stored model; the last
/// fit to finish wins. Callers that pair the metrics with the stored model
/// must serialize training per key.
pub struct ClassifierEngine {
    zoo: ModelZoo,
    params: TrainingConfig,
    trained: RwLock<HashMap<ModelKey, Arc<TrainedModel>>>,
}

impl ClassifierEngine {
    pub fn new(zoo: ModelZoo, params: TrainingConfig) -> Self {
        Self {
            zoo,
            params,
            trained: RwLock::new(HashMap::new()),
        }
    }

    /// The fitted model for `key`, if any.
    pub async fn trained_model(&self, key: &ModelKey) -> Option<Arc<TrainedModel>> {
        self.trained.read().await.get(key).cloned()
    }

    fn config(&self, key: &ModelKey) -> Result<&ModelConfig, MlError> {
        self.zoo
            .get(key)
            .ok_or_else(|| MlError::UnknownModel(key.to_string()))
    }
}

#[async_trait]
impl ModelTrainer for ClassifierEngine {
    async fn train(
        &self,
        key: &ModelKey,
        split: Arc<TrainTestSplit>,
    ) -> Result<MetricsRecord, MlError> {
        let config = self.config(key)?.clone();
        let params = self.params.clone();

        let (model, metrics) =
            tokio::task::spawn_blocking(move || fit_and_evaluate(&config, &split, &params))
                .await
                .map_err(|e| MlError::training(format!("training task failed: {e}")))??;

        tracing::info!(
            model = %key,
            dataset = %model.dataset_id,
            features = model.vectorizer.num_features(),
            f1 = metrics.f1_score,
            secs = metrics.training_time_secs,
            "Model fitted"
        );
        self.trained
            .write()
            .await
            .insert(key.clone(), Arc::new(model));
        Ok(metrics)
    }

    async fn predict(&self, key: &ModelKey, cleaned_text: &str) -> Result<Verdict, MlError> {
        let config = self.config(key)?;
        let model = self
            .trained_model(key)
            .await
            .ok_or_else(|| MlError::ModelNotTrained(key.to_string()))?;
        if cleaned_text.trim().is_empty() {
            return Err(MlError::invalid_input("no words left after cleaning"));
        }

        let (bullying, confidence) = model.classify(cleaned_text);
        Ok(Verdict::new(
            key.clone(),
            config.name.clone(),
            bullying,
            confidence,
            cleaned_text,
        ))
    }
}

#[async_trait]
impl ModelRegistry for ClassifierEngine {
    async fn available_models(&self) -> Vec<ModelDescriptor> {
        let trained = self.trained.read().await;
        self.zoo
            .iter()
            .map(|config| ModelDescriptor {
                config: config.clone(),
                is_trained: trained.contains_key(&config.key),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;

    fn toy_split() -> Arc<TrainTestSplit> {
        let mean = ["you loser idiot", "ugly stupid loser", "idiot go away", "stupid ugly freak"];
        let kind = [
            "great game friend",
            "thanks lovely day",
            "nice photo friend",
            "lovely great idea",
        ];
        let mut samples = Vec::new();
        for _ in 0..5 {
            samples.extend(mean.iter().map(|t| Sample::new(*t, true)));
            samples.extend(kind.iter().map(|t| Sample::new(*t, false)));
        }
        Arc::new(TrainTestSplit::stratified(DatasetId::Combined, &samples, 0.25, 42))
    }

    fn engine() -> ClassifierEngine {
        ClassifierEngine::new(ModelZoo::standard(), TrainingConfig::default())
    }

    #[tokio::test]
    async fn test_every_standard_model_learns_toy_corpus() {
        let engine = engine();
        let split = toy_split();
        for key in engine.model_keys().await {
            let metrics = engine.train(&key, Arc::clone(&split)).await.unwrap();
            assert_eq!(metrics.f1_score, 1.0, "{key} did not separate the toy corpus");
            assert_eq!(metrics.test_samples, split.test.len());

            let verdict = engine.predict(&key, "stupid loser").await.unwrap();
            assert!(verdict.is_bullying(), "{key}");
            let verdict = engine.predict(&key, "lovely friend").await.unwrap();
            assert!(!verdict.is_bullying(), "{key}");
        }
    }

    #[tokio::test]
    async fn test_trained_flag_flips_after_training() {
        let engine = engine();
        assert!(engine.available_models().await.iter().all(|m| !m.is_trained));

        engine.train(&ModelKey::from("lr_tfidf"), toy_split()).await.unwrap();
        let models = engine.available_models().await;
        let trained: Vec<_> = models
            .iter()
            .filter(|m| m.is_trained)
            .map(|m| m.config.key.as_str())
            .collect();
        assert_eq!(trained, vec!["lr_tfidf"]);
    }

    #[tokio::test]
    async fn test_predict_errors_distinguish_unknown_and_untrained() {
        let engine = engine();
        let err = engine.predict(&ModelKey::from("bert"), "text").await.unwrap_err();
        assert!(matches!(err, MlError::UnknownModel(_)));
        let err = engine.predict(&ModelKey::from("nb_bow"), "text").await.unwrap_err();
        assert!(matches!(err, MlError::ModelNotTrained(_)));
    }

    #[tokio::test]
    async fn test_predict_rejects_text_cleaned_to_nothing() {
        let engine = engine();
        let key = ModelKey::from("nb_bow");
        engine.train(&key, toy_split()).await.unwrap();
        let err = engine.predict(&key, "  ").await.unwrap_err();
        assert!(matches!(err, MlError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_train_unknown_key() {
        let err = engine()
            .train(&ModelKey::from("bert"), toy_split())
            .await
            .unwrap_err();
        assert!(matches!(err, MlError::UnknownModel(_)));
    }

    #[tokio::test]
    async fn test_empty_test_set_is_training_error() {
        let split = Arc::new(TrainTestSplit {
            dataset_id: DatasetId::One,
            train: vec![Sample::new("you loser", true), Sample::new("nice day", false)],
            test: vec![],
        });
        let err = engine()
            .train(&ModelKey::from("nb_bow"), split)
            .await
            .unwrap_err();
        assert!(matches!(err, MlError::Training(_)));
    }

    #[tokio::test]
    async fn test_svm_verdict_has_no_confidence() {
        let engine = engine();
        let key = ModelKey::from("svm_tfidf");
        engine.train(&key, toy_split()).await.unwrap();
        let verdict = engine.predict(&key, "ugly idiot").await.unwrap();
        assert!(verdict.confidence.is_none());
        assert_eq!(verdict.model_name, "Linear SVM (TF-IDF)");
        assert_eq!(verdict.text, "ugly idiot");
    }
}
