//! Model keys, the fixed model zoo, and the registry abstraction.

use crate::algorithms::ClassicalAlgorithm;
use crate::features::VectorizerKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one classifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelKey(String);

impl ModelKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ModelKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ModelKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Static description of a trainable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub key: ModelKey,
    pub name: String,
    pub vectorizer: VectorizerKind,
    pub classifier: ClassicalAlgorithm,
    pub description: String,
}

impl ModelConfig {
    pub fn new(key: &str, vectorizer: VectorizerKind, classifier: ClassicalAlgorithm) -> Self {
        Self {
            key: ModelKey::new(key),
            name: format!("{} ({})", classifier.label(), vectorizer.label()),
            vectorizer,
            classifier,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A configuration plus whether a fitted model currently exists for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    #[serde(flatten)]
    pub config: ModelConfig,
    pub is_trained: bool,
}

/// Enumerates the known model configurations in a fixed order.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Every configuration, in registry order, with its trained flag.
    async fn available_models(&self) -> Vec<ModelDescriptor>;

    /// Known keys in registry order.
    async fn model_keys(&self) -> Vec<ModelKey> {
        self.available_models()
            .await
            .into_iter()
            .map(|d| d.config.key)
            .collect()
    }

    async fn describe(&self, key: &ModelKey) -> Option<ModelDescriptor> {
        self.available_models()
            .await
            .into_iter()
            .find(|d| &d.config.key == key)
    }
}

/// Ordered, immutable set of model configurations.
#[derive(Debug, Clone)]
pub struct ModelZoo {
    models: Vec<ModelConfig>,
}

impl ModelZoo {
    pub fn new(models: Vec<ModelConfig>) -> Self {
        Self { models }
    }

    /// The six standard configurations: every vectorizer crossed with every classifier.
    pub fn standard() -> Self {
        use ClassicalAlgorithm::*;
        use VectorizerKind::*;

        Self::new(vec![
            ModelConfig::new("nb_bow", BagOfWords, NaiveBayes)
                .with_description("Multinomial Naive Bayes over raw term counts"),
            ModelConfig::new("nb_tfidf", Tfidf, NaiveBayes)
                .with_description("Multinomial Naive Bayes over TF-IDF weights"),
            ModelConfig::new("lr_bow", BagOfWords, LogisticRegression)
                .with_description("L2-regularized logistic regression over raw term counts"),
            ModelConfig::new("lr_tfidf", Tfidf, LogisticRegression)
                .with_description("L2-regularized logistic regression over TF-IDF weights"),
            ModelConfig::new("svm_bow", BagOfWords, LinearSvm)
                .with_description("Hinge-loss linear SVM over raw term counts"),
            ModelConfig::new("svm_tfidf", Tfidf, LinearSvm)
                .with_description("Hinge-loss linear SVM over TF-IDF weights"),
        ])
    }

    pub fn get(&self, key: &ModelKey) -> Option<&ModelConfig> {
        self.models.iter().find(|m| &m.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelConfig> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelZoo {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_zoo_has_six_unique_keys() {
        let zoo = ModelZoo::standard();
        assert_eq!(zoo.len(), 6);
        let mut keys: Vec<_> = zoo.iter().map(|m| m.key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
        assert_eq!(zoo.iter().next().unwrap().key.as_str(), "nb_bow");
    }

    #[test]
    fn test_lookup_and_names() {
        let zoo = ModelZoo::standard();
        let lr = zoo.get(&ModelKey::from("lr_tfidf")).unwrap();
        assert_eq!(lr.name, "Logistic Regression (TF-IDF)");
        assert_eq!(lr.classifier, ClassicalAlgorithm::LogisticRegression);
        assert!(zoo.get(&ModelKey::from("random_forest")).is_none());
    }

    #[test]
    fn test_descriptor_serializes_flat() {
        let descriptor = ModelDescriptor {
            config: ModelConfig::new(
                "svm_bow",
                VectorizerKind::BagOfWords,
                ClassicalAlgorithm::LinearSvm,
            ),
            is_trained: false,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["key"], "svm_bow");
        assert_eq!(json["vectorizer"], "bag_of_words");
        assert_eq!(json["classifier"], "linear_svm");
        assert_eq!(json["is_trained"], false);
    }

    struct FixedRegistry(Vec<ModelDescriptor>);

    #[async_trait]
    impl ModelRegistry for FixedRegistry {
        async fn available_models(&self) -> Vec<ModelDescriptor> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_default_registry_methods() {
        let registry = FixedRegistry(
            ModelZoo::standard()
                .iter()
                .take(2)
                .map(|config| ModelDescriptor {
                    config: config.clone(),
                    is_trained: false,
                })
                .collect(),
        );
        assert_eq!(
            registry.model_keys().await,
            vec![ModelKey::from("nb_bow"), ModelKey::from("nb_tfidf")]
        );
        assert!(registry.describe(&ModelKey::from("lr_bow")).await.is_none());
        assert_eq!(
            registry.describe(&ModelKey::from("nb_bow")).await.unwrap().config.name,
            "Naive Bayes (Bag of Words)"
        );
    }
}
