//! Classical linear text classifiers fitted in-process.

use crate::config::TrainingConfig;
use crate::error::MlError;
use crate::features::SparseVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Classifier families available to the model zoo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassicalAlgorithm {
    NaiveBayes,
    LogisticRegression,
    LinearSvm,
}

impl ClassicalAlgorithm {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NaiveBayes => "Naive Bayes",
            Self::LogisticRegression => "Logistic Regression",
            Self::LinearSvm => "Linear SVM",
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn dot(weights: &[f64], x: &SparseVector) -> f64 {
    x.iter().map(|&(j, v)| weights[j] * v).sum()
}

/// A fitted binary classifier; the positive class is cyberbullying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum FittedClassifier {
    NaiveBayes {
        /// `ln P(bullying) - ln P(not bullying)`.
        prior_log_odds: f64,
        /// Per-feature `ln P(f | bullying) - ln P(f | not bullying)`.
        feature_log_odds: Vec<f64>,
    },
    LogisticRegression {
        weights: Vec<f64>,
        bias: f64,
    },
    LinearSvm {
        weights: Vec<f64>,
        bias: f64,
    },
}

impl FittedClassifier {
    /// Fit `algorithm` on sparse features with boolean labels.
    pub fn fit(
        algorithm: ClassicalAlgorithm,
        features: &[SparseVector],
        labels: &[bool],
        num_features: usize,
        params: &TrainingConfig,
    ) -> Result<Self, MlError> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(MlError::training(format!(
                "expected matching non-empty features and labels, got {} and {}",
                features.len(),
                labels.len()
            )));
        }
        if num_features == 0 {
            return Err(MlError::training("vocabulary is empty"));
        }
        let positives = labels.iter().filter(|&&y| y).count();
        if positives == 0 || positives == labels.len() {
            return Err(MlError::training(
                "training data must contain both classes",
            ));
        }

        Ok(match algorithm {
            ClassicalAlgorithm::NaiveBayes => {
                fit_naive_bayes(features, labels, num_features, params.nb_alpha, positives)
            }
            ClassicalAlgorithm::LogisticRegression => {
                let (weights, bias) = fit_sgd(features, labels, num_features, params, Loss::Log);
                Self::LogisticRegression { weights, bias }
            }
            ClassicalAlgorithm::LinearSvm => {
                let (weights, bias) = fit_sgd(features, labels, num_features, params, Loss::Hinge);
                Self::LinearSvm { weights, bias }
            }
        })
    }

    /// Signed score; positive means cyberbullying.
    pub fn decision(&self, x: &SparseVector) -> f64 {
        match self {
            Self::NaiveBayes {
                prior_log_odds,
                feature_log_odds,
            } => prior_log_odds + dot(feature_log_odds, x),
            Self::LogisticRegression { weights, bias } | Self::LinearSvm { weights, bias } => {
                dot(weights, x) + bias
            }
        }
    }

    pub fn predict(&self, x: &SparseVector) -> bool {
        self.decision(x) > 0.0
    }

    /// Probability of the predicted class, when the model has one.
    pub fn confidence(&self, x: &SparseVector) -> Option<f64> {
        match self {
            Self::LinearSvm { .. } => None,
            _ => {
                let p = sigmoid(self.decision(x));
                Some(p.max(1.0 - p))
            }
        }
    }
}

fn fit_naive_bayes(
    features: &[SparseVector],
    labels: &[bool],
    num_features: usize,
    alpha: f64,
    positives: usize,
) -> FittedClassifier {
    let mut counts = [vec![0.0; num_features], vec![0.0; num_features]];
    for (x, &y) in features.iter().zip(labels) {
        let class = &mut counts[usize::from(y)];
        for &(j, v) in x {
            class[j] += v;
        }
    }

    let smoothed_total = |c: &[f64]| c.iter().sum::<f64>() + alpha * num_features as f64;
    let (total_neg, total_pos) = (smoothed_total(&counts[0]), smoothed_total(&counts[1]));
    let feature_log_odds = counts[1]
        .iter()
        .zip(&counts[0])
        .map(|(pos, neg)| ((pos + alpha) / total_pos).ln() - ((neg + alpha) / total_neg).ln())
        .collect();

    let negatives = labels.len() - positives;
    FittedClassifier::NaiveBayes {
        prior_log_odds: (positives as f64).ln() - (negatives as f64).ln(),
        feature_log_odds,
    }
}

#[derive(Clone, Copy)]
enum Loss {
    Log,
    Hinge,
}

/// Stochastic gradient descent with a `1 / (1 + epoch)` step decay and
/// per-epoch L2 shrinkage. The bias is not regularized.
fn fit_sgd(
    features: &[SparseVector],
    labels: &[bool],
    num_features: usize,
    params: &TrainingConfig,
    loss: Loss,
) -> (Vec<f64>, f64) {
    let mut weights = vec![0.0; num_features];
    let mut bias = 0.0;
    let mut order: Vec<usize> = (0..features.len()).collect();
    let mut rng = StdRng::seed_from_u64(params.seed);

    for epoch in 0..params.epochs {
        order.shuffle(&mut rng);
        let eta = params.learning_rate / (1.0 + epoch as f64);

        for &i in &order {
            let x = &features[i];
            let z = dot(&weights, x) + bias;
            let step = match loss {
                Loss::Log => {
                    let y = if labels[i] { 1.0 } else { 0.0 };
                    y - sigmoid(z)
                }
                Loss::Hinge => {
                    let y = if labels[i] { 1.0 } else { -1.0 };
                    if y * z < 1.0 { y } else { 0.0 }
                }
            };
            if step != 0.0 {
                for &(j, v) in x {
                    weights[j] += eta * step * v;
                }
                bias += eta * step;
            }
        }

        let shrink = (1.0 - eta * params.l2).max(0.0);
        for w in &mut weights {
            *w *= shrink;
        }
    }

    (weights, bias)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Feature 0 marks bullying, feature 1 marks friendly text.
    fn toy() -> (Vec<SparseVector>, Vec<bool>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..20 {
            xs.push(vec![(0, 1.0 + (i % 3) as f64), (2, 0.5)]);
            ys.push(true);
            xs.push(vec![(1, 1.0 + (i % 2) as f64), (2, 0.5)]);
            ys.push(false);
        }
        (xs, ys)
    }

    fn params() -> TrainingConfig {
        TrainingConfig {
            epochs: 10,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_each_algorithm_separates_toy_data() {
        let (xs, ys) = toy();
        for algorithm in [
            ClassicalAlgorithm::NaiveBayes,
            ClassicalAlgorithm::LogisticRegression,
            ClassicalAlgorithm::LinearSvm,
        ] {
            let model = FittedClassifier::fit(algorithm, &xs, &ys, 3, &params()).unwrap();
            assert!(model.predict(&vec![(0, 1.0)]), "{algorithm:?} missed bullying");
            assert!(!model.predict(&vec![(1, 1.0)]), "{algorithm:?} missed friendly");
        }
    }

    #[test]
    fn test_confidence_only_for_probabilistic_models() {
        let (xs, ys) = toy();
        let nb = FittedClassifier::fit(ClassicalAlgorithm::NaiveBayes, &xs, &ys, 3, &params())
            .unwrap();
        let c = nb.confidence(&vec![(0, 2.0)]).unwrap();
        assert!(c > 0.5 && c <= 1.0);

        let svm = FittedClassifier::fit(ClassicalAlgorithm::LinearSvm, &xs, &ys, 3, &params())
            .unwrap();
        assert!(svm.confidence(&vec![(0, 2.0)]).is_none());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (xs, ys) = toy();
        let lr = ClassicalAlgorithm::LogisticRegression;
        let a = FittedClassifier::fit(lr, &xs, &ys, 3, &params()).unwrap();
        let b = FittedClassifier::fit(lr, &xs, &ys, 3, &params()).unwrap();
        let probe = vec![(0, 1.0), (1, 1.0)];
        assert_eq!(a.decision(&probe), b.decision(&probe));
    }

    #[test]
    fn test_single_class_is_rejected() {
        let xs = vec![vec![(0, 1.0)], vec![(0, 2.0)]];
        let ys = vec![true, true];
        let err = FittedClassifier::fit(ClassicalAlgorithm::NaiveBayes, &xs, &ys, 1, &params())
            .unwrap_err();
        assert!(matches!(err, MlError::Training(_)));
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let svm = ClassicalAlgorithm::LinearSvm;
        let err = FittedClassifier::fit(svm, &[], &[], 3, &params()).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
        let (xs, ys) = toy();
        assert!(FittedClassifier::fit(svm, &xs, &ys, 0, &params()).is_err());
    }

    #[test]
    fn test_sigmoid_is_stable_for_large_inputs() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }
}
