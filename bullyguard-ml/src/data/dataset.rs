//! Dataset identifiers, labeled samples, and the train/test split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed set of datasets the service can train on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DatasetId {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    /// Dataset one followed by dataset two.
    #[serde(rename = "combined")]
    #[default]
    Combined,
}

impl DatasetId {
    /// Every dataset, in reporting order.
    pub const ALL: [DatasetId; 3] = [DatasetId::One, DatasetId::Two, DatasetId::Combined];

    /// Wire form used by the API (`"1"`, `"2"`, `"combined"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a string does not name a known dataset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dataset: '{0}' (expected \"1\", \"2\" or \"combined\")")]
pub struct ParseDatasetIdError(pub String);

impl FromStr for DatasetId {
    type Err = ParseDatasetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            "combined" => Ok(Self::Combined),
            other => Err(ParseDatasetIdError(other.to_string())),
        }
    }
}

/// A cleaned text and its binary label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub text: String,
    /// `true` when the text is cyberbullying.
    pub bullying: bool,
}

impl Sample {
    pub fn new(text: impl Into<String>, bullying: bool) -> Self {
        Self {
            text: text.into(),
            bullying,
        }
    }
}

/// Held-out evaluation split for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub dataset_id: DatasetId,
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

impl TrainTestSplit {
    /// Split `samples` so each class contributes `test_ratio` of its rows to
    /// the test set. The result depends only on the input order and `seed`.
    pub fn stratified(
        dataset_id: DatasetId,
        samples: &[Sample],
        test_ratio: f64,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        for class in [false, true] {
            let mut members: Vec<&Sample> =
                samples.iter().filter(|s| s.bullying == class).collect();
            members.shuffle(&mut rng);

            let n = members.len();
            let mut n_test = ((n as f64) * test_ratio).round() as usize;
            if n >= 2 {
                n_test = n_test.clamp(1, n - 1);
            } else {
                n_test = 0;
            }

            let (held_out, rest) = members.split_at(n_test);
            test.extend(held_out.iter().map(|s| (*s).clone()));
            train.extend(rest.iter().map(|s| (*s).clone()));
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Self {
            dataset_id,
            train,
            test,
        }
    }

    pub fn train_texts(&self) -> Vec<&str> {
        self.train.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Summary statistics reported for each dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub dataset_id: DatasetId,
    pub name: String,
    pub total_samples: usize,
    pub bullying_count: usize,
    pub not_bullying_count: usize,
    pub bullying_ratio: f64,
    pub avg_word_count: f64,
    pub train_size: usize,
    pub test_size: usize,
}

impl DatasetStats {
    pub fn compute(name: &str, samples: &[Sample], split: &TrainTestSplit) -> Self {
        let total = samples.len();
        let bullying = samples.iter().filter(|s| s.bullying).count();
        let words: usize = samples
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .sum();
        let ratio = |num: usize| {
            if total == 0 {
                0.0
            } else {
                num as f64 / total as f64
            }
        };

        Self {
            dataset_id: split.dataset_id,
            name: name.to_string(),
            total_samples: total,
            bullying_count: bullying,
            not_bullying_count: total - bullying,
            bullying_ratio: ratio(bullying),
            avg_word_count: ratio(words),
            train_size: split.train.len(),
            test_size: split.test.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(bullying: usize, safe: usize) -> Vec<Sample> {
        let mut out = Vec::new();
        for i in 0..bullying {
            out.push(Sample::new(format!("mean text {i}"), true));
        }
        for i in 0..safe {
            out.push(Sample::new(format!("kind text {i}"), false));
        }
        out
    }

    #[test]
    fn test_dataset_id_parse() {
        assert_eq!("1".parse::<DatasetId>().unwrap(), DatasetId::One);
        assert_eq!("2".parse::<DatasetId>().unwrap(), DatasetId::Two);
        assert_eq!(" combined ".parse::<DatasetId>().unwrap(), DatasetId::Combined);
        let err = "3".parse::<DatasetId>().unwrap_err();
        assert_eq!(err, ParseDatasetIdError("3".into()));
        assert!(err.to_string().contains("'3'"));
    }

    #[test]
    fn test_dataset_id_serde_uses_wire_form() {
        assert_eq!(serde_json::to_string(&DatasetId::One).unwrap(), "\"1\"");
        assert_eq!(
            serde_json::to_string(&DatasetId::Combined).unwrap(),
            "\"combined\""
        );
        let id: DatasetId = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(id, DatasetId::Two);
        assert_eq!(DatasetId::default(), DatasetId::Combined);
    }

    #[test]
    fn test_stratified_split_preserves_class_ratio() {
        let samples = corpus(30, 70);
        let split = TrainTestSplit::stratified(DatasetId::One, &samples, 0.2, 42);
        assert_eq!(split.train.len() + split.test.len(), 100);
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.test.iter().filter(|s| s.bullying).count(), 6);
        assert_eq!(split.train.iter().filter(|s| s.bullying).count(), 24);
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let samples = corpus(20, 20);
        let a = TrainTestSplit::stratified(DatasetId::Two, &samples, 0.25, 7);
        let b = TrainTestSplit::stratified(DatasetId::Two, &samples, 0.25, 7);
        let c = TrainTestSplit::stratified(DatasetId::Two, &samples, 0.25, 8);
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);
        assert_ne!(a.train, c.train);
    }

    #[test]
    fn test_split_keeps_both_sides_non_empty_for_small_classes() {
        let samples = corpus(2, 3);
        let split = TrainTestSplit::stratified(DatasetId::One, &samples, 0.1, 1);
        assert_eq!(split.test.iter().filter(|s| s.bullying).count(), 1);
        assert_eq!(split.test.iter().filter(|s| !s.bullying).count(), 1);
        assert_eq!(split.train.len(), 3);
    }

    #[test]
    fn test_stats() {
        let samples = vec![
            Sample::new("you are awful", true),
            Sample::new("have a nice day friend", false),
        ];
        let split = TrainTestSplit::stratified(DatasetId::Combined, &samples, 0.5, 1);
        let stats = DatasetStats::compute("demo", &samples, &split);
        assert_eq!(stats.total_samples, 2);
        assert_eq!(stats.bullying_count, 1);
        assert_eq!(stats.not_bullying_count, 1);
        assert_eq!(stats.bullying_ratio, 0.5);
        assert_eq!(stats.avg_word_count, 4.0);
        assert_eq!(stats.train_size + stats.test_size, 2);
    }
}
