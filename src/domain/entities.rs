//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Static description of a dataset known to the showcase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub samples: u32,
    pub features: u32,
    /// Per-class sample counts, keyed by class label
    pub classes: BTreeMap<String, u32>,
    #[serde(default)]
    pub description: String,
}

/// Where a dataset comes from: a numeric catalog id or a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetRef {
    Catalog(String),
    Url(url::Url),
}

impl DatasetRef {
    /// The identifier exactly as the user typed it.
    pub fn as_str(&self) -> &str {
        match self {
            DatasetRef::Catalog(id) => id,
            DatasetRef::Url(url) => url.as_str(),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DatasetRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DatasetRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::domain::validation::parse_dataset_ref(&raw)
            .map_err(serde::de::Error::custom)
    }
}

/// Split quality function of the decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Gini,
    #[default]
    Entropy,
}

impl Criterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Gini => "gini",
            Criterion::Entropy => "entropy",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gini" => Ok(Criterion::Gini),
            "entropy" => Ok(Criterion::Entropy),
            other => Err(DomainError::InvalidValue {
                field: "criterion".into(),
                value: other.into(),
            }),
        }
    }
}

/// Maximum tree depth; `None` means the tree grows until leaves are pure.
///
/// Serialized as the form does it: the string `"None"` or the number as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxDepth(pub Option<u32>);

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(depth) => write!(f, "{depth}"),
            None => f.write_str("None"),
        }
    }
}

impl Serialize for MaxDepth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MaxDepth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
            Null(()),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(MaxDepth(Some(n))),
            Raw::Null(()) => Ok(MaxDepth(None)),
            Raw::Text(s) if s == "None" => Ok(MaxDepth(None)),
            Raw::Text(s) => s
                .parse::<u32>()
                .map(|n| MaxDepth(Some(n)))
                .map_err(|_| serde::de::Error::custom(format!("invalid maxDepth: {s}"))),
        }
    }
}

/// Validated training request, mirroring the fields of the configuration form.
///
/// Built only through `validation::to_train_config`; serialized as the
/// request body of the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainConfig {
    pub dataset_url: DatasetRef,
    /// Percentage of samples used for training, 60..=90
    pub train_size: u32,
    pub criterion: Criterion,
    pub max_depth: MaxDepth,
    pub min_samples_split: u32,
    pub min_samples_leaf: u32,
}

/// Per-class counts within one side of the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub class0: u32,
    pub class1: u32,
}

impl ClassDistribution {
    const CLASS0_SHARE: f64 = 0.63;
    const CLASS1_SHARE: f64 = 0.37;

    /// Fixed 63/37 approximation of the class balance, rounded down.
    pub fn approximate(total: u32) -> Self {
        Self {
            class0: (f64::from(total) * Self::CLASS0_SHARE).floor() as u32,
            class1: (f64::from(total) * Self::CLASS1_SHARE).floor() as u32,
        }
    }
}

/// Output of the data preparation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSplit {
    pub train_samples: u32,
    pub test_samples: u32,
    pub features: u32,
    #[serde(default)]
    pub train_distribution: Option<ClassDistribution>,
    #[serde(default)]
    pub test_distribution: Option<ClassDistribution>,
}

impl DataSplit {
    /// Split `samples` by `train_percent`; the test side takes the remainder
    /// so both sides always add up to the total.
    ///
    /// Percentages above 100 are rejected.
    pub fn from_percent(samples: u32, features: u32, train_percent: u32) -> DomainResult<Self> {
        if train_percent > 100 {
            return Err(DomainError::InvalidValue {
                field: "trainSize".into(),
                value: train_percent.to_string(),
            });
        }
        let train_samples = (u64::from(samples) * u64::from(train_percent) / 100) as u32;
        let test_samples = samples - train_samples;
        Ok(Self {
            train_samples,
            test_samples,
            features,
            train_distribution: Some(ClassDistribution::approximate(train_samples)),
            test_distribution: Some(ClassDistribution::approximate(test_samples)),
        })
    }

    pub fn total(&self) -> u32 {
        self.train_samples + self.test_samples
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    pub criterion: Criterion,
    /// `None` when the depth is unbounded
    pub max_depth: Option<u32>,
    pub min_samples_split: u32,
    pub min_samples_leaf: u32,
}

impl From<&TrainConfig> for ModelParameters {
    fn from(config: &TrainConfig) -> Self {
        Self {
            criterion: config.criterion,
            max_depth: config.max_depth.0,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        }
    }
}

/// Output of the training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub algorithm: String,
    pub parameters: ModelParameters,
    #[serde(default)]
    pub cross_validation_score: Option<f64>,
    #[serde(default)]
    pub training_time: Option<String>,
}

/// Evaluation metrics, percentages except `auc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub sensitivity: f64,
    pub specificity: f64,
    pub ppv: f64,
    pub npv: f64,
    pub auc: f64,
}

impl Metrics {
    /// Metric names and values in display order.
    pub fn entries(&self) -> [(&'static str, f64); 9] {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1Score", self.f1_score),
            ("sensitivity", self.sensitivity),
            ("specificity", self.specificity),
            ("ppv", self.ppv),
            ("npv", self.npv),
            ("auc", self.auc),
        ]
    }
}

/// Binary confusion matrix laid out as `[[TN, FP], [FN, TP]]`.
pub type ConfusionMatrix = [[u32; 2]; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub features: Vec<String>,
    /// Importance in percent, same order as `features`
    pub importance: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
}

/// Output of the evaluation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    pub metrics: Metrics,
    pub confusion_matrix: ConfusionMatrix,
    pub feature_importance: FeatureImportance,
    pub roc_curve: Vec<RocPoint>,
    pub model: ModelInfo,
    pub evaluation_time: String,
    /// RFC 3339; the only time-dependent field of a result
    pub timestamp: String,
}

/// Everything a finished run hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub dataset: DatasetDescriptor,
    pub data: DataSplit,
    pub model: ModelInfo,
    pub results: TrainingResult,
}

/// Display theme persisted alongside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(DomainError::InvalidValue {
                field: "theme".into(),
                value: other.into(),
            }),
        }
    }
}

/// Expand environment variables and tilde in a path-like string.
///
/// Supports `$VAR`, `${VAR}`, and `~` syntax.
/// Returns the original string if expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_split_percent_when_splitting_then_sides_add_up_to_total() {
        for percent in 60..=90 {
            let split = DataSplit::from_percent(569, 30, percent).unwrap();
            assert_eq!(split.total(), 569, "percent {percent}");
        }
    }

    #[test]
    fn given_80_percent_of_569_when_splitting_then_floors_train_side() {
        let split = DataSplit::from_percent(569, 30, 80).unwrap();
        assert_eq!(split.train_samples, 455);
        assert_eq!(split.test_samples, 114);
        assert_eq!(
            split.train_distribution,
            Some(ClassDistribution {
                class0: 286,
                class1: 168
            })
        );
    }

    #[test]
    fn given_max_depth_when_serializing_then_uses_form_representation() {
        assert_eq!(serde_json::to_string(&MaxDepth(None)).unwrap(), "\"None\"");
        assert_eq!(serde_json::to_string(&MaxDepth(Some(7))).unwrap(), "\"7\"");
        let parsed: MaxDepth = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, MaxDepth(Some(7)));
        let parsed: MaxDepth = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, MaxDepth(None));
    }

    #[test]
    fn given_unknown_criterion_when_parsing_then_errors() {
        assert_eq!("gini".parse::<Criterion>().unwrap(), Criterion::Gini);
        assert!("log_loss".parse::<Criterion>().is_err());
    }

    #[test]
    fn given_percent_above_100_when_splitting_then_invalid_value() {
        let err = DataSplit::from_percent(569, 30, 150).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidValue {
                field: "trainSize".into(),
                value: "150".into()
            }
        );
        assert_eq!(DataSplit::from_percent(569, 30, 100).unwrap().test_samples, 0);
    }
}
