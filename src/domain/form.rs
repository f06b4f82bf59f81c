//! Raw configuration form: the values exactly as entered, before validation.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::EXAMPLE_DATASET_ID;

pub const FIELD_DATASET_URL: &str = "datasetUrl";
pub const FIELD_TRAIN_SIZE: &str = "trainSize";
pub const FIELD_CRITERION: &str = "criterion";
pub const FIELD_MAX_DEPTH: &str = "maxDepth";
pub const FIELD_MIN_SAMPLES_SPLIT: &str = "minSamplesSplit";
pub const FIELD_MIN_SAMPLES_LEAF: &str = "minSamplesLeaf";

/// Form field names in display order.
pub const FIELDS: [&str; 6] = [
    FIELD_DATASET_URL,
    FIELD_TRAIN_SIZE,
    FIELD_CRITERION,
    FIELD_MAX_DEPTH,
    FIELD_MIN_SAMPLES_SPLIT,
    FIELD_MIN_SAMPLES_LEAF,
];

/// Configuration form values keyed by field name.
///
/// Every value is kept as text so that invalid input can be stored,
/// reported and corrected instead of being rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInput {
    pub dataset_url: String,
    pub train_size: String,
    pub criterion: String,
    pub max_depth: String,
    pub min_samples_split: String,
    pub min_samples_leaf: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            dataset_url: String::new(),
            train_size: "80".into(),
            criterion: "entropy".into(),
            max_depth: "7".into(),
            min_samples_split: "5".into(),
            min_samples_leaf: "2".into(),
        }
    }
}

/// Summary shown next to the form while it is being filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormPreview {
    pub dataset: String,
    pub criterion: String,
    pub split: String,
}

impl FormInput {
    /// The example configuration for the breast cancer dataset.
    pub fn preset() -> Self {
        Self {
            dataset_url: EXAMPLE_DATASET_ID.into(),
            ..Self::default()
        }
    }

    /// Value of a field by its form name.
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            FIELD_DATASET_URL => &self.dataset_url,
            FIELD_TRAIN_SIZE => &self.train_size,
            FIELD_CRITERION => &self.criterion,
            FIELD_MAX_DEPTH => &self.max_depth,
            FIELD_MIN_SAMPLES_SPLIT => &self.min_samples_split,
            FIELD_MIN_SAMPLES_LEAF => &self.min_samples_leaf,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Overwrite the fields that are `Some`, keeping the rest.
    pub fn overlay(mut self, other: FormOverrides) -> Self {
        if let Some(v) = other.dataset_url {
            self.dataset_url = v;
        }
        if let Some(v) = other.train_size {
            self.train_size = v;
        }
        if let Some(v) = other.criterion {
            self.criterion = v;
        }
        if let Some(v) = other.max_depth {
            self.max_depth = v;
        }
        if let Some(v) = other.min_samples_split {
            self.min_samples_split = v;
        }
        if let Some(v) = other.min_samples_leaf {
            self.min_samples_leaf = v;
        }
        self
    }

    pub fn preview(&self) -> FormPreview {
        let id = self.dataset_url.trim();
        let dataset = if id.is_empty() {
            "Not configured"
        } else if id == EXAMPLE_DATASET_ID || id.contains("breast") || id.contains("cancer") {
            "Breast Cancer Wisconsin"
        } else {
            "Custom dataset"
        };

        let criterion = match self.criterion.trim() {
            "" => "Entropy".to_string(),
            c => capitalize(c),
        };

        let split = match self.train_size.trim().parse::<u32>() {
            Ok(train) if train <= 100 => format!("{}% / {}%", train, 100 - train),
            _ => "-".to_string(),
        };

        FormPreview {
            dataset: dataset.into(),
            criterion,
            split,
        }
    }
}

/// Partial form values, e.g. from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOverrides {
    pub dataset_url: Option<String>,
    pub train_size: Option<String>,
    pub criterion: Option<String>,
    pub max_depth: Option<String>,
    pub min_samples_split: Option<String>,
    pub min_samples_leaf: Option<String>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
