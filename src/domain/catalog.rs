//! Fixed dataset catalog and the reference results of the example model.
//!
//! Every value here is a literal: the showcase never computes a metric.

use std::collections::BTreeMap;

use crate::domain::{
    ConfusionMatrix, DatasetDescriptor, DatasetRef, DomainError, DomainResult, FeatureImportance,
    Metrics, RocPoint,
};

/// Catalog id of the example dataset (UCI Breast Cancer Wisconsin, Diagnostic).
pub const EXAMPLE_DATASET_ID: &str = "17";

/// Confusion matrix of the example model, `[[TN, FP], [FN, TP]]`.
pub const REFERENCE_CONFUSION_MATRIX: ConfusionMatrix = [[72, 0], [5, 37]];

pub const CROSS_VALIDATION_SCORE: f64 = 94.7;
pub const TRAINING_TIME: &str = "2.3s";
pub const EVALUATION_TIME: &str = "1.2s";
pub const ALGORITHM: &str = "Decision Tree";

/// Known catalog ids, in listing order.
pub fn catalog_ids() -> &'static [&'static str] {
    &[EXAMPLE_DATASET_ID]
}

/// Look up a catalog dataset by its numeric id.
pub fn lookup(id: &str) -> Option<DatasetDescriptor> {
    match id {
        EXAMPLE_DATASET_ID => Some(breast_cancer_wisconsin()),
        _ => None,
    }
}

/// Resolve any dataset reference to its descriptor.
///
/// URLs are never fetched; they all resolve to the same custom descriptor.
pub fn resolve(dataset: &DatasetRef) -> DomainResult<DatasetDescriptor> {
    match dataset {
        DatasetRef::Catalog(id) => lookup(id).ok_or_else(|| DomainError::DatasetNotFound(id.clone())),
        DatasetRef::Url(_) => Ok(custom_dataset()),
    }
}

fn classes(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries
        .iter()
        .map(|(label, count)| (label.to_string(), *count))
        .collect()
}

fn breast_cancer_wisconsin() -> DatasetDescriptor {
    DatasetDescriptor {
        name: "Breast Cancer Wisconsin (Diagnostic)".into(),
        samples: 569,
        features: 30,
        classes: classes(&[("benign", 357), ("malignant", 212)]),
        description: "Breast cancer dataset from the UCI ML Repository".into(),
    }
}

/// Descriptor reported for any dataset given by URL.
pub fn custom_dataset() -> DatasetDescriptor {
    DatasetDescriptor {
        name: "Custom dataset".into(),
        samples: 1000,
        features: 25,
        classes: classes(&[("class0", 600), ("class1", 400)]),
        description: "Dataset loaded from a custom URL".into(),
    }
}

pub fn reference_metrics() -> Metrics {
    Metrics {
        accuracy: 95.6,
        precision: 100.0,
        recall: 88.1,
        f1_score: 93.7,
        sensitivity: 88.1,
        specificity: 100.0,
        ppv: 100.0,
        npv: 93.5,
        auc: 0.94,
    }
}

pub fn reference_feature_importance() -> FeatureImportance {
    FeatureImportance {
        features: ["perimeter3", "concave_points3", "concave_points1", "texture3", "area2"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
        importance: vec![64.64, 11.46, 8.51, 6.71, 4.61],
    }
}

pub fn reference_roc_curve() -> Vec<RocPoint> {
    [(0.0, 0.0), (0.0, 0.12), (0.0, 0.88), (1.0, 1.0)]
        .iter()
        .map(|&(fpr, tpr)| RocPoint { fpr, tpr })
        .collect()
}
