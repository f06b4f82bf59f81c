//! Client for the remote training endpoint.
//!
//! The endpoint is best-effort: callers treat every error here as a signal
//! to fall back to the simulated pipeline.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{Criterion, DatasetDescriptor, MaxDepth, TrainConfig};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Json(String),
    #[error("training rejected: {0}")]
    Rejected(String),
}

/// Body returned by `POST /api/train`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTrainResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub dataset: Option<DatasetDescriptor>,
    #[serde(default)]
    pub model_info: Option<RemoteModelInfo>,
    #[serde(default)]
    pub results: Option<RemoteResults>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteModelInfo {
    pub algorithm: String,
    pub parameters: RemoteParameters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteParameters {
    #[serde(default)]
    pub criterion: Criterion,
    #[serde(default)]
    pub max_depth: MaxDepth,
    pub min_samples_split: u32,
    pub min_samples_leaf: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteResults {
    pub metrics: RemoteMetrics,
    pub confusion_matrix: Vec<Vec<u32>>,
    #[serde(default)]
    pub roc_curve: RemoteRoc,
    pub feature_importance: RemoteFeatureImportance,
}

/// Percentages; the clinical metrics are absent for non-binary targets.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1Score")]
    pub f1_score: f64,
    #[serde(default)]
    pub sensitivity: f64,
    #[serde(default)]
    pub specificity: f64,
    #[serde(default)]
    pub ppv: f64,
    #[serde(default)]
    pub npv: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteRoc {
    #[serde(default)]
    pub fpr: Vec<f64>,
    #[serde(default)]
    pub tpr: Vec<f64>,
    #[serde(default)]
    pub auc: f64,
}

/// Features are named for catalog datasets and indexed for CSV uploads.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeatureLabel {
    Name(String),
    Index(u64),
}

impl FeatureLabel {
    pub fn into_name(self) -> String {
        match self {
            FeatureLabel::Name(name) => name,
            FeatureLabel::Index(i) => format!("feature_{i}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFeatureImportance {
    pub features: Vec<FeatureLabel>,
    pub importance: Vec<f64>,
}

/// Submits a training request to a remote service.
pub trait RemoteTrainer: Send + Sync {
    fn train(&self, config: &TrainConfig) -> Result<RemoteTrainResponse, RemoteError>;
}

/// `ureq`-based client posting the config as JSON.
pub struct HttpRemoteTrainer {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpRemoteTrainer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteTrainer for HttpRemoteTrainer {
    fn train(&self, config: &TrainConfig) -> Result<RemoteTrainResponse, RemoteError> {
        debug!("POST {}", self.endpoint);
        let request = self
            .agent
            .post(&self.endpoint)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");

        let response = match request.send_json(config) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(RemoteError::Status {
                    code,
                    message: error_message(&body).unwrap_or_else(|| "API error".to_string()),
                });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(RemoteError::Transport(err.to_string()));
            }
        };

        let body: RemoteTrainResponse = response
            .into_json()
            .map_err(|e| RemoteError::Json(e.to_string()))?;

        if !body.success {
            return Err(RemoteError::Rejected(
                body.error
                    .unwrap_or_else(|| "processing error".to_string()),
            ));
        }
        Ok(body)
    }
}

/// Pull the `error` field out of an error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<BTreeMap<String, serde_json::Value>>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_server_response_when_decoding_then_accepts_indexed_features() {
        let body = r#"{
            "success": true,
            "dataset": {"name": "Custom", "samples": 10, "features": 2,
                        "classes": {"a": 6, "b": 4}},
            "model_info": {"algorithm": "Decision Tree",
                           "parameters": {"criterion": "gini", "max_depth": "None",
                                          "min_samples_split": 5, "min_samples_leaf": 2}},
            "results": {
                "metrics": {"accuracy": 90.0, "precision": 91.0, "recall": 89.0, "f1Score": 90.0},
                "confusion_matrix": [[5, 1], [0, 4]],
                "roc_curve": {},
                "feature_importance": {"features": [0, 1], "importance": [70.0, 30.0]}
            }
        }"#;
        let decoded: RemoteTrainResponse = serde_json::from_str(body).unwrap();
        let results = decoded.results.unwrap();
        assert_eq!(results.metrics.sensitivity, 0.0);
        assert!(results.roc_curve.fpr.is_empty());
        let names: Vec<_> = results
            .feature_importance
            .features
            .into_iter()
            .map(FeatureLabel::into_name)
            .collect();
        assert_eq!(names, vec!["feature_0", "feature_1"]);
        assert_eq!(
            decoded.model_info.unwrap().parameters.max_depth,
            MaxDepth(None)
        );
    }

    #[test]
    fn given_error_body_when_extracting_then_returns_message() {
        assert_eq!(
            error_message(r#"{"success": false, "error": "dataset not supported"}"#).as_deref(),
            Some("dataset not supported")
        );
        assert_eq!(error_message("<html>"), None);
    }
}
