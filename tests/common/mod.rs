//! Hand-written fakes for the I/O boundaries shared by the integration tests.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use oncodemo::application::services::CancellationToken;
use oncodemo::config::{DelayConfig, Settings};
use oncodemo::domain::{PipelineEvent, TrainConfig};
use oncodemo::infrastructure::di::ServiceContainer;
use oncodemo::infrastructure::remote::{RemoteError, RemoteTrainResponse, RemoteTrainer};
use oncodemo::infrastructure::store::FileKeyValueStore;
use oncodemo::infrastructure::traits::{EventSink, RealFileSystem, Sleeper};

/// Records every requested delay instead of sleeping.
///
/// Optionally cancels a token on the first delay, to simulate a user
/// pressing cancel while a stage is in flight.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
    cancel_on_first: OnceLock<CancellationToken>,
}

impl RecordingSleeper {
    pub fn cancel_on_first_sleep(&self, token: CancellationToken) {
        let _ = self.cancel_on_first.set(token);
    }

    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        let mut sleeps = self.sleeps.lock().unwrap();
        if sleeps.is_empty() {
            if let Some(token) = self.cancel_on_first.get() {
                token.cancel();
            }
        }
        sleeps.push(duration);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &PipelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Remote endpoint that is always unreachable.
pub struct UnreachableRemote;

impl RemoteTrainer for UnreachableRemote {
    fn train(&self, _config: &TrainConfig) -> Result<RemoteTrainResponse, RemoteError> {
        Err(RemoteError::Transport("connection refused".into()))
    }
}

/// Remote endpoint answering with a fixed JSON body.
pub struct CannedRemote(pub String);

impl RemoteTrainer for CannedRemote {
    fn train(&self, _config: &TrainConfig) -> Result<RemoteTrainResponse, RemoteError> {
        serde_json::from_str(&self.0).map_err(|e| RemoteError::Json(e.to_string()))
    }
}

pub const REMOTE_BODY: &str = r#"{
    "success": true,
    "dataset": {
        "name": "Breast Cancer Wisconsin (Diagnostic)",
        "samples": 569,
        "features": 30,
        "classes": {"benign": 357, "malignant": 212}
    },
    "model_info": {
        "algorithm": "Decision Tree",
        "parameters": {"criterion": "entropy", "max_depth": "7",
                       "min_samples_split": 5, "min_samples_leaf": 2}
    },
    "results": {
        "metrics": {"accuracy": 93.9, "precision": 95.1, "recall": 88.6, "f1Score": 91.8,
                    "sensitivity": 88.6, "specificity": 97.2, "ppv": 95.1, "npv": 93.3},
        "confusion_matrix": [[70, 2], [5, 37]],
        "roc_curve": {"fpr": [0.0, 0.03, 1.0], "tpr": [0.0, 0.88, 1.0], "auc": 0.93},
        "feature_importance": {"features": ["perimeter3", "texture3"], "importance": [71.2, 28.8]}
    }
}"#;

pub fn test_settings(data_dir: &Path) -> Settings {
    Settings {
        data_dir: data_dir.to_path_buf(),
        delays: DelayConfig { scale: 1.0 },
        ..Settings::default()
    }
}

pub struct Harness {
    pub container: ServiceContainer,
    pub sleeper: Arc<RecordingSleeper>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(data_dir: &Path, remote: Option<Arc<dyn RemoteTrainer>>) -> Harness {
    let fs = Arc::new(RealFileSystem);
    let sleeper = Arc::new(RecordingSleeper::default());
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(FileKeyValueStore::new(fs.clone(), data_dir));
    let container = ServiceContainer::with_deps(
        test_settings(data_dir),
        fs,
        sleeper.clone(),
        sink.clone(),
        store,
        remote,
    );
    Harness {
        container,
        sleeper,
        sink,
    }
}

/// Every key path of a JSON document; array elements share a `[]` segment.
pub fn key_paths(value: &serde_json::Value) -> BTreeSet<String> {
    fn walk(value: &serde_json::Value, prefix: &str, out: &mut BTreeSet<String>) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, child) in map {
                    let path = format!("{prefix}.{key}");
                    out.insert(path.clone());
                    walk(child, &path, out);
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    walk(item, &format!("{prefix}[]"), out);
                }
            }
            _ => {}
        }
    }
    let mut out = BTreeSet::new();
    walk(value, "", &mut out);
    out
}
