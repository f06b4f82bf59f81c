//! Top-level training flow: validate, try the remote endpoint, fall back to
//! the simulated pipeline, check for cancellation.

use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::application::services::PipelineService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validation::to_train_config;
use crate::domain::{
    DataSplit, FeatureImportance, FormInput, Metrics, ModelInfo, ModelParameters, PipelineEvent,
    PipelineOutput, RocPoint, TrainConfig, TrainingResult,
};
use crate::infrastructure::remote::{FeatureLabel, RemoteError, RemoteTrainResponse, RemoteTrainer};
use crate::infrastructure::traits::EventSink;

pub struct TrainingService {
    pipeline: Arc<PipelineService>,
    events: Arc<dyn EventSink>,
    remote: Option<Arc<dyn RemoteTrainer>>,
}

impl TrainingService {
    /// `remote` is tried first when present.
    pub fn new(
        pipeline: Arc<PipelineService>,
        events: Arc<dyn EventSink>,
        remote: Option<Arc<dyn RemoteTrainer>>,
    ) -> Self {
        Self {
            pipeline,
            events,
            remote,
        }
    }

    pub fn pipeline(&self) -> &PipelineService {
        &self.pipeline
    }

    /// Validate the form and run the whole flow.
    ///
    /// An invalid form fails before any stage runs: nothing is logged to the
    /// event sink and nothing sleeps.
    pub fn process(&self, form: &FormInput) -> ApplicationResult<PipelineOutput> {
        debug!("process: {:?}", form);
        let config = to_train_config(form)?;
        self.run(&config)
    }

    /// Run with an already validated config.
    pub fn run(&self, config: &TrainConfig) -> ApplicationResult<PipelineOutput> {
        let cancel = self.pipeline.cancellation();
        cancel.reset();
        if self.pipeline.state().is_terminal() {
            self.pipeline.reset()?;
        }

        let output = match &self.remote {
            Some(remote) => match self.run_remote(remote.as_ref(), config) {
                Ok(output) => output,
                Err(e) => {
                    warn!("remote training failed, falling back: {}", e);
                    self.emit(PipelineEvent::error(format!("Remote API error: {e}")));
                    self.emit(PipelineEvent::warning("Using demonstration data..."));
                    self.pipeline.run(config)?
                }
            },
            None => self.pipeline.run(config)?,
        };

        if cancel.is_cancelled() {
            info!("run finished after cancellation request, discarding result");
            self.emit(PipelineEvent::error("Error: operation cancelled"));
            return Err(ApplicationError::Cancelled);
        }
        Ok(output)
    }

    fn emit(&self, event: PipelineEvent) {
        self.events.emit(&event);
    }

    fn run_remote(
        &self,
        remote: &dyn RemoteTrainer,
        config: &TrainConfig,
    ) -> Result<PipelineOutput, RemoteError> {
        self.emit(PipelineEvent::info("Connecting to the training API..."));
        let started = Instant::now();
        let response = remote.train(config)?;
        let elapsed = format!("{:.1}s", started.elapsed().as_secs_f64());
        let output = format_remote(response, config, &elapsed)?;
        self.emit(PipelineEvent::success("Remote processing complete"));
        Ok(output)
    }
}

/// Map a successful remote response onto the shape the simulation produces.
///
/// The split is recomputed from the requested percentage so both sides add
/// up to the sample count.
pub fn format_remote(
    response: RemoteTrainResponse,
    config: &TrainConfig,
    elapsed: &str,
) -> Result<PipelineOutput, RemoteError> {
    let missing = |what: &str| RemoteError::Json(format!("missing {what}"));

    let dataset = response.dataset.ok_or_else(|| missing("dataset"))?;
    let model_info = response.model_info.ok_or_else(|| missing("model_info"))?;
    let results = response.results.ok_or_else(|| missing("results"))?;

    let confusion_matrix = match results.confusion_matrix.as_slice() {
        [a, b] if a.len() == 2 && b.len() == 2 => [[a[0], a[1]], [b[0], b[1]]],
        other => {
            return Err(RemoteError::Json(format!(
                "expected a 2x2 confusion matrix, got {} rows",
                other.len()
            )))
        }
    };

    let features = results.feature_importance.features;
    if features.len() != results.feature_importance.importance.len() {
        return Err(RemoteError::Json(
            "feature names and importances differ in length".into(),
        ));
    }

    let roc = results.roc_curve;
    if roc.fpr.len() != roc.tpr.len() {
        return Err(RemoteError::Json("fpr and tpr differ in length".into()));
    }

    let params = model_info.parameters;
    let model = ModelInfo {
        algorithm: model_info.algorithm,
        parameters: ModelParameters {
            criterion: params.criterion,
            max_depth: params.max_depth.0,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
        },
        cross_validation_score: None,
        training_time: Some(elapsed.to_string()),
    };

    let metrics = results.metrics;
    let result = TrainingResult {
        metrics: Metrics {
            accuracy: metrics.accuracy,
            precision: metrics.precision,
            recall: metrics.recall,
            f1_score: metrics.f1_score,
            sensitivity: metrics.sensitivity,
            specificity: metrics.specificity,
            ppv: metrics.ppv,
            npv: metrics.npv,
            auc: roc.auc,
        },
        confusion_matrix,
        feature_importance: FeatureImportance {
            features: features.into_iter().map(FeatureLabel::into_name).collect(),
            importance: results.feature_importance.importance,
        },
        roc_curve: roc
            .fpr
            .iter()
            .zip(&roc.tpr)
            .map(|(&fpr, &tpr)| RocPoint { fpr, tpr })
            .collect(),
        model: model.clone(),
        evaluation_time: elapsed.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let data = DataSplit::from_percent(dataset.samples, dataset.features, config.train_size)
        .map_err(|e| RemoteError::Json(e.to_string()))?;

    Ok(PipelineOutput {
        dataset,
        data,
        model,
        results: result,
    })
}
