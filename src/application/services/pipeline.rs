//! Simulated training pipeline.
//!
//! Four stages run in a fixed order: load dataset, prepare data, train model,
//! evaluate model. A stage logs, waits, and returns a constant or
//! arithmetically derived record. Nothing is actually trained.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, instrument};

use crate::application::services::visualization::Visualizations;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::DelayConfig;
use crate::domain::catalog;
use crate::domain::{
    DataSplit, DatasetDescriptor, DatasetRef, ModelInfo, ModelParameters, PipelineEvent,
    PipelineOutput, PipelineState, TrainConfig, TrainingResult,
};
use crate::infrastructure::traits::{EventSink, Sleeper};

/// Nominal stage delays in milliseconds.
pub mod delays {
    pub const LOAD: u64 = 2000;
    pub const CATALOG_CHECK: u64 = 500;
    pub const URL_CHECK: u64 = 1000;
    pub const PREPARE: u64 = 1500;
    pub const TRAIN: u64 = 3000;
    pub const OPTIMIZE: u64 = 1000;
    pub const CROSS_VALIDATION: u64 = 1000;
    pub const EVALUATE: u64 = 1500;
    pub const VISUALIZE: u64 = 1000;
}

pub const STAGE_LOAD: &str = "load dataset";
pub const STAGE_PREPARE: &str = "prepare data";
pub const STAGE_TRAIN: &str = "train model";
pub const STAGE_EVALUATE: &str = "evaluate model";
pub const STAGE_VISUALIZE: &str = "generate visualizations";

/// Shared cancel flag.
///
/// Setting it never interrupts a stage; the run checks it once, after the
/// last stage has finished.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs the simulated stages and tracks the run state.
pub struct PipelineService {
    sleeper: Arc<dyn Sleeper>,
    events: Arc<dyn EventSink>,
    delays: DelayConfig,
    state: Mutex<PipelineState>,
    cancel: CancellationToken,
}

impl PipelineService {
    pub fn new(sleeper: Arc<dyn Sleeper>, events: Arc<dyn EventSink>, delays: DelayConfig) -> Self {
        Self {
            sleeper,
            events,
            delays,
            state: Mutex::new(PipelineState::Idle),
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.lock_state()
    }

    /// Handle for requesting cancellation from elsewhere.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation of the current run.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.emit(PipelineEvent::warning("Operation cancelled by user"));
    }

    /// Return to `idle` after a finished or failed run.
    pub fn reset(&self) -> ApplicationResult<()> {
        let mut state = self.lock_state();
        *state = state.transition(PipelineState::Idle)?;
        Ok(())
    }

    // A poisoned lock still holds a valid Copy state.
    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn advance(&self, to: PipelineState) -> ApplicationResult<()> {
        let mut state = self.lock_state();
        let next = state.transition(to)?;
        debug!("pipeline state: {} -> {}", *state, next);
        *state = next;
        Ok(())
    }

    fn fail(&self) {
        let mut state = self.lock_state();
        if let Ok(next) = state.transition(PipelineState::Error) {
            *state = next;
        }
    }

    fn emit(&self, event: PipelineEvent) {
        self.events.emit(&event);
    }

    fn wait(&self, millis: u64) {
        self.sleeper.sleep(self.delays.scaled(millis));
    }

    /// Run `body` as the named stage: failures are logged and wrapped.
    fn stage<T>(
        &self,
        name: &str,
        body: impl FnOnce() -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        body().map_err(|e| {
            let message = e.to_string();
            self.emit(PipelineEvent::error(format!("Failed to {name}: {message}")));
            ApplicationError::Stage {
                stage: name.into(),
                message,
            }
        })
    }

    /// Load the dataset descriptor.
    ///
    /// Catalog ids and URLs are checked with different fixed delays; an
    /// unknown catalog id fails here.
    #[instrument(level = "debug", skip(self))]
    pub fn load_dataset(&self, dataset: &DatasetRef) -> ApplicationResult<DatasetDescriptor> {
        self.stage(STAGE_LOAD, || {
            self.emit(PipelineEvent::info("Loading dataset..."));
            self.wait(delays::LOAD);
            match dataset {
                DatasetRef::Catalog(_) => self.wait(delays::CATALOG_CHECK),
                DatasetRef::Url(_) => self.wait(delays::URL_CHECK),
            }
            let descriptor = catalog::resolve(dataset)?;
            self.emit(PipelineEvent::success("Dataset loaded"));
            Ok(descriptor)
        })
    }

    /// Split the samples by the requested training percentage.
    #[instrument(level = "debug", skip(self, dataset), fields(dataset = %dataset.name))]
    pub fn prepare_data(
        &self,
        dataset: &DatasetDescriptor,
        train_size: u32,
    ) -> ApplicationResult<DataSplit> {
        self.stage(STAGE_PREPARE, || {
            self.emit(PipelineEvent::info("Preparing data for training..."));
            self.wait(delays::PREPARE);
            let split = DataSplit::from_percent(dataset.samples, dataset.features, train_size)?;
            self.emit(PipelineEvent::success("Data prepared"));
            Ok(split)
        })
    }

    #[instrument(level = "debug", skip(self, config))]
    pub fn train_model(&self, config: &TrainConfig) -> ApplicationResult<ModelInfo> {
        self.stage(STAGE_TRAIN, || {
            self.emit(PipelineEvent::info("Training model..."));
            self.wait(delays::TRAIN);
            self.emit(PipelineEvent::info("Optimizing hyperparameters..."));
            self.wait(delays::OPTIMIZE);
            self.emit(PipelineEvent::info("Running cross-validation..."));
            self.wait(delays::CROSS_VALIDATION);
            let model = ModelInfo {
                algorithm: catalog::ALGORITHM.into(),
                parameters: ModelParameters::from(config),
                cross_validation_score: Some(catalog::CROSS_VALIDATION_SCORE),
                training_time: Some(catalog::TRAINING_TIME.into()),
            };
            self.emit(PipelineEvent::success("Model trained"));
            Ok(model)
        })
    }

    /// Attach the reference results to `model`; only the timestamp varies.
    #[instrument(level = "debug", skip(self, model))]
    pub fn evaluate_model(&self, model: &ModelInfo) -> ApplicationResult<TrainingResult> {
        self.stage(STAGE_EVALUATE, || {
            self.emit(PipelineEvent::info("Evaluating model performance..."));
            self.wait(delays::EVALUATE);
            let result = TrainingResult {
                metrics: catalog::reference_metrics(),
                confusion_matrix: catalog::REFERENCE_CONFUSION_MATRIX,
                feature_importance: catalog::reference_feature_importance(),
                roc_curve: catalog::reference_roc_curve(),
                model: model.clone(),
                evaluation_time: catalog::EVALUATION_TIME.into(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            self.emit(PipelineEvent::success("Evaluation complete"));
            Ok(result)
        })
    }

    /// Run all four stages, driving the state machine.
    ///
    /// Requires the `idle` state. On failure the state becomes `error` and
    /// stays there until [`reset`](Self::reset).
    pub fn run(&self, config: &TrainConfig) -> ApplicationResult<PipelineOutput> {
        info!("pipeline run: dataset={}", config.dataset_url);

        self.advance(PipelineState::Loading)?;
        let dataset = self
            .load_dataset(&config.dataset_url)
            .inspect_err(|_| self.fail())?;

        self.advance(PipelineState::Preparing)?;
        let data = self
            .prepare_data(&dataset, config.train_size)
            .inspect_err(|_| self.fail())?;

        self.advance(PipelineState::Training)?;
        let model = self.train_model(config).inspect_err(|_| self.fail())?;

        self.advance(PipelineState::Evaluating)?;
        let results = self.evaluate_model(&model).inspect_err(|_| self.fail())?;

        self.advance(PipelineState::Done)?;
        info!("pipeline run complete");

        Ok(PipelineOutput {
            dataset,
            data,
            model,
            results,
        })
    }

    /// Map a finished run to chart shapes, as a logged and delayed step.
    pub fn generate_visualizations(
        &self,
        output: &PipelineOutput,
    ) -> ApplicationResult<Visualizations> {
        self.stage(STAGE_VISUALIZE, || {
            self.emit(PipelineEvent::info("Generating visualizations..."));
            self.wait(delays::VISUALIZE);
            let charts = Visualizations::from_output(output);
            self.emit(PipelineEvent::success("Visualizations generated"));
            Ok(charts)
        })
    }
}
