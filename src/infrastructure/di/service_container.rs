//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{
    ExportService, FormStore, PipelineService, TrainingService,
};
use crate::config::Settings;
use crate::infrastructure::remote::{HttpRemoteTrainer, RemoteTrainer};
use crate::infrastructure::store::FileKeyValueStore;
use crate::infrastructure::traits::{
    EventSink, FileSystem, KeyValueStore, RealFileSystem, Sleeper, ThreadSleeper, TracingEventSink,
};

/// Container holding the I/O boundaries; services are built on demand.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Stage delay implementation
    pub sleeper: Arc<dyn Sleeper>,

    /// Receiver of the training log
    pub events: Arc<dyn EventSink>,

    /// Form and theme storage
    pub store: Arc<dyn KeyValueStore>,

    remote: Option<Arc<dyn RemoteTrainer>>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(FileKeyValueStore::new(fs.clone(), settings.data_dir.clone()));
        let remote = settings
            .api
            .enabled
            .then(|| http_trainer(&settings));
        Self::with_deps(
            settings,
            fs,
            Arc::new(ThreadSleeper),
            Arc::new(TracingEventSink),
            store,
            remote,
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        sleeper: Arc<dyn Sleeper>,
        events: Arc<dyn EventSink>,
        store: Arc<dyn KeyValueStore>,
        remote: Option<Arc<dyn RemoteTrainer>>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            sleeper,
            events,
            store,
            remote,
        }
    }

    /// Replace the event sink, e.g. with one that prints to the terminal.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Use the configured HTTP endpoint even if the config leaves it disabled.
    pub fn with_http_remote(mut self) -> Self {
        if self.remote.is_none() {
            self.remote = Some(http_trainer(&self.settings));
        }
        self
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    pub fn pipeline_service(&self) -> Arc<PipelineService> {
        Arc::new(PipelineService::new(
            self.sleeper.clone(),
            self.events.clone(),
            self.settings.delays.clone(),
        ))
    }

    /// A training service with its own pipeline and therefore its own state.
    pub fn training_service(&self) -> TrainingService {
        TrainingService::new(
            self.pipeline_service(),
            self.events.clone(),
            self.remote.clone(),
        )
    }

    pub fn form_store(&self) -> FormStore {
        FormStore::new(self.store.clone(), self.settings.default_theme)
    }

    pub fn export_service(&self) -> ExportService {
        ExportService::new(self.fs.clone(), self.events.clone())
    }
}

fn http_trainer(settings: &Settings) -> Arc<dyn RemoteTrainer> {
    debug!("remote endpoint: {}", settings.api.endpoint);
    Arc::new(HttpRemoteTrainer::new(
        settings.api.endpoint.clone(),
        settings.api.timeout(),
    ))
}
