//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (Sleeper, EventSink, KeyValueStore, etc.)
//! but are themselves concrete structs, not traits.

mod export;
mod form_store;
mod pipeline;
mod training;
pub mod visualization;

pub use export::{metrics_csv, render, ExportFormat, ExportService};
pub use form_store::{FormStore, FORM_KEY, THEME_KEY};
pub use pipeline::{
    delays, CancellationToken, PipelineService, STAGE_EVALUATE, STAGE_LOAD, STAGE_PREPARE,
    STAGE_TRAIN, STAGE_VISUALIZE,
};
pub use training::{format_remote, TrainingService};
pub use visualization::Visualizations;
