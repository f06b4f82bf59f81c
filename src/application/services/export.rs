//! Writing run results to disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use tracing::info;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, Metrics, PipelineEvent, PipelineOutput};
use crate::infrastructure::traits::{EventSink, FileSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The whole run output, pretty-printed
    Json,
    /// Metric names and values
    Csv,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "model_results.json",
            ExportFormat::Csv => "model_metrics.csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(DomainError::InvalidValue {
                field: "format".into(),
                value: other.into(),
            }),
        }
    }
}

/// Header row of metric names, then one row of values.
pub fn metrics_csv(metrics: &Metrics) -> String {
    let entries = metrics.entries();
    let header = entries.iter().map(|(name, _)| name).join(",");
    let values = entries.iter().map(|(_, value)| value).join(",");
    format!("{header}\n{values}\n")
}

pub fn render(output: &PipelineOutput, format: ExportFormat) -> ApplicationResult<String> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(output).map_err(|e| ApplicationError::OperationFailed {
                context: "encode results".into(),
                source: Box::new(e),
            })
        }
        ExportFormat::Csv => Ok(metrics_csv(&output.results.metrics)),
    }
}

pub struct ExportService {
    fs: Arc<dyn FileSystem>,
    events: Arc<dyn EventSink>,
}

impl ExportService {
    pub fn new(fs: Arc<dyn FileSystem>, events: Arc<dyn EventSink>) -> Self {
        Self { fs, events }
    }

    /// Write `output` into `dir` under the format's file name.
    pub fn export(
        &self,
        output: &PipelineOutput,
        format: ExportFormat,
        dir: &Path,
    ) -> ApplicationResult<PathBuf> {
        let path = dir.join(format.file_name());
        let result = render(output, format).and_then(|body| {
            self.fs
                .ensure_parent(&path)
                .and_then(|_| self.fs.write(&path, &body))
                .with_path_context("write export", &path)
        });
        match result {
            Ok(()) => {
                info!("exported {} to {}", format, path.display());
                self.events.emit(&PipelineEvent::success(format!(
                    "Download ready: {}",
                    format.file_name()
                )));
                Ok(path)
            }
            Err(e) => {
                self.events
                    .emit(&PipelineEvent::error(format!("Download failed: {e}")));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;

    #[test]
    fn given_reference_metrics_when_rendering_csv_then_one_header_one_row() {
        let csv = metrics_csv(&catalog::reference_metrics());
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "accuracy,precision,recall,f1Score,sensitivity,specificity,ppv,npv,auc"
        );
        assert_eq!(lines[1], "95.6,100,88.1,93.7,88.1,100,100,93.5,0.94");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn given_format_name_when_parsing_then_case_insensitive() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
