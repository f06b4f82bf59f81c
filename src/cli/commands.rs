//! Command dispatch: one function per subcommand.

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{render, ExportFormat, FormStore};
use crate::cli::args::{
    Cli, Commands, ConfigCommands, FormArgs, FormCommands, RunArgs, ThemeCommands,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::catalog;
use crate::domain::validation::validate_form;
use crate::domain::{
    DomainError, EventLevel, FieldStatus, FormInput, PipelineOutput, ValidationReport,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Steps reported by the progress bar: the four pipeline stages.
const PIPELINE_STEPS: usize = 4;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "oncodemo", &mut io::stdout());
        return Ok(());
    }

    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };
    let settings = Settings::load(Some(&config_dir))?;
    debug!("settings: {:?}", settings);

    match command {
        Commands::Train { form, run, json } => cmd_train(settings, form, run, *json),
        Commands::Validate { form } => cmd_validate(settings, form),
        Commands::Datasets => cmd_datasets(),
        Commands::Visualize { form, run, tree } => cmd_visualize(settings, form, run, *tree),
        Commands::Export {
            form,
            run,
            format,
            output,
        } => cmd_export(settings, form, run, (*format).into(), output),
        Commands::Form { command } => cmd_form(settings, command),
        Commands::Theme { command } => cmd_theme(settings, command),
        Commands::Config { command } => cmd_config(settings, command, &config_dir),
        Commands::Completion { .. } => Ok(()),
    }
}

fn container(mut settings: Settings, run: &RunArgs, steps: usize) -> ServiceContainer {
    if run.no_delay {
        settings.delays.scale = 0.0;
    }
    let container = ServiceContainer::new(settings)
        .with_events(Arc::new(output::ConsoleEventSink::new(steps)));
    if run.remote {
        container.with_http_remote()
    } else {
        container
    }
}

/// Saved form (or the preset), with the command-line flags on top.
fn resolve_form(store: &FormStore, args: &FormArgs) -> CliResult<FormInput> {
    let base = if args.preset {
        FormInput::preset()
    } else {
        store.load_form()?.unwrap_or_default()
    };
    Ok(base.overlay(args.overrides()))
}

fn print_report(report: &ValidationReport) {
    for (field, status) in &report.fields {
        match status {
            FieldStatus::Success => output::success_detail(field),
            FieldStatus::Error(message) => output::failure(&format!("{field}: {message}")),
        }
    }
}

/// Validate, run, and on success save the form that produced the result.
fn run_pipeline(
    container: &ServiceContainer,
    args: &FormArgs,
) -> CliResult<PipelineOutput> {
    let store = container.form_store();
    let form = resolve_form(&store, args)?;

    let report = validate_form(&form);
    if !report.is_valid() {
        output::header("Form");
        print_report(&report);
        output::toast(EventLevel::Error, "Please fix the highlighted fields");
        return Err(DomainError::Validation(report.errors()).into());
    }

    let preview = form.preview();
    output::toast(
        EventLevel::Info,
        &format!(
            "Training on {} ({}, split {})",
            preview.dataset, preview.criterion, preview.split
        ),
    );

    let training = container.training_service();
    let result = training.process(&form)?;
    store.save_form(&form)?;
    Ok(result)
}

#[instrument(skip(settings))]
fn cmd_train(settings: Settings, form: &FormArgs, run: &RunArgs, json: bool) -> CliResult<()> {
    let container = container(settings, run, PIPELINE_STEPS);
    let result = run_pipeline(&container, form)?;

    if json {
        output::info(&render(&result, ExportFormat::Json)?);
    } else {
        print_summary(&result);
    }
    output::toast(EventLevel::Success, "Training completed");
    Ok(())
}

fn print_summary(result: &PipelineOutput) {
    const W: usize = 22;

    output::header("Dataset");
    output::field("name", &result.dataset.name, W);
    output::field("samples", &result.dataset.samples, W);
    output::field("features", &result.dataset.features, W);
    for (class, count) in &result.dataset.classes {
        output::field(class, count, W);
    }

    output::header("Split");
    output::field("train samples", &result.data.train_samples, W);
    output::field("test samples", &result.data.test_samples, W);

    output::header("Model");
    let params = &result.model.parameters;
    output::field("algorithm", &result.model.algorithm, W);
    output::field("criterion", &params.criterion, W);
    let depth = params
        .max_depth
        .map_or_else(|| "None".to_string(), |d| d.to_string());
    output::field("max depth", &depth, W);
    output::field("min samples split", &params.min_samples_split, W);
    output::field("min samples leaf", &params.min_samples_leaf, W);
    if let Some(score) = result.model.cross_validation_score {
        output::field("cross-validation", &format!("{score:.1}%"), W);
    }

    output::header("Metrics");
    for (name, value) in result.results.metrics.entries() {
        let shown = if name == "auc" {
            format!("{value:.2}")
        } else {
            format!("{value:.1}%")
        };
        output::field(name, &shown, W);
    }

    output::header("Confusion matrix");
    let [[tn, fp], [fn_, tp]] = result.results.confusion_matrix;
    output::detail(&format!("{:>16} {:>12} {:>12}", "", "pred. benign", "pred. malig."));
    output::detail(&format!("{:>16} {:>12} {:>12}", "actual benign", tn, fp));
    output::detail(&format!("{:>16} {:>12} {:>12}", "actual malignant", fn_, tp));
}

#[instrument(skip(settings))]
fn cmd_validate(settings: Settings, args: &FormArgs) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let form = resolve_form(&container.form_store(), args)?;
    let report = validate_form(&form);

    output::header("Form");
    print_report(&report);

    let preview = form.preview();
    output::header("Preview");
    output::field("dataset", &preview.dataset, 10);
    output::field("criterion", &preview.criterion, 10);
    output::field("split", &preview.split, 10);

    if report.is_valid() {
        output::toast(EventLevel::Success, "Form is valid");
        Ok(())
    } else {
        Err(DomainError::Validation(report.errors()).into())
    }
}

fn cmd_datasets() -> CliResult<()> {
    for id in catalog::catalog_ids() {
        let Some(dataset) = catalog::lookup(id) else {
            continue;
        };
        output::header(&format!("{id}  {}", dataset.name));
        output::field("samples", &dataset.samples, 10);
        output::field("features", &dataset.features, 10);
        for (class, count) in &dataset.classes {
            output::field(class, count, 10);
        }
        output::detail(&dataset.description);
    }
    output::info(&"Any dataset URL is accepted as a custom dataset.");
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_visualize(settings: Settings, form: &FormArgs, run: &RunArgs, tree: bool) -> CliResult<()> {
    let container = container(settings, run, PIPELINE_STEPS + 1);
    let result = run_pipeline(&container, form)?;
    let charts = container.pipeline_service().generate_visualizations(&result)?;

    if tree {
        output::info(&charts.decision_tree.to_tree());
    } else {
        let body = serde_json::to_string_pretty(&charts)
            .map_err(|e| CliError::Usage(format!("encode charts: {e}")))?;
        output::info(&body);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_export(
    settings: Settings,
    form: &FormArgs,
    run: &RunArgs,
    format: ExportFormat,
    dir: &Path,
) -> CliResult<()> {
    let container = container(settings, run, PIPELINE_STEPS + 1);
    let result = run_pipeline(&container, form)?;
    let path = container.export_service().export(&result, format, dir)?;
    output::action("Exported", &path.display());
    Ok(())
}

fn cmd_form(settings: Settings, command: &FormCommands) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let store = container.form_store();
    match command {
        FormCommands::Show => {
            let Some(form) = store.load_form()? else {
                output::info(&"No saved form.");
                return Ok(());
            };
            output::header("Saved form");
            for field in crate::domain::form::FIELDS {
                output::field(field, form.get(field).unwrap_or_default(), 16);
            }
            let preview = form.preview();
            output::header("Preview");
            output::field("dataset", &preview.dataset, 16);
            output::field("criterion", &preview.criterion, 16);
            output::field("split", &preview.split, 16);
            Ok(())
        }
        FormCommands::Preset => {
            store.save_form(&FormInput::preset())?;
            output::success("Saved the example configuration");
            Ok(())
        }
        FormCommands::Clear => {
            store.clear_form()?;
            output::success("Cleared the saved form");
            Ok(())
        }
    }
}

fn cmd_theme(settings: Settings, command: &ThemeCommands) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let store = container.form_store();
    match command {
        ThemeCommands::Get => output::info(&store.theme()?),
        ThemeCommands::Set { theme } => {
            store.set_theme((*theme).into())?;
            output::action("Theme", &crate::domain::Theme::from(*theme));
        }
        ThemeCommands::Toggle => {
            let theme = store.toggle_theme()?;
            output::action("Theme", &theme);
        }
    }
    Ok(())
}

fn cmd_config(settings: Settings, command: &ConfigCommands, config_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?
            } else {
                local_config_path(config_dir)
            };
            write_template(&path)?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".into());
            output::field("global", &global, 8);
            output::field("local", &local_config_path(config_dir).display(), 8);
            output::field("data", &settings.data_dir.display(), 8);
            Ok(())
        }
    }
}

fn write_template(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}
