//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::services::ExportFormat;
use crate::domain::{FormOverrides, Theme};

/// Cancer detection showcase: dataset selection, simulated decision-tree training, results and chart data
#[derive(Parser, Debug)]
#[command(name = "oncodemo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory searched for .oncodemo.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the form and run the training pipeline
    Train {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Check form values without running anything
    Validate {
        #[command(flatten)]
        form: FormArgs,
    },

    /// List the dataset catalog
    Datasets,

    /// Run the pipeline and print chart data
    Visualize {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Print only the decision tree, as text
        #[arg(long)]
        tree: bool,
    },

    /// Run the pipeline and write the results to a file
    Export {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportArg::Json)]
        format: ExportArg,
        /// Output directory
        #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
        output: PathBuf,
    },

    /// Manage the saved form
    Form {
        #[command(subcommand)]
        command: FormCommands,
    },

    /// Manage the display theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Form fields; unset flags fall back to the saved form, then the defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct FormArgs {
    /// UCI dataset id (e.g. 17) or dataset URL
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Training share in percent (60-90)
    #[arg(long)]
    pub train_size: Option<String>,

    /// Split criterion: gini or entropy
    #[arg(long)]
    pub criterion: Option<String>,

    /// Maximum tree depth, or None
    #[arg(long)]
    pub max_depth: Option<String>,

    /// Minimum samples required to split a node
    #[arg(long)]
    pub min_samples_split: Option<String>,

    /// Minimum samples in a leaf
    #[arg(long)]
    pub min_samples_leaf: Option<String>,

    /// Start from the example configuration instead of the saved form
    #[arg(long)]
    pub preset: bool,
}

impl FormArgs {
    pub fn overrides(&self) -> FormOverrides {
        FormOverrides {
            dataset_url: self.dataset.clone(),
            train_size: self.train_size.clone(),
            criterion: self.criterion.clone(),
            max_depth: self.max_depth.clone(),
            min_samples_split: self.min_samples_split.clone(),
            min_samples_leaf: self.min_samples_leaf.clone(),
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Try the remote training endpoint first
    #[arg(long)]
    pub remote: bool,

    /// Skip the simulated stage delays
    #[arg(long)]
    pub no_delay: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportArg {
    Json,
    Csv,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum FormCommands {
    /// Show the saved form and its preview
    Show,

    /// Save the example configuration
    Preset,

    /// Delete the saved form
    Clear,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// Print the current theme
    Get,

    /// Store a theme
    Set {
        #[arg(value_enum)]
        theme: ThemeArg,
    },

    /// Switch between light and dark
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
