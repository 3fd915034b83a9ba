//! Command-line interface.
//!
//! Runs and inspects the bundled suites. Configuration is layered: defaults,
//! then an optional YAML file, then flags.

use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{ReportFormat, RunConfig},
    corpus,
    errors::{ConfigError, StructuralError},
    runner::Runner,
    tree::SpecTree,
};

mod output;

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "specrun",
    version,
    about = "Runs behaviour-driven spec suites with shared examples, guards and doubles."
)]
pub struct SpecrunArgs {
    /// Emit debug logs to stderr (RUST_LOG overrides the filter).
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: ArgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Run a bundled suite, or all of them.
    Run {
        #[command(flatten)]
        args: ConfigArgs,
    },
    /// Print the context tree with each guard's status.
    List {
        #[command(flatten)]
        args: ConfigArgs,
    },
    /// List the bundled suites.
    Suites,
}

/// Flags that feed the run configuration.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Suite to use; every bundled suite when omitted.
    #[arg(long)]
    pub suite: Option<String>,

    /// YAML file with run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Version the guards are evaluated against, e.g. 1.8.7.
    #[arg(long)]
    pub target_version: Option<String>,

    /// Platform identifier for platform guards.
    #[arg(long)]
    pub platform: Option<String>,

    /// Only run examples whose full description contains this text.
    #[arg(long)]
    pub filter: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    #[arg(long)]
    pub no_color: bool,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(version) = &self.target_version {
            config = config.with_target_version(version)?;
        }
        if let Some(platform) = &self.platform {
            config = config.with_platform(platform);
        }
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter);
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.no_color {
            config.use_colors = false;
        }
        debug!(?config, "resolved run configuration");
        Ok(config)
    }
}

/// Anything that stops the CLI before a report is produced.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Structure(#[from] StructuralError),

    #[error("failed to write output")]
    #[diagnostic(code(specrun::output))]
    Output(#[from] std::io::Error),

    #[error("failed to serialize report")]
    #[diagnostic(code(specrun::output::json))]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

pub fn run() {
    let args = SpecrunArgs::parse();
    if args.trace {
        init_tracing();
    }
    process::exit(execute(args.command));
}

/// Runs one command and returns the process exit status.
pub fn execute(command: ArgsCommand) -> i32 {
    let result = match command {
        ArgsCommand::Run { args } => run_suites(&args),
        ArgsCommand::List { args } => list_suites(&args).map(|()| 0),
        ArgsCommand::Suites => output::print_suites().map(|()| 0).map_err(CliError::from),
    };
    result.unwrap_or_else(|e| {
        output::print_error(e);
        2
    })
}

fn run_suites(args: &ConfigArgs) -> Result<i32, CliError> {
    let config = args.resolve()?;
    let tree = load_tree(args.suite.as_deref())?;
    let report = Runner::new(config.clone()).run(&tree);
    match config.format {
        ReportFormat::Text => output::print_report(&report, config.use_colors)?,
        ReportFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(report.exit_code())
}

fn list_suites(args: &ConfigArgs) -> Result<(), CliError> {
    let config = args.resolve()?;
    let tree = load_tree(args.suite.as_deref())?;
    output::print_outline(&tree, &config)?;
    Ok(())
}

fn load_tree(suite: Option<&str>) -> Result<SpecTree, CliError> {
    Ok(corpus::load(suite)?.build()?)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("specrun=debug"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
