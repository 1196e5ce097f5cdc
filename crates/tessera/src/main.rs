use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{LevelFilter, error, info};
use tessera::{
    bundle::{BundleError, MissingInputError},
    config::Config,
    orchestrator::{BuildOptions, Orchestrator, Target},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pipelines to build
    #[arg(value_enum, default_value = "all")]
    targets: Vec<Target>,

    /// Copy sources unchanged, marking file boundaries in the CSS bundle
    #[arg(long)]
    no_minify: bool,

    /// Configuration file (default: ./tessera.toml, then the user config dir)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn init_logger(level: LevelFilter) {
    // RUST_LOG, when set, takes precedence over the command line
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let orchestrator = Orchestrator::new(config);
    let options = BuildOptions {
        minify: !cli.no_minify,
    };

    let report = orchestrator.run(&cli.targets, &options)?;
    info!("Build complete: {} file(s) written", report.outputs().count());
    Ok(())
}

/// Missing inputs reported anywhere in the error
fn missing_inputs(err: &anyhow::Error) -> Option<&MissingInputError> {
    err.downcast_ref::<MissingInputError>()
        .or_else(|| match err.downcast_ref::<BundleError>() {
            Some(BundleError::MissingInputs(missing)) => Some(missing),
            _ => None,
        })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(missing) = missing_inputs(&err) {
                error!("Build aborted, {} input file(s) missing:", missing.paths.len());
                for path in &missing.paths {
                    error!("  {}", path.display());
                }
            } else {
                error!("{err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
