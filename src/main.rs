use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use euler_dg::initialization::initialize_params_by_file;
use euler_dg::solver::FlowStepper;

/// Discontinuous Galerkin solver for the compressible Euler equations.
#[derive(Parser)]
#[command(name = "euler-dg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about, long_about = None)]
struct Cli {
    /// JSON parameter file
    #[arg(short, long, default_value = "inputs/solverparam.json")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level: LevelFilter = cli
        .log_level
        .parse()
        .map_err(|_| anyhow!("unknown log level `{}`", cli.log_level))?;
    Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .init();

    let solver_params = initialize_params_by_file(&cli.config)
        .with_context(|| format!("loading parameters from {}", cli.config.display()))?;
    let casename = solver_params.casename.clone();
    let summary = FlowStepper::new(solver_params)
        .run()
        .with_context(|| format!("running case {casename}"))?;
    log::info!(
        "{casename} finished after {} steps at t = {}, maxerr = {:e}",
        summary.steps,
        summary.time,
        summary.maxerr
    );
    Ok(())
}
