use anyhow::{bail, Context, Result};
use atomsim_core::diagnostics::{
    format_diagnostic, format_error, format_parse_error, format_runtime_error,
};
use atomsim_core::{
    analyze_scenario, build_simulation_context_from_source, parse_scenario, run_to_end,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod logging;
mod viewer;

#[derive(Parser)]
#[command(name = "atomsim")]
#[command(about = "atomsim - circular atoms under drag and elastic collisions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print its detectors
    Run {
        /// Path to the scenario file
        file: PathBuf,
        /// Override the step count from the scenario
        #[arg(long)]
        steps: Option<u32>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse and analyze a scenario without running it
    Check {
        /// Path to the scenario file
        file: PathBuf,
    },
    /// Open a window that animates a scenario and reloads it on save
    View {
        /// Path to the scenario file
        file: PathBuf,
    },
}

fn main() {
    logging::init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run { file, steps, json } => run_file(&file, steps, json),
        Commands::Check { file } => check_file(&file),
        Commands::View { file } => viewer::run(file),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn run_file(file: &Path, steps: Option<u32>, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let (mut ctx, diagnostics) = match build_simulation_context_from_source(&source) {
        Ok(built) => built,
        Err(e) => bail!("{}", format_error(&e, &source)),
    };
    for diagnostic in &diagnostics {
        warn!("{}", format_diagnostic(diagnostic, &source));
    }
    if let Some(steps) = steps {
        ctx.max_steps = steps;
    }

    info!(atoms = ctx.world.len(), steps = ctx.max_steps, "running {}", file.display());
    let result = run_to_end(&mut ctx).map_err(|e| anyhow::anyhow!(format_runtime_error(&e)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for detector in result.detectors {
            println!("{} = {}", detector.name, detector.value);
        }
    }

    Ok(())
}

fn check_file(file: &Path) -> Result<()> {
    let source = read_source(file)?;
    let scenario = match parse_scenario(&source) {
        Ok(scenario) => scenario,
        Err(e) => bail!("{}", format_parse_error(&e, &source)),
    };

    let diagnostics = analyze_scenario(&scenario);
    for diagnostic in &diagnostics {
        println!("{}", format_diagnostic(diagnostic, &source));
    }
    if diagnostics.has_errors() {
        bail!(
            "{} error(s), {} warning(s)",
            diagnostics.error_count(),
            diagnostics.warning_count()
        );
    }

    println!(
        "{}: ok ({} atom(s), {} warning(s))",
        file.display(),
        scenario.atoms.len(),
        diagnostics.warning_count()
    );
    Ok(())
}
