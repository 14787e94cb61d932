#![forbid(unsafe_code)]

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heatmpc_control::Simulator;
use heatmpc_core::{HeatingConfig, Scalar, SolveOptions};
use heatmpc_io::{
    read_config, write_config, write_report, write_report_to, write_trajectory_csv, RunReport,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heatmpc")]
#[command(version, about = "Receding-horizon heating controller simulation")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the closed loop and report the trajectory.
    Simulate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        horizon: Option<usize>,
        #[arg(long)]
        steps: Option<usize>,
        #[arg(long)]
        initial_temp: Option<Scalar>,
        #[arg(long)]
        max_action: Option<Scalar>,
        #[arg(long)]
        tol: Option<Scalar>,
        #[arg(long)]
        max_iters: Option<u32>,
        /// Per-solve time limit in seconds.
        #[arg(long)]
        time_limit: Option<f64>,
        /// Write the full run report as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print the run report as JSON instead of the text summary.
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file.
    Check {
        #[arg(long)]
        config: PathBuf,
    },
    /// Print or write the default configuration.
    DefaultConfig {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

struct Overrides {
    horizon: Option<usize>,
    steps: Option<usize>,
    initial_temp: Option<Scalar>,
    max_action: Option<Scalar>,
}

impl Overrides {
    fn apply(self, config: &mut HeatingConfig) {
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(steps) = self.steps {
            config.steps = Some(steps);
        }
        if let Some(initial_temp) = self.initial_temp {
            config.initial_temp = initial_temp;
        }
        if let Some(max_action) = self.max_action {
            config.max_action = max_action;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_json);
    match cli.command {
        Commands::Simulate {
            config,
            horizon,
            steps,
            initial_temp,
            max_action,
            tol,
            max_iters,
            time_limit,
            output,
            csv,
            json,
        } => {
            let overrides = Overrides {
                horizon,
                steps,
                initial_temp,
                max_action,
            };
            let options = solve_options(tol, max_iters, time_limit)?;
            simulate_command(config, overrides, options, output, csv, json)
        }
        Commands::Check { config } => check_command(config),
        Commands::DefaultConfig { output } => default_config_command(output),
    }
}

fn initialize_tracing(log_json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if log_json {
        builder.json().try_init().ok();
    } else {
        builder.try_init().ok();
    }
}

fn solve_options(
    tol: Option<Scalar>,
    max_iters: Option<u32>,
    time_limit: Option<f64>,
) -> Result<SolveOptions> {
    let mut options = SolveOptions::default();
    if let Some(tolerance) = tol {
        options.tolerance = tolerance;
    }
    if let Some(iters) = max_iters {
        options.max_iterations = iters;
    }
    if let Some(limit) = time_limit {
        let limit = Duration::try_from_secs_f64(limit)
            .with_context(|| format!("invalid time limit {limit}"))?;
        options.max_time = Some(limit);
    }
    Ok(options)
}

fn simulate_command(
    config_path: Option<PathBuf>,
    overrides: Overrides,
    options: SolveOptions,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => read_config(path)?,
        None => HeatingConfig::default(),
    };
    overrides.apply(&mut config);

    let trajectory = Simulator::new(config.clone())
        .options(options)
        .run()
        .context("invalid heating configuration")?;
    let report = RunReport::new(config, trajectory);
    info!(
        steps = report.summary.steps,
        fallback_steps = report.summary.fallback_steps,
        "simulation complete"
    );

    if json {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write_report_to(&mut handle, &report)?;
        handle.write_all(b"\n")?;
        handle.flush()?;
    } else {
        print!("{}", report::render(&report));
    }
    if let Some(path) = output {
        write_report(path, &report)?;
    }
    if let Some(path) = csv {
        write_trajectory_csv(path, &report.config, &report.trajectory)?;
    }
    Ok(())
}

fn check_command(path: PathBuf) -> Result<()> {
    let config = read_config(&path)?;
    println!(
        "Configuration is valid: horizon {}, {} steps.",
        config.horizon,
        config.total_steps()
    );
    Ok(())
}

fn default_config_command(output: Option<PathBuf>) -> Result<()> {
    let config = HeatingConfig::default();
    match output {
        Some(path) => write_config(path, &config),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &config)?;
            handle.write_all(b"\n")?;
            handle.flush()?;
            Ok(())
        }
    }
}
