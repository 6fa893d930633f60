//! # Rackline CLI
//!
//! Runs the sizing calculators on JSON parameter files and replays layout
//! edit scripts against an in-memory store.
//!
//! ```text
//! rackline power --input feeder.json
//! rackline design --json
//! rackline run requests.json
//! rackline layout edits.json --config rackline.json
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `info`).

mod report;
mod script;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rackline_core::calculations::service::{CalculationService, DesignInputs};
use rackline_core::calculations::{CalculationRequest, CoolingParams, EconomicParams, PowerParams};
use rackline_core::EngineSettings;

#[derive(Parser, Debug)]
#[command(name = "rackline", about = "Data-center power, cooling and cost calculator")]
struct Cli {
    /// Engine settings file (JSON)
    #[arg(long, global = true, env = "RACKLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fault current, arc flash, voltage drop and breaker sizing
    Power {
        /// Parameter file; defaults are used when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Cooling capacity, airflow, psychrometrics and redundancy
    Cooling {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// TCO, PUE, carbon footprint and ROI
    Economic {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// All three calculations from one file of design inputs
    Design {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Tagged calculation requests (one object or an array)
    Run { file: PathBuf },
    /// Replay a layout edit script and save the result
    Layout { script: PathBuf },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    match path {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Ok(EngineSettings::default()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => read_json(path),
        None => Ok(T::default()),
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<CalculationRequest>),
    One(CalculationRequest),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let service = CalculationService::new(settings.calculation.clone());

    match cli.command {
        Command::Power { input } => {
            let params: PowerParams = read_or_default(input.as_deref())?;
            let result = service.calculate_power(&params)?;
            emit(cli.json, &result, report::print_power)?;
        }
        Command::Cooling { input } => {
            let params: CoolingParams = read_or_default(input.as_deref())?;
            let result = service.calculate_cooling(&params)?;
            emit(cli.json, &result, report::print_cooling)?;
        }
        Command::Economic { input } => {
            let params: EconomicParams = read_or_default(input.as_deref())?;
            let result = service.calculate_economic(&params)?;
            emit(cli.json, &result, report::print_economic)?;
        }
        Command::Design { input } => {
            let inputs: DesignInputs = read_or_default(input.as_deref())?;
            let summary = service.calculate_all(&inputs)?;
            emit(cli.json, &summary, |summary| {
                report::print_power(&summary.power);
                report::print_cooling(&summary.cooling);
                report::print_economic(&summary.economic);
            })?;
        }
        Command::Run { file } => {
            let requests = match read_json::<RequestFile>(&file)? {
                RequestFile::Many(requests) => requests,
                RequestFile::One(request) => vec![request],
            };
            let mut outputs = Vec::with_capacity(requests.len());
            for request in &requests {
                let output = service
                    .calculate(request)
                    .with_context(|| format!("{} calculation failed", request.calc_type()))?;
                outputs.push(output);
            }
            emit(cli.json, &outputs, |outputs| {
                outputs.iter().for_each(report::print_output)
            })?;
        }
        Command::Layout { script } => {
            let steps: Vec<script::Step> = read_json(&script)?;
            let outcome = script::replay(&steps, &settings).await?;
            emit(cli.json, &outcome, report::print_layout)?;
        }
    }

    let slow = service.recent_metrics().iter().filter(|m| m.slow).count();
    if slow > 0 {
        tracing::warn!(slow, "some calculations exceeded the slow threshold");
    }
    Ok(())
}
