#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use heatmpc_control::{ActionSource, Trajectory, TrajectorySummary};
use heatmpc_core::{HeatingConfig, Scalar, Status};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Everything a plotting or analysis tool needs from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub config: HeatingConfig,
    pub summary: TrajectorySummary,
    pub trajectory: Trajectory,
}

impl RunReport {
    pub fn new(config: HeatingConfig, trajectory: Trajectory) -> Self {
        Self {
            summary: trajectory.summary(&config),
            config,
            trajectory,
        }
    }
}

pub fn parse_config(contents: &str) -> Result<HeatingConfig> {
    let config = match serde_json::from_str::<HeatingConfig>(contents) {
        Ok(config) => config,
        Err(parse_err) => {
            if serde_json::from_str::<RunReport>(contents).is_ok() {
                return Err(anyhow!(
                    "JSON contains a run report; pass the heating configuration instead."
                ));
            }
            return Err(parse_err).context("failed to parse heating configuration");
        }
    };
    config.validate().context("invalid heating configuration")?;
    Ok(config)
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<HeatingConfig> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .with_context(|| format!("failed to read {:?}", path))?;
    parse_config(&contents).with_context(|| format!("in {:?}", path))
}

pub fn write_config<P: AsRef<Path>>(path: P, config: &HeatingConfig) -> Result<()> {
    let mut writer = create_file(path.as_ref())?;
    serde_json::to_writer_pretty(&mut writer, config).context("failed to serialise config")?;
    writer.write_all(b"\n")?;
    writer
        .flush()
        .with_context(|| format!("failed to write config into {:?}", path.as_ref()))
}

pub fn write_report_to<W: Write>(writer: W, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, report).context("failed to serialise run report")
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &RunReport) -> Result<()> {
    let mut writer = create_file(path.as_ref())?;
    write_report_to(&mut writer, report)?;
    writer
        .flush()
        .with_context(|| format!("failed to write report into {:?}", path.as_ref()))
}

#[derive(Debug, Serialize)]
struct CsvRow {
    step: usize,
    hour: Scalar,
    temperature: Scalar,
    action: Option<Scalar>,
    source: Option<ActionSource>,
    status: Option<Status>,
}

/// One row per realized temperature; the terminal row has no action.
pub fn write_trajectory_csv_to<W: Write>(
    writer: W,
    config: &HeatingConfig,
    trajectory: &Trajectory,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (step, &temperature) in trajectory.temperatures.iter().enumerate() {
        let record = trajectory.records.get(step);
        csv.serialize(CsvRow {
            step,
            hour: step as Scalar * config.step_hours,
            temperature,
            action: record.map(|r| r.action),
            source: record.map(|r| r.source),
            status: record.map(|r| r.status),
        })
        .with_context(|| format!("failed to write trajectory row {step}"))?;
    }
    csv.flush().context("failed to flush trajectory CSV")?;
    Ok(())
}

pub fn write_trajectory_csv<P: AsRef<Path>>(
    path: P,
    config: &HeatingConfig,
    trajectory: &Trajectory,
) -> Result<()> {
    let writer = create_file(path.as_ref())?;
    write_trajectory_csv_to(writer, config, trajectory)
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent directory {:?}", parent))?;
        }
    }
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}
