//! Human-readable rendering of evaluation reports.

use std::io::{self, Write};

use clap::ValueEnum;
use thiserror::Error;

use crate::domain::ScenarioReport;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One YAML document per scenario.
    #[default]
    Yaml,
    /// A single pretty-printed JSON array.
    Json,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub fn write_reports<W: Write>(
    reports: &[ScenarioReport],
    format: OutputFormat,
    mut out: W,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Yaml => {
            for report in reports {
                writeln!(out, "---")?;
                out.write_all(serde_yaml::to_string(report)?.as_bytes())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, reports)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
