//! Rendering of the final per-label table.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use super::EvaluationReport;
use crate::{Error, Result};

/// Output format of the final table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One indented block per label with two-decimal values.
    #[default]
    Text,
    /// Array of per-label objects including the raw counts.
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::InvalidConfig(format!(
                "unknown output format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Write the report to `writer` in the requested format.
pub fn write_report<W: Write>(
    writer: &mut W,
    report: &EvaluationReport,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for class in &report.classes {
                writeln!(writer, "{}:", class.label)?;
                writeln!(writer, "\tPrecision: {:.2}", class.metrics.precision)?;
                writeln!(writer, "\tRecall: {:.2}", class.metrics.recall)?;
                writeln!(writer, "\tF1 score: {:.2}", class.metrics.f1)?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &report.classes)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
