//! Output reporters for oometrics results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::dataset::ResolveSummary;
use crate::stats::DatasetStats;
use crate::validate::ValidationReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a validation report
pub fn render_validation(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_validation(report)),
        OutputFormat::Json => json::render(report),
    }
}

/// Render dataset statistics
pub fn render_stats(stats: &DatasetStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_stats(stats)),
        OutputFormat::Json => json::render(stats),
    }
}

/// Render the outcome of resolving code references
pub fn render_resolve(summary: &ResolveSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_resolve(summary)),
        OutputFormat::Json => json::render(summary),
    }
}
