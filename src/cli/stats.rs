//! Stats command - summarise a dataset

use anyhow::{Context, Result};
use oometrics::dataset::{load_any, AnyDataset};
use oometrics::models::MetricsKind;
use oometrics::reporters::{render_stats, OutputFormat};
use oometrics::stats::DatasetStats;
use std::path::Path;

/// Run the stats command
pub fn run(file: &Path, kind: Option<MetricsKind>, format: OutputFormat) -> Result<()> {
    let dataset = load_any(file, kind)
        .with_context(|| format!("Failed to load dataset {}", file.display()))?;

    let stats = match &dataset {
        AnyDataset::Class(d) => DatasetStats::from_classes(d),
        AnyDataset::Method(d) => DatasetStats::from_methods(d),
    };

    println!("{}", render_stats(&stats, format)?);
    Ok(())
}
