//! Show command - print one sample

use anyhow::{Context, Result};
use oometrics::dataset::{load_any, AnyDataset};
use oometrics::models::MetricsKind;
use std::path::Path;

/// Run the show command
pub fn run(file: &Path, sample_id: u32, kind: Option<MetricsKind>) -> Result<()> {
    let dataset = load_any(file, kind)
        .with_context(|| format!("Failed to load dataset {}", file.display()))?;

    let json = match &dataset {
        AnyDataset::Class(d) => d.find(sample_id).map(serde_json::to_string_pretty),
        AnyDataset::Method(d) => d.find(sample_id).map(serde_json::to_string_pretty),
    };

    match json {
        Some(json) => {
            println!("{}", json?);
            Ok(())
        }
        None => anyhow::bail!(
            "No {} sample with SampleId {} in {} ({} records)",
            dataset.kind(),
            sample_id,
            file.display(),
            dataset.len()
        ),
    }
}
