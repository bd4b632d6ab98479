//! Resolve and normalize commands - load a dataset, rewrite it, save it

use anyhow::{Context, Result};
use console::style;
use oometrics::config::ProjectConfig;
use oometrics::dataset::{self, load_any, AnyDataset, CodeReferenceStore};
use oometrics::models::MetricsKind;
use oometrics::reporters::{render_resolve, OutputFormat};
use std::path::Path;

/// Fill code text from a reference file and write the result
pub fn resolve(
    file: &Path,
    refs: &Path,
    output: &Path,
    overwrite: bool,
    kind: Option<MetricsKind>,
    format: OutputFormat,
) -> Result<()> {
    let mut data = load_any(file, kind)
        .with_context(|| format!("Failed to load dataset {}", file.display()))?;
    let store = CodeReferenceStore::load(refs)
        .with_context(|| format!("Failed to load code references {}", refs.display()))?;

    let summary = match &mut data {
        AnyDataset::Class(d) => dataset::resolve(d, &store, overwrite),
        AnyDataset::Method(d) => dataset::resolve(d, &store, overwrite),
    };

    save(&data, output)?;
    println!("{}", render_resolve(&summary, format)?);
    Ok(())
}

/// Derive HasSmell and fill empty languages, then write the result
pub fn normalize(
    file: &Path,
    output: &Path,
    kind: Option<MetricsKind>,
    config: &ProjectConfig,
) -> Result<()> {
    let mut data = load_any(file, kind)
        .with_context(|| format!("Failed to load dataset {}", file.display()))?;

    let language = config.defaults.language.as_str();
    let (smells, languages) = match &mut data {
        AnyDataset::Class(d) => (d.normalize_smells(), d.fill_default_language(language)),
        AnyDataset::Method(d) => (d.normalize_smells(), d.fill_default_language(language)),
    };

    save(&data, output)?;
    println!(
        "{} Normalized {} record(s): {} HasSmell value(s) derived, {} language(s) filled",
        style("✓").green(),
        data.len(),
        smells,
        languages
    );
    Ok(())
}

fn save(data: &AnyDataset, output: &Path) -> Result<()> {
    let result = match data {
        AnyDataset::Class(d) => d.save(output),
        AnyDataset::Method(d) => d.save(output),
    };
    result.with_context(|| format!("Failed to write {}", output.display()))
}
