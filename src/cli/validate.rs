//! Validate command - check a dataset against the schema invariants

use anyhow::{Context, Result};
use oometrics::config::{ProjectConfig, SmellPolicy};
use oometrics::dataset::{load_any, AnyDataset};
use oometrics::models::MetricsKind;
use oometrics::reporters::{render_validation, OutputFormat};
use oometrics::validate::Validator;
use std::path::Path;

/// Run the validate command
pub fn run(
    file: &Path,
    kind: Option<MetricsKind>,
    format: OutputFormat,
    strict: bool,
    policy: Option<SmellPolicy>,
    config: ProjectConfig,
) -> Result<()> {
    let mut validation = config.validation;
    if let Some(policy) = policy {
        validation.smell_policy = policy;
    }
    let strict = strict || validation.strict;

    let dataset = load_any(file, kind)
        .with_context(|| format!("Failed to load dataset {}", file.display()))?;

    let validator = Validator::new(&validation);
    let report = match &dataset {
        AnyDataset::Class(d) => validator.validate_dataset(d),
        AnyDataset::Method(d) => validator.validate_dataset(d),
    };

    println!("{}", render_validation(&report, format)?);

    if !report.is_clean(strict) {
        eprintln!(
            "Validation failed: {} error(s), {} warning(s){}",
            report.error_count(),
            report.warning_count(),
            if strict { " (strict)" } else { "" }
        );
        std::process::exit(1);
    }
    Ok(())
}
