//! Init command - write a default oometrics.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# oometrics configuration

[validation]
# How HasSmell relates to the specific smell flags:
#   "stored"  - independent value, never checked (default)
#   "derived" - must equal HasComplexMethod || HasLongParameterList || HasMultifacetedAbstraction
smell_policy = "stored"

# Warn when a sample has no CodeText
require_code_text = false

# Permitted ProgrammingLanguage values (case-insensitive); empty allows any
allowed_languages = []

# Treat warnings as failures
strict = false

[defaults]
# Language filled in by `oometrics normalize` when a sample has none
language = "Java"

# Default output format (text, json)
# format = "text"
"#;

/// Run the init command
pub fn run(dir: &Path, force: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join("oometrics.toml");
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}
