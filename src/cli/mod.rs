//! CLI command definitions and handlers

mod init;
mod rewrite;
mod show;
mod stats;
mod validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oometrics::config::{load_project_config, ProjectConfig, SmellPolicy};
use oometrics::models::MetricsKind;
use oometrics::reporters::OutputFormat;
use std::path::{Path, PathBuf};

/// oometrics - code-quality metrics datasets
#[derive(Parser, Debug)]
#[command(name = "oometrics")]
#[command(
    version,
    about = "Validate, inspect and summarise class/method code-quality metrics datasets",
    after_help = "\
Examples:
  oometrics init                                   Write an oometrics.toml here
  oometrics validate classes.jsonl                 Check records against the schema
  oometrics validate methods.json --policy derived Also require HasSmell = OR of specific smells
  oometrics stats methods.jsonl --format json      Summary statistics as JSON
  oometrics show classes.jsonl 42                  Print sample 42
  oometrics resolve methods.jsonl --refs code.jsonl -o out.jsonl
  oometrics normalize classes.json -o classes.normalized.json"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file to use instead of searching next to the dataset
    #[arg(long, global = true, env = "OOMETRICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented oometrics.toml with the default settings
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing oometrics.toml
        #[arg(long)]
        force: bool,
    },

    /// Validate a dataset (exit code 1 if any error, or any warning with --strict)
    Validate {
        /// Dataset file (.json array or .jsonl)
        file: PathBuf,

        /// Record kind (detected from the records if omitted)
        #[arg(long, value_parser = ["class", "method"])]
        kind: Option<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,

        /// HasSmell policy: stored (independent) or derived (must equal OR of specific smells)
        #[arg(long, value_parser = ["stored", "derived"])]
        policy: Option<String>,
    },

    /// Show dataset statistics (smell prevalence, languages, metric ranges)
    Stats {
        /// Dataset file (.json array or .jsonl)
        file: PathBuf,

        /// Record kind (detected from the records if omitted)
        #[arg(long, value_parser = ["class", "method"])]
        kind: Option<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Print one sample as JSON
    Show {
        /// Dataset file (.json array or .jsonl)
        file: PathBuf,

        /// SampleId to show
        sample_id: u32,

        /// Record kind (detected from the records if omitted)
        #[arg(long, value_parser = ["class", "method"])]
        kind: Option<String>,
    },

    /// Fill CodeText from a code-reference file and write the dataset
    Resolve {
        /// Dataset file (.json array or .jsonl)
        file: PathBuf,

        /// Code reference file (SampleCodeReferenceId + CodeText records)
        #[arg(long)]
        refs: PathBuf,

        /// Output dataset path (format chosen by extension)
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Replace CodeText that is already present
        #[arg(long)]
        overwrite: bool,

        /// Record kind (detected from the records if omitted)
        #[arg(long, value_parser = ["class", "method"])]
        kind: Option<String>,

        /// Output format for the summary: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Derive HasSmell from the specific smells and fill empty languages
    Normalize {
        /// Dataset file (.json array or .jsonl)
        file: PathBuf,

        /// Output dataset path (format chosen by extension)
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Record kind (detected from the records if omitted)
        #[arg(long, value_parser = ["class", "method"])]
        kind: Option<String>,
    },

    /// Show version information
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let explicit_config = cli.config.as_deref();

    match cli.command {
        Commands::Init { dir, force } => init::run(&dir, force),

        Commands::Validate {
            file,
            kind,
            format,
            strict,
            policy,
        } => {
            let config = resolve_config(explicit_config, &file)?;
            let format = output_format(format.as_deref(), &config)?;
            let policy = policy
                .map(|p| p.parse::<SmellPolicy>())
                .transpose()
                .map_err(anyhow::Error::msg)?;
            validate::run(&file, parse_kind(kind.as_deref())?, format, strict, policy, config)
        }

        Commands::Stats { file, kind, format } => {
            let config = resolve_config(explicit_config, &file)?;
            let format = output_format(format.as_deref(), &config)?;
            stats::run(&file, parse_kind(kind.as_deref())?, format)
        }

        Commands::Show {
            file,
            sample_id,
            kind,
        } => show::run(&file, sample_id, parse_kind(kind.as_deref())?),

        Commands::Resolve {
            file,
            refs,
            output,
            overwrite,
            kind,
            format,
        } => {
            let config = resolve_config(explicit_config, &file)?;
            let format = output_format(format.as_deref(), &config)?;
            rewrite::resolve(
                &file,
                &refs,
                &output,
                overwrite,
                parse_kind(kind.as_deref())?,
                format,
            )
        }

        Commands::Normalize { file, output, kind } => {
            let config = resolve_config(explicit_config, &file)?;
            rewrite::normalize(&file, &output, parse_kind(kind.as_deref())?, &config)
        }

        Commands::Version => {
            println!("oometrics {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Explicit `--config` file, or discovery next to the dataset
fn resolve_config(explicit: Option<&Path>, dataset: &Path) -> Result<ProjectConfig> {
    if let Some(path) = explicit {
        return ProjectConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    let dir = dataset
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(load_project_config(dir))
}

/// `--format` flag, else the config default, else text
fn output_format(flag: Option<&str>, config: &ProjectConfig) -> Result<OutputFormat> {
    match flag.or(config.defaults.format.as_deref()) {
        Some(f) => f.parse(),
        None => Ok(OutputFormat::Text),
    }
}

fn parse_kind(kind: Option<&str>) -> Result<Option<MetricsKind>> {
    kind.map(|k| k.parse::<MetricsKind>())
        .transpose()
        .map_err(anyhow::Error::msg)
}
