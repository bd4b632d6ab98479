//! Project-level configuration support
//!
//! Loads per-project configuration from `oometrics.toml` or
//! `.oometricsrc.json` in a dataset directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # oometrics.toml
//!
//! [validation]
//! smell_policy = "derived"       # "stored" (default) or "derived"
//! require_code_text = true
//! allowed_languages = ["Java"]
//! strict = false                 # treat warnings as failures
//!
//! [defaults]
//! language = "Java"
//! format = "text"
//! ```

use crate::models::DEFAULT_PROGRAMMING_LANGUAGE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File names searched by [`load_project_config`], in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["oometrics.toml", ".oometricsrc.json"];

/// Errors raised while reading an explicit config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How the stored `HasSmell` flag relates to the three specific smell flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmellPolicy {
    /// `HasSmell` is an independent stored value and is never checked
    #[default]
    Stored,
    /// `HasSmell` must equal the OR of the specific flags
    Derived,
}

impl std::str::FromStr for SmellPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stored" => Ok(SmellPolicy::Stored),
            "derived" => Ok(SmellPolicy::Derived),
            other => Err(format!(
                "Unknown smell policy '{}'. Valid policies: stored, derived",
                other
            )),
        }
    }
}

impl std::fmt::Display for SmellPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmellPolicy::Stored => write!(f, "stored"),
            SmellPolicy::Derived => write!(f, "derived"),
        }
    }
}

/// Project-level configuration loaded from oometrics.toml or similar
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProjectConfig {
    /// Validation rules and policy
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Validation settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ValidationConfig {
    #[serde(default)]
    pub smell_policy: SmellPolicy,

    /// Warn on samples with empty `CodeText`
    #[serde(default)]
    pub require_code_text: bool,

    /// Permitted `ProgrammingLanguage` values (case-insensitive). Empty allows any.
    #[serde(default)]
    pub allowed_languages: Vec<String>,

    /// Treat warnings as failures
    #[serde(default)]
    pub strict: bool,
}

impl ValidationConfig {
    /// Whether `language` passes the allow-list
    pub fn is_language_allowed(&self, language: &str) -> bool {
        self.allowed_languages.is_empty()
            || self
                .allowed_languages
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language))
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliDefaults {
    /// Language filled into samples with an empty `ProgrammingLanguage`
    #[serde(default = "default_language")]
    pub language: String,

    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for CliDefaults {
    fn default() -> Self {
        Self {
            language: default_language(),
            format: None,
        }
    }
}

fn default_language() -> String {
    DEFAULT_PROGRAMMING_LANGUAGE.to_string()
}

/// Load project configuration from a directory.
///
/// Searches for configuration files in this order:
/// 1. `oometrics.toml`
/// 2. `.oometricsrc.json`
///
/// A file that fails to parse is logged and skipped. Returns the default
/// configuration if nothing usable is found.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match ProjectConfig::from_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("{}", e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

impl ProjectConfig {
    /// Load a config file, choosing the parser from its extension.
    ///
    /// `.json` files are parsed as JSON; everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
