//! Configuration module for oometrics
//!
//! This module handles:
//! - Project-level configuration (oometrics.toml)
//! - Validation policy (smell aggregation, language allow-list)
//! - CLI defaults

mod project_config;

pub use project_config::{
    load_project_config, CliDefaults, ConfigError, ProjectConfig, SmellPolicy, ValidationConfig,
    CONFIG_FILE_NAMES,
};
