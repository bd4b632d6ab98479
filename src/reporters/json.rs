//! JSON reporter
//!
//! Pretty-printed JSON of any report type, for piping to jq or CI tooling.

use anyhow::Result;
use serde::Serialize;

/// Render a serializable report as JSON
pub fn render<T: Serialize + ?Sized>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
