//! Code references
//!
//! Samples point at their source text through `SampleCodeReferenceId`. The
//! text itself lives in a separate store of [`CodeReference`] records, in the
//! same JSON / JSON Lines layouts as datasets.

use super::{parse_raw, read_file, Dataset, DatasetFormat, DatasetResult};
use crate::models::MetricsRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::warn;

/// Source text stored under a code reference id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodeReference {
    pub sample_code_reference_id: u32,
    #[serde(default, deserialize_with = "crate::models::deserialize_nullable_string")]
    pub code_text: String,
}

/// In-memory index of code references by id
#[derive(Debug, Clone, Default)]
pub struct CodeReferenceStore {
    texts: HashMap<u32, String>,
}

impl CodeReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse references from text. Later entries win on duplicate ids.
    pub fn parse(content: &str, format: DatasetFormat) -> DatasetResult<Self> {
        let mut store = Self::new();
        for (pos, value) in parse_raw(content, format)? {
            let reference: CodeReference =
                serde_json::from_value(value).map_err(|e| pos.error(e))?;
            store.insert(reference);
        }
        Ok(store)
    }

    /// Load references, choosing the format from the file extension
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let content = read_file(path)?;
        let store = Self::parse(&content, DatasetFormat::from_path(path))?;
        tracing::info!(
            "Loaded {} code references from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn insert(&mut self, reference: CodeReference) {
        self.texts
            .insert(reference.sample_code_reference_id, reference.code_text);
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Outcome of resolving code text for a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    /// Records whose code text was written from the store
    pub filled: usize,
    /// Records that already had code text and were left alone
    pub already_present: usize,
    /// Reference ids with no entry in the store, ascending and unique
    pub missing: Vec<u32>,
}

/// Fill `CodeText` on each record from `store` by `SampleCodeReferenceId`.
///
/// Records that already carry text are only replaced when `overwrite` is set.
pub fn resolve<R: MetricsRecord>(
    dataset: &mut Dataset<R>,
    store: &CodeReferenceStore,
    overwrite: bool,
) -> ResolveSummary {
    let mut summary = ResolveSummary::default();
    let mut missing = BTreeSet::new();

    for record in &mut dataset.records {
        if !overwrite && !record.code_text().is_empty() {
            summary.already_present += 1;
            continue;
        }
        match store.get(record.code_reference_id()) {
            Some(text) => {
                record.set_code_text(text.to_string());
                summary.filled += 1;
            }
            None => {
                missing.insert(record.code_reference_id());
            }
        }
    }

    if !missing.is_empty() {
        warn!(
            "{} code reference(s) not found in store (first: {})",
            missing.len(),
            missing.iter().next().copied().unwrap_or_default()
        );
    }
    summary.missing = missing.into_iter().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassMetrics, MethodMetrics};

    fn store() -> CodeReferenceStore {
        let content = r#"{"SampleCodeReferenceId": 10, "CodeText": "int add(int a, int b) { return a + b; }"}
{"SampleCodeReferenceId": 11, "CodeText": "void noop() {}"}
"#;
        CodeReferenceStore::parse(content, DatasetFormat::JsonLines).unwrap()
    }

    #[test]
    fn test_parse_store() {
        let store = store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(11), Some("void noop() {}"));
        assert!(store.get(12).is_none());
    }

    #[test]
    fn test_later_entries_win() {
        let content = r#"[
            {"SampleCodeReferenceId": 1, "CodeText": "old"},
            {"SampleCodeReferenceId": 1, "CodeText": "new"}
        ]"#;
        let store = CodeReferenceStore::parse(content, DatasetFormat::Json).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1), Some("new"));
    }

    #[test]
    fn test_null_code_text_is_empty() {
        let content = r#"{"SampleCodeReferenceId": 3, "CodeText": null}"#;
        let store = CodeReferenceStore::parse(content, DatasetFormat::JsonLines).unwrap();
        assert_eq!(store.get(3), Some(""));
    }

    #[test]
    fn test_resolve_fills_and_reports_missing() {
        let mut dataset = Dataset::new(vec![
            MethodMetrics {
                sample_id: 1,
                sample_code_reference_id: 10,
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 2,
                sample_code_reference_id: 99,
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 3,
                sample_code_reference_id: 11,
                code_text: "kept".into(),
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 4,
                sample_code_reference_id: 99,
                ..Default::default()
            },
        ]);

        let summary = resolve(&mut dataset, &store(), false);
        assert_eq!(summary.filled, 1);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.missing, vec![99]);
        assert!(dataset.records[0].code_text.starts_with("int add"));
        assert_eq!(dataset.records[2].code_text, "kept");
    }

    #[test]
    fn test_resolve_overwrite() {
        let mut dataset = Dataset::new(vec![ClassMetrics {
            sample_code_reference_id: 11,
            code_text: "stale".into(),
            ..Default::default()
        }]);

        let summary = resolve(&mut dataset, &store(), true);
        assert_eq!(summary.filled, 1);
        assert_eq!(summary.already_present, 0);
        assert_eq!(dataset.records[0].code_text, "void noop() {}");
    }
}
