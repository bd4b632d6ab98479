//! Metrics datasets
//!
//! A dataset is an ordered collection of samples of a single kind, stored
//! either as a JSON array or as JSON Lines (one record per line). The format
//! is chosen from the file extension: `.jsonl` / `.ndjson` are JSON Lines,
//! everything else is a JSON array.
//!
//! Unlike the append-only stores elsewhere, malformed records are never
//! skipped: the first bad record fails the load with its position.

pub mod code_refs;

pub use code_refs::{resolve, CodeReference, CodeReferenceStore, ResolveSummary};

use crate::models::{ClassMetrics, MethodMetrics, MetricsKind, MetricsRecord};
use rayon::prelude::*;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing datasets
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record at index {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot determine record kind: {0}")]
    UnknownKind(String),

    #[error("Expected {expected} records but found a {found} record at position {position}")]
    KindMismatch {
        expected: MetricsKind,
        found: MetricsKind,
        position: usize,
    },
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// On-disk layout of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// A single JSON array of records
    Json,
    /// One JSON record per line
    JsonLines,
}

impl DatasetFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jsonl") | Some("ndjson") => DatasetFormat::JsonLines,
            _ => DatasetFormat::Json,
        }
    }
}

/// Where a raw record came from, for error reporting
#[derive(Debug, Clone, Copy)]
enum Position {
    Line(usize),
    Index(usize),
}

impl Position {
    fn number(&self) -> usize {
        match self {
            Position::Line(n) | Position::Index(n) => *n,
        }
    }

    fn error(&self, source: serde_json::Error) -> DatasetError {
        match *self {
            Position::Line(line) => DatasetError::Parse { line, source },
            Position::Index(index) => DatasetError::Record { index, source },
        }
    }
}

/// Parse dataset text into raw JSON values, keeping each record's position
fn parse_raw(content: &str, format: DatasetFormat) -> DatasetResult<Vec<(Position, Value)>> {
    match format {
        DatasetFormat::JsonLines => {
            let mut values = Vec::new();
            for (i, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let position = Position::Line(i + 1);
                let value: Value = serde_json::from_str(line).map_err(|e| position.error(e))?;
                values.push((position, value));
            }
            Ok(values)
        }
        DatasetFormat::Json => {
            let values: Vec<Value> = serde_json::from_str(content)?;
            Ok(values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Position::Index(i), v))
                .collect())
        }
    }
}

/// Kind of the first record that carries kind-specific fields
fn detect_kind(values: &[(Position, Value)]) -> Option<(Position, MetricsKind)> {
    values.iter().find_map(|(pos, value)| {
        value
            .as_object()
            .and_then(MetricsKind::detect)
            .map(|kind| (*pos, kind))
    })
}

/// Deserialize raw values as `R`, failing on the first record that carries
/// a field only the other kind has (including records with both kinds' fields)
fn records_from_raw<R: MetricsRecord>(values: Vec<(Position, Value)>) -> DatasetResult<Vec<R>> {
    let foreign = values.iter().find(|(_, value)| {
        value
            .as_object()
            .is_some_and(|object| R::KIND.has_foreign_fields(object))
    });
    if let Some((pos, _)) = foreign {
        return Err(DatasetError::KindMismatch {
            expected: R::KIND,
            found: R::KIND.other(),
            position: pos.number(),
        });
    }

    values
        .into_iter()
        .map(|(pos, value)| serde_json::from_value(value).map_err(|e| pos.error(e)))
        .collect()
}

fn read_file(path: &Path) -> DatasetResult<String> {
    std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Sha256 of a sample's code text, with line endings normalised.
///
/// Used to spot samples that point at the same source under different ids.
pub fn code_fingerprint(code: &str) -> String {
    let normalized = code.replace("\r\n", "\n");
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

/// An ordered collection of samples of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<R> {
    pub records: Vec<R>,
    /// File the dataset was loaded from, if any
    pub source: Option<PathBuf>,
}

impl<R: MetricsRecord> Dataset<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            source: None,
        }
    }

    /// Record kind held by this dataset
    pub fn kind(&self) -> MetricsKind {
        R::KIND
    }

    /// Parse a dataset from text in the given format
    pub fn parse(content: &str, format: DatasetFormat) -> DatasetResult<Self> {
        let raw = parse_raw(content, format)?;
        Ok(Self::new(records_from_raw(raw)?))
    }

    /// Load a dataset, choosing the format from the file extension
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let content = read_file(path)?;
        let mut dataset = Self::parse(&content, DatasetFormat::from_path(path))?;
        dataset.source = Some(path.to_path_buf());
        tracing::info!(
            "Loaded {} {} samples from {}",
            dataset.len(),
            R::KIND,
            path.display()
        );
        Ok(dataset)
    }

    /// Serialize the dataset in the given format
    pub fn to_text(&self, format: DatasetFormat) -> DatasetResult<String> {
        match format {
            DatasetFormat::Json => Ok(serde_json::to_string_pretty(&self.records)?),
            DatasetFormat::JsonLines => {
                let mut out = String::new();
                for record in &self.records {
                    out.push_str(&serde_json::to_string(record)?);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }

    /// Write the dataset, choosing the format from the file extension
    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        let io_err = |source: std::io::Error| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = self.to_text(DatasetFormat::from_path(path))?;
        let mut file = std::fs::File::create(path).map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)?;

        tracing::info!(
            "Wrote {} {} samples to {}",
            self.len(),
            R::KIND,
            path.display()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// First record with the given sample id
    pub fn find(&self, sample_id: u32) -> Option<&R> {
        self.records.iter().find(|r| r.sample_id() == sample_id)
    }

    /// Sample ids that occur more than once, ascending
    pub fn duplicate_ids(&self) -> Vec<u32> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for record in &self.records {
            if !seen.insert(record.sample_id()) {
                duplicates.insert(record.sample_id());
            }
        }
        duplicates.into_iter().collect()
    }

    /// Groups of sample ids whose non-empty code text is identical
    pub fn duplicate_code(&self) -> Vec<Vec<u32>> {
        let fingerprints: Vec<(String, u32)> = self
            .records
            .par_iter()
            .filter(|r| !r.code_text().trim().is_empty())
            .map(|r| (code_fingerprint(r.code_text()), r.sample_id()))
            .collect();

        let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for (fingerprint, id) in fingerprints {
            groups.entry(fingerprint).or_default().push(id);
        }

        let mut duplicates: Vec<Vec<u32>> = groups
            .into_values()
            .filter(|ids| ids.len() > 1)
            .map(|mut ids| {
                ids.sort_unstable();
                ids
            })
            .collect();
        duplicates.sort();
        duplicates
    }

    /// Set `HasSmell` to the OR of the specific smell flags on every record.
    ///
    /// Returns the number of records changed.
    pub fn normalize_smells(&mut self) -> usize {
        let mut changed = 0;
        for record in &mut self.records {
            let flags = record.smells();
            if !flags.is_consistent() {
                record.set_has_smell(flags.any_specific());
                changed += 1;
            }
        }
        changed
    }

    /// Fill empty `ProgrammingLanguage` values with `language`.
    ///
    /// Returns the number of records changed.
    pub fn fill_default_language(&mut self, language: &str) -> usize {
        let mut changed = 0;
        for record in &mut self.records {
            if record.language().trim().is_empty() {
                record.set_language(language.to_string());
                changed += 1;
            }
        }
        changed
    }
}

/// A dataset whose kind is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum AnyDataset {
    Class(Dataset<ClassMetrics>),
    Method(Dataset<MethodMetrics>),
}

impl AnyDataset {
    pub fn kind(&self) -> MetricsKind {
        match self {
            AnyDataset::Class(_) => MetricsKind::Class,
            AnyDataset::Method(_) => MetricsKind::Method,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyDataset::Class(d) => d.len(),
            AnyDataset::Method(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a dataset of either kind.
///
/// With `kind` unset, the kind is detected from the first record carrying
/// kind-specific fields. Every record must then match that kind.
pub fn parse_any(
    content: &str,
    format: DatasetFormat,
    kind: Option<MetricsKind>,
) -> DatasetResult<AnyDataset> {
    let raw = parse_raw(content, format)?;
    let kind = match kind {
        Some(kind) => kind,
        None => match detect_kind(&raw) {
            Some((_, kind)) => kind,
            None if raw.is_empty() => {
                return Err(DatasetError::UnknownKind(
                    "dataset is empty; pass --kind".into(),
                ))
            }
            None => {
                return Err(DatasetError::UnknownKind(
                    "no record carries class- or method-specific fields; pass --kind".into(),
                ))
            }
        },
    };

    Ok(match kind {
        MetricsKind::Class => AnyDataset::Class(Dataset::new(records_from_raw(raw)?)),
        MetricsKind::Method => AnyDataset::Method(Dataset::new(records_from_raw(raw)?)),
    })
}

/// Load a dataset of either kind from a file
pub fn load_any(path: &Path, kind: Option<MetricsKind>) -> DatasetResult<AnyDataset> {
    let content = read_file(path)?;
    let mut dataset = parse_any(&content, DatasetFormat::from_path(path), kind)?;
    match &mut dataset {
        AnyDataset::Class(d) => d.source = Some(path.to_path_buf()),
        AnyDataset::Method(d) => d.source = Some(path.to_path_buf()),
    }
    tracing::info!(
        "Loaded {} {} samples from {}",
        dataset.len(),
        dataset.kind(),
        path.display()
    );
    Ok(dataset)
}

/// Load a class dataset
pub fn load_class_dataset(path: &Path) -> DatasetResult<Dataset<ClassMetrics>> {
    Dataset::load(path)
}

/// Load a method dataset
pub fn load_method_dataset(path: &Path) -> DatasetResult<Dataset<MethodMetrics>> {
    Dataset::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const METHODS_JSONL: &str = r#"{"SampleId": 1, "CyclomaticComplexity": 3, "LinesOfCode": 12, "PathCount": 4}

{"SampleId": 2, "CyclomaticComplexity": 14, "LinesOfCode": 80, "PathCount": 40, "HasComplexMethod": true}
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/methods.jsonl")),
            DatasetFormat::JsonLines
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("m.NDJSON")),
            DatasetFormat::JsonLines
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("classes.json")),
            DatasetFormat::Json
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("classes")),
            DatasetFormat::Json
        );
    }

    #[test]
    fn test_parse_jsonl_skips_blank_lines() {
        let dataset =
            Dataset::<MethodMetrics>::parse(METHODS_JSONL, DatasetFormat::JsonLines).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[1].cyclomatic_complexity, 14);
        assert!(dataset.records[1].has_complex_method);
        assert_eq!(dataset.kind(), MetricsKind::Method);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let content = "{\"SampleId\": 1}\n{\"SampleId\": 2,\n";
        let err = Dataset::<MethodMetrics>::parse(content, DatasetFormat::JsonLines).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_negative_value_reports_position() {
        let content = "{\"SampleId\": 1}\n\n{\"SampleId\": 2, \"PathCount\": -1}\n";
        let err = Dataset::<MethodMetrics>::parse(content, DatasetFormat::JsonLines).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { line: 3, .. }), "{err}");

        let content = r#"[{"SampleId": 1}, {"SampleId": -2}]"#;
        let err = Dataset::<ClassMetrics>::parse(content, DatasetFormat::Json).unwrap_err();
        assert!(matches!(err, DatasetError::Record { index: 1, .. }), "{err}");
    }

    #[test]
    fn test_kind_mismatch() {
        let err =
            Dataset::<ClassMetrics>::parse(METHODS_JSONL, DatasetFormat::JsonLines).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::KindMismatch {
                expected: MetricsKind::Class,
                found: MetricsKind::Method,
                position: 1,
            }
        ));
    }

    #[test]
    fn test_kind_mismatch_on_later_record() {
        let content = "{\"SampleId\": 1, \"FanIn\": 3}\n{\"SampleId\": 2, \"CyclomaticComplexity\": 9, \"PathCount\": 4}\n";

        let err = Dataset::<ClassMetrics>::parse(content, DatasetFormat::JsonLines).unwrap_err();
        assert!(
            matches!(
                err,
                DatasetError::KindMismatch {
                    expected: MetricsKind::Class,
                    found: MetricsKind::Method,
                    position: 2,
                }
            ),
            "{err}"
        );

        let err = parse_any(content, DatasetFormat::JsonLines, None).unwrap_err();
        assert!(
            matches!(err, DatasetError::KindMismatch { position: 2, .. }),
            "{err}"
        );
    }

    #[test]
    fn test_record_with_both_kinds_is_a_mismatch() {
        let content = r#"[{"SampleId": 1, "PathCount": 2}, {"SampleId": 2, "PathCount": 1, "FanIn": 4}]"#;

        let err = Dataset::<MethodMetrics>::parse(content, DatasetFormat::Json).unwrap_err();
        assert!(
            matches!(
                err,
                DatasetError::KindMismatch {
                    expected: MetricsKind::Method,
                    found: MetricsKind::Class,
                    position: 1,
                }
            ),
            "{err}"
        );

        let err = parse_any(content, DatasetFormat::Json, None).unwrap_err();
        assert!(matches!(err, DatasetError::KindMismatch { .. }), "{err}");
    }

    #[test]
    fn test_parse_any_detects_kind() {
        let dataset = parse_any(METHODS_JSONL, DatasetFormat::JsonLines, None).unwrap();
        assert_eq!(dataset.kind(), MetricsKind::Method);
        assert_eq!(dataset.len(), 2);

        let classes = r#"[{"SampleId": 1}, {"SampleId": 2, "FanIn": 4}]"#;
        let dataset = parse_any(classes, DatasetFormat::Json, None).unwrap();
        assert_eq!(dataset.kind(), MetricsKind::Class);
    }

    #[test]
    fn test_parse_any_unknown_kind() {
        let err = parse_any("[]", DatasetFormat::Json, None).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownKind(_)));

        let err = parse_any(r#"[{"SampleId": 1}]"#, DatasetFormat::Json, None).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownKind(_)));

        let dataset =
            parse_any(r#"[{"SampleId": 1}]"#, DatasetFormat::Json, Some(MetricsKind::Class))
                .unwrap();
        assert_eq!(dataset.kind(), MetricsKind::Class);
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = TempDir::new().unwrap();
        let dataset = Dataset::new(vec![
            ClassMetrics {
                sample_id: 1,
                lack_of_cohesion_in_methods: 0.5,
                type_name: "Invoice".into(),
                ..Default::default()
            },
            ClassMetrics {
                sample_id: 2,
                fan_out: 9,
                ..Default::default()
            },
        ]);

        for name in ["nested/out.json", "out.jsonl"] {
            let path = dir.path().join(name);
            dataset.save(&path).unwrap();
            let loaded = load_class_dataset(&path).unwrap();
            assert_eq!(loaded.records, dataset.records);
            assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        }

        let content = std::fs::read_to_string(dir.path().join("out.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);

        let methods = Dataset::new(vec![
            MethodMetrics {
                sample_id: 8,
                sample_code_reference_id: 80,
                has_smell: true,
                has_long_parameter_list: true,
                cyclomatic_complexity: 7,
                lines_of_code: 44,
                path_count: 12,
                type_name: "void".into(),
                programming_language: "C#".into(),
                code_text: "void Run(int a,\n        int b) {\n}\n".into(),
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 9,
                has_multifaceted_abstraction: true,
                path_count: 1,
                code_text: "\"quoted\"\ttab".into(),
                ..Default::default()
            },
        ]);

        for name in ["methods.json", "methods.jsonl"] {
            let path = dir.path().join(name);
            methods.save(&path).unwrap();
            let loaded = load_method_dataset(&path).unwrap();
            assert_eq!(loaded.records, methods.records);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_method_dataset(Path::new("/definitely/not/here.jsonl")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_duplicate_ids_and_find() {
        let dataset = Dataset::new(vec![
            MethodMetrics {
                sample_id: 5,
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 3,
                path_count: 2,
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 5,
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 3,
                ..Default::default()
            },
        ]);
        assert_eq!(dataset.duplicate_ids(), vec![3, 5]);
        assert_eq!(dataset.find(3).map(|m| m.path_count), Some(2));
        assert!(dataset.find(99).is_none());
    }

    #[test]
    fn test_duplicate_code_ignores_line_endings_and_empty_text() {
        let dataset = Dataset::new(vec![
            MethodMetrics {
                sample_id: 1,
                code_text: "void a() {\n}\n".into(),
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 2,
                code_text: "void a() {\r\n}\r\n".into(),
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 3,
                ..Default::default()
            },
            MethodMetrics {
                sample_id: 4,
                ..Default::default()
            },
        ]);
        assert_eq!(dataset.duplicate_code(), vec![vec![1, 2]]);
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let fp = code_fingerprint("class A {}");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, code_fingerprint("class A {}"));
        assert_ne!(fp, code_fingerprint("class B {}"));
    }

    #[test]
    fn test_normalize_smells_is_idempotent() {
        let mut dataset = Dataset::new(vec![
            ClassMetrics {
                sample_id: 1,
                has_complex_method: true,
                ..Default::default()
            },
            ClassMetrics {
                sample_id: 2,
                has_smell: true,
                ..Default::default()
            },
            ClassMetrics {
                sample_id: 3,
                has_smell: true,
                has_long_parameter_list: true,
                ..Default::default()
            },
        ]);

        assert_eq!(dataset.normalize_smells(), 2);
        assert!(dataset.records[0].has_smell);
        assert!(!dataset.records[1].has_smell);
        assert!(dataset.records[2].has_smell);
        assert_eq!(dataset.normalize_smells(), 0);
    }

    #[test]
    fn test_fill_default_language() {
        let mut dataset = Dataset::new(vec![
            MethodMetrics {
                programming_language: String::new(),
                ..Default::default()
            },
            MethodMetrics {
                programming_language: "Kotlin".into(),
                ..Default::default()
            },
        ]);
        assert_eq!(dataset.fill_default_language("Java"), 1);
        assert_eq!(dataset.records[0].programming_language, "Java");
        assert_eq!(dataset.records[1].programming_language, "Kotlin");
    }
}
