//! Sample validation
//!
//! Checks records against the invariants of the metrics schema. Bad records
//! are never an `Err`: every problem becomes a [`Violation`] in a
//! [`ValidationReport`], so a whole dataset can be checked in one pass.
//!
//! Counts and identifiers are unsigned in the models, so non-negativity is
//! already enforced at load time and is not re-checked here.

use crate::config::{SmellPolicy, ValidationConfig};
use crate::dataset::Dataset;
use crate::models::{MetricsKind, MetricsRecord};
use rayon::prelude::*;
use serde::Serialize;

/// A schema rule a sample can break
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// `LackOfCohesionInMethods` outside [0, 1] or not finite
    CohesionOutOfRange,
    /// Stored `HasSmell` differs from the OR of the specific flags
    SmellFlagMismatch,
    MissingCodeText,
    EmptyLanguage,
    DisallowedLanguage,
    DuplicateSampleId,
    /// More public fields/methods than fields/methods in total
    PublicExceedsTotal,
    ZeroLinesOfCode,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::CohesionOutOfRange => "cohesion-out-of-range",
            Rule::SmellFlagMismatch => "smell-flag-mismatch",
            Rule::MissingCodeText => "missing-code-text",
            Rule::EmptyLanguage => "empty-language",
            Rule::DisallowedLanguage => "disallowed-language",
            Rule::DuplicateSampleId => "duplicate-sample-id",
            Rule::PublicExceedsTotal => "public-exceeds-total",
            Rule::ZeroLinesOfCode => "zero-lines-of-code",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How serious a violation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// One broken rule on one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub sample_id: u32,
    /// Position of the record in its dataset (0-based)
    pub index: usize,
    pub rule: Rule,
    pub level: Level,
    pub message: String,
}

/// Result of validating a dataset
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub kind: MetricsKind,
    pub total_records: usize,
    pub smell_policy: SmellPolicy,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.level == Level::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.level == Level::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// No errors (warnings allowed)
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// No errors, and no warnings either when `strict`
    pub fn is_clean(&self, strict: bool) -> bool {
        self.is_valid() && (!strict || self.warning_count() == 0)
    }

    /// Number of distinct records with at least one violation
    pub fn records_with_violations(&self) -> usize {
        let mut indices: Vec<usize> = self.violations.iter().map(|v| v.index).collect();
        indices.dedup();
        indices.len()
    }
}

/// Checks records against a [`ValidationConfig`]
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single record at position `index`
    pub fn validate_record<R: MetricsRecord>(&self, index: usize, record: &R) -> Vec<Violation> {
        let mut out = Vec::new();
        let sample_id = record.sample_id();
        let mut push = |rule: Rule, level: Level, message: String| {
            out.push(Violation {
                sample_id,
                index,
                rule,
                level,
                message,
            });
        };

        if let Some(lcom) = record.lack_of_cohesion() {
            if !lcom.is_finite() || !(0.0..=1.0).contains(&lcom) {
                push(
                    Rule::CohesionOutOfRange,
                    Level::Error,
                    format!("LackOfCohesionInMethods is {lcom}, expected a value in [0, 1]"),
                );
            }
        }

        if let Some(counts) = record.member_counts() {
            if counts.public_fields > counts.fields {
                push(
                    Rule::PublicExceedsTotal,
                    Level::Error,
                    format!(
                        "NumberOfPublicFields ({}) exceeds NumberOfFields ({})",
                        counts.public_fields, counts.fields
                    ),
                );
            }
            if counts.public_methods > counts.methods {
                push(
                    Rule::PublicExceedsTotal,
                    Level::Error,
                    format!(
                        "NumberOfPublicMethods ({}) exceeds NumberOfMethods ({})",
                        counts.public_methods, counts.methods
                    ),
                );
            }
        }

        let smells = record.smells();
        if self.config.smell_policy == SmellPolicy::Derived && !smells.is_consistent() {
            let specific = smells.specific_names();
            let detail = if specific.is_empty() {
                "no specific smell is set".to_string()
            } else {
                format!("specific smells: {}", specific.join(", "))
            };
            push(
                Rule::SmellFlagMismatch,
                Level::Error,
                format!("HasSmell is {} but {}", smells.has_smell, detail),
            );
        }

        if self.config.require_code_text && record.code_text().trim().is_empty() {
            push(
                Rule::MissingCodeText,
                Level::Warning,
                format!(
                    "CodeText is empty (SampleCodeReferenceId {})",
                    record.code_reference_id()
                ),
            );
        }

        let language = record.language();
        if language.trim().is_empty() {
            push(
                Rule::EmptyLanguage,
                Level::Warning,
                "ProgrammingLanguage is empty".to_string(),
            );
        } else if !self.config.is_language_allowed(language) {
            push(
                Rule::DisallowedLanguage,
                Level::Error,
                format!(
                    "ProgrammingLanguage '{}' is not in the allowed list ({})",
                    language,
                    self.config.allowed_languages.join(", ")
                ),
            );
        }

        if record.lines_of_code() == 0 {
            push(
                Rule::ZeroLinesOfCode,
                Level::Warning,
                "LinesOfCode is 0".to_string(),
            );
        }

        out
    }

    /// Validate every record in a dataset, plus cross-record checks.
    ///
    /// Violations are ordered by record index, then rule.
    pub fn validate_dataset<R: MetricsRecord>(&self, dataset: &Dataset<R>) -> ValidationReport {
        let mut violations: Vec<Violation> = dataset
            .records
            .par_iter()
            .enumerate()
            .flat_map_iter(|(i, record)| self.validate_record(i, record))
            .collect();

        let duplicates = dataset.duplicate_ids();
        if !duplicates.is_empty() {
            let mut first_seen = std::collections::HashSet::new();
            for (i, record) in dataset.records.iter().enumerate() {
                let id = record.sample_id();
                if duplicates.binary_search(&id).is_ok() && !first_seen.insert(id) {
                    violations.push(Violation {
                        sample_id: id,
                        index: i,
                        rule: Rule::DuplicateSampleId,
                        level: Level::Error,
                        message: format!("SampleId {id} already used by an earlier record"),
                    });
                }
            }
        }

        violations.sort_by(|a, b| a.index.cmp(&b.index).then(a.rule.cmp(&b.rule)));

        tracing::info!(
            "Validated {} {} samples: {} violation(s)",
            dataset.len(),
            R::KIND,
            violations.len()
        );

        ValidationReport {
            kind: R::KIND,
            total_records: dataset.len(),
            smell_policy: self.config.smell_policy,
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassMetrics, MethodMetrics};

    fn class(id: u32) -> ClassMetrics {
        ClassMetrics {
            sample_id: id,
            lines_of_code: 120,
            lack_of_cohesion_in_methods: 0.4,
            number_of_fields: 4,
            number_of_public_fields: 1,
            number_of_methods: 10,
            number_of_public_methods: 6,
            ..Default::default()
        }
    }

    fn rules(violations: &[Violation]) -> Vec<Rule> {
        violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn test_clean_record() {
        let validator = Validator::new(&ValidationConfig::default());
        assert!(validator.validate_record(0, &class(1)).is_empty());
    }

    #[test]
    fn test_cohesion_bounds() {
        let validator = Validator::new(&ValidationConfig::default());

        for ok in [0.0, 1.0, 0.5] {
            let mut c = class(1);
            c.lack_of_cohesion_in_methods = ok;
            assert!(validator.validate_record(0, &c).is_empty(), "{ok}");
        }

        for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            let mut c = class(1);
            c.lack_of_cohesion_in_methods = bad;
            let v = validator.validate_record(0, &c);
            assert_eq!(rules(&v), vec![Rule::CohesionOutOfRange], "{bad}");
            assert_eq!(v[0].level, Level::Error);
        }
    }

    #[test]
    fn test_public_exceeds_total() {
        let validator = Validator::new(&ValidationConfig::default());
        let mut c = class(1);
        c.number_of_public_methods = 11;
        c.number_of_public_fields = 5;
        let v = validator.validate_record(0, &c);
        assert_eq!(
            rules(&v),
            vec![Rule::PublicExceedsTotal, Rule::PublicExceedsTotal]
        );
    }

    #[test]
    fn test_smell_policy_stored_ignores_mismatch() {
        // Complex method set, the other two clear, HasSmell stored as false
        let mut c = class(1);
        c.has_complex_method = true;

        let stored = Validator::new(&ValidationConfig::default());
        assert!(stored.validate_record(0, &c).is_empty());

        let derived = Validator::new(&ValidationConfig {
            smell_policy: SmellPolicy::Derived,
            ..Default::default()
        });
        let v = derived.validate_record(0, &c);
        assert_eq!(rules(&v), vec![Rule::SmellFlagMismatch]);
        assert!(v[0].message.contains("ComplexMethod"));

        c.has_smell = true;
        assert!(derived.validate_record(0, &c).is_empty());
    }

    #[test]
    fn test_derived_flags_smell_without_specifics() {
        let derived = Validator::new(&ValidationConfig {
            smell_policy: SmellPolicy::Derived,
            ..Default::default()
        });
        let m = MethodMetrics {
            has_smell: true,
            lines_of_code: 4,
            ..Default::default()
        };
        let v = derived.validate_record(0, &m);
        assert_eq!(rules(&v), vec![Rule::SmellFlagMismatch]);
        assert!(v[0].message.contains("no specific smell"));
    }

    #[test]
    fn test_language_checks() {
        let config = ValidationConfig {
            allowed_languages: vec!["Java".into()],
            ..Default::default()
        };
        let validator = Validator::new(&config);

        let mut m = MethodMetrics {
            lines_of_code: 3,
            programming_language: "java".into(),
            ..Default::default()
        };
        assert!(validator.validate_record(0, &m).is_empty());

        m.programming_language = "Python".into();
        assert_eq!(
            rules(&validator.validate_record(0, &m)),
            vec![Rule::DisallowedLanguage]
        );

        m.programming_language = "  ".into();
        let v = validator.validate_record(0, &m);
        assert_eq!(rules(&v), vec![Rule::EmptyLanguage]);
        assert_eq!(v[0].level, Level::Warning);
    }

    #[test]
    fn test_missing_code_text_only_when_required() {
        let m = MethodMetrics {
            lines_of_code: 3,
            ..Default::default()
        };
        let lenient = Validator::new(&ValidationConfig::default());
        assert!(lenient.validate_record(0, &m).is_empty());

        let strict = Validator::new(&ValidationConfig {
            require_code_text: true,
            ..Default::default()
        });
        let v = strict.validate_record(0, &m);
        assert_eq!(rules(&v), vec![Rule::MissingCodeText]);
        assert_eq!(v[0].level, Level::Warning);
    }

    #[test]
    fn test_dataset_report_ordering_and_duplicates() {
        let mut bad = class(2);
        bad.lack_of_cohesion_in_methods = 3.0;
        bad.lines_of_code = 0;
        let dataset = Dataset::new(vec![class(1), bad, class(1), class(3)]);

        let validator = Validator::new(&ValidationConfig::default());
        let report = validator.validate_dataset(&dataset);

        assert_eq!(report.kind, MetricsKind::Class);
        assert_eq!(report.total_records, 4);
        assert_eq!(
            report
                .violations
                .iter()
                .map(|v| (v.index, v.rule))
                .collect::<Vec<_>>(),
            vec![
                (1, Rule::CohesionOutOfRange),
                (1, Rule::ZeroLinesOfCode),
                (2, Rule::DuplicateSampleId),
            ]
        );
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.records_with_violations(), 2);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_is_clean_strict() {
        let m = MethodMetrics {
            sample_id: 1,
            ..Default::default()
        };
        let dataset = Dataset::new(vec![m]);
        let report = Validator::new(&ValidationConfig::default()).validate_dataset(&dataset);

        // Only the zero-LOC warning
        assert!(report.is_valid());
        assert!(report.is_clean(false));
        assert!(!report.is_clean(true));
    }

    #[test]
    fn test_empty_dataset_is_clean() {
        let dataset: Dataset<MethodMetrics> = Dataset::new(Vec::new());
        let report = Validator::new(&ValidationConfig::default()).validate_dataset(&dataset);
        assert!(report.violations.is_empty());
        assert!(report.is_clean(true));
    }
}
