//! Dataset statistics
//!
//! Summarises a dataset: smell prevalence, language breakdown, min / max /
//! mean of every numeric metric and samples sharing identical code text.

use crate::dataset::Dataset;
use crate::models::{ClassMetrics, MethodMetrics, MetricsKind, MetricsRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// How often each smell flag is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmellPrevalence {
    pub has_smell: usize,
    pub complex_method: usize,
    pub long_parameter_list: usize,
    pub multifaceted_abstraction: usize,
    /// Records whose stored `HasSmell` disagrees with the specific flags
    pub inconsistent: usize,
}

/// Min, max and mean of one metric across a dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Summary of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub kind: MetricsKind,
    pub total: usize,
    pub smells: SmellPrevalence,
    pub languages: BTreeMap<String, usize>,
    /// Keyed by interchange field name
    pub metrics: BTreeMap<String, MetricSummary>,
    pub with_code_text: usize,
    /// Sample ids grouped by identical code text (see [`Dataset::duplicate_code`])
    pub duplicate_code: Vec<Vec<u32>>,
}

impl DatasetStats {
    pub fn from_classes(dataset: &Dataset<ClassMetrics>) -> Self {
        Self::from_dataset(dataset)
    }

    pub fn from_methods(dataset: &Dataset<MethodMetrics>) -> Self {
        Self::from_dataset(dataset)
    }

    pub fn from_dataset<R: MetricsRecord>(dataset: &Dataset<R>) -> Self {
        let mut smells = SmellPrevalence::default();
        let mut languages: BTreeMap<String, usize> = BTreeMap::new();
        let mut accumulators: BTreeMap<&'static str, (f64, f64, f64)> = BTreeMap::new();
        let mut with_code_text = 0;

        for record in dataset.iter() {
            let flags = record.smells();
            smells.has_smell += flags.has_smell as usize;
            smells.complex_method += flags.has_complex_method as usize;
            smells.long_parameter_list += flags.has_long_parameter_list as usize;
            smells.multifaceted_abstraction += flags.has_multifaceted_abstraction as usize;
            if !flags.is_consistent() {
                smells.inconsistent += 1;
            }

            *languages.entry(record.language().to_string()).or_default() += 1;

            if !record.code_text().trim().is_empty() {
                with_code_text += 1;
            }

            for (name, value) in record.numeric_metrics() {
                let acc = accumulators
                    .entry(name)
                    .or_insert((f64::INFINITY, f64::NEG_INFINITY, 0.0));
                acc.0 = acc.0.min(value);
                acc.1 = acc.1.max(value);
                acc.2 += value;
            }
        }

        let total = dataset.len();
        let metrics = accumulators
            .into_iter()
            .map(|(name, (min, max, sum))| {
                (
                    name.to_string(),
                    MetricSummary {
                        min,
                        max,
                        mean: sum / total as f64,
                    },
                )
            })
            .collect();

        Self {
            kind: R::KIND,
            total,
            smells,
            languages,
            metrics,
            with_code_text,
            duplicate_code: dataset.duplicate_code(),
        }
    }

    /// Share of records with `HasSmell` set, in [0, 1]
    pub fn smell_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.smells.has_smell as f64 / self.total as f64
        }
    }
}
