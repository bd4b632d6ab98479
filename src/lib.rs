//! oometrics - code-quality metrics samples for object-oriented code
//!
//! Typed records for class and method metrics (complexity, coupling,
//! cohesion, code-smell flags), plus the tooling a collection pipeline needs
//! around them: dataset I/O, validation, code-reference resolution and
//! summary statistics.

pub mod config;
pub mod dataset;
pub mod models;
pub mod reporters;
pub mod stats;
pub mod validate;

pub use dataset::{AnyDataset, Dataset, DatasetError, DatasetFormat};
pub use models::{ClassMetrics, MethodMetrics, MetricsKind, MetricsRecord, SmellFlags};
pub use stats::DatasetStats;
pub use validate::{ValidationReport, Validator, Violation};
