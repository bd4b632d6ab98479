//! Core data models for oometrics
//!
//! Two flat records describe a single analysed sample: [`ClassMetrics`] for a
//! class and [`MethodMetrics`] for a method. Both are produced by an external
//! collection pipeline; this crate only carries, checks and summarises them.
//!
//! The interchange representation uses the PascalCase field names of the
//! collection pipeline (`SampleId`, `LackOfCohesionInMethods`, ...).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Language assumed when a sample does not name one.
///
/// The collection pipeline has so far only targeted Java.
pub const DEFAULT_PROGRAMMING_LANGUAGE: &str = "Java";

fn default_language() -> String {
    DEFAULT_PROGRAMMING_LANGUAGE.to_string()
}

/// Uninitialised strings in the collection pipeline serialize as `null`
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_language<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_language))
}

/// Fields that only appear on method samples
pub const METHOD_ONLY_FIELDS: &[&str] = &["CyclomaticComplexity", "PathCount"];

/// Fields that only appear on class samples
pub const CLASS_ONLY_FIELDS: &[&str] = &[
    "DepthOfInheritanceTree",
    "FanIn",
    "FanOut",
    "LackOfCohesionInMethods",
    "NumberOfClasses",
    "NumberOfFields",
    "NumberOfMethods",
    "NumberOfPublicFields",
    "NumberOfPublicMethods",
    "WeightedMethodsPerClass",
];

/// Which record shape a sample (or a whole dataset) uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsKind {
    Class,
    Method,
}

impl MetricsKind {
    /// Detect the record kind from the keys of a JSON object.
    ///
    /// Returns `None` when the object carries no kind-specific field, or
    /// carries fields of both kinds.
    pub fn detect(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let has_method = METHOD_ONLY_FIELDS.iter().any(|k| object.contains_key(*k));
        let has_class = CLASS_ONLY_FIELDS.iter().any(|k| object.contains_key(*k));
        match (has_class, has_method) {
            (true, false) => Some(MetricsKind::Class),
            (false, true) => Some(MetricsKind::Method),
            _ => None,
        }
    }

    /// The other record kind
    pub fn other(self) -> Self {
        match self {
            MetricsKind::Class => MetricsKind::Method,
            MetricsKind::Method => MetricsKind::Class,
        }
    }

    /// Whether the object carries any field that only the other kind has
    pub fn has_foreign_fields(self, object: &serde_json::Map<String, serde_json::Value>) -> bool {
        let foreign = match self {
            MetricsKind::Class => METHOD_ONLY_FIELDS,
            MetricsKind::Method => CLASS_ONLY_FIELDS,
        };
        foreign.iter().any(|k| object.contains_key(*k))
    }
}

impl std::fmt::Display for MetricsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsKind::Class => write!(f, "class"),
            MetricsKind::Method => write!(f, "method"),
        }
    }
}

impl std::str::FromStr for MetricsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" | "classes" => Ok(MetricsKind::Class),
            "method" | "methods" => Ok(MetricsKind::Method),
            other => Err(format!(
                "Unknown record kind '{}'. Valid kinds: class, method",
                other
            )),
        }
    }
}

/// The four code-smell indicators carried by every sample.
///
/// `has_smell` is the value stored on the record. Whether it must agree with
/// the three specific flags is a validation policy, not a property of the
/// data; see [`SmellFlags::is_consistent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SmellFlags {
    pub has_smell: bool,
    pub has_complex_method: bool,
    pub has_long_parameter_list: bool,
    pub has_multifaceted_abstraction: bool,
}

impl SmellFlags {
    /// Logical OR of the three specific smells
    pub fn any_specific(&self) -> bool {
        self.has_complex_method || self.has_long_parameter_list || self.has_multifaceted_abstraction
    }

    /// Whether the stored `has_smell` agrees with [`Self::any_specific`]
    pub fn is_consistent(&self) -> bool {
        self.has_smell == self.any_specific()
    }

    /// Names of the specific smells that are set, in declaration order
    pub fn specific_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.has_complex_method {
            names.push("ComplexMethod");
        }
        if self.has_long_parameter_list {
            names.push("LongParameterList");
        }
        if self.has_multifaceted_abstraction {
            names.push("MultifacetedAbstraction");
        }
        names
    }
}

/// Public/total member counts of a class, for cross-field checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberCounts {
    pub fields: u32,
    pub public_fields: u32,
    pub methods: u32,
    pub public_methods: u32,
}

/// Common interface over class and method samples.
///
/// Validation, statistics and code-reference resolution are written against
/// this trait so they work on either dataset kind.
pub trait MetricsRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Record kind implemented by this type
    const KIND: MetricsKind;

    fn sample_id(&self) -> u32;
    fn code_reference_id(&self) -> u32;
    fn smells(&self) -> SmellFlags;
    fn set_has_smell(&mut self, value: bool);
    fn type_name(&self) -> &str;
    fn language(&self) -> &str;
    fn set_language(&mut self, language: String);
    fn code_text(&self) -> &str;
    fn set_code_text(&mut self, text: String);
    fn lines_of_code(&self) -> u32;

    /// Every numeric metric as `(interchange name, value)`, in a stable order
    fn numeric_metrics(&self) -> Vec<(&'static str, f64)>;

    /// Lack of cohesion, for record kinds that carry it
    fn lack_of_cohesion(&self) -> Option<f64> {
        None
    }

    /// Member counts, for record kinds that carry them
    fn member_counts(&self) -> Option<MemberCounts> {
        None
    }
}

/// Metrics collected for an individual class written in an object-oriented language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClassMetrics {
    /// Primary key of the collected class sample
    pub sample_id: u32,
    /// Key of the code reference holding this class's source text
    pub sample_code_reference_id: u32,

    pub has_smell: bool,
    pub has_complex_method: bool,
    pub has_long_parameter_list: bool,
    pub has_multifaceted_abstraction: bool,

    /// Number of inheritance layers above this class; 0 for a root class
    pub depth_of_inheritance_tree: u32,
    /// Number of classes or methods depending on this class
    pub fan_in: u32,
    /// Number of dependencies this class has
    pub fan_out: u32,
    /// How unrelated the class's methods are, in [0, 1]. Higher is less cohesive.
    pub lack_of_cohesion_in_methods: f64,
    pub lines_of_code: u32,
    /// Number of classes declared inside the class
    pub number_of_classes: u32,
    pub number_of_fields: u32,
    pub number_of_methods: u32,
    pub number_of_public_fields: u32,
    pub number_of_public_methods: u32,
    /// Sum of the complexity of all methods in the class
    pub weighted_methods_per_class: u32,

    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub type_name: String,
    #[serde(default = "default_language", deserialize_with = "deserialize_language")]
    pub programming_language: String,
    /// Raw source text of the analysed class
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub code_text: String,
}

impl Default for ClassMetrics {
    fn default() -> Self {
        Self {
            sample_id: 0,
            sample_code_reference_id: 0,
            has_smell: false,
            has_complex_method: false,
            has_long_parameter_list: false,
            has_multifaceted_abstraction: false,
            depth_of_inheritance_tree: 0,
            fan_in: 0,
            fan_out: 0,
            lack_of_cohesion_in_methods: 0.0,
            lines_of_code: 0,
            number_of_classes: 0,
            number_of_fields: 0,
            number_of_methods: 0,
            number_of_public_fields: 0,
            number_of_public_methods: 0,
            weighted_methods_per_class: 0,
            type_name: String::new(),
            programming_language: default_language(),
            code_text: String::new(),
        }
    }
}

impl MetricsRecord for ClassMetrics {
    const KIND: MetricsKind = MetricsKind::Class;

    fn sample_id(&self) -> u32 {
        self.sample_id
    }

    fn code_reference_id(&self) -> u32 {
        self.sample_code_reference_id
    }

    fn smells(&self) -> SmellFlags {
        SmellFlags {
            has_smell: self.has_smell,
            has_complex_method: self.has_complex_method,
            has_long_parameter_list: self.has_long_parameter_list,
            has_multifaceted_abstraction: self.has_multifaceted_abstraction,
        }
    }

    fn set_has_smell(&mut self, value: bool) {
        self.has_smell = value;
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn language(&self) -> &str {
        &self.programming_language
    }

    fn set_language(&mut self, language: String) {
        self.programming_language = language;
    }

    fn code_text(&self) -> &str {
        &self.code_text
    }

    fn set_code_text(&mut self, text: String) {
        self.code_text = text;
    }

    fn lines_of_code(&self) -> u32 {
        self.lines_of_code
    }

    fn numeric_metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("DepthOfInheritanceTree", self.depth_of_inheritance_tree as f64),
            ("FanIn", self.fan_in as f64),
            ("FanOut", self.fan_out as f64),
            ("LackOfCohesionInMethods", self.lack_of_cohesion_in_methods),
            ("LinesOfCode", self.lines_of_code as f64),
            ("NumberOfClasses", self.number_of_classes as f64),
            ("NumberOfFields", self.number_of_fields as f64),
            ("NumberOfMethods", self.number_of_methods as f64),
            ("NumberOfPublicFields", self.number_of_public_fields as f64),
            ("NumberOfPublicMethods", self.number_of_public_methods as f64),
            ("WeightedMethodsPerClass", self.weighted_methods_per_class as f64),
        ]
    }

    fn lack_of_cohesion(&self) -> Option<f64> {
        Some(self.lack_of_cohesion_in_methods)
    }

    fn member_counts(&self) -> Option<MemberCounts> {
        Some(MemberCounts {
            fields: self.number_of_fields,
            public_fields: self.number_of_public_fields,
            methods: self.number_of_methods,
            public_methods: self.number_of_public_methods,
        })
    }
}

/// Metrics collected for an individual method written in an object-oriented language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MethodMetrics {
    /// Primary key of the collected method sample
    pub sample_id: u32,
    /// Key of the code reference holding this method's source text
    pub sample_code_reference_id: u32,

    pub has_smell: bool,
    pub has_complex_method: bool,
    pub has_long_parameter_list: bool,
    pub has_multifaceted_abstraction: bool,

    pub cyclomatic_complexity: u32,
    pub lines_of_code: u32,
    /// Number of distinct execution paths through the method
    pub path_count: u32,

    /// Return type of the method
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub type_name: String,
    #[serde(default = "default_language", deserialize_with = "deserialize_language")]
    pub programming_language: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub code_text: String,
}

impl Default for MethodMetrics {
    fn default() -> Self {
        Self {
            sample_id: 0,
            sample_code_reference_id: 0,
            has_smell: false,
            has_complex_method: false,
            has_long_parameter_list: false,
            has_multifaceted_abstraction: false,
            cyclomatic_complexity: 0,
            lines_of_code: 0,
            path_count: 0,
            type_name: String::new(),
            programming_language: default_language(),
            code_text: String::new(),
        }
    }
}

impl MetricsRecord for MethodMetrics {
    const KIND: MetricsKind = MetricsKind::Method;

    fn sample_id(&self) -> u32 {
        self.sample_id
    }

    fn code_reference_id(&self) -> u32 {
        self.sample_code_reference_id
    }

    fn smells(&self) -> SmellFlags {
        SmellFlags {
            has_smell: self.has_smell,
            has_complex_method: self.has_complex_method,
            has_long_parameter_list: self.has_long_parameter_list,
            has_multifaceted_abstraction: self.has_multifaceted_abstraction,
        }
    }

    fn set_has_smell(&mut self, value: bool) {
        self.has_smell = value;
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn language(&self) -> &str {
        &self.programming_language
    }

    fn set_language(&mut self, language: String) {
        self.programming_language = language;
    }

    fn code_text(&self) -> &str {
        &self.code_text
    }

    fn set_code_text(&mut self, text: String) {
        self.code_text = text;
    }

    fn lines_of_code(&self) -> u32 {
        self.lines_of_code
    }

    fn numeric_metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("CyclomaticComplexity", self.cyclomatic_complexity as f64),
            ("LinesOfCode", self.lines_of_code as f64),
            ("PathCount", self.path_count as f64),
        ]
    }
}
