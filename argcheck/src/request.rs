//! The verification data model: an append-only record of the artifacts and results produced for
//! one verification call.

use crate::{
    logic::{Declarations, Formula},
    processing::{argdown::ArgdownGraph, xml::Element},
};
use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// The language of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Xml,
    Argdown,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Xml => "xml",
            DataType::Argdown => "argdown",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The parse state of an artifact.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A raw code snippet that has not been parsed yet.
    Unparsed,

    /// Parsing was attempted and failed. The reason is recorded as a result.
    Failed,

    Xml(Arc<Element>),
    Argdown(Arc<ArgdownGraph>),
}

/// Fence metadata, e.g. `{filename="map.ad"}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(pub IndexMap<String, serde_yaml::Value>);

impl Metadata {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_yaml::Value::as_str)
    }

    pub fn filename(&self) -> Option<&str> {
        self.get_str("filename")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                serde_yaml::Value::String(s) => write!(f, "{}: {:?}", key, s)?,
                other => {
                    let rendered = serde_yaml::to_string(other).unwrap_or_default();
                    write!(f, "{}: {}", key, rendered.trim_end())?;
                }
            }
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone)]
pub struct VerificationData {
    pub id: String,
    pub dtype: DataType,
    pub code_snippet: Option<String>,
    pub metadata: Option<Metadata>,
    pub payload: Payload,

    /// For parsed items, the id of the raw item they were parsed from.
    pub derived_from: Option<String>,
}

impl VerificationData {
    pub fn is_parsed(&self) -> bool {
        matches!(self.payload, Payload::Xml(_) | Payload::Argdown(_))
    }

    pub fn filename(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(Metadata::filename)
    }

    pub fn xml(&self) -> Option<&Arc<Element>> {
        match &self.payload {
            Payload::Xml(e) => Some(e),
            _ => None,
        }
    }

    pub fn argdown(&self) -> Option<&Arc<ArgdownGraph>> {
        match &self.payload {
            Payload::Argdown(g) => Some(g),
            _ => None,
        }
    }
}

/// Structured output that a check attaches to its result for later checks to consume.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultDetails {
    Formalizations {
        /// Parsed formalizations, keyed by proposition label.
        expressions: IndexMap<String, Arc<Formula>>,
        declarations: Declarations,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub verifier_id: String,
    pub data_refs: Vec<String>,
    pub is_valid: bool,
    pub message: Option<String>,
    pub details: Option<ResultDetails>,
}

impl VerificationResult {
    /// Builds a result that passes iff `messages` is empty, joining the messages with `separator`.
    pub fn from_messages(
        verifier_id: &str,
        data_refs: Vec<String>,
        messages: Vec<String>,
        separator: &str,
    ) -> Self {
        VerificationResult {
            verifier_id: verifier_id.to_owned(),
            data_refs,
            is_valid: messages.is_empty(),
            message: (!messages.is_empty()).then(|| messages.join(separator)),
            details: None,
        }
    }

    pub fn pass(verifier_id: &str, data_refs: Vec<String>) -> Self {
        Self::from_messages(verifier_id, data_refs, Vec::new(), "")
    }

    pub fn fail(verifier_id: &str, data_refs: Vec<String>, message: String) -> Self {
        Self::from_messages(verifier_id, data_refs, vec![message], "")
    }

    pub fn with_details(mut self, details: ResultDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// A shared parsed structure exposed to downstream consumers.
#[derive(Debug, Clone)]
pub enum Artifact {
    Xml(Arc<Element>),
    Argdown(Arc<ArgdownGraph>),
    Expressions(IndexMap<String, Arc<Formula>>),
    Declarations(Declarations),
}

/// A predicate selecting verification data items.
#[derive(Clone, Default)]
pub enum DataFilter {
    #[default]
    Any,
    OfType(DataType),

    /// The metadata value under `key` is one of `values`.
    MetadataIn {
        key: String,
        values: Vec<String>,
    },

    /// The fence metadata `filename` starts with the given prefix.
    FilenamePrefix(String),

    And(Box<DataFilter>, Box<DataFilter>),

    Custom(Arc<dyn Fn(&VerificationData) -> bool + Send + Sync>),
}

impl fmt::Debug for DataFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataFilter::Any => write!(f, "Any"),
            DataFilter::OfType(t) => write!(f, "OfType({})", t),
            DataFilter::MetadataIn { key, values } => {
                write!(f, "MetadataIn({}: {:?})", key, values)
            }
            DataFilter::FilenamePrefix(p) => write!(f, "FilenamePrefix({:?})", p),
            DataFilter::And(a, b) => write!(f, "And({:?}, {:?})", a, b),
            DataFilter::Custom(_) => write!(f, "Custom"),
        }
    }
}

impl DataFilter {
    pub fn filename_prefix(prefix: &str) -> Self {
        DataFilter::FilenamePrefix(prefix.to_owned())
    }

    pub fn and(self, other: DataFilter) -> Self {
        DataFilter::And(Box::new(self), Box::new(other))
    }

    pub fn matches(&self, data: &VerificationData) -> bool {
        match self {
            DataFilter::Any => true,
            DataFilter::OfType(t) => data.dtype == *t,
            DataFilter::MetadataIn { key, values } => data
                .metadata
                .as_ref()
                .and_then(|m| m.get_str(key))
                .is_some_and(|v| values.iter().any(|x| x == v)),
            DataFilter::FilenamePrefix(prefix) => {
                data.filename().is_some_and(|f| f.starts_with(prefix.as_str()))
            }
            DataFilter::And(a, b) => a.matches(data) && b.matches(data),
            DataFilter::Custom(f) => f(data),
        }
    }
}

/// The unit of work passed through the handler pipeline.
#[derive(Debug, Clone, Default)]
pub struct VerificationRequest {
    pub inputs: String,
    pub source: Option<String>,
    data: Vec<VerificationData>,
    results: Vec<VerificationResult>,
    artifacts: IndexMap<String, Artifact>,
    executed_handlers: Vec<String>,
}

impl VerificationRequest {
    pub fn new(inputs: impl Into<String>, source: Option<String>) -> Self {
        VerificationRequest { inputs: inputs.into(), source, ..Default::default() }
    }

    pub fn data(&self) -> &[VerificationData] {
        &self.data
    }

    pub fn results(&self) -> &[VerificationResult] {
        &self.results
    }

    pub fn artifacts(&self) -> &IndexMap<String, Artifact> {
        &self.artifacts
    }

    pub fn executed_handlers(&self) -> &[String] {
        &self.executed_handlers
    }

    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|r| r.is_valid)
    }

    /// Appends a new data item, assigning it the next id of the form `{dtype}_{n}`.
    pub fn add_data(
        &mut self,
        dtype: DataType,
        code_snippet: Option<String>,
        metadata: Option<Metadata>,
        payload: Payload,
        derived_from: Option<String>,
    ) -> String {
        let id = format!("{}_{}", dtype, self.data.len());
        self.data.push(VerificationData {
            id: id.clone(),
            dtype,
            code_snippet,
            metadata,
            payload,
            derived_from,
        });
        id
    }

    pub fn add_result(&mut self, result: VerificationResult) {
        self.results.push(result);
    }

    pub fn add_artifact(&mut self, key: impl Into<String>, artifact: Artifact) {
        self.artifacts.insert(key.into(), artifact);
    }

    pub(crate) fn record_handler(&mut self, name: &str) {
        self.executed_handlers.push(name.to_owned());
    }

    /// Items of the given type that went through parsing, successfully or not, and pass
    /// `filter`, in request order.
    pub fn attempts<'a, 'f>(
        &'a self,
        dtype: DataType,
        filter: &'f DataFilter,
    ) -> impl Iterator<Item = &'a VerificationData> + 'f
    where
        'a: 'f,
    {
        self.data
            .iter()
            .filter(move |d| d.dtype == dtype && d.derived_from.is_some() && filter.matches(d))
    }

    /// The last item of the given type that went through parsing and passes `filter`. Later
    /// blocks supersede earlier ones even when they fail to parse, in which case the returned
    /// item carries `Payload::Failed`.
    pub fn last_attempt(&self, dtype: DataType, filter: &DataFilter) -> Option<&VerificationData> {
        self.attempts(dtype, filter).last()
    }

    /// The most recent result produced by the given verifier.
    pub fn last_result_of(&self, verifier_id: &str) -> Option<&VerificationResult> {
        self.results.iter().rev().find(|r| r.verifier_id == verifier_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_blocks() -> VerificationRequest {
        let mut request = VerificationRequest::new("", None);
        for filename in ["map.ad", "reconstructions.ad", "map_v2.ad"] {
            let mut entries = IndexMap::new();
            entries.insert("filename".to_owned(), serde_yaml::Value::from(filename));
            let raw = request.add_data(
                DataType::Argdown,
                Some(String::new()),
                Some(Metadata(entries.clone())),
                Payload::Unparsed,
                None,
            );
            request.add_data(
                DataType::Argdown,
                None,
                Some(Metadata(entries)),
                Payload::Failed,
                Some(raw),
            );
        }
        request
    }

    #[test]
    fn test_data_filters() {
        let request = request_with_blocks();
        let count = |filter: DataFilter| request.attempts(DataType::Argdown, &filter).count();

        assert_eq!(count(DataFilter::Any), 3);
        assert_eq!(count(DataFilter::OfType(DataType::Xml)), 0);
        assert_eq!(count(DataFilter::filename_prefix("map")), 2);

        let listed = DataFilter::MetadataIn {
            key: "filename".to_owned(),
            values: vec!["map.ad".to_owned(), "reconstructions.ad".to_owned()],
        };
        assert_eq!(count(listed.clone()), 2);
        assert_eq!(count(listed.and(DataFilter::filename_prefix("map"))), 1);

        let versioned = |d: &VerificationData| d.filename().is_some_and(|f| f.contains('_'));
        assert_eq!(count(DataFilter::Custom(Arc::new(versioned))), 1);
    }

    #[test]
    fn test_last_attempt_supersedes_earlier_blocks() {
        let request = request_with_blocks();
        let last = request.last_attempt(DataType::Argdown, &DataFilter::filename_prefix("map"));
        let last = last.unwrap();
        assert_eq!(last.id, "argdown_5");
        assert_eq!(last.derived_from.as_deref(), Some("argdown_4"));
        assert!(!last.is_parsed());
        assert!(request.last_attempt(DataType::Xml, &DataFilter::Any).is_none());
    }

    #[test]
    fn test_results_and_history() {
        let mut request = VerificationRequest::new("", None);
        assert!(request.is_valid());

        request.record_handler("A");
        request.add_result(VerificationResult::pass("A", Vec::new()));
        request.record_handler("B");
        request.add_result(VerificationResult::fail("B", Vec::new(), "first".to_owned()));
        request.add_result(VerificationResult::fail("B", Vec::new(), "second".to_owned()));

        assert!(!request.is_valid());
        assert_eq!(request.executed_handlers(), ["A", "B"]);
        assert_eq!(request.last_result_of("B").and_then(|r| r.message.as_deref()), Some("second"));
        assert!(request.last_result_of("C").is_none());
    }
}
