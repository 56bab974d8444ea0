//! Verifier configuration.

use crate::{logic::SolverConfig, ArgcheckResult};
use serde::Deserialize;

/// Tolerances of the source text integrity check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceIntegrityConfig {
    /// The largest accepted ratio of edit distance to text length.
    pub levenshtein_tolerance: f64,

    /// Sources longer than this many words may be annotated in shortened form.
    pub shortening_word_threshold: usize,
}

impl Default for SourceIntegrityConfig {
    fn default() -> Self {
        Self {
            levenshtein_tolerance: 0.01,
            shortening_word_threshold: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub from_key: String,
    pub formalization_key: String,
    pub declarations_key: String,
    pub annotation_ids_key: String,
    pub source_integrity: SourceIntegrityConfig,
    pub legal_argument_labels: Option<Vec<String>>,
    pub legal_ref_reco_labels: Option<Vec<String>>,
    pub min_arguments: usize,

    /// Whether the annotation, map and reconstruction suite also checks the annotation directly
    /// against the reconstructions, through `ref_reco_label`.
    pub annotation_reco_coherence: bool,

    pub solver: SolverConfig,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            from_key: "from".to_owned(),
            formalization_key: "formalization".to_owned(),
            declarations_key: "declarations".to_owned(),
            annotation_ids_key: "annotation_ids".to_owned(),
            source_integrity: SourceIntegrityConfig::default(),
            legal_argument_labels: None,
            legal_ref_reco_labels: None,
            min_arguments: 1,
            annotation_reco_coherence: false,
            solver: SolverConfig::default(),
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration from YAML. Missing fields take their default values.
    pub fn from_yaml(input: &str) -> ArgcheckResult<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_key(mut self, value: impl Into<String>) -> Self {
        self.from_key = value.into();
        self
    }

    pub fn formalization_key(mut self, value: impl Into<String>) -> Self {
        self.formalization_key = value.into();
        self
    }

    pub fn declarations_key(mut self, value: impl Into<String>) -> Self {
        self.declarations_key = value.into();
        self
    }

    pub fn annotation_ids_key(mut self, value: impl Into<String>) -> Self {
        self.annotation_ids_key = value.into();
        self
    }

    pub fn source_integrity(mut self, value: SourceIntegrityConfig) -> Self {
        self.source_integrity = value;
        self
    }

    pub fn legal_argument_labels(mut self, value: impl Into<Option<Vec<String>>>) -> Self {
        self.legal_argument_labels = value.into();
        self
    }

    pub fn legal_ref_reco_labels(mut self, value: impl Into<Option<Vec<String>>>) -> Self {
        self.legal_ref_reco_labels = value.into();
        self
    }

    pub fn min_arguments(mut self, value: usize) -> Self {
        self.min_arguments = value;
        self
    }

    pub fn annotation_reco_coherence(mut self, value: bool) -> Self {
        self.annotation_reco_coherence = value;
        self
    }

    pub fn solver(mut self, value: SolverConfig) -> Self {
        self.solver = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let config = VerifierConfig::from_yaml(
            "from_key: uses\nlegal_argument_labels: [A, B]\nsolver: {kind: bounded}\n",
        )
        .unwrap();
        assert_eq!(config.from_key, "uses");
        assert_eq!(config.formalization_key, "formalization");
        assert_eq!(config.legal_argument_labels, Some(vec!["A".to_owned(), "B".to_owned()]));
        assert_eq!(config.solver, SolverConfig::bounded());
        assert_eq!(config.source_integrity, SourceIntegrityConfig::default());

        assert!(VerifierConfig::from_yaml("min_arguments: many").is_err());
    }

    #[test]
    fn test_builder() {
        let config = VerifierConfig::new()
            .declarations_key("decls")
            .min_arguments(2)
            .solver(SolverConfig::bounded());
        assert_eq!(config.declarations_key, "decls");
        assert_eq!(config.min_arguments, 2);
        assert_eq!(config.annotation_ids_key, "annotation_ids");
        assert!(!config.annotation_reco_coherence);
        assert!(config.annotation_reco_coherence(true).annotation_reco_coherence);
    }
}
