//! Reduction of a finished request to a single evaluation.

use crate::{
    handlers::logreco::WELL_FORMED_FORMULAS_ID,
    logic::{Declarations, Formula},
    processing::{argdown::ArgdownGraph, xml::Element},
    request::{ResultDetails, VerificationData, VerificationRequest},
    utils::DedupIterator,
};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::{fmt, sync::Arc};

/// Groups verifier ids under named failure dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionMap(IndexMap<String, Vec<String>>);

impl DimensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: &str, verifier_ids: &[&str]) -> Self {
        let ids = verifier_ids.iter().map(|&id| id.to_owned()).collect();
        self.0.insert(dimension.to_owned(), ids);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn dimension_of(&self, verifier_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, ids)| ids.iter().any(|id| id == verifier_id))
            .map(|(dimension, _)| dimension.as_str())
    }

    /// The roll-up of informal reconstruction checks.
    pub fn infreco() -> Self {
        Self::new()
            .with(
                "illformed_argument",
                &[
                    "InfReco.HasPCSHandler",
                    "InfReco.StartsWithPremiseHandler",
                    "InfReco.EndsWithConclusionHandler",
                    "InfReco.NoDuplicatePCSLabelsHandler",
                ],
            )
            .with("missing_label_gist", &["InfReco.HasLabelHandler", "InfReco.HasGistHandler"])
            .with("missing_inference_info", &["InfReco.HasInferenceDataHandler"])
            .with("unknown_proposition_references", &["InfReco.PropRefsExistHandler"])
            .with("unused_propositions", &["InfReco.UsesAllPropsHandler"])
            .with("disallowed_material", &["InfReco.NoExtraPropositionsHandler"])
    }

    /// The roll-up of logical reconstruction checks.
    pub fn logreco() -> Self {
        Self::infreco()
            .with("flawed_formalizations", &[WELL_FORMED_FORMULAS_ID])
            .with(
                "invalid_inference",
                &[
                    "LogReco.GlobalDeductiveValidityHandler",
                    "LogReco.LocalDeductiveValidityHandler",
                ],
            )
            .with("redundant_premises", &["LogReco.AllPremisesRelevantHandler"])
            .with("inconsistent_premises", &["LogReco.PremisesConsistentHandler"])
    }
}

/// Parsed structures carried over from the request for downstream consumers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationArtifacts {
    #[serde(serialize_with = "display_or_none")]
    pub annotation: Option<Arc<Element>>,

    #[serde(skip)]
    pub argdown: Option<Arc<ArgdownGraph>>,

    #[serde(skip)]
    pub argdown_map: Option<Arc<ArgdownGraph>>,

    #[serde(skip)]
    pub argdown_reco: Option<Arc<ArgdownGraph>>,

    #[serde(serialize_with = "formulas_or_none")]
    pub all_expressions: Option<IndexMap<String, Arc<Formula>>>,

    pub all_declarations: Option<Declarations>,
}

fn display_or_none<T, S>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    match value {
        Some(v) => s.collect_str(v),
        None => s.serialize_none(),
    }
}

fn formulas_or_none<S: Serializer>(
    value: &Option<IndexMap<String, Arc<Formula>>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(map) => s.collect_map(map.iter().map(|(label, f)| (label, f.to_string()))),
        None => s.serialize_none(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub is_valid: bool,

    /// Failure messages by verifier or dimension. Passed entries hold the empty string.
    pub metrics: IndexMap<String, String>,

    pub artifacts: EvaluationArtifacts,
}

impl Evaluation {
    pub fn from_request(request: &VerificationRequest, dimensions: &DimensionMap) -> Self {
        let mut metrics: IndexMap<String, String> = dimensions
            .0
            .keys()
            .map(|dimension| (dimension.clone(), String::new()))
            .collect();
        let mut rolled_up: IndexMap<&str, Vec<&str>> = IndexMap::new();

        for (i, result) in request.results().iter().enumerate() {
            let message = result.message.as_deref().unwrap_or_default();
            match dimensions.dimension_of(&result.verifier_id) {
                Some(dimension) => {
                    let messages = rolled_up.entry(dimension).or_default();
                    if !message.is_empty() {
                        messages.push(message);
                    }
                }
                None => {
                    let key = format!("{:02}_{}", i + 1, result.verifier_id);
                    metrics.insert(key, message.to_owned());
                }
            }
        }
        for (dimension, messages) in rolled_up {
            let joined: Vec<_> = messages.into_iter().dedup().collect();
            metrics.insert(dimension.to_owned(), joined.join(" - "));
        }

        Evaluation {
            is_valid: request.is_valid(),
            metrics,
            artifacts: EvaluationArtifacts::from_request(request),
        }
    }
}

impl EvaluationArtifacts {
    fn from_request(request: &VerificationRequest) -> Self {
        let parsed = || request.data().iter().rev();
        let graph_named = |name: &str| {
            parsed()
                .filter(|d| d.filename() == Some(name))
                .find_map(VerificationData::argdown)
                .cloned()
        };
        let formalizations = request
            .results()
            .iter()
            .rev()
            .filter(|r| r.verifier_id == WELL_FORMED_FORMULAS_ID)
            .find_map(|r| r.details.as_ref());

        let (all_expressions, all_declarations) = match formalizations {
            Some(ResultDetails::Formalizations { expressions, declarations }) => {
                (Some(expressions.clone()), Some(declarations.clone()))
            }
            None => (None, None),
        };
        EvaluationArtifacts {
            annotation: parsed().find_map(VerificationData::xml).cloned(),
            argdown: parsed().find_map(VerificationData::argdown).cloned(),
            argdown_map: graph_named("map.ad"),
            argdown_reco: graph_named("reconstructions.ad"),
            all_expressions,
            all_declarations,
        }
    }
}
