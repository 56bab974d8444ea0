//! Coherence checks: cross-artifact consistency between an annotation, an argument map and a
//! reconstruction of the same text.

mod arganno_argmap;
mod arganno_reco;
mod argmap_reco;
pub mod dialectics;

use crate::{
    config::VerifierConfig,
    handlers::{processing_error, Context, Handler},
    processing::{argdown::Valence, xml::Element},
    request::{
        Artifact, DataFilter, DataType, VerificationData, VerificationRequest, VerificationResult,
    },
    ArgcheckResult,
};
use std::sync::Arc;

/// The argument map of a multi-artifact answer: the last Argdown block saved as `map*`.
pub fn map_filter() -> DataFilter {
    DataFilter::filename_prefix("map")
}

/// The reconstructions of a multi-artifact answer: the last Argdown block saved as
/// `reconstructions*`.
pub fn reco_filter() -> DataFilter {
    DataFilter::filename_prefix("reconstructions")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoherenceKind {
    ArgannoArgmapElem,
    ArgannoArgmapDRel,
    ArgmapInfrecoElem,
    ArgmapInfrecoRelation,
    ArgmapLogrecoElem,
    ArgmapLogrecoRelation,
    ArgannoInfrecoElem,
    ArgannoInfrecoRelation,
}

impl CoherenceKind {
    pub fn name(self) -> &'static str {
        match self {
            CoherenceKind::ArgannoArgmapElem => "ArgannoArgmapElemCohere",
            CoherenceKind::ArgannoArgmapDRel => "ArgannoArgmapDRelCohere",
            CoherenceKind::ArgmapInfrecoElem => "ArgmapInfrecoElemCohere",
            CoherenceKind::ArgmapInfrecoRelation => "ArgmapInfrecoRelationCohere",
            CoherenceKind::ArgmapLogrecoElem => "ArgmapLogrecoElemCohere",
            CoherenceKind::ArgmapLogrecoRelation => "ArgmapLogrecoRelationCohere",
            CoherenceKind::ArgannoInfrecoElem => "ArgannoInfrecoElemCohere",
            CoherenceKind::ArgannoInfrecoRelation => "ArgannoInfrecoRelationCohere",
        }
    }

    /// The data types of the two artifacts the check compares, in the order of its filters.
    fn roles(self) -> (DataType, DataType) {
        match self {
            CoherenceKind::ArgmapInfrecoElem
            | CoherenceKind::ArgmapInfrecoRelation
            | CoherenceKind::ArgmapLogrecoElem
            | CoherenceKind::ArgmapLogrecoRelation => (DataType::Argdown, DataType::Argdown),
            _ => (DataType::Argdown, DataType::Xml),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            CoherenceKind::ArgannoArgmapElem | CoherenceKind::ArgannoArgmapDRel => " ",
            _ => " - ",
        }
    }

    fn evaluate(
        self,
        first: &VerificationData,
        second: &VerificationData,
        ctx: &Context,
    ) -> ArgcheckResult<Vec<String>> {
        let config = ctx.config;
        let messages = match self {
            CoherenceKind::ArgannoArgmapElem => arganno_argmap::element_coherence(
                ctx.graph(first)?,
                ctx.annotation(second)?,
                &config.annotation_ids_key,
            ),
            CoherenceKind::ArgannoArgmapDRel => {
                arganno_argmap::relation_coherence(ctx.graph(first)?, ctx.annotation(second)?)
            }
            CoherenceKind::ArgmapInfrecoElem | CoherenceKind::ArgmapLogrecoElem => {
                argmap_reco::element_coherence(ctx.graph(first)?, ctx.graph(second)?)
            }
            CoherenceKind::ArgmapInfrecoRelation => {
                argmap_reco::sketched_relation_coherence(ctx.graph(first)?, ctx.graph(second)?)
            }
            CoherenceKind::ArgmapLogrecoRelation => {
                argmap_reco::grounded_relation_coherence(ctx.graph(first)?, ctx.graph(second)?)
            }
            CoherenceKind::ArgannoInfrecoElem => arganno_reco::element_coherence(
                ctx.graph(first)?,
                ctx.annotation(second)?,
                &config.annotation_ids_key,
            ),
            CoherenceKind::ArgannoInfrecoRelation => arganno_reco::relation_coherence(
                ctx.graph(first)?,
                ctx.annotation(second)?,
                &config.from_key,
            ),
        };
        Ok(messages)
    }
}

/// A configured coherence check, with one data filter per compared artifact.
#[derive(Debug, Clone)]
pub struct CoherenceCheck {
    pub name: String,
    pub kind: CoherenceKind,
    pub filters: (DataFilter, DataFilter),
    config: Arc<VerifierConfig>,
}

impl CoherenceCheck {
    pub fn new(
        kind: CoherenceKind,
        filters: (DataFilter, DataFilter),
        config: Arc<VerifierConfig>,
    ) -> Self {
        CoherenceCheck { name: format!("{}Handler", kind.name()), kind, filters, config }
    }

    /// The artifact selected for one role, unless it is missing or could not be parsed.
    fn select<'r>(
        &self,
        request: &'r VerificationRequest,
        dtype: DataType,
        filter: &DataFilter,
    ) -> Option<&'r VerificationData> {
        let data = request.last_attempt(dtype, filter);
        match data {
            None => log::debug!("{}: no {} data matching {:?}", self.name, dtype, filter),
            Some(d) if !d.is_parsed() => {
                log::debug!("{}: skipping {}, which could not be parsed", self.name, d.id);
                return None;
            }
            Some(_) => (),
        }
        data
    }

    pub(crate) fn run(
        &self,
        request: &VerificationRequest,
    ) -> Option<(VerificationResult, Vec<(String, Artifact)>)> {
        let (first_type, second_type) = self.kind.roles();
        let first = self.select(request, first_type, &self.filters.0)?;
        let second = self.select(request, second_type, &self.filters.1)?;
        let ctx = Context { request, config: &self.config, name: &self.name };
        let result = match self.kind.evaluate(first, second, &ctx) {
            Ok(messages) => VerificationResult::from_messages(
                &self.name,
                vec![first.id.clone(), second.id.clone()],
                messages,
                self.kind.separator(),
            ),
            Err(e) => processing_error(&self.name, e),
        };
        Some((result, Vec::new()))
    }
}

/// A proposition element together with the attributes the coherence checks look at.
struct Annotated<'a> {
    id: Option<&'a str>,
    argument_label: Option<&'a str>,
    ref_reco_label: Option<&'a str>,
}

fn annotated_propositions(annotation: &Element) -> Vec<Annotated> {
    annotation
        .propositions()
        .into_iter()
        .map(|p| Annotated {
            id: p.id(),
            argument_label: p.attr("argument_label"),
            ref_reco_label: p.attr("ref_reco_label"),
        })
        .collect()
}

/// An edge implied by the `supports` and `attacks` attributes of an annotation.
#[derive(Debug, Clone, Copy)]
struct AnnotatedRelation<'a> {
    from: &'a str,
    to: &'a str,
    valence: Valence,
}

/// The annotated relations whose target exists. Elements without an id are left out, they are
/// reported by the id presence check.
fn annotated_relations(annotation: &Element) -> Vec<AnnotatedRelation> {
    let propositions = annotation.propositions();
    let ids: Vec<_> = propositions.iter().filter_map(|p| p.id()).collect();
    let mut relations = Vec::new();
    for p in &propositions {
        let Some(from) = p.id() else { continue };
        for (attribute, valence) in [("supports", Valence::Support), ("attacks", Valence::Attack)] {
            for to in p.id_list(attribute) {
                if ids.contains(&to) {
                    relations.push(AnnotatedRelation { from, to, valence });
                }
            }
        }
    }
    relations
}

/// Renders ids as a bracketed list of quoted strings, e.g. `['1', '2']`.
fn quoted_list<S: AsRef<str>>(ids: &[S]) -> String {
    let quoted: Vec<_> = ids.iter().map(|id| format!("'{}'", id.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

impl Handler {
    fn coherence(
        name: &str,
        config: &Arc<VerifierConfig>,
        filters: (DataFilter, DataFilter),
        kinds: &[CoherenceKind],
    ) -> Self {
        let children = kinds
            .iter()
            .map(|&kind| {
                Handler::Coherence(CoherenceCheck::new(kind, filters.clone(), config.clone()))
            })
            .collect();
        Handler::composite(name, children)
    }

    pub fn arganno_argmap(
        config: &Arc<VerifierConfig>,
        map: DataFilter,
        annotation: DataFilter,
    ) -> Self {
        Self::coherence(
            "ArgannoArgmapCoherenceHandler",
            config,
            (map, annotation),
            &[CoherenceKind::ArgannoArgmapElem, CoherenceKind::ArgannoArgmapDRel],
        )
    }

    pub fn argmap_infreco(config: &Arc<VerifierConfig>, map: DataFilter, reco: DataFilter) -> Self {
        Self::coherence(
            "ArgmapInfrecoCoherenceHandler",
            config,
            (map, reco),
            &[CoherenceKind::ArgmapInfrecoElem, CoherenceKind::ArgmapInfrecoRelation],
        )
    }

    pub fn argmap_logreco(config: &Arc<VerifierConfig>, map: DataFilter, reco: DataFilter) -> Self {
        Self::coherence(
            "ArgmapLogrecoCoherenceHandler",
            config,
            (map, reco),
            &[CoherenceKind::ArgmapLogrecoElem, CoherenceKind::ArgmapLogrecoRelation],
        )
    }

    pub fn arganno_infreco(
        config: &Arc<VerifierConfig>,
        reco: DataFilter,
        annotation: DataFilter,
    ) -> Self {
        Self::coherence(
            "ArgannoInfrecoCoherenceHandler",
            config,
            (reco, annotation),
            &[CoherenceKind::ArgannoInfrecoElem, CoherenceKind::ArgannoInfrecoRelation],
        )
    }

    /// The annotation checks against a logical reconstruction are those used for informal ones.
    pub fn arganno_logreco(
        config: &Arc<VerifierConfig>,
        reco: DataFilter,
        annotation: DataFilter,
    ) -> Self {
        Self::coherence(
            "ArgannoLogrecoCoherenceHandler",
            config,
            (reco, annotation),
            &[CoherenceKind::ArgannoInfrecoElem, CoherenceKind::ArgannoInfrecoRelation],
        )
    }

    /// Annotation against map, then map against reconstructions. Annotation against
    /// reconstructions follows if `annotation_reco_coherence` is set.
    pub fn arganno_argmap_logreco(
        config: &Arc<VerifierConfig>,
        map: DataFilter,
        reco: DataFilter,
        annotation: DataFilter,
    ) -> Self {
        let mut children = vec![
            Self::arganno_argmap(config, map.clone(), annotation.clone()),
            Self::argmap_logreco(config, map, reco.clone()),
        ];
        if config.annotation_reco_coherence {
            children.push(Self::arganno_logreco(config, reco, annotation));
        }
        Handler::composite("ArgannoArgmapLogrecoCoherenceHandler", children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify(inputs: &str, handler: Handler) -> VerificationRequest {
        let request = Handler::processing().process(VerificationRequest::new(inputs, None));
        handler.process(request)
    }

    #[test]
    fn test_selects_last_blocks_by_role() {
        let config = Arc::new(VerifierConfig::default());
        let inputs = "```argdown {filename=\"map.ad\"}\n<A>: Gist.\n```\n\
                      ```argdown {filename=\"reconstructions.ad\"}\n<B>\n\n(1) P.\n-- {from: [1]} --\n(2) C.\n```\n\
                      ```argdown {filename=\"map.ad\"}\n<B>: Gist.\n```\n";
        let request = verify(inputs, Handler::argmap_infreco(&config, map_filter(), reco_filter()));
        let result = request.last_result_of("ArgmapInfrecoElemCohereHandler").unwrap();
        assert_eq!(result.data_refs, ["argdown_5", "argdown_4"]);
        assert!(result.is_valid, "{:?}", result.message);
    }

    #[test]
    fn test_skips_missing_and_broken_artifacts() {
        let config = Arc::new(VerifierConfig::default());
        let handler = Handler::arganno_argmap(&config, DataFilter::Any, DataFilter::Any);

        let request = verify("```argdown\n[A]: a.\n```\n", handler.clone());
        assert!(request.results().is_empty());

        let inputs = "```argdown\n[A]: a.\n```\n```xml\n<proposition id=\"1>a\n```\n";
        let request = verify(inputs, handler);
        assert_eq!(request.results().len(), 1);
        assert_eq!(request.results()[0].verifier_id, "XMLParser");
    }

    #[test]
    fn test_annotation_reco_coherence_is_opt_in() {
        let inputs = include_str!("../../tests/fixtures/arganno-argmap-logreco/valid/cats.md")
            .replace("ref_reco_label=\"1\"", "ref_reco_label=\"9\"");
        let check = |config: VerifierConfig| {
            let config = Arc::new(config);
            let handler =
                Handler::arganno_argmap_logreco(&config, map_filter(), reco_filter(), DataFilter::Any);
            let names: Vec<_> = handler.leaves().iter().map(|h| h.name().to_owned()).collect();
            (names, verify(&inputs, handler))
        };

        let (names, request) = check(VerifierConfig::default());
        assert_eq!(names.len(), 4);
        assert!(request.last_result_of("ArgannoInfrecoElemCohereHandler").is_none());
        assert!(request.results().iter().all(|r| r.is_valid), "{:?}", request.results());

        let (names, request) = check(VerifierConfig::default().annotation_reco_coherence(true));
        assert_eq!(names.len(), 6);
        let result = request.last_result_of("ArgannoInfrecoElemCohereHandler").unwrap();
        assert!(!result.is_valid);
        assert!(result.message.as_deref().unwrap().contains("ref_reco_label"));
    }

    #[test]
    fn test_annotated_relations() {
        let annotation = crate::processing::xml::parse(
            "<proposition id=\"1\" supports=\"2 9\">a</proposition>\
             <proposition id=\"2\" attacks=\"1\">b</proposition>\
             <proposition supports=\"1\">c</proposition>",
        )
        .unwrap();
        let relations: Vec<_> = annotated_relations(&annotation)
            .into_iter()
            .map(|r| (r.from, r.to, r.valence))
            .collect();
        assert_eq!(relations, [("1", "2", Valence::Support), ("2", "1", Valence::Attack)]);
        assert_eq!(quoted_list(&["1", "2"]), "['1', '2']");
    }
}
