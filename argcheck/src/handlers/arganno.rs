//! Structural checks of argumentative text annotations.

use super::{Context, Report, StructuralCheck};
use crate::{
    config::{SourceIntegrityConfig, VerifierConfig},
    processing::xml::Element,
    request::{DataType, VerificationData},
    utils::{collapse_whitespace, damerau_levenshtein, duplicates, shorten, strip_whitespace},
    ArgcheckResult,
};
use ahash::AHashSet;
use similar::TextDiff;

const ALLOWED_ATTRIBUTES: [&str; 5] =
    ["id", "supports", "attacks", "argument_label", "ref_reco_label"];

/// Marks text left out of an annotated proposition.
const ELLIPSIS: &str = "[...]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgannoCheck {
    SourceTextIntegrity,
    NestedProposition,
    PropositionIdPresence,
    PropositionIdUniqueness,
    SupportReferenceValidity,
    AttackReferenceValidity,
    AttributeValidity,
    ElementValidity,
    ArgumentLabelValidity,
    RefRecoLabelValidity,
}

impl ArgannoCheck {
    /// The standard checks, plus the label checks for which legal labels are configured.
    pub fn default_suite(config: &VerifierConfig) -> Vec<Self> {
        use ArgannoCheck::*;

        let mut checks = vec![
            SourceTextIntegrity,
            NestedProposition,
            PropositionIdPresence,
            PropositionIdUniqueness,
            SupportReferenceValidity,
            AttackReferenceValidity,
            AttributeValidity,
            ElementValidity,
        ];
        if config.legal_argument_labels.is_some() {
            checks.push(ArgumentLabelValidity);
        }
        if config.legal_ref_reco_labels.is_some() {
            checks.push(RefRecoLabelValidity);
        }
        checks
    }
}

fn excerpt(element: &Element, width: usize) -> String {
    shorten(&element.to_string(), width)
}

/// Compares two texts, ignoring whitespace and tolerating a small relative edit distance.
fn roughly_equal(a: &str, b: &str, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    let (a, b) = (strip_whitespace(a), strip_whitespace(b));
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return true;
    }
    damerau_levenshtein(&a, &b) as f64 / max_len as f64 <= tolerance
}

fn check_strict(source: &str, root: &Element, config: &SourceIntegrityConfig) -> Vec<String> {
    let original = collapse_whitespace(source);
    let annotated = collapse_whitespace(&root.text());
    if roughly_equal(&original, &annotated, config.levenshtein_tolerance) {
        return Vec::new();
    }
    let diff = TextDiff::from_lines(&original, &annotated)
        .unified_diff()
        .context_radius(0)
        .header("source", "annotation")
        .to_string();
    vec![format!("Source text '{}' was altered. Diff:\n{}", shorten(source, 40), diff)]
}

/// Checks that the text of every proposition occurs in the source, in annotation order. Text
/// left out with `[...]` may be skipped.
fn check_shortened(source: &str, root: &Element) -> Vec<String> {
    let source = strip_whitespace(source);
    let mut messages = Vec::new();
    let mut cursor = 0;
    for proposition in root.propositions() {
        let text = proposition.text();
        let segments: Vec<String> = text
            .split(ELLIPSIS)
            .map(strip_whitespace)
            .filter(|s| !s.is_empty())
            .collect();

        let mut position = cursor;
        let mut in_order = true;
        for segment in &segments {
            match source[position..].find(segment.as_str()) {
                Some(offset) => position += offset + segment.len(),
                None => {
                    in_order = false;
                    break;
                }
            }
        }
        if in_order {
            cursor = position;
            continue;
        }

        let anywhere = segments.iter().all(|segment| source.contains(segment.as_str()));
        messages.push(if anywhere {
            format!(
                "Text flow mixup: Annotated proposition '{}' does not appear _after_ the previous \
                 annotation in the source text.",
                excerpt(proposition, 40)
            )
        } else {
            format!(
                "Annotated proposition '{}' is missing from the source text.",
                excerpt(proposition, 40)
            )
        });
    }
    messages
}

fn source_text_integrity(root: &Element, ctx: &Context) -> Option<Vec<String>> {
    let source = ctx.request.source.as_deref()?.trim();
    if source.is_empty() {
        return None;
    }
    let config = &ctx.config.source_integrity;
    let messages = if source.split_whitespace().count() <= config.shortening_word_threshold {
        check_strict(source, root, config)
    } else {
        check_shortened(source, root)
    };
    Some(messages)
}

fn nested_propositions(root: &Element) -> Vec<String> {
    let nested: Vec<_> = root
        .propositions()
        .into_iter()
        .filter(|p| !p.propositions().is_empty())
        .map(|p| format!("'{}'", excerpt(p, 256)))
        .collect();
    if nested.is_empty() {
        Vec::new()
    } else {
        vec![format!("Nested annotations in proposition(s) {}", nested.join(", "))]
    }
}

fn id_presence(root: &Element) -> Vec<String> {
    let missing: Vec<_> = root
        .propositions()
        .into_iter()
        .filter(|p| p.id().is_none())
        .map(|p| format!("'{}'", excerpt(p, 64)))
        .collect();
    if missing.is_empty() {
        Vec::new()
    } else {
        vec![format!("Missing id in proposition(s) {}", missing.join(", "))]
    }
}

fn id_uniqueness(root: &Element) -> Vec<String> {
    let repeated = duplicates(root.propositions().into_iter().filter_map(Element::id));
    if repeated.is_empty() {
        Vec::new()
    } else {
        vec![format!("Duplicate ids: {}", repeated.join(", "))]
    }
}

fn reference_validity(root: &Element, attribute: &str, kind: &str) -> Vec<String> {
    let propositions = root.propositions();
    let ids: AHashSet<&str> = propositions.iter().filter_map(|p| p.id()).collect();
    let mut messages = Vec::new();
    for proposition in &propositions {
        for target in proposition.id_list(attribute) {
            if !ids.contains(target) {
                messages.push(format!(
                    "{} proposition with id '{}' in proposition '{}' does not exist.",
                    kind,
                    target,
                    excerpt(proposition, 64)
                ));
            }
        }
    }
    messages
}

fn attribute_validity(root: &Element) -> Vec<String> {
    let mut messages = Vec::new();
    for proposition in root.propositions() {
        for attribute in &proposition.attributes {
            if !ALLOWED_ATTRIBUTES.contains(&attribute.name.as_str()) {
                messages.push(format!(
                    "Unknown attribute '{}' in proposition '{}'",
                    attribute.name,
                    excerpt(proposition, 64)
                ));
            }
        }
    }
    messages
}

fn element_validity(root: &Element) -> Vec<String> {
    root.elements()
        .into_iter()
        .filter(|e| e.name != "proposition")
        .map(|e| format!("Unknown element '{}' at '{}'", e.name, excerpt(e, 64)))
        .collect()
}

fn label_validity(
    root: &Element,
    attribute: &str,
    kind: &str,
    legal: Option<&Vec<String>>,
) -> Option<Vec<String>> {
    let legal = legal.filter(|l| !l.is_empty())?;
    let messages = root
        .propositions()
        .into_iter()
        .filter_map(|p| {
            let label = p.attr(attribute)?;
            (!legal.iter().any(|l| l == label)).then(|| {
                format!("Illegal {} label '{}' in proposition '{}'", kind, label, excerpt(p, 64))
            })
        })
        .collect();
    Some(messages)
}

impl StructuralCheck for ArgannoCheck {
    const SUITE: &'static str = "Arganno";
    const DTYPE: DataType = DataType::Xml;

    fn name(&self) -> &'static str {
        match self {
            ArgannoCheck::SourceTextIntegrity => "SourceTextIntegrity",
            ArgannoCheck::NestedProposition => "NestedProposition",
            ArgannoCheck::PropositionIdPresence => "PropositionIdPresence",
            ArgannoCheck::PropositionIdUniqueness => "PropositionIdUniqueness",
            ArgannoCheck::SupportReferenceValidity => "SupportReferenceValidity",
            ArgannoCheck::AttackReferenceValidity => "AttackReferenceValidity",
            ArgannoCheck::AttributeValidity => "AttributeValidity",
            ArgannoCheck::ElementValidity => "ElementValidity",
            ArgannoCheck::ArgumentLabelValidity => "ArgumentLabelValidity",
            ArgannoCheck::RefRecoLabelValidity => "RefRecoLabelValidity",
        }
    }

    fn evaluate(&self, data: &VerificationData, ctx: &Context) -> ArgcheckResult<Option<Report>> {
        let root = ctx.annotation(data)?;
        let messages = match self {
            ArgannoCheck::SourceTextIntegrity => source_text_integrity(root, ctx),
            ArgannoCheck::NestedProposition => Some(nested_propositions(root)),
            ArgannoCheck::PropositionIdPresence => Some(id_presence(root)),
            ArgannoCheck::PropositionIdUniqueness => Some(id_uniqueness(root)),
            ArgannoCheck::SupportReferenceValidity => {
                Some(reference_validity(root, "supports", "Supported"))
            }
            ArgannoCheck::AttackReferenceValidity => {
                Some(reference_validity(root, "attacks", "Attacked"))
            }
            ArgannoCheck::AttributeValidity => Some(attribute_validity(root)),
            ArgannoCheck::ElementValidity => Some(element_validity(root)),
            ArgannoCheck::ArgumentLabelValidity => label_validity(
                root,
                "argument_label",
                "argument",
                ctx.config.legal_argument_labels.as_ref(),
            ),
            ArgannoCheck::RefRecoLabelValidity => label_validity(
                root,
                "ref_reco_label",
                "ref_reco",
                ctx.config.legal_ref_reco_labels.as_ref(),
            ),
        };
        Ok(messages.map(Report::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handlers::Handler, request::DataFilter, VerificationRequest};
    use std::sync::Arc;

    fn verify(
        annotation: &str,
        source: Option<&str>,
        config: VerifierConfig,
    ) -> VerificationRequest {
        let inputs = format!("```xml\n{}\n```\n", annotation);
        let request = VerificationRequest::new(inputs, source.map(str::to_owned));
        let request = Handler::processing().process(request);
        Handler::arganno(&Arc::new(config), DataFilter::Any).process(request)
    }

    fn message<'a>(request: &'a VerificationRequest, check: &str) -> Option<&'a str> {
        let id = format!("Arganno.{}Handler", check);
        request.last_result_of(&id).and_then(|r| r.message.as_deref())
    }

    #[test]
    fn test_reference_validity() {
        let request = verify(
            "<proposition id=\"1\">A</proposition><proposition id=\"2\" supports=\"3\">B</proposition>",
            None,
            VerifierConfig::default(),
        );
        assert_eq!(
            message(&request, "SupportReferenceValidity"),
            Some(
                "Supported proposition with id '3' in proposition \
                 '<proposition id=\"2\" supports=\"3\">B</proposition>' does not exist."
            )
        );
        assert!(message(&request, "AttackReferenceValidity").is_none());
        assert!(request.last_result_of("Arganno.SourceTextIntegrityHandler").is_none());
        assert!(!request.is_valid());
    }

    #[test]
    fn test_structure_checks() {
        let request = verify(
            "<proposition id=\"1\" note=\"x\">A <proposition>B</proposition></proposition>\
             <proposition id=\"1\">C</proposition><b>D</b>",
            None,
            VerifierConfig::default(),
        );
        assert!(message(&request, "NestedProposition")
            .unwrap()
            .starts_with("Nested annotations in proposition(s) '<proposition id=\"1\""));
        assert_eq!(
            message(&request, "PropositionIdPresence"),
            Some("Missing id in proposition(s) '<proposition>B</proposition>'")
        );
        assert_eq!(message(&request, "PropositionIdUniqueness"), Some("Duplicate ids: 1"));
        assert!(message(&request, "AttributeValidity")
            .unwrap()
            .starts_with("Unknown attribute 'note' in proposition"));
        assert_eq!(message(&request, "ElementValidity"), Some("Unknown element 'b' at '<b>D</b>'"));
    }

    #[test]
    fn test_source_integrity_strict() {
        let source = "It rains. So the street is wet.";
        let ok = verify(
            "<proposition id=\"1\">It rains.</proposition>\n So the   street is wet.",
            Some(source),
            VerifierConfig::default(),
        );
        assert!(ok.last_result_of("Arganno.SourceTextIntegrityHandler").unwrap().is_valid);

        let altered = verify(
            "<proposition id=\"1\">It pours.</proposition> So the street is wet.",
            Some(source),
            VerifierConfig::default(),
        );
        let message = message(&altered, "SourceTextIntegrity").unwrap();
        assert!(message.starts_with("Source text 'It rains. So the street is wet.' was altered."));
        assert!(message.contains("-It rains. So the street is wet."));
        assert!(message.contains("+It pours. So the street is wet."));
    }

    #[test]
    fn test_source_integrity_shortened() {
        let config = VerifierConfig::default().source_integrity(SourceIntegrityConfig {
            shortening_word_threshold: 3,
            ..Default::default()
        });
        let source = "First claim here. Then some filler. Second claim there.";

        let ok = verify(
            "<proposition id=\"1\">First [...] here.</proposition>\
             <proposition id=\"2\">Second claim</proposition>",
            Some(source),
            config.clone(),
        );
        assert!(ok.last_result_of("Arganno.SourceTextIntegrityHandler").unwrap().is_valid);

        let mixed = verify(
            "<proposition id=\"2\">Second claim</proposition>\
             <proposition id=\"1\">First claim</proposition>\
             <proposition id=\"3\">Nope</proposition>",
            Some(source),
            config,
        );
        let message = message(&mixed, "SourceTextIntegrity").unwrap();
        assert!(message.starts_with("Text flow mixup: Annotated proposition '<proposition id=\"1\">"));
        assert!(message
            .ends_with("'<proposition id=\"3\">Nope</proposition>' is missing from the source text."));
    }

    #[test]
    fn test_label_validity() {
        let annotation = "<proposition id=\"1\" argument_label=\"A\">a</proposition>\
                          <proposition id=\"2\" argument_label=\"Z\">b</proposition>";
        let unconfigured = verify(annotation, None, VerifierConfig::default());
        assert!(unconfigured.last_result_of("Arganno.ArgumentLabelValidityHandler").is_none());

        let config = VerifierConfig::default().legal_argument_labels(vec!["A".to_owned()]);
        let request = verify(annotation, None, config);
        assert!(message(&request, "ArgumentLabelValidity")
            .unwrap()
            .starts_with("Illegal argument label 'Z' in proposition"));
    }
}
