//! Annotation against informal or logical reconstructions. Annotated propositions point to an
//! argument through `argument_label`, and to an item of its premise-conclusion structure through
//! `ref_reco_label`.

use super::{annotated_propositions, annotated_relations, quoted_list, Annotated};
use crate::processing::{
    argdown::{ArgdownGraph, Argument, Valence},
    xml::Element,
};
use indexmap::{IndexMap, IndexSet};

/// Label correspondences between an annotation and a reconstruction, keyed by annotation id.
struct Labels<'a> {
    arguments: IndexSet<&'a str>,
    annotated: Vec<Annotated<'a>>,
    ids: IndexSet<&'a str>,

    /// The argument each annotated proposition belongs to, when it exists.
    argument_of: IndexMap<&'a str, &'a str>,

    /// The pcs item label each annotated proposition refers to.
    ref_reco_of: IndexMap<&'a str, &'a str>,

    /// The proposition behind the referred pcs item.
    proposition_of: IndexMap<&'a str, &'a str>,
}

impl<'a> Labels<'a> {
    fn new(reco: &'a ArgdownGraph, annotation: &'a Element) -> Self {
        let arguments: IndexSet<_> =
            reco.arguments.iter().filter(|a| !a.unlabeled).map(|a| a.label.as_str()).collect();
        let annotated = annotated_propositions(annotation);
        let ids = annotated.iter().filter_map(|p| p.id).collect();
        let mut labels = Labels {
            arguments,
            annotated: Vec::new(),
            ids,
            argument_of: IndexMap::new(),
            ref_reco_of: IndexMap::new(),
            proposition_of: IndexMap::new(),
        };
        for p in &annotated {
            let (Some(id), Some(label)) = (p.id, p.argument_label) else { continue };
            if !labels.arguments.contains(label) {
                continue;
            }
            labels.argument_of.insert(id, label);
            let Some(ref_reco) = p.ref_reco_label else { continue };
            labels.ref_reco_of.insert(id, ref_reco);
            let item = reco
                .argument(label)
                .and_then(|a| a.pcs.iter().find(|item| item.label == ref_reco));
            if let Some(item) = item {
                labels.proposition_of.insert(id, item.proposition_label.as_str());
            }
        }
        labels.annotated = annotated;
        labels
    }
}

pub fn element_coherence(reco: &ArgdownGraph, annotation: &Element, ids_key: &str) -> Vec<String> {
    let labels = Labels::new(reco, annotation);
    let mut messages = Vec::new();

    for p in &labels.annotated {
        let Some(label) = p.argument_label.filter(|l| labels.arguments.contains(*l)) else {
            messages.push(format!(
                "Illegal 'argument_label' reference of proposition element with id={}: No \
                 argument with label '{}' in the Argdown snippet.",
                p.id.unwrap_or("None"),
                p.argument_label.unwrap_or("None"),
            ));
            continue;
        };
        let (Some(id), Some(ref_reco)) = (p.id, p.ref_reco_label) else { continue };
        let Some(argument) = reco.argument(label).filter(|a| !a.pcs.is_empty()) else { continue };
        let Some(item) = argument.pcs.iter().find(|item| item.label == ref_reco) else {
            messages.push(format!(
                "Illegal 'ref_reco_label' reference of proposition element with id={}: No \
                 premise or conclusion with label '{}' in argument '{}'.",
                id, ref_reco, label
            ));
            continue;
        };
        let refs = reco
            .proposition(&item.proposition_label)
            .map(|prop| prop.data.annotation_ids(ids_key))
            .unwrap_or_default();
        if !refs.iter().any(|r| r == id) {
            messages.push(format!(
                "Label reference mismatch: proposition element with id={} in the annotation \
                 references (via ref_reco) the proposition '{}' of argument '{}', but the \
                 annotation_ids={} of that proposition do not include the id={}.",
                id,
                item.label,
                argument.label,
                quoted_list(&refs),
                id
            ));
        }
    }

    for argument in &reco.arguments {
        if !labels.argument_of.values().any(|l| *l == argument.label) {
            messages.push(format!(
                "Free floating argument: Argument '{}' does not have any corresponding elements \
                 in the annotation.",
                argument.label
            ));
        }
        for item in &argument.pcs {
            let Some(proposition) = reco.proposition(&item.proposition_label) else { continue };
            if proposition.data.get(ids_key).is_none() {
                messages.push(format!(
                    "Missing 'annotation_ids' attribute in proposition '{}' of argument '{}'.",
                    item.label, argument.label
                ));
                continue;
            }
            for id in proposition.data.annotation_ids(ids_key) {
                if !labels.ids.contains(id.as_str()) {
                    messages.push(format!(
                        "Illegal 'annotation_ids' reference in proposition '{}' of argument \
                         '{}': No proposition element with id='{}' in the annotation.",
                        item.label, argument.label, id
                    ));
                }
            }
        }
    }

    let refs: Vec<_> = reco.propositions.iter().map(|p| p.data.annotation_ids(ids_key)).collect();
    for (i, first) in reco.propositions.iter().enumerate() {
        for (j, second) in reco.propositions.iter().enumerate().skip(i + 1) {
            let shared: Vec<_> = refs[i]
                .iter()
                .filter(|id| refs[j].contains(*id))
                .map(|id| format!("'{}'", id))
                .collect();
            if !shared.is_empty() {
                messages.push(format!(
                    "Label reference mismatch: annotation text segment(s) {} are referenced by \
                     distinct propositions in the Argdown argument reconstruction ('{}', '{}').",
                    shared.join(", "),
                    first.label,
                    second.label
                ));
            }
        }
    }
    messages
}

/// The pcs labels the conclusion `label` is inferred from, directly or through intermediate
/// conclusions.
fn used_in_inference(argument: &Argument, label: &str, from_key: &str) -> IndexSet<String> {
    let mut used = IndexSet::new();
    let mut pending = vec![label.to_owned()];
    while let Some(label) = pending.pop() {
        let from = argument
            .pcs
            .iter()
            .find(|item| item.label == label)
            .and_then(|item| item.inference_data())
            .and_then(|data| data.from_list(from_key))
            .unwrap_or_default();
        for parent in from {
            if used.insert(parent.clone()) {
                pending.push(parent);
            }
        }
    }
    used
}

pub fn relation_coherence(
    reco: &ArgdownGraph,
    annotation: &Element,
    from_key: &str,
) -> Vec<String> {
    let labels = Labels::new(reco, annotation);
    let related = |source: Option<&str>, target: Option<&str>, valence: Valence| {
        let (Some(s), Some(t)) = (source, target) else { return false };
        reco.relations_between(s, t).any(|r| r.valence == valence)
    };
    let mut messages = Vec::new();

    for r in annotated_relations(annotation) {
        let (from_argument, to_argument) =
            (labels.argument_of.get(r.from).copied(), labels.argument_of.get(r.to).copied());
        let (from_proposition, to_proposition) =
            (labels.proposition_of.get(r.from).copied(), labels.proposition_of.get(r.to).copied());
        let (Some(from_argument), Some(to_argument)) = (from_argument, to_argument) else {
            messages.push(match r.valence {
                Valence::Support => format!(
                    "Annotated support relation {} -> {} is not matched by any relation in the \
                     reconstruction (illegal argument_labels).",
                    r.from, r.to
                ),
                _ => format!(
                    "Annotated attack relation from {} to {} is not matched by any relation in \
                     the reconstruction (illegal argument_labels).",
                    r.from, r.to
                ),
            });
            continue;
        };

        if from_argument == to_argument {
            if r.valence == Valence::Support {
                let (Some(ref_from), Some(ref_to)) =
                    (labels.ref_reco_of.get(r.from), labels.ref_reco_of.get(r.to))
                else {
                    continue;
                };
                let Some(argument) = reco.argument(from_argument) else { continue };
                if !used_in_inference(argument, ref_to, from_key).contains(*ref_from) {
                    messages.push(format!(
                        "Annotated support relation {} -> {} is not matched by the inferential \
                         relations in the argument '{}'.",
                        r.from, r.to, argument.label
                    ));
                }
            } else {
                messages.push(format!(
                    "Text segments assigned to the same argument cannot attack each other ({} \
                     attacks {} while both are assigned to {}).",
                    r.from, r.to, from_argument
                ));
            }
            continue;
        }

        let sources = [Some(from_argument), from_proposition];
        let targets = [Some(to_argument), to_proposition];
        let matched = sources
            .iter()
            .any(|&s| targets.iter().any(|&t| related(s, t, r.valence)));
        if !matched {
            let verb = if r.valence == Valence::Support { "support" } else { "attack" };
            messages.push(format!(
                "Proposition elements {} and {} are annotated to {} each other, but none of the \
                 corresponding Argdown elements <{}>/[{}] {}s <{}> or [{}].",
                r.from,
                r.to,
                verb,
                from_argument,
                from_proposition.unwrap_or("None"),
                verb,
                to_argument,
                to_proposition.unwrap_or("None"),
            ));
        }
    }
    messages
}
