//! Annotation against argument map.

use super::{annotated_propositions, annotated_relations, quoted_list};
use crate::processing::{argdown::ArgdownGraph, xml::Element};
use indexmap::{IndexMap, IndexSet};

/// Maps the id of each annotated proposition to its `argument_label`, for labels that name a
/// node of the map.
fn argument_labels<'a>(map: &ArgdownGraph, annotation: &'a Element) -> IndexMap<&'a str, &'a str> {
    let labels: IndexSet<_> = map.labels().collect();
    annotated_propositions(annotation)
        .into_iter()
        .filter_map(|p| Some((p.id?, p.argument_label.filter(|l| labels.contains(*l))?)))
        .collect()
}

pub fn element_coherence(map: &ArgdownGraph, annotation: &Element, ids_key: &str) -> Vec<String> {
    let node_labels: IndexSet<_> = map
        .propositions
        .iter()
        .filter(|p| !p.unlabeled)
        .map(|p| p.label.as_str())
        .chain(map.arguments.iter().filter(|a| !a.unlabeled).map(|a| a.label.as_str()))
        .collect();
    let annotated = annotated_propositions(annotation);
    let ids: IndexSet<_> = annotated.iter().filter_map(|p| p.id).collect();
    let label_of = argument_labels(map, annotation);
    let mut messages = Vec::new();

    for p in &annotated {
        if !p.argument_label.is_some_and(|l| node_labels.contains(l)) {
            messages.push(format!(
                "Illegal 'argument_label' reference of proposition element with id={}: No node \
                 with label '{}' in the Argdown argument map.",
                p.id.unwrap_or("None"),
                p.argument_label.unwrap_or("None"),
            ));
        }
    }

    let nodes = map
        .propositions
        .iter()
        .map(|p| (p.label.as_str(), &p.data))
        .chain(map.arguments.iter().map(|a| (a.label.as_str(), &a.data)));
    for (label, data) in nodes {
        let refs = data.annotation_ids(ids_key);
        if refs.is_empty() {
            messages.push(format!("Missing 'annotation_ids' attribute of node with label '{}'.", label));
            continue;
        }
        for id in &refs {
            if !ids.contains(id.as_str()) {
                messages.push(format!(
                    "Illegal 'annotation_ids' reference of node with label '{}': No proposition \
                     element with id='{}' in the annotation.",
                    label, id
                ));
            } else if label_of.get(id.as_str()) != Some(&label) {
                let other =
                    label_of.get(id.as_str()).map(|l| format!(": {}", l)).unwrap_or_default();
                messages.push(format!(
                    "Label reference mismatch: argument map node with label '{}' has \
                     annotation_ids={}, but the corresponding proposition element with id={} in \
                     the annotation has a different argument_label{}.",
                    label,
                    quoted_list(&refs),
                    id,
                    other
                ));
            }
        }
    }
    messages
}

/// Annotated relations and map relations must match one to one, after projecting annotation
/// ids to argument labels.
pub fn relation_coherence(map: &ArgdownGraph, annotation: &Element) -> Vec<String> {
    let label_of = argument_labels(map, annotation);
    let annotated: Vec<_> = annotated_relations(annotation)
        .into_iter()
        .map(|r| (r, label_of.get(r.from).copied(), label_of.get(r.to).copied()))
        .collect();
    let mut messages = Vec::new();

    for (r, source, target) in &annotated {
        let matched = map.relations.iter().any(|m| {
            Some(m.source.as_str()) == *source
                && Some(m.target.as_str()) == *target
                && m.valence == r.valence
        });
        if !matched {
            messages.push(format!(
                "Annotated {} relation {} -> {} is not matched by any relation in the argument map.",
                r.valence, r.from, r.to
            ));
        }
    }

    for m in &map.relations {
        let matched = annotated.iter().any(|(r, source, target)| {
            Some(m.source.as_str()) == *source
                && Some(m.target.as_str()) == *target
                && m.valence == r.valence
        });
        if !matched {
            messages.push(format!(
                "Dialectical {} relation {} -> {} is not matched by any relation in the text \
                 annotation.",
                m.valence.name(),
                m.source,
                m.target
            ));
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{argdown, xml};

    #[test]
    fn test_missing_annotation_ids() {
        let map = argdown::parse("[A1]: p. {annotation_ids: [\"x\"]}\n[A2]: q.").unwrap();
        let annotation = xml::parse("<proposition id=\"x\" argument_label=\"A1\">p</proposition>").unwrap();
        assert_eq!(
            element_coherence(&map, &annotation, "annotation_ids"),
            ["Missing 'annotation_ids' attribute of node with label 'A2'."]
        );
    }

    #[test]
    fn test_label_mismatches() {
        let map = argdown::parse(
            "[A]: p. {annotation_ids: ['1', '2']}\n[B]: q. {annotation_ids: ['3']}",
        )
        .unwrap();
        let annotation = xml::parse(
            "<proposition id=\"1\" argument_label=\"A\">p</proposition>\
             <proposition id=\"2\" argument_label=\"B\">q</proposition>\
             <proposition id=\"4\" argument_label=\"C\">r</proposition>",
        )
        .unwrap();
        assert_eq!(
            element_coherence(&map, &annotation, "annotation_ids"),
            [
                "Illegal 'argument_label' reference of proposition element with id=4: No node \
                 with label 'C' in the Argdown argument map.",
                "Label reference mismatch: argument map node with label 'A' has \
                 annotation_ids=['1', '2'], but the corresponding proposition element with id=2 \
                 in the annotation has a different argument_label: B.",
                "Illegal 'annotation_ids' reference of node with label 'B': No proposition \
                 element with id='3' in the annotation.",
            ]
        );
    }

    #[test]
    fn test_relations() {
        let map = argdown::parse(
            "[T]: Thesis. {annotation_ids: ['1']}\n    \
             <+ [R]: Reason. {annotation_ids: ['2']}\n    \
             <- [O]: Objection. {annotation_ids: ['3']}",
        )
        .unwrap();
        let annotation = xml::parse(
            "<proposition id=\"1\" argument_label=\"T\">Thesis.</proposition>\
             <proposition id=\"2\" argument_label=\"R\" supports=\"1\">Reason.</proposition>\
             <proposition id=\"3\" argument_label=\"O\" supports=\"1\">Objection.</proposition>",
        )
        .unwrap();
        assert_eq!(
            relation_coherence(&map, &annotation),
            [
                "Annotated support relation 3 -> 1 is not matched by any relation in the argument \
                 map.",
                "Dialectical ATTACK relation O -> T is not matched by any relation in the text \
                 annotation.",
            ]
        );
    }
}
