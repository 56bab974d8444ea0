//! Argument map against informal or logical reconstructions.

use super::dialectics::{are_contradictory, are_identical, indirectly_attacks, indirectly_supports};
use crate::{
    processing::argdown::{ArgdownGraph, Argument, DialecticalType, Proposition, Valence},
    utils::DedupIterator,
};

fn argument_labels(graph: &ArgdownGraph) -> Vec<&str> {
    graph.arguments.iter().map(|a| a.label.as_str()).dedup().collect()
}

fn proposition_labels(graph: &ArgdownGraph) -> Vec<&str> {
    graph.propositions.iter().map(|p| p.label.as_str()).dedup().collect()
}

/// Every argument of the map is reconstructed and vice versa, and every claim of the map
/// reappears in the reconstructions.
pub fn element_coherence(map: &ArgdownGraph, reco: &ArgdownGraph) -> Vec<String> {
    let (map_arguments, reco_arguments) = (argument_labels(map), argument_labels(reco));
    let reco_propositions = proposition_labels(reco);
    let mut messages = Vec::new();
    for label in &map_arguments {
        if !reco_arguments.contains(label) {
            messages.push(format!(
                "Argument <{}> in map is not reconstructed (argument label mismatch).",
                label
            ));
        }
    }
    for label in &reco_arguments {
        if !map_arguments.contains(label) {
            messages.push(format!(
                "Reconstructed argument <{}> is not in the map (argument label mismatch).",
                label
            ));
        }
    }
    for label in proposition_labels(map) {
        if !reco_propositions.contains(&label) {
            messages.push(format!(
                "Claim [{}] in argument map has no corresponding proposition in reconstructions \
                 (proposition label mismatch).",
                label
            ));
        }
    }
    messages
}

/// A map node as found in the reconstructions.
enum Node<'a> {
    Argument(&'a Argument),
    Proposition(&'a Proposition),
}

/// Looks up the counterpart of a map node. A node that is an argument in the map must be an
/// argument in the reconstructions too.
fn counterpart<'a>(label: &str, map: &ArgdownGraph, reco: &'a ArgdownGraph) -> Option<Node<'a>> {
    if map.is_argument(label) {
        reco.argument(label).map(Node::Argument)
    } else {
        reco.proposition(label).map(Node::Proposition)
    }
}

/// The claim stated by the last item of a premise-conclusion structure.
fn conclusion<'a>(argument: &Argument, reco: &'a ArgdownGraph) -> Option<&'a Proposition> {
    argument.pcs.last().and_then(|item| reco.proposition(&item.proposition_label))
}

fn premises<'a>(
    argument: &'a Argument,
    reco: &'a ArgdownGraph,
) -> impl Iterator<Item = Option<&'a Proposition>> + 'a {
    argument.premises().map(|item| reco.proposition(&item.proposition_label))
}

/// Every sketched support or attack in the map must be borne out by the premises and
/// conclusions of the reconstructed arguments it connects.
pub fn sketched_relation_coherence(map: &ArgdownGraph, reco: &ArgdownGraph) -> Vec<String> {
    let mut messages = Vec::new();
    let relations = map
        .relations
        .iter()
        .filter(|r| r.dialectics.contains(&DialecticalType::Sketched));
    for r in relations {
        let (Some(source), Some(target)) =
            (counterpart(&r.source, map, reco), counterpart(&r.target, map, reco))
        else {
            continue;
        };
        let (s, t) = (&r.source, &r.target);
        let message = match (source, target, r.valence) {
            (Node::Argument(a), Node::Argument(b), valence) => {
                if a.pcs.is_empty() || b.pcs.is_empty() {
                    continue;
                }
                let c = conclusion(a, reco);
                match valence {
                    Valence::Support if !premises(b, reco).any(|p| are_identical(p, c)) => format!(
                        "Sketched support relation from <{s}> to <{t}> in argument map is not \
                         grounded in the argument reconstruction, conclusion of <{s}> does not \
                         figure as premise in <{t}>."
                    ),
                    Valence::Attack
                        if !premises(b, reco).any(|p| are_contradictory(p, c, Some(reco))) =>
                    {
                        format!(
                            "Sketched attack relation from <{s}> to <{t}> in argument map is not \
                             grounded in the argument reconstruction, conclusion of <{s}> does \
                             not contradict any premise in <{t}>."
                        )
                    }
                    _ => continue,
                }
            }
            (Node::Proposition(p), Node::Argument(b), valence) => {
                if b.pcs.is_empty() {
                    continue;
                }
                match valence {
                    Valence::Support if !premises(b, reco).any(|q| are_identical(q, Some(p))) => {
                        format!(
                            "Sketched support relation from [{s}] to <{t}> in argument map is not \
                             grounded in the argument reconstruction, proposition [{s}] does not \
                             figure as premise in <{t}>."
                        )
                    }
                    Valence::Attack
                        if !premises(b, reco)
                            .any(|q| are_contradictory(q, Some(p), Some(reco))) =>
                    {
                        format!(
                            "Sketched attack relation from [{s}] to <{t}> in argument map is not \
                             grounded in the argument reconstruction, proposition [{s}] does not \
                             contradict any premise in <{t}>."
                        )
                    }
                    _ => continue,
                }
            }
            (Node::Argument(a), Node::Proposition(p), valence) => {
                if a.pcs.is_empty() {
                    continue;
                }
                let c = conclusion(a, reco);
                match valence {
                    Valence::Support if !are_identical(c, Some(p)) => format!(
                        "Sketched support relation from <{s}> to [{t}] in argument map is not \
                         grounded in the argument reconstruction, proposition [{t}] does not \
                         figure as conclusion in <{s}>."
                    ),
                    Valence::Attack if !are_contradictory(c, Some(p), Some(reco)) => format!(
                        "Sketched attack relation from <{s}> to [{t}] in argument map is not \
                         grounded in the argument reconstruction, proposition [{t}] does not \
                         contradict the conclusion of <{s}>."
                    ),
                    _ => continue,
                }
            }
            (Node::Proposition(_), Node::Proposition(_), _) => continue,
        };
        messages.push(message);
    }
    messages
}

/// Sketched relations of the map must be grounded in the logical reconstructions, and grounded
/// relations of the reconstructions must be captured by the map, possibly indirectly.
pub fn grounded_relation_coherence(map: &ArgdownGraph, reco: &ArgdownGraph) -> Vec<String> {
    let reco_labels: Vec<_> = reco.labels().collect();
    let map_labels: Vec<_> = map.labels().collect();
    let mut messages = Vec::new();

    for r in &map.relations {
        let (s, t) = (r.source.as_str(), r.target.as_str());
        if !reco_labels.contains(&s)
            || !reco_labels.contains(&t)
            || !r.dialectics.contains(&DialecticalType::Sketched)
        {
            continue;
        }
        let mut matches =
            reco.relations_between(s, t).filter(|m| m.valence == r.valence).peekable();
        if matches.peek().is_none() {
            messages.push(format!(
                "Dialectical {} relation from node '{}' to node '{}' in argument map is not \
                 matched by any relation in the argument reconstruction.",
                r.valence.name(),
                s,
                t
            ));
        } else if !matches.any(|m| m.dialectics.contains(&DialecticalType::Grounded)) {
            messages.push(format!(
                "Dialectical {} relation from node '{}' to node '{}' in argument map is not \
                 grounded in logical argument reconstructions.",
                r.valence.name(),
                s,
                t
            ));
        }
    }

    for r in &reco.relations {
        let (s, t) = (r.source.as_str(), r.target.as_str());
        if !map_labels.contains(&s)
            || !map_labels.contains(&t)
            || !r.dialectics.contains(&DialecticalType::Grounded)
        {
            continue;
        }
        let (captured, verb) = match r.valence {
            Valence::Support => (indirectly_supports(s, t, map), "supports"),
            Valence::Attack => (indirectly_attacks(s, t, map), "attacks"),
            Valence::Contradict => continue,
        };
        if !captured {
            messages.push(format!(
                "According to the argument reconstructions, item '{}' {} item '{}', but this \
                 dialectical relation is not captured in the argument map.",
                s, verb, t
            ));
        }
    }
    messages
}
