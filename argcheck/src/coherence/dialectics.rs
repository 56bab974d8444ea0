//! Judgements about how claims relate to each other, used to match maps against
//! reconstructions.

use crate::processing::argdown::{ArgdownGraph, Proposition, Valence};

const NEGATION_PREFIXES: [&str; 4] = ["NOT: ", "Not: ", "NOT ", "Not "];

fn negates(text: &str, other: &str) -> bool {
    NEGATION_PREFIXES
        .iter()
        .any(|prefix| text.strip_prefix(prefix).is_some_and(|rest| rest == other))
}

/// Two propositions are identical if they share a label or a text.
pub fn are_identical(a: Option<&Proposition>, b: Option<&Proposition>) -> bool {
    let (Some(a), Some(b)) = (a, b) else { return false };
    a.label == b.label || a.texts.iter().any(|text| b.texts.contains(text))
}

/// Two distinct propositions contradict each other if `graph` declares an adverse relation
/// between them, in either direction, or if one text is a negation of the other.
pub fn are_contradictory(
    a: Option<&Proposition>,
    b: Option<&Proposition>,
    graph: Option<&ArgdownGraph>,
) -> bool {
    let (Some(a), Some(b)) = (a, b) else { return false };
    if a.label == b.label {
        return false;
    }
    let labels = [a.label.as_str(), b.label.as_str()];
    let declared = graph.is_some_and(|g| {
        g.relations.iter().any(|r| {
            r.source != r.target
                && labels.contains(&r.source.as_str())
                && labels.contains(&r.target.as_str())
                && r.valence.is_adverse()
        })
    });
    declared
        || a.texts.iter().any(|x| b.texts.iter().any(|y| negates(x, y) || negates(y, x)))
}

/// Whether some claim other than `from` and `to` sits between them with relations satisfying
/// `chain`.
fn two_step(
    from: &str,
    to: &str,
    graph: &ArgdownGraph,
    chain: impl Fn(Valence, Valence) -> bool,
) -> bool {
    graph
        .propositions
        .iter()
        .filter(|p| !p.unlabeled && p.label != from && p.label != to)
        .any(|p| {
            graph.relations_between(from, &p.label).any(|first| {
                graph
                    .relations_between(&p.label, to)
                    .any(|second| chain(first.valence, second.valence))
            })
        })
}

/// Whether `from` supports `to` in `graph`, directly or through one intermediate claim. Every
/// node supports itself.
pub fn indirectly_supports(from: &str, to: &str, graph: &ArgdownGraph) -> bool {
    if from == to {
        return true;
    }
    graph.relations_between(from, to).any(|r| r.valence == Valence::Support)
        || two_step(from, to, graph, |first, second| {
            (first == Valence::Support && second == Valence::Support)
                || (first.is_adverse() && second.is_adverse())
        })
}

/// Whether `from` attacks `to` in `graph`, directly or through one intermediate claim.
pub fn indirectly_attacks(from: &str, to: &str, graph: &ArgdownGraph) -> bool {
    if from == to {
        return false;
    }
    graph.relations_between(from, to).any(|r| r.valence == Valence::Attack)
        || two_step(from, to, graph, |first, second| {
            (first == Valence::Support && second.is_adverse())
                || (first.is_adverse() && second == Valence::Support)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::argdown::parse;

    fn graph(input: &str) -> ArgdownGraph {
        parse(input).unwrap()
    }

    #[test]
    fn test_identity_and_contradiction() {
        let g = graph("[A]: Cats purr.\n[B]: NOT: Cats purr.\n[C]: Dogs bark.\n[D]: Cats purr.");
        let (a, b, c, d) =
            (g.proposition("A"), g.proposition("B"), g.proposition("C"), g.proposition("D"));
        assert!(are_identical(a, a));
        assert!(are_identical(a, d));
        assert!(!are_identical(a, c));
        assert!(!are_identical(a, None));

        assert!(are_contradictory(a, b, None));
        assert!(are_contradictory(b, a, None));
        assert!(!are_contradictory(a, c, None));
        assert!(!are_contradictory(a, a, None));
    }

    #[test]
    fn test_declared_contradiction() {
        let g = graph("[A]: Cats purr.\n    >< [B]: Cats are silent.");
        assert!(are_contradictory(g.proposition("B"), g.proposition("A"), Some(&g)));
        assert!(!are_contradictory(g.proposition("B"), g.proposition("A"), None));
    }

    #[test]
    fn test_indirect_relations() {
        let g = graph(
            "[T]: Thesis.\n    \
             <+ [R]: Reason.\n        \
             <+ <A>: Argument for the reason.\n        \
             <- <B>: Objection to the reason.\n    \
             <- [O]: Objection.\n        \
             <- <C>: Rebuttal.",
        );
        assert!(indirectly_supports("A", "T", &g));
        assert!(indirectly_supports("C", "T", &g));
        assert!(indirectly_supports("T", "T", &g));
        assert!(!indirectly_supports("B", "T", &g));

        assert!(indirectly_attacks("B", "T", &g));
        assert!(indirectly_attacks("O", "T", &g));
        assert!(!indirectly_attacks("A", "T", &g));
        assert!(!indirectly_attacks("T", "T", &g));
    }
}
