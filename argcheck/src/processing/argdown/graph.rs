use super::inline::InlineData;
use std::{collections::BTreeSet, fmt};

#[derive(Debug, Clone, PartialEq)]
pub struct Proposition {
    pub label: String,
    pub texts: Vec<String>,
    pub data: InlineData,

    /// Set when `label` was generated by the parser.
    pub unlabeled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PcsRole {
    Premise,

    /// A conclusion, with the inline data of the inference line above it.
    Conclusion(InlineData),
}

/// An item of a premise-conclusion structure, e.g. `(2) [Claim]: text`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcsItem {
    /// The item label, local to its argument (`2` in the example above).
    pub label: String,
    pub proposition_label: String,
    pub role: PcsRole,
}

impl PcsItem {
    pub fn is_conclusion(&self) -> bool {
        matches!(self.role, PcsRole::Conclusion(_))
    }

    pub fn inference_data(&self) -> Option<&InlineData> {
        match &self.role {
            PcsRole::Conclusion(data) => Some(data),
            PcsRole::Premise => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub label: String,
    pub gists: Vec<String>,
    pub data: InlineData,
    pub pcs: Vec<PcsItem>,
    pub unlabeled: bool,
}

impl Argument {
    pub fn premises(&self) -> impl Iterator<Item = &PcsItem> + Clone {
        self.pcs.iter().filter(|item| !item.is_conclusion())
    }

    /// The last item of the premise-conclusion structure, if it is a conclusion.
    pub fn final_conclusion(&self) -> Option<&PcsItem> {
        self.pcs.last().filter(|item| item.is_conclusion())
    }

    /// `<label>`, or `<unlabeled argument>` for generated labels.
    pub fn display_label(&self) -> String {
        if self.unlabeled {
            "<unlabeled argument>".to_owned()
        } else {
            format!("<{}>", self.label)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Valence {
    Support,
    Attack,
    Contradict,
}

impl Valence {
    /// The upper-case name, e.g. `SUPPORT`.
    pub fn name(self) -> &'static str {
        match self {
            Valence::Support => "SUPPORT",
            Valence::Attack => "ATTACK",
            Valence::Contradict => "CONTRADICT",
        }
    }

    pub fn is_adverse(self) -> bool {
        matches!(self, Valence::Attack | Valence::Contradict)
    }
}

impl fmt::Display for Valence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Valence::Support => "support",
            Valence::Attack => "attack",
            Valence::Contradict => "contradict",
        };
        write!(f, "{}", s)
    }
}

/// How a dialectical relation came to be part of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DialecticalType {
    /// Implied by the premise-conclusion structures of the arguments involved.
    Grounded,

    /// Declared in a relation tree, with an argument on at least one end.
    Sketched,

    /// Declared in a relation tree between two propositions.
    Axiomatic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub valence: Valence,
    pub dialectics: BTreeSet<DialecticalType>,
}

impl Relation {
    fn new(source: &str, target: &str, valence: Valence, kind: DialecticalType) -> Self {
        Relation {
            source: source.to_owned(),
            target: target.to_owned(),
            valence,
            dialectics: BTreeSet::from([kind]),
        }
    }

    fn connects(&self, source: &str, target: &str, valence: Valence) -> bool {
        self.source == source && self.target == target && self.valence == valence
    }
}

/// A parsed Argdown document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgdownGraph {
    pub propositions: Vec<Proposition>,
    pub arguments: Vec<Argument>,
    pub relations: Vec<Relation>,
}

impl ArgdownGraph {
    pub fn proposition(&self, label: &str) -> Option<&Proposition> {
        self.propositions.iter().find(|p| p.label == label)
    }

    pub fn argument(&self, label: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.label == label)
    }

    pub fn is_argument(&self, label: &str) -> bool {
        self.argument(label).is_some()
    }

    /// Every relation from `source` to `target`.
    pub fn relations_between<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> impl Iterator<Item = &'a Relation> {
        self.relations.iter().filter(move |r| r.source == source && r.target == target)
    }

    /// The labels of every node: propositions first, then arguments.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.propositions
            .iter()
            .map(|p| p.label.as_str())
            .chain(self.arguments.iter().map(|a| a.label.as_str()))
    }

    /// Adds a relation, or merges its dialectical types into an identical existing one.
    pub(super) fn add_relation(&mut self, relation: Relation) {
        let existing = self
            .relations
            .iter_mut()
            .find(|r| r.connects(&relation.source, &relation.target, relation.valence));
        match existing {
            Some(r) => r.dialectics.extend(relation.dialectics),
            None => self.relations.push(relation),
        }
    }

    pub(super) fn declare_relation(&mut self, source: &str, target: &str, valence: Valence) {
        let kind = if self.is_argument(source) || self.is_argument(target) {
            DialecticalType::Sketched
        } else {
            DialecticalType::Axiomatic
        };
        self.add_relation(Relation::new(source, target, valence, kind));
    }

    /// Derives the relations implied by the premise-conclusion structures and merges them in.
    pub(super) fn derive_grounded_relations(&mut self) {
        use DialecticalType::Grounded;

        // Adverse relations between propositions, as declared in relation trees
        let adverse: Vec<(String, String)> = self
            .relations
            .iter()
            .filter(|r| {
                r.valence.is_adverse() && !r.dialectics.contains(&DialecticalType::Sketched)
            })
            .flat_map(|r| {
                let forward = (r.source.clone(), r.target.clone());
                let backward = (r.target.clone(), r.source.clone());
                let mirrored = (r.valence == Valence::Contradict).then_some(backward);
                std::iter::once(forward).chain(mirrored)
            })
            .collect();
        let attacks = |from: &str, to: &str| adverse.iter().any(|(s, t)| s == from && t == to);

        let mut derived = Vec::new();
        for argument in &self.arguments {
            for premise in argument.premises() {
                derived.push(Relation::new(
                    &premise.proposition_label,
                    &argument.label,
                    Valence::Support,
                    Grounded,
                ));
            }
            if let Some(conclusion) = argument.final_conclusion() {
                derived.push(Relation::new(
                    &argument.label,
                    &conclusion.proposition_label,
                    Valence::Support,
                    Grounded,
                ));
            }
        }

        for a in &self.arguments {
            let Some(conclusion) = a.final_conclusion() else { continue };
            let conclusion = conclusion.proposition_label.as_str();
            for b in &self.arguments {
                if a.label == b.label {
                    continue;
                }
                let mut premises = b.premises().map(|p| p.proposition_label.as_str());
                if premises.clone().any(|p| p == conclusion) {
                    derived.push(Relation::new(&a.label, &b.label, Valence::Support, Grounded));
                } else if premises.any(|p| attacks(conclusion, p)) {
                    derived.push(Relation::new(&a.label, &b.label, Valence::Attack, Grounded));
                }
            }
        }

        for (source, target) in &adverse {
            for b in &self.arguments {
                if b.premises().any(|p| &p.proposition_label == target) {
                    derived.push(Relation::new(source, &b.label, Valence::Attack, Grounded));
                }
            }
        }

        for relation in derived {
            self.add_relation(relation);
        }
    }
}
