//! The abstract syntax tree of first-order formulas, and the symbol analysis performed on it.

use super::error::SignatureError;
use indexmap::{map::Entry, IndexMap, IndexSet};
use std::fmt;

/// A binary connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
    Implies,
    Iff,
}

impl Connective {
    /// The binding strength of the connective. Lower values bind tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Connective::And => 6,
            Connective::Or => 7,
            Connective::Implies => 8,
            Connective::Iff => 9,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Connective::And => "&",
            Connective::Or => "|",
            Connective::Implies => "->",
            Connective::Iff => "<->",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Forall,
    Exists,
}

impl Quantifier {
    fn keyword(self) -> &'static str {
        match self {
            Quantifier::Forall => "all",
            Quantifier::Exists => "exists",
        }
    }
}

/// A first-order formula. Terms are plain names: a bound variable, a free variable or a
/// constant. Nested function terms are not part of the language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// A propositional atom, e.g. `p`.
    Atom(String),

    /// A predicate applied to one or more terms, e.g. `F(a,b)`.
    App(String, Vec<String>),

    /// An identity statement, e.g. `a = b`.
    Equals(String, String),

    Not(Box<Formula>),

    Binary(Connective, Box<Formula>, Box<Formula>),

    /// A quantifier over a single variable. `all x y.F(x,y)` is represented as two nested
    /// quantifiers.
    Quantified(Quantifier, String, Box<Formula>),
}

impl Formula {
    pub fn not(inner: Formula) -> Self {
        Formula::Not(Box::new(inner))
    }

    pub fn binary(connective: Connective, left: Formula, right: Formula) -> Self {
        Formula::Binary(connective, Box::new(left), Box::new(right))
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Formula::Atom(_) | Formula::App(..) | Formula::Equals(..))
    }

    /// Returns `true` if this is the negation of a unary predication, like `-F(a)`.
    pub fn is_negated_unary(&self) -> bool {
        match self {
            Formula::Not(inner) => matches!(inner.as_ref(), Formula::App(_, args) if args.len() == 1),
            _ => false,
        }
    }

    /// Calls `visitor` for every free occurrence of a symbol, in order of appearance.
    fn visit_symbols<'a, F>(&'a self, bound: &mut Vec<&'a str>, visitor: &mut F)
    where
        F: FnMut(&'a str, SymbolKind),
    {
        match self {
            Formula::Atom(name) => visitor(name, SymbolKind::Proposition),
            Formula::App(predicate, args) => {
                visitor(predicate, SymbolKind::Predicate(args.len()));
                for a in args {
                    visit_term(a, bound, visitor);
                }
            }
            Formula::Equals(a, b) => {
                visit_term(a, bound, visitor);
                visit_term(b, bound, visitor);
            }
            Formula::Not(inner) => inner.visit_symbols(bound, visitor),
            Formula::Binary(_, left, right) => {
                left.visit_symbols(bound, visitor);
                right.visit_symbols(bound, visitor);
            }
            Formula::Quantified(_, var, body) => {
                bound.push(var);
                body.visit_symbols(bound, visitor);
                bound.pop();
            }
        }
    }

    /// The free symbols of the formula, in order of first appearance. Bound variables are not
    /// included.
    pub fn symbols(&self) -> IndexSet<&str> {
        let mut result = IndexSet::new();
        self.visit_symbols(&mut Vec::new(), &mut |name, _| {
            result.insert(name);
        });
        result
    }

    /// Classifies every free symbol of the formula.
    pub fn signature(&self) -> Result<Signature, SignatureError> {
        let mut signature = Signature::default();
        signature.extend_with(self)?;
        Ok(signature)
    }
}

fn visit_term<'a, F>(name: &'a str, bound: &[&'a str], visitor: &mut F)
where
    F: FnMut(&'a str, SymbolKind),
{
    if !bound.contains(&name) {
        visitor(name, SymbolKind::Individual);
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Atom(name) => write!(f, "{}", name),
            Formula::App(predicate, args) => write!(f, "{}({})", predicate, args.join(",")),
            Formula::Equals(a, b) => write!(f, "({} = {})", a, b),
            Formula::Not(inner) => write!(f, "-{}", inner),
            Formula::Binary(c, left, right) => write!(f, "({} {} {})", left, c.symbol(), right),
            Formula::Quantified(q, var, body) => write!(f, "{} {}.{}", q.keyword(), var, body),
        }
    }
}

/// The role a symbol plays in a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A 0-ary propositional symbol, declared as a boolean.
    Proposition,

    /// A free individual term, declared as a constant of the universal sort.
    Individual,

    /// A predicate with the given arity.
    Predicate(usize),
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolKind::Proposition => write!(f, "a proposition"),
            SymbolKind::Individual => write!(f, "an individual"),
            SymbolKind::Predicate(n) => write!(f, "a predicate of arity {}", n),
        }
    }
}

/// The classification of all free symbols of a set of formulas, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature(IndexMap<String, SymbolKind>);

impl Signature {
    /// Builds the joint signature of several formulas, failing if a symbol is used
    /// inconsistently across them.
    pub fn of_all<'a, I>(formulas: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator<Item = &'a Formula>,
    {
        let mut signature = Signature::default();
        for f in formulas {
            signature.extend_with(f)?;
        }
        Ok(signature)
    }

    pub fn extend_with(&mut self, formula: &Formula) -> Result<(), SignatureError> {
        let mut error = None;
        formula.visit_symbols(&mut Vec::new(), &mut |name, kind| {
            if error.is_some() {
                return;
            }
            if let Err(e) = self.insert(name, kind) {
                error = Some(e);
            }
        });
        error.map_or(Ok(()), Err)
    }

    fn insert(&mut self, name: &str, kind: SymbolKind) -> Result<(), SignatureError> {
        match self.0.entry(name.to_owned()) {
            Entry::Vacant(e) => {
                e.insert(kind);
                Ok(())
            }
            Entry::Occupied(e) if *e.get() == kind => Ok(()),
            Entry::Occupied(e) => Err(SignatureError::InconsistentArity {
                symbol: name.to_owned(),
                first: *e.get(),
                second: kind,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<SymbolKind> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolKind)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn of_kind(&self, pred: impl Fn(SymbolKind) -> bool) -> impl Iterator<Item = &str> {
        self.iter().filter(move |(_, k)| pred(*k)).map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
