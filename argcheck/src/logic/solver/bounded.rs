use super::{Entailment, Solver, SolverError};
use crate::logic::ast::{Connective, Formula, Quantifier, SymbolKind};
use ahash::AHashMap;

/// Upper bound on the number of ground atoms of a single instantiated problem.
const MAX_GROUND_ATOMS: usize = 2048;

/// An in-process solver that searches for a countermodel over finite domains.
///
/// For every domain size up to `max_domain_size`, individual constants are assigned to domain
/// elements (up to symmetry), quantifiers are expanded into finite conjunctions and
/// disjunctions, and the resulting propositional problem "all premises true, conclusion false"
/// is decided by a backtracking search. If no countermodel is found, the entailment is
/// reported as valid. This is exact for quantifier-free problems, and for quantified problems
/// whose countermodels (if any) fit in the bound.
#[derive(Debug, Clone)]
pub struct BoundedModelFinder {
    max_domain_size: usize,
}

impl BoundedModelFinder {
    pub fn new(max_domain_size: usize) -> Self {
        Self { max_domain_size: max_domain_size.max(1) }
    }
}

impl Default for BoundedModelFinder {
    fn default() -> Self {
        Self::new(4)
    }
}

/// A ground propositional formula over interned atoms.
#[derive(Debug, Clone)]
enum Ground {
    Const(bool),
    Atom(usize),
    Not(Box<Ground>),
    And(Vec<Ground>),
    Or(Vec<Ground>),
    Iff(Box<Ground>, Box<Ground>),
}

impl Ground {
    fn negate(self) -> Self {
        match self {
            Ground::Const(b) => Ground::Const(!b),
            Ground::Not(inner) => *inner,
            other => Ground::Not(Box::new(other)),
        }
    }

    /// Builds an n-ary conjunction (if `is_and`) or disjunction, folding constants.
    fn junction(is_and: bool, items: Vec<Ground>) -> Self {
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Ground::Const(b) if b == is_and => (),
                Ground::Const(_) => return Ground::Const(!is_and),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Ground::Const(is_and),
            1 => kept.pop().unwrap_or(Ground::Const(is_and)),
            _ if is_and => Ground::And(kept),
            _ => Ground::Or(kept),
        }
    }

    fn iff(a: Ground, b: Ground) -> Self {
        match (a, b) {
            (Ground::Const(x), Ground::Const(y)) => Ground::Const(x == y),
            (Ground::Const(true), g) | (g, Ground::Const(true)) => g,
            (Ground::Const(false), g) | (g, Ground::Const(false)) => g.negate(),
            (a, b) => Ground::Iff(Box::new(a), Box::new(b)),
        }
    }

    /// Three-valued evaluation under a partial assignment.
    fn eval(&self, values: &[Option<bool>]) -> Option<bool> {
        match self {
            Ground::Const(b) => Some(*b),
            Ground::Atom(i) => values[*i],
            Ground::Not(inner) => inner.eval(values).map(|b| !b),
            Ground::And(items) | Ground::Or(items) => {
                let is_and = matches!(self, Ground::And(_));
                let mut undecided = false;
                for item in items {
                    match item.eval(values) {
                        Some(b) if b != is_and => return Some(b),
                        Some(_) => (),
                        None => undecided = true,
                    }
                }
                (!undecided).then_some(is_and)
            }
            Ground::Iff(a, b) => Some(a.eval(values)? == b.eval(values)?),
        }
    }

    fn first_unassigned(&self, values: &[Option<bool>]) -> Option<usize> {
        match self {
            Ground::Const(_) => None,
            Ground::Atom(i) => values[*i].is_none().then_some(*i),
            Ground::Not(inner) => inner.first_unassigned(values),
            Ground::And(items) | Ground::Or(items) => {
                items.iter().find_map(|g| g.first_unassigned(values))
            }
            Ground::Iff(a, b) => a.first_unassigned(values).or_else(|| b.first_unassigned(values)),
        }
    }
}

fn satisfiable(goal: &Ground, values: &mut [Option<bool>]) -> bool {
    if let Some(result) = goal.eval(values) {
        return result;
    }
    let Some(atom) = goal.first_unassigned(values) else {
        return false;
    };
    for choice in [true, false] {
        values[atom] = Some(choice);
        if satisfiable(goal, values) {
            return true;
        }
    }
    values[atom] = None;
    false
}

struct Grounder<'a> {
    domain_size: usize,
    constants: AHashMap<&'a str, usize>,
    atoms: AHashMap<(&'a str, Vec<usize>), usize>,
}

impl<'a> Grounder<'a> {
    fn value(&self, name: &str, env: &[(&str, usize)]) -> usize {
        env.iter()
            .rev()
            .find(|(v, _)| *v == name)
            .map(|(_, d)| *d)
            .or_else(|| self.constants.get(name).copied())
            .unwrap_or(0)
    }

    fn atom(&mut self, name: &'a str, args: Vec<usize>) -> Result<Ground, SolverError> {
        let next = self.atoms.len();
        let index = *self.atoms.entry((name, args)).or_insert(next);
        if self.atoms.len() > MAX_GROUND_ATOMS {
            return Err(SolverError::ProblemTooLarge(self.atoms.len()));
        }
        Ok(Ground::Atom(index))
    }

    fn ground(
        &mut self,
        f: &'a Formula,
        env: &mut Vec<(&'a str, usize)>,
    ) -> Result<Ground, SolverError> {
        Ok(match f {
            Formula::Atom(name) => self.atom(name, Vec::new())?,
            Formula::App(predicate, args) => {
                let values = args.iter().map(|a| self.value(a, env.as_slice())).collect();
                self.atom(predicate, values)?
            }
            Formula::Equals(a, b) => {
                Ground::Const(self.value(a, env.as_slice()) == self.value(b, env.as_slice()))
            }
            Formula::Not(inner) => self.ground(inner, env)?.negate(),
            Formula::Binary(c, left, right) => {
                let left = self.ground(left, env)?;
                let right = self.ground(right, env)?;
                match c {
                    Connective::And => Ground::junction(true, vec![left, right]),
                    Connective::Or => Ground::junction(false, vec![left, right]),
                    Connective::Implies => Ground::junction(false, vec![left.negate(), right]),
                    Connective::Iff => Ground::iff(left, right),
                }
            }
            Formula::Quantified(q, var, body) => {
                let mut instances = Vec::with_capacity(self.domain_size);
                for d in 0..self.domain_size {
                    env.push((var, d));
                    let instance = self.ground(body, env);
                    env.pop();
                    instances.push(instance?);
                }
                Ground::junction(*q == Quantifier::Forall, instances)
            }
        })
    }
}

fn has_quantifier(f: &Formula) -> bool {
    match f {
        Formula::Quantified(..) => true,
        Formula::Not(inner) => has_quantifier(inner),
        Formula::Binary(_, l, r) => has_quantifier(l) || has_quantifier(r),
        _ => false,
    }
}

/// Enumerates assignments of `count` constants to `domain_size` elements as restricted growth
/// strings, so that assignments equal up to a permutation of the domain are only visited once.
fn canonical_assignments(count: usize, domain_size: usize) -> Vec<Vec<usize>> {
    fn go(prefix: &mut Vec<usize>, count: usize, domain_size: usize, acc: &mut Vec<Vec<usize>>) {
        if prefix.len() == count {
            acc.push(prefix.clone());
            return;
        }
        let limit = prefix.iter().max().map_or(0, |m| m + 1).min(domain_size - 1);
        for v in 0..=limit {
            prefix.push(v);
            go(prefix, count, domain_size, acc);
            prefix.pop();
        }
    }
    let mut acc = Vec::new();
    go(&mut Vec::new(), count, domain_size, &mut acc);
    acc
}

impl Solver for BoundedModelFinder {
    fn check(&self, problem: &Entailment) -> Result<bool, SolverError> {
        let individuals: Vec<&str> = problem
            .signature
            .of_kind(|k| k == SymbolKind::Individual)
            .collect();
        let quantified = problem.premises.iter().any(|p| has_quantifier(p))
            || has_quantifier(&problem.conclusion);

        // Without quantifiers, a domain with one element per constant is always enough
        let max_size = if quantified {
            self.max_domain_size
        } else {
            individuals.len().max(1)
        };

        for domain_size in 1..=max_size {
            for assignment in canonical_assignments(individuals.len(), domain_size) {
                let mut grounder = Grounder {
                    domain_size,
                    constants: individuals.iter().copied().zip(assignment).collect(),
                    atoms: AHashMap::new(),
                };
                let mut env = Vec::new();
                let mut parts = Vec::with_capacity(problem.premises.len() + 1);
                for p in &problem.premises {
                    parts.push(grounder.ground(p, &mut env)?);
                }
                parts.push(grounder.ground(&problem.conclusion, &mut env)?.negate());
                let goal = Ground::junction(true, parts);

                let mut values = vec![None; grounder.atoms.len()];
                if satisfiable(&goal, &mut values) {
                    log::debug!("countermodel found with domain size {}", domain_size);
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
