//! First-order formalizations: parsing, rendering and validity checking.

pub mod ast;
pub mod error;
mod latex;
mod lexer;
mod nl;
mod parser;
pub mod smtlib;
pub mod solver;

pub use ast::{Formula, Signature, SymbolKind};
pub use error::{FormulaError, FormulaErrorKind, SignatureError};
pub use latex::render_latex;
pub use lexer::Token;
pub use nl::to_natural_language;
pub use smtlib::render_smt;
pub use solver::{check_validity, Entailment, Solver, SolverConfig, SolverError, Verdict};

use ahash::AHashMap;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, OnceLock};

/// A mapping from symbols to their natural-language glosses.
pub type Declarations = IndexMap<String, String>;

/// Once the cache holds this many entries, it is cleared before inserting a new one.
const CACHE_CAPACITY: usize = 4096;

type FormulaCache = Mutex<AHashMap<String, Result<Arc<Formula>, FormulaError>>>;

static FORMULA_CACHE: OnceLock<FormulaCache> = OnceLock::new();

/// Parses a formula, memoizing the result by input string. Repeated calls with the same input
/// return the same `Arc`.
pub fn parse_formula(input: &str) -> Result<Arc<Formula>, FormulaError> {
    let cache = FORMULA_CACHE.get_or_init(Default::default);
    if let Ok(guard) = cache.lock() {
        if let Some(hit) = guard.get(input) {
            return hit.clone();
        }
    }

    let result = parser::Parser::new(input)
        .and_then(parser::Parser::parse)
        .map(Arc::new);

    // A poisoned lock only means we skip caching
    if let Ok(mut guard) = cache.lock() {
        if guard.len() >= CACHE_CAPACITY {
            guard.clear();
        }
        guard.insert(input.to_owned(), result.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_memoized() {
        let first = parse_formula("all x.(F(x) -> G(x))").unwrap();
        let second = parse_formula("all x.(F(x) -> G(x))").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let err = parse_formula("F(").unwrap_err();
        assert_eq!(parse_formula("F(").unwrap_err(), err);
        assert!(err.to_string().starts_with("Invalid formula: F(. Error:"));
    }

    #[test]
    fn test_symbols_and_signature() {
        let f = parse_formula("all x.(M(x) -> Mo(x)) & R(s,a) & p & s = b").unwrap();
        let symbols: Vec<_> = f.symbols().into_iter().collect();
        assert_eq!(symbols, ["M", "Mo", "R", "s", "a", "p", "b"]);

        let signature = f.signature().unwrap();
        assert_eq!(signature.get("Mo"), Some(SymbolKind::Predicate(1)));
        assert_eq!(signature.get("R"), Some(SymbolKind::Predicate(2)));
        assert_eq!(signature.get("s"), Some(SymbolKind::Individual));
        assert_eq!(signature.get("p"), Some(SymbolKind::Proposition));
        assert_eq!(signature.get("x"), None);

        let bad = parse_formula("F(a) & F(a,b)").unwrap();
        assert!(bad.signature().is_err());
        let bad = parse_formula("p & F(p)").unwrap();
        assert!(bad.signature().is_err());
    }
}
