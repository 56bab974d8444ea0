//! The error types for formula parsing and symbol analysis.

use super::{ast::SymbolKind, lexer::Token};
use thiserror::Error;

/// What went wrong while parsing a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaErrorKind {
    /// The lexer encountered an unexpected character.
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),

    /// The parser encountered an unexpected token.
    #[error("unexpected token: '{0}'")]
    UnexpectedToken(Token),

    /// The input ended in the middle of a formula.
    #[error("unexpected end of formula")]
    UnexpectedEof,

    /// A predicate was applied to something other than a variable or constant, e.g. `F(g(a))`.
    #[error("nested function term in argument of '{0}'")]
    NestedTerm(String),

    /// A quantifier was not followed by any variable, e.g. `all .P(x)`.
    #[error("quantifier without variables")]
    MissingQuantifiedVariable,

    /// The formula string was empty or only contained whitespace.
    #[error("empty formula")]
    Empty,
}

/// A formula that could not be parsed, together with the offending input and column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid formula: {input}. Error: {kind} (at column {column})")]
pub struct FormulaError {
    pub input: String,
    pub kind: FormulaErrorKind,
    pub column: usize,
}

/// The error type for symbol classification across one or more formulas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Inconsistent arity: symbol '{symbol}' is used both as {first} and as {second}")]
    InconsistentArity {
        symbol: String,
        first: SymbolKind,
        second: SymbolKind,
    },
}
