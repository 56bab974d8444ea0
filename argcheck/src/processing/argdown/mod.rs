//! The Argdown parser and the argument graph it produces.

mod graph;
mod inline;
mod parser;

pub use graph::*;
pub use inline::{InlineData, InlineValue};

use crate::ArgcheckResult;
use thiserror::Error;

/// The error type for the Argdown parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgdownError {
    /// A node label opened with the given bracket was never closed.
    #[error("unclosed label starting with '{0}'")]
    UnclosedLabel(char),

    #[error("empty label")]
    EmptyLabel,

    /// An opening `{` of inline data has no matching `}` before the end of the statement.
    #[error("unclosed inline data")]
    UnclosedInlineData,

    /// The inline data is not a valid YAML mapping.
    #[error("invalid inline data: {0}")]
    InvalidInlineData(String),

    /// A relation line whose indentation does not place it below any node.
    #[error("relation without a parent node")]
    OrphanRelation,

    #[error("inference line outside of a premise-conclusion structure")]
    OrphanInference,

    /// A line starting with `--` that is neither `-- ... --` nor a line of at least four dashes.
    #[error("malformed inference line")]
    MalformedInference,

    #[error("argument in premise-conclusion structure")]
    ArgumentInPcs,

    #[error("unclosed block comment")]
    UnclosedComment,
}

/// Parses an Argdown snippet and derives the relations implied by its premise-conclusion
/// structures.
pub fn parse(input: &str) -> ArgcheckResult<ArgdownGraph> {
    let mut graph = parser::parse(input)?;
    graph.derive_grounded_relations();
    log::debug!(
        "parsed argdown graph with {} propositions, {} arguments and {} relations",
        graph.propositions.len(),
        graph.arguments.len(),
        graph.relations.len(),
    );
    Ok(graph)
}
