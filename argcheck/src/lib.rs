#![deny(clippy::disallowed_methods)]
#![deny(clippy::self_named_module_files)]
#![warn(clippy::branches_sharing_code)]
#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::equatable_if_let)]
#![warn(clippy::explicit_into_iter_loop)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::from_iter_instead_of_collect)]
#![warn(clippy::get_unwrap)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::manual_assert)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::match_wildcard_for_single_variants)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::str_to_string)]
#![warn(clippy::string_to_string)]
#![warn(clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::unnecessary_wraps)]
#![warn(clippy::unnested_or_patterns)]
#![warn(clippy::unused_self)]

pub mod coherence;
pub mod config;
pub mod evaluation;
pub mod handlers;
pub mod logic;
pub mod processing;
pub mod request;
pub mod suite;
mod utils;

pub use config::VerifierConfig;
pub use evaluation::{DimensionMap, Evaluation};
pub use handlers::Handler;
pub use request::VerificationRequest;
pub use suite::Suite;

use logic::{FormulaError, SignatureError, SolverError};
use processing::{argdown::ArgdownError, xml::XmlError, Position};
use std::io;
use thiserror::Error;

pub type ArgcheckResult<T> = Result<T, Error>;

fn wrap_syntax_error_message(kind: &str, e: &dyn std::fmt::Display, pos: &Position) -> String {
    format!("{} syntax error: {} (on line {}, column {})", kind, e, pos.0, pos.1)
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("{}", wrap_syntax_error_message("argdown", .0, .1))]
    Argdown(ArgdownError, Position),

    #[error("{}", wrap_syntax_error_message("xml", .0, .1))]
    Xml(XmlError, Position),

    #[error("unknown suite '{0}'")]
    UnknownSuite(String),

    /// A handler received a data item whose payload is not the one it works on.
    #[error("handler '{handler}' expected {expected} data")]
    WrongPayload {
        handler: String,
        expected: &'static str,
    },
}

/// Runs the full pipeline of `suite` over an answer and reduces the result to an evaluation.
pub fn verify(
    suite: Suite,
    inputs: &str,
    source: Option<&str>,
    config: &VerifierConfig,
) -> Evaluation {
    let request = VerificationRequest::new(inputs, source.map(str::to_owned));
    let request = suite.handler(config).process(request);
    Evaluation::from_request(&request, &suite.dimensions())
}
