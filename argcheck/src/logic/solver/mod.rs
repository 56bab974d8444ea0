//! Deciding entailment between formulas.
//!
//! Every check is phrased as a single [`Entailment`]: the premises jointly entail the conclusion
//! exactly when the rendered SMT-LIB program is unsatisfiable. Backends implement [`Solver`].

mod bounded;
mod z3;

pub use bounded::BoundedModelFinder;
pub use z3::Z3Process;

use super::{
    ast::{Formula, Signature},
    error::SignatureError,
    smtlib, Declarations,
};
use serde::Deserialize;
use std::{fmt, io, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to spawn solver process: {0}")]
    FailedSpawnSolver(io::Error),

    #[error("failed to write to solver stdin: {0}")]
    FailedWriteToSolverStdin(io::Error),

    #[error("error while waiting for solver to exit: {0}")]
    FailedWaitForSolver(io::Error),

    #[error("solver gave invalid output: '{0}'")]
    SolverGaveInvalidOutput(String),

    #[error("solver could not decide the problem")]
    Unknown,

    #[error("solver timed out when solving problem")]
    SolverTimeout,

    #[error(
        "solver returned non-zero exit code: {}",
        if let Some(i) = .0 { format!("{}", i) } else { "none".to_owned() }
    )]
    NonZeroExitCode(Option<i32>),

    #[error("problem has {0} ground atoms, which exceeds the model finder limit")]
    ProblemTooLarge(usize),
}

/// A single entailment problem: do `premises` jointly entail `conclusion`?
#[derive(Debug, Clone)]
pub struct Entailment {
    pub premises: Vec<Arc<Formula>>,
    pub conclusion: Arc<Formula>,
    pub signature: Signature,

    /// The SMT-LIB program whose `check-sat` answers `unsat` iff the entailment holds.
    pub program: String,
}

impl Entailment {
    pub fn new(
        premises: &[(&str, Arc<Formula>)],
        conclusion: (&str, Arc<Formula>),
        declarations: &Declarations,
    ) -> Result<Self, SignatureError> {
        let labeled: Vec<_> = premises.iter().map(|(l, f)| (*l, f.as_ref())).collect();
        let program =
            smtlib::global_program(&labeled, (conclusion.0, &conclusion.1), declarations)?;
        let signature = Signature::of_all(
            premises.iter().map(|(_, f)| f.as_ref()).chain([conclusion.1.as_ref()]),
        )?;
        Ok(Entailment {
            premises: premises.iter().map(|(_, f)| f.clone()).collect(),
            conclusion: conclusion.1,
            signature,
            program,
        })
    }
}

/// A decision procedure for entailment problems.
pub trait Solver: fmt::Debug + Send + Sync {
    /// Returns `true` if the premises entail the conclusion.
    fn check(&self, problem: &Entailment) -> Result<bool, SolverError>;
}

/// Which solver backend to use, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverConfig {
    Z3 {
        #[serde(default = "default_z3_program")]
        program: String,
        #[serde(default = "default_z3_arguments")]
        arguments: Vec<String>,
    },
    Bounded {
        #[serde(default = "default_max_domain_size")]
        max_domain_size: usize,
    },
}

fn default_z3_program() -> String {
    "z3".to_owned()
}

fn default_z3_arguments() -> Vec<String> {
    vec!["-in".to_owned(), "-smt2".to_owned()]
}

fn default_max_domain_size() -> usize {
    4
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::Z3 {
            program: default_z3_program(),
            arguments: default_z3_arguments(),
        }
    }
}

impl SolverConfig {
    pub fn bounded() -> Self {
        SolverConfig::Bounded { max_domain_size: default_max_domain_size() }
    }

    pub fn build(&self) -> Arc<dyn Solver> {
        match self {
            SolverConfig::Z3 { program, arguments } => {
                Arc::new(Z3Process::new(program.clone(), arguments.clone()))
            }
            SolverConfig::Bounded { max_domain_size } => {
                Arc::new(BoundedModelFinder::new(*max_domain_size))
            }
        }
    }
}

/// The outcome of a validity check, together with the program that was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub program: String,
}

/// Checks whether `premises` jointly entail `conclusion`.
pub fn check_validity(
    solver: &dyn Solver,
    premises: &[(&str, Arc<Formula>)],
    conclusion: (&str, Arc<Formula>),
    declarations: &Declarations,
) -> crate::ArgcheckResult<Verdict> {
    let problem = Entailment::new(premises, conclusion, declarations)?;
    let valid = solver.check(&problem)?;
    log::debug!("entailment checked: valid = {}", valid);
    Ok(Verdict { valid, program: problem.program })
}
