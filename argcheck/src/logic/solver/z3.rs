use super::{Entailment, Solver, SolverError};
use std::{
    io::Write,
    process::{Command, Stdio},
};

/// Runs an external SMT-LIB solver (by default `z3 -in -smt2`) once per problem, feeding the
/// program through stdin.
#[derive(Debug, Clone)]
pub struct Z3Process {
    program: String,
    arguments: Vec<String>,
}

impl Z3Process {
    pub fn new(program: String, arguments: Vec<String>) -> Self {
        Self { program, arguments }
    }

    fn run(&self, input: &str) -> Result<String, SolverError> {
        let mut process = Command::new(&self.program)
            .args(&self.arguments)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SolverError::FailedSpawnSolver)?;

        if let Some(mut stdin) = process.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(SolverError::FailedWriteToSolverStdin)?;
        }

        let output = process
            .wait_with_output()
            .map_err(SolverError::FailedWaitForSolver)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("timeout") || stdout.contains("timeout") {
                return Err(SolverError::SolverTimeout);
            }
            // z3 exits with a non-zero code when the program contains errors, but still reports
            // them on stdout
            if stdout.trim_start().starts_with("(error") {
                return Err(SolverError::SolverGaveInvalidOutput(stdout.trim().to_owned()));
            }
            return Err(SolverError::NonZeroExitCode(output.status.code()));
        }
        Ok(stdout)
    }
}

impl Solver for Z3Process {
    fn check(&self, problem: &Entailment) -> Result<bool, SolverError> {
        let output = self.run(&problem.program)?;
        let first_line = output.lines().map(str::trim).find(|l| !l.is_empty());
        match first_line {
            Some("unsat") => Ok(true),
            Some("sat") => Ok(false),
            Some("unknown") => Err(SolverError::Unknown),
            Some(other) => Err(SolverError::SolverGaveInvalidOutput(other.to_owned())),
            None => Err(SolverError::SolverGaveInvalidOutput(String::new())),
        }
    }
}
