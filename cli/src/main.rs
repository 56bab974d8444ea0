mod error;
mod logger;
mod path_args;

use ansi_term::Color;
use argcheck::{
    logic::{self, Declarations, SolverConfig},
    Evaluation, Suite, VerifierConfig,
};
use clap::{AppSettings, ArgEnum, Args, Parser, Subcommand};
use const_format::{formatcp, str_index};
use crossbeam_queue::SegQueue;
use error::{CliError, CliResult};
use git_version::git_version;
use path_args::answer_files_from_paths;
use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::Path,
    thread,
};

// `git describe --all` also finds release tags like `argcheck-0.1.0`, which we exclude so that
// the branch name is reported.
const GIT_BRANCH_NAME: &str = git_version!(
    args = ["--all", "--exclude", "argcheck-*"],
    fallback = "heads/none",
);
const GIT_COMMIT_HASH: &str = git_version!(fallback = "unknown");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const VERSION_STRING: &str = formatcp!(
    "{} [git {} {}]",
    APP_VERSION,
    // Drop the "heads/" part of "heads/main"
    str_index!(GIT_BRANCH_NAME, 6..),
    GIT_COMMIT_HASH,
);

#[derive(Parser)]
#[clap(
    name = "argcheck",
    version = VERSION_STRING,
    setting = AppSettings::DeriveDisplayOrder
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Sets the maximum logging level.
    #[clap(arg_enum, global = true, long = "log", default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Disables output coloring.
    #[clap(global = true, long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Verifies an answer against a task suite and prints the evaluation.
    Check(CheckCommandOptions),

    /// Parses a first-order formula and prints its renderings.
    ParseFormula(ParseFormulaCommandOptions),

    /// Verifies every answer file found under the given paths.
    Batch(BatchCommandOptions),
}

#[derive(Args)]
struct VerifierOptions {
    /// The task suite to verify against.
    #[clap(long, possible_values = Suite::ALL.map(Suite::name))]
    suite: Suite,

    /// A YAML file with verifier configuration. Missing fields take their default values.
    #[clap(long)]
    config: Option<String>,

    /// Overrides the solver backend of the configuration.
    #[clap(arg_enum, long)]
    solver: Option<SolverKind>,
}

#[derive(Args)]
struct CheckCommandOptions {
    /// The answer file to verify, or `-` to read it from stdin.
    answer_file: String,

    /// The source text the annotation must reproduce.
    #[clap(long)]
    source: Option<String>,

    #[clap(flatten)]
    verifier: VerifierOptions,

    #[clap(arg_enum, long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct ParseFormulaCommandOptions {
    formula: String,

    /// Prints the SMT-LIB rendering.
    #[clap(long)]
    smt: bool,

    /// Prints the LaTeX rendering.
    #[clap(long)]
    latex: bool,

    /// Prints the natural-language rendering.
    #[clap(long)]
    nl: bool,

    /// Glosses for the symbols of the formula, as a YAML mapping. Used by `--nl`.
    #[clap(long, requires = "nl")]
    declarations: Option<String>,
}

#[derive(Args)]
struct BatchCommandOptions {
    #[clap(flatten)]
    verifier: VerifierOptions,

    /// Number of answers to verify simultaneously.
    #[clap(short = 'j', long, default_value_t = 1)]
    num_jobs: usize,

    /// The answer files to verify. Directories are searched recursively for `.md` and `.txt`
    /// files.
    #[clap(required = true)]
    paths: Vec<String>,
}

#[derive(ArgEnum, Clone)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
        }
    }
}

#[derive(ArgEnum, Clone, Copy)]
enum SolverKind {
    Z3,
    Bounded,
}

#[derive(ArgEnum, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Yaml,
}

fn main() {
    let cli = Cli::parse();
    let colors_enabled = !cli.no_color && io::stderr().is_terminal();

    if let Err(e) = logger::init(cli.log_level.into(), colors_enabled) {
        eprintln!("couldn't set up logger: {}", e);
    }

    let colors_enabled = !cli.no_color && io::stdout().is_terminal();
    let result = match cli.command {
        Command::Check(options) => check_command(options, colors_enabled),
        Command::ParseFormula(options) => parse_formula_command(options).map(|()| true),
        Command::Batch(options) => batch_command(options),
    };
    match result {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    }
}

fn read_file(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|e| CliError::UnreadableFile(path.to_owned(), e))
}

fn build_config(options: &VerifierOptions) -> CliResult<VerifierConfig> {
    let config = match &options.config {
        Some(path) => VerifierConfig::from_yaml(&read_file(Path::new(path))?)?,
        None => VerifierConfig::default(),
    };
    Ok(match options.solver {
        Some(SolverKind::Z3) => config.solver(SolverConfig::default()),
        Some(SolverKind::Bounded) => config.solver(SolverConfig::bounded()),
        None => config,
    })
}

fn print_evaluation(evaluation: &Evaluation, colors_enabled: bool) {
    let paint = |color: Color, text: &str| {
        if colors_enabled {
            color.bold().paint(text).to_string()
        } else {
            text.to_owned()
        }
    };
    for (key, message) in &evaluation.metrics {
        if message.is_empty() {
            println!("{} {}", paint(Color::Green, "ok"), key);
        } else {
            println!("{} {}: {}", paint(Color::Red, "failed"), key, message);
        }
    }
    if evaluation.is_valid {
        println!("{}", paint(Color::Green, "valid"));
    } else {
        println!("{}", paint(Color::Red, "invalid"));
    }
}

fn check_command(options: CheckCommandOptions, colors_enabled: bool) -> CliResult<bool> {
    let inputs = match options.answer_file.as_str() {
        "-" => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
        path => read_file(Path::new(path))?,
    };
    let source = options.source.as_deref().map(|p| read_file(Path::new(p))).transpose()?;
    let config = build_config(&options.verifier)?;

    let evaluation = argcheck::verify(options.verifier.suite, &inputs, source.as_deref(), &config);
    match options.format {
        OutputFormat::Text => print_evaluation(&evaluation, colors_enabled),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&evaluation)?),
    }
    Ok(evaluation.is_valid)
}

fn parse_formula_command(options: ParseFormulaCommandOptions) -> CliResult<()> {
    let formula = logic::parse_formula(&options.formula).map_err(argcheck::Error::from)?;
    let declarations: Declarations = match &options.declarations {
        Some(yaml) => serde_yaml::from_str(yaml)
            .map_err(|e| CliError::InvalidArgument(format!("declarations: {}", e)))?,
        None => Declarations::new(),
    };

    let all = !(options.smt || options.latex || options.nl);
    println!("{}", formula);
    if all || options.smt {
        println!("smt: {}", logic::render_smt(&formula));
    }
    if all || options.latex {
        println!("latex: {}", logic::render_latex(&formula));
    }
    if all || options.nl {
        println!("nl: {}", logic::to_natural_language(&formula, &declarations));
    }
    Ok(())
}

/// Verifies one answer file. Read failures are reported, but do not stop the batch.
fn run_job(path: &Path, suite: Suite, config: &VerifierConfig) -> CliResult<bool> {
    let inputs = read_file(path)?;
    let evaluation = argcheck::verify(suite, &inputs, None, config);
    log::info!("{}: {} metrics", path.display(), evaluation.metrics.len());
    Ok(evaluation.is_valid)
}

fn batch_command(options: BatchCommandOptions) -> CliResult<bool> {
    if options.num_jobs == 0 {
        return Err(CliError::InvalidArgument("the number of jobs can't be 0".to_owned()));
    }
    let files = answer_files_from_paths(options.paths.iter().map(String::as_str))?;
    if files.is_empty() {
        return Err(CliError::NoAnswerFiles(options.paths));
    }
    let config = build_config(&options.verifier)?;
    let suite = options.verifier.suite;
    log::info!("verifying {} files against suite {}", files.len(), suite);

    let jobs = SegQueue::new();
    for (i, path) in files.iter().enumerate() {
        jobs.push((i, path));
    }

    let mut results: Vec<(usize, CliResult<bool>)> = thread::scope(|s| {
        let (jobs, config) = (&jobs, &config);

        // Spawn every worker before joining any of them
        #[allow(clippy::needless_collect)]
        let workers: Vec<_> = (0..options.num_jobs)
            .map(|_| {
                s.spawn(move || {
                    let mut done = Vec::new();
                    while let Some((i, path)) = jobs.pop() {
                        done.push((i, run_job(path, suite, config)));
                    }
                    done
                })
            })
            .collect();

        workers
            .into_iter()
            .flat_map(|w| {
                w.join().unwrap_or_else(|_| {
                    log::error!("a worker thread panicked");
                    Vec::new()
                })
            })
            .collect()
    });
    results.sort_by_key(|(i, _)| *i);

    let (mut valid, mut invalid, mut errors) = (0, 0, 0);
    for (i, result) in results {
        let path = &files[i];
        match result {
            Ok(true) => {
                valid += 1;
                println!("{}: valid", path.display());
            }
            Ok(false) => {
                invalid += 1;
                println!("{}: invalid", path.display());
            }
            Err(e) => {
                errors += 1;
                log::error!("{}", e);
                println!("{}: error", path.display());
            }
        }
    }
    println!("{} valid, {} invalid, {} errors", valid, invalid, errors);
    Ok(invalid == 0 && errors == 0)
}
