use argcheck::{logic::SolverConfig, Evaluation, Suite, VerifierConfig};
use colored::Colorize;
use std::{fs, path::Path};

/// Fixtures live at `fixtures/{suite}/{valid|invalid}/{name}.md`.
fn expectation(answer_path: &Path) -> (Suite, bool) {
    let mut dirs = answer_path.ancestors().skip(1).filter_map(|p| p.file_name()?.to_str());
    let expected = match dirs.next() {
        Some("valid") => true,
        Some("invalid") => false,
        other => panic!(
            "fixture \"{}\" is not in a valid/invalid directory: {:?}",
            answer_path.display(),
            other
        ),
    };
    let suite = dirs.next().and_then(|name| name.parse().ok()).unwrap_or_else(|| {
        panic!("fixture \"{}\" is not in a suite directory", answer_path.display())
    });
    (suite, expected)
}

fn render_metrics(evaluation: &Evaluation) -> String {
    evaluation
        .metrics
        .iter()
        .map(|(key, message)| {
            if message.is_empty() {
                format!("  {} {}", "ok".green(), key)
            } else {
                format!("  {} {}: {}", "failed".red().bold(), key, message)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn test_file(answer_path: &str) {
    let answer_path = Path::new(answer_path);
    let (suite, expected) = expectation(answer_path);
    let inputs = fs::read_to_string(answer_path).unwrap();

    // The bounded model finder keeps the fixtures independent of an installed z3
    let config = VerifierConfig::default().solver(SolverConfig::bounded());
    let evaluation = argcheck::verify(suite, &inputs, None, &config);

    if evaluation.is_valid != expected {
        panic!(
            "\n{} \"{}\" under suite {}: expected {}, got {}\n{}\n",
            "fixture".bold(),
            answer_path.display(),
            suite,
            if expected { "valid" } else { "invalid" },
            if evaluation.is_valid { "valid" } else { "invalid" },
            render_metrics(&evaluation),
        );
    }
}

#[test_generator::from_dir("tests/fixtures")]
#[allow(dead_code)]
fn fixture(answer_path: &str) {
    test_file(answer_path)
}
