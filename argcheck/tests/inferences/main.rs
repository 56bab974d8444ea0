use argcheck::logic::{check_validity, parse_formula, Declarations, SolverConfig};
use colored::{Color, Colorize};

/// Each case is an inference written as `premise; premise ⊢ conclusion`.
fn run_tests(test_name: &str, definitions: &str, cases: &[(&str, bool)]) {
    let declarations: Declarations = if definitions.trim().is_empty() {
        Declarations::new()
    } else {
        serde_yaml::from_str(definitions)
            .unwrap_or_else(|e| panic!("bad definitions in test \"{}\": {}", test_name, e))
    };
    let solver = SolverConfig::bounded().build();

    for (i, (inference, expected)) in cases.iter().enumerate() {
        let (premises, conclusion) = inference
            .split_once('⊢')
            .unwrap_or_else(|| panic!("case {} of test \"{}\" has no turnstile", i, test_name));
        let parse = |text: &str| {
            parse_formula(text.trim())
                .unwrap_or_else(|e| panic!("parser error during test \"{}\": {}", test_name, e))
        };
        let premises: Vec<_> = premises
            .split(';')
            .filter(|p| !p.trim().is_empty())
            .map(&parse)
            .collect();
        let labels: Vec<_> = (1..=premises.len()).map(|i| i.to_string()).collect();
        let labeled: Vec<_> = labels.iter().map(String::as_str).zip(premises).collect();

        let conclusion = ("c", parse(conclusion));
        let result = check_validity(solver.as_ref(), &labeled, conclusion, &declarations);

        // Extract the program or error message, if any
        let (got, outcome) = match result {
            Ok(verdict) if verdict.valid => (true, String::new()),
            Ok(verdict) => (false, verdict.program),
            Err(e) => (false, e.to_string()),
        };

        if *expected == got {
            println!("{} \"{}\"", "PASSED".bold().color(Color::Green), test_name);
        } else {
            let (color, expectation) = if *expected {
                (Color::Red, "expected to be VALID but was INVALID".red())
            } else {
                (Color::Yellow, "expected to be INVALID but was VALID".yellow())
            };

            panic!(
                "{}\nTest '{}' case {}: {}\nINFERENCE: {}\nOUTCOME: {}",
                "TEST FAILURE".bold().color(color),
                test_name.bold(),
                i.to_string().bold(),
                expectation,
                inference,
                outcome
            );
        }
    }
}

macro_rules! test_cases {
    (
        definitions = $defs:expr,
        $($name:literal { $($inference:literal: $exp:literal,)* } )*
    ) => {{
        let definitions: &str = $defs;
        $({
            let name: &str = $name;
            let cases = [ $(($inference, $exp),)* ];
            $crate::run_tests(name, definitions, &cases);
        })*
    }};
}

mod propositional;
mod quantifiers;
