use argcheck::{logic::SolverConfig, Evaluation, Suite, VerifierConfig};

fn run_test(suite: Suite, inputs: &str) -> Evaluation {
    let config = VerifierConfig::default().solver(SolverConfig::bounded());
    argcheck::verify(suite, inputs, None, &config)
}

/// The message of the first metric whose key names `verifier`.
fn metric<'a>(evaluation: &'a Evaluation, verifier: &str) -> &'a str {
    evaluation
        .metrics
        .iter()
        .find(|(key, _)| key.ends_with(verifier))
        .map(|(_, message)| message.as_str())
        .unwrap_or_else(|| panic!("no metric for {}: {:?}", verifier, evaluation.metrics))
}

fn argdown(snippet: &str) -> String {
    format!("```argdown\n{}\n```\n", snippet)
}

const SOCRATES: &str = "<Socrates>: Socrates is mortal.\n\n\
    (1) All men are mortal. {formalization: 'all x.(M(x)->Mo(x))', declarations: {M: 'being a man', Mo: 'being mortal'}}\n\
    (2) Socrates is a man. {formalization: 'M(s)', declarations: {s: 'Socrates'}}\n\
    -- {from: [1,2]} --\n\
    (3) Socrates is mortal. {formalization: 'Mo(s)', declarations: {}}";

#[test]
fn test_undefined_support_reference() {
    let evaluation = run_test(
        Suite::Arganno,
        "```xml\n<proposition id=\"1\">A</proposition>\
         <proposition id=\"2\" supports=\"3\">B</proposition>\n```",
    );
    assert!(!evaluation.is_valid);
    let message = metric(&evaluation, "Arganno.SupportReferenceValidityHandler");
    assert!(message.starts_with("Supported proposition with id '3'"), "{}", message);
    assert!(message.ends_with("does not exist."));
    assert_eq!(metric(&evaluation, "Arganno.AttackReferenceValidityHandler"), "");
}

#[test]
fn test_missing_annotation_ids() {
    let evaluation = run_test(
        Suite::ArgannoArgmap,
        "```xml\n<proposition id=\"x\" argument_label=\"A1\">p</proposition>\n```\n\n\
         ```argdown\n[A1]: p. {annotation_ids: [\"x\"]}\n[A2]: q.\n```\n",
    );
    assert!(!evaluation.is_valid);
    assert_eq!(
        metric(&evaluation, "ArgannoArgmapElemCohereHandler"),
        "Missing 'annotation_ids' attribute of node with label 'A2'."
    );
}

#[test]
fn test_valid_formalization() {
    let evaluation = run_test(Suite::Logreco, &argdown(SOCRATES));
    assert!(evaluation.is_valid, "{:?}", evaluation.metrics);
    for dimension in ["invalid_inference", "redundant_premises", "flawed_formalizations"] {
        assert_eq!(evaluation.metrics[dimension], "");
    }

    let expressions = evaluation.artifacts.all_expressions.as_ref().unwrap();
    assert_eq!(expressions.len(), 3);
    let declarations = evaluation.artifacts.all_declarations.as_ref().unwrap();
    assert_eq!(declarations["Mo"], "being mortal");
}

#[test]
fn test_undeclared_symbol() {
    let snippet = SOCRATES.replace(", Mo: 'being mortal'", "");
    let evaluation = run_test(Suite::Logreco, &argdown(&snippet));
    assert!(!evaluation.is_valid);
    let message = &evaluation.metrics["flawed_formalizations"];
    assert!(message.contains("Variable 'Mo' in formalization"), "{}", message);
    assert!(message.contains("is not declared anywhere."));
    assert_eq!(evaluation.metrics["invalid_inference"], "");
}

#[test]
fn test_unused_premise() {
    let evaluation = run_test(
        Suite::Logreco,
        &argdown(
            "<A>: Gist.\n\n\
             (1) P. {formalization: 'p', declarations: {p: 'it rains'}}\n\
             (2) If P, then Q. {formalization: 'p -> q', declarations: {q: 'it is wet'}}\n\
             (3) R. {formalization: 'r', declarations: {r: 'it is late'}}\n\
             -- {from: [1, 2, 3]} --\n\
             (4) Q. {formalization: 'q'}",
        ),
    );
    assert!(!evaluation.is_valid);
    assert_eq!(evaluation.metrics["invalid_inference"], "");
    let message = &evaluation.metrics["redundant_premises"];
    assert!(message.contains("premise (3) is not required"), "{}", message);
    assert!(!message.contains("premise (1)"));
}

#[test]
fn test_broken_snippets_are_reported_once() {
    let evaluation = run_test(Suite::Infreco, &argdown("[A]: a {x: 1"));
    assert!(!evaluation.is_valid);
    let parser = metric(&evaluation, "ArgdownParser");
    assert!(parser.starts_with("Failed to parse argdown code snippet: "), "{}", parser);

    // No structural check has a parsed graph to work on
    assert_eq!(evaluation.metrics["illformed_argument"], "");
    assert_eq!(evaluation.metrics.keys().filter(|k| k.contains("ArgdownParser")).count(), 1);
}

#[test]
fn test_apostrophes_in_plain_inline_data() {
    let evaluation = run_test(
        Suite::Argmap,
        &argdown("[A]: Cats purr. {note: it's fine}\n    <+ [B]: Dogs bark."),
    );
    assert!(evaluation.is_valid, "{:?}", evaluation.metrics);
    assert!(!evaluation.metrics.keys().any(|k| k.contains("ArgdownParser")));
}

#[test]
fn test_argmap_logreco_round_trip() {
    let reco = "<A>: Cats purr, so they are content.\n\n\
        (1) [P]: Cats purr. {formalization: 'p', declarations: {p: 'cats purr'}}\n\
        (2) [Q]: If cats purr, they are content. {formalization: 'p -> c', declarations: {c: 'cats are content'}}\n\
        -- {from: [1, 2]} --\n\
        (3) [C]: Cats are content. {formalization: 'c'}\n\n\
        <B>: Content cats stay home.\n\n\
        (1) [C]: Cats are content.\n\
        (2) [R]: Content cats stay home. {formalization: 'c -> h', declarations: {h: 'cats stay home'}}\n\
        -- {from: [1, 2]} --\n\
        (3) [H]: Cats stay home. {formalization: 'h'}";
    let map = "[H]: Cats stay home.\n    \
        <+ <B>: Content cats stay home.\n        \
        <+ <A>: Cats purr, so they are content.";
    let inputs = format!(
        "```argdown {{filename=\"map.ad\"}}\n{}\n```\n\n\
         ```argdown {{filename=\"reconstructions.ad\"}}\n{}\n```\n",
        map, reco
    );

    let evaluation = run_test(Suite::ArgmapLogreco, &inputs);
    assert!(evaluation.is_valid, "{:?}", evaluation.metrics);
    assert_eq!(metric(&evaluation, "ArgmapInfrecoElemCohereHandler"), "");
    assert_eq!(metric(&evaluation, "ArgmapInfrecoRelationCohereHandler"), "");
    assert_eq!(metric(&evaluation, "ArgmapLogrecoRelationCohereHandler"), "");
    assert!(evaluation.artifacts.argdown_map.is_some());
    assert!(evaluation.artifacts.argdown_reco.is_some());

    // Turning the sketched support into an attack leaves the elements coherent
    let broken = inputs.replace("<+ <A>", "<- <A>");
    let evaluation = run_test(Suite::ArgmapLogreco, &broken);
    assert!(!evaluation.is_valid);
    assert_eq!(metric(&evaluation, "ArgmapInfrecoElemCohereHandler"), "");
    let message = metric(&evaluation, "ArgmapLogrecoRelationCohereHandler");
    assert!(
        message.contains("Dialectical ATTACK relation from node 'A' to node 'B'"),
        "{}",
        message
    );
}

#[test]
fn test_missing_reconstruction_block_is_named() {
    let inputs = "```argdown {filename=\"map.ad\"}\n[H]: Cats stay home.\n```\n";
    let evaluation = run_test(Suite::ArgmapLogreco, inputs);
    assert!(!evaluation.is_valid);
    assert_eq!(metric(&evaluation, "HasArgdownHandler.map"), "");
    assert!(metric(&evaluation, "HasArgdownHandler.reco")
        .ends_with("Found 1 fenced code blocks, but none matches the required metadata filter."));
}

#[test]
fn test_evaluation_serializes_to_yaml() {
    let evaluation = run_test(Suite::Logreco, &argdown(SOCRATES));
    let yaml = serde_yaml::to_string(&evaluation).unwrap();
    assert!(yaml.starts_with("is_valid: true\n"), "{}", yaml);
    assert!(yaml.contains("illformed_argument: ''"));
    assert!(yaml.contains("Mo: being mortal"));
}
