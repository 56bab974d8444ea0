use argcheck::logic::{
    ast::{Connective, Quantifier},
    check_validity, parse_formula, render_latex, render_smt, Declarations, Formula, SolverConfig,
};
use proptest::prelude::*;
use std::sync::Arc;

fn name(options: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::sample::select(options).prop_map(str::to_owned)
}

fn atomic() -> impl Strategy<Value = Formula> {
    let term = || name(&["a", "b", "x", "y"]);
    prop_oneof![
        name(&["p", "q", "r"]).prop_map(Formula::Atom),
        (name(&["F", "G"]), prop::collection::vec(term(), 1..3))
            .prop_map(|(predicate, args)| Formula::App(predicate, args)),
        (term(), term()).prop_map(|(a, b)| Formula::Equals(a, b)),
    ]
}

fn formula() -> impl Strategy<Value = Formula> {
    use Connective::*;

    let connective = prop::sample::select(vec![And, Or, Implies, Iff]);
    let quantifier = prop::sample::select(vec![Quantifier::Forall, Quantifier::Exists]);
    atomic().prop_recursive(4, 24, 2, move |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (connective.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, left, right)| Formula::binary(c, left, right)),
            (quantifier.clone(), name(&["x", "y"]), inner)
                .prop_map(|(q, var, body)| Formula::Quantified(q, var, Box::new(body))),
        ]
    })
}

/// Formulas over a fixed signature: three propositions and one unary predicate.
fn small_formula() -> impl Strategy<Value = Formula> {
    use Connective::*;

    let unary = |arg: &str| Formula::App("F".to_owned(), vec![arg.to_owned()]);
    let leaf = prop_oneof![
        name(&["p", "q", "r"]).prop_map(Formula::Atom),
        name(&["a", "b"]).prop_map(move |c| unary(&c)),
        Just(Formula::Quantified(Quantifier::Exists, "x".to_owned(), Box::new(unary("x")))),
    ];
    let connective = prop::sample::select(vec![And, Or, Implies, Iff]);
    leaf.prop_recursive(3, 12, 2, move |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (connective.clone(), inner.clone(), inner)
                .prop_map(|(c, left, right)| Formula::binary(c, left, right)),
        ]
    })
}

proptest! {
    #[test]
    fn test_printed_formulas_parse_back(f in formula()) {
        let printed = f.to_string();
        let parsed = parse_formula(&printed).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed.as_ref(), &f);
    }

    #[test]
    fn test_renderings_are_total(f in formula()) {
        let smt = render_smt(&f);
        prop_assert_eq!(smt.matches('(').count(), smt.matches(')').count());
        prop_assert!(!render_latex(&f).is_empty());
    }

    #[test]
    fn test_validity_is_monotonic(
        premise in small_formula(),
        extra in small_formula(),
        conclusion in small_formula(),
    ) {
        let solver = SolverConfig::bounded().build();
        let check = |premises: &[(&str, Arc<Formula>)], conclusion: &Formula| {
            let conclusion = ("c", Arc::new(conclusion.clone()));
            check_validity(solver.as_ref(), premises, conclusion, &Declarations::new())
                .map(|verdict| verdict.valid)
                .map_err(|e| TestCaseError::fail(e.to_string()))
        };
        let (premise, extra) = (Arc::new(premise), Arc::new(extra));

        // Every formula follows from itself
        prop_assert!(check(&[("1", premise.clone())], premise.as_ref())?);

        if check(&[("1", premise.clone())], &conclusion)? {
            prop_assert!(check(&[("1", premise), ("2", extra)], &conclusion)?);
        }
    }
}

#[test]
fn test_operator_spellings() {
    let canonical = parse_formula("(p & q) -> (r | -p)").unwrap();
    for spelling in ["(p ^ q) => (r | !p)", "p & q -> r | -p"] {
        assert_eq!(parse_formula(spelling).unwrap(), canonical, "{}", spelling);
    }
}
