//! Lowering of formulas into SMT-LIB programs.

use super::{
    ast::{Connective, Formula, Quantifier, Signature, SymbolKind},
    error::SignatureError,
    Declarations,
};
use std::fmt::Write;

/// The uninterpreted sort that all individuals belong to.
pub const UNIVERSAL_SORT: &str = "Universal";

fn flatten<'a>(formula: &'a Formula, connective: Connective, acc: &mut Vec<&'a Formula>) {
    match formula {
        Formula::Binary(c, left, right) if *c == connective => {
            flatten(left, connective, acc);
            flatten(right, connective, acc);
        }
        other => acc.push(other),
    }
}

/// Collects a chain of directly nested quantifiers of the same kind.
pub(crate) fn quantifier_prefix(formula: &Formula) -> (Vec<&str>, &Formula) {
    let mut vars = Vec::new();
    let mut current = formula;
    let Formula::Quantified(kind, _, _) = formula else {
        return (vars, formula);
    };
    while let Formula::Quantified(q, var, body) = current {
        if q != kind {
            break;
        }
        vars.push(var.as_str());
        current = body;
    }
    (vars, current)
}

/// Renders a formula as an SMT-LIB term.
pub fn render_smt(formula: &Formula) -> String {
    match formula {
        Formula::Atom(name) => name.clone(),
        Formula::App(predicate, args) => format!("({} {})", predicate, args.join(" ")),
        Formula::Equals(a, b) => format!("(= {} {})", a, b),
        Formula::Not(inner) => format!("(not {})", render_smt(inner)),
        Formula::Binary(c @ (Connective::And | Connective::Or), _, _) => {
            let mut operands = Vec::new();
            flatten(formula, *c, &mut operands);
            let op = if *c == Connective::And { "and" } else { "or" };
            let rendered: Vec<_> = operands.into_iter().map(render_smt).collect();
            format!("({} {})", op, rendered.join(" "))
        }
        Formula::Binary(Connective::Implies, left, right) => {
            format!("(=> {} {})", render_smt(left), render_smt(right))
        }
        Formula::Binary(Connective::Iff, left, right) => {
            format!("(= {} {})", render_smt(left), render_smt(right))
        }
        Formula::Quantified(q, _, _) => {
            let (vars, body) = quantifier_prefix(formula);
            let binders: Vec<_> = vars
                .iter()
                .map(|v| format!("({} {})", v, UNIVERSAL_SORT))
                .collect();
            let keyword = match q {
                Quantifier::Forall => "forall",
                Quantifier::Exists => "exists",
            };
            format!("({} ({}) {})", keyword, binders.join(" "), render_smt(body))
        }
    }
}

/// Turns a proposition label into a valid SMT-LIB simple symbol suffix. Alphanumerics are kept,
/// `_` becomes `__` and any other character becomes `_{hex}_`, so distinct labels never share a
/// symbol.
pub fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => out.push(c),
            '_' => out.push_str("__"),
            c => {
                let _ = write!(out, "_{:x}_", u32::from(c));
            }
        }
    }
    out
}

/// Declares the universal sort and every symbol in the signature: propositions first, then
/// individuals, then predicates.
pub fn preamble(signature: &Signature, declarations: &Declarations) -> String {
    let mut out = String::new();
    let mut line = |decl: String, name: &str| {
        out.push_str(&decl);
        if let Some(gloss) = declarations.get(name) {
            let _ = write!(out, " ;; {}", gloss.replace('\n', " "));
        }
        out.push('\n');
    };
    line(format!("(declare-sort {})", UNIVERSAL_SORT), "");
    for name in signature.of_kind(|k| k == SymbolKind::Proposition) {
        line(format!("(declare-fun {} () Bool)", name), name);
    }
    for name in signature.of_kind(|k| k == SymbolKind::Individual) {
        line(format!("(declare-const {} {})", name, UNIVERSAL_SORT), name);
    }
    for (name, kind) in signature.iter() {
        if let SymbolKind::Predicate(arity) = kind {
            let sorts = vec![UNIVERSAL_SORT; arity].join(" ");
            line(format!("(declare-fun {} ({}) Bool)", name, sorts), name);
        }
    }
    out
}

fn conjunction_of(names: &[String]) -> String {
    if names.is_empty() {
        "true".to_owned()
    } else {
        format!("(and {})", names.join(" "))
    }
}

/// Builds a program whose single `check-sat` answers `unsat` exactly when the premises entail the
/// conclusion.
pub fn global_program(
    premises: &[(&str, &Formula)],
    conclusion: (&str, &Formula),
    declarations: &Declarations,
) -> Result<String, SignatureError> {
    let formulas = premises.iter().map(|(_, f)| *f).chain([conclusion.1]);
    let signature = Signature::of_all(formulas)?;

    let mut out = preamble(&signature, declarations);
    let mut premise_names = Vec::new();
    for (label, formula) in premises {
        let name = format!("premise{}", sanitize_label(label));
        let _ = writeln!(out, "(define-fun {} () Bool {})", name, render_smt(formula));
        premise_names.push(name);
    }
    let conclusion_name = format!("conclusion{}", sanitize_label(conclusion.0));
    let _ = writeln!(
        out,
        "(define-fun {} () Bool {})",
        conclusion_name,
        render_smt(conclusion.1)
    );
    let _ = writeln!(
        out,
        "(define-fun argument () Bool (=> {} {}))",
        conjunction_of(&premise_names),
        conclusion_name
    );
    out.push_str("(assert (not argument))\n(check-sat)\n");
    Ok(out)
}

/// A single inference step: a conclusion label and the labels it is inferred from.
pub type InferenceStep<'a> = (&'a str, Vec<&'a str>);

/// Builds a program that checks every inference step in its own `push`/`pop` scope.
pub fn local_program(
    premises: &[(&str, &Formula)],
    conclusions: &[(&str, &Formula)],
    steps: &[InferenceStep],
    declarations: &Declarations,
) -> Result<String, SignatureError> {
    let formulas = premises.iter().chain(conclusions).map(|(_, f)| *f);
    let signature = Signature::of_all(formulas)?;

    let mut out = preamble(&signature, declarations);
    for (label, formula) in premises {
        let _ = writeln!(
            out,
            "(define-fun premise{} () Bool {})",
            sanitize_label(label),
            render_smt(formula)
        );
    }
    for (label, formula) in conclusions {
        let _ = writeln!(
            out,
            "(define-fun conclusion{} () Bool {})",
            sanitize_label(label),
            render_smt(formula)
        );
    }
    for (conclusion, from) in steps {
        let local: Vec<String> = from
            .iter()
            .map(|r| {
                if premises.iter().any(|(l, _)| l == r) {
                    format!("premise{}", sanitize_label(r))
                } else {
                    format!("conclusion{}", sanitize_label(r))
                }
            })
            .collect();
        let c = sanitize_label(conclusion);
        out.push_str("(push)\n");
        let _ = writeln!(
            out,
            "(define-fun subargument{c} () Bool (=> {} conclusion{c}))",
            conjunction_of(&local)
        );
        let _ = writeln!(out, "(assert (not subargument{c}))");
        let _ = writeln!(
            out,
            "(echo \"Check validity of inference to conclusion ({}):\")",
            conclusion
        );
        out.push_str("(check-sat)\n(pop)\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse_formula;

    fn smt(input: &str) -> String {
        render_smt(&parse_formula(input).unwrap())
    }

    #[test]
    fn test_render_smt() {
        assert_eq!(smt("p"), "p");
        assert_eq!(smt("-F(a,b)"), "(not (F a b))");
        assert_eq!(smt("p & q & (r & s)"), "(and p q r s)");
        assert_eq!(smt("p | q & r"), "(or p (and q r))");
        assert_eq!(smt("p -> q"), "(=> p q)");
        assert_eq!(smt("p <-> q"), "(= p q)");
        assert_eq!(smt("a = b"), "(= a b)");
        assert_eq!(
            smt("all x y.R(x,y)"),
            "(forall ((x Universal) (y Universal)) (R x y))"
        );
        assert_eq!(
            smt("exists x.all y.R(x,y)"),
            "(exists ((x Universal)) (forall ((y Universal)) (R x y)))"
        );
    }

    #[test]
    fn test_global_program() {
        let premise1 = parse_formula("all x.(M(x) -> Mo(x))").unwrap();
        let premise2 = parse_formula("M(s)").unwrap();
        let conclusion = parse_formula("Mo(s)").unwrap();
        let mut declarations = Declarations::new();
        declarations.insert("s".into(), "Socrates".into());
        declarations.insert("M".into(), "being a man".into());

        let program = global_program(
            &[("1", &premise1), ("2", &premise2)],
            ("3", &conclusion),
            &declarations,
        )
        .unwrap();
        let expected = "\
(declare-sort Universal)
(declare-const s Universal) ;; Socrates
(declare-fun M (Universal) Bool) ;; being a man
(declare-fun Mo (Universal) Bool)
(define-fun premise1 () Bool (forall ((x Universal)) (=> (M x) (Mo x))))
(define-fun premise2 () Bool (M s))
(define-fun conclusion3 () Bool (Mo s))
(define-fun argument () Bool (=> (and premise1 premise2) conclusion3))
(assert (not argument))
(check-sat)
";
        assert_eq!(program, expected);
    }

    #[test]
    fn test_local_program_scopes() {
        let p = parse_formula("p").unwrap();
        let pq = parse_formula("p -> q").unwrap();
        let q = parse_formula("q").unwrap();
        let program = local_program(
            &[("1", &p), ("2", &pq)],
            &[("3", &q)],
            &[("3", vec!["1", "2"])],
            &Declarations::new(),
        )
        .unwrap();
        assert!(program.contains(
            "(push)\n(define-fun subargument3 () Bool (=> (and premise1 premise2) conclusion3))\n\
            (assert (not subargument3))\n\
            (echo \"Check validity of inference to conclusion (3):\")\n(check-sat)\n(pop)\n"
        ));
    }

    #[test]
    fn test_labels_stay_distinct() {
        assert_eq!(sanitize_label("12"), "12");
        assert_eq!(sanitize_label("1.1"), "1_2e_1");
        assert_eq!(sanitize_label("1_1"), "1__1");
        assert_eq!(sanitize_label("Ä"), "_c4_");

        let p = parse_formula("p").unwrap();
        let q = parse_formula("q").unwrap();
        let program = global_program(
            &[("1.1", &p), ("1_1", &q)],
            ("1-1", &p),
            &Declarations::new(),
        )
        .unwrap();
        assert!(program.contains("(define-fun premise1_2e_1 () Bool p)\n"));
        assert!(program.contains("(define-fun premise1__1 () Bool q)\n"));
        assert!(program.contains("(define-fun conclusion1_2d_1 () Bool p)\n"));
        assert!(program.contains("(=> (and premise1_2e_1 premise1__1) conclusion1_2d_1)"));
    }

    #[test]
    fn test_inconsistent_arity() {
        let a = parse_formula("F(a)").unwrap();
        let b = parse_formula("F(a,b)").unwrap();
        let err = global_program(&[("1", &a)], ("2", &b), &Declarations::new()).unwrap_err();
        assert!(matches!(err, SignatureError::InconsistentArity { symbol, .. } if symbol == "F"));
    }
}
