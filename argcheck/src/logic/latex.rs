use super::{
    ast::{Connective, Formula, Quantifier},
    smtlib::quantifier_prefix,
};

fn render(formula: &Formula) -> String {
    match formula {
        Formula::Atom(name) => name.clone(),
        Formula::App(predicate, args) => format!("{}({})", predicate, args.join(",")),
        Formula::Equals(a, b) => format!("{} = {}", a, b),
        Formula::Not(inner) => format!("\\lnot {}", render(inner)),
        Formula::Binary(c, left, right) => {
            let op = match c {
                Connective::And => "\\land",
                Connective::Or => "\\lor",
                Connective::Implies => "\\rightarrow",
                Connective::Iff => "\\leftrightarrow",
            };
            let mut operands = Vec::new();
            if matches!(c, Connective::And | Connective::Or) {
                collect(formula, *c, &mut operands);
            } else {
                operands.extend([left.as_ref(), right.as_ref()]);
            }
            let rendered: Vec<_> = operands.into_iter().map(render).collect();
            format!("({})", rendered.join(&format!(" {} ", op)))
        }
        Formula::Quantified(q, _, _) => {
            let (vars, body) = quantifier_prefix(formula);
            let keyword = match q {
                Quantifier::Forall => "\\forall",
                Quantifier::Exists => "\\exists",
            };
            let prefix: Vec<_> = vars.iter().map(|v| format!("{} {}", keyword, v)).collect();
            format!("{}: {}", prefix.join(" "), render(body))
        }
    }
}

fn collect<'a>(formula: &'a Formula, connective: Connective, acc: &mut Vec<&'a Formula>) {
    match formula {
        Formula::Binary(c, left, right) if *c == connective => {
            collect(left, connective, acc);
            collect(right, connective, acc);
        }
        other => acc.push(other),
    }
}

/// Returns `true` if the outermost parentheses of `s` enclose the whole string.
fn has_enclosing_parens(s: &str) -> bool {
    if !(s.starts_with('(') && s.ends_with(')')) || s.len() < 2 {
        return false;
    }
    let mut depth = 0i32;
    for c in s[1..s.len() - 1].chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => (),
        }
        if depth < 0 {
            return false;
        }
    }
    true
}

/// Renders a formula as a LaTeX math expression.
pub fn render_latex(formula: &Formula) -> String {
    let mut rendered = render(formula);
    while has_enclosing_parens(&rendered) {
        rendered = rendered[1..rendered.len() - 1].to_owned();
    }
    rendered
        .replace(": \\exists", " \\exists")
        .replace(": \\forall", " \\forall")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse_formula;

    fn latex(input: &str) -> String {
        render_latex(&parse_formula(input).unwrap())
    }

    #[test]
    fn test_render_latex() {
        assert_eq!(latex("p & q & r"), "p \\land q \\land r");
        assert_eq!(latex("-(p | q) -> r"), "\\lnot (p \\lor q) \\rightarrow r");
        assert_eq!(latex("(p) & (q)"), "p \\land q");
        assert_eq!(latex("(p & q) | (r & s)"), "(p \\land q) \\lor (r \\land s)");
        assert_eq!(
            latex("all x.(M(x) -> Mo(x))"),
            "\\forall x: (M(x) \\rightarrow Mo(x))"
        );
        assert_eq!(latex("all x.exists y.R(x,y)"), "\\forall x \\exists y: R(x,y)");
        assert_eq!(latex("a = b <-> p"), "a = b \\leftrightarrow p");
    }
}
