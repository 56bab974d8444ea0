//! Back-translation of formulas into English sentences.

use super::{
    ast::{Connective, Formula, Quantifier},
    Declarations,
};

struct Translator<'a> {
    declarations: &'a Declarations,
}

impl Translator<'_> {
    fn gloss<'s>(&'s self, symbol: &'s str) -> &'s str {
        self.declarations.get(symbol).map_or(symbol, String::as_str)
    }

    fn translate(&self, formula: &Formula) -> String {
        match formula {
            Formula::Atom(name) => self.gloss(name).to_owned(),
            Formula::App(predicate, args) => match args.as_slice() {
                [x] => format!("{} is {}", self.gloss(x), self.gloss(predicate)),
                [first, rest @ ..] => {
                    let objects: Vec<_> = rest.iter().map(|o| self.gloss(o)).collect();
                    format!(
                        "{} stands in relation {} to {}",
                        self.gloss(first),
                        self.gloss(predicate),
                        objects.join(", ")
                    )
                }
                [] => self.gloss(predicate).to_owned(),
            },
            Formula::Equals(a, b) => {
                format!("{} is identical with {}", self.gloss(a), self.gloss(b))
            }
            Formula::Not(inner) => match inner.as_ref() {
                Formula::App(predicate, args) if args.len() == 1 => {
                    format!("{} is not {}", self.gloss(&args[0]), self.gloss(predicate))
                }
                other => format!("it is false that {}", self.translate(other)),
            },
            Formula::Binary(c @ (Connective::And | Connective::Or), left, right) => {
                let (plain, emphatic, other) = match c {
                    Connective::And => (" and ", " and also ", Connective::Or),
                    _ => (" or ", " or else ", Connective::And),
                };
                let is_other = |f: &Formula| matches!(f, Formula::Binary(k, ..) if *k == other);
                let left_negated = matches!(left.as_ref(), Formula::Not(_));
                let nested = is_other(left.as_ref()) || is_other(right.as_ref());
                let emphasize = (nested || left_negated) && !left.is_negated_unary();
                let junctor = if emphasize { emphatic } else { plain };
                format!("{}{}{}", self.translate(left), junctor, self.translate(right))
            }
            Formula::Binary(Connective::Implies, left, right) => match left.as_ref() {
                Formula::Binary(k @ (Connective::And | Connective::Or), a, b) => {
                    let junctor = if *k == Connective::And { "and" } else { "or" };
                    format!(
                        "if {}, {} if {}, then {}",
                        self.translate(a),
                        junctor,
                        self.translate(b),
                        self.translate(right)
                    )
                }
                _ => format!("if {}, then {}", self.translate(left), self.translate(right)),
            },
            Formula::Binary(Connective::Iff, left, right) => format!(
                "if and only if {}, then {}",
                self.translate(left),
                self.translate(right)
            ),
            Formula::Quantified(Quantifier::Exists, var, body) => format!(
                "there exists a {} such that {}",
                self.gloss(var),
                self.translate(body)
            ),
            Formula::Quantified(Quantifier::Forall, var, body) => format!(
                "for every {} it holds that {}",
                self.gloss(var),
                self.translate(body)
            ),
        }
    }
}

/// Renders a formula as an English sentence, substituting declared glosses for symbols.
/// Undeclared symbols stand for themselves.
pub fn to_natural_language(formula: &Formula, declarations: &Declarations) -> String {
    Translator { declarations }.translate(formula)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse_formula;

    fn nl(input: &str, declarations: &[(&str, &str)]) -> String {
        let declarations = declarations
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        to_natural_language(&parse_formula(input).unwrap(), &declarations)
    }

    #[test]
    fn test_predications() {
        let decls = [("s", "Socrates"), ("M", "a man"), ("L", "loving")];
        assert_eq!(nl("M(s)", &decls), "Socrates is a man");
        assert_eq!(nl("-M(s)", &decls), "Socrates is not a man");
        assert_eq!(nl("L(s,a,b)", &decls), "Socrates stands in relation loving to a, b");
        assert_eq!(
            nl("-L(s,a)", &decls),
            "it is false that Socrates stands in relation loving to a"
        );
        assert_eq!(nl("s = a", &decls), "Socrates is identical with a");
    }

    #[test]
    fn test_junctors() {
        assert_eq!(nl("p & q", &[]), "p and q");
        assert_eq!(nl("(p | q) & r", &[]), "p or q and also r");
        assert_eq!(nl("-F(a) & (p | q)", &[]), "a is not F and p or q");
        assert_eq!(nl("-p | q", &[]), "it is false that p or else q");
        assert_eq!(nl("p | (q & r)", &[]), "p or else q and r");
    }

    #[test]
    fn test_conditionals_and_quantifiers() {
        assert_eq!(nl("p -> q", &[("p", "it rains")]), "if it rains, then q");
        assert_eq!(nl("(p & q) -> r", &[]), "if p, and if q, then r");
        assert_eq!(nl("(p | q) -> r", &[]), "if p, or if q, then r");
        assert_eq!(nl("p <-> q", &[]), "if and only if p, then q");
        assert_eq!(
            nl("all x.(M(x) -> Mo(x))", &[("M", "a man"), ("Mo", "mortal")]),
            "for every x it holds that if x is a man, then x is mortal"
        );
        assert_eq!(nl("exists x.F(x)", &[]), "there exists a x such that x is F");
    }
}
