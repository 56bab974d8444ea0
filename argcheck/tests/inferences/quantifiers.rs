#[test]
fn syllogisms() {
    test_cases! {
        definitions = "{M: 'being a man', Mo: 'being mortal', s: 'Socrates'}",
        "Instantiation" {
            "all x.(M(x) -> Mo(x)); M(s) ⊢ Mo(s)": true,
            "all x.(M(x) -> Mo(x)); Mo(s) ⊢ M(s)": false,
            "all x.M(x) ⊢ exists x.M(x)": true,
            "exists x.M(x) ⊢ M(s)": false,
        }
        "Quantifier duality" {
            "-(all x.M(x)) ⊢ exists x.-M(x)": true,
            "-(exists x.M(x)) ⊢ all x.-M(x)": true,
            "exists x.-M(x) ⊢ -(all x.M(x))": true,
        }
    }
}

#[test]
fn relations() {
    test_cases! {
        definitions = "{R: 'respects'}",
        "Nested quantifiers" {
            "exists x.all y.R(x,y) ⊢ all y.exists x.R(x,y)": true,
            "all y.exists x.R(x,y) ⊢ exists x.all y.R(x,y)": false,
            "all x.all y.(R(x,y) -> R(y,x)); R(a,b) ⊢ R(b,a)": true,
        }
        "Identity" {
            "a = b; F(a) ⊢ F(b)": true,
            "F(a) ⊢ F(b)": false,
            "⊢ a = a": true,
            "a = b ⊢ b = a": true,
        }
    }
}
