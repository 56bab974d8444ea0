#[test]
fn conditionals() {
    test_cases! {
        definitions = "{p: 'it rains', q: 'the street is wet'}",
        "Valid forms" {
            "p; p -> q ⊢ q": true,
            "-q; p -> q ⊢ -p": true,
            "p -> q ⊢ -q -> -p": true,
            "p <-> q; q ⊢ p": true,
        }
        "Fallacies" {
            "q; p -> q ⊢ p": false,
            "-p; p -> q ⊢ -q": false,
            "p -> q ⊢ q -> p": false,
        }
    }
}

#[test]
fn connectives() {
    test_cases! {
        definitions = "",
        "Conjunction and disjunction" {
            "p & q ⊢ q": true,
            "p ⊢ p | q": true,
            "p | q; -p ⊢ q": true,
            "p | q ⊢ p": false,
            "-(p & q) ⊢ -p | -q": true,
            "-(p | q) ⊢ -p": true,
        }
        "Without premises" {
            "⊢ p | -p": true,
            "⊢ (p -> q) | (q -> p)": true,
            "⊢ p -> q": false,
        }
        "Inconsistent premises" {
            "p; -p ⊢ q": true,
            "p & -p ⊢ r": true,
        }
    }
}
