//! Checks of logical reconstructions: well-formed formalizations, deductive validity, premise
//! relevance and consistency, and formally grounded dialectical relations.

use super::{Context, Report, StructuralCheck};
use crate::{
    logic::{check_validity, parse_formula, smtlib, Declarations, Formula, Solver},
    processing::argdown::{ArgdownGraph, Argument, DialecticalType, InlineValue, Valence},
    request::{Artifact, DataType, ResultDetails, VerificationData, VerificationRequest},
    ArgcheckResult,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Parsed formalizations, keyed by proposition label.
type Expressions = IndexMap<String, Arc<Formula>>;

type Labeled<'a> = (&'a str, Arc<Formula>);

pub const WELL_FORMED_FORMULAS_ID: &str = "LogReco.WellFormedFormulasHandler";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogrecoCheck {
    WellFormedFormulas,
    GlobalDeductiveValidity,
    LocalDeductiveValidity,
    AllPremisesRelevant,
    PremisesConsistent,
    FormallyGroundedRelations,
}

impl LogrecoCheck {
    pub const ALL: [LogrecoCheck; 6] = [
        LogrecoCheck::WellFormedFormulas,
        LogrecoCheck::GlobalDeductiveValidity,
        LogrecoCheck::LocalDeductiveValidity,
        LogrecoCheck::AllPremisesRelevant,
        LogrecoCheck::PremisesConsistent,
        LogrecoCheck::FormallyGroundedRelations,
    ];
}

/// The formalizations recorded by the most recent well-formedness check of `data`. Returns
/// `None` if there are no expressions or no declarations.
fn cached_formalizations<'r>(
    data: &VerificationData,
    request: &'r VerificationRequest,
) -> Option<(&'r Expressions, &'r Declarations)> {
    let result = request
        .results()
        .iter()
        .rev()
        .find(|r| r.verifier_id == WELL_FORMED_FORMULAS_ID && r.data_refs.contains(&data.id))?;
    let ResultDetails::Formalizations { expressions, declarations } = result.details.as_ref()?;
    (!expressions.is_empty() && !declarations.is_empty()).then_some((expressions, declarations))
}

fn is_blank(value: &InlineValue) -> bool {
    match value {
        InlineValue::Text(s) => s.is_empty(),
        InlineValue::List(items) => items.is_empty(),
        InlineValue::Map(m) => m.is_empty(),
        InlineValue::Other(v) => v.is_null() || v.as_bool() == Some(false),
    }
}

fn well_formed_formulas(graph: &ArgdownGraph, ctx: &Context) -> Report {
    let (formalization_key, declarations_key) =
        (ctx.config.formalization_key.as_str(), ctx.config.declarations_key.as_str());
    let mut expressions = Expressions::new();
    let mut all_declarations = Declarations::new();
    let mut messages = Vec::new();

    for argument in &graph.arguments {
        let arg = argument.display_label();
        for item in &argument.pcs {
            let Some(proposition) = graph.proposition(&item.proposition_label) else { continue };
            let data = &proposition.data;
            if data.is_empty() {
                messages.push(format!(
                    "Proposition ({}) in argument {} lacks inline yaml data with formalization info.",
                    item.label, arg
                ));
                continue;
            }

            let formalization = data.get(formalization_key);
            if formalization.is_none() {
                messages.push(format!(
                    "Inline yaml of proposition ({}) in argument {} lacks {} key.",
                    item.label, arg, formalization_key
                ));
            }

            let declarations = match data.get(declarations_key) {
                Some(value) if is_blank(value) => None,
                Some(InlineValue::Map(_)) => data.declarations(declarations_key),
                Some(_) => {
                    messages.push(format!(
                        "'{}' of proposition ({}) in argument {} is not a dict.",
                        declarations_key, item.label, arg
                    ));
                    None
                }
                None => None,
            };
            for (symbol, gloss) in declarations.iter().flatten() {
                match all_declarations.get(symbol) {
                    Some(previous) if previous != gloss => messages.push(format!(
                        "Duplicate declaration: Variable '{}' in the inline yaml of proposition ({}) \
                         in argument {} has been declared before and is inconsistent with the \
                         previous declaration '{}'.",
                        symbol, item.label, arg, previous
                    )),
                    Some(_) => (),
                    None => {
                        all_declarations.insert(symbol.clone(), gloss.clone());
                    }
                }
            }

            let Some(formalization) = formalization.filter(|v| !is_blank(v)) else { continue };
            let Some(formalization) = formalization.scalar_string() else {
                messages.push(format!(
                    "Formalization of proposition ({}) in argument {} is not a string.",
                    item.label, arg
                ));
                continue;
            };
            match parse_formula(&formalization) {
                Ok(expression) => {
                    let symbols = expression.symbols();
                    for symbol in declarations.iter().flat_map(|d| d.keys()) {
                        if !symbols.contains(symbol.as_str()) {
                            messages.push(format!(
                                "Variable '{}' declared with proposition ({}) in argument {} is not \
                                 used in the corresponding formalization '{}'.",
                                symbol, item.label, arg, formalization
                            ));
                        }
                    }
                    expressions.insert(item.proposition_label.clone(), expression);
                }
                Err(e) => messages.push(format!(
                    "Formalization {} of proposition ({}) in argument {} is not a well-formed \
                     first-order logic formula. Parser error: {}",
                    formalization, item.label, arg, e
                )),
            }
        }
    }

    for (label, expression) in &expressions {
        for symbol in expression.symbols() {
            if !all_declarations.contains_key(symbol) {
                messages.push(format!(
                    "Variable '{}' in formalization '{}' of proposition [{}] is not declared anywhere.",
                    symbol, expression, label
                ));
            }
        }
    }

    Report::new(messages)
        .with_artifact("all_expressions", Artifact::Expressions(expressions.clone()))
        .with_artifact("all_declarations", Artifact::Declarations(all_declarations.clone()))
        .with_details(ResultDetails::Formalizations { expressions, declarations: all_declarations })
}

/// The formalized premises of `argument`, labeled by their pcs labels.
fn formalized_premises<'a>(argument: &'a Argument, expressions: &Expressions) -> Vec<Labeled<'a>> {
    argument
        .premises()
        .filter_map(|p| {
            let formula = expressions.get(&p.proposition_label)?;
            Some((p.label.as_str(), formula.clone()))
        })
        .collect()
}

fn formalized_conclusion<'a>(
    argument: &'a Argument,
    expressions: &Expressions,
) -> Option<Labeled<'a>> {
    let conclusion = argument.final_conclusion()?;
    let formula = expressions.get(&conclusion.proposition_label)?;
    Some((conclusion.label.as_str(), formula.clone()))
}

fn negation(formula: &Formula) -> Arc<Formula> {
    Arc::new(Formula::not(formula.clone()))
}

/// Holds what every validity-based check needs.
struct Analysis<'a> {
    graph: &'a ArgdownGraph,
    expressions: &'a Expressions,
    declarations: &'a Declarations,
    solver: Arc<dyn Solver>,
    from_key: &'a str,
}

impl Analysis<'_> {
    fn check(&self, premises: &[Labeled], conclusion: Labeled) -> ArgcheckResult<(bool, String)> {
        let solver = self.solver.as_ref();
        let verdict = check_validity(solver, premises, conclusion, self.declarations)?;
        Ok((verdict.valid, verdict.program))
    }

    fn reconstructed(&self) -> impl Iterator<Item = &Argument> {
        self.graph.arguments.iter().filter(|a| !a.pcs.is_empty())
    }

    fn global_validity(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for argument in self.reconstructed() {
            let arg = argument.display_label();
            let premises = formalized_premises(argument, self.expressions);
            let conclusion = formalized_conclusion(argument, self.expressions);
            let Some(conclusion) = conclusion.filter(|_| !premises.is_empty()) else {
                messages.push(format!(
                    "In {}: Failed to evaluate global deductive validity due to missing or flawed \
                     formalizations.",
                    arg
                ));
                continue;
            };
            match self.check(&premises, conclusion) {
                Ok((true, _)) => (),
                Ok((false, program)) => messages.push(format!(
                    "In {}: According to the provided formalizations, the argument is not \
                     deductively valid. SMT2LIB program used to check validity:\n {}\n",
                    arg, program
                )),
                Err(e) => messages.push(format!(
                    "In {}: Failed to evaluate global deductive validity with SMT2LIB/z3: {}.",
                    arg, e
                )),
            }
        }
        messages
    }

    fn local_validity(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for argument in self.reconstructed() {
            let arg = argument.display_label();
            for conclusion in argument.pcs.iter().filter(|item| item.is_conclusion()) {
                let from = conclusion
                    .inference_data()
                    .and_then(|d| d.from_list(self.from_key))
                    .unwrap_or_default();

                // Formalized items the conclusion is inferred from, split by their role
                let (mut premises, mut conclusions) = (Vec::new(), Vec::new());
                for label in &from {
                    let Some(item) = argument.pcs.iter().find(|p| &p.label == label) else {
                        continue;
                    };
                    if let Some(formula) = self.expressions.get(&item.proposition_label) {
                        let entry = (item.label.as_str(), formula.clone());
                        if item.is_conclusion() {
                            conclusions.push(entry);
                        } else {
                            premises.push(entry);
                        }
                    }
                }
                let target = self
                    .expressions
                    .get(&conclusion.proposition_label)
                    .map(|f| (conclusion.label.as_str(), f.clone()));
                let has_sources = !premises.is_empty() || !conclusions.is_empty();
                let Some(target) = target.filter(|_| has_sources) else {
                    messages.push(format!(
                        "In {}: Failed to evaluate deductive validity of sub-inference to ({}) due \
                         to missing or flawed formalizations / inference info.",
                        arg, conclusion.label
                    ));
                    continue;
                };

                let sources: Vec<_> = premises.iter().chain(&conclusions).cloned().collect();
                match self.check(&sources, target.clone()) {
                    Ok((true, _)) => (),
                    Ok((false, program)) => {
                        let program =
                            local_program(&premises, &conclusions, &target, self.declarations)
                                .unwrap_or(program);
                        messages.push(format!(
                            "In {}: According to the provided formalizations and inference info, the \
                             sub-inference to conclusion ({}) is not deductively valid. SMT2LIB \
                             program used to check validity of this subargument:\n {}\n",
                            arg, conclusion.label, program
                        ));
                    }
                    Err(e) => messages.push(format!(
                        "In {}: Failed to evaluate deductive validity of sub-inference to ({}) with \
                         SMT2LIB/z3: {}.",
                        arg, conclusion.label, e
                    )),
                }
            }
        }
        messages
    }

    fn premise_relevance(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for argument in self.reconstructed() {
            let arg = argument.display_label();
            let premises = formalized_premises(argument, self.expressions);
            let conclusion = formalized_conclusion(argument, self.expressions);
            let Some(conclusion) = conclusion.filter(|_| !premises.is_empty()) else {
                messages.push(format!(
                    "In {}: Failed to evaluate logical relevance of premises due to missing or \
                     flawed formalizations.",
                    arg
                ));
                continue;
            };
            if premises.len() == 1 {
                continue;
            }
            for (i, (label, _)) in premises.iter().enumerate() {
                let mut subset = premises.clone();
                subset.remove(i);
                match self.check(&subset, conclusion.clone()) {
                    Ok((false, _)) => (),
                    Ok((true, program)) => messages.push(format!(
                        "In {}: According to the provided formalizations, premise ({}) is not \
                         required to logically infer the final conclusion. SMT2LIB program used to \
                         check validity:\n {}\n",
                        arg, label, program
                    )),
                    Err(e) => messages.push(format!(
                        "In {}: Failed to evaluate relevance of premise ({}) with SMT2LIB/z3: {}.",
                        arg, label, e
                    )),
                }
            }
        }
        messages
    }

    fn premise_consistency(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for argument in self.reconstructed() {
            let arg = argument.display_label();
            let premises = formalized_premises(argument, self.expressions);
            let Some((first, formula)) = premises.first() else { continue };

            // Inconsistent premises entail anything, including the negation of one of them
            let label = format!("{}_neg", first);
            match self.check(&premises, (label.as_str(), negation(formula))) {
                Ok((false, _)) => (),
                Ok((true, _)) => messages.push(format!(
                    "In {}: According to the provided formalizations, the argument's premises are \
                     NOT logically consistent.",
                    arg
                )),
                Err(e) => messages.push(format!(
                    "In {}: Failed to evaluate premises' consistency with SMT2LIB/z3: {}.",
                    arg, e
                )),
            }
        }
        messages
    }

    fn grounded_relations(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for relation in &self.graph.relations {
            if !relation.dialectics.contains(&DialecticalType::Axiomatic) {
                continue;
            }
            let (Some(source), Some(target)) = (
                self.expressions.get(&relation.source),
                self.expressions.get(&relation.target),
            ) else {
                continue;
            };
            let (s, t) = (&relation.source, &relation.target);
            let premise = [("1", source.clone())];
            match relation.valence {
                Valence::Support => match self.check(&premise, ("2", target.clone())) {
                    Ok((true, _)) => (),
                    Ok((false, program)) => messages.push(format!(
                        "According to the provided formalizations, proposition '{}' does not \
                         entail the supported proposition '{}'. (SMTLIB program used to check \
                         entailment:\n {})",
                        s, t, program
                    )),
                    Err(e) => {
                        let e = format!("Failed to check support relation {} -> {}: {}", s, t, e);
                        messages.push(e);
                    }
                },
                Valence::Attack => match self.check(&premise, ("2", negation(target))) {
                    Ok((true, _)) => (),
                    Ok((false, program)) => messages.push(format!(
                        "According to the provided formalizations, proposition '{}' does not \
                         entail the negation of the attacked proposition '{}'. (SMTLIB program \
                         used to check contradiction:\n {})",
                        s, t, program
                    )),
                    Err(e) => {
                        let e = format!("Failed to check attack relation {} -> {}: {}", s, t, e);
                        messages.push(e);
                    }
                },
                Valence::Contradict => {
                    let forward = self.check(&[("1", source.clone())], ("2", negation(target)));
                    let backward = self.check(&[("1", target.clone())], ("2", negation(source)));
                    match (forward, backward) {
                        (Ok((true, _)), Ok((true, _))) => (),
                        (Ok((_, first)), Ok((_, second))) => messages.push(format!(
                            "According to the provided formalizations, proposition '{}' is not the \
                             negation of the proposition '{}', despite both being declared as \
                             contradictory. (SMTLIB programs used to check contradiction:\n{}\n-----\n{})",
                            s, t, first, second
                        )),
                        (Err(e), _) | (_, Err(e)) => messages.push(format!(
                            "Failed to check contradiction relation {} <-> {}: {}",
                            s, t, e
                        )),
                    }
                }
            }
        }
        messages
    }
}

/// Renders a sub-inference in the scoped form used for local validity.
fn local_program(
    premises: &[Labeled],
    conclusions: &[Labeled],
    target: &Labeled,
    declarations: &Declarations,
) -> Option<String> {
    let premises: Vec<_> = premises.iter().map(|(l, f)| (*l, f.as_ref())).collect();
    let mut conclusions: Vec<_> = conclusions.iter().map(|(l, f)| (*l, f.as_ref())).collect();
    let from: Vec<&str> = premises.iter().chain(&conclusions).map(|(l, _)| *l).collect();
    conclusions.push((target.0, target.1.as_ref()));
    let step = (target.0, from);
    smtlib::local_program(&premises, &conclusions, &[step], declarations).ok()
}

impl StructuralCheck for LogrecoCheck {
    const SUITE: &'static str = "LogReco";
    const DTYPE: DataType = DataType::Argdown;

    fn name(&self) -> &'static str {
        match self {
            LogrecoCheck::WellFormedFormulas => "WellFormedFormulas",
            LogrecoCheck::GlobalDeductiveValidity => "GlobalDeductiveValidity",
            LogrecoCheck::LocalDeductiveValidity => "LocalDeductiveValidity",
            LogrecoCheck::AllPremisesRelevant => "AllPremisesRelevant",
            LogrecoCheck::PremisesConsistent => "PremisesConsistent",
            LogrecoCheck::FormallyGroundedRelations => "FormallyGroundedRelations",
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            LogrecoCheck::WellFormedFormulas => " - ",
            _ => " ",
        }
    }

    fn evaluate(&self, data: &VerificationData, ctx: &Context) -> ArgcheckResult<Option<Report>> {
        let graph = ctx.graph(data)?;
        if let LogrecoCheck::WellFormedFormulas = self {
            return Ok(Some(well_formed_formulas(graph, ctx)));
        }
        if let LogrecoCheck::FormallyGroundedRelations = self {
            if graph.relations.is_empty() {
                return Ok(Some(Report::pass()));
            }
        }

        let Some((expressions, declarations)) = cached_formalizations(data, ctx.request) else {
            log::debug!("{}: no formalizations to check", ctx.name);
            return Ok(None);
        };
        let analysis = Analysis {
            graph,
            expressions,
            declarations,
            solver: ctx.config.solver.build(),
            from_key: &ctx.config.from_key,
        };
        let messages = match self {
            LogrecoCheck::WellFormedFormulas => Vec::new(),
            LogrecoCheck::GlobalDeductiveValidity => analysis.global_validity(),
            LogrecoCheck::LocalDeductiveValidity => analysis.local_validity(),
            LogrecoCheck::AllPremisesRelevant => analysis.premise_relevance(),
            LogrecoCheck::PremisesConsistent => analysis.premise_consistency(),
            LogrecoCheck::FormallyGroundedRelations => analysis.grounded_relations(),
        };
        Ok(Some(Report::new(messages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        handlers::Handler,
        logic::SolverConfig,
        request::{DataFilter, VerificationResult},
        VerifierConfig,
    };

    fn verify(argdown: &str) -> VerificationRequest {
        let inputs = format!("```argdown\n{}\n```\n", argdown);
        let config = Arc::new(VerifierConfig::default().solver(SolverConfig::bounded()));
        let request = Handler::processing().process(VerificationRequest::new(inputs, None));
        Handler::logreco(&config, DataFilter::Any).process(request)
    }

    fn result<'a>(request: &'a VerificationRequest, check: &str) -> Option<&'a VerificationResult> {
        request.last_result_of(&format!("LogReco.{}Handler", check))
    }

    fn message<'a>(request: &'a VerificationRequest, check: &str) -> Option<&'a str> {
        result(request, check).and_then(|r| r.message.as_deref())
    }

    const SOCRATES: &str = "<Socrates>: Socrates is mortal.\n\n\
        (1) All men are mortal. {formalization: 'all x.(M(x)->Mo(x))', declarations: {M: 'being a man', Mo: 'being mortal'}}\n\
        (2) Socrates is a man. {formalization: 'M(s)', declarations: {s: 'Socrates'}}\n\
        -- {from: [1,2]} --\n\
        (3) Socrates is mortal. {formalization: 'Mo(s)', declarations: {}}";

    #[test]
    fn test_valid_argument() {
        let request = verify(SOCRATES);
        assert!(request.is_valid(), "{:?}", request.results());
        for check in LogrecoCheck::ALL {
            assert!(result(&request, check.name()).is_some(), "{} did not run", check.name());
        }

        let details = result(&request, "WellFormedFormulas").unwrap().details.as_ref().unwrap();
        let ResultDetails::Formalizations { expressions, declarations } = details;
        assert_eq!(expressions.len(), 3);
        assert_eq!(declarations.keys().collect::<Vec<_>>(), ["M", "Mo", "s"]);
        assert!(request.artifacts().contains_key("all_expressions"));
    }

    #[test]
    fn test_undeclared_symbol() {
        let argdown = SOCRATES.replace(", Mo: 'being mortal'", "");
        let request = verify(&argdown);
        let message = message(&request, "WellFormedFormulas").unwrap();
        assert!(message.contains("Variable 'Mo' in formalization"), "{}", message);
        assert!(message.contains("is not declared anywhere."));
        assert!(result(&request, "GlobalDeductiveValidity").unwrap().is_valid);
    }

    #[test]
    fn test_flawed_formalizations() {
        let request = verify(
            "<A>: Gist.\n\n<A>\n\n\
             (1) P. {formalization: 'p &', declarations: {p: 'it rains'}}\n\
             (2) Q. {declarations: 'q'}\n\
             -- {from: [1, 2]} --\n\
             (3) C.",
        );
        let message = message(&request, "WellFormedFormulas").unwrap();
        let parts: Vec<_> = message.split(" - ").collect();
        assert!(parts[0].starts_with("Formalization p & of proposition (1) in argument <A> is not a well-formed first-order logic formula. Parser error: Invalid formula: p &."));
        assert_eq!(parts[1], "Inline yaml of proposition (2) in argument <A> lacks formalization key.");
        assert_eq!(parts[2], "'declarations' of proposition (2) in argument <A> is not a dict.");
        assert_eq!(parts[3], "Proposition (3) in argument <A> lacks inline yaml data with formalization info.");

        // Nothing parsed, so the downstream checks have nothing to work on
        assert!(result(&request, "GlobalDeductiveValidity").is_none());
        assert!(result(&request, "PremisesConsistent").is_none());
    }

    #[test]
    fn test_irrelevant_premise() {
        let request = verify(
            "<A>: Gist.\n\n<A>\n\n\
             (1) P. {formalization: 'p', declarations: {p: 'it rains'}}\n\
             (2) If P, then Q. {formalization: 'p -> q', declarations: {q: 'it is wet'}}\n\
             (3) R. {formalization: 'r', declarations: {r: 'it is late'}}\n\
             -- {from: [1, 2, 3]} --\n\
             (4) Q. {formalization: 'q'}",
        );
        assert!(result(&request, "GlobalDeductiveValidity").unwrap().is_valid);
        let message = message(&request, "AllPremisesRelevant").unwrap();
        assert!(message.starts_with(
            "In <A>: According to the provided formalizations, premise (3) is not required to \
             logically infer the final conclusion."
        ));
        assert!(!message.contains("premise (1)"));
        assert!(!message.contains("premise (2)"));
    }

    #[test]
    fn test_invalid_and_inconsistent() {
        let request = verify(
            "<A>: Gist.\n\n<A>\n\n\
             (1) P. {formalization: 'p', declarations: {p: 'it rains'}}\n\
             (2) Not P. {formalization: '-p'}\n\
             -- {from: [1]} --\n\
             (3) Q. {formalization: 'q', declarations: {q: 'it is wet'}}",
        );
        // Globally valid by explosion, but the single step from (1) is not
        assert!(result(&request, "GlobalDeductiveValidity").unwrap().is_valid);
        let local = message(&request, "LocalDeductiveValidity").unwrap();
        assert!(local.starts_with(
            "In <A>: According to the provided formalizations and inference info, the sub-inference \
             to conclusion (3) is not deductively valid."
        ));
        assert!(local.contains("(push)"));
        assert_eq!(
            message(&request, "PremisesConsistent"),
            Some("In <A>: According to the provided formalizations, the argument's premises are NOT logically consistent.")
        );
    }

    #[test]
    fn test_single_premise_is_relevant() {
        let request = verify(
            "<A>: Gist.\n\n<A>\n\n\
             (1) P. {formalization: 'p & q', declarations: {p: 'it rains', q: 'it is wet'}}\n\
             -- {from: [1]} --\n\
             (2) Q. {formalization: 'q'}",
        );
        assert!(result(&request, "AllPremisesRelevant").unwrap().is_valid);
    }

    #[test]
    fn test_formally_grounded_relations() {
        let request = verify(
            "[P]: P. {formalization: 'p', declarations: {p: 'it rains'}}\n    \
             +> [Q]: Q. {formalization: 'q', declarations: {q: 'it is wet'}}\n\n\
             <A>: Gist.\n\n<A>\n\n\
             (1) [P]\n\
             -- {from: [1]} --\n\
             (2) [Q]",
        );
        let message = message(&request, "FormallyGroundedRelations").unwrap();
        assert!(message.starts_with(
            "According to the provided formalizations, proposition 'P' does not entail the \
             supported proposition 'Q'."
        ));
    }
}
