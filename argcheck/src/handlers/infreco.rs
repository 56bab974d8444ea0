//! Structural checks of informal argument reconstructions, i.e. premise-conclusion structures.

use super::{Context, Report, StructuralCheck};
use crate::{
    processing::argdown::{ArgdownGraph, Argument, DialecticalType, InlineValue},
    request::{DataType, VerificationData},
    utils::duplicates,
    ArgcheckResult,
};
use ahash::AHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfrecoCheck {
    HasArguments,
    HasUniqueArgument,
    HasAtLeastNArguments,
    HasPCS,
    StartsWithPremise,
    EndsWithConclusion,
    NotMultipleGists,
    NoDuplicatePCSLabels,
    HasLabel,
    HasGist,
    HasInferenceData,
    PropRefsExist,
    UsesAllProps,
    NoExtraPropositions,
    OnlyGroundedDialecticalRelations,
    NoPropInlineData,
    NoArgInlineData,
}

impl InfrecoCheck {
    /// The checks of a single informal reconstruction.
    pub const INFORMAL_SUITE: [InfrecoCheck; 16] = [
        InfrecoCheck::HasArguments,
        InfrecoCheck::HasUniqueArgument,
        InfrecoCheck::HasPCS,
        InfrecoCheck::StartsWithPremise,
        InfrecoCheck::EndsWithConclusion,
        InfrecoCheck::NotMultipleGists,
        InfrecoCheck::NoDuplicatePCSLabels,
        InfrecoCheck::HasLabel,
        InfrecoCheck::HasGist,
        InfrecoCheck::HasInferenceData,
        InfrecoCheck::PropRefsExist,
        InfrecoCheck::UsesAllProps,
        InfrecoCheck::NoExtraPropositions,
        InfrecoCheck::OnlyGroundedDialecticalRelations,
        InfrecoCheck::NoPropInlineData,
        InfrecoCheck::NoArgInlineData,
    ];

    /// The structural checks that precede logical analysis. Propositions carry their
    /// formalizations as inline data, and axiomatic relations between them are allowed.
    pub const LOGRECO_SUITE: [InfrecoCheck; 13] = [
        InfrecoCheck::HasArguments,
        InfrecoCheck::HasUniqueArgument,
        InfrecoCheck::HasPCS,
        InfrecoCheck::StartsWithPremise,
        InfrecoCheck::EndsWithConclusion,
        InfrecoCheck::NotMultipleGists,
        InfrecoCheck::NoDuplicatePCSLabels,
        InfrecoCheck::HasLabel,
        InfrecoCheck::HasGist,
        InfrecoCheck::HasInferenceData,
        InfrecoCheck::PropRefsExist,
        InfrecoCheck::UsesAllProps,
        InfrecoCheck::NoArgInlineData,
    ];

    /// The checks of reconstructions that are compared against another artifact. Propositions may
    /// carry annotation references, and several arguments may be reconstructed.
    pub const COHERENCE_SUITE: [InfrecoCheck; 9] = [
        InfrecoCheck::HasArguments,
        InfrecoCheck::HasPCS,
        InfrecoCheck::StartsWithPremise,
        InfrecoCheck::EndsWithConclusion,
        InfrecoCheck::NoDuplicatePCSLabels,
        InfrecoCheck::HasLabel,
        InfrecoCheck::HasInferenceData,
        InfrecoCheck::PropRefsExist,
        InfrecoCheck::UsesAllProps,
    ];

    /// The checks of logical reconstructions of a whole map.
    pub const MAP_COHERENCE_SUITE: [InfrecoCheck; 10] = [
        InfrecoCheck::HasAtLeastNArguments,
        InfrecoCheck::HasPCS,
        InfrecoCheck::StartsWithPremise,
        InfrecoCheck::EndsWithConclusion,
        InfrecoCheck::NoDuplicatePCSLabels,
        InfrecoCheck::HasLabel,
        InfrecoCheck::HasInferenceData,
        InfrecoCheck::PropRefsExist,
        InfrecoCheck::UsesAllProps,
        InfrecoCheck::NoExtraPropositions,
    ];
}

/// `<label>` for labeled arguments and `Argument #n` otherwise.
fn numbered_label(index: usize, argument: &Argument) -> String {
    if argument.unlabeled {
        format!("Argument #{}", index + 1)
    } else {
        argument.display_label()
    }
}

/// Reports the arguments failing `predicate` under a common heading.
fn list_arguments<F, L>(graph: &ArgdownGraph, heading: &str, label: L, predicate: F) -> Report
where
    F: Fn(&Argument) -> bool,
    L: Fn(usize, &Argument) -> String,
{
    let invalid: Vec<_> = graph
        .arguments
        .iter()
        .enumerate()
        .filter(|(_, a)| predicate(a))
        .map(|(i, a)| label(i, a))
        .collect();
    if invalid.is_empty() {
        Report::pass()
    } else {
        Report::fail(format!("{}: {}", heading, invalid.join(", ")))
    }
}

fn display_label(_: usize, argument: &Argument) -> String {
    argument.display_label()
}

fn inference_data_messages(graph: &ArgdownGraph, from_key: &str) -> Vec<String> {
    let mut messages = Vec::new();
    for argument in &graph.arguments {
        let arg = argument.display_label();
        for item in &argument.pcs {
            let Some(data) = item.inference_data() else { continue };
            let prefix = format!("In {}: Inference to conclusion {}", arg, item.label);
            let problem = match data.get(from_key) {
                _ if data.is_empty() => Some("lacks yaml inference information.".to_owned()),
                None => Some(format!("inference information lacks '{}' key.", from_key)),
                Some(InlineValue::List(items)) if items.is_empty() => {
                    Some(format!("inference information '{}' value is empty.", from_key))
                }
                Some(InlineValue::List(_)) => None,
                Some(_) => Some(format!("inference information '{}' value is not a list.", from_key)),
            };
            if let Some(problem) = problem {
                messages.push(format!("{} {}", prefix, problem));
            }
        }
    }
    messages
}

fn prop_refs_messages(graph: &ArgdownGraph, from_key: &str) -> Vec<String> {
    let mut messages = Vec::new();
    for argument in &graph.arguments {
        for (i, item) in argument.pcs.iter().enumerate() {
            let Some(from) = item.inference_data().and_then(|d| d.from_list(from_key)) else {
                continue;
            };
            for reference in from {
                if !argument.pcs[..i].iter().any(|p| p.label == reference) {
                    messages.push(format!(
                        "In {}: Item '{}' in inference information of conclusion {} does not \
                         refer to a previously introduced premise or conclusion.",
                        argument.display_label(),
                        reference,
                        item.label
                    ));
                }
            }
        }
    }
    messages
}

fn unused_props_messages(graph: &ArgdownGraph, from_key: &str) -> Vec<String> {
    let mut messages = Vec::new();
    for argument in &graph.arguments {
        let Some((_, init)) = argument.pcs.split_last() else { continue };
        let used: AHashSet<String> = argument
            .pcs
            .iter()
            .filter_map(|item| item.inference_data().and_then(|d| d.from_list(from_key)))
            .flatten()
            .collect();
        let unused: Vec<_> = init
            .iter()
            .filter(|p| !used.contains(&p.label))
            .map(|p| format!("({})", p.label))
            .collect();
        if !unused.is_empty() {
            messages.push(format!(
                "In {}: Some propositions are not explicitly used in any inferences: {}.",
                argument.display_label(),
                unused.join(", ")
            ));
        }
    }
    messages
}

impl StructuralCheck for InfrecoCheck {
    const SUITE: &'static str = "InfReco";
    const DTYPE: DataType = DataType::Argdown;

    fn name(&self) -> &'static str {
        use InfrecoCheck::*;

        match self {
            HasArguments => "HasArguments",
            HasUniqueArgument => "HasUniqueArgument",
            HasAtLeastNArguments => "HasAtLeastNArguments",
            HasPCS => "HasPCS",
            StartsWithPremise => "StartsWithPremise",
            EndsWithConclusion => "EndsWithConclusion",
            NotMultipleGists => "NotMultipleGists",
            NoDuplicatePCSLabels => "NoDuplicatePCSLabels",
            HasLabel => "HasLabel",
            HasGist => "HasGist",
            HasInferenceData => "HasInferenceData",
            PropRefsExist => "PropRefsExist",
            UsesAllProps => "UsesAllProps",
            NoExtraPropositions => "NoExtraPropositions",
            OnlyGroundedDialecticalRelations => "OnlyGroundedDialecticalRelations",
            NoPropInlineData => "NoPropInlineData",
            NoArgInlineData => "NoArgInlineData",
        }
    }

    fn evaluate(&self, data: &VerificationData, ctx: &Context) -> ArgcheckResult<Option<Report>> {
        use InfrecoCheck::*;

        let graph = ctx.graph(data)?;
        let from_key = ctx.config.from_key.as_str();
        let fail_if = |condition: bool, message: &str| {
            if condition {
                Report::fail(message.to_owned())
            } else {
                Report::pass()
            }
        };

        let report = match self {
            HasArguments => fail_if(
                graph.arguments.is_empty(),
                "No arguments found in the argdown data.",
            ),
            HasUniqueArgument => match graph.arguments.len() {
                0 => Report::fail("No arguments found in the argdown data.".to_owned()),
                1 => Report::pass(),
                _ => Report::fail("More than one argument found in the argdown data.".to_owned()),
            },
            HasAtLeastNArguments => {
                let (size, n) = (graph.arguments.len(), ctx.config.min_arguments);
                let message = format!("Not enough arguments (found {}, expected ≥{}).", size, n);
                fail_if(size < n, &message)
            }
            HasPCS => {
                if graph.arguments.is_empty() {
                    return Ok(None);
                }
                list_arguments(
                    graph,
                    "The following arguments lack premise conclusion structure",
                    numbered_label,
                    |a| a.pcs.is_empty(),
                )
            }
            StartsWithPremise => list_arguments(
                graph,
                "The following arguments do not start with a premise",
                display_label,
                |a| a.pcs.first().is_some_and(|item| item.is_conclusion()),
            ),
            EndsWithConclusion => list_arguments(
                graph,
                "The following arguments do not end with a conclusion",
                display_label,
                |a| a.pcs.last().is_some_and(|item| !item.is_conclusion()),
            ),
            NotMultipleGists => list_arguments(
                graph,
                "The following arguments have alternative gists (and are declared multiple times)",
                display_label,
                |a| a.gists.len() > 1,
            ),
            NoDuplicatePCSLabels => {
                let mut invalid = Vec::new();
                for argument in &graph.arguments {
                    let repeated = duplicates(argument.pcs.iter().map(|p| p.label.as_str()));
                    if !repeated.is_empty() {
                        let repeated: Vec<_> =
                            repeated.iter().map(|l| format!("({})", l)).collect();
                        invalid.push(format!(
                            "{} (duplicates: {})",
                            argument.display_label(),
                            repeated.join(", ")
                        ));
                    }
                }
                fail_if(
                    !invalid.is_empty(),
                    &format!(
                        "The following arguments have duplicate premise/conclusion labels: {}",
                        invalid.join(", ")
                    ),
                )
            }
            HasLabel => list_arguments(
                graph,
                "The following arguments lack labels",
                |i, _| format!("Argument #{}", i + 1),
                |a| a.unlabeled,
            ),
            HasGist => list_arguments(
                graph,
                "The following arguments lack gists",
                display_label,
                |a| a.gists.is_empty(),
            ),
            HasInferenceData => Report::new(inference_data_messages(graph, from_key)),
            PropRefsExist => Report::new(prop_refs_messages(graph, from_key)),
            UsesAllProps => Report::new(unused_props_messages(graph, from_key)),
            NoExtraPropositions => {
                let used: AHashSet<&str> = graph
                    .arguments
                    .iter()
                    .flat_map(|a| &a.pcs)
                    .map(|p| p.proposition_label.as_str())
                    .collect();
                let outside: Vec<_> = graph
                    .propositions
                    .iter()
                    .filter(|p| !used.contains(p.label.as_str()))
                    .map(|p| format!("[{}]", p.label))
                    .collect();
                fail_if(
                    !outside.is_empty(),
                    &format!(
                        "Argdown snippet contains propositions not used in any argument: {}.",
                        outside.join(", ")
                    ),
                )
            }
            OnlyGroundedDialecticalRelations => fail_if(
                graph.relations.iter().any(|r| {
                    r.dialectics.iter().any(|&d| d != DialecticalType::Grounded)
                }),
                "Argdown snippet defines dialectical relations.",
            ),
            NoPropInlineData => fail_if(
                graph.propositions.iter().any(|p| !p.data.is_empty()),
                "Some propositions contain yaml inline data.",
            ),
            NoArgInlineData => fail_if(
                graph.arguments.iter().any(|a| !a.data.is_empty()),
                "Some arguments contain yaml inline data.",
            ),
        };
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handlers::Handler, request::DataFilter, VerificationRequest, VerifierConfig};
    use std::sync::Arc;

    fn verify_with(
        argdown: &str,
        config: VerifierConfig,
        kinds: &[InfrecoCheck],
    ) -> VerificationRequest {
        let inputs = format!("```argdown\n{}\n```\n", argdown);
        let request = Handler::processing().process(VerificationRequest::new(inputs, None));
        Handler::infreco_with(&Arc::new(config), DataFilter::Any, kinds).process(request)
    }

    fn verify(argdown: &str) -> VerificationRequest {
        verify_with(argdown, VerifierConfig::default(), &InfrecoCheck::INFORMAL_SUITE)
    }

    fn message<'a>(request: &'a VerificationRequest, check: &str) -> Option<&'a str> {
        let id = format!("InfReco.{}Handler", check);
        request.last_result_of(&id).and_then(|r| r.message.as_deref())
    }

    const VALID: &str = "<Socrates>: Socrates is mortal.\n\n\
                         (1) All men are mortal.\n\
                         (2) Socrates is a man.\n\
                         -- {from: [1, 2]} --\n\
                         (3) Socrates is mortal.";

    #[test]
    fn test_valid_reconstruction() {
        let request = verify(VALID);
        assert!(request.is_valid(), "{:?}", request.results());
        assert_eq!(request.results().len(), InfrecoCheck::INFORMAL_SUITE.len());
        assert_eq!(request.results()[0].verifier_id, "InfReco.HasArgumentsHandler");
    }

    #[test]
    fn test_empty_document() {
        let request = verify("[A]: Just a claim.");
        assert_eq!(message(&request, "HasArguments"), Some("No arguments found in the argdown data."));
        assert!(request.last_result_of("InfReco.HasPCSHandler").is_none());
        assert_eq!(
            message(&request, "NoExtraPropositions"),
            Some("Argdown snippet contains propositions not used in any argument: [A].")
        );
    }

    #[test]
    fn test_structure_defects() {
        let request = verify(
            "(1) P.\n\
             (1) Q.\n\
             -- {uses: [1]} --\n\
             (2) C.\n\
             (3) Dangling premise.",
        );
        assert_eq!(message(&request, "HasLabel"), Some("The following arguments lack labels: Argument #1"));
        assert_eq!(
            message(&request, "EndsWithConclusion"),
            Some("The following arguments do not end with a conclusion: <unlabeled argument>")
        );
        assert_eq!(
            message(&request, "NoDuplicatePCSLabels"),
            Some(
                "The following arguments have duplicate premise/conclusion labels: \
                 <unlabeled argument> (duplicates: (1))"
            )
        );
        assert_eq!(
            message(&request, "HasInferenceData"),
            Some("In <unlabeled argument>: Inference to conclusion 2 inference information lacks 'from' key.")
        );
        assert_eq!(
            message(&request, "HasGist"),
            Some("The following arguments lack gists: <unlabeled argument>")
        );
    }

    #[test]
    fn test_inference_references() {
        let request = verify(
            "<A>: Gist.\n\n<A>\n\n\
             (1) P.\n\
             (2) Q.\n\
             -- {from: [1, 4]} --\n\
             (3) C.",
        );
        assert_eq!(
            message(&request, "PropRefsExist"),
            Some(
                "In <A>: Item '4' in inference information of conclusion 3 does not refer to a \
                 previously introduced premise or conclusion."
            )
        );
        assert_eq!(
            message(&request, "UsesAllProps"),
            Some("In <A>: Some propositions are not explicitly used in any inferences: (2).")
        );
    }

    #[test]
    fn test_inline_data_and_relations() {
        let argdown = "<A>: Gist. {author: me}\n\n<A>\n\n\
                       (1) [P]: P. {formalization: p}\n\
                       -- {from: [1]} --\n\
                       (2) [C]: C.\n\n\
                       [C]\n    >< [P]";
        let request = verify(argdown);
        assert_eq!(message(&request, "NoArgInlineData"), Some("Some arguments contain yaml inline data."));
        assert_eq!(message(&request, "NoPropInlineData"), Some("Some propositions contain yaml inline data."));
        assert_eq!(
            message(&request, "OnlyGroundedDialecticalRelations"),
            Some("Argdown snippet defines dialectical relations.")
        );

        let request = verify_with(argdown, VerifierConfig::default(), &InfrecoCheck::LOGRECO_SUITE);
        assert!(request.last_result_of("InfReco.NoPropInlineDataHandler").is_none());
        assert!(request.last_result_of("InfReco.OnlyGroundedDialecticalRelationsHandler").is_none());
    }

    #[test]
    fn test_at_least_n_arguments() {
        let config = VerifierConfig::default().min_arguments(2);
        let request = verify_with(VALID, config, &[InfrecoCheck::HasAtLeastNArguments]);
        assert_eq!(
            message(&request, "HasAtLeastNArguments"),
            Some("Not enough arguments (found 1, expected ≥2).")
        );
    }
}
