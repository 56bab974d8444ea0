//! Checks that a raw answer contains fenced code blocks at all.

use super::Check;
use crate::{
    processing::fenced::code_marker,
    request::{DataType, VerificationRequest, VerificationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCheck {
    HasAnnotations,
    HasArgdown,
}

/// Whether some "```" is followed by a line break or the end of the input.
fn has_closing_fence(inputs: &str) -> bool {
    inputs
        .match_indices("```")
        .any(|(i, _)| matches!(inputs[i + 3..].chars().next(), None | Some('\n' | '\r')))
}

impl ContentCheck {
    pub fn name(self) -> &'static str {
        match self {
            ContentCheck::HasAnnotations => "HasAnnotationsHandler",
            ContentCheck::HasArgdown => "HasArgdownHandler",
        }
    }

    fn dtype(self) -> DataType {
        match self {
            ContentCheck::HasAnnotations => DataType::Xml,
            ContentCheck::HasArgdown => DataType::Argdown,
        }
    }

    pub fn evaluate(
        self,
        check: &Check<Self>,
        request: &VerificationRequest,
    ) -> VerificationResult {
        let dtype = self.dtype();
        let raw: Vec<_> = request
            .data()
            .iter()
            .filter(|d| d.dtype == dtype && d.derived_from.is_none() && d.code_snippet.is_some())
            .collect();
        if raw.iter().any(|d| check.filter.matches(d)) {
            return VerificationResult::pass(&check.name, Vec::new());
        }

        let mut message = match self {
            ContentCheck::HasAnnotations => {
                "Input data has no properly formatted fenced codeblocks with annotations."
            }
            ContentCheck::HasArgdown => {
                "Input data has no properly formatted fenced codeblocks with Argdown code."
            }
        }
        .to_owned();
        let marker = code_marker(dtype);
        if !request.inputs.contains(marker) {
            message += &format!(" No fenced code block starting with '{}'.", marker);
        }
        if !has_closing_fence(&request.inputs) {
            message += " No closing '```'.";
        }
        if !raw.is_empty() {
            message += &format!(
                " Found {} fenced code blocks, but none matches the required metadata filter.",
                raw.len()
            );
        }
        VerificationResult::fail(&check.name, Vec::new(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handlers::Handler, request::DataFilter, VerifierConfig};
    use std::sync::Arc;

    fn run(inputs: &str, handler: Handler) -> VerificationResult {
        let request = Handler::processing().process(VerificationRequest::new(inputs, None));
        let request = handler.process(request);
        request.results().last().unwrap().clone()
    }

    #[test]
    fn test_missing_blocks() {
        let config = Arc::new(VerifierConfig::default());
        let result = run("No code here.", Handler::has_annotations(&config, DataFilter::Any));
        assert!(!result.is_valid);
        assert_eq!(
            result.message.as_deref(),
            Some(
                "Input data has no properly formatted fenced codeblocks with annotations. \
                 No fenced code block starting with '```xml'. No closing '```'."
            )
        );

        let result = run("```argdown\n[A]: a.", Handler::has_argdown(&config, DataFilter::Any));
        assert_eq!(
            result.message.as_deref(),
            Some(
                "Input data has no properly formatted fenced codeblocks with Argdown code. \
                 No closing '```'."
            )
        );
        assert!(result.data_refs.is_empty());
    }

    #[test]
    fn test_filter() {
        let config = Arc::new(VerifierConfig::default());
        let inputs = "```argdown {filename=\"other.ad\"}\n[A]: a.\n```\n";
        let result = run(inputs, Handler::has_argdown(&config, DataFilter::filename_prefix("map")));
        assert!(result
            .message
            .as_deref()
            .unwrap()
            .ends_with("Found 1 fenced code blocks, but none matches the required metadata filter."));

        let result = run(inputs, Handler::has_argdown(&config, DataFilter::Any));
        assert!(result.is_valid);
        assert_eq!(result.verifier_id, "HasArgdownHandler");

        let map = DataFilter::filename_prefix("map");
        let result = run(inputs, Handler::has_argdown_as(&config, "map", map));
        assert!(!result.is_valid);
        assert_eq!(result.verifier_id, "HasArgdownHandler.map");
    }
}
