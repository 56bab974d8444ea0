//! Turning a raw answer into typed verification data: fenced-block extraction and the two
//! primary parsers.

pub mod argdown;
pub mod fenced;
pub mod xml;

use crate::request::{DataType, Payload, VerificationRequest, VerificationResult};
use std::sync::Arc;

/// A position in a code snippet, as a (line, column) pair. Both are 1-based.
pub type Position = (usize, usize);

/// One stage of the processing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStep {
    /// Splits the raw inputs into one unparsed item per fenced code block.
    Extract { languages: Vec<DataType> },

    ParseArgdown,
    ParseXml,
}

impl ProcessingStep {
    /// The verifier id under which this step reports failures.
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStep::Extract { .. } => "FencedCodeBlockExtractor",
            ProcessingStep::ParseArgdown => "ArgdownParser",
            ProcessingStep::ParseXml => "XMLParser",
        }
    }

    pub fn apply(&self, mut request: VerificationRequest) -> VerificationRequest {
        match self {
            ProcessingStep::Extract { languages } => {
                let blocks = fenced::extract_blocks(&request.inputs, languages);
                for language in languages {
                    if !blocks.iter().any(|b| b.dtype == *language) {
                        log::debug!("no {} code blocks found to extract", language);
                    }
                }
                for block in blocks {
                    request.add_data(
                        block.dtype,
                        Some(block.snippet),
                        block.metadata,
                        Payload::Unparsed,
                        None,
                    );
                }
            }
            ProcessingStep::ParseArgdown => {
                parse_pending(&mut request, DataType::Argdown, self.name(), |body| {
                    argdown::parse(body).map(|graph| Payload::Argdown(Arc::new(graph)))
                });
            }
            ProcessingStep::ParseXml => {
                parse_pending(&mut request, DataType::Xml, self.name(), |body| {
                    xml::parse(body).map(|tree| Payload::Xml(Arc::new(tree)))
                });
            }
        }
        request
    }
}

/// Parses every raw item of type `dtype` that has no parsed counterpart yet. Each attempt appends
/// a new item derived from the raw one. On failure, the new item carries `Payload::Failed` and a
/// failing result is recorded against it.
fn parse_pending<F>(
    request: &mut VerificationRequest,
    dtype: DataType,
    verifier_id: &str,
    parse: F,
) where
    F: Fn(&str) -> crate::ArgcheckResult<Payload>,
{
    let pending: Vec<_> = request
        .data()
        .iter()
        .filter(|d| d.dtype == dtype && d.derived_from.is_none())
        .filter(|raw| !request.data().iter().any(|d| d.derived_from.as_ref() == Some(&raw.id)))
        .map(|raw| (raw.id.clone(), raw.code_snippet.clone(), raw.metadata.clone()))
        .collect();

    for (raw_id, snippet, metadata) in pending {
        let Some(snippet) = snippet else {
            log::debug!("code snippet for {} is missing, skipping", raw_id);
            continue;
        };
        let body = fenced::strip_fences(&snippet, dtype);
        match parse(body) {
            Ok(payload) => {
                request.add_data(dtype, Some(snippet), metadata, payload, Some(raw_id));
            }
            Err(e) => {
                let metadata_text = match &metadata {
                    Some(m) if !m.is_empty() => format!(" {}", m),
                    _ => String::new(),
                };
                let message = match dtype {
                    DataType::Argdown => {
                        format!("Failed to parse argdown code snippet{}: {}", metadata_text, e)
                    }
                    DataType::Xml => {
                        format!("Failed to parse XML code snippet{}: {}", metadata_text, e)
                    }
                };
                log::debug!("{}", message);
                let id =
                    request.add_data(dtype, Some(snippet), metadata, Payload::Failed, Some(raw_id));
                request.add_result(VerificationResult::fail(verifier_id, vec![id], message));
            }
        }
    }
}
