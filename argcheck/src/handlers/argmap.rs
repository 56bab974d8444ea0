//! Structural checks of argument maps.

use super::{Context, Report, StructuralCheck};
use crate::{
    request::{DataType, VerificationData},
    utils::shorten,
    ArgcheckResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgmapCheck {
    CompleteClaims,
    NoDuplicateLabels,
    NoPCS,
}

impl ArgmapCheck {
    pub const ALL: [ArgmapCheck; 3] =
        [ArgmapCheck::CompleteClaims, ArgmapCheck::NoDuplicateLabels, ArgmapCheck::NoPCS];
}

impl StructuralCheck for ArgmapCheck {
    const SUITE: &'static str = "ArgMap";
    const DTYPE: DataType = DataType::Argdown;

    fn name(&self) -> &'static str {
        match self {
            ArgmapCheck::CompleteClaims => "CompleteClaims",
            ArgmapCheck::NoDuplicateLabels => "NoDuplicateLabels",
            ArgmapCheck::NoPCS => "NoPCS",
        }
    }

    fn evaluate(&self, data: &VerificationData, ctx: &Context) -> ArgcheckResult<Option<Report>> {
        let graph = ctx.graph(data)?;
        let report = match self {
            ArgmapCheck::CompleteClaims => {
                let incomplete: Vec<_> = graph
                    .propositions
                    .iter()
                    .filter(|p| p.unlabeled)
                    .map(|p| match p.texts.first() {
                        Some(text) if !text.is_empty() => shorten(text, 40),
                        _ => "Empty claim".to_owned(),
                    })
                    .collect();
                if incomplete.is_empty() {
                    Report::pass()
                } else {
                    Report::fail(format!("Missing labels for nodes: {}", incomplete.join(", ")))
                }
            }
            ArgmapCheck::NoDuplicateLabels => {
                let claims = graph
                    .propositions
                    .iter()
                    .filter(|p| p.texts.len() > 1 && !p.unlabeled)
                    .map(|p| p.label.as_str());
                let arguments = graph
                    .arguments
                    .iter()
                    .filter(|a| a.gists.len() > 1 && !a.unlabeled)
                    .map(|a| a.label.as_str());
                let duplicates: Vec<_> = claims.chain(arguments).collect();
                if duplicates.is_empty() {
                    Report::pass()
                } else {
                    Report::fail(format!("Duplicate labels: {}", duplicates.join(", ")))
                }
            }
            ArgmapCheck::NoPCS => {
                let reconstructed: Vec<_> = graph
                    .arguments
                    .iter()
                    .filter(|a| !a.pcs.is_empty())
                    .map(|a| a.display_label())
                    .collect();
                if reconstructed.is_empty() {
                    Report::pass()
                } else {
                    Report::fail(format!(
                        "Found detailed reconstruction of individual argument(s) {} as \
                         premise-conclusion-structures.",
                        reconstructed.join(", ")
                    ))
                }
            }
        };
        Ok(Some(report))
    }
}
