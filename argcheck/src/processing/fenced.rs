//! Extraction of fenced code blocks from a raw answer.

use crate::request::{DataType, Metadata};
use indexmap::IndexMap;

pub const CLOSE_MARKER: &str = "\n```";

/// The opening marker of a code block in the given language.
pub fn code_marker(dtype: DataType) -> &'static str {
    match dtype {
        DataType::Argdown => "```argdown",
        DataType::Xml => "```xml",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FencedBlock {
    pub dtype: DataType,

    /// The whole block, from the opening marker to the closing fence inclusive.
    pub snippet: String,

    pub metadata: Option<Metadata>,
}

/// Extracts every closed block in one of `languages` from `input`, in document order. Blocks in
/// other languages are skipped over, so their content is never mistaken for a block.
pub fn extract_blocks(input: &str, languages: &[DataType]) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = input[cursor..].find("```") {
        let start = cursor + offset;
        let info_end = input[start..].find('\n').map_or(input.len(), |i| start + i);
        let Some(close) = input[info_end..].find(CLOSE_MARKER).map(|i| info_end + i) else {
            log::debug!("unclosed fenced code block at byte {}", start);
            break;
        };
        let end = close + CLOSE_MARKER.len();

        let info = &input[start..info_end];
        let dtype = languages.iter().copied().find(|&dtype| {
            info.strip_prefix(code_marker(dtype))
                .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t', '{', '\r']))
        });
        if let Some(dtype) = dtype {
            let metadata = parse_metadata(&info[code_marker(dtype).len()..]);
            blocks.push(FencedBlock {
                dtype,
                snippet: input[start..end].to_owned(),
                metadata,
            });
        }
        cursor = end;
    }
    blocks
}

/// Rewrites `key=value` pairs as `key: value`, leaving quoted text untouched.
fn normalize_metadata(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len() + 4);
    let mut quote = None;
    for c in raw.chars() {
        match (quote, c) {
            (None, '"' | '\'') => {
                quote = Some(c);
                result.push(c);
            }
            (Some(q), c) if c == q => {
                quote = None;
                result.push(c);
            }
            (None, '=') => result.push_str(": "),
            _ => result.push(c),
        }
    }
    result
}

/// Parses the fence metadata after the language marker, e.g. `{filename="map.ad"}`.
fn parse_metadata(raw: &str) -> Option<Metadata> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = normalize_metadata(raw);
    match serde_yaml::from_str::<serde_yaml::Value>(&normalized) {
        Ok(serde_yaml::Value::Mapping(mapping)) => {
            let entries: IndexMap<_, _> = mapping
                .into_iter()
                .filter_map(|(k, v)| match k {
                    serde_yaml::Value::String(k) => Some((k, v)),
                    other => serde_yaml::to_string(&other)
                        .ok()
                        .map(|k| (k.trim_end().to_owned(), v)),
                })
                .collect();
            Some(Metadata(entries))
        }
        Ok(_) => {
            log::debug!("fence metadata '{}' is not a mapping", raw);
            None
        }
        Err(e) => {
            log::debug!("no metadata found in code fence '{}' ({})", raw, e);
            None
        }
    }
}

/// Returns the body of a snippet, without the opening line and the closing fence.
pub fn strip_fences(snippet: &str, dtype: DataType) -> &str {
    let mut body = snippet;
    if body.starts_with(code_marker(dtype)) {
        body = body.split_once('\n').map_or("", |(_, rest)| rest);
    }
    if let Some(stripped) = body.strip_suffix("```") {
        body = stripped.strip_suffix('\n').unwrap_or(stripped);
    }
    body
}
