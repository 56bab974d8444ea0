//! A line-oriented parser for the Argdown subset: claims, arguments, relation trees and
//! premise-conclusion structures.

use super::{
    graph::{ArgdownGraph, Argument, PcsItem, PcsRole, Proposition, Valence},
    inline::InlineData,
    ArgdownError,
};
use crate::{processing::Position, ArgcheckResult, Error};

/// Relation markers, with their valence and whether the relation points from the child to the
/// parent.
const RELATION_MARKERS: [(&str, Valence, bool); 7] = [
    ("<+", Valence::Support, true),
    ("<-", Valence::Attack, true),
    ("<_", Valence::Attack, true),
    ("+>", Valence::Support, false),
    ("->", Valence::Attack, false),
    ("_>", Valence::Attack, false),
    ("><", Valence::Contradict, false),
];

fn error<T>(kind: ArgdownError, position: Position) -> ArgcheckResult<T> {
    Err(Error::Argdown(kind, position))
}

fn advance(c: char, position: &mut Position) {
    if c == '\n' {
        *position = (position.0 + 1, 1);
    } else {
        position.1 += 1;
    }
}

/// Replaces comments with spaces, so that positions in the remaining text are unchanged.
fn remove_comments(input: &str) -> ArgcheckResult<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len());
    let mut position = (1, 1);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let after_space = i == 0 || chars[i - 1].is_whitespace();
        if c == '/' && next == Some('*') {
            let start = position;
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    result.push_str("  ");
                    advance('*', &mut position);
                    advance('/', &mut position);
                    i += 2;
                    closed = true;
                    break;
                }
                result.push(if chars[i] == '\n' { '\n' } else { ' ' });
                advance(chars[i], &mut position);
                i += 1;
            }
            if !closed {
                return error(ArgdownError::UnclosedComment, start);
            }
        } else if c == '/' && next == Some('/') && after_space {
            while i < chars.len() && chars[i] != '\n' {
                result.push(' ');
                advance(chars[i], &mut position);
                i += 1;
            }
        } else {
            result.push(c);
            advance(c, &mut position);
            i += 1;
        }
    }
    Ok(result)
}

/// The nesting depth of curly braces at the end of `line`, counted from its first `{`. Braces
/// inside quoted scalars are ignored. A quote only opens a scalar where a flow value can start,
/// so apostrophes in plain scalars like `{note: it's fine}` are literal.
fn brace_depth(line: &str) -> i32 {
    let Some(start) = line.find('{') else { return 0 };
    let mut depth = 0;
    let mut quote = None;
    let mut previous = ' ';
    let mut chars = line[start..].chars().peekable();
    while let Some(c) = chars.next() {
        match (quote, c) {
            // `''` inside single quotes and `\x` inside double quotes are escapes
            (Some('\''), '\'') if chars.peek() == Some(&'\'') => {
                chars.next();
            }
            (Some('"'), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => (),
            (None, '"' | '\'') if matches!(previous, '{' | '[' | ',' | ':') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => depth -= 1,
            _ => (),
        }
        if quote.is_none() && !c.is_whitespace() {
            previous = c;
        }
    }
    depth
}

/// Column (1-based) of the byte offset `offset` in `line`.
fn column_of(line: &str, offset: usize) -> usize {
    line[..offset].chars().count() + 1
}

/// A source line, joined with its continuation lines when its inline data spans several lines.
struct Line {
    number: usize,
    indent: usize,
    column: usize,
    text: String,
}

fn logical_lines(input: &str) -> ArgcheckResult<Vec<Line>> {
    let mut lines = Vec::new();
    let mut raw = input.lines().enumerate();
    while let Some((i, first)) = raw.next() {
        let mut joined = first.to_owned();
        while brace_depth(&joined) > 0 {
            match raw.next() {
                Some((_, next)) => {
                    joined.push('\n');
                    joined.push_str(next);
                }
                None => {
                    let offset = first.find('{').unwrap_or_default();
                    let position = (i + 1, column_of(first, offset));
                    return error(ArgdownError::UnclosedInlineData, position);
                }
            }
        }
        let content = joined.trim_start();
        let leading = &joined[..joined.len() - content.len()];
        let indent = leading.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum();
        lines.push(Line {
            number: i + 1,
            indent,
            column: leading.chars().count() + 1,
            text: content.trim_end().to_owned(),
        });
    }
    Ok(lines)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Claim,
    Argument,
}

/// A node as written in a statement: `[label]: text {data}`, `<label>: gist {data}`, or text.
#[derive(Debug)]
struct Statement {
    kind: NodeKind,
    label: Option<String>,
    text: Option<String>,
    data: InlineData,
}

/// Splits trailing inline data off `text`. The data is everything from the first `{`.
fn split_inline_data(text: &str, position: Position) -> ArgcheckResult<(String, InlineData)> {
    let Some(start) = text.find('{') else {
        return Ok((text.trim().to_owned(), InlineData::default()));
    };
    let yaml_position = (position.0, position.1 + column_of(text, start) - 1);
    let yaml = text[start..].trim_end();
    if brace_depth(yaml) != 0 || !yaml.ends_with('}') {
        return error(ArgdownError::UnclosedInlineData, yaml_position);
    }
    let value = match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(value) => value,
        Err(e) => return error(ArgdownError::InvalidInlineData(e.to_string()), yaml_position),
    };
    match InlineData::from_yaml(value) {
        Some(data) => Ok((text[..start].trim().to_owned(), data)),
        None => error(ArgdownError::InvalidInlineData("not a mapping".to_owned()), yaml_position),
    }
}

fn parse_statement(text: &str, position: Position) -> ArgcheckResult<Statement> {
    let (kind, close) = match text.chars().next() {
        Some('[') => (NodeKind::Claim, ']'),
        Some('<') => (NodeKind::Argument, '>'),
        _ => {
            let (text, data) = split_inline_data(text, position)?;
            let text = (!text.is_empty()).then_some(text);
            return Ok(Statement { kind: NodeKind::Claim, label: None, text, data });
        }
    };
    let Some(end) = text.find(close) else {
        let open = if close == ']' { '[' } else { '<' };
        return error(ArgdownError::UnclosedLabel(open), position);
    };
    let label = text[1..end].trim();
    if label.is_empty() {
        return error(ArgdownError::EmptyLabel, position);
    }
    let rest = &text[end + 1..];
    let rest_position = (position.0, position.1 + column_of(text, end + 1) - 1);
    let rest = rest.trim_start().strip_prefix(':').unwrap_or(rest);
    let (text, data) = split_inline_data(rest, rest_position)?;
    Ok(Statement {
        kind,
        label: Some(label.to_owned()),
        text: (!text.is_empty()).then_some(text),
        data,
    })
}

/// Parses an inference line. Returns `None` if the line is not one.
fn parse_inference(text: &str, position: Position) -> Option<ArgcheckResult<InlineData>> {
    if !text.starts_with("--") {
        return None;
    }
    if text.chars().all(|c| c == '-') {
        return Some(if text.len() >= 4 {
            Ok(InlineData::default())
        } else {
            error(ArgdownError::MalformedInference, position)
        });
    }
    let Some(inner) = text.strip_prefix("--").and_then(|t| t.strip_suffix("--")) else {
        return Some(error(ArgdownError::MalformedInference, position));
    };
    Some(match inner.find('{') {
        Some(start) => {
            let inner_position = (position.0, position.1 + 2);
            split_inline_data(&inner[start..], inner_position).map(|(_, data)| data)
        }
        None => Ok(InlineData::default()),
    })
}

/// Splits `(label) rest` into its parts. Returns `None` if the line is not a pcs item.
fn parse_pcs_label(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('(')?;
    let end = rest.find(')')?;
    let label = rest[..end].trim();
    let after = &rest[end + 1..];
    let well_formed = !label.is_empty()
        && !label.contains('(')
        && (after.is_empty() || after.starts_with(char::is_whitespace));
    well_formed.then(|| (label, after.trim_start()))
}

fn parse_relation_marker(text: &str) -> Option<(Valence, bool, &str)> {
    RELATION_MARKERS.iter().find_map(|&(marker, valence, child_to_parent)| {
        let rest = text.strip_prefix(marker)?;
        rest.starts_with(char::is_whitespace).then(|| (valence, child_to_parent, rest.trim_start()))
    })
}

#[derive(Default)]
struct Parser {
    graph: ArgdownGraph,

    /// The open relation tree, as (indent, node label) pairs from the root down.
    stack: Vec<(usize, String)>,

    /// The argument whose premise-conclusion structure is being read.
    pcs: Option<usize>,

    /// An argument introduced on a top-level line, which a following pcs belongs to.
    awaiting_pcs: Option<usize>,

    pending_inference: Option<InlineData>,
    unlabeled_propositions: usize,
    unlabeled_arguments: usize,
}

impl Parser {
    fn add_claim(
        &mut self,
        label: Option<String>,
        text: Option<String>,
        data: InlineData,
    ) -> String {
        let existing = match &label {
            Some(label) => self.graph.propositions.iter().position(|p| &p.label == label),
            None => self.graph.propositions.iter().position(|p| {
                text.as_ref().is_some_and(|t| p.texts.contains(t))
            }),
        };
        if let Some(i) = existing {
            let proposition = &mut self.graph.propositions[i];
            if let Some(text) = text {
                if !proposition.texts.contains(&text) {
                    proposition.texts.push(text);
                }
            }
            proposition.data.merge(data);
            return proposition.label.clone();
        }

        let unlabeled = label.is_none();
        let label = label.unwrap_or_else(|| {
            self.unlabeled_propositions += 1;
            format!("unlabeled proposition {}", self.unlabeled_propositions)
        });
        self.graph.propositions.push(Proposition {
            label: label.clone(),
            texts: text.into_iter().collect(),
            data,
            unlabeled,
        });
        label
    }

    /// Returns the index of the argument.
    fn add_argument(
        &mut self,
        label: Option<String>,
        gist: Option<String>,
        data: InlineData,
    ) -> usize {
        if let Some(i) = label.as_ref().and_then(|l| {
            self.graph.arguments.iter().position(|a| &a.label == l)
        }) {
            let argument = &mut self.graph.arguments[i];
            if let Some(gist) = gist {
                if !argument.gists.contains(&gist) {
                    argument.gists.push(gist);
                }
            }
            argument.data.merge(data);
            return i;
        }

        let unlabeled = label.is_none();
        let label = label.unwrap_or_else(|| {
            self.unlabeled_arguments += 1;
            format!("unlabeled argument {}", self.unlabeled_arguments)
        });
        self.graph.arguments.push(Argument {
            label,
            gists: gist.into_iter().collect(),
            data,
            pcs: Vec::new(),
            unlabeled,
        });
        self.graph.arguments.len() - 1
    }

    /// Registers the node of a statement and returns its label and, for arguments, its index.
    fn add_node(&mut self, statement: Statement) -> (String, Option<usize>) {
        let Statement { kind, label, text, data } = statement;
        match kind {
            NodeKind::Claim => (self.add_claim(label, text, data), None),
            NodeKind::Argument => {
                let i = self.add_argument(label, text, data);
                (self.graph.arguments[i].label.clone(), Some(i))
            }
        }
    }

    fn close_pcs(&mut self) {
        if self.pending_inference.take().is_some() {
            log::debug!("inference line without a conclusion");
        }
        self.pcs = None;
    }

    fn line(&mut self, line: &Line) -> ArgcheckResult<()> {
        let position = (line.number, line.column);
        let text = line.text.as_str();

        if text.is_empty() {
            return Ok(());
        }
        if text.starts_with('#') {
            self.close_pcs();
            self.stack.clear();
            self.awaiting_pcs = None;
            return Ok(());
        }
        if let Some(data) = parse_inference(text, position) {
            let data = data?;
            if self.pcs.is_none() {
                return error(ArgdownError::OrphanInference, position);
            }
            self.pending_inference = Some(data);
            return Ok(());
        }
        if let Some((valence, child_to_parent, rest)) = parse_relation_marker(text) {
            return self.relation(line, valence, child_to_parent, rest);
        }
        if let Some((label, rest)) = parse_pcs_label(text) {
            return self.pcs_item(line, label, rest);
        }

        self.close_pcs();
        let (label, argument) = self.add_node(parse_statement(text, position)?);
        self.stack = vec![(line.indent, label)];
        self.awaiting_pcs = argument;
        Ok(())
    }

    fn relation(
        &mut self,
        line: &Line,
        valence: Valence,
        child_to_parent: bool,
        rest: &str,
    ) -> ArgcheckResult<()> {
        let position = (line.number, line.column);
        self.awaiting_pcs = None;
        while self.stack.last().is_some_and(|(indent, _)| *indent >= line.indent) {
            self.stack.pop();
        }
        let Some((_, parent)) = self.stack.last().cloned() else {
            return error(ArgdownError::OrphanRelation, position);
        };

        let marker_len = text_offset(&line.text, rest);
        let statement = parse_statement(rest, (position.0, position.1 + marker_len))?;
        let (child, _) = self.add_node(statement);
        if child_to_parent {
            self.graph.declare_relation(&child, &parent, valence);
        } else {
            self.graph.declare_relation(&parent, &child, valence);
        }
        self.stack.push((line.indent, child));
        Ok(())
    }

    fn pcs_item(&mut self, line: &Line, label: &str, rest: &str) -> ArgcheckResult<()> {
        let position = (line.number, line.column);
        let argument = match self.pcs {
            Some(i) => i,
            None => {
                let i = match self.awaiting_pcs.take() {
                    Some(i) if self.graph.arguments[i].pcs.is_empty() => i,
                    _ => self.add_argument(None, None, InlineData::default()),
                };
                self.pcs = Some(i);
                i
            }
        };

        let offset = text_offset(&line.text, rest);
        let statement = parse_statement(rest, (position.0, position.1 + offset))?;
        if statement.kind == NodeKind::Argument {
            return error(ArgdownError::ArgumentInPcs, position);
        }
        let Statement { label: claim, text, data, .. } = statement;
        let proposition_label = self.add_claim(claim, text, data);

        let role = match self.pending_inference.take() {
            Some(data) => PcsRole::Conclusion(data),
            None => PcsRole::Premise,
        };
        self.graph.arguments[argument].pcs.push(PcsItem {
            label: label.to_owned(),
            proposition_label: proposition_label.clone(),
            role,
        });
        self.stack = vec![(line.indent, proposition_label)];
        Ok(())
    }
}

/// Number of characters between the start of `line` and the start of `suffix`, which must be a
/// subslice of it.
fn text_offset(line: &str, suffix: &str) -> usize {
    line[..line.len() - suffix.len()].chars().count()
}

pub fn parse(input: &str) -> ArgcheckResult<ArgdownGraph> {
    let input = remove_comments(input)?;
    let mut parser = Parser::default();
    for line in logical_lines(&input)? {
        parser.line(&line)?;
    }
    parser.close_pcs();
    Ok(parser.graph)
}
