//! A permissive parser for the XML annotation subset, producing an element tree.

mod lexer;

use crate::ArgcheckResult;
use lexer::{Lexer, XmlToken};
use std::fmt;
use thiserror::Error;

/// The error type for the annotation parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    /// The input ended inside the named tag.
    #[error("unterminated tag '{0}'")]
    UnterminatedTag(String),

    #[error("unterminated comment")]
    UnterminatedComment,

    /// The input ended inside a `<!...>` or `<?...?>` declaration.
    #[error("unterminated declaration")]
    UnterminatedDeclaration,

    /// The input ended inside the quoted value of the named attribute.
    #[error("unterminated attribute value for '{0}'")]
    UnterminatedQuote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,

    /// `None` for bare attributes, e.g. `<proposition hidden>`.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element of the annotation tree. The root of a parsed document is an element with an empty
/// name, which is never yielded by the traversal methods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// The value of the given attribute. Bare attributes have an empty value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// The whitespace-separated ids of a multi-valued attribute such as `supports` or `attacks`.
    pub fn id_list(&self, name: &str) -> Vec<&str> {
        self.attr(name).map(|v| v.split_whitespace().collect()).unwrap_or_default()
    }

    /// The value of the `id` attribute, if it is present and not empty.
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// The concatenated text content of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, acc: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => acc.push_str(t),
                Node::Element(e) => e.collect_text(acc),
            }
        }
    }

    /// All descendant elements, in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut result = Vec::new();
        self.collect_elements(&mut result);
        result
    }

    fn collect_elements<'a>(&'a self, acc: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(e) = child {
                acc.push(e);
                e.collect_elements(acc);
            }
        }
    }

    /// All descendant `proposition` elements, in document order.
    pub fn propositions(&self) -> Vec<&Element> {
        self.elements().into_iter().filter(|e| e.name == "proposition").collect()
    }

    fn push(&mut self, node: Node) {
        // Adjacent text nodes are merged, which can only happen around dropped comments
        if let (Node::Text(new), Some(Node::Text(last))) = (&node, self.children.last_mut()) {
            last.push_str(new);
            return;
        }
        self.children.push(node);
    }
}

fn escape(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            c => result.push(c),
        }
    }
    result
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Element(e) => write!(f, "{}", e),
            Node::Text(t) => write!(f, "{}", escape(t, false)),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_root() {
            write!(f, "<{}", self.name)?;
            for a in &self.attributes {
                match &a.value {
                    Some(v) => write!(f, " {}=\"{}\"", a.name, escape(v, true))?,
                    None => write!(f, " {}", a.name)?,
                }
            }
            if self.self_closing {
                return write!(f, "/>");
            }
            write!(f, ">")?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        if !self.is_root() {
            write!(f, "</{}>", self.name)?;
        }
        Ok(())
    }
}

/// Tracks the currently open elements while the tree is built.
struct TreeBuilder {
    root: Element,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn current(&mut self) -> &mut Element {
        match self.open.last_mut() {
            Some(e) => e,
            None => &mut self.root,
        }
    }

    /// Closes the innermost open element with the given name, along with every element still
    /// open inside it. Does nothing if no such element is open.
    fn close(&mut self, name: &str) {
        let Some(depth) = self.open.iter().rposition(|e| e.name == name) else {
            return;
        };
        while self.open.len() > depth {
            if let Some(element) = self.open.pop() {
                self.current().push(Node::Element(element));
            }
        }
    }

    fn finish(mut self) -> Element {
        while let Some(element) = self.open.pop() {
            self.current().push(Node::Element(element));
        }
        self.root
    }
}

/// Parses an annotation into an element tree. Unmatched end tags are ignored and unclosed
/// elements are closed at the end of the input.
pub fn parse(input: &str) -> ArgcheckResult<Element> {
    let mut lexer = Lexer::new(input);
    let mut builder = TreeBuilder { root: Element::default(), open: Vec::new() };
    loop {
        match lexer.next_token()? {
            XmlToken::StartTag { name, attributes, self_closing } => {
                let element = Element { name, attributes, children: Vec::new(), self_closing };
                if self_closing {
                    builder.current().push(Node::Element(element));
                } else {
                    builder.open.push(element);
                }
            }
            XmlToken::EndTag(name) => builder.close(&name),
            XmlToken::Text(text) => builder.current().push(Node::Text(text)),
            XmlToken::Eof => break,
        }
    }
    Ok(builder.finish())
}
