//! A forgiving tokenizer for annotation markup.

use super::{Attribute, XmlError};
use crate::{processing::Position, ArgcheckResult, Error};
use std::{iter::Peekable, str::Chars};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlToken {
    StartTag { name: String, attributes: Vec<Attribute>, self_closing: bool },
    EndTag(String),
    Text(String),
    Eof,
}

fn is_name_character(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '>' | '/' | '=' | '<' | '"' | '\'')
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    current_char: Option<char>,
    position: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut input = input.chars().peekable();
        let current_char = input.next();
        Lexer { input, current_char, position: (1, 1) }
    }

    /// Advances the lexer by one character, and returns the previous `current_char`.
    fn next_char(&mut self) -> Option<char> {
        if self.current_char == Some('\n') {
            self.position = (self.position.0 + 1, 1);
        } else {
            self.position.1 += 1;
        }
        let new = self.input.next();
        std::mem::replace(&mut self.current_char, new)
    }

    fn read_chars_while<P: Fn(char) -> bool>(&mut self, predicate: P) -> String {
        let mut result = String::new();
        while let Some(c) = self.current_char {
            if !predicate(c) {
                break;
            }
            result.push(c);
            self.next_char();
        }
        result
    }

    fn consume_whitespace(&mut self) {
        while self.current_char.is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Consumes characters up to and including `terminator`. Returns `false` if the input ended
    /// first.
    fn skip_past(&mut self, terminator: &str) -> bool {
        let terminator: Vec<char> = terminator.chars().collect();
        let mut window = Vec::with_capacity(terminator.len());
        while let Some(c) = self.next_char() {
            window.push(c);
            if window.len() > terminator.len() {
                window.remove(0);
            }
            if window == terminator {
                return true;
            }
        }
        false
    }

    pub fn next_token(&mut self) -> ArgcheckResult<XmlToken> {
        loop {
            let start = self.position;
            match self.current_char {
                None => return Ok(XmlToken::Eof),
                Some('<') => match self.input.peek().copied() {
                    Some('!') => {
                        self.next_char();
                        self.next_char();
                        let is_comment = self.current_char == Some('-')
                            && self.input.peek() == Some(&'-');
                        let (terminator, error) = if is_comment {
                            ("-->", XmlError::UnterminatedComment)
                        } else {
                            (">", XmlError::UnterminatedDeclaration)
                        };
                        if !self.skip_past(terminator) {
                            return Err(Error::Xml(error, start));
                        }
                    }
                    Some('?') => {
                        if !self.skip_past(">") {
                            return Err(Error::Xml(XmlError::UnterminatedDeclaration, start));
                        }
                    }
                    Some('/') => {
                        self.next_char();
                        self.next_char();
                        let name = self.read_chars_while(is_name_character);
                        if !self.skip_past(">") {
                            return Err(Error::Xml(XmlError::UnterminatedTag(name), start));
                        }
                        return Ok(XmlToken::EndTag(name.to_lowercase()));
                    }
                    Some(c) if c.is_alphabetic() => {
                        self.next_char();
                        return self.read_start_tag(start);
                    }
                    _ => {
                        // A lone `<` is just text
                        self.next_char();
                        let rest = self.read_chars_while(|c| c != '<');
                        return Ok(XmlToken::Text(decode_entities(&format!("<{}", rest))));
                    }
                },
                Some(_) => {
                    let text = self.read_chars_while(|c| c != '<');
                    return Ok(XmlToken::Text(decode_entities(&text)));
                }
            }
        }
    }

    fn read_start_tag(&mut self, start: Position) -> ArgcheckResult<XmlToken> {
        let name = self.read_chars_while(is_name_character).to_lowercase();
        let mut attributes = Vec::new();
        loop {
            self.consume_whitespace();
            match self.current_char {
                None => return Err(Error::Xml(XmlError::UnterminatedTag(name), start)),
                Some('>') => {
                    self.next_char();
                    return Ok(XmlToken::StartTag { name, attributes, self_closing: false });
                }
                Some('/') => {
                    self.next_char();
                    if self.current_char == Some('>') {
                        self.next_char();
                        return Ok(XmlToken::StartTag { name, attributes, self_closing: true });
                    }
                }
                Some(_) => {
                    if let Some(attribute) = self.read_attribute(start)? {
                        attributes.push(attribute);
                    }
                }
            }
        }
    }

    fn read_attribute(&mut self, start: Position) -> ArgcheckResult<Option<Attribute>> {
        let name = self.read_chars_while(is_name_character).to_lowercase();
        if name.is_empty() {
            // Stray quotes or `=` signs are dropped, one character at a time
            self.next_char();
            return Ok(None);
        }
        self.consume_whitespace();
        if self.current_char != Some('=') {
            return Ok(Some(Attribute { name, value: None }));
        }
        self.next_char();
        self.consume_whitespace();
        let value = match self.current_char {
            Some(quote @ ('"' | '\'')) => {
                self.next_char();
                let value = self.read_chars_while(|c| c != quote);
                if self.next_char().is_none() {
                    return Err(Error::Xml(XmlError::UnterminatedQuote(name), start));
                }
                value
            }
            _ => self.read_chars_while(|c| !c.is_whitespace() && c != '>'),
        };
        Ok(Some(Attribute { name, value: Some(decode_entities(&value)) }))
    }
}

/// Replaces character references. Unknown references are kept as they are.
pub fn decode_entities(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let c = match &rest[1..end] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                num if num.starts_with("#x") || num.starts_with("#X") => {
                    u32::from_str_radix(&num[2..], 16).ok().and_then(char::from_u32)
                }
                num if num.starts_with('#') => num[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                result.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<XmlToken> {
        let mut lexer = Lexer::new(input);
        let mut result = Vec::new();
        loop {
            match lexer.next_token().unwrap() {
                XmlToken::Eof => return result,
                t => result.push(t),
            }
        }
    }

    fn attr(name: &str, value: Option<&str>) -> Attribute {
        Attribute { name: name.to_owned(), value: value.map(str::to_owned) }
    }

    #[test]
    fn test_tags_and_attributes() {
        assert_eq!(
            tokens("<Proposition id=\"1\" supports='2 3' hidden x=y />a &amp; b</proposition>"),
            [
                XmlToken::StartTag {
                    name: "proposition".to_owned(),
                    attributes: vec![
                        attr("id", Some("1")),
                        attr("supports", Some("2 3")),
                        attr("hidden", None),
                        attr("x", Some("y")),
                    ],
                    self_closing: true,
                },
                XmlToken::Text("a & b".to_owned()),
                XmlToken::EndTag("proposition".to_owned()),
            ]
        );
    }

    #[test]
    fn test_comments_declarations_and_stray_brackets() {
        assert_eq!(
            tokens("<?xml version=\"1.0\"?><!DOCTYPE x><!-- a <b> -->1 < 2"),
            [XmlToken::Text("1 ".to_owned()), XmlToken::Text("< 2".to_owned())]
        );
    }

    #[test]
    fn test_errors() {
        let error = |input: &str| Lexer::new(input).next_token().unwrap_err().to_string();
        assert!(error("<proposition id=\"1").contains("unterminated attribute value"));
        assert!(error("<!-- never closed").contains("unterminated comment"));
        assert!(error("\n  <proposition").contains("line 2, column 3"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&lt;a&gt; &#65;&#x42; &nbsp; & x"), "<a> AB &nbsp; & x");
    }
}
