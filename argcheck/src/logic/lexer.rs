//! A lexer for first-order formulas written in the NLTK logic syntax.

use super::error::FormulaErrorKind;
use std::{fmt, iter::Peekable, str::Chars};

/// A token in the formula language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// The `(` token.
    OpenParen,

    /// The `)` token.
    CloseParen,

    /// The `,` token, separating predicate arguments.
    Comma,

    /// The `.` token, ending the variable list of a quantifier.
    Dot,

    /// Negation, written `-` or `!`.
    Not,

    /// Conjunction, written `&` or `^`.
    And,

    /// Disjunction, written `|`.
    Or,

    /// Implication, written `->` or `=>`.
    Implies,

    /// Biconditional, written `<->` or `<=>`.
    Iff,

    /// Equality, written `=` or `==`.
    Equals,

    /// Inequality, written `!=` or `-=`.
    NotEquals,

    /// The universal quantifier, written `all` or `forall`.
    Forall,

    /// The existential quantifier, written `exists`, `exist` or `some`.
    Exists,

    /// An identifier: a predicate, a propositional atom, a constant or a variable.
    Ident(String),

    /// A signal token to indicate the end of the input.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Not => "-",
            Token::And => "&",
            Token::Or => "|",
            Token::Implies => "->",
            Token::Iff => "<->",
            Token::Equals => "=",
            Token::NotEquals => "!=",
            Token::Forall => "all",
            Token::Exists => "exists",
            Token::Ident(s) => s,
            Token::Eof => "EOF",
        };
        write!(f, "{}", s)
    }
}

fn is_ident_character(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// A lexer over a single formula string. Positions are 1-based character columns.
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    current_char: Option<char>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut input = input.chars().peekable();
        let current_char = input.next();
        Lexer { input, current_char, position: 1 }
    }

    /// Advances the lexer by one character, and returns the previous `current_char`.
    fn next_char(&mut self) -> Option<char> {
        let new = self.input.next();
        self.position += 1;
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
        self.read_chars_while(char::is_whitespace);
    }

    /// Consumes `expected` if it is the current character.
    fn eat(&mut self, expected: char) -> bool {
        if self.current_char == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Reads the next token, returning it together with the column where it starts.
    pub fn next_token(&mut self) -> Result<(Token, usize), (FormulaErrorKind, usize)> {
        self.consume_whitespace();
        let start = self.position;
        let Some(c) = self.current_char else {
            return Ok((Token::Eof, start));
        };
        let token = match c {
            '(' => self.single(Token::OpenParen),
            ')' => self.single(Token::CloseParen),
            ',' => self.single(Token::Comma),
            '.' => self.single(Token::Dot),
            '&' | '^' => self.single(Token::And),
            '|' => self.single(Token::Or),
            '-' | '!' => {
                self.next_char();
                if c == '-' && self.eat('>') {
                    Token::Implies
                } else if self.eat('=') {
                    Token::NotEquals
                } else {
                    Token::Not
                }
            }
            '=' => {
                self.next_char();
                if self.eat('>') {
                    Token::Implies
                } else {
                    self.eat('=');
                    Token::Equals
                }
            }
            '<' => {
                self.next_char();
                if (self.eat('-') || self.eat('=')) && self.eat('>') {
                    Token::Iff
                } else {
                    return Err((FormulaErrorKind::UnexpectedChar('<'), start));
                }
            }
            c if is_ident_character(c) => {
                let ident = self.read_chars_while(is_ident_character);
                match ident.as_str() {
                    "all" | "forall" => Token::Forall,
                    "exists" | "exist" | "some" => Token::Exists,
                    _ => Token::Ident(ident),
                }
            }
            other => return Err((FormulaErrorKind::UnexpectedChar(other), start)),
        };
        Ok((token, start))
    }

    fn single(&mut self, token: Token) -> Token {
        self.next_char();
        token
    }
}
