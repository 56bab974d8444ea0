//! A precedence-climbing parser for the formula language.

use super::{
    ast::{Connective, Formula, Quantifier},
    error::{FormulaError, FormulaErrorKind},
    lexer::{Lexer, Token},
};

type ParseResult<T> = Result<T, (FormulaErrorKind, usize)>;

/// The loosest binding strength, used when parsing a complete formula.
const TOP_LEVEL: u8 = 9;

pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current_token: Token,
    current_position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, FormulaError> {
        let mut lexer = Lexer::new(input);
        let (current_token, current_position) =
            lexer.next_token().map_err(|e| Self::wrap(input, e))?;
        Ok(Parser { input, lexer, current_token, current_position })
    }

    fn wrap(input: &str, (kind, column): (FormulaErrorKind, usize)) -> FormulaError {
        FormulaError { input: input.to_owned(), kind, column }
    }

    /// Parses the whole input as a single formula.
    pub fn parse(mut self) -> Result<Formula, FormulaError> {
        if self.current_token == Token::Eof {
            return Err(Self::wrap(self.input, (FormulaErrorKind::Empty, 1)));
        }
        let result = self.parse_formula(TOP_LEVEL).and_then(|f| match &self.current_token {
            Token::Eof => Ok(f),
            _ => Err(self.unexpected()),
        });
        result.map_err(|e| Self::wrap(self.input, e))
    }

    /// Advances the parser by one token, and returns the previous `current_token`.
    fn next_token(&mut self) -> ParseResult<Token> {
        let (new, position) = self.lexer.next_token()?;
        self.current_position = position;
        Ok(std::mem::replace(&mut self.current_token, new))
    }

    fn unexpected(&self) -> (FormulaErrorKind, usize) {
        let kind = match &self.current_token {
            Token::Eof => FormulaErrorKind::UnexpectedEof,
            other => FormulaErrorKind::UnexpectedToken(other.clone()),
        };
        (kind, self.current_position)
    }

    fn expect_token(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.next_token()?;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        if !matches!(self.current_token, Token::Ident(_)) {
            return Err(self.unexpected());
        }
        match self.next_token()? {
            Token::Ident(name) => Ok(name),
            _ => Err(self.unexpected()),
        }
    }

    fn current_connective(&self) -> Option<Connective> {
        match self.current_token {
            Token::And => Some(Connective::And),
            Token::Or => Some(Connective::Or),
            Token::Implies => Some(Connective::Implies),
            Token::Iff => Some(Connective::Iff),
            _ => None,
        }
    }

    /// Parses a formula whose binary connectives bind at most as loosely as `max_precedence`.
    /// All connectives associate to the left.
    fn parse_formula(&mut self, max_precedence: u8) -> ParseResult<Formula> {
        let mut left = self.parse_unary()?;
        while let Some(connective) = self.current_connective() {
            let precedence = connective.precedence();
            if precedence > max_precedence {
                break;
            }
            self.next_token()?;
            let right = self.parse_formula(precedence - 1)?;
            left = Formula::binary(connective, left, right);
        }
        Ok(left)
    }

    /// Parses a negation, a quantified formula, a parenthesized formula or an atomic formula.
    fn parse_unary(&mut self) -> ParseResult<Formula> {
        match &self.current_token {
            Token::Not => {
                self.next_token()?;
                Ok(Formula::not(self.parse_unary()?))
            }
            Token::Forall | Token::Exists => self.parse_quantified(),
            Token::OpenParen => {
                self.next_token()?;
                let inner = self.parse_formula(TOP_LEVEL)?;
                self.expect_token(Token::CloseParen)?;
                Ok(inner)
            }
            Token::Ident(_) => self.parse_atomic(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_quantified(&mut self) -> ParseResult<Formula> {
        let quantifier = match self.next_token()? {
            Token::Forall => Quantifier::Forall,
            _ => Quantifier::Exists,
        };
        let mut variables = Vec::new();
        while let Token::Ident(_) = self.current_token {
            variables.push(self.expect_ident()?);
        }
        if variables.is_empty() {
            return Err((FormulaErrorKind::MissingQuantifiedVariable, self.current_position));
        }
        self.expect_token(Token::Dot)?;

        // The body only extends over operators binding tighter than any binary connective
        let body = self.parse_unary()?;
        Ok(variables
            .into_iter()
            .rev()
            .fold(body, |acc, v| Formula::Quantified(quantifier, v, Box::new(acc))))
    }

    fn parse_atomic(&mut self) -> ParseResult<Formula> {
        let name = self.expect_ident()?;
        match self.current_token {
            Token::OpenParen => {
                self.next_token()?;
                let mut args = vec![self.parse_term(&name)?];
                while self.current_token == Token::Comma {
                    self.next_token()?;
                    args.push(self.parse_term(&name)?);
                }
                self.expect_token(Token::CloseParen)?;
                Ok(Formula::App(name, args))
            }
            Token::Equals => {
                self.next_token()?;
                Ok(Formula::Equals(name, self.expect_ident()?))
            }
            Token::NotEquals => {
                self.next_token()?;
                Ok(Formula::not(Formula::Equals(name, self.expect_ident()?)))
            }
            _ => Ok(Formula::Atom(name)),
        }
    }

    fn parse_term(&mut self, predicate: &str) -> ParseResult<String> {
        let term = self.expect_ident()?;
        if self.current_token == Token::OpenParen {
            return Err((FormulaErrorKind::NestedTerm(predicate.to_owned()), self.current_position));
        }
        Ok(term)
    }
}
