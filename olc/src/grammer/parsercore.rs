use super::token::{Pos, Token, TokenKind};
use crate::error::Error;
use std::iter::Peekable;

/// Nesting limit for statements and expressions.
/// Each operator of a binary chain counts as one level.
pub const MAX_DEPTH: usize = 64;

pub struct Parser<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    last: Pos,
    depth: usize,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Parser {
            tokens: tokens.peekable(),
            last: Pos::new(1, 1),
            depth: 0,
        }
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    /// Peek : Watch next token without consuming it
    pub fn peek(&mut self) -> Result<&Token, Error> {
        let last = self.last;
        match self.tokens.peek() {
            Some(token) if token.kind == TokenKind::Error => {
                Err(Error::Lexical(token.text.clone(), token.pos))
            }
            Some(token) => Ok(token),
            None => Err(Error::UnexpectedEOF(last)),
        }
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Result<Token, Error> {
        self.peek()?;
        match self.tokens.next() {
            Some(token) => {
                self.last = token.pos;
                Ok(token)
            }
            None => Err(Error::UnexpectedEOF(self.last)),
        }
    }

    /// Position of the next token (or of the last one at end of input)
    pub fn pos(&mut self) -> Pos {
        let last = self.last;
        self.tokens.peek().map(|token| token.pos).unwrap_or(last)
    }

    /// Position of the last consumed token
    pub fn last(&self) -> Pos {
        self.last
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> bool {
        match self.tokens.peek() {
            Some(token) => cond(token),
            None => false,
        }
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<Token> {
        let token = self.tokens.next_if(|token| cond(token))?;
        self.last = token.pos;
        Some(token)
    }

    /// Next token must be match with condition
    pub fn expect_tobe<F: Fn(&Token) -> bool>(
        &mut self,
        cond: F,
        expected: &str,
    ) -> Result<Token, Error> {
        let token = self.peek()?;
        if cond(token) {
            self.next()
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Error for the next token, which did not match `expected`
    pub fn unexpected(&mut self, expected: &str) -> Error {
        let last = self.last;
        match self.tokens.peek() {
            Some(token) if token.kind == TokenKind::Error => {
                Error::Lexical(token.text.clone(), token.pos)
            }
            Some(token) if token.kind == TokenKind::Eof => Error::UnexpectedEOF(token.pos),
            Some(token) => Error::UnexpectedToken {
                found: format!("'{}'", token.text),
                expected: expected.to_string(),
                pos: token.pos,
            },
            None => Error::UnexpectedEOF(last),
        }
    }

    /// Go one nesting level deeper until the enclosing `scoped` returns
    pub fn deepen(&mut self) -> Result<(), Error> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::TooDeep(self.pos()));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `f`, then restore the nesting level
    pub fn scoped<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        let depth = self.depth;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Run `f` one nesting level deeper
    pub fn nested<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        self.scoped(|p| {
            p.deepen()?;
            f(p)
        })
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:ident) => {
        $parser.expect_tobe(
            |token| token.kind == TokenKind::$kind,
            &$crate::grammer::lexer::describe(TokenKind::$kind),
        )
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:ident, $following:expr) => {
        if check!($parser, TokenKind::$trigger) {
            expect!($parser, $trigger)?;
            Some($following)
        } else {
            None
        }
    };
    ($parser:expr, $trigger:ident) => {
        $parser.consume_if(|token| token.kind == TokenKind::$trigger)
    };
}

/// Parse repeated elements with optional delimiters
/// 3 args: { element } terminal (no delimiter)
/// 4 args: element { delimiter element } (with delimiter, at least one element)
#[macro_export]
macro_rules! repeat {
    // Without delimiter: { element } terminal
    ($parser:expr, $elem:expr, $terminal:pat) => {{
        let mut items = Vec::new();
        while !check!($parser, $terminal) {
            items.push($elem?);
        }
        items
    }};

    // With delimiter: element { delimiter element }
    ($parser:expr, $elem:expr, $delimiter:ident, $terminal:pat) => {{
        let mut items = vec![$elem?];
        while !check!($parser, $terminal) {
            expect!($parser, $delimiter)?;
            items.push($elem?);
        }
        items
    }};
}
