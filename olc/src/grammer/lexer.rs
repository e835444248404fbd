use super::token::{Pos, Token, TokenKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("class", TokenKind::KwClass);
    map.insert("extends", TokenKind::KwExtends);
    map.insert("is", TokenKind::KwIs);
    map.insert("end", TokenKind::KwEnd);
    map.insert("var", TokenKind::KwVar);
    map.insert("method", TokenKind::KwMethod);
    map.insert("this", TokenKind::KwThis);
    map.insert("if", TokenKind::KwIf);
    map.insert("then", TokenKind::KwThen);
    map.insert("else", TokenKind::KwElse);
    map.insert("while", TokenKind::KwWhile);
    map.insert("loop", TokenKind::KwLoop);
    map.insert("return", TokenKind::KwReturn);
    map.insert("break", TokenKind::KwBreak);
    map
});

static SYMBOLS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(":=", TokenKind::Assign);
    map.insert("==", TokenKind::EqualEqual);
    map.insert("!=", TokenKind::ExclEqual);
    map.insert(">=", TokenKind::RAngleEqual);
    map.insert("<=", TokenKind::LAngleEqual);
    map.insert("=>", TokenKind::Arrow);
    map.insert("+", TokenKind::Plus);
    map.insert("-", TokenKind::Minus);
    map.insert("*", TokenKind::Star);
    map.insert("/", TokenKind::Slash);
    map.insert("<", TokenKind::LAngle);
    map.insert(">", TokenKind::RAngle);
    map.insert(":", TokenKind::Colon);
    map.insert(";", TokenKind::Semicolon);
    map.insert(",", TokenKind::Comma);
    map.insert(".", TokenKind::Period);
    map.insert("(", TokenKind::LParen);
    map.insert(")", TokenKind::RParen);
    map.insert("[", TokenKind::LBracket);
    map.insert("]", TokenKind::RBracket);
    map
});

/// Human readable name of a token kind, used in syntax errors
pub fn describe(kind: TokenKind) -> String {
    let found = KEYWORDS
        .iter()
        .chain(SYMBOLS.iter())
        .find(|(_, k)| **k == kind);
    if let Some((text, _)) = found {
        return format!("'{}'", text);
    }
    match kind {
        TokenKind::Ident => "identifier",
        TokenKind::IntLit => "integer literal",
        TokenKind::RealLit => "real literal",
        TokenKind::BoolLit => "boolean literal",
        TokenKind::StringLit => "string literal",
        TokenKind::Eof => "end of file",
        _ => "invalid token",
    }
    .to_string()
}

/// Converts source text into tokens on demand.
/// `next_token` keeps returning `Eof` once the input is exhausted;
/// the iterator stops right after the first `Eof`.
pub struct Lexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    line: usize,
    col: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self {
            iter: code.char_indices().peekable(),
            line: 1,
            col: 1,
            finished: false,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl Lexer<'_> {
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.iter.clone().nth(n).map(|(_, ch)| ch)
    }

    fn consume(&mut self) -> Option<char> {
        let (_, ch) = self.iter.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn consume_if<F: Fn(char) -> bool>(&mut self, cond: F) -> Option<char> {
        match self.peek_nth(0) {
            Some(ch) if cond(ch) => self.consume(),
            _ => None,
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek_nth(0), self.peek_nth(1)) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.consume();
                }
                (Some('/'), Some('/')) => {
                    while self.consume_if(|ch| ch != '\n').is_some() {}
                }
                _ => break,
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

impl Lexer<'_> {
    pub fn next_token(&mut self) -> Token {
        // 0. Skip whitespaces and comments
        self.skip_trivia();

        let pos = self.pos();
        let Some(ch0) = self.peek_nth(0) else {
            return Token::new(TokenKind::Eof, "", pos);
        };

        // 1. Identifier or keyword
        if ch0.is_alphabetic() || ch0 == '_' {
            return self.scan_word(pos);
        }

        // 2. Number literal
        if ch0.is_ascii_digit() {
            return self.scan_number(pos);
        }

        // 3. String literal
        if ch0 == '"' {
            return self.scan_text(pos);
        }

        // 4. Double character token
        if let Some(ch1) = self.peek_nth(1) {
            let pair: String = [ch0, ch1].iter().collect();
            if let Some(&kind) = SYMBOLS.get(pair.as_str()) {
                self.consume();
                self.consume();
                return Token::new(kind, pair, pos);
            }
        }

        // 5. Single character token
        self.consume();
        let single = ch0.to_string();
        match SYMBOLS.get(single.as_str()) {
            Some(&kind) => Token::new(kind, single, pos),
            None => Token::new(
                TokenKind::Error,
                format!("Unexpected character '{}'", ch0),
                pos,
            ),
        }
    }

    fn scan_word(&mut self, pos: Pos) -> Token {
        let mut lexeme = String::new();
        while let Some(ch) = self.consume_if(|ch| ch.is_alphanumeric() || ch == '_') {
            lexeme.push(ch);
        }
        let kind = match lexeme.as_str() {
            "true" | "false" => TokenKind::BoolLit,
            word => KEYWORDS.get(word).copied().unwrap_or(TokenKind::Ident),
        };
        Token::new(kind, lexeme, pos)
    }

    // Number: 12, 1.5, 2e10, 3.0E-2
    fn scan_number(&mut self, pos: Pos) -> Token {
        let mut lexeme = String::new();
        let mut real = false;

        while let Some(ch) = self.consume_if(|ch| ch.is_ascii_digit()) {
            lexeme.push(ch);
        }

        // Fraction: a '.' belongs to the number only when a digit follows
        if self.peek_nth(0) == Some('.')
            && self.peek_nth(1).is_some_and(|ch| ch.is_ascii_digit())
        {
            real = true;
            lexeme.push('.');
            self.consume();
            while let Some(ch) = self.consume_if(|ch| ch.is_ascii_digit()) {
                lexeme.push(ch);
            }

            if self.peek_nth(0) == Some('.')
                && self.peek_nth(1).is_some_and(|ch| ch.is_ascii_digit())
            {
                let dot = self.pos();
                self.consume();
                while self.consume_if(|ch| ch.is_ascii_digit()).is_some() {}
                return Token::new(
                    TokenKind::Error,
                    format!("Invalid number '{}': more than one decimal point", lexeme),
                    dot,
                );
            }
        }

        // Exponent
        if let Some(marker @ ('e' | 'E')) = self.peek_nth(0) {
            let at = self.pos();
            self.consume();
            lexeme.push(marker);
            if let Some(sign) = self.consume_if(|ch| ch == '+' || ch == '-') {
                lexeme.push(sign);
            }
            let mut digits = 0;
            while let Some(ch) = self.consume_if(|ch| ch.is_ascii_digit()) {
                lexeme.push(ch);
                digits += 1;
            }
            if digits == 0 {
                return Token::new(
                    TokenKind::Error,
                    format!("Invalid number '{}': exponent requires digits", lexeme),
                    at,
                );
            }
            real = true;
        }

        let kind = if real {
            TokenKind::RealLit
        } else {
            TokenKind::IntLit
        };
        Token::new(kind, lexeme, pos)
    }

    // Text: "hoge\nfuga"
    fn scan_text(&mut self, pos: Pos) -> Token {
        self.consume();

        let mut lexeme = String::new();
        loop {
            match self.peek_nth(0) {
                None | Some('\n') => {
                    return Token::new(TokenKind::Error, "Unterminated string literal", pos);
                }
                Some('"') => {
                    self.consume();
                    return Token::new(TokenKind::StringLit, lexeme, pos);
                }
                Some('\\') => {
                    self.consume();
                    match self.peek_nth(0) {
                        None | Some('\n') => {
                            return Token::new(
                                TokenKind::Error,
                                "Unterminated string literal",
                                pos,
                            );
                        }
                        Some(ch) => {
                            self.consume();
                            match ch {
                                'n' => lexeme.push('\n'),
                                't' => lexeme.push('\t'),
                                '"' => lexeme.push('"'),
                                '\\' => lexeme.push('\\'),
                                other => {
                                    lexeme.push('\\');
                                    lexeme.push(other);
                                }
                            }
                        }
                    }
                }
                Some(ch) => {
                    self.consume();
                    lexeme.push(ch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_forever() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn iterator_stops_after_eof() {
        let kinds: Vec<_> = Lexer::new("a b").map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn describe_kinds() {
        assert_eq!(describe(TokenKind::KwEnd), "'end'");
        assert_eq!(describe(TokenKind::Assign), "':='");
        assert_eq!(describe(TokenKind::Ident), "identifier");
    }
}
