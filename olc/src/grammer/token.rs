use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Pos) -> Self {
        Token {
            kind,
            text: text.into(),
            pos,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "{}", self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Double character tokens
    Assign,      // ':='
    EqualEqual,  // '=='
    ExclEqual,   // '!='
    RAngleEqual, // '>='
    LAngleEqual, // '<='
    Arrow,       // '=>'

    // Single character tokens
    Plus,      // '+'
    Minus,     // '-'
    Star,      // '*'
    Slash,     // '/'
    LAngle,    // '<'
    RAngle,    // '>'
    Colon,     // ':'
    Semicolon, // ';'
    Comma,     // ','
    Period,    // '.'
    LParen,    // '('
    RParen,    // ')'
    LBracket,  // '['
    RBracket,  // ']'

    // Keywords
    KwClass,   // "class"
    KwExtends, // "extends"
    KwIs,      // "is"
    KwEnd,     // "end"
    KwVar,     // "var"
    KwMethod,  // "method"
    KwThis,    // "this"
    KwIf,      // "if"
    KwThen,    // "then"
    KwElse,    // "else"
    KwWhile,   // "while"
    KwLoop,    // "loop"
    KwReturn,  // "return"
    KwBreak,   // "break"

    // Identifier
    Ident,

    // Literals
    IntLit,
    RealLit,
    BoolLit,
    StringLit,

    // Special
    Eof,
    Error, // text holds the message
}

impl TokenKind {
    /// Binding power of a binary operator, `None` for everything else
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Star | TokenKind::Slash => Some(3),
            TokenKind::Plus | TokenKind::Minus => Some(2),
            TokenKind::RAngle
            | TokenKind::LAngle
            | TokenKind::RAngleEqual
            | TokenKind::LAngleEqual
            | TokenKind::EqualEqual
            | TokenKind::ExclEqual => Some(1),
            _ => None,
        }
    }
}

/// Source position, 1-based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Pos { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
