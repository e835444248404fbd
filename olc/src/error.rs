use crate::grammer::token::Pos;
use thiserror::Error;

// Unified error type for the fatal stages (lexing, parsing, code generation)
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Lexical errors
    #[error("{0}")]
    Lexical(String, Pos),

    // Parse errors
    #[error("Unexpected end of file")]
    UnexpectedEOF(Pos),

    #[error("Unexpected token {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        pos: Pos,
    },

    #[error("Incomplete binary expression: expected right operand after '{0}'")]
    IncompleteBinary(String, Pos),

    #[error("Nesting is too deep")]
    TooDeep(Pos),

    // Code generation errors
    #[error("Unsupported call: {0}")]
    UnsupportedCall(String, Pos),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String, Pos),

    #[error("Unsupported member access: {0}")]
    UnsupportedMember(String, Pos),

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String, Pos),

    #[error("Invalid assignment target")]
    InvalidAssignTarget(Pos),

    #[error("Break statement outside of loop")]
    BreakOutsideLoop(Pos),
}

impl Error {
    pub fn pos(&self) -> Option<Pos> {
        match self {
            Error::Io(_) => None,
            Error::Lexical(_, pos)
            | Error::UnexpectedEOF(pos)
            | Error::UnexpectedToken { pos, .. }
            | Error::IncompleteBinary(_, pos)
            | Error::TooDeep(pos)
            | Error::UnsupportedCall(_, pos)
            | Error::InvalidLiteral(_, pos)
            | Error::UnsupportedMember(_, pos)
            | Error::UnknownIdentifier(_, pos)
            | Error::InvalidAssignTarget(pos)
            | Error::BreakOutsideLoop(pos) => Some(*pos),
        }
    }

    /// "[Line L:C] message", the same shape as analyzer diagnostics
    pub fn located(&self) -> String {
        match self.pos() {
            Some(pos) => format!("[Line {}:{}] {}", pos.line, pos.col, self),
            None => self.to_string(),
        }
    }
}
