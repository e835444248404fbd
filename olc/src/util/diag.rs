use crate::analyze::{Diagnostic, Severity};
use crate::error::Error;
use crate::grammer::token::Pos;
use color_print::cprintln;

#[derive(Debug)]
pub enum Msg {
    Error(String),
    Warn(String),
    Note(String),
}

impl Msg {
    pub fn print(&self) {
        match self {
            Msg::Error(msg) => cprintln!("<red,bold>error</>: {}", msg),
            Msg::Warn(msg) => cprintln!("<yellow,bold>warn</>: {}", msg),
            Msg::Note(msg) => cprintln!("<green,bold>note</>: {}", msg),
        }
    }

    /// Banner followed by the offending source line and a caret under the column
    pub fn diag(&self, file: &str, source: &str, pos: Pos) {
        self.print();
        let raw = source.lines().nth(pos.line.saturating_sub(1)).unwrap_or("");
        let caret = " ".repeat(pos.col.saturating_sub(1));
        cprintln!("     <blue>--></> <underline>{}:{}:{}</>", file, pos.line, pos.col);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", pos.line, raw);
        cprintln!("      <blue>|</> {}<red,bold>^</>", caret);
    }
}

impl From<&Diagnostic> for Msg {
    fn from(diag: &Diagnostic) -> Self {
        match diag.severity {
            Severity::Error => Msg::Error(diag.message.clone()),
            Severity::Warning => Msg::Warn(diag.message.clone()),
        }
    }
}

impl From<&Error> for Msg {
    fn from(err: &Error) -> Self {
        Msg::Error(err.to_string())
    }
}

/// Print an error, with source context when it carries a position
pub fn report(err: &Error, file: &str, source: &str) {
    let msg = Msg::from(err);
    match err.pos() {
        Some(pos) => msg.diag(file, source, pos),
        None => msg.print(),
    }
}
