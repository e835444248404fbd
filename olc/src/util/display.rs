use crate::analyze::Analysis;
use crate::grammer::token::{Token, TokenKind};
use color_print::cprintln;

pub fn print_tokens(tokens: &[Token]) {
    println!("+-[Tokens]-+---------------------------------------------------------------");
    for token in tokens {
        match token.kind {
            TokenKind::Error => cprintln!("| {:>8} | <red>{:?}</> {}", token.pos.to_string(), token.kind, token.text),
            TokenKind::Eof => cprintln!("| {:>8} | <m>{:?}</>", token.pos.to_string(), token.kind),
            _ => cprintln!("| {:>8} | <g>{:?}</> {}", token.pos.to_string(), token.kind, token.text),
        }
    }
}

pub fn print_annotations(analysis: &Analysis) {
    println!("+-[Types]-+----------------------------------------------------------------");
    for (name, ty) in &analysis.annotations {
        cprintln!("| <b>{}</> : {}", name, ty);
    }
    let scopes = analysis.scopes;
    cprintln!(
        "| scopes entered <y>{}</>, exited <y>{}</>, max depth <y>{}</>",
        scopes.entered,
        scopes.exited,
        scopes.max_depth
    );
}
