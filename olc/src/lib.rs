pub mod analyze;
pub mod compile;
pub mod error;
pub mod grammer;
pub mod optimize;
pub mod util;

pub use analyze::{Analysis, Analyzer, Diagnostic, Severity};
pub use compile::{compile, Artifact};
pub use error::Error;
pub use grammer::ast::Program;
pub use grammer::lexer::Lexer;
pub use grammer::parsercore::Parser;
pub use optimize::optimize;

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub optimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Result of running the whole pipeline on one source
#[derive(Debug)]
pub enum Outcome {
    /// Analysis was clean and code was generated
    Compiled(Analysis, Artifact),
    /// Analysis reported diagnostics; later stages were skipped
    Rejected(Analysis),
}

pub fn parse(code: &str) -> Result<Program, Error> {
    Parser::new(Lexer::new(code)).parse()
}

/// Intermediate results of `build_with`, in pipeline order
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Parsed(&'a Program),
    Analyzed(&'a Analysis),
    /// Only when optimization is enabled
    Optimized(&'a Program),
    /// The program handed to code generation
    Compiling(&'a Program),
}

/// Parse, analyze, optimize (when enabled) and compile `code`
pub fn build(code: &str, options: CompileOptions) -> Result<Outcome, Error> {
    build_with(code, options, |_| {})
}

/// `build`, reporting every stage that was reached to `observe`
pub fn build_with(
    code: &str,
    options: CompileOptions,
    mut observe: impl FnMut(Stage<'_>),
) -> Result<Outcome, Error> {
    let program = parse(code)?;
    observe(Stage::Parsed(&program));

    let analysis = Analyzer::analyze(&program);
    observe(Stage::Analyzed(&analysis));
    if !analysis.is_clean() {
        return Ok(Outcome::Rejected(analysis));
    }

    let program = if options.optimize {
        let program = optimize(program);
        observe(Stage::Optimized(&program));
        program
    } else {
        program
    };

    observe(Stage::Compiling(&program));
    let artifact = compile(&program)?;
    Ok(Outcome::Compiled(analysis, artifact))
}
