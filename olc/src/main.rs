use clap::Parser;
use olc::analyze::Analysis;
use olc::error::Error;
use olc::grammer::lexer::Lexer;
use olc::{build_with, CompileOptions, Outcome, Stage};
use olc::util::diag::{report, Msg};
use olc::util::display::{print_annotations, print_tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Emit {
    /// Plain text listing
    Listing,
    /// Structured YAML dump of the artifact
    Yaml,
}

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Input files
    #[clap(default_value = "main.o")]
    input: Vec<String>,

    /// Output file (only with a single input)
    #[clap(short, long)]
    output: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value = "listing")]
    emit: Emit,

    /// Skip constant folding and dead code elimination
    #[clap(long)]
    no_optimize: bool,

    /// Print tokens
    #[clap(long)]
    tokens: bool,

    /// Print the parsed program
    #[clap(long)]
    ast: bool,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if args.output.is_some() && args.input.len() > 1 {
        Msg::Error("--output cannot be used with multiple inputs".to_string()).print();
        std::process::exit(1);
    }

    for input in &args.input {
        if !compile_file(&args, input) {
            std::process::exit(1);
        }
    }
}

/// Compile one file; false when any stage fails
fn compile_file(args: &Args, input: &str) -> bool {
    let source = match std::fs::read_to_string(input).map_err(Error::from) {
        Ok(source) => source,
        Err(err) => {
            Msg::from(&err).print();
            Msg::Note(format!("while reading {}", input)).print();
            return false;
        }
    };

    println!("1. Parse {}", input);
    if args.tokens || args.verbose {
        let tokens: Vec<_> = Lexer::new(&source).collect();
        print_tokens(&tokens);
    }
    let show_ast = args.ast || args.verbose;
    let options = CompileOptions {
        optimize: !args.no_optimize,
    };
    let outcome = build_with(&source, options, |stage| match stage {
        Stage::Parsed(program) if show_ast => print!("{}", program),
        Stage::Parsed(_) => {}
        Stage::Analyzed(analysis) => {
            println!("2. Analyze");
            if args.verbose {
                print_annotations(analysis);
            }
        }
        Stage::Optimized(program) => {
            println!("3. Optimize");
            if show_ast {
                print!("{}", program);
            }
        }
        Stage::Compiling(_) => println!("4. Compile"),
    });

    let artifact = match outcome {
        Ok(Outcome::Compiled(_, artifact)) => artifact,
        Ok(Outcome::Rejected(analysis)) => {
            print_diagnostics(&analysis, input, &source);
            return false;
        }
        Err(err) => {
            report(&err, input, &source);
            return false;
        }
    };
    if args.verbose {
        print!("{}", artifact.listing());
    }

    let text = match args.emit {
        Emit::Listing => artifact.to_string(),
        Emit::Yaml => match serde_yaml::to_string(&artifact) {
            Ok(text) => text,
            Err(err) => {
                Msg::Error(format!("Failed to serialize artifact: {}", err)).print();
                return false;
            }
        },
    };
    let output = args.output.clone().unwrap_or_else(|| match args.emit {
        Emit::Listing => format!("{}.il", input),
        Emit::Yaml => format!("{}.yaml", input),
    });
    if let Err(err) = std::fs::write(&output, text) {
        Msg::Error(format!("Failed to write {}: {}", output, err)).print();
        return false;
    }

    Msg::Note(format!("Successfully compiled {} to {}", input, output)).print();
    true
}

fn print_diagnostics(analysis: &Analysis, input: &str, source: &str) {
    for diag in &analysis.diagnostics {
        Msg::from(diag).diag(input, source, diag.pos);
    }
    let errors = analysis.errors().count();
    let warnings = analysis.diagnostics.len() - errors;
    Msg::Note(format!(
        "{} error(s), {} warning(s); stopping before code generation",
        errors, warnings
    ))
    .print();
}
