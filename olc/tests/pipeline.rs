use olc::error::Error;
use olc::grammer::token::Pos;
use olc::{build, build_with, CompileOptions, Outcome, Stage};

const PROGRAM: &str = "\
// Counts up to a limit and prints every even number
class Counter is
    var limit : 2 * 5
    var step : 1

    method main is
        var i : 0
        while i < limit loop
            if i / 2 * 2 == i then
                write(i)
            end
            i := i + step
        end
    end
end

class Scaled extends Counter is
    var factor : 1.5

    method scale(x : Integer) : Real is
        return x * factor
    end
end
";

#[test]
fn full_program() {
    let Outcome::Compiled(analysis, artifact) = build(PROGRAM, CompileOptions::default()).unwrap()
    else {
        panic!("program was rejected");
    };
    assert!(analysis.is_clean());
    assert_eq!(analysis.annotations.get("Counter.limit").map(String::as_str), Some("Integer"));
    assert_eq!(analysis.annotations.get("Scaled.factor").map(String::as_str), Some("Real"));

    assert_eq!(artifact.entry, "Counter.main");
    assert_eq!(artifact.classes.len(), 2);

    let init: Vec<_> = artifact
        .method("Counter", "this")
        .unwrap()
        .code
        .iter()
        .map(|inst| inst.to_string())
        .collect();
    assert_eq!(init[..3], ["ldthis", "ldc 10", "stfld Counter::limit"]);

    let scale: Vec<_> = artifact
        .method("Scaled", "scale")
        .unwrap()
        .code
        .iter()
        .map(|inst| inst.to_string())
        .collect();
    assert_eq!(
        scale,
        ["ldloc 0", "widen", "ldthis", "ldfld Scaled::factor", "mul", "ret"]
    );

    let scaled = artifact.class("Scaled").unwrap();
    assert_eq!(scaled.base.as_deref(), Some("Counter"));
    assert_eq!(scaled.fields, ["factor"]);
}

#[test]
fn rejected_by_analysis() {
    let outcome = build("class A extends A is end", CompileOptions::default()).unwrap();
    let Outcome::Rejected(analysis) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(
        analysis.messages(),
        ["[Line 1:1] Class cannot extend itself: A"]
    );
}

#[test]
fn warnings_stop_compilation() {
    let outcome = build(
        "class A is method main is while true loop write(1) end end end",
        CompileOptions::default(),
    )
    .unwrap();
    assert!(matches!(outcome, Outcome::Rejected(_)));

    let outcome = build(
        "class A is method main is while true loop write(1) break end end end",
        CompileOptions::default(),
    )
    .unwrap();
    assert!(matches!(outcome, Outcome::Compiled(..)));
}

#[test]
fn parse_error_stops_everything() {
    let err = build(
        "class A is\n  method main is\n    x := y + ;\n  end\nend",
        CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::IncompleteBinary(_, pos) if pos == Pos::new(3, 12)));
    assert_eq!(
        err.located(),
        "[Line 3:12] Incomplete binary expression: expected right operand after '+'"
    );
}

#[test]
fn optimization_is_optional() {
    let code = "class A is method main is var x : 4 * 4 end end";
    let count = |options| match build(code, options).unwrap() {
        Outcome::Compiled(_, artifact) => artifact.method("A", "main").unwrap().code.len(),
        Outcome::Rejected(analysis) => panic!("{:?}", analysis.messages()),
    };
    assert_eq!(count(CompileOptions::default()), 3);
    assert_eq!(count(CompileOptions { optimize: false }), 5);
}

fn stages(code: &str, options: CompileOptions) -> Vec<&'static str> {
    let mut reached = Vec::new();
    let _ = build_with(code, options, |stage| {
        reached.push(match stage {
            Stage::Parsed(_) => "parsed",
            Stage::Analyzed(_) => "analyzed",
            Stage::Optimized(_) => "optimized",
            Stage::Compiling(_) => "compiling",
        })
    });
    reached
}

#[test]
fn stages_in_order() {
    let code = "class A is method main is write(1 + 2) end end";
    assert_eq!(
        stages(code, CompileOptions::default()),
        ["parsed", "analyzed", "optimized", "compiling"]
    );
    assert_eq!(
        stages(code, CompileOptions { optimize: false }),
        ["parsed", "analyzed", "compiling"]
    );
    assert_eq!(
        stages("class A extends A is end", CompileOptions::default()),
        ["parsed", "analyzed"]
    );
    assert!(stages("class A is", CompileOptions::default()).is_empty());
}

#[test]
fn compiling_sees_the_optimized_program() {
    let mut printed = String::new();
    build_with(
        "class A is var x : 2 * 3 end",
        CompileOptions::default(),
        |stage| {
            if let Stage::Compiling(program) = stage {
                printed = program.to_string();
            }
        },
    )
    .unwrap();
    assert!(printed.contains("var x : 6"), "{}", printed);
}
