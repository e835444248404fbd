use arch::inst::Label;
use olc::error::Error;
use olc::{build, compile, parse, Artifact, CompileOptions, Outcome};

fn artifact(code: &str, options: CompileOptions) -> Artifact {
    println!("{}", code);
    match build(code, options) {
        Ok(Outcome::Compiled(_, artifact)) => {
            print!("{}", artifact);
            artifact
        }
        Ok(Outcome::Rejected(analysis)) => panic!("rejected: {:?}", analysis.messages()),
        Err(err) => panic!("{}", err.located()),
    }
}

fn assert(code: &str, class: &str, method: &str, expected: &[&str], options: CompileOptions) {
    let artifact = artifact(code, options);
    let Some(method) = artifact.method(class, method) else {
        panic!("no method {}.{}", class, method);
    };
    let found: Vec<_> = method.code.iter().map(|inst| inst.to_string()).collect();
    assert_eq!(found, expected);
}

fn assert_err(code: &str) -> Error {
    println!("{}", code);
    match build(code, CompileOptions::default()) {
        Err(err) => {
            println!("{}", err.located());
            err
        }
        Ok(Outcome::Rejected(analysis)) => panic!("rejected: {:?}", analysis.messages()),
        Ok(Outcome::Compiled(_, artifact)) => panic!("compiled:\n{}", artifact),
    }
}

macro_rules! case {
    ($name:ident, $code:expr, $class:literal . $method:literal, [$($inst:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            assert($code, $class, $method, &[$($inst),*], CompileOptions::default());
        }
    };
    ($name:ident, $code:expr, $class:literal . $method:literal, unoptimized [$($inst:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            assert($code, $class, $method, &[$($inst),*], CompileOptions { optimize: false });
        }
    };
}

case!(
    folded_local,
    "class A is method main is var x : 2 + 3 end end",
    "A"."main",
    ["ldc 5", "stloc 0", "ret"]
);
case!(
    unfolded_local,
    "class A is method main is var x : 2 + 3 end end",
    "A"."main",
    unoptimized ["ldc 2", "ldc 3", "add", "stloc 0", "ret"]
);
case!(
    field_initializers,
    "class A is var x : 1 var y : 2.5 end",
    "A"."this",
    ["ldthis", "ldc 1", "stfld A::x", "ldthis", "ldc 2.5", "stfld A::y", "ret"]
);
case!(
    init_block_after_fields,
    "class A is this is x := 3 end var x : 0 end",
    "A"."this",
    ["ldthis", "ldc 0", "stfld A::x", "ldthis", "ldc 3", "stfld A::x", "ret"]
);
case!(
    params,
    "class A is method f(a : Integer, b : Integer) : Integer is return a * b end end",
    "A"."f",
    ["ldloc 0", "ldloc 1", "mul", "ret"]
);
case!(
    widen_left,
    "class A is method f(a : Integer) : Real is return a + 1.5 end end",
    "A"."f",
    ["ldloc 0", "widen", "ldc 1.5", "add", "ret"]
);
case!(
    widen_right,
    "class A is method f(a : Real) : Real is return a / 2 end end",
    "A"."f",
    ["ldloc 0", "ldc 2", "widen", "div", "ret"]
);
case!(
    widen_local,
    "class A is method main is var r : 0.5 var s : 1 + r end end",
    "A"."main",
    ["ldc 0.5", "stloc 0", "ldc 1", "widen", "ldloc 0", "add", "stloc 1", "ret"]
);
case!(
    greater_equal,
    "class A is method f(a : Integer) : Boolean is return a >= 1 end end",
    "A"."f",
    ["ldloc 0", "ldc 1", "clt", "ldc 0", "ceq", "ret"]
);
case!(
    less_equal,
    "class A is method f(a : Integer) : Boolean is return a <= 1 end end",
    "A"."f",
    ["ldloc 0", "ldc 1", "cgt", "ldc 0", "ceq", "ret"]
);
case!(
    not_equal,
    "class A is method f(a : Integer) : Boolean is return a != 1 end end",
    "A"."f",
    ["ldloc 0", "ldc 1", "ceq", "ldc 0", "ceq", "ret"]
);
case!(
    if_else,
    "class A is method f(a : Integer) is if a > 0 then write(1) else write(2) end end end",
    "A"."f",
    [
        "ldloc 0", "ldc 0", "cgt", "brfalse L0000",
        "ldc 1", "call write/1", "br L0001",
        "L0000:",
        "ldc 2", "call write/1",
        "L0001:",
        "ret"
    ]
);
case!(
    while_break,
    "class A is method main is var i : 0 while i < 10 loop if i == 5 then break end i := i + 1 end end end",
    "A"."main",
    [
        "ldc 0", "stloc 0",
        "L0000:",
        "ldloc 0", "ldc 10", "clt", "brfalse L0001",
        "ldloc 0", "ldc 5", "ceq", "brfalse L0002",
        "br L0001",
        "br L0003",
        "L0002:",
        "L0003:",
        "ldloc 0", "ldc 1", "add", "stloc 0",
        "br L0000",
        "L0001:",
        "ret"
    ]
);
case!(
    shadowed_local,
    "class A is method main is var x : 1 while x < 3 loop var x : 2 break end write(x) end end",
    "A"."main",
    [
        "ldc 1", "stloc 0",
        "L0000:",
        "ldloc 0", "ldc 3", "clt", "brfalse L0001",
        "ldc 2", "stloc 1",
        "br L0001",
        "br L0000",
        "L0001:",
        "ldloc 0", "call write/1",
        "ret"
    ]
);
case!(
    shadowed_param,
    "class A is method f(a : Integer) : Integer is if a > 0 then var a : 5 end return a end end",
    "A"."f",
    [
        "ldloc 0", "ldc 0", "cgt", "brfalse L0000",
        "ldc 5", "stloc 1",
        "br L0001",
        "L0000:",
        "L0001:",
        "ldloc 0", "ret"
    ]
);
case!(
    sibling_blocks_get_their_own_slots,
    "class A is method f(c : Boolean) is if c then var t : 1 write(t) else var t : 2.5 write(t) end end end",
    "A"."f",
    [
        "ldloc 0", "brfalse L0000",
        "ldc 1", "stloc 1", "ldloc 1", "call write/1",
        "br L0001",
        "L0000:",
        "ldc 2.5", "stloc 2", "ldloc 2", "call write/1",
        "L0001:",
        "ret"
    ]
);
case!(
    field_assign,
    "class A is var x : 0 method inc is x := x + 1 end end",
    "A"."inc",
    ["ldthis", "ldthis", "ldfld A::x", "ldc 1", "add", "stfld A::x", "ret"]
);
case!(
    inherited_field,
    "class A is var x : 0 end class B extends A is method f is write(x) end end",
    "B"."f",
    ["ldthis", "ldfld A::x", "call write/1", "ret"]
);
case!(
    this_member,
    "class A is var x : 1 method f : Integer is return this.x end end",
    "A"."f",
    ["ldthis", "ldfld A::x", "ret"]
);
case!(
    param_shadows_field,
    "class A is var x : 1 method f(x : Integer) : Integer is return x end end",
    "A"."f",
    ["ldloc 0", "ret"]
);
case!(
    builtin_plus,
    "class A is method f(a : Integer) : Integer is return a.Plus(2) end end",
    "A"."f",
    ["ldloc 0", "ldc 2", "add", "ret"]
);
case!(
    builtin_mixed,
    "class A is method f(a : Integer) : Real is return a.Plus(1.5) end end",
    "A"."f",
    ["ldloc 0", "widen", "ldc 1.5", "add", "ret"]
);
case!(
    builtin_not,
    "class A is method f(b : Boolean) : Boolean is return b.Not() end end",
    "A"."f",
    ["ldloc 0", "ldc 0", "ceq", "ret"]
);
case!(
    builtin_conversion,
    "class A is method f(a : Real) : Integer is return a.toInteger() end end",
    "A"."f",
    ["ldloc 0", "narrow", "ret"]
);
case!(
    real_constructor,
    "class A is method f(a : Integer) : Real is return Real(a) end end",
    "A"."f",
    ["ldloc 0", "widen", "ret"]
);
case!(
    integer_constructor,
    "class A is method main is var i : Integer(2.5) end end",
    "A"."main",
    ["ldc 2.5", "narrow", "stloc 0", "ret"]
);
case!(
    discarded_value,
    "class A is method main is var x : 1 x.Plus(2) end end",
    "A"."main",
    ["ldc 1", "stloc 0", "ldloc 0", "ldc 2", "add", "pop", "ret"]
);
case!(
    explicit_return,
    "class A is method f : Integer is return 7 end end",
    "A"."f",
    ["ldc 7", "ret"]
);
case!(
    pruned_after_return,
    "class A is method f : Integer is return 1 write(2) end end",
    "A"."f",
    ["ldc 1", "ret"]
);

#[test]
fn entry_is_first_main() {
    let artifact = artifact(
        "class A is end class B is method main is end end class C is method main is end end",
        CompileOptions::default(),
    );
    assert_eq!(artifact.entry, "B.main");
    assert!(artifact.class("Program").is_none());
}

#[test]
fn default_entry() {
    let artifact = artifact("class A is method f is end end", CompileOptions::default());
    assert_eq!(artifact.entry, "Program.Main");
    let main = artifact.method("Program", "Main").expect("default entry");
    let code: Vec<_> = main.code.iter().map(|inst| inst.to_string()).collect();
    assert_eq!(code, vec!["ldc 0", "ret"]);
}

#[test]
fn labels_are_unique_across_methods() {
    let artifact = artifact(
        "class A is method f(a : Integer) is if a > 0 then write(1) end end method g(a : Integer) is if a > 0 then write(2) end end end",
        CompileOptions::default(),
    );
    let f = artifact.method("A", "f").unwrap();
    let g = artifact.method("A", "g").unwrap();
    assert!(f.labels.contains_left(&Label("L0000".into())));
    assert!(g.labels.contains_left(&Label("L0002".into())));
    assert_eq!(g.labels.get_by_left(&Label("L0003".into())), Some(&g.code.len().saturating_sub(2)));
}

#[test]
fn slots_in_listing() {
    let artifact = artifact(
        "class A is method f(a : Integer) is var x : a end end",
        CompileOptions::default(),
    );
    let listing = artifact.to_string();
    assert!(listing.contains(".class A\n"));
    assert!(listing.contains("  .method f(a)\n  .locals [0: a, 1: x]\n    ldloc 0\n    stloc 1\n    ret\n"));
    assert!(listing.ends_with(".entry Program.Main\n"));
}

#[test]
fn yaml_dump() {
    let artifact = artifact("class A is method main is end end", CompileOptions::default());
    let yaml = serde_yaml::to_string(&artifact).unwrap();
    assert!(yaml.contains("entry: A.main"));
}

#[test]
fn unsupported_call() {
    let err = assert_err("class A is method g is end method main is g() end end");
    assert!(matches!(err, Error::UnsupportedCall(ref name, _) if name == "g"));
}

#[test]
fn unsupported_member() {
    let err = assert_err("class A is method g is end method main is var y : this.g end end");
    assert!(matches!(err, Error::UnsupportedMember(ref text, _) if text == "this.g"));
}

#[test]
fn builtin_arity() {
    let err = assert_err("class A is method f(a : Integer) : Integer is return a.Plus() end end");
    assert!(matches!(err, Error::UnsupportedCall(ref text, _) if text == "a.Plus"));
}

#[test]
fn integer_literal_out_of_range() {
    let err = assert_err("class A is method main is var x : 99999999999999999999 end end");
    assert!(matches!(err, Error::InvalidLiteral(ref text, _) if text == "99999999999999999999"));
}

#[test]
fn assign_target_unchecked_by_analysis() {
    let program = parse("class A is var x : 1 method main is this.x := 2 end end").unwrap();
    let err = compile(&program).unwrap_err();
    assert!(matches!(err, Error::InvalidAssignTarget(_)));
}
