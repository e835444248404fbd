use color_print::cformat;
use serde::Serialize;
use std::fmt;

/// Constant operand of `Inst::Const`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{:?}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Branch target, unique within one compilation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Label(pub String);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stack machine instruction.
/// Comparisons push 1 or 0; `JumpIfFalse` branches when the popped value is 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inst {
    Const(Value),

    LoadLocal(usize),
    StoreLocal(usize),
    LoadThis,
    LoadField(String, String), // class, field
    StoreField(String, String), // class, field

    Add,
    Sub,
    Mul,
    Rem,
    Div,

    Eq,
    Gt,
    Lt,

    And,
    Or,
    Xor,

    Widen,  // int -> real
    Narrow, // real -> int

    Label(Label),
    Jump(Label),
    JumpIfFalse(Label),

    Call(String, usize), // routine, argc
    Pop,
    Ret,
}

impl Inst {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Inst::Const(_) => "ldc",
            Inst::LoadLocal(_) => "ldloc",
            Inst::StoreLocal(_) => "stloc",
            Inst::LoadThis => "ldthis",
            Inst::LoadField(_, _) => "ldfld",
            Inst::StoreField(_, _) => "stfld",
            Inst::Add => "add",
            Inst::Sub => "sub",
            Inst::Mul => "mul",
            Inst::Rem => "rem",
            Inst::Div => "div",
            Inst::Eq => "ceq",
            Inst::Gt => "cgt",
            Inst::Lt => "clt",
            Inst::And => "and",
            Inst::Or => "or",
            Inst::Xor => "xor",
            Inst::Widen => "widen",
            Inst::Narrow => "narrow",
            Inst::Label(_) => "label",
            Inst::Jump(_) => "br",
            Inst::JumpIfFalse(_) => "brfalse",
            Inst::Call(_, _) => "call",
            Inst::Pop => "pop",
            Inst::Ret => "ret",
        }
    }

    pub fn cformat(&self) -> String {
        macro_rules! op {
            ($name:expr) => {
                cformat!("    <r>{:<8}</>", $name)
            };
            ($name:expr, $arg:expr) => {
                cformat!("    <r>{:<8}</><b>{}</>", $name, $arg)
            };
        }

        match self {
            Inst::Label(label) => cformat!("<g>{}:</>", label),
            Inst::Const(value) => cformat!("    <r>{:<8}</><y>{}</>", self.mnemonic(), value),
            Inst::LoadLocal(slot) | Inst::StoreLocal(slot) => op!(self.mnemonic(), slot),
            Inst::LoadField(class, field) | Inst::StoreField(class, field) => {
                op!(self.mnemonic(), format!("{}::{}", class, field))
            }
            Inst::Jump(label) | Inst::JumpIfFalse(label) => {
                cformat!("    <r>{:<8}</><g>{}</>", self.mnemonic(), label)
            }
            Inst::Call(name, argc) => op!(self.mnemonic(), format!("{}/{}", name, argc)),
            _ => op!(self.mnemonic()),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Label(label) => write!(f, "{}:", label),
            Inst::Const(value) => write!(f, "{} {}", self.mnemonic(), value),
            Inst::LoadLocal(slot) | Inst::StoreLocal(slot) => {
                write!(f, "{} {}", self.mnemonic(), slot)
            }
            Inst::LoadField(class, field) | Inst::StoreField(class, field) => {
                write!(f, "{} {}::{}", self.mnemonic(), class, field)
            }
            Inst::Jump(label) | Inst::JumpIfFalse(label) => {
                write!(f, "{} {}", self.mnemonic(), label)
            }
            Inst::Call(name, argc) => write!(f, "{} {}/{}", self.mnemonic(), name, argc),
            _ => write!(f, "{}", self.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_inst {
        ($($name:ident: $inst:expr => $text:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!($inst.to_string(), $text);
                }
            )*
        }
    }

    test_inst! {
        test_const_int: Inst::Const(Value::Int(5)) => "ldc 5",
        test_const_real: Inst::Const(Value::Real(2.0)) => "ldc 2.0",
        test_const_bool: Inst::Const(Value::Bool(true)) => "ldc true",
        test_ldloc: Inst::LoadLocal(3) => "ldloc 3",
        test_stloc: Inst::StoreLocal(0) => "stloc 0",
        test_ldfld: Inst::LoadField("A".into(), "x".into()) => "ldfld A::x",
        test_stfld: Inst::StoreField("A".into(), "x".into()) => "stfld A::x",
        test_add: Inst::Add => "add",
        test_ceq: Inst::Eq => "ceq",
        test_label: Inst::Label(Label("L0001".into())) => "L0001:",
        test_brfalse: Inst::JumpIfFalse(Label("L0002".into())) => "brfalse L0002",
        test_call: Inst::Call("write".into(), 1) => "call write/1",
        test_ret: Inst::Ret => "ret",
    }
}
