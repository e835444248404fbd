use strum::{Display, EnumString};

/// Name of the output routine, called as `write(x)`
pub const WRITE: &str = "write";

/// Operation vocabulary of the runtime value library.
/// The compiler only needs the names; each one lowers to primitive instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
pub enum Builtin {
    Plus,
    Minus,
    Mult,
    Div,
    Rem,
    Equal,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Xor,
    Not,
    #[strum(serialize = "toInteger")]
    ToInteger,
    #[strum(serialize = "toReal")]
    ToReal,
    #[strum(serialize = "toBoolean")]
    ToBoolean,
}

impl Builtin {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    /// Number of arguments besides the receiver
    pub fn arity(&self) -> usize {
        match self {
            Builtin::Not | Builtin::ToInteger | Builtin::ToReal | Builtin::ToBoolean => 0,
            _ => 1,
        }
    }

    /// Arithmetic operations take part in integer/real promotion
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Builtin::Plus | Builtin::Minus | Builtin::Mult | Builtin::Div | Builtin::Rem
        )
    }
}

/// Value kinds known to the compiler without a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
pub enum BuiltinType {
    Integer,
    Real,
    Boolean,
    Array,
    List,
    AnyValue,
    AnyRef,
}

impl BuiltinType {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    /// Number of generic arguments the type requires
    pub fn generic_arity(&self) -> usize {
        match self {
            BuiltinType::Array | BuiltinType::List => 1,
            _ => 0,
        }
    }

    /// Scalar kinds that have a constructor call form, e.g. `Integer(5)`
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            BuiltinType::Integer | BuiltinType::Real | BuiltinType::Boolean
        )
    }
}
