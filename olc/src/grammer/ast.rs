use super::token::{Pos, TokenKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDecl>, // { class-decl }
}

// "class" ident [ "extends" ident ] "is" [ this-block ] { member } "end"
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub base: Option<String>,
    pub init: Vec<Stmt>, // "this" "is" { stmt } "end"
    pub members: Vec<Member>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Var(VarDecl),       // "var" ident ":" expr
    Method(MethodDecl), // "method" ident [ "(" params ")" ] [ ":" type ] "is" { stmt } "end"
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub init: Expr,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeRef>,
    pub body: Vec<Stmt>,
    pub pos: Pos,
}

// ident ":" type
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub pos: Pos,
}

// ident [ "[" type { "," type } "]" ]
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Var(String, Expr),                          // "var" ident ":" expr
    Assign(Expr, Expr),                         // ident ":=" expr
    If(Expr, Vec<Stmt>, Option<Vec<Stmt>>),     // "if" expr "then" { stmt } [ "else" { stmt } ] "end"
    While(Expr, Vec<Stmt>),                     // "while" expr "loop" { stmt } "end"
    Return(Expr),                               // "return" expr
    Break,                                      // "break"
    Expr(Expr),                                 // expr
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Ident(String, Vec<TypeRef>),            // ident [ "[" type { "," type } "]" ]
    This,                                   // "this"
    IntLit(String),                         // int-lit
    RealLit(String),                        // real-lit
    BoolLit(bool),                          // "true" | "false"
    Binary(BinaryOp, Box<Expr>, Box<Expr>), // expr binop expr
    Member(Box<Expr>, String),              // expr "." ident
    Call(Box<Expr>, Vec<Expr>),             // expr "(" [ expr { "," expr } ] ")"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add, // "+"
    Sub, // "-"
    Mul, // "*"
    Div, // "/"
    Gt,  // ">"
    Lt,  // "<"
    Ge,  // ">="
    Le,  // "<="
    Eq,  // "=="
    Ne,  // "!="
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::RAngle => Some(BinaryOp::Gt),
            TokenKind::LAngle => Some(BinaryOp::Lt),
            TokenKind::RAngleEqual => Some(BinaryOp::Ge),
            TokenKind::LAngleEqual => Some(BinaryOp::Le),
            TokenKind::EqualEqual => Some(BinaryOp::Eq),
            TokenKind::ExclEqual => Some(BinaryOp::Ne),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }

    pub fn is_comparison(&self) -> bool {
        !self.is_arithmetic()
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Expr { kind, pos }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ExprKind::BoolLit(value) => Some(value),
            _ => None,
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Pos) -> Self {
        Stmt { kind, pos }
    }
}

impl ClassDecl {
    pub fn fields(&self) -> impl Iterator<Item = &VarDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Var(var) => Some(var),
            Member::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            Member::Var(_) => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().find(|method| method.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields().any(|field| field.name == name)
    }
}

impl Program {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|class| class.name == name)
    }
}

impl TypeRef {
    /// Structural equality, ignoring positions
    pub fn same_as(&self, other: &TypeRef) -> bool {
        self.name == other.name
            && self.args.len() == other.args.len()
            && self.args.iter().zip(&other.args).all(|(a, b)| a.same_as(b))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "[")?;
            for (idx, arg) in self.args.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
