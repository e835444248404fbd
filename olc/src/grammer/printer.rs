use super::ast::{ClassDecl, Expr, ExprKind, Member, MethodDecl, Program, Stmt, StmtKind};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

// Renders the tree back to source text that parses to the same shape.
// Binary sub-expressions are always parenthesised.

const INDENT: &str = "    ";

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, class) in self.classes.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", class)?;
        }
        Ok(())
    }
}

impl Display for ClassDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)?;
        if let Some(base) = &self.base {
            write!(f, " extends {}", base)?;
        }
        writeln!(f, " is")?;
        if !self.init.is_empty() {
            writeln!(f, "{}this is", INDENT)?;
            write_block(f, &self.init, 2)?;
            writeln!(f, "{}end", INDENT)?;
        }
        for member in &self.members {
            match member {
                Member::Var(var) => writeln!(f, "{}var {} : {}", INDENT, var.name, var.init)?,
                Member::Method(method) => write_method(f, method)?,
            }
        }
        writeln!(f, "end")
    }
}

fn write_method(f: &mut Formatter<'_>, method: &MethodDecl) -> fmt::Result {
    write!(f, "{}method {}", INDENT, method.name)?;
    if !method.params.is_empty() {
        let params = method
            .params
            .iter()
            .map(|param| format!("{} : {}", param.name, param.ty))
            .join(", ");
        write!(f, "({})", params)?;
    }
    if let Some(ret) = &method.ret {
        write!(f, " : {}", ret)?;
    }
    writeln!(f, " is")?;
    write_block(f, &method.body, 2)?;
    writeln!(f, "{}end", INDENT)
}

fn write_block(f: &mut Formatter<'_>, stmts: &[Stmt], depth: usize) -> fmt::Result {
    for stmt in stmts {
        write_stmt(f, stmt, depth)?;
    }
    Ok(())
}

fn write_stmt(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    match &stmt.kind {
        StmtKind::Var(name, init) => writeln!(f, "{}var {} : {}", pad, name, init),
        StmtKind::Assign(target, value) => writeln!(f, "{}{} := {}", pad, target, value),
        StmtKind::If(cond, then, other) => {
            writeln!(f, "{}if {} then", pad, cond)?;
            write_block(f, then, depth + 1)?;
            if let Some(other) = other {
                writeln!(f, "{}else", pad)?;
                write_block(f, other, depth + 1)?;
            }
            writeln!(f, "{}end", pad)
        }
        StmtKind::While(cond, body) => {
            writeln!(f, "{}while {} loop", pad, cond)?;
            write_block(f, body, depth + 1)?;
            writeln!(f, "{}end", pad)
        }
        StmtKind::Return(value) => writeln!(f, "{}return {}", pad, value),
        StmtKind::Break => writeln!(f, "{}break", pad),
        StmtKind::Expr(expr) => writeln!(f, "{}{}", pad, expr),
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Ident(name, generics) => {
                write!(f, "{}", name)?;
                if !generics.is_empty() {
                    write!(f, "[{}]", generics.iter().join(", "))?;
                }
                Ok(())
            }
            ExprKind::This => write!(f, "this"),
            ExprKind::IntLit(text) | ExprKind::RealLit(text) => write!(f, "{}", text),
            ExprKind::BoolLit(value) => write!(f, "{}", value),
            ExprKind::Binary(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            ExprKind::Member(target, name) => write!(f, "{}.{}", target, name),
            ExprKind::Call(callee, args) => write!(f, "{}({})", callee, args.iter().join(", ")),
        }
    }
}
