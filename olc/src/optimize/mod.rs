mod fold;

pub use fold::fold;

use crate::grammer::ast::{ClassDecl, Member, MethodDecl, Program, Stmt, StmtKind, VarDecl};

/// Constant folding, dead branch removal and pruning after `return`.
/// Only valid on a program that passed analysis without diagnostics.
pub fn optimize(program: Program) -> Program {
    Program {
        classes: program.classes.into_iter().map(optimize_class).collect(),
    }
}

fn optimize_class(class: ClassDecl) -> ClassDecl {
    let members = class
        .members
        .into_iter()
        .map(|member| match member {
            Member::Var(var) => Member::Var(VarDecl {
                init: fold(var.init),
                ..var
            }),
            Member::Method(method) => Member::Method(MethodDecl {
                body: optimize_block(method.body),
                ..method
            }),
        })
        .collect();

    ClassDecl {
        init: optimize_block(class.init),
        members,
        ..class
    }
}

pub fn optimize_block(stmts: Vec<Stmt>) -> Vec<Stmt> {
    let mut out = Vec::with_capacity(stmts.len());

    for stmt in stmts {
        let pos = stmt.pos;
        match stmt.kind {
            StmtKind::Var(name, init) => {
                out.push(Stmt::new(StmtKind::Var(name, fold(init)), pos));
            }
            StmtKind::Assign(target, value) => {
                out.push(Stmt::new(StmtKind::Assign(target, fold(value)), pos));
            }
            StmtKind::If(cond, then, other) => {
                let cond = fold(cond);
                let then = optimize_block(then);
                let other = other.map(optimize_block);
                match cond.as_bool() {
                    Some(true) => out.extend(then),
                    Some(false) => out.extend(other.unwrap_or_default()),
                    None => out.push(Stmt::new(StmtKind::If(cond, then, other), pos)),
                }
            }
            StmtKind::While(cond, body) => {
                let cond = fold(cond);
                if cond.as_bool() != Some(false) {
                    out.push(Stmt::new(StmtKind::While(cond, optimize_block(body)), pos));
                }
            }
            StmtKind::Return(value) => {
                out.push(Stmt::new(StmtKind::Return(fold(value)), pos));
            }
            StmtKind::Break => out.push(Stmt::new(StmtKind::Break, pos)),
            StmtKind::Expr(expr) => out.push(Stmt::new(StmtKind::Expr(fold(expr)), pos)),
        }

        // Everything after an unconditional return is unreachable
        if out
            .last()
            .is_some_and(|stmt| matches!(stmt.kind, StmtKind::Return(_)))
        {
            break;
        }
    }
    out
}
