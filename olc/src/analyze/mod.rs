mod infer;
pub mod scope;
mod typeref;

use crate::grammer::ast::{ClassDecl, Expr, ExprKind, Member, MethodDecl, Program, Stmt, StmtKind};
use crate::grammer::token::Pos;
use arch::builtin::{BuiltinType, WRITE};
use indexmap::IndexMap;
use scope::{ScopeStats, Scopes, Symbol, SymbolKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One semantic finding, displayed as "[Line L:C] message"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub pos: Pos,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Line {}:{}] {}", self.pos.line, self.pos.col, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    /// Qualified name (`Class.field`, `Class.method.local`) -> inferred type name
    pub annotations: IndexMap<String, String>,
    pub scopes: ScopeStats,
}

impl Analysis {
    /// Later stages run only on a clean analysis
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == Severity::Error)
    }

    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|diag| diag.to_string()).collect()
    }
}

pub struct Analyzer<'a> {
    program: &'a Program,
    scopes: Scopes,
    diagnostics: Vec<Diagnostic>,
    annotations: IndexMap<String, String>,
    class: Option<&'a ClassDecl>,
    path: Vec<String>,
    inside_method: bool,
    loops: usize,
}

impl<'a> Analyzer<'a> {
    pub fn analyze(program: &'a Program) -> Analysis {
        let mut analyzer = Analyzer {
            program,
            scopes: Scopes::new(),
            diagnostics: Vec::new(),
            annotations: IndexMap::new(),
            class: None,
            path: Vec::new(),
            inside_method: false,
            loops: 0,
        };

        analyzer.with_scope(|a| {
            // Pass 1: class names
            for class in &program.classes {
                let symbol = Symbol {
                    kind: SymbolKind::Class,
                    pos: class.pos,
                };
                if !a.scopes.declare(&class.name, symbol) {
                    a.error(
                        class.pos,
                        format!("Duplicate class declaration: {}", class.name),
                    );
                }
            }

            // Pass 2: class bodies
            for class in &program.classes {
                a.visit_class(class);
            }
        });

        Analysis {
            diagnostics: analyzer.diagnostics,
            annotations: analyzer.annotations,
            scopes: analyzer.scopes.stats(),
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl Analyzer<'_> {
    /// Push a scope, run `f`, pop it again
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.enter();
        let result = f(self);
        self.scopes.exit();
        result
    }

    fn error(&mut self, pos: Pos, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            pos,
            severity: Severity::Error,
            message: message.into(),
        });
    }

    fn warn(&mut self, pos: Pos, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            pos,
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    fn annotate(&mut self, name: &str, ty: impl Into<String>) {
        let key = self
            .path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(".");
        self.annotations.insert(key, ty.into());
    }

    fn declare(&mut self, name: &str, kind: SymbolKind, pos: Pos, what: &str) {
        if !self.scopes.declare(name, Symbol { kind, pos }) {
            self.error(pos, format!("Duplicate {} declaration: {}", what, name));
        }
    }

    fn resolve(&mut self, name: &str, pos: Pos) {
        let known = self.scopes.lookup(name).is_some()
            || BuiltinType::parse(name).is_some()
            || name == WRITE
            || self.inherits(name);
        if !known {
            self.error(pos, format!("Undeclared identifier: {}", name));
        }
    }
}

// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

impl<'a> Analyzer<'a> {
    fn visit_class(&mut self, class: &'a ClassDecl) {
        self.class = Some(class);
        self.path = vec![class.name.clone()];

        self.with_scope(|a| {
            a.check_base(class);

            // Members are visible from every method body, whatever their order
            for member in &class.members {
                match member {
                    Member::Var(var) => a.declare(&var.name, SymbolKind::Variable, var.pos, "field"),
                    Member::Method(method) => {
                        a.declare(&method.name, SymbolKind::Method, method.pos, "method")
                    }
                }
            }

            for member in &class.members {
                match member {
                    Member::Var(var) => {
                        a.visit_expr(&var.init);
                        if let Some(ty) = a.infer(&var.init) {
                            a.scopes.set_type(&var.name, ty.clone());
                            a.annotate(&var.name, ty);
                        }
                    }
                    Member::Method(method) => a.visit_method(class, method),
                }
            }

            a.path = vec![class.name.clone(), "this".to_string()];
            a.visit_block(&class.init);
        });

        self.path.clear();
        self.class = None;
    }

    fn visit_method(&mut self, class: &'a ClassDecl, method: &'a MethodDecl) {
        self.path = vec![class.name.clone(), method.name.clone()];

        self.with_scope(|a| {
            a.inside_method = true;
            for param in &method.params {
                a.declare(&param.name, SymbolKind::Parameter, param.pos, "parameter");
                a.check_type(&param.ty);
                a.scopes.set_type(&param.name, param.ty.to_string());
                a.annotate(&param.name, param.ty.to_string());
            }
            if let Some(ret) = &method.ret {
                a.check_type(ret);
            }
            a.check_override(class, method);

            for stmt in &method.body {
                a.visit_stmt(stmt);
            }
            a.inside_method = false;
        });

        self.path = vec![class.name.clone()];
    }
}

// ----------------------------------------------------------------------------
// Statements and expressions
// ----------------------------------------------------------------------------

impl Analyzer<'_> {
    fn visit_block(&mut self, stmts: &[Stmt]) {
        self.with_scope(|a| {
            for stmt in stmts {
                a.visit_stmt(stmt);
            }
        });
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var(name, init) => {
                self.visit_expr(init);
                self.declare(name, SymbolKind::Variable, stmt.pos, "variable");
                if let Some(ty) = self.infer(init) {
                    self.scopes.set_type(name, ty.clone());
                    self.annotate(name, ty);
                }
            }

            StmtKind::Assign(target, value) => {
                self.visit_expr(value);
                let name = match &target.kind {
                    ExprKind::Ident(name, generics) if generics.is_empty() => name,
                    _ => {
                        self.error(target.pos, "Assignment target must be an identifier");
                        return;
                    }
                };
                self.resolve(name, target.pos);

                let expected = self.scopes.type_of(name).map(str::to_string);
                if let (Some(expected), Some(found)) = (expected, self.infer(value)) {
                    if expected != found {
                        self.error(
                            stmt.pos,
                            format!(
                                "Type mismatch in assignment to {}: expected {}, found {}",
                                name, expected, found
                            ),
                        );
                    }
                }
            }

            StmtKind::If(cond, then, other) => {
                self.visit_expr(cond);
                match cond.as_bool() {
                    Some(true) => self.warn(cond.pos, "Condition is always true, simplify"),
                    Some(false) => self.warn(cond.pos, "Condition is always false, dead code"),
                    None => {}
                }
                self.visit_block(then);
                if let Some(other) = other {
                    self.visit_block(other);
                }
            }

            StmtKind::While(cond, body) => {
                self.visit_expr(cond);
                if body.is_empty() {
                    self.warn(stmt.pos, "While loop has an empty body");
                }
                match cond.as_bool() {
                    Some(true) if !contains_break(body) => {
                        self.warn(stmt.pos, "Infinite loop detected: while(true) without break")
                    }
                    Some(false) => self.warn(
                        stmt.pos,
                        "While loop condition is always false, loop never executes",
                    ),
                    _ => {}
                }
                self.loops += 1;
                self.visit_block(body);
                self.loops -= 1;
            }

            StmtKind::Return(value) => {
                if !self.inside_method {
                    self.error(stmt.pos, "Return statement outside of method");
                }
                self.visit_expr(value);
            }

            StmtKind::Break => {
                if self.loops == 0 {
                    self.error(stmt.pos, "Break statement outside of loop");
                }
            }

            StmtKind::Expr(expr) => self.visit_expr(expr),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(name, _) => self.resolve(name, expr.pos),
            ExprKind::This | ExprKind::IntLit(_) | ExprKind::RealLit(_) | ExprKind::BoolLit(_) => {}
            ExprKind::Binary(_, lhs, rhs) => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
            ExprKind::Member(target, _) => self.visit_expr(target),
            ExprKind::Call(callee, args) => {
                self.visit_expr(callee);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
        }
    }
}

/// A `break` anywhere in the statements, nested `if`/`while` included
fn contains_break(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::If(_, then, other) => {
            contains_break(then) || other.as_deref().is_some_and(contains_break)
        }
        StmtKind::While(_, body) => contains_break(body),
        _ => false,
    })
}
