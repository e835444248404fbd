use super::labels::LabelGen;
use super::slots::Locals;
use crate::error::Error;
use crate::grammer::ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, Param, Program, Stmt, StmtKind, VarDecl,
};
use crate::grammer::token::Pos;
use arch::builtin::{Builtin, BuiltinType, WRITE};
use arch::inst::{Inst, Label, Value};
use itertools::chain;

/// Statically known value kind, used to insert int -> real widening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Static {
    Int,
    Real,
    Bool,
}

impl Static {
    fn of_type(name: &str) -> Option<Self> {
        match BuiltinType::parse(name)? {
            BuiltinType::Integer => Some(Static::Int),
            BuiltinType::Real => Some(Static::Real),
            BuiltinType::Boolean => Some(Static::Bool),
            _ => None,
        }
    }

    fn of_literal(expr: &Expr) -> Option<Self> {
        match expr.kind {
            ExprKind::IntLit(_) => Some(Static::Int),
            ExprKind::RealLit(_) => Some(Static::Real),
            ExprKind::BoolLit(_) => Some(Static::Bool),
            _ => None,
        }
    }

    fn promote(lhs: Option<Self>, rhs: Option<Self>) -> Option<Self> {
        match (lhs, rhs) {
            (Some(Static::Real), _) | (_, Some(Static::Real)) => Some(Static::Real),
            (Some(Static::Int), Some(Static::Int)) => Some(Static::Int),
            _ => None,
        }
    }
}

/// Storage of a bare identifier
enum Place {
    Local(usize),
    Field(String), // owning class
}

// "compare equal to zero", i.e. logical negation of a 0/1 value
fn negate() -> [Inst; 2] {
    [Inst::Const(Value::Int(0)), Inst::Eq]
}

fn lower_builtin(builtin: Builtin) -> Vec<Inst> {
    match builtin {
        Builtin::Plus => vec![Inst::Add],
        Builtin::Minus => vec![Inst::Sub],
        Builtin::Mult => vec![Inst::Mul],
        Builtin::Div => vec![Inst::Div],
        Builtin::Rem => vec![Inst::Rem],
        Builtin::Equal => vec![Inst::Eq],
        Builtin::Greater => vec![Inst::Gt],
        Builtin::Less => vec![Inst::Lt],
        Builtin::GreaterEqual => chain!([Inst::Lt], negate()).collect(),
        Builtin::LessEqual => chain!([Inst::Gt], negate()).collect(),
        Builtin::And => vec![Inst::And],
        Builtin::Or => vec![Inst::Or],
        Builtin::Xor => vec![Inst::Xor],
        Builtin::Not => negate().to_vec(),
        Builtin::ToInteger => vec![Inst::Narrow],
        Builtin::ToReal => vec![Inst::Widen],
        Builtin::ToBoolean => chain!(negate(), negate()).collect(),
    }
}

fn lower_binary(op: BinaryOp) -> Vec<Inst> {
    match op {
        BinaryOp::Add => vec![Inst::Add],
        BinaryOp::Sub => vec![Inst::Sub],
        BinaryOp::Mul => vec![Inst::Mul],
        BinaryOp::Div => vec![Inst::Div],
        BinaryOp::Gt => vec![Inst::Gt],
        BinaryOp::Lt => vec![Inst::Lt],
        BinaryOp::Ge => chain!([Inst::Lt], negate()).collect(),
        BinaryOp::Le => chain!([Inst::Gt], negate()).collect(),
        BinaryOp::Eq => vec![Inst::Eq],
        BinaryOp::Ne => chain!([Inst::Eq], negate()).collect(),
    }
}

pub struct MethodCompiler<'a> {
    program: &'a Program,
    class: &'a ClassDecl,
    locals: Locals<Option<Static>>,
    labels: &'a mut LabelGen,
    loops: Vec<Label>,
}

impl<'a> MethodCompiler<'a> {
    pub fn new(
        program: &'a Program,
        class: &'a ClassDecl,
        params: &[Param],
        labels: &'a mut LabelGen,
    ) -> Self {
        let params = params.iter().map(|param| {
            let ty = if param.ty.args.is_empty() {
                Static::of_type(&param.ty.name)
            } else {
                None
            };
            (param.name.clone(), ty)
        });
        Self {
            program,
            class,
            locals: Locals::new(params),
            labels,
            loops: Vec::new(),
        }
    }

    /// Slot index -> local name
    pub fn into_slots(self) -> Vec<String> {
        self.locals.into_names()
    }

    /// this.field := init
    pub fn compile_field(&mut self, field: &VarDecl) -> Result<Vec<Inst>, Error> {
        Ok(chain!(
            [Inst::LoadThis],
            self.compile_expr(&field.init)?,
            [Inst::StoreField(self.class.name.clone(), field.name.clone())]
        )
        .collect())
    }

    pub fn compile_block(&mut self, stmts: &[Stmt]) -> Result<Vec<Inst>, Error> {
        let mut insts = Vec::new();
        for stmt in stmts {
            insts.extend(self.compile_stmt(stmt)?);
        }
        Ok(insts)
    }
}

// ----------------------------------------------------------------------------
// Name resolution
// ----------------------------------------------------------------------------

impl MethodCompiler<'_> {
    /// Field `name` of the class itself or of the nearest base class declaring it
    fn field(&self, name: &str) -> Option<(&ClassDecl, &VarDecl)> {
        let mut class = Some(self.class);
        // bounded walk, the base chain may be cyclic
        for _ in 0..=self.program.classes.len() {
            let current = class?;
            if let Some(field) = current.fields().find(|field| field.name == name) {
                return Some((current, field));
            }
            class = current
                .base
                .as_deref()
                .and_then(|base| self.program.class(base));
        }
        None
    }

    fn owner_of(&self, name: &str) -> Option<String> {
        self.field(name).map(|(class, _)| class.name.clone())
    }

    /// Parameters and locals in scope, innermost first, then fields
    fn place(&self, name: &str, pos: Pos) -> Result<Place, Error> {
        if let Some(local) = self.locals.lookup(name) {
            return Ok(Place::Local(local.slot));
        }
        self.owner_of(name)
            .map(Place::Field)
            .ok_or_else(|| Error::UnknownIdentifier(name.to_string(), pos))
    }

    /// Run `f` inside a nested block scope
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.locals.enter();
        let result = f(self);
        self.locals.exit();
        result
    }

    fn static_type(&self, expr: &Expr) -> Option<Static> {
        match &expr.kind {
            ExprKind::IntLit(_) | ExprKind::RealLit(_) | ExprKind::BoolLit(_) => {
                Static::of_literal(expr)
            }
            ExprKind::Ident(name, _) => match self.locals.lookup(name) {
                Some(local) => local.info,
                None => Static::of_literal(&self.field(name)?.1.init),
            },
            ExprKind::Binary(op, lhs, rhs) => {
                if op.is_comparison() {
                    Some(Static::Bool)
                } else {
                    Static::promote(self.static_type(lhs), self.static_type(rhs))
                }
            }
            ExprKind::Call(callee, args) => match &callee.kind {
                ExprKind::Ident(name, _) => Static::of_type(name),
                ExprKind::Member(target, method) => match Builtin::parse(method)? {
                    builtin if builtin.is_arithmetic() => Static::promote(
                        self.static_type(target),
                        args.first().and_then(|arg| self.static_type(arg)),
                    ),
                    Builtin::And | Builtin::Or | Builtin::Xor => self.static_type(target),
                    Builtin::ToInteger => Some(Static::Int),
                    Builtin::ToReal => Some(Static::Real),
                    _ => Some(Static::Bool),
                },
                _ => None,
            },
            ExprKind::This | ExprKind::Member(_, _) => None,
        }
    }

    /// Widen whichever operand is the integer one in a mixed int/real operation
    fn widening(&self, arithmetic: bool, lhs: &Expr, rhs: &Expr) -> (Vec<Inst>, Vec<Inst>) {
        if !arithmetic {
            return (vec![], vec![]);
        }
        match (self.static_type(lhs), self.static_type(rhs)) {
            (Some(Static::Int), Some(Static::Real)) => (vec![Inst::Widen], vec![]),
            (Some(Static::Real), Some(Static::Int)) => (vec![], vec![Inst::Widen]),
            _ => (vec![], vec![]),
        }
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl MethodCompiler<'_> {
    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<Vec<Inst>, Error> {
        match &stmt.kind {
            StmtKind::Var(name, init) => {
                // the initializer still sees any outer `name`
                let init_insts = self.compile_expr(init)?;
                let ty = self.static_type(init);
                let slot = self.locals.declare(name, ty);
                Ok(chain!(init_insts, [Inst::StoreLocal(slot)]).collect())
            }

            StmtKind::Assign(target, value) => {
                let ExprKind::Ident(name, _) = &target.kind else {
                    return Err(Error::InvalidAssignTarget(target.pos));
                };
                let value_insts = self.compile_expr(value)?;
                match self.place(name, target.pos)? {
                    Place::Local(slot) => {
                        Ok(chain!(value_insts, [Inst::StoreLocal(slot)]).collect())
                    }
                    Place::Field(owner) => Ok(chain!(
                        [Inst::LoadThis],
                        value_insts,
                        [Inst::StoreField(owner, name.clone())]
                    )
                    .collect()),
                }
            }

            StmtKind::If(cond, then, other) => {
                let else_label = self.labels.fresh();
                let end_label = self.labels.fresh();
                let cond_insts = self.compile_expr(cond)?;
                let then_insts = self.with_scope(|c| c.compile_block(then))?;
                let else_insts = match other {
                    Some(other) => self.with_scope(|c| c.compile_block(other))?,
                    None => Vec::new(),
                };
                Ok(chain!(
                    cond_insts,
                    [Inst::JumpIfFalse(else_label.clone())],
                    then_insts,
                    [Inst::Jump(end_label.clone()), Inst::Label(else_label)],
                    else_insts,
                    [Inst::Label(end_label)]
                )
                .collect())
            }

            StmtKind::While(cond, body) => {
                let start_label = self.labels.fresh();
                let end_label = self.labels.fresh();
                let cond_insts = self.compile_expr(cond)?;
                self.loops.push(end_label.clone());
                let body_insts = self.with_scope(|c| c.compile_block(body));
                self.loops.pop();
                Ok(chain!(
                    [Inst::Label(start_label.clone())],
                    cond_insts,
                    [Inst::JumpIfFalse(end_label.clone())],
                    body_insts?,
                    [Inst::Jump(start_label), Inst::Label(end_label)]
                )
                .collect())
            }

            StmtKind::Return(value) => Ok(chain!(self.compile_expr(value)?, [Inst::Ret]).collect()),

            StmtKind::Break => match self.loops.last() {
                Some(end_label) => Ok(vec![Inst::Jump(end_label.clone())]),
                None => Err(Error::BreakOutsideLoop(stmt.pos)),
            },

            // write() leaves nothing on the stack, everything else is discarded
            StmtKind::Expr(expr) => {
                let insts = self.compile_expr(expr)?;
                if is_write(expr) {
                    Ok(insts)
                } else {
                    Ok(chain!(insts, [Inst::Pop]).collect())
                }
            }
        }
    }
}

fn is_write(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call(callee, _) => {
            matches!(&callee.kind, ExprKind::Ident(name, _) if name == WRITE)
        }
        _ => false,
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl MethodCompiler<'_> {
    fn compile_expr(&mut self, expr: &Expr) -> Result<Vec<Inst>, Error> {
        match &expr.kind {
            ExprKind::IntLit(text) => {
                let value = text
                    .parse()
                    .map_err(|_| Error::InvalidLiteral(text.clone(), expr.pos))?;
                Ok(vec![Inst::Const(Value::Int(value))])
            }
            ExprKind::RealLit(text) => {
                let value = text
                    .parse()
                    .map_err(|_| Error::InvalidLiteral(text.clone(), expr.pos))?;
                Ok(vec![Inst::Const(Value::Real(value))])
            }
            ExprKind::BoolLit(value) => Ok(vec![Inst::Const(Value::Bool(*value))]),
            ExprKind::This => Ok(vec![Inst::LoadThis]),

            ExprKind::Ident(name, _) => match self.place(name, expr.pos)? {
                Place::Local(slot) => Ok(vec![Inst::LoadLocal(slot)]),
                Place::Field(owner) => Ok(vec![Inst::LoadThis, Inst::LoadField(owner, name.clone())]),
            },

            ExprKind::Binary(op, lhs, rhs) => {
                let (lhs_widen, rhs_widen) = self.widening(op.is_arithmetic(), lhs, rhs);
                Ok(chain!(
                    self.compile_expr(lhs)?,
                    lhs_widen,
                    self.compile_expr(rhs)?,
                    rhs_widen,
                    lower_binary(*op)
                )
                .collect())
            }

            // this.field
            ExprKind::Member(target, name) => {
                if matches!(target.kind, ExprKind::This) {
                    if let Some(owner) = self.owner_of(name) {
                        return Ok(vec![Inst::LoadThis, Inst::LoadField(owner, name.clone())]);
                    }
                }
                Err(Error::UnsupportedMember(expr.to_string(), expr.pos))
            }

            ExprKind::Call(callee, args) => match &callee.kind {
                ExprKind::Ident(name, _) => self.compile_routine(name, args, expr.pos),
                ExprKind::Member(target, method) => {
                    self.compile_builtin(target, method, args, expr.pos)
                }
                _ => Err(Error::UnsupportedCall(expr.to_string(), expr.pos)),
            },
        }
    }

    /// write(x), Integer(x), Real(x), Boolean(x)
    fn compile_routine(&mut self, name: &str, args: &[Expr], pos: Pos) -> Result<Vec<Inst>, Error> {
        let [arg] = args else {
            return Err(Error::UnsupportedCall(name.to_string(), pos));
        };
        if name == WRITE {
            return Ok(chain!(self.compile_expr(arg)?, [Inst::Call(WRITE.to_string(), 1)]).collect());
        }
        let Some(ty) = BuiltinType::parse(name).filter(BuiltinType::is_scalar) else {
            return Err(Error::UnsupportedCall(name.to_string(), pos));
        };

        let mut insts = self.compile_expr(arg)?;
        match (ty, self.static_type(arg)) {
            (BuiltinType::Real, Some(Static::Int)) => insts.push(Inst::Widen),
            (BuiltinType::Integer, Some(Static::Real)) => insts.push(Inst::Narrow),
            _ => {}
        }
        Ok(insts)
    }

    /// x.Plus(y), x.Not(), x.toReal(), ...
    fn compile_builtin(
        &mut self,
        target: &Expr,
        method: &str,
        args: &[Expr],
        pos: Pos,
    ) -> Result<Vec<Inst>, Error> {
        let Some(builtin) = Builtin::parse(method).filter(|builtin| builtin.arity() == args.len())
        else {
            return Err(Error::UnsupportedCall(format!("{}.{}", target, method), pos));
        };

        let mut insts = self.compile_expr(target)?;
        if let [arg] = args {
            let (target_widen, arg_widen) = self.widening(builtin.is_arithmetic(), target, arg);
            insts.extend(target_widen);
            insts.extend(self.compile_expr(arg)?);
            insts.extend(arg_widen);
        }
        insts.extend(lower_builtin(builtin));
        Ok(insts)
    }
}
