use crate::grammer::ast::{BinaryOp, Expr, ExprKind};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lit {
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl Lit {
    fn of(expr: &Expr) -> Option<Self> {
        match &expr.kind {
            ExprKind::IntLit(text) => text.parse().ok().map(Lit::Int),
            ExprKind::RealLit(text) => text.parse().ok().map(Lit::Real),
            ExprKind::BoolLit(value) => Some(Lit::Bool(*value)),
            _ => None,
        }
    }

    fn as_real(&self) -> Option<f64> {
        match self {
            Lit::Int(v) => Some(*v as f64),
            Lit::Real(v) => Some(*v),
            Lit::Bool(_) => None,
        }
    }
}

/// Fold constant sub-expressions bottom-up
pub fn fold(expr: Expr) -> Expr {
    let Expr { kind, pos } = expr;
    let kind = match kind {
        ExprKind::Binary(op, lhs, rhs) => {
            let lhs = fold(*lhs);
            let rhs = fold(*rhs);
            match fold_binary(op, &lhs, &rhs) {
                Some(folded) => folded,
                None => ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
            }
        }
        ExprKind::Member(target, name) => ExprKind::Member(Box::new(fold(*target)), name),
        ExprKind::Call(callee, args) => {
            ExprKind::Call(Box::new(fold(*callee)), args.into_iter().map(fold).collect())
        }
        other => other,
    };
    Expr { kind, pos }
}

fn fold_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Option<ExprKind> {
    match (Lit::of(lhs)?, Lit::of(rhs)?) {
        (Lit::Int(a), Lit::Int(b)) => fold_int(op, a, b),
        (Lit::Bool(a), Lit::Bool(b)) => match op {
            BinaryOp::Eq => Some(ExprKind::BoolLit(a == b)),
            BinaryOp::Ne => Some(ExprKind::BoolLit(a != b)),
            _ => None,
        },
        (a, b) => fold_real(op, a.as_real()?, b.as_real()?),
    }
}

// Overflow and division by zero stay unfolded
fn fold_int(op: BinaryOp, a: i64, b: i64) -> Option<ExprKind> {
    let value = match op {
        BinaryOp::Add => a.checked_add(b)?,
        BinaryOp::Sub => a.checked_sub(b)?,
        BinaryOp::Mul => a.checked_mul(b)?,
        BinaryOp::Div => a.checked_div(b)?,
        _ => return Some(ExprKind::BoolLit(compare(op, a, b))),
    };
    Some(ExprKind::IntLit(value.to_string()))
}

fn fold_real(op: BinaryOp, a: f64, b: f64) -> Option<ExprKind> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => return Some(ExprKind::BoolLit(compare(op, a, b))),
    };
    if value.is_finite() {
        Some(ExprKind::RealLit(format!("{:?}", value)))
    } else {
        None
    }
}

fn compare<T: PartialOrd>(op: BinaryOp, a: T, b: T) -> bool {
    match op {
        BinaryOp::Gt => a > b,
        BinaryOp::Lt => a < b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Le => a <= b,
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => false,
    }
}
