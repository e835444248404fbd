use super::Analyzer;
use crate::grammer::ast::{Expr, ExprKind};
use arch::builtin::BuiltinType;

impl Analyzer<'_> {
    /// Best-effort static type name; `None` when it cannot be told.
    /// Calls, member access and `this` are never resolved.
    pub(super) fn infer(&self, expr: &Expr) -> Option<String> {
        match &expr.kind {
            ExprKind::IntLit(_) => Some(BuiltinType::Integer.to_string()),
            ExprKind::RealLit(_) => Some(BuiltinType::Real.to_string()),
            ExprKind::BoolLit(_) => Some(BuiltinType::Boolean.to_string()),
            ExprKind::Ident(name, _) => self.scopes.type_of(name).map(str::to_string),
            ExprKind::Binary(op, lhs, rhs) => {
                let lhs = self.infer(lhs);
                let rhs = self.infer(rhs);
                if op.is_comparison() {
                    return lhs
                        .and(rhs)
                        .map(|_| BuiltinType::Boolean.to_string());
                }
                let real = BuiltinType::Real.to_string();
                let int = BuiltinType::Integer.to_string();
                if lhs.as_ref() == Some(&real) || rhs.as_ref() == Some(&real) {
                    Some(real)
                } else if lhs.as_ref() == Some(&int) && rhs.as_ref() == Some(&int) {
                    Some(int)
                } else {
                    None
                }
            }
            ExprKind::This | ExprKind::Member(_, _) | ExprKind::Call(_, _) => None,
        }
    }
}
