use super::Analyzer;
use crate::grammer::ast::{ClassDecl, MethodDecl, TypeRef};
use arch::builtin::BuiltinType;
use std::collections::HashSet;

impl<'a> Analyzer<'a> {
    /// Built-in or declared class, with the right number of generic arguments
    pub(super) fn check_type(&mut self, ty: &TypeRef) {
        match BuiltinType::parse(&ty.name) {
            Some(builtin) if builtin.generic_arity() > 0 => {
                if ty.args.len() != builtin.generic_arity() {
                    self.error(
                        ty.pos,
                        format!(
                            "Type {} requires exactly one generic argument",
                            ty.name
                        ),
                    );
                }
                for arg in &ty.args {
                    self.check_type(arg);
                }
            }
            Some(_) => self.check_no_args(ty),
            None if self.program.class(&ty.name).is_some() => self.check_no_args(ty),
            None => self.error(ty.pos, format!("Unknown type: {}", ty.name)),
        }
    }

    fn check_no_args(&mut self, ty: &TypeRef) {
        if !ty.args.is_empty() {
            self.error(
                ty.pos,
                format!("Type {} does not take generic arguments", ty.name),
            );
        }
    }

    pub(super) fn check_base(&mut self, class: &ClassDecl) {
        let Some(base) = &class.base else {
            return;
        };
        if *base == class.name {
            self.error(
                class.pos,
                format!("Class cannot extend itself: {}", class.name),
            );
        } else if self.program.class(base).is_none() {
            self.error(class.pos, format!("Base class not found: {}", base));
        } else if self.in_cycle(class) {
            self.error(
                class.pos,
                format!("Cyclic inheritance detected involving class: {}", class.name),
            );
        }
    }

    /// Walk the base chain until it ends, repeats, or returns to `class`
    fn in_cycle(&self, class: &ClassDecl) -> bool {
        let mut visited = HashSet::new();
        let mut current = class.base.as_deref();
        while let Some(name) = current {
            if name == class.name {
                return true;
            }
            if !visited.insert(name) {
                return false;
            }
            current = self
                .program
                .class(name)
                .and_then(|next| next.base.as_deref());
        }
        false
    }

    /// Base classes of `class`, nearest first, stopping at a cycle or an unknown name
    fn ancestors(&self, class: &ClassDecl) -> Vec<&'a ClassDecl> {
        let mut chain: Vec<&'a ClassDecl> = Vec::new();
        let mut current = class.base.as_deref();
        while let Some(name) = current {
            let Some(next) = self.program.class(name) else {
                break;
            };
            if next.name == class.name || chain.iter().any(|seen| seen.name == next.name) {
                break;
            }
            chain.push(next);
            current = next.base.as_deref();
        }
        chain
    }

    /// Field or method inherited by the class being visited
    pub(super) fn inherits(&self, name: &str) -> bool {
        let Some(class) = self.class else {
            return false;
        };
        self.ancestors(class)
            .iter()
            .any(|base| base.has_field(name) || base.method(name).is_some())
    }

    pub(super) fn check_override(&mut self, class: &ClassDecl, method: &MethodDecl) {
        let overridden = self
            .ancestors(class)
            .into_iter()
            .find_map(|base| base.method(&method.name));
        let Some(base) = overridden else {
            return;
        };

        let same_params = base.params.len() == method.params.len()
            && base
                .params
                .iter()
                .zip(&method.params)
                .all(|(a, b)| a.ty.same_as(&b.ty));
        let same_ret = match (&base.ret, &method.ret) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_as(b),
            _ => false,
        };
        if !(same_params && same_ret) {
            self.error(
                method.pos,
                format!(
                    "Method {} overrides base method with a different signature",
                    method.name
                ),
            );
        }
    }
}
