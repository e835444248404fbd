use std::collections::HashMap;

/// A resolved local: its slot and whatever the compiler tracks about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local<T> {
    pub slot: usize,
    pub info: T,
}

/// Slot allocation for one method.
/// Parameters live in the outermost scope; every `var` gets a fresh slot,
/// visible until the block that declared it is left.
#[derive(Debug)]
pub struct Locals<T> {
    names: Vec<String>,
    scopes: Vec<HashMap<String, Local<T>>>,
}

impl<T: Copy> Locals<T> {
    pub fn new(params: impl IntoIterator<Item = (String, T)>) -> Self {
        let mut locals = Locals {
            names: Vec::new(),
            scopes: vec![HashMap::new()],
        };
        for (name, info) in params {
            locals.declare(&name, info);
        }
        locals
    }

    pub fn enter(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit(&mut self) {
        // the parameter scope stays
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Allocate the next slot for `name` in the innermost scope
    pub fn declare(&mut self, name: &str, info: T) -> usize {
        let slot = self.names.len();
        self.names.push(name.to_string());
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Local { slot, info });
        }
        slot
    }

    pub fn lookup(&self, name: &str) -> Option<Local<T>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Slot index -> declared name
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_then_locals() {
        let mut locals = Locals::new([("a".to_string(), ()), ("b".to_string(), ())]);
        assert_eq!(locals.declare("x", ()), 2);
        locals.enter();
        assert_eq!(locals.declare("y", ()), 3);
        locals.exit();
        assert_eq!(locals.into_names(), vec!["a", "b", "x", "y"]);
    }

    #[test]
    fn shadowing_gets_a_fresh_slot() {
        let mut locals = Locals::new([("a".to_string(), 'p')]);
        locals.enter();
        assert_eq!(locals.declare("a", 'l'), 1);
        assert_eq!(locals.lookup("a"), Some(Local { slot: 1, info: 'l' }));
        locals.exit();
        assert_eq!(locals.lookup("a"), Some(Local { slot: 0, info: 'p' }));
    }

    #[test]
    fn out_of_scope() {
        let mut locals: Locals<()> = Locals::new([]);
        locals.enter();
        locals.declare("t", ());
        locals.exit();
        assert_eq!(locals.lookup("t"), None);
        locals.exit();
        locals.declare("u", ());
        assert!(locals.lookup("u").is_some());
    }
}
