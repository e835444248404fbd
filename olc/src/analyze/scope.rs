use crate::grammer::token::Pos;
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Method,
    Parameter,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub pos: Pos,
}

/// Push/pop counters of one analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub entered: usize,
    pub exited: usize,
    pub max_depth: usize,
}

/// Stack of symbol maps with a parallel stack of inferred type names.
/// Lookups scan from the innermost scope outwards.
#[derive(Debug, Default)]
pub struct Scopes {
    symbols: Vec<IndexMap<String, Symbol>>,
    types: Vec<HashMap<String, String>>,
    stats: ScopeStats,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.symbols.push(IndexMap::new());
        self.types.push(HashMap::new());
        self.stats.entered += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.symbols.len());
    }

    pub fn exit(&mut self) {
        if self.symbols.pop().is_some() {
            self.types.pop();
            self.stats.exited += 1;
        }
    }

    pub fn stats(&self) -> ScopeStats {
        self.stats
    }

    /// Declare in the innermost scope; `false` when the name is already taken there
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> bool {
        let Some(scope) = self.symbols.last_mut() else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), symbol);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn set_type(&mut self, name: &str, ty: impl Into<String>) {
        if let Some(scope) = self.types.last_mut() {
            scope.insert(name.to_string(), ty.into());
        }
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.types
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var() -> Symbol {
        Symbol {
            kind: SymbolKind::Variable,
            pos: Pos::new(1, 1),
        }
    }

    #[test]
    fn shadowing() {
        let mut scopes = Scopes::new();
        scopes.enter();
        assert!(scopes.declare("x", var()));
        assert!(!scopes.declare("x", var()));
        scopes.set_type("x", "Integer");

        scopes.enter();
        assert!(scopes.declare("x", var()));
        scopes.set_type("x", "Real");
        assert_eq!(scopes.type_of("x"), Some("Real"));
        scopes.exit();

        assert_eq!(scopes.type_of("x"), Some("Integer"));
        scopes.exit();
        assert!(scopes.lookup("x").is_none());
        assert_eq!(
            scopes.stats(),
            ScopeStats {
                entered: 2,
                exited: 2,
                max_depth: 2
            }
        );
    }

    #[test]
    fn exit_on_empty_stack() {
        let mut scopes = Scopes::new();
        scopes.exit();
        assert_eq!(scopes.stats().exited, 0);
        assert!(!scopes.declare("x", var()));
    }
}
