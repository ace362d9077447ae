//! Local scope of the event or function body being compiled.
//!
//! Bodies do not nest, so there is a single flat scope: parameters first,
//! then `local` declarations, each taking the next slot. The scope is
//! cleared when the body is finished.

use rustc_hash::FxHashMap;

use wzscript_core::ValueType;

use crate::symbols::{SymbolError, SymbolKind};

/// A local or parameter slot in the function being compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub ty: ValueType,
    /// Local slot index
    pub slot: u32,
}

/// Locals of one body.
#[derive(Debug, Default)]
pub struct LocalScope {
    vars: Vec<LocalVar>,
    by_name: FxHashMap<String, usize>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a local and return its slot.
    pub fn declare(&mut self, name: &str, ty: ValueType) -> Result<u32, SymbolError> {
        if self.by_name.contains_key(name) {
            return Err(SymbolError::Duplicate {
                kind: SymbolKind::Variable,
                name: name.to_string(),
            });
        }

        let slot = self.vars.len() as u32;
        self.by_name.insert(name.to_string(), self.vars.len());
        self.vars.push(LocalVar {
            name: name.to_string(),
            ty,
            slot,
        });
        Ok(slot)
    }

    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.by_name.get(name).map(|&i| &self.vars[i])
    }

    /// Types of every local in slot order.
    pub fn types(&self) -> Vec<ValueType> {
        self.vars.iter().map(|var| var.ty).collect()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Forget every local, ready for the next body.
    pub fn clear(&mut self) {
        self.vars.clear();
        self.by_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_sequential() {
        let mut scope = LocalScope::new();
        assert_eq!(scope.declare("a", ValueType::INT), Ok(0));
        assert_eq!(scope.declare("b", ValueType::BOOL), Ok(1));
        assert_eq!(scope.get("b").map(|v| v.slot), Some(1));
        assert_eq!(scope.types(), vec![ValueType::INT, ValueType::BOOL]);
    }

    #[test]
    fn redeclaration_fails() {
        let mut scope = LocalScope::new();
        scope.declare("a", ValueType::INT).unwrap();
        let err = scope.declare("a", ValueType::INT).unwrap_err();
        assert_eq!(err.to_string(), "Variable a already defined");
    }

    #[test]
    fn clear_resets_slots() {
        let mut scope = LocalScope::new();
        scope.declare("a", ValueType::INT).unwrap();
        scope.clear();
        assert!(scope.is_empty());
        assert_eq!(scope.get("a"), None);
        assert_eq!(scope.declare("b", ValueType::INT), Ok(0));
    }
}
