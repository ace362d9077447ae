//! The symbol environment identifiers are classified against.
//!
//! A script identifier does not lex to a fixed token: the same word is a
//! type, a numeric variable, a trigger or a fresh name depending on what the
//! host registered and what the script declared so far. The lexer asks a
//! [`SymbolEnv`] at the moment it scans the word, so the environment must
//! reflect every declaration the parser has already processed.

use wzscript_core::{AccessKind, StorageClass, ValueType};
use wzscript_registry::{ConstValue, HostFn};

/// Expression family a value type belongs to.
///
/// Operators are only defined within a family, so the family decides which
/// grammar path an operand takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Bool,
    Num,
    /// Any non-object type that is neither bool nor int (strings included).
    User,
    /// Host types registered with [`AccessKind::Object`].
    Object,
}

impl Family {
    /// Classify a type given its access kind.
    pub fn of(ty: ValueType, access: AccessKind) -> Family {
        if access == AccessKind::Object {
            return Family::Object;
        }
        match ty.without_ref() {
            ValueType::BOOL => Family::Bool,
            ValueType::INT => Family::Num,
            _ => Family::User,
        }
    }
}

/// A resolved variable of any storage class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSymbol {
    pub ty: ValueType,
    pub storage: StorageClass,
    /// Slot in its storage space: global index, array index, local slot,
    /// or the host slot passed to get/set.
    pub index: u32,
    /// Number of array dimensions, zero for scalars.
    pub dims: u8,
    pub get: Option<HostFn>,
    pub set: Option<HostFn>,
}

impl VarSymbol {
    /// A variable stored by the script itself (global, array or local).
    pub fn script(ty: ValueType, storage: StorageClass, index: u32, dims: u8) -> Self {
        Self {
            ty,
            storage,
            index,
            dims,
            get: None,
            set: None,
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.dims > 0
    }
}

/// A resolved named constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstSymbol {
    pub ty: ValueType,
    pub value: ConstValue,
}

/// What a call to a function compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncTarget {
    /// Native function, by position in the host function table.
    Native(u32),
    /// Script function, by position in the script function table.
    Script(u32),
}

/// A resolved function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncSymbol {
    pub ret: ValueType,
    pub target: FuncTarget,
}

/// Lookups the lexer performs to classify an identifier.
///
/// Each method answers for one symbol table only; the order in which they
/// are consulted is fixed by the lexer.
pub trait SymbolEnv {
    /// Access kind of a value type.
    fn access(&self, ty: ValueType) -> AccessKind;

    /// A host type or built-in type name.
    fn type_named(&self, name: &str) -> Option<ValueType>;

    /// The static type of the object expression being accessed, if any.
    fn object_context(&self) -> Option<ValueType>;

    /// A member variable visible on values of `context`.
    fn member(&self, name: &str, context: ValueType) -> Option<VarSymbol>;

    fn external(&self, name: &str) -> Option<VarSymbol>;

    /// A local variable or parameter of the body being compiled.
    fn local(&self, name: &str) -> Option<VarSymbol>;

    /// Whether local declarations are being parsed; globals are hidden then.
    fn defining_locals(&self) -> bool;

    /// A global scalar or array.
    fn global(&self, name: &str) -> Option<VarSymbol>;

    fn constant(&self, name: &str) -> Option<ConstSymbol>;

    fn script_function(&self, name: &str) -> Option<FuncSymbol>;

    fn native_function(&self, name: &str) -> Option<FuncSymbol>;

    /// Index of a declared trigger.
    fn trigger(&self, name: &str) -> Option<u32>;

    /// Index of a declared event.
    fn event(&self, name: &str) -> Option<u32>;

    /// Index of a host callback.
    fn callback(&self, name: &str) -> Option<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families() {
        assert_eq!(Family::of(ValueType::BOOL, AccessKind::Value), Family::Bool);
        assert_eq!(Family::of(ValueType::INT.to_ref(), AccessKind::Value), Family::Num);
        assert_eq!(Family::of(ValueType::STRING, AccessKind::Value), Family::User);
        assert_eq!(Family::of(ValueType::user(0), AccessKind::Value), Family::User);
        assert_eq!(Family::of(ValueType::user(0), AccessKind::Object), Family::Object);
    }
}
