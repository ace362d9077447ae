//! HostRegistry - the tables the host hands to the compiler.
//!
//! The game registers its value types, external and member variables,
//! native functions, constants, callbacks and type equivalences once,
//! before any script is compiled. The compiler only reads the registry, so
//! one registry can serve any number of compiles.
//!
//! # Storage Model
//!
//! Every table keeps its entries in registration order (the order is part of
//! the program format for types) plus an [`FxHashMap`] name index for the
//! lookups the lexer performs on every identifier. Member variables are
//! indexed by name to a list, because different object types may expose
//! members with the same name.
//!
//! # Example
//!
//! ```
//! use wzscript_core::{AccessKind, ValueType};
//! use wzscript_registry::{HostFn, HostRegistry, NativeFunction, TypeEntry};
//!
//! let mut registry = HostRegistry::new();
//! let droid = ValueType::user(0);
//! registry.register_type(TypeEntry::new(droid, "DROID", AccessKind::Object)).unwrap();
//! registry
//!     .register_function(NativeFunction::new("random", HostFn(1), ValueType::INT, [ValueType::INT]))
//!     .unwrap();
//!
//! assert_eq!(registry.type_by_name("DROID").map(|t| t.id), Some(droid));
//! assert!(registry.function("random").is_some());
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use wzscript_core::{AccessKind, RegistrationError, StorageClass, TriggerType, ValueType};

use crate::entries::{
    Callback, Constant, HostVariable, MAX_FUNC_PARAMS, NativeFunction, TypeEntry,
};

/// Host-provided symbol tables.
#[derive(Debug, Default, Clone)]
pub struct HostRegistry {
    types: Vec<TypeEntry>,
    types_by_name: FxHashMap<String, usize>,

    externals: Vec<HostVariable>,
    externals_by_name: FxHashMap<String, usize>,

    members: Vec<HostVariable>,
    members_by_name: FxHashMap<String, Vec<usize>>,

    functions: Vec<NativeFunction>,
    functions_by_name: FxHashMap<String, usize>,

    constants: Vec<Constant>,
    constants_by_name: FxHashMap<String, usize>,

    callbacks: Vec<Callback>,
    callbacks_by_name: FxHashMap<String, usize>,

    /// base type -> types accepted where `base` is expected
    equivalences: FxHashMap<ValueType, FxHashSet<ValueType>>,
}

impl HostRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a host value type.
    ///
    /// Ids must follow on from [`ValueType::USER_START`] without gaps.
    pub fn register_type(&mut self, entry: TypeEntry) -> Result<(), RegistrationError> {
        let expected = ValueType::USER_START + self.types.len() as u32;
        if entry.id.raw() != expected {
            return Err(RegistrationError::NonContiguousType {
                name: entry.name,
                id: entry.id.raw(),
                expected,
            });
        }
        if self.types_by_name.contains_key(&entry.name) {
            return Err(RegistrationError::Duplicate {
                kind: "type",
                name: entry.name,
            });
        }
        self.types_by_name.insert(entry.name.clone(), self.types.len());
        self.types.push(entry);
        Ok(())
    }

    /// Register a variable that lives in the host.
    pub fn register_external(&mut self, var: HostVariable) -> Result<(), RegistrationError> {
        self.check_type(&var.name, var.ty)?;
        if self.externals_by_name.contains_key(&var.name) {
            return Err(RegistrationError::Duplicate {
                kind: "external variable",
                name: var.name,
            });
        }
        let var = HostVariable {
            storage: StorageClass::External,
            owner: None,
            ..var
        };
        self.externals_by_name
            .insert(var.name.clone(), self.externals.len());
        self.externals.push(var);
        Ok(())
    }

    /// Register a member variable of a host object type.
    pub fn register_member(&mut self, var: HostVariable) -> Result<(), RegistrationError> {
        self.check_type(&var.name, var.ty)?;
        let owner = var.owner.ok_or_else(|| RegistrationError::UnknownType {
            name: var.name.clone(),
            id: ValueType::VOID.raw(),
        })?;
        self.check_type(&var.name, owner)?;

        let same_owner = self
            .members_by_name
            .get(&var.name)
            .is_some_and(|idxs| idxs.iter().any(|&i| self.members[i].owner == Some(owner)));
        if same_owner {
            return Err(RegistrationError::Duplicate {
                kind: "member variable",
                name: var.name,
            });
        }

        let var = HostVariable {
            storage: StorageClass::Object,
            ..var
        };
        self.members_by_name
            .entry(var.name.clone())
            .or_default()
            .push(self.members.len());
        self.members.push(var);
        Ok(())
    }

    /// Register a native function.
    pub fn register_function(&mut self, func: NativeFunction) -> Result<(), RegistrationError> {
        self.check_signature(&func.name, func.ret, &func.params)?;
        if self.functions_by_name.contains_key(&func.name) {
            return Err(RegistrationError::Duplicate {
                kind: "function",
                name: func.name,
            });
        }
        self.functions_by_name
            .insert(func.name.clone(), self.functions.len());
        self.functions.push(func);
        Ok(())
    }

    /// Register a named constant.
    pub fn register_constant(&mut self, constant: Constant) -> Result<(), RegistrationError> {
        self.check_type(&constant.name, constant.ty)?;
        if self.constants_by_name.contains_key(&constant.name) {
            return Err(RegistrationError::Duplicate {
                kind: "constant",
                name: constant.name,
            });
        }
        self.constants_by_name
            .insert(constant.name.clone(), self.constants.len());
        self.constants.push(constant);
        Ok(())
    }

    /// Register a callback trigger.
    pub fn register_callback(&mut self, callback: Callback) -> Result<(), RegistrationError> {
        if !callback.trigger.is_callback() {
            return Err(RegistrationError::CallbackId {
                name: callback.name,
                id: callback.trigger.0,
                base: TriggerType::CALLBACK_START,
            });
        }
        self.check_signature(&callback.name, ValueType::VOID, &callback.params)?;
        if self.callbacks_by_name.contains_key(&callback.name) {
            return Err(RegistrationError::Duplicate {
                kind: "callback",
                name: callback.name,
            });
        }
        self.callbacks_by_name
            .insert(callback.name.clone(), self.callbacks.len());
        self.callbacks.push(callback);
        Ok(())
    }

    /// Allow values of each type in `accepted` wherever `base` is expected.
    pub fn register_equivalence(
        &mut self,
        base: ValueType,
        accepted: &[ValueType],
    ) -> Result<(), RegistrationError> {
        let name = format!("{base:?}");
        self.check_type(&name, base)?;
        for &ty in accepted {
            self.check_type(&name, ty)?;
        }
        self.equivalences
            .entry(base.without_ref())
            .or_default()
            .extend(accepted.iter().map(|t| t.without_ref()));
        Ok(())
    }

    fn check_type(&self, name: &str, ty: ValueType) -> Result<(), RegistrationError> {
        let raw = ty.without_ref().raw();
        if raw < ValueType::USER_START + self.types.len() as u32 {
            Ok(())
        } else {
            Err(RegistrationError::UnknownType {
                name: name.to_string(),
                id: raw,
            })
        }
    }

    fn check_signature(
        &self,
        name: &str,
        ret: ValueType,
        params: &[ValueType],
    ) -> Result<(), RegistrationError> {
        if params.len() > MAX_FUNC_PARAMS {
            return Err(RegistrationError::TooManyParameters {
                name: name.to_string(),
                count: params.len(),
                max: MAX_FUNC_PARAMS,
            });
        }
        self.check_type(name, ret)?;
        params.iter().try_for_each(|&p| self.check_type(name, p))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Look up a host type by name.
    pub fn type_by_name(&self, name: &str) -> Option<&TypeEntry> {
        self.types_by_name.get(name).map(|&i| &self.types[i])
    }

    /// Look up a host type by id.
    pub fn type_entry(&self, ty: ValueType) -> Option<&TypeEntry> {
        ty.user_index().and_then(|i| self.types.get(i))
    }

    /// Access kind of a type; built-in types are plain values.
    pub fn access(&self, ty: ValueType) -> AccessKind {
        self.type_entry(ty).map_or(AccessKind::Value, |t| t.access)
    }

    /// Look up an external variable.
    pub fn external(&self, name: &str) -> Option<&HostVariable> {
        self.externals_by_name.get(name).map(|&i| &self.externals[i])
    }

    /// Look up a member variable visible on values of `context`.
    ///
    /// The first registered member whose owner accepts `context` wins.
    pub fn member(&self, name: &str, context: ValueType) -> Option<&HostVariable> {
        self.members_by_name.get(name)?.iter().map(|&i| &self.members[i]).find(|m| {
            m.owner
                .is_some_and(|owner| self.equivalent(owner, context))
        })
    }

    /// Look up a native function.
    pub fn function(&self, name: &str) -> Option<&NativeFunction> {
        self.functions_by_name.get(name).map(|&i| &self.functions[i])
    }

    /// Position of a native function in [`functions`](Self::functions).
    pub fn function_index(&self, name: &str) -> Option<usize> {
        self.functions_by_name.get(name).copied()
    }

    /// Look up a constant.
    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants_by_name.get(name).map(|&i| &self.constants[i])
    }

    /// Look up a callback.
    pub fn callback(&self, name: &str) -> Option<&Callback> {
        self.callbacks_by_name.get(name).map(|&i| &self.callbacks[i])
    }

    /// Position of a callback in [`callbacks`](Self::callbacks).
    pub fn callback_index(&self, name: &str) -> Option<usize> {
        self.callbacks_by_name.get(name).copied()
    }

    /// Whether a value of type `from` may be used where `to` is expected.
    ///
    /// Reference and value types never mix; otherwise the types must be equal
    /// or `from` must be registered as equivalent to `to`.
    pub fn equivalent(&self, to: ValueType, from: ValueType) -> bool {
        if to.is_ref() != from.is_ref() {
            return false;
        }
        let (to, from) = (to.without_ref(), from.without_ref());
        to == from
            || self
                .equivalences
                .get(&to)
                .is_some_and(|accepted| accepted.contains(&from))
    }

    // ==========================================================================
    // Iteration
    // ==========================================================================

    /// Host types in id order.
    pub fn types(&self) -> &[TypeEntry] {
        &self.types
    }

    pub fn externals(&self) -> &[HostVariable] {
        &self.externals
    }

    pub fn members(&self) -> &[HostVariable] {
        &self.members
    }

    pub fn functions(&self) -> &[NativeFunction] {
        &self.functions
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{ConstValue, HostFn};

    fn registry_with_types() -> HostRegistry {
        let mut r = HostRegistry::new();
        r.register_type(TypeEntry::new(ValueType::user(0), "BASEOBJ", AccessKind::Object))
            .unwrap();
        r.register_type(TypeEntry::new(ValueType::user(1), "DROID", AccessKind::Object))
            .unwrap();
        r.register_type(TypeEntry::new(ValueType::user(2), "TEMPLATE", AccessKind::Value))
            .unwrap();
        r
    }

    #[test]
    fn types_must_be_contiguous() {
        let mut r = HostRegistry::new();
        let err = r
            .register_type(TypeEntry::new(ValueType::user(1), "GAP", AccessKind::Value))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::NonContiguousType {
                name: "GAP".into(),
                id: ValueType::USER_START + 1,
                expected: ValueType::USER_START,
            }
        );
    }

    #[test]
    fn duplicate_type_name_rejected() {
        let mut r = registry_with_types();
        let err = r
            .register_type(TypeEntry::new(ValueType::user(3), "DROID", AccessKind::Object))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Duplicate { kind: "type", .. }));
    }

    #[test]
    fn access_kinds() {
        let r = registry_with_types();
        assert_eq!(r.access(ValueType::user(1)), AccessKind::Object);
        assert_eq!(r.access(ValueType::user(2)), AccessKind::Value);
        assert_eq!(r.access(ValueType::INT), AccessKind::Value);
    }

    #[test]
    fn function_signature_checks() {
        let mut r = registry_with_types();
        let too_many = NativeFunction::new("f", HostFn(0), ValueType::VOID, vec![ValueType::INT; 21]);
        assert!(matches!(
            r.register_function(too_many),
            Err(RegistrationError::TooManyParameters { count: 21, .. })
        ));

        let unknown =
            NativeFunction::new("g", HostFn(1), ValueType::user(9), [ValueType::INT]);
        assert!(matches!(
            r.register_function(unknown),
            Err(RegistrationError::UnknownType { .. })
        ));

        r.register_function(NativeFunction::new(
            "h",
            HostFn(2),
            ValueType::BOOL,
            [ValueType::user(1), ValueType::INT.to_ref()],
        ))
        .unwrap();
        assert_eq!(r.function("h").map(|f| f.params.len()), Some(2));
    }

    #[test]
    fn callback_ids_start_after_builtin_triggers() {
        let mut r = registry_with_types();
        let bad = Callback::new("CALL_BAD", TriggerType::PAUSE, HostFn(3), []);
        assert!(matches!(
            r.register_callback(bad),
            Err(RegistrationError::CallbackId { id: 4, .. })
        ));
        r.register_callback(Callback::new("CALL_OK", TriggerType(5), HostFn(3), []))
            .unwrap();
        assert!(r.callback("CALL_OK").is_some());
    }

    #[test]
    fn equivalence_respects_reference_flag() {
        let mut r = registry_with_types();
        let base = ValueType::user(0);
        let droid = ValueType::user(1);
        r.register_equivalence(base, &[droid]).unwrap();

        assert!(r.equivalent(base, droid));
        assert!(!r.equivalent(droid, base));
        assert!(r.equivalent(base.to_ref(), droid.to_ref()));
        assert!(!r.equivalent(base.to_ref(), droid));
        assert!(r.equivalent(ValueType::INT, ValueType::INT));
        assert!(!r.equivalent(ValueType::INT, ValueType::BOOL));
    }

    #[test]
    fn members_resolve_through_equivalent_owner() {
        let mut r = registry_with_types();
        let base = ValueType::user(0);
        let droid = ValueType::user(1);
        r.register_equivalence(base, &[droid]).unwrap();
        r.register_member(HostVariable::member(base, "x", ValueType::INT, 0).with_get(HostFn(10)))
            .unwrap();
        r.register_member(HostVariable::member(droid, "order", ValueType::INT, 1)).unwrap();

        assert_eq!(r.member("x", droid).map(|m| m.index), Some(0));
        assert_eq!(r.member("order", droid).map(|m| m.index), Some(1));
        assert!(r.member("order", base).is_none());
        assert!(r.member("x", ValueType::user(2)).is_none());
    }

    #[test]
    fn same_member_name_on_two_owners() {
        let mut r = registry_with_types();
        r.register_member(HostVariable::member(ValueType::user(0), "id", ValueType::INT, 0))
            .unwrap();
        r.register_member(HostVariable::member(ValueType::user(1), "id", ValueType::INT, 1))
            .unwrap();
        assert!(
            r.register_member(HostVariable::member(ValueType::user(1), "id", ValueType::INT, 2))
                .is_err()
        );
        assert_eq!(r.member("id", ValueType::user(1)).map(|m| m.index), Some(1));
    }

    #[test]
    fn externals_and_constants() {
        let mut r = registry_with_types();
        r.register_external(
            HostVariable::external("gameTime", ValueType::INT, 3).with_get(HostFn(20)),
        )
        .unwrap();
        r.register_constant(Constant::new("TRUE", ValueType::BOOL, ConstValue::Bool(true)))
            .unwrap();

        let ext = r.external("gameTime").unwrap();
        assert_eq!(ext.storage, StorageClass::External);
        assert_eq!(ext.get, Some(HostFn(20)));
        assert!(ext.set.is_none());
        assert_eq!(r.constant("TRUE").map(|c| c.value.to_word()), Some(1));
        assert!(matches!(
            r.register_constant(Constant::new("TRUE", ValueType::BOOL, ConstValue::Bool(false))),
            Err(RegistrationError::Duplicate { kind: "constant", .. })
        ));
    }
}
