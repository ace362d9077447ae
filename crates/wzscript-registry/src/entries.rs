//! Entries of the host tables.
//!
//! Each entry mirrors one row the game registers before compiling: the
//! compiler only reads names, types and ids, the functions themselves stay
//! on the host side and are referenced through [`HostFn`] ids.

use wzscript_core::{AccessKind, StorageClass, TriggerType, ValueType};

/// Maximum number of parameters of a native function or callback.
pub const MAX_FUNC_PARAMS: usize = 20;

/// Opaque id of a host function.
///
/// Written into the instruction image after `Call` and `VarCall` so the
/// virtual machine can dispatch to the matching host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostFn(pub u32);

/// A host-declared value type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    /// Type id, contiguous from [`ValueType::USER_START`].
    pub id: ValueType,
    /// Name scripts use to declare variables of this type.
    pub name: String,
    /// Whether values are plain or objects with members.
    pub access: AccessKind,
    /// Save hook used by the game when serialising script state.
    pub save: Option<HostFn>,
    /// Load hook paired with `save`.
    pub load: Option<HostFn>,
}

impl TypeEntry {
    pub fn new(id: ValueType, name: impl Into<String>, access: AccessKind) -> Self {
        Self {
            id,
            name: name.into(),
            access,
            save: None,
            load: None,
        }
    }

    /// Attach save/load hooks.
    pub fn with_save_load(mut self, save: HostFn, load: HostFn) -> Self {
        self.save = Some(save);
        self.load = Some(load);
        self
    }
}

/// A host variable, either external or a member of a host object type.
#[derive(Debug, Clone, PartialEq)]
pub struct HostVariable {
    pub name: String,
    pub ty: ValueType,
    /// [`StorageClass::External`] or [`StorageClass::Object`].
    pub storage: StorageClass,
    /// Slot index passed to the get/set function.
    pub index: u32,
    /// Object type owning a member variable.
    pub owner: Option<ValueType>,
    pub get: Option<HostFn>,
    pub set: Option<HostFn>,
}

impl HostVariable {
    /// An external variable reached through get/set functions.
    pub fn external(name: impl Into<String>, ty: ValueType, index: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: StorageClass::External,
            index,
            owner: None,
            get: None,
            set: None,
        }
    }

    /// A member variable of the host object type `owner`.
    pub fn member(owner: ValueType, name: impl Into<String>, ty: ValueType, index: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: StorageClass::Object,
            index,
            owner: Some(owner),
            get: None,
            set: None,
        }
    }

    pub fn with_get(mut self, get: HostFn) -> Self {
        self.get = Some(get);
        self
    }

    pub fn with_set(mut self, set: HostFn) -> Self {
        self.set = Some(set);
        self
    }
}

/// A native ("instinct") function callable from scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeFunction {
    pub name: String,
    pub func: HostFn,
    /// [`ValueType::VOID`] for functions without a result.
    pub ret: ValueType,
    pub params: Vec<ValueType>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        func: HostFn,
        ret: ValueType,
        params: impl Into<Vec<ValueType>>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            ret,
            params: params.into(),
        }
    }
}

/// Literal payload of a named constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue {
    Bool(bool),
    Int(i32),
    /// Host-defined word for user-typed constants.
    Word(u32),
}

impl ConstValue {
    /// The word pushed after the `Push` opcode.
    pub fn to_word(self) -> u32 {
        match self {
            ConstValue::Bool(b) => b as u32,
            ConstValue::Int(i) => i as u32,
            ConstValue::Word(w) => w,
        }
    }
}

/// A named constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub ty: ValueType,
    pub value: ConstValue,
}

impl Constant {
    pub fn new(name: impl Into<String>, ty: ValueType, value: ConstValue) -> Self {
        Self {
            name: name.into(),
            ty,
            value,
        }
    }
}

/// A host callback usable as a trigger condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Callback {
    pub name: String,
    /// Trigger type id, at least [`TriggerType::CALLBACK_START`].
    pub trigger: TriggerType,
    pub func: HostFn,
    pub params: Vec<ValueType>,
}

impl Callback {
    pub fn new(
        name: impl Into<String>,
        trigger: TriggerType,
        func: HostFn,
        params: impl Into<Vec<ValueType>>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            func,
            params: params.into(),
        }
    }
}
