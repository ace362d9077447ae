//! Value types, storage classes and trigger kinds.
//!
//! These are the tags written into the instruction image and the program
//! tables, so their numeric values are part of the binary format shared
//! with the virtual machine.

use std::fmt;

/// Flag bit marking a value passed by reference.
pub const VAL_REF: u32 = 0x0010_0000;

/// A script value type.
///
/// Built-in types occupy the low ids; host types registered in the type
/// table start at [`ValueType::USER_START`] and are contiguous.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueType(u32);

impl ValueType {
    pub const BOOL: ValueType = ValueType(0);
    pub const INT: ValueType = ValueType(1);
    pub const FLOAT: ValueType = ValueType(2);
    pub const STRING: ValueType = ValueType(3);
    pub const TRIGGER: ValueType = ValueType(4);
    pub const EVENT: ValueType = ValueType(5);
    pub const VOID: ValueType = ValueType(6);
    pub const OPCODE: ValueType = ValueType(7);
    pub const PACKED_OPCODE: ValueType = ValueType(8);
    pub const OBJ_GETSET: ValueType = ValueType(9);
    pub const FUNC_EXTERN: ValueType = ValueType(10);

    /// First id available to host-registered types.
    pub const USER_START: u32 = 11;

    /// Wrap a raw type id.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ValueType(raw)
    }

    /// The `index`th host type.
    #[inline]
    pub const fn user(index: u32) -> Self {
        ValueType(Self::USER_START + index)
    }

    /// Raw id including the reference flag.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is a reference type.
    #[inline]
    pub const fn is_ref(self) -> bool {
        self.0 & VAL_REF != 0
    }

    /// The reference form of this type.
    #[inline]
    pub const fn to_ref(self) -> Self {
        ValueType(self.0 | VAL_REF)
    }

    /// This type with the reference flag cleared.
    #[inline]
    pub const fn without_ref(self) -> Self {
        ValueType(self.0 & !VAL_REF)
    }

    /// Index into the host type table, if this is a host type.
    pub fn user_index(self) -> Option<usize> {
        let raw = self.without_ref().0;
        (raw >= Self::USER_START).then(|| (raw - Self::USER_START) as usize)
    }

    /// Name of a built-in type, if it is one.
    pub fn builtin_name(self) -> Option<&'static str> {
        Some(match self.without_ref() {
            ValueType::BOOL => "bool",
            ValueType::INT => "int",
            ValueType::FLOAT => "float",
            ValueType::STRING => "string",
            ValueType::TRIGGER => "trigger",
            ValueType::EVENT => "event",
            ValueType::VOID => "void",
            ValueType::OPCODE => "opcode",
            ValueType::PACKED_OPCODE => "pkopcode",
            ValueType::OBJ_GETSET => "objgetset",
            ValueType::FUNC_EXTERN => "funcextern",
            _ => return None,
        })
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_ref() { "ref " } else { "" };
        match self.builtin_name() {
            Some(name) => write!(f, "{prefix}{name}"),
            None => write!(f, "{prefix}type#{}", self.without_ref().0),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a variable's value is stored and retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Indexed global slot visible to other scripts.
    Public,
    /// Indexed global slot private to this script.
    Private,
    /// Slot in the frame of the current event or function.
    Local,
    /// Host variable reached through get/set functions.
    External,
    /// Member of a host object, only visible after `expr.`.
    Object,
}

impl StorageClass {
    /// Whether the variable lives in an indexed global slot.
    pub fn is_global(self) -> bool {
        matches!(self, StorageClass::Public | StorageClass::Private)
    }
}

/// How values of a host type are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessKind {
    /// Plain value, compiled as the generic user family.
    #[default]
    Value,
    /// Host object with member variables, compiled as the object family.
    Object,
}

/// Kind of trigger, as stored in the trigger table.
///
/// Callback triggers use the id the host registered for the callback,
/// which is always at least [`TriggerType::CALLBACK_START`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerType(pub u32);

impl TriggerType {
    pub const INIT: TriggerType = TriggerType(0);
    pub const CODE: TriggerType = TriggerType(1);
    pub const WAIT: TriggerType = TriggerType(2);
    pub const EVERY: TriggerType = TriggerType(3);
    pub const PAUSE: TriggerType = TriggerType(4);

    /// First id available to host callbacks.
    pub const CALLBACK_START: u32 = 5;

    /// Whether this trigger fires from a host callback.
    pub fn is_callback(self) -> bool {
        self.0 >= Self::CALLBACK_START
    }
}
