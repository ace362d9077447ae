//! Symbol tables built while a script is compiled.
//!
//! Globals, arrays, triggers, events and script functions live for the
//! whole compile; locals live in a [`LocalScope`] that is cleared after each
//! body. Every table keeps declaration order, which is also index order and
//! therefore the layout of the final program, plus an [`FxHashMap`] name
//! index for the lexer's lookups.
//!
//! Public and private globals share one index space. Arrays have their own.

use rustc_hash::FxHashMap;
use thiserror::Error;

use wzscript_core::{StorageClass, TriggerType, ValueType};

use crate::bytecode::{CodeBlock, MAX_DIMENSIONS, MAX_ELEMENTS};
use crate::scope::LocalScope;

// ============================================================================
// Errors
// ============================================================================

/// What kind of name a duplicate declaration collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Trigger,
    Event,
    Function,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Variable => "Variable",
            SymbolKind::Trigger => "Trigger",
            SymbolKind::Event => "Event",
            SymbolKind::Function => "Function",
        }
    }
}

/// A declaration the tables refuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("{} {name} already defined", kind.as_str())]
    Duplicate { kind: SymbolKind, name: String },

    #[error("Invalid array size {0}")]
    InvalidArraySize(i32),

    #[error("Too many dimensions for array")]
    TooManyDimensions,
}

// ============================================================================
// Entries
// ============================================================================

/// A global scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: ValueType,
    /// [`StorageClass::Public`] or [`StorageClass::Private`].
    pub storage: StorageClass,
}

/// A global array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVar {
    pub name: String,
    pub ty: ValueType,
    pub storage: StorageClass,
    pub extents: Vec<u8>,
}

impl ArrayVar {
    /// Total number of elements.
    pub fn elements(&self) -> u32 {
        self.extents.iter().map(|&e| u32::from(e)).product()
    }

    pub fn dims(&self) -> u8 {
        self.extents.len() as u8
    }
}

/// A trigger, named or created inline for an event.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSymbol {
    /// Empty for inline triggers.
    pub name: String,
    pub kind: TriggerType,
    /// Re-check interval or wait time.
    pub time: u32,
    /// Condition code for code and callback triggers.
    pub code: Option<CodeBlock>,
}

/// An event or the event backing a script function.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSymbol {
    pub name: String,
    /// `None` until the body has been compiled.
    pub code: Option<CodeBlock>,
    /// Activating trigger, -1 when inactive.
    pub trigger: i32,
    /// Types of the locals (parameters first).
    pub locals: Vec<ValueType>,
    /// Index of the script function this event implements.
    pub function: Option<u32>,
}

/// A script-defined function.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFunction {
    pub name: String,
    /// Event holding the body.
    pub event: u32,
    pub ret: ValueType,
    pub params: Vec<ValueType>,
    pub defined: bool,
}

/// Validate array extents as written in a declaration.
pub fn check_extents(extents: &[i32]) -> Result<Vec<u8>, SymbolError> {
    let mut checked = Vec::with_capacity(extents.len());
    for (i, &extent) in extents.iter().enumerate() {
        if i >= MAX_DIMENSIONS {
            return Err(SymbolError::TooManyDimensions);
        }
        if extent <= 0 || extent >= MAX_ELEMENTS {
            return Err(SymbolError::InvalidArraySize(extent));
        }
        checked.push(extent as u8);
    }
    Ok(checked)
}

// ============================================================================
// SymbolTables
// ============================================================================

/// Every table a compile builds.
#[derive(Debug, Default)]
pub struct SymbolTables {
    globals: Vec<GlobalVar>,
    globals_by_name: FxHashMap<String, u32>,

    arrays: Vec<ArrayVar>,
    arrays_by_name: FxHashMap<String, u32>,

    pub locals: LocalScope,

    triggers: Vec<TriggerSymbol>,
    triggers_by_name: FxHashMap<String, u32>,

    events: Vec<EventSymbol>,
    events_by_name: FxHashMap<String, u32>,

    functions: Vec<ScriptFunction>,
    functions_by_name: FxHashMap<String, u32>,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_variable(&self, name: &str) -> Result<(), SymbolError> {
        if self.globals_by_name.contains_key(name) || self.arrays_by_name.contains_key(name) {
            return Err(SymbolError::Duplicate {
                kind: SymbolKind::Variable,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================================================
    // Globals
    // ==========================================================================

    /// Declare a global scalar and return its index.
    pub fn add_global(
        &mut self,
        name: &str,
        ty: ValueType,
        storage: StorageClass,
    ) -> Result<u32, SymbolError> {
        self.check_variable(name)?;
        let index = self.globals.len() as u32;
        self.globals.push(GlobalVar {
            name: name.to_string(),
            ty,
            storage,
        });
        self.globals_by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// Declare a global array and return its array index.
    pub fn add_array(
        &mut self,
        name: &str,
        ty: ValueType,
        storage: StorageClass,
        extents: Vec<u8>,
    ) -> Result<u32, SymbolError> {
        self.check_variable(name)?;
        let index = self.arrays.len() as u32;
        self.arrays.push(ArrayVar {
            name: name.to_string(),
            ty,
            storage,
            extents,
        });
        self.arrays_by_name.insert(name.to_string(), index);
        Ok(index)
    }

    pub fn global(&self, name: &str) -> Option<(u32, &GlobalVar)> {
        let &index = self.globals_by_name.get(name)?;
        Some((index, &self.globals[index as usize]))
    }

    pub fn array(&self, name: &str) -> Option<(u32, &ArrayVar)> {
        let &index = self.arrays_by_name.get(name)?;
        Some((index, &self.arrays[index as usize]))
    }

    pub fn globals(&self) -> &[GlobalVar] {
        &self.globals
    }

    pub fn arrays(&self) -> &[ArrayVar] {
        &self.arrays
    }

    // ==========================================================================
    // Triggers
    // ==========================================================================

    /// Add a trigger and return its index. Inline triggers have an empty
    /// name and are never found by name.
    pub fn add_trigger(&mut self, trigger: TriggerSymbol) -> Result<u32, SymbolError> {
        if !trigger.name.is_empty() && self.triggers_by_name.contains_key(&trigger.name) {
            return Err(SymbolError::Duplicate {
                kind: SymbolKind::Trigger,
                name: trigger.name,
            });
        }
        let index = self.triggers.len() as u32;
        if !trigger.name.is_empty() {
            self.triggers_by_name.insert(trigger.name.clone(), index);
        }
        self.triggers.push(trigger);
        Ok(index)
    }

    pub fn trigger(&self, name: &str) -> Option<u32> {
        self.triggers_by_name.get(name).copied()
    }

    pub fn triggers(&self) -> &[TriggerSymbol] {
        &self.triggers
    }

    // ==========================================================================
    // Events
    // ==========================================================================

    /// Declare an event without a body and return its index.
    pub fn declare_event(&mut self, name: &str) -> Result<u32, SymbolError> {
        if self.events_by_name.contains_key(name) {
            return Err(SymbolError::Duplicate {
                kind: SymbolKind::Event,
                name: name.to_string(),
            });
        }
        let index = self.events.len() as u32;
        self.events.push(EventSymbol {
            name: name.to_string(),
            code: None,
            trigger: -1,
            locals: Vec::new(),
            function: None,
        });
        self.events_by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// Record the trigger an event is linked to.
    pub fn link_event(&mut self, index: u32, trigger: i32) {
        if let Some(event) = self.events.get_mut(index as usize) {
            event.trigger = trigger;
        }
    }

    /// Give an event its body and local types.
    pub fn define_event(&mut self, index: u32, code: CodeBlock, trigger: i32, locals: Vec<ValueType>) {
        if let Some(event) = self.events.get_mut(index as usize) {
            event.code = Some(code);
            event.trigger = trigger;
            event.locals = locals;
        }
    }

    pub fn event(&self, name: &str) -> Option<u32> {
        self.events_by_name.get(name).copied()
    }

    pub fn event_at(&self, index: u32) -> Option<&EventSymbol> {
        self.events.get(index as usize)
    }

    pub fn events(&self) -> &[EventSymbol] {
        &self.events
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Declare a script function together with the inactive event backing
    /// it. Returns the function index.
    pub fn declare_function(
        &mut self,
        name: &str,
        ret: ValueType,
        params: Vec<ValueType>,
    ) -> Result<u32, SymbolError> {
        if self.functions_by_name.contains_key(name) {
            return Err(SymbolError::Duplicate {
                kind: SymbolKind::Function,
                name: name.to_string(),
            });
        }
        let event = self.declare_event(name)?;
        let index = self.functions.len() as u32;
        self.events[event as usize].function = Some(index);
        self.functions.push(ScriptFunction {
            name: name.to_string(),
            event,
            ret,
            params,
            defined: false,
        });
        self.functions_by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// Mark a function as having a body.
    pub fn mark_defined(&mut self, index: u32) {
        if let Some(func) = self.functions.get_mut(index as usize) {
            func.defined = true;
        }
    }

    pub fn function(&self, name: &str) -> Option<(u32, &ScriptFunction)> {
        let &index = self.functions_by_name.get(name)?;
        Some((index, &self.functions[index as usize]))
    }

    pub fn function_at(&self, index: u32) -> Option<&ScriptFunction> {
        self.functions.get(index as usize)
    }

    pub fn functions(&self) -> &[ScriptFunction] {
        &self.functions
    }

    /// Split into the parts the linker consumes.
    pub fn into_parts(self) -> SymbolParts {
        SymbolParts {
            globals: self.globals,
            arrays: self.arrays,
            triggers: self.triggers,
            events: self.events,
            functions: self.functions,
        }
    }
}

/// Owned contents of [`SymbolTables`] once parsing is over.
#[derive(Debug, Default)]
pub struct SymbolParts {
    pub globals: Vec<GlobalVar>,
    pub arrays: Vec<ArrayVar>,
    pub triggers: Vec<TriggerSymbol>,
    pub events: Vec<EventSymbol>,
    pub functions: Vec<ScriptFunction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_and_private_share_indices() {
        let mut tables = SymbolTables::new();
        assert_eq!(tables.add_global("a", ValueType::INT, StorageClass::Public), Ok(0));
        assert_eq!(tables.add_global("b", ValueType::BOOL, StorageClass::Private), Ok(1));
        assert_eq!(tables.add_global("c", ValueType::INT, StorageClass::Public), Ok(2));
        assert_eq!(tables.global("b").map(|(i, g)| (i, g.storage)), Some((1, StorageClass::Private)));
    }

    #[test]
    fn arrays_have_their_own_indices() {
        let mut tables = SymbolTables::new();
        tables.add_global("a", ValueType::INT, StorageClass::Public).unwrap();
        let index = tables
            .add_array("grid", ValueType::INT, StorageClass::Public, vec![4, 3])
            .unwrap();
        assert_eq!(index, 0);
        let (_, grid) = tables.array("grid").unwrap();
        assert_eq!(grid.elements(), 12);
        assert_eq!(grid.dims(), 2);
    }

    #[test]
    fn duplicate_variable() {
        let mut tables = SymbolTables::new();
        tables.add_global("a", ValueType::INT, StorageClass::Public).unwrap();
        let err = tables
            .add_array("a", ValueType::INT, StorageClass::Public, vec![2])
            .unwrap_err();
        assert_eq!(err.to_string(), "Variable a already defined");
    }

    #[test]
    fn extent_checks() {
        assert_eq!(check_extents(&[1, 254]), Ok(vec![1, 254]));
        assert_eq!(check_extents(&[0]), Err(SymbolError::InvalidArraySize(0)));
        assert_eq!(check_extents(&[255]), Err(SymbolError::InvalidArraySize(255)));
        assert_eq!(check_extents(&[2, 2, 2, 2, 2]), Err(SymbolError::TooManyDimensions));
        assert_eq!(
            SymbolError::InvalidArraySize(-3).to_string(),
            "Invalid array size -3"
        );
    }

    #[test]
    fn inline_triggers_are_anonymous() {
        let mut tables = SymbolTables::new();
        let anon = TriggerSymbol {
            name: String::new(),
            kind: TriggerType::INIT,
            time: 0,
            code: None,
        };
        assert_eq!(tables.add_trigger(anon.clone()), Ok(0));
        assert_eq!(tables.add_trigger(anon), Ok(1));
        assert_eq!(tables.trigger(""), None);
    }

    #[test]
    fn functions_are_backed_by_events() {
        let mut tables = SymbolTables::new();
        tables.declare_event("start").unwrap();
        let func = tables
            .declare_function("twice", ValueType::INT, vec![ValueType::INT])
            .unwrap();
        let (_, info) = tables.function("twice").unwrap();
        assert_eq!(info.event, 1);
        assert_eq!(tables.event_at(1).and_then(|e| e.function), Some(func));
        assert_eq!(tables.event_at(1).map(|e| e.trigger), Some(-1));
        assert!(!info.defined);
    }
}
