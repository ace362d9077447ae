//! CompilationContext - all mutable state of one compile.
//!
//! The context owns the symbol tables being built, the diagnostics reported
//! so far, the string table and the few bits of parser state the lexer
//! depends on (the object context and whether locals are being declared).
//! It implements [`SymbolEnv`], so the lexer classifies every word against
//! exactly what the parser has declared up to that point.
//!
//! A context lives for a single compile. Nothing is shared between compiles
//! except the read-only [`HostRegistry`].

use rustc_hash::FxHashMap;

use wzscript_core::{AccessKind, ParseError, ParseErrorKind, ParseErrors, Span, StorageClass, ValueType};
use wzscript_parser::{ConstSymbol, FuncSymbol, FuncTarget, SymbolEnv, VarSymbol};
use wzscript_registry::HostRegistry;

use crate::error::CodeError;
use crate::symbols::{SymbolError, SymbolTables};

/// Where the parser currently is: the last token it looked at.
#[derive(Debug, Clone, Copy, Default)]
pub struct Location<'ast> {
    pub span: Span,
    pub text: &'ast str,
}

/// Unified compilation context.
pub struct CompilationContext<'reg, 'ast> {
    registry: &'reg HostRegistry,
    pub(crate) symbols: SymbolTables,

    /// Static type of the object whose member is being accessed.
    object_context: Option<ValueType>,
    defining_locals: bool,
    debug_info: bool,

    location: Location<'ast>,
    diagnostics: ParseErrors,

    strings: Vec<String>,
    string_index: FxHashMap<String, u32>,

    /// Script function whose body is being compiled.
    current_function: Option<u32>,
}

impl<'reg, 'ast> CompilationContext<'reg, 'ast> {
    pub fn new(registry: &'reg HostRegistry, debug_info: bool) -> Self {
        Self {
            registry,
            symbols: SymbolTables::new(),
            object_context: None,
            defining_locals: false,
            debug_info,
            location: Location::default(),
            diagnostics: ParseErrors::new(),
            strings: Vec::new(),
            string_index: FxHashMap::default(),
            current_function: None,
        }
    }

    pub fn registry(&self) -> &'reg HostRegistry {
        self.registry
    }

    pub fn symbols(&self) -> &SymbolTables {
        &self.symbols
    }

    // ==========================================================================
    // Parser state
    // ==========================================================================

    pub fn set_object_context(&mut self, ty: Option<ValueType>) {
        self.object_context = ty;
    }

    pub fn set_defining_locals(&mut self, defining: bool) {
        self.defining_locals = defining;
    }

    pub fn current_function(&self) -> Option<u32> {
        self.current_function
    }

    pub fn set_current_function(&mut self, function: Option<u32>) {
        self.current_function = function;
    }

    pub fn debug_info(&self) -> bool {
        self.debug_info
    }

    pub fn set_location(&mut self, span: Span, text: &'ast str) {
        self.location = Location { span, text };
    }

    pub fn location(&self) -> Location<'ast> {
        self.location
    }

    /// Line of the token the parser last looked at.
    pub fn line(&self) -> u32 {
        self.location.span.line
    }

    /// The current line when debug info is being generated.
    pub fn debug_line(&self) -> Option<u32> {
        self.debug_info.then_some(self.location.span.line)
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    /// Report a diagnostic at the current location.
    pub fn report(&mut self, kind: ParseErrorKind, message: impl Into<String>) {
        let error = ParseError::new(kind, self.location.span, message, self.location.text);
        log::error!("{} ('{}')", error, error.token);
        self.diagnostics.push(error);
    }

    /// Report a recoverable error.
    pub fn semantic(&mut self, message: impl Into<String>) -> CodeError {
        self.report(ParseErrorKind::Semantic, message);
        CodeError::Semantic
    }

    /// Report an error that stops the compile.
    pub fn fatal(&mut self, message: impl Into<String>) -> CodeError {
        self.report(ParseErrorKind::Fatal, message);
        CodeError::Fatal
    }

    /// Report the allocation failure carried by `err`, passing it on.
    pub fn out_of_memory(&mut self, err: CodeError) -> CodeError {
        if err == CodeError::OutOfMemory {
            self.report(ParseErrorKind::OutOfMemory, "Out of memory");
        }
        err
    }

    /// Report why a conditional or loop could not be built. A fatal error
    /// here means a jump does not reach its target.
    pub fn flow_error(&mut self, err: CodeError) -> CodeError {
        if err == CodeError::Fatal {
            return self.fatal("Jump too far");
        }
        self.out_of_memory(err)
    }

    /// Report a refused declaration. Array shape errors stop the compile.
    pub fn symbol_error(&mut self, err: SymbolError) -> CodeError {
        match err {
            SymbolError::Duplicate { .. } => self.semantic(err.to_string()),
            SymbolError::InvalidArraySize(_) | SymbolError::TooManyDimensions => {
                self.fatal(err.to_string())
            }
        }
    }

    pub fn diagnostics(&self) -> &ParseErrors {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    // ==========================================================================
    // Strings
    // ==========================================================================

    /// Index of `text` in the string table, adding it if new.
    pub fn intern_string(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.string_index.get(text) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.string_index.insert(text.to_string(), index);
        index
    }

    /// Consume the context, keeping what the linker needs.
    pub fn finish(self) -> (SymbolTables, Vec<String>, ParseErrors) {
        (self.symbols, self.strings, self.diagnostics)
    }
}

impl SymbolEnv for CompilationContext<'_, '_> {
    fn access(&self, ty: ValueType) -> AccessKind {
        self.registry.access(ty)
    }

    fn type_named(&self, name: &str) -> Option<ValueType> {
        self.registry.type_by_name(name).map(|entry| entry.id)
    }

    fn object_context(&self) -> Option<ValueType> {
        self.object_context
    }

    fn member(&self, name: &str, context: ValueType) -> Option<VarSymbol> {
        self.registry.member(name, context).map(|var| VarSymbol {
            ty: var.ty,
            storage: StorageClass::Object,
            index: var.index,
            dims: 0,
            get: var.get,
            set: var.set,
        })
    }

    fn external(&self, name: &str) -> Option<VarSymbol> {
        self.registry.external(name).map(|var| VarSymbol {
            ty: var.ty,
            storage: StorageClass::External,
            index: var.index,
            dims: 0,
            get: var.get,
            set: var.set,
        })
    }

    fn local(&self, name: &str) -> Option<VarSymbol> {
        self.symbols
            .locals
            .get(name)
            .map(|var| VarSymbol::script(var.ty, StorageClass::Local, var.slot, 0))
    }

    fn defining_locals(&self) -> bool {
        self.defining_locals
    }

    fn global(&self, name: &str) -> Option<VarSymbol> {
        if let Some((index, var)) = self.symbols.global(name) {
            return Some(VarSymbol::script(var.ty, var.storage, index, 0));
        }
        self.symbols
            .array(name)
            .map(|(index, array)| VarSymbol::script(array.ty, array.storage, index, array.dims()))
    }

    fn constant(&self, name: &str) -> Option<ConstSymbol> {
        self.registry.constant(name).map(|c| ConstSymbol {
            ty: c.ty,
            value: c.value,
        })
    }

    fn script_function(&self, name: &str) -> Option<FuncSymbol> {
        self.symbols.function(name).map(|(index, func)| FuncSymbol {
            ret: func.ret,
            target: FuncTarget::Script(index),
        })
    }

    fn native_function(&self, name: &str) -> Option<FuncSymbol> {
        let index = self.registry.function_index(name)?;
        let func = &self.registry.functions()[index];
        Some(FuncSymbol {
            ret: func.ret,
            target: FuncTarget::Native(index as u32),
        })
    }

    fn trigger(&self, name: &str) -> Option<u32> {
        self.symbols.trigger(name)
    }

    fn event(&self, name: &str) -> Option<u32> {
        self.symbols.event(name)
    }

    fn callback(&self, name: &str) -> Option<u32> {
        self.registry.callback_index(name).map(|i| i as u32)
    }
}
