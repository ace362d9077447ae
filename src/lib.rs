//! Compiler for the trigger/event scripting language.
//!
//! The host describes its types, variables, functions, constants and
//! callbacks in a [`HostRegistry`]; [`ScriptCompiler`] turns script source
//! into a [`Program`] the interpreter runs.
//!
//! ```text
//! public int count;
//! trigger tick(every, 10);
//! event counter(tick) { count = count + 1; }
//! ```

pub use wzscript_compiler::{
    ArrayInfo, CompileOptions, CompileOutput, FunctionInfo, Program, ProgramDebug, TriggerData,
    VarDebug, bytecode, compile,
};
pub use wzscript_core::{
    AccessKind, CompilationError, LexError, ParseError, ParseErrorKind, ParseErrors,
    RegistrationError, Span, StorageClass, TriggerType, ValueType,
};
pub use wzscript_registry::{
    Callback, ConstValue, Constant, HostFn, HostRegistry, HostVariable, NativeFunction, TypeEntry,
};

/// Compiles scripts against one set of host tables and remembers the
/// diagnostics of the last compile.
#[derive(Debug)]
pub struct ScriptCompiler {
    registry: HostRegistry,
    diagnostics: ParseErrors,
    warnings: Vec<LexError>,
}

impl ScriptCompiler {
    pub fn new(registry: HostRegistry) -> Self {
        Self {
            registry,
            diagnostics: ParseErrors::new(),
            warnings: Vec::new(),
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Compile a source buffer.
    ///
    /// The buffer ends at its length or at the first NUL byte. Bytes that
    /// are not valid UTF-8 are replaced before lexing.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(
        &mut self,
        source: &[u8],
        options: &CompileOptions,
    ) -> Result<Program, CompilationError> {
        let end = source.iter().position(|&b| b == 0).unwrap_or(source.len());
        let text = String::from_utf8_lossy(&source[..end]);
        log::debug!("compiling {} bytes (debug info: {})", end, options.debug_info);

        let output = compile(&text, &self.registry, options);
        self.diagnostics = output.diagnostics;
        self.warnings = output.warnings;
        output.result
    }

    /// Line and token text of the last problem reported by the last
    /// compile.
    pub fn last_error(&self) -> Option<(u32, String)> {
        self.diagnostics
            .last()
            .map(|error| (error.span.line, error.token.clone()))
    }

    /// Every diagnostic of the last compile.
    pub fn diagnostics(&self) -> &ParseErrors {
        &self.diagnostics
    }

    /// Lexical warnings of the last compile.
    pub fn warnings(&self) -> &[LexError] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ends_at_nul() {
        let mut compiler = ScriptCompiler::new(HostRegistry::new());
        let program = compiler
            .compile(b"public int x;\0 this is not a script", &CompileOptions::default())
            .unwrap();
        assert_eq!(program.globals, vec![ValueType::INT]);
        assert_eq!(compiler.last_error(), None);
    }

    #[test]
    fn last_error_is_reset_by_the_next_compile() {
        let mut compiler = ScriptCompiler::new(HostRegistry::new());
        let options = CompileOptions::default();
        assert!(compiler.compile(b"public int x\npublic int y;", &options).is_err());
        assert_eq!(compiler.last_error(), Some((2, "public".to_string())));

        assert!(compiler.compile(b"public int x;", &options).is_ok());
        assert_eq!(compiler.last_error(), None);
        assert!(compiler.diagnostics().is_empty());
    }
}
