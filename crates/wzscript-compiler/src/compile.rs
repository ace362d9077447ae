//! One compile, from source text to a linked [`Program`].

use bumpalo::Bump;

use wzscript_core::{CompilationError, LexError, ParseError, ParseErrorKind, ParseErrors};
use wzscript_registry::HostRegistry;

use crate::error::CodeError;
use crate::link::link;
use crate::options::CompileOptions;
use crate::parse::Parser;
use crate::program::Program;

/// Everything a compile produces.
#[derive(Debug)]
pub struct CompileOutput {
    pub result: Result<Program, CompilationError>,
    /// Every diagnostic reported, in report order.
    pub diagnostics: ParseErrors,
    /// Lexical problems that did not stop the compile.
    pub warnings: Vec<LexError>,
}

impl CompileOutput {
    /// Line and token text of the last diagnostic.
    pub fn last_error(&self) -> Option<(u32, &str)> {
        self.diagnostics
            .last()
            .map(|error| (error.span.line, error.token.as_str()))
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Compile `source` against the host tables in `registry`.
///
/// All state lives in a context created for this call, so compiles are
/// independent of each other.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(source: &str, registry: &HostRegistry, options: &CompileOptions) -> CompileOutput {
    let arena = Bump::new();
    let mut parser = Parser::new(source, &arena, registry, options);
    let parsed = parser.parse_script();
    let (ctx, warnings) = parser.finish();

    let last = ctx.location();
    let (symbols, strings, mut diagnostics) = ctx.finish();
    log::debug!(
        "parsed {} globals, {} arrays, {} triggers, {} events ({} diagnostics)",
        symbols.globals().len(),
        symbols.arrays().len(),
        symbols.triggers().len(),
        symbols.events().len(),
        diagnostics.len()
    );

    let result = match parsed {
        Err(CodeError::OutOfMemory) => Err(CompilationError::OutOfMemory),
        Err(_) => Err(CompilationError::Parse(diagnostics.clone())),
        Ok(()) if !diagnostics.is_empty() => Err(CompilationError::Parse(diagnostics.clone())),
        Ok(()) => link(symbols.into_parts(), strings, options.debug_info),
    };

    if let Err(err @ CompilationError::UndefinedEvent { .. }) = &result {
        let error = ParseError::new(ParseErrorKind::Fatal, last.span, err.to_string(), last.text);
        log::error!("{error}");
        diagnostics.push(error);
    }

    CompileOutput {
        result,
        diagnostics,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{BinaryOp, OpCode, pack};
    use wzscript_core::{TriggerType, ValueType};
    use wzscript_registry::{HostFn, NativeFunction};

    fn registry() -> HostRegistry {
        let mut registry = HostRegistry::new();
        registry
            .register_function(NativeFunction::new(
                "add",
                HostFn(4),
                ValueType::INT,
                [ValueType::INT, ValueType::INT],
            ))
            .unwrap();
        registry
    }

    fn run(source: &str) -> CompileOutput {
        compile(source, &registry(), &CompileOptions::default())
    }

    #[test]
    fn trigger_and_event_pair() {
        let output = run("public int x;\n\
                          trigger start(init);\n\
                          event go(start) { x = 1 + 2; }");
        let program = output.result.unwrap();
        assert_eq!(program.triggers[0].kind, TriggerType::INIT);
        assert_eq!(program.event_links, vec![0]);
        let int = ValueType::INT.raw();
        assert_eq!(
            program.event_code(0),
            &[
                pack(OpCode::Push, int),
                1,
                pack(OpCode::Push, int),
                2,
                pack(OpCode::BinaryOp, u32::from(u8::from(BinaryOp::Add))),
                pack(OpCode::PopGlobal, 0),
                pack(OpCode::Exit, 0),
            ]
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn errors_fail_the_compile() {
        let output = run("public int x;\nevent e(inactive) { x = add(1, TRUE); }");
        let Err(CompilationError::Parse(errors)) = &output.result else {
            panic!("expected parse failure, got {:?}", output.result);
        };
        assert_eq!(errors.last().map(|e| e.message.as_str()), Some("Type mismatch for paramter 1"));
        assert_eq!(output.last_error(), Some((2, ")")));
    }

    #[test]
    fn undefined_event_is_reported_at_the_end() {
        let output = run("trigger t(every, 5);\nevent foo(t);\n");
        assert_eq!(
            output.result,
            Err(CompilationError::UndefinedEvent { name: "foo".into() })
        );
        let error = output.diagnostics.last().unwrap();
        assert_eq!(error.kind, ParseErrorKind::Fatal);
        assert_eq!(error.message, "Event foo declared without being defined");
    }

    #[test]
    fn unknown_function_is_an_unknown_identifier() {
        let output = run("event e(inactive) { launch(); }");
        assert!(!output.is_ok());
        assert_eq!(output.diagnostics.len(), 1);
        let error = output.diagnostics.last().unwrap();
        assert_eq!(error.message, "unknown identifier");
        assert_eq!(error.token, "launch");
    }

    #[test]
    fn warnings_do_not_fail() {
        let output = run("public int x; /* never closed");
        assert!(output.is_ok());
        assert_eq!(output.warnings.len(), 1);
    }
}
