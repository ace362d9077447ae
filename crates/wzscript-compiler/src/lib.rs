//! Trigger/event script compiler.
//!
//! A single pass over the source: the parser pulls classified tokens from
//! the lexer, code generation builds owned fragments as each construct is
//! recognized, and the linker lays the finished fragments out as a
//! [`Program`].
//!
//! ## Modules
//!
//! - [`bytecode`]: Instruction words, opcodes and code fragments
//! - [`codegen`]: Code generation on the compilation context
//! - [`context`]: Per-compile state, also the lexer's symbol environment
//! - [`emit`]: Parameter lists, conditionals and variable accesses
//! - [`link`]: Laying out the final program
//! - [`parse`]: Grammar-driven parser with error recovery
//! - [`program`]: The compiled program and its debug tables
//! - [`scope`]: Locals of the body being compiled
//! - [`symbols`]: Globals, arrays, triggers, events and script functions

pub mod bytecode;
pub mod codegen;
mod compile;
pub mod context;
pub mod emit;
pub mod error;
pub mod link;
mod options;
pub mod parse;
pub mod program;
pub mod scope;
pub mod symbols;

pub use compile::{CompileOutput, compile};
pub use context::CompilationContext;
pub use error::{CodeError, CodeResult};
pub use options::CompileOptions;
pub use parse::Parser;
pub use program::{ArrayInfo, FunctionInfo, Program, ProgramDebug, TriggerData, VarDebug};

// Re-export CompilationError from core for convenience
pub use wzscript_core::CompilationError;
