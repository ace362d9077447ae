//! Code generation.
//!
//! Every operation is a method on [`CompilationContext`]: it consumes the
//! fragments it is given, checks types and storage classes, and returns a
//! new fragment. On failure the diagnostic has already been reported at the
//! parser's current location and the returned [`CodeError`] only tells the
//! parser whether it may recover.
//!
//! - [`expr`]: literals, variable reads, operators, calls, references
//! - [`stmt`]: assignments, exit, pause, return, body finalization
//!
//! [`CodeError`]: crate::error::CodeError

mod expr;
mod stmt;

use wzscript_core::{TriggerType, ValueType};

use crate::bytecode::CodeBlock;

/// A trigger condition waiting for its name and line.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerDecl {
    pub kind: TriggerType,
    pub time: u32,
    /// Condition code for code and callback triggers.
    pub code: Option<CodeBlock>,
}

impl TriggerDecl {
    /// A trigger without condition code.
    pub fn timed(kind: TriggerType, time: u32) -> Self {
        Self {
            kind,
            time,
            code: None,
        }
    }
}

/// Generated code together with the static type of the value it pushes.
#[derive(Debug, Clone, PartialEq)]
pub struct Typed {
    pub code: CodeBlock,
    pub ty: ValueType,
}

impl Typed {
    pub fn new(code: CodeBlock, ty: ValueType) -> Self {
        Self { code, ty }
    }
}
