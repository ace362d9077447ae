//! Fragment kinds built on top of [`CodeBlock`].
//!
//! Besides plain blocks, code generation passes around three richer
//! fragments: parameter lists that remember the type of each argument,
//! conditionals that still have unresolved trailing jumps, and variable
//! accesses that pair locator code with the variable it locates.

mod jumps;

use wzscript_core::ValueType;
use wzscript_parser::VarSymbol;

use crate::bytecode::CodeBlock;
use crate::error::CodeResult;

pub use jumps::{else_clause, else_if, finish_conditional, if_clause, while_loop};

/// Code pushing call arguments plus the type of each one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBlock {
    pub code: CodeBlock,
    pub types: Vec<ValueType>,
}

impl ParamBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one argument.
    pub fn push(&mut self, code: CodeBlock, ty: ValueType) -> CodeResult<()> {
        self.code.try_append(code)?;
        self.types.push(ty);
        Ok(())
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A conditional whose trailing jumps do not know their target yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CondBlock {
    pub code: CodeBlock,
    /// Positions of the placeholder jumps ending each clause.
    pub pending: Vec<usize>,
}

/// Locator code for an array element or object member, with its variable.
///
/// Reads and writes use the same fragment; only the final access
/// instruction differs.
#[derive(Debug, Clone, PartialEq)]
pub struct VarAccess {
    pub code: CodeBlock,
    pub var: VarSymbol,
}
