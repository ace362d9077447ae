//! Code fragments.
//!
//! A [`CodeBlock`] is a unit of generated, not yet linked code: the
//! instruction words plus, when debug info is on, the source lines of the
//! statements it contains. Code generation consumes blocks and returns new
//! ones; the linker finally concatenates them into one image.

use crate::error::{CodeError, CodeResult};

use super::opcode::{OpCode, Word, jump_data, pack, unpack};

/// Maps an instruction offset to the source line it was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugEntry {
    /// Offset in words from the start of the enclosing block.
    pub offset: u32,
    pub line: u32,
}

/// A fragment of generated code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBlock {
    words: Vec<Word>,
    debug: Vec<DebugEntry>,
}

impl CodeBlock {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a block able to hold `words` words without growing.
    ///
    /// Allocation failure is reported as [`CodeError::OutOfMemory`].
    pub fn alloc(words: usize) -> CodeResult<Self> {
        let mut block = Self::new();
        block
            .words
            .try_reserve_exact(words)
            .map_err(|_| CodeError::OutOfMemory)?;
        Ok(block)
    }

    /// Allocate a block holding `parts` in order.
    pub fn concat(parts: impl IntoIterator<Item = CodeBlock>) -> CodeResult<Self> {
        let parts: Vec<CodeBlock> = parts.into_iter().collect();
        let size = parts.iter().map(CodeBlock::len).sum();
        let mut block = Self::alloc(size)?;
        for part in parts {
            block.append(part);
        }
        Ok(block)
    }

    // ==========================================================================
    // Emission
    // ==========================================================================

    /// Emit an opcode with a zero immediate.
    pub fn emit(&mut self, op: OpCode) {
        self.words.push(pack(op, 0));
    }

    /// Emit an opcode with an immediate.
    pub fn emit_packed(&mut self, op: OpCode, data: u32) {
        self.words.push(pack(op, data));
    }

    /// Emit a raw operand word.
    pub fn emit_word(&mut self, word: Word) {
        self.words.push(word);
    }

    /// Emit a jump with a placeholder offset and return its position.
    pub fn emit_jump(&mut self, op: OpCode) -> usize {
        let at = self.words.len();
        self.emit(op);
        at
    }

    /// Emit a jump whose target lies `offset` words from the jump itself.
    ///
    /// Fails with [`CodeError::Fatal`] when the offset does not fit the
    /// immediate; nothing is emitted then.
    pub fn emit_relative_jump(&mut self, op: OpCode, offset: i32) -> CodeResult<()> {
        let data = jump_data(offset).ok_or(CodeError::Fatal)?;
        self.emit_packed(op, data);
        Ok(())
    }

    /// Point the jump at `at` to `target`, keeping its opcode.
    pub fn patch_jump(&mut self, at: usize, target: usize) -> CodeResult<()> {
        let offset = i32::try_from(target as i64 - at as i64).map_err(|_| CodeError::Fatal)?;
        let data = jump_data(offset).ok_or(CodeError::Fatal)?;
        if let Some((op, _)) = self.words.get(at).copied().and_then(unpack) {
            self.words[at] = pack(op, data);
        }
        Ok(())
    }

    /// Move `other` to the end of this block, shifting its debug offsets.
    pub fn append(&mut self, other: CodeBlock) {
        let base = self.words.len() as u32;
        self.words.extend(other.words);
        self.debug.extend(other.debug.into_iter().map(|entry| DebugEntry {
            offset: entry.offset + base,
            line: entry.line,
        }));
    }

    /// Like [`append`](Self::append), growing the block first.
    pub fn try_append(&mut self, other: CodeBlock) -> CodeResult<()> {
        self.words
            .try_reserve_exact(other.len())
            .map_err(|_| CodeError::OutOfMemory)?;
        self.append(other);
        Ok(())
    }

    // ==========================================================================
    // Debug info
    // ==========================================================================

    /// Record that the code at `offset` comes from `line`.
    pub fn add_debug(&mut self, offset: usize, line: u32) {
        self.debug.push(DebugEntry {
            offset: offset as u32,
            line,
        });
    }

    /// Record `line` for offset zero, ahead of any entries already present.
    pub fn prepend_debug(&mut self, line: u32) {
        self.debug.insert(0, DebugEntry { offset: 0, line });
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn debug(&self) -> &[DebugEntry] {
        &self.debug
    }

    /// Split into words and debug entries.
    pub fn into_parts(self) -> (Vec<Word>, Vec<DebugEntry>) {
        (self.words, self.debug)
    }

    /// Opcodes in order, skipping operand words.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let mut at = 0;
        while let Some((op, _)) = self.words.get(at).copied().and_then(unpack) {
            ops.push(op);
            at += op.size();
        }
        ops
    }
}
