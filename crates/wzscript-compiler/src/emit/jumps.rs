//! Control flow with jump backpatching.
//!
//! An `if` clause compiles to
//!
//! ```text
//! cond
//! JUMPFALSE  +(body + 2)     ; to the next clause
//! body
//! JUMP       ?               ; pending, to the end of the conditional
//! ```
//!
//! Clauses of an `else if` chain are concatenated with their pending jumps
//! carried along; [`finish_conditional`] resolves every pending jump once the
//! total size is known. Loops need no pending jumps since both targets are
//! known when the loop is built.
//!
//! A jump reaches at most [`MAX_JUMP`] words either way. A body too large
//! for that fails with [`CodeError::Fatal`].

use crate::bytecode::{CodeBlock, MAX_JUMP, OpCode};
use crate::error::{CodeError, CodeResult};

use super::CondBlock;

/// Build one `if` clause. `line` is recorded at the clause start when
/// debug info is on.
pub fn if_clause(cond: CodeBlock, body: CodeBlock, line: Option<u32>) -> CodeResult<CondBlock> {
    let skip = word_offset(body.len() + 2)?;
    let mut code = CodeBlock::alloc(cond.len() + body.len() + 2)?;

    code.append(cond);
    code.emit_relative_jump(OpCode::JumpFalse, skip)?;
    code.append(body);
    let pending = code.emit_jump(OpCode::Jump);

    if let Some(line) = line {
        code.prepend_debug(line);
    }

    Ok(CondBlock {
        code,
        pending: vec![pending],
    })
}

/// Append an `else if` clause to a chain.
pub fn else_if(prev: CondBlock, next: CondBlock) -> CodeResult<CondBlock> {
    let base = prev.code.len();
    let mut pending = prev.pending;
    pending.extend(next.pending.iter().map(|at| at + base));

    Ok(CondBlock {
        code: CodeBlock::concat([prev.code, next.code])?,
        pending,
    })
}

/// Append the terminal `else` body to a chain.
pub fn else_clause(prev: CondBlock, body: CodeBlock) -> CodeResult<CondBlock> {
    Ok(CondBlock {
        code: CodeBlock::concat([prev.code, body])?,
        pending: prev.pending,
    })
}

/// Resolve every pending jump to the end of the conditional.
pub fn finish_conditional(cond: CondBlock) -> CodeResult<CodeBlock> {
    let CondBlock { mut code, pending } = cond;
    let end = code.len();
    for at in pending {
        code.patch_jump(at, end)?;
    }
    Ok(code)
}

/// Build a `while` loop.
pub fn while_loop(cond: CodeBlock, body: CodeBlock, line: Option<u32>) -> CodeResult<CodeBlock> {
    let skip = word_offset(body.len() + 2)?;
    let back = -word_offset(cond.len() + body.len() + 1)?;
    let mut code = CodeBlock::alloc(cond.len() + body.len() + 2)?;

    code.append(cond);
    code.emit_relative_jump(OpCode::JumpFalse, skip)?;
    code.append(body);
    code.emit_relative_jump(OpCode::Jump, back)?;

    if let Some(line) = line {
        code.prepend_debug(line);
    }
    Ok(code)
}

fn word_offset(words: usize) -> CodeResult<i32> {
    i32::try_from(words)
        .ok()
        .filter(|&offset| offset <= MAX_JUMP)
        .ok_or(CodeError::Fatal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{DebugEntry, jump_offset, unpack};

    fn block(n: usize) -> CodeBlock {
        let mut b = CodeBlock::new();
        for _ in 0..n {
            b.emit(OpCode::Pop);
        }
        b
    }

    fn jump_at(code: &CodeBlock, at: usize) -> (OpCode, i32) {
        let (op, data) = unpack(code.words()[at]).unwrap();
        (op, jump_offset(data))
    }

    #[test]
    fn single_if_falls_through_to_end() {
        let code = finish_conditional(if_clause(block(3), block(2), None).unwrap()).unwrap();
        assert_eq!(code.len(), 7);
        assert_eq!(jump_at(&code, 3), (OpCode::JumpFalse, 4));
        assert_eq!(jump_at(&code, 6), (OpCode::Jump, 1));
    }

    #[test]
    fn if_else_targets() {
        let chain = if_clause(block(3), block(2), None).unwrap();
        let code = finish_conditional(else_clause(chain, block(4)).unwrap()).unwrap();
        // JUMPFALSE at 3 lands on the else body at 7, just past the JUMP at 6
        assert_eq!(jump_at(&code, 3), (OpCode::JumpFalse, 4));
        // JUMP at 6 lands on the end, 11
        assert_eq!(jump_at(&code, 6), (OpCode::Jump, 5));
    }

    #[test]
    fn else_if_chain_targets() {
        let first = if_clause(block(1), block(1), None).unwrap();
        let second = if_clause(block(2), block(3), None).unwrap();
        let chain = else_if(first, second).unwrap();
        assert_eq!(chain.pending, vec![3, 10]);

        let code = finish_conditional(else_clause(chain, block(2)).unwrap()).unwrap();
        let end = code.len() as i32;
        assert_eq!(end, 13);
        assert_eq!(jump_at(&code, 1), (OpCode::JumpFalse, 3));
        assert_eq!(jump_at(&code, 3), (OpCode::Jump, end - 3));
        assert_eq!(jump_at(&code, 6), (OpCode::JumpFalse, 5));
        assert_eq!(jump_at(&code, 10), (OpCode::Jump, end - 10));
    }

    #[test]
    fn loop_jumps_back_to_condition() {
        let code = while_loop(block(3), block(2), None).unwrap();
        assert_eq!(code.len(), 7);
        assert_eq!(jump_at(&code, 3), (OpCode::JumpFalse, 4));
        assert_eq!(jump_at(&code, 6), (OpCode::Jump, -6));
    }

    #[test]
    fn long_loop_body_keeps_exact_targets() {
        let code = while_loop(block(1), block(40_000), None).unwrap();
        assert_eq!(jump_at(&code, 1), (OpCode::JumpFalse, 40_002));
        assert_eq!(jump_at(&code, 40_002), (OpCode::Jump, -40_002));
    }

    #[test]
    fn long_if_body_lands_past_the_clause() {
        let chain = if_clause(block(1), block(40_000), None).unwrap();
        let code = finish_conditional(else_clause(chain, block(1)).unwrap()).unwrap();
        assert_eq!(jump_at(&code, 1), (OpCode::JumpFalse, 40_002));
        assert_eq!(jump_at(&code, 40_002), (OpCode::Jump, 2));
    }

    #[test]
    fn body_beyond_jump_range_is_fatal() {
        let body = block(MAX_JUMP as usize);
        assert_eq!(while_loop(block(1), body, None).err(), Some(CodeError::Fatal));
    }

    #[test]
    fn clause_debug_entry_precedes_body_entries() {
        let mut body = block(1);
        body.add_debug(0, 8);
        let cond = if_clause(block(2), body, Some(7)).unwrap();
        assert_eq!(
            cond.code.debug(),
            &[DebugEntry { offset: 0, line: 7 }, DebugEntry { offset: 3, line: 8 }]
        );
    }
}
