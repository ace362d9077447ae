//! Bytecode types (opcodes, packed words, code fragments).

mod block;
mod opcode;

pub use block::{CodeBlock, DebugEntry};
pub use opcode::{
    ARRAY_BASE_MASK, ARRAY_DIMENSION_MASK, ARRAY_DIMENSION_SHIFT, BinaryOp, MAX_DIMENSIONS,
    MAX_ELEMENTS, MAX_JUMP, MIN_JUMP, OPCODE_DATA_MASK, OPCODE_SHIFT, OpCode, UnaryOp, Word,
    array_data, jump_data, jump_offset, pack, split_array_data, unpack,
};
