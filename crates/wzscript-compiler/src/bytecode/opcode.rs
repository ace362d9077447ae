//! Instruction set of the script virtual machine.
//!
//! Every instruction starts with one 32-bit word: the opcode in the top
//! eight bits and a 24-bit immediate below it. Some opcodes are followed by
//! one extra operand word.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A single instruction word.
pub type Word = u32;

pub const OPCODE_SHIFT: u32 = 24;
pub const OPCODE_DATA_MASK: u32 = 0x00FF_FFFF;

pub const ARRAY_DIMENSION_SHIFT: u32 = 20;
pub const ARRAY_DIMENSION_MASK: u32 = 0x00F0_0000;
pub const ARRAY_BASE_MASK: u32 = 0x0000_FFFF;

/// Range of a relative jump, in words.
pub const MAX_JUMP: i32 = 0x007F_FFFF;
pub const MIN_JUMP: i32 = -0x0080_0000;

/// Maximum number of array dimensions.
pub const MAX_DIMENSIONS: usize = 4;
/// Extents must be below this bound.
pub const MAX_ELEMENTS: i32 = 255;

/// Operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum OpCode {
    /// Push a literal. Immediate: type tag. Operand: value word.
    Push = 0,
    /// Push a reference to a global. Immediate: type with the ref flag.
    /// Operand: global index.
    PushRef,
    /// Discard the top of the stack.
    Pop,
    /// Immediate: global index.
    PushGlobal,
    PopGlobal,
    /// Immediate: packed dimension count and array index.
    PushArrayGlobal,
    PopArrayGlobal,
    /// Call a native function. Operand: host function id.
    Call,
    /// Call a variable get/set function. Immediate: host slot index.
    /// Operand: host function id.
    VarCall,
    /// Immediate: signed relative offset in words.
    Jump,
    JumpTrue,
    JumpFalse,
    /// Immediate: [`BinaryOp`] tag.
    BinaryOp,
    /// Immediate: [`UnaryOp`] tag.
    UnaryOp,
    Exit,
    /// Immediate: pause time.
    Pause,
    /// Call a script function. Operand: event index.
    Func,
    /// Immediate: local slot.
    PushLocal,
    PopLocal,
    /// Push a reference to a local. Immediate: type with the ref flag.
    /// Operand: local slot.
    PushLocalRef,
}

impl OpCode {
    /// Number of words the instruction occupies, opcode word included.
    pub fn size(self) -> usize {
        match self {
            OpCode::Push
            | OpCode::PushRef
            | OpCode::Call
            | OpCode::VarCall
            | OpCode::Func
            | OpCode::PushLocalRef => 2,
            _ => 1,
        }
    }

    /// Whether the immediate is a relative jump offset.
    pub fn is_jump(self) -> bool {
        matches!(self, OpCode::Jump | OpCode::JumpTrue | OpCode::JumpFalse)
    }

    /// Mnemonic used by the disassembler.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Push => "PUSH",
            OpCode::PushRef => "PUSHREF",
            OpCode::Pop => "POP",
            OpCode::PushGlobal => "PUSHGLOBAL",
            OpCode::PopGlobal => "POPGLOBAL",
            OpCode::PushArrayGlobal => "PUSHARRAYGLOBAL",
            OpCode::PopArrayGlobal => "POPARRAYGLOBAL",
            OpCode::Call => "CALL",
            OpCode::VarCall => "VARCALL",
            OpCode::Jump => "JUMP",
            OpCode::JumpTrue => "JUMPTRUE",
            OpCode::JumpFalse => "JUMPFALSE",
            OpCode::BinaryOp => "BINARYOP",
            OpCode::UnaryOp => "UNARYOP",
            OpCode::Exit => "EXIT",
            OpCode::Pause => "PAUSE",
            OpCode::Func => "FUNC",
            OpCode::PushLocal => "PUSHLOCAL",
            OpCode::PopLocal => "POPLOCAL",
            OpCode::PushLocalRef => "PUSHLOCALREF",
        }
    }
}

/// Binary operator tags carried by [`OpCode::BinaryOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum BinaryOp {
    Add = 0,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
}

/// Unary operator tags carried by [`OpCode::UnaryOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum UnaryOp {
    Neg = 0,
    Not,
}

/// Pack an opcode with its immediate.
#[inline]
pub fn pack(op: OpCode, data: u32) -> Word {
    (u32::from(u8::from(op)) << OPCODE_SHIFT) | (data & OPCODE_DATA_MASK)
}

/// Split an instruction word into its opcode and immediate.
pub fn unpack(word: Word) -> Option<(OpCode, u32)> {
    let op = OpCode::try_from((word >> OPCODE_SHIFT) as u8).ok()?;
    Some((op, word & OPCODE_DATA_MASK))
}

/// Immediate of a relative jump, or `None` when `offset` does not fit the
/// signed 24-bit field.
#[inline]
pub fn jump_data(offset: i32) -> Option<u32> {
    (MIN_JUMP..=MAX_JUMP)
        .contains(&offset)
        .then_some(offset as u32 & OPCODE_DATA_MASK)
}

/// Signed offset stored in a jump immediate.
#[inline]
pub fn jump_offset(data: u32) -> i32 {
    ((data << 8) as i32) >> 8
}

/// Immediate of an array access.
#[inline]
pub fn array_data(dims: u8, index: u32) -> u32 {
    ((u32::from(dims) << ARRAY_DIMENSION_SHIFT) & ARRAY_DIMENSION_MASK) | (index & ARRAY_BASE_MASK)
}

/// Split an array immediate into dimension count and array index.
#[inline]
pub fn split_array_data(data: u32) -> (u8, u32) {
    (
        ((data & ARRAY_DIMENSION_MASK) >> ARRAY_DIMENSION_SHIFT) as u8,
        data & ARRAY_BASE_MASK,
    )
}
