//! The linked output of a compile.
//!
//! A [`Program`] holds one contiguous instruction image plus the tables the
//! virtual machine needs to find trigger and event code in it and to lay
//! out global storage. Triggers and events are addressed by index; both
//! offset tables end with a sentinel equal to the end of the last block, so
//! block `i` spans `offsets[i]..offsets[i + 1]`.

use std::fmt::Write as _;

use wzscript_core::{StorageClass, TriggerType, ValueType};

use crate::bytecode::{OpCode, Word, jump_offset, split_array_data, unpack};

/// Per-trigger metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerData {
    /// Whether the trigger has condition code in the image.
    pub has_code: bool,
    pub kind: TriggerType,
    /// Re-check interval or wait time.
    pub time: u32,
}

/// Layout of a global array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInfo {
    pub ty: ValueType,
    pub dims: u8,
    pub extents: Vec<u8>,
    /// First storage slot, after all scalar globals and earlier arrays.
    pub base: u32,
}

impl ArrayInfo {
    pub fn elements(&self) -> u32 {
        self.extents.iter().map(|&e| u32::from(e)).product()
    }
}

/// A script function and the event holding its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub event: u32,
    pub ret: ValueType,
    pub params: Vec<ValueType>,
}

/// Maps an image offset to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDebug {
    pub offset: u32,
    pub line: u32,
    /// Trigger or event name, on the first entry of each block.
    pub label: Option<String>,
}

/// Name and storage of a global or array, by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDebug {
    pub name: String,
    pub storage: StorageClass,
}

/// A compiled script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub code: Vec<Word>,

    /// Type of each scalar global.
    pub globals: Vec<ValueType>,
    pub arrays: Vec<ArrayInfo>,

    pub triggers: Vec<TriggerData>,
    /// Start of each trigger's code, plus a sentinel.
    pub trigger_offsets: Vec<u32>,

    /// Start of each event's code, plus a sentinel.
    pub event_offsets: Vec<u32>,
    /// Trigger activating each event, -1 when inactive.
    pub event_links: Vec<i32>,
    /// Local variable types of each event.
    pub event_locals: Vec<Vec<ValueType>>,

    pub functions: Vec<FunctionInfo>,
    pub strings: Vec<String>,

    pub debug: Vec<ProgramDebug>,
    pub var_debug: Vec<VarDebug>,
    pub array_debug: Vec<VarDebug>,
}

impl Program {
    pub fn num_triggers(&self) -> usize {
        self.triggers.len()
    }

    pub fn num_events(&self) -> usize {
        self.event_links.len()
    }

    /// Total number of global storage slots, array elements included.
    pub fn storage_size(&self) -> u32 {
        self.globals.len() as u32 + self.arrays.iter().map(ArrayInfo::elements).sum::<u32>()
    }

    /// Code of trigger `index`, empty for triggers without code.
    pub fn trigger_code(&self, index: usize) -> &[Word] {
        Self::block(&self.code, &self.trigger_offsets, index)
    }

    pub fn event_code(&self, index: usize) -> &[Word] {
        Self::block(&self.code, &self.event_offsets, index)
    }

    fn block<'a>(code: &'a [Word], offsets: &[u32], index: usize) -> &'a [Word] {
        match (offsets.get(index), offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => code.get(start as usize..end as usize).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Render the image one instruction per line.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut at = 0;
        while at < self.code.len() {
            self.block_header(&mut out, at as u32);
            let word = self.code[at];
            let Some((op, data)) = unpack(word) else {
                let _ = writeln!(out, "{at:04}  ??? {word:#010x}");
                at += 1;
                continue;
            };
            let operand = self.code.get(at + 1).copied();
            let _ = writeln!(out, "{at:04}  {:<16}{}", op.name(), Self::operands(op, data, operand, at));
            at += op.size();
        }
        out
    }

    fn block_header(&self, out: &mut String, offset: u32) {
        for (i, window) in self.trigger_offsets.windows(2).enumerate() {
            if window[0] == offset && window[1] > offset {
                let _ = writeln!(out, "trigger {i}:");
            }
        }
        for (i, window) in self.event_offsets.windows(2).enumerate() {
            if window[0] == offset && window[1] > offset {
                let _ = writeln!(out, "event {i}:");
            }
        }
    }

    fn operands(op: OpCode, data: u32, operand: Option<Word>, at: usize) -> String {
        let operand = operand.unwrap_or_default();
        match op {
            OpCode::Push => format!("{} {}", ValueType::from_raw(data), operand as i32),
            OpCode::PushRef | OpCode::PushLocalRef => {
                format!("{} {}", ValueType::from_raw(data), operand)
            }
            OpCode::Call | OpCode::Func => format!("{operand}"),
            OpCode::VarCall => format!("{data} {operand}"),
            OpCode::Jump | OpCode::JumpTrue | OpCode::JumpFalse => {
                format!("{}", at as i64 + i64::from(jump_offset(data)))
            }
            OpCode::PushArrayGlobal | OpCode::PopArrayGlobal => {
                let (dims, index) = split_array_data(data);
                format!("{index} [{dims}]")
            }
            OpCode::Exit | OpCode::Pop => String::new(),
            _ => format!("{data}"),
        }
    }
}
