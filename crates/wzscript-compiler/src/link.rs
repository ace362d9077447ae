//! Linking the parsed tables into a [`Program`].
//!
//! Trigger code is laid out first, in declaration order, followed by the
//! event code. Array storage starts after the last scalar global, each
//! array following the previous one.

use wzscript_core::CompilationError;

use crate::bytecode::{CodeBlock, DebugEntry};
use crate::program::{ArrayInfo, FunctionInfo, Program, ProgramDebug, TriggerData, VarDebug};
use crate::symbols::SymbolParts;

/// Build the final program.
///
/// Fails if an event was declared but never given a body.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn link(
    symbols: SymbolParts,
    strings: Vec<String>,
    debug_info: bool,
) -> Result<Program, CompilationError> {
    let SymbolParts {
        globals,
        arrays,
        triggers,
        events,
        functions,
    } = symbols;

    let size: usize = triggers
        .iter()
        .filter_map(|t| t.code.as_ref())
        .chain(events.iter().filter_map(|e| e.code.as_ref()))
        .map(CodeBlock::len)
        .sum();

    let mut program = Program::default();
    program
        .code
        .try_reserve_exact(size)
        .map_err(|_| CompilationError::OutOfMemory)?;

    // Triggers
    for trigger in triggers {
        program.trigger_offsets.push(program.code.len() as u32);
        let has_code = trigger.code.is_some();
        if let Some(code) = trigger.code {
            place(&mut program, code, &trigger.name, debug_info);
        }
        program.triggers.push(TriggerData {
            has_code,
            kind: trigger.kind,
            time: trigger.time,
        });
    }
    program.trigger_offsets.push(program.code.len() as u32);

    // Events
    for event in events {
        let Some(code) = event.code else {
            return Err(CompilationError::UndefinedEvent { name: event.name });
        };
        program.event_offsets.push(program.code.len() as u32);
        program.event_links.push(event.trigger);
        program.event_locals.push(event.locals);
        place(&mut program, code, &event.name, debug_info);
    }
    program.event_offsets.push(program.code.len() as u32);

    // Storage
    program.globals = globals.iter().map(|g| g.ty).collect();
    let mut base = program.globals.len() as u32;
    for array in &arrays {
        program.arrays.push(ArrayInfo {
            ty: array.ty,
            dims: array.dims(),
            extents: array.extents.clone(),
            base,
        });
        base += array.elements();
    }

    program.functions = functions
        .into_iter()
        .map(|f| FunctionInfo {
            name: f.name,
            event: f.event,
            ret: f.ret,
            params: f.params,
        })
        .collect();
    program.strings = strings;

    if debug_info {
        program.var_debug = globals
            .into_iter()
            .map(|g| VarDebug {
                name: g.name,
                storage: g.storage,
            })
            .collect();
        program.array_debug = arrays
            .into_iter()
            .map(|a| VarDebug {
                name: a.name,
                storage: a.storage,
            })
            .collect();
    }

    log::debug!(
        "linked {} words, {} triggers, {} events, {} globals, {} arrays",
        program.code.len(),
        program.triggers.len(),
        program.event_links.len(),
        program.globals.len(),
        program.arrays.len()
    );
    Ok(program)
}

/// Copy a block into the image, rebasing its debug entries and labelling
/// the first one.
fn place(program: &mut Program, code: CodeBlock, label: &str, debug_info: bool) {
    let base = program.code.len() as u32;
    let (words, debug) = code.into_parts();
    program.code.extend(words);
    if !debug_info {
        return;
    }
    for (i, DebugEntry { offset, line }) in debug.into_iter().enumerate() {
        program.debug.push(ProgramDebug {
            offset: base + offset,
            line,
            label: (i == 0).then(|| label.to_string()),
        });
    }
}
