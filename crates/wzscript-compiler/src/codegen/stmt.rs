//! Statement code generation.

use wzscript_core::{StorageClass, ValueType};
use wzscript_parser::VarSymbol;

use crate::bytecode::{CodeBlock, OpCode, array_data};
use crate::context::CompilationContext;
use crate::emit::VarAccess;
use crate::error::CodeResult;

use super::Typed;

impl CompilationContext<'_, '_> {
    /// Record the current line for a whole statement.
    pub fn statement_debug(&self, mut code: CodeBlock) -> CodeBlock {
        if let Some(line) = self.debug_line() {
            code.prepend_debug(line);
        }
        code
    }

    /// Check the type of a user or object value stored into `target`.
    pub fn check_assign_type(&mut self, target: ValueType, value: ValueType) -> CodeResult<()> {
        if !self.registry().equivalent(target, value) {
            return Err(self.semantic("User type mismatch for assignment"));
        }
        Ok(())
    }

    // ==========================================================================
    // Assignment
    // ==========================================================================

    /// Store `value` into a scalar variable.
    pub fn code_assignment(&mut self, var: VarSymbol, value: CodeBlock) -> CodeResult<CodeBlock> {
        match var.storage {
            StorageClass::Public | StorageClass::Private | StorageClass::Local => {
                let op = if var.storage == StorageClass::Local {
                    OpCode::PopLocal
                } else {
                    OpCode::PopGlobal
                };
                let mut code = CodeBlock::alloc(value.len() + 1).map_err(|e| self.out_of_memory(e))?;
                code.append(value);
                code.emit_packed(op, var.index);
                Ok(code)
            }
            StorageClass::External => match var.set {
                Some(set) => self.code_var_call(value, var.index, set),
                None => Err(self.semantic("No set function for external variable")),
            },
            StorageClass::Object => Err(self.semantic("Cannot use member variables in this context")),
        }
    }

    /// Store `value` into an object member: value, object, then the set call.
    pub fn code_object_assignment(&mut self, access: VarAccess, value: CodeBlock) -> CodeResult<CodeBlock> {
        let VarAccess { code: object, var } = access;
        let Some(set) = var.set else {
            return Err(self.semantic("No set function for object variable"));
        };
        let prefix = CodeBlock::concat([value, object]).map_err(|e| self.out_of_memory(e))?;
        self.code_var_call(prefix, var.index, set)
    }

    /// Store `value` into an array element: value, indices, then the store.
    pub fn code_array_assignment(&mut self, access: VarAccess, value: CodeBlock) -> CodeResult<CodeBlock> {
        let VarAccess { code: indices, var } = access;
        let mut code =
            CodeBlock::alloc(value.len() + indices.len() + 1).map_err(|e| self.out_of_memory(e))?;
        code.append(value);
        code.append(indices);
        code.emit_packed(OpCode::PopArrayGlobal, array_data(var.dims, var.index));
        Ok(code)
    }

    // ==========================================================================
    // Flow
    // ==========================================================================

    /// `exit;`
    pub fn code_exit(&mut self) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(1).map_err(|e| self.out_of_memory(e))?;
        code.emit(OpCode::Exit);
        Ok(self.statement_debug(code))
    }

    /// `pause(time);`
    pub fn code_pause(&mut self, time: i32) -> CodeResult<CodeBlock> {
        if time < 0 {
            return Err(self.fatal("Invalid pause time"));
        }
        let mut code = CodeBlock::alloc(1).map_err(|e| self.out_of_memory(e))?;
        code.emit_packed(OpCode::Pause, time as u32);
        Ok(self.statement_debug(code))
    }

    /// `return;` or `return value;` inside a script function.
    pub fn code_return(&mut self, value: Option<Typed>) -> CodeResult<CodeBlock> {
        let Some(function) = self.current_function() else {
            return Err(self.semantic("Return statement outside of a function"));
        };
        let ret = self
            .symbols
            .function_at(function)
            .map_or(ValueType::VOID, |f| f.ret);

        let value = match value {
            Some(_) if ret == ValueType::VOID => {
                return Err(self.semantic("Function does not return a value"));
            }
            None if ret != ValueType::VOID => {
                return Err(self.semantic("Expected a return value"));
            }
            Some(value) => {
                if !self.registry().equivalent(ret, value.ty) {
                    return Err(self.semantic("Type mismatch for return value"));
                }
                value.code
            }
            None => CodeBlock::new(),
        };

        let mut code = CodeBlock::alloc(value.len() + 1).map_err(|e| self.out_of_memory(e))?;
        code.append(value);
        code.emit(OpCode::Exit);
        Ok(self.statement_debug(code))
    }

    // ==========================================================================
    // Bodies
    // ==========================================================================

    /// Terminate a trigger condition or event body with `Exit`, recording
    /// the current line for it.
    pub fn finish_body(&mut self, body: CodeBlock) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(body.len() + 1).map_err(|e| self.out_of_memory(e))?;
        code.append(body);
        let exit = code.len();
        code.emit(OpCode::Exit);
        if let Some(line) = self.debug_line() {
            code.add_debug(exit, line);
        }
        Ok(code)
    }

    /// Pop the arguments of a script function into their local slots, last
    /// argument first.
    pub fn code_function_prologue(&mut self, params: usize) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(params).map_err(|e| self.out_of_memory(e))?;
        for slot in (0..params as u32).rev() {
            code.emit_packed(OpCode::PopLocal, slot);
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{DebugEntry, unpack};
    use crate::error::CodeError;
    use wzscript_core::{ParseErrorKind, Span};
    use wzscript_registry::{HostFn, HostRegistry};

    #[test]
    fn assignment_by_storage_class() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);

        let value = ctx.code_push(ValueType::INT, 5).unwrap();
        let global = VarSymbol::script(ValueType::INT, StorageClass::Public, 0, 0);
        let code = ctx.code_assignment(global, value).unwrap();
        assert_eq!(code.opcodes(), vec![OpCode::Push, OpCode::PopGlobal]);

        let value = ctx.code_push(ValueType::INT, 5).unwrap();
        let local = VarSymbol::script(ValueType::INT, StorageClass::Local, 2, 0);
        let code = ctx.code_assignment(local, value).unwrap();
        assert_eq!(unpack(code.words()[2]), Some((OpCode::PopLocal, 2)));

        let value = ctx.code_push(ValueType::INT, 5).unwrap();
        let mut external = VarSymbol::script(ValueType::INT, StorageClass::External, 4, 0);
        external.set = Some(HostFn(8));
        let code = ctx.code_assignment(external, value).unwrap();
        assert_eq!(code.opcodes(), vec![OpCode::Push, OpCode::VarCall]);
        assert_eq!(unpack(code.words()[2]), Some((OpCode::VarCall, 4)));
        assert_eq!(code.words()[3], 8);
    }

    #[test]
    fn member_assignment_through_generic_path_fails() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);
        let value = ctx.code_push(ValueType::INT, 5).unwrap();
        let member = VarSymbol::script(ValueType::INT, StorageClass::Object, 0, 0);
        assert_eq!(ctx.code_assignment(member, value), Err(CodeError::Semantic));
        assert!(ctx.diagnostics().contains_message("Cannot use member variables in this context"));
    }

    #[test]
    fn array_store_order() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);
        let value = ctx.code_push(ValueType::INT, 9).unwrap();
        let index = ctx.code_push(ValueType::INT, 1).unwrap();
        let access = VarAccess {
            code: index,
            var: VarSymbol::script(ValueType::INT, StorageClass::Public, 3, 1),
        };
        let code = ctx.code_array_assignment(access, value).unwrap();
        assert_eq!(code.words()[1], 9);
        assert_eq!(code.words()[3], 1);
        assert_eq!(
            unpack(code.words()[4]),
            Some((OpCode::PopArrayGlobal, array_data(1, 3)))
        );
    }

    #[test]
    fn negative_pause_is_fatal() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);
        assert_eq!(ctx.code_pause(-1), Err(CodeError::Fatal));
        assert_eq!(ctx.diagnostics().last().map(|e| e.kind), Some(ParseErrorKind::Fatal));
        let code = ctx.code_pause(30).unwrap();
        assert_eq!(unpack(code.words()[0]), Some((OpCode::Pause, 30)));
    }

    #[test]
    fn return_outside_function() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);
        assert_eq!(ctx.code_return(None), Err(CodeError::Semantic));
    }

    #[test]
    fn finish_body_records_exit_line() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, true);
        ctx.set_location(Span::new(12, 1, 1), "}");
        let body = ctx.code_push(ValueType::INT, 1).unwrap();
        let code = ctx.finish_body(body).unwrap();
        assert_eq!(code.opcodes(), vec![OpCode::Push, OpCode::Exit]);
        assert_eq!(code.debug(), &[DebugEntry { offset: 2, line: 12 }]);
    }

    #[test]
    fn prologue_pops_in_reverse() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);
        let code = ctx.code_function_prologue(3).unwrap();
        let slots: Vec<_> = code.words().iter().filter_map(|&w| unpack(w)).map(|(_, s)| s).collect();
        assert_eq!(slots, vec![2, 1, 0]);
    }

    #[test]
    fn statement_debug_only_when_enabled() {
        let registry = HostRegistry::new();
        let mut ctx = CompilationContext::new(&registry, false);
        let code = ctx.code_exit().unwrap();
        assert!(code.debug().is_empty());

        let mut ctx = CompilationContext::new(&registry, true);
        ctx.set_location(Span::new(3, 1, 1), ";");
        let code = ctx.code_exit().unwrap();
        assert_eq!(code.debug(), &[DebugEntry { offset: 0, line: 3 }]);
    }
}
