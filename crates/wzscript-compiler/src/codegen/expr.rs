//! Expression code generation.

use wzscript_core::{StorageClass, TriggerType, ValueType};
use wzscript_parser::{FuncSymbol, FuncTarget, VarSymbol};
use wzscript_registry::HostFn;

use crate::bytecode::{BinaryOp, CodeBlock, OpCode, UnaryOp, array_data};
use crate::context::CompilationContext;
use crate::emit::{ParamBlock, VarAccess};
use crate::error::{CodeError, CodeResult};

use super::TriggerDecl;

/// What a call instruction dispatches to.
enum CallTarget {
    Native(HostFn),
    Script(u32),
}

impl CompilationContext<'_, '_> {
    // ==========================================================================
    // Literals
    // ==========================================================================

    /// `Push type` followed by the value word.
    pub fn code_push(&mut self, ty: ValueType, word: u32) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(2).map_err(|e| self.out_of_memory(e))?;
        code.emit_packed(OpCode::Push, ty.raw());
        code.emit_word(word);
        Ok(code)
    }

    /// Push a quoted text as an index into the string table.
    pub fn code_string(&mut self, text: &str) -> CodeResult<CodeBlock> {
        let index = self.intern_string(text);
        self.code_push(ValueType::STRING, index)
    }

    // ==========================================================================
    // Variables
    // ==========================================================================

    /// Read a scalar variable.
    pub fn code_var_get(&mut self, var: VarSymbol) -> CodeResult<CodeBlock> {
        match var.storage {
            StorageClass::Public | StorageClass::Private => {
                let mut code = CodeBlock::alloc(1).map_err(|e| self.out_of_memory(e))?;
                code.emit_packed(OpCode::PushGlobal, var.index);
                Ok(code)
            }
            StorageClass::Local => {
                let mut code = CodeBlock::alloc(1).map_err(|e| self.out_of_memory(e))?;
                code.emit_packed(OpCode::PushLocal, var.index);
                Ok(code)
            }
            StorageClass::External => match var.get {
                Some(get) => self.code_var_call(CodeBlock::new(), var.index, get),
                None => Err(self.semantic("No get function for external variable")),
            },
            StorageClass::Object => Err(self.semantic("Cannot use member variables in this context")),
        }
    }

    /// `prefix` followed by `VarCall index` and the host function.
    pub(super) fn code_var_call(
        &mut self,
        prefix: CodeBlock,
        index: u32,
        func: HostFn,
    ) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(prefix.len() + 2).map_err(|e| self.out_of_memory(e))?;
        code.append(prefix);
        code.emit_packed(OpCode::VarCall, index);
        code.emit_word(func.0);
        Ok(code)
    }

    /// Pass a variable by reference.
    ///
    /// Only script storage can be referenced; the result carries the
    /// variable's type with the reference flag set.
    pub fn code_var_ref(&mut self, var: VarSymbol) -> CodeResult<(CodeBlock, ValueType)> {
        let ty = var.ty.to_ref();
        let op = match var.storage {
            StorageClass::Public | StorageClass::Private => OpCode::PushRef,
            StorageClass::Local => OpCode::PushLocalRef,
            StorageClass::External => {
                return Err(self.semantic("Cannot use external variables in this context"));
            }
            StorageClass::Object => {
                return Err(self.semantic("Cannot use member variables in this context"));
            }
        };
        let mut code = CodeBlock::alloc(2).map_err(|e| self.out_of_memory(e))?;
        code.emit_packed(op, ty.raw());
        code.emit_word(var.index);
        Ok((code, ty))
    }

    /// Bind the index expressions of an array access to the array.
    pub fn code_array_access(&mut self, var: VarSymbol, indices: ParamBlock) -> CodeResult<VarAccess> {
        if !var.is_array() {
            return Err(self.semantic("Not an array variable"));
        }
        if indices.len() != usize::from(var.dims) {
            return Err(self.semantic("Invalid number of array dimensions for this variable"));
        }
        Ok(VarAccess {
            code: indices.code,
            var,
        })
    }

    /// Read an array element.
    pub fn code_array_get(&mut self, access: VarAccess) -> CodeResult<CodeBlock> {
        let VarAccess { code: indices, var } = access;
        let mut code = CodeBlock::alloc(indices.len() + 1).map_err(|e| self.out_of_memory(e))?;
        code.append(indices);
        code.emit_packed(OpCode::PushArrayGlobal, array_data(var.dims, var.index));
        Ok(code)
    }

    /// Bind an object expression to the member being accessed on it.
    pub fn code_object_access(&mut self, object: CodeBlock, member: VarSymbol) -> CodeResult<VarAccess> {
        if member.storage != StorageClass::Object {
            return Err(self.semantic("Only object variables are valid in this context"));
        }
        Ok(VarAccess {
            code: object,
            var: member,
        })
    }

    /// Read an object member.
    pub fn code_object_get(&mut self, access: VarAccess) -> CodeResult<CodeBlock> {
        let VarAccess { code: object, var } = access;
        match var.get {
            Some(get) => self.code_var_call(object, var.index, get),
            None => Err(self.semantic("No get function for object variable")),
        }
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    /// `a`, `b`, then the operator.
    pub fn code_binary(&mut self, a: CodeBlock, b: CodeBlock, op: BinaryOp) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(a.len() + b.len() + 1).map_err(|e| self.out_of_memory(e))?;
        code.append(a);
        code.append(b);
        code.emit_packed(OpCode::BinaryOp, u32::from(u8::from(op)));
        Ok(code)
    }

    pub fn code_unary(&mut self, a: CodeBlock, op: UnaryOp) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(a.len() + 1).map_err(|e| self.out_of_memory(e))?;
        code.append(a);
        code.emit_packed(OpCode::UnaryOp, u32::from(u8::from(op)));
        Ok(code)
    }

    /// `==` or `!=` between user or object values, which must be equivalent.
    pub fn code_equality(
        &mut self,
        a: CodeBlock,
        a_ty: ValueType,
        b: CodeBlock,
        b_ty: ValueType,
        op: BinaryOp,
    ) -> CodeResult<CodeBlock> {
        if !self.registry().equivalent(a_ty, b_ty) {
            let message = if op == BinaryOp::Equal {
                "Type mismatch for equality"
            } else {
                "Type mismatch for inequality"
            };
            return Err(self.semantic(message));
        }
        self.code_binary(a, b, op)
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Check arguments against a signature.
    ///
    /// Every mismatching position is reported before the count is checked.
    fn check_params(&mut self, expected: &[ValueType], params: &ParamBlock) -> CodeResult<()> {
        let mut mismatch = false;
        for (i, (&want, &got)) in expected.iter().zip(&params.types).enumerate() {
            if !self.registry().equivalent(want, got) {
                self.semantic(format!("Type mismatch for paramter {i}"));
                mismatch = true;
            }
        }
        if expected.len() != params.len() {
            return Err(self.semantic(format!("Expected {} parameters", expected.len())));
        }
        if mismatch {
            return Err(CodeError::Semantic);
        }
        Ok(())
    }

    /// Call a native or script function.
    ///
    /// When the call is a statement on its own, a returned value is popped.
    pub fn code_call(
        &mut self,
        func: FuncSymbol,
        params: ParamBlock,
        as_statement: bool,
    ) -> CodeResult<CodeBlock> {
        let registry = self.registry();
        let (signature, target) = match func.target {
            FuncTarget::Native(index) => {
                let native = &registry.functions()[index as usize];
                (native.params.clone(), CallTarget::Native(native.func))
            }
            FuncTarget::Script(index) => match self.symbols.function_at(index) {
                Some(script) => (script.params.clone(), CallTarget::Script(script.event)),
                None => return Err(self.fatal("Unknown function")),
            },
        };
        self.check_params(&signature, &params)?;

        let discard = as_statement && func.ret != ValueType::VOID;
        let size = params.code.len() + 2 + usize::from(discard);
        let mut code = CodeBlock::alloc(size).map_err(|e| self.out_of_memory(e))?;
        code.append(params.code);
        match target {
            CallTarget::Native(host) => {
                code.emit(OpCode::Call);
                code.emit_word(host.0);
            }
            CallTarget::Script(event) => {
                code.emit(OpCode::Func);
                code.emit_word(event);
            }
        }
        if discard {
            code.emit(OpCode::Pop);
        }
        Ok(code)
    }

    /// Run an event's code directly.
    pub fn code_event_call(&mut self, event: u32) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::alloc(2).map_err(|e| self.out_of_memory(e))?;
        code.emit(OpCode::Func);
        code.emit_word(event);
        Ok(code)
    }

    // ==========================================================================
    // Triggers
    // ==========================================================================

    /// A callback trigger given arguments: the callback is called with them
    /// every time the trigger is checked.
    pub fn code_callback_trigger(&mut self, callback: u32, params: ParamBlock) -> CodeResult<TriggerDecl> {
        let registry = self.registry();
        let Some(cb) = registry.callbacks().get(callback as usize) else {
            return Err(self.fatal("Unknown callback"));
        };

        let mut mismatch = false;
        for (i, (&want, &got)) in cb.params.iter().zip(&params.types).enumerate() {
            if !registry.equivalent(want, got) {
                self.semantic(format!("Type mismatch for paramter {i}"));
                mismatch = true;
            }
        }
        if params.is_empty() {
            return Err(self.semantic("Expected parameters to callback"));
        }
        if cb.params.len() != params.len() {
            return Err(self.semantic(format!("Expected {} parameters", cb.params.len())));
        }
        if mismatch {
            return Err(CodeError::Semantic);
        }

        let mut code = CodeBlock::alloc(params.code.len() + 2).map_err(|e| self.out_of_memory(e))?;
        code.append(params.code);
        code.emit(OpCode::Call);
        code.emit_word(cb.func.0);
        Ok(TriggerDecl {
            kind: cb.trigger,
            time: 0,
            code: Some(code),
        })
    }

    /// A callback trigger named on its own.
    pub fn code_bare_callback(&mut self, callback: u32) -> CodeResult<TriggerDecl> {
        let registry = self.registry();
        match registry.callbacks().get(callback as usize) {
            Some(cb) if cb.params.is_empty() => Ok(TriggerDecl::timed(cb.trigger, 0)),
            Some(_) => Err(self.fatal("Expected parameters for callback trigger")),
            None => Err(self.fatal("Unknown callback")),
        }
    }

    /// A code trigger: the condition is evaluated every `time` interval.
    pub fn code_condition_trigger(&mut self, cond: CodeBlock, time: i32) -> CodeResult<TriggerDecl> {
        Ok(TriggerDecl {
            kind: TriggerType::CODE,
            time: self.trigger_time(time)?,
            code: Some(cond),
        })
    }

    /// A `wait`, `every` or condition trigger's interval.
    pub fn trigger_time(&mut self, time: i32) -> CodeResult<u32> {
        u32::try_from(time).map_err(|_| self.fatal("Invalid time for trigger"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::unpack;
    use wzscript_core::{AccessKind, ParseErrorKind};
    use wzscript_registry::{Callback, HostRegistry, HostVariable, NativeFunction, TypeEntry};

    fn registry() -> HostRegistry {
        let mut registry = HostRegistry::new();
        let droid = ValueType::user(0);
        registry
            .register_type(TypeEntry::new(droid, "DROID", AccessKind::Object))
            .unwrap();
        registry
            .register_function(NativeFunction::new(
                "f",
                HostFn(11),
                ValueType::INT,
                [ValueType::INT, ValueType::INT],
            ))
            .unwrap();
        registry
            .register_function(NativeFunction::new("g", HostFn(12), ValueType::VOID, []))
            .unwrap();
        registry
            .register_callback(Callback::new(
                "CALL_UNIT_TAKEOVER",
                TriggerType(6),
                HostFn(20),
                [droid.to_ref()],
            ))
            .unwrap();
        registry
            .register_callback(Callback::new("CALL_NEWDROID", TriggerType(5), HostFn(21), []))
            .unwrap();
        registry
            .register_member(HostVariable::member(droid, "x", ValueType::INT, 4).with_get(HostFn(30)))
            .unwrap();
        registry
    }

    fn int(ctx: &mut CompilationContext<'_, '_>, value: i32) -> CodeBlock {
        ctx.code_push(ValueType::INT, value as u32).unwrap()
    }

    fn ops(code: &CodeBlock) -> Vec<OpCode> {
        code.opcodes()
    }

    #[test]
    fn push_literal() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let code = int(&mut ctx, 7);
        assert_eq!(code.words()[1], 7);
        assert_eq!(unpack(code.words()[0]), Some((OpCode::Push, ValueType::INT.raw())));
    }

    #[test]
    fn global_and_local_reads() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let global = VarSymbol::script(ValueType::INT, StorageClass::Private, 3, 0);
        let local = VarSymbol::script(ValueType::INT, StorageClass::Local, 1, 0);
        let code = ctx.code_var_get(global).unwrap();
        assert_eq!(unpack(code.words()[0]), Some((OpCode::PushGlobal, 3)));
        let code = ctx.code_var_get(local).unwrap();
        assert_eq!(unpack(code.words()[0]), Some((OpCode::PushLocal, 1)));
    }

    #[test]
    fn external_without_get_function() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let var = VarSymbol::script(ValueType::INT, StorageClass::External, 0, 0);
        assert_eq!(ctx.code_var_get(var), Err(CodeError::Semantic));
        assert!(ctx.diagnostics().contains_message("No get function for external variable"));
    }

    #[test]
    fn call_reports_every_mismatch_then_count() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let mut params = ParamBlock::new();
        params.push(CodeBlock::new(), ValueType::BOOL).unwrap();
        params.push(CodeBlock::new(), ValueType::BOOL).unwrap();
        params.push(CodeBlock::new(), ValueType::INT).unwrap();

        let func = FuncSymbol {
            ret: ValueType::INT,
            target: FuncTarget::Native(0),
        };
        assert_eq!(ctx.code_call(func, params, false), Err(CodeError::Semantic));
        let messages: Vec<_> = ctx.diagnostics().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Type mismatch for paramter 0",
                "Type mismatch for paramter 1",
                "Expected 2 parameters",
            ]
        );
    }

    #[test]
    fn call_as_statement_pops_result() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let mut params = ParamBlock::new();
        let one = int(&mut ctx, 1);
        let two = int(&mut ctx, 2);
        params.push(one, ValueType::INT).unwrap();
        params.push(two, ValueType::INT).unwrap();
        let func = FuncSymbol {
            ret: ValueType::INT,
            target: FuncTarget::Native(0),
        };
        let code = ctx.code_call(func, params, true).unwrap();
        assert_eq!(ops(&code), vec![OpCode::Push, OpCode::Push, OpCode::Call, OpCode::Pop]);
        assert_eq!(code.words()[5], 11);

        let void = FuncSymbol {
            ret: ValueType::VOID,
            target: FuncTarget::Native(1),
        };
        let code = ctx.code_call(void, ParamBlock::new(), true).unwrap();
        assert_eq!(ops(&code), vec![OpCode::Call]);
    }

    #[test]
    fn references_only_to_script_storage() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let global = VarSymbol::script(ValueType::INT, StorageClass::Public, 2, 0);
        let (code, ty) = ctx.code_var_ref(global).unwrap();
        assert!(ty.is_ref());
        assert_eq!(unpack(code.words()[0]), Some((OpCode::PushRef, ValueType::INT.to_ref().raw())));
        assert_eq!(code.words()[1], 2);

        let external = VarSymbol::script(ValueType::INT, StorageClass::External, 0, 0);
        assert_eq!(ctx.code_var_ref(external), Err(CodeError::Semantic));
        assert!(ctx.diagnostics().contains_message("Cannot use external variables in this context"));
    }

    #[test]
    fn array_dimension_check() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let grid = VarSymbol::script(ValueType::INT, StorageClass::Public, 1, 2);
        let mut indices = ParamBlock::new();
        let i = int(&mut ctx, 0);
        indices.push(i, ValueType::INT).unwrap();
        assert_eq!(ctx.code_array_access(grid, indices.clone()), Err(CodeError::Semantic));

        let j = int(&mut ctx, 1);
        indices.push(j, ValueType::INT).unwrap();
        let access = ctx.code_array_access(grid, indices).unwrap();
        let code = ctx.code_array_get(access).unwrap();
        assert_eq!(
            unpack(code.words()[4]),
            Some((OpCode::PushArrayGlobal, array_data(2, 1)))
        );
    }

    #[test]
    fn member_read() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let droid = VarSymbol::script(ValueType::user(0), StorageClass::Public, 0, 0);
        let object = ctx.code_var_get(droid).unwrap();
        let member = registry.member("x", ValueType::user(0)).unwrap();
        let member = VarSymbol {
            ty: member.ty,
            storage: member.storage,
            index: member.index,
            dims: 0,
            get: member.get,
            set: member.set,
        };
        let access = ctx.code_object_access(object, member).unwrap();
        let code = ctx.code_object_get(access).unwrap();
        assert_eq!(ops(&code), vec![OpCode::PushGlobal, OpCode::VarCall]);
        assert_eq!(code.words()[2], 30);
    }

    #[test]
    fn callback_triggers() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        assert_eq!(
            ctx.code_bare_callback(1),
            Ok(TriggerDecl::timed(TriggerType(5), 0))
        );
        assert_eq!(ctx.code_bare_callback(0), Err(CodeError::Fatal));
        assert_eq!(ctx.diagnostics().last().map(|e| e.kind), Some(ParseErrorKind::Fatal));

        assert_eq!(ctx.code_callback_trigger(0, ParamBlock::new()), Err(CodeError::Semantic));
        assert!(ctx.diagnostics().contains_message("Expected parameters to callback"));

        let var = VarSymbol::script(ValueType::user(0), StorageClass::Public, 0, 0);
        let (code, ty) = ctx.code_var_ref(var).unwrap();
        let mut params = ParamBlock::new();
        params.push(code, ty).unwrap();
        let decl = ctx.code_callback_trigger(0, params).unwrap();
        assert_eq!(decl.kind, TriggerType(6));
        assert_eq!(
            decl.code.map(|c| c.opcodes()),
            Some(vec![OpCode::PushRef, OpCode::Call])
        );
    }

    #[test]
    fn equality_needs_equivalent_types() {
        let registry = registry();
        let mut ctx = CompilationContext::new(&registry, false);
        let a = int(&mut ctx, 1);
        let b = int(&mut ctx, 2);
        assert_eq!(
            ctx.code_equality(a, ValueType::user(0), b, ValueType::STRING, BinaryOp::NotEqual),
            Err(CodeError::Semantic)
        );
        assert!(ctx.diagnostics().contains_message("Type mismatch for inequality"));
    }
}
