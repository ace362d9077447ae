//! Declaration parsing.
//!
//! Top level declarations:
//!
//! ```text
//! link TYPE ;
//! STORAGE (TYPE | trigger | event) name {[n]} {, name {[n]}} ;
//! trigger name ( condition ) ;
//! event name ;
//! event name ( trigger | inactive | condition ) ( ; | body )
//! function (TYPE | void) name ( [TYPE name {, TYPE name}] ) ( ; | body )
//! ```
//!
//! where a condition is one of `wait, n`, `every, n`, `init`, a callback
//! with or without arguments, or `boolexp, n`. A body is `{` followed by
//! `local` declarations and then statements, closed by `}`.
//!
//! Every name is entered in the symbol tables before the token after it is
//! scanned, so later references classify correctly.

use wzscript_core::{StorageClass, TriggerType, ValueType};
use wzscript_parser::{Family, FuncSymbol, FuncTarget, TokenKind, TokenValue};

use crate::bytecode::CodeBlock;
use crate::codegen::TriggerDecl;
use crate::error::{CodeError, CodeResult};
use crate::symbols::{SymbolError, SymbolKind, TriggerSymbol, check_extents};

use super::Parser;

/// What an event is activated by.
enum EventLink {
    /// A named trigger, or -1 for `inactive`.
    Trigger(i32),
    /// A trigger declared inside the event header.
    Inline(TriggerDecl),
}

impl<'ast> Parser<'_, 'ast, '_> {
    /// A name about to be declared.
    ///
    /// A word that already means something is reported as a redefinition.
    fn expect_new_name(&mut self, kind: SymbolKind) -> CodeResult<&'ast str> {
        if self.check(TokenKind::Ident) {
            return Ok(self.advance().lexeme);
        }
        Err(self.name_taken(kind))
    }

    /// Report the lookahead where a new name was expected.
    fn name_taken(&mut self, kind: SymbolKind) -> CodeError {
        let token = self.peek();
        if token.kind != TokenKind::Type && token.kind.is_classified_word() {
            return self.ctx.symbol_error(SymbolError::Duplicate {
                kind,
                name: token.lexeme.to_string(),
            });
        }
        self.syntax_error()
    }

    /// A type name.
    fn expect_type(&mut self) -> CodeResult<ValueType> {
        let token = self.peek();
        match (token.kind, token.value) {
            (TokenKind::Type, TokenValue::Type(ty)) => {
                self.advance();
                Ok(ty)
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// `link TYPE ;` names the object type of the script's owner. It has no
    /// effect on the compiled program.
    pub(super) fn parse_link(&mut self) -> CodeResult<()> {
        self.expect(TokenKind::Link)?;
        self.expect_type()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub(super) fn parse_variable_decl(&mut self) -> CodeResult<()> {
        let token = self.advance();
        let TokenValue::Storage(storage) = token.value else {
            return Err(self.syntax_error());
        };
        if storage == StorageClass::Local {
            return Err(self.ctx.semantic("Local variables must be declared at the start of a body"));
        }

        let token = self.peek();
        let ty = match (token.kind, token.value) {
            (TokenKind::Type, TokenValue::Type(ty)) => ty,
            (TokenKind::Trigger, _) => ValueType::TRIGGER,
            (TokenKind::Event, _) => ValueType::EVENT,
            _ => return Err(self.syntax_error()),
        };
        self.advance();

        loop {
            self.parse_variable_ident(ty, storage)?;
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    /// `name` or `name[n]...`
    fn parse_variable_ident(&mut self, ty: ValueType, storage: StorageClass) -> CodeResult<()> {
        let name = self.expect_new_name(SymbolKind::Variable)?;

        let mut extents = Vec::new();
        while self.eat(TokenKind::LeftBracket).is_some() {
            extents.push(self.int_literal()?);
            self.expect(TokenKind::RightBracket)?;
        }

        let declared = if extents.is_empty() {
            self.ctx.symbols.add_global(name, ty, storage)
        } else {
            check_extents(&extents).and_then(|extents| self.ctx.symbols.add_array(name, ty, storage, extents))
        };
        declared.map_err(|e| self.ctx.symbol_error(e))?;
        log::debug!("declared {:?} {} {:?}{:?}", storage, name, ty, extents);
        Ok(())
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// `trigger name ( condition ) ;`
    pub(super) fn parse_trigger_decl(&mut self) -> CodeResult<()> {
        self.expect(TokenKind::Trigger)?;
        let name = self.expect_new_name(SymbolKind::Trigger)?;
        let line = self.ctx.debug_line();
        self.expect(TokenKind::LeftParen)?;
        let decl = self.parse_trigger_condition()?;
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Semicolon)?;
        self.add_trigger(name, decl, line)?;
        Ok(())
    }

    /// The condition between a trigger's parentheses.
    fn parse_trigger_condition(&mut self) -> CodeResult<TriggerDecl> {
        let token = self.peek();
        match (token.kind, token.value) {
            (TokenKind::Wait | TokenKind::Every, _) => {
                self.advance();
                self.expect(TokenKind::Comma)?;
                let time = self.int_literal()?;
                let time = self.ctx.trigger_time(time)?;
                let kind = if token.kind == TokenKind::Wait {
                    TriggerType::WAIT
                } else {
                    TriggerType::EVERY
                };
                Ok(TriggerDecl::timed(kind, time))
            }
            (TokenKind::Init, _) => {
                self.advance();
                Ok(TriggerDecl::timed(TriggerType::INIT, 0))
            }
            (TokenKind::CallbackSym, TokenValue::Callback(index)) => {
                self.advance();
                if self.eat(TokenKind::Comma).is_some() {
                    let params = self.parse_argument_list()?;
                    self.ctx.code_callback_trigger(index, params)
                } else {
                    self.ctx.code_bare_callback(index)
                }
            }
            _ => {
                let cond = self.parse_condition()?;
                self.finish_condition_trigger(cond)
            }
        }
    }

    /// `, n` after the boolean condition of a code trigger.
    fn finish_condition_trigger(&mut self, cond: CodeBlock) -> CodeResult<TriggerDecl> {
        self.expect(TokenKind::Comma)?;
        let time = self.int_literal()?;
        self.ctx.code_condition_trigger(cond, time)
    }

    /// Enter a trigger in the table. Condition code is closed with `Exit`
    /// and starts with the line of the declaration.
    fn add_trigger(&mut self, name: &str, decl: TriggerDecl, line: Option<u32>) -> CodeResult<u32> {
        let code = match decl.code {
            Some(cond) => {
                let mut code = self.ctx.finish_body(cond)?;
                if let Some(line) = line {
                    code.prepend_debug(line);
                }
                Some(code)
            }
            None => None,
        };
        let index = self
            .ctx
            .symbols
            .add_trigger(TriggerSymbol {
                name: name.to_string(),
                kind: decl.kind,
                time: decl.time,
                code,
            })
            .map_err(|e| self.ctx.symbol_error(e))?;
        log::debug!("trigger {} '{}' {:?} every {}", index, name, decl.kind, decl.time);
        Ok(index)
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub(super) fn parse_event_decl(&mut self) -> CodeResult<()> {
        self.expect(TokenKind::Event)?;
        let token = self.peek();
        let index = match (token.kind, token.value) {
            (TokenKind::Ident, _) => {
                self.advance();
                self.ctx
                    .symbols
                    .declare_event(token.lexeme)
                    .map_err(|e| self.ctx.symbol_error(e))?
            }
            (TokenKind::EventSym, TokenValue::Event(index)) => {
                let defined = self
                    .ctx
                    .symbols
                    .event_at(index)
                    .is_some_and(|event| event.code.is_some());
                if defined {
                    return Err(self.ctx.symbol_error(SymbolError::Duplicate {
                        kind: SymbolKind::Event,
                        name: token.lexeme.to_string(),
                    }));
                }
                self.advance();
                index
            }
            _ => return Err(self.name_taken(SymbolKind::Event)),
        };

        // Declaration only, defined later.
        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(());
        }

        self.expect(TokenKind::LeftParen)?;
        let link = self.parse_event_link()?;
        self.expect(TokenKind::RightParen)?;
        let trigger = match link {
            EventLink::Trigger(trigger) => trigger,
            EventLink::Inline(decl) => {
                let line = self.ctx.debug_line();
                self.add_trigger("", decl, line)? as i32
            }
        };

        if self.eat(TokenKind::Semicolon).is_some() {
            self.ctx.symbols.link_event(index, trigger);
            return Ok(());
        }

        let code = self.parse_body(CodeBlock::new())?;
        let locals = self.ctx.symbols.locals.types();
        self.ctx.symbols.locals.clear();
        self.ctx.symbols.define_event(index, code, trigger, locals);
        log::debug!("event {} '{}' linked to trigger {}", index, token.lexeme, trigger);
        Ok(())
    }

    /// What goes between the parentheses of an event header.
    fn parse_event_link(&mut self) -> CodeResult<EventLink> {
        let token = self.peek();
        let first = match (token.kind, token.value) {
            (TokenKind::TrigSym, TokenValue::Trigger(index)) => {
                self.advance();
                index as i32
            }
            (TokenKind::Inactive, _) => {
                self.advance();
                -1
            }
            _ => return Ok(EventLink::Inline(self.parse_trigger_condition()?)),
        };
        if self.check(TokenKind::RightParen) {
            return Ok(EventLink::Trigger(first));
        }

        // The trigger value starts a condition instead.
        let lhs = self.trigger_value(first)?;
        let expr = self.parse_infix(lhs, 0)?;
        if expr.family != Family::Bool {
            return Err(self.ctx.semantic("Expected a boolean expression"));
        }
        Ok(EventLink::Inline(self.finish_condition_trigger(expr.code)?))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// A return type: a type name, `void`, `trigger` or `event`.
    fn parse_return_type(&mut self) -> CodeResult<ValueType> {
        let token = self.peek();
        let ty = match (token.kind, token.value) {
            (TokenKind::Type, TokenValue::Type(ty)) => ty,
            (TokenKind::Void, _) => ValueType::VOID,
            (TokenKind::Trigger, _) => ValueType::TRIGGER,
            (TokenKind::Event, _) => ValueType::EVENT,
            _ => return Err(self.syntax_error()),
        };
        self.advance();
        Ok(ty)
    }

    pub(super) fn parse_function_decl(&mut self) -> CodeResult<()> {
        self.expect(TokenKind::Function)?;
        let ret = self.parse_return_type()?;

        let token = self.peek();
        let existing = match (token.kind, token.value) {
            (TokenKind::Ident, _) => None,
            (
                TokenKind::Func(_) | TokenKind::VoidFunc,
                TokenValue::Func(FuncSymbol {
                    target: FuncTarget::Script(index),
                    ..
                }),
            ) => Some(index),
            _ => return Err(self.name_taken(SymbolKind::Function)),
        };
        let name = self.advance().lexeme;

        self.expect(TokenKind::LeftParen)?;
        self.ctx.set_defining_locals(true);
        let params = self.parse_parameters();
        self.ctx.set_defining_locals(false);
        let params = params?;
        self.expect(TokenKind::RightParen)?;

        let declared = self.eat(TokenKind::Semicolon).is_some();
        let index = match existing {
            None => self
                .ctx
                .symbols
                .declare_function(name, ret, params.clone())
                .map_err(|e| self.ctx.symbol_error(e))?,
            Some(index) => {
                let (defined, same) = self
                    .ctx
                    .symbols
                    .function_at(index)
                    .map_or((false, false), |f| (f.defined, f.ret == ret && f.params == params));
                if defined || declared {
                    return Err(self.ctx.symbol_error(SymbolError::Duplicate {
                        kind: SymbolKind::Function,
                        name: name.to_string(),
                    }));
                }
                if !same {
                    return Err(self
                        .ctx
                        .semantic(format!("Function {name} does not match its declaration")));
                }
                index
            }
        };

        if declared {
            self.ctx.symbols.locals.clear();
            log::debug!("function {} '{}' declared", index, name);
            return Ok(());
        }

        self.ctx.symbols.mark_defined(index);
        self.ctx.set_current_function(Some(index));
        let prologue = self.ctx.code_function_prologue(params.len())?;
        let body = self.parse_body(prologue);
        self.ctx.set_current_function(None);
        let code = body?;

        let locals = self.ctx.symbols.locals.types();
        self.ctx.symbols.locals.clear();
        if let Some(event) = self.ctx.symbols.function_at(index).map(|f| f.event) {
            self.ctx.symbols.define_event(event, code, -1, locals);
        }
        log::debug!("function {} '{}' defined", index, name);
        Ok(())
    }

    /// `TYPE name {, TYPE name}`, each entered as a local.
    fn parse_parameters(&mut self) -> CodeResult<Vec<ValueType>> {
        let mut types = Vec::new();
        if self.check(TokenKind::RightParen) {
            return Ok(types);
        }
        loop {
            let ty = self.expect_type()?;
            let name = self.expect_new_name(SymbolKind::Variable)?;
            self.ctx
                .symbols
                .locals
                .declare(name, ty)
                .map_err(|e| self.ctx.symbol_error(e))?;
            types.push(ty);
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(types);
            }
        }
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// `{ locals statements }` following `prologue`, closed with `Exit`.
    fn parse_body(&mut self, prologue: CodeBlock) -> CodeResult<CodeBlock> {
        self.expect(TokenKind::LeftBrace)?;
        self.parse_locals()?;
        let statements = self.parse_statements()?;
        self.expect(TokenKind::RightBrace)?;
        let code = CodeBlock::concat([prologue, statements]).map_err(|e| self.ctx.out_of_memory(e))?;
        self.ctx.finish_body(code)
    }

    /// Leading `local TYPE name {, name};` declarations.
    fn parse_locals(&mut self) -> CodeResult<()> {
        while self.check_storage(StorageClass::Local) {
            let start = self.position;
            if let Err(err) = self.parse_local_decl() {
                self.recover(err)?;
                self.sync_statement();
                if self.position == start {
                    self.skip();
                }
            }
        }
        Ok(())
    }

    fn parse_local_decl(&mut self) -> CodeResult<()> {
        self.advance();
        let ty = self.expect_type()?;

        self.ctx.set_defining_locals(true);
        let names = self.parse_local_names(ty);
        self.ctx.set_defining_locals(false);
        names?;

        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn parse_local_names(&mut self, ty: ValueType) -> CodeResult<()> {
        loop {
            let name = self.expect_new_name(SymbolKind::Variable)?;
            self.ctx
                .symbols
                .locals
                .declare(name, ty)
                .map_err(|e| self.ctx.symbol_error(e))?;
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{DROID, with_parsed};
    use crate::bytecode::{DebugEntry, OpCode, unpack};
    use crate::error::CodeError;
    use wzscript_core::{ParseErrorKind, StorageClass, TriggerType, ValueType};

    fn messages(source: &str) -> Vec<String> {
        with_parsed(source, false, |_, parser| {
            parser.ctx.diagnostics().iter().map(|e| e.message.clone()).collect()
        })
    }

    #[test]
    fn variables_and_arrays() {
        let source = "link DROID;\n\
                      public int a, b;\n\
                      private bool flags[3][4];\n\
                      public DROID unit;\n\
                      public trigger t;";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            let symbols = parser.ctx.symbols();
            let names: Vec<_> = symbols.globals().iter().map(|g| g.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b", "unit", "t"]);
            assert_eq!(symbols.globals()[2].ty, DROID);
            assert_eq!(symbols.globals()[3].ty, ValueType::TRIGGER);
            let (_, flags) = symbols.array("flags").unwrap();
            assert_eq!(flags.extents, vec![3, 4]);
            assert_eq!(flags.storage, StorageClass::Private);
        });
    }

    #[test]
    fn redefinitions() {
        assert_eq!(messages("public int a;\npublic bool a;"), vec!["Variable a already defined"]);
        assert_eq!(
            messages("trigger t(init);\ntrigger t(init);"),
            vec!["Trigger t already defined"]
        );
        assert_eq!(
            messages("event e(inactive) { exit; }\nevent e(inactive) { exit; }"),
            vec!["Event e already defined"]
        );
    }

    #[test]
    fn array_size_limits() {
        with_parsed("public int big[255];", false, |result, parser| {
            assert_eq!(result, Err(CodeError::Fatal));
            assert!(parser.ctx.diagnostics().contains_message("Invalid array size 255"));
        });
        with_parsed("public int deep[2][2][2][2][2];", false, |result, parser| {
            assert_eq!(result, Err(CodeError::Fatal));
            assert!(parser.ctx.diagnostics().contains_message("Too many dimensions for array"));
        });
    }

    #[test]
    fn trigger_kinds() {
        let source = "public int x;\n\
                      trigger a(wait, 30);\n\
                      trigger b(every, 10);\n\
                      trigger c(init);\n\
                      trigger d(x > 5, 20);\n\
                      trigger e(CALL_NEWDROID);";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            let triggers = parser.ctx.symbols().triggers();
            let kinds: Vec<_> = triggers.iter().map(|t| t.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    TriggerType::WAIT,
                    TriggerType::EVERY,
                    TriggerType::INIT,
                    TriggerType::CODE,
                    TriggerType(5)
                ]
            );
            assert_eq!(triggers[0].time, 30);
            assert_eq!(triggers[3].time, 20);
            let cond = triggers[3].code.as_ref().unwrap();
            assert_eq!(cond.opcodes().last(), Some(&OpCode::Exit));
            assert!(triggers[4].code.is_none());
        });
    }

    #[test]
    fn negative_trigger_times_are_fatal() {
        for source in [
            "trigger t(wait, -5);",
            "trigger t(every, -1);",
            "public int x;\ntrigger t(x > 1, -20);",
        ] {
            with_parsed(source, false, |result, parser| {
                assert_eq!(result, Err(CodeError::Fatal));
                assert!(parser.ctx.diagnostics().contains_message("Invalid time for trigger"));
                assert!(parser.ctx.symbols().triggers().is_empty());
            });
        }
    }

    #[test]
    fn callback_argument_errors() {
        assert_eq!(
            messages("trigger t(CALL_ATTACKED);"),
            vec!["Expected parameters for callback trigger"]
        );
        let errors = messages("public bool b;\ntrigger t(CALL_ATTACKED, ref b);");
        assert_eq!(errors, vec!["Type mismatch for paramter 0"]);
    }

    #[test]
    fn code_trigger_debug_lines() {
        let source = "public int x;\ntrigger t(x > 1,\n 5);";
        with_parsed(source, true, |_, parser| {
            let code = parser.ctx.symbols().triggers()[0].code.as_ref().unwrap();
            assert_eq!(
                code.debug(),
                &[DebugEntry { offset: 0, line: 2 }, DebugEntry { offset: 4, line: 3 }]
            );
        });
    }

    #[test]
    fn event_links() {
        let source = "trigger t(every, 10);\n\
                      event a(t) { exit; }\n\
                      event b(inactive) { exit; }\n\
                      event c(wait, 50) { exit; }";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            let symbols = parser.ctx.symbols();
            let links: Vec<_> = symbols.events().iter().map(|e| e.trigger).collect();
            assert_eq!(links, vec![0, -1, 1]);
            assert_eq!(symbols.triggers()[1].name, "");
            assert_eq!(symbols.triggers()[1].kind, TriggerType::WAIT);
        });
    }

    #[test]
    fn inline_condition_starting_with_a_trigger() {
        let source = "trigger t(every, 10);\n\
                      public trigger current;\n\
                      event a(current == t, 5) { exit; }";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            assert!(parser.ctx.diagnostics().is_empty(), "{:?}", parser.ctx.diagnostics());
        });
        let source = "trigger t(every, 10);\n\
                      public trigger current;\n\
                      event a(t == current, 5) { exit; }";
        with_parsed(source, false, |_, parser| {
            let symbols = parser.ctx.symbols();
            assert_eq!(symbols.events()[0].trigger, 1);
            assert_eq!(symbols.triggers()[1].kind, TriggerType::CODE);
        });
    }

    #[test]
    fn forward_declared_event() {
        let source = "event later;\n\
                      event first(inactive) { later(); }\n\
                      event later(inactive) { exit; }";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            assert!(parser.ctx.diagnostics().is_empty(), "{:?}", parser.ctx.diagnostics());
            let events = parser.ctx.symbols().events();
            assert_eq!(events.len(), 2);
            assert!(events[0].code.is_some());
        });
    }

    #[test]
    fn locals_are_per_body() {
        let source = "public int x;\n\
                      event a(inactive) { local int x, y; x = 1; y = x; }\n\
                      event b(inactive) { x = 2; }";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            assert!(parser.ctx.diagnostics().is_empty(), "{:?}", parser.ctx.diagnostics());
            let events = parser.ctx.symbols().events();
            assert_eq!(events[0].locals, vec![ValueType::INT, ValueType::INT]);
            let a = events[0].code.as_ref().unwrap();
            assert_eq!(unpack(a.words()[2]), Some((OpCode::PopLocal, 0)));
            let b = events[1].code.as_ref().unwrap();
            assert_eq!(unpack(b.words()[2]), Some((OpCode::PopGlobal, 0)));
            assert!(events[1].locals.is_empty());
        });
    }

    #[test]
    fn duplicate_local() {
        assert_eq!(
            messages("event a(inactive) { local int x, x; exit; }"),
            vec!["Variable x already defined"]
        );
    }

    #[test]
    fn functions() {
        let source = "function int twice(int n) { return n * 2; }\n\
                      public int x;\n\
                      event e(inactive) { x = twice(4); }";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            assert!(parser.ctx.diagnostics().is_empty(), "{:?}", parser.ctx.diagnostics());
            let symbols = parser.ctx.symbols();
            let (_, twice) = symbols.function("twice").unwrap();
            assert_eq!(twice.params, vec![ValueType::INT]);
            assert!(twice.defined);

            let body = symbols.events()[twice.event as usize].code.as_ref().unwrap();
            assert_eq!(
                body.opcodes(),
                vec![
                    OpCode::PopLocal,
                    OpCode::PushLocal,
                    OpCode::Push,
                    OpCode::BinaryOp,
                    OpCode::Exit,
                    OpCode::Exit
                ]
            );
            assert_eq!(symbols.events()[twice.event as usize].trigger, -1);

            let caller = symbols.events()[1].code.as_ref().unwrap();
            assert_eq!(unpack(caller.words()[2]), Some((OpCode::Func, 0)));
            assert_eq!(caller.words()[3], twice.event);
        });
    }

    #[test]
    fn forward_declared_function() {
        let source = "function void ping();\n\
                      event e(inactive) { ping(); }\n\
                      function void ping() { exit; }";
        with_parsed(source, false, |result, parser| {
            assert_eq!(result, Ok(()));
            assert!(parser.ctx.diagnostics().is_empty(), "{:?}", parser.ctx.diagnostics());
            assert!(parser.ctx.symbols().function("ping").unwrap().1.defined);
        });
        assert_eq!(
            messages("function void ping();\nfunction int ping() { return 1; }"),
            vec!["Function ping does not match its declaration"]
        );
        assert_eq!(
            messages("function void ping() { exit; }\nfunction void ping() { exit; }"),
            vec!["Function ping already defined"]
        );
    }

    #[test]
    fn return_checks() {
        assert_eq!(
            messages("function void f() { return 1; }"),
            vec!["Function does not return a value"]
        );
        assert_eq!(
            messages("function int f() { return; }"),
            vec!["Expected a return value"]
        );
        assert_eq!(
            messages("function int f() { return TRUE; }"),
            vec!["Type mismatch for return value"]
        );
    }

    #[test]
    fn local_storage_at_top_level() {
        with_parsed("local int x;", false, |_, parser| {
            let error = parser.ctx.diagnostics().last().unwrap();
            assert_eq!(error.kind, ParseErrorKind::Semantic);
        });
    }
}
