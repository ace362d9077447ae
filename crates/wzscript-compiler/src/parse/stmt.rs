//! Statement parsing.
//!
//! Statements appear in event and function bodies. Assignments and call
//! statements record the line of their closing `;` when debug info is on;
//! `if` and `while` record the line of their closing `)`.

use wzscript_core::ValueType;
use wzscript_parser::{Family, TokenKind, TokenValue};

use crate::bytecode::CodeBlock;
use crate::emit::{CondBlock, else_clause, else_if, finish_conditional, if_clause, while_loop};
use crate::error::CodeResult;

use super::Parser;
use super::expr::Expr;

impl Parser<'_, '_, '_> {
    /// Parse one statement.
    pub(super) fn parse_statement(&mut self) -> CodeResult<CodeBlock> {
        let token = self.peek();
        match (token.kind, token.value) {
            (TokenKind::If, _) => self.parse_if(),
            (TokenKind::While, _) => self.parse_while(),
            (TokenKind::Exit, _) => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                self.ctx.code_exit()
            }
            (TokenKind::Pause, _) => {
                self.advance();
                self.expect(TokenKind::LeftParen)?;
                let time = self.int_literal()?;
                self.expect(TokenKind::RightParen)?;
                self.expect(TokenKind::Semicolon)?;
                self.ctx.code_pause(time)
            }
            (TokenKind::Return, _) => self.parse_return(),
            (TokenKind::EventSym, TokenValue::Event(index)) => {
                self.advance();
                self.expect(TokenKind::LeftParen)?;
                self.expect(TokenKind::RightParen)?;
                self.expect(TokenKind::Semicolon)?;
                let code = self.ctx.code_event_call(index)?;
                Ok(self.ctx.statement_debug(code))
            }
            (TokenKind::Var(_) | TokenKind::Array(_) | TokenKind::Func(_) | TokenKind::VoidFunc, _) => {
                let code = self.parse_simple_statement()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(self.ctx.statement_debug(code))
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// An assignment or a call, without the closing `;`.
    fn parse_simple_statement(&mut self) -> CodeResult<CodeBlock> {
        let token = self.peek();
        match (token.kind, token.value) {
            (TokenKind::Var(family), TokenValue::Var(var)) => {
                self.advance();
                if family == Family::Object && self.check(TokenKind::Dot) {
                    let code = self.ctx.code_var_get(var)?;
                    return self.parse_member_assignment(Expr {
                        code,
                        ty: var.ty,
                        family,
                    });
                }
                self.expect(TokenKind::Equal)?;
                let value = self.parse_expr(0)?;
                self.check_assignment(var.ty, family, &value)?;
                self.ctx.code_assignment(var, value.code)
            }
            (TokenKind::Array(family), TokenValue::Var(var)) => {
                self.advance();
                let access = self.parse_array_access(var)?;
                if family == Family::Object && self.check(TokenKind::Dot) {
                    let code = self.ctx.code_array_get(access)?;
                    return self.parse_member_assignment(Expr {
                        code,
                        ty: var.ty,
                        family,
                    });
                }
                self.expect(TokenKind::Equal)?;
                let value = self.parse_expr(0)?;
                self.check_assignment(var.ty, family, &value)?;
                self.ctx.code_array_assignment(access, value.code)
            }
            (TokenKind::Func(family), TokenValue::Func(func)) => {
                self.advance();
                let params = self.parse_arguments()?;
                if family == Family::Object && self.check(TokenKind::Dot) {
                    let code = self.ctx.code_call(func, params, false)?;
                    return self.parse_member_assignment(Expr {
                        code,
                        ty: func.ret,
                        family,
                    });
                }
                self.ctx.code_call(func, params, true)
            }
            (TokenKind::VoidFunc, TokenValue::Func(func)) => {
                self.advance();
                self.parse_call(func, true)
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// `.member = value`, possibly through a chain of object members.
    fn parse_member_assignment(&mut self, mut object: Expr) -> CodeResult<CodeBlock> {
        loop {
            let (access, family) = self.parse_member(object)?;
            if self.check(TokenKind::Dot) {
                if family != Family::Object {
                    return Err(self.syntax_error());
                }
                let ty = access.var.ty;
                let code = self.ctx.code_object_get(access)?;
                object = Expr { code, ty, family };
                continue;
            }

            self.expect(TokenKind::Equal)?;
            let value = self.parse_expr(0)?;
            self.check_assignment(access.var.ty, family, &value)?;
            return self.ctx.code_object_assignment(access, value.code);
        }
    }

    /// Numeric and boolean targets take a value of their own family; user
    /// and object targets take any equivalent type.
    fn check_assignment(&mut self, target: ValueType, family: Family, value: &Expr) -> CodeResult<()> {
        if value.family != family {
            return Err(self.ctx.semantic("Type mismatch for assignment"));
        }
        match family {
            Family::User | Family::Object => self.ctx.check_assign_type(target, value.ty),
            Family::Num | Family::Bool => Ok(()),
        }
    }

    // ========================================================================
    // Flow
    // ========================================================================

    /// `if (cond) body {else if (cond) body} [else body]`
    fn parse_if(&mut self) -> CodeResult<CodeBlock> {
        let mut chain = self.parse_if_clause()?;
        while self.eat(TokenKind::Else).is_some() {
            if self.check(TokenKind::If) {
                let clause = self.parse_if_clause()?;
                chain = else_if(chain, clause).map_err(|e| self.ctx.flow_error(e))?;
            } else {
                let body = self.parse_clause_body()?;
                chain = else_clause(chain, body).map_err(|e| self.ctx.flow_error(e))?;
                break;
            }
        }
        finish_conditional(chain).map_err(|e| self.ctx.flow_error(e))
    }

    fn parse_if_clause(&mut self) -> CodeResult<CondBlock> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LeftParen)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::RightParen)?;
        let line = self.ctx.debug_line();
        let body = self.parse_clause_body()?;
        if_clause(cond, body, line).map_err(|e| self.ctx.flow_error(e))
    }

    /// `while (cond) body`
    fn parse_while(&mut self) -> CodeResult<CodeBlock> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LeftParen)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::RightParen)?;
        let line = self.ctx.debug_line();
        let body = self.parse_clause_body()?;
        while_loop(cond, body, line).map_err(|e| self.ctx.flow_error(e))
    }

    /// A braced statement list or a single statement.
    fn parse_clause_body(&mut self) -> CodeResult<CodeBlock> {
        if self.eat(TokenKind::LeftBrace).is_none() {
            return self.parse_statement();
        }
        let body = self.parse_statements()?;
        self.expect(TokenKind::RightBrace)?;
        Ok(body)
    }

    /// `return;` or `return value;`
    fn parse_return(&mut self) -> CodeResult<CodeBlock> {
        self.expect(TokenKind::Return)?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?.into_typed())
        };
        self.expect(TokenKind::Semicolon)?;
        self.ctx.code_return(value)
    }
}
