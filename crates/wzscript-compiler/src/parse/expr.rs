//! Expression parsing using precedence climbing.
//!
//! Operands carry their expression family; each operator only accepts the
//! families it is defined for:
//!
//! | operators            | operands       | result |
//! |----------------------|----------------|--------|
//! | `* /`, `+ -`         | numeric        | numeric |
//! | `< > <= >=`          | numeric        | boolean |
//! | `== !=`              | same family    | boolean |
//! | `&& \|\|`            | boolean        | boolean |
//! | unary `-` / `!`      | numeric / bool | same   |

use wzscript_core::ValueType;
use wzscript_parser::{Family, FuncSymbol, TokenKind, TokenValue, VarSymbol};

use crate::bytecode::{BinaryOp, CodeBlock, UnaryOp};
use crate::codegen::Typed;
use crate::emit::{ParamBlock, VarAccess};
use crate::error::CodeResult;

use super::Parser;

/// Binding power of the unary operators, above every binary one.
const UNARY_PRECEDENCE: u8 = 7;

/// A compiled expression.
#[derive(Debug)]
pub(super) struct Expr {
    pub code: CodeBlock,
    pub ty: ValueType,
    pub family: Family,
}

impl Expr {
    fn new(code: CodeBlock, ty: ValueType, family: Family) -> Self {
        Self { code, ty, family }
    }

    fn boolean(code: CodeBlock) -> Self {
        Self::new(code, ValueType::BOOL, Family::Bool)
    }

    fn number(code: CodeBlock) -> Self {
        Self::new(code, ValueType::INT, Family::Num)
    }

    pub fn into_typed(self) -> Typed {
        Typed::new(self.code, self.ty)
    }
}

/// Binary operator and precedence for a token.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::EqualEqual => (BinaryOp::Equal, 3),
        TokenKind::NotEqual => (BinaryOp::NotEqual, 3),
        TokenKind::Less => (BinaryOp::Less, 4),
        TokenKind::Greater => (BinaryOp::Greater, 4),
        TokenKind::LessEqual => (BinaryOp::LessEqual, 4),
        TokenKind::GreaterEqual => (BinaryOp::GreaterEqual, 4),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        _ => return None,
    };
    Some(op)
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::Less => "<",
    }
}

impl Parser<'_, '_, '_> {
    /// Parse an expression whose operators bind at least as tightly as
    /// `min_precedence`.
    pub(super) fn parse_expr(&mut self, min_precedence: u8) -> CodeResult<Expr> {
        let lhs = self.parse_prefix()?;
        self.parse_infix(lhs, min_precedence)
    }

    /// Continue an expression whose first operand is already compiled.
    pub(super) fn parse_infix(&mut self, mut lhs: Expr, min_precedence: u8) -> CodeResult<Expr> {
        loop {
            let kind = self.peek().kind;
            if kind == TokenKind::Dot && lhs.family == Family::Object {
                lhs = self.parse_member_read(lhs)?;
                continue;
            }

            let Some((op, precedence)) = binary_op(kind) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(precedence + 1)?;
            lhs = self.combine(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    /// A boolean expression.
    pub(super) fn parse_condition(&mut self) -> CodeResult<CodeBlock> {
        let expr = self.parse_expr(0)?;
        if expr.family != Family::Bool {
            return Err(self.ctx.semantic("Expected a boolean expression"));
        }
        Ok(expr.code)
    }

    fn combine(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> CodeResult<Expr> {
        let (want, result) = match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                (Some(Family::Num), Family::Num)
            }
            BinaryOp::Greater | BinaryOp::Less | BinaryOp::GreaterEqual | BinaryOp::LessEqual => {
                (Some(Family::Num), Family::Bool)
            }
            BinaryOp::And | BinaryOp::Or => (Some(Family::Bool), Family::Bool),
            BinaryOp::Equal | BinaryOp::NotEqual => (None, Family::Bool),
        };

        let families_ok = lhs.family == rhs.family && want.is_none_or(|f| f == lhs.family);
        if !families_ok {
            return Err(self
                .ctx
                .semantic(format!("Type mismatch for operator {}", op_symbol(op))));
        }

        let code = match lhs.family {
            Family::User | Family::Object => {
                self.ctx
                    .code_equality(lhs.code, lhs.ty, rhs.code, rhs.ty, op)?
            }
            Family::Num | Family::Bool => self.ctx.code_binary(lhs.code, rhs.code, op)?,
        };
        Ok(match result {
            Family::Num => Expr::number(code),
            _ => Expr::boolean(code),
        })
    }

    // ========================================================================
    // Operands
    // ========================================================================

    fn parse_prefix(&mut self) -> CodeResult<Expr> {
        let token = self.peek();
        match (token.kind, token.value) {
            (TokenKind::Integer, TokenValue::Int(value)) => {
                self.advance();
                Ok(Expr::number(self.ctx.code_push(ValueType::INT, value as u32)?))
            }
            (TokenKind::Boolean, TokenValue::Bool(value)) => {
                self.advance();
                Ok(Expr::boolean(self.ctx.code_push(ValueType::BOOL, u32::from(value))?))
            }
            (TokenKind::Text, _) => {
                self.advance();
                let code = self.ctx.code_string(token.lexeme)?;
                Ok(Expr::new(code, ValueType::STRING, Family::User))
            }
            (TokenKind::Minus, _) => {
                self.advance();
                let operand = self.parse_expr(UNARY_PRECEDENCE)?;
                if operand.family != Family::Num {
                    return Err(self.ctx.semantic("Type mismatch for operator -"));
                }
                Ok(Expr::number(self.ctx.code_unary(operand.code, UnaryOp::Neg)?))
            }
            (TokenKind::Not, _) => {
                self.advance();
                let operand = self.parse_expr(UNARY_PRECEDENCE)?;
                if operand.family != Family::Bool {
                    return Err(self.ctx.semantic("Type mismatch for operator !"));
                }
                Ok(Expr::boolean(self.ctx.code_unary(operand.code, UnaryOp::Not)?))
            }
            (TokenKind::LeftParen, _) => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            (TokenKind::Var(family), TokenValue::Var(var)) => {
                self.advance();
                let code = self.ctx.code_var_get(var)?;
                Ok(Expr::new(code, var.ty, family))
            }
            (TokenKind::Array(family), TokenValue::Var(var)) => {
                self.advance();
                let access = self.parse_array_access(var)?;
                let code = self.ctx.code_array_get(access)?;
                Ok(Expr::new(code, var.ty, family))
            }
            (TokenKind::Constant(family), TokenValue::Const(constant)) => {
                self.advance();
                let code = self.ctx.code_push(constant.ty, constant.value.to_word())?;
                Ok(Expr::new(code, constant.ty, family))
            }
            (TokenKind::Func(family), TokenValue::Func(func)) => {
                self.advance();
                let code = self.parse_call(func, false)?;
                Ok(Expr::new(code, func.ret, family))
            }
            (TokenKind::VoidFunc, _) => Err(self.ctx.semantic("Function does not return a value")),
            (TokenKind::TrigSym, TokenValue::Trigger(index)) => {
                self.advance();
                self.trigger_value(index as i32)
            }
            (TokenKind::Inactive, _) => {
                self.advance();
                self.trigger_value(-1)
            }
            (TokenKind::EventSym, TokenValue::Event(index)) => {
                self.advance();
                let code = self.ctx.code_push(ValueType::EVENT, index)?;
                Ok(Expr::new(code, ValueType::EVENT, Family::User))
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// A trigger used as a value, `-1` for `inactive`.
    pub(super) fn trigger_value(&mut self, index: i32) -> CodeResult<Expr> {
        let code = self.ctx.code_push(ValueType::TRIGGER, index as u32)?;
        Ok(Expr::new(code, ValueType::TRIGGER, Family::User))
    }

    /// `[index]` for each dimension after an array name.
    pub(super) fn parse_array_access(&mut self, var: VarSymbol) -> CodeResult<VarAccess> {
        let mut indices = ParamBlock::new();
        while self.eat(TokenKind::LeftBracket).is_some() {
            let index = self.parse_expr(0)?;
            if index.family != Family::Num {
                return Err(self.ctx.semantic("Array index must be a numeric expression"));
            }
            self.expect(TokenKind::RightBracket)?;
            indices
                .push(index.code, index.ty)
                .map_err(|e| self.ctx.out_of_memory(e))?;
        }
        self.ctx.code_array_access(var, indices)
    }

    /// `.member` after an object expression.
    ///
    /// The member name is scanned with the object's type as context, so it
    /// resolves against that type's members.
    pub(super) fn parse_member(&mut self, object: Expr) -> CodeResult<(VarAccess, Family)> {
        self.expect(TokenKind::Dot)?;
        self.ctx.set_object_context(Some(object.ty));
        let token = self.peek();
        self.ctx.set_object_context(None);

        match (token.kind, token.value) {
            (TokenKind::ObjVar(family) | TokenKind::Var(family), TokenValue::Var(var)) => {
                self.advance();
                let access = self.ctx.code_object_access(object.code, var)?;
                Ok((access, family))
            }
            _ => Err(self.syntax_error()),
        }
    }

    fn parse_member_read(&mut self, object: Expr) -> CodeResult<Expr> {
        let (access, family) = self.parse_member(object)?;
        let ty = access.var.ty;
        let code = self.ctx.code_object_get(access)?;
        Ok(Expr::new(code, ty, family))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// `(args)` after a function name.
    pub(super) fn parse_call(&mut self, func: FuncSymbol, as_statement: bool) -> CodeResult<CodeBlock> {
        let params = self.parse_arguments()?;
        self.ctx.code_call(func, params, as_statement)
    }

    /// A parenthesized argument list.
    pub(super) fn parse_arguments(&mut self) -> CodeResult<ParamBlock> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = ParamBlock::new();
        if self.eat(TokenKind::RightParen).is_some() {
            return Ok(params);
        }
        loop {
            self.parse_argument(&mut params)?;
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(params)
    }

    /// Arguments without parentheses, as given to a callback trigger.
    pub(super) fn parse_argument_list(&mut self) -> CodeResult<ParamBlock> {
        let mut params = ParamBlock::new();
        loop {
            self.parse_argument(&mut params)?;
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(params);
            }
        }
    }

    /// One argument: an expression or `ref variable`.
    fn parse_argument(&mut self, params: &mut ParamBlock) -> CodeResult<()> {
        let (code, ty) = if self.eat(TokenKind::Ref).is_some() {
            let token = self.peek();
            match (token.kind, token.value) {
                (TokenKind::Var(_), TokenValue::Var(var)) => {
                    self.advance();
                    self.ctx.code_var_ref(var)?
                }
                _ => return Err(self.syntax_error()),
            }
        } else {
            let arg = self.parse_expr(0)?;
            (arg.code, arg.ty)
        };
        params.push(code, ty).map_err(|e| self.ctx.out_of_memory(e))
    }

    /// An integer literal, optionally negated.
    pub(super) fn int_literal(&mut self) -> CodeResult<i32> {
        let negative = self.eat(TokenKind::Minus).is_some();
        let token = self.peek();
        match (token.kind, token.value) {
            (TokenKind::Integer, TokenValue::Int(value)) => {
                self.advance();
                Ok(if negative { value.wrapping_neg() } else { value })
            }
            _ => Err(self.syntax_error()),
        }
    }
}
