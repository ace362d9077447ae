//! Main lexer implementation for scripts.
//!
//! The [`Lexer`] converts script text into [`Token`]s one at a time. Words
//! are classified when they are scanned, against the [`SymbolEnv`] passed to
//! [`Lexer::next_token`], so the parser must only ask for a token once the
//! declarations before it have been processed.
//!
//! Token text is copied into the arena and stays valid for the whole
//! compile.

use bumpalo::Bump;

use wzscript_core::{LexError, Span, StorageClass, ValueType};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, TokenValue, lookup_keyword};
use crate::env::{Family, SymbolEnv, VarSymbol};

/// Lexer for script source.
///
/// The `'src` lifetime is the source text being lexed.
/// The `'ast` lifetime is the arena where token lexemes are allocated.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors and warnings, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Line the lexer has reached.
    pub fn line(&self) -> u32 {
        self.cursor.line()
    }

    /// Scan the next token, classifying words against `env`.
    pub fn next_token<E: SymbolEnv + ?Sized>(&mut self, env: &E) -> Token<'ast> {
        let token = self.scan_token(env);
        log::trace!("token {:?}", token);
        token
    }

    /// Re-classify an already scanned token under the current environment.
    ///
    /// Only words depend on the environment; any other token is returned
    /// unchanged.
    pub fn rescan<E: SymbolEnv + ?Sized>(&self, token: Token<'ast>, env: &E) -> Token<'ast> {
        if !token.kind.is_classified_word() {
            return token;
        }
        let (kind, value) = classify(token.lexeme, env);
        Token {
            kind,
            value,
            ..token
        }
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token<E: SymbolEnv + ?Sized>(&mut self, env: &E) -> Token<'ast> {
        loop {
            if !self.skip_trivia() {
                return self.make_eof();
            }

            let start_line = self.cursor.line();
            let start_col = self.cursor.column();
            let start_offset = self.cursor.offset();

            let Some(c) = self.cursor.peek() else {
                return self.make_eof();
            };

            return match c {
                '"' => self.scan_text(start_line, start_col, start_offset),
                c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
                c if is_ident_start(c) => {
                    self.scan_word(env, start_line, start_col, start_offset)
                }
                c if c.is_ascii_graphic() => {
                    self.scan_operator(start_line, start_col, start_offset)
                }
                c => {
                    self.cursor.advance();
                    let span = Span::new(start_line, start_col, c.len_utf8() as u32);
                    log::warn!("ignoring unexpected character {:?} at {}", c, span);
                    self.errors.push(LexError::UnexpectedCharacter { ch: c, span });
                    continue;
                }
            };
        }
    }

    /// Skip whitespace and comments. Returns false once the input is exhausted.
    fn skip_trivia(&mut self) -> bool {
        loop {
            self.cursor.eat_while(|c| c.is_ascii_whitespace());

            match (self.cursor.peek(), self.cursor.peek_second()) {
                (None, _) => return false,
                (Some('/'), Some('/')) => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    if !self.skip_block_comment() {
                        return false;
                    }
                }
                _ => return true,
            }
        }
    }

    /// Skip a block comment. Returns false if the input ends inside it.
    fn skip_block_comment(&mut self) -> bool {
        let span = Span::new(self.cursor.line(), self.cursor.column(), 2);
        self.cursor.advance();
        self.cursor.advance();
        loop {
            match self.cursor.advance() {
                None => {
                    log::warn!("reached end of file in a comment started at {}", span);
                    self.errors.push(LexError::UnterminatedComment { span });
                    return false;
                }
                Some('*') if self.cursor.eat('/') => return true,
                Some(_) => {}
            }
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let text = self.cursor.slice_from(start_offset);
        let span = Span::new(start_line, start_col, text.len() as u32);
        Token::new(kind, self.arena.alloc_str(text), span)
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: words, numbers, text
    // =========================================

    fn scan_word<E: SymbolEnv + ?Sized>(
        &mut self,
        env: &E,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.eat_while(is_ident_continue);
        let token = self.make_token(TokenKind::Ident, start_line, start_col, start_offset);
        let (kind, value) = classify(token.lexeme, env);
        Token {
            kind,
            value,
            ..token
        }
    }

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
        match digits.parse::<i32>() {
            Ok(value) => self
                .make_token(TokenKind::Integer, start_line, start_col, start_offset)
                .with_value(TokenValue::Int(value)),
            Err(_) => {
                let span = Span::new(start_line, start_col, digits.len() as u32);
                self.make_error(LexError::IntegerOverflow {
                    text: digits.to_string(),
                    span,
                })
            }
        }
    }

    /// Scan quoted text. The lexeme is the text between the quotes.
    fn scan_text(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.advance();
        let body_start = self.cursor.offset();
        self.cursor.eat_while(|c| c != '"');

        if !self.cursor.eat('"') {
            let len = self.cursor.offset() - start_offset;
            return self.make_error(LexError::UnterminatedString {
                span: Span::new(start_line, start_col, len),
            });
        }

        let text = &self.cursor.source()[body_start as usize..(self.cursor.offset() - 1) as usize];
        let len = self.cursor.offset() - start_offset;
        Token::new(
            TokenKind::Text,
            self.arena.alloc_str(text),
            Span::new(start_line, start_col, len),
        )
    }

    // =========================================
    // Scanning: Operators and punctuation
    // =========================================

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        use TokenKind::*;

        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };

        let kind = match c {
            '=' if self.cursor.eat('=') => EqualEqual,
            '=' => Equal,
            '!' if self.cursor.eat('=') => NotEqual,
            '!' => Not,
            '>' if self.cursor.eat('=') => GreaterEqual,
            '>' => Greater,
            '<' if self.cursor.eat('=') => LessEqual,
            '<' => Less,
            '&' if self.cursor.eat('&') => AndAnd,
            '|' if self.cursor.eat('|') => OrOr,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '.' => Dot,
            ',' => Comma,
            ';' => Semicolon,
            '(' => LeftParen,
            ')' => RightParen,
            '{' => LeftBrace,
            '}' => RightBrace,
            '[' => LeftBracket,
            ']' => RightBracket,
            _ => Char,
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}

// =========================================
// Identifier classification
// =========================================

/// Classify a word against the environment.
///
/// First match wins: keyword, type, variable (member while an object
/// context is active, then external, local, and global unless locals are
/// being declared), constant, script function, native function, trigger,
/// event, callback. Anything else is a fresh identifier.
pub fn classify<E: SymbolEnv + ?Sized>(word: &str, env: &E) -> (TokenKind, TokenValue) {
    if let Some(keyword) = lookup_keyword(word) {
        return keyword;
    }
    if let Some(ty) = env.type_named(word) {
        return (TokenKind::Type, TokenValue::Type(ty));
    }
    if let Some(var) = lookup_variable(word, env) {
        return (variable_kind(&var, env), TokenValue::Var(var));
    }
    if let Some(constant) = env.constant(word) {
        let family = Family::of(constant.ty, env.access(constant.ty));
        return (TokenKind::Constant(family), TokenValue::Const(constant));
    }
    if let Some(func) = env
        .script_function(word)
        .or_else(|| env.native_function(word))
    {
        let family = Family::of(func.ret, env.access(func.ret));
        let kind = if family != Family::Object && func.ret.without_ref() == ValueType::VOID {
            TokenKind::VoidFunc
        } else {
            TokenKind::Func(family)
        };
        return (kind, TokenValue::Func(func));
    }
    if let Some(index) = env.trigger(word) {
        return (TokenKind::TrigSym, TokenValue::Trigger(index));
    }
    if let Some(index) = env.event(word) {
        return (TokenKind::EventSym, TokenValue::Event(index));
    }
    if let Some(index) = env.callback(word) {
        return (TokenKind::CallbackSym, TokenValue::Callback(index));
    }
    (TokenKind::Ident, TokenValue::None)
}

fn lookup_variable<E: SymbolEnv + ?Sized>(word: &str, env: &E) -> Option<VarSymbol> {
    env.object_context()
        .and_then(|context| env.member(word, context))
        .or_else(|| env.external(word))
        .or_else(|| env.local(word))
        .or_else(|| {
            if env.defining_locals() {
                None
            } else {
                env.global(word)
            }
        })
}

fn variable_kind<E: SymbolEnv + ?Sized>(var: &VarSymbol, env: &E) -> TokenKind {
    let family = Family::of(var.ty, env.access(var.ty));
    if var.storage == StorageClass::Object {
        TokenKind::ObjVar(family)
    } else if var.is_array() {
        TokenKind::Array(family)
    } else {
        TokenKind::Var(family)
    }
}
