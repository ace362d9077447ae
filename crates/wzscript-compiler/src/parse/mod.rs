//! Grammar-driven parser.
//!
//! The parser pulls tokens from the [`Lexer`] one at a time and calls into
//! code generation as each construct is recognized. Tokens are scanned
//! lazily: the lookahead is only read once every declaration before it has
//! been entered in the [`CompilationContext`], so the lexer classifies each
//! word against the symbols visible at that point.
//!
//! # Error recovery
//!
//! A mismatch goes through three phases:
//!
//! 1. The pending lookahead is classified again under the current
//!    environment. If the fresh token fits, parsing carries on silently.
//! 2. Otherwise the error is reported and unwinds to the nearest statement
//!    list or declaration list.
//! 3. That list discards tokens until it reaches a point where a new
//!    statement or declaration can start, or the end of input.
//!
//! Further syntax errors are not reported until three tokens have been
//! accepted after a recovery. Fatal and out-of-memory errors end the parse
//! at once, as does reaching the error limit.

mod decl;
mod expr;
mod stmt;

use bumpalo::Bump;

use wzscript_core::{LexError, ParseErrorKind, StorageClass};
use wzscript_parser::{Lexer, Token, TokenKind, TokenValue};
use wzscript_registry::HostRegistry;

use crate::bytecode::CodeBlock;
use crate::context::CompilationContext;
use crate::error::{CodeError, CodeResult};
use crate::options::CompileOptions;

/// Tokens that must be accepted after a recovery before syntax errors are
/// reported again.
const ERROR_SHIFTS: u8 = 3;

/// Parser for one script.
pub struct Parser<'src, 'ast, 'reg> {
    lexer: Lexer<'src, 'ast>,
    pub(crate) ctx: CompilationContext<'reg, 'ast>,

    /// The next token, once it has been scanned.
    lookahead: Option<Token<'ast>>,
    /// Tokens taken from the lexer so far, accepted or discarded.
    position: usize,
    /// Kind of the last accepted token.
    last_accepted: Option<TokenKind>,
    /// Accepted tokens still needed before syntax errors are reported again.
    err_flag: u8,
    max_errors: usize,

    /// Why the last error token was produced.
    lex_error: Option<LexError>,
    warnings: Vec<LexError>,
}

impl<'src, 'ast, 'reg> Parser<'src, 'ast, 'reg> {
    pub fn new(
        source: &'src str,
        arena: &'ast Bump,
        registry: &'reg HostRegistry,
        options: &CompileOptions,
    ) -> Self {
        Self {
            lexer: Lexer::new(source, arena),
            ctx: CompilationContext::new(registry, options.debug_info),
            lookahead: None,
            position: 0,
            last_accepted: None,
            err_flag: 0,
            max_errors: options.max_errors,
            lex_error: None,
            warnings: Vec::new(),
        }
    }

    /// Consume the parser, returning the context and the lexical warnings.
    pub fn finish(mut self) -> (CompilationContext<'reg, 'ast>, Vec<LexError>) {
        self.collect_lex_errors();
        (self.ctx, self.warnings)
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// The next token, scanning it if needed.
    pub(crate) fn peek(&mut self) -> Token<'ast> {
        if let Some(token) = self.lookahead {
            return token;
        }
        let token = self.lexer.next_token(&self.ctx);
        self.collect_lex_errors();
        self.ctx.set_location(token.span, token.lexeme);
        self.lookahead = Some(token);
        token
    }

    /// Accept the next token.
    pub(crate) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        self.lookahead = None;
        self.position += 1;
        self.last_accepted = Some(token.kind);
        self.err_flag = self.err_flag.saturating_sub(1);
        token
    }

    /// Discard the next token during recovery.
    fn skip(&mut self) {
        let token = self.peek();
        log::trace!("discarding {:?}", token);
        self.lookahead = None;
        self.position += 1;
    }

    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Accept a token of the given kind or report a syntax error.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> CodeResult<Token<'ast>> {
        if self.check(kind) || self.refresh_lookahead().kind == kind {
            return Ok(self.advance());
        }
        Err(self.syntax_error())
    }

    /// Whether the next token is the given storage keyword.
    pub(crate) fn check_storage(&mut self, storage: StorageClass) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Storage && token.value == TokenValue::Storage(storage)
    }

    /// Classify the lookahead again under the current environment.
    fn refresh_lookahead(&mut self) -> Token<'ast> {
        let token = self.peek();
        let fresh = self.lexer.rescan(token, &self.ctx);
        if fresh.kind != token.kind {
            log::trace!("rescanned {:?} as {:?}", token, fresh.kind);
        }
        self.lookahead = Some(fresh);
        fresh
    }

    fn collect_lex_errors(&mut self) {
        for error in self.lexer.take_errors() {
            if error.is_warning() {
                self.warnings.push(error);
            } else {
                self.lex_error = Some(error);
            }
        }
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Report the lookahead as unexpected.
    ///
    /// Nothing is reported while still recovering from an earlier error.
    pub(crate) fn syntax_error(&mut self) -> CodeError {
        let token = self.peek();
        if self.err_flag == 0 {
            let message = match token.kind {
                TokenKind::Error => self
                    .lex_error
                    .take()
                    .map_or_else(|| "syntax error".to_string(), |e| e.to_string()),
                TokenKind::Ident => "unknown identifier".to_string(),
                _ => "syntax error".to_string(),
            };
            self.ctx.report(ParseErrorKind::Syntax, message);
        }
        self.err_flag = ERROR_SHIFTS;
        CodeError::Semantic
    }

    /// Decide whether parsing may continue after `err`.
    fn recover(&mut self, err: CodeError) -> CodeResult<()> {
        if !err.is_recoverable() {
            return Err(err);
        }
        if self.ctx.error_count() >= self.max_errors {
            log::warn!("giving up after {} errors", self.ctx.error_count());
            return Err(CodeError::Fatal);
        }
        self.ctx.set_object_context(None);
        self.ctx.set_defining_locals(false);
        Ok(())
    }

    /// Skip to the end of the current statement.
    ///
    /// Stops after a `;` or a block closing at this level, or before a `}`
    /// closing the enclosing block, a statement keyword or the end of input.
    /// An `else` after the end is skipped along with its clause.
    fn sync_statement(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::RightBrace if depth == 0 => return,
                TokenKind::RightBrace => {
                    self.skip();
                    depth -= 1;
                    if depth == 0 && !self.skip_else() {
                        return;
                    }
                }
                TokenKind::LeftBrace => {
                    depth += 1;
                    self.skip();
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.skip();
                    if !self.skip_else() {
                        return;
                    }
                }
                TokenKind::If
                | TokenKind::While
                | TokenKind::Exit
                | TokenKind::Pause
                | TokenKind::Return
                    if depth == 0 =>
                {
                    return;
                }
                _ => self.skip(),
            }
        }
    }

    /// Skip an `else` or `else if` continuing a clause that was just
    /// skipped, so the rest of the chain is skipped with it.
    fn skip_else(&mut self) -> bool {
        if !self.check(TokenKind::Else) {
            return false;
        }
        self.skip();
        if self.check(TokenKind::If) {
            self.skip();
        }
        true
    }

    /// Whether the statement started at `start` already took its closing
    /// `;` or `}` before failing.
    fn statement_closed(&self, start: usize) -> bool {
        self.position > start
            && matches!(self.last_accepted, Some(TokenKind::Semicolon | TokenKind::RightBrace))
    }

    /// Skip to the start of the next declaration.
    fn sync_declaration(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Storage
                | TokenKind::Trigger
                | TokenKind::Event
                | TokenKind::Function
                | TokenKind::Link
                    if depth == 0 =>
                {
                    return;
                }
                TokenKind::LeftBrace => {
                    depth += 1;
                    self.skip();
                }
                TokenKind::RightBrace => {
                    self.skip();
                    if depth <= 1 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.skip();
                    return;
                }
                _ => self.skip(),
            }
        }
    }

    /// Forget the state of a body abandoned half way.
    fn reset_body(&mut self) {
        self.ctx.symbols.locals.clear();
        self.ctx.set_current_function(None);
    }

    // ========================================================================
    // Script
    // ========================================================================

    /// Parse a whole script.
    ///
    /// Returns `Ok` once the input is exhausted, even if errors were
    /// reported on the way; the context's diagnostics tell whether the
    /// script compiled.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_script(&mut self) -> CodeResult<()> {
        loop {
            let start = self.position;
            let result = match self.peek().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Link => self.parse_link(),
                TokenKind::Storage => self.parse_variable_decl(),
                TokenKind::Trigger => self.parse_trigger_decl(),
                TokenKind::Event => self.parse_event_decl(),
                TokenKind::Function => self.parse_function_decl(),
                _ => Err(self.syntax_error()),
            };
            if let Err(err) = result {
                self.recover(err)?;
                self.reset_body();
                self.sync_declaration();
                if self.position == start && !self.check(TokenKind::Eof) {
                    self.skip();
                }
            }
        }
    }

    /// A list of statements up to the closing `}` of the enclosing block.
    fn parse_statements(&mut self) -> CodeResult<CodeBlock> {
        let mut code = CodeBlock::new();
        loop {
            if matches!(self.peek().kind, TokenKind::RightBrace | TokenKind::Eof) {
                return Ok(code);
            }
            let start = self.position;
            match self.parse_statement() {
                Ok(statement) => code
                    .try_append(statement)
                    .map_err(|e| self.ctx.out_of_memory(e))?,
                Err(err) => {
                    self.recover(err)?;
                    if !self.statement_closed(start) || self.skip_else() {
                        self.sync_statement();
                    }
                    if self.position == start
                        && !matches!(self.peek().kind, TokenKind::RightBrace | TokenKind::Eof)
                    {
                        self.skip();
                    }
                }
            }
        }
    }
}
