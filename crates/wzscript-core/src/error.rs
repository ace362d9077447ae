//! Error types for every phase of script compilation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LexError          - tokenization problems (mostly recoverable)
//! ParseError        - one diagnostic from the parser or code generator
//! ParseErrors       - every diagnostic reported by one compile
//! RegistrationError - malformed host tables
//! CompilationError  - why a compile produced no program
//! ```

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Problems found while tokenizing.
///
/// None of these stop the lexer. An unterminated comment or a stray
/// character is only a warning; the others surface as an error token the
/// parser then rejects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// End of input was reached inside a block comment.
    #[error("reached end of file in a comment at {span}")]
    UnterminatedComment { span: Span },

    /// End of input was reached inside quoted text.
    #[error("unterminated text at {span}")]
    UnterminatedString { span: Span },

    /// An integer literal does not fit in a 32-bit word.
    #[error("integer literal '{text}' out of range at {span}")]
    IntegerOverflow { text: String, span: Span },

    /// A character that starts no token; it is skipped.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedCharacter { ch: char, span: Span },
}

impl LexError {
    /// Where the problem was found.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedComment { span } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::IntegerOverflow { span, .. } => *span,
            LexError::UnexpectedCharacter { span, .. } => *span,
        }
    }

    /// Whether compilation may still succeed after this problem.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            LexError::UnterminatedComment { .. } | LexError::UnexpectedCharacter { .. }
        )
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The token stream does not match the grammar.
    Syntax,
    /// The source is well formed but wrongly typed or misuses a symbol.
    Semantic,
    /// A problem that stops the compile at once (bad array size, undefined event).
    Fatal,
    /// A code fragment could not be allocated.
    OutOfMemory,
}

impl ParseErrorKind {
    /// Label used when rendering a diagnostic.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::Syntax => "syntax error",
            ParseErrorKind::Semantic => "semantic error",
            ParseErrorKind::Fatal => "fatal error",
            ParseErrorKind::OutOfMemory => "out of memory",
        }
    }

    /// Whether the parser may try to resynchronize after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ParseErrorKind::Syntax | ParseErrorKind::Semantic)
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reported problem: where it was, what was wrong and the text of the
/// token being looked at when it was reported.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
    pub token: String,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        span: Span,
        message: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
            token: token.into(),
        }
    }

    /// A diagnostic for a token the grammar does not allow here.
    pub fn syntax(span: Span, token: &str) -> Self {
        Self::new(ParseErrorKind::Syntax, span, "syntax error", token)
    }

    /// Render the diagnostic followed by the offending source line, with
    /// the token underlined.
    pub fn display_with_source(&self, source: &str) -> String {
        let column = self.span.col.max(1) as usize;
        let mut out = format!("Error at {}:{}: {}\n", self.span.line, column, self.kind);
        if !self.message.is_empty() {
            out += &format!("  {}\n", self.message);
        }

        let text = (self.span.line as usize)
            .checked_sub(1)
            .and_then(|index| source.lines().nth(index));
        if let Some(text) = text {
            let underline = format!("^{}", "~".repeat((self.span.len as usize).saturating_sub(1)));
            out += &format!("  |\n{:>3} | {}\n", self.span.line, text);
            out += &format!("  | {}{}\n", " ".repeat(column - 1), underline);
        }
        out
    }
}

/// Every diagnostic reported by one compile, in report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    /// The diagnostic reported last; the one a host shows when it only
    /// shows one.
    pub fn last(&self) -> Option<&ParseError> {
        self.0.last()
    }

    /// Whether some diagnostic's message contains `needle`.
    pub fn contains_message(&self, needle: &str) -> bool {
        self.0.iter().any(|e| e.message.contains(needle))
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no errors"),
            [only] => only.fmt(f),
            all => {
                writeln!(f, "{} errors:", all.len())?;
                all.iter()
                    .enumerate()
                    .try_for_each(|(i, error)| writeln!(f, "  {}. {}", i + 1, error))
            }
        }
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Problems in the host tables handed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Host type ids must start at the user base and have no gaps.
    #[error("type '{name}' has id {id}, expected {expected}")]
    NonContiguousType { name: String, id: u32, expected: u32 },

    /// The same name was registered twice in one table.
    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    /// A callback trigger id is below the callback base.
    #[error("callback '{name}' has trigger id {id}, below the callback base {base}")]
    CallbackId { name: String, id: u32, base: u32 },

    /// A function signature has more parameters than the interpreter supports.
    #[error("'{name}' declares {count} parameters, at most {max} are allowed")]
    TooManyParameters { name: String, count: usize, max: usize },

    /// A signature names a type that is neither built in nor registered.
    #[error("'{name}' uses unknown type id {id}")]
    UnknownType { name: String, id: u32 },
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Why a compile produced no program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// The script had one or more errors.
    #[error("{0}")]
    Parse(ParseErrors),

    /// An event was declared but never given a body.
    #[error("Event {name} declared without being defined")]
    UndefinedEvent { name: String },

    /// A code fragment could not be allocated.
    #[error("out of memory")]
    OutOfMemory,

    /// The host tables were rejected before compiling.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl CompilationError {
    /// The diagnostics of a failed compile, if it got that far.
    pub fn diagnostics(&self) -> Option<&ParseErrors> {
        match self {
            CompilationError::Parse(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ParseErrors> for CompilationError {
    fn from(errors: ParseErrors) -> Self {
        CompilationError::Parse(errors)
    }
}
