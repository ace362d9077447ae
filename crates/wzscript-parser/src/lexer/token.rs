//! Token types for the script lexer.
//!
//! Besides the usual keywords and punctuation, identifiers that name a known
//! symbol carry their resolution with them: the token kind records what the
//! symbol is and which expression family it belongs to, and
//! [`TokenValue`] holds the resolved symbol.

use std::fmt;

use wzscript_core::{Span, StorageClass, ValueType};

use crate::env::{ConstSymbol, Family, FuncSymbol, VarSymbol};

/// A token from the source code.
///
/// The `'ast` lifetime refers to the arena where the lexeme is allocated, so
/// token text stays valid for the whole compile.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    /// The source text of this token; the text between the quotes for
    /// [`TokenKind::Text`].
    pub lexeme: &'ast str,
    pub span: Span,
    pub value: TokenValue,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self {
            kind,
            lexeme,
            span,
            value: TokenValue::None,
        }
    }

    #[inline]
    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = value;
        self
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// Payload of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenValue {
    #[default]
    None,
    Bool(bool),
    Int(i32),
    Type(ValueType),
    Storage(StorageClass),
    Var(VarSymbol),
    Const(ConstSymbol),
    Func(FuncSymbol),
    Trigger(u32),
    Event(u32),
    Callback(u32),
}

/// All token types of the script language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Integer literal: `42`
    Integer,
    /// `TRUE`, `true`, `FALSE`, `false`
    Boolean,
    /// Quoted text: `"hello"`
    Text,

    // =========================================
    // Identifiers
    // =========================================
    /// A name with no current meaning.
    Ident,
    /// A built-in or host type name.
    Type,
    /// Global, local or external scalar variable.
    Var(Family),
    /// Global array.
    Array(Family),
    /// Member variable, only produced while an object context is active.
    ObjVar(Family),
    /// Named host constant.
    Constant(Family),
    /// Function with a result of the given family.
    Func(Family),
    /// Function without a result.
    VoidFunc,
    TrigSym,
    EventSym,
    CallbackSym,

    // =========================================
    // Keywords
    // =========================================
    Wait,
    Every,
    Trigger,
    Event,
    Inactive,
    Init,
    Link,
    Ref,
    /// `public`, `private`, `local`
    Storage,
    While,
    If,
    Else,
    Exit,
    Pause,
    Function,
    Return,
    Void,

    // =========================================
    // Operators
    // =========================================
    /// `&&` or `and`
    AndAnd,
    /// `||` or `or`
    OrOr,
    /// `!` or `not`
    Not,
    EqualEqual,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    Plus,
    Minus,
    Star,
    Slash,
    Equal,

    // =========================================
    // Punctuation
    // =========================================
    Dot,
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    /// Any other printable character.
    Char,

    // =========================================
    // Special
    // =========================================
    /// A malformed token; the lexer recorded why.
    Error,
    Eof,
}

impl TokenKind {
    /// Whether the lexer produced this kind from a symbol lookup, so a
    /// different environment may classify the same text differently.
    pub fn is_classified_word(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Type
                | TokenKind::Var(_)
                | TokenKind::Array(_)
                | TokenKind::ObjVar(_)
                | TokenKind::Constant(_)
                | TokenKind::Func(_)
                | TokenKind::VoidFunc
                | TokenKind::TrigSym
                | TokenKind::EventSym
                | TokenKind::CallbackSym
        )
    }

    /// Short description used in diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Boolean => "boolean",
            TokenKind::Text => "text",
            TokenKind::Ident => "identifier",
            TokenKind::Type => "type",
            TokenKind::Var(_) => "variable",
            TokenKind::Array(_) => "array",
            TokenKind::ObjVar(_) => "member variable",
            TokenKind::Constant(_) => "constant",
            TokenKind::Func(_) | TokenKind::VoidFunc => "function",
            TokenKind::TrigSym => "trigger",
            TokenKind::EventSym => "event",
            TokenKind::CallbackSym => "callback",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
            _ => "symbol",
        }
    }
}

/// Keyword or fixed-meaning word lookup.
pub fn lookup_keyword(ident: &str) -> Option<(TokenKind, TokenValue)> {
    use TokenKind::*;
    let plain = |kind| Some((kind, TokenValue::None));
    match ident {
        "wait" => plain(Wait),
        "every" => plain(Every),
        "trigger" => plain(Trigger),
        "event" => plain(Event),
        "inactive" => plain(Inactive),
        "init" | "initialise" => plain(Init),
        "link" => plain(Link),
        "ref" => plain(Ref),
        "while" => plain(While),
        "if" => plain(If),
        "else" => plain(Else),
        "exit" => plain(Exit),
        "pause" => plain(Pause),
        "function" => plain(Function),
        "return" => plain(Return),
        "void" => plain(Void),
        "and" => plain(AndAnd),
        "or" => plain(OrOr),
        "not" => plain(Not),

        "public" => Some((Storage, TokenValue::Storage(StorageClass::Public))),
        "private" => Some((Storage, TokenValue::Storage(StorageClass::Private))),
        "local" => Some((Storage, TokenValue::Storage(StorageClass::Local))),

        "bool" | "BOOL" => Some((Type, TokenValue::Type(ValueType::BOOL))),
        "int" | "INT" | "number" => Some((Type, TokenValue::Type(ValueType::INT))),
        "string" | "STRING" => Some((Type, TokenValue::Type(ValueType::STRING))),

        "TRUE" | "true" => Some((Boolean, TokenValue::Bool(true))),
        "FALSE" | "false" => Some((Boolean, TokenValue::Bool(false))),
        _ => None,
    }
}
