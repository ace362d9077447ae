//! Lexer for the trigger/event script language.
//!
//! The lexer resolves identifiers while it scans them: whether a word is a
//! type, a variable of some family, a function or a trigger depends on the
//! [`SymbolEnv`] the compiler passes in at that moment.

mod env;
pub mod lexer;

pub use env::{ConstSymbol, Family, FuncSymbol, FuncTarget, SymbolEnv, VarSymbol};
pub use lexer::{Lexer, Token, TokenKind, TokenValue};
