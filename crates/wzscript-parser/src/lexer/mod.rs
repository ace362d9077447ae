//! Lexical analysis for scripts.

mod cursor;
mod lexer;
mod token;

pub use lexer::{Lexer, classify};
pub use token::{Token, TokenKind, TokenValue, lookup_keyword};
