//! Shared vocabulary for the wzscript compiler crates.
//!
//! - [`Span`]: source locations for diagnostics
//! - [`ValueType`], [`StorageClass`], [`AccessKind`], [`TriggerType`]: the
//!   tags written into programs
//! - [`error`]: error types for every phase

pub mod error;
mod span;
mod types;

pub use error::{
    CompilationError, LexError, ParseError, ParseErrorKind, ParseErrors, RegistrationError,
};
pub use span::Span;
pub use types::{AccessKind, StorageClass, TriggerType, VAL_REF, ValueType};
