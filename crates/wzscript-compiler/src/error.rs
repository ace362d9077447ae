//! Outcome of a single code generation step.

use thiserror::Error;

/// Why a code generation step produced no code.
///
/// The diagnostic itself has already been reported when one of these is
/// returned; the variant only tells the parser how to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodeError {
    /// A fragment could not be allocated. The compile stops.
    #[error("out of memory")]
    OutOfMemory,

    /// A problem that stops the compile at once.
    #[error("fatal error")]
    Fatal,

    /// A type or usage error. The parser resynchronizes and continues.
    #[error("semantic error")]
    Semantic,
}

impl CodeError {
    /// Whether the parser may resynchronize after this error.
    pub fn is_recoverable(self) -> bool {
        self == CodeError::Semantic
    }
}

/// Result of a code generation step.
pub type CodeResult<T> = Result<T, CodeError>;
