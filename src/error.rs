use thiserror::Error;

use crate::types::Ty;

/// Crate-wide error type. Every failure aborts the whole operation;
/// nothing is recovered locally.
#[derive(Debug, Error)]
pub enum Error {
    /// The compiler met a source construct it does not lower.
    #[error("unsupported construct: {0}")]
    Unsupported(String),

    /// A value cannot be coerced to the demanded type.
    #[error("cannot coerce {from} to {to}")]
    Coercion { from: Ty, to: Ty },

    /// Integer literal outside the 32-bit signed range.
    #[error("integer literal {0} out of range")]
    IntRange(i64),

    /// A function failed validation.
    #[error("func[{findex}] pc={pc}: {msg}")]
    Validate {
        findex: usize,
        pc: usize,
        msg: String,
    },

    /// A quantity does not fit the binary encoding.
    #[error("write overflow: {0}")]
    Overflow(String),

    /// The byte stream is not a well-formed module.
    #[error("malformed module: {0}")]
    Read(String),

    /// No handler was provided for a declared native.
    #[error("unresolved native '{0}'")]
    UnresolvedNative(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
