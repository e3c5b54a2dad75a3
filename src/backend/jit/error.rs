//! JIT error types

use std::fmt;

use crate::backend::ops::Op;

/// Error types for native code generation
#[derive(Debug, Clone, PartialEq)]
pub enum JitError {
    /// Operator has no native lowering
    UnsupportedOperator(Op),

    /// Generated code does not fit the configured limit
    CodeSizeExceeded { size: usize, limit: usize },

    /// Cranelift compilation error
    CompilationError(String),

    /// Crate built without the `jit` feature
    Unavailable,
}

impl fmt::Display for JitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JitError::UnsupportedOperator(op) => {
                write!(f, "Unsupported operator for native code: '{}'", op)
            }
            JitError::CodeSizeExceeded { size, limit } => {
                write!(f, "Generated code is {} bytes, limit is {} bytes", size, limit)
            }
            JitError::CompilationError(msg) => write!(f, "Compilation error: {}", msg),
            JitError::Unavailable => write!(f, "JIT support was not compiled in"),
        }
    }
}

impl std::error::Error for JitError {}

/// Result type for JIT operations
pub type JitResult<T> = Result<T, JitError>;
