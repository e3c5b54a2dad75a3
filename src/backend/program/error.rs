//! Build error types for the program builder and dispatcher.

use crate::backend::jit::JitError;
use crate::backend::symbol::ResolveError;

/// Build error types
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Token is neither a literal nor resolvable
    UnresolvedSymbol {
        symbol: String,
        cause: Option<ResolveError>,
    },
    /// Operator found with fewer than two pending operands
    MalformedExpression {
        /// Index of the offending token among non-empty tokens
        position: usize,
        token: String,
        available: usize,
    },
    /// Operands left over (or missing) once all tokens are consumed
    UnbalancedExpression { remaining: usize },
    /// Expression contains no operands
    EmptyExpression,
    /// Native code generation failed
    Codegen(JitError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedSymbol { symbol, cause: None } => {
                write!(f, "Unresolved symbol '{}': no symbol resolver is set", symbol)
            }
            Self::UnresolvedSymbol { symbol, cause: Some(cause) } => {
                write!(f, "Unresolved symbol '{}': {}", symbol, cause)
            }
            Self::MalformedExpression { position, token, available } => {
                write!(
                    f,
                    "Malformed expression: operator '{}' at token {} needs 2 operands, found {}",
                    token, position, available
                )
            }
            Self::UnbalancedExpression { remaining } => {
                write!(
                    f,
                    "Unbalanced expression: expected 1 value on the stack, got {}",
                    remaining
                )
            }
            Self::EmptyExpression => write!(f, "Empty expression"),
            Self::Codegen(e) => write!(f, "Code generation failed: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnresolvedSymbol { cause: Some(cause), .. } => Some(cause),
            Self::Codegen(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JitError> for BuildError {
    fn from(e: JitError) -> Self {
        Self::Codegen(e)
    }
}

/// Result type for building
pub type BuildResult<T> = Result<T, BuildError>;
