//! Cranelift JIT Compilation Module
//!
//! Lowers a [`Program`](crate::backend::program::Program) into host machine
//! code. The generated function has the host C calling convention:
//!
//! ```text
//! fn(values: *const f64, stack: *mut f64) -> f64
//!
//! Fetch:   load [values], values += 8, store [stack], stack += 8
//! Binary:  stack -= 8, load rhs; stack -= 8, load lhs
//!          op lhs, rhs; store [stack], stack += 8
//! Return:  load [stack - 8]
//! ```
//!
//! Only `+ - * /` have a native lowering; programs using `^` or `if` are
//! rejected with [`JitError::UnsupportedOperator`]. Constant folding runs
//! first, so such ops over constants never reach the compiler.
//!
//! # Modules
//!
//! - `error`: [`JitError`] and [`JitResult`]
//! - `codegen`: per-op Cranelift IR emission
//! - `compiler`: [`JitCompiler`], Program to native code
//! - `region`: executable memory ownership
//! - `routine`: [`JitRoutine`], the callable result

mod error;

#[cfg(feature = "jit")]
mod codegen;
#[cfg(feature = "jit")]
mod compiler;
#[cfg(feature = "jit")]
mod region;
#[cfg(feature = "jit")]
mod routine;

#[cfg(not(feature = "jit"))]
mod disabled;

pub use error::{JitError, JitResult};

#[cfg(feature = "jit")]
pub use compiler::JitCompiler;
#[cfg(feature = "jit")]
pub use routine::JitRoutine;

#[cfg(not(feature = "jit"))]
pub use disabled::{JitCompiler, JitRoutine};

/// Whether native code generation was compiled in
pub const JIT_ENABLED: bool = cfg!(feature = "jit");
