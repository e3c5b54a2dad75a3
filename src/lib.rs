/// rpnjit - RPN Expression Evaluator Library
///
/// This library builds arithmetic expressions written in Reverse Polish
/// Notation once and evaluates them many times against named inputs whose
/// values may change between evaluations.
///
/// # Architecture
///
/// The build pipeline consists of two stages:
///
/// 1. **Program Building** (`backend::program`)
///    - Splits the expression on spaces
///    - Resolves literals (`0x1f`, `h1f`, `b101`, `o17`, `3.5`, `1e3`) and symbols
///    - Folds operations whose operands are all constants
///    - Validates stack balance and records the maximum stack depth
///
/// 2. **Backend Selection** (`backend::build_with`)
///    - Call tree for short expressions
///    - Flat stack interpreter for long or deeply nested ones
///    - Cranelift-generated native code on request
///
/// # Example
///
/// ```rust
/// use rpnjit::backend::*;
///
/// let mut symbols = SymbolTable::new();
/// symbols.insert("y", ValueSource::constant(4.0));
/// symbols.insert_fn("x0", || 2.0);
/// symbols.insert_fn("x1", || 3.0);
///
/// // y * (x0 + x1)
/// let mut expr = build("y x0 x1 + *", Some(&symbols)).unwrap();
/// assert_eq!(expr.eval(), 20.0);
/// assert_eq!(expr.program().to_infix(), "(y * (x0 + x1))");
/// ```
///
/// # Operators
///
/// - **Arithmetic**: `+`, `-`, `*`, `/` (IEEE-754 doubles, no error on overflow or 0/0)
/// - **Power**: `^`
/// - **Conditional**: `c v if` yields `v` when `c > 0`, otherwise `0`

pub mod backend;

pub use backend::{
    build, build_native, build_with, BackendChoice, BackendKind, BuildError, BuildResult,
    CompiledExpression, EngineConfig, SymbolResolver, SymbolTable, ValueSource,
};
