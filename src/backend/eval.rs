//! Compiled expressions and their evaluation backends
//!
//! Every backend evaluates the same [`Program`]:
//!
//! ```text
//! Interpreter  flat stack machine over the op list (reference semantics)
//! CallTree     recursive evaluation of an arena-allocated expression tree
//! Jit          native code generated by Cranelift
//! ```
//!
//! A [`CompiledExpression`] owns exactly one backend plus the memoization
//! state. Evaluation never fails: arithmetic follows IEEE-754, so division
//! by zero and overflow surface as infinities and NaN.

mod interpreter;
mod tree;

pub use interpreter::Interpreter;
pub use tree::CallTree;

use std::fmt;
use std::sync::Arc;

use super::jit::JitRoutine;
use super::program::Program;

/// Which backend a compiled expression runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Interpreter,
    CallTree,
    Jit,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Interpreter => "interpreter",
            BackendKind::CallTree => "tree",
            BackendKind::Jit => "jit",
        })
    }
}

/// Evaluation backend owned by a compiled expression
pub(crate) enum Backend {
    Flat(Interpreter),
    Tree(CallTree),
    Jit(JitRoutine),
}

impl Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Backend::Flat(_) => BackendKind::Interpreter,
            Backend::Tree(_) => BackendKind::CallTree,
            Backend::Jit(_) => BackendKind::Jit,
        }
    }

    #[inline]
    fn run(&mut self) -> f64 {
        match self {
            Backend::Flat(interpreter) => interpreter.run(),
            Backend::Tree(tree) => tree.eval(),
            Backend::Jit(routine) => routine.call(),
        }
    }
}

/// A built expression, ready for repeated evaluation
pub struct CompiledExpression {
    description: String,
    program: Arc<Program>,
    backend: Backend,
    memoize: bool,
    cached: Option<f64>,
}

impl CompiledExpression {
    pub(crate) fn new(description: impl Into<String>, program: Arc<Program>, backend: Backend) -> Self {
        Self {
            description: description.into(),
            program,
            backend,
            memoize: false,
            cached: None,
        }
    }

    /// Evaluate the expression.
    ///
    /// Dynamic values are re-read on every call unless memoization is on
    /// and a result is already cached.
    #[inline]
    pub fn eval(&mut self) -> f64 {
        if let Some(value) = self.cached {
            return value;
        }
        let value = self.backend.run();
        if self.memoize {
            self.cached = Some(value);
        }
        value
    }

    /// Enable or disable memoization, returning the previous setting.
    ///
    /// Never evaluates. Disabling drops any cached result.
    pub fn set_memoization(&mut self, enabled: bool) -> bool {
        let previous = std::mem::replace(&mut self.memoize, enabled);
        if !enabled {
            self.cached = None;
        }
        previous
    }

    /// Check if memoization is enabled
    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    /// Drop the cached result so the next `eval` recomputes
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// The expression text this was built from
    pub fn describe(&self) -> &str {
        &self.description
    }

    /// The program every backend evaluates
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The backend in use
    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("description", &self.description)
            .field("backend", &self.backend.kind())
            .field("memoize", &self.memoize)
            .field("cached", &self.cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::symbol::SymbolTable;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn knob_table(knob: &Arc<AtomicU64>) -> SymbolTable {
        let mut table = SymbolTable::new();
        let reader = Arc::clone(knob);
        table.insert_fn("x", move || f64::from_bits(reader.load(Ordering::Relaxed)));
        table
    }

    fn flat(expr: &str, table: &SymbolTable) -> CompiledExpression {
        let program = Arc::new(Program::parse(expr, Some(table)).unwrap());
        let backend = Backend::Flat(Interpreter::new(Arc::clone(&program)));
        CompiledExpression::new(expr, program, backend)
    }

    #[test]
    fn test_eval_reads_dynamic_values() {
        let knob = Arc::new(AtomicU64::new(2f64.to_bits()));
        let mut expr = flat("x 3 *", &knob_table(&knob));
        assert_eq!(expr.eval(), 6.0);
        knob.store(5f64.to_bits(), Ordering::Relaxed);
        assert_eq!(expr.eval(), 15.0);
    }

    #[test]
    fn test_memoization_freezes_result() {
        let knob = Arc::new(AtomicU64::new(2f64.to_bits()));
        let mut expr = flat("x 1 +", &knob_table(&knob));

        assert!(!expr.set_memoization(true));
        assert_eq!(expr.eval(), 3.0);
        knob.store(10f64.to_bits(), Ordering::Relaxed);
        assert_eq!(expr.eval(), 3.0);

        expr.invalidate();
        assert_eq!(expr.eval(), 11.0);

        knob.store(20f64.to_bits(), Ordering::Relaxed);
        assert!(expr.set_memoization(false));
        assert_eq!(expr.eval(), 21.0);
    }

    #[test]
    fn test_set_memoization_does_not_evaluate() {
        let knob = Arc::new(AtomicU64::new(1f64.to_bits()));
        let mut expr = flat("x 1 +", &knob_table(&knob));
        expr.set_memoization(true);
        knob.store(4f64.to_bits(), Ordering::Relaxed);
        assert_eq!(expr.eval(), 5.0);
    }

    #[test]
    fn test_interpretive_backends_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Program>();
        assert_send_sync::<Interpreter>();
        assert_send_sync::<CallTree>();
    }

    #[test]
    fn test_describe_and_display() {
        let table = SymbolTable::new();
        let expr = flat("1  2 +", &table);
        assert_eq!(expr.describe(), "1  2 +");
        assert_eq!(expr.to_string(), "1  2 +");
        assert_eq!(expr.program().to_string(), "3");
        assert_eq!(expr.backend(), BackendKind::Interpreter);
    }
}
