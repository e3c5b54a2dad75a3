//! Symbols and value sources
//!
//! A symbol is any token of an expression that is not an operator sign.
//! Symbols resolve to a [`ValueSource`]: either a constant known at build
//! time, which takes part in constant folding, or a dynamic loader that is
//! read on every evaluation.
//!
//! # Example
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//! use rpnjit::backend::{build, SymbolTable, ValueSource};
//!
//! let x = Arc::new(AtomicU64::new(1f64.to_bits()));
//! let mut symbols = SymbolTable::new();
//! symbols.insert("y", ValueSource::constant(10.0));
//! let reader = Arc::clone(&x);
//! symbols.insert_fn("x", move || f64::from_bits(reader.load(Ordering::Relaxed)));
//!
//! let mut expr = build("y x 2 * +", Some(&symbols)).unwrap();
//! assert_eq!(expr.eval(), 12.0);
//!
//! x.store(3f64.to_bits(), Ordering::Relaxed);
//! assert_eq!(expr.eval(), 16.0);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Something able to produce the current value of a variable.
///
/// Implementations own whatever state they read; the evaluator only calls
/// `load` and never mutates the loader.
pub trait ValueLoader: Send + Sync {
    /// Return the current value of the variable
    fn load(&self) -> f64;
}

impl<F> ValueLoader for F
where
    F: Fn() -> f64 + Send + Sync,
{
    #[inline]
    fn load(&self) -> f64 {
        self()
    }
}

/// Resolved value of a symbol or literal
#[derive(Clone)]
pub enum ValueSource {
    /// Fixed value known at build time
    Constant(f64),
    /// Live value read on every fetch
    Dynamic(Arc<dyn ValueLoader>),
}

impl ValueSource {
    /// Create a constant source
    pub fn constant(value: f64) -> Self {
        ValueSource::Constant(value)
    }

    /// Create a dynamic source from a closure
    pub fn dynamic<F>(loader: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        ValueSource::Dynamic(Arc::new(loader))
    }

    /// Get the constant value, if this source is constant
    #[inline]
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            ValueSource::Constant(v) => Some(*v),
            ValueSource::Dynamic(_) => None,
        }
    }

    /// Check if this source is known at build time
    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, ValueSource::Constant(_))
    }

    /// Read the current value
    #[inline]
    pub fn load(&self) -> f64 {
        match self {
            ValueSource::Constant(v) => *v,
            ValueSource::Dynamic(loader) => loader.load(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            ValueSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Error returned by a [`SymbolResolver`]
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The resolver does not know this symbol
    UnknownSymbol(String),
    /// Resolver-specific failure
    Other(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownSymbol(name) => write!(f, "symbol '{}' not found", name),
            ResolveError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Dispatcher of variable names to their value sources.
///
/// The resolver is borrowed only while an expression is being built; the
/// compiled expression keeps the returned dynamic loaders, not the resolver.
pub trait SymbolResolver {
    /// Return the value source for the variable named `name`
    fn resolve(&self, name: &str) -> Result<ValueSource, ResolveError>;
}

/// Simple name → value source table
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<String, ValueSource>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `source`, returning the previous binding if any
    pub fn insert(&mut self, name: impl Into<String>, source: ValueSource) -> Option<ValueSource> {
        self.entries.insert(name.into(), source)
    }

    /// Bind `name` to a dynamic closure
    pub fn insert_fn<F>(&mut self, name: impl Into<String>, loader: F) -> Option<ValueSource>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.insert(name, ValueSource::dynamic(loader))
    }

    /// Remove a binding
    pub fn remove(&mut self, name: &str) -> Option<ValueSource> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, name: &str) -> Result<ValueSource, ResolveError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownSymbol(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_constant_source() {
        let source = ValueSource::constant(4.0);
        assert!(source.is_constant());
        assert_eq!(source.as_constant(), Some(4.0));
        assert_eq!(source.load(), 4.0);
    }

    #[test]
    fn test_dynamic_source_reads_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = ValueSource::dynamic(move || counter.fetch_add(1, Ordering::Relaxed) as f64);

        assert!(!source.is_constant());
        assert_eq!(source.as_constant(), None);
        assert_eq!(source.load(), 0.0);
        assert_eq!(source.load(), 1.0);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_symbol_table_resolve() {
        let mut table = SymbolTable::new();
        assert!(table.is_empty());
        table.insert("y", ValueSource::constant(4.0));
        table.insert_fn("z", || 1.0);
        assert_eq!(table.len(), 2);

        assert_eq!(table.resolve("y").unwrap().as_constant(), Some(4.0));
        assert_eq!(table.resolve("z").unwrap().load(), 1.0);
        assert_eq!(
            table.resolve("w").unwrap_err(),
            ResolveError::UnknownSymbol("w".to_string())
        );

        assert!(table.remove("y").is_some());
        assert!(table.resolve("y").is_err());
    }

    #[test]
    fn test_debug_hides_loader() {
        let source = ValueSource::dynamic(|| 1.0);
        assert_eq!(format!("{:?}", source), "Dynamic(..)");
        assert_eq!(format!("{:?}", ValueSource::constant(2.0)), "Constant(2.0)");
    }
}
