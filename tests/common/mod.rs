//! Test utilities for expression integration tests
//!
//! This module provides:
//! - A fixed resolver with both constant and dynamic symbols
//! - A mutable input backed by an atomic, for memoization tests
//! - The backend configurations every expression is checked against

#![allow(dead_code)]

use rpnjit::backend::{
    BackendChoice, EngineConfig, ResolveError, SymbolResolver, ValueSource,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Resolver with a fixed set of symbols
///
/// | symbol | kind     | value |
/// |--------|----------|-------|
/// | x0     | dynamic  | 2     |
/// | x1     | dynamic  | 3     |
/// | y      | constant | 4     |
/// | z      | dynamic  | 1     |
pub struct DummyResolver;

impl SymbolResolver for DummyResolver {
    fn resolve(&self, name: &str) -> Result<ValueSource, ResolveError> {
        match name {
            "x0" => Ok(ValueSource::dynamic(|| 2.0)),
            "x1" => Ok(ValueSource::dynamic(|| 3.0)),
            "y" => Ok(ValueSource::constant(4.0)),
            "z" => Ok(ValueSource::dynamic(|| 1.0)),
            _ => Err(ResolveError::UnknownSymbol(name.to_string())),
        }
    }
}

/// An `f64` input that can be changed between evaluations
#[derive(Clone)]
pub struct Knob(Arc<AtomicU64>);

impl Knob {
    pub fn new(value: f64) -> Self {
        Knob(Arc::new(AtomicU64::new(value.to_bits())))
    }

    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn source(&self) -> ValueSource {
        let cell = Arc::clone(&self.0);
        ValueSource::dynamic(move || f64::from_bits(cell.load(Ordering::Relaxed)))
    }
}

/// Configurations for every interpretive backend
pub fn interpretive_configs() -> Vec<(&'static str, EngineConfig)> {
    vec![
        ("auto", EngineConfig::default()),
        ("interpreter", EngineConfig::interpreter_only()),
        ("tree", EngineConfig::default().with_backend(BackendChoice::CallTree)),
    ]
}

/// JIT configuration with room for larger test expressions
pub fn jit_config() -> EngineConfig {
    EngineConfig::jit().with_code_limit(1 << 16)
}

/// Bitwise equality, except every NaN equals every other NaN
pub fn same_result(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}
