//! Stand-ins used when the crate is built without the `jit` feature.
//!
//! Neither type can be constructed: [`JitCompiler::new`] always fails with
//! [`JitError::Unavailable`].

use std::convert::Infallible;

use super::error::{JitError, JitResult};
use crate::backend::config::EngineConfig;
use crate::backend::program::Program;

pub struct JitCompiler {
    never: Infallible,
}

impl JitCompiler {
    pub fn new(_config: &EngineConfig) -> JitResult<Self> {
        Err(JitError::Unavailable)
    }

    pub fn can_compile(_program: &Program) -> bool {
        false
    }

    pub fn compile(&mut self, _program: &Program) -> JitResult<JitRoutine> {
        match self.never {}
    }
}

#[derive(Debug)]
pub struct JitRoutine {
    never: Infallible,
}

impl JitRoutine {
    pub fn call(&mut self) -> f64 {
        match self.never {}
    }

    pub fn code_size(&self) -> usize {
        match self.never {}
    }

    pub fn release(&mut self) {
        match self.never {}
    }

    pub fn is_released(&self) -> bool {
        match self.never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_unavailable() {
        assert!(matches!(
            JitCompiler::new(&EngineConfig::jit()),
            Err(JitError::Unavailable)
        ));
    }
}
