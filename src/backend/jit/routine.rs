//! Callable native routine

use std::fmt;
use std::sync::Arc;

use super::region::CodeRegion;
use crate::backend::program::Program;
use crate::backend::symbol::{ValueLoader, ValueSource};

/// Signature of generated code: `fn(values, stack) -> result`
pub(crate) type EntryFn = unsafe extern "C" fn(*const f64, *mut f64) -> f64;

/// A compiled program together with everything its machine code touches.
///
/// The operand array has constants written once here; dynamic slots are
/// refreshed before every call. The scratch stack is sized to the program's
/// maximum depth, which is exactly what the generated code walks.
pub struct JitRoutine {
    region: CodeRegion,
    entry: EntryFn,
    code_size: usize,
    values: Box<[f64]>,
    stack: Box<[f64]>,
    dynamic: Vec<(usize, Arc<dyn ValueLoader>)>,
}

impl JitRoutine {
    pub(crate) fn new(region: CodeRegion, entry: EntryFn, code_size: usize, program: &Program) -> Self {
        let mut values = vec![0.0; program.operands().len()].into_boxed_slice();
        let mut dynamic = Vec::new();
        for (slot, operand) in program.operands().iter().enumerate() {
            match &operand.source {
                ValueSource::Constant(value) => values[slot] = *value,
                ValueSource::Dynamic(loader) => dynamic.push((slot, Arc::clone(loader))),
            }
        }

        Self {
            region,
            entry,
            code_size,
            values,
            stack: vec![0.0; program.max_depth()].into_boxed_slice(),
            dynamic,
        }
    }

    /// Refresh dynamic inputs and run the native code.
    ///
    /// # Panics
    ///
    /// Panics if the code region was released.
    pub fn call(&mut self) -> f64 {
        if self.region.is_released() {
            panic!("native routine called after its code region was released");
        }
        for (slot, loader) in &self.dynamic {
            self.values[*slot] = loader.load();
        }
        // SAFETY: the region is live, `values` holds one slot per fetch and
        // `stack` holds max_depth slots, which bounds every generated access.
        unsafe { (self.entry)(self.values.as_ptr(), self.stack.as_mut_ptr()) }
    }

    /// Size of the generated machine code in bytes
    pub fn code_size(&self) -> usize {
        self.code_size
    }

    /// Free the executable memory now instead of on drop
    ///
    /// # Panics
    ///
    /// Panics if the memory was already released.
    pub fn release(&mut self) {
        self.region.release();
    }

    pub fn is_released(&self) -> bool {
        self.region.is_released()
    }
}

impl fmt::Debug for JitRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitRoutine")
            .field("code_size", &self.code_size)
            .field("slots", &self.values.len())
            .field("dynamic", &self.dynamic.len())
            .field("released", &self.region.is_released())
            .finish()
    }
}
