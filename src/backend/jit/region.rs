//! Ownership of executable memory

use cranelift_jit::JITModule;
use tracing::trace;

#[cfg(test)]
thread_local! {
    static RELEASED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Regions freed by the current thread so far
#[cfg(test)]
pub(crate) fn released_on_this_thread() -> usize {
    RELEASED.with(|count| count.get())
}

/// Guard owning the JIT module that holds a routine's machine code.
///
/// The module is taken out and its memory freed exactly once, either by an
/// explicit [`release`](Self::release) or on drop; releasing twice panics.
/// Creating the guard before any code is defined means every early return
/// during compilation frees whatever was already allocated.
pub(crate) struct CodeRegion {
    module: Option<JITModule>,
}

impl CodeRegion {
    pub fn new(module: JITModule) -> Self {
        Self {
            module: Some(module),
        }
    }

    /// Access the module.
    ///
    /// # Panics
    ///
    /// Panics if the region was already released.
    pub fn module_mut(&mut self) -> &mut JITModule {
        match self.module.as_mut() {
            Some(module) => module,
            None => panic!("executable region used after release"),
        }
    }

    pub fn is_released(&self) -> bool {
        self.module.is_none()
    }

    /// Free the executable memory.
    ///
    /// # Panics
    ///
    /// Panics if the region was already released.
    pub fn release(&mut self) {
        match self.module.take() {
            Some(module) => Self::free(module),
            None => panic!("executable region released twice"),
        }
    }

    fn release_if_live(&mut self) {
        if let Some(module) = self.module.take() {
            Self::free(module);
        }
    }

    fn free(module: JITModule) {
        // SAFETY: every function pointer into this module is owned by the
        // routine holding this region, which checks `is_released` before
        // calling into it.
        unsafe { module.free_memory() };
        #[cfg(test)]
        RELEASED.with(|count| count.set(count.get() + 1));
        trace!(target: "rpnjit::jit", "released executable region");
    }
}

impl Drop for CodeRegion {
    fn drop(&mut self) {
        self.release_if_live();
    }
}
