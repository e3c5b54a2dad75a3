//! Program-to-Cranelift JIT compiler
//!
//! The compilation process:
//!
//! 1. Reject programs containing ops without a native lowering
//! 2. Open a fresh JIT module, owned by a [`CodeRegion`] guard
//! 3. Build Cranelift IR for `fn(values: *const f64, stack: *mut f64) -> f64`
//! 4. Define the function, check its size, finalize
//! 5. Hand region, entry point and buffers to a [`JitRoutine`]

use cranelift::codegen::isa::OwnedTargetIsa;
use cranelift::prelude::*;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{Linkage, Module};
use tracing::{debug, trace};

use super::codegen::CodegenContext;
use super::error::{JitError, JitResult};
use super::region::CodeRegion;
use super::routine::{EntryFn, JitRoutine};
use crate::backend::config::EngineConfig;
use crate::backend::ops::Op;
use crate::backend::program::Program;

/// JIT compiler for programs
///
/// Holds the host ISA. Every compiled routine gets its own module so that
/// its executable memory can be released independently.
pub struct JitCompiler {
    isa: OwnedTargetIsa,

    /// Maximum machine code size per routine
    code_limit: usize,

    /// Counter for generating unique function names
    func_counter: u64,
}

impl JitCompiler {
    /// Create a compiler for the host ISA
    pub fn new(config: &EngineConfig) -> JitResult<Self> {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("opt_level", config.jit_opt_level.as_str())
            .map_err(|e| JitError::CompilationError(format!("Failed to set opt_level: {}", e)))?;

        let isa_builder = cranelift_native::builder().map_err(|e| {
            JitError::CompilationError(format!("Failed to create ISA builder: {}", e))
        })?;

        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| JitError::CompilationError(format!("Failed to create ISA: {}", e)))?;

        // One page of the host: the smallest block of executable memory
        let code_limit = config
            .jit_code_limit
            .unwrap_or(1 << isa.page_size_align_log2());

        Ok(Self {
            isa,
            code_limit,
            func_counter: 0,
        })
    }

    /// Maximum machine code size accepted per routine
    pub fn code_limit(&self) -> usize {
        self.code_limit
    }

    /// Check if every op of `program` has a native lowering
    pub fn can_compile(program: &Program) -> bool {
        Self::unsupported_op(program).is_none()
    }

    fn unsupported_op(program: &Program) -> Option<Op> {
        program.ops().iter().copied().find(|op| !op.is_native())
    }

    /// Compile a program to native code
    pub fn compile(&mut self, program: &Program) -> JitResult<JitRoutine> {
        if let Some(op) = Self::unsupported_op(program) {
            return Err(JitError::UnsupportedOperator(op));
        }

        let func_name = format!("rpn_expr_{}", self.func_counter);
        self.func_counter += 1;

        let builder = JITBuilder::with_isa(self.isa.clone(), cranelift_module::default_libcall_names());
        let mut region = CodeRegion::new(JITModule::new(builder));
        let module = region.module_mut();

        // fn(values: *const f64, stack: *mut f64) -> f64
        let ptr_ty = module.target_config().pointer_type();
        let mut sig = module.make_signature();
        sig.params.push(AbiParam::new(ptr_ty));
        sig.params.push(AbiParam::new(ptr_ty));
        sig.returns.push(AbiParam::new(types::F64));

        let func_id = module
            .declare_function(&func_name, Linkage::Local, &sig)
            .map_err(|e| JitError::CompilationError(format!("Failed to declare function: {}", e)))?;

        let mut ctx = module.make_context();
        ctx.func.signature = sig;

        let mut fb_ctx = FunctionBuilderContext::new();
        {
            let mut builder = FunctionBuilder::new(&mut ctx.func, &mut fb_ctx);
            let entry = builder.create_block();
            builder.append_block_params_for_function_params(entry);
            builder.switch_to_block(entry);
            builder.seal_block(entry);

            let input = builder.block_params(entry)[0];
            let stack = builder.block_params(entry)[1];

            let mut codegen = CodegenContext::new(&mut builder, input, stack);
            for &op in program.ops() {
                codegen.emit(op)?;
            }
            codegen.finish();
            builder.finalize();
        }

        trace!(target: "rpnjit::jit", ir = %ctx.func.display(), "generated IR");

        module
            .define_function(func_id, &mut ctx)
            .map_err(|e| JitError::CompilationError(format!("Failed to define function: {}", e)))?;

        let size = ctx
            .compiled_code()
            .map(|code| code.code_buffer().len())
            .unwrap_or(0);
        module.clear_context(&mut ctx);

        if size > self.code_limit {
            debug!(target: "rpnjit::jit", size, limit = self.code_limit, "generated code too large");
            return Err(JitError::CodeSizeExceeded {
                size,
                limit: self.code_limit,
            });
        }

        module.finalize_definitions().map_err(|e| {
            JitError::CompilationError(format!("Failed to finalize definitions: {}", e))
        })?;

        let code = module.get_finalized_function(func_id);
        // SAFETY: the function was declared with exactly this signature using
        // the host default calling convention.
        let entry = unsafe { std::mem::transmute::<*const u8, EntryFn>(code) };

        debug!(
            target: "rpnjit::jit",
            function = %func_name,
            size,
            ops = program.ops().len(),
            "compiled program to native code"
        );
        Ok(JitRoutine::new(region, entry, size, program))
    }
}
