//! Cranelift IR generation for stack-machine ops
//!
//! Generated functions walk two pointers: the input cursor over the operand
//! array and the stack cursor over the scratch stack. Both are plain SSA
//! values re-bound after every step, since the code is a single block.

use cranelift::prelude::*;

use super::error::{JitError, JitResult};
use crate::backend::ops::Op;

const SLOT: i64 = std::mem::size_of::<f64>() as i64;

/// Code generation context wrapping a Cranelift FunctionBuilder
pub(crate) struct CodegenContext<'a, 'b> {
    builder: &'a mut FunctionBuilder<'b>,

    /// Next operand to fetch
    input: Value,

    /// First free stack slot
    stack: Value,

    flags: MemFlags,
}

impl<'a, 'b> CodegenContext<'a, 'b> {
    pub fn new(builder: &'a mut FunctionBuilder<'b>, input: Value, stack: Value) -> Self {
        CodegenContext {
            builder,
            input,
            stack,
            flags: MemFlags::trusted(),
        }
    }

    /// Emit one op
    pub fn emit(&mut self, op: Op) -> JitResult<()> {
        match op {
            Op::Fetch => {
                self.fetch();
                Ok(())
            }
            op => self.binary(op),
        }
    }

    /// Copy the next operand onto the stack
    fn fetch(&mut self) {
        let value = self.builder.ins().load(types::F64, self.flags, self.input, 0);
        self.input = self.builder.ins().iadd_imm(self.input, SLOT);
        self.push(value);
    }

    /// Pop rhs and lhs, apply a scalar double instruction, push the result
    fn binary(&mut self, op: Op) -> JitResult<()> {
        let rhs = self.pop();
        let lhs = self.pop();
        let ins = self.builder.ins();
        let result = match op {
            Op::Add => ins.fadd(lhs, rhs),
            Op::Sub => ins.fsub(lhs, rhs),
            Op::Mul => ins.fmul(lhs, rhs),
            Op::Div => ins.fdiv(lhs, rhs),
            op => return Err(JitError::UnsupportedOperator(op)),
        };
        self.push(result);
        Ok(())
    }

    fn push(&mut self, value: Value) {
        self.builder.ins().store(self.flags, value, self.stack, 0);
        self.stack = self.builder.ins().iadd_imm(self.stack, SLOT);
    }

    fn pop(&mut self) -> Value {
        self.stack = self.builder.ins().iadd_imm(self.stack, -SLOT);
        self.builder.ins().load(types::F64, self.flags, self.stack, 0)
    }

    /// Return the single value left on the stack
    pub fn finish(self) {
        let result = self.builder.ins().load(types::F64, self.flags, self.stack, -(SLOT as i32));
        self.builder.ins().return_(&[result]);
    }
}
