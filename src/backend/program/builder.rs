//! RPN token stream to [`Program`] translation with constant folding.
//!
//! Every value token is emitted as a `Fetch` right away. The construction
//! stack mirrors the runtime stack and remembers which entries are
//! constants. When an operator meets two constant entries, their fetches
//! are necessarily the last two instructions emitted (anything emitted later
//! would still sit above them on the stack), so both are retracted and
//! replaced by a single fetch of the folded value.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::error::{BuildError, BuildResult};
use super::{Operand, Program};
use crate::backend::literal::parse_value;
use crate::backend::ops::Op;
use crate::backend::symbol::{SymbolResolver, ValueSource};

/// Incremental program builder
pub struct ProgramBuilder<'r> {
    resolver: Option<&'r dyn SymbolResolver>,
    ops: Vec<Op>,
    operands: Vec<Operand>,
    /// Construction stack: `Some(v)` for a foldable constant entry
    pending: SmallVec<[Option<f64>; 16]>,
    /// Number of tokens consumed so far
    position: usize,
    folded: usize,
}

impl<'r> ProgramBuilder<'r> {
    /// Create an empty builder
    pub fn new(resolver: Option<&'r dyn SymbolResolver>) -> Self {
        Self {
            resolver,
            ops: Vec::new(),
            operands: Vec::new(),
            pending: SmallVec::new(),
            position: 0,
            folded: 0,
        }
    }

    /// Build a program from a space-separated RPN expression
    ///
    /// input example: "z x y + *"
    /// calculation interpretation: z * (x + y)
    pub fn build(expression: &str, resolver: Option<&'r dyn SymbolResolver>) -> BuildResult<Program> {
        let mut builder = Self::new(resolver);
        for token in expression.split(' ').filter(|t| !t.is_empty()) {
            builder.push_token(token)?;
        }
        builder.finish()
    }

    /// Consume one token
    pub fn push_token(&mut self, token: &str) -> BuildResult<()> {
        match Op::parse(token) {
            Some(op) => self.push_op(op, token)?,
            None => self.push_value(token)?,
        }
        self.position += 1;
        Ok(())
    }

    fn push_value(&mut self, token: &str) -> BuildResult<()> {
        let source = parse_value(token, self.resolver)?;
        self.pending.push(source.as_constant());
        self.ops.push(Op::Fetch);
        self.operands.push(Operand::new(token, source));
        Ok(())
    }

    fn push_op(&mut self, op: Op, token: &str) -> BuildResult<()> {
        let available = self.pending.len();
        if available < 2 {
            return Err(BuildError::MalformedExpression {
                position: self.position,
                token: token.to_string(),
                available,
            });
        }

        let rhs = self.pending.pop().flatten();
        let lhs = self.pending.pop().flatten();

        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => self.fold(op, lhs, rhs),
            _ => {
                self.ops.push(op);
                self.pending.push(None);
            }
        }
        Ok(())
    }

    /// Replace the two trailing constant fetches with their folded value
    fn fold(&mut self, op: Op, lhs: f64, rhs: f64) {
        debug_assert!(
            self.ops.ends_with(&[Op::Fetch, Op::Fetch]),
            "constant entries must be the last two fetches"
        );
        self.ops.truncate(self.ops.len() - 2);
        self.operands.truncate(self.operands.len() - 2);

        let value = op.apply(lhs, rhs);
        trace!(target: "rpnjit::program", %op, lhs, rhs, value, "folded constant operation");

        self.ops.push(Op::Fetch);
        self.operands.push(Operand::new(value.to_string(), ValueSource::Constant(value)));
        self.pending.push(Some(value));
        self.folded += 1;
    }

    /// Validate the final stack and produce the program
    pub fn finish(self) -> BuildResult<Program> {
        match self.pending.len() {
            0 => return Err(BuildError::EmptyExpression),
            1 => {}
            remaining => return Err(BuildError::UnbalancedExpression { remaining }),
        }

        let program = Program::from_parts(self.ops, self.operands, self.folded);
        debug!(
            target: "rpnjit::program",
            ops = program.ops().len(),
            operands = program.operands().len(),
            folded = program.folded(),
            max_depth = program.max_depth(),
            "built program"
        );
        Ok(program)
    }
}
