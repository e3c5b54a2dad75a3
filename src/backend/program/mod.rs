//! Linear stack-machine programs
//!
//! A [`Program`] is the single intermediate representation shared by every
//! evaluation backend. It is an ordered list of [`Op`]s plus an ordered list
//! of [`Operand`]s; each `Fetch` consumes the next operand in order.
//!
//! ```text
//! "z x y + *"   =>   ops:      # # # + *
//!                    operands: z x y
//! ```
//!
//! Programs are built once by the [`ProgramBuilder`], which validates stack
//! balance and folds operations over constants, and are immutable afterwards.
//!
//! # Modules
//!
//! - `builder`: token stream to Program, with constant folding
//! - `error`: [`BuildError`] and [`BuildResult`]

mod builder;
mod error;


pub use builder::ProgramBuilder;
pub use error::{BuildError, BuildResult};

use std::fmt;

use super::ops::Op;
use super::symbol::{SymbolResolver, ValueSource};

/// A value slot of a program
#[derive(Debug, Clone)]
pub struct Operand {
    /// Source token, or the rendered value of a folded constant
    pub name: String,
    pub source: ValueSource,
}

impl Operand {
    pub fn new(name: impl Into<String>, source: ValueSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.source.is_constant()
    }
}

/// An immutable, validated stack-machine program
#[derive(Debug, Clone)]
pub struct Program {
    ops: Vec<Op>,
    operands: Vec<Operand>,
    max_depth: usize,
    folded: usize,
}

impl Program {
    /// Parse an RPN expression into a program
    ///
    /// Shorthand for [`ProgramBuilder::build`].
    pub fn parse(expression: &str, resolver: Option<&dyn SymbolResolver>) -> BuildResult<Self> {
        ProgramBuilder::build(expression, resolver)
    }

    /// Assemble a program from builder output.
    ///
    /// The caller guarantees stack balance; the maximum depth is derived here.
    pub(crate) fn from_parts(ops: Vec<Op>, operands: Vec<Operand>, folded: usize) -> Self {
        let max_depth = max_stack_depth(&ops);
        debug_assert_eq!(
            ops.iter().filter(|op| **op == Op::Fetch).count(),
            operands.len(),
            "every fetch needs exactly one operand"
        );
        Self {
            ops,
            operands,
            max_depth,
            folded,
        }
    }

    /// The instruction sequence
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Operand slots in fetch order
    #[inline]
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Maximum number of values simultaneously on the stack
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of operations removed by constant folding
    #[inline]
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Indices of operands that must be re-read on every evaluation
    pub fn dynamic_slots(&self) -> Vec<usize> {
        self.operands
            .iter()
            .enumerate()
            .filter(|(_, operand)| !operand.is_constant())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Check if the program uses `op`
    pub fn contains(&self, op: Op) -> bool {
        self.ops.contains(&op)
    }

    /// The folded value if the whole program is a single constant
    pub fn as_constant(&self) -> Option<f64> {
        match (self.ops.as_slice(), self.operands.as_slice()) {
            ([Op::Fetch], [operand]) => operand.source.as_constant(),
            _ => None,
        }
    }

    /// Render as fully parenthesized infix
    ///
    /// `"z x y + *"` renders as `(z * (x + y))`; the conditional renders as
    /// `(if c>0 then v)`.
    pub fn to_infix(&self) -> String {
        let mut stack: Vec<String> = Vec::with_capacity(self.max_depth);
        let mut operands = self.operands.iter();
        for op in &self.ops {
            match op {
                Op::Fetch => {
                    if let Some(operand) = operands.next() {
                        stack.push(operand.name.clone());
                    }
                }
                Op::If => {
                    let rhs = stack.pop().unwrap_or_default();
                    let lhs = stack.pop().unwrap_or_default();
                    stack.push(format!("(if {}>0 then {})", lhs, rhs));
                }
                op => {
                    let rhs = stack.pop().unwrap_or_default();
                    let lhs = stack.pop().unwrap_or_default();
                    stack.push(format!("({} {} {})", lhs, op, rhs));
                }
            }
        }
        stack.pop().unwrap_or_default()
    }
}

/// Canonical RPN form after folding
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operands = self.operands.iter();
        for (idx, op) in self.ops.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            match op {
                Op::Fetch => {
                    if let Some(operand) = operands.next() {
                        f.write_str(&operand.name)?;
                    }
                }
                op => write!(f, "{}", op)?,
            }
        }
        Ok(())
    }
}

/// Simulate the stack over `ops` and return the deepest point reached
fn max_stack_depth(ops: &[Op]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for op in ops {
        if *op == Op::Fetch {
            depth += 1;
            max = max.max(depth);
        } else {
            depth = depth.saturating_sub(1);
        }
    }
    max
}
