//! Operator vocabulary for RPN programs
//!
//! This module defines the closed set of stack-machine instructions.
//! `Fetch` loads the next operand onto the stack; every other op is a
//! pure binary function of the two topmost stack values.

use std::fmt;

/// Stack-machine operation
///
/// Each op is assigned a unique u8 value. Binary ops pop `rhs` first and
/// `lhs` second, then push `apply(lhs, rhs)`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Push the next operand's current value
    Fetch = 0x00,
    /// lhs + rhs
    Add = 0x01,
    /// lhs - rhs
    Sub = 0x02,
    /// lhs * rhs
    Mul = 0x03,
    /// lhs / rhs
    Div = 0x04,
    /// lhs raised to rhs
    Pow = 0x05,
    /// rhs if lhs > 0, otherwise 0
    If = 0x06,
}

impl Op {
    /// Every binary operation, in declaration order
    pub const BINARY: [Op; 6] = [Op::Add, Op::Sub, Op::Mul, Op::Div, Op::Pow, Op::If];

    /// Parse an operator token.
    ///
    /// Returns `None` when the token is not an operator and should be
    /// treated as a value. `Fetch` is never produced from text.
    #[inline]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            "^" => Some(Op::Pow),
            "if" => Some(Op::If),
            _ => None,
        }
    }

    /// Canonical textual form
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Fetch => "#",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "^",
            Op::If => "if",
        }
    }

    /// Check if this op consumes two stack values
    #[inline]
    pub fn is_binary(self) -> bool {
        !matches!(self, Op::Fetch)
    }

    /// Check if this op lowers to a single scalar SSE instruction
    #[inline]
    pub fn is_native(self) -> bool {
        matches!(self, Op::Fetch | Op::Add | Op::Sub | Op::Mul | Op::Div)
    }

    /// Apply a binary op.
    ///
    /// Arithmetic follows IEEE-754: overflow and 0/0 produce infinities
    /// and NaN rather than errors. The conditional yields 0 on its false
    /// branch, and every backend must agree with this function bit for bit.
    ///
    /// # Panics
    ///
    /// Panics when called on `Op::Fetch`, which has no operands.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Op::Add => lhs + rhs,
            Op::Sub => lhs - rhs,
            Op::Mul => lhs * rhs,
            Op::Div => lhs / rhs,
            Op::Pow => lhs.powf(rhs),
            Op::If => {
                if lhs > 0.0 {
                    rhs
                } else {
                    0.0
                }
            }
            Op::Fetch => panic!("do not know how to apply op: {}", self),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
