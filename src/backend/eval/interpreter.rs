//! Flat stack interpreter

use std::sync::Arc;

use crate::backend::ops::Op;
use crate::backend::program::Program;

/// Stack machine executing a [`Program`] op by op
///
/// The value stack is allocated once, sized to the program's maximum depth,
/// and reused across runs.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: Arc<Program>,
    stack: Box<[f64]>,
}

impl Interpreter {
    pub fn new(program: Arc<Program>) -> Self {
        let stack = vec![0.0; program.max_depth()].into_boxed_slice();
        Self { program, stack }
    }

    /// Execute the program once and return the final stack value
    pub fn run(&mut self) -> f64 {
        let operands = self.program.operands();
        let stack = &mut self.stack;
        let mut sp = 0usize;
        let mut cursor = 0usize;

        for &op in self.program.ops() {
            match op {
                Op::Fetch => {
                    stack[sp] = operands[cursor].source.load();
                    cursor += 1;
                    sp += 1;
                }
                op => {
                    sp -= 1;
                    let rhs = stack[sp];
                    let lhs = stack[sp - 1];
                    stack[sp - 1] = op.apply(lhs, rhs);
                }
            }
        }

        debug_assert_eq!(sp, 1, "validated program must leave one value");
        stack[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::symbol::SymbolTable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn run(expr: &str, table: &SymbolTable) -> f64 {
        let program = Arc::new(Program::parse(expr, Some(table)).unwrap());
        Interpreter::new(program).run()
    }

    fn table() -> SymbolTable {
        let mut table = SymbolTable::new();
        table.insert_fn("x0", || 2.0);
        table.insert_fn("x1", || 3.0);
        table.insert_fn("z", || 1.0);
        table
    }

    #[test]
    fn test_operand_order() {
        let table = table();
        assert_eq!(run("x1 x0 -", &table), 1.0);
        assert_eq!(run("x1 x0 /", &table), 1.5);
        assert_eq!(run("x0 x1 ^", &table), 8.0);
    }

    #[test]
    fn test_nested() {
        let table = table();
        // 4 * (2 + 3)
        assert_eq!(run("4 x0 x1 + *", &table), 20.0);
        assert_eq!(run("x0 x1 + x0 x1 * -", &table), -1.0);
    }

    #[test]
    fn test_conditional() {
        let table = table();
        assert_eq!(run("z x1 if", &table), 3.0);
        assert_eq!(run("z z - x1 if", &table), 0.0);
    }

    #[test]
    fn test_ieee_results() {
        let table = table();
        assert_eq!(run("z z z - /", &table), f64::INFINITY);
        assert!(run("z z - z z - /", &table).is_nan());
    }

    #[test]
    fn test_fetch_reads_every_occurrence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut table = SymbolTable::new();
        table.insert_fn("x", move || {
            counter.fetch_add(1, Ordering::Relaxed);
            1.0
        });

        let program = Arc::new(Program::parse("x x + x *", Some(&table)).unwrap());
        let mut interpreter = Interpreter::new(program);
        assert_eq!(interpreter.run(), 2.0);
        assert_eq!(interpreter.run(), 2.0);
        assert_eq!(calls.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_single_constant() {
        let program = Arc::new(Program::parse("0x1 0 1 + +", None).unwrap());
        assert_eq!(Interpreter::new(program).run(), 2.0);
    }
}
