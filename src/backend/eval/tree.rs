//! Call-tree evaluator
//!
//! The program is rebuilt into an expression tree whose nodes live in a
//! single arena. Evaluation recurses from the root, left subtree first, so
//! dynamic values are read in the same order as by the flat interpreter.

use crate::backend::ops::Op;
use crate::backend::program::Program;
use crate::backend::symbol::ValueSource;

#[derive(Debug, Clone)]
enum Node {
    Leaf(ValueSource),
    Apply { op: Op, lhs: usize, rhs: usize },
}

/// Expression tree evaluated by recursion
#[derive(Debug, Clone)]
pub struct CallTree {
    nodes: Vec<Node>,
    root: usize,
    depth: usize,
}

impl CallTree {
    /// Build the tree for a validated program
    pub fn new(program: &Program) -> Self {
        let mut nodes = Vec::with_capacity(program.ops().len());
        // (node index, subtree depth)
        let mut stack: Vec<(usize, usize)> = Vec::with_capacity(program.max_depth());
        let mut operands = program.operands().iter();

        for &op in program.ops() {
            let (node, depth) = match op {
                Op::Fetch => {
                    let operand = operands.next().expect("program has one operand per fetch");
                    (Node::Leaf(operand.source.clone()), 1)
                }
                op => {
                    let (rhs, rhs_depth) = stack.pop().expect("program is stack balanced");
                    let (lhs, lhs_depth) = stack.pop().expect("program is stack balanced");
                    (Node::Apply { op, lhs, rhs }, lhs_depth.max(rhs_depth) + 1)
                }
            };
            nodes.push(node);
            stack.push((nodes.len() - 1, depth));
        }

        let (root, depth) = stack.pop().expect("program leaves one value");
        debug_assert!(stack.is_empty(), "program leaves exactly one value");
        Self { nodes, root, depth }
    }

    /// Height of the tree; a single leaf has depth 1
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Evaluate from the root
    #[inline]
    pub fn eval(&self) -> f64 {
        self.eval_node(self.root)
    }

    fn eval_node(&self, idx: usize) -> f64 {
        match &self.nodes[idx] {
            Node::Leaf(source) => source.load(),
            Node::Apply { op, lhs, rhs } => {
                let lhs = self.eval_node(*lhs);
                let rhs = self.eval_node(*rhs);
                op.apply(lhs, rhs)
            }
        }
    }
}
