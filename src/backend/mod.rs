// Backend module for RPN expression evaluation
//
// This module provides the build-once, evaluate-many pipeline:
// - `program`: RPN text → validated, constant-folded stack-machine Program
// - `eval`: CompiledExpression plus the interpretive backends
// - `jit`: Program → native code via Cranelift
// - `build` / `build_with`: pick a backend and assemble a CompiledExpression

pub mod config;
pub mod eval;
pub mod jit;
pub mod literal;
pub mod ops;
pub mod program;
pub mod symbol;

pub use config::{BackendChoice, EngineConfig, JitOptLevel};
pub use eval::{BackendKind, CallTree, CompiledExpression, Interpreter};
pub use jit::{JitCompiler, JitError, JitResult, JitRoutine};
pub use literal::{parse_literal, parse_value};
pub use ops::Op;
pub use program::{BuildError, BuildResult, Operand, Program, ProgramBuilder};
pub use symbol::{ResolveError, SymbolResolver, SymbolTable, ValueLoader, ValueSource};

use std::sync::Arc;

use tracing::{debug, warn};

use config::MAX_TREE_DEPTH;
use eval::Backend;

/// Build an expression with the default configuration
///
/// input example: "z x y + *"
/// calculation interpretation: z * (x + y)
///
/// Tokens that are neither operators nor numeric literals are passed to
/// `resolver`.
pub fn build(expression: &str, resolver: Option<&dyn SymbolResolver>) -> BuildResult<CompiledExpression> {
    build_with(expression, resolver, &EngineConfig::default())
}

/// Build an expression, selecting the backend from `config`
///
/// With [`BackendChoice::Jit`] a compiler is created for this expression
/// alone; use [`build_native`] to share one across many expressions.
pub fn build_with(
    expression: &str,
    resolver: Option<&dyn SymbolResolver>,
    config: &EngineConfig,
) -> BuildResult<CompiledExpression> {
    let program = Arc::new(Program::parse(expression, resolver)?);
    let tokens = expression.split(' ').filter(|t| !t.is_empty()).count();

    let backend = match config.backend {
        BackendChoice::Auto if tokens > config.flat_threshold => flat(&program),
        BackendChoice::Auto => tree_or_flat(&program, false),
        BackendChoice::Interpreter => flat(&program),
        BackendChoice::CallTree => tree_or_flat(&program, true),
        BackendChoice::Jit => Backend::Jit(JitCompiler::new(config)?.compile(&program)?),
    };

    Ok(assemble(expression, program, backend, config.backend, tokens))
}

/// Build an expression as native code using an existing compiler
pub fn build_native(
    expression: &str,
    resolver: Option<&dyn SymbolResolver>,
    compiler: &mut JitCompiler,
) -> BuildResult<CompiledExpression> {
    let program = Arc::new(Program::parse(expression, resolver)?);
    let tokens = expression.split(' ').filter(|t| !t.is_empty()).count();
    let backend = Backend::Jit(compiler.compile(&program)?);
    Ok(assemble(expression, program, backend, BackendChoice::Jit, tokens))
}

fn assemble(
    expression: &str,
    program: Arc<Program>,
    backend: Backend,
    choice: BackendChoice,
    tokens: usize,
) -> CompiledExpression {
    let expr = CompiledExpression::new(expression, program, backend);
    debug!(
        target: "rpnjit::dispatch",
        ?choice,
        backend = %expr.backend(),
        tokens,
        "built expression"
    );
    expr
}

fn flat(program: &Arc<Program>) -> Backend {
    Backend::Flat(Interpreter::new(Arc::clone(program)))
}

/// Call tree unless recursion would go deeper than `MAX_TREE_DEPTH`
fn tree_or_flat(program: &Arc<Program>, forced: bool) -> Backend {
    let tree = CallTree::new(program);
    if tree.depth() <= MAX_TREE_DEPTH {
        return Backend::Tree(tree);
    }
    if forced {
        warn!(
            target: "rpnjit::dispatch",
            depth = tree.depth(),
            limit = MAX_TREE_DEPTH,
            "call tree too deep, using flat interpreter"
        );
    }
    flat(program)
}
