/// rpnjit - RPN Expression Evaluator CLI
use clap::Parser;
use rpnjit::backend::{build_with, parse_literal, BackendChoice, EngineConfig, SymbolTable, ValueSource};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rpnjit",
    about = "Build and evaluate Reverse Polish Notation expressions",
    version
)]
struct Cli {
    /// Expression, e.g. "y x0 x1 + *"
    #[arg(value_name = "EXPRESSION")]
    expression: String,

    /// Bind a symbol to a constant (repeatable), e.g. --var x=0x10
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    vars: Vec<(String, f64)>,

    /// Evaluation backend: auto, interpreter, tree or jit
    #[arg(long, default_value = "auto", value_parser = parse_backend)]
    backend: BackendChoice,

    /// Evaluate this many times
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// Cache the first result
    #[arg(long)]
    memoize: bool,

    /// Print the folded program before evaluating
    #[arg(long)]
    show_program: bool,

    /// Token count above which `auto` uses the flat interpreter
    #[arg(long)]
    flat_threshold: Option<usize>,
}

fn parse_binding(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))?;
    if name.is_empty() {
        return Err(format!("missing symbol name in '{}'", arg));
    }
    let value = parse_literal(value).ok_or_else(|| format!("'{}' is not a numeric literal", value))?;
    Ok((name.to_string(), value))
}

fn parse_backend(arg: &str) -> Result<BackendChoice, String> {
    BackendChoice::from_name(arg)
        .ok_or_else(|| format!("unknown backend '{}' (expected auto, interpreter, tree or jit)", arg))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut symbols = SymbolTable::new();
    for (name, value) in &cli.vars {
        symbols.insert(name.clone(), ValueSource::constant(*value));
    }

    let mut config = EngineConfig::default().with_backend(cli.backend);
    if let Some(threshold) = cli.flat_threshold {
        config = config.with_flat_threshold(threshold);
    }

    let mut expr = match build_with(&cli.expression, Some(&symbols), &config) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.show_program {
        eprintln!("[Program] {} ({})", expr.program(), expr.backend());
        eprintln!("[Infix]   {}", expr.program().to_infix());
    }

    expr.set_memoization(cli.memoize);
    let mut result = f64::NAN;
    for _ in 0..cli.repeat.max(1) {
        result = expr.eval();
    }
    println!("{}", result);
}
