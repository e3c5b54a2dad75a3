//! Property tests: every backend agrees with the flat interpreter
//!
//! Two generators are used: shuffled token soups in the spirit of fuzzing
//! (mostly malformed, so error paths are compared too) and well-formed
//! expression trees rendered to RPN.

mod common;

use common::{interpretive_configs, jit_config, same_result, DummyResolver};
use proptest::prelude::*;
use rpnjit::backend::{build_with, BuildResult, CompiledExpression, EngineConfig};

const VALUES: &[&str] = &["x0", "x1", "y", "z", "0", "1", "-1", "0.5", "1e2"];
const OPS: &[&str] = &["+", "-", "*", "/", "^", "if"];
const NATIVE_OPS: &[&str] = &["+", "-", "*", "/"];

fn token_soup() -> impl Strategy<Value = String> {
    (
        prop::sample::select(VALUES),
        prop::collection::vec((prop::sample::select(OPS), prop::sample::select(VALUES)), 0..10),
    )
        .prop_map(|(first, pairs)| {
            let mut tokens = vec!["", first];
            for (op, value) in pairs {
                tokens.push(op);
                tokens.push(value);
            }
            tokens
        })
        .prop_shuffle()
        .prop_map(|tokens| tokens.join(" "))
}

fn expression_tree(ops: &'static [&'static str]) -> impl Strategy<Value = String> {
    let leaf = prop::sample::select(VALUES).prop_map(str::to_string);
    leaf.prop_recursive(5, 32, 2, move |inner| {
        (inner.clone(), inner, prop::sample::select(ops))
            .prop_map(|(lhs, rhs, op)| format!("{} {} {}", lhs, rhs, op))
    })
}

fn build_reference(expr: &str) -> BuildResult<CompiledExpression> {
    build_with(expr, Some(&DummyResolver), &EngineConfig::interpreter_only())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn shuffled_tokens_agree_across_backends(expr in token_soup()) {
        match build_reference(&expr) {
            Ok(mut reference) => {
                let expected = reference.eval();
                for (name, config) in interpretive_configs() {
                    let mut compiled = build_with(&expr, Some(&DummyResolver), &config).unwrap();
                    let value = compiled.eval();
                    prop_assert!(same_result(expected, value), "'{}' {}: {} vs {}", expr, name, value, expected);
                }
            }
            Err(expected) => {
                for (name, config) in interpretive_configs() {
                    let err = build_with(&expr, Some(&DummyResolver), &config).unwrap_err();
                    prop_assert_eq!(&err, &expected, "'{}' {}", expr, name);
                }
            }
        }
    }

    #[test]
    fn expression_trees_agree_across_backends(expr in expression_tree(OPS)) {
        let expected = build_reference(&expr).unwrap().eval();
        for (name, config) in interpretive_configs() {
            let value = build_with(&expr, Some(&DummyResolver), &config).unwrap().eval();
            prop_assert!(same_result(expected, value), "'{}' {}: {} vs {}", expr, name, value, expected);
        }
    }

    #[test]
    fn canonical_form_evaluates_the_same(expr in expression_tree(OPS)) {
        let mut original = build_reference(&expr).unwrap();
        let canonical = original.program().to_string();
        let mut reparsed = build_reference(&canonical).unwrap();
        prop_assert_eq!(reparsed.program().to_string(), canonical);
        prop_assert!(same_result(original.eval(), reparsed.eval()));
    }

    #[cfg(feature = "jit")]
    #[test]
    fn native_code_agrees_with_interpreter(expr in expression_tree(NATIVE_OPS)) {
        let expected = build_reference(&expr).unwrap().eval();
        let value = build_with(&expr, Some(&DummyResolver), &jit_config()).unwrap().eval();
        prop_assert!(same_result(expected, value), "'{}': {} vs {}", expr, value, expected);
    }
}
