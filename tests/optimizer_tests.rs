mod common;

use common::*;
use jmmc::ast::builder::*;
use jmmc::ast::{BinaryOp, Program};
use jmmc::optimize::{fold_and_propagate, normalize_varargs, optimize_ast};
use jmmc::Config;

/// Printed body of method `name` after the configured AST passes
fn optimized_body(program: Program, config: &Config, name: &str) -> Vec<String> {
    let (table, diagnostics) = jmmc::check(&program).unwrap();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    let program = optimize_ast(program, &table, config);
    let class = program.class.unwrap();
    class.method(name).unwrap().body.iter().map(|s| s.to_string()).collect()
}

fn constant_sum() -> Program {
    class_with(vec![MethodBuilder::new("f", ty("int"))
        .local(ty("int"), "x")
        .body(vec![assign("x", binary(BinaryOp::Add, int(2), int(3))), ret(ident("x"))])])
}

fn counting_loop() -> Program {
    class_with(vec![MethodBuilder::new("count", ty("int")).local(ty("int"), "i").body(vec![
        assign("i", int(0)),
        while_loop(binary(BinaryOp::Lt, ident("i"), int(10)), vec![assign("i", binary(BinaryOp::Add, ident("i"), int(1)))]),
        ret(ident("i")),
    ])])
}

fn varargs_caller() -> Program {
    class_with(vec![
        MethodBuilder::new("foo", ty("int")).param(varargs_ty("int"), "xs").body(vec![ret(length(ident("xs")))]),
        MethodBuilder::new("bar", ty("void")).body(vec![expr_stmt(call_local("foo", vec![int(1), int(2), int(3)]))]),
    ])
}

#[test]
fn constants_fold_into_the_return() {
    let body = optimized_body(constant_sum(), &Config::new().with_optimize(true), "f");
    assert_eq!(body, vec!["x = 5;", "return 5;"]);
}

#[test]
fn without_optimize_the_tree_is_untouched() {
    let body = optimized_body(constant_sum(), &Config::default(), "f");
    assert_eq!(body, vec!["x = 2 + 3;", "return x;"]);
}

#[test]
fn loop_counters_are_not_propagated() {
    let body = optimized_body(counting_loop(), &Config::new().with_optimize(true), "count");
    assert_eq!(body, vec!["i = 0;", "while (i < 10) { i = i + 1; }", "return i;"]);
}

#[test]
fn constants_reach_a_loop_body_that_leaves_them_alone() {
    let program = class_with(vec![MethodBuilder::new("spin", ty("void"))
        .param(ty("boolean"), "c")
        .local(ty("int"), "x")
        .local(ty("int"), "y")
        .body(vec![assign("x", int(3)), while_loop(ident("c"), vec![assign("y", ident("x"))])])]);
    let body = optimized_body(program, &Config::new().with_optimize(true), "spin");
    assert_eq!(body, vec!["x = 3;", "while (c) { y = 3; }"]);
}

#[test]
fn constants_survive_a_branch_that_assigns_something_else() {
    let program = class_with(vec![MethodBuilder::new("f", ty("int"))
        .param(ty("boolean"), "c")
        .local(ty("int"), "x")
        .local(ty("int"), "y")
        .body(vec![assign("x", int(3)), if_then(ident("c"), vec![assign("y", int(1))]), ret(ident("x"))])]);
    let body = optimized_body(program, &Config::new().with_optimize(true), "f");
    assert_eq!(body, vec!["x = 3;", "if (c) { y = 1; }", "return 3;"]);
}

#[test]
fn folding_and_propagation_are_idempotent() {
    for program in [constant_sum(), counting_loop()] {
        let (table, _) = jmmc::check(&program).unwrap();
        let once = fold_and_propagate(program, &table);
        let twice = fold_and_propagate(once.clone(), &table);
        assert_eq!(once, twice);
    }
}

#[test]
fn boolean_conditions_fold() {
    let program = class_with(vec![MethodBuilder::new("f", ty("boolean")).body(vec![ret(not(paren(binary(
        BinaryOp::Lt,
        int(1),
        int(2),
    ))))])]);
    let body = optimized_body(program, &Config::new().with_optimize(true), "f");
    assert_eq!(body, vec!["return false;"]);
}

#[test]
fn division_by_zero_is_left_for_run_time() {
    let program = class_with(vec![MethodBuilder::new("f", ty("int"))
        .body(vec![ret(binary(BinaryOp::Div, int(1), int(0)))])]);
    let body = optimized_body(program, &Config::new().with_optimize(true), "f");
    assert_eq!(body, vec!["return 1 / 0;"]);
}

#[test]
fn trailing_varargs_are_packed_into_an_array() {
    let body = optimized_body(varargs_caller(), &Config::default(), "bar");
    assert_eq!(body, vec!["foo([1, 2, 3]);"]);
}

#[test]
fn varargs_normalization_is_idempotent() {
    let program = varargs_caller();
    let (table, _) = jmmc::check(&program).unwrap();
    let once = normalize_varargs(program, &table);
    let twice = normalize_varargs(once.clone(), &table);
    assert_eq!(once, twice);
}
