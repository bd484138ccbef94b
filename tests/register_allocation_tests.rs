mod common;

use common::*;
use jmmc::ast::builder::*;
use jmmc::ast::{BinaryOp, Program};
use jmmc::optimize::liveness;
use jmmc::optimize::register_alloc::build_interference;
use jmmc::diagnostics::has_errors;
use jmmc::{Config, Severity, Stage};

fn chained_locals() -> Program {
    class_with(vec![MethodBuilder::new("f", ty("int"))
        .local(ty("int"), "a")
        .local(ty("int"), "b")
        .body(vec![assign("a", int(1)), assign("b", binary(BinaryOp::Add, ident("a"), int(2))), ret(ident("b"))])])
}

fn budget(slots: usize) -> Config {
    Config::new().with_register_budget(Some(slots))
}

#[test]
fn overlapping_locals_get_distinct_registers() {
    let compilation = compile_ok(chained_locals(), &budget(0));
    let f = compilation.ir.method("f").unwrap();
    let (a, b) = (f.var_table["a"].register, f.var_table["b"].register);
    assert_ne!(a, b);
    assert!(a >= 1 && b >= 1, "slot 0 belongs to this");
    assert!(compilation.diagnostics.is_empty());
}

#[test]
fn dead_variables_free_their_slot() {
    let method = MethodBuilder::new("g", ty("int")).local(ty("int"), "a").local(ty("int"), "b").body(vec![
        assign("a", int(1)),
        assign("a", binary(BinaryOp::Add, ident("a"), int(1))),
        assign("b", int(2)),
        ret(ident("b")),
    ]);
    let compilation = compile_ok(class_with(vec![method]), &budget(0));
    let g = compilation.ir.method("g").unwrap();
    assert_eq!(g.var_table["a"].register, g.var_table["b"].register);
    assert!(method_lines(&compilation.assembly, "g").contains(&".limit locals 2"));
}

#[test]
fn interfering_variables_never_share_a_register() {
    let method = MethodBuilder::new("mix", ty("int"))
        .param(ty("int"), "n")
        .local(ty("int"), "i")
        .local(ty("int"), "acc")
        .local(ty("int"), "tmp")
        .body(vec![
            assign("i", int(0)),
            assign("acc", int(0)),
            while_loop(
                binary(BinaryOp::Lt, ident("i"), ident("n")),
                vec![
                    assign("tmp", binary(BinaryOp::Mul, ident("i"), ident("i"))),
                    assign("acc", binary(BinaryOp::Add, ident("acc"), ident("tmp"))),
                    assign("i", binary(BinaryOp::Add, ident("i"), int(1))),
                ],
            ),
            ret(ident("acc")),
        ]);
    let compilation = compile_ok(class_with(vec![method]), &budget(0));
    for method in &compilation.ir.methods {
        let graph = build_interference(method, &liveness::analyze(method).unwrap());
        for (a, b) in graph.edges() {
            assert_ne!(method.var_table[a].register, method.var_table[b].register, "{} and {} in {}", a, b, method.name);
        }
    }
    let mix = compilation.ir.method("mix").unwrap();
    assert_eq!(mix.var_table["n"].register, 1);
    assert_ne!(mix.var_table["i"].register, mix.var_table["acc"].register);
}

#[test]
fn exceeding_the_budget_is_reported_but_compiles() {
    let compilation = compile_ok(chained_locals(), &budget(2));
    assert_eq!(compilation.diagnostics.len(), 1);
    let diagnostic = &compilation.diagnostics[0];
    assert_eq!((diagnostic.severity, diagnostic.stage), (Severity::Warning, Stage::Optimization));
    assert!(!has_errors(&compilation.diagnostics));
    assert_eq!(diagnostic.message, "method 'f' needs at least 3 registers but the budget is 2");

    let f = compilation.ir.method("f").unwrap();
    assert_ne!(f.var_table["a"].register, f.var_table["b"].register);
    assert!(method_lines(&compilation.assembly, "f").contains(&".limit locals 3"));
}

#[test]
fn without_a_budget_every_variable_keeps_its_own_slot() {
    let compilation = compile_ok(chained_locals(), &Config::default());
    let f = compilation.ir.method("f").unwrap();
    assert_eq!((f.var_table["a"].register, f.var_table["b"].register), (1, 2));
}
