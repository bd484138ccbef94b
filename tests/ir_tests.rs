mod common;

use common::*;
use jmmc::ast::builder::*;
use jmmc::ast::{BinaryOp, Program};
use jmmc::ir::{IrProgram, VarScope};
use jmmc::Config;

fn lower(program: Program) -> IrProgram {
    init_logging();
    let (ir, diagnostics) = jmmc::compile_to_ir(program, &Config::default()).expect("lowered");
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    ir
}

fn method_text(ir: &IrProgram, name: &str) -> String {
    ir.method(name).unwrap_or_else(|| panic!("no method '{}'", name)).to_string()
}

#[test]
fn default_constructor_comes_first() {
    let ir = lower(class_with(vec![MethodBuilder::main(vec![])]));
    let constructor = &ir.methods[0];
    assert!(constructor.is_constructor);
    assert_eq!(
        constructor.to_string(),
        ".construct Main().V {\n        invokespecial(this.Main, \"<init>\").V;\n        ret.V;\n}"
    );
}

#[test]
fn computed_values_land_directly_in_the_destination() {
    let sum = MethodBuilder::new("sum", ty("int"))
        .param(ty("int"), "a")
        .param(ty("int"), "b")
        .local(ty("int"), "c")
        .body(vec![assign("c", binary(BinaryOp::Add, ident("a"), ident("b"))), ret(ident("c"))]);
    let ir = lower(class_with(vec![sum]));
    assert_eq!(
        method_text(&ir, "sum"),
        ".method public sum(a.i32, b.i32).i32 {\n        c.i32 :=.i32 a.i32 +.i32 b.i32;\n        ret.i32 c.i32;\n}"
    );
}

#[test]
fn if_else_layout() {
    let max = MethodBuilder::new("max", ty("int")).param(ty("int"), "a").param(ty("int"), "b").body(vec![if_else(
        binary(BinaryOp::Lt, ident("a"), ident("b")),
        vec![ret(ident("b"))],
        vec![ret(ident("a"))],
    )]);
    let ir = lower(class_with(vec![max]));
    let expected = [
        ".method public max(a.i32, b.i32).i32 {",
        "        if (a.i32 <.bool b.i32) goto then_0;",
        "        goto else_0;",
        "    then_0:",
        "        ret.i32 b.i32;",
        "    else_0:",
        "        ret.i32 a.i32;",
        "    endif_0:",
        "}",
    ];
    assert_eq!(method_text(&ir, "max"), expected.join("\n"));
}

fn nested_returning_if_else() -> Program {
    class_with(vec![MethodBuilder::new("pick", ty("int")).param(ty("boolean"), "a").param(ty("boolean"), "b").body(vec![
        if_else(ident("a"), vec![if_else(ident("b"), vec![ret(int(1))], vec![ret(int(2))])], vec![ret(int(3))]),
    ])])
}

#[test]
fn nested_if_else_that_always_returns_needs_no_endif_jump() {
    let ir = lower(nested_returning_if_else());
    let text = method_text(&ir, "pick");
    assert!(!text.contains("goto endif"), "{}", text);
    assert!(text.contains("goto else_0;") && text.contains("goto else_1;"), "{}", text);
}

#[test]
fn while_layout_tests_the_condition_at_the_bottom() {
    let count = MethodBuilder::new("count", ty("int")).local(ty("int"), "i").body(vec![
        assign("i", int(0)),
        while_loop(binary(BinaryOp::Lt, ident("i"), int(10)), vec![assign("i", binary(BinaryOp::Add, ident("i"), int(1)))]),
        ret(ident("i")),
    ]);
    let ir = lower(class_with(vec![count]));
    let text = method_text(&ir, "count");
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    assert_eq!(
        &lines[1..lines.len() - 1],
        [
            "i.i32 :=.i32 0.i32;",
            "goto while_cond_0;",
            "while_body_0:",
            "i.i32 :=.i32 i.i32 +.i32 1.i32;",
            "while_cond_0:",
            "if (i.i32 <.bool 10.i32) goto while_body_0;",
            "while_end_0:",
            "ret.i32 i.i32;",
        ]
    );
}

#[test]
fn fields_go_through_getfield_and_putfield() {
    let class = ClassBuilder::new("Main")
        .field(ty("int"), "total")
        .method(
            MethodBuilder::new("add", ty("void"))
                .param(ty("int"), "v")
                .body(vec![assign("total", binary(BinaryOp::Add, ident("total"), ident("v")))]),
        )
        .build();
    let ir = lower(program(&[], class));
    let text = ir.to_string();
    assert!(text.contains(".field public total.i32;"), "{}", text);
    assert!(text.contains("tmp0.i32 :=.i32 getfield(this.Main, total.i32).i32;"), "{}", text);
    assert!(text.contains("tmp1.i32 :=.i32 tmp0.i32 +.i32 v.i32;"), "{}", text);
    assert!(text.contains("putfield(this.Main, total.i32, tmp1.i32).V;"), "{}", text);

    let add = ir.method("add").unwrap();
    assert!(!add.var_table.contains_key("total"));
    assert_eq!(add.var_table["this"].register, 0);
    assert_eq!(add.var_table["v"].scope, VarScope::Parameter);
}

#[test]
fn objects_are_allocated_then_initialized() {
    let make = MethodBuilder::new("make", ty("Main"))
        .local(ty("Main"), "m")
        .body(vec![assign("m", new_object("Main")), ret(ident("m"))]);
    let ir = lower(class_with(vec![make]));
    let text = method_text(&ir, "make");
    assert!(text.contains("tmp0.Main :=.Main new(Main).Main;"), "{}", text);
    assert!(text.contains("invokespecial(tmp0.Main, \"<init>\").V;"), "{}", text);
    assert!(text.contains("m.Main :=.Main tmp0.Main;"), "{}", text);
}

#[test]
fn varargs_calls_build_their_array() {
    let foo = MethodBuilder::new("foo", ty("void")).param(varargs_ty("int"), "xs");
    let bar = MethodBuilder::new("bar", ty("void")).body(vec![expr_stmt(call_local("foo", vec![int(1), int(2), int(3)]))]);
    let ir = lower(class_with(vec![foo, bar]));
    let text = method_text(&ir, "bar");
    assert!(text.contains("tmp0.array.i32 :=.array.i32 new(array, 3.i32).array.i32;"), "{}", text);
    assert!(text.contains("tmp1.i32 :=.i32 0.i32;"), "{}", text);
    assert!(text.contains("tmp0[tmp1.i32].i32 :=.i32 1.i32;"), "{}", text);
    assert!(text.contains("invokevirtual(this.Main, \"foo\", tmp0.array.i32).V;"), "{}", text);
    assert!(text.ends_with("        ret.V;\n}"), "{}", text);
}

#[test]
fn imported_receivers_are_static_calls() {
    let main = MethodBuilder::main(vec![expr_stmt(call(ident("io"), "println", vec![int(1)]))]);
    let ir = lower(program(&["io"], ClassBuilder::new("Main").method(main).build()));
    let text = ir.to_string();
    assert!(text.starts_with("import io;\n\nMain {"), "{}", text);
    assert!(text.contains("invokestatic(io, \"println\", 1.i32).V;"), "{}", text);
    let main = ir.method("main").unwrap();
    assert!(!main.var_table.contains_key("io"));
    assert_eq!(main.var_table["args"].register, 0);
}

#[test]
fn static_calls_to_own_methods_take_the_declared_return_type() {
    let twice = MethodBuilder::new("twice", ty("int"))
        .make_static()
        .param(ty("int"), "a")
        .body(vec![ret(binary(BinaryOp::Mul, ident("a"), int(2)))]);
    let main = MethodBuilder::main(vec![assign("x", call_local("twice", vec![int(4)]))]).local(ty("int"), "x");
    let ir = lower(class_with(vec![twice, main]));
    assert!(method_text(&ir, "main").contains("x.i32 :=.i32 invokestatic(Main, \"twice\", 4.i32).i32;"));
}

#[test]
fn arrays_index_through_operands() {
    let first = MethodBuilder::new("first", ty("int"))
        .param(array_ty("int"), "xs")
        .body(vec![assign_element(ident("xs"), int(0), int(7)), ret(index(ident("xs"), int(0)))]);
    let ir = lower(class_with(vec![first]));
    let text = method_text(&ir, "first");
    assert!(text.contains("tmp0.i32 :=.i32 0.i32;"), "{}", text);
    assert!(text.contains("xs[tmp0.i32].i32 :=.i32 7.i32;"), "{}", text);
    assert!(text.contains("tmp2.i32 :=.i32 xs[tmp1.i32].i32;"), "{}", text);
    assert!(text.contains("ret.i32 tmp2.i32;"), "{}", text);
}

#[test]
fn length_on_an_array_is_arraylength() {
    let size = MethodBuilder::new("size", ty("int"))
        .param(array_ty("int"), "xs")
        .body(vec![ret(length(ident("xs")))]);
    let ir = lower(class_with(vec![size]));
    assert!(method_text(&ir, "size").contains("tmp0.i32 :=.i32 arraylength(xs.array.i32).i32;"));
}
