mod common;

use common::*;
use jmmc::ast::builder::*;
use jmmc::ast::BinaryOp;
use jmmc::Config;

fn assembly(program: jmmc::ast::Program) -> String {
    compile_ok(program, &Config::default()).assembly
}

#[test]
fn class_header_and_default_constructor() {
    let class = ClassBuilder::new("Main").field(ty("int"), "count").method(MethodBuilder::main(vec![])).build();
    let asm = assembly(program(&[], class));
    assert!(asm.starts_with(".class public Main\n.super java/lang/Object\n"), "{}", asm);
    assert!(asm.contains(".field public 'count' I"), "{}", asm);
    assert_eq!(
        method_lines(&asm, "<init>"),
        [".limit stack 2", ".limit locals 1", "aload_0", "invokespecial java/lang/Object/<init>()V", "return"]
    );
    assert!(asm.contains(".method public static main([Ljava/lang/String;)V"), "{}", asm);
}

#[test]
fn imported_superclass_is_fully_qualified() {
    let class = ClassBuilder::new("Main").extends("Base").method(MethodBuilder::main(vec![])).build();
    let asm = assembly(program(&["lib.Base"], class));
    assert!(asm.contains(".super lib/Base"), "{}", asm);
    assert!(method_lines(&asm, "<init>").contains(&"invokespecial lib/Base/<init>()V"));
}

#[test]
fn folded_constant_is_returned_directly() {
    let f = MethodBuilder::new("f", ty("int"))
        .local(ty("int"), "x")
        .body(vec![assign("x", binary(BinaryOp::Add, int(2), int(3))), ret(ident("x"))]);
    let asm = compile_ok(class_with(vec![f]), &Config::new().with_optimize(true)).assembly;
    let lines = method_lines(&asm, "f");
    assert!(adjacent(&lines, "iconst_5", "ireturn"), "{:?}", lines);
}

#[test]
fn comparison_values_use_fresh_labels() {
    let less = MethodBuilder::new("less", ty("boolean"))
        .make_static()
        .param(ty("int"), "a")
        .param(ty("int"), "b")
        .body(vec![ret(binary(BinaryOp::Lt, ident("a"), ident("b")))]);
    let asm = assembly(class_with(vec![less]));
    assert!(asm.contains(".method public static less(II)Z"), "{}", asm);
    assert_eq!(
        method_lines(&asm, "less"),
        [
            ".limit stack 2",
            ".limit locals 3",
            "iload_0",
            "iload_1",
            "if_icmplt cmp_true_0",
            "iconst_0",
            "goto cmp_end_1",
            "cmp_true_0:",
            "iconst_1",
            "cmp_end_1:",
            "istore_2",
            "iload_2",
            "ireturn",
        ]
    );
}

#[test]
fn comparison_against_zero_uses_the_short_branch() {
    let clamp = MethodBuilder::new("clamp", ty("int"))
        .param(ty("int"), "a")
        .body(vec![if_then(binary(BinaryOp::Lt, ident("a"), int(0)), vec![ret(int(0))]), ret(ident("a"))]);
    let asm = assembly(class_with(vec![clamp]));
    assert_eq!(
        &method_lines(&asm, "clamp")[2..],
        ["iload_1", "iflt then_0", "goto endif_0", "then_0:", "iconst_0", "ireturn", "endif_0:", "iload_1", "ireturn"]
    );
}

#[test]
fn loop_increment_becomes_iinc() {
    let count = MethodBuilder::new("count", ty("int")).local(ty("int"), "i").body(vec![
        assign("i", int(0)),
        while_loop(binary(BinaryOp::Lt, ident("i"), int(10)), vec![assign("i", binary(BinaryOp::Add, ident("i"), int(1)))]),
        ret(ident("i")),
    ]);
    let asm = assembly(class_with(vec![count]));
    let lines = method_lines(&asm, "count");
    assert!(lines.contains(&"iinc 1 1"), "{:?}", lines);
    assert!(adjacent(&lines, "bipush 10", "if_icmplt while_body_0"), "{:?}", lines);
    assert!(adjacent(&lines, "goto while_cond_0", "while_body_0:"), "{:?}", lines);
}

#[test]
fn field_access_names_the_owner_and_descriptor() {
    let class = ClassBuilder::new("Main")
        .field(ty("int"), "total")
        .method(
            MethodBuilder::new("add", ty("void"))
                .param(ty("int"), "v")
                .body(vec![assign("total", binary(BinaryOp::Add, ident("total"), ident("v")))]),
        )
        .build();
    let asm = assembly(program(&[], class));
    let lines = method_lines(&asm, "add");
    assert!(adjacent(&lines, "aload_0", "getfield Main/total I"), "{:?}", lines);
    assert!(adjacent(&lines, "iload_3", "putfield Main/total I"), "{:?}", lines);
    assert_eq!(lines.last(), Some(&"return"));
}

#[test]
fn new_stores_the_reference_before_initializing_it() {
    let make = MethodBuilder::new("make", ty("Main"))
        .local(ty("Main"), "m")
        .body(vec![assign("m", new_object("Main")), ret(ident("m"))]);
    let asm = assembly(class_with(vec![make]));
    assert_eq!(
        &method_lines(&asm, "make")[2..],
        ["new Main", "astore_1", "aload_1", "invokespecial Main/<init>()V", "aload_1", "astore_2", "aload_2", "areturn"]
    );
}

#[test]
fn imported_static_call_in_statement_position() {
    let main = MethodBuilder::main(vec![expr_stmt(call(ident("io"), "println", vec![int(1)]))]);
    let asm = assembly(program(&["io"], ClassBuilder::new("Main").method(main).build()));
    assert_eq!(&method_lines(&asm, "main")[2..], ["iconst_1", "invokestatic io/println(I)V", "return"]);
}

#[test]
fn unused_call_results_are_popped() {
    let one = MethodBuilder::new("one", ty("int")).body(vec![ret(int(1))]);
    let caller = MethodBuilder::new("caller", ty("void")).body(vec![expr_stmt(call(this(), "one", vec![]))]);
    let asm = assembly(class_with(vec![one, caller]));
    assert_eq!(&method_lines(&asm, "caller")[2..], ["aload_0", "invokevirtual Main/one()I", "pop", "return"]);
}

#[test]
fn varargs_array_is_filled_element_by_element() {
    let foo = MethodBuilder::new("foo", ty("void")).param(varargs_ty("int"), "xs");
    let bar = MethodBuilder::new("bar", ty("void")).body(vec![expr_stmt(call_local("foo", vec![int(1), int(2)]))]);
    let asm = assembly(class_with(vec![foo, bar]));
    let lines = method_lines(&asm, "bar");
    assert_eq!(lines[0], ".limit stack 3");
    assert_eq!(
        &lines[2..],
        [
            "iconst_2",
            "newarray int",
            "astore_1",
            "iconst_0",
            "istore_2",
            "aload_1",
            "iload_2",
            "iconst_1",
            "iastore",
            "iconst_1",
            "istore_3",
            "aload_1",
            "iload_3",
            "iconst_2",
            "iastore",
            "aload_0",
            "aload_1",
            "invokevirtual Main/foo([I)V",
            "return",
        ]
    );
}

#[test]
fn every_method_gets_at_least_two_stack_slots() {
    let empty = MethodBuilder::new("empty", ty("void"));
    let asm = assembly(class_with(vec![empty, MethodBuilder::main(vec![])]));
    for line in asm.lines().filter(|l| l.trim_start().starts_with(".limit stack")) {
        let limit: usize = line.trim().trim_start_matches(".limit stack ").parse().unwrap();
        assert!(limit >= 2, "{}", line);
    }
}

#[test]
fn negation_flips_the_low_bit() {
    let flip = MethodBuilder::new("flip", ty("boolean")).param(ty("boolean"), "b").body(vec![ret(not(ident("b")))]);
    let asm = assembly(class_with(vec![flip]));
    assert_eq!(&method_lines(&asm, "flip")[2..], ["iload_1", "iconst_1", "ixor", "istore_2", "iload_2", "ireturn"]);
}

#[test]
fn nested_if_else_returning_on_every_path_compiles() {
    let pick = MethodBuilder::new("pick", ty("int")).param(ty("boolean"), "a").param(ty("boolean"), "b").body(vec![
        if_else(ident("a"), vec![if_else(ident("b"), vec![ret(int(1))], vec![ret(int(2))])], vec![ret(int(3))]),
    ]);
    let asm = assembly(class_with(vec![pick]));
    let lines = method_lines(&asm, "pick");
    assert!(!lines.iter().any(|line| line.starts_with("goto endif")), "{:?}", lines);
    assert!(!lines.contains(&"endif_0:"), "{:?}", lines);
    assert!(adjacent(&lines, "iconst_3", "ireturn"), "{:?}", lines);
    assert_eq!(lines.last(), Some(&"ireturn"));
}
