mod common;

use common::*;
use jmmc::ast::builder::*;
use jmmc::ast::{BinaryOp, Program};

fn ok(program: Program) {
    let found = messages(&program);
    assert!(found.is_empty(), "expected no diagnostics, got {:?}", found);
}

fn err_contains(program: Program, needle: &str) {
    let found = messages(&program);
    assert!(found.iter().any(|m| m.contains(needle)), "no '{}' in {:?}", needle, found);
}

fn sum_method() -> MethodBuilder {
    MethodBuilder::new("sum", ty("int"))
        .param(ty("int"), "a")
        .param(ty("int"), "b")
        .local(ty("int"), "c")
        .body(vec![assign("c", binary(BinaryOp::Add, ident("a"), ident("b"))), ret(ident("c"))])
}

#[test]
fn well_typed_method_passes() {
    ok(class_with(vec![sum_method()]));
}

#[test]
fn undeclared_variable_is_reported_at_its_position() {
    let program = class_with(vec![MethodBuilder::new("f", ty("int")).body(vec![ret(ident_at("y", 3, 16))])]);
    let (_, diagnostics) = jmmc::check(&program).unwrap();
    let diagnostic = diagnostics.iter().find(|d| d.message == "undeclared variable 'y'").expect("reported");
    assert_eq!((diagnostic.line, diagnostic.column), (3, 16));
    assert!(diagnostic.is_error());
}

#[test]
fn condition_must_be_boolean() {
    let method = MethodBuilder::new("f", ty("void")).param(ty("int"), "a").body(vec![if_then(ident("a"), vec![])]);
    err_contains(class_with(vec![method]), "condition must be boolean; found int");
}

#[test]
fn if_without_else_does_not_complete_a_method() {
    let method = MethodBuilder::new("f", ty("int"))
        .param(ty("boolean"), "c")
        .body(vec![if_then(ident("c"), vec![ret(int(1))])]);
    err_contains(class_with(vec![method]), "method 'f' is missing a return statement on some path");
}

#[test]
fn if_else_returning_on_both_paths_completes() {
    let method = MethodBuilder::new("f", ty("int"))
        .param(ty("boolean"), "c")
        .body(vec![if_else(ident("c"), vec![ret(int(1))], vec![ret(int(2))])]);
    ok(class_with(vec![method]));
}

#[test]
fn statement_after_return_is_unreachable() {
    let method = MethodBuilder::new("f", ty("int"))
        .local(ty("int"), "x")
        .body(vec![ret(int(1)), assign("x", int(2))]);
    err_contains(class_with(vec![method]), "unreachable statement");
}

#[test]
fn static_methods_cannot_touch_instance_state() {
    let class = ClassBuilder::new("Main")
        .field(ty("int"), "total")
        .method(MethodBuilder::new("f", ty("void")).make_static().body(vec![assign("total", int(1))]))
        .method(MethodBuilder::new("g", ty("void")).make_static().body(vec![expr_stmt(call(this(), "f", vec![]))]))
        .build();
    let found = messages(&program(&[], class));
    assert!(found.contains(&"cannot access instance field 'total' from static method 'f'".to_string()), "{:?}", found);
    assert!(found.contains(&"cannot use 'this' in static method 'g'".to_string()), "{:?}", found);
}

#[test]
fn calls_on_imported_classes_are_accepted() {
    let main = MethodBuilder::main(vec![expr_stmt(call(ident("io"), "println", vec![int(1)]))]);
    ok(program(&["io"], ClassBuilder::new("Main").method(main).build()));
}

#[test]
fn unknown_local_method_is_reported() {
    let method = MethodBuilder::new("f", ty("void")).body(vec![expr_stmt(call_local("missing", vec![]))]);
    err_contains(class_with(vec![method]), "undeclared method 'missing'");
}

#[test]
fn own_method_names_do_not_resolve_on_other_receivers() {
    let foo = MethodBuilder::new("foo", ty("void"));
    let method =
        MethodBuilder::new("f", ty("void")).local(ty("int"), "n").body(vec![expr_stmt(call(ident("n"), "foo", vec![]))]);
    err_contains(class_with(vec![foo, method]), "undeclared method 'foo'");
}

#[test]
fn static_methods_cannot_call_instance_methods_unqualified() {
    let helper = || MethodBuilder::new("helper", ty("void"));
    let main = MethodBuilder::main(vec![expr_stmt(call_local("helper", vec![]))]);
    err_contains(class_with(vec![helper(), main]), "cannot call instance method 'helper' from static method 'main'");

    let through_instance = MethodBuilder::main(vec![expr_stmt(call(new_object("Main"), "helper", vec![]))]);
    ok(class_with(vec![helper(), through_instance]));
}

#[test]
fn argument_count_and_types_are_checked() {
    let twice = || MethodBuilder::new("twice", ty("int")).param(ty("int"), "a").body(vec![ret(ident("a"))]);
    let arity = MethodBuilder::new("f", ty("int")).body(vec![ret(call_local("twice", vec![int(1), int(2)]))]);
    err_contains(class_with(vec![twice(), arity]), "method call 'twice' expects 1 argument(s); found 2");

    let typed = MethodBuilder::new("f", ty("int")).body(vec![ret(call_local("twice", vec![boolean(true)]))]);
    err_contains(class_with(vec![twice(), typed]), "argument 1 of 'twice' expects int; found boolean");
}

#[test]
fn varargs_accept_loose_arguments_and_an_explicit_array() {
    let sum = MethodBuilder::new("sum", ty("int")).param(varargs_ty("int"), "xs").body(vec![ret(length(ident("xs")))]);
    let loose = MethodBuilder::new("f", ty("int")).body(vec![ret(call_local("sum", vec![int(1), int(2), int(3)]))]);
    let packed = MethodBuilder::new("g", ty("int"))
        .local(array_ty("int"), "values")
        .body(vec![assign("values", new_int_array(int(2))), ret(call_local("sum", vec![ident("values")]))]);
    let empty = MethodBuilder::new("h", ty("int")).body(vec![ret(call_local("sum", vec![]))]);
    ok(class_with(vec![sum, loose, packed, empty]));
}

#[test]
fn varargs_must_be_last() {
    let method = MethodBuilder::new("f", ty("void")).param(varargs_ty("int"), "a").param(ty("int"), "b");
    err_contains(class_with(vec![method]), "varargs parameter 'a' of method 'f' must be the last parameter");
}

#[test]
fn operand_types_are_checked() {
    let method = MethodBuilder::new("f", ty("int"))
        .param(ty("boolean"), "b")
        .body(vec![ret(binary(BinaryOp::Add, ident("b"), int(1)))]);
    err_contains(class_with(vec![method]), "incompatible operand types for '+'");

    let logical = MethodBuilder::new("g", ty("boolean"))
        .param(ty("int"), "a")
        .body(vec![ret(binary(BinaryOp::And, ident("a"), ident("a")))]);
    err_contains(class_with(vec![logical]), "operator '&&' expects boolean operands; found int");
}

#[test]
fn assignments_and_returns_must_match_declared_types() {
    let assign_bad = MethodBuilder::new("f", ty("void")).local(ty("int"), "x").body(vec![assign("x", boolean(true))]);
    err_contains(class_with(vec![assign_bad]), "cannot assign boolean to 'x' of type int");

    let return_bad = MethodBuilder::new("g", ty("int")).body(vec![ret(boolean(true))]);
    err_contains(class_with(vec![return_bad]), "method 'g' returns int; found boolean");
}

#[test]
fn array_literal_elements_are_checked_against_the_target() {
    let method = MethodBuilder::new("f", ty("void"))
        .local(array_ty("int"), "xs")
        .body(vec![assign("xs", array_literal(vec![int(1), boolean(false)]))]);
    err_contains(class_with(vec![method]), "array element of type boolean is not assignable to int");
}

#[test]
fn declarations_are_checked() {
    let class = ClassBuilder::new("Main")
        .field(ty("int"), "x")
        .field(ty("boolean"), "x")
        .method(MethodBuilder::new("f", ty("void")).local(ty("void"), "v").local(ty("Widget"), "w"))
        .build();
    let found = messages(&program(&[], class));
    for expected in ["Duplicate field 'x'", "local variable 'v' cannot have type void", "unknown type 'Widget'"] {
        assert!(found.iter().any(|m| m == expected), "no '{}' in {:?}", expected, found);
    }
}

#[test]
fn main_needs_the_standard_signature() {
    let main = MethodBuilder::new("main", ty("void")).make_static();
    err_contains(class_with(vec![main]), "method main must be declared 'static void main(String[])'");
    ok(class_with(vec![MethodBuilder::main(vec![])]));
}

#[test]
fn rejected_programs_never_reach_code_generation() {
    let program = class_with(vec![MethodBuilder::new("f", ty("int")).body(vec![ret(ident("y"))])]);
    let err = jmmc::compile(program, &jmmc::Config::default()).unwrap_err();
    assert!(matches!(err, jmmc::Error::Rejected(_)));
    assert!(err.diagnostics().iter().any(|d| d.message == "undeclared variable 'y'"));
}
