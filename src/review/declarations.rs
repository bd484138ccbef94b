use std::collections::HashSet;

use super::{ReviewError, ReviewPass, Reporter};
use crate::ast::*;
use crate::consts::{BOOLEAN, INT, MAIN, STRING, VOID};
use crate::symtab::SymbolTable;

/// Uniqueness, varargs placement, void declarations, known type names and the
/// shape of `main`
pub struct DeclarationReview;

impl ReviewPass for DeclarationReview {
    fn name(&self) -> &'static str {
        "declarations"
    }

    fn review(&self, program: &Program, table: &SymbolTable, reporter: &mut Reporter) {
        review_imports(program, reporter);
        let Some(class) = &program.class else { return };
        review_fields(class, table, reporter);
        review_methods(class, table, reporter);
    }
}

fn review_imports(program: &Program, reporter: &mut Reporter) {
    let mut seen: HashSet<&str> = HashSet::new();
    for import in &program.imports {
        if !seen.insert(import.simple_name()) {
            reporter.report(import.span, ReviewError::DuplicateImport(import.qualified_name()));
        }
    }
}

fn review_fields(class: &ClassDecl, table: &SymbolTable, reporter: &mut Reporter) {
    let mut seen: HashSet<&str> = HashSet::new();
    for field in &class.fields {
        if !seen.insert(field.name.as_str()) {
            reporter.report(field.span, ReviewError::DuplicateField(field.name.clone()));
        }
        review_variable_type(field, "field", table, reporter);
    }
}

fn review_methods(class: &ClassDecl, table: &SymbolTable, reporter: &mut Reporter) {
    let mut seen: HashSet<&str> = HashSet::new();
    for method in &class.methods {
        if !seen.insert(method.name.as_str()) {
            reporter.report(method.span, ReviewError::DuplicateMethod(method.name.clone()));
        }

        if method.return_type.is_varargs {
            reporter.report(
                method.return_type.span,
                ReviewError::VarargsNotAllowed { kind: "return type of method", name: method.name.clone() },
            );
        }
        if method.return_type.name != VOID || method.return_type.is_array {
            review_type_name(&method.return_type, table, reporter);
        }

        // parameters and locals share one namespace
        let mut names: HashSet<&str> = HashSet::new();
        for decl in method.parameters.iter().chain(&method.locals) {
            if !names.insert(decl.name.as_str()) {
                reporter.report(
                    decl.span,
                    ReviewError::DuplicateVariable { method: method.name.clone(), name: decl.name.clone() },
                );
            }
        }

        review_varargs_parameters(method, reporter);
        for param in &method.parameters {
            review_variable_type(param, "parameter", table, reporter);
        }
        for local in &method.locals {
            review_variable_type(local, "local variable", table, reporter);
        }

        if method.name == MAIN && !is_valid_main(method) {
            reporter.report(method.span, ReviewError::InvalidMainSignature);
        }
    }
}

fn review_varargs_parameters(method: &MethodDecl, reporter: &mut Reporter) {
    let varargs: Vec<usize> = method
        .parameters
        .iter()
        .enumerate()
        .filter(|(_, p)| p.type_ref.is_varargs)
        .map(|(i, _)| i)
        .collect();
    if varargs.len() > 1 {
        reporter.report(method.span, ReviewError::MultipleVarargs(method.name.clone()));
    }
    let last = method.parameters.len().saturating_sub(1);
    for &position in &varargs {
        if position != last {
            let param = &method.parameters[position];
            reporter.report(
                param.span,
                ReviewError::VarargsNotLast { method: method.name.clone(), param: param.name.clone() },
            );
        }
    }
}

/// Fields, parameters and locals: not void, varargs only on parameters, known type
fn review_variable_type(decl: &VarDecl, kind: &'static str, table: &SymbolTable, reporter: &mut Reporter) {
    if decl.type_ref.name == VOID {
        reporter.report(decl.span, ReviewError::VoidVariable { kind, name: decl.name.clone() });
        return;
    }
    if decl.type_ref.is_varargs && kind != "parameter" {
        reporter.report(decl.span, ReviewError::VarargsNotAllowed { kind, name: decl.name.clone() });
    }
    review_type_name(&decl.type_ref, table, reporter);
}

fn review_type_name(type_ref: &TypeRef, table: &SymbolTable, reporter: &mut Reporter) {
    let name = type_ref.name.as_str();
    let builtin = matches!(name, INT | BOOLEAN | STRING);
    let known = builtin
        || name == table.class_name()
        || table.superclass() == Some(name)
        || table.is_import(name);
    if !known {
        reporter.report(type_ref.span, ReviewError::UnknownType(type_ref.to_string()));
    }
}

fn is_valid_main(method: &MethodDecl) -> bool {
    method.is_static
        && method.is_void()
        && method.parameters.len() == 1
        && method.parameters[0].type_ref.name == STRING
        && method.parameters[0].type_ref.is_array
}
