//! Depth-first, read-only AST traversal
//!
//! Override the `visit_*` hooks you care about and call the matching `walk_*`
//! function to keep descending. Mutating passes (the optimizers) walk the tree
//! by hand instead.

use super::*;

pub trait Visitor<'ast>: Sized {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program)
    }

    fn visit_import(&mut self, _import: &'ast ImportDecl) {}

    fn visit_class(&mut self, class: &'ast ClassDecl) {
        walk_class(self, class)
    }

    fn visit_field(&mut self, field: &'ast VarDecl) {
        walk_var_decl(self, field)
    }

    fn visit_method(&mut self, method: &'ast MethodDecl) {
        walk_method(self, method)
    }

    fn visit_parameter(&mut self, parameter: &'ast VarDecl) {
        walk_var_decl(self, parameter)
    }

    fn visit_local(&mut self, local: &'ast VarDecl) {
        walk_var_decl(self, local)
    }

    fn visit_type_ref(&mut self, _type_ref: &'ast TypeRef) {}

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt)
    }

    fn visit_assign_target(&mut self, target: &'ast AssignTarget) {
        walk_assign_target(self, target)
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr)
    }
}

pub fn walk_program<'a>(visitor: &mut impl Visitor<'a>, program: &'a Program) {
    for import in &program.imports {
        visitor.visit_import(import);
    }
    if let Some(class) = &program.class {
        visitor.visit_class(class);
    }
}

pub fn walk_class<'a>(visitor: &mut impl Visitor<'a>, class: &'a ClassDecl) {
    for field in &class.fields {
        visitor.visit_field(field);
    }
    for method in &class.methods {
        visitor.visit_method(method);
    }
}

pub fn walk_var_decl<'a>(visitor: &mut impl Visitor<'a>, decl: &'a VarDecl) {
    visitor.visit_type_ref(&decl.type_ref);
}

pub fn walk_method<'a>(visitor: &mut impl Visitor<'a>, method: &'a MethodDecl) {
    visitor.visit_type_ref(&method.return_type);
    for parameter in &method.parameters {
        visitor.visit_parameter(parameter);
    }
    for local in &method.locals {
        visitor.visit_local(local);
    }
    for stmt in &method.body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'a>(visitor: &mut impl Visitor<'a>, stmt: &'a Stmt) {
    match stmt {
        Stmt::Block(block) => {
            for inner in &block.statements {
                visitor.visit_stmt(inner);
            }
        }
        Stmt::If(s) => {
            visitor.visit_expr(&s.condition);
            visitor.visit_stmt(&s.then_branch);
            if let Some(else_branch) = &s.else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        Stmt::While(s) => {
            visitor.visit_expr(&s.condition);
            visitor.visit_stmt(&s.body);
        }
        Stmt::Expr(s) => visitor.visit_expr(&s.expr),
        Stmt::Assign(s) => {
            visitor.visit_assign_target(&s.target);
            visitor.visit_expr(&s.value);
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                visitor.visit_expr(value);
            }
        }
    }
}

pub fn walk_assign_target<'a>(visitor: &mut impl Visitor<'a>, target: &'a AssignTarget) {
    match target {
        // the assigned name itself is not a read; hooks that need it match on the target
        AssignTarget::Variable(_) => {}
        AssignTarget::Element(access) => {
            visitor.visit_expr(&access.array);
            visitor.visit_expr(&access.index);
        }
    }
}

pub fn walk_expr<'a>(visitor: &mut impl Visitor<'a>, expr: &'a Expr) {
    match expr {
        Expr::Literal(_) | Expr::This(_) | Expr::Identifier(_) | Expr::New(_) => {}
        Expr::Parenthesized(p) => visitor.visit_expr(&p.inner),
        Expr::Unary(u) => visitor.visit_expr(&u.operand),
        Expr::Binary(b) => {
            visitor.visit_expr(&b.left);
            visitor.visit_expr(&b.right);
        }
        Expr::ArrayAccess(a) => {
            visitor.visit_expr(&a.array);
            visitor.visit_expr(&a.index);
        }
        Expr::Length(l) => visitor.visit_expr(&l.target),
        Expr::MethodCall(call) => {
            if let Some(target) = &call.target {
                visitor.visit_expr(target);
            }
            for arg in &call.arguments {
                visitor.visit_expr(arg);
            }
        }
        Expr::NewArray(n) => visitor.visit_expr(&n.size),
        Expr::ArrayLiteral(a) => {
            for element in &a.elements {
                visitor.visit_expr(element);
            }
        }
    }
}

/// Names assigned (as whole variables) anywhere inside `stmt`
pub fn assigned_names(stmt: &Stmt) -> std::collections::HashSet<String> {
    struct Collector(std::collections::HashSet<String>);

    impl<'a> Visitor<'a> for Collector {
        fn visit_assign_target(&mut self, target: &'a AssignTarget) {
            if let AssignTarget::Variable(id) = target {
                self.0.insert(id.name.clone());
            }
            walk_assign_target(self, target)
        }
    }

    let mut collector = Collector(Default::default());
    collector.visit_stmt(stmt);
    collector.0
}
