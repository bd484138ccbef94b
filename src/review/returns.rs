use super::{MethodScope, ReviewError, ReviewPass, Reporter};
use crate::ast::*;
use crate::symtab::{is_assignable, SymbolTable, Type};

/// Return paths, unreachable code and return value types
pub struct ReturnReview;

impl ReviewPass for ReturnReview {
    fn name(&self) -> &'static str {
        "returns"
    }

    fn review(&self, program: &Program, table: &SymbolTable, reporter: &mut Reporter) {
        let Some(class) = &program.class else { return };
        for method in &class.methods {
            if !method.is_void() && !is_complete_sequence(&method.body) {
                reporter.report(method.span, ReviewError::MissingReturn(method.name.clone()));
            }
            report_unreachable(&method.body, reporter);

            let mut visitor = ReturnVisitor { scope: MethodScope::new(table, method), reporter: &mut *reporter };
            for stmt in &method.body {
                visitor.visit_stmt(stmt);
            }
        }
    }
}

/// A statement list always ends in a return if any of its statements does
pub fn is_complete_sequence(statements: &[Stmt]) -> bool {
    statements.iter().any(is_complete)
}

/// Whether every path through `stmt` reaches a return
pub fn is_complete(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => is_complete_sequence(&block.statements),
        Stmt::If(s) => match &s.else_branch {
            Some(else_branch) => is_complete(&s.then_branch) && is_complete(else_branch),
            None => false,
        },
        Stmt::While(_) | Stmt::Expr(_) | Stmt::Assign(_) => false,
    }
}

/// Flags the first statement after a `return` in every statement list.
/// Nested lists are visited too, so loop bodies and branches are covered.
fn report_unreachable(statements: &[Stmt], reporter: &mut Reporter) {
    if let Some(position) = statements.iter().position(|s| matches!(s, Stmt::Return(_))) {
        if let Some(next) = statements.get(position + 1) {
            reporter.report(next.span(), ReviewError::UnreachableStatement);
        }
    }
    for stmt in statements {
        match stmt {
            Stmt::Block(block) => report_unreachable(&block.statements, reporter),
            Stmt::If(s) => {
                report_unreachable(std::slice::from_ref(s.then_branch.as_ref()), reporter);
                if let Some(else_branch) = &s.else_branch {
                    report_unreachable(std::slice::from_ref(else_branch.as_ref()), reporter);
                }
            }
            Stmt::While(s) => report_unreachable(std::slice::from_ref(s.body.as_ref()), reporter),
            Stmt::Expr(_) | Stmt::Assign(_) | Stmt::Return(_) => {}
        }
    }
}

struct ReturnVisitor<'a, 'r> {
    scope: MethodScope<'a>,
    reporter: &'r mut Reporter,
}

impl<'ast> Visitor<'ast> for ReturnVisitor<'_, '_> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if let Stmt::Return(ret) = stmt {
            let method = self.scope.method;
            let declared = Type::from(&method.return_type);
            match (&ret.value, method.is_void()) {
                (None, false) => {
                    self.reporter.report(ret.span, ReviewError::MissingReturnValue(method.name.clone()));
                }
                (Some(_), true) => {
                    self.reporter.report(ret.span, ReviewError::UnexpectedReturnValue(method.name.clone()));
                }
                (Some(value), false) => {
                    let found = self.scope.expr_type(value);
                    if !is_assignable(&declared, &found) {
                        self.reporter.report(
                            ret.span,
                            ReviewError::ReturnTypeMismatch {
                                method: method.name.clone(),
                                expected: declared.to_string(),
                                found: found.to_string(),
                            },
                        );
                    }
                }
                (None, true) => {}
            }
        }
        walk_stmt(self, stmt)
    }
}
