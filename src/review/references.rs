use super::{MethodScope, ReviewError, ReviewPass, Reporter};
use crate::ast::*;
use crate::symtab::{SymbolTable, VarKind};

/// Every name must resolve; static methods may not touch instance state
pub struct ReferenceReview;

impl ReviewPass for ReferenceReview {
    fn name(&self) -> &'static str {
        "references"
    }

    fn review(&self, program: &Program, table: &SymbolTable, reporter: &mut Reporter) {
        let Some(class) = &program.class else { return };
        for method in &class.methods {
            let mut visitor = ReferenceVisitor { scope: MethodScope::new(table, method), reporter: &mut *reporter };
            for stmt in &method.body {
                visitor.visit_stmt(stmt);
            }
        }
    }
}

struct ReferenceVisitor<'a, 'r> {
    scope: MethodScope<'a>,
    reporter: &'r mut Reporter,
}

impl ReferenceVisitor<'_, '_> {
    fn check_name(&mut self, name: &str, span: Span) {
        match self.scope.lookup(name) {
            Some(VarKind::Field) if self.scope.method.is_static => {
                self.reporter.report(
                    span,
                    ReviewError::FieldInStaticMethod { field: name.to_string(), method: self.scope.name().to_string() },
                );
            }
            Some(_) => {}
            None if self.scope.table.is_import(name) => {}
            None => self.reporter.report(span, ReviewError::UndeclaredVariable(name.to_string())),
        }
    }
}

impl<'ast> Visitor<'ast> for ReferenceVisitor<'_, '_> {
    fn visit_assign_target(&mut self, target: &'ast AssignTarget) {
        if let AssignTarget::Variable(id) = target {
            self.check_name(&id.name, id.span);
        }
        walk_assign_target(self, target)
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::Identifier(id) => self.check_name(&id.name, id.span),
            Expr::This(span) if self.scope.method.is_static => {
                self.reporter.report(*span, ReviewError::ThisInStaticMethod(self.scope.name().to_string()));
            }
            Expr::New(n) if !self.scope.is_known_class(&n.class_name) => {
                self.reporter.report(n.span, ReviewError::UnknownClass(n.class_name.clone()));
            }
            _ => {}
        }
        walk_expr(self, expr)
    }
}
