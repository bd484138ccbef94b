use super::{conforms, MethodScope, ReviewError, ReviewPass, Reporter};
use crate::ast::*;
use crate::symtab::{is_assignable, SymbolTable, Type};

/// Conditions, operators, indexing, array literals and assignments
pub struct TypingReview;

impl ReviewPass for TypingReview {
    fn name(&self) -> &'static str {
        "typing"
    }

    fn review(&self, program: &Program, table: &SymbolTable, reporter: &mut Reporter) {
        let Some(class) = &program.class else { return };
        for method in &class.methods {
            let mut visitor = TypingVisitor { scope: MethodScope::new(table, method), reporter: &mut *reporter };
            for stmt in &method.body {
                visitor.visit_stmt(stmt);
            }
        }
    }
}

struct TypingVisitor<'a, 'r> {
    scope: MethodScope<'a>,
    reporter: &'r mut Reporter,
}

impl TypingVisitor<'_, '_> {
    fn check_condition(&mut self, condition: &Expr) {
        let found = self.scope.expr_type(condition);
        if !conforms(&found, &Type::boolean()) {
            self.reporter.report(condition.span(), ReviewError::NonBooleanCondition(found.to_string()));
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpr) {
        let left = self.scope.expr_type(&binary.left);
        let right = self.scope.expr_type(&binary.right);
        if !(is_assignable(&left, &right) && is_assignable(&right, &left)) {
            self.reporter.report(
                binary.span,
                ReviewError::IncompatibleOperands {
                    op: binary.op.to_string(),
                    left: left.to_string(),
                    right: right.to_string(),
                },
            );
            return;
        }

        let expected = if binary.op.is_arithmetic() || binary.op.is_relational() {
            Type::int()
        } else if binary.op.is_logical() {
            Type::boolean()
        } else {
            return;
        };
        for operand in [&left, &right] {
            if !conforms(operand, &expected) {
                self.reporter.report(
                    binary.span,
                    ReviewError::InvalidOperand {
                        op: binary.op.to_string(),
                        expected: expected.to_string(),
                        found: operand.to_string(),
                    },
                );
                return;
            }
        }
    }

    fn check_array_access(&mut self, access: &ArrayAccessExpr) {
        let array = self.scope.expr_type(&access.array);
        if !array.is_array && !array.is_any() {
            self.reporter.report(access.array.span(), ReviewError::IndexOnNonArray(array.to_string()));
        }
        let index = self.scope.expr_type(&access.index);
        if !conforms(&index, &Type::int()) {
            self.reporter.report(access.index.span(), ReviewError::NonIntegerIndex(index.to_string()));
        }
    }

    /// Every element must be assignable to `element`
    fn check_elements(&mut self, elements: &[Expr], element: &Type) {
        for item in elements {
            let found = self.scope.expr_type(item);
            if !is_assignable(element, &found) {
                self.reporter.report(
                    item.span(),
                    ReviewError::IncompatibleArrayElement { expected: element.to_string(), found: found.to_string() },
                );
            }
        }
    }

    fn check_assignment(&mut self, assign: &AssignStmt) {
        let expected = self.scope.target_type(&assign.target);
        if let Expr::ArrayLiteral(literal) = &assign.value {
            if expected.is_array || expected.is_any() {
                let element = if expected.is_any() { expected.clone() } else { expected.element_type() };
                self.check_elements(&literal.elements, &element);
                return;
            }
        }
        let found = self.scope.expr_type(&assign.value);
        if !is_assignable(&expected, &found) {
            self.reporter.report(
                assign.span,
                ReviewError::IncompatibleAssignment {
                    target: assign.target.to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                },
            );
        }
    }
}

impl<'ast> Visitor<'ast> for TypingVisitor<'_, '_> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::If(s) => self.check_condition(&s.condition),
            Stmt::While(s) => self.check_condition(&s.condition),
            Stmt::Assign(s) => self.check_assignment(s),
            _ => {}
        }
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::Binary(b) => self.check_binary(b),
            Expr::Unary(u) => {
                let found = self.scope.expr_type(&u.operand);
                if !conforms(&found, &Type::boolean()) {
                    self.reporter.report(
                        u.span,
                        ReviewError::InvalidOperand {
                            op: "!".to_string(),
                            expected: Type::boolean().to_string(),
                            found: found.to_string(),
                        },
                    );
                }
            }
            Expr::ArrayAccess(access) => self.check_array_access(access),
            Expr::Length(l) => {
                let found = self.scope.expr_type(&l.target);
                if !found.is_array && !found.is_any() {
                    self.reporter.report(l.span, ReviewError::LengthOnNonArray(found.to_string()));
                }
            }
            Expr::NewArray(n) => {
                let size = self.scope.expr_type(&n.size);
                if !conforms(&size, &Type::int()) {
                    self.reporter.report(n.size.span(), ReviewError::NonIntegerSize(size.to_string()));
                }
            }
            Expr::ArrayLiteral(literal) => {
                if let Some(first) = literal.elements.first() {
                    let element = self.scope.expr_type(first);
                    self.check_elements(&literal.elements[1..], &element);
                }
            }
            _ => {}
        }
        walk_expr(self, expr)
    }
}
