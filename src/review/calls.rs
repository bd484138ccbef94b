use super::{MethodScope, ReviewError, ReviewPass, Reporter};
use crate::ast::*;
use crate::consts::LENGTH;
use crate::symtab::{is_assignable, MethodSignature, SymbolTable, Type};

/// Call targets must exist locally or plausibly live in an imported class.
///
/// Import plausibility is a name heuristic, not type resolution: a bare
/// receiver whose name matches an import is treated as a static reference to
/// that class even if it is really a shadowed variable of another type.
pub struct CallReview;

impl ReviewPass for CallReview {
    fn name(&self) -> &'static str {
        "calls"
    }

    fn review(&self, program: &Program, table: &SymbolTable, reporter: &mut Reporter) {
        let Some(class) = &program.class else { return };
        for method in &class.methods {
            let mut visitor = CallVisitor { scope: MethodScope::new(table, method), reporter: &mut *reporter };
            for stmt in &method.body {
                visitor.visit_stmt(stmt);
            }
        }
    }
}

struct CallVisitor<'a, 'r> {
    scope: MethodScope<'a>,
    reporter: &'r mut Reporter,
}

impl CallVisitor<'_, '_> {
    fn check_call(&mut self, call: &MethodCallExpr) {
        let table = self.scope.table;
        let receiver_type = match &call.target {
            None => Type::class(table.class_name()),
            Some(target) => self.scope.expr_type(target),
        };
        let on_own_class = receiver_type.name == table.class_name() && !receiver_type.is_array;

        if let Some(signature) = table.method(&call.name).filter(|_| on_own_class) {
            if call.target.is_none() && self.scope.method.is_static && !signature.is_static {
                self.reporter.report(
                    call.span,
                    ReviewError::InstanceCallInStaticMethod {
                        callee: call.name.clone(),
                        method: self.scope.name().to_string(),
                    },
                );
            }
            self.check_arguments(call, signature);
            return;
        }
        if call.name == LENGTH {
            return;
        }
        if let Some(target) = &call.target {
            if let Expr::Identifier(id) = target.as_ref() {
                if self.scope.lookup(&id.name).is_none() && table.is_import(&id.name) {
                    return;
                }
            }
        }
        if table.is_import(&receiver_type.name) {
            return;
        }
        if on_own_class && table.superclass().map(|s| table.is_import(s)).unwrap_or(false) {
            // inherited from an imported parent
            return;
        }
        if receiver_type.is_any() {
            // the receiver itself is unresolved; reported by the reference pass
            return;
        }
        self.reporter.report(call.span, ReviewError::UndeclaredMethod(call.name.clone()));
    }

    fn check_arguments(&mut self, call: &MethodCallExpr, signature: &MethodSignature) {
        let params = &signature.parameters;
        let args = &call.arguments;

        let arity_ok = if signature.is_varargs {
            args.len() + 1 >= params.len()
        } else {
            args.len() == params.len()
        };
        if !arity_ok {
            let expected = if signature.is_varargs {
                format!("at least {}", params.len() - 1)
            } else {
                params.len().to_string()
            };
            self.reporter.report(
                call.span,
                ReviewError::ArgumentCountMismatch { name: call.name.clone(), expected, found: args.len() },
            );
            return;
        }

        let fixed = if signature.is_varargs { params.len() - 1 } else { params.len() };
        for (position, (arg, param)) in args.iter().zip(params).take(fixed).enumerate() {
            self.check_argument(call, position, arg, &param.ty);
        }
        if !signature.is_varargs {
            return;
        }

        let varargs_type = &params[fixed].ty;
        let trailing = &args[fixed..];
        // an explicit array in the varargs position is passed through as-is
        if trailing.len() == 1 {
            let found = self.scope.expr_type(&trailing[0]);
            if found.is_array && is_assignable(varargs_type, &found) {
                return;
            }
        }
        let element = varargs_type.element_type();
        for (offset, arg) in trailing.iter().enumerate() {
            self.check_argument(call, fixed + offset, arg, &element);
        }
    }

    fn check_argument(&mut self, call: &MethodCallExpr, position: usize, arg: &Expr, expected: &Type) {
        let found = self.scope.expr_type(arg);
        if !is_assignable(expected, &found) {
            self.reporter.report(
                arg.span(),
                ReviewError::IncompatibleArgument {
                    name: call.name.clone(),
                    position: position + 1,
                    expected: expected.to_string(),
                    found: found.to_string(),
                },
            );
        }
    }
}

impl<'ast> Visitor<'ast> for CallVisitor<'_, '_> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let Expr::MethodCall(call) = expr {
            self.check_call(call);
        }
        walk_expr(self, expr)
    }
}
