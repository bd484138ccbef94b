//! Varargs call normalization
//!
//! A call to a varargs method of the current class passes its trailing
//! arguments as one array literal, so later stages only ever see calls whose
//! argument count matches the parameter count.

use crate::ast::*;
use crate::symtab::{SymbolTable, TypeResolver};

use super::for_each_expr_mut;

pub struct VarargsNormalizer<'a> {
    table: &'a SymbolTable,
    resolver: TypeResolver<'a>,
}

impl<'a> VarargsNormalizer<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table, resolver: TypeResolver::new(table) }
    }

    /// Rewrite every call in the program; returns the number of calls rewritten
    pub fn run(&self, program: &mut Program) -> usize {
        let Some(class) = program.class.as_mut() else { return 0 };
        let mut rewritten = 0;
        for method in &mut class.methods {
            let name = method.name.clone();
            for stmt in &mut method.body {
                for_each_expr_mut(stmt, &mut |expr: &mut Expr| {
                    let count = self.normalize(expr, &name);
                    rewritten += count;
                    count > 0
                });
            }
        }
        rewritten
    }

    fn normalize(&self, expr: &mut Expr, method: &str) -> usize {
        let mut count = match expr {
            Expr::Literal(_) | Expr::This(_) | Expr::Identifier(_) | Expr::New(_) => 0,
            Expr::Parenthesized(p) => self.normalize(&mut p.inner, method),
            Expr::Unary(u) => self.normalize(&mut u.operand, method),
            Expr::Binary(b) => self.normalize(&mut b.left, method) + self.normalize(&mut b.right, method),
            Expr::ArrayAccess(a) => self.normalize(&mut a.array, method) + self.normalize(&mut a.index, method),
            Expr::Length(l) => self.normalize(&mut l.target, method),
            Expr::MethodCall(call) => {
                let mut count = call.target.as_mut().map(|t| self.normalize(t, method)).unwrap_or(0);
                for arg in &mut call.arguments {
                    count += self.normalize(arg, method);
                }
                count
            }
            Expr::NewArray(n) => self.normalize(&mut n.size, method),
            Expr::ArrayLiteral(a) => a.elements.iter_mut().map(|e| self.normalize(e, method)).sum(),
        };
        if let Expr::MethodCall(call) = expr {
            if self.pack_trailing_arguments(call, method) {
                count += 1;
            }
        }
        count
    }

    fn pack_trailing_arguments(&self, call: &mut MethodCallExpr, method: &str) -> bool {
        let on_own_class = match &call.target {
            None => true,
            Some(target) => self.resolver.expr_type(target, Some(method)).name == self.table.class_name(),
        };
        if !on_own_class {
            return false;
        }
        let Some(signature) = self.table.method(&call.name) else { return false };
        if !signature.is_varargs || signature.parameters.is_empty() {
            return false;
        }

        let fixed = signature.parameters.len() - 1;
        if call.arguments.len() < fixed {
            return false;
        }
        if call.arguments.len() == signature.parameters.len() {
            let last = &call.arguments[fixed];
            if matches!(last, Expr::ArrayLiteral(_)) || self.resolver.expr_type(last, Some(method)).is_array {
                return false;
            }
        }

        let trailing: Vec<Expr> = call.arguments.drain(fixed..).collect();
        let span = match (trailing.first(), trailing.last()) {
            (Some(first), Some(last)) => Span::new(first.span().start, last.span().end),
            _ => call.span,
        };
        log::trace!("packing {} trailing argument(s) of call to '{}'", trailing.len(), call.name);
        call.arguments.push(Expr::ArrayLiteral(ArrayLiteralExpr { elements: trailing, span }));
        true
    }
}
