//! Constant propagation over method bodies
//!
//! Bindings map local/parameter names to the int or boolean literal they were
//! last assigned on the current straight-line path. A branch works on a copy of
//! the bindings; names a branch assigns are dropped once control merges. Names
//! assigned anywhere in a loop body are dropped before the loop, since the
//! back edge may reach any use with a different value.

use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::symtab::SymbolTable;

use super::const_fold::constant_value;

type Bindings = HashMap<String, Literal>;

pub struct ConstantPropagator<'a> {
    table: &'a SymbolTable,
}

impl<'a> ConstantPropagator<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// One propagation sweep over every method; true if any use was replaced
    pub fn run(&self, program: &mut Program) -> bool {
        let Some(class) = program.class.as_mut() else { return false };
        let mut changed = false;
        for method in &mut class.methods {
            let tracked: HashSet<String> = self
                .table
                .parameters(&method.name)
                .iter()
                .chain(self.table.locals(&method.name))
                .filter(|symbol| symbol.ty.is_primitive())
                .map(|symbol| symbol.name.clone())
                .collect();
            let mut scope = MethodPropagation { tracked, changed: false };
            let mut bindings = Bindings::new();
            scope.statements(&mut method.body, &mut bindings);
            changed |= scope.changed;
        }
        changed
    }
}

struct MethodPropagation {
    /// Names eligible for binding: primitive locals and parameters
    tracked: HashSet<String>,
    changed: bool,
}

impl MethodPropagation {
    fn statements(&mut self, statements: &mut [Stmt], bindings: &mut Bindings) {
        for stmt in statements {
            self.statement(stmt, bindings);
        }
    }

    fn statement(&mut self, stmt: &mut Stmt, bindings: &mut Bindings) {
        match stmt {
            Stmt::Block(block) => self.statements(&mut block.statements, bindings),
            Stmt::Expr(s) => self.substitute(&mut s.expr, bindings),
            Stmt::Return(s) => {
                if let Some(value) = s.value.as_mut() {
                    self.substitute(value, bindings);
                }
            }
            Stmt::Assign(s) => {
                self.substitute(&mut s.value, bindings);
                match &mut s.target {
                    AssignTarget::Variable(id) => {
                        match constant_value(&s.value) {
                            Some(value) if self.tracked.contains(&id.name) => {
                                bindings.insert(id.name.clone(), value);
                            }
                            _ => {
                                bindings.remove(&id.name);
                            }
                        }
                    }
                    AssignTarget::Element(access) => {
                        self.substitute(&mut access.array, bindings);
                        self.substitute(&mut access.index, bindings);
                    }
                }
            }
            Stmt::If(s) => {
                self.substitute(&mut s.condition, bindings);
                let mut reassigned = assigned_names(&s.then_branch);

                let mut then_bindings = bindings.clone();
                self.statement(&mut s.then_branch, &mut then_bindings);
                if let Some(else_branch) = s.else_branch.as_mut() {
                    reassigned.extend(assigned_names(else_branch));
                    let mut else_bindings = bindings.clone();
                    self.statement(else_branch, &mut else_bindings);
                }
                for name in reassigned {
                    bindings.remove(&name);
                }
            }
            Stmt::While(s) => {
                for name in assigned_names(&s.body) {
                    bindings.remove(&name);
                }
                self.substitute(&mut s.condition, bindings);
                let mut body_bindings = bindings.clone();
                self.statement(&mut s.body, &mut body_bindings);
            }
        }
    }

    /// Replace every bound identifier inside `expr` by its literal
    fn substitute(&mut self, expr: &mut Expr, bindings: &Bindings) {
        if let Expr::Identifier(id) = expr {
            if let Some(value) = bindings.get(&id.name) {
                log::trace!("propagating {} = {}", id.name, value);
                *expr = Expr::Literal(LiteralExpr { value: *value, span: id.span });
                self.changed = true;
            }
            return;
        }
        match expr {
            Expr::Literal(_) | Expr::This(_) | Expr::Identifier(_) | Expr::New(_) => {}
            Expr::Parenthesized(p) => self.substitute(&mut p.inner, bindings),
            Expr::Unary(u) => self.substitute(&mut u.operand, bindings),
            Expr::Binary(b) => {
                self.substitute(&mut b.left, bindings);
                self.substitute(&mut b.right, bindings);
            }
            Expr::ArrayAccess(a) => {
                self.substitute(&mut a.array, bindings);
                self.substitute(&mut a.index, bindings);
            }
            Expr::Length(l) => self.substitute(&mut l.target, bindings),
            Expr::MethodCall(call) => {
                if let Some(target) = call.target.as_mut() {
                    self.substitute(target, bindings);
                }
                for arg in &mut call.arguments {
                    self.substitute(arg, bindings);
                }
            }
            Expr::NewArray(n) => self.substitute(&mut n.size, bindings),
            Expr::ArrayLiteral(a) => {
                for element in &mut a.elements {
                    self.substitute(element, bindings);
                }
            }
        }
    }
}
