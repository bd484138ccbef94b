//! Constant folding over the AST
//!
//! Collapses parenthesized literals, `!` on a literal and binary operators
//! whose operands are both literals. Integer arithmetic wraps like the JVM's;
//! division by a literal zero is left alone so the program still traps at run
//! time.

use crate::ast::*;

use super::for_each_expr_mut;

/// Evaluate `op` over two literals, `None` when the combination does not fold
pub fn fold_binary(op: BinaryOp, left: Literal, right: Literal) -> Option<Literal> {
    use BinaryOp::*;
    use Literal::{Boolean, Integer};

    match (left, right) {
        (Integer(l), Integer(r)) => match op {
            Add => Some(Integer(l.wrapping_add(r))),
            Sub => Some(Integer(l.wrapping_sub(r))),
            Mul => Some(Integer(l.wrapping_mul(r))),
            Div if r == 0 => None,
            Div => Some(Integer(l.wrapping_div(r))),
            Lt => Some(Boolean(l < r)),
            Le => Some(Boolean(l <= r)),
            Gt => Some(Boolean(l > r)),
            Ge => Some(Boolean(l >= r)),
            Eq => Some(Boolean(l == r)),
            Ne => Some(Boolean(l != r)),
            And | Or => None,
        },
        (Boolean(l), Boolean(r)) => match op {
            And => Some(Boolean(l && r)),
            Or => Some(Boolean(l || r)),
            Eq => Some(Boolean(l == r)),
            Ne => Some(Boolean(l != r)),
            _ => None,
        },
        _ => None,
    }
}

pub fn fold_unary(op: UnaryOp, operand: Literal) -> Option<Literal> {
    match (op, operand) {
        (UnaryOp::Not, Literal::Boolean(v)) => Some(Literal::Boolean(!v)),
        (UnaryOp::Not, Literal::Integer(_)) => None,
    }
}

/// Value of `expr` if it is built only from literals, without rewriting it
pub fn constant_value(expr: &Expr) -> Option<Literal> {
    match expr {
        Expr::Literal(lit) => Some(lit.value),
        Expr::Parenthesized(p) => constant_value(&p.inner),
        Expr::Unary(u) => fold_unary(u.op, constant_value(&u.operand)?),
        Expr::Binary(b) => fold_binary(b.op, constant_value(&b.left)?, constant_value(&b.right)?),
        _ => None,
    }
}

/// Fold every reducible subexpression of `expr` bottom-up; true if anything changed
pub fn fold_expr(expr: &mut Expr) -> bool {
    let mut changed = match expr {
        Expr::Literal(_) | Expr::This(_) | Expr::Identifier(_) | Expr::New(_) => false,
        Expr::Parenthesized(p) => fold_expr(&mut p.inner),
        Expr::Unary(u) => fold_expr(&mut u.operand),
        Expr::Binary(b) => {
            let left = fold_expr(&mut b.left);
            let right = fold_expr(&mut b.right);
            left || right
        }
        Expr::ArrayAccess(a) => {
            let array = fold_expr(&mut a.array);
            let index = fold_expr(&mut a.index);
            array || index
        }
        Expr::Length(l) => fold_expr(&mut l.target),
        Expr::MethodCall(call) => {
            let mut changed = call.target.as_mut().map(|t| fold_expr(t)).unwrap_or(false);
            for arg in &mut call.arguments {
                changed |= fold_expr(arg);
            }
            changed
        }
        Expr::NewArray(n) => fold_expr(&mut n.size),
        Expr::ArrayLiteral(a) => {
            let mut changed = false;
            for element in &mut a.elements {
                changed |= fold_expr(element);
            }
            changed
        }
    };

    let folded = match expr {
        Expr::Parenthesized(p) => p.inner.as_literal(),
        Expr::Unary(u) => u.operand.as_literal().and_then(|v| fold_unary(u.op, v)),
        Expr::Binary(b) => match (b.left.as_literal(), b.right.as_literal()) {
            (Some(l), Some(r)) => fold_binary(b.op, l, r),
            _ => None,
        },
        _ => None,
    };
    if let Some(value) = folded {
        *expr = Expr::Literal(LiteralExpr { value, span: expr.span() });
        changed = true;
    }
    changed
}

/// One folding sweep over every method body
pub fn fold_program(program: &mut Program) -> bool {
    let Some(class) = program.class.as_mut() else { return false };
    let mut changed = false;
    for method in &mut class.methods {
        for stmt in &mut method.body {
            changed |= for_each_expr_mut(stmt, &mut fold_expr);
        }
    }
    changed
}
