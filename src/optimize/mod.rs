//! Optimization passes
//!
//! - AST level, before IR generation: varargs call normalization (always) and
//!   constant propagation/folding (when `Config::optimize` is set)
//! - IR level, after IR generation: liveness analysis and graph-coloring
//!   register allocation (when a register budget is configured)
//!
//! AST passes take the tree by value and hand back the rewritten tree.

pub mod const_fold;
pub mod const_prop;
pub mod varargs;
pub mod liveness;
pub mod register_alloc;

use crate::ast::*;
use crate::config::Config;
use crate::consts::OPTIMIZER_MAX_PASSES;
use crate::symtab::SymbolTable;

pub use const_prop::ConstantPropagator;
pub use register_alloc::{allocate_registers, RegisterAllocator};
pub use varargs::VarargsNormalizer;

/// Run the pre-IR passes the configuration asks for
pub fn optimize_ast(program: Program, table: &SymbolTable, config: &Config) -> Program {
    let program = if config.optimize { fold_and_propagate(program, table) } else { program };
    normalize_varargs(program, table)
}

/// Alternate propagation and folding until neither changes the tree
pub fn fold_and_propagate(mut program: Program, table: &SymbolTable) -> Program {
    let propagator = ConstantPropagator::new(table);
    for round in 0..OPTIMIZER_MAX_PASSES {
        let propagated = propagator.run(&mut program);
        let folded = const_fold::fold_program(&mut program);
        log::trace!("constant round {}: propagated={} folded={}", round, propagated, folded);
        if !propagated && !folded {
            log::debug!("constant propagation/folding reached a fixed point after {} round(s)", round + 1);
            return program;
        }
    }
    log::warn!("constant propagation/folding stopped at the pass cap");
    program
}

pub fn normalize_varargs(mut program: Program, table: &SymbolTable) -> Program {
    let rewritten = VarargsNormalizer::new(table).run(&mut program);
    log::debug!("varargs normalization rewrote {} call(s)", rewritten);
    program
}

/// Apply `f` to every top-level expression slot of `stmt` and of its nested
/// statements; `f` is responsible for descending into subexpressions
pub(crate) fn for_each_expr_mut<F>(stmt: &mut Stmt, f: &mut F) -> bool
where
    F: FnMut(&mut Expr) -> bool,
{
    match stmt {
        Stmt::Block(block) => {
            let mut changed = false;
            for inner in &mut block.statements {
                changed |= for_each_expr_mut(inner, f);
            }
            changed
        }
        Stmt::If(s) => {
            let mut changed = f(&mut s.condition);
            changed |= for_each_expr_mut(&mut s.then_branch, f);
            if let Some(else_branch) = s.else_branch.as_mut() {
                changed |= for_each_expr_mut(else_branch, f);
            }
            changed
        }
        Stmt::While(s) => {
            let changed = f(&mut s.condition);
            for_each_expr_mut(&mut s.body, f) || changed
        }
        Stmt::Expr(s) => f(&mut s.expr),
        Stmt::Assign(s) => {
            let mut changed = false;
            if let AssignTarget::Element(access) = &mut s.target {
                changed |= f(&mut access.array);
                changed |= f(&mut access.index);
            }
            f(&mut s.value) || changed
        }
        Stmt::Return(s) => s.value.as_mut().map(|v| f(v)).unwrap_or(false),
    }
}
