//! Java-- compiler back end (jmmc)
//!
//! Takes the typed AST of a single-class Java-- program and produces a
//! three-address IR and Jasmin assembly for the JVM.
//!
//! ## Architecture
//!
//! - **ast**: typed tree, visitor, printer and builder helpers
//! - **symtab**: per-class symbol table and expression typing
//! - **review**: semantic validation passes producing diagnostics
//! - **optimize**: AST constant propagation/folding, varargs normalization,
//!   IR liveness and register allocation
//! - **ir**: three-address IR, its generator and textual form
//! - **codegen**: Jasmin emission
//!
//! ## Compilation Flow
//!
//! ```text
//! AST → Symbol Table → Review → AST Optimizer → IR Generator → Register Allocation → Jasmin
//!                        ↓
//!                  diagnostics (errors stop here)
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod consts;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod optimize;
pub mod review;
pub mod symtab;

pub use config::Config;
pub use diagnostics::{Diagnostic, Severity, Stage};
pub use error::{Error, Result};

use ast::Program;
use ir::IrProgram;
use symtab::SymbolTable;

/// Everything a successful compilation produces
#[derive(Debug, Clone)]
pub struct Compilation {
    pub ir: IrProgram,
    pub ir_text: String,
    pub assembly: String,
    /// Non-fatal diagnostics, e.g. a register budget the allocator could not meet
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the symbol table and run every review pass
pub fn check(program: &Program) -> Result<(SymbolTable, Vec<Diagnostic>)> {
    let table = SymbolTable::build(program)?;
    let diagnostics = review::review(program, &table);
    log::debug!("review produced {} diagnostic(s)", diagnostics.len());
    Ok((table, diagnostics))
}

/// Compile a program down to IR (allocated when a budget is configured)
pub fn compile_to_ir(program: Program, config: &Config) -> Result<(IrProgram, Vec<Diagnostic>)> {
    let (table, mut diagnostics) = check(&program)?;
    if diagnostics::has_errors(&diagnostics) {
        return Err(Error::Rejected(diagnostics));
    }

    let program = optimize::optimize_ast(program, &table, config);
    let mut ir = ir::generate(&program, &table)?;

    if let Some(budget) = config.register_budget {
        let allocation = optimize::allocate_registers(&mut ir, budget)?;
        if !allocation.is_empty() {
            log::debug!("register allocation reported {} diagnostic(s)", allocation.len());
        }
        diagnostics.extend(allocation);
    }
    Ok((ir, diagnostics))
}

/// Run the whole pipeline: review, optimize, lower and emit
pub fn compile(program: Program, config: &Config) -> Result<Compilation> {
    let (ir, diagnostics) = compile_to_ir(program, config)?;
    let ir_text = ir.to_string();
    let assembly = codegen::emit(&ir)?;
    log::debug!("compiled '{}' ({} bytes of assembly)", ir.class_name, assembly.len());
    Ok(Compilation { ir, ir_text, assembly, diagnostics })
}
