use crate::ast::*;
use crate::diagnostics::{Diagnostic, Stage};
use crate::symtab::{SymbolTable, Type, TypeResolver, VarKind};

mod declarations;
mod references;
mod calls;
mod typing;
mod returns;

pub use calls::CallReview;
pub use declarations::DeclarationReview;
pub use references::ReferenceReview;
pub use returns::ReturnReview;
pub use typing::TypingReview;

/// Message catalog for every semantic rule the reviewer enforces
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("Duplicate import: {0}")]
    DuplicateImport(String),
    #[error("Duplicate field '{0}'")]
    DuplicateField(String),
    #[error("Duplicate method '{0}'")]
    DuplicateMethod(String),
    #[error("Duplicate variable '{name}' in method '{method}'")]
    DuplicateVariable { method: String, name: String },
    #[error("method '{0}' declares more than one varargs parameter")]
    MultipleVarargs(String),
    #[error("varargs parameter '{param}' of method '{method}' must be the last parameter")]
    VarargsNotLast { method: String, param: String },
    #[error("varargs type is not allowed on {kind} '{name}'")]
    VarargsNotAllowed { kind: &'static str, name: String },
    #[error("{kind} '{name}' cannot have type void")]
    VoidVariable { kind: &'static str, name: String },
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("method main must be declared 'static void main(String[])'")]
    InvalidMainSignature,
    #[error("undeclared variable '{0}'")]
    UndeclaredVariable(String),
    #[error("cannot access instance field '{field}' from static method '{method}'")]
    FieldInStaticMethod { field: String, method: String },
    #[error("cannot call instance method '{callee}' from static method '{method}'")]
    InstanceCallInStaticMethod { callee: String, method: String },
    #[error("cannot use 'this' in static method '{0}'")]
    ThisInStaticMethod(String),
    #[error("unknown class '{0}'")]
    UnknownClass(String),
    #[error("undeclared method '{0}'")]
    UndeclaredMethod(String),
    #[error("method call '{name}' expects {expected} argument(s); found {found}")]
    ArgumentCountMismatch { name: String, expected: String, found: usize },
    #[error("argument {position} of '{name}' expects {expected}; found {found}")]
    IncompatibleArgument { name: String, position: usize, expected: String, found: String },
    #[error("condition must be boolean; found {0}")]
    NonBooleanCondition(String),
    #[error("incompatible operand types for '{op}': {left} and {right}")]
    IncompatibleOperands { op: String, left: String, right: String },
    #[error("operator '{op}' expects {expected} operands; found {found}")]
    InvalidOperand { op: String, expected: String, found: String },
    #[error("cannot index a value of type {0}")]
    IndexOnNonArray(String),
    #[error("array index must be int; found {0}")]
    NonIntegerIndex(String),
    #[error("array size must be int; found {0}")]
    NonIntegerSize(String),
    #[error("'length' requires an array; found {0}")]
    LengthOnNonArray(String),
    #[error("array element of type {found} is not assignable to {expected}")]
    IncompatibleArrayElement { expected: String, found: String },
    #[error("cannot assign {found} to '{target}' of type {expected}")]
    IncompatibleAssignment { target: String, expected: String, found: String },
    #[error("method '{0}' is missing a return statement on some path")]
    MissingReturn(String),
    #[error("unreachable statement")]
    UnreachableStatement,
    #[error("method '{method}' returns {expected}; found {found}")]
    ReturnTypeMismatch { method: String, expected: String, found: String },
    #[error("method '{0}' must return a value")]
    MissingReturnValue(String),
    #[error("void method '{0}' cannot return a value")]
    UnexpectedReturnValue(String),
}

/// Collects diagnostics for one review run
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, span: Span, error: ReviewError) {
        log::trace!("review: {} at {}:{}", error, span.start.line, span.start.column);
        self.diagnostics.push(Diagnostic::error(Stage::Semantic, span, error.to_string()));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// One independent semantic check over the whole program
pub trait ReviewPass {
    fn name(&self) -> &'static str;

    fn review(&self, program: &Program, table: &SymbolTable, reporter: &mut Reporter);
}

/// The full battery, in the order diagnostics are usually read
pub fn default_passes() -> Vec<Box<dyn ReviewPass>> {
    vec![
        Box::new(DeclarationReview),
        Box::new(ReferenceReview),
        Box::new(CallReview),
        Box::new(TypingReview),
        Box::new(ReturnReview),
    ]
}

/// AST-level review before IR generation; never mutates the tree
pub fn review(program: &Program, table: &SymbolTable) -> Vec<Diagnostic> {
    log::debug!("review start: class={} imports={}", table.class_name(), program.imports.len());
    let mut reporter = Reporter::new();
    for pass in default_passes() {
        let before = reporter.diagnostics().len();
        pass.review(program, table, &mut reporter);
        log::debug!("review pass '{}': {} diagnostic(s)", pass.name(), reporter.diagnostics().len() - before);
    }
    log::debug!("review end: {} diagnostic(s)", reporter.diagnostics().len());
    reporter.into_diagnostics()
}

/// Name resolution inside one method body, shared by the passes
pub(crate) struct MethodScope<'a> {
    pub table: &'a SymbolTable,
    pub method: &'a MethodDecl,
}

impl<'a> MethodScope<'a> {
    pub fn new(table: &'a SymbolTable, method: &'a MethodDecl) -> Self {
        Self { table, method }
    }

    pub fn name(&self) -> &'a str {
        &self.method.name
    }

    pub fn lookup(&self, name: &str) -> Option<VarKind> {
        self.table.lookup_variable(name, &self.method.name).map(|(kind, _)| kind)
    }

    pub fn expr_type(&self, expr: &Expr) -> Type {
        TypeResolver::new(self.table).expr_type(expr, Some(&self.method.name))
    }

    /// Type of an assignment destination, resolved local-first
    pub fn target_type(&self, target: &AssignTarget) -> Type {
        match target {
            AssignTarget::Variable(id) => self
                .table
                .lookup_variable(&id.name, &self.method.name)
                .map(|(_, symbol)| symbol.ty.clone())
                .unwrap_or_else(Type::any),
            AssignTarget::Element(access) => {
                let array = self.expr_type(&access.array);
                if array.is_any() {
                    array
                } else {
                    array.element_type()
                }
            }
        }
    }

    /// Class names the program may mention: itself, its parent and imports
    pub fn is_known_class(&self, name: &str) -> bool {
        name == self.table.class_name()
            || self.table.superclass() == Some(name)
            || self.table.is_import(name)
    }
}

/// `found` is exactly `expected`, or the permissive `any`
pub(crate) fn conforms(found: &Type, expected: &Type) -> bool {
    found.is_any() || found == expected
}
