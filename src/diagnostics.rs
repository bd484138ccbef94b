//! Positioned compiler diagnostics
//!
//! Every stage that can complain about user input (semantic review, register
//! allocation) appends `Diagnostic`s to a per-compilation list. Order carries
//! no meaning; callers that need a stable order should sort by position.

use std::fmt;

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Compilation stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Semantic,
    Optimization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Semantic => write!(f, "semantic"),
            Stage::Optimization => write!(f, "optimization"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn error(stage: Stage, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, stage, span, message.into())
    }

    /// Reported without failing the compilation
    pub fn warning(stage: Stage, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, stage, span, message.into())
    }

    fn new(severity: Severity, stage: Stage, span: Span, message: String) -> Self {
        Self { severity, stage, line: span.start.line, column: span.start.column, message }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}:{}: {}",
            self.severity, self.stage, self.line, self.column, self.message
        )
    }
}

/// True when any diagnostic in the list is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
