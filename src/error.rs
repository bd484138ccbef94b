use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// Result type for jmmc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the jmmc compiler
#[derive(Error, Debug)]
pub enum Error {
    /// The input tree is missing something every later stage relies on.
    #[error("Structural error: {message}")]
    Structural { message: String },

    /// Semantic review produced at least one error-level diagnostic.
    #[error("semantic review rejected the program with {} error(s)", .0.len())]
    Rejected(Vec<Diagnostic>),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A compiler bug: some stage produced a shape a later stage cannot handle.
    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Diagnostics carried by a rejected compilation, empty otherwise
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Rejected(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}
