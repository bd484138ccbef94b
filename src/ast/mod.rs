//! Abstract Syntax Tree (AST) representation for Java--
//!
//! The tree is produced by an external parser (or by [`builder`]) and is the
//! input of every later stage. Nodes are plain owned data: statements and
//! expressions are closed enums, so every pass matches them exhaustively.

mod nodes;
mod visitor;
mod printer;
pub mod builder;

pub use nodes::*;
pub use visitor::*;
pub use printer::*;

use std::fmt;

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

/// Span of source code (start and end locations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn from_to(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Location::new(start_line, start_col, 0),
            end: Location::new(end_line, end_col, 0),
        }
    }

    /// Zero-width span at a line/column, handy for synthesized nodes
    pub fn at(line: usize, column: usize) -> Self {
        Self::from_to(line, column, line, column)
    }
}

/// Main AST root node: imports plus the (single) class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub imports: Vec<ImportDecl>,
    pub class: Option<ClassDecl>,
    pub span: Span,
}

impl Program {
    pub fn new(imports: Vec<ImportDecl>, class: Option<ClassDecl>) -> Self {
        Self { imports, class, span: Span::default() }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AstPrinter::new().print(self))
    }
}
