use super::Span;
use std::fmt;

// Imports
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Dotted path segments, e.g. `["java", "io", "PrintStream"]`
    pub path: Vec<String>,
    pub span: Span,
}

impl ImportDecl {
    /// Last path segment, the name the class is referred to by
    pub fn simple_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    pub fn qualified_name(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import {};", self.qualified_name())
    }
}

// Type Declarations
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub extends: Option<String>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

impl ClassDecl {
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for ClassDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)?;
        if let Some(parent) = &self.extends {
            write!(f, " extends {}", parent)?;
        }
        Ok(())
    }
}

// Type References
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: String,
    pub is_array: bool,
    /// `int...` parameter; always implies `is_array`
    pub is_varargs: bool,
    pub span: Span,
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_varargs {
            write!(f, "...")
        } else if self.is_array {
            write!(f, "[]")
        } else {
            Ok(())
        }
    }
}

/// Field, parameter or local variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub type_ref: TypeRef,
    pub name: String,
    pub span: Span,
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_ref, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub return_type: TypeRef,
    pub parameters: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_void(&self) -> bool {
        self.return_type.name == crate::consts::VOID && !self.return_type.is_array
    }

    pub fn is_varargs(&self) -> bool {
        self.parameters.last().map(|p| p.type_ref.is_varargs).unwrap_or(false)
    }
}

// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Expr(ExprStmt),
    Assign(AssignStmt),
    Return(ReturnStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Return(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Variable(IdentifierExpr),
    Element(ArrayAccessExpr),
}

impl AssignTarget {
    pub fn span(&self) -> Span {
        match self {
            AssignTarget::Variable(id) => id.span,
            AssignTarget::Element(access) => access.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    This(Span),
    Identifier(IdentifierExpr),
    Parenthesized(ParenExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    ArrayAccess(ArrayAccessExpr),
    Length(LengthExpr),
    MethodCall(MethodCallExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    ArrayLiteral(ArrayLiteralExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::This(span) => *span,
            Expr::Identifier(e) => e.span,
            Expr::Parenthesized(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::ArrayAccess(e) => e.span,
            Expr::Length(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::New(e) => e.span,
            Expr::NewArray(e) => e.span,
            Expr::ArrayLiteral(e) => e.span,
        }
    }

    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            Expr::Literal(lit) => Some(lit.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Integer(i32),
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Boolean(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    /// Ordering comparisons over ints
    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// True when the operator produces a boolean
    pub fn yields_boolean(self) -> bool {
        !self.is_arithmetic()
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LengthExpr {
    pub target: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallExpr {
    /// `None` for an unqualified call on the implicit receiver
    pub target: Option<Box<Expr>>,
    pub name: String,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub class_name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpr {
    pub element_type: String,
    pub size: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteralExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}
