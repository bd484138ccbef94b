//! Programmatic AST construction
//!
//! Parsing lives outside this crate; drivers and tests that need a tree
//! without source text build one with these helpers. Nodes get default spans
//! unless a positioned variant is used.

use super::*;

pub fn int(value: i32) -> Expr {
    Expr::Literal(LiteralExpr { value: Literal::Integer(value), span: Span::default() })
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal(LiteralExpr { value: Literal::Boolean(value), span: Span::default() })
}

pub fn this() -> Expr {
    Expr::This(Span::default())
}

pub fn ident(name: &str) -> Expr {
    ident_at(name, 0, 0)
}

pub fn ident_at(name: &str, line: usize, column: usize) -> Expr {
    Expr::Identifier(IdentifierExpr { name: name.to_string(), span: Span::at(line, column) })
}

pub fn paren(inner: Expr) -> Expr {
    Expr::Parenthesized(ParenExpr { inner: Box::new(inner), span: Span::default() })
}

pub fn not(operand: Expr) -> Expr {
    Expr::Unary(UnaryExpr { op: UnaryOp::Not, operand: Box::new(operand), span: Span::default() })
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr { op, left: Box::new(left), right: Box::new(right), span: Span::default() })
}

pub fn index(array: Expr, index: Expr) -> Expr {
    Expr::ArrayAccess(ArrayAccessExpr { array: Box::new(array), index: Box::new(index), span: Span::default() })
}

pub fn length(target: Expr) -> Expr {
    Expr::Length(LengthExpr { target: Box::new(target), span: Span::default() })
}

/// `target.name(args)`
pub fn call(target: Expr, name: &str, arguments: Vec<Expr>) -> Expr {
    Expr::MethodCall(MethodCallExpr {
        target: Some(Box::new(target)),
        name: name.to_string(),
        arguments,
        span: Span::default(),
    })
}

/// `name(args)` on the implicit receiver
pub fn call_local(name: &str, arguments: Vec<Expr>) -> Expr {
    Expr::MethodCall(MethodCallExpr { target: None, name: name.to_string(), arguments, span: Span::default() })
}

pub fn new_object(class_name: &str) -> Expr {
    Expr::New(NewExpr { class_name: class_name.to_string(), span: Span::default() })
}

pub fn new_int_array(size: Expr) -> Expr {
    Expr::NewArray(NewArrayExpr {
        element_type: crate::consts::INT.to_string(),
        size: Box::new(size),
        span: Span::default(),
    })
}

pub fn array_literal(elements: Vec<Expr>) -> Expr {
    Expr::ArrayLiteral(ArrayLiteralExpr { elements, span: Span::default() })
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: AssignTarget::Variable(IdentifierExpr { name: name.to_string(), span: Span::default() }),
        value,
        span: Span::default(),
    })
}

pub fn assign_element(array: Expr, index: Expr, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: AssignTarget::Element(ArrayAccessExpr {
            array: Box::new(array),
            index: Box::new(index),
            span: Span::default(),
        }),
        value,
        span: Span::default(),
    })
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt { expr, span: Span::default() })
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(ReturnStmt { value: Some(value), span: Span::default() })
}

pub fn ret_void() -> Stmt {
    Stmt::Return(ReturnStmt { value: None, span: Span::default() })
}

pub fn block(statements: Vec<Stmt>) -> Stmt {
    Stmt::Block(Block { statements, span: Span::default() })
}

pub fn if_then(condition: Expr, then_branch: Vec<Stmt>) -> Stmt {
    Stmt::If(IfStmt {
        condition,
        then_branch: Box::new(block(then_branch)),
        else_branch: None,
        span: Span::default(),
    })
}

pub fn if_else(condition: Expr, then_branch: Vec<Stmt>, else_branch: Vec<Stmt>) -> Stmt {
    Stmt::If(IfStmt {
        condition,
        then_branch: Box::new(block(then_branch)),
        else_branch: Some(Box::new(block(else_branch))),
        span: Span::default(),
    })
}

pub fn while_loop(condition: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While(WhileStmt { condition, body: Box::new(block(body)), span: Span::default() })
}

/// Move a statement to a source position
pub fn at(mut stmt: Stmt, line: usize, column: usize) -> Stmt {
    let span = Span::at(line, column);
    match &mut stmt {
        Stmt::Block(s) => s.span = span,
        Stmt::If(s) => s.span = span,
        Stmt::While(s) => s.span = span,
        Stmt::Expr(s) => s.span = span,
        Stmt::Assign(s) => s.span = span,
        Stmt::Return(s) => s.span = span,
    }
    stmt
}

pub fn ty(name: &str) -> TypeRef {
    TypeRef { name: name.to_string(), is_array: false, is_varargs: false, span: Span::default() }
}

pub fn array_ty(name: &str) -> TypeRef {
    TypeRef { is_array: true, ..ty(name) }
}

pub fn varargs_ty(name: &str) -> TypeRef {
    TypeRef { is_array: true, is_varargs: true, ..ty(name) }
}

pub fn var(type_ref: TypeRef, name: &str) -> VarDecl {
    VarDecl { type_ref, name: name.to_string(), span: Span::default() }
}

/// `import a.b.C;` from its dotted path
pub fn import(path: &str) -> ImportDecl {
    ImportDecl { path: path.split('.').map(str::to_string).collect(), span: Span::default() }
}

pub fn program(imports: &[&str], class: ClassDecl) -> Program {
    Program::new(imports.iter().map(|p| import(p)).collect(), Some(class))
}

/// Fluent builder for a method; public and non-static by default
pub struct MethodBuilder {
    decl: MethodDecl,
}

impl MethodBuilder {
    pub fn new(name: &str, return_type: TypeRef) -> Self {
        Self {
            decl: MethodDecl {
                name: name.to_string(),
                is_public: true,
                is_static: false,
                return_type,
                parameters: Vec::new(),
                locals: Vec::new(),
                body: Vec::new(),
                span: Span::default(),
            },
        }
    }

    /// `public static void main(String[] args)` with the given body
    pub fn main(body: Vec<Stmt>) -> Self {
        Self::new(crate::consts::MAIN, ty(crate::consts::VOID))
            .make_static()
            .param(array_ty(crate::consts::STRING), "args")
            .body(body)
    }

    pub fn make_static(mut self) -> Self {
        self.decl.is_static = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.decl.is_public = false;
        self
    }

    pub fn param(mut self, type_ref: TypeRef, name: &str) -> Self {
        self.decl.parameters.push(var(type_ref, name));
        self
    }

    pub fn local(mut self, type_ref: TypeRef, name: &str) -> Self {
        self.decl.locals.push(var(type_ref, name));
        self
    }

    pub fn body(mut self, statements: Vec<Stmt>) -> Self {
        self.decl.body = statements;
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.decl.span = Span::at(line, column);
        self
    }

    pub fn build(self) -> MethodDecl {
        self.decl
    }
}

/// Fluent builder for the class declaration
pub struct ClassBuilder {
    decl: ClassDecl,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            decl: ClassDecl {
                name: name.to_string(),
                extends: None,
                fields: Vec::new(),
                methods: Vec::new(),
                span: Span::default(),
            },
        }
    }

    pub fn extends(mut self, parent: &str) -> Self {
        self.decl.extends = Some(parent.to_string());
        self
    }

    pub fn field(mut self, type_ref: TypeRef, name: &str) -> Self {
        self.decl.fields.push(var(type_ref, name));
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.decl.methods.push(method.build());
        self
    }

    pub fn build(self) -> ClassDecl {
        self.decl
    }
}
