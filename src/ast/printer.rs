use super::nodes::*;
use super::Program;
use std::fmt;

/// AST printer producing Java-like source, mainly for debugging and for
/// comparing trees before and after rewriting passes
pub struct AstPrinter {
    indent_level: usize,
    output: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn print(&mut self, program: &Program) -> String {
        self.output.clear();
        for import in &program.imports {
            self.writeln(&import.to_string());
        }
        if let Some(class) = &program.class {
            self.print_class(class);
        }
        self.output.clone()
    }

    fn indent(&mut self) {
        self.indent_level += 2;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 2 {
            self.indent_level -= 2;
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn print_class(&mut self, class: &ClassDecl) {
        self.writeln(&format!("{} {{", class));
        self.indent();
        for field in &class.fields {
            self.writeln(&format!("{};", field));
        }
        for method in &class.methods {
            self.print_method(method);
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_method(&mut self, method: &MethodDecl) {
        let mut header = String::new();
        if method.is_public {
            header.push_str("public ");
        }
        if method.is_static {
            header.push_str("static ");
        }
        let params: Vec<String> = method.parameters.iter().map(|p| p.to_string()).collect();
        header.push_str(&format!("{} {}({}) {{", method.return_type, method.name, params.join(", ")));
        self.writeln(&header);
        self.indent();
        for local in &method.locals {
            self.writeln(&format!("{};", local));
        }
        for stmt in &method.body {
            self.print_stmt(stmt);
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.writeln("{");
                self.indent();
                for inner in &block.statements {
                    self.print_stmt(inner);
                }
                self.dedent();
                self.writeln("}");
            }
            Stmt::If(s) => {
                self.writeln(&format!("if ({})", s.condition));
                self.print_nested(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.writeln("else");
                    self.print_nested(else_branch);
                }
            }
            Stmt::While(s) => {
                self.writeln(&format!("while ({})", s.condition));
                self.print_nested(&s.body);
            }
            other => self.writeln(&other.to_string()),
        }
    }

    fn print_nested(&mut self, stmt: &Stmt) {
        if matches!(stmt, Stmt::Block(_)) {
            self.print_stmt(stmt);
        } else {
            self.indent();
            self.print_stmt(stmt);
            self.dedent();
        }
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-line rendering of a statement
impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Block(block) => {
                write!(f, "{{")?;
                for inner in &block.statements {
                    write!(f, " {}", inner)?;
                }
                write!(f, " }}")
            }
            Stmt::If(s) => {
                write!(f, "if ({}) {}", s.condition, s.then_branch)?;
                if let Some(else_branch) = &s.else_branch {
                    write!(f, " else {}", else_branch)?;
                }
                Ok(())
            }
            Stmt::While(s) => write!(f, "while ({}) {}", s.condition, s.body),
            Stmt::Expr(s) => write!(f, "{};", s.expr),
            Stmt::Assign(s) => write!(f, "{} = {};", s.target, s.value),
            Stmt::Return(s) => match &s.value {
                Some(value) => write!(f, "return {};", value),
                None => write!(f, "return;"),
            },
        }
    }
}

impl fmt::Display for AssignTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTarget::Variable(id) => write!(f, "{}", id.name),
            AssignTarget::Element(access) => write!(f, "{}[{}]", access.array, access.index),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit.value),
            Expr::This(_) => write!(f, "this"),
            Expr::Identifier(id) => write!(f, "{}", id.name),
            Expr::Parenthesized(p) => write!(f, "({})", p.inner),
            Expr::Unary(u) => match u.op {
                UnaryOp::Not => write!(f, "!{}", u.operand),
            },
            Expr::Binary(b) => write!(f, "{} {} {}", b.left, b.op, b.right),
            Expr::ArrayAccess(a) => write!(f, "{}[{}]", a.array, a.index),
            Expr::Length(l) => write!(f, "{}.length", l.target),
            Expr::MethodCall(call) => {
                if let Some(target) = &call.target {
                    write!(f, "{}.", target)?;
                }
                write!(f, "{}(", call.name)?;
                write_list(f, &call.arguments)?;
                write!(f, ")")
            }
            Expr::New(n) => write!(f, "new {}()", n.class_name),
            Expr::NewArray(n) => write!(f, "new {}[{}]", n.element_type, n.size),
            Expr::ArrayLiteral(a) => {
                write!(f, "[")?;
                write_list(f, &a.elements)?;
                write!(f, "]")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
