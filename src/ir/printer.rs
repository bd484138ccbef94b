//! Textual IR rendering
//!
//! ```text
//! Calc extends Base {
//!     .field public total.i32;
//!     .construct Calc().V {
//!         invokespecial(this.Calc, "<init>").V;
//!     }
//!     .method public add(a.i32, b.i32).i32 {
//!         tmp0.i32 :=.i32 a.i32 +.i32 b.i32;
//!         ret.i32 tmp0.i32;
//!     }
//! }
//! ```

use std::fmt;

use super::*;

const INDENT: &str = "    ";

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int32 => write!(f, "i32"),
            IrType::Bool => write!(f, "bool"),
            IrType::Void => write!(f, "V"),
            IrType::String => write!(f, "String"),
            IrType::Array(inner) => write!(f, "array.{}", inner),
            IrType::Class(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Literal { value, ty } => write!(f, "{}.{}", value, ty),
            Element::Operand { name, .. } if self.is_class_reference() => write!(f, "{}", name),
            Element::Operand { name, ty } => write!(f, "{}.{}", name, ty),
            Element::ArrayOperand { name, index, ty } => write!(f, "{}[{}].{}", name, index, ty),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, rhs, ty } => write!(f, "{} :=.{} {}", dest, ty, rhs),
            Instruction::Call { kind, caller, method, args, ty } => {
                match kind {
                    CallKind::New => write!(f, "new({})", caller)?,
                    CallKind::NewArray => write!(f, "new(array, {})", caller)?,
                    CallKind::ArrayLength => write!(f, "arraylength({})", caller)?,
                    CallKind::InvokeStatic | CallKind::InvokeVirtual | CallKind::InvokeSpecial => {
                        write!(f, "{}({}, \"{}\"", kind.keyword(), caller, method.as_deref().unwrap_or_default())?;
                        for arg in args {
                            write!(f, ", {}", arg)?;
                        }
                        write!(f, ")")?;
                    }
                }
                write!(f, ".{}", ty)
            }
            Instruction::Return { value: Some(value) } => write!(f, "ret.{} {}", value.ty(), value),
            Instruction::Return { value: None } => write!(f, "ret.V"),
            Instruction::BinaryOp { op, left, right, ty } => write!(f, "{} {}.{} {}", left, op, ty, right),
            Instruction::UnaryOp { op, operand, ty } => {
                let symbol = match op {
                    UnaryOp::Not => "!",
                };
                write!(f, "{}.{} {}", symbol, ty, operand)
            }
            Instruction::CondBranch { condition, label } => write!(f, "if ({}) goto {}", condition, label),
            Instruction::Goto { label } => write!(f, "goto {}", label),
            Instruction::GetField { object, field, ty } => write!(f, "getfield({}, {}).{}", object, field, ty),
            Instruction::PutField { object, field, value } => {
                write!(f, "putfield({}, {}, {}).V", object, field, value)
            }
            Instruction::NoOp(element) => write!(f, "{}", element),
        }
    }
}

impl fmt::Display for IrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constructor {
            write!(f, ".construct {}(", self.name)?;
        } else {
            write!(f, ".method")?;
            if self.is_public {
                write!(f, " public")?;
            }
            if self.is_static {
                write!(f, " static")?;
            }
            write!(f, " {}(", self.name)?;
        }
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        writeln!(f, ").{} {{", self.return_type)?;

        for (index, instruction) in self.instructions.iter().enumerate() {
            for label in self.labels_at(index) {
                writeln!(f, "{}{}:", INDENT, label)?;
            }
            writeln!(f, "{}{}{};", INDENT, INDENT, instruction)?;
        }
        for label in self.labels_at(self.instructions.len()) {
            writeln!(f, "{}{}:", INDENT, label)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {};", import)?;
        }
        if !self.imports.is_empty() {
            writeln!(f)?;
        }
        write!(f, "{}", self.class_name)?;
        if let Some(parent) = &self.superclass {
            write!(f, " extends {}", parent)?;
        }
        writeln!(f, " {{")?;
        for field in &self.fields {
            writeln!(f, "{}.field public {}.{};", INDENT, field.name, field.ty)?;
        }
        for method in &self.methods {
            writeln!(f)?;
            for line in method.to_string().lines() {
                writeln!(f, "{}{}", INDENT, line)?;
            }
        }
        writeln!(f, "}}")
    }
}
