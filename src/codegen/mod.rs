//! Jasmin assembly emission
//!
//! Walks the IR one instruction at a time; every IR instruction becomes a
//! short self-contained sequence that leaves the operand stack as it found
//! it. Labels from the IR are emitted unchanged, comparisons that produce a
//! value get fresh `cmp_true_N`/`cmp_end_N` labels numbered per method.

pub mod descriptor;
pub mod frame;
pub mod opcodes;

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::ast::BinaryOp;
use crate::consts::INIT;
use crate::error::{Error, Result};
use crate::ir::{CallKind, Element, Instruction, IrMethod, IrProgram, IrType};

pub use descriptor::ClassPaths;

const INDENT: &str = "    ";

/// Render the whole class as Jasmin source
pub fn emit(ir: &IrProgram) -> Result<String> {
    JasminEmitter::new(ir).emit()
}

pub struct JasminEmitter<'a> {
    ir: &'a IrProgram,
    paths: ClassPaths,
}

impl<'a> JasminEmitter<'a> {
    pub fn new(ir: &'a IrProgram) -> Self {
        Self { ir, paths: ClassPaths::new(ir) }
    }

    pub fn emit(&self) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, ".class public {}", self.ir.class_name);
        let _ = writeln!(out, ".super {}", self.superclass());
        if !self.ir.fields.is_empty() {
            out.push('\n');
        }
        for field in &self.ir.fields {
            let _ = writeln!(out, ".field public '{}' {}", field.name, self.paths.type_descriptor(&field.ty));
        }
        for method in &self.ir.methods {
            out.push('\n');
            out.push_str(&self.method(method)?);
        }
        log::debug!("emitted {} method(s) for '{}'", self.ir.methods.len(), self.ir.class_name);
        Ok(out)
    }

    fn superclass(&self) -> String {
        self.paths.superclass(self.ir.superclass.as_deref())
    }

    fn method(&self, method: &IrMethod) -> Result<String> {
        let mut emitter = MethodEmitter { owner: self, method, lines: Vec::new(), next_label: 0 };
        emitter.body()?;

        let mut out = String::new();
        let _ = write!(out, ".method ");
        if method.is_public {
            out.push_str("public ");
        }
        if method.is_static {
            out.push_str("static ");
        }
        let name = if method.is_constructor { INIT } else { method.name.as_str() };
        let descriptor = self.paths.method_descriptor(method.params.iter().map(Element::ty), &method.return_type);
        let _ = writeln!(out, "{}{}", name, descriptor);
        let _ = writeln!(out, "{}.limit stack {}", INDENT, frame::stack_limit(method));
        let _ = writeln!(out, "{}.limit locals {}", INDENT, frame::locals_limit(method));
        for line in emitter.lines {
            if line.ends_with(':') {
                let _ = writeln!(out, "{}", line);
            } else {
                let _ = writeln!(out, "{}{}", INDENT, line);
            }
        }
        let _ = writeln!(out, ".end method");
        Ok(out)
    }
}

/// Emission state for one method
struct MethodEmitter<'e, 'a> {
    owner: &'e JasminEmitter<'a>,
    method: &'e IrMethod,
    lines: Vec<String>,
    next_label: usize,
}

impl MethodEmitter<'_, '_> {
    fn paths(&self) -> &ClassPaths {
        &self.owner.paths
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn label(&mut self, label: &str) {
        self.lines.push(format!("{}:", label));
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, self.next_label);
        self.next_label += 1;
        label
    }

    fn body(&mut self) -> Result<()> {
        let method = self.method;
        for (index, instruction) in method.instructions.iter().enumerate() {
            for label in method.labels_at(index) {
                self.label(label);
            }
            self.statement(instruction)?;
        }

        let at_end = method.instructions.len();
        let jumped_to: HashSet<&str> = method.instructions.iter().filter_map(Instruction::target).collect();
        for label in method.labels_at(at_end) {
            if jumped_to.contains(label) {
                return Err(Error::internal(format!(
                    "label '{}' jumps past the last instruction of '{}'",
                    label, method.name
                )));
            }
        }
        if method.return_type.is_void() && !matches!(method.instructions.last(), Some(Instruction::Return { .. })) {
            self.push("return");
        }
        Ok(())
    }

    /// Emit `instruction` as a statement: nothing is left on the stack
    fn statement(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::Assign { dest, rhs, .. } => self.assign(dest, rhs),
            Instruction::Call { .. } => {
                self.value(instruction)?;
                if !instruction.result_type().is_void() {
                    self.push("pop");
                }
                Ok(())
            }
            Instruction::Return { value } => {
                match value {
                    Some(value) => {
                        self.load(value)?;
                        self.push(opcodes::return_op(value.ty()));
                    }
                    None => self.push("return"),
                }
                Ok(())
            }
            Instruction::CondBranch { condition, label } => self.branch(condition, label),
            Instruction::Goto { label } => {
                self.push(format!("goto {}", label));
                Ok(())
            }
            Instruction::PutField { object, field, value } => {
                self.load(object)?;
                self.load(value)?;
                let line = format!("putfield {}", self.field_ref(object, field)?);
                self.push(line);
                Ok(())
            }
            Instruction::BinaryOp { .. }
            | Instruction::UnaryOp { .. }
            | Instruction::GetField { .. }
            | Instruction::NoOp(_) => {
                self.value(instruction)?;
                self.push("pop");
                Ok(())
            }
        }
    }

    fn assign(&mut self, dest: &Element, rhs: &Instruction) -> Result<()> {
        match dest {
            Element::Operand { name, ty } => {
                let register = self.method.register(name)?;
                if let Some(increment) = increment_of(name, rhs) {
                    self.push(format!("iinc {} {}", register, increment));
                    return Ok(());
                }
                self.value(rhs)?;
                self.push(opcodes::store(ty, register));
                Ok(())
            }
            Element::ArrayOperand { name, index, ty } => {
                let register = self.method.register(name)?;
                self.push(opcodes::load(&IrType::Array(Box::new(ty.clone())), register));
                self.load(index)?;
                self.value(rhs)?;
                self.push(opcodes::array_store(ty));
                Ok(())
            }
            Element::Literal { .. } => Err(Error::internal(format!("cannot assign to literal {}", dest))),
        }
    }

    /// Emit `instruction` so that its value ends up on the stack
    fn value(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::NoOp(element) => self.load(element),
            Instruction::BinaryOp { op, left, right, .. } => self.binary(*op, left, right),
            Instruction::UnaryOp { operand, .. } => {
                self.load(operand)?;
                self.push("iconst_1");
                self.push("ixor");
                Ok(())
            }
            Instruction::GetField { object, field, .. } => {
                self.load(object)?;
                let line = format!("getfield {}", self.field_ref(object, field)?);
                self.push(line);
                Ok(())
            }
            Instruction::Call { kind, caller, method, args, ty } => self.call(*kind, caller, method.as_deref(), args, ty),
            Instruction::Assign { .. }
            | Instruction::Return { .. }
            | Instruction::CondBranch { .. }
            | Instruction::Goto { .. }
            | Instruction::PutField { .. } => {
                Err(Error::internal(format!("'{}' does not produce a value", instruction)))
            }
        }
    }

    fn load(&mut self, element: &Element) -> Result<()> {
        match element {
            Element::Literal { value, .. } => self.push(opcodes::push_int(*value)),
            Element::Operand { name, ty } => {
                let register = self.method.register(name)?;
                self.push(opcodes::load(ty, register));
            }
            Element::ArrayOperand { name, index, ty } => {
                let register = self.method.register(name)?;
                self.push(opcodes::load(&IrType::Array(Box::new(ty.clone())), register));
                self.load(index)?;
                self.push(opcodes::array_load(ty));
            }
        }
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, left: &Element, right: &Element) -> Result<()> {
        if let Some(mnemonic) = opcodes::arithmetic(op) {
            self.load(left)?;
            self.load(right)?;
            self.push(mnemonic);
            return Ok(());
        }
        let when_true = self.fresh_label("cmp_true");
        let end = self.fresh_label("cmp_end");
        self.compare_and_jump(op, left, right, &when_true)?;
        self.push("iconst_0");
        self.push(format!("goto {}", end));
        self.label(&when_true);
        self.push("iconst_1");
        self.label(&end);
        Ok(())
    }

    /// Jump to `target` when `left op right` holds
    fn compare_and_jump(&mut self, op: BinaryOp, left: &Element, right: &Element, target: &str) -> Result<()> {
        let references = left.ty().is_reference() || right.ty().is_reference();
        if !references && right.as_literal() == Some(0) {
            if let Some(branch) = opcodes::zero_branch(op) {
                self.load(left)?;
                self.push(format!("{} {}", branch, target));
                return Ok(());
            }
        }
        let branch = opcodes::compare_branch(op, references)
            .ok_or_else(|| Error::internal(format!("operator '{}' cannot compare {} values", op, left.ty())))?;
        self.load(left)?;
        self.load(right)?;
        self.push(format!("{} {}", branch, target));
        Ok(())
    }

    fn branch(&mut self, condition: &Instruction, label: &str) -> Result<()> {
        match condition {
            Instruction::BinaryOp { op, left, right, .. } if opcodes::arithmetic(*op).is_none() => {
                self.compare_and_jump(*op, left, right, label)
            }
            Instruction::UnaryOp { operand, .. } => {
                self.load(operand)?;
                self.push(format!("ifeq {}", label));
                Ok(())
            }
            other => {
                self.value(other)?;
                self.push(format!("ifne {}", label));
                Ok(())
            }
        }
    }

    fn call(
        &mut self,
        kind: CallKind,
        caller: &Element,
        method: Option<&str>,
        args: &[Element],
        ty: &IrType,
    ) -> Result<()> {
        match kind {
            CallKind::New => {
                let line = format!("new {}", self.paths().class_of(ty));
                self.push(line);
            }
            CallKind::NewArray => {
                self.load(caller)?;
                let element = ty.element();
                let line = match opcodes::newarray_type(&element) {
                    Some(keyword) => format!("newarray {}", keyword),
                    None => format!("anewarray {}", self.paths().class_of(&element)),
                };
                self.push(line);
            }
            CallKind::ArrayLength => {
                self.load(caller)?;
                self.push("arraylength");
            }
            CallKind::InvokeStatic | CallKind::InvokeVirtual | CallKind::InvokeSpecial => {
                let name = method.ok_or_else(|| Error::internal(format!("{} without a method name", kind.keyword())))?;
                let owner = match kind {
                    CallKind::InvokeStatic => match caller {
                        Element::Operand { name, .. } => self.paths().resolve(name),
                        other => return Err(Error::internal(format!("static call on {}", other))),
                    },
                    // the constructor's own super() call
                    CallKind::InvokeSpecial if caller.is_this() && name == INIT => self.owner.superclass(),
                    _ => self.paths().class_of(caller.ty()),
                };
                if kind != CallKind::InvokeStatic {
                    self.load(caller)?;
                }
                for arg in args {
                    self.load(arg)?;
                }
                let ret = if name == INIT { &IrType::Void } else { ty };
                let descriptor = self.paths().method_descriptor(args.iter().map(Element::ty), ret);
                self.push(format!("{} {}/{}{}", kind.keyword(), owner, name, descriptor));
            }
        }
        Ok(())
    }

    fn field_ref(&self, object: &Element, field: &Element) -> Result<String> {
        match field {
            Element::Operand { name, ty } => Ok(format!(
                "{}/{} {}",
                self.paths().class_of(object.ty()),
                name,
                self.paths().type_descriptor(ty)
            )),
            other => Err(Error::internal(format!("field operand expected, found {}", other))),
        }
    }
}

/// `x := x + c`, `x := c + x` or `x := x - c` on an int, with the effective
/// increment in signed-byte range
fn increment_of(name: &str, rhs: &Instruction) -> Option<i32> {
    let Instruction::BinaryOp { op, left, right, ty: IrType::Int32 } = rhs else { return None };
    let is_self = |e: &Element| matches!(e, Element::Operand { name: n, .. } if n == name);
    let increment = match (op, left.as_literal(), right.as_literal()) {
        (BinaryOp::Add, None, Some(c)) if is_self(left) => c,
        (BinaryOp::Add, Some(c), None) if is_self(right) => c,
        (BinaryOp::Sub, None, Some(c)) if is_self(left) => c.checked_neg()?,
        _ => return None,
    };
    (-128..=127).contains(&increment).then_some(increment)
}
