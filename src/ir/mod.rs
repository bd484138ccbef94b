//! Three-address intermediate representation
//!
//! The IR sits between the typed AST and the Jasmin emitter:
//!
//! - **Element**: a literal, a named operand or an indexed array operand,
//!   each carrying its IR type
//! - **Instruction**: one three-address step; assignments wrap the
//!   instruction producing the value
//! - **IrMethod**: ordered instructions, a label → index map and the variable
//!   table the register allocator rewrites
//!
//! `Display` renders the textual form (see [`printer`]).

mod expr;
mod generator;
mod printer;

pub use generator::{generate, IrGenerator};

use std::collections::HashMap;

use crate::ast::{BinaryOp, UnaryOp};
use crate::consts::{BOOLEAN, INT, STRING, THIS, VOID};
use crate::error::{Error, Result};
use crate::symtab::Type;

/// IR value types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Int32,
    Bool,
    Void,
    String,
    Array(Box<IrType>),
    Class(String),
}

impl IrType {
    pub fn int_array() -> Self {
        IrType::Array(Box::new(IrType::Int32))
    }

    /// Element type of an array type; non-arrays are their own element
    pub fn element(&self) -> IrType {
        match self {
            IrType::Array(inner) => (**inner).clone(),
            other => other.clone(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, IrType::Array(_))
    }

    /// Held in an `a*` slot rather than an `i*` slot
    pub fn is_reference(&self) -> bool {
        matches!(self, IrType::String | IrType::Array(_) | IrType::Class(_))
    }

    pub fn is_void(&self) -> bool {
        *self == IrType::Void
    }
}

impl From<&Type> for IrType {
    /// `any` only reaches here for names outside the class; it lowers to void
    fn from(ty: &Type) -> Self {
        let base = match ty.name.as_str() {
            INT => IrType::Int32,
            BOOLEAN => IrType::Bool,
            VOID => IrType::Void,
            STRING => IrType::String,
            _ if ty.is_any() => IrType::Void,
            name => IrType::Class(name.to_string()),
        };
        if ty.is_array {
            IrType::Array(Box::new(base))
        } else {
            base
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Integer or boolean (1/0) constant
    Literal { value: i32, ty: IrType },
    /// Variable, temporary, field name, `this` or a class name used as a
    /// static receiver
    Operand { name: String, ty: IrType },
    /// `name[index]`, typed by the element type
    ArrayOperand { name: String, index: Box<Element>, ty: IrType },
}

impl Element {
    pub fn literal(value: i32, ty: IrType) -> Self {
        Element::Literal { value, ty }
    }

    pub fn operand(name: impl Into<String>, ty: IrType) -> Self {
        Element::Operand { name: name.into(), ty }
    }

    pub fn this(class_name: &str) -> Self {
        Element::operand(THIS, IrType::Class(class_name.to_string()))
    }

    pub fn ty(&self) -> &IrType {
        match self {
            Element::Literal { ty, .. } | Element::Operand { ty, .. } | Element::ArrayOperand { ty, .. } => ty,
        }
    }

    /// Variable name for operands, `None` for literals
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Literal { .. } => None,
            Element::Operand { name, .. } | Element::ArrayOperand { name, .. } => Some(name),
        }
    }

    pub fn as_literal(&self) -> Option<i32> {
        match self {
            Element::Literal { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_this(&self) -> bool {
        matches!(self, Element::Operand { name, .. } if name == THIS)
    }

    /// Class name standing in as the receiver of a static call
    pub fn is_class_reference(&self) -> bool {
        matches!(self, Element::Operand { name, ty: IrType::Class(class) } if name == class)
    }

    /// Every variable this element reads, including the index of an array operand
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Element::Literal { .. } => Vec::new(),
            Element::Operand { name, .. } => vec![name.as_str()],
            Element::ArrayOperand { name, index, .. } => {
                let mut names = vec![name.as_str()];
                names.extend(index.variables());
                names
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    InvokeStatic,
    InvokeVirtual,
    InvokeSpecial,
    New,
    NewArray,
    ArrayLength,
}

impl CallKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CallKind::InvokeStatic => "invokestatic",
            CallKind::InvokeVirtual => "invokevirtual",
            CallKind::InvokeSpecial => "invokespecial",
            CallKind::New | CallKind::NewArray => "new",
            CallKind::ArrayLength => "arraylength",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `dest :=.ty rhs`
    Assign { dest: Element, rhs: Box<Instruction>, ty: IrType },
    /// Invocation or allocation; `caller` is the receiver, class or array size
    Call { kind: CallKind, caller: Element, method: Option<String>, args: Vec<Element>, ty: IrType },
    Return { value: Option<Element> },
    BinaryOp { op: BinaryOp, left: Element, right: Element, ty: IrType },
    UnaryOp { op: UnaryOp, operand: Element, ty: IrType },
    /// Jump to `label` when `condition` (a binary, unary or plain element) holds
    CondBranch { condition: Box<Instruction>, label: String },
    Goto { label: String },
    GetField { object: Element, field: Element, ty: IrType },
    PutField { object: Element, field: Element, value: Element },
    /// A bare element, used as the right-hand side of copies and as a condition
    NoOp(Element),
}

impl Instruction {
    pub fn assign(dest: Element, rhs: Instruction) -> Self {
        let ty = dest.ty().clone();
        Instruction::Assign { dest, rhs: Box::new(rhs), ty }
    }

    pub fn goto(label: impl Into<String>) -> Self {
        Instruction::Goto { label: label.into() }
    }

    pub fn branch(condition: Instruction, label: impl Into<String>) -> Self {
        Instruction::CondBranch { condition: Box::new(condition), label: label.into() }
    }

    /// Type of the value this instruction leaves behind
    pub fn result_type(&self) -> IrType {
        match self {
            Instruction::Assign { ty, .. }
            | Instruction::Call { ty, .. }
            | Instruction::BinaryOp { ty, .. }
            | Instruction::UnaryOp { ty, .. }
            | Instruction::GetField { ty, .. } => ty.clone(),
            Instruction::Return { value } => value.as_ref().map(|v| v.ty().clone()).unwrap_or(IrType::Void),
            Instruction::NoOp(element) => element.ty().clone(),
            Instruction::CondBranch { .. } | Instruction::Goto { .. } | Instruction::PutField { .. } => IrType::Void,
        }
    }

    /// Jump target, for `goto` and conditional branches
    pub fn target(&self) -> Option<&str> {
        match self {
            Instruction::Goto { label } | Instruction::CondBranch { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Elements this instruction reads. An assignment reads its right-hand
    /// side and, for an indexed destination, the array and index operands.
    pub fn read_elements(&self) -> Vec<&Element> {
        match self {
            Instruction::Assign { dest, rhs, .. } => {
                let mut elements = rhs.read_elements();
                if matches!(dest, Element::ArrayOperand { .. }) {
                    elements.push(dest);
                }
                elements
            }
            Instruction::Call { kind, caller, args, .. } => {
                let mut elements = Vec::new();
                if *kind != CallKind::New && !caller.is_class_reference() {
                    elements.push(caller);
                }
                elements.extend(args.iter());
                elements
            }
            Instruction::Return { value } => value.iter().collect(),
            Instruction::BinaryOp { left, right, .. } => vec![left, right],
            Instruction::UnaryOp { operand, .. } => vec![operand],
            Instruction::CondBranch { condition, .. } => condition.read_elements(),
            Instruction::Goto { .. } => Vec::new(),
            Instruction::GetField { object, .. } => vec![object],
            Instruction::PutField { object, value, .. } => vec![object, value],
            Instruction::NoOp(element) => vec![element],
        }
    }
}

/// Where a variable of a method lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarScope {
    This,
    Parameter,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub register: usize,
    pub ty: IrType,
    pub scope: VarScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrField {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrMethod {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_constructor: bool,
    /// Parameter operands in declaration order
    pub params: Vec<Element>,
    pub return_type: IrType,
    pub instructions: Vec<Instruction>,
    /// Label → index of the instruction it precedes; may equal `instructions.len()`
    pub labels: HashMap<String, usize>,
    pub var_table: HashMap<String, Descriptor>,
}

impl IrMethod {
    /// Instruction index a label marks
    pub fn label_index(&self, label: &str) -> Result<usize> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| Error::internal(format!("unknown label '{}' in method '{}'", label, self.name)))
    }

    /// Labels placed right before instruction `index`, sorted by name
    pub fn labels_at(&self, index: usize) -> Vec<&str> {
        let mut labels: Vec<&str> =
            self.labels.iter().filter(|(_, &at)| at == index).map(|(name, _)| name.as_str()).collect();
        labels.sort_unstable();
        labels
    }

    pub fn register(&self, name: &str) -> Result<usize> {
        self.var_table
            .get(name)
            .map(|d| d.register)
            .ok_or_else(|| Error::internal(format!("variable '{}' has no register in method '{}'", name, self.name)))
    }

    /// Registers reserved for `this` and the parameters
    pub fn reserved_registers(&self) -> usize {
        usize::from(!self.is_static) + self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrProgram {
    pub class_name: String,
    pub superclass: Option<String>,
    /// Qualified import names
    pub imports: Vec<String>,
    pub fields: Vec<IrField>,
    pub methods: Vec<IrMethod>,
}

impl IrProgram {
    pub fn method(&self, name: &str) -> Option<&IrMethod> {
        self.methods.iter().find(|m| m.name == name && !m.is_constructor)
    }
}
