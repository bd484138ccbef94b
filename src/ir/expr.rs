//! Expression-level IR generation
//!
//! Lowering an expression yields the element holding its value plus the
//! instructions that must run first. The element is always a literal or a
//! plain operand; anything larger lands in a fresh temporary.

use crate::ast::*;
use crate::consts::{INIT, LENGTH};
use crate::error::{Error, Result};
use crate::symtab::{Type, VarKind};

use super::generator::MethodLowering;
use super::*;

pub(super) struct Lowered {
    pub code: Element,
    pub prelude: Vec<Instruction>,
}

impl Lowered {
    fn element(code: Element) -> Self {
        Self { code, prelude: Vec::new() }
    }
}

/// Return type assumed for a call the class does not declare, when nothing
/// around the call says otherwise
fn external_call_type(hint: Option<&IrType>) -> IrType {
    hint.cloned().unwrap_or(IrType::Int32)
}

/// Operand type each side of `op` is expected to have
fn operand_hint(op: BinaryOp) -> Option<IrType> {
    if op.is_arithmetic() || op.is_relational() {
        Some(IrType::Int32)
    } else if op.is_logical() {
        Some(IrType::Bool)
    } else {
        None
    }
}

impl MethodLowering<'_, '_> {
    pub(super) fn expr(&mut self, expr: &Expr, hint: Option<&IrType>) -> Result<Lowered> {
        match expr {
            Expr::Literal(lit) => Ok(Lowered::element(match lit.value {
                Literal::Integer(v) => Element::literal(v, IrType::Int32),
                Literal::Boolean(v) => Element::literal(i32::from(v), IrType::Bool),
            })),
            Expr::This(_) => Ok(Lowered::element(Element::this(self.table().class_name()))),
            Expr::Identifier(id) => self.identifier(&id.name),
            Expr::Parenthesized(p) => self.expr(&p.inner, hint),
            Expr::Unary(u) => {
                let operand = self.expr(&u.operand, Some(&IrType::Bool))?;
                let mut prelude = operand.prelude;
                let code = self.into_temp(
                    Instruction::UnaryOp { op: u.op, operand: operand.code, ty: IrType::Bool },
                    &mut prelude,
                );
                Ok(Lowered { code, prelude })
            }
            Expr::Binary(b) => {
                let mut prelude = Vec::new();
                let instruction = self.binary_instruction(b, &mut prelude)?;
                let code = self.into_temp(instruction, &mut prelude);
                Ok(Lowered { code, prelude })
            }
            Expr::ArrayAccess(access) => {
                let mut prelude = Vec::new();
                let (name, index, ty) = self.indexed(access, &mut prelude)?;
                let read = Element::ArrayOperand { name, index: Box::new(index), ty };
                let code = self.into_temp(Instruction::NoOp(read), &mut prelude);
                Ok(Lowered { code, prelude })
            }
            Expr::Length(l) => {
                let target = self.expr(&l.target, None)?;
                let mut prelude = target.prelude;
                let code = self.into_temp(array_length(target.code), &mut prelude);
                Ok(Lowered { code, prelude })
            }
            Expr::MethodCall(call) => {
                let mut prelude = Vec::new();
                let instruction = self.call_instruction(call, hint, &mut prelude)?;
                let code = self.into_temp(instruction, &mut prelude);
                Ok(Lowered { code, prelude })
            }
            Expr::New(n) => {
                let ty = IrType::Class(n.class_name.clone());
                let mut prelude = Vec::new();
                let allocation = Instruction::Call {
                    kind: CallKind::New,
                    caller: Element::operand(n.class_name.clone(), ty.clone()),
                    method: None,
                    args: Vec::new(),
                    ty,
                };
                let code = self.into_temp(allocation, &mut prelude);
                prelude.push(Instruction::Call {
                    kind: CallKind::InvokeSpecial,
                    caller: code.clone(),
                    method: Some(INIT.to_string()),
                    args: Vec::new(),
                    ty: IrType::Void,
                });
                Ok(Lowered { code, prelude })
            }
            Expr::NewArray(n) => {
                let size = self.expr(&n.size, Some(&IrType::Int32))?;
                let mut prelude = size.prelude;
                let ty = IrType::from(&Type::new(n.element_type.clone(), true));
                let code = self.into_temp(new_array(size.code, ty), &mut prelude);
                Ok(Lowered { code, prelude })
            }
            Expr::ArrayLiteral(literal) => self.array_literal(literal, hint),
        }
    }

    /// Store `rhs` into a fresh temporary and return the temporary
    fn into_temp(&mut self, rhs: Instruction, prelude: &mut Vec<Instruction>) -> Element {
        let temp = self.temp(rhs.result_type());
        prelude.push(Instruction::assign(temp.clone(), rhs));
        temp
    }

    /// Make `element` a plain variable operand, copying literals into a temporary
    fn into_operand(&mut self, element: Element, prelude: &mut Vec<Instruction>) -> Element {
        match element {
            Element::Operand { .. } => element,
            other => self.into_temp(Instruction::NoOp(other), prelude),
        }
    }

    fn identifier(&mut self, name: &str) -> Result<Lowered> {
        let table = self.table();
        match table.lookup_variable(name, &self.method.name) {
            Some((VarKind::Field, field)) => {
                let ty = IrType::from(&field.ty);
                let mut prelude = Vec::new();
                let read = Instruction::GetField {
                    object: Element::this(table.class_name()),
                    field: Element::operand(name, ty.clone()),
                    ty,
                };
                let code = self.into_temp(read, &mut prelude);
                Ok(Lowered { code, prelude })
            }
            Some((_, symbol)) => Ok(Lowered::element(Element::operand(name, IrType::from(&symbol.ty)))),
            None if self.is_class_name(name) => {
                Ok(Lowered::element(Element::operand(name, IrType::Class(name.to_string()))))
            }
            None => Err(Error::internal(format!("unresolved name '{}' in '{}'", name, self.method.name))),
        }
    }

    /// Name that is not a variable but denotes the class itself or an import
    fn is_class_name(&self, name: &str) -> bool {
        let table = self.table();
        table.lookup_variable(name, &self.method.name).is_none()
            && (name == table.class_name() || table.is_import(name))
    }

    pub(super) fn binary_instruction(
        &mut self,
        binary: &BinaryExpr,
        prelude: &mut Vec<Instruction>,
    ) -> Result<Instruction> {
        let hint = operand_hint(binary.op);
        let left = self.expr(&binary.left, hint.as_ref())?;
        prelude.extend(left.prelude);
        let right = self.expr(&binary.right, hint.as_ref())?;
        prelude.extend(right.prelude);
        let ty = if binary.op.yields_boolean() { IrType::Bool } else { IrType::Int32 };
        Ok(Instruction::BinaryOp { op: binary.op, left: left.code, right: right.code, ty })
    }

    /// Base variable, index operand and element type of an indexed access
    pub(super) fn indexed(
        &mut self,
        access: &ArrayAccessExpr,
        prelude: &mut Vec<Instruction>,
    ) -> Result<(String, Element, IrType)> {
        let base = self.expr(&access.array, None)?;
        prelude.extend(base.prelude);
        let base = self.into_operand(base.code, prelude);
        let index = self.expr(&access.index, Some(&IrType::Int32))?;
        prelude.extend(index.prelude);
        let index = self.into_operand(index.code, prelude);

        let element_type = base.ty().element();
        match base {
            Element::Operand { name, .. } => Ok((name, index, element_type)),
            other => Err(Error::internal(format!("cannot index '{}'", other))),
        }
    }

    fn array_literal(&mut self, literal: &ArrayLiteralExpr, hint: Option<&IrType>) -> Result<Lowered> {
        let element_type = match hint {
            Some(IrType::Array(inner)) => (**inner).clone(),
            _ => literal
                .elements
                .first()
                .map(|first| IrType::from(&self.gen.resolver.expr_type(first, Some(&self.method.name))))
                .filter(|ty| !ty.is_void())
                .unwrap_or(IrType::Int32),
        };
        let ty = IrType::Array(Box::new(element_type.clone()));
        let size = i32::try_from(literal.elements.len())
            .map_err(|_| Error::internal("array literal has more elements than an int can count"))?;

        let mut prelude = Vec::new();
        let array = self.into_temp(new_array(Element::literal(size, IrType::Int32), ty), &mut prelude);
        let Some(array_name) = array.name().map(str::to_string) else {
            return Err(Error::internal("array literal temporary has no name"));
        };
        for (position, item) in literal.elements.iter().enumerate() {
            let value = self.expr(item, Some(&element_type))?;
            prelude.extend(value.prelude);
            let position = i32::try_from(position).unwrap_or(i32::MAX);
            let index = self.into_temp(Instruction::NoOp(Element::literal(position, IrType::Int32)), &mut prelude);
            let slot = Element::ArrayOperand { name: array_name.clone(), index: Box::new(index), ty: element_type.clone() };
            prelude.push(Instruction::assign(slot, Instruction::NoOp(value.code)));
        }
        Ok(Lowered { code: array, prelude })
    }

    /// The call instruction for `call`, with receiver and argument
    /// computations appended to `prelude`.
    ///
    /// `hint` types calls the class does not declare; `Some(Void)` marks
    /// statement position.
    pub(super) fn call_instruction(
        &mut self,
        call: &MethodCallExpr,
        hint: Option<&IrType>,
        prelude: &mut Vec<Instruction>,
    ) -> Result<Instruction> {
        let table = self.table();
        let class_name = table.class_name();

        let (kind, caller, on_own_class) = match call.target.as_deref() {
            None | Some(Expr::This(_)) => {
                let callee_static = table.method(&call.name).map(|m| m.is_static).unwrap_or(false);
                if callee_static || (call.target.is_none() && self.method.is_static) {
                    (CallKind::InvokeStatic, Element::operand(class_name, IrType::Class(class_name.to_string())), true)
                } else {
                    (CallKind::InvokeVirtual, Element::this(class_name), true)
                }
            }
            Some(Expr::Identifier(id)) if self.is_class_name(&id.name) => {
                let receiver = Element::operand(id.name.clone(), IrType::Class(id.name.clone()));
                (CallKind::InvokeStatic, receiver, id.name == class_name)
            }
            Some(target) => {
                let receiver = self.expr(target, None)?;
                prelude.extend(receiver.prelude);
                let own = *receiver.code.ty() == IrType::Class(class_name.to_string());
                (CallKind::InvokeVirtual, receiver.code, own)
            }
        };

        if call.name == LENGTH && call.arguments.is_empty() && caller.ty().is_array() {
            return Ok(array_length(caller));
        }

        let signature = if on_own_class { table.method(&call.name) } else { None };
        let mut args = Vec::with_capacity(call.arguments.len());
        for (position, argument) in call.arguments.iter().enumerate() {
            let expected = signature.and_then(|s| s.parameters.get(position)).map(|p| IrType::from(&p.ty));
            let lowered = self.expr(argument, expected.as_ref())?;
            prelude.extend(lowered.prelude);
            args.push(lowered.code);
        }

        let ty = match signature {
            Some(signature) => IrType::from(&signature.return_type),
            None => external_call_type(hint),
        };
        Ok(Instruction::Call { kind, caller, method: Some(call.name.clone()), args, ty })
    }
}

fn array_length(array: Element) -> Instruction {
    Instruction::Call { kind: CallKind::ArrayLength, caller: array, method: None, args: Vec::new(), ty: IrType::Int32 }
}

fn new_array(size: Element, ty: IrType) -> Instruction {
    Instruction::Call { kind: CallKind::NewArray, caller: size, method: None, args: Vec::new(), ty }
}
