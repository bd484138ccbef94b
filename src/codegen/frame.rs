//! `.limit stack` and `.limit locals` computation
//!
//! The stack limit is a static upper bound taken per instruction; it never
//! simulates the operand stack across instructions, since every IR
//! instruction starts and ends with an empty stack.

use crate::ir::{CallKind, Element, Instruction, IrMethod};

/// Smallest stack limit emitted for any method
pub const MIN_STACK: usize = 2;

fn element_need(element: &Element) -> usize {
    match element {
        Element::Literal { .. } | Element::Operand { .. } => 1,
        // array reference, then the index
        Element::ArrayOperand { index, .. } => 1 + element_need(index),
    }
}

/// Stack slots needed while evaluating a sequence pushed left to right
fn sequence_need<'e>(elements: impl IntoIterator<Item = &'e Element>) -> usize {
    elements.into_iter().enumerate().map(|(depth, e)| depth + element_need(e)).max().unwrap_or(0)
}

/// Peak operand stack depth of one instruction
pub fn stack_need(instruction: &Instruction) -> usize {
    match instruction {
        Instruction::Assign { dest: Element::ArrayOperand { index, .. }, rhs, .. } => {
            (1 + element_need(index)).max(2 + stack_need(rhs))
        }
        Instruction::Assign { rhs, .. } => stack_need(rhs),
        Instruction::Call { kind, caller, args, .. } => match kind {
            CallKind::New => 1,
            CallKind::NewArray | CallKind::ArrayLength => element_need(caller),
            CallKind::InvokeStatic => sequence_need(args).max(1),
            CallKind::InvokeVirtual | CallKind::InvokeSpecial => {
                sequence_need(std::iter::once(caller).chain(args)).max(1)
            }
        },
        Instruction::Return { value } => value.as_ref().map(element_need).unwrap_or(0),
        Instruction::BinaryOp { left, right, .. } => sequence_need([left, right]),
        // operand, then the constant 1 it is xor'ed with
        Instruction::UnaryOp { operand, .. } => element_need(operand).max(2),
        Instruction::CondBranch { condition, .. } => stack_need(condition),
        Instruction::Goto { .. } => 0,
        Instruction::GetField { object, .. } => element_need(object),
        Instruction::PutField { object, value, .. } => sequence_need([object, value]),
        Instruction::NoOp(element) => element_need(element),
    }
}

pub fn stack_limit(method: &IrMethod) -> usize {
    method.instructions.iter().map(stack_need).max().unwrap_or(0).max(MIN_STACK)
}

/// `this` and parameters, widened to cover the highest register in use
pub fn locals_limit(method: &IrMethod) -> usize {
    let highest = method.var_table.values().map(|d| d.register + 1).max().unwrap_or(0);
    method.reserved_registers().max(highest)
}
