//! Instruction selection for single JVM instructions
//!
//! Short forms are picked wherever the JVM has one: `iconst_*`, `bipush` and
//! `sipush` for constants, `_0`..`_3` slots for loads and stores, the
//! single-operand `if*` family for comparisons against zero.

use crate::ast::BinaryOp;
use crate::ir::IrType;

/// Push an int constant with the shortest encoding
pub fn push_int(value: i32) -> String {
    match value {
        -1 => "iconst_m1".to_string(),
        0..=5 => format!("iconst_{}", value),
        -128..=127 => format!("bipush {}", value),
        -32768..=32767 => format!("sipush {}", value),
        _ => format!("ldc {}", value),
    }
}

fn slot_op(prefix: char, op: &str, register: usize) -> String {
    if register <= 3 {
        format!("{}{}_{}", prefix, op, register)
    } else {
        format!("{}{} {}", prefix, op, register)
    }
}

fn type_prefix(ty: &IrType) -> char {
    if ty.is_reference() {
        'a'
    } else {
        'i'
    }
}

pub fn load(ty: &IrType, register: usize) -> String {
    slot_op(type_prefix(ty), "load", register)
}

pub fn store(ty: &IrType, register: usize) -> String {
    slot_op(type_prefix(ty), "store", register)
}

/// Array element load for arrays whose elements have type `element`
pub fn array_load(element: &IrType) -> &'static str {
    match element {
        IrType::Bool => "baload",
        ty if ty.is_reference() => "aaload",
        _ => "iaload",
    }
}

pub fn array_store(element: &IrType) -> &'static str {
    match element {
        IrType::Bool => "bastore",
        ty if ty.is_reference() => "aastore",
        _ => "iastore",
    }
}

pub fn return_op(ty: &IrType) -> &'static str {
    match ty {
        IrType::Void => "return",
        ty if ty.is_reference() => "areturn",
        _ => "ireturn",
    }
}

/// Arithmetic and logical operators map to one instruction each
pub fn arithmetic(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::Add => Some("iadd"),
        BinaryOp::Sub => Some("isub"),
        BinaryOp::Mul => Some("imul"),
        BinaryOp::Div => Some("idiv"),
        BinaryOp::And => Some("iand"),
        BinaryOp::Or => Some("ior"),
        _ => None,
    }
}

/// Condition suffix of the branch taken when `op` holds
fn condition(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::Lt => Some("lt"),
        BinaryOp::Le => Some("le"),
        BinaryOp::Gt => Some("gt"),
        BinaryOp::Ge => Some("ge"),
        BinaryOp::Eq => Some("eq"),
        BinaryOp::Ne => Some("ne"),
        _ => None,
    }
}

/// Two-operand compare-and-branch; `references` selects `if_acmp*`
pub fn compare_branch(op: BinaryOp, references: bool) -> Option<String> {
    let cond = condition(op)?;
    if references {
        matches!(op, BinaryOp::Eq | BinaryOp::Ne).then(|| format!("if_acmp{}", cond))
    } else {
        Some(format!("if_icmp{}", cond))
    }
}

/// Compare-with-zero branch for `x op 0`
pub fn zero_branch(op: BinaryOp) -> Option<String> {
    condition(op).map(|cond| format!("if{}", cond))
}

/// Element type keyword for `newarray`, `None` when `anewarray` is needed
pub fn newarray_type(element: &IrType) -> Option<&'static str> {
    match element {
        IrType::Int32 => Some("int"),
        IrType::Bool => Some("boolean"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_shortest_constant_push() {
        assert_eq!(push_int(-1), "iconst_m1");
        assert_eq!(push_int(5), "iconst_5");
        assert_eq!(push_int(6), "bipush 6");
        assert_eq!(push_int(-128), "bipush -128");
        assert_eq!(push_int(200), "sipush 200");
        assert_eq!(push_int(-32768), "sipush -32768");
        assert_eq!(push_int(40000), "ldc 40000");
    }

    #[test]
    fn uses_short_slot_forms() {
        assert_eq!(load(&IrType::Int32, 3), "iload_3");
        assert_eq!(load(&IrType::Bool, 4), "iload 4");
        assert_eq!(store(&IrType::int_array(), 0), "astore_0");
        assert_eq!(store(&IrType::Class("A".into()), 7), "astore 7");
    }

    #[test]
    fn comparisons() {
        assert_eq!(compare_branch(BinaryOp::Lt, false).as_deref(), Some("if_icmplt"));
        assert_eq!(compare_branch(BinaryOp::Eq, true).as_deref(), Some("if_acmpeq"));
        assert_eq!(compare_branch(BinaryOp::Lt, true), None);
        assert_eq!(zero_branch(BinaryOp::Ne).as_deref(), Some("ifne"));
        assert_eq!(arithmetic(BinaryOp::Lt), None);
    }
}
