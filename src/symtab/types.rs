//! Type representation and expression typing
//!
//! `TypeResolver::expr_type` is total over the closed `Expr` set: every
//! expression gets a type, and names the resolver cannot place get the
//! permissive `any` type. Reporting unresolved names is the reviewer's job.

use std::fmt;

use crate::ast::*;
use crate::consts::{ANY, BOOLEAN, INT, LENGTH, STRING, VOID};

use super::SymbolTable;

/// A type: base name plus array-ness
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self { name: name.into(), is_array }
    }

    pub fn int() -> Self {
        Self::new(INT, false)
    }

    pub fn boolean() -> Self {
        Self::new(BOOLEAN, false)
    }

    pub fn void() -> Self {
        Self::new(VOID, false)
    }

    pub fn string() -> Self {
        Self::new(STRING, false)
    }

    pub fn any() -> Self {
        Self::new(ANY, false)
    }

    pub fn int_array() -> Self {
        Self::new(INT, true)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn array_of(element: &Type) -> Self {
        Self::new(element.name.clone(), true)
    }

    /// Type of one element of this array type
    pub fn element_type(&self) -> Type {
        Self::new(self.name.clone(), false)
    }

    pub fn is_int(&self) -> bool {
        self.name == INT && !self.is_array
    }

    pub fn is_boolean(&self) -> bool {
        self.name == BOOLEAN && !self.is_array
    }

    pub fn is_void(&self) -> bool {
        self.name == VOID && !self.is_array
    }

    pub fn is_any(&self) -> bool {
        self.name == ANY && !self.is_array
    }

    /// int or boolean, the types held in integer-family slots
    pub fn is_primitive(&self) -> bool {
        self.is_int() || self.is_boolean()
    }
}

impl From<&TypeRef> for Type {
    fn from(type_ref: &TypeRef) -> Self {
        Type::new(type_ref.name.clone(), type_ref.is_array || type_ref.is_varargs)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Whether a value of type `right` may be stored where `left` is expected.
///
/// `any` on either side is accepted. Arrays only match arrays with the same
/// element name; everything else needs exact name equality.
pub fn is_assignable(left: &Type, right: &Type) -> bool {
    if left.is_any() || right.is_any() {
        return true;
    }
    if left.is_array || right.is_array {
        return left.is_array && right.is_array && left.name == right.name;
    }
    left.name == right.name
}

/// Type of a binary operator's result
pub fn binary_result_type(op: BinaryOp) -> Type {
    if op.yields_boolean() {
        Type::boolean()
    } else {
        Type::int()
    }
}

/// Expression typing against a built symbol table
pub struct TypeResolver<'a> {
    table: &'a SymbolTable,
}

impl<'a> TypeResolver<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// Type of `expr` as it appears inside `method` (None outside any method)
    pub fn expr_type(&self, expr: &Expr, method: Option<&str>) -> Type {
        match expr {
            Expr::Literal(lit) => match lit.value {
                Literal::Integer(_) => Type::int(),
                Literal::Boolean(_) => Type::boolean(),
            },
            Expr::This(_) => Type::class(self.table.class_name()),
            Expr::Identifier(id) => self.identifier_type(&id.name, method),
            Expr::Parenthesized(p) => self.expr_type(&p.inner, method),
            Expr::Unary(u) => match u.op {
                UnaryOp::Not => Type::boolean(),
            },
            Expr::Binary(b) => binary_result_type(b.op),
            Expr::ArrayAccess(access) => {
                let array = self.expr_type(&access.array, method);
                if array.is_any() {
                    Type::any()
                } else {
                    array.element_type()
                }
            }
            Expr::Length(_) => Type::int(),
            Expr::MethodCall(call) => self.call_type(call, method),
            Expr::New(n) => Type::class(n.class_name.clone()),
            Expr::NewArray(n) => Type::new(n.element_type.clone(), true),
            Expr::ArrayLiteral(lit) => match lit.elements.first() {
                Some(first) => Type::array_of(&self.expr_type(first, method)),
                None => Type::int_array(),
            },
        }
    }

    /// Field, then parameter, then local of the enclosing method
    pub fn identifier_type(&self, name: &str, method: Option<&str>) -> Type {
        if let Some(field) = self.table.field(name) {
            return field.ty.clone();
        }
        if let Some(signature) = method.and_then(|m| self.table.method(m)) {
            if let Some(param) = signature.parameters.iter().find(|p| p.name == name) {
                return param.ty.clone();
            }
            if let Some(local) = signature.locals.iter().find(|l| l.name == name) {
                return local.ty.clone();
            }
        }
        Type::any()
    }

    fn call_type(&self, call: &MethodCallExpr, method: Option<&str>) -> Type {
        let on_own_class = match &call.target {
            None => true,
            Some(target) => self.expr_type(target, method).name == self.table.class_name(),
        };
        if on_own_class {
            if let Some(signature) = self.table.method(&call.name) {
                return signature.return_type.clone();
            }
        }
        if call.name == LENGTH {
            return Type::int();
        }
        Type::any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_assignable_both_ways() {
        for t in [Type::int(), Type::boolean(), Type::int_array(), Type::class("Foo"), Type::string()] {
            assert!(is_assignable(&t, &t));
            assert!(is_assignable(&Type::any(), &t));
            assert!(is_assignable(&t, &Type::any()));
        }
    }

    #[test]
    fn arrays_need_matching_element_names() {
        let bool_array = Type::new(BOOLEAN, true);
        assert!(!is_assignable(&Type::int_array(), &bool_array));
        assert!(is_assignable(&Type::int_array(), &Type::int_array()));
        assert!(!is_assignable(&Type::int_array(), &Type::int()));
        assert!(!is_assignable(&Type::int(), &Type::int_array()));
    }
}
