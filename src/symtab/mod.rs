//! Per-class symbol table
//!
//! Built once from the program and read-only afterwards. Declaration order is
//! kept for fields, parameters, locals and methods because the IR generator
//! and the emitter number slots in that order.

mod types;

pub use types::*;

use crate::ast::{ClassDecl, Program, VarDecl};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

impl From<&VarDecl> for Symbol {
    fn from(decl: &VarDecl) -> Self {
        Symbol::new(decl.name.clone(), Type::from(&decl.type_ref))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub is_public: bool,
    pub is_static: bool,
    /// Last parameter was declared `T...`
    pub is_varargs: bool,
}

/// Where a variable name was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Local,
    Parameter,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    class_name: String,
    superclass: Option<String>,
    imports: Vec<String>,
    fields: Vec<Symbol>,
    methods: Vec<MethodSignature>,
}

impl SymbolTable {
    /// Build the table for the program's class declaration
    pub fn build(program: &Program) -> Result<Self> {
        let class = program
            .class
            .as_ref()
            .ok_or_else(|| Error::structural("program has no class declaration"))?;
        if class.name.trim().is_empty() {
            return Err(Error::structural("class declaration has an empty name"));
        }

        let imports = program.imports.iter().map(|i| i.qualified_name()).collect();
        let table = Self {
            class_name: class.name.clone(),
            superclass: class.extends.clone(),
            imports,
            fields: class.fields.iter().map(Symbol::from).collect(),
            methods: Self::collect_methods(class),
        };
        log::debug!(
            "symbol table for '{}': fields={} methods={} imports={}",
            table.class_name,
            table.fields.len(),
            table.methods.len(),
            table.imports.len()
        );
        Ok(table)
    }

    fn collect_methods(class: &ClassDecl) -> Vec<MethodSignature> {
        class
            .methods
            .iter()
            .map(|m| MethodSignature {
                name: m.name.clone(),
                return_type: Type::from(&m.return_type),
                parameters: m.parameters.iter().map(Symbol::from).collect(),
                locals: m.locals.iter().map(Symbol::from).collect(),
                is_public: m.is_public,
                is_static: m.is_static,
                is_varargs: m.is_varargs(),
            })
            .collect()
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Qualified import names in declaration order
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    /// First method declared with `name`
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.method(method).map(|m| &m.return_type)
    }

    pub fn parameters(&self, method: &str) -> &[Symbol] {
        self.method(method).map(|m| m.parameters.as_slice()).unwrap_or(&[])
    }

    pub fn locals(&self, method: &str) -> &[Symbol] {
        self.method(method).map(|m| m.locals.as_slice()).unwrap_or(&[])
    }

    /// Qualified import matching `name`, either exactly or by its last segment
    pub fn resolve_import(&self, name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|import| import.as_str() == name || import.rsplit('.').next() == Some(name))
            .map(String::as_str)
    }

    pub fn is_import(&self, name: &str) -> bool {
        self.resolve_import(name).is_some()
    }

    /// Scoped lookup used for code generation: local, then parameter, then field
    pub fn lookup_variable(&self, name: &str, method: &str) -> Option<(VarKind, &Symbol)> {
        if let Some(signature) = self.method(method) {
            if let Some(local) = signature.locals.iter().find(|l| l.name == name) {
                return Some((VarKind::Local, local));
            }
            if let Some(param) = signature.parameters.iter().find(|p| p.name == name) {
                return Some((VarKind::Parameter, param));
            }
        }
        self.field(name).map(|f| (VarKind::Field, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::ast::Program;

    #[test]
    fn build_requires_a_class() {
        let err = SymbolTable::build(&Program::new(vec![], None)).unwrap_err();
        assert!(err.to_string().contains("no class declaration"));
    }

    #[test]
    fn collects_members_in_order() {
        let class = ClassBuilder::new("Calc")
            .extends("Base")
            .field(ty("int"), "total")
            .field(array_ty("int"), "values")
            .method(
                MethodBuilder::new("sum", ty("int"))
                    .param(varargs_ty("int"), "xs")
                    .local(ty("int"), "acc"),
            )
            .build();
        let table = SymbolTable::build(&program(&["io.Console"], class)).unwrap();

        assert_eq!(table.class_name(), "Calc");
        assert_eq!(table.superclass(), Some("Base"));
        assert_eq!(table.imports(), ["io.Console".to_string()]);
        let names: Vec<_> = table.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["total", "values"]);
        let sum = table.method("sum").unwrap();
        assert!(sum.is_varargs);
        assert_eq!(sum.parameters[0].ty, Type::int_array());
        assert_eq!(table.resolve_import("Console"), Some("io.Console"));
        assert!(!table.is_import("io"));
        assert_eq!(table.lookup_variable("acc", "sum").map(|(k, _)| k), Some(VarKind::Local));
        assert_eq!(table.lookup_variable("total", "sum").map(|(k, _)| k), Some(VarKind::Field));
    }
}
