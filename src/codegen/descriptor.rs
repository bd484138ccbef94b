//! JVM type descriptors and class path resolution for the emitter

use crate::consts::{OBJECT_PATH, STRING_PATH};
use crate::ir::{IrProgram, IrType};

/// Maps class names as written in the source to internal JVM paths
#[derive(Debug, Clone)]
pub struct ClassPaths {
    class_name: String,
    imports: Vec<String>,
}

impl ClassPaths {
    pub fn new(ir: &IrProgram) -> Self {
        Self { class_name: ir.class_name.clone(), imports: ir.imports.clone() }
    }

    /// `java/util/List` for an imported `List` (or `java.util.List`); the class
    /// itself and unknown names stay as written
    pub fn resolve(&self, name: &str) -> String {
        if name == self.class_name {
            return name.to_string();
        }
        let imported = self
            .imports
            .iter()
            .find(|import| import.as_str() == name || import.rsplit('.').next() == Some(name));
        match imported {
            Some(qualified) => qualified.replace('.', "/"),
            None => name.replace('.', "/"),
        }
    }

    /// Path of the superclass, `java/lang/Object` when there is none
    pub fn superclass(&self, superclass: Option<&str>) -> String {
        superclass.map(|s| self.resolve(s)).unwrap_or_else(|| OBJECT_PATH.to_string())
    }

    pub fn type_descriptor(&self, ty: &IrType) -> String {
        match ty {
            IrType::Int32 => "I".to_string(),
            IrType::Bool => "Z".to_string(),
            IrType::Void => "V".to_string(),
            IrType::String => format!("L{};", STRING_PATH),
            IrType::Array(inner) => format!("[{}", self.type_descriptor(inner)),
            IrType::Class(name) => format!("L{};", self.resolve(name)),
        }
    }

    pub fn method_descriptor<'t>(&self, params: impl IntoIterator<Item = &'t IrType>, ret: &IrType) -> String {
        let mut descriptor = String::from("(");
        for param in params {
            descriptor.push_str(&self.type_descriptor(param));
        }
        descriptor.push(')');
        descriptor.push_str(&self.type_descriptor(ret));
        descriptor
    }

    /// Internal path of the class a value of type `ty` is an instance of
    pub fn class_of(&self, ty: &IrType) -> String {
        match ty {
            IrType::Class(name) => self.resolve(name),
            IrType::String => STRING_PATH.to_string(),
            other => self.type_descriptor(other),
        }
    }
}
