//! Statement-level IR generation
//!
//! One `IrGenerator` per compilation owns the temporary and label counters, so
//! `tmpN` and label suffixes are unique across the whole class. Each method is
//! lowered by a `MethodLowering` that appends to the method's instruction list
//! and records labels as they are placed.

use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::consts::{INIT, THIS};
use crate::error::{Error, Result};
use crate::symtab::{SymbolTable, Type, TypeResolver, VarKind};

use super::*;

pub struct IrGenerator<'a> {
    pub(super) table: &'a SymbolTable,
    pub(super) resolver: TypeResolver<'a>,
    next_temp: usize,
    next_label: usize,
}

/// Lower a reviewed program to IR
pub fn generate(program: &Program, table: &SymbolTable) -> Result<IrProgram> {
    IrGenerator::new(table).generate(program)
}

impl<'a> IrGenerator<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table, resolver: TypeResolver::new(table), next_temp: 0, next_label: 0 }
    }

    pub fn generate(&mut self, program: &Program) -> Result<IrProgram> {
        let class = program.class.as_ref().ok_or_else(|| Error::structural("program has no class declaration"))?;

        let fields = self
            .table
            .fields()
            .iter()
            .map(|f| IrField { name: f.name.clone(), ty: IrType::from(&f.ty) })
            .collect();

        let mut methods = vec![self.default_constructor()];
        for method in &class.methods {
            methods.push(self.lower_method(method)?);
        }
        log::debug!("generated IR for '{}': {} method(s)", class.name, methods.len());

        Ok(IrProgram {
            class_name: self.table.class_name().to_string(),
            superclass: self.table.superclass().map(str::to_string),
            imports: self.table.imports().to_vec(),
            fields,
            methods,
        })
    }

    fn default_constructor(&self) -> IrMethod {
        let class_name = self.table.class_name();
        let this = Element::this(class_name);
        let mut var_table = HashMap::new();
        var_table.insert(THIS.to_string(), Descriptor { register: 0, ty: this.ty().clone(), scope: VarScope::This });
        IrMethod {
            name: class_name.to_string(),
            is_public: true,
            is_static: false,
            is_constructor: true,
            params: Vec::new(),
            return_type: IrType::Void,
            instructions: vec![
                Instruction::Call {
                    kind: CallKind::InvokeSpecial,
                    caller: this,
                    method: Some(INIT.to_string()),
                    args: Vec::new(),
                    ty: IrType::Void,
                },
                Instruction::Return { value: None },
            ],
            labels: HashMap::new(),
            var_table,
        }
    }

    fn lower_method(&mut self, method: &MethodDecl) -> Result<IrMethod> {
        let params: Vec<Element> = method
            .parameters
            .iter()
            .map(|p| Element::operand(p.name.clone(), IrType::from(&Type::from(&p.type_ref))))
            .collect();
        let return_type = IrType::from(&Type::from(&method.return_type));
        let reserved = method.parameters.iter().chain(&method.locals).map(|v| v.name.clone()).collect();

        let mut lowering =
            MethodLowering { gen: self, method, reserved, code: Vec::new(), labels: HashMap::new() };
        for stmt in &method.body {
            lowering.statement(stmt)?;
        }
        if return_type.is_void() && !lowering.ends_with_return() {
            lowering.code.push(Instruction::Return { value: None });
        }
        let MethodLowering { code, labels, .. } = lowering;

        let var_table = build_var_table(self.table.class_name(), method.is_static, &params, &code);
        log::trace!(
            "lowered '{}': {} instruction(s), {} label(s), {} variable(s)",
            method.name,
            code.len(),
            labels.len(),
            var_table.len()
        );
        Ok(IrMethod {
            name: method.name.clone(),
            is_public: method.is_public,
            is_static: method.is_static,
            is_constructor: false,
            params,
            return_type,
            instructions: code,
            labels,
            var_table,
        })
    }

    fn fresh_label_suffix(&mut self) -> usize {
        let n = self.next_label;
        self.next_label += 1;
        n
    }
}

/// Lowering state for one method body
pub(super) struct MethodLowering<'g, 'a> {
    pub(super) gen: &'g mut IrGenerator<'a>,
    pub(super) method: &'g MethodDecl,
    /// Declared names a temporary must not shadow
    reserved: HashSet<String>,
    pub(super) code: Vec<Instruction>,
    labels: HashMap<String, usize>,
}

impl<'a> MethodLowering<'_, 'a> {
    pub(super) fn table(&self) -> &'a SymbolTable {
        self.gen.table
    }

    /// Fresh temporary operand of type `ty`
    pub(super) fn temp(&mut self, ty: IrType) -> Element {
        loop {
            let name = format!("tmp{}", self.gen.next_temp);
            self.gen.next_temp += 1;
            if !self.reserved.contains(&name) {
                return Element::operand(name, ty);
            }
        }
    }

    fn place_label(&mut self, label: String) -> Result<()> {
        if self.labels.contains_key(&label) {
            return Err(Error::internal(format!("label '{}' placed twice in '{}'", label, self.method.name)));
        }
        self.labels.insert(label, self.code.len());
        Ok(())
    }

    /// Control cannot fall off the current end of the code: the last
    /// instruction returns and no jump targets a label placed after it
    fn ends_with_return(&self) -> bool {
        if !matches!(self.code.last(), Some(Instruction::Return { .. })) {
            return false;
        }
        let at_end = self.code.len();
        let mut trailing = self.labels.iter().filter(|(_, i)| **i == at_end).map(|(label, _)| label.as_str());
        !trailing.any(|label| self.code.iter().any(|instruction| instruction.target() == Some(label)))
    }

    fn statement(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Block(block) => {
                for inner in &block.statements {
                    self.statement(inner)?;
                }
                Ok(())
            }
            Stmt::Expr(s) => {
                if let Expr::MethodCall(call) = &s.expr {
                    let mut prelude = Vec::new();
                    let call = self.call_instruction(call, Some(&IrType::Void), &mut prelude)?;
                    self.code.extend(prelude);
                    self.code.push(call);
                } else {
                    let lowered = self.expr(&s.expr, None)?;
                    self.code.extend(lowered.prelude);
                }
                Ok(())
            }
            Stmt::Assign(s) => self.assignment(s),
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(value) => {
                        let hint = IrType::from(&Type::from(&self.method.return_type));
                        let lowered = self.expr(value, Some(&hint))?;
                        self.code.extend(lowered.prelude);
                        Some(lowered.code)
                    }
                    None => None,
                };
                self.code.push(Instruction::Return { value });
                Ok(())
            }
            Stmt::If(s) => self.if_statement(s),
            Stmt::While(s) => self.while_statement(s),
        }
    }

    fn assignment(&mut self, assign: &AssignStmt) -> Result<()> {
        match &assign.target {
            AssignTarget::Variable(id) => {
                let (kind, symbol) = self
                    .table()
                    .lookup_variable(&id.name, &self.method.name)
                    .map(|(kind, symbol)| (kind, symbol.clone()))
                    .ok_or_else(|| Error::internal(format!("assignment to unresolved name '{}'", id.name)))?;
                let ty = IrType::from(&symbol.ty);
                let lowered = self.expr(&assign.value, Some(&ty))?;
                let mut prelude = lowered.prelude;

                if kind == VarKind::Field {
                    self.code.extend(prelude);
                    self.code.push(Instruction::PutField {
                        object: Element::this(self.table().class_name()),
                        field: Element::operand(id.name.clone(), ty),
                        value: lowered.code,
                    });
                    return Ok(());
                }

                let dest = Element::operand(id.name.clone(), ty);
                // Store the last computed value straight into the destination
                // instead of copying it out of its temporary.
                let retarget = matches!(prelude.last(), Some(Instruction::Assign { dest: last, .. }) if *last == lowered.code);
                let rhs = match prelude.pop() {
                    Some(Instruction::Assign { rhs, .. }) if retarget => *rhs,
                    Some(other) => {
                        prelude.push(other);
                        Instruction::NoOp(lowered.code)
                    }
                    None => Instruction::NoOp(lowered.code),
                };
                self.code.extend(prelude);
                self.code.push(Instruction::assign(dest, rhs));
                Ok(())
            }
            AssignTarget::Element(access) => {
                let store = self.array_operand(access)?;
                let element_type = store.ty().clone();
                let value = self.expr(&assign.value, Some(&element_type))?;
                self.code.extend(value.prelude);
                self.code.push(Instruction::assign(store, Instruction::NoOp(value.code)));
                Ok(())
            }
        }
    }

    /// `base[index]` with both parts in operands; prelude goes straight to the code
    fn array_operand(&mut self, access: &ArrayAccessExpr) -> Result<Element> {
        let mut prelude = Vec::new();
        let (name, index, ty) = self.indexed(access, &mut prelude)?;
        self.code.extend(prelude);
        Ok(Element::ArrayOperand { name, index: Box::new(index), ty })
    }

    fn if_statement(&mut self, stmt: &IfStmt) -> Result<()> {
        let n = self.gen.fresh_label_suffix();
        let then_label = format!("then_{}", n);
        let else_label = format!("else_{}", n);
        let endif_label = format!("endif_{}", n);

        let condition = self.condition(&stmt.condition)?;
        self.code.push(Instruction::branch(condition, then_label.clone()));
        let fallthrough = if stmt.else_branch.is_some() { &else_label } else { &endif_label };
        self.code.push(Instruction::goto(fallthrough.clone()));

        self.place_label(then_label)?;
        self.statement(&stmt.then_branch)?;
        if let Some(else_branch) = &stmt.else_branch {
            if !self.ends_with_return() {
                self.code.push(Instruction::goto(endif_label.clone()));
            }
            self.place_label(else_label)?;
            self.statement(else_branch)?;
        }
        self.place_label(endif_label)
    }

    fn while_statement(&mut self, stmt: &WhileStmt) -> Result<()> {
        let n = self.gen.fresh_label_suffix();
        let cond_label = format!("while_cond_{}", n);
        let body_label = format!("while_body_{}", n);

        self.code.push(Instruction::goto(cond_label.clone()));
        self.place_label(body_label.clone())?;
        self.statement(&stmt.body)?;
        self.place_label(cond_label)?;
        let condition = self.condition(&stmt.condition)?;
        self.code.push(Instruction::branch(condition, body_label));
        self.place_label(format!("while_end_{}", n))
    }

    /// Branch condition: a comparison or negation is kept as the branch's own
    /// instruction so the emitter can test it directly
    fn condition(&mut self, condition: &Expr) -> Result<Instruction> {
        match condition {
            Expr::Parenthesized(p) => self.condition(&p.inner),
            Expr::Binary(b) => {
                let mut prelude = Vec::new();
                let instruction = self.binary_instruction(b, &mut prelude)?;
                self.code.extend(prelude);
                Ok(instruction)
            }
            Expr::Unary(u) => {
                let operand = self.expr(&u.operand, Some(&IrType::Bool))?;
                self.code.extend(operand.prelude);
                Ok(Instruction::UnaryOp { op: u.op, operand: operand.code, ty: IrType::Bool })
            }
            other => {
                let lowered = self.expr(other, Some(&IrType::Bool))?;
                self.code.extend(lowered.prelude);
                Ok(Instruction::NoOp(lowered.code))
            }
        }
    }
}

/// Number `this`, then parameters, then every other variable in order of
/// first appearance. Field operands and static-call class names get no slot.
fn build_var_table(
    class_name: &str,
    is_static: bool,
    params: &[Element],
    code: &[Instruction],
) -> HashMap<String, Descriptor> {
    let mut table = HashMap::new();
    let mut next = 0;
    if !is_static {
        table.insert(THIS.to_string(), Descriptor { register: 0, ty: IrType::Class(class_name.to_string()), scope: VarScope::This });
        next = 1;
    }
    for param in params {
        if let Element::Operand { name, ty } = param {
            table.insert(name.clone(), Descriptor { register: next, ty: ty.clone(), scope: VarScope::Parameter });
            next += 1;
        }
    }

    let mut record = |element: &Element, table: &mut HashMap<String, Descriptor>| {
        let mut pending = vec![element];
        while let Some(element) = pending.pop() {
            let (name, ty) = match element {
                Element::Literal { .. } => continue,
                Element::Operand { name, ty } => (name, ty.clone()),
                Element::ArrayOperand { name, index, ty } => {
                    pending.push(index);
                    (name, IrType::Array(Box::new(ty.clone())))
                }
            };
            if !table.contains_key(name) {
                table.insert(name.clone(), Descriptor { register: next, ty, scope: VarScope::Local });
                next += 1;
            }
        }
    };
    for instruction in code {
        if let Instruction::Assign { dest, .. } = instruction {
            record(dest, &mut table);
        }
        for element in instruction.read_elements() {
            record(element, &mut table);
        }
    }
    table
}
