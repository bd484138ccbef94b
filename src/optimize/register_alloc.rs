//! Register allocation by interference-graph coloring
//!
//! - `this` and the parameters keep their fixed slots
//! - every other variable of the method is a node; two nodes interfere when
//!   both are present (live in, live out or written) at one instruction
//! - nodes are colored greedily by decreasing degree, ties broken by name,
//!   each taking the lowest slot its colored neighbours leave free
//!
//! There is no spilling: when the coloring needs more slots than the budget
//! the coloring is kept and an optimization diagnostic is reported.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::Span;
use crate::diagnostics::{Diagnostic, Stage};
use crate::error::Result;
use crate::ir::{IrMethod, IrProgram, VarScope};

use super::liveness::{self, Liveness};

/// Undirected graph over variable names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterferenceGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl InterferenceGraph {
    pub fn add_node(&mut self, name: &str) {
        self.edges.entry(name.to_string()).or_default();
    }

    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.edges.entry(a.to_string()).or_default().insert(b.to_string());
        self.edges.entry(b.to_string()).or_default().insert(a.to_string());
    }

    pub fn interferes(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).map(|n| n.contains(b)).unwrap_or(false)
    }

    pub fn degree(&self, name: &str) -> usize {
        self.edges.get(name).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn neighbours(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges.get(name).into_iter().flatten().map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every edge once, as an ordered pair
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(a, ns)| ns.iter().filter(move |b| a < *b).map(move |b| (a.as_str(), b.as_str())))
            .collect()
    }
}

/// Interference among the method's non-reserved variables
pub fn build_interference(method: &IrMethod, liveness: &Liveness) -> InterferenceGraph {
    let colorable = |name: &str| {
        method.var_table.get(name).map(|d| d.scope == VarScope::Local).unwrap_or(false)
    };

    let mut graph = InterferenceGraph::default();
    for (name, descriptor) in &method.var_table {
        if descriptor.scope == VarScope::Local {
            graph.add_node(name);
        }
    }
    for index in 0..method.instructions.len() {
        let present: Vec<String> = liveness.present_at(index).into_iter().filter(|n| colorable(n.as_str())).collect();
        for (i, a) in present.iter().enumerate() {
            for b in &present[i + 1..] {
                graph.add_edge(a, b);
            }
        }
    }
    graph
}

pub struct RegisterAllocator {
    budget: usize,
}

impl RegisterAllocator {
    /// `budget` is the slot limit per method; 0 packs slots without a limit
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Recolor `method`'s variable table; returns a diagnostic when the
    /// coloring needs more slots than the budget allows
    pub fn allocate(&self, method: &mut IrMethod) -> Result<Option<Diagnostic>> {
        let liveness = liveness::analyze(method)?;
        let graph = build_interference(method, &liveness);
        let base = method.reserved_registers();
        let colors = color(&graph, base);

        for (name, register) in &colors {
            if let Some(descriptor) = method.var_table.get_mut(name) {
                descriptor.register = *register;
            }
        }
        let needed = colors.values().map(|r| r + 1).max().unwrap_or(0).max(base);
        log::debug!(
            "register allocation for '{}': {} variable(s), {} edge(s), {} slot(s)",
            method.name,
            graph.len(),
            graph.edges().len(),
            needed
        );

        if self.budget > 0 && needed > self.budget {
            let message = format!(
                "method '{}' needs at least {} registers but the budget is {}",
                method.name, needed, self.budget
            );
            return Ok(Some(Diagnostic::warning(Stage::Optimization, Span::default(), message)));
        }
        Ok(None)
    }
}

/// Greedy coloring; slots start at `base`
pub fn color(graph: &InterferenceGraph, base: usize) -> BTreeMap<String, usize> {
    let mut order: Vec<&str> = graph.nodes().collect();
    order.sort_by(|a, b| graph.degree(b).cmp(&graph.degree(a)).then_with(|| a.cmp(b)));

    let mut colors: BTreeMap<String, usize> = BTreeMap::new();
    for name in order {
        let taken: BTreeSet<usize> = graph.neighbours(name).filter_map(|n| colors.get(n).copied()).collect();
        let slot = (base..).find(|slot| !taken.contains(slot)).unwrap_or(base);
        colors.insert(name.to_string(), slot);
    }
    colors
}

/// Allocate every method of `ir`, collecting budget diagnostics
pub fn allocate_registers(ir: &mut IrProgram, budget: usize) -> Result<Vec<Diagnostic>> {
    let allocator = RegisterAllocator::new(budget);
    let mut diagnostics = Vec::new();
    for method in &mut ir.methods {
        if let Some(diagnostic) = allocator.allocate(method)? {
            diagnostics.push(diagnostic);
        }
    }
    Ok(diagnostics)
}
