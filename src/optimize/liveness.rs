//! Backward liveness over one IR method
//!
//! Each instruction is its own node. Successors follow jumps, conditional
//! branches fall through as well, and `ret` ends the flow. Only names in the
//! method's variable table take part, so field names and static-call class
//! names never become live.

use std::collections::BTreeSet;

use crate::consts::LIVENESS_MAX_ITERS;
use crate::error::Result;
use crate::ir::{Element, Instruction, IrMethod};

pub type NameSet = BTreeSet<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Liveness {
    pub successors: Vec<Vec<usize>>,
    pub defs: Vec<NameSet>,
    pub uses: Vec<NameSet>,
    pub live_in: Vec<NameSet>,
    pub live_out: Vec<NameSet>,
}

impl Liveness {
    /// Every name live into, live out of or written by instruction `index`
    pub fn present_at(&self, index: usize) -> NameSet {
        let mut names = self.live_in[index].clone();
        names.extend(self.live_out[index].iter().cloned());
        names.extend(self.defs[index].iter().cloned());
        names
    }
}

pub fn successors(method: &IrMethod) -> Result<Vec<Vec<usize>>> {
    let count = method.instructions.len();
    let mut successors = Vec::with_capacity(count);
    for (index, instruction) in method.instructions.iter().enumerate() {
        let next = index + 1;
        let mut targets = match instruction {
            Instruction::Return { .. } => Vec::new(),
            Instruction::Goto { label } => vec![method.label_index(label)?],
            Instruction::CondBranch { label, .. } => vec![method.label_index(label)?, next],
            _ => vec![next],
        };
        // A label may sit past the last instruction; nothing follows it.
        targets.retain(|&t| t < count);
        targets.dedup();
        successors.push(targets);
    }
    Ok(successors)
}

/// Name written by `instruction`: the destination of a whole-variable assignment
pub fn def_of(instruction: &Instruction) -> Option<&str> {
    match instruction {
        Instruction::Assign { dest: Element::Operand { name, .. }, .. } => Some(name),
        _ => None,
    }
}

/// Names read by `instruction`. An indexed store reads its array and index.
pub fn uses_of(instruction: &Instruction) -> Vec<&str> {
    instruction.read_elements().into_iter().flat_map(Element::variables).collect()
}

pub fn analyze(method: &IrMethod) -> Result<Liveness> {
    let successors = successors(method)?;
    let tracked = |name: &str| method.var_table.contains_key(name);

    let defs: Vec<NameSet> = method
        .instructions
        .iter()
        .map(|i| def_of(i).filter(|n| tracked(*n)).map(str::to_string).into_iter().collect())
        .collect();
    let uses: Vec<NameSet> = method
        .instructions
        .iter()
        .map(|i| uses_of(i).into_iter().filter(|n| tracked(*n)).map(str::to_string).collect())
        .collect();

    let count = method.instructions.len();
    let mut live_in = vec![NameSet::new(); count];
    let mut live_out = vec![NameSet::new(); count];

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for index in (0..count).rev() {
            let out: NameSet = successors[index].iter().flat_map(|&s| live_in[s].iter().cloned()).collect();
            let mut inn = uses[index].clone();
            inn.extend(out.difference(&defs[index]).cloned());

            if inn != live_in[index] || out != live_out[index] {
                live_in[index] = inn;
                live_out[index] = out;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        if rounds >= LIVENESS_MAX_ITERS {
            log::warn!("liveness for '{}' stopped at the iteration cap", method.name);
            break;
        }
    }
    log::trace!("liveness for '{}' settled after {} round(s)", method.name, rounds);

    Ok(Liveness { successors, defs, uses, live_in, live_out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::ir::{Descriptor, IrType, VarScope};
    use std::collections::HashMap;

    fn int(name: &str) -> Element {
        Element::operand(name, IrType::Int32)
    }

    fn method(instructions: Vec<Instruction>, labels: &[(&str, usize)], vars: &[&str]) -> IrMethod {
        let var_table = vars
            .iter()
            .enumerate()
            .map(|(i, v)| (v.to_string(), Descriptor { register: i, ty: IrType::Int32, scope: VarScope::Local }))
            .collect();
        IrMethod {
            name: "m".into(),
            is_public: true,
            is_static: true,
            is_constructor: false,
            params: Vec::new(),
            return_type: IrType::Int32,
            instructions,
            labels: labels.iter().map(|(l, i)| (l.to_string(), *i)).collect::<HashMap<_, _>>(),
            var_table,
        }
    }

    fn set(names: &[&str]) -> NameSet {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn straight_line_liveness() {
        let m = method(
            vec![
                Instruction::assign(int("a"), Instruction::NoOp(Element::literal(1, IrType::Int32))),
                Instruction::assign(
                    int("b"),
                    Instruction::BinaryOp {
                        op: BinaryOp::Add,
                        left: int("a"),
                        right: Element::literal(2, IrType::Int32),
                        ty: IrType::Int32,
                    },
                ),
                Instruction::Return { value: Some(int("b")) },
            ],
            &[],
            &["a", "b"],
        );
        let live = analyze(&m).unwrap();
        assert_eq!(live.live_out[0], set(&["a"]));
        assert_eq!(live.live_in[1], set(&["a"]));
        assert_eq!(live.live_out[1], set(&["b"]));
        assert!(live.live_out[2].is_empty());
        assert_eq!(live.present_at(1), set(&["a", "b"]));
    }

    #[test]
    fn loop_keeps_counter_live_across_the_back_edge() {
        // goto cond; body: i := i + 1; cond: if (i < 10) goto body; ret i
        let m = method(
            vec![
                Instruction::goto("cond"),
                Instruction::assign(
                    int("i"),
                    Instruction::BinaryOp {
                        op: BinaryOp::Add,
                        left: int("i"),
                        right: Element::literal(1, IrType::Int32),
                        ty: IrType::Int32,
                    },
                ),
                Instruction::branch(
                    Instruction::BinaryOp {
                        op: BinaryOp::Lt,
                        left: int("i"),
                        right: Element::literal(10, IrType::Int32),
                        ty: IrType::Bool,
                    },
                    "body",
                ),
                Instruction::Return { value: Some(int("i")) },
            ],
            &[("body", 1), ("cond", 2)],
            &["i"],
        );
        let live = analyze(&m).unwrap();
        assert_eq!(live.successors, vec![vec![2], vec![2], vec![1, 3], vec![]]);
        assert_eq!(live.live_out[1], set(&["i"]));
        assert_eq!(live.live_out[2], set(&["i"]));
    }

    #[test]
    fn unknown_label_is_an_internal_error() {
        let m = method(vec![Instruction::goto("nowhere")], &[], &[]);
        assert!(analyze(&m).is_err());
    }
}
