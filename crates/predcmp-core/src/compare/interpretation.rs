//! Atom discovery and streamed interpretation enumeration.

use crate::{
    hash::NodeHash,
    logic::{Group, LogicExprNode, NodeRef, NodeSet},
};
use std::{
    collections::{BTreeMap, HashMap},
    ops::ControlFlow,
};

///
/// AtomSpace
///
/// Every atom the comparator must assign a truth value, laid out as odometer
/// digits. Equality atoms on the same group share one digit (at most one of
/// them can hold): digit 0 means none holds, digit `i` means the `i`-th one
/// does. Every other atom gets a binary digit of its own.
///

#[derive(Debug)]
pub(crate) struct AtomSpace {
    slots: HashMap<NodeHash, (usize, usize)>,
    radices: Vec<usize>,
    buckets: usize,
}

impl AtomSpace {
    pub(crate) fn discover<'a>(trees: impl IntoIterator<Item = &'a NodeRef>) -> Self {
        let mut atoms = NodeSet::new();
        for tree in trees {
            collect_atoms(tree, &mut atoms);
        }

        let mut buckets = BTreeMap::<Group, Vec<&NodeRef>>::new();
        let mut free = Vec::new();
        for atom in &atoms {
            match atom.as_ref() {
                LogicExprNode::SingleVariableEquality { group, .. }
                | LogicExprNode::SingleVariableNumericEquality { group, .. } => {
                    buckets.entry(group.clone()).or_default().push(atom);
                }
                _ => free.push(atom),
            }
        }

        let mut space = Self {
            slots: HashMap::new(),
            radices: Vec::new(),
            buckets: 0,
        };
        for members in buckets.into_values() {
            if members.len() < 2 {
                free.extend(members);
                continue;
            }

            let digit = space.radices.len();
            for (i, member) in members.iter().enumerate() {
                space.slots.insert(member.hash().clone(), (digit, i + 1));
            }
            space.radices.push(members.len() + 1);
            space.buckets += 1;
        }
        for atom in free {
            let digit = space.radices.len();
            space.slots.insert(atom.hash().clone(), (digit, 1));
            space.radices.push(2);
        }

        space
    }

    pub(crate) fn atom_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) const fn bucket_count(&self) -> usize {
        self.buckets
    }

    /// Number of interpretations, or `None` when it does not fit in a `u64`.
    pub(crate) fn interpretation_count(&self) -> Option<u64> {
        self.radices
            .iter()
            .try_fold(1u64, |count, &radix| count.checked_mul(u64::try_from(radix).ok()?))
    }

    /// Visit every interpretation in odometer order until `visit` breaks.
    pub(crate) fn try_for_each<B>(
        &self,
        mut visit: impl FnMut(&Interpretation<'_>) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let mut digits = vec![0; self.radices.len()];

        loop {
            visit(&Interpretation {
                space: self,
                digits: &digits,
            })?;

            if !advance(&mut digits, &self.radices) {
                return ControlFlow::Continue(());
            }
        }
    }
}

// Step the odometer; returns false once every digit has wrapped.
fn advance(digits: &mut [usize], radices: &[usize]) -> bool {
    for (digit, radix) in digits.iter_mut().zip(radices).rev() {
        *digit += 1;
        if *digit < *radix {
            return true;
        }
        *digit = 0;
    }

    false
}

fn collect_atoms(node: &NodeRef, atoms: &mut NodeSet) {
    match node.as_ref() {
        LogicExprNode::And { children, .. } | LogicExprNode::Or { children, .. } => {
            for child in children {
                collect_atoms(child, atoms);
            }
        }
        LogicExprNode::Not { child, .. } => collect_atoms(child, atoms),
        LogicExprNode::Literal(_) => {}
        _ => {
            atoms.add(node.clone());
        }
    }
}

///
/// Interpretation
///
/// One total truth assignment over the atom space.
///

pub(crate) struct Interpretation<'a> {
    space: &'a AtomSpace,
    digits: &'a [usize],
}

impl Interpretation<'_> {
    pub(crate) fn holds(&self, atom: &NodeHash) -> bool {
        self.space
            .slots
            .get(atom)
            .is_some_and(|&(digit, value)| self.digits[digit] == value)
    }

    pub(crate) fn evaluate(&self, node: &LogicExprNode) -> bool {
        match node {
            LogicExprNode::And { children, .. } => {
                children.iter().all(|child| self.evaluate(child))
            }
            LogicExprNode::Or { children, .. } => {
                children.iter().any(|child| self.evaluate(child))
            }
            LogicExprNode::Not { child, .. } => !self.evaluate(child),
            LogicExprNode::Literal(value) => *value,
            atom => self.holds(atom.hash()),
        }
    }
}

///
/// TESTS
///
