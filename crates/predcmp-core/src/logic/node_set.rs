use crate::{hash::NodeHash, logic::NodeRef};
use std::collections::BTreeSet;

///
/// NodeSet
///
/// Insertion-ordered, hash-deduplicated collection of IR nodes.
///
/// Membership is decided by each node's canonical hash, never by identity.
/// Iteration follows first-insert order; for And/Or children that order
/// carries no meaning and only keeps debug output deterministic.
///

#[derive(Clone, Debug, Default)]
pub struct NodeSet {
    members: Vec<NodeRef>,
    hashes: BTreeSet<NodeHash>,
}

impl NodeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node; returns `false` when a node with the same hash exists.
    pub fn add(&mut self, node: NodeRef) -> bool {
        if !self.hashes.insert(node.hash().clone()) {
            return false;
        }
        self.members.push(node);

        true
    }

    #[must_use]
    pub fn has(&self, hash: &NodeHash) -> bool {
        self.hashes.contains(hash)
    }

    #[must_use]
    pub fn get(&self, hash: &NodeHash) -> Option<&NodeRef> {
        if !self.has(hash) {
            return None;
        }

        self.members.iter().find(|member| member.hash() == hash)
    }

    /// Remove the member with `hash`; returns whether anything was removed.
    pub fn delete(&mut self, hash: &NodeHash) -> bool {
        if !self.hashes.remove(hash) {
            return false;
        }
        self.members.retain(|member| member.hash() != hash);

        true
    }

    #[must_use]
    pub fn first(&self) -> Option<&NodeRef> {
        self.members.first()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.members.iter()
    }

    /// Hashes of all members, in sorted order.
    pub fn hashes(&self) -> impl Iterator<Item = &NodeHash> {
        self.hashes.iter()
    }

    /// Build a new set from the image of every member.
    ///
    /// Members whose images collide collapse into one.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(&NodeRef) -> NodeRef) -> Self {
        self.members.iter().map(|member| f(member)).collect()
    }

    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&NodeRef) -> bool) -> Self {
        self.members
            .iter()
            .filter(|member| predicate(member))
            .cloned()
            .collect()
    }

    pub fn reduce<T>(&self, init: T, f: impl FnMut(T, &NodeRef) -> T) -> T {
        self.members.iter().fold(init, f)
    }
}

impl FromIterator<NodeRef> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeRef>>(iter: I) -> Self {
        let mut set = Self::new();
        for node in iter {
            set.add(node);
        }

        set
    }
}

impl Extend<NodeRef> for NodeSet {
    fn extend<I: IntoIterator<Item = NodeRef>>(&mut self, iter: I) {
        for node in iter {
            self.add(node);
        }
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a NodeRef;
    type IntoIter = std::slice::Iter<'a, NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

///
/// TESTS
///
