//! Memo caches for the simplifier and DNF converter; owned by a session.

use crate::{hash::NodeHash, logic::NodeRef};
use std::collections::HashMap;

///
/// NodeCache
///
/// Unbounded hash-keyed memo table. Nodes are immutable and content-addressed,
/// so an entry never goes stale; it is only dropped by `clear`.
///

#[derive(Debug)]
pub(crate) struct NodeCache {
    entries: HashMap<NodeHash, NodeRef>,
    enabled: bool,
    hits: u64,
    misses: u64,
}

impl NodeCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            entries: HashMap::new(),
            enabled,
            hits: 0,
            misses: 0,
        }
    }

    pub(crate) fn get(&mut self, hash: &NodeHash) -> Option<NodeRef> {
        if !self.enabled {
            return None;
        }

        let hit = self.entries.get(hash).cloned();
        if hit.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }

        hit
    }

    pub(crate) fn insert(&mut self, hash: NodeHash, node: NodeRef) {
        if self.enabled {
            self.entries.insert(hash, node);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}

///
/// LogicCache
///

#[derive(Debug)]
pub(crate) struct LogicCache {
    pub(crate) simplify: NodeCache,
    pub(crate) dnf: NodeCache,
}

impl LogicCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            simplify: NodeCache::new(enabled),
            dnf: NodeCache::new(enabled),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.simplify.clear();
        self.dnf.clear();
    }

    pub(crate) fn stats(&self) -> LogicCacheStats {
        LogicCacheStats {
            simplify: self.simplify.stats(),
            dnf: self.dnf.stats(),
        }
    }
}

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

///
/// LogicCacheStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LogicCacheStats {
    pub simplify: CacheStats,
    pub dnf: CacheStats,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LogicExprNode;

    #[test]
    fn disabled_cache_never_stores() {
        let mut cache = NodeCache::new(false);
        let node = LogicExprNode::literal(true);

        cache.insert(node.hash().clone(), node.clone());

        assert!(cache.get(node.hash()).is_none());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn stats_track_hits_and_misses_until_clear() {
        let mut cache = NodeCache::new(true);
        let node = LogicExprNode::literal(false);

        assert!(cache.get(node.hash()).is_none());
        cache.insert(node.hash().clone(), node.clone());
        assert!(cache.get(node.hash()).is_some());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                size: 1
            }
        );

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
