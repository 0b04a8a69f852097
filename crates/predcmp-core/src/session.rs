use crate::{
    ast::ExprNode,
    compare::{self, Relation},
    error::InternalError,
    logic::{self, LogicCache, LogicCacheStats, NodeRef},
    obs::log_debug,
    transform::transform,
};

///
/// SessionConfig
///
/// Tuning knobs for one comparison session.
///
/// - `cache_enabled`: memoize simplify / DNF results by node hash
/// - `max_interpretations`: refuse to enumerate more interpretations than
///   this and answer `Overlap` instead; `None` means unlimited
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    pub cache_enabled: bool,
    pub max_interpretations: Option<u64>,
}

impl SessionConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache_enabled: true,
            max_interpretations: None,
        }
    }

    #[must_use]
    pub const fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_interpretations(mut self, limit: u64) -> Self {
        self.max_interpretations = Some(limit);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

///
/// Session
///
/// Owns the memo caches every rewrite shares. Caches grow without bound
/// until `reset`; nodes are content-addressed, so entries never go stale.
/// A session is single-threaded; wrap it in a lock to share it.
///

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    cache: LogicCache,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cache: LogicCache::new(config.cache_enabled),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn simplify(&mut self, node: &NodeRef) -> NodeRef {
        logic::simplify(&mut self.cache, node)
    }

    #[must_use]
    pub fn disjunctive_normal_form(&mut self, node: &NodeRef) -> NodeRef {
        logic::disjunctive_normal_form(&mut self.cache, node)
    }

    pub fn create_inequality_formula(&mut self, node: &NodeRef) -> Result<NodeRef, InternalError> {
        logic::create_inequality_formula(&mut self.cache, node)
    }

    /// Classify how `left` relates to `right`.
    pub fn compare(&mut self, left: &NodeRef, right: &NodeRef) -> Result<Relation, InternalError> {
        compare::compare(
            &mut self.cache,
            self.config.max_interpretations,
            left,
            right,
        )
    }

    /// Transform both expressions and classify how they relate.
    pub fn compare_exprs(
        &mut self,
        left: &ExprNode,
        right: &ExprNode,
    ) -> Result<Relation, InternalError> {
        self.compare(&transform(left), &transform(right))
    }

    /// Drop every memoized entry and zero the counters.
    pub fn reset(&mut self) {
        let stats = self.cache.stats();
        self.cache.clear();

        log_debug!(
            component = "session",
            event = "cache_reset",
            simplify_entries = stats.simplify.size,
            dnf_entries = stats.dnf.size,
        );
    }

    #[must_use]
    pub fn cache_stats(&self) -> LogicCacheStats {
        self.cache.stats()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

///
/// TESTS
///
