//! Boolean-algebra IR and the rewrites that run over it.

mod cache;
mod dnf;
mod generate;
mod inequality;
mod node;
mod node_set;
mod simplify;

pub use cache::{CacheStats, LogicCacheStats};
pub use generate::generate;
pub use inequality::{InequalityDeduction, find_inequality_truths};
pub use node::{
    Group, LogicExprNode, NodeKind, NodeRef, hashify, single_variable_equality_hash,
};
pub use node_set::NodeSet;

pub(crate) use cache::LogicCache;
pub(crate) use dnf::disjunctive_normal_form;
pub(crate) use inequality::create_inequality_formula;
pub(crate) use simplify::simplify;
