//! predcmp: decide how two boolean filter predicates relate (equal, subset,
//! superset, disjoint or overlap) without evaluating them against data.
//!
//! ## Crate layout
//! - `core`: hashing, the logic IR and its rewrites, transform, comparator.
//! - `error`: the public error type.
//! - `parser`: the seam for external query-language parsers.
//!
//! The free functions below run one comparison in a fresh `Session`; hold a
//! `Session` directly to share memo caches across many comparisons.

pub use predcmp_core as core;

pub mod error;
pub mod parser;

pub use error::Error;
pub use parser::{FilterParser, JsonParser};

use predcmp_core::{ast::ExprNode, compare::Relation, session::Session};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Classify how the documents matched by `left` relate to those matched by
/// `right`.
pub fn compare(left: &ExprNode, right: &ExprNode) -> Result<Relation, Error> {
    Ok(Session::default().compare_exprs(left, right)?)
}

/// Parse both filters with `parser`, then compare them.
pub fn compare_source<P: FilterParser>(
    parser: &P,
    left: &str,
    right: &str,
) -> Result<Relation, Error> {
    let left = parser.parse(left).map_err(Error::parse)?;
    let right = parser.parse(right).map_err(Error::parse)?;

    compare(&left, &right)
}

/// Compare two filters given as JSON-encoded expression trees.
pub fn compare_json(left: &str, right: &str) -> Result<Relation, Error> {
    let left = ExprNode::from_json(left)?;
    let right = ExprNode::from_json(right)?;

    compare(&left, &right)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, FilterParser, compare, compare_json, compare_source, core::prelude::*,
    };
}
