//! Core engine for predcmp: structural hashing, the boolean IR and its
//! rewrites (simplify, DNF, inequality deduction), the AST transform and the
//! comparator, plus the session that owns their memo caches.
#![warn(unreachable_pub)]

pub(crate) mod obs;

// public exports are one module level down
pub mod ast;
pub mod compare;
pub mod error;
pub mod hash;
pub mod logic;
pub mod session;
pub mod transform;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// Builders and rewrites stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        ast::{ExprNode, OpCode},
        compare::Relation,
        logic::{LogicExprNode, NodeRef},
        session::{Session, SessionConfig},
    };
}
