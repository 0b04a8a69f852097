//! Static comparison of two predicates by bounded truth-table enumeration.

mod interpretation;

use crate::{
    error::InternalError,
    logic::{LogicCache, LogicExprNode, NodeRef, create_inequality_formula, simplify},
    obs::{log_debug, log_trace, log_warn},
};
use interpretation::AtomSpace;
use std::{fmt, ops::ControlFlow};

///
/// Relation
///
/// How the set of documents matched by one predicate relates to the set
/// matched by another.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Relation {
    Equal,
    Subset,
    Superset,
    Disjoint,
    Overlap,
}

impl Relation {
    /// The relation seen from the other side of the comparison.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Subset => Self::Superset,
            Self::Superset => Self::Subset,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Subset => "subset",
            Self::Superset => "superset",
            Self::Disjoint => "disjoint",
            Self::Overlap => "overlap",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Verdict
///
/// Running state of the four provable relations. Each flag stays set only
/// while every interpretation seen so far agrees with it.
///

#[derive(Clone, Copy, Debug)]
struct Verdict {
    equal: bool,
    disjoint: bool,
    subset: bool,
    superset: bool,
}

impl Verdict {
    const fn new() -> Self {
        Self {
            equal: true,
            disjoint: true,
            subset: true,
            superset: true,
        }
    }

    // A∧B is evaluated as the conjunction of the two augmented vectors.
    const fn observe(&mut self, left: bool, right: bool) {
        let both = left && right;

        self.equal &= left == right;
        self.disjoint &= !both;
        self.subset &= both == left;
        self.superset &= both == right;
    }

    const fn undecided(self) -> bool {
        self.equal || self.disjoint || self.subset || self.superset
    }

    const fn relation(self) -> Relation {
        if self.equal {
            Relation::Equal
        } else if self.disjoint {
            Relation::Disjoint
        } else if self.subset {
            Relation::Subset
        } else if self.superset {
            Relation::Superset
        } else {
            Relation::Overlap
        }
    }
}

///
/// Compare two IR trees.
///
/// Both sides are augmented with the inequality implications of `Or(A, B)`,
/// then evaluated under every interpretation of their atoms. The first
/// relation that holds across all interpretations wins, in the order equal,
/// disjoint, subset, superset; anything unproven is `Overlap`.
///
/// With a `budget`, a comparison that would need more interpretations than
/// allowed answers `Overlap` without enumerating.
///
pub(crate) fn compare(
    cache: &mut LogicCache,
    budget: Option<u64>,
    left: &NodeRef,
    right: &NodeRef,
) -> Result<Relation, InternalError> {
    let either = LogicExprNode::or([left.clone(), right.clone()]);
    let formula = create_inequality_formula(cache, &either)?;

    let left = simplify(cache, &LogicExprNode::and([left.clone(), formula.clone()]));
    let right = simplify(cache, &LogicExprNode::and([right.clone(), formula]));

    let space = AtomSpace::discover([&left, &right]);
    let count = space.interpretation_count();

    log_debug!(
        component = "compare",
        event = "compare_start",
        atoms = space.atom_count(),
        buckets = space.bucket_count(),
        interpretations = ?count,
    );

    if let Some(limit) = budget
        && count.is_none_or(|count| count > limit)
    {
        log_warn!(
            component = "compare",
            event = "budget_exhausted",
            interpretations = ?count,
            limit,
        );
        return Ok(Relation::Overlap);
    }

    let mut verdict = Verdict::new();
    let _ = space.try_for_each(|interpretation| {
        verdict.observe(
            interpretation.evaluate(&left),
            interpretation.evaluate(&right),
        );

        if verdict.undecided() {
            ControlFlow::Continue(())
        } else {
            log_trace!(component = "compare", event = "early_overlap");
            ControlFlow::Break(())
        }
    });

    let relation = verdict.relation();
    log_debug!(
        component = "compare",
        event = "compare_finish",
        relation = %relation,
    );

    Ok(relation)
}

///
/// TESTS
///
