//! Transitive-inequality deduction over numeric-bound atoms.
//!
//! Groups are graph vertices, `MultiVariableInequality` atoms are edges, and
//! single-variable atoms are terminal edges to constants. Every path from a
//! group to a constant justifies a lower bound on that group; the bound is
//! then turned into implication clauses that the comparator can evaluate as
//! plain boolean logic.

use crate::{
    error::InternalError,
    logic::{
        Group, LogicCache, LogicExprNode, NodeRef, NodeSet, disjunctive_normal_form, simplify,
    },
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

///
/// InequalityDeduction
///
/// Derived fact "`group` >= `value`" (inclusive) or "`group` > `value`",
/// justified by the conjunction of the atoms in `path`. Path entries are
/// atoms or negated atoms, in traversal order.
///

#[derive(Clone, Debug)]
pub struct InequalityDeduction {
    pub group: Group,
    pub value: f64,
    pub inclusive: bool,
    pub path: Vec<NodeRef>,
}

impl InequalityDeduction {
    /// Whether this bound makes `group >= value` (or `>` when exclusive) true.
    #[must_use]
    pub fn implies(&self, value: f64, inclusive: bool) -> bool {
        match self.value.total_cmp(&value) {
            Ordering::Greater => true,
            Ordering::Equal => inclusive || !self.inclusive,
            Ordering::Less => false,
        }
    }

    /// Strength ordering: larger value first, exclusive before inclusive at
    /// equal value.
    fn strength(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| other.inclusive.cmp(&self.inclusive))
    }

    fn rests_on(&self, atom: &NodeRef) -> bool {
        self.path.iter().any(|step| step.hash() == atom.hash())
    }
}

///
/// Bound
///
/// Totally ordered `f64` key for the value index.
///

#[derive(Clone, Copy, Debug)]
struct Bound(f64);

impl PartialEq for Bound {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Bound {}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// Single-variable atom read as "group >= value" / "group > value".
#[derive(Clone, Debug)]
struct Terminal {
    group: Group,
    inclusive: bool,
    atom: NodeRef,
}

// One direction of a MultiVariableInequality atom.
#[derive(Clone, Debug)]
struct Edge {
    to: Group,
    forward: bool,
    inclusive: bool,
    atom: NodeRef,
}

impl Edge {
    // Backward traversal asserts only the negation of the atom, which flips
    // the strictness of the comparison.
    fn step(&self) -> (NodeRef, bool) {
        if self.forward {
            (self.atom.clone(), self.inclusive)
        } else {
            (LogicExprNode::not(self.atom.clone()), !self.inclusive)
        }
    }
}

///
/// InequalityGraph
///

#[derive(Debug, Default)]
struct InequalityGraph {
    groups: BTreeSet<Group>,
    edges: BTreeMap<Group, Vec<Edge>>,
    terminals: BTreeMap<Bound, Vec<Terminal>>,
    bounds: BTreeMap<Group, Vec<(f64, bool, NodeRef)>>,
}

impl InequalityGraph {
    // Index every literal; polarity is ignored because every fact the graph
    // produces is a tautology over the atoms involved.
    fn from_literals<'a>(
        literals: impl IntoIterator<Item = &'a NodeRef>,
    ) -> Result<Self, InternalError> {
        let mut graph = Self::default();

        for literal in literals {
            let atom = match literal.as_ref() {
                LogicExprNode::Not { child, .. } => child,
                _ => literal,
            };
            graph.index(atom)?;
        }

        Ok(graph)
    }

    fn index(&mut self, atom: &NodeRef) -> Result<(), InternalError> {
        match atom.as_ref() {
            LogicExprNode::SingleVariableInequality {
                group,
                value,
                inclusive,
                ..
            } => {
                self.add_terminal(group, *value, *inclusive, atom);
                self.bounds
                    .entry(group.clone())
                    .or_default()
                    .push((*value, *inclusive, atom.clone()));
            }
            LogicExprNode::SingleVariableNumericEquality { group, value, .. } => {
                self.add_terminal(group, *value, true, atom);
            }
            LogicExprNode::MultiVariableInequality {
                groups: [first, second],
                inclusive,
                ..
            } => {
                self.groups.insert(first.clone());
                self.groups.insert(second.clone());
                self.edges.entry(first.clone()).or_default().push(Edge {
                    to: second.clone(),
                    forward: true,
                    inclusive: *inclusive,
                    atom: atom.clone(),
                });
                self.edges.entry(second.clone()).or_default().push(Edge {
                    to: first.clone(),
                    forward: false,
                    inclusive: *inclusive,
                    atom: atom.clone(),
                });
            }
            other => {
                return Err(InternalError::inequality_invariant(format!(
                    "inequality clause contains unexpected {} atom",
                    other.kind()
                )));
            }
        }

        Ok(())
    }

    fn add_terminal(&mut self, group: &Group, value: f64, inclusive: bool, atom: &NodeRef) {
        self.groups.insert(group.clone());
        self.terminals
            .entry(Bound(value))
            .or_default()
            .push(Terminal {
                group: group.clone(),
                inclusive,
                atom: atom.clone(),
            });
    }

    fn deductions(&self) -> Vec<InequalityDeduction> {
        let mut out = Vec::new();

        for group in &self.groups {
            for (value, targets) in &self.terminals {
                let mut search = Search {
                    graph: self,
                    origin: group,
                    value: value.0,
                    targets,
                    visited: BTreeSet::new(),
                    path: Vec::new(),
                    found: &mut out,
                };
                search.walk(group, true);
            }
        }

        out
    }

    /// `Or(Not(And(path)), And(consequents))` for every deduction that
    /// implies a direct bound on its group which it does not already rest on.
    fn implication_clauses(&self, deductions: Vec<InequalityDeduction>) -> Vec<NodeRef> {
        let mut by_group = BTreeMap::<Group, Vec<InequalityDeduction>>::new();
        for deduction in deductions {
            by_group
                .entry(deduction.group.clone())
                .or_default()
                .push(deduction);
        }

        let mut clauses = Vec::new();
        for (group, mut chain) in by_group {
            let Some(bounds) = self.bounds.get(&group) else {
                continue;
            };
            chain.sort_by(|a, b| b.strength(a));

            for deduction in &chain {
                let consequents = bounds
                    .iter()
                    .filter(|(value, inclusive, atom)| {
                        deduction.implies(*value, *inclusive) && !deduction.rests_on(atom)
                    })
                    .map(|(_, _, atom)| atom.clone())
                    .collect::<NodeSet>();

                if consequents.is_empty() {
                    continue;
                }

                let premise = LogicExprNode::and(deduction.path.iter().cloned());
                clauses.push(LogicExprNode::or([
                    LogicExprNode::not(premise),
                    LogicExprNode::and_set(consequents),
                ]));
            }
        }

        clauses
    }
}

///
/// Search
///
/// One depth-first search for paths from `origin` to terminals at `value`.
/// The visited set spans the whole search, so each group is expanded once
/// and cycles terminate.
///

struct Search<'a> {
    graph: &'a InequalityGraph,
    origin: &'a Group,
    value: f64,
    targets: &'a [Terminal],
    visited: BTreeSet<&'a Group>,
    path: Vec<NodeRef>,
    found: &'a mut Vec<InequalityDeduction>,
}

impl<'a> Search<'a> {
    fn walk(&mut self, current: &'a Group, inclusive: bool) {
        if !self.visited.insert(current) {
            return;
        }

        let (graph, targets) = (self.graph, self.targets);

        for terminal in targets.iter().filter(|t| &t.group == current) {
            let mut path = self.path.clone();
            path.push(terminal.atom.clone());
            self.found.push(InequalityDeduction {
                group: self.origin.clone(),
                value: self.value,
                inclusive: inclusive && terminal.inclusive,
                path,
            });
        }

        let Some(edges) = graph.edges.get(current) else {
            return;
        };
        for edge in edges {
            let (step, step_inclusive) = edge.step();
            self.path.push(step);
            self.walk(&edge.to, inclusive && step_inclusive);
            self.path.pop();
        }
    }
}

// Literals of a conjunctive clause; anything else is a one-element clause.
fn clause_literals(clause: &NodeRef) -> Vec<NodeRef> {
    match clause.as_ref() {
        LogicExprNode::And { children, .. } => children.iter().cloned().collect(),
        _ => vec![clause.clone()],
    }
}

fn is_inequality_literal(literal: &NodeRef) -> bool {
    let atom = match literal.as_ref() {
        LogicExprNode::Not { child, .. } => child,
        _ => literal,
    };

    atom.kind().is_inequality()
}

///
/// Deduce every transitive lower bound a conjunctive clause supports.
///
/// The clause must be an And of inequality atoms (possibly negated) or a
/// single such literal. Any other atom kind is an invariant violation.
///
pub fn find_inequality_truths(clause: &NodeRef) -> Result<Vec<InequalityDeduction>, InternalError> {
    let literals = clause_literals(clause);
    let graph = InequalityGraph::from_literals(&literals)?;

    Ok(graph.deductions())
}

///
/// Build the implication formula for the numeric bounds inside `node`.
///
/// The node is converted to DNF and the inequality literals of all its
/// clauses are pooled into one graph. Returns `Literal(true)` when nothing
/// can be deduced. The formula is a tautology under numeric semantics, so
/// conjoining it onto any predicate never changes that predicate's meaning.
///
pub(crate) fn create_inequality_formula(
    cache: &mut LogicCache,
    node: &NodeRef,
) -> Result<NodeRef, InternalError> {
    let normal = disjunctive_normal_form(cache, node);
    let clauses = match normal.as_ref() {
        LogicExprNode::Or { children, .. } => children.iter().cloned().collect(),
        _ => vec![normal.clone()],
    };

    let pooled = clauses
        .iter()
        .flat_map(clause_literals)
        .filter(is_inequality_literal)
        .collect::<NodeSet>();
    if pooled.is_empty() {
        return Ok(LogicExprNode::literal(true));
    }

    let graph = InequalityGraph::from_literals(&pooled)?;
    let implications = graph.implication_clauses(graph.deductions());
    if implications.is_empty() {
        return Ok(LogicExprNode::literal(true));
    }

    Ok(simplify(cache, &LogicExprNode::and(implications)))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorClass,
        hash::NodeHash,
        logic::{NodeKind, generate},
    };

    fn ge(group: &str, value: f64) -> NodeRef {
        LogicExprNode::single_variable_inequality(group, value, true)
    }

    fn gt(group: &str, value: f64) -> NodeRef {
        LogicExprNode::single_variable_inequality(group, value, false)
    }

    fn find<'a>(
        deductions: &'a [InequalityDeduction],
        group: &str,
        value: f64,
    ) -> Option<&'a InequalityDeduction> {
        deductions
            .iter()
            .find(|d| d.group == group && d.value.total_cmp(&value).is_eq())
    }

    #[test]
    fn forward_edge_chains_to_terminal() {
        // x >= y && y > 3  ⇒  x > 3
        let edge = LogicExprNode::multi_variable_inequality("x", "y", true);
        let clause = LogicExprNode::and([edge.clone(), gt("y", 3.0)]);

        let deductions = find_inequality_truths(&clause).expect("deduce");
        let x = find(&deductions, "x", 3.0).expect("x bound");

        assert!(!x.inclusive);
        assert_eq!(x.path.len(), 2);
        assert_eq!(x.path[0].hash(), edge.hash());
    }

    #[test]
    fn backward_edge_negates_and_flips_inclusivity() {
        // x >= y read from y: !(x >= y) means y > x; with x >= 10 that is y > 10
        let edge = LogicExprNode::multi_variable_inequality("x", "y", true);
        let clause = LogicExprNode::and([LogicExprNode::not(edge.clone()), ge("x", 10.0)]);

        let deductions = find_inequality_truths(&clause).expect("deduce");
        let y = find(&deductions, "y", 10.0).expect("y bound");

        assert!(!y.inclusive);
        assert_eq!(y.path[0].kind(), NodeKind::Not);
        assert_eq!(generate(&y.path[0]), "!(x >= y)");
    }

    #[test]
    fn numeric_equality_is_an_inclusive_terminal() {
        let clause = LogicExprNode::single_variable_numeric_equality("x", 5.0);

        let deductions = find_inequality_truths(&clause).expect("deduce");

        assert_eq!(deductions.len(), 1);
        assert!(deductions[0].inclusive);
        assert!(deductions[0].implies(5.0, true));
        assert!(!deductions[0].implies(5.0, false));
    }

    #[test]
    fn cycles_terminate() {
        let clause = LogicExprNode::and([
            LogicExprNode::multi_variable_inequality("a", "b", true),
            LogicExprNode::multi_variable_inequality("b", "a", true),
            ge("b", 1.0),
        ]);

        let deductions = find_inequality_truths(&clause).expect("deduce");

        assert!(find(&deductions, "a", 1.0).is_some());
    }

    #[test]
    fn unexpected_atom_kind_is_an_invariant_violation() {
        let clause = LogicExprNode::and([
            ge("x", 1.0),
            LogicExprNode::unknown(NodeHash::label("opaque")),
        ]);

        let err = find_inequality_truths(&clause).expect_err("unknown atom");

        assert_eq!(err.class, ErrorClass::InvariantViolation);
        assert!(err.message.contains("UnknownExpression"));
    }

    #[test]
    fn strength_orders_exclusive_above_inclusive() {
        let inclusive = InequalityDeduction {
            group: "x".into(),
            value: 5.0,
            inclusive: true,
            path: Vec::new(),
        };
        let exclusive = InequalityDeduction {
            inclusive: false,
            ..inclusive.clone()
        };

        assert_eq!(exclusive.strength(&inclusive), Ordering::Greater);
        assert!(exclusive.implies(5.0, false));
        assert!(!inclusive.implies(5.0, false));
    }

    #[test]
    fn formula_links_stronger_bounds_to_weaker_atoms() {
        let node = LogicExprNode::and([gt("x", 1.0), ge("x", 9.0)]);

        let formula = create_inequality_formula(&mut LogicCache::new(true), &node).expect("formula");

        assert_eq!(generate(&formula), "(!(x >= 9) || x > 1)");
    }

    #[test]
    fn formula_pools_clauses_for_transitive_chains() {
        // (!(x >= y) && y >= 9) || x >= 10 lets x < y && x >= 10 imply y >= 9
        let edge = LogicExprNode::multi_variable_inequality("x", "y", true);
        let node = LogicExprNode::or([
            LogicExprNode::and([LogicExprNode::not(edge), ge("y", 9.0)]),
            ge("x", 10.0),
        ]);

        let formula = create_inequality_formula(&mut LogicCache::new(true), &node).expect("formula");
        let rendered = generate(&formula);

        assert!(
            rendered.contains("(!(!(x >= y) && x >= 10) || y >= 9)"),
            "{rendered}"
        );
    }

    #[test]
    fn formula_without_bounds_is_true() {
        let node = LogicExprNode::or([
            LogicExprNode::unknown(NodeHash::label("a")),
            gt("x", 1.0),
        ]);

        let formula = create_inequality_formula(&mut LogicCache::new(true), &node).expect("formula");

        assert!(formula.is_literal(true));
    }
}
