use crate::logic::{LogicCache, LogicExprNode, NodeRef, NodeSet, simplify};

///
/// Rewrite a tree into disjunctive normal form.
///
/// Rules:
/// - AND(.., OR(a, b), rest)  → OR(AND(a, rest), AND(b, rest)), recursively
/// - OR(children)             → OR(dnf(children))
/// - NOT(AND(a, b))           → dnf(OR(NOT a, NOT b))
/// - NOT(OR(a, b))            → dnf(AND(NOT a, NOT b))
/// - NOT(NOT a)               → dnf(a)
/// - atoms, literals, NOT(atom) pass through
///
/// Every result is simplified before it is cached, so the output is an
/// OR of ANDs of possibly negated atoms, or a degenerate form of that shape.
/// The result is truth-equivalent to the input for every leaf assignment.
///
#[must_use]
pub(crate) fn disjunctive_normal_form(cache: &mut LogicCache, node: &NodeRef) -> NodeRef {
    if let Some(hit) = cache.dnf.get(node.hash()) {
        return hit;
    }

    let converted = convert(cache, node);
    let normalized = simplify(cache, &converted);
    cache.dnf.insert(node.hash().clone(), normalized.clone());

    normalized
}

fn convert(cache: &mut LogicCache, node: &NodeRef) -> NodeRef {
    match node.as_ref() {
        LogicExprNode::And { children, .. } => {
            let converted = children.map(|child| disjunctive_normal_form(cache, child));
            let conjunction = simplify(cache, &LogicExprNode::and_set(converted));

            let split = match conjunction.children() {
                Some(conjuncts) if conjunction.kind() == crate::logic::NodeKind::And => conjuncts
                    .iter()
                    .find_map(|conjunct| match conjunct.as_ref() {
                        LogicExprNode::Or { children, hash } => Some((hash, children)),
                        _ => None,
                    })
                    .map(|(hash, alternatives)| {
                        let mut rest = conjuncts.clone();
                        rest.delete(hash);
                        (rest, alternatives.clone())
                    }),
                _ => None,
            };

            match split {
                Some((rest, alternatives)) => distribute(cache, &rest, &alternatives),
                None => conjunction,
            }
        }
        LogicExprNode::Or { children, .. } => {
            LogicExprNode::or_set(children.map(|child| disjunctive_normal_form(cache, child)))
        }
        LogicExprNode::Not { child, .. } => match child.as_ref() {
            LogicExprNode::And { children, .. } => {
                let negated = LogicExprNode::or_set(children.map(LogicExprNode::negate));
                disjunctive_normal_form(cache, &negated)
            }
            LogicExprNode::Or { children, .. } => {
                let negated = LogicExprNode::and_set(children.map(LogicExprNode::negate));
                disjunctive_normal_form(cache, &negated)
            }
            LogicExprNode::Not { child: inner, .. } => disjunctive_normal_form(cache, inner),
            LogicExprNode::Literal(value) => LogicExprNode::literal(!value),
            _ => node.clone(),
        },
        _ => node.clone(),
    }
}

// AND(rest, OR(alternatives)) → OR(dnf(AND(rest, alt)) for alt in alternatives)
fn distribute(cache: &mut LogicCache, rest: &NodeSet, alternatives: &NodeSet) -> NodeRef {
    let clauses = alternatives.map(|alternative| {
        let mut clause = rest.clone();
        clause.add(alternative.clone());
        disjunctive_normal_form(cache, &LogicExprNode::and_set(clause))
    });

    LogicExprNode::or_set(clauses)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hash::NodeHash,
        logic::{NodeKind, generate, hashify},
    };
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;

    const LABELS: [&str; 4] = ["a", "b", "c", "d"];

    fn unknown(label: &str) -> NodeRef {
        LogicExprNode::unknown(NodeHash::label(label))
    }

    fn dnf(node: &NodeRef) -> NodeRef {
        disjunctive_normal_form(&mut LogicCache::new(true), node)
    }

    fn eval(node: &LogicExprNode, truths: &HashSet<&str>) -> bool {
        match node {
            LogicExprNode::And { children, .. } => children.iter().all(|c| eval(c, truths)),
            LogicExprNode::Or { children, .. } => children.iter().any(|c| eval(c, truths)),
            LogicExprNode::Not { child, .. } => !eval(child, truths),
            LogicExprNode::Literal(value) => *value,
            other => truths.contains(other.hash().as_str()),
        }
    }

    fn is_literal_or_clause(node: &LogicExprNode) -> bool {
        match node {
            LogicExprNode::And { children, .. } => children.iter().all(|c| c.is_literal_atom()),
            LogicExprNode::Literal(_) => true,
            other => other.is_literal_atom(),
        }
    }

    fn is_dnf(node: &LogicExprNode) -> bool {
        match node {
            LogicExprNode::Or { children, .. } => children.iter().all(|c| is_literal_or_clause(c)),
            other => is_literal_or_clause(other),
        }
    }

    #[test]
    fn distributes_and_over_or() {
        let node = hashify(&json!({
            "type": "And",
            "children": [{ "type": "Or", "children": ["A", "B"] }, "C"],
        }))
        .expect("hashify");
        let expected = hashify(&json!({
            "type": "Or",
            "children": [
                { "type": "And", "children": ["A", "C"] },
                { "type": "And", "children": ["B", "C"] },
            ],
        }))
        .expect("hashify");

        let converted = dnf(&node);

        assert_eq!(converted.hash(), expected.hash());
        assert_eq!(generate(&converted), "((#A && #C) || (#B && #C))");
    }

    #[test]
    fn applies_de_morgan() {
        let a = unknown("a");
        let b = unknown("b");

        let not_and = dnf(&LogicExprNode::not(LogicExprNode::and([a.clone(), b.clone()])));
        let not_or = dnf(&LogicExprNode::not(LogicExprNode::or([a, b])));

        assert_eq!(generate(&not_and), "(!(#a) || !(#b))");
        assert_eq!(generate(&not_or), "(!(#a) && !(#b))");
    }

    #[test]
    fn nested_negation_produces_clauses() {
        // a && !(b && c) → (a && !b) || (a && !c)
        let node = LogicExprNode::and([
            unknown("a"),
            LogicExprNode::not(LogicExprNode::and([unknown("b"), unknown("c")])),
        ]);

        let converted = dnf(&node);

        assert_eq!(converted.kind(), NodeKind::Or);
        assert_eq!(generate(&converted), "((!(#b) && #a) || (!(#c) && #a))");
    }

    #[test]
    fn passes_atoms_and_literals_through() {
        let a = unknown("a");

        assert_eq!(dnf(&a).hash(), a.hash());
        assert!(dnf(&LogicExprNode::not(LogicExprNode::literal(true))).is_literal(false));
    }

    fn arb_node() -> impl Strategy<Value = NodeRef> {
        let leaf = prop_oneof![
            (0..LABELS.len()).prop_map(|i| unknown(LABELS[i])),
            any::<bool>().prop_map(LogicExprNode::literal),
        ];

        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(LogicExprNode::and),
                prop::collection::vec(inner.clone(), 0..4).prop_map(LogicExprNode::or),
                inner.prop_map(LogicExprNode::not),
            ]
        })
    }

    fn assignments() -> Vec<HashSet<&'static str>> {
        (0..1u32 << LABELS.len())
            .map(|mask| {
                LABELS
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, label)| *label)
                    .collect()
            })
            .collect()
    }

    proptest! {
        #[test]
        fn dnf_is_truth_equivalent_and_well_formed(node in arb_node()) {
            let converted = dnf(&node);

            prop_assert!(is_dnf(&converted), "not in dnf: {}", generate(&converted));
            for truths in assignments() {
                prop_assert_eq!(eval(&node, &truths), eval(&converted, &truths));
            }
        }

        #[test]
        fn simplify_is_truth_equivalent_and_idempotent(node in arb_node()) {
            let mut cache = LogicCache::new(true);
            let once = simplify(&mut cache, &node);
            let twice = simplify(&mut cache, &once);

            prop_assert_eq!(once.hash(), twice.hash());
            for truths in assignments() {
                prop_assert_eq!(eval(&node, &truths), eval(&once, &truths));
            }
        }
    }
}
