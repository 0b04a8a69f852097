//! Lowering from the generic expression AST into logic IR.

use crate::{
    ast::{ExprNode, OpCode},
    hash::{NodeHash, StructuralHash, StructuralHasher},
    logic::{Group, LogicExprNode, NodeRef, single_variable_equality_hash},
};
use serde_json::Value;

///
/// Transform an expression AST into logic IR.
///
/// Boolean structure maps one-to-one; comparisons become typed atoms where
/// their operands are understood and opaque atoms keyed by the structural
/// hash of the comparison otherwise. Every rewrite preserves truth for each
/// possible document.
///
#[must_use]
pub fn transform(node: &ExprNode) -> NodeRef {
    match node {
        ExprNode::Group { base } => transform(base),
        ExprNode::And { left, right } => LogicExprNode::and([transform(left), transform(right)]),
        ExprNode::Or { left, right } => LogicExprNode::or([transform(left), transform(right)]),
        ExprNode::Not { base } => LogicExprNode::not(transform(base)),
        ExprNode::Value {
            value: Value::Bool(value),
        } => LogicExprNode::literal(*value),
        ExprNode::OpCall { op, left, right } => match op {
            OpCode::Eq => equality(left, right, node),
            OpCode::Ne => LogicExprNode::not(equality(left, right, node)),
            OpCode::In => membership(left, right),
            op if op.is_ordering() => ordering(*op, left, right, node),
            _ => opaque(node),
        },
        _ => opaque(node),
    }
}

fn opaque(node: &ExprNode) -> NodeRef {
    LogicExprNode::unknown(node.structural_hash())
}

// ----------------------------------------------------------------------
// Operands
// ----------------------------------------------------------------------

///
/// Operand
///
/// What an ordering comparison can reason about on either side.
///

enum Operand {
    Variable(Group),
    Constant(f64),
}

impl Operand {
    fn classify(node: &ExprNode) -> Option<Self> {
        attribute_group(node)
            .map(Self::Variable)
            .or_else(|| numeric_literal(node).map(Self::Constant))
    }
}

/// Group name of an attribute access: a dotted path for plain attribute
/// chains on the current document, the access node's hash otherwise.
fn attribute_group(node: &ExprNode) -> Option<Group> {
    match node {
        ExprNode::Group { base } => attribute_group(base),
        ExprNode::AccessAttribute { .. } => {
            Some(attribute_path(node).unwrap_or_else(|| format!("#{}", node.structural_hash())))
        }
        ExprNode::AccessElement { .. } => Some(format!("#{}", node.structural_hash())),
        _ => None,
    }
}

fn attribute_path(node: &ExprNode) -> Option<String> {
    match node {
        ExprNode::AccessAttribute { base: None, name } => Some(name.clone()),
        ExprNode::AccessAttribute {
            base: Some(base),
            name,
        } => match base.as_ref() {
            ExprNode::This => Some(name.clone()),
            parent => attribute_path(parent).map(|path| format!("{path}.{name}")),
        },
        _ => None,
    }
}

fn numeric_literal(node: &ExprNode) -> Option<f64> {
    match node {
        ExprNode::Value {
            value: Value::Number(number),
        } => number.as_f64(),
        ExprNode::Neg { base } => numeric_literal(base).map(|value| -value),
        ExprNode::Pos { base } | ExprNode::Group { base } => numeric_literal(base),
        _ => None,
    }
}

// ----------------------------------------------------------------------
// Comparisons
// ----------------------------------------------------------------------

fn equality(left: &ExprNode, right: &ExprNode, whole: &ExprNode) -> NodeRef {
    match (attribute_group(left), attribute_group(right)) {
        (Some(left), Some(right)) => LogicExprNode::multi_variable_equality(left, right),
        (Some(group), None) => variable_equals(group, right),
        (None, Some(group)) => variable_equals(group, left),
        (None, None) => opaque(whole),
    }
}

fn variable_equals(group: Group, operand: &ExprNode) -> NodeRef {
    if let Some(value) = numeric_literal(operand) {
        return LogicExprNode::single_variable_numeric_equality(group, value);
    }

    let hash = single_variable_equality_hash(&group, &operand.structural_hash());
    LogicExprNode::single_variable_equality(group, hash)
}

// Rewrite `left op right` into `first >= second` / `first > second`, possibly
// negated. Two variables are ordered by name; a constant always ends up second.
fn ordering(op: OpCode, left: &ExprNode, right: &ExprNode, whole: &ExprNode) -> NodeRef {
    let (swap, shape) = match (Operand::classify(left), Operand::classify(right)) {
        (Some(Operand::Variable(l)), Some(Operand::Variable(r))) => {
            if l > r {
                (true, Ordered::Variables(r, l))
            } else {
                (false, Ordered::Variables(l, r))
            }
        }
        (Some(Operand::Variable(group)), Some(Operand::Constant(value))) => {
            (false, Ordered::Bound(group, value))
        }
        (Some(Operand::Constant(value)), Some(Operand::Variable(group))) => {
            (true, Ordered::Bound(group, value))
        }
        _ => return opaque(whole),
    };

    let (inclusive, negated) = match (swap, op) {
        (false, OpCode::Gte) | (true, OpCode::Lte) => (true, false),
        (false, OpCode::Gt) | (true, OpCode::Lt) => (false, false),
        (false, OpCode::Lt) | (true, OpCode::Gt) => (true, true),
        (false, OpCode::Lte) | (true, OpCode::Gte) => (false, true),
        _ => return opaque(whole),
    };

    let atom = match shape {
        Ordered::Variables(first, second) => {
            LogicExprNode::multi_variable_inequality(first, second, inclusive)
        }
        Ordered::Bound(group, value) => {
            LogicExprNode::single_variable_inequality(group, value, inclusive)
        }
    };

    if negated {
        LogicExprNode::not(atom)
    } else {
        atom
    }
}

// Operands of an ordering comparison after canonical placement.
enum Ordered {
    Variables(Group, Group),
    Bound(Group, f64),
}

// ----------------------------------------------------------------------
// Membership
// ----------------------------------------------------------------------

fn membership(left: &ExprNode, right: &ExprNode) -> NodeRef {
    match right {
        ExprNode::Group { base } => membership(left, base),
        ExprNode::Array { elements } => {
            let mut alternatives = Vec::with_capacity(elements.len());
            for element in elements {
                if element.is_splat {
                    let nested = membership(left, &element.value);
                    match nested.as_ref() {
                        LogicExprNode::Or { children, .. } => {
                            alternatives.extend(children.iter().cloned());
                        }
                        _ => alternatives.push(nested),
                    }
                } else {
                    let comparison = ExprNode::eq(left.clone(), element.value.clone());
                    alternatives.push(equality(left, &element.value, &comparison));
                }
            }

            LogicExprNode::or(alternatives)
        }
        ExprNode::Slice {
            base,
            left: lower,
            right: upper,
            is_inclusive,
        } => {
            let contained = membership(left, base);

            // Negative indices count from the end; their positions are unknown here.
            let positional = *lower >= 0.0 && *upper >= 0.0 && lower <= upper;
            if !positional {
                return contained;
            }

            let index = format!("index({})", contained.hash());
            let upper = if *is_inclusive {
                LogicExprNode::single_variable_inequality(index.clone(), *upper, false)
            } else {
                LogicExprNode::single_variable_inequality(index.clone(), *upper, true)
            };

            LogicExprNode::and([
                contained,
                LogicExprNode::single_variable_inequality(index, *lower, true),
                LogicExprNode::not(upper),
            ])
        }
        // Filtered, indexed or computed right-hand sides lose precision here.
        _ => LogicExprNode::and([
            LogicExprNode::unknown(tagged_hash("MemberOf", &right.structural_hash())),
            LogicExprNode::unknown(tagged_hash("MemberValue", &left.structural_hash())),
        ]),
    }
}

fn tagged_hash(tag: &str, hash: &NodeHash) -> NodeHash {
    let mut hasher = StructuralHasher::new();
    hasher.begin_array(2);
    hasher.write_str(tag);
    hasher.write_hash(hash);

    hasher.finish()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{NodeKind, generate};

    fn attr(name: &str) -> ExprNode {
        ExprNode::attr(name)
    }

    fn num(value: f64) -> ExprNode {
        ExprNode::number(value)
    }

    fn render(node: &ExprNode) -> String {
        generate(&transform(node))
    }

    #[test]
    fn boolean_structure_maps_directly() {
        let node = ExprNode::group(ExprNode::not(ExprNode::boolean(true)))
            & ExprNode::gt(attr("x"), num(1.0));

        assert_eq!(render(&node), "(!(true) && x > 1)");
    }

    #[test]
    fn ranges_normalize_to_lower_bounds() {
        let node = ExprNode::gt(attr("x"), num(1.0)) & ExprNode::lt(attr("x"), num(9.0));

        assert_eq!(render(&node), "(!(x >= 9) && x > 1)");
    }

    #[test]
    fn constant_on_the_left_swaps() {
        assert_eq!(render(&ExprNode::lt(num(0.0), attr("x"))), "x > 0");
        assert_eq!(render(&ExprNode::lte(num(0.0), attr("x"))), "x >= 0");
        assert_eq!(render(&ExprNode::gt(num(9.0), attr("x"))), "!(x >= 9)");
        assert_eq!(render(&ExprNode::gte(num(9.0), attr("x"))), "!(x > 9)");
    }

    #[test]
    fn two_variables_sort_by_name() {
        let forward = transform(&ExprNode::lt(attr("x"), attr("y")));
        let backward = transform(&ExprNode::gt(attr("y"), attr("x")));

        assert_eq!(generate(&forward), "!(x >= y)");
        assert_eq!(forward.hash(), backward.hash());
        assert_eq!(render(&ExprNode::lte(attr("y"), attr("x"))), "x >= y");
        assert_eq!(render(&ExprNode::gte(attr("y"), attr("x"))), "!(x > y)");
    }

    #[test]
    fn negative_literals_are_numeric() {
        let node = ExprNode::gt(attr("x"), ExprNode::neg(num(1.5)));

        assert_eq!(render(&node), "x > -1.5");
    }

    #[test]
    fn equality_is_symmetric_in_operand_order() {
        let left = transform(&ExprNode::eq(attr("_type"), ExprNode::string("foo")));
        let right = transform(&ExprNode::eq(ExprNode::string("foo"), attr("_type")));

        assert_eq!(left.kind(), NodeKind::SingleVariableEquality);
        assert_eq!(left.hash(), right.hash());
    }

    #[test]
    fn numeric_and_multi_variable_equality() {
        assert_eq!(render(&ExprNode::eq(attr("x"), num(5.0))), "x == 5");
        assert_eq!(
            render(&ExprNode::eq(attr("c"), attr("a").dot("b"))),
            "a.b == c"
        );
        assert_eq!(render(&ExprNode::ne(attr("x"), num(1.0))), "!(x == 1)");
    }

    #[test]
    fn attribute_paths_on_this_are_dotted() {
        let node = ExprNode::eq(ExprNode::This.dot("a").dot("b"), num(1.0));

        assert_eq!(render(&node), "a.b == 1");
    }

    #[test]
    fn membership_in_array_expands_to_equalities() {
        let listed = transform(&ExprNode::in_(
            attr("_type"),
            ExprNode::array([ExprNode::string("book"), ExprNode::string("movie")]),
        ));
        let spelled = transform(&ExprNode::or(
            ExprNode::eq(attr("_type"), ExprNode::string("book")),
            ExprNode::eq(attr("_type"), ExprNode::string("movie")),
        ));

        assert_eq!(listed.hash(), spelled.hash());
    }

    #[test]
    fn membership_recurses_through_splats() {
        let node = ExprNode::in_(
            attr("x"),
            ExprNode::Array {
                elements: vec![
                    crate::ast::ArrayElement::item(num(1.0)),
                    crate::ast::ArrayElement::splat(ExprNode::array([num(2.0)])),
                ],
            },
        );

        assert_eq!(render(&node), "(x == 1 || x == 2)");
    }

    #[test]
    fn membership_in_slice_bounds_a_shared_index() {
        let narrow = transform(&ExprNode::in_(attr("x"), attr("a").slice(1.0, 3.0, true)));
        let wide = transform(&ExprNode::in_(attr("x"), attr("a").slice(0.0, 5.0, false)));

        let LogicExprNode::And { children, .. } = narrow.as_ref() else {
            panic!("expected conjunction");
        };
        assert_eq!(children.len(), 3);

        let narrow_text = generate(&narrow);
        let wide_text = generate(&wide);
        let contained = membership(&attr("x"), &attr("a"));
        let index = format!("index({})", contained.hash());

        assert!(narrow_text.contains(&format!("{index} >= 1")), "{narrow_text}");
        assert!(narrow_text.contains(&format!("!({index} > 3)")), "{narrow_text}");
        assert!(wide_text.contains(&format!("!({index} >= 5)")), "{wide_text}");
    }

    #[test]
    fn slice_with_negative_or_reversed_bounds_keeps_only_membership() {
        let contained = membership(&attr("x"), &attr("a"));

        for (lower, upper) in [(-3.0, -1.0), (1.0, -1.0), (-2.0, 3.0), (3.0, 1.0)] {
            let node = transform(&ExprNode::in_(attr("x"), attr("a").slice(lower, upper, true)));

            assert_eq!(node.hash(), contained.hash(), "a[{lower}..{upper}]");
        }
    }

    #[test]
    fn slices_of_different_bases_use_different_indices() {
        let a = membership(&attr("x"), &attr("a"));
        let b = membership(&attr("x"), &attr("b"));

        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn membership_in_other_shapes_is_opaque() {
        let node = transform(&ExprNode::in_(attr("x"), attr("tags")));

        let LogicExprNode::And { children, .. } = node.as_ref() else {
            panic!("expected conjunction");
        };
        assert!(children
            .iter()
            .all(|child| child.kind() == NodeKind::UnknownExpression));
    }

    #[test]
    fn unsupported_operators_are_opaque() {
        let call = ExprNode::FuncCall {
            namespace: "global".into(),
            name: "count".into(),
            args: vec![attr("tags")],
        };
        let node = ExprNode::gt(call.clone(), num(1.0));
        let matched = ExprNode::op(OpCode::Match, attr("title"), ExprNode::string("wo*"));

        assert_eq!(transform(&node).hash(), &node.structural_hash());
        assert_eq!(transform(&matched).kind(), NodeKind::UnknownExpression);
        assert_eq!(transform(&call).kind(), NodeKind::UnknownExpression);
    }
}
