use crate::logic::{LogicCache, LogicExprNode, NodeKind, NodeRef, NodeSet};

///
/// Simplify an IR tree with one memoized bottom-up pass.
///
/// Children are simplified first, then each And/Or/Not node gets a fixed
/// battery of boolean identities applied once, in order:
///
/// 1. flatten nested same-kind And / Or
/// 2. OR(False, x)            → x
/// 3. NOT(NOT x)              → x
/// 4. AND(x, NOT x) → False;  OR(x, NOT x) → True
/// 5. AND(True, x)            → x
/// 6. AND(False, x)           → False
/// 7. OR(a, AND(a, b))        → a          (absorption)
/// 8. OR(True, x)             → True
/// 9. AND(x) / OR(x)          → x;   AND() → True;   OR() → False
///
/// Logical equivalence is preserved. This is not a minimizer: it is
/// idempotent for these identities only.
///
#[must_use]
pub(crate) fn simplify(cache: &mut LogicCache, node: &NodeRef) -> NodeRef {
    if let Some(hit) = cache.simplify.get(node.hash()) {
        return hit;
    }

    let simplified = match node.as_ref() {
        LogicExprNode::And { children, .. } => {
            let children = children.map(|child| simplify(cache, child));
            simplify_and(children)
        }
        LogicExprNode::Or { children, .. } => {
            let children = children.map(|child| simplify(cache, child));
            simplify_or(children)
        }
        LogicExprNode::Not { child, .. } => simplify_not(simplify(cache, child)),
        _ => node.clone(),
    };

    cache
        .simplify
        .insert(node.hash().clone(), simplified.clone());

    simplified
}

fn simplify_not(child: NodeRef) -> NodeRef {
    match child.as_ref() {
        LogicExprNode::Not { child: inner, .. } => inner.clone(),
        LogicExprNode::Literal(value) => LogicExprNode::literal(!value),
        _ => LogicExprNode::not(child),
    }
}

fn simplify_and(children: NodeSet) -> NodeRef {
    let children = flatten(&children, NodeKind::And);

    if has_complementary_pair(&children) {
        return LogicExprNode::literal(false);
    }

    let children = children.filter(|child| !child.is_literal(true));

    if children.iter().any(|child| child.is_literal(false)) {
        return LogicExprNode::literal(false);
    }

    finish(children, LogicExprNode::and_set, true)
}

fn simplify_or(children: NodeSet) -> NodeRef {
    let children = flatten(&children, NodeKind::Or);
    let children = children.filter(|child| !child.is_literal(false));

    if has_complementary_pair(&children) {
        return LogicExprNode::literal(true);
    }

    let children = absorb(&children);

    if children.iter().any(|child| child.is_literal(true)) {
        return LogicExprNode::literal(true);
    }

    finish(children, LogicExprNode::or_set, false)
}

// Splice the children of same-kind children into the parent.
fn flatten(children: &NodeSet, kind: NodeKind) -> NodeSet {
    let mut out = NodeSet::new();
    for child in children {
        match child.children() {
            Some(grandchildren) if child.kind() == kind => out.extend(grandchildren.iter().cloned()),
            _ => {
                out.add(child.clone());
            }
        }
    }

    out
}

fn has_complementary_pair(children: &NodeSet) -> bool {
    children.iter().any(|child| match child.as_ref() {
        LogicExprNode::Not { child: inner, .. } => children.has(inner.hash()),
        _ => false,
    })
}

// Drop And-children of an Or that already contain one of their Or siblings.
fn absorb(children: &NodeSet) -> NodeSet {
    children.filter(|child| match child.as_ref() {
        LogicExprNode::And {
            children: conjuncts,
            hash,
        } => !children
            .hashes()
            .any(|sibling| sibling != hash && conjuncts.has(sibling)),
        _ => true,
    })
}

fn finish(children: NodeSet, build: fn(NodeSet) -> NodeRef, empty: bool) -> NodeRef {
    match children.len() {
        0 => LogicExprNode::literal(empty),
        1 => children
            .first()
            .cloned()
            .unwrap_or_else(|| LogicExprNode::literal(empty)),
        _ => build(children),
    }
}

///
/// TESTS
///
