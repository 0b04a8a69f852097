use crate::logic::{LogicExprNode, NodeSet};

///
/// Render an IR tree as a human-readable, deterministic string.
///
/// Junction children are sorted by their rendered text, so two trees with
/// equal hashes always render identically. Used for debugging and as the
/// golden form in tests.
///
#[must_use]
pub fn generate(node: &LogicExprNode) -> String {
    match node {
        LogicExprNode::And { children, .. } => junction(children, " && "),
        LogicExprNode::Or { children, .. } => junction(children, " || "),
        LogicExprNode::Not { child, .. } => match child.as_ref() {
            LogicExprNode::And { .. } | LogicExprNode::Or { .. } => format!("!{}", generate(child)),
            _ => format!("!({})", generate(child)),
        },
        LogicExprNode::Literal(value) => value.to_string(),
        LogicExprNode::SingleVariableEquality { group, hash } => format!("{group} == #{hash}"),
        LogicExprNode::SingleVariableNumericEquality { group, value, .. } => {
            format!("{group} == {value}")
        }
        LogicExprNode::MultiVariableEquality { groups, .. } => {
            format!("{} == {}", groups[0], groups[1])
        }
        LogicExprNode::SingleVariableInequality {
            group,
            value,
            inclusive,
            ..
        } => format!("{group} {} {value}", comparator(*inclusive)),
        LogicExprNode::MultiVariableInequality {
            groups, inclusive, ..
        } => format!("{} {} {}", groups[0], comparator(*inclusive), groups[1]),
        LogicExprNode::UnknownExpression { hash } => format!("#{hash}"),
    }
}

const fn comparator(inclusive: bool) -> &'static str {
    if inclusive { ">=" } else { ">" }
}

fn junction(children: &NodeSet, separator: &str) -> String {
    let mut rendered = children
        .iter()
        .map(|child| generate(child))
        .collect::<Vec<_>>();
    rendered.sort();

    format!("({})", rendered.join(separator))
}

///
/// TESTS
///
