use crate::{
    error::InternalError,
    hash::{NodeHash, StructuralHasher, hash_value, unordered_hash},
    logic::NodeSet,
};
use serde_json::{Map, Value};
use std::{
    fmt,
    sync::{Arc, LazyLock},
};

///
/// Group
///
/// Canonical name of one logical variable (an attribute path, or a synthetic
/// variable manufactured by the transform).
///

pub type Group = String;

///
/// NodeRef
///
/// Shared handle to an immutable IR node.
///

pub type NodeRef = Arc<LogicExprNode>;

static LITERAL_TRUE_HASH: LazyLock<NodeHash> = LazyLock::new(|| literal_hash(true));
static LITERAL_FALSE_HASH: LazyLock<NodeHash> = LazyLock::new(|| literal_hash(false));

///
/// LogicExprNode
///
/// Boolean-algebra IR. Nodes are immutable value objects built bottom-up;
/// every rewrite produces new nodes. Every variant except `Literal` stores its
/// canonical hash, and structurally equivalent nodes (up to And/Or child
/// order) always hash equal.
///

#[derive(Clone, Debug)]
pub enum LogicExprNode {
    And {
        children: NodeSet,
        hash: NodeHash,
    },
    Or {
        children: NodeSet,
        hash: NodeHash,
    },
    Not {
        child: NodeRef,
        hash: NodeHash,
    },
    Literal(bool),
    SingleVariableEquality {
        group: Group,
        hash: NodeHash,
    },
    SingleVariableNumericEquality {
        group: Group,
        value: f64,
        hash: NodeHash,
    },
    MultiVariableEquality {
        groups: [Group; 2],
        hash: NodeHash,
    },
    /// `group >= value` when inclusive, `group > value` otherwise.
    SingleVariableInequality {
        group: Group,
        value: f64,
        inclusive: bool,
        hash: NodeHash,
    },
    /// `groups[0] >= groups[1]` when inclusive, `>` otherwise.
    MultiVariableInequality {
        groups: [Group; 2],
        inclusive: bool,
        hash: NodeHash,
    },
    UnknownExpression {
        hash: NodeHash,
    },
}

impl LogicExprNode {
    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    #[must_use]
    pub fn and(children: impl IntoIterator<Item = NodeRef>) -> NodeRef {
        Self::and_set(children.into_iter().collect())
    }

    #[must_use]
    pub fn and_set(children: NodeSet) -> NodeRef {
        let hash = junction_hash(NodeKind::And, &children);

        Arc::new(Self::And { children, hash })
    }

    #[must_use]
    pub fn or(children: impl IntoIterator<Item = NodeRef>) -> NodeRef {
        Self::or_set(children.into_iter().collect())
    }

    #[must_use]
    pub fn or_set(children: NodeSet) -> NodeRef {
        let hash = junction_hash(NodeKind::Or, &children);

        Arc::new(Self::Or { children, hash })
    }

    #[must_use]
    pub fn not(child: NodeRef) -> NodeRef {
        let mut hasher = StructuralHasher::new();
        hasher.begin_array(2);
        hasher.write_str(NodeKind::Not.as_str());
        hasher.write_hash(child.hash());
        let hash = hasher.finish();

        Arc::new(Self::Not { child, hash })
    }

    /// Negate a node, folding double negation and literals instead of
    /// wrapping them.
    #[must_use]
    pub fn negate(node: &NodeRef) -> NodeRef {
        match node.as_ref() {
            Self::Not { child, .. } => child.clone(),
            Self::Literal(value) => Self::literal(!value),
            _ => Self::not(node.clone()),
        }
    }

    #[must_use]
    pub fn literal(value: bool) -> NodeRef {
        Arc::new(Self::Literal(value))
    }

    /// Equality of one variable against a non-numeric operand; `hash` encodes
    /// the operand.
    #[must_use]
    pub fn single_variable_equality(group: impl Into<Group>, hash: NodeHash) -> NodeRef {
        Arc::new(Self::SingleVariableEquality {
            group: group.into(),
            hash,
        })
    }

    #[must_use]
    pub fn single_variable_numeric_equality(group: impl Into<Group>, value: f64) -> NodeRef {
        let group = group.into();
        let hash = atom_hash(NodeKind::SingleVariableNumericEquality, |h| {
            h.write_str(&group);
            h.write_f64(value);
        });

        Arc::new(Self::SingleVariableNumericEquality { group, value, hash })
    }

    /// Equality between two variables; the pair is stored sorted.
    #[must_use]
    pub fn multi_variable_equality(left: impl Into<Group>, right: impl Into<Group>) -> NodeRef {
        let mut groups = [left.into(), right.into()];
        groups.sort();
        let hash = atom_hash(NodeKind::MultiVariableEquality, |h| {
            h.write_str(&groups[0]);
            h.write_str(&groups[1]);
        });

        Arc::new(Self::MultiVariableEquality { groups, hash })
    }

    #[must_use]
    pub fn single_variable_inequality(
        group: impl Into<Group>,
        value: f64,
        inclusive: bool,
    ) -> NodeRef {
        let group = group.into();
        let hash = atom_hash(NodeKind::SingleVariableInequality, |h| {
            h.write_str(&group);
            h.write_f64(value);
            h.write_bool(inclusive);
        });

        Arc::new(Self::SingleVariableInequality {
            group,
            value,
            inclusive,
            hash,
        })
    }

    /// `first >= second` (inclusive) or `first > second`; direction matters,
    /// so the pair is kept as given.
    #[must_use]
    pub fn multi_variable_inequality(
        first: impl Into<Group>,
        second: impl Into<Group>,
        inclusive: bool,
    ) -> NodeRef {
        let groups = [first.into(), second.into()];
        let hash = atom_hash(NodeKind::MultiVariableInequality, |h| {
            h.write_str(&groups[0]);
            h.write_str(&groups[1]);
            h.write_bool(inclusive);
        });

        Arc::new(Self::MultiVariableInequality {
            groups,
            inclusive,
            hash,
        })
    }

    #[must_use]
    pub fn unknown(hash: NodeHash) -> NodeRef {
        Arc::new(Self::UnknownExpression { hash })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Canonical hash; literals resolve to fixed per-value hashes.
    #[must_use]
    pub fn hash(&self) -> &NodeHash {
        match self {
            Self::Literal(true) => LazyLock::force(&LITERAL_TRUE_HASH),
            Self::Literal(false) => LazyLock::force(&LITERAL_FALSE_HASH),
            Self::And { hash, .. }
            | Self::Or { hash, .. }
            | Self::Not { hash, .. }
            | Self::SingleVariableEquality { hash, .. }
            | Self::SingleVariableNumericEquality { hash, .. }
            | Self::MultiVariableEquality { hash, .. }
            | Self::SingleVariableInequality { hash, .. }
            | Self::MultiVariableInequality { hash, .. }
            | Self::UnknownExpression { hash } => hash,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::And { .. } => NodeKind::And,
            Self::Or { .. } => NodeKind::Or,
            Self::Not { .. } => NodeKind::Not,
            Self::Literal(_) => NodeKind::Literal,
            Self::SingleVariableEquality { .. } => NodeKind::SingleVariableEquality,
            Self::SingleVariableNumericEquality { .. } => NodeKind::SingleVariableNumericEquality,
            Self::MultiVariableEquality { .. } => NodeKind::MultiVariableEquality,
            Self::SingleVariableInequality { .. } => NodeKind::SingleVariableInequality,
            Self::MultiVariableInequality { .. } => NodeKind::MultiVariableInequality,
            Self::UnknownExpression { .. } => NodeKind::UnknownExpression,
        }
    }

    /// Children of an And/Or node.
    #[must_use]
    pub const fn children(&self) -> Option<&NodeSet> {
        match self {
            Self::And { children, .. } | Self::Or { children, .. } => Some(children),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_atom(&self) -> bool {
        self.kind().is_atom()
    }

    #[must_use]
    pub const fn is_literal(&self, value: bool) -> bool {
        matches!(self, Self::Literal(v) if *v == value)
    }

    /// True for an atom or a negated atom.
    #[must_use]
    pub fn is_literal_atom(&self) -> bool {
        match self {
            Self::Not { child, .. } => child.is_atom(),
            other => other.is_atom(),
        }
    }
}

impl PartialEq for LogicExprNode {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for LogicExprNode {}

///
/// NodeKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    And,
    Or,
    Not,
    Literal,
    SingleVariableEquality,
    SingleVariableNumericEquality,
    MultiVariableEquality,
    SingleVariableInequality,
    MultiVariableInequality,
    UnknownExpression,
}

impl NodeKind {
    const ALL: [Self; 10] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::Literal,
        Self::SingleVariableEquality,
        Self::SingleVariableNumericEquality,
        Self::MultiVariableEquality,
        Self::SingleVariableInequality,
        Self::MultiVariableInequality,
        Self::UnknownExpression,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "And",
            Self::Or => "Or",
            Self::Not => "Not",
            Self::Literal => "Literal",
            Self::SingleVariableEquality => "SingleVariableEquality",
            Self::SingleVariableNumericEquality => "SingleVariableNumericEquality",
            Self::MultiVariableEquality => "MultiVariableEquality",
            Self::SingleVariableInequality => "SingleVariableInequality",
            Self::MultiVariableInequality => "MultiVariableInequality",
            Self::UnknownExpression => "UnknownExpression",
        }
    }

    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }

    #[must_use]
    pub const fn is_atom(self) -> bool {
        !matches!(self, Self::And | Self::Or | Self::Not | Self::Literal)
    }

    /// The kinds the inequality deducer understands.
    #[must_use]
    pub const fn is_inequality(self) -> bool {
        matches!(
            self,
            Self::SingleVariableInequality
                | Self::SingleVariableNumericEquality
                | Self::MultiVariableInequality
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// H([kind, unordered(child hashes)])
fn junction_hash(kind: NodeKind, children: &NodeSet) -> NodeHash {
    let mut hasher = StructuralHasher::new();
    hasher.begin_array(2);
    hasher.write_str(kind.as_str());
    hasher.write_hash(&unordered_hash(children.hashes()));

    hasher.finish()
}

fn atom_hash(kind: NodeKind, payload: impl FnOnce(&mut StructuralHasher)) -> NodeHash {
    let mut hasher = StructuralHasher::new();
    hasher.write_str(kind.as_str());
    payload(&mut hasher);

    hasher.finish()
}

fn literal_hash(value: bool) -> NodeHash {
    atom_hash(NodeKind::Literal, |h| h.write_bool(value))
}

/// Hash of a single-variable equality against an operand identified by
/// `operand`.
#[must_use]
pub fn single_variable_equality_hash(group: &str, operand: &NodeHash) -> NodeHash {
    atom_hash(NodeKind::SingleVariableEquality, |h| {
        h.write_str(group);
        h.write_hash(operand);
    })
}

// ----------------------------------------------------------------------
// hashify
// ----------------------------------------------------------------------

///
/// Build canonical IR from a plain JSON description.
///
/// Each node is an object `{"type": "<Kind>", ...}` using the field names of
/// the IR (`children`, `child`, `value`, `group`, `groups`, `inclusive`).
/// Leaves may carry an explicit `"hash"` label; a bare string is shorthand for
/// an `UnknownExpression` labelled with that string.
///
pub fn hashify(description: &Value) -> Result<NodeRef, InternalError> {
    let object = match description {
        Value::String(label) => return Ok(LogicExprNode::unknown(NodeHash::label(label))),
        Value::Object(object) => object,
        other => {
            return Err(InternalError::builder_unsupported(format!(
                "expected node object, found {other}"
            )));
        }
    };

    let label = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| InternalError::builder_unsupported("node description is missing 'type'"))?;
    let kind = NodeKind::parse(label).ok_or_else(|| {
        InternalError::builder_unsupported(format!("unknown node type '{label}'"))
    })?;

    let node = match kind {
        NodeKind::And => LogicExprNode::and(hashify_children(object)?),
        NodeKind::Or => LogicExprNode::or(hashify_children(object)?),
        NodeKind::Not => LogicExprNode::not(hashify(field(object, "child")?)?),
        NodeKind::Literal => LogicExprNode::literal(bool_field(object, "value")?),
        NodeKind::SingleVariableEquality => {
            let group = str_field(object, "group")?;
            let hash = match explicit_hash(object) {
                Some(hash) => hash,
                None => single_variable_equality_hash(
                    group,
                    &hash_value(object.get("value").unwrap_or(&Value::Null)),
                ),
            };
            LogicExprNode::single_variable_equality(group, hash)
        }
        NodeKind::SingleVariableNumericEquality => {
            let node = LogicExprNode::single_variable_numeric_equality(
                str_field(object, "group")?,
                f64_field(object, "value")?,
            );
            relabel(node, object)
        }
        NodeKind::MultiVariableEquality => {
            let [left, right] = groups_field(object)?;
            relabel(LogicExprNode::multi_variable_equality(left, right), object)
        }
        NodeKind::SingleVariableInequality => {
            let node = LogicExprNode::single_variable_inequality(
                str_field(object, "group")?,
                f64_field(object, "value")?,
                bool_field(object, "inclusive")?,
            );
            relabel(node, object)
        }
        NodeKind::MultiVariableInequality => {
            let [first, second] = groups_field(object)?;
            let node = LogicExprNode::multi_variable_inequality(
                first,
                second,
                bool_field(object, "inclusive")?,
            );
            relabel(node, object)
        }
        NodeKind::UnknownExpression => {
            let hash = explicit_hash(object).ok_or_else(|| {
                InternalError::builder_unsupported("UnknownExpression requires a 'hash' label")
            })?;
            LogicExprNode::unknown(hash)
        }
    };

    Ok(node)
}

fn hashify_children(object: &Map<String, Value>) -> Result<Vec<NodeRef>, InternalError> {
    field(object, "children")?
        .as_array()
        .ok_or_else(|| InternalError::builder_unsupported("'children' must be an array"))?
        .iter()
        .map(hashify)
        .collect()
}

fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Result<&'a Value, InternalError> {
    object
        .get(name)
        .ok_or_else(|| InternalError::builder_unsupported(format!("missing field '{name}'")))
}

fn str_field<'a>(object: &'a Map<String, Value>, name: &str) -> Result<&'a str, InternalError> {
    field(object, name)?
        .as_str()
        .ok_or_else(|| InternalError::builder_unsupported(format!("'{name}' must be a string")))
}

fn f64_field(object: &Map<String, Value>, name: &str) -> Result<f64, InternalError> {
    field(object, name)?
        .as_f64()
        .ok_or_else(|| InternalError::builder_unsupported(format!("'{name}' must be a number")))
}

fn bool_field(object: &Map<String, Value>, name: &str) -> Result<bool, InternalError> {
    field(object, name)?
        .as_bool()
        .ok_or_else(|| InternalError::builder_unsupported(format!("'{name}' must be a boolean")))
}

fn groups_field(object: &Map<String, Value>) -> Result<[&str; 2], InternalError> {
    let groups = field(object, "groups")?
        .as_array()
        .ok_or_else(|| InternalError::builder_unsupported("'groups' must be an array"))?;

    match groups.as_slice() {
        [Value::String(first), Value::String(second)] => Ok([first.as_str(), second.as_str()]),
        _ => Err(InternalError::builder_unsupported(
            "'groups' must hold exactly two strings",
        )),
    }
}

fn explicit_hash(object: &Map<String, Value>) -> Option<NodeHash> {
    object.get("hash").and_then(Value::as_str).map(NodeHash::label)
}

// Swap in an explicit leaf label when the description provides one.
fn relabel(node: NodeRef, object: &Map<String, Value>) -> NodeRef {
    let Some(label) = explicit_hash(object) else {
        return node;
    };

    let mut owned = Arc::unwrap_or_clone(node);
    match &mut owned {
        LogicExprNode::SingleVariableNumericEquality { hash, .. }
        | LogicExprNode::MultiVariableEquality { hash, .. }
        | LogicExprNode::SingleVariableInequality { hash, .. }
        | LogicExprNode::MultiVariableInequality { hash, .. } => *hash = label,
        _ => {}
    }

    Arc::new(owned)
}

///
/// TESTS
///
