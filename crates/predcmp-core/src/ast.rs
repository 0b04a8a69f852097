use crate::hash::{StructuralHash, StructuralHasher};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{BitAnd, BitOr};

///
/// Expression AST
///
/// Generic filter-expression tree as produced by an external query parser.
/// The JSON shape matches the groq-js AST (`{"type": "OpCall", ...}`), so
/// parser output deserializes directly. Nothing here is interpreted; the
/// transform pass decides what each node means logically.
///

///
/// OpCode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum OpCode {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "match")]
    Match,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "**")]
    Pow,
}

impl OpCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "in",
            Self::Match => "match",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "**",
        }
    }

    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }
}

///
/// ArrayElement
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayElement {
    pub value: ExprNode,
    #[serde(default)]
    pub is_splat: bool,
}

impl ArrayElement {
    #[must_use]
    pub const fn item(value: ExprNode) -> Self {
        Self {
            value,
            is_splat: false,
        }
    }

    #[must_use]
    pub const fn splat(value: ExprNode) -> Self {
        Self {
            value,
            is_splat: true,
        }
    }
}

///
/// ExprNode
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprNode {
    And {
        left: Box<Self>,
        right: Box<Self>,
    },
    Or {
        left: Box<Self>,
        right: Box<Self>,
    },
    Not {
        base: Box<Self>,
    },
    Group {
        base: Box<Self>,
    },
    Value {
        value: Value,
    },
    OpCall {
        op: OpCode,
        left: Box<Self>,
        right: Box<Self>,
    },
    AccessAttribute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<Box<Self>>,
        name: String,
    },
    AccessElement {
        base: Box<Self>,
        index: i64,
    },
    Array {
        elements: Vec<ArrayElement>,
    },
    #[serde(rename_all = "camelCase")]
    Slice {
        base: Box<Self>,
        left: f64,
        right: f64,
        is_inclusive: bool,
    },
    Filter {
        base: Box<Self>,
        expr: Box<Self>,
    },
    Everything,
    This,
    Parent {
        n: u32,
    },
    Parameter {
        name: String,
    },
    FuncCall {
        #[serde(default = "default_namespace")]
        namespace: String,
        name: String,
        #[serde(default)]
        args: Vec<Self>,
    },
    Neg {
        base: Box<Self>,
    },
    Pos {
        base: Box<Self>,
    },
    Deref {
        base: Box<Self>,
    },
}

fn default_namespace() -> String {
    "global".to_string()
}

impl ExprNode {
    /// Decode a JSON-encoded AST.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::And { .. } => "And",
            Self::Or { .. } => "Or",
            Self::Not { .. } => "Not",
            Self::Group { .. } => "Group",
            Self::Value { .. } => "Value",
            Self::OpCall { .. } => "OpCall",
            Self::AccessAttribute { .. } => "AccessAttribute",
            Self::AccessElement { .. } => "AccessElement",
            Self::Array { .. } => "Array",
            Self::Slice { .. } => "Slice",
            Self::Filter { .. } => "Filter",
            Self::Everything => "Everything",
            Self::This => "This",
            Self::Parent { .. } => "Parent",
            Self::Parameter { .. } => "Parameter",
            Self::FuncCall { .. } => "FuncCall",
            Self::Neg { .. } => "Neg",
            Self::Pos { .. } => "Pos",
            Self::Deref { .. } => "Deref",
        }
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    /// Attribute access on the implicit `this`.
    #[must_use]
    pub fn attr(name: impl Into<String>) -> Self {
        Self::AccessAttribute {
            base: None,
            name: name.into(),
        }
    }

    /// Attribute access on `self`, e.g. `ExprNode::attr("a").dot("b")`.
    #[must_use]
    pub fn dot(self, name: impl Into<String>) -> Self {
        Self::AccessAttribute {
            base: Some(Box::new(self)),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::value(value.into())
    }

    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::value(value)
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::value(value)
    }

    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Parameter { name: name.into() }
    }

    #[must_use]
    pub fn array(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Array {
            elements: items.into_iter().map(ArrayElement::item).collect(),
        }
    }

    #[must_use]
    pub fn slice(self, left: f64, right: f64, is_inclusive: bool) -> Self {
        Self::Slice {
            base: Box::new(self),
            left,
            right,
            is_inclusive,
        }
    }

    #[must_use]
    pub fn op(op: OpCode, left: Self, right: Self) -> Self {
        Self::OpCall {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn eq(left: Self, right: Self) -> Self {
        Self::op(OpCode::Eq, left, right)
    }

    #[must_use]
    pub fn ne(left: Self, right: Self) -> Self {
        Self::op(OpCode::Ne, left, right)
    }

    #[must_use]
    pub fn lt(left: Self, right: Self) -> Self {
        Self::op(OpCode::Lt, left, right)
    }

    #[must_use]
    pub fn lte(left: Self, right: Self) -> Self {
        Self::op(OpCode::Lte, left, right)
    }

    #[must_use]
    pub fn gt(left: Self, right: Self) -> Self {
        Self::op(OpCode::Gt, left, right)
    }

    #[must_use]
    pub fn gte(left: Self, right: Self) -> Self {
        Self::op(OpCode::Gte, left, right)
    }

    #[must_use]
    pub fn in_(left: Self, right: Self) -> Self {
        Self::op(OpCode::In, left, right)
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(base: Self) -> Self {
        Self::Not {
            base: Box::new(base),
        }
    }

    #[must_use]
    pub fn group(base: Self) -> Self {
        Self::Group {
            base: Box::new(base),
        }
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn neg(base: Self) -> Self {
        Self::Neg {
            base: Box::new(base),
        }
    }
}

impl BitAnd for ExprNode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and(self, rhs)
    }
}

impl BitAnd for &ExprNode {
    type Output = ExprNode;

    fn bitand(self, rhs: Self) -> Self::Output {
        ExprNode::and(self.clone(), rhs.clone())
    }
}

impl BitOr for ExprNode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::or(self, rhs)
    }
}

impl BitOr for &ExprNode {
    type Output = ExprNode;

    fn bitor(self, rhs: Self) -> Self::Output {
        ExprNode::or(self.clone(), rhs.clone())
    }
}

// Each node feeds `[kind, fields...]`; optional fields use the none sentinel.
impl StructuralHash for ExprNode {
    fn feed(&self, hasher: &mut StructuralHasher) {
        match self {
            Self::And { left, right } | Self::Or { left, right } => {
                hasher.begin_array(3);
                hasher.write_str(self.kind());
                left.feed(hasher);
                right.feed(hasher);
            }
            Self::Not { base }
            | Self::Group { base }
            | Self::Neg { base }
            | Self::Pos { base }
            | Self::Deref { base } => {
                hasher.begin_array(2);
                hasher.write_str(self.kind());
                base.feed(hasher);
            }
            Self::Value { value } => {
                hasher.begin_array(2);
                hasher.write_str(self.kind());
                value.feed(hasher);
            }
            Self::OpCall { op, left, right } => {
                hasher.begin_array(4);
                hasher.write_str(self.kind());
                hasher.write_str(op.as_str());
                left.feed(hasher);
                right.feed(hasher);
            }
            Self::AccessAttribute { base, name } => {
                hasher.begin_array(3);
                hasher.write_str(self.kind());
                match base {
                    Some(base) => base.feed(hasher),
                    None => hasher.write_none(),
                }
                hasher.write_str(name);
            }
            Self::AccessElement { base, index } => {
                hasher.begin_array(3);
                hasher.write_str(self.kind());
                base.feed(hasher);
                hasher.write_i64(*index);
            }
            Self::Array { elements } => {
                hasher.begin_array(2);
                hasher.write_str(self.kind());
                hasher.begin_array(elements.len());
                for element in elements {
                    hasher.write_bool(element.is_splat);
                    element.value.feed(hasher);
                }
            }
            Self::Slice {
                base,
                left,
                right,
                is_inclusive,
            } => {
                hasher.begin_array(5);
                hasher.write_str(self.kind());
                base.feed(hasher);
                hasher.write_f64(*left);
                hasher.write_f64(*right);
                hasher.write_bool(*is_inclusive);
            }
            Self::Filter { base, expr } => {
                hasher.begin_array(3);
                hasher.write_str(self.kind());
                base.feed(hasher);
                expr.feed(hasher);
            }
            Self::Everything | Self::This => {
                hasher.begin_array(1);
                hasher.write_str(self.kind());
            }
            Self::Parent { n } => {
                hasher.begin_array(2);
                hasher.write_str(self.kind());
                hasher.write_i64(i64::from(*n));
            }
            Self::Parameter { name } => {
                hasher.begin_array(2);
                hasher.write_str(self.kind());
                hasher.write_str(name);
            }
            Self::FuncCall {
                namespace,
                name,
                args,
            } => {
                hasher.begin_array(4);
                hasher.write_str(self.kind());
                hasher.write_str(namespace);
                hasher.write_str(name);
                hasher.begin_array(args.len());
                for arg in args {
                    arg.feed(hasher);
                }
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_groq_style_json() {
        let source = json!({
            "type": "OpCall",
            "op": "in",
            "left": { "type": "AccessAttribute", "name": "_type" },
            "right": {
                "type": "Array",
                "elements": [
                    { "type": "ArrayElement", "value": { "type": "Value", "value": "book" }, "isSplat": false },
                ],
            },
        })
        .to_string();

        let node = ExprNode::from_json(&source).expect("decode");

        assert_eq!(
            node,
            ExprNode::in_(ExprNode::attr("_type"), ExprNode::array([ExprNode::string("book")]))
        );
    }

    #[test]
    fn decodes_slices_and_unit_variants() {
        let slice = ExprNode::from_json(
            r#"{"type":"Slice","base":{"type":"This"},"left":1,"right":3,"isInclusive":true}"#,
        )
        .expect("decode");

        assert_eq!(slice, ExprNode::This.slice(1.0, 3.0, true));
    }

    #[test]
    fn rejects_unknown_operators() {
        let err = ExprNode::from_json(
            r#"{"type":"OpCall","op":"<>","left":{"type":"This"},"right":{"type":"This"}}"#,
        )
        .expect_err("unknown op");

        assert!(err.to_string().contains("<>"));
    }

    #[test]
    fn structural_hash_tracks_structure() {
        let a = ExprNode::eq(ExprNode::attr("x"), ExprNode::number(1.0));
        let b = ExprNode::eq(ExprNode::attr("x"), ExprNode::number(1.0));
        let c = ExprNode::eq(ExprNode::number(1.0), ExprNode::attr("x"));

        assert_eq!(a.structural_hash(), b.structural_hash());
        assert_ne!(a.structural_hash(), c.structural_hash());
    }

    #[test]
    fn bit_operators_build_junctions() {
        let a = ExprNode::attr("a");
        let b = ExprNode::attr("b");

        assert_eq!(&a & &b, ExprNode::and(a.clone(), b.clone()));
        assert_eq!(a.clone() | b.clone(), ExprNode::or(a, b));
    }
}
