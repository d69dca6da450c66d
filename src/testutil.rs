//! Fake foreign sources and nodes shared across unit tests.

use crate::foreign::{ForeignNode, ForeignSource, ForeignValue};

/// A fake foreign node exercising the per-kind accessor convention.
pub(crate) enum FakeNode {
    Object(Vec<(String, FakeNode)>),
    Array(Vec<FakeNode>),
    Text(String),
    Long(i64),
    Double(f64),
    Decimal(String),
    BigInteger(String),
    Boolean(bool),
    Null,
    /// A node of an arbitrary kind name with no accessors at all.
    OfKind(String),
    /// Claims the text kind but exposes no accessor.
    BrokenText,
}

impl FakeNode {
    pub(crate) fn object(fields: Vec<(String, FakeNode)>) -> Self {
        FakeNode::Object(fields)
    }

    pub(crate) fn array(elements: Vec<FakeNode>) -> Self {
        FakeNode::Array(elements)
    }

    pub(crate) fn text(s: &str) -> Self {
        FakeNode::Text(s.to_string())
    }

    pub(crate) fn long(i: i64) -> Self {
        FakeNode::Long(i)
    }

    pub(crate) fn double(f: f64) -> Self {
        FakeNode::Double(f)
    }

    pub(crate) fn decimal(literal: &str) -> Self {
        FakeNode::Decimal(literal.to_string())
    }

    pub(crate) fn big_integer(literal: &str) -> Self {
        FakeNode::BigInteger(literal.to_string())
    }

    pub(crate) fn boolean(b: bool) -> Self {
        FakeNode::Boolean(b)
    }

    pub(crate) fn null() -> Self {
        FakeNode::Null
    }

    pub(crate) fn of_kind(kind: &str) -> Self {
        FakeNode::OfKind(kind.to_string())
    }

    pub(crate) fn broken_text() -> Self {
        FakeNode::BrokenText
    }
}

impl ForeignNode for FakeNode {
    fn ancestry(&self) -> Vec<&str> {
        // Every fake reports a derived name first so tests exercise the
        // ancestry walk, not just exact-name matches.
        match self {
            FakeNode::Object(_) => vec!["fake_object", "object"],
            FakeNode::Array(_) => vec!["fake_array", "array"],
            FakeNode::Text(_) | FakeNode::BrokenText => vec!["fake_text", "text"],
            FakeNode::Long(_) => vec!["fake_long", "long"],
            FakeNode::Double(_) => vec!["fake_double", "double"],
            FakeNode::Decimal(_) => vec!["fake_decimal", "decimal"],
            FakeNode::BigInteger(_) => vec!["fake_big_integer", "big_integer"],
            FakeNode::Boolean(_) => vec!["fake_boolean", "boolean"],
            FakeNode::Null => vec!["fake_null", "null"],
            FakeNode::OfKind(kind) => vec![kind.as_str()],
        }
    }

    fn accessor(&self, name: &str) -> Option<ForeignValue<'_>> {
        match (self, name) {
            (FakeNode::Object(fields), "fields") => Some(ForeignValue::Fields(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v as &dyn ForeignNode))
                    .collect(),
            )),
            (FakeNode::Array(elements), "elements") => Some(ForeignValue::Elements(
                elements.iter().map(|e| e as &dyn ForeignNode).collect(),
            )),
            (FakeNode::Text(s), "text_value") => Some(ForeignValue::Text(s.clone())),
            (FakeNode::Long(i), "long_value") => Some(ForeignValue::Long(*i)),
            (FakeNode::Double(f), "double_value") => Some(ForeignValue::Double(*f)),
            (FakeNode::Decimal(s), "decimal_value") => Some(ForeignValue::Decimal(s.clone())),
            (FakeNode::BigInteger(s), "big_integer_value") => {
                Some(ForeignValue::BigInteger(s.clone()))
            },
            (FakeNode::Boolean(b), "boolean_value") => Some(ForeignValue::Boolean(*b)),
            _ => None,
        }
    }
}

/// A fake foreign source offering either capability, or neither.
pub(crate) struct FakeSource {
    text: Option<String>,
    root: Option<FakeNode>,
}

impl FakeSource {
    /// A source supporting only serialize-to-text.
    pub(crate) fn serialized(text: &str) -> Self {
        FakeSource {
            text: Some(text.to_string()),
            root: None,
        }
    }

    /// A source supporting only per-kind node access.
    pub(crate) fn fallback(root: FakeNode) -> Self {
        FakeSource {
            text: None,
            root: Some(root),
        }
    }

    /// A source supporting neither capability.
    pub(crate) fn empty() -> Self {
        FakeSource {
            text: None,
            root: None,
        }
    }
}

impl ForeignSource for FakeSource {
    fn to_json(&self) -> Option<Result<String, Box<dyn std::error::Error + Send + Sync>>> {
        self.text.clone().map(Ok)
    }

    fn root(&self) -> Option<&dyn ForeignNode> {
        self.root.as_ref().map(|n| n as &dyn ForeignNode)
    }
}
