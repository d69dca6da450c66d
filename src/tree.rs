//! The Canonical Tree: the engine's only internal data representation.
//!
//! Every binding and reconciliation operation works on [`Node`], a
//! value-type JSON-like tree. Object nodes keep their key order so that
//! dumping a task and re-parsing the dump is deterministic.
//!
//! Numbers are split into three kinds, matching what arrives over the
//! host/plugin boundary: [`Node::Integer`] for anything fitting `i64`,
//! [`Node::BigInteger`] for wider integers, and [`Node::Decimal`] for
//! arbitrary-precision decimal literals kept verbatim as text. Parsed
//! non-integer numbers land in [`Node::Float`], like the default tree
//! reader of the wire format does.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of a Canonical Tree.
///
/// Nodes are plain values: cloning is deep, and a node is never mutated
/// in place by the engine except through explicit rebuilds.
#[derive(Debug, Clone)]
pub enum Node {
    /// An object node with ordered keys.
    Object(IndexMap<String, Node>),
    /// An array node with ordered elements.
    Array(Vec<Node>),
    /// A text node.
    Text(String),
    /// An integer fitting `i64`.
    Integer(i64),
    /// An integer wider than `i64`, bounded at `i128`.
    BigInteger(i128),
    /// A binary floating-point number.
    Float(f64),
    /// An arbitrary-precision decimal, kept as its canonical literal.
    Decimal(String),
    /// A boolean node.
    Boolean(bool),
    /// An explicit null node.
    Null,
}

impl Node {
    /// Create an empty object node.
    pub fn object() -> Self {
        Node::Object(IndexMap::new())
    }

    /// Create an object node from ordered key/value pairs.
    pub fn object_from<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create a decimal node, verifying the literal is a JSON number.
    ///
    /// Returns `None` if `literal` is not a valid JSON number token.
    pub fn decimal(literal: impl Into<String>) -> Option<Self> {
        let literal = literal.into();
        if is_json_number_literal(&literal) {
            Some(Node::Decimal(literal))
        } else {
            None
        }
    }

    /// The kind name of this node, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Object(_) => "object",
            Node::Array(_) => "array",
            Node::Text(_) => "text",
            Node::Integer(_) => "integer",
            Node::BigInteger(_) => "big_integer",
            Node::Float(_) => "float",
            Node::Decimal(_) => "decimal",
            Node::Boolean(_) => "boolean",
            Node::Null => "null",
        }
    }

    /// Whether this node is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Node::Object(_))
    }

    /// Whether this node is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Borrow the entries of an object node.
    pub fn as_object(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Parse a Canonical Tree from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json_value(&value))
    }

    /// Rebuild a Canonical Tree from an already-parsed JSON value.
    pub fn from_json_value(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Boolean(*b),
            Value::Number(n) => classify_number(&n.to_string()),
            Value::String(s) => Node::Text(s.clone()),
            Value::Array(elements) => {
                Node::Array(elements.iter().map(Self::from_json_value).collect())
            },
            Value::Object(entries) => Node::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json_value(v)))
                    .collect(),
            ),
        }
    }

    /// Convert this tree into a JSON value, preserving key order.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json_value(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Boolean(b) => Value::Bool(*b),
            Node::Integer(i) => Value::Number((*i).into()),
            Node::BigInteger(i) => number_from_literal(&i.to_string()),
            Node::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Node::Decimal(literal) => number_from_literal(literal),
            Node::Text(s) => Value::String(s.clone()),
            Node::Array(elements) => {
                Value::Array(elements.iter().map(Node::to_json_value).collect())
            },
            Node::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
        }
    }

    /// Serialize this tree to JSON text with key order preserved.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_json_value())
    }
}

/// Classify a JSON number literal into the fitting node kind.
fn classify_number(literal: &str) -> Node {
    if literal.contains(['.', 'e', 'E']) {
        // The default reader maps every non-integer number to a double.
        return Node::Float(literal.parse::<f64>().unwrap_or(f64::NAN));
    }
    if let Ok(i) = literal.parse::<i64>() {
        return Node::Integer(i);
    }
    if let Ok(i) = literal.parse::<i128>() {
        return Node::BigInteger(i);
    }
    // Wider than i128: kept lossless as a decimal literal.
    Node::Decimal(literal.to_string())
}

/// Turn a validated number literal back into a JSON number value.
fn number_from_literal(literal: &str) -> Value {
    literal
        .parse::<serde_json::Number>()
        .map_or(Value::Null, Value::Number)
}

fn is_json_number_literal(literal: &str) -> bool {
    literal.parse::<serde_json::Number>().is_ok()
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Object(a), Node::Object(b)) => a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Text(a), Node::Text(b)) => a == b,
            (Node::Integer(a), Node::Integer(b)) => a == b,
            (Node::BigInteger(a), Node::BigInteger(b)) => a == b,
            // Bitwise comparison keeps equality reflexive for NaN and
            // consistent with the Hash implementation.
            (Node::Float(a), Node::Float(b)) => a.to_bits() == b.to_bits(),
            (Node::Decimal(a), Node::Decimal(b)) => a == b,
            (Node::Boolean(a), Node::Boolean(b)) => a == b,
            (Node::Null, Node::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Node::Object(entries) => {
                state.write_u8(0);
                // Object equality is order-insensitive, so the hash has
                // to be commutative over entries.
                let mut sum: u64 = 0;
                for (key, value) in entries {
                    let mut entry_hasher = DefaultHasher::new();
                    key.hash(&mut entry_hasher);
                    value.hash(&mut entry_hasher);
                    sum = sum.wrapping_add(entry_hasher.finish());
                }
                state.write_u64(sum);
            },
            Node::Array(elements) => {
                state.write_u8(1);
                elements.hash(state);
            },
            Node::Text(s) => {
                state.write_u8(2);
                s.hash(state);
            },
            Node::Integer(i) => {
                state.write_u8(3);
                i.hash(state);
            },
            Node::BigInteger(i) => {
                state.write_u8(4);
                i.hash(state);
            },
            Node::Float(f) => {
                state.write_u8(5);
                f.to_bits().hash(state);
            },
            Node::Decimal(literal) => {
                state.write_u8(6);
                literal.hash(state);
            },
            Node::Boolean(b) => {
                state.write_u8(7);
                b.hash(state);
            },
            Node::Null => state.write_u8(8),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_string() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<unserializable tree>"),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Node::from_json_value(&value))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Boolean(b)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Integer(i)
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::Integer(i64::from(i))
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::Float(f)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_classifies_integers() {
        let node = Node::from_json_str("{\"a\": 42}").unwrap();
        let entries = node.as_object().unwrap();
        assert_eq!(entries["a"], Node::Integer(42));
    }

    #[test]
    fn test_parse_classifies_big_integers() {
        let node = Node::from_json_str("{\"a\": 123456789012345678901234567890}").unwrap();
        let entries = node.as_object().unwrap();
        assert_eq!(
            entries["a"],
            Node::BigInteger(123_456_789_012_345_678_901_234_567_890)
        );
    }

    #[test]
    fn test_parse_classifies_floats() {
        let node = Node::from_json_str("{\"a\": 1.5, \"b\": 2e3}").unwrap();
        let entries = node.as_object().unwrap();
        assert_eq!(entries["a"], Node::Float(1.5));
        assert_eq!(entries["b"], Node::Float(2000.0));
    }

    #[test]
    fn test_key_order_survives_round_trip() {
        let text = "{\"zeta\":1,\"alpha\":2,\"mid\":{\"b\":true,\"a\":false}}";
        let node = Node::from_json_str(text).unwrap();
        assert_eq!(node.to_json_string().unwrap(), text);
    }

    #[test]
    fn test_decimal_emits_exact_literal() {
        let node = Node::object_from([(
            "d",
            Node::decimal("1.234567890123456789012345678901").unwrap(),
        )]);
        assert_eq!(
            node.to_json_string().unwrap(),
            "{\"d\":1.234567890123456789012345678901}"
        );
    }

    #[test]
    fn test_decimal_rejects_non_number_literal() {
        assert!(Node::decimal("not a number").is_none());
        assert!(Node::decimal("1.2.3").is_none());
    }

    #[test]
    fn test_object_equality_ignores_key_order() {
        let a = Node::object_from([("x", Node::Integer(1)), ("y", Node::Integer(2))]);
        let b = Node::object_from([("y", Node::Integer(2)), ("x", Node::Integer(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_objects_hash_alike_across_key_order() {
        use std::collections::hash_map::DefaultHasher;

        let a = Node::object_from([("x", Node::Integer(1)), ("y", Node::Integer(2))]);
        let b = Node::object_from([("y", Node::Integer(2)), ("x", Node::Integer(1))]);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Node::Null.kind(), "null");
        assert_eq!(Node::from("x").kind(), "text");
        assert_eq!(Node::object().kind(), "object");
    }
}
