//! Decoded field values held in a task's Backing Store.
//!
//! A [`FieldValue`] is the post-codec, already-typed form of one field.
//! It is what read accessors hand out and what write accessors store,
//! as opposed to [`Node`](crate::tree::Node) which is the raw tree shape
//! before decoding.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::tree::Node;

/// A decoded, typed field value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// An integer wider than `i64`.
    BigInteger(i128),
    /// A binary floating-point value.
    Float(f64),
    /// An arbitrary-precision decimal, kept as its canonical literal.
    Decimal(String),
    /// A text value.
    Text(String),
    /// A canonical character-set name.
    Charset(String),
    /// A canonical timezone identifier.
    Zone(String),
    /// An undecoded tree fragment carried through as-is.
    Json(Node),
    /// An ordered list of values.
    List(Vec<FieldValue>),
    /// An ordered string-keyed map of values.
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// The kind name of this value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::BigInteger(_) => "big_integer",
            FieldValue::Float(_) => "float",
            FieldValue::Decimal(_) => "decimal",
            FieldValue::Text(_) => "text",
            FieldValue::Charset(_) => "charset",
            FieldValue::Zone(_) => "zone",
            FieldValue::Json(_) => "json",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }

    /// Borrow this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow this value as an `i64`, if it is an integer fitting one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::BigInteger(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Borrow this value as an `f64`, if it is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow this value as text, if it is text-like.
    ///
    /// Charset and zone values are text-like: they read back as their
    /// canonical names.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Charset(s) | FieldValue::Zone(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(elements) => Some(elements),
            _ => None,
        }
    }

    /// Borrow this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            FieldValue::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::BigInteger(a), FieldValue::BigInteger(b)) => a == b,
            // Bitwise, consistent with Hash.
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => a == b,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Charset(a), FieldValue::Charset(b)) => a == b,
            (FieldValue::Zone(a), FieldValue::Zone(b)) => a == b,
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => a == b,
            (FieldValue::Map(a), FieldValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            FieldValue::Boolean(b) => {
                state.write_u8(0);
                b.hash(state);
            },
            FieldValue::Integer(i) => {
                state.write_u8(1);
                i.hash(state);
            },
            FieldValue::BigInteger(i) => {
                state.write_u8(2);
                i.hash(state);
            },
            FieldValue::Float(f) => {
                state.write_u8(3);
                f.to_bits().hash(state);
            },
            FieldValue::Decimal(s) => {
                state.write_u8(4);
                s.hash(state);
            },
            FieldValue::Text(s) => {
                state.write_u8(5);
                s.hash(state);
            },
            FieldValue::Charset(s) => {
                state.write_u8(6);
                s.hash(state);
            },
            FieldValue::Zone(s) => {
                state.write_u8(7);
                s.hash(state);
            },
            FieldValue::Json(node) => {
                state.write_u8(8);
                node.hash(state);
            },
            FieldValue::List(elements) => {
                state.write_u8(9);
                elements.hash(state);
            },
            FieldValue::Map(entries) => {
                state.write_u8(10);
                // Map equality is order-insensitive, so the hash has to
                // be commutative over entries.
                let mut sum: u64 = 0;
                for (key, value) in entries {
                    let mut entry_hasher = DefaultHasher::new();
                    key.hash(&mut entry_hasher);
                    value.hash(&mut entry_hasher);
                    sum = sum.wrapping_add(entry_hasher.finish());
                }
                state.write_u64(sum);
            },
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::BigInteger(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Decimal(s) => f.write_str(s),
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Charset(s) | FieldValue::Zone(s) => f.write_str(s),
            FieldValue::Json(node) => write!(f, "{node}"),
            FieldValue::List(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            },
            FieldValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            },
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_kinds() {
        assert_eq!(FieldValue::Integer(7).as_i64(), Some(7));
        assert_eq!(FieldValue::Text("x".into()).as_str(), Some("x"));
        assert_eq!(FieldValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Text("x".into()).as_i64(), None);
    }

    #[test]
    fn test_big_integer_narrows_when_it_fits() {
        assert_eq!(FieldValue::BigInteger(5).as_i64(), Some(5));
        assert_eq!(FieldValue::BigInteger(i128::from(i64::MAX) + 1).as_i64(), None);
    }

    #[test]
    fn test_display_quotes_text_only() {
        assert_eq!(FieldValue::Text("x".into()).to_string(), "\"x\"");
        assert_eq!(FieldValue::Integer(3).to_string(), "3");
        assert_eq!(FieldValue::Zone("UTC".into()).to_string(), "UTC");
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN));
        assert_ne!(FieldValue::Float(0.0), FieldValue::Float(-0.0));
    }
}
