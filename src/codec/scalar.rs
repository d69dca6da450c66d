//! Core scalar codecs.
//!
//! Decoding is deliberately tolerant of stringified scalars: a config
//! value `"42"` decodes as integer 42 when the declared type says so.
//! That coercion is what lets one source value drive several
//! differently-typed fields.

use super::{Codec, CodecError};
use crate::tree::Node;
use crate::value::FieldValue;

/// Codec for boolean fields.
pub struct BooleanCodec;

impl Codec for BooleanCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Boolean(b) => Ok(FieldValue::Boolean(*b)),
            Node::Text(s) => match s.as_str() {
                "true" => Ok(FieldValue::Boolean(true)),
                "false" => Ok(FieldValue::Boolean(false)),
                _ => Err(CodecError::Invalid {
                    what: "boolean",
                    detail: format!("not a boolean text: {s:?}"),
                }),
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "boolean",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Boolean(b) => Ok(Node::Boolean(*b)),
            other => Err(CodecError::UnexpectedKind {
                expected: "boolean",
                actual: other.kind(),
            }),
        }
    }
}

/// Codec for integer fields.
pub struct IntegerCodec;

impl Codec for IntegerCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Integer(i) => Ok(FieldValue::Integer(*i)),
            Node::BigInteger(i) => i64::try_from(*i).map(FieldValue::Integer).map_err(|_| {
                CodecError::Invalid {
                    what: "integer",
                    detail: format!("out of 64-bit range: {i}"),
                }
            }),
            Node::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Ok(FieldValue::Integer(*f as i64))
                } else {
                    Err(CodecError::Invalid {
                        what: "integer",
                        detail: format!("not an integral number: {f}"),
                    })
                }
            },
            Node::Text(s) => s.parse::<i64>().map(FieldValue::Integer).map_err(|_| {
                CodecError::Invalid {
                    what: "integer",
                    detail: format!("not an integer text: {s:?}"),
                }
            }),
            Node::Decimal(literal) => {
                literal.parse::<i64>().map(FieldValue::Integer).map_err(|_| {
                    CodecError::Invalid {
                        what: "integer",
                        detail: format!("not an integral decimal: {literal}"),
                    }
                })
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "integer",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Integer(i) => Ok(Node::Integer(*i)),
            FieldValue::BigInteger(i) => Ok(Node::BigInteger(*i)),
            other => Err(CodecError::UnexpectedKind {
                expected: "integer",
                actual: other.kind(),
            }),
        }
    }
}

/// Codec for binary floating-point fields.
pub struct FloatCodec;

impl Codec for FloatCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Float(f) => Ok(FieldValue::Float(*f)),
            Node::Integer(i) => Ok(FieldValue::Float(*i as f64)),
            Node::BigInteger(i) => Ok(FieldValue::Float(*i as f64)),
            Node::Decimal(literal) => {
                literal.parse::<f64>().map(FieldValue::Float).map_err(|_| {
                    CodecError::Invalid {
                        what: "float",
                        detail: format!("unparsable decimal: {literal}"),
                    }
                })
            },
            Node::Text(s) => s.parse::<f64>().map(FieldValue::Float).map_err(|_| {
                CodecError::Invalid {
                    what: "float",
                    detail: format!("not a number text: {s:?}"),
                }
            }),
            other => Err(CodecError::UnexpectedKind {
                expected: "float",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Float(f) => Ok(Node::Float(*f)),
            other => Err(CodecError::UnexpectedKind {
                expected: "float",
                actual: other.kind(),
            }),
        }
    }
}

/// Codec for arbitrary-precision decimal fields.
pub struct DecimalCodec;

impl Codec for DecimalCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Decimal(literal) => Ok(FieldValue::Decimal(literal.clone())),
            Node::Integer(i) => Ok(FieldValue::Decimal(i.to_string())),
            Node::BigInteger(i) => Ok(FieldValue::Decimal(i.to_string())),
            Node::Float(f) => {
                if f.is_finite() {
                    Ok(FieldValue::Decimal(f.to_string()))
                } else {
                    Err(CodecError::Invalid {
                        what: "decimal",
                        detail: format!("non-finite float: {f}"),
                    })
                }
            },
            Node::Text(s) => match Node::decimal(s.clone()) {
                Some(Node::Decimal(literal)) => Ok(FieldValue::Decimal(literal)),
                _ => Err(CodecError::Invalid {
                    what: "decimal",
                    detail: format!("not a decimal text: {s:?}"),
                }),
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "decimal",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Decimal(literal) => {
                Node::decimal(literal.clone()).ok_or_else(|| CodecError::Invalid {
                    what: "decimal",
                    detail: format!("not a decimal literal: {literal}"),
                })
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "decimal",
                actual: other.kind(),
            }),
        }
    }
}

/// Codec for text fields.
pub struct StringCodec;

impl Codec for StringCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Text(s) => Ok(FieldValue::Text(s.clone())),
            Node::Integer(i) => Ok(FieldValue::Text(i.to_string())),
            Node::BigInteger(i) => Ok(FieldValue::Text(i.to_string())),
            Node::Float(f) => Ok(FieldValue::Text(f.to_string())),
            Node::Decimal(literal) => Ok(FieldValue::Text(literal.clone())),
            Node::Boolean(b) => Ok(FieldValue::Text(b.to_string())),
            other => Err(CodecError::UnexpectedKind {
                expected: "string",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Text(s) => Ok(Node::Text(s.clone())),
            other => Err(CodecError::UnexpectedKind {
                expected: "string",
                actual: other.kind(),
            }),
        }
    }
}

/// Passthrough codec for fields declared as raw tree fragments.
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        Ok(FieldValue::Json(node.clone()))
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Json(node) => Ok(node.clone()),
            other => Err(CodecError::UnexpectedKind {
                expected: "json",
                actual: other.kind(),
            }),
        }
    }
}
