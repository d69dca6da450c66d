//! Character-set name codec.
//!
//! Canonicalizes the handful of charset names that actually appear in
//! plugin configurations. Unknown names are a decode error rather than
//! being passed through, so typos surface at bind time.

use super::{Codec, CodecError};
use crate::tree::Node;
use crate::value::FieldValue;

/// Codec for charset-name fields.
pub struct CharsetCodec;

fn canonicalize(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Some("UTF-8"),
        "us-ascii" | "ascii" => Some("US-ASCII"),
        "iso-8859-1" | "latin1" | "latin-1" => Some("ISO-8859-1"),
        "utf-16" | "utf16" => Some("UTF-16"),
        "utf-16be" => Some("UTF-16BE"),
        "utf-16le" => Some("UTF-16LE"),
        _ => None,
    }
}

impl Codec for CharsetCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Text(name) => canonicalize(name)
                .map(|canonical| FieldValue::Charset(canonical.to_string()))
                .ok_or_else(|| CodecError::Invalid {
                    what: "charset",
                    detail: format!("unknown charset name: {name:?}"),
                }),
            other => Err(CodecError::UnexpectedKind {
                expected: "charset",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Charset(name) => Ok(Node::Text(name.clone())),
            other => Err(CodecError::UnexpectedKind {
                expected: "charset",
                actual: other.kind(),
            }),
        }
    }
}
