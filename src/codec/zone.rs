//! Timezone-identifier codec.
//!
//! Accepts `Z`/`UTC`-style names, fixed offsets, and region IDs. The
//! large table mapping legacy/ambiguous short zone names to offsets is
//! external lookup data; embedders that need it inject their table via
//! [`ZoneIdCodec::with_legacy_names`].

use std::str::FromStr;

use chrono::FixedOffset;
use indexmap::IndexMap;

use super::{Codec, CodecError};
use crate::tree::Node;
use crate::value::FieldValue;

/// Codec for timezone-identifier fields.
pub struct ZoneIdCodec {
    legacy_names: IndexMap<String, String>,
}

impl ZoneIdCodec {
    /// A codec accepting only standard identifiers.
    pub fn new() -> Self {
        ZoneIdCodec {
            legacy_names: IndexMap::new(),
        }
    }

    /// A codec that additionally resolves legacy short names through
    /// the supplied table before standard parsing.
    pub fn with_legacy_names<I, K, V>(names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ZoneIdCodec {
            legacy_names: names
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(mapped) = self.legacy_names.get(name) {
            return Some(mapped.clone());
        }
        match name {
            "Z" | "UTC" | "GMT" | "UT" => return Some("UTC".to_string()),
            _ => {},
        }
        if name.starts_with('+') || name.starts_with('-') {
            return FixedOffset::from_str(name).ok().map(|offset| offset.to_string());
        }
        // Region IDs are carried verbatim; resolving them needs a full
        // tz database, which is the embedder's concern.
        if name.contains('/') {
            return Some(name.to_string());
        }
        None
    }
}

impl Default for ZoneIdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ZoneIdCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Text(name) => {
                self.resolve(name)
                    .map(FieldValue::Zone)
                    .ok_or_else(|| CodecError::Invalid {
                        what: "zone id",
                        detail: format!("unknown timezone identifier: {name:?}"),
                    })
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "zone id",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Zone(name) => Ok(Node::Text(name.clone())),
            other => Err(CodecError::UnexpectedKind {
                expected: "zone id",
                actual: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Z", "UTC")]
    #[test_case("UTC", "UTC")]
    #[test_case("GMT", "UTC")]
    #[test_case("Asia/Tokyo", "Asia/Tokyo")]
    fn test_resolves_names(input: &str, expected: &str) {
        assert_eq!(
            ZoneIdCodec::new()
                .decode(&Node::Text(input.to_string()))
                .unwrap(),
            FieldValue::Zone(expected.to_string())
        );
    }

    #[test]
    fn test_fixed_offset_parses() {
        let decoded = ZoneIdCodec::new()
            .decode(&Node::Text("+09:00".to_string()))
            .unwrap();
        assert_eq!(decoded, FieldValue::Zone("+09:00".to_string()));
    }

    #[test]
    fn test_bare_short_name_is_an_error_without_legacy_table() {
        assert!(ZoneIdCodec::new()
            .decode(&Node::Text("JST".to_string()))
            .is_err());
    }

    #[test]
    fn test_legacy_table_resolves_short_names() {
        let codec = ZoneIdCodec::with_legacy_names([("JST", "+09:00")]);
        assert_eq!(
            codec.decode(&Node::Text("JST".to_string())).unwrap(),
            FieldValue::Zone("+09:00".to_string())
        );
    }
}
