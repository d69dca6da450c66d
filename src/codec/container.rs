//! Container codecs built structurally around an element codec.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{Codec, CodecError};
use crate::tree::Node;
use crate::value::FieldValue;

/// Codec for `List(T)` fields, wrapping the element type's codec.
pub struct ListCodec {
    element: Arc<dyn Codec>,
}

impl ListCodec {
    /// Wrap an element codec.
    pub fn new(element: Arc<dyn Codec>) -> Self {
        ListCodec { element }
    }
}

impl Codec for ListCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Array(elements) => {
                let mut decoded = Vec::with_capacity(elements.len());
                for element in elements {
                    decoded.push(self.element.decode(element)?);
                }
                Ok(FieldValue::List(decoded))
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "array",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::List(elements) => {
                let mut encoded = Vec::with_capacity(elements.len());
                for element in elements {
                    encoded.push(self.element.encode(element)?);
                }
                Ok(Node::Array(encoded))
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "list",
                actual: other.kind(),
            }),
        }
    }
}

/// Codec for `Map(T)` fields, wrapping the value type's codec.
pub struct MapCodec {
    value: Arc<dyn Codec>,
}

impl MapCodec {
    /// Wrap a value codec.
    pub fn new(value: Arc<dyn Codec>) -> Self {
        MapCodec { value }
    }
}

impl Codec for MapCodec {
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError> {
        match node {
            Node::Object(entries) => {
                let mut decoded = IndexMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    decoded.insert(key.clone(), self.value.decode(entry)?);
                }
                Ok(FieldValue::Map(decoded))
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "object",
                actual: other.kind(),
            }),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError> {
        match value {
            FieldValue::Map(entries) => {
                let mut encoded = IndexMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    encoded.insert(key.clone(), self.value.encode(entry)?);
                }
                Ok(Node::Object(encoded))
            },
            other => Err(CodecError::UnexpectedKind {
                expected: "map",
                actual: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::scalar::IntegerCodec;
    use super::*;

    #[test]
    fn test_list_decodes_each_element() {
        let codec = ListCodec::new(Arc::new(IntegerCodec));
        let node = Node::Array(vec![Node::Integer(1), Node::Text("2".to_string())]);
        assert_eq!(
            codec.decode(&node).unwrap(),
            FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)])
        );
    }

    #[test]
    fn test_list_propagates_element_errors() {
        let codec = ListCodec::new(Arc::new(IntegerCodec));
        let node = Node::Array(vec![Node::Integer(1), Node::Boolean(true)]);
        assert!(codec.decode(&node).is_err());
    }

    #[test]
    fn test_map_preserves_entry_order() {
        let codec = MapCodec::new(Arc::new(IntegerCodec));
        let node = Node::object_from([("z", Node::Integer(1)), ("a", Node::Integer(2))]);
        let decoded = codec.decode(&node).unwrap();
        let keys: Vec<&String> = decoded.as_map().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_round_trip() {
        let codec = MapCodec::new(Arc::new(IntegerCodec));
        let node = Node::object_from([("n", Node::Integer(9))]);
        let decoded = codec.decode(&node).unwrap();
        assert_eq!(codec.encode(&decoded).unwrap(), node);
    }
}
