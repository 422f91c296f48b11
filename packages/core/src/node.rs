//! Node trees decoded from the store's JSON representation.
//!
//! A [`Node`] is one store entry: either a leaf holding a value, or a
//! directory holding the children the store chose to include in its
//! response. Every tree is built fresh from a single response and owns its
//! whole subtree, so a failed parse simply drops whatever was built so far.

use serde_json::{Map, Value as JsonValue};

use crate::error::ParseError;
use crate::path::last_segment;

/// Maximum nesting depth accepted by the parser.
///
/// The store is remote and its responses are not trusted, so nesting is
/// bounded. This also bounds the recursion of dropping a tree. Each node
/// level costs serde_json two levels (object and `nodes` array), so the
/// bound sits well below serde_json's own recursion limit of 128 and an
/// over-deep response is reported here rather than as invalid JSON.
pub const MAX_DEPTH: usize = 32;

/// One entry of the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Absolute key, as assigned by the store.
    pub key: String,
    /// Leaf content. `None` for directories and for leaves sent without one.
    pub value: Option<String>,
    pub dir: bool,
    /// Expiry hint in seconds. Not enforced.
    pub ttl: Option<i64>,
    /// The node's version.
    pub modified_index: u64,
    pub created_index: u64,
    /// Children in the order the store returned them. Only populated for
    /// directories.
    pub nodes: Vec<Node>,
}

impl Node {
    /// Decode the top-level node of a store response.
    ///
    /// The store omits `key` and `modifiedIndex` for its root directory, so
    /// the top-level node defaults them to `/` and `0`. Children must carry
    /// both.
    pub fn from_json(value: &JsonValue) -> Result<Node, ParseError> {
        parse_node(value, 0)
    }

    /// Decode a node from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Node, ParseError> {
        let value: JsonValue =
            serde_json::from_slice(bytes).map_err(|e| ParseError::Json(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Last segment of the key.
    pub fn name(&self) -> &str {
        last_segment(&self.key)
    }

    pub fn is_dir(&self) -> bool {
        self.dir
    }

    /// Length of the leaf value in bytes; 0 for directories.
    pub fn len(&self) -> u64 {
        if self.dir {
            return 0;
        }
        self.value.as_ref().map(|v| v.len() as u64).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaf value bytes. Empty for directories and value-less leaves.
    pub fn value_bytes(&self) -> &[u8] {
        self.value.as_deref().map(str::as_bytes).unwrap_or_default()
    }

    pub fn children(&self) -> &[Node] {
        &self.nodes
    }
}

fn parse_node(value: &JsonValue, depth: usize) -> Result<Node, ParseError> {
    if depth >= MAX_DEPTH {
        return Err(ParseError::TooDeep { max: MAX_DEPTH });
    }

    let object = value.as_object().ok_or(ParseError::NotAnObject)?;
    let top_level = depth == 0;

    let key = match string_field(object, "key")? {
        Some(key) => key,
        None if top_level => "/".to_string(),
        None => return Err(ParseError::MissingField { field: "key" }),
    };

    let modified_index = match index_field(object, "modifiedIndex")? {
        Some(index) => index,
        None if top_level => 0,
        None => {
            return Err(ParseError::MissingField {
                field: "modifiedIndex",
            })
        }
    };

    let created_index = index_field(object, "createdIndex")?.unwrap_or(0);
    let value = string_field(object, "value")?;

    let ttl = match object.get("ttl") {
        None | Some(JsonValue::Null) => None,
        Some(raw) => Some(raw.as_i64().ok_or(ParseError::InvalidField {
            field: "ttl",
            expected: "integer",
        })?),
    };

    let dir = match object.get("dir") {
        None => false,
        Some(raw) => raw.as_bool().ok_or(ParseError::InvalidField {
            field: "dir",
            expected: "boolean",
        })?,
    };

    let mut nodes = Vec::new();
    if dir {
        if let Some(raw) = object.get("nodes") {
            let children = raw.as_array().ok_or(ParseError::InvalidField {
                field: "nodes",
                expected: "array",
            })?;
            nodes.reserve(children.len());
            for (index, child) in children.iter().enumerate() {
                // An error here drops `nodes` and everything parsed before it.
                let child = parse_node(child, depth + 1).map_err(|e| e.in_child(index))?;
                nodes.push(child);
            }
        }
    }

    Ok(Node {
        key,
        value,
        dir,
        ttl,
        modified_index,
        created_index,
        nodes,
    })
}

fn string_field(
    object: &Map<String, JsonValue>,
    field: &'static str,
) -> Result<Option<String>, ParseError> {
    match object.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

fn index_field(
    object: &Map<String, JsonValue>,
    field: &'static str,
) -> Result<Option<u64>, ParseError> {
    match object.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(raw) => raw.as_u64().map(Some).ok_or(ParseError::InvalidField {
            field,
            expected: "unsigned integer",
        }),
    }
}
