//! # etcdfs-core
//!
//! The data model shared by the etcdfs layers:
//! - `KeyPath`: absolute, normalized path into the store's keyspace
//! - `Node`: one store entry and its owned subtree, decoded from JSON
//! - `Qid`: identity token manufactured from a path and a node version
//!
//! # Example
//!
//! ```rust
//! use etcdfs_core::{KeyPath, Node, Qid};
//!
//! let node = Node::from_slice(br#"{"key":"/foo","value":"bar","modifiedIndex":2}"#).unwrap();
//! let path = KeyPath::root().join("foo").unwrap();
//! let qid = Qid::new(path.as_str(), Some(&node));
//! assert!(!qid.is_dir());
//! assert_eq!(qid.version, 2);
//! ```

mod error;
mod node;
mod path;
mod qid;

pub use error::ParseError;
pub use node::{Node, MAX_DEPTH};
pub use path::{last_segment, KeyPath, PathError};
pub use qid::{path_hash, Qid, QidKind, QTDIR, QTFILE};
