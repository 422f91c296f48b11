//! Identity tokens for store nodes.
//!
//! The store has no inode numbers, so a node's identity is manufactured
//! from its path: a deterministic hash of the path names the node and the
//! store's `modifiedIndex` versions it. Distinct paths may hash to the same
//! value. The collision risk is accepted; nothing keeps a registry of issued
//! identities.

use serde::Serialize;

use crate::node::Node;

/// Qid type bit marking a directory.
pub const QTDIR: u8 = 0x80;

/// Qid type of a plain file.
pub const QTFILE: u8 = 0x00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QidKind {
    Dir,
    File,
}

/// A `(hash, version, kind)` identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Qid {
    pub path: u64,
    pub version: u64,
    pub kind: QidKind,
}

impl Qid {
    /// Compute the identity of `node` found at `path`.
    ///
    /// Without a node the version is 0. The root is always a directory, even
    /// when the store leaves `dir` off its root node.
    pub fn new(path: &str, node: Option<&Node>) -> Self {
        let is_dir = path == "/" || node.map(Node::is_dir).unwrap_or(false);
        Qid {
            path: path_hash(path),
            version: node.map(|n| n.modified_index).unwrap_or(0),
            kind: if is_dir { QidKind::Dir } else { QidKind::File },
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == QidKind::Dir
    }

    /// The protocol's qid type byte.
    pub fn type_bits(&self) -> u8 {
        match self.kind {
            QidKind::Dir => QTDIR,
            QidKind::File => QTFILE,
        }
    }
}

/// Jenkins one-at-a-time hash of a path, in 64-bit wrapping arithmetic.
pub fn path_hash(path: &str) -> u64 {
    let mut hash: u64 = 0;
    for &b in path.as_bytes() {
        hash = hash.wrapping_add(u64::from(b));
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}
