//! Synthetic directory entries.
//!
//! Entries are produced lazily, one per child node, and are addressed purely
//! by index: nothing is remembered between calls, so a reader may resume or
//! restart at any index.

use serde::Serialize;

use etcdfs_core::{Node, Qid};

/// Directory bit of an entry's mode.
pub const DMDIR: u32 = 0x8000_0000;

/// Permission bits of every entry. No access control is emulated.
pub const DEFAULT_PERM: u32 = 0o777;

/// Owner and group of every entry.
pub const OWNER: &str = "etcd";

/// Metadata of one file or directory, as reported by stat and directory reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub qid: Qid,
    pub mode: u32,
    pub length: u64,
    pub uid: String,
    pub gid: String,
}

impl DirEntry {
    /// Build the entry for `node`, whose identity is computed from `path`.
    pub fn new(name: impl Into<String>, path: &str, node: &Node) -> Self {
        let qid = Qid::new(path, Some(node));
        let mode = if qid.is_dir() {
            DEFAULT_PERM | DMDIR
        } else {
            DEFAULT_PERM
        };

        DirEntry {
            name: name.into(),
            qid,
            mode,
            length: node.len(),
            uid: OWNER.to_string(),
            gid: OWNER.to_string(),
        }
    }

    /// The entry for a child node, named by the last segment of its key.
    pub fn for_child(child: &Node) -> Self {
        Self::new(child.name(), &child.key, child)
    }

    pub fn is_dir(&self) -> bool {
        self.mode & DMDIR != 0
    }
}

/// The entry for `node.children[index]`, or `None` once `index` reaches the
/// child count.
pub fn dir_entry(node: &Node, index: usize) -> Option<DirEntry> {
    node.children().get(index).map(DirEntry::for_child)
}

/// Iterator over a directory node's entries, starting at any index.
#[derive(Debug, Clone)]
pub struct DirEntries<'a> {
    node: &'a Node,
    index: usize,
}

impl<'a> DirEntries<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self::starting_at(node, 0)
    }

    pub fn starting_at(node: &'a Node, index: usize) -> Self {
        DirEntries { node, index }
    }
}

impl Iterator for DirEntries<'_> {
    type Item = DirEntry;

    fn next(&mut self) -> Option<DirEntry> {
        let entry = dir_entry(self.node, self.index)?;
        self.index += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.node.children().len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DirEntries<'_> {}
