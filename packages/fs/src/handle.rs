use etcdfs_core::{KeyPath, Node, Qid};

use crate::dirent::DirEntry;

/// Per-reference state: the path a protocol reference denotes and the node
/// last fetched for it.
///
/// A handle owns its node outright. Handles are not `Clone`; duplicating a
/// reference goes through [`EtcdFs::clone_handle`](crate::EtcdFs::clone_handle),
/// which fetches a fresh node.
#[derive(Debug, PartialEq, Eq)]
pub struct Handle {
    pub(crate) path: KeyPath,
    pub(crate) node: Node,
}

impl Handle {
    pub(crate) fn new(path: KeyPath, node: Node) -> Self {
        Handle { path, node }
    }

    /// A local copy for working on without touching `self`.
    ///
    /// Unlike a protocol clone this does not refetch, so the copy carries
    /// the same cached node.
    pub(crate) fn scratch(&self) -> Handle {
        Handle::new(self.path.clone(), self.node.clone())
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// The cached node. May be stale relative to the store.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Identity of the cached node.
    pub fn qid(&self) -> Qid {
        Qid::new(self.path.as_str(), Some(&self.node))
    }

    /// Whether the handle denotes a directory. The root always does.
    pub fn is_dir(&self) -> bool {
        self.qid().is_dir()
    }

    /// Stat from the cached node, without contacting the store.
    pub fn stat(&self) -> DirEntry {
        DirEntry::new(self.path.name(), self.path.as_str(), &self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirent::DMDIR;

    #[test]
    fn root_stat_is_a_directory_named_slash() {
        // The store may leave `dir` off its root; the root is still a directory.
        let handle = Handle::new(KeyPath::root(), Node::default());
        let stat = handle.stat();
        assert_eq!(stat.name, "/");
        assert!(stat.is_dir());
        assert_eq!(stat.mode & DMDIR, DMDIR);
        assert!(handle.is_dir());
    }

    #[test]
    fn scratch_copy_is_independent() {
        let handle = Handle::new(KeyPath::root(), Node::default());
        let mut copy = handle.scratch();
        assert_eq!(copy, handle);

        copy.path = KeyPath::parse("/elsewhere").unwrap();
        assert!(handle.path().is_root());
    }

    #[test]
    fn leaf_stat_uses_last_segment() {
        let node = Node {
            key: "/a/b".to_string(),
            value: Some("four".to_string()),
            modified_index: 6,
            ..Default::default()
        };
        let handle = Handle::new(KeyPath::parse("/a/b").unwrap(), node);
        let stat = handle.stat();
        assert_eq!(stat.name, "b");
        assert_eq!(stat.length, 4);
        assert!(!stat.is_dir());
        assert_eq!(stat.qid.version, 6);
        assert_eq!(handle.qid(), stat.qid);
    }
}
