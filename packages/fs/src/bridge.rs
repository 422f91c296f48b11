//! File-protocol operations mapped onto store requests.
//!
//! Every operation that needs store data fetches it fresh, with exactly one
//! request, and applies its effect to the handle only once that request has
//! succeeded. The one exception is [`EtcdFs::stat`], which answers from the
//! handle's cached node.

use std::sync::Arc;

use etcdfs_core::{KeyPath, Qid};
use etcdfs_http::{CreateKind, EtcdClient, HttpExecutor};

use crate::config::Config;
use crate::dirent::{DirEntries, DirEntry};
use crate::error::FsError;
use crate::handle::Handle;

/// Result of reading a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadReply {
    /// Bytes of a leaf value.
    Data(Vec<u8>),
    /// Entries of a directory.
    Entries(Vec<DirEntry>),
}

/// The bridge: the operation callbacks over one store endpoint.
///
/// `EtcdFs` holds no per-reference state and is cheap to clone, so one
/// instance can serve any number of concurrent connections.
#[derive(Debug, Clone)]
pub struct EtcdFs {
    client: EtcdClient,
    config: Arc<Config>,
}

impl EtcdFs {
    /// Create a bridge that talks to `config.endpoint` over HTTP.
    pub fn new(config: Config) -> Result<Self, FsError> {
        let client = EtcdClient::new(config.endpoint.as_str(), config.timeout)?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create a bridge with a custom HTTP executor.
    pub fn with_executor(config: Config, executor: Arc<dyn HttpExecutor>) -> Result<Self, FsError> {
        let client = EtcdClient::with_executor(executor, config.endpoint.as_str())?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the root handle.
    ///
    /// Only the default (empty) attach specifier is accepted.
    pub fn attach(&self, aname: &str) -> Result<Handle, FsError> {
        if !aname.is_empty() {
            return Err(FsError::InvalidAttachSpecifier);
        }

        let path = KeyPath::root();
        let node = self.client.get(&path).map_err(|e| {
            log::debug!("attach: {}", e);
            FsError::AttachFailed(e)
        })?;

        Ok(Handle::new(path, node))
    }

    /// Duplicate a handle by fetching its path again.
    ///
    /// The new handle may see a newer version than `source` if the node
    /// changed in the meantime; `source` is not refreshed.
    pub fn clone_handle(&self, source: &Handle) -> Result<Handle, FsError> {
        log::debug!("clone {}", source.path);

        let node = self.client.get(&source.path).map_err(|e| {
            log::debug!("clone {}: {}", source.path, e);
            FsError::CloneFailed(e)
        })?;

        Ok(Handle::new(source.path.clone(), node))
    }

    /// Move `handle` one component: to its parent for `..`, otherwise to the
    /// named child.
    ///
    /// On failure the handle is left exactly as it was.
    pub fn walk1(&self, handle: &mut Handle, name: &str) -> Result<Qid, FsError> {
        let candidate = if name == ".." {
            handle.path.parent()
        } else {
            handle.path.join(name).map_err(|e| {
                log::debug!("walk1 {} {}: {}", handle.path, name, e);
                FsError::NotFound {
                    path: format!("{}/{}", handle.path, name),
                }
            })?
        };

        log::debug!("walk1 {} {} -> {}", handle.path, name, candidate);

        let node = self.client.get(&candidate).map_err(|e| {
            log::debug!("walk1 {}: {}", candidate, e);
            FsError::NotFound {
                path: candidate.to_string(),
            }
        })?;

        handle.path = candidate;
        handle.node = node;
        Ok(handle.qid())
    }

    /// Open a handle. No mode or permission checks are made.
    pub fn open(&self, handle: &Handle) -> Qid {
        handle.qid()
    }

    /// Read the handle's current contents, fetched fresh.
    ///
    /// For a leaf, `offset` and `count` select a byte range of the value.
    /// For a directory they select entries: `offset` is the index of the
    /// first entry and `count` the most entries returned. The fresh node
    /// replaces the handle's cached one.
    pub fn read(&self, handle: &mut Handle, offset: u64, count: u32) -> Result<ReadReply, FsError> {
        let fresh = self.client.get(&handle.path).map_err(|e| {
            log::debug!("read {}: {}", handle.path, e);
            FsError::Read(e)
        })?;

        let reply = if fresh.is_dir() || handle.path.is_root() {
            let start = usize::try_from(offset).unwrap_or(usize::MAX);
            ReadReply::Entries(
                DirEntries::starting_at(&fresh, start)
                    .take(count as usize)
                    .collect(),
            )
        } else {
            ReadReply::Data(slice_range(fresh.value_bytes(), offset, count).to_vec())
        };

        handle.node = fresh;
        Ok(reply)
    }

    /// Replace the handle's value with `data`.
    ///
    /// Writes are whole-value: the offset a client writes at is not
    /// consulted, and the full count is always reported as accepted.
    pub fn write(&self, handle: &mut Handle, data: &[u8]) -> Result<u32, FsError> {
        log::debug!("write {} ({} bytes)", handle.path, data.len());

        let node = self.client.put(&handle.path, data).map_err(|e| {
            log::debug!("etcd post {}: {}", handle.path, e);
            FsError::PostFailed(e)
        })?;

        handle.node = node;
        Ok(u32::try_from(data.len()).unwrap_or(u32::MAX))
    }

    /// Create `name` under the handle's directory and move the handle to it.
    ///
    /// Fails without touching the handle if anything already exists there.
    pub fn create(&self, handle: &mut Handle, name: &str, kind: CreateKind) -> Result<Qid, FsError> {
        let path = handle.path.join(name)?;
        log::debug!("create {} ({:?})", path, kind);

        let node = self.client.create(&path, kind).map_err(|e| {
            log::debug!("create {}: {}", path, e);
            FsError::CreateFailed(e)
        })?;

        handle.path = path;
        handle.node = node;
        Ok(handle.qid())
    }

    /// Delete the handle's node from the store. The handle is released
    /// whether or not the delete succeeds.
    pub fn remove(&self, handle: Handle) -> Result<(), FsError> {
        if handle.path.is_root() {
            return Err(FsError::RemoveRoot);
        }

        log::debug!("remove {}", handle.path);

        self.client
            .delete(&handle.path, handle.node.is_dir())
            .map(|_| ())
            .map_err(|e| {
                log::debug!("remove {}: {}", handle.path, e);
                FsError::RemoveFailed(e)
            })
    }

    /// Stat the handle from its cached node.
    ///
    /// Unlike [`EtcdFs::read`] this does not contact the store, so it can
    /// report metadata that is stale by however long ago the handle last
    /// fetched.
    pub fn stat(&self, handle: &Handle) -> DirEntry {
        handle.stat()
    }

    /// Release a handle and everything it owns.
    pub fn destroy(&self, handle: Handle) {
        log::debug!("destroy {}", handle.path);
        drop(handle);
    }
}

fn slice_range(bytes: &[u8], offset: u64, count: u32) -> &[u8] {
    let len = bytes.len();
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
    let end = start.saturating_add(count as usize).min(len);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_range_clamps() {
        let bytes = b"hello";
        assert_eq!(slice_range(bytes, 0, 100), b"hello");
        assert_eq!(slice_range(bytes, 1, 3), b"ell");
        assert_eq!(slice_range(bytes, 5, 10), b"");
        assert_eq!(slice_range(bytes, 99, 10), b"");
        assert_eq!(slice_range(bytes, u64::MAX, u32::MAX), b"");
    }
}
