use etcdfs_core::Qid;
use etcdfs_http::CreateKind;

use crate::bridge::ReadReply;
use crate::dirent::DirEntry;
use crate::error::FsError;

/// Protocol-level file identifier.
pub type Fid = u32;

/// The callback surface a file-protocol server dispatches onto.
///
/// One implementation instance serves one connection: fids are scoped to
/// it, and it is driven by one request at a time.
pub trait FileServer {
    /// Bind `fid` to the root.
    fn attach(&mut self, fid: Fid, aname: &str) -> Result<Qid, FsError>;

    /// Walk `names` from `fid`, binding the result to `newfid`.
    ///
    /// With no names this is a plain clone. Walking a fid onto itself does
    /// not clone, so it costs one request per name. If the first name fails the
    /// error is returned; if a later one fails, the qids walked so far are
    /// returned and `newfid` is left unbound. `fid` is never changed unless
    /// it equals `newfid` and the whole walk succeeds.
    fn walk(&mut self, fid: Fid, newfid: Fid, names: &[&str]) -> Result<Vec<Qid>, FsError>;

    fn open(&mut self, fid: Fid) -> Result<Qid, FsError>;

    fn read(&mut self, fid: Fid, offset: u64, count: u32) -> Result<ReadReply, FsError>;

    /// Returns the number of bytes accepted.
    fn write(&mut self, fid: Fid, data: &[u8]) -> Result<u32, FsError>;

    /// Create `name` in the directory `fid` denotes; `fid` then denotes it.
    fn create(&mut self, fid: Fid, name: &str, kind: CreateKind) -> Result<Qid, FsError>;

    /// Delete the node `fid` denotes. `fid` is released either way.
    fn remove(&mut self, fid: Fid) -> Result<(), FsError>;

    fn stat(&mut self, fid: Fid) -> Result<DirEntry, FsError>;

    /// Release `fid`.
    fn clunk(&mut self, fid: Fid) -> Result<(), FsError>;
}
