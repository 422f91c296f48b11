//! Fid-keyed handle table.

use std::collections::HashMap;

use etcdfs_core::Qid;
use etcdfs_http::CreateKind;

use crate::bridge::{EtcdFs, ReadReply};
use crate::dirent::DirEntry;
use crate::error::FsError;
use crate::handle::Handle;
use crate::server::{Fid, FileServer};

/// The handles of one connection, keyed by fid.
///
/// Each fid owns exactly one [`Handle`]; handles are never shared between
/// fids.
#[derive(Debug)]
pub struct HandleTable {
    fs: EtcdFs,
    handles: HashMap<Fid, Handle>,
}

impl HandleTable {
    pub fn new(fs: EtcdFs) -> Self {
        Self {
            fs,
            handles: HashMap::new(),
        }
    }

    /// The handle bound to `fid`, if any.
    pub fn get(&self, fid: Fid) -> Option<&Handle> {
        self.handles.get(&fid)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn handle(&self, fid: Fid) -> Result<&Handle, FsError> {
        self.handles.get(&fid).ok_or(FsError::UnknownFid(fid))
    }

    fn ensure_unused(&self, fid: Fid) -> Result<(), FsError> {
        if self.handles.contains_key(&fid) {
            return Err(FsError::FidInUse(fid));
        }
        Ok(())
    }
}

impl FileServer for HandleTable {
    fn attach(&mut self, fid: Fid, aname: &str) -> Result<Qid, FsError> {
        self.ensure_unused(fid)?;

        let handle = self.fs.attach(aname)?;
        let qid = handle.qid();
        self.handles.insert(fid, handle);
        Ok(qid)
    }

    fn walk(&mut self, fid: Fid, newfid: Fid, names: &[&str]) -> Result<Vec<Qid>, FsError> {
        if newfid != fid {
            self.ensure_unused(newfid)?;
        }

        // Walk a duplicate so a failed walk leaves `fid` untouched. Walking
        // in place needs no fresh fetch, only a local copy to work on.
        let source = self.handle(fid)?;
        let mut walked = if newfid == fid {
            source.scratch()
        } else {
            self.fs.clone_handle(source)?
        };
        let mut qids = Vec::with_capacity(names.len());
        for name in names {
            match self.fs.walk1(&mut walked, name) {
                Ok(qid) => qids.push(qid),
                Err(e) if qids.is_empty() => return Err(e),
                Err(_) => return Ok(qids),
            }
        }

        // Replacing `fid` drops its previous handle.
        self.handles.insert(newfid, walked);
        Ok(qids)
    }

    fn open(&mut self, fid: Fid) -> Result<Qid, FsError> {
        Ok(self.fs.open(self.handle(fid)?))
    }

    fn read(&mut self, fid: Fid, offset: u64, count: u32) -> Result<ReadReply, FsError> {
        let handle = self.handles.get_mut(&fid).ok_or(FsError::UnknownFid(fid))?;
        self.fs.read(handle, offset, count)
    }

    fn write(&mut self, fid: Fid, data: &[u8]) -> Result<u32, FsError> {
        let handle = self.handles.get_mut(&fid).ok_or(FsError::UnknownFid(fid))?;
        self.fs.write(handle, data)
    }

    fn create(&mut self, fid: Fid, name: &str, kind: CreateKind) -> Result<Qid, FsError> {
        let handle = self.handles.get_mut(&fid).ok_or(FsError::UnknownFid(fid))?;
        self.fs.create(handle, name, kind)
    }

    fn remove(&mut self, fid: Fid) -> Result<(), FsError> {
        let handle = self.handles.remove(&fid).ok_or(FsError::UnknownFid(fid))?;
        self.fs.remove(handle)
    }

    fn stat(&mut self, fid: Fid) -> Result<DirEntry, FsError> {
        Ok(self.fs.stat(self.handle(fid)?))
    }

    fn clunk(&mut self, fid: Fid) -> Result<(), FsError> {
        let handle = self.handles.remove(&fid).ok_or(FsError::UnknownFid(fid))?;
        self.fs.destroy(handle);
        Ok(())
    }
}
