//! # etcdfs-fs
//!
//! Presents an etcd keyspace as a file tree to a handle-based file protocol.
//!
//! Keys become files, directories of keys become directories, and writing a
//! file sets the key's value. The store is never cached between operations:
//! attach, clone, walk, read and write each fetch or mutate with exactly one
//! request, and each [`Handle`] keeps only the path it denotes and the node
//! it last saw.
//!
//! - [`EtcdFs`]: the operation callbacks over a single [`Handle`]
//! - [`HandleTable`]: a connection's fids, implementing [`FileServer`]
//! - [`DirEntries`]: index-addressed directory enumeration
//!
//! # Example
//!
//! ```ignore
//! use etcdfs_fs::{Config, EtcdFs, FileServer, HandleTable, ReadReply};
//!
//! let fs = EtcdFs::new(Config::new("http://127.0.0.1:4001")?)?;
//! let mut table = HandleTable::new(fs);
//!
//! table.attach(0, "")?;
//! table.walk(0, 1, &["foo"])?;
//! if let ReadReply::Data(bytes) = table.read(1, 0, 8192)? {
//!     println!("{}", String::from_utf8_lossy(&bytes));
//! }
//! table.clunk(1)?;
//! ```

mod bridge;
mod config;
mod dirent;
mod error;
mod handle;
mod server;
mod table;

pub use bridge::{EtcdFs, ReadReply};
pub use config::{Config, ConfigError, DEFAULT_MOUNT_POINT, DEFAULT_SERVICE, DEFAULT_TIMEOUT};
pub use dirent::{dir_entry, DirEntries, DirEntry, DEFAULT_PERM, DMDIR, OWNER};
pub use error::FsError;
pub use handle::Handle;
pub use server::{Fid, FileServer};
pub use table::HandleTable;

pub use etcdfs_core::{KeyPath, Node, Qid, QidKind};
pub use etcdfs_http::CreateKind;
