//! One-shot file operations driven through a [`FileServer`].
//!
//! Commands:
//! - `ls [path]` - List a directory, one entry per line (`/` marks directories)
//! - `cat <path>` - Print a file's value
//! - `write <path> <value>` - Replace a file's value
//! - `stat <path>` - Print a file's metadata as JSON
//! - `touch <path>` - Create an empty file
//! - `mkdir <path>` - Create a directory
//! - `rm <path>` - Remove a file or empty directory
//!
//! Every command attaches, walks to its target, does its work and clunks
//! whatever it bound, the same sequence a mounted client would send.

use std::io::Write;

use clap::Subcommand;

use etcdfs_core::{KeyPath, PathError};
use etcdfs_fs::{CreateKind, Fid, FileServer, FsError, ReadReply};

const ROOT_FID: Fid = 0;
const WORK_FID: Fid = 1;

/// Bytes or entries requested per read.
const READ_CHUNK: u32 = 8192;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("bad path: {0}")]
    Path(#[from] PathError),

    #[error("{path}: file does not exist")]
    NotFound { path: String },

    #[error("{path}: is a directory")]
    IsDirectory { path: String },

    #[error("cannot create the root")]
    CreateRoot,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print a file's value
    Cat { path: String },
    /// Replace a file's value
    Write { path: String, value: String },
    /// Print a file's metadata as JSON
    Stat { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Create a directory
    Mkdir { path: String },
    /// Remove a file or empty directory
    Rm { path: String },
}

/// Run `command` against `server`, writing any output to `out`.
///
/// Every fid bound along the way is clunked before returning, whether or
/// not the command succeeded.
pub fn execute<S, W>(server: &mut S, command: &Command, out: &mut W) -> Result<(), CommandError>
where
    S: FileServer,
    W: Write,
{
    server.attach(ROOT_FID, "")?;
    let result = dispatch(server, command, out);

    for fid in [WORK_FID, ROOT_FID] {
        if let Err(e) = server.clunk(fid) {
            log::trace!("clunk {}: {}", fid, e);
        }
    }

    result
}

fn dispatch<S, W>(server: &mut S, command: &Command, out: &mut W) -> Result<(), CommandError>
where
    S: FileServer,
    W: Write,
{
    match command {
        Command::Ls { path } => {
            let path = walk_to(server, path)?;
            list(server, &path, out)
        }
        Command::Cat { path } => {
            let path = walk_to(server, path)?;
            cat(server, &path, out)
        }
        Command::Write { path, value } => {
            walk_to(server, path)?;
            server.open(WORK_FID)?;
            server.write(WORK_FID, value.as_bytes())?;
            Ok(())
        }
        Command::Stat { path } => {
            walk_to(server, path)?;
            let entry = server.stat(WORK_FID)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&entry)?)?;
            Ok(())
        }
        Command::Touch { path } => create(server, path, CreateKind::File),
        Command::Mkdir { path } => create(server, path, CreateKind::Dir),
        Command::Rm { path } => {
            walk_to(server, path)?;
            server.remove(WORK_FID)?;
            Ok(())
        }
    }
}

/// Bind `WORK_FID` to `path`.
fn walk_to<S: FileServer>(server: &mut S, path: &str) -> Result<KeyPath, CommandError> {
    let path = KeyPath::parse(path)?;
    let names: Vec<&str> = path.components().collect();

    let qids = server.walk(ROOT_FID, WORK_FID, &names)?;
    if qids.len() < names.len() {
        return Err(CommandError::NotFound {
            path: path.to_string(),
        });
    }
    Ok(path)
}

fn list<S, W>(server: &mut S, path: &KeyPath, out: &mut W) -> Result<(), CommandError>
where
    S: FileServer,
    W: Write,
{
    server.open(WORK_FID)?;

    let mut offset = 0u64;
    loop {
        match server.read(WORK_FID, offset, READ_CHUNK)? {
            ReadReply::Entries(entries) => {
                if entries.is_empty() {
                    return Ok(());
                }
                offset += entries.len() as u64;
                for entry in entries {
                    let marker = if entry.is_dir() { "/" } else { "" };
                    writeln!(out, "{}{}", entry.name, marker)?;
                }
            }
            ReadReply::Data(_) => {
                writeln!(out, "{}", path.name())?;
                return Ok(());
            }
        }
    }
}

fn cat<S, W>(server: &mut S, path: &KeyPath, out: &mut W) -> Result<(), CommandError>
where
    S: FileServer,
    W: Write,
{
    server.open(WORK_FID)?;

    let mut offset = 0u64;
    loop {
        match server.read(WORK_FID, offset, READ_CHUNK)? {
            ReadReply::Data(bytes) => {
                if bytes.is_empty() {
                    return Ok(());
                }
                offset += bytes.len() as u64;
                out.write_all(&bytes)?;
            }
            ReadReply::Entries(_) => {
                return Err(CommandError::IsDirectory {
                    path: path.to_string(),
                })
            }
        }
    }
}

fn create<S: FileServer>(server: &mut S, path: &str, kind: CreateKind) -> Result<(), CommandError> {
    let path = KeyPath::parse(path)?;
    if path.is_root() {
        return Err(CommandError::CreateRoot);
    }

    walk_to(server, path.parent().as_str())?;
    server.create(WORK_FID, path.name(), kind)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use etcdfs_fs::{Config, EtcdFs, HandleTable};
    use etcdfs_http::mock::MemoryStore;

    fn run(store: &MemoryStore, command: Command) -> Result<String, CommandError> {
        let config = Config::new("http://store:4001").unwrap();
        let fs = EtcdFs::with_executor(config, Arc::new(store.clone())).unwrap();
        let mut table = HandleTable::new(fs);

        let mut out = Vec::new();
        let result = execute(&mut table, &command, &mut out);
        assert!(table.is_empty(), "fids left bound after {:?}", command);
        result.map(|_| String::from_utf8(out).unwrap())
    }

    fn path(p: &str) -> String {
        p.to_string()
    }

    #[test]
    fn ls_root() {
        let store = MemoryStore::new().with_value("/foo", "bar").with_dir("/etc");
        let out = run(&store, Command::Ls { path: path("/") }).unwrap();
        assert_eq!(out, "etc/\nfoo\n");
    }

    #[test]
    fn ls_file_prints_its_name() {
        let store = MemoryStore::new().with_value("/a/b", "1");
        let out = run(&store, Command::Ls { path: path("/a/b") }).unwrap();
        assert_eq!(out, "b\n");
    }

    #[test]
    fn cat_prints_value() {
        let store = MemoryStore::new().with_value("/a/b", "hello");
        let out = run(&store, Command::Cat { path: path("/a/b") }).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn cat_directory_fails() {
        let store = MemoryStore::new().with_dir("/a");
        let err = run(&store, Command::Cat { path: path("/a") }).unwrap_err();
        assert_eq!(err.to_string(), "/a: is a directory");
    }

    #[test]
    fn cat_missing() {
        let store = MemoryStore::new().with_dir("/a");
        let err = run(&store, Command::Cat { path: path("/a/nope") }).unwrap_err();
        assert_eq!(err.to_string(), "/a/nope: file does not exist");

        let err = run(&store, Command::Cat { path: path("/nope") }).unwrap_err();
        assert_eq!(err.to_string(), "file does not exist");
    }

    #[test]
    fn write_sets_value() {
        let store = MemoryStore::new().with_value("/k", "old");
        run(
            &store,
            Command::Write {
                path: path("/k"),
                value: "new".to_string(),
            },
        )
        .unwrap();
        assert_eq!(store.value("/k").as_deref(), Some("new"));
    }

    #[test]
    fn stat_prints_json() {
        let store = MemoryStore::new().with_value("/k", "abc");
        let out = run(&store, Command::Stat { path: path("/k") }).unwrap();
        let stat: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(stat["name"], "k");
        assert_eq!(stat["length"], 3);
        assert_eq!(stat["uid"], "etcd");
    }

    #[test]
    fn touch_mkdir_rm() {
        let store = MemoryStore::new();

        run(&store, Command::Mkdir { path: path("/d") }).unwrap();
        run(&store, Command::Touch { path: path("/d/f") }).unwrap();
        assert!(store.contains("/d"));
        assert_eq!(store.value("/d/f").as_deref(), Some(""));

        let err = run(&store, Command::Touch { path: path("/d/f") }).unwrap_err();
        assert_eq!(err.to_string(), "create failed: Key already exists");

        run(&store, Command::Rm { path: path("/d/f") }).unwrap();
        run(&store, Command::Rm { path: path("/d") }).unwrap();
        assert!(!store.contains("/d"));
    }

    #[test]
    fn create_root_rejected() {
        let store = MemoryStore::new();
        let err = run(&store, Command::Mkdir { path: path("/") }).unwrap_err();
        assert!(matches!(err, CommandError::CreateRoot));
    }

    #[test]
    fn relative_path_rejected() {
        let store = MemoryStore::new();
        let err = run(&store, Command::Cat { path: path("k") }).unwrap_err();
        assert!(matches!(err, CommandError::Path(_)));
    }

    #[test]
    fn unreachable_store() {
        let store = MemoryStore::new();
        store.set_unreachable(true);
        let err = run(&store, Command::Ls { path: path("/") }).unwrap_err();
        assert_eq!(err.to_string(), "attach failed");
    }
}
