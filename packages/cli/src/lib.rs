//! # etcdfs-cli
//!
//! Command-line access to an etcd keyspace through the file tree the
//! bridge presents.
//!
//! ## Usage
//!
//! ```bash
//! etcdfs -e http://127.0.0.1:4001 ls /
//! etcdfs -e http://127.0.0.1:4001 write /foo bar
//! etcdfs -e http://127.0.0.1:4001 cat /foo
//! etcdfs -e http://127.0.0.1:4001 -D stat /foo
//! ```

pub mod commands;

use std::time::Duration;

use clap::Parser;

use etcdfs_fs::{
    Config, ConfigError, EtcdFs, FsError, HandleTable, DEFAULT_MOUNT_POINT, DEFAULT_SERVICE,
};

use crate::commands::{Command, CommandError};

/// etcdfs - the etcd keyspace as a file tree
#[derive(Parser, Debug)]
#[command(name = "etcdfs")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Store endpoint, e.g. http://127.0.0.1:4001
    #[arg(short = 'e', long)]
    pub endpoint: String,

    /// Service name to post the file server under
    #[arg(short = 's', long, default_value = DEFAULT_SERVICE)]
    pub service: String,

    /// Mount point for the file tree
    #[arg(short = 'm', long = "mount-point", default_value = DEFAULT_MOUNT_POINT)]
    pub mount_point: String,

    /// Trace every operation and store request
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl Args {
    pub fn config(&self) -> Result<Config, ConfigError> {
        Ok(Config::new(&self.endpoint)?
            .with_service(self.service.clone())
            .with_mount_point(self.mount_point.clone())
            .with_debug(self.debug)
            .with_timeout(Duration::from_secs(self.timeout)))
    }
}

/// Logger for the process: `RUST_LOG` with a default of `warn`, forced to
/// `debug` when the configuration asks for tracing.
pub fn logger(config: &Config) -> env_logger::Builder {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if config.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
}

/// Run one command against the store, printing to stdout.
pub fn run(config: Config, command: &Command) -> Result<(), Error> {
    let fs = EtcdFs::new(config)?;
    let config = fs.config();
    log::debug!(
        "{} service {} mount point {}",
        config.endpoint,
        config.service,
        config.mount_point.display()
    );

    let mut table = HandleTable::new(fs);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(&mut table, command, &mut out)?;
    Ok(())
}
