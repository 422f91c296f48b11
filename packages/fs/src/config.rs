//! Process configuration, built once at startup and never mutated.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_SERVICE: &str = "etcd";
pub const DEFAULT_MOUNT_POINT: &str = "/n/etcd";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing endpoint")]
    MissingEndpoint,

    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

/// Immutable configuration shared by every component that talks to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the store, e.g. `http://127.0.0.1:4001`.
    pub endpoint: Url,
    /// Service name the file server posts itself under. Read by the
    /// protocol server that serves the callbacks, not by the bridge.
    pub service: String,
    /// Where the protocol server mounts the tree. Not used by the bridge.
    pub mount_point: PathBuf,
    /// Verbose protocol and store tracing; selects the `debug` log level.
    pub debug: bool,
    /// Per-request transport timeout. The bridge has no watchdog of its own.
    pub timeout: Duration,
}

impl Config {
    /// Create a configuration for `endpoint` with defaults for everything else.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let url = Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;

        Ok(Self {
            endpoint: url,
            service: DEFAULT_SERVICE.to_string(),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            debug: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_mount_point(mut self, mount_point: impl Into<PathBuf>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
