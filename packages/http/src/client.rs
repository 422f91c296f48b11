//! Client for the etcd v2 keys API.
//!
//! Every call issues exactly one request and decodes exactly one response
//! envelope. Nothing is cached and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use url::Url;

use etcdfs_core::{KeyPath, Node};

use crate::error::{Error, StoreError};
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::types::{HttpRequest, HttpResponse};

/// Path segments of the keys API, appended to the endpoint.
pub const KEYS_PREFIX: [&str; 2] = ["v2", "keys"];

/// What kind of node [`EtcdClient::create`] makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    File,
    Dir,
}

/// Blocking client for one store endpoint.
///
/// Cheap to clone; clones share the executor.
#[derive(Clone)]
pub struct EtcdClient {
    executor: Arc<dyn HttpExecutor>,
    endpoint: Url,
}

impl EtcdClient {
    /// Create a client that talks to `endpoint` over the network.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, Error> {
        let executor = ReqwestExecutor::new(timeout)?;
        Self::with_executor(Arc::new(executor), endpoint)
    }

    /// Create a client with a custom executor.
    pub fn with_executor(executor: Arc<dyn HttpExecutor>, endpoint: &str) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                message: format!("endpoint '{}' cannot carry a path", endpoint),
            });
        }
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                message: format!("unsupported endpoint scheme '{}'", endpoint.scheme()),
            });
        }

        Ok(Self { executor, endpoint })
    }

    /// Build the request URL: endpoint, then the keys prefix, then `path`.
    ///
    /// The root maps to `<endpoint>/v2/keys/`. Path segments are
    /// percent-encoded.
    pub fn key_url(&self, path: &KeyPath) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(KEYS_PREFIX);
            if path.is_root() {
                segments.push("");
            } else {
                segments.extend(path.components());
            }
        }
        url
    }

    /// Fetch the node at `path`.
    pub fn get(&self, path: &KeyPath) -> Result<Node, StoreError> {
        self.fetch_or_mutate(path, None)
    }

    /// Set the value of the leaf at `path`, returning the updated node.
    pub fn put(&self, path: &KeyPath, value: &[u8]) -> Result<Node, StoreError> {
        self.fetch_or_mutate(path, Some(value))
    }

    /// GET `path` when `write_value` is absent, otherwise PUT
    /// `value=<write_value>` to it.
    pub fn fetch_or_mutate(
        &self,
        path: &KeyPath,
        write_value: Option<&[u8]>,
    ) -> Result<Node, StoreError> {
        let url = self.key_url(path);
        let request = match write_value {
            None => HttpRequest::get(url.as_str()),
            Some(value) => HttpRequest::put(url.as_str()).with_form_body(&[("value", value)]),
        };
        self.round_trip(&request)
    }

    /// Create a new node at `path`; fails if anything already exists there.
    pub fn create(&self, path: &KeyPath, kind: CreateKind) -> Result<Node, StoreError> {
        let url = self.key_url(path);
        let first = match kind {
            CreateKind::File => ("value", b"".as_slice()),
            CreateKind::Dir => ("dir", b"true".as_slice()),
        };
        let request = HttpRequest::put(url.as_str())
            .with_form_body(&[first, ("prevExist", b"false".as_slice())]);
        self.round_trip(&request)
    }

    /// Delete the node at `path`. Directories must be empty.
    pub fn delete(&self, path: &KeyPath, dir: bool) -> Result<Node, StoreError> {
        let mut url = self.key_url(path);
        if dir {
            url.query_pairs_mut().append_pair("dir", "true");
        }
        self.round_trip(&HttpRequest::delete(url.as_str()))
    }

    fn round_trip(&self, request: &HttpRequest) -> Result<Node, StoreError> {
        log::debug!("etcd {} {}", request.method, request.url);

        let response = self.executor.execute(request)?;

        log::debug!(
            "etcd -> {} ({} bytes)",
            response.status,
            response.body.len()
        );

        decode_envelope(&response)
    }
}

impl std::fmt::Debug for EtcdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtcdClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Interpret a response body as a store envelope.
///
/// An object with `message` is a remote error; otherwise `node` must be
/// present and is decoded into a tree. The HTTP status is not consulted.
pub fn decode_envelope(response: &HttpResponse) -> Result<Node, StoreError> {
    let envelope: JsonValue = serde_json::from_slice(&response.body)
        .map_err(|e| StoreError::protocol(format!("invalid JSON response: {}", e)))?;

    let object = envelope
        .as_object()
        .ok_or_else(|| StoreError::protocol("response is not a JSON object"))?;

    if let Some(message) = object.get("message") {
        let message = match message {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(StoreError::Remote { message });
    }

    let node = object
        .get("node")
        .ok_or_else(|| StoreError::protocol("response has no 'node' field"))?;

    Ok(Node::from_json(node)?)
}
