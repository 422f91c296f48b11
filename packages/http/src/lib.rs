//! # etcdfs-http
//!
//! Blocking HTTP access to an etcd v2 keys API.
//!
//! [`EtcdClient`] turns a [`KeyPath`](etcdfs_core::KeyPath) into exactly one
//! request against `<endpoint>/v2/keys<path>` and decodes the response
//! envelope into a [`Node`](etcdfs_core::Node) tree or a [`StoreError`]:
//!
//! ```ignore
//! use etcdfs_http::EtcdClient;
//! use etcdfs_core::KeyPath;
//!
//! let client = EtcdClient::new("http://127.0.0.1:4001", Duration::from_secs(30))?;
//!
//! // GET /v2/keys/foo
//! let node = client.get(&KeyPath::parse("/foo")?)?;
//!
//! // PUT /v2/keys/foo with body value=baz
//! let node = client.put(&KeyPath::parse("/foo")?, b"baz")?;
//! ```
//!
//! Requests go through the [`HttpExecutor`] trait. The `test-utils` feature
//! adds [`mock::MemoryStore`], an in-memory executor that behaves like a
//! store server.

pub mod client;
pub mod error;
pub mod executor;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::{decode_envelope, CreateKind, EtcdClient, KEYS_PREFIX};
pub use error::{Error, StoreError};
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use types::{HttpRequest, HttpResponse, Method, FORM_CONTENT_TYPE};
