//! In-memory store executor for testing.
//!
//! [`MemoryStore`] answers keys API requests the way an etcd v2 server
//! would, from a map held in memory: a global index bumped on every
//! mutation, auto-created parent directories, and error envelopes with the
//! store's error codes and messages. It also records every request so tests
//! can assert on what went over the wire.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value as JsonValue};
use url::Url;

use crate::error::Error;
use crate::executor::HttpExecutor;
use crate::types::{HttpRequest, HttpResponse, Method};

#[derive(Debug, Clone)]
struct Entry {
    value: Option<String>,
    dir: bool,
    created: u64,
    modified: u64,
}

#[derive(Default)]
struct State {
    entries: BTreeMap<String, Entry>,
    index: u64,
    requests: Vec<HttpRequest>,
    unreachable: bool,
}

/// A mock executor backed by an in-memory keyspace.
///
/// Clones share the same keyspace, so a test can keep one clone to mutate
/// the store "remotely" while the code under test holds another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a leaf value, creating parent directories as needed.
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Create a directory, creating parent directories as needed.
    pub fn with_dir(self, key: &str) -> Self {
        self.mkdir(key);
        self
    }

    /// Set a leaf value as an outside writer would.
    ///
    /// Returns the new modified index.
    ///
    /// # Panics
    ///
    /// Panics if the key or one of its parents is in the way.
    pub fn set(&self, key: &str, value: &str) -> u64 {
        let mut state = self.lock();
        match state.put_value(key, value.to_string()) {
            Ok(entry) => entry.modified,
            Err((_, body)) => panic!("MemoryStore::set({}) failed: {}", key, body),
        }
    }

    /// Create a directory as an outside writer would.
    ///
    /// # Panics
    ///
    /// Panics if a leaf is in the way.
    pub fn mkdir(&self, key: &str) -> u64 {
        let mut state = self.lock();
        match state.put_dir(key, false) {
            Ok(entry) => entry.modified,
            Err((_, body)) => panic!("MemoryStore::mkdir({}) failed: {}", key, body),
        }
    }

    /// Delete a key and everything under it, as an outside writer would.
    pub fn remove(&self, key: &str) {
        let mut state = self.lock();
        let prefix = format!("{}/", key);
        state
            .entries
            .retain(|k, _| k.as_str() != key && !k.starts_with(&prefix));
        state.index += 1;
    }

    /// Current value of a leaf.
    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).and_then(|e| e.value.clone())
    }

    /// Current modified index of a key.
    pub fn modified_index(&self, key: &str) -> Option<u64> {
        self.lock().entries.get(key).map(|e| e.modified)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Make every request fail at the transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Get all recorded requests.
    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Clear recorded requests.
    pub fn clear_recorded(&self) {
        self.lock().requests.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HttpExecutor for MemoryStore {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if state.unreachable {
            return Err(Error::Transport {
                message: "connection refused".to_string(),
            });
        }

        let url = Url::parse(&request.url)?;
        let key = match key_from_url(&url) {
            Some(key) => key,
            None => return Ok(HttpResponse::new(404, "404 page not found\n")),
        };

        let (status, body) = match request.method {
            Method::GET => state.get(&key),
            Method::PUT => state.put(&key, request.body.as_deref().unwrap_or("")),
            Method::DELETE => {
                let dir = url.query_pairs().any(|(k, v)| k == "dir" && v == "true");
                state.delete(&key, dir)
            }
        };

        Ok(HttpResponse::new(status, body.to_string()))
    }
}

/// Extract the store key from `/v2/keys/...`.
fn key_from_url(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    if segments.next()? != "v2" || segments.next()? != "keys" {
        return None;
    }

    let components: Vec<String> = segments
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();
    Some(format!("/{}", components.join("/")))
}

fn parent_of(key: &str) -> &str {
    match key.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &key[..idx],
    }
}

fn store_error(code: u64, message: &str, cause: &str, index: u64) -> JsonValue {
    json!({
        "errorCode": code,
        "message": message,
        "cause": cause,
        "index": index,
    })
}

type Failure = (u16, JsonValue);

impl State {
    fn node_json(&self, key: &str, entry: &Entry, with_children: bool) -> JsonValue {
        let mut node = Map::new();
        node.insert("key".to_string(), json!(key));
        if entry.dir {
            node.insert("dir".to_string(), json!(true));
        } else if let Some(value) = &entry.value {
            node.insert("value".to_string(), json!(value));
        }
        node.insert("modifiedIndex".to_string(), json!(entry.modified));
        node.insert("createdIndex".to_string(), json!(entry.created));

        if entry.dir && with_children {
            let children = self.children_json(key);
            if !children.is_empty() {
                node.insert("nodes".to_string(), JsonValue::Array(children));
            }
        }
        JsonValue::Object(node)
    }

    fn children_json(&self, key: &str) -> Vec<JsonValue> {
        self.entries
            .iter()
            .filter(|(child, _)| child.as_str() != key && parent_of(child) == key)
            .map(|(child, entry)| self.node_json(child, entry, false))
            .collect()
    }

    fn get(&self, key: &str) -> (u16, JsonValue) {
        if key == "/" {
            let children = self.children_json("/");
            let mut node = json!({"dir": true});
            if !children.is_empty() {
                node["nodes"] = JsonValue::Array(children);
            }
            return (200, json!({"action": "get", "node": node}));
        }

        match self.entries.get(key) {
            Some(entry) => (
                200,
                json!({"action": "get", "node": self.node_json(key, entry, true)}),
            ),
            None => (404, store_error(100, "Key not found", key, self.index)),
        }
    }

    fn put(&mut self, key: &str, body: &str) -> (u16, JsonValue) {
        let form: BTreeMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();

        if key == "/" {
            return (403, store_error(107, "Root is read only", "/", self.index));
        }

        let must_not_exist = form.get("prevExist").map(String::as_str) == Some("false");
        if must_not_exist && self.entries.contains_key(key) {
            return (412, store_error(105, "Key already exists", key, self.index));
        }

        let result = if form.get("dir").map(String::as_str) == Some("true") {
            self.put_dir(key, true)
        } else {
            let value = form.get("value").cloned().unwrap_or_default();
            self.put_value(key, value)
        };

        match result {
            Ok(entry) => {
                let status = if entry.created == entry.modified { 201 } else { 200 };
                let node = self.node_json(key, &entry, false);
                (status, json!({"action": "set", "node": node}))
            }
            Err(failure) => failure,
        }
    }

    fn delete(&mut self, key: &str, dir: bool) -> (u16, JsonValue) {
        if key == "/" {
            return (403, store_error(107, "Root is read only", "/", self.index));
        }

        let entry = match self.entries.get(key) {
            Some(entry) => entry.clone(),
            None => return (404, store_error(100, "Key not found", key, self.index)),
        };

        if entry.dir && !dir {
            return (403, store_error(102, "Not a file", key, self.index));
        }
        if entry.dir && !self.children_json(key).is_empty() {
            return (403, store_error(108, "Directory not empty", key, self.index));
        }

        self.entries.remove(key);
        self.index += 1;
        let node = json!({
            "key": key,
            "modifiedIndex": self.index,
            "createdIndex": entry.created,
        });
        (200, json!({"action": "delete", "node": node}))
    }

    fn put_value(&mut self, key: &str, value: String) -> Result<Entry, Failure> {
        if let Some(existing) = self.entries.get(key) {
            if existing.dir {
                return Err((403, store_error(102, "Not a file", key, self.index)));
            }
        }
        self.ensure_parents(key)?;

        self.index += 1;
        let created = self
            .entries
            .get(key)
            .map(|e| e.created)
            .unwrap_or(self.index);
        let entry = Entry {
            value: Some(value),
            dir: false,
            created,
            modified: self.index,
        };
        self.entries.insert(key.to_string(), entry.clone());
        Ok(entry)
    }

    fn put_dir(&mut self, key: &str, strict: bool) -> Result<Entry, Failure> {
        if let Some(existing) = self.entries.get(key) {
            if !existing.dir || strict {
                return Err((403, store_error(102, "Not a file", key, self.index)));
            }
            return Ok(existing.clone());
        }
        self.ensure_parents(key)?;

        self.index += 1;
        let entry = Entry {
            value: None,
            dir: true,
            created: self.index,
            modified: self.index,
        };
        self.entries.insert(key.to_string(), entry.clone());
        Ok(entry)
    }

    fn ensure_parents(&mut self, key: &str) -> Result<(), Failure> {
        let parent = parent_of(key);
        if parent == "/" {
            return Ok(());
        }
        match self.entries.get(parent) {
            Some(entry) if entry.dir => Ok(()),
            Some(_) => Err((400, store_error(104, "Not a directory", parent, self.index))),
            None => self.put_dir(parent, false).map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, key: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("http://store:4001/v2/keys{}", key),
            ..Default::default()
        }
    }

    fn body(response: &HttpResponse) -> JsonValue {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn get_root_lists_top_level() {
        let store = MemoryStore::new().with_value("/foo", "bar").with_value("/a/b", "c");
        let response = store.execute(&request(Method::GET, "/")).unwrap();
        let json = body(&response);
        assert_eq!(json["node"]["dir"], json!(true));
        let keys: Vec<_> = json["node"]["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["key"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["/a", "/foo"]);
    }

    #[test]
    fn get_missing_key() {
        let store = MemoryStore::new();
        let response = store.execute(&request(Method::GET, "/nope")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(body(&response)["message"], json!("Key not found"));
    }

    #[test]
    fn put_bumps_index() {
        let store = MemoryStore::new();
        let first = store.set("/k", "1");
        let second = store.set("/k", "2");
        assert!(second > first);
        assert_eq!(store.value("/k").as_deref(), Some("2"));
    }

    #[test]
    fn put_form_body() {
        let store = MemoryStore::new();
        let request = HttpRequest::put("http://store:4001/v2/keys/x")
            .with_form_body(&[("value", b"a&b".as_slice())]);
        let response = store.execute(&request).unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(store.value("/x").as_deref(), Some("a&b"));
    }

    #[test]
    fn delete_non_empty_dir_fails() {
        let store = MemoryStore::new().with_value("/d/f", "x");
        let mut request = request(Method::DELETE, "/d");
        request.url.push_str("?dir=true");
        let response = store.execute(&request).unwrap();
        assert_eq!(response.status, 403);
        assert!(store.contains("/d"));
    }

    #[test]
    fn unreachable_fails_transport() {
        let store = MemoryStore::new();
        store.set_unreachable(true);
        assert!(store.execute(&request(Method::GET, "/")).is_err());
        assert_eq!(store.recorded_requests().len(), 1);
    }
}
