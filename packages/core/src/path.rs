//! Absolute key paths into the remote store's keyspace.

use std::fmt;

/// Errors related to key path parsing and extension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path string does not start with `/`.
    #[error("key path '{path}' is not absolute")]
    NotAbsolute { path: String },

    /// A single component cannot be appended to a path.
    #[error("invalid path component '{component}': {message}")]
    InvalidComponent { component: String, message: String },
}

/// An absolute, normalized key path.
///
/// A `KeyPath` always starts with `/`. The root is exactly `/`; every other
/// path has no trailing slash and no empty components.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyPath {
    inner: String,
}

impl KeyPath {
    /// The root path, `/`.
    pub fn root() -> Self {
        KeyPath {
            inner: "/".to_string(),
        }
    }

    /// Parse an absolute path string.
    ///
    /// Duplicate and trailing slashes are normalized away.
    ///
    /// ```rust
    /// use etcdfs_core::KeyPath;
    ///
    /// let path = KeyPath::parse("/a//b/").unwrap();
    /// assert_eq!(path.as_str(), "/a/b");
    /// assert!(KeyPath::parse("a/b").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if !s.starts_with('/') {
            return Err(PathError::NotAbsolute {
                path: s.to_string(),
            });
        }

        let mut path = Self::root();
        for component in s.split('/').filter(|c| !c.is_empty()) {
            path = path.join(component)?;
        }
        Ok(path)
    }

    /// Append a single component.
    ///
    /// The root is extended without a duplicate separator. `.` and `..` are
    /// rejected here; use [`KeyPath::parent`] to move up.
    pub fn join(&self, component: &str) -> Result<Self, PathError> {
        Self::validate_component(component)?;

        let inner = if self.is_root() {
            format!("/{}", component)
        } else {
            format!("{}/{}", self.inner, component)
        };
        Ok(KeyPath { inner })
    }

    /// The parent directory. The parent of the root is the root.
    pub fn parent(&self) -> Self {
        match self.inner.rfind('/') {
            Some(0) | None => Self::root(),
            Some(idx) => KeyPath {
                inner: self.inner[..idx].to_string(),
            },
        }
    }

    /// The last path segment, or `/` for the root.
    pub fn name(&self) -> &str {
        if self.is_root() {
            return "/";
        }
        last_segment(&self.inner)
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Iterate over the components, root first. The root has none.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|c| !c.is_empty())
    }

    fn validate_component(component: &str) -> Result<(), PathError> {
        let message = if component.is_empty() {
            "empty component"
        } else if component.contains('/') {
            "component contains '/'"
        } else if component == "." || component == ".." {
            "relative components are not allowed"
        } else {
            return Ok(());
        };

        Err(PathError::InvalidComponent {
            component: component.to_string(),
            message: message.to_string(),
        })
    }
}

impl Default for KeyPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

/// The text after the last `/` of a key, or the whole key if it has none.
pub fn last_segment(key: &str) -> &str {
    match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}
