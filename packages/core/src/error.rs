//! Error types for decoding node trees.

/// Why a node (or one of its descendants) could not be decoded.
///
/// No partially built tree is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The bytes were not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("node is not a JSON object")]
    NotAnObject,

    #[error("node is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("node field '{field}' has the wrong type (expected {expected})")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("node tree is nested deeper than {max} levels")]
    TooDeep { max: usize },

    /// A child failed to decode.
    #[error("child {index}: {source}")]
    Child {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn in_child(self, index: usize) -> Self {
        ParseError::Child {
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, with child wrappers removed.
    pub fn root_cause(&self) -> &ParseError {
        let mut err = self;
        while let ParseError::Child { source, .. } = err {
            err = source.as_ref();
        }
        err
    }

    /// Child indices leading from the top-level node to the failing node.
    pub fn child_path(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut err = self;
        while let ParseError::Child { index, source } = err {
            indices.push(*index);
            err = source.as_ref();
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_display_includes_index() {
        let err = ParseError::MissingField { field: "key" }
            .in_child(2)
            .in_child(0);
        let display = format!("{}", err);
        assert!(display.contains("child 0"));
        assert!(display.contains("child 2"));
        assert!(display.contains("'key'"));
    }

    #[test]
    fn root_cause_unwraps_children() {
        let err = ParseError::NotAnObject.in_child(4);
        assert_eq!(err.root_cause(), &ParseError::NotAnObject);
        assert_eq!(err.child_path(), vec![4]);
        assert!(ParseError::NotAnObject.child_path().is_empty());
    }
}
