use etcdfs_core::ParseError;

/// Transport-level errors: building, sending, or reading an HTTP exchange.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Used by non-network executors to report a failed exchange.
    #[error("Transport failure: {message}")]
    Transport { message: String },
}

/// Why a store operation failed.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The endpoint could not be reached or the exchange could not complete.
    #[error("store unreachable: {0}")]
    Unreachable(#[source] Error),

    /// The store answered with an error envelope; `message` is forwarded as is.
    #[error("{message}")]
    Remote { message: String },

    /// The response was not a well-formed success or error envelope.
    #[error("store protocol error: {message}")]
    Protocol { message: String },

    /// The envelope's node could not be decoded.
    #[error("node parse error: {0}")]
    Parse(#[from] ParseError),
}

impl StoreError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        StoreError::Protocol {
            message: message.into(),
        }
    }

    /// The remote error message, if the store sent one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            StoreError::Remote { message } => Some(message),
            _ => None,
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        StoreError::Unreachable(error)
    }
}
