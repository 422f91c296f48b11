use std::collections::HashMap;

/// Content type of form-encoded request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    GET,
    PUT,
    DELETE,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

/// A single request against the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,

    /// Fully built request URL, including any query string.
    pub url: String,

    pub headers: HashMap<String, String>,

    /// Raw request body
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a form-encoded body and the matching content type.
    ///
    /// Values are raw bytes; each is percent-encoded as a whole, so `&`, `=`
    /// and non-UTF-8 bytes survive the trip.
    pub fn with_form_body(self, pairs: &[(&str, &[u8])]) -> Self {
        let body = pairs
            .iter()
            .map(|(name, value)| {
                let name: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
                let value: String = url::form_urlencoded::byte_serialize(value).collect();
                format!("{}={}", name, value)
            })
            .collect::<Vec<_>>()
            .join("&");

        let mut request = self.with_header("Content-Type", FORM_CONTENT_TYPE);
        request.body = Some(body);
        request
    }
}

/// HTTP response from a request.
///
/// The status is kept for logging only; the store's envelope, not the
/// status, decides success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_encodes_value() {
        let request = HttpRequest::put("http://store/v2/keys/foo").with_form_body(&[("value", b"baz".as_slice())]);
        assert_eq!(request.body.as_deref(), Some("value=baz"));
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some(FORM_CONTENT_TYPE)
        );
    }

    #[test]
    fn form_body_escapes_reserved_bytes() {
        let request =
            HttpRequest::put("http://store/v2/keys/foo").with_form_body(&[("value", b"a=b&c d".as_slice())]);
        assert_eq!(request.body.as_deref(), Some("value=a%3Db%26c+d"));
    }

    #[test]
    fn form_body_joins_pairs() {
        let request = HttpRequest::put("http://store/v2/keys/d")
            .with_form_body(&[("dir", b"true".as_slice()), ("prevExist", b"false".as_slice())]);
        assert_eq!(request.body.as_deref(), Some("dir=true&prevExist=false"));
    }

    #[test]
    fn form_body_empty_value() {
        let request = HttpRequest::put("http://store/v2/keys/f").with_form_body(&[("value", b"".as_slice())]);
        assert_eq!(request.body.as_deref(), Some("value="));
    }

    #[test]
    fn method_conversion() {
        assert_eq!(http::Method::from(Method::PUT), http::Method::PUT);
        assert_eq!(Method::DELETE.to_string(), "DELETE");
        assert_eq!(Method::default(), Method::GET);
    }
}
