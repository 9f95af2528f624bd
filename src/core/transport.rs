//! HTTP seam between the explorer core and whatever performs requests.
//!
//! The browser build sends requests with [`FetchTransport`]; tests use
//! `MockServer`. Only network failures are errors here, a 404 or 405 is a
//! perfectly good [`HttpResponse`].
//!
//! [`FetchTransport`]: crate::utils::FetchTransport

use std::fmt;
use std::rc::Rc;

use crate::core::error::FetchError;

/// Callback receiving the cumulative number of uploaded bytes.
pub type ProgressFn = Rc<dyn Fn(u64)>;

// =============================================================================
// Method
// =============================================================================

/// HTTP and WebDAV methods used by the explorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Head,
    Put,
    Delete,
    Options,
    Propfind,
    Mkcol,
    Move,
    Copy,
}

impl Method {
    /// Wire token for this method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Propfind => "PROPFIND",
            Self::Mkcol => "MKCOL",
            Self::Move => "MOVE",
            Self::Copy => "COPY",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Headers
// =============================================================================

/// Ordered header list with case-insensitive lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing value with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Body
// =============================================================================

/// Request payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Bytes(Vec<u8>),
    /// A browser file handle, handed to the network layer without being read
    /// into memory.
    Blob(web_sys::Blob),
}

impl Body {
    /// Payload size in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Blob(blob) => blob.size() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-memory bytes, `None` for a blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Blob(_) => None,
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

impl From<web_sys::Blob> for Body {
    fn from(blob: web_sys::Blob) -> Self {
        Self::Blob(blob)
    }
}

// =============================================================================
// Request / Response
// =============================================================================

/// An outgoing request. `url` is an origin-relative path or an absolute URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Builder-style header setter.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Builder-style body setter.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A received response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Builder-style header setter.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Builder-style body setter.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Something that can perform HTTP requests.
///
/// Futures are not required to be `Send`: the explorer runs on the browser's
/// single event loop.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Perform `request`. Non-2xx statuses are returned as responses.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;

    /// Perform an upload, reporting cumulative bytes sent to `on_progress`.
    ///
    /// Transports that cannot observe upload progress report the whole body
    /// once the request completes.
    async fn send_with_progress(
        &self,
        request: HttpRequest,
        on_progress: ProgressFn,
    ) -> Result<HttpResponse, FetchError> {
        let total = request.body.as_ref().map_or(0, Body::len);
        let response = self.send(request).await?;
        on_progress(total);
        Ok(response)
    }
}

impl<T: Transport> Transport for Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        (**self).send(request).await
    }

    async fn send_with_progress(
        &self,
        request: HttpRequest,
        on_progress: ProgressFn,
    ) -> Result<HttpResponse, FetchError> {
        (**self).send_with_progress(request, on_progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let response = HttpResponse::new(200)
            .header("Content-Type", "text/html")
            .header("allow", "GET, PUT");
        assert_eq!(response.header_value("content-type"), Some("text/html"));
        assert_eq!(response.header_value("ALLOW"), Some("GET, PUT"));
        assert_eq!(response.header_value("DAV"), None);
    }

    #[test]
    fn test_is_ok() {
        assert!(HttpResponse::new(200).is_ok());
        assert!(HttpResponse::new(207).is_ok());
        assert!(!HttpResponse::new(301).is_ok());
        assert!(!HttpResponse::new(404).is_ok());
    }

    #[test]
    fn test_request_builder() {
        let req = HttpRequest::new(Method::Propfind, "/docs/")
            .header("Depth", "1")
            .body("<x/>");
        assert_eq!(req.method.as_str(), "PROPFIND");
        assert_eq!(req.headers.get("depth"), Some("1"));
        assert_eq!(
            req.body.as_ref().and_then(Body::as_bytes),
            Some(&b"<x/>"[..])
        );
        assert_eq!(req.body.as_ref().map(Body::len), Some(4));
    }
}
