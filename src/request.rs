//! Incoming HTTP request type.

/// An incoming HTTP request.
///
/// The server builds one per hyper request. Hosts and tests that drive
/// [`Router::dispatch`](crate::Router::dispatch) directly build their own with
/// [`Request::new`]:
///
/// ```rust
/// use absol::Request;
///
/// let req = Request::new("POST", "/users")
///     .with_header("content-type", "application/json")
///     .with_body(br#"{"name":"alice"}"#.to_vec());
///
/// assert_eq!(req.header("Content-Type"), Some("application/json"));
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    /// A request with no headers and an empty body.
    ///
    /// Neither argument is validated or normalised. The method is kept as
    /// received; an unroutable one simply never matches.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::from_parts(method.into(), path.into(), Vec::new(), Vec::new())
    }

    pub(crate) fn from_parts(
        method: String,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self { method, path, headers, body }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
