//! HTTP response types.
//!
//! [`HttpResponse`] is the single response type views return. The unit
//! structs below ([`JsonResponse`], [`HttpResponseRedirect`], ...) are
//! shorthand constructors that hand back an `HttpResponse`.

use axum::response::IntoResponse;
use http::header::{HeaderName, LOCATION};
use http::{HeaderMap, HeaderValue, StatusCode};

use brackets_core::DjangoError;

/// The body of an [`HttpResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseContent {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl ResponseContent {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// An HTTP response.
///
/// # Examples
///
/// ```
/// use brackets_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello, World!");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.text(), "Hello, World!");
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: ResponseContent,
    charset: String,
    content_type: String,
}

impl HttpResponse {
    /// Creates a response with a text body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Text(body.into()),
            charset: "utf-8".to_string(),
            content_type: "text/html".to_string(),
        }
    }

    /// Creates a response with a byte body.
    pub fn with_bytes(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Bytes(body),
            charset: "utf-8".to_string(),
            content_type: "application/octet-stream".to_string(),
        }
    }

    /// 200 OK.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 400 Bad Request.
    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// 403 Forbidden.
    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, body)
    }

    /// 404 Not Found.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// 500 Internal Server Error.
    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// 405 Method Not Allowed, with an `Allow` header listing `permitted_methods`.
    pub fn not_allowed(permitted_methods: &[&str]) -> Self {
        let allow = permitted_methods.join(", ");
        let mut response = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method Not Allowed. Permitted: {allow}"),
        );
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers.insert(http::header::ALLOW, value);
        }
        response
    }

    /// Builds the response a view answers with when it fails with `error`.
    pub fn from_error(error: &DjangoError) -> Self {
        let status = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, error.to_string())
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns a header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Adds a header, replacing any existing value.
    #[must_use]
    pub fn set_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the charset.
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Returns the content type (without charset).
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the body.
    pub const fn content(&self) -> &ResponseContent {
        &self.content
    }

    /// Returns the body as bytes.
    pub fn content_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.content.as_bytes()).into_owned()
    }

    fn full_content_type(&self) -> String {
        if self.content_type.starts_with("text/") || self.content_type.contains("json") {
            format!("{}; charset={}", self.content_type, self.charset)
        } else {
            self.content_type.clone()
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let content_type = self.full_content_type();
        let body = match self.content {
            ResponseContent::Text(text) => axum::body::Body::from(text),
            ResponseContent::Bytes(bytes) => axum::body::Body::from(bytes),
        };
        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        if let Ok(ct) = HeaderValue::from_str(&content_type) {
            response.headers_mut().insert(http::header::CONTENT_TYPE, ct);
        }
        for (key, value) in &self.headers {
            response.headers_mut().insert(key, value.clone());
        }
        response
    }
}

/// A JSON response.
pub struct JsonResponse;

impl JsonResponse {
    /// Serializes `data` into a 200 response with `application/json`.
    ///
    /// A serialization failure becomes a 500 response.
    pub fn new<T: serde::Serialize>(data: &T) -> HttpResponse {
        Self::with_status(StatusCode::OK, data)
    }

    /// Serializes `data` into a JSON response with the given status.
    pub fn with_status<T: serde::Serialize>(status: StatusCode, data: &T) -> HttpResponse {
        match serde_json::to_string(data) {
            Ok(json) => {
                let mut response = HttpResponse::new(status, json);
                response.set_content_type("application/json");
                response
            }
            Err(e) => HttpResponse::server_error(format!("JSON serialization error: {e}")),
        }
    }
}

/// A 302 Found redirect.
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    /// Redirects to `url`.
    pub fn new(url: &str) -> HttpResponse {
        redirect(StatusCode::FOUND, url)
    }
}

/// A 301 Moved Permanently redirect.
pub struct HttpResponsePermanentRedirect;

impl HttpResponsePermanentRedirect {
    /// Redirects permanently to `url`.
    pub fn new(url: &str) -> HttpResponse {
        redirect(StatusCode::MOVED_PERMANENTLY, url)
    }
}

fn redirect(status: StatusCode, url: &str) -> HttpResponse {
    let mut response = HttpResponse::new(status, "");
    if let Ok(value) = HeaderValue::from_str(url) {
        response.headers.insert(LOCATION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(HttpResponse::ok("").status(), StatusCode::OK);
        assert_eq!(HttpResponse::bad_request("").status(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpResponse::forbidden("").status(), StatusCode::FORBIDDEN);
        assert_eq!(HttpResponse::not_found("").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpResponse::server_error("").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_allowed_sets_allow_header() {
        let response = HttpResponse::not_allowed(&["GET", "HEAD"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("GET, HEAD"));
    }

    #[test]
    fn test_from_error_maps_status() {
        let response =
            HttpResponse::from_error(&DjangoError::ImproperlyConfigured("no url".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("no url"));

        let response = HttpResponse::from_error(&DjangoError::PermissionDenied("nope".into()));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_json_response() {
        let response = JsonResponse::new(&serde_json::json!({"ok": true}));
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.text(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_redirects() {
        let found = HttpResponseRedirect::new("/login/?next=/x/");
        assert_eq!(found.status(), StatusCode::FOUND);
        assert_eq!(found.header("location"), Some("/login/?next=/x/"));

        let moved = HttpResponsePermanentRedirect::new("https://example.com/");
        assert_eq!(moved.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(moved.header("location"), Some("https://example.com/"));
    }

    #[test]
    fn test_into_axum_response_keeps_headers() {
        let response = HttpResponse::ok("hi").set_header(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        );
        let axum_response = response.into_response();
        assert_eq!(axum_response.status(), StatusCode::OK);
        assert_eq!(axum_response.headers()["x-frame-options"], "DENY");
        assert_eq!(
            axum_response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
    }
}
