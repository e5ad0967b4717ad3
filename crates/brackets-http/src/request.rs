//! HTTP request type.
//!
//! [`HttpRequest`] carries everything a view or mixin inspects: method,
//! path, headers, parsed GET/POST parameters, uploaded files, META and a
//! typed [`http::Extensions`] map where authentication layers attach the
//! current user.

use std::collections::HashMap;
use std::sync::OnceLock;

use brackets_core::SETTINGS;
use http::{Extensions, HeaderMap, Method};

use crate::querydict::QueryDict;
use crate::upload::{self, UploadedFile};

/// An incoming HTTP request.
///
/// # Examples
///
/// ```
/// use brackets_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/articles/")
///     .query_string("order_by=title")
///     .build();
///
/// assert_eq!(request.method(), &http::Method::GET);
/// assert_eq!(request.get().get("order_by"), Some("title"));
/// assert_eq!(request.get_full_path(), "/articles/?order_by=title");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    get: QueryDict,
    post: QueryDict,
    files: HashMap<String, Vec<UploadedFile>>,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    body: Vec<u8>,
    scheme: String,
    extensions: Extensions,
    cookies: OnceLock<HashMap<String, String>>,
}

impl HttpRequest {
    /// Returns a builder, mostly useful in tests.
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Builds a request from the parts and body of an axum request.
    ///
    /// META receives an `HTTP_*` entry per header plus `REQUEST_METHOD`,
    /// `PATH_INFO`, `QUERY_STRING` and, when a `Host` header is present,
    /// `SERVER_NAME`. Extensions set by earlier layers are carried over.
    pub fn from_axum(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let mut meta = HashMap::new();
        for (name, value) in &parts.headers {
            if let Ok(v) = value.to_str() {
                meta.insert(
                    format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_")),
                    v.to_string(),
                );
            }
        }
        if let Some(host) = meta.get("HTTP_HOST").cloned() {
            meta.insert("SERVER_NAME".to_string(), host);
        }
        let query_string = parts.uri.query().unwrap_or("").to_string();
        meta.insert("REQUEST_METHOD".to_string(), parts.method.to_string());
        meta.insert("PATH_INFO".to_string(), parts.uri.path().to_string());
        meta.insert("QUERY_STRING".to_string(), query_string.clone());

        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let scheme = parts.uri.scheme_str().unwrap_or("http").to_string();

        let (post, files) = parse_body(content_type.as_deref(), &body);
        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            get: QueryDict::parse(&query_string),
            query_string,
            content_type,
            post,
            files,
            headers: parts.headers,
            meta,
            body,
            scheme,
            extensions: parts.extensions,
            cookies: OnceLock::new(),
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (no leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the query string parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the form body parameters (urlencoded or multipart).
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the uploaded files of a multipart body.
    pub const fn files(&self) -> &HashMap<String, Vec<UploadedFile>> {
        &self.files
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the META map.
    pub const fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Returns the META map mutably.
    pub fn meta_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.meta
    }

    /// Returns the raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the scheme (`"http"` or `"https"`).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the typed extensions.
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the typed extensions mutably.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns `true` if the request arrived over HTTPS.
    ///
    /// Besides the scheme, the `secure_proxy_ssl_header` setting is honored
    /// when settings are configured.
    pub fn is_secure(&self) -> bool {
        let proxy_header = SETTINGS
            .try_get()
            .and_then(|s| s.secure_proxy_ssl_header.as_ref());
        self.is_secure_behind(proxy_header)
    }

    /// Like [`is_secure`](Self::is_secure) with an explicit proxy header pair.
    pub fn is_secure_behind(&self, proxy_header: Option<&(String, String)>) -> bool {
        if self.scheme == "https" {
            return true;
        }
        proxy_header.is_some_and(|(name, expected)| {
            self.header(name)
                .and_then(|v| v.split(',').next())
                .is_some_and(|v| v.trim() == expected)
        })
    }

    /// Returns the host from META, falling back to `"localhost"`.
    pub fn get_host(&self) -> &str {
        self.meta
            .get("HTTP_HOST")
            .or_else(|| self.meta.get("SERVER_NAME"))
            .map_or("localhost", String::as_str)
    }

    /// Returns the path with the query string appended.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Builds an absolute URI for `location`, or for this request when `None`.
    ///
    /// An already absolute `location` is returned unchanged.
    pub fn build_absolute_uri(&self, location: Option<&str>) -> String {
        let host = self.get_host();
        match location {
            Some(loc) if loc.starts_with("http://") || loc.starts_with("https://") => {
                loc.to_string()
            }
            Some(loc) if loc.starts_with('/') => format!("{}://{host}{loc}", self.scheme),
            Some(loc) => format!("{}://{host}/{loc}", self.scheme),
            None => format!("{}://{host}{}", self.scheme, self.get_full_path()),
        }
    }

    /// Returns the parsed `Cookie` header.
    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cookies.get_or_init(|| {
            self.header("cookie")
                .map(parse_cookie_header)
                .unwrap_or_default()
        })
    }

    /// Returns one cookie value.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().get(name).map(String::as_str)
    }
}

fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parses a urlencoded or multipart body into POST parameters and files.
///
/// A multipart body that fails to parse yields empty parameters.
fn parse_body(
    content_type: Option<&str>,
    body: &[u8],
) -> (QueryDict, HashMap<String, Vec<UploadedFile>>) {
    match content_type {
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            (QueryDict::parse(&String::from_utf8_lossy(body)), HashMap::new())
        }
        Some(ct) if ct.starts_with("multipart/form-data") => {
            let parsed = upload::extract_boundary(ct)
                .and_then(|boundary| upload::parse_multipart(body, boundary).ok());
            parsed.map_or_else(
                || (QueryDict::new(), HashMap::new()),
                |data| {
                    let mut post = QueryDict::new();
                    for (name, value) in &data.fields {
                        post.append(name, value);
                    }
                    (post, data.files)
                },
            )
        }
        _ => (QueryDict::new(), HashMap::new()),
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    body: Vec<u8>,
    scheme: String,
    extensions: Extensions,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            content_type: None,
            headers: HeaderMap::new(),
            meta: HashMap::new(),
            body: Vec::new(),
            scheme: "http".to_string(),
            extensions: Extensions::new(),
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without the leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, ct: &str) -> Self {
        self.content_type = Some(ct.to_string());
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a META entry.
    #[must_use]
    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a urlencoded form body and the matching content type.
    #[must_use]
    pub fn form(self, encoded: &str) -> Self {
        self.content_type("application/x-www-form-urlencoded")
            .body(encoded.as_bytes().to_vec())
    }

    /// Sets the scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Inserts a typed extension.
    #[must_use]
    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Builds the request.
    pub fn build(self) -> HttpRequest {
        let (post, files) = parse_body(self.content_type.as_deref(), &self.body);
        HttpRequest {
            get: QueryDict::parse(&self.query_string),
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            content_type: self.content_type,
            post,
            files,
            headers: self.headers,
            meta: self.meta,
            body: self.body,
            scheme: self.scheme,
            extensions: self.extensions,
            cookies: OnceLock::new(),
        }
    }
}
