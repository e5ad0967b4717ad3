//! CSRF (Cross-Site Request Forgery) checks.
//!
//! State-changing requests must echo the CSRF cookie back, either in the
//! CSRF header or in the `csrfmiddlewaretoken` form field. Views whose
//! [`csrf_exempt`](crate::View::csrf_exempt) returns `true` are skipped.

use rand::RngCore;

use brackets_core::{Settings, SETTINGS};
use brackets_http::{HttpRequest, HttpResponse};

use crate::views::class_based::View;

/// The length of a CSRF token in bytes (a 64-char hex string).
const CSRF_TOKEN_LENGTH: usize = 32;

/// The form field carrying the CSRF token.
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";

/// Checks CSRF tokens before a view runs.
#[derive(Debug, Clone)]
pub struct CsrfViewMiddleware {
    /// Name of the CSRF cookie.
    pub cookie_name: String,
    /// Name of the HTTP header carrying the CSRF token.
    pub header_name: String,
}

impl Default for CsrfViewMiddleware {
    fn default() -> Self {
        let defaults = Settings::default();
        let settings = SETTINGS.try_get().unwrap_or(&defaults);
        Self {
            cookie_name: settings.csrf_cookie_name.clone(),
            header_name: settings.csrf_header_name.clone(),
        }
    }
}

impl CsrfViewMiddleware {
    /// Creates a middleware using the configured cookie and header names.
    pub fn new() -> Self {
        Self::default()
    }

    const fn is_safe_method(method: &http::Method) -> bool {
        matches!(
            *method,
            http::Method::GET | http::Method::HEAD | http::Method::OPTIONS | http::Method::TRACE
        )
    }

    fn request_token<'a>(&self, request: &'a HttpRequest) -> Option<&'a str> {
        request
            .header(&self.header_name)
            .or_else(|| request.post().get(CSRF_FORM_FIELD))
    }

    /// Checks `request` before `view` handles it. Returns a 403 response
    /// when the check fails, `None` otherwise.
    pub fn process_view(&self, request: &HttpRequest, view: &dyn View) -> Option<HttpResponse> {
        if view.csrf_exempt() || Self::is_safe_method(request.method()) {
            return None;
        }

        let reason = match (request.cookie(&self.cookie_name), self.request_token(request)) {
            (None, _) => "CSRF cookie not set.",
            (Some(_), None) => "CSRF token missing.",
            (Some(cookie), Some(token)) if !validate_csrf_token(token, cookie) => {
                "CSRF token incorrect."
            }
            _ => return None,
        };

        tracing::warn!(
            view = view.view_name(),
            path = request.path(),
            reason,
            "Forbidden (CSRF)"
        );
        Some(HttpResponse::forbidden(format!("CSRF verification failed. {reason}")))
    }
}

/// Generates a random CSRF token as a 64-character hex string.
pub fn generate_csrf_token() -> String {
    use std::fmt::Write;

    let mut bytes = [0u8; CSRF_TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
        .iter()
        .fold(String::with_capacity(CSRF_TOKEN_LENGTH * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
}

/// Compares a submitted token with the cookie token in constant time.
pub fn validate_csrf_token(request_token: &str, cookie_token: &str) -> bool {
    if request_token.is_empty() || cookie_token.is_empty() {
        return false;
    }
    constant_time_eq(request_token.as_bytes(), cookie_token.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
