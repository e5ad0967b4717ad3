//! Error types for the brackets crates.
//!
//! [`DjangoError`] follows the exception hierarchy of the host framework the
//! mixins plug into: HTTP-level failures, configuration mistakes made by the
//! view author, and validation errors raised by forms.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation failure, either a single message or a set of per-field errors.
///
/// # Examples
///
/// ```
/// use brackets_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.to_string(), "This field is required.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code such as `"required"` or `"invalid"`.
    pub code: String,
    /// Per-field errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a validation error with a message and a code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a validation error holding per-field messages.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            message: String::new(),
            code: "invalid".to_string(),
            field_errors,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return write!(f, "{}", self.message);
        }
        let mut fields: Vec<_> = self.field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let rendered: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errors)| errors.iter().map(move |e| format!("{field}: {e}")))
            .collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// The error type shared by every brackets crate.
///
/// Each variant maps to an HTTP status via [`DjangoError::status_code`], so a
/// view wrapper can turn any error into a response without inspecting it.
#[derive(Error, Debug)]
pub enum DjangoError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403 Forbidden.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A view or mixin is missing a required attribute or has an invalid one.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// Settings could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Validation ───────────────────────────────────────────────────

    /// Form or serializer input failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    /// Serialization of an object failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DjangoError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `ValidationError` -> 400
    /// - `PermissionDenied` -> 403
    /// - `NotFound` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::InternalServerError(_)
            | Self::ImproperlyConfigured(_)
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Builds the error reported when a view lacks a required attribute.
    ///
    /// The message names both the attribute and the method that can be
    /// overridden instead, e.g. ``ArticleView is missing the `redirect_url`
    /// attribute. Define `ArticleView.redirect_url` or override
    /// `ArticleView.get_redirect_url()`.``
    pub fn missing_attribute(view: &str, attribute: &str, getter: &str) -> Self {
        Self::ImproperlyConfigured(format!(
            "{view} is missing the `{attribute}` attribute. \
             Define `{view}.{attribute}` or override `{view}.{getter}()`."
        ))
    }

    /// Returns `true` for configuration mistakes made by the view author.
    pub const fn is_improperly_configured(&self) -> bool {
        matches!(self, Self::ImproperlyConfigured(_))
    }
}

impl From<ValidationError> for DjangoError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

/// A convenience alias for `Result<T, DjangoError>`.
pub type DjangoResult<T> = Result<T, DjangoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("Enter a valid value.", "invalid");
        assert_eq!(err.to_string(), "Enter a valid value.");
    }

    #[test]
    fn test_validation_error_display_fields_sorted() {
        let mut fields = HashMap::new();
        fields.insert("slug".to_string(), vec!["Enter a valid slug.".to_string()]);
        fields.insert("email".to_string(), vec!["Invalid email.".to_string()]);
        let err = ValidationError::with_field_errors(fields);
        assert_eq!(err.to_string(), "email: Invalid email.; slug: Enter a valid slug.");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DjangoError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(DjangoError::PermissionDenied("x".into()).status_code(), 403);
        assert_eq!(DjangoError::NotFound("x".into()).status_code(), 404);
        assert_eq!(DjangoError::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(DjangoError::ImproperlyConfigured("x".into()).status_code(), 500);
        assert_eq!(
            DjangoError::ValidationError(ValidationError::new("x", "y")).status_code(),
            400
        );
    }

    #[test]
    fn test_missing_attribute_message() {
        let err = DjangoError::missing_attribute("ArticleView", "redirect_url", "get_redirect_url");
        assert!(err.is_improperly_configured());
        let msg = err.to_string();
        assert!(msg.contains("ArticleView is missing the `redirect_url` attribute"));
        assert!(msg.contains("override `ArticleView.get_redirect_url()`"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml");
        let err: DjangoError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("settings.toml"));
    }
}
