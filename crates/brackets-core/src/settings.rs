//! Settings for the brackets crates.
//!
//! [`Settings`] holds the handful of host-framework settings the mixins read:
//! the login URL, debug mode, CSRF names and the proxy SSL header.
//! [`SETTINGS`] is the process-wide instance, configured once at startup.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The complete set of settings.
///
/// Every field has a default, so a configuration file only needs to name
/// the values it changes.
///
/// # Examples
///
/// ```
/// use brackets_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert_eq!(settings.login_url, "/accounts/login/");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled. `SslRequired` lets plain HTTP through in debug.
    pub debug: bool,
    /// The secret key used for signing.
    pub secret_key: String,

    // ── Auth ─────────────────────────────────────────────────────────

    /// Where unauthenticated users are sent to log in.
    pub login_url: String,
    /// The query parameter carrying the post-login destination.
    pub redirect_field_name: String,

    // ── Security ─────────────────────────────────────────────────────

    /// The name of the CSRF cookie.
    pub csrf_cookie_name: String,
    /// The request header carrying the CSRF token.
    pub csrf_header_name: String,
    /// A `(header, value)` pair that marks a request as secure when it
    /// arrives through a TLS-terminating proxy, e.g.
    /// `("X-Forwarded-Proto", "https")`.
    pub secure_proxy_ssl_header: Option<(String, String)>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter directive (e.g. "info", "brackets_mixins=debug").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            secret_key: String::new(),
            login_url: "/accounts/login/".to_string(),
            redirect_field_name: "next".to_string(),
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_header_name: "X-CSRFToken".to_string(),
            secure_proxy_ssl_header: None,
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, or `None` before `configure` ran.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
