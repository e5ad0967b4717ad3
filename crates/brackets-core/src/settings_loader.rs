//! Loading [`Settings`] from TOML, JSON and the environment.
//!
//! Files only need to name the values they change; everything else keeps
//! its default. Environment variables prefixed with `BRACKETS_` override
//! whatever the file said.
//!
//! ```toml
//! debug = true
//! login_url = "/signin/"
//! secure_proxy_ssl_header = ["X-Forwarded-Proto", "https"]
//! ```

use std::path::Path;

use crate::error::DjangoError;
use crate::settings::Settings;

/// Parses settings from a TOML string.
///
/// # Errors
///
/// Returns [`DjangoError::ConfigurationError`] if the TOML is malformed or a
/// value has the wrong type.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, DjangoError> {
    toml::from_str(toml_str)
        .map_err(|e| DjangoError::ConfigurationError(format!("Failed to parse TOML: {e}")))
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, DjangoError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        DjangoError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, DjangoError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Parses settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, DjangoError> {
    serde_json::from_str(json_str)
        .map_err(|e| DjangoError::ConfigurationError(format!("Failed to parse JSON: {e}")))
}

/// Loads settings from environment variables alone, starting from defaults.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `BRACKETS_*` environment variables to `settings`.
///
/// - `BRACKETS_SECRET_KEY` -> `secret_key`
/// - `BRACKETS_DEBUG` -> `debug` ("true", "1" or "yes", case-insensitive)
/// - `BRACKETS_LOG_LEVEL` -> `log_level`
/// - `BRACKETS_LOGIN_URL` -> `login_url`
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Applies overrides looked up through `lookup`, keyed by variable name.
fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("BRACKETS_SECRET_KEY") {
        settings.secret_key = val;
    }
    if let Some(val) = lookup("BRACKETS_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }
    if let Some(val) = lookup("BRACKETS_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(val) = lookup("BRACKETS_LOGIN_URL") {
        settings.login_url = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_toml_str_partial() {
        let settings = from_toml_str(
            r#"
            debug = true
            login_url = "/signin/"
            secure_proxy_ssl_header = ["X-Forwarded-Proto", "https"]
            "#,
        )
        .unwrap();
        assert!(settings.debug);
        assert_eq!(settings.login_url, "/signin/");
        assert_eq!(
            settings.secure_proxy_ssl_header,
            Some(("X-Forwarded-Proto".to_string(), "https".to_string()))
        );
        // Untouched values keep their defaults
        assert_eq!(settings.redirect_field_name, "next");
        assert_eq!(settings.csrf_cookie_name, "csrftoken");
    }

    #[test]
    fn test_from_toml_str_extra_table() {
        let settings = from_toml_str(
            r#"
            [extra]
            site_name = "Example"
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.extra.get("site_name"),
            Some(&serde_json::json!("Example"))
        );
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("debug = \"maybe\"").unwrap_err();
        assert!(matches!(err, DjangoError::ConfigurationError(_)));
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        let settings = from_toml_file(file.path()).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_from_json_str() {
        let settings = from_json_str(r#"{"debug": true, "redirect_field_name": "to"}"#).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.redirect_field_name, "to");
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BRACKETS_DEBUG", "YES"),
            ("BRACKETS_LOGIN_URL", "/auth/login/"),
            ("BRACKETS_SECRET_KEY", "s3cret"),
        ]
        .into_iter()
        .collect();
        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| vars.get(key).map(ToString::to_string));
        assert!(settings.debug);
        assert_eq!(settings.login_url, "/auth/login/");
        assert_eq!(settings.secret_key, "s3cret");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_apply_overrides_debug_false() {
        let mut settings = Settings {
            debug: true,
            ..Settings::default()
        };
        apply_overrides(&mut settings, |key| {
            (key == "BRACKETS_DEBUG").then(|| "off".to_string())
        });
        assert!(!settings.debug);
    }
}
