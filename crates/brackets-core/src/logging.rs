//! Logging setup and per-dispatch spans.

use crate::settings::Settings;

/// Installs the global tracing subscriber described by `settings`.
///
/// The filter comes from `settings.log_level`; an unparseable directive
/// falls back to `info`. Debug mode gets pretty human-readable output,
/// otherwise events are emitted as JSON. Calling this a second time leaves
/// the first subscriber in place.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates the span a view dispatch runs inside.
///
/// # Examples
///
/// ```
/// use brackets_core::logging::view_span;
///
/// let span = view_span("ArticleList", "GET", "/articles/");
/// let _guard = span.enter();
/// tracing::debug!("dispatching");
/// ```
pub fn view_span(view: &str, method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("dispatch", view = view, method = method, path = path)
}
