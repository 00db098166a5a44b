//! Logging setup for formcraft.
//!
//! Configures a [`tracing`] subscriber from [`Settings`](crate::settings::Settings)
//! and provides spans that tag log lines with the request or form they belong to.

use crate::settings::Settings;

/// Installs the global tracing subscriber described by `settings`.
///
/// `settings.log_level` is an [`EnvFilter`](tracing_subscriber::EnvFilter)
/// directive; an unparseable directive falls back to `info`. Debug mode logs
/// in a pretty, human-readable format, otherwise one JSON object per line.
///
/// Calling this twice is harmless: the second subscriber is silently dropped.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

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

/// Creates a span for one HTTP request.
///
/// # Examples
///
/// ```
/// use formcraft_core::logging::request_span;
///
/// let span = request_span("abc-123", "POST", "/api/submissions");
/// let _guard = span.enter();
/// tracing::info!("handling request");
/// ```
pub fn request_span(request_id: &str, method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("request", id = request_id, method = method, path = path)
}

/// Creates a span scoped to a single form document.
pub fn form_span(form_id: &str) -> tracing::Span {
    tracing::info_span!("form", form_id = form_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_does_not_panic() {
        let mut settings = Settings::default();
        settings.log_level = "not a valid [directive".to_string();
        setup_logging(&settings);
        settings.debug = false;
        setup_logging(&settings);
    }

    #[test]
    fn test_spans_can_be_entered() {
        let span = request_span("r-1", "GET", "/health");
        let _guard = span.enter();
        let inner = form_span("f-1");
        let _inner_guard = inner.enter();
        tracing::debug!("inside form span");
    }
}
