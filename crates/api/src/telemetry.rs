//! Logging and error reporting setup for the API binary.
//!
//! Sentry is optional and only starts when `SENTRY_DSN` is set. Tracing
//! always starts: plain text for local runs, flattened JSON when
//! `SOUQ_LOG_JSON` is set.

use std::borrow::Cow;
use std::sync::Arc;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use sentry::protocol::Event;
use tracing::{Level, Metadata};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

const DEFAULT_FILTER: &str = "souq_api=info,tower_http=debug";

/// Request headers that never leave the process.
const SCRUBBED_HEADERS: [&str; 3] = ["authorization", "cookie", "x-forwarded-for"];

/// Keeps the Sentry client alive; events are flushed when dropped.
#[must_use = "dropping the guard stops error reporting"]
pub struct Telemetry {
    _sentry: Option<sentry::ClientInitGuard>,
}

/// Start Sentry (if configured), then the tracing subscriber.
///
/// Sentry has to be initialized first so the tracing layer can find the
/// client.
pub fn init(config: &ApiConfig) -> Telemetry {
    let sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Cow::Owned),
                sample_rate: config.sentry_sample_rate,
                traces_sample_rate: config.sentry_traces_sample_rate,
                attach_stacktrace: true,
                before_send: Some(Arc::new(|event| Some(scrub_event(event)))),
                ..Default::default()
            },
        ))
    });

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_filter))
        .init();

    if sentry.is_some() {
        tracing::info!("Sentry initialized");
    }
    Telemetry { _sentry: sentry }
}

/// Warnings and errors become Sentry events; info and debug ride along as
/// breadcrumbs.
fn sentry_filter(metadata: &Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

/// Drop credentials and client addresses from the captured request.
fn scrub_event(mut event: Event<'static>) -> Event<'static> {
    if let Some(request) = event.request.as_mut() {
        request
            .headers
            .retain(|name, _| !SCRUBBED_HEADERS.contains(&name.to_ascii_lowercase().as_str()));
        request.cookies = None;
    }
    event
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sentry::protocol::Request;

    use super::*;

    #[test]
    fn test_scrub_removes_credentials() {
        let mut request = Request::default();
        request
            .headers
            .insert("Authorization".to_owned(), "Bearer abc".to_owned());
        request
            .headers
            .insert("x-forwarded-for".to_owned(), "203.0.113.9".to_owned());
        request
            .headers
            .insert("x-request-id".to_owned(), "req-1".to_owned());
        request.cookies = Some("session=1".to_owned());
        let event = Event {
            request: Some(request),
            ..Default::default()
        };

        let scrubbed = scrub_event(event);
        let request = scrubbed.request.unwrap();
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers["x-request-id"], "req-1");
        assert!(request.cookies.is_none());
    }

    #[test]
    fn test_scrub_without_request_is_noop() {
        let scrubbed = scrub_event(Event::default());
        assert!(scrubbed.request.is_none());
    }
}
