//! The public form page.
//!
//! [`load`] fetches a published document by id and turns it into a
//! [`FormSession`]. The result is a [`LoadState`]: `Loading` while the fetch is
//! in flight (for callers that render progressively), `Error` for a terminal
//! failure, or `Ready` with a session.
//!
//! A document without usable fields is not a terminal failure: the page
//! renders an inline notice in place of the form.

use formcraft_core::FormcraftError;
use tracing::Instrument;

use crate::descriptor::FieldsPayload;
use crate::repository::FormRepository;
use crate::session::{FormSession, NO_FIELDS};
use crate::widgets::{escape, AuxContext};

/// The outcome of loading a public form.
#[derive(Debug)]
pub enum LoadState {
    /// The fetch has not completed.
    Loading,
    /// The fetch failed or produced no usable form.
    Error(FormcraftError),
    /// The form is ready to fill in.
    Ready(Box<FormSession>),
}

impl LoadState {
    /// Returns the session if the form loaded.
    pub fn session(&self) -> Option<&FormSession> {
        match self {
            Self::Ready(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    /// Returns the session mutably if the form loaded.
    pub fn session_mut(&mut self) -> Option<&mut FormSession> {
        match self {
            Self::Ready(session) => Some(session.as_mut()),
            _ => None,
        }
    }

    /// Returns the HTTP status a page in this state is served with.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Loading | Self::Ready(_) => 200,
            Self::Error(e) if e.is_terminal() => e.status_code(),
            Self::Error(FormcraftError::MalformedDocument(_)) => 200,
            Self::Error(e) => e.status_code(),
        }
    }

    /// Renders the page body.
    ///
    /// Terminal errors replace the page; anything else is an inline notice.
    pub fn render(&self, aux: &AuxContext) -> String {
        match self {
            Self::Loading => r#"<div class="loading" aria-busy="true">Loading...</div>"#.to_string(),
            Self::Ready(session) => session.render(aux),
            Self::Error(e) if e.is_terminal() => format!(
                r#"<div class="terminal error" role="alert"><h1>Error</h1><p>{}</p></div>"#,
                escape(&public_message(e))
            ),
            Self::Error(FormcraftError::MalformedDocument(_)) => {
                format!(r#"<p class="notice">{NO_FIELDS}</p>"#)
            }
            Self::Error(e) => format!(r#"<p class="notice">{}</p>"#, escape(&e.to_string())),
        }
    }
}

fn public_message(error: &FormcraftError) -> String {
    match error {
        FormcraftError::NotFound(message) | FormcraftError::TransportFailed(message) => {
            message.clone()
        }
        other => other.to_string(),
    }
}

/// Builds a session from a fetched field payload.
pub fn session_from_payload(form_id: &str, name: &str, payload: &FieldsPayload) -> LoadState {
    match FormSession::from_entries(form_id, name, &payload.entries) {
        Ok(session) => LoadState::Ready(Box::new(session)),
        Err(e) => LoadState::Error(e),
    }
}

/// Fetches the published form `id` and starts a session over it.
pub async fn load(repo: &dyn FormRepository, id: &str) -> LoadState {
    let fetched = repo
        .get_published(id)
        .instrument(formcraft_core::logging::form_span(id))
        .await;

    match fetched {
        Ok(published) => {
            let state = session_from_payload(id, &published.name, &published.json);
            if let LoadState::Error(e) = &state {
                tracing::warn!(form_id = id, error = %e, "published form has no usable fields");
            }
            state
        }
        Err(e) => {
            tracing::warn!(form_id = id, error = %e, "public form fetch failed");
            LoadState::Error(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::descriptor::{FieldDescriptor, FormEntry};
    use crate::repository::not_published;

    fn payload(fields: serde_json::Value) -> FieldsPayload {
        serde_json::from_value(json!({ "fields": fields })).unwrap()
    }

    #[test]
    fn test_ready_from_payload() {
        let state = session_from_payload("f1", "Signup", &payload(json!([{"name": "u", "label": "User"}])));
        assert_eq!(state.status_code(), 200);
        assert_eq!(state.session().unwrap().name(), "Signup");
        assert!(state.render(&AuxContext::default()).contains("<form"));
    }

    #[test]
    fn test_no_fields_is_inline() {
        let state = session_from_payload("f1", "Empty", &payload(json!([{"label": "No key"}])));
        assert!(matches!(state, LoadState::Error(FormcraftError::MalformedDocument(_))));
        assert_eq!(state.status_code(), 200);
        assert_eq!(
            state.render(&AuxContext::default()),
            r#"<p class="notice">No fields found in this form.</p>"#
        );
    }

    #[test]
    fn test_not_found_is_terminal() {
        let state = LoadState::Error(not_published());
        assert_eq!(state.status_code(), 404);
        let html = state.render(&AuxContext::default());
        assert!(html.contains("Form not found or is not published."));
        assert!(html.contains("terminal"));
    }

    #[test]
    fn test_transport_failure_is_terminal() {
        let state = LoadState::Error(FormcraftError::TransportFailed("<down>".into()));
        assert_eq!(state.status_code(), 502);
        assert!(state.render(&AuxContext::default()).contains("&lt;down&gt;"));
    }

    #[test]
    fn test_other_errors_are_inline() {
        let state = LoadState::Error(FormcraftError::SerializationError("bad json".into()));
        assert_eq!(state.status_code(), 500);
        let html = state.render(&AuxContext::default());
        assert!(html.starts_with(r#"<p class="notice">"#));
        assert!(html.contains("bad json"));
        assert!(!html.contains("terminal"));
    }

    #[test]
    fn test_loading() {
        let mut state = LoadState::Loading;
        assert!(state.session_mut().is_none());
        assert!(state.render(&AuxContext::default()).contains("aria-busy"));
    }

    #[test]
    fn test_rows_survive_payload() {
        let entries = vec![FormEntry::Row(vec![
            FieldDescriptor::new("a", "A"),
            FieldDescriptor::new("b", "B"),
        ])];
        let state = session_from_payload("f", "F", &FieldsPayload::new(entries));
        assert!(state.render(&AuxContext::default()).contains(r#"<div class="form-row">"#));
    }
}
