//! Server-rendered public form pages.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use formcraft_forms::form_data::FormData;
use formcraft_forms::page::{self, LoadState};
use formcraft_forms::session::SubmitOutcome;
use formcraft_forms::widgets::escape;

use crate::state::AppState;

fn html_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{body}\n</body>\n</html>",
        escape(title)
    )
}

fn respond(status: StatusCode, loaded: &LoadState, state: &AppState) -> Response {
    let title = loaded.session().map_or("Form", |s| s.name());
    (status, Html(html_document(title, &loaded.render(&state.aux())))).into_response()
}

fn load_status(loaded: &LoadState) -> StatusCode {
    StatusCode::from_u16(loaded.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// `GET /forms/{id}`
pub async fn show_form(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let loaded = page::load(&state.store, &id).await;
    respond(load_status(&loaded), &loaded, &state)
}

/// `POST /forms/{id}` with an urlencoded body.
///
/// Re-renders the form: with a success banner when stored, with field errors
/// (`400`) when validation fails, or with a failure banner when the store
/// could not take the submission.
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: String,
) -> Response {
    let mut loaded = page::load(&state.store, &id).await;
    let Some(session) = loaded.session_mut() else {
        return respond(load_status(&loaded), &loaded, &state);
    };

    session.bind(&FormData::parse(&body));
    let status = match session.submit(&state.store).await {
        SubmitOutcome::Accepted(_) => StatusCode::OK,
        SubmitOutcome::Rejected(_) => StatusCode::BAD_REQUEST,
        SubmitOutcome::Failed(err) => {
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };
    respond(status, &loaded, &state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_document_escapes_title() {
        let html = html_document("<Survey>", "<p>x</p>");
        assert!(html.contains("<title>&lt;Survey&gt;</title>"));
        assert!(html.contains("<p>x</p>"));
    }
}
