//! JSON API handlers.
//!
//! Authoring routes take a [`Principal`] and only ever see that principal's
//! documents. The public routes expose published forms and accept
//! submissions, which are validated against the form's synthesized schema
//! before they reach the store.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use formcraft_core::FormcraftError;
use formcraft_forms::descriptor::{FieldsPayload, FormDocument};
use formcraft_forms::repository::{FormPatch, FormRepository, FormSummary, NewForm, PublishedForm};
use formcraft_forms::session::{FormSession, SubmitOutcome};
use formcraft_store::SubmissionLog;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Body of `POST /api/forms`.
#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    /// The form name.
    #[serde(default)]
    pub name: String,
    /// The field list, current or legacy shape.
    #[serde(default)]
    pub json: FieldsPayload,
    /// Whether to publish immediately.
    #[serde(default)]
    pub published: bool,
}

/// Body of `POST /api/submissions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    /// The target form.
    #[serde(default)]
    pub form_id: Option<String>,
    /// Values keyed by field key.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

fn required_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FormcraftError::BadRequest("Form name is required.".to_string()).into());
    }
    Ok(name.to_string())
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ── Authoring ──────────────────────────────────────────────────────

/// `GET /api/forms`
pub async fn list_forms(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> ApiResult<Json<Vec<FormSummary>>> {
    Ok(Json(state.store.list_by_owner(principal.id()).await?))
}

/// `POST /api/forms`
pub async fn create_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<CreateFormRequest>,
) -> ApiResult<impl IntoResponse> {
    let document = state
        .store
        .create(NewForm {
            name: required_name(&body.name)?,
            owner_id: principal.0,
            fields: body.json.entries,
            published: body.published,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// `GET /api/forms/{id}`
pub async fn get_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<Json<FormDocument>> {
    Ok(Json(state.store.get(&id, principal.id()).await?))
}

/// `PUT /api/forms/{id}`
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(mut patch): Json<FormPatch>,
) -> ApiResult<Json<FormDocument>> {
    if let Some(name) = &patch.name {
        patch.name = Some(required_name(name)?);
    }
    Ok(Json(state.store.update(&id, principal.id(), patch).await?))
}

/// `DELETE /api/forms/{id}`
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete(&id, principal.id()).await?;
    Ok(Json(json!({ "message": "Form deleted successfully" })))
}

/// `GET /api/forms/{id}/submissions`
pub async fn form_submissions(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<Json<SubmissionLog>> {
    Ok(Json(state.store.submissions(&id, principal.id())?))
}

// ── Public ─────────────────────────────────────────────────────────

/// `GET /api/public/forms/{id}`
pub async fn public_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PublishedForm>> {
    Ok(Json(state.store.get_published(&id).await?))
}

/// `POST /api/submissions`
///
/// Values for keys the form does not define are ignored. Validation
/// failures answer `400` with per-field messages and store nothing.
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmissionRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(form_id), Some(data)) = (body.form_id.filter(|id| !id.is_empty()), body.data) else {
        return Err(
            FormcraftError::BadRequest("Missing formId or submission data".to_string()).into(),
        );
    };

    let published = state.store.get_published(&form_id).await?;
    let mut session = FormSession::from_entries(&form_id, &published.name, &published.json.entries)?;
    for (key, value) in data {
        if session.schema().rule(&key).is_some() {
            session.set_value(&key, value)?;
        } else {
            tracing::debug!(form_id = %form_id, key = %key, "ignoring value for unknown field");
        }
    }

    match session.submit(&state.store).await {
        SubmitOutcome::Accepted(ack) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "Submission saved successfully",
                "id": ack.id,
                "submittedAt": ack.submitted_at,
            })),
        )),
        SubmitOutcome::Rejected(errors) => Err(FormcraftError::ValidationFailed(errors).into()),
        SubmitOutcome::Failed(err) => Err(err.into()),
    }
}
