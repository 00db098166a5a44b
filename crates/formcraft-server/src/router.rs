//! Router assembly and the HTTP server loop.

use std::sync::Arc;

use axum::body::Body;
use axum::routing::{get, post};
use axum::Router;
use formcraft_core::logging::request_span;
use formcraft_core::{FormcraftError, FormcraftResult};
use http::Request;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{api, pages};

/// Builds the application router.
///
/// Routes:
/// - `GET /health` - Liveness
/// - `GET /api/forms` - The caller's forms
/// - `POST /api/forms` - Create a form
/// - `GET /api/forms/{id}` - Read one of the caller's forms
/// - `PUT /api/forms/{id}` - Update name, fields or published flag
/// - `DELETE /api/forms/{id}` - Delete a form and its submissions
/// - `GET /api/forms/{id}/submissions` - A form's submissions
/// - `GET /api/public/forms/{id}` - A published form's name and fields
/// - `POST /api/submissions` - Submit values to a published form
/// - `GET /forms/{id}` - The rendered public form
/// - `POST /forms/{id}` - Submit the rendered form
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    Router::new()
        .route("/health", get(api::health))
        .route("/api/forms", get(api::list_forms).post(api::create_form))
        .route(
            "/api/forms/{id}",
            get(api::get_form).put(api::update_form).delete(api::delete_form),
        )
        .route("/api/forms/{id}/submissions", get(api::form_submissions))
        .route("/api/public/forms/{id}", get(api::public_form))
        .route("/api/submissions", post(api::create_submission))
        .route("/forms/{id}", get(pages::show_form).post(pages::submit_form))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let id = uuid::Uuid::new_v4().to_string();
            request_span(&id, request.method().as_str(), request.uri().path())
        }))
        .with_state(shared)
}

/// Serves the application on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> FormcraftResult<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        FormcraftError::ConfigurationError(format!("Failed to bind to {addr}: {e}"))
    })?;

    tracing::info!("formcraft listening on http://{addr}/");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
