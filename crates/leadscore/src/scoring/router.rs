use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{Activity, ContactId};
use super::engine::{ScoringEngine, ScoringError};
use super::store::{ContactStore, RecencyCache};

/// Router builder exposing HTTP endpoints for activity scoring.
pub fn scoring_router<S, C>(engine: Arc<ScoringEngine<S, C>>) -> Router
where
    S: ContactStore + 'static,
    C: RecencyCache + 'static,
{
    Router::new()
        .route("/api/v1/scoring/activities", post(process_handler::<S, C>))
        .route(
            "/api/v1/scoring/activities/batch",
            post(batch_handler::<S, C>),
        )
        .route(
            "/api/v1/scoring/contacts/:contact_id",
            get(contact_handler::<S, C>),
        )
        .with_state(engine)
}

pub(crate) async fn process_handler<S, C>(
    State(engine): State<Arc<ScoringEngine<S, C>>>,
    axum::Json(activity): axum::Json<Activity>,
) -> Response
where
    S: ContactStore + 'static,
    C: RecencyCache + 'static,
{
    let result = engine.process_activity(activity).await;
    let status = match &result.outcome {
        Ok(_) => StatusCode::OK,
        Err(ScoringError::ContactNotFound) => StatusCode::NOT_FOUND,
        Err(ScoringError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(result.view())).into_response()
}

pub(crate) async fn batch_handler<S, C>(
    State(engine): State<Arc<ScoringEngine<S, C>>>,
    axum::Json(activities): axum::Json<Vec<Activity>>,
) -> Response
where
    S: ContactStore + 'static,
    C: RecencyCache + 'static,
{
    let results = engine.process_batch(activities).await;
    let views: Vec<_> = results.iter().map(|result| result.view()).collect();
    (StatusCode::OK, axum::Json(views)).into_response()
}

pub(crate) async fn contact_handler<S, C>(
    State(engine): State<Arc<ScoringEngine<S, C>>>,
    Path(contact_id): Path<String>,
) -> Response
where
    S: ContactStore + 'static,
    C: RecencyCache + 'static,
{
    let id = ContactId(contact_id);
    match engine.contact_snapshot(&id).await {
        Ok(Some(view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Ok(None) => {
            let payload = json!({
                "contact_id": id.0,
                "error": "contact not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
