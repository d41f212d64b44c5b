use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use checkchange_types::NlpAnnotationService;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::analyzer::CheckError;
use crate::reconcile::OrderReconciler;

#[derive(Clone)]
pub struct AppState {
    pub nlp: Arc<dyn NlpAnnotationService>,
    pub max_items: usize,
}

#[derive(Deserialize)]
pub struct ReconcileRequest {
    pub order: Vec<String>,
    pub request: String,
}

#[derive(Serialize)]
pub struct ReconcileResponse {
    order: Vec<String>,
    selected: usize,
    quantity: u64,
    total_replace: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/reconcile", post(reconcile))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn reconcile(
    State(state): State<AppState>,
    Json(body): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let request = body.request.trim();
    if request.is_empty() {
        return Err(ApiError::bad_request("request is required"));
    }
    if body.order.len() > state.max_items {
        return Err(ApiError::bad_request(format!(
            "order must have at most {} items",
            state.max_items
        )));
    }

    let outcome = OrderReconciler::new(state.nlp.as_ref())
        .reconcile(&body.order, request)
        .map_err(|err| {
            warn!("rejected change request {request:?}: {err}");
            ApiError::from(err)
        })?;

    Ok(Json(ReconcileResponse {
        order: outcome.lines,
        selected: outcome.selected,
        quantity: outcome.quantity,
        total_replace: outcome.total_replace,
    }))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Unprocessable(#[from] CheckError),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
