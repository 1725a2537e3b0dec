use super::AppState;
use crate::domain::payment::PaymentRequest;
use crate::domain::summary::{PaymentsSummary, TimeRange};
use crate::error::RouterError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

/// Accepts a payment and acknowledges it before routing starts.
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<StatusCode, RouterError> {
    let Json(request) = payload.map_err(|e| RouterError::Validation(e.body_text()))?;
    state.engine.submit(request);
    Ok(StatusCode::OK)
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn payments_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<PaymentsSummary>, RouterError> {
    let range = TimeRange::parse(params.from.as_deref(), params.to.as_deref())?;
    let summary = state.summaries.summarize(&range).await?;
    Ok(Json(summary.rounded()))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
