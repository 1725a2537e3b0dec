use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream answered with status {status}")]
    Rejected { status: u16 },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Peer summary timed out")]
    PeerTimeout,
    #[error("Gave up after {rounds} routing rounds")]
    RetriesExhausted { rounds: u32 },
    #[error("Summary total overflowed")]
    SummaryOverflow,
}

pub type Result<T> = std::result::Result<T, RouterError>;

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouterError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &self {
            RouterError::Validation(reason) => reason.clone(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
