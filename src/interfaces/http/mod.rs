//! HTTP surface: a thin axum adapter over the engine and summary service.

pub mod handlers;

use crate::application::engine::PaymentEngine;
use crate::application::summary::SummaryService;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PaymentEngine>,
    pub summaries: Arc<SummaryService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/payments", post(handlers::create_payment))
        .route("/payments-summary", get(handlers::payments_summary))
        .with_state(state)
}
