use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::oracle::{RiskOracleClient, ScoringOracleClient};
use super::orchestrator::{WorkflowOrchestrator, WorkflowRequest, WorkflowStage};
use super::pricing::OfferRequest;
use super::repository::FactsRepository;

/// Body of a standalone offer quote.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub invoice_amount: f64,
    pub credit_score: u32,
    #[serde(default)]
    pub tenor_days: Option<u32>,
    #[serde(default)]
    pub base_rate: Option<f64>,
}

/// Router builder exposing the workflow entry point and offer quotes.
pub fn factoring_router<F, R, S>(orchestrator: Arc<WorkflowOrchestrator<F, R, S>>) -> Router
where
    F: FactsRepository + 'static,
    R: RiskOracleClient + 'static,
    S: ScoringOracleClient + 'static,
{
    Router::new()
        .route("/api/v1/agents/analyze", post(analyze_handler::<F, R, S>))
        .route("/api/v1/agents/health", get(pipeline_health_handler))
        .route("/api/v1/offers/quote", post(quote_handler::<F, R, S>))
        .with_state(orchestrator)
}

/// Every run produces a result record, so the status code stays 200 and callers
/// branch on `status`.
pub(crate) async fn analyze_handler<F, R, S>(
    State(orchestrator): State<Arc<WorkflowOrchestrator<F, R, S>>>,
    axum::Json(request): axum::Json<WorkflowRequest>,
) -> Response
where
    F: FactsRepository + 'static,
    R: RiskOracleClient + 'static,
    S: ScoringOracleClient + 'static,
{
    let result = orchestrator.run_workflow(request).await;
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn quote_handler<F, R, S>(
    State(orchestrator): State<Arc<WorkflowOrchestrator<F, R, S>>>,
    axum::Json(quote): axum::Json<QuoteRequest>,
) -> Response
where
    F: FactsRepository + 'static,
    R: RiskOracleClient + 'static,
    S: ScoringOracleClient + 'static,
{
    let config = orchestrator.config();
    let request = OfferRequest::new(quote.invoice_amount, quote.credit_score)
        .with_tenor(quote.tenor_days.unwrap_or(config.default_tenor_days))
        .with_base_rate(quote.base_rate.unwrap_or(config.base_rate));

    match orchestrator.pricing().calculate_offer(request) {
        Ok(offer) => (StatusCode::OK, axum::Json(offer)).into_response(),
        Err(error) if error.is_invalid_input() => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(error) => {
            tracing::error!(error = %error, "offer pricing invariant violated");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn pipeline_health_handler() -> Response {
    let stages: Vec<&'static str> = WorkflowStage::PIPELINE
        .iter()
        .map(|stage| stage.label())
        .collect();
    let payload = json!({
        "status": "healthy",
        "stages": stages,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
