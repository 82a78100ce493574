use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::factoring::router::{factoring_router, quote_handler, QuoteRequest};

fn router() -> axum::Router {
    let (orchestrator, _, _, _) = build_orchestrator(
        ScriptedRiskOracle::answering(Ok(approve(2.4))).for_buyer(103, Ok(decline())),
        ScriptedScoringOracle::answering(Ok(judged_score(780))),
        workflow_config(),
    );
    factoring_router(Arc::new(orchestrator))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
        .expect("request builds")
}

#[tokio::test]
async fn analyze_route_returns_completed_result() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/agents/analyze",
            json!({"invoice_id": 1, "buyer_id": 101, "merchant_id": 1}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "completed");
    assert_eq!(payload["offer"]["net_amount"], 66_630.82);
    assert_eq!(payload["final_decision"]["approved"], true);
}

#[tokio::test]
async fn analyze_route_reports_rejections_and_failures_as_results() {
    let router = router();

    let rejected = router
        .clone()
        .oneshot(post_json(
            "/api/v1/agents/analyze",
            json!({"invoice_id": 3, "buyer_id": 103, "merchant_id": 1}),
        ))
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::OK);
    let payload = read_json_body(rejected).await;
    assert_eq!(payload["status"], "rejected");
    assert!(payload["offer"].is_null());

    let failed = router
        .oneshot(post_json(
            "/api/v1/agents/analyze",
            json!({"invoice_id": 77, "buyer_id": 101, "merchant_id": 1, "tenor_days": 45}),
        ))
        .await
        .expect("route executes");
    assert_eq!(failed.status(), StatusCode::OK);
    let payload = read_json_body(failed).await;
    assert_eq!(payload["status"], "failed");
    assert_eq!(payload["reason"], "invoice 77 not found");
    assert_eq!(payload["failed_stage"], "started");
}

#[tokio::test]
async fn quote_route_prices_with_defaults() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/offers/quote",
            json!({"invoice_amount": 75000.0, "credit_score": 780}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["tenor_days"], 30);
    assert_eq!(payload["discount"], 194.18);
    assert_eq!(payload["breakdown"]["effective_rate"], 3.5);
}

#[tokio::test]
async fn quote_handler_rejects_invalid_input() {
    let (orchestrator, _, _, _) = build_orchestrator(
        ScriptedRiskOracle::answering(Ok(approve(2.4))),
        ScriptedScoringOracle::answering(Ok(judged_score(780))),
        workflow_config(),
    );
    let orchestrator = Arc::new(orchestrator);

    for quote in [
        QuoteRequest {
            invoice_amount: -10.0,
            credit_score: 700,
            tenor_days: None,
            base_rate: None,
        },
        QuoteRequest {
            invoice_amount: 10_000.0,
            credit_score: 1200,
            tenor_days: None,
            base_rate: None,
        },
        QuoteRequest {
            invoice_amount: 10_000.0,
            credit_score: 700,
            tenor_days: Some(0),
            base_rate: None,
        },
    ] {
        let response = quote_handler::<
            MemoryFactsRepository,
            ScriptedRiskOracle,
            ScriptedScoringOracle,
        >(State(orchestrator.clone()), axum::Json(quote))
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert!(payload.get("error").is_some());
    }
}

#[tokio::test]
async fn pipeline_health_lists_stages() {
    let response = router()
        .oneshot(
            Request::get("/api/v1/agents/health")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["stages"],
        json!(["started", "risk_assessed", "scored", "priced"])
    );
}
