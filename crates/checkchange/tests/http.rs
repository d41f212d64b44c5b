use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use checkchange::handlers::{AppState, router};
use checkchange::LexiconPipeline;
use checkchange_lexicon::LoadMode;

fn make_state() -> AppState {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("lexicon");
    let nlp = LexiconPipeline::load(dir, LoadMode::Owned).unwrap();
    AppState {
        nlp: Arc::new(nlp),
        max_items: 2,
    }
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/reconcile")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reconcile_returns_new_order() {
    let app = router(make_state());
    let response = app
        .oneshot(post_json(json!({
            "order": ["2 large pepperoni pizzas", "3 sugar free sodas"],
            "request": "Make one of the pizzas small",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(
        body["order"],
        json!([
            "1 large pepperoni pizzas",
            "3 sugar free sodas",
            "1 small pizzas"
        ])
    );
    assert_eq!(body["selected"], 0);
    assert_eq!(body["quantity"], 1);
    assert_eq!(body["total_replace"], false);
}

#[tokio::test]
async fn reconcile_rejects_blank_request() {
    let app = router(make_state());
    let response = app
        .oneshot(post_json(json!({
            "order": ["2 large pepperoni pizzas"],
            "request": "   ",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("request"));
}

#[tokio::test]
async fn reconcile_rejects_oversized_order() {
    let app = router(make_state());
    let response = app
        .oneshot(post_json(json!({
            "order": ["1 pizza", "1 soda", "1 wine"],
            "request": "Make the pizza small",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reconcile_reports_unanalyzable_text() {
    let app = router(make_state());
    let response = app
        .clone()
        .oneshot(post_json(json!({
            "order": ["2 large pepperoni pizzas"],
            "request": "Make",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(post_json(json!({
            "order": [],
            "request": "Make it small",
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert!(body["error"].is_string());
}
