// tests/metrics.rs
//
// One test per binary: the Prometheus recorder is process-global.
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use dialog_news_enricher::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_reports_turn_counters() {
    std::env::set_var("SERVICE_MODE", "mock");
    std::env::set_var("RETRIEVE_ARTICLES", "1");
    std::env::remove_var("CHAT_LOG_ENABLED");

    let metrics = Metrics::init().expect("install recorder");
    let app = dialog_news_enricher::app()
        .expect("app() should build Router in tests")
        .merge(metrics.router());

    for text in ["Tell me about Hillary Clinton", "and Syria?"] {
        let payload = json!({ "input": { "text": text }, "context": { "conversation_id": "m1" } });
        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/message")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in ["turns_total 2", "articles_matched_total 1"] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
