use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use faqmatch_core::{Engine, EngineConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn tiny_app() -> Router {
    let corpus = vec![
        ("How do I return an item?", "Visit Returns page within 30 days."),
        ("What payment methods are accepted?", "We accept credit cards and PayPal."),
        ("How long does shipping take?", "Standard shipping takes 3-5 business days."),
    ];
    let engine = Engine::initialize(corpus, EngineConfig::default()).unwrap();
    faqmatch_server::build_app(Arc::new(engine), Duration::from_secs(5))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn answer_returns_best_match() {
    let (status, json) = get(tiny_app(), "/answer?q=How%20can%20I%20return%20a%20product%3F").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched_document_id"], 0);
    assert_eq!(json["answer"], "Visit Returns page within 30 days.");
    assert_eq!(json["matched_question"], "How do I return an item?");
    assert_eq!(json["accepted"], true);
    assert!(json["score"].as_f64().unwrap() > 0.1);
}

#[tokio::test]
async fn unmatched_question_is_rejected_not_an_error() {
    let (status, json) = get(tiny_app(), "/answer?q=xyz%20unrelated%20gibberish").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["answer"].is_null());
    assert!(json["matched_document_id"].is_null());
    assert_eq!(json["score"].as_f64().unwrap(), 0.0);
    assert_eq!(json["accepted"], false);
    assert_eq!(json["confidence"], "low");
}

#[tokio::test]
async fn post_answer_with_threshold() {
    let req = Request::post("/answer")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"question": "shipping", "threshold": 0.99}"#))
        .unwrap();
    let (status, json) = send(tiny_app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], false);
    assert!(json["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn negative_threshold_is_bad_request() {
    let (status, json) = get(tiny_app(), "/answer?q=shipping&threshold=-0.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("threshold"));
}

#[tokio::test]
async fn stats_questions_and_docs() {
    let (status, json) = get(tiny_app(), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_documents"], 3);
    assert!(json["vocabulary_size"].as_u64().unwrap() > 0);

    let (_, json) = get(tiny_app(), "/questions?limit=2").await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["questions"].as_array().unwrap().len(), 2);

    let (status, json) = get(tiny_app(), "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "We accept credit cards and PayPal.");

    let (status, _) = get(tiny_app(), "/doc/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    for uri in ["/answer", "/answer?q=ship&threshold=abc", "/doc/abc", "/questions?limit=many"] {
        let (status, json) = get(tiny_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert!(json["error"].is_string(), "uri {uri}: {json}");
    }

    let req = Request::post("/answer")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"threshold": 0.2}"#))
        .unwrap();
    let (status, json) = send(tiny_app(), req).await;
    assert!(status.is_client_error());
    assert!(json["error"].as_str().unwrap().contains("question"));
}
