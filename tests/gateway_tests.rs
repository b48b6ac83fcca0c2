// End-to-end gateway tests against a stubbed upstream

use gemgate::cache::ResponseCache;
use gemgate::config::GeminiConfig;
use gemgate::error::GatewayError;
use gemgate::faultlog::FaultLog;
use gemgate::gemini::GeminiClient;
use gemgate::limiter::RateLimiter;
use gemgate::tasks::TaskGateway;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const MODEL_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn build_gateway(
    base_url: &str,
    api_key: Option<&str>,
    error_log: &Path,
    max_requests: usize,
) -> TaskGateway {
    let config = GeminiConfig {
        api_key: api_key.map(str::to_string),
        api_base_url: base_url.to_string(),
        model: "models/gemini-2.5-flash".to_string(),
        timeout_seconds: 5,
        error_log_path: error_log.to_string_lossy().to_string(),
    };

    let fault_log = Arc::new(FaultLog::new(error_log));
    let client = Arc::new(GeminiClient::new(&config, fault_log.clone()).unwrap());
    let limiter = RateLimiter::new(Duration::from_secs(60), max_requests);
    let cache = ResponseCache::new(64);

    TaskGateway::new(client, cache, limiter, fault_log)
}

fn candidates_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [
            {"content": {"parts": [{"text": text}], "role": "model"}}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn identical_requests_hit_upstream_once() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let mock = server
        .mock("POST", MODEL_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidates_body("A good team communicates openly."))
        .expect(1)
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &dir.path().join("err.log"), 10);

    let first = gateway
        .generate("caller-1", "Generate a question about teamwork")
        .await
        .unwrap();
    let second = gateway
        .generate("caller-1", "Generate a question about teamwork")
        .await
        .unwrap();

    assert_eq!(first, "A good team communicates openly.");
    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn different_prompts_each_dispatch() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let mock = server
        .mock("POST", MODEL_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidates_body("reply"))
        .expect(2)
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &dir.path().join("err.log"), 10);

    gateway.generate("caller", "first prompt").await.unwrap();
    gateway.generate("caller", "second prompt").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn missing_credential_never_touches_the_network() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("err.log");

    let mock = server
        .mock("POST", MODEL_PATH)
        .expect(0)
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), None, &log_path, 10);

    let err = gateway.generate("caller", "hello").await.unwrap_err();
    assert!(matches!(err, GatewayError::MissingCredential));
    mock.assert_async().await;

    // The failure still lands in the error log.
    let log = tokio::fs::read_to_string(&log_path).await.unwrap();
    assert!(log.contains("API key is missing"));
}

#[tokio::test]
async fn failures_are_not_cached() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("err.log");

    let mock = server
        .mock("POST", MODEL_PATH)
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(2)
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &log_path, 10);

    for _ in 0..2 {
        let err = gateway.generate("caller", "hello").await.unwrap_err();
        match err {
            GatewayError::UpstreamStatus { code, body } => {
                assert_eq!(code, 503);
                assert!(body.contains("upstream unavailable"));
            }
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    }

    // Both calls attempted a dispatch; the cache stayed empty.
    mock.assert_async().await;

    let log = tokio::fs::read_to_string(&log_path).await.unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.contains("status=503"));
}

#[tokio::test]
async fn rate_limit_rejection_precedes_cache_and_dispatch() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("err.log");

    let mock = server
        .mock("POST", MODEL_PATH)
        .expect(0)
        .create_async()
        .await;

    // A zero budget rejects every attempt.
    let gateway = build_gateway(&server.url(), Some("test-key"), &log_path, 0);

    let err = gateway.generate("caller", "hello").await.unwrap_err();
    assert!(matches!(err, GatewayError::RateLimited));
    mock.assert_async().await;

    // Rate limiting is an expected control condition, never a logged fault.
    assert!(!log_path.exists());
}

#[tokio::test]
async fn sentiment_task_collapses_to_canonical_label() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("POST", MODEL_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidates_body("NEGATIVE sentiment\nbecause of the wording"))
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &dir.path().join("err.log"), 10);

    let sentiment = gateway
        .classify_sentiment("caller", "This was a terrible experience")
        .await
        .unwrap();
    assert_eq!(sentiment, "Negative");
}

#[tokio::test]
async fn question_generation_parses_numbered_list() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("POST", MODEL_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidates_body(
            "1. Why do you want to visit?\n2. Who is funding your trip?",
        ))
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &dir.path().join("err.log"), 10);

    let set = gateway
        .generate_questions("caller", "travel purpose", "medium", 2)
        .await
        .unwrap();
    assert_eq!(
        set.questions,
        vec!["Why do you want to visit?", "Who is funding your trip?"]
    );
    assert!(set.raw_text.contains("funding"));
}

#[tokio::test]
async fn unexpected_shape_degrades_to_serialized_body() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("err.log");

    server
        .mock("POST", MODEL_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unrecognized":{"envelope":true}}"#)
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &log_path, 10);

    // The caller still gets text, the raw body serialized back.
    let text = gateway.generate("caller", "hello").await.unwrap();
    assert!(text.contains("unrecognized"));

    // And the soft failure is recorded for alerting.
    let log = tokio::fs::read_to_string(&log_path).await.unwrap();
    assert!(log.contains("Unexpected response format"));
}

#[tokio::test]
async fn summarize_wraps_input_in_instruction() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let mock = server
        .mock("POST", MODEL_PATH)
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"contents":[{"parts":[{"text":"Summarize the following feedback into concise bullet points:\n\nlong feedback text"}]}]}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidates_body("- point one\n- point two"))
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &dir.path().join("err.log"), 10);

    let summary = gateway.summarize("caller", "long feedback text").await.unwrap();
    assert_eq!(summary, "- point one\n- point two");
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limit_budget_applies_per_caller() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("POST", MODEL_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidates_body("reply"))
        .create_async()
        .await;

    let gateway = build_gateway(&server.url(), Some("test-key"), &dir.path().join("err.log"), 1);

    assert!(gateway.generate("alice", "hello").await.is_ok());
    let err = gateway.generate("alice", "hello").await.unwrap_err();
    assert!(matches!(err, GatewayError::RateLimited));

    // A different caller still has budget; the response comes from cache.
    assert!(gateway.generate("bob", "hello").await.is_ok());
}
