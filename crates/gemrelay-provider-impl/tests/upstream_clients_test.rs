//! HTTP-level tests for the provider clients and the challenge verifier,
//! run against wiremock servers.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gemrelay_provider_core::{
    ChallengeVerifier, Credential, ErrorKind, FallbackClient, GenerationRequest, ModelTier,
    PrimaryClient, ProviderSource,
};
use gemrelay_provider_impl::{
    build_client, AistudioClient, HttpClientConfig, SiliconFlowClient, TurnstileVerifier,
};

const PRIMARY_PATH: &str = "/v1beta/models/gemini-2.5-flash-lite:generateContent";
const REDUCED_PATH: &str = "/v1beta/models/gemini-2.0-flash-lite:generateContent";

fn http_client(timeout: Duration) -> wreq::Client {
    build_client(&HttpClientConfig {
        timeout,
        proxy: None,
    })
    .expect("client build")
}

fn aistudio(server: &MockServer) -> AistudioClient {
    AistudioClient::new(http_client(Duration::from_secs(5))).with_base_url(server.uri())
}

fn primary_request(tier: ModelTier) -> GenerationRequest {
    GenerationRequest::new("describe alice", Credential::new("AIza-test-key"), tier)
}

fn gemini_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

// =============================================================================
// Primary provider
// =============================================================================

#[tokio::test]
async fn primary_success_returns_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .and(header("x-goog-api-key", "AIza-test-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "describe alice"}]}],
            "generationConfig": {"topK": 40, "maxOutputTokens": 300}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("  a cheerful name \n")))
        .expect(1)
        .mount(&server)
        .await;

    let generation = aistudio(&server)
        .generate(primary_request(ModelTier::Primary))
        .await
        .expect("generation should succeed");

    assert_eq!(generation.text, "a cheerful name");
    assert_eq!(generation.model, "gemini-2.5-flash-lite");
    assert_eq!(generation.source, ProviderSource::Gemini);
}

#[tokio::test]
async fn primary_reduced_tier_uses_reduced_model_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(REDUCED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let generation = aistudio(&server)
        .generate(primary_request(ModelTier::PrimaryReduced))
        .await
        .expect("generation should succeed");
    assert_eq!(generation.model, "gemini-2.0-flash-lite");
}

#[tokio::test]
async fn primary_location_error_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "User location is not supported for the API use.",
                "status": "FAILED_PRECONDITION"
            }
        })))
        .mount(&server)
        .await;

    let failure = aistudio(&server)
        .generate(primary_request(ModelTier::Primary))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::LocationUnsupported);
    assert_eq!(failure.status, Some(400));
}

#[tokio::test]
async fn primary_status_codes_map_to_kinds() {
    let cases = [
        (400, ErrorKind::BadRequest),
        (401, ErrorKind::InvalidCredential),
        (403, ErrorKind::AccessDenied),
        (429, ErrorKind::RateLimited),
        (500, ErrorKind::ServerError),
        (404, ErrorKind::Unknown),
    ];
    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PRIMARY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": "nope"}
            })))
            .mount(&server)
            .await;

        let failure = aistudio(&server)
            .generate(primary_request(ModelTier::Primary))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, expected, "status {status}");
        assert_eq!(failure.message, "nope");
    }
}

#[tokio::test]
async fn primary_missing_candidates_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let failure = aistudio(&server)
        .generate(primary_request(ModelTier::Primary))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn primary_non_json_success_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let failure = aistudio(&server)
        .generate(primary_request(ModelTier::Primary))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn primary_blank_text_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("   ")))
        .mount(&server)
        .await;

    let failure = aistudio(&server)
        .generate(primary_request(ModelTier::Primary))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::EmptyResponse);
}

#[tokio::test]
async fn primary_timeout_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRIMARY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = AistudioClient::new(http_client(Duration::from_millis(200)))
        .with_base_url(server.uri());
    let failure = client
        .generate(primary_request(ModelTier::Primary))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::ServerError);
    assert!(failure.kind.degrades_tier());
}

// =============================================================================
// Fallback provider
// =============================================================================

fn siliconflow(server: &MockServer) -> SiliconFlowClient {
    SiliconFlowClient::new(http_client(Duration::from_secs(5))).with_base_url(server.uri())
}

#[tokio::test]
async fn fallback_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-backup"))
        .and(body_partial_json(json!({
            "model": "deepseek-ai/DeepSeek-V3",
            "messages": [{"role": "user", "content": "describe alice"}],
            "max_tokens": 300
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": " backup text "}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generation = siliconflow(&server)
        .generate("describe alice", &Credential::new("sk-backup"))
        .await
        .expect("fallback should succeed");
    assert_eq!(generation.text, "backup text");
    assert_eq!(generation.source, ProviderSource::Backup);
    assert_eq!(generation.key_index, None);
}

#[tokio::test]
async fn fallback_never_reports_location_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "User location is not supported"}
        })))
        .mount(&server)
        .await;

    let failure = siliconflow(&server)
        .generate("p", &Credential::new("sk-backup"))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::BadRequest);
}

#[tokio::test]
async fn fallback_missing_message_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let failure = siliconflow(&server)
        .generate("p", &Credential::new("sk-backup"))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn fallback_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many"))
        .mount(&server)
        .await;

    let failure = siliconflow(&server)
        .generate("p", &Credential::new("sk-backup"))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::RateLimited);
}

// =============================================================================
// Challenge verifier
// =============================================================================

fn verifier(server: &MockServer) -> TurnstileVerifier {
    TurnstileVerifier::new(http_client(Duration::from_secs(5)))
        .with_verify_url(format!("{}/turnstile/v0/siteverify", server.uri()))
}

#[tokio::test]
async fn verifier_accepts_successful_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/turnstile/v0/siteverify"))
        .and(body_string_contains("secret=s3cret"))
        .and(body_string_contains("response=tok"))
        .and(body_string_contains("remoteip=203.0.113.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(verifier(&server).verify("s3cret", "tok", Some("203.0.113.9")).await);
}

#[tokio::test]
async fn verifier_rejects_failed_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/turnstile/v0/siteverify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error-codes": ["invalid-input-response"]
        })))
        .mount(&server)
        .await;

    assert!(!verifier(&server).verify("s3cret", "bad", None).await);
}

#[tokio::test]
async fn verifier_treats_garbage_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/turnstile/v0/siteverify"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    assert!(!verifier(&server).verify("s3cret", "tok", None).await);
}
