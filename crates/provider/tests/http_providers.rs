//! Provider round trips against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use serial_test::serial;
use skillgap_intelligence::{
    compute_gaps, fallback_coverage, fallback_demand, fallback_trends, NarrationSource, Narrator,
    ProviderError, TextProvider,
};
use skillgap_provider::{provider_from_env, ClaudeProvider, OpenAiProvider, ProviderConfig};
use skillgap_test_utils::set_env_var;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPLY: &str =
    "Insights:\n- Cloud skills are thin\n\nRecommendations:\n- Hire a Kubernetes lead";

fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        api_key: "test-key".into(),
        base_url: format!("{}/v1/", server.uri()).parse().unwrap(),
        model: "test-model".into(),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn given_claude_reply_when_generating_then_text_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({"model": "test-model", "max_tokens": 256})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": REPLY}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ClaudeProvider::with_config(config(&server)).unwrap();
    let text = provider.generate("prompt", 256).await.unwrap();
    assert_eq!(text, REPLY);
}

#[tokio::test]
async fn given_claude_error_status_when_generating_then_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let provider = ClaudeProvider::with_config(config(&server)).unwrap();
    let err = provider.generate("prompt", 64).await.unwrap_err();
    match err {
        ProviderError::Request(msg) => assert!(msg.contains("invalid x-api-key")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn given_openai_reply_when_generating_then_bearer_auth_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": REPLY}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_config(config(&server)).unwrap();
    assert_eq!(provider.generate("prompt", 64).await.unwrap(), REPLY);
}

#[tokio::test]
async fn given_non_json_body_when_generating_then_unparseable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_config(config(&server)).unwrap();
    let err = provider.generate("prompt", 64).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unparseable(_)));
}

#[tokio::test]
async fn given_provider_reply_when_narrating_then_provider_source_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": REPLY}]
        })))
        .mount(&server)
        .await;

    let provider = ClaudeProvider::with_config(config(&server)).unwrap();
    let narrator = Narrator::new(Some(Arc::new(provider)));
    let (coverage, demand, trends) = (fallback_coverage(), fallback_demand(), fallback_trends());
    let analysis = compute_gaps(&coverage, &demand, &trends);

    let narration = narrator
        .narrate(&coverage, &demand, &trends, &analysis, true)
        .await;
    assert_eq!(narration.source, NarrationSource::Provider);
    assert_eq!(narration.insights, vec!["Cloud skills are thin"]);
}

#[tokio::test]
async fn given_server_error_when_narrating_then_rules_take_over() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_config(config(&server)).unwrap();
    let narrator = Narrator::new(Some(Arc::new(provider)));
    let (coverage, demand, trends) = (fallback_coverage(), fallback_demand(), fallback_trends());
    let analysis = compute_gaps(&coverage, &demand, &trends);

    let narration = narrator
        .narrate(&coverage, &demand, &trends, &analysis, true)
        .await;
    assert_eq!(narration.source, NarrationSource::RuleBased);
    assert!(!narration.insights.is_empty());
}

#[test]
#[serial]
fn given_no_keys_when_building_from_env_then_no_provider() {
    let _kind = set_env_var("SKILLGAP_PROVIDER", None);
    let _claude = set_env_var("SKILLGAP_CLAUDE_API_KEY", None);
    let _openai = set_env_var("SKILLGAP_OPENAI_API_KEY", None);
    assert!(provider_from_env().unwrap().is_none());
}

#[test]
#[serial]
fn given_provider_none_when_keys_exist_then_no_provider() {
    let _kind = set_env_var("SKILLGAP_PROVIDER", Some("none"));
    let _claude = set_env_var("SKILLGAP_CLAUDE_API_KEY", Some("k"));
    assert!(provider_from_env().unwrap().is_none());
}

#[test]
#[serial]
fn given_only_openai_key_when_building_from_env_then_openai_is_chosen() {
    let _kind = set_env_var("SKILLGAP_PROVIDER", None);
    let _claude = set_env_var("SKILLGAP_CLAUDE_API_KEY", None);
    let _openai = set_env_var("SKILLGAP_OPENAI_API_KEY", Some("k"));
    let provider = provider_from_env().unwrap().unwrap();
    assert_eq!(provider.name(), "openai");
}

#[test]
#[serial]
fn given_explicit_claude_without_key_when_building_from_env_then_error() {
    let _kind = set_env_var("SKILLGAP_PROVIDER", Some("claude"));
    let _claude = set_env_var("SKILLGAP_CLAUDE_API_KEY", None);
    let err = provider_from_env().err().unwrap().to_string();
    assert!(err.contains("SKILLGAP_CLAUDE_API_KEY"));
}
