//! Smart-search adapter against a mocked chat-completion API.

use patriot_pathways::config::SearchConfig;
use patriot_pathways::smart_search::{ChatClient, SmartSearch, NOT_CONFIGURED_MESSAGE, SYSTEM_PROMPT};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_config(api_base: &str) -> SearchConfig {
    let config_content = format!(
        r#"model = "gpt-5-nano"
api_base = "{}/v1"
"#,
        api_base
    );
    toml::from_str(&config_content).unwrap()
}

fn ready(server: &MockServer) -> SmartSearch {
    let client = ChatClient::new(&search_config(&server.uri()), "sk-test").unwrap();
    SmartSearch::ready(client)
}

#[tokio::test]
async fn test_unconfigured_returns_fixed_message() {
    let search = SmartSearch::unconfigured("no key");
    assert!(!search.is_configured());
    assert_eq!(search.unconfigured_reason(), Some("no key"));
    assert_eq!(search.search("housing help in Ohio").await, NOT_CONFIGURED_MESSAGE);
}

#[tokio::test]
async fn test_missing_env_key_is_unconfigured() {
    let server = MockServer::start().await;
    let mut cfg = search_config(&server.uri());
    cfg.api_key_env = "PATHWAYS_TEST_KEY_THAT_IS_NEVER_SET".to_string();

    let search = SmartSearch::from_config(&cfg);
    assert!(!search.is_configured());
    assert_eq!(search.search("anything").await, NOT_CONFIGURED_MESSAGE);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_env_key_makes_adapter_ready() {
    let server = MockServer::start().await;
    let mut cfg = search_config(&server.uri());
    cfg.api_key_env = "PATHWAYS_TEST_KEY_READY".to_string();
    std::env::set_var("PATHWAYS_TEST_KEY_READY", "sk-from-env");

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-from-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "ok" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = SmartSearch::from_config(&cfg);
    assert!(search.is_configured());
    assert_eq!(search.search("hello").await, "ok");
}

#[tokio::test]
async fn test_success_returns_first_choice_verbatim() {
    let server = MockServer::start().await;
    let answer = "## Job Centers\n\n- **Ohio Means Jobs** (614-555-0100)";

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-5-nano",
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": "job centers in Ohio" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": answer } },
                { "index": 1, "message": { "role": "assistant", "content": "second" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = ready(&server).search("job centers in Ohio").await;
    assert_eq!(text, answer);
}

#[tokio::test]
async fn test_provider_error_is_converted_to_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let text = ready(&server).search("clinics").await;
    assert!(text.starts_with("Sorry, there was an error contacting the AI service."));
    assert!(text.contains("500"));
    assert!(text.contains("upstream exploded"));
}

#[tokio::test]
async fn test_no_retry_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let text = ready(&server).search("clinics").await;
    assert!(text.contains("slow down"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_choices_is_an_error_not_empty_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let text = ready(&server).search("clinics").await;
    assert!(!text.is_empty());
    assert!(text.contains("no choices"));
}

#[tokio::test]
async fn test_null_content_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let text = ready(&server).search("clinics").await;
    assert!(text.starts_with("Sorry, there was an error contacting the AI service."));
}

#[tokio::test]
async fn test_transport_error_is_converted_to_text() {
    // Nothing listens on port 9
    let client = ChatClient::new(&search_config("http://127.0.0.1:9"), "sk-test").unwrap();
    let text = SmartSearch::ready(client).search("clinics").await;
    assert!(text.starts_with("Sorry, there was an error contacting the AI service."));
    assert!(text.contains("Error:"));
}
