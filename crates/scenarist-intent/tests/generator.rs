//! End-to-end tests for the generation coordinator.
//!
//! Remote behaviour is exercised against a fake Anthropic endpoint: a real
//! Axum server bound to an OS-assigned port on 127.0.0.1, so the whole
//! request/response cycle (headers, JSON body, timeouts) runs for real.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use scenarist_agent::{LlmClient, LlmClientConfig};
use scenarist_intent::{GenerationSource, GeneratorConfig, IntentError, ScenarioGenerator};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Bind to 127.0.0.1:0, serve `app`, return the base URL.
async fn start_fake_anthropic(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to port 0");
    let addr: SocketAddr = listener.local_addr().expect("get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    format!("http://127.0.0.1:{}", addr.port())
}

/// A fake that answers every request with `text` as the model reply.
fn replying_with(text: &'static str) -> Router {
    Router::new().route(
        "/v1/messages",
        post(move || async move {
            axum::Json(json!({
                "content": [{"type": "text", "text": text}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 900, "output_tokens": 300}
            }))
        }),
    )
}

fn remote_generator(base_url: &str, config: GeneratorConfig) -> ScenarioGenerator {
    remote_generator_with_timeout(base_url, config, Duration::from_secs(5))
}

fn remote_generator_with_timeout(
    base_url: &str,
    config: GeneratorConfig,
    timeout: Duration,
) -> ScenarioGenerator {
    remote_generator_with_client(
        LlmClientConfig::anthropic("test-key", "test-model")
            .with_base_url(base_url)
            .with_timeout(timeout),
        config,
    )
}

fn remote_generator_with_client(
    client: LlmClientConfig,
    config: GeneratorConfig,
) -> ScenarioGenerator {
    let llm = LlmClient::new(client).expect("client");
    ScenarioGenerator::with_llm(config, Arc::new(llm))
}

fn local_generator() -> ScenarioGenerator {
    ScenarioGenerator::new(GeneratorConfig::default())
}

const REMOTE_DOCUMENT: &str = r#"{
  "name": "Inbox triage",
  "description": "from the model",
  "flow": [
    {"id": 1, "module": "gmail:watchEmails", "version": 3, "parameters": {"filter": "is:unread"},
     "mapper": {}, "metadata": {"designer": {"x": 0, "y": 0}}},
    {"id": 2, "module": "anthropic:claude", "version": 1, "parameters": {},
     "mapper": {"prompt": "Summarise: {{1.text}}"}, "metadata": {"designer": {"x": 300, "y": 0}},
     "routes": []}
  ],
  "metadata": {"version": 1, "instant": false}
}"#;

// ── deterministic path ───────────────────────────────────────────────────────

#[tokio::test]
async fn french_mail_to_notion_prompt() {
    let doc = local_generator()
        .generate("surveille mes emails et crée des tâches dans Notion")
        .await
        .unwrap();

    let modules: Vec<&str> = doc["flow"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["module"].as_str())
        .collect();
    assert_eq!(
        modules,
        ["gmail:watchEmails", "openai:chat", "notion:createPage"]
    );

    let ai_mapper = serde_json::to_string(&doc["flow"][1]["mapper"]).unwrap();
    assert!(ai_mapper.contains("{{1.text}}"), "{ai_mapper}");
    assert_eq!(
        doc["flow"][2]["mapper"]["title"],
        "{{2.choices[0].message.content}}"
    );
}

#[tokio::test]
async fn empty_prompt_produces_no_document() {
    let err = local_generator().generate("").await.unwrap_err();
    assert!(matches!(err, IntentError::EmptyPrompt));
    assert_eq!(err.to_string(), "prompt is required");
}

#[tokio::test]
async fn unknown_services_use_webhook_and_mail_defaults() {
    let doc = local_generator()
        .generate("do something clever with my data")
        .await
        .unwrap();
    assert_eq!(doc["flow"][0]["module"], "webhook:customWebhook");
    assert_eq!(doc["flow"][2]["module"], "gmail:sendEmail");
}

#[tokio::test]
async fn serialized_document_has_platform_shape() {
    let doc = local_generator().generate_fallback("typeform to slack");
    let v: Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
    assert_eq!(v, local_generator().generate("typeform to slack").await.unwrap());

    assert_eq!(v["name"], "AI Generated Scenario");
    assert_eq!(v["metadata"]["version"], 1);
    assert_eq!(v["metadata"]["scenario"]["maxErrors"], 3);
    assert_eq!(v["metadata"]["scenario"]["autoCommit"], true);
    assert_eq!(v["flow"][1]["metadata"]["designer"]["x"], 300);
    assert_eq!(v["flow"][2]["mapper"]["text"], "{{2.choices[0].message.content}}");
}

// ── remote path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn network_error_yields_the_deterministic_document() {
    // Reserve a port, then close it so connections are refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let prompt = "new gmail messages to airtable";
    let remote = remote_generator(&format!("http://127.0.0.1:{port}"), GeneratorConfig::default());
    assert!(remote.remote_enabled());

    let generation = remote.generate_with_source(prompt).await.unwrap();
    assert_eq!(generation.source, GenerationSource::Fallback);
    assert_eq!(
        generation.scenario,
        serde_json::to_value(local_generator().generate_fallback(prompt)).unwrap()
    );
}

#[tokio::test]
async fn remote_document_is_returned() {
    let base = start_fake_anthropic(replying_with(REMOTE_DOCUMENT)).await;
    let generator = remote_generator(&base, GeneratorConfig::default());

    let generation = generator.generate_with_source("triage my inbox").await.unwrap();
    assert_eq!(generation.source, GenerationSource::Remote);

    let expected: Value = serde_json::from_str(REMOTE_DOCUMENT).unwrap();
    assert_eq!(generation.scenario, expected);
    assert_eq!(generation.scenario["flow"][1]["module"], "anthropic:claude");
    assert_eq!(generation.scenario["metadata"]["instant"], false);
    assert_eq!(generation.scenario["flow"][1]["routes"], json!([]));
}

#[tokio::test]
async fn sparse_remote_document_is_returned_as_written() {
    const SPARSE: &str = r#"{"name":"R","flow":[{"id":1,"module":"webhook:customWebhook","metadata":{"designer":{"x":0,"name":"Inbound"}}}],"metadata":{"scenario":{"roundtrips":1,"maxErrors":3}}}"#;
    let base = start_fake_anthropic(replying_with(SPARSE)).await;
    let expected: Value = serde_json::from_str(SPARSE).unwrap();

    for validate_remote in [true, false] {
        let generator = remote_generator(
            &base,
            GeneratorConfig {
                validate_remote,
                ..GeneratorConfig::default()
            },
        );
        let generation = generator.generate_with_source("webhook").await.unwrap();
        assert_eq!(generation.source, GenerationSource::Remote);
        assert_eq!(generation.scenario, expected);
        assert_eq!(serde_json::to_string(&generation.scenario).unwrap(), SPARSE);
    }
}

#[tokio::test]
async fn fenced_reply_is_unwrapped() {
    const FENCED: &str = r#"Here is the scenario you asked for:

```json
{"name": "Fenced", "flow": [{"id": 1, "module": "webhook:customWebhook"}]}
```
"#;
    let base = start_fake_anthropic(replying_with(FENCED)).await;
    let generation = remote_generator(&base, GeneratorConfig::default())
        .generate_with_source("anything")
        .await
        .unwrap();

    assert_eq!(generation.source, GenerationSource::Remote);
    assert_eq!(generation.scenario["name"], "Fenced");
}

#[tokio::test]
async fn prose_reply_falls_back() {
    let base = start_fake_anthropic(replying_with("I'd be happy to help!")).await;
    let generation = remote_generator(&base, GeneratorConfig::default())
        .generate_with_source("slack digest")
        .await
        .unwrap();

    assert_eq!(generation.source, GenerationSource::Fallback);
    assert_eq!(generation.scenario["flow"][2]["module"], "slack:postMessage");
}

#[tokio::test]
async fn invalid_remote_document_depends_on_validation() {
    const FORWARD_REF: &str = r#"{"name": "Broken", "flow": [
        {"id": 1, "module": "openai:chat", "mapper": {"text": "{{2.text}}"}},
        {"id": 2, "module": "webhook:customWebhook"}
    ]}"#;
    let base = start_fake_anthropic(replying_with(FORWARD_REF)).await;

    let strict = remote_generator(&base, GeneratorConfig::default());
    let generation = strict.generate_with_source("webhook").await.unwrap();
    assert_eq!(generation.source, GenerationSource::Fallback);
    assert_eq!(generation.scenario["name"], "AI Generated Scenario");

    let trusting = remote_generator(
        &base,
        GeneratorConfig {
            validate_remote: false,
            ..GeneratorConfig::default()
        },
    );
    let generation = trusting.generate_with_source("webhook").await.unwrap();
    assert_eq!(generation.source, GenerationSource::Remote);
    assert_eq!(generation.scenario["name"], "Broken");
}

#[tokio::test]
async fn non_success_status_falls_back() {
    let app = Router::new().route(
        "/v1/messages",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(json!({"type": "error", "error": {"type": "rate_limit_error"}})),
            )
        }),
    );
    let base = start_fake_anthropic(app).await;

    let generation = remote_generator(&base, GeneratorConfig::default())
        .generate_with_source("google sheets report")
        .await
        .unwrap();
    assert_eq!(generation.source, GenerationSource::Fallback);
    assert_eq!(generation.scenario["flow"][2]["module"], "google-sheets:addRow");
}

#[tokio::test]
async fn slow_remote_times_out_and_falls_back() {
    let app = Router::new().route(
        "/v1/messages",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            axum::Json(json!({"content": [{"type": "text", "text": REMOTE_DOCUMENT}]}))
        }),
    );
    let base = start_fake_anthropic(app).await;

    let generator = remote_generator_with_timeout(
        &base,
        GeneratorConfig::default(),
        Duration::from_millis(150),
    );
    let generation = generator.generate_with_source("twitter to notion").await.unwrap();
    assert_eq!(generation.source, GenerationSource::Fallback);
    assert_eq!(generation.scenario["flow"][0]["module"], "twitter:search");
}

#[tokio::test]
async fn request_carries_template_prompt_and_client_settings() {
    let app = Router::new().route(
        "/v1/messages",
        post(|axum::Json(body): axum::Json<Value>| async move {
            let content = body["messages"][0]["content"].as_str().unwrap_or_default();
            let ok = body["messages"].as_array().map(Vec::len) == Some(1)
                && body["messages"][0]["role"] == "user"
                && body["model"] == "configured-model"
                && body["max_tokens"] == 1234
                && body["temperature"].as_f64().is_some_and(|t| (t - 0.3).abs() < 1e-6)
                && content.contains("Make.com")
                && content.contains("User request: route webhooks to slack");
            let text = if ok { REMOTE_DOCUMENT } else { "request mismatch" };
            axum::Json(json!({"content": [{"type": "text", "text": text}]}))
        }),
    );
    let base = start_fake_anthropic(app).await;

    let generator = remote_generator_with_client(
        LlmClientConfig::anthropic("test-key", "configured-model")
            .with_base_url(&base)
            .with_max_tokens(1234),
        GeneratorConfig {
            temperature: Some(0.3),
            ..GeneratorConfig::default()
        },
    );
    let generation = generator
        .generate_with_source("route webhooks to slack")
        .await
        .unwrap();
    assert_eq!(generation.source, GenerationSource::Remote);
}

#[tokio::test]
async fn empty_prompt_never_reaches_the_remote() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = Router::new().route(
        "/v1/messages",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                axum::Json(json!({"content": [{"type": "text", "text": REMOTE_DOCUMENT}]}))
            }
        }),
    );
    let base = start_fake_anthropic(app).await;

    let err = remote_generator(&base, GeneratorConfig::default())
        .generate("   ")
        .await
        .unwrap_err();
    assert!(matches!(err, IntentError::EmptyPrompt));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn temperature_is_omitted_unless_configured() {
    let app = Router::new().route(
        "/v1/messages",
        post(|axum::Json(body): axum::Json<Value>| async move {
            let text = if body.get("temperature").is_none() {
                REMOTE_DOCUMENT
            } else {
                "unexpected temperature"
            };
            axum::Json(json!({"content": [{"type": "text", "text": text}]}))
        }),
    );
    let base = start_fake_anthropic(app).await;

    let generation = remote_generator(&base, GeneratorConfig::default())
        .generate_with_source("triage my inbox")
        .await
        .unwrap();
    assert_eq!(generation.source, GenerationSource::Remote);
}
