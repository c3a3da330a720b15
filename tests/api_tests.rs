use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use longsum::ai::client::{GeneratorFactory, TextGenerator};
use longsum::api::{AppState, router};
use longsum::core::config::AppConfig;
use longsum::core::models::ApiKey;
use longsum::errors::SummarizerError;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "longsum-test-boundary";

/// Answers every prompt with the same text, or fails like an upstream outage.
struct FixedGenerator(Option<&'static str>);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, SummarizerError> {
        match self.0 {
            Some(reply) => Ok(reply.to_string()),
            None => Err(SummarizerError::OpenAIStatus {
                status: 500,
                body: "upstream exploded".to_string(),
            }),
        }
    }
}

struct FixedFactory(Option<&'static str>);

impl GeneratorFactory for FixedFactory {
    fn generator(&self, _api_key: &ApiKey) -> Arc<dyn TextGenerator> {
        Arc::new(FixedGenerator(self.0))
    }
}

fn app() -> Router {
    router(AppState::new(
        AppConfig::default(),
        Arc::new(FixedFactory(Some("A tidy summary."))),
    ))
}

fn small_upload_app() -> Router {
    let config = AppConfig {
        max_upload_bytes: 1024,
        ..AppConfig::default()
    };
    router(AppState::new(
        config,
        Arc::new(FixedFactory(Some("A tidy summary."))),
    ))
}

fn failing_app() -> Router {
    router(AppState::new(AppConfig::default(), Arc::new(FixedFactory(None))))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn json_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/summarize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Request<Body> {
    form_request_to("/summarize", fields, file)
}

fn form_request_to(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str)>,
) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((file_name, content)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_english_page() {
    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("AI Long Text Summarizer"));
    assert!(html.contains("ChatGPT cannot summarize long texts."));
    assert!(html.contains("Enter Your OpenAI API Key"));
    assert!(html.contains("type=\"password\""));
    assert!(html.contains("name=\"language\" value=\"en\""));
}

#[tokio::test]
async fn test_spanish_page() {
    let html = body_string(app().oneshot(get("/es")).await.unwrap()).await;
    assert!(html.contains("AI Resumen de Textos en Español"));
    assert!(html.contains("Sube el archivo de texto que deseas resumir"));
    assert!(html.contains("name=\"language\" value=\"es\""));
}

#[tokio::test]
async fn test_json_summarize() {
    let response = app()
        .oneshot(json_request(&json!({
            "api_key": "sk-test",
            "text": "Un texto corto para resumir.",
            "language": "es"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["summary"], "A tidy summary.");
    assert_eq!(body["language"], "es");
    assert_eq!(body["word_count"], 5);
    assert_eq!(body["chunk_count"], 1);
    assert_eq!(body["collapse_rounds"], 0);
    assert_eq!(body["chunk_summaries"], json!(["A tidy summary."]));
    assert!(!body["correlation_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_json_missing_key() {
    let response = app()
        .oneshot(json_request(&json!({ "api_key": "  ", "text": "hello there" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["kind"], "missing_api_key");
}

#[tokio::test]
async fn test_json_too_many_words() {
    let text = vec!["word"; 20_001].join(" ");
    let response = app()
        .oneshot(json_request(&json!({ "api_key": "sk-test", "text": text })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "too_many_words");
    assert_eq!(
        body["error"],
        "Document has 20001 words; the maximum length is 20000 words"
    );
}

#[tokio::test]
async fn test_json_malformed_body() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/summarize")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "parse_error");
}

#[tokio::test]
async fn test_json_upstream_failure() {
    let response = failing_app()
        .oneshot(json_request(&json!({ "api_key": "sk-test", "text": "hello there" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["kind"], "openai_status");
}

#[tokio::test]
async fn test_form_summarize_renders_summary() {
    let response = app()
        .oneshot(form_request(
            &[("api_key", "sk-test"), ("language", "en")],
            Some(("article.txt", "Some long article text.\n\nWith paragraphs.")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Here is your Summary:"));
    assert!(html.contains("A tidy summary."));
}

#[tokio::test]
async fn test_form_too_long_in_spanish() {
    let text = vec!["palabra"; 20_001].join(" ");
    let response = app()
        .oneshot(form_request(
            &[("api_key", "sk-test"), ("language", "es")],
            Some(("largo.txt", text.as_str())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let html = body_string(response).await;
    assert!(html.contains("Por favor sube un archivo más corto. El límite es 20.000 palabras."));
}

#[tokio::test]
async fn test_form_missing_key_links_instructions() {
    let response = app()
        .oneshot(form_request(
            &[("language", "en")],
            Some(("article.txt", "Some text.")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let html = body_string(response).await;
    assert!(html.contains("Please insert OpenAI API Key."));
    assert!(html.contains("where-do-i-find-my-secret-api-key"));
}

#[tokio::test]
async fn test_form_rejects_other_file_types() {
    let response = app()
        .oneshot(form_request(
            &[("api_key", "sk-test")],
            Some(("slides.pdf", "%PDF-1.4")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_form_without_file_shows_empty_page() {
    let response = app()
        .oneshot(form_request(&[("api_key", "sk-test")], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(!html.contains("A tidy summary."));
    assert!(!html.contains("role=\"alert\""));
}

#[tokio::test]
async fn test_form_upstream_failure_shows_generic_message() {
    let response = failing_app()
        .oneshot(form_request(
            &[("api_key", "sk-test")],
            Some(("article.txt", "Some text.")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let html = body_string(response).await;
    assert!(html.contains("generate a summary at this time"));
    assert!(!html.contains("upstream exploded"));
}

#[tokio::test]
async fn test_form_upload_over_body_limit_is_rejected_in_page_language() {
    let big = "a".repeat(4096);
    let response = small_upload_app()
        .oneshot(form_request_to(
            "/summarize?lang=es",
            &[("language", "es"), ("api_key", "sk-test")],
            Some(("grande.txt", big.as_str())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let html = body_string(response).await;
    assert!(html.contains("lang=\"es\""));
    assert!(html.contains("El archivo es demasiado grande. El tamaño máximo es 1 KB."));
}

#[tokio::test]
async fn test_json_body_over_limit() {
    let response = small_upload_app()
        .oneshot(json_request(&json!({
            "api_key": "sk-test",
            "text": "word ".repeat(1000)
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["kind"], "upload_too_large");
}
