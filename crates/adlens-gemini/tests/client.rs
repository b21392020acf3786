//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use adlens_gemini::{GeminiClient, GenerateOptions, GeminiError};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn generate_returns_first_candidate_text() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            {
                "content": {
                    "parts": [
                        { "text": "Competitor " },
                        { "text": "analysis" }
                    ]
                }
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let generation = client
        .generate("List competitors", &GenerateOptions::default())
        .await
        .expect("should generate");

    assert_eq!(generation.text, "Competitor analysis");
    assert!(generation.grounding_chunks.is_empty());
}

#[tokio::test]
async fn generate_with_grounding_sends_search_tool_and_returns_chunks() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            {
                "content": { "parts": [{ "text": "grounded answer" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://example.com", "title": "Example" } }
                    ]
                }
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(serde_json::json!({
            "tools": [{ "google_search": {} }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let options = GenerateOptions {
        grounded: true,
        ..GenerateOptions::default()
    };
    let generation = client
        .generate("Research Acme Corp", &options)
        .await
        .expect("should generate");

    assert_eq!(generation.text, "grounded answer");
    assert_eq!(generation.grounding_chunks.len(), 1);
}

#[tokio::test]
async fn generate_surfaces_api_error_message() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate("prompt", &GenerateOptions::default())
        .await
        .expect_err("should fail");

    match err {
        GeminiError::ApiError(msg) => assert_eq!(msg, "API key not valid"),
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_rejects_empty_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate("prompt", &GenerateOptions::default())
        .await
        .expect_err("should fail");

    assert!(matches!(err, GeminiError::MissingContent { .. }));
}

#[tokio::test]
async fn generate_rejects_malformed_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate("prompt", &GenerateOptions::default())
        .await
        .expect_err("should fail");

    assert!(matches!(err, GeminiError::Deserialize { .. }));
}

#[tokio::test]
async fn generate_image_returns_inline_payload() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            {
                "content": {
                    "parts": [
                        { "text": "Here is your creative." },
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                    ]
                }
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path(
            "/v1beta/models/gemini-2.0-flash-exp-image-generation:generateContent",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let image = client
        .generate_image("a bold ad creative")
        .await
        .expect("should generate image");

    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.data_base64, "aGVsbG8=");
}
