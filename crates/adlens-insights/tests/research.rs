//! Integration tests for the research orchestrator against wiremock.

use adlens_gemini::GeminiClient;
use adlens_insights::{ResearchOutcome, ResearchRequest, Researcher};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

fn request(grounded: bool) -> ResearchRequest {
    ResearchRequest {
        client_name: "Acme".to_owned(),
        product_focus: "CRM Software".to_owned(),
        market: "US".to_owned(),
        grounded,
    }
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [
            { "content": { "parts": [{ "text": text }] } }
        ]
    }))
}

#[tokio::test]
async fn discovery_parses_fenced_competitor_array() {
    let server = MockServer::start().await;

    let fenced = "Here are the competitors:\n```json\n[\n  {\"name\": \"Northwind\", \
                  \"services\": \"CRM consulting\"},\n  {\"name\": \"Unknown Competitor\"}\n]\n```";
    Mock::given(method("POST"))
        .and(path(
            "/v1beta/models/gemini-2.0-flash:generateContent",
        ))
        .respond_with(text_response(fenced))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let researcher = Researcher::new(&client, 4);
    let outcome = researcher
        .run(&request(false))
        .await
        .expect("research should succeed");

    let ResearchOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };
    // The sentinel-named record is dropped during normalization.
    assert_eq!(report.competitors.len(), 1);
    assert_eq!(report.competitors[0].name, "Northwind");
    assert_eq!(report.competitors[0].services, vec!["CRM consulting"]);
    assert!(report.grounding.is_empty());
}

#[tokio::test]
async fn discovery_decode_failure_is_a_structured_parse_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(text_response(
            "I could not find structured data, but here are some thoughts...",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let researcher = Researcher::new(&client, 4);
    let outcome = researcher
        .run(&request(false))
        .await
        .expect("HTTP layer should succeed");

    let ResearchOutcome::ParseFailure(failure) = outcome else {
        panic!("expected a parse failure");
    };
    assert!(failure.raw.contains("thoughts"));
    assert!(!failure.reason.is_empty());
}

#[tokio::test]
async fn grounding_tolerates_partial_failure() {
    let server = MockServer::start().await;

    // Discovery returns two competitors.
    Mock::given(method("POST"))
        .and(body_string_contains("competitive landscape"))
        .respond_with(text_response(
            r#"[{"name": "Northwind"}, {"name": "Fabrikam"}]"#,
        ))
        .mount(&server)
        .await;

    // Northwind's grounding call succeeds; Fabrikam's fails.
    Mock::given(method("POST"))
        .and(body_string_contains("Northwind"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Northwind ran a rebrand in Q2." }] },
                "groundingMetadata": {
                    "groundingChunks": [{ "web": { "uri": "https://example.com" } }]
                }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Fabrikam"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let researcher = Researcher::new(&client, 2);
    let outcome = researcher
        .run(&request(true))
        .await
        .expect("research should succeed");

    let ResearchOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(report.competitors.len(), 2);
    assert_eq!(report.grounding.len(), 2);

    let northwind = report.grounding["Northwind"]
        .as_ref()
        .expect("grounding should be present");
    assert!(northwind.summary.contains("rebrand"));
    assert_eq!(northwind.citations.len(), 1);

    assert!(report.grounding["Fabrikam"].is_none());
}

#[tokio::test]
async fn discovery_http_failure_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let researcher = Researcher::new(&client, 4);
    let result = researcher.run(&request(false)).await;

    assert!(result.is_err());
}
