//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Wraps `reqwest` with API key management, typed deserialization, and
//! error-envelope surfacing. Every call is exactly one attempt: research
//! callers treat failures as "no additional context", so retry loops would
//! only add latency where the product tolerates absence.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::GeminiError;
use crate::types::{
    GenerateContentRequest, GenerateContentResponse, GenerateOptions, GeneratedImage, Generation,
    GenerationConfig, RequestContent, RequestPart, Tool,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Client for the Gemini generative-language API.
///
/// Manages the HTTP client, API key, model names, and base URL. Use
/// [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`] to
/// point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    model: String,
    image_model: String,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeminiError::ApiError`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adlens/0.1 (marketing-analytics)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joined paths resolve under the root rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GeminiError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            model: "gemini-2.0-flash".to_owned(),
            image_model: "gemini-2.0-flash-exp-image-generation".to_owned(),
        })
    }

    /// Overrides the text-generation model.
    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_owned();
        self
    }

    /// Overrides the image-generation model.
    #[must_use]
    pub fn with_image_model(mut self, model: &str) -> Self {
        self.image_model = model.to_owned();
        self
    }

    /// Generates text for a prompt, optionally with web-search grounding.
    ///
    /// Returns the first candidate's concatenated text parts along with any
    /// grounding citations.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::Http`] on network failure.
    /// - [`GeminiError::ApiError`] on a non-2xx response.
    /// - [`GeminiError::Deserialize`] if the body does not match the expected
    ///   envelope.
    /// - [`GeminiError::MissingContent`] if no candidate carries text.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Generation, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_owned(),
                }],
            }],
            tools: options.grounded.then(|| {
                vec![Tool {
                    google_search: serde_json::json!({}),
                }]
            }),
            generation_config: build_generation_config(options),
        };

        let context = format!("generateContent(model={})", self.model);
        let response = self.post_generate(&self.model, &request, &context).await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GeminiError::MissingContent {
                context: context.clone(),
            })?;

        let grounding_chunks = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default();

        let text: String = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GeminiError::MissingContent { context });
        }

        Ok(Generation {
            text,
            grounding_chunks,
        })
    }

    /// Generates an image for a prompt and returns the first inline payload.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GeminiClient::generate`];
    /// [`GeminiError::MissingContent`] if no candidate part carries inline
    /// image data.
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_owned(),
                }],
            }],
            tools: None,
            generation_config: None,
        };

        let context = format!("generateContent(model={})", self.image_model);
        let response = self
            .post_generate(&self.image_model, &request, &context)
            .await?;

        response
            .candidates
            .into_iter()
            .flat_map(|c| c.content.map(|c| c.parts).unwrap_or_default())
            .find_map(|part| {
                part.inline_data.map(|d| GeneratedImage {
                    mime_type: d.mime_type,
                    data_base64: d.data,
                })
            })
            .ok_or(GeminiError::MissingContent { context })
    }

    /// Builds `{base}/v1beta/models/{model}:generateContent?key=...`.
    fn build_url(&self, model: &str) -> Result<Url, GeminiError> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| GeminiError::ApiError(format!("invalid model '{model}': {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Sends the POST, surfaces API error envelopes, and deserializes the body.
    async fn post_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        context: &str,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.build_url(model)?;
        tracing::debug!(model, grounded = request.tools.is_some(), "sending generateContent request");
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GeminiError::ApiError(extract_api_error(status, &body)));
        }

        serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

fn build_generation_config(options: &GenerateOptions) -> Option<GenerationConfig> {
    if options.temperature.is_none() && options.max_output_tokens.is_none() {
        return None;
    }
    Some(GenerationConfig {
        temperature: options.temperature,
        max_output_tokens: options.max_output_tokens,
    })
}

/// Pulls `error.message` out of a failure body, falling back to the status.
fn extract_api_error(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_constructs_model_path_and_key() {
        let client = test_client("https://generativelanguage.googleapis.com");
        let url = client.build_url("gemini-2.0-flash").expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=test-key"
        );
    }

    #[test]
    fn build_url_tolerates_trailing_slash_in_base() {
        let client = test_client("http://127.0.0.1:9999/");
        let url = client.build_url("gemini-2.0-flash").expect("valid url");
        assert!(url
            .as_str()
            .starts_with("http://127.0.0.1:9999/v1beta/models/"));
    }

    #[test]
    fn extract_api_error_prefers_message_field() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(
            extract_api_error(StatusCode::BAD_REQUEST, body),
            "API key not valid"
        );
    }

    #[test]
    fn extract_api_error_falls_back_to_status() {
        assert_eq!(
            extract_api_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "HTTP 500 Internal Server Error"
        );
    }

    #[test]
    fn generation_config_is_omitted_when_empty() {
        assert!(build_generation_config(&GenerateOptions::default()).is_none());
        let config = build_generation_config(&GenerateOptions {
            grounded: false,
            temperature: Some(0.2),
            max_output_tokens: None,
        })
        .expect("config should be present");
        assert_eq!(config.temperature, Some(0.2));
    }
}
