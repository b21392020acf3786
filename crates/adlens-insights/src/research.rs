//! Grounded-research orchestration.
//!
//! A research pass is two phases against the Gemini client: one discovery
//! call that must yield a parseable competitor array, then an optional
//! per-competitor grounding fan-out. Discovery decode failures surface as a
//! structured [`ParseFailure`] carrying the raw text — callers can tell
//! "no data" from "malformed but present data". Grounding calls tolerate
//! partial failure: each one gets exactly one attempt, and a failed entry
//! becomes `None` in the result map.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use adlens_core::CompetitorProfile;
use adlens_gemini::{sanitize, GeminiClient, GeminiError, GenerateOptions};

use crate::normalize::{normalize_competitors, RawCompetitor};

// ---------------------------------------------------------------------------
// Request and result shapes
// ---------------------------------------------------------------------------

/// One research pass for a client/product pair.
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    pub client_name: String,
    pub product_focus: String,
    pub market: String,
    /// Attach web-search grounding and run the per-competitor phase.
    pub grounded: bool,
}

/// Web-grounded context for one competitor.
#[derive(Debug, Clone)]
pub struct GroundedInsight {
    pub summary: String,
    /// Opaque citation objects passed through from the API.
    pub citations: Vec<Value>,
}

/// The discovery response could not be decoded into competitor records.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    /// The sanitized text that failed to decode.
    pub raw: String,
    pub reason: String,
}

/// A completed research pass.
#[derive(Debug)]
pub struct ResearchReport {
    pub competitors: Vec<CompetitorProfile>,
    /// Grounding context keyed by competitor name; `None` marks a grounding
    /// call that failed and was tolerated.
    pub grounding: HashMap<String, Option<GroundedInsight>>,
}

/// Outcome of a research pass whose discovery call succeeded at the HTTP
/// level.
#[derive(Debug)]
pub enum ResearchOutcome {
    Report(ResearchReport),
    ParseFailure(ParseFailure),
}

/// Errors that abort a research pass outright.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs research passes against a Gemini client.
pub struct Researcher<'a> {
    client: &'a GeminiClient,
    max_concurrent: usize,
}

impl<'a> Researcher<'a> {
    #[must_use]
    pub fn new(client: &'a GeminiClient, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Executes a full research pass.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Gemini`] only when the discovery call itself
    /// fails; grounding failures are folded into the report as `None`.
    pub async fn run(&self, request: &ResearchRequest) -> Result<ResearchOutcome, ResearchError> {
        let options = GenerateOptions {
            grounded: request.grounded,
            ..GenerateOptions::default()
        };
        let generation = self
            .client
            .generate(&discovery_prompt(request), &options)
            .await?;

        let payload = sanitize(&generation.text);
        let raw_competitors = match serde_json::from_str::<DiscoveryPayload>(&payload) {
            Ok(DiscoveryPayload::List(list)) => list,
            Ok(DiscoveryPayload::Wrapped { competitors }) => competitors,
            Err(e) => {
                tracing::warn!(error = %e, "discovery response did not decode as competitors");
                return Ok(ResearchOutcome::ParseFailure(ParseFailure {
                    raw: payload,
                    reason: e.to_string(),
                }));
            }
        };

        let competitors = normalize_competitors(raw_competitors);
        tracing::info!(
            client = %request.client_name,
            competitors = competitors.len(),
            "discovery pass complete"
        );

        let grounding = if request.grounded && !competitors.is_empty() {
            self.ground_competitors(&competitors, request).await
        } else {
            HashMap::new()
        };

        Ok(ResearchOutcome::Report(ResearchReport {
            competitors,
            grounding,
        }))
    }

    /// Issues one grounded prompt per competitor with bounded concurrency.
    ///
    /// Failures are logged and tolerated; the caller receives `None` for
    /// those entries rather than an error for the batch.
    async fn ground_competitors(
        &self,
        competitors: &[CompetitorProfile],
        request: &ResearchRequest,
    ) -> HashMap<String, Option<GroundedInsight>> {
        let options = GenerateOptions {
            grounded: true,
            ..GenerateOptions::default()
        };

        let tasks: Vec<(String, String)> = competitors
            .iter()
            .map(|competitor| {
                (
                    competitor.name.clone(),
                    grounding_prompt(&competitor.name, request),
                )
            })
            .collect();

        let results: Vec<(String, Option<GroundedInsight>)> =
            stream::iter(tasks.into_iter().map(|(name, prompt)| {
                let options = &options;
                async move {
                    let outcome = self.client.generate(&prompt, options).await;
                    let insight = match outcome {
                        Ok(generation) => Some(GroundedInsight {
                            summary: generation.text,
                            citations: generation.grounding_chunks,
                        }),
                        Err(e) => {
                            tracing::warn!(
                                competitor = %name,
                                error = %e,
                                "grounding call failed; continuing without context"
                            );
                            None
                        }
                    };
                    (name, insight)
                }
            }))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let failed = results.iter().filter(|(_, i)| i.is_none()).count();
        if failed > 0 {
            tracing::warn!(
                failed,
                total = results.len(),
                "some grounding calls failed"
            );
        }

        results.into_iter().collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiscoveryPayload {
    List(Vec<RawCompetitor>),
    Wrapped { competitors: Vec<RawCompetitor> },
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn discovery_prompt(request: &ResearchRequest) -> String {
    format!(
        "You are a marketing analyst researching the competitive landscape for \
         \"{client}\", whose product focus is \"{product}\" in the {market} market.\n\
         List the main competitors as a JSON array. Each element must be an object \
         with these fields: name, services (array), serviceCategories (array of short \
         category tags), pricing, strengths (array), weaknesses (array), complaints \
         (array), adThemes (array), specialty, targetAudience, brandTone, marketShare, \
         positivePerception, negativePerception, usp, seo {{domainAuthority, backlinks, \
         organicTraffic}}, websiteQuality {{uxScore, loadingSpeed, mobileResponsiveness}}, \
         socialMetrics {{followers}}.\n\
         Respond with JSON only, no commentary.",
        client = request.client_name,
        product = request.product_focus,
        market = request.market,
    )
}

fn grounding_prompt(competitor_name: &str, request: &ResearchRequest) -> String {
    format!(
        "Using current web sources, summarize recent marketing activity, positioning \
         changes, and customer sentiment for \"{competitor_name}\" as a competitor of \
         \"{client}\" in the {market} market. Keep it under 200 words and cite sources.",
        client = request.client_name,
        market = request.market,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ResearchRequest {
        ResearchRequest {
            client_name: "Acme".to_owned(),
            product_focus: "CRM Software".to_owned(),
            market: "US".to_owned(),
            grounded: false,
        }
    }

    #[test]
    fn discovery_prompt_names_client_product_and_market() {
        let prompt = discovery_prompt(&request());
        assert!(prompt.contains("\"Acme\""));
        assert!(prompt.contains("\"CRM Software\""));
        assert!(prompt.contains("US market"));
    }

    #[test]
    fn discovery_payload_accepts_bare_and_wrapped_arrays() {
        let bare: DiscoveryPayload =
            serde_json::from_str(r#"[{"name": "One"}]"#).expect("bare array");
        assert!(matches!(bare, DiscoveryPayload::List(list) if list.len() == 1));

        let wrapped: DiscoveryPayload =
            serde_json::from_str(r#"{"competitors": [{"name": "One"}, {"name": "Two"}]}"#)
                .expect("wrapped array");
        assert!(matches!(
            wrapped,
            DiscoveryPayload::Wrapped { competitors } if competitors.len() == 2
        ));
    }
}
