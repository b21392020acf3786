//! HTTP client for the Gemini generative-language API.
//!
//! Wraps `reqwest` with typed request/response envelopes, API error
//! surfacing, and optional web-search grounding. Also home to the text
//! sanitizer that turns fenced or prose-wrapped model output into a
//! best-effort JSON string.

mod client;
mod error;
mod sanitize;
mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use sanitize::sanitize;
pub use types::{GeneratedImage, GenerateOptions, Generation};
