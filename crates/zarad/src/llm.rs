//! LLM text-completion client.
//!
//! The router's one outward-facing collaborator: `complete()` against a
//! local completion endpoint. No retry or rate limiting here; a caller that
//! gets `LlmUnavailable` can fall back to a canned line.

use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use zara_common::ZaraError;

use crate::config::LlmConfig;

/// Stock lines for when the completion endpoint is down.
const FALLBACK_LINES: &[&str] = &[
    "I'm having trouble reaching my language model right now. Please try again in a moment.",
    "My thinking service is temporarily busy. Ask me again shortly!",
    "I can't reach my knowledge base at the moment, but I'm still listening.",
];

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct CompletionClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ZaraError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ZaraError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    /// Quick health check against the endpoint.
    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// One-shot text completion. Network and quota failures surface as
    /// `LlmUnavailable`.
    pub async fn complete(&self, prompt: &str) -> Result<String, ZaraError> {
        info!("Completion request ({} chars)", prompt.len());

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| ZaraError::LlmUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Completion endpoint returned {}", response.status());
            return Err(ZaraError::LlmUnavailable(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ZaraError::LlmUnavailable(format!("bad response body: {e}")))?;

        Ok(clean_response(&body.response))
    }

    /// A canned line for callers that want to stay conversational when the
    /// model is unreachable.
    pub fn fallback_line() -> &'static str {
        FALLBACK_LINES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FALLBACK_LINES[0])
    }
}

/// Strip leading bullet markers the model likes to emit.
fn clean_response(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let stripped = trimmed
                .strip_prefix("* ")
                .or_else(|| trimmed.strip_prefix("- "))
                .or_else(|| trimmed.strip_prefix("• "))
                .unwrap_or(trimmed);
            stripped.to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
