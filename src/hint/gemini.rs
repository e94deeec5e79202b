//! Gemini text-generation client (API key based).
//!
//! Calls the Generative Language `generateContent` endpoint with the key in
//! the `x-goog-api-key` header. A missing key is reported before any network
//! traffic.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{HintError, TextGenerator};
use crate::config::HintConfig;

pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(cfg: &HintConfig) -> Result<Self, HintError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(GeminiClient {
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, letters: &[&str], context: &str) -> Result<String, HintError> {
        let key = self.api_key.as_deref().ok_or(HintError::MissingCredential)?;

        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(letters, context) }]
            }],
            "generationConfig": {
                "thinkingConfig": { "thinkingBudget": 0 }
            }
        });

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(self.url())
            .header("content-type", "application/json")
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        debug!(model = %self.model, %status, latency_ms = start.elapsed().as_millis() as u64, "generateContent");

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(HintError::Api { status: status.as_u16(), message });
        }

        let text = resp.text().await?;
        extract_text(&text)
    }
}

/// Prompt asking for a short, encouraging study note on one letter group.
pub fn build_prompt(letters: &[&str], context: &str) -> String {
    format!(
        "I am learning the Hindi alphabet (Varnamala).\n\
         The letter group I am studying is: {}.\n\
         Context: {}\n\n\
         Give a concise, friendly explanation of these letters with:\n\
         1. One pronunciation tip for the whole group.\n\
         2. One simple Hindi word (with its English meaning) per letter, to help me remember the order.\n\n\
         Keep it encouraging and format it as short markdown bullet points.",
        letters.join(", "),
        context,
    )
}

// ── Response schema (only the fields we read) ──

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
/// A well-formed response without text yields an empty string.
pub fn extract_text(body: &str) -> Result<String, HintError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| HintError::InvalidResponse(e.to_string()))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(key: Option<&str>) -> HintConfig {
        HintConfig {
            model: "gemini-2.5-flash".into(),
            endpoint: "https://example.invalid/v1beta/".into(),
            timeout_secs: 5,
            api_key_env: "API_KEY".into(),
            api_key: key.map(String::from),
        }
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let c = GeminiClient::new(&cfg(Some("k"))).unwrap();
        assert_eq!(
            c.url(),
            "https://example.invalid/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let c = GeminiClient::new(&cfg(None)).unwrap();
        let err = c.generate(&["क"], "ctx").await.unwrap_err();
        assert!(matches!(err, HintError::MissingCredential));
    }

    #[test]
    fn prompt_lists_letters_and_context() {
        let p = build_prompt(&["य", "र", "ल", "व"], "Inner sounds: य to व");
        assert!(p.contains("य, र, ल, व"));
        assert!(p.contains("Context: Inner sounds: य to व"));
    }

    #[test]
    fn extracts_joined_parts() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "* क से " }, { "text": "कबूतर" }] }
            }],
            "usageMetadata": { "promptTokenCount": 12 }
        }"#;
        assert_eq!(extract_text(body).unwrap(), "* क से कबूतर");
    }

    #[test]
    fn no_candidates_is_empty_text() {
        assert_eq!(extract_text(r#"{"candidates": []}"#).unwrap(), "");
        assert_eq!(extract_text("{}").unwrap(), "");
    }

    #[test]
    fn garbage_is_invalid_response() {
        assert!(matches!(extract_text("<html>"), Err(HintError::InvalidResponse(_))));
    }
}
