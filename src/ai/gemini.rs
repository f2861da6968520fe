//! Gemini `generateContent` client.
//!
//! Every call sends a system instruction, the user content and a response
//! schema with `responseMimeType: application/json`, then hands the returned
//! text to the schema validators.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use taskdesk_core::models::{ChatMessage, DraftActionItem, IssueSummary};

use super::schema::{drafts_schema, parse_drafts, parse_summary, summary_schema};
use super::{
    conversation_prompt, extraction_instruction, AiError, Extractor, Summarizer,
    SUMMARY_INSTRUCTION,
};
use crate::config::AiConfig;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request_body(system_instruction: &str, user_text: &str, schema: Value) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": user_text }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        })
    }

    /// Send one request and return the concatenated text parts of the first candidate.
    async fn generate(&self, body: &Value) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        tracing::debug!(model = %self.model, "Sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(map_http_error(status, &text));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        extract_text(parsed)
    }
}

fn map_http_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    tracing::warn!(status, "Gemini request failed: {message}");
    AiError::Api { status, message }
}

fn extract_text(response: GenerateResponse) -> Result<String, AiError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, messages: &[ChatMessage]) -> Result<IssueSummary, AiError> {
        let body = Self::build_request_body(
            SUMMARY_INSTRUCTION,
            &conversation_prompt(messages),
            summary_schema(),
        );
        let text = self.generate(&body).await?;
        parse_summary(&text)
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract(
        &self,
        transcript: &str,
        known_members: &[&str],
    ) -> Result<Vec<DraftActionItem>, AiError> {
        if transcript.trim().is_empty() {
            return Err(AiError::EmptyTranscript);
        }
        let body = Self::build_request_body(
            &extraction_instruction(known_members),
            transcript,
            drafts_schema(),
        );
        let text = self.generate(&body).await?;
        let drafts = parse_drafts(&text)?;
        tracing::info!(count = drafts.len(), "Extracted draft action items");
        Ok(drafts)
    }
}
