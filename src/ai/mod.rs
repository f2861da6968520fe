//! Generative-AI adapters.
//!
//! Two operations are consumed: summarizing a support conversation into an
//! [`IssueSummary`] and extracting [`DraftActionItem`]s from a meeting
//! transcript. Responses are validated into typed records before anything
//! else sees them.

mod gemini;
mod schema;

use async_trait::async_trait;
use taskdesk_core::models::{ChatMessage, DraftActionItem, IssueSummary};

pub use gemini::GeminiClient;
pub use schema::{parse_drafts, parse_summary};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Google AI API key is not available. Set API_KEY for studio mode.")]
    MissingApiKey,
    #[error("transcript is empty")]
    EmptyTranscript,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("model returned no content")]
    EmptyResponse,
    #[error("model response did not match the expected schema: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, messages: &[ChatMessage]) -> Result<IssueSummary, AiError>;
}

#[async_trait]
pub trait Extractor: Send + Sync {
    /// All-or-nothing: either every draft or an error.
    async fn extract(
        &self,
        transcript: &str,
        known_members: &[&str],
    ) -> Result<Vec<DraftActionItem>, AiError>;
}

pub(crate) const SUMMARY_INSTRUCTION: &str = "You are an expert at summarizing conversations into bug reports. \
Based on the provided chat history between a user and an assistant, extract the application name, \
a concise title for the issue, and a detailed description of the problem the user is facing. \
If any information is missing from the conversation, use a sensible placeholder like \"Not specified by user\".";

/// Conversation rendered as `role: content` lines, skipping empty messages.
pub fn conversation_prompt(messages: &[ChatMessage]) -> String {
    let conversation = messages
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Here is the conversation history:\n\n{conversation}\n\n\
         Please summarize this into a bug report based on my instructions."
    )
}

pub fn extraction_instruction(known_members: &[&str]) -> String {
    let members = known_members.join(", ");
    format!(
        "You are an AI assistant that extracts action items from meeting transcripts.\n\
         You will be given a text. Extract every action item mentioned.\n\
         For each item, identify:\n\
         1. Title: What needs to be done.\n\
         2. Assignee: Who needs to do it. Try to match with these known team members: {members}. \
         If unknown, use the name found in text or \"Unassigned\".\n\
         3. DueDate: If a date is mentioned (e.g. \"by Friday\", \"next week\"), convert it to \
         YYYY-MM-DD format. If not mentioned, leave empty.\n\
         4. Status: Default to \"In Progress\" unless the text explicitly says it's done."
    )
}
