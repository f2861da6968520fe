//! Issue-reporting conversation.
//!
//! A [`ChatSession`] collects the user's description and attachments, then
//! summarizes the conversation and files a ticket in two sequential steps.

use serde_json::Value;
use taskdesk_core::models::{Attachment, ChatMessage, ChatRole};

use crate::ai::{AiError, Summarizer};
use crate::backend::{BackendError, TicketFiler};

pub const GREETING: &str = "Hello! I'm here to help you report an issue. Please describe the problem \
you're facing, including the application name and any steps to reproduce it.";
pub const SUMMARIZING: &str = "Got it. I'm summarizing your issue and creating a ticket...";

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Failed to summarize the issue: {0}")]
    Summarize(#[from] AiError),
    #[error(transparent)]
    File(#[from] BackendError),
}

/// True when the user has said something; only then can an issue be filed.
pub fn has_user_message(messages: &[ChatMessage]) -> bool {
    messages
        .iter()
        .any(|m| m.role == ChatRole::User && !m.content.trim().is_empty())
}

/// Summarize `messages`, then file the ticket. Not transactional: a failed
/// filing leaves nothing to undo.
pub async fn file_issue_from_conversation(
    summarizer: &dyn Summarizer,
    filer: &dyn TicketFiler,
    messages: &[ChatMessage],
    attachments: &[Attachment],
) -> Result<Value, IssueError> {
    let summary = summarizer.summarize(messages).await?;
    tracing::info!(app = %summary.app_name, title = %summary.title, "Summarized conversation");
    Ok(filer.file_issue(&summary, attachments).await?)
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    attachments: Vec<Attachment>,
    last_error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            attachments: Vec::new(),
            last_error: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Append a user message. Blank input is ignored.
    pub fn send(&mut self, content: &str) -> bool {
        let content = content.trim();
        if content.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::user(content));
        true
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn can_create_issue(&self) -> bool {
        has_user_message(&self.messages)
    }

    /// Run the two-step filing, recording the outcome as an assistant message.
    ///
    /// Attachments are cleared on success and kept on failure so the user
    /// can retry.
    pub async fn create_issue(
        &mut self,
        summarizer: &dyn Summarizer,
        filer: &dyn TicketFiler,
    ) -> Result<Value, IssueError> {
        let conversation = self.messages.clone();
        self.messages.push(ChatMessage::assistant(SUMMARIZING));

        match file_issue_from_conversation(summarizer, filer, &conversation, &self.attachments)
            .await
        {
            Ok(response) => {
                let pretty =
                    serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string());
                self.messages.push(ChatMessage::assistant(format!(
                    "Successfully created issue! The response from the server is: \n```json\n{pretty}\n```"
                )));
                self.attachments.clear();
                self.last_error = None;
                Ok(response)
            }
            Err(e) => {
                tracing::error!("Failed to create issue: {e}");
                self.messages.push(ChatMessage::assistant(format!(
                    "Sorry, I ran into an error while creating the issue: {e}"
                )));
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
