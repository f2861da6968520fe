//! Response schemas sent to the model, and validation of what comes back.

use serde::Deserialize;
use serde_json::{json, Value};
use taskdesk_core::models::{due_date, DraftActionItem, IssueSummary, TaskStatus};

use super::AiError;

pub(crate) fn summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "appName": { "type": "STRING", "description": "The name of the application with the issue." },
            "title": { "type": "STRING", "description": "A short, descriptive title for the bug report." },
            "description": { "type": "STRING", "description": "A detailed description of the issue, including steps to reproduce if mentioned." }
        },
        "required": ["appName", "title", "description"]
    })
}

pub(crate) fn drafts_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "assignee": { "type": "STRING" },
                "dueDate": { "type": "STRING" },
                "status": { "type": "STRING", "enum": ["In Progress", "Done"] }
            },
            "required": ["title", "assignee"]
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    app_name: String,
    title: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    title: String,
    assignee: String,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub fn parse_summary(text: &str) -> Result<IssueSummary, AiError> {
    let raw: RawSummary = serde_json::from_str(text.trim())
        .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
    Ok(IssueSummary {
        app_name: raw.app_name,
        title: raw.title,
        description: raw.description,
    })
}

/// Validate extraction output. A status outside the enum rejects the whole
/// batch; an unreadable due date only drops that date.
pub fn parse_drafts(text: &str) -> Result<Vec<DraftActionItem>, AiError> {
    let raw: Vec<RawDraft> = serde_json::from_str(text.trim())
        .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            let status = match item.status.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(s) => Some(TaskStatus::from_str(s).ok_or_else(|| {
                    AiError::InvalidResponse(format!("item {index}: unknown status {s:?}"))
                })?),
            };

            let due = item.due_date.as_deref().unwrap_or("");
            let parsed_due = due_date::parse_lenient(due);
            if parsed_due.is_none() && !due.trim().is_empty() {
                tracing::warn!(index, due_date = due, "Dropping unreadable due date from draft");
            }

            Ok(DraftActionItem {
                title: item.title,
                assignee: item.assignee,
                due_date: parsed_due,
                status,
            })
        })
        .collect()
}
