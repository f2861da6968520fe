use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{due_date, Organization};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub assignee: String,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub company: Organization,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "In Progress" => Some(Self::InProgress),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }

    /// The other state. Both transitions are always allowed.
    pub fn toggled(self) -> Self {
        match self {
            Self::InProgress => Self::Done,
            Self::Done => Self::InProgress,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ActionItem,
    ProjectTask,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub title: String,
    pub assignee: String,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
}

/// Field edit from a task card: title, assignee and due date are replaced together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    pub title: String,
    pub assignee: String,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Build a new task with a fresh id. Status defaults to "In Progress".
    pub fn create(input: CreateTaskInput, company: Organization, kind: TaskKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            assignee: input.assignee,
            due_date: input.due_date,
            status: input.status.unwrap_or_default(),
            description: input.description,
            company,
            kind,
            project_id: input.project_id,
        }
    }

    pub fn toggle_status(&mut self) {
        self.status = self.status.toggled();
    }

    pub fn apply_edit(&mut self, edit: TaskEdit) {
        self.title = edit.title;
        self.assignee = edit.assignee;
        self.due_date = edit.due_date;
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}
