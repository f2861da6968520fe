use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{due_date, CreateTaskInput, Organization, Task, TaskKind, TaskStatus};

/// An action item proposed by transcript extraction, not yet confirmed.
///
/// Drafts are never persisted; they become tasks only through
/// [`DraftActionItem::into_task`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DraftActionItem {
    pub title: String,
    pub assignee: String,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Edit applied to a draft while it is under review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEdit {
    pub title: Option<String>,
    pub assignee: Option<String>,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_due_date: bool,
}

impl DraftActionItem {
    pub fn apply(&mut self, edit: DraftEdit) {
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(assignee) = edit.assignee {
            self.assignee = assignee;
        }
        if edit.clear_due_date {
            self.due_date = None;
        } else if edit.due_date.is_some() {
            self.due_date = edit.due_date;
        }
    }

    pub fn into_task(self, company: Organization) -> Task {
        Task::create(
            CreateTaskInput {
                title: self.title,
                assignee: self.assignee,
                due_date: self.due_date,
                status: self.status,
                ..Default::default()
            },
            company,
            TaskKind::ActionItem,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_task_fills_defaults() {
        let draft = DraftActionItem {
            title: "Fix bug".into(),
            assignee: "Bob".into(),
            ..Default::default()
        };
        let task = draft.into_task(Organization::ETeam);
        assert_eq!(task.kind, TaskKind::ActionItem);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, None);
        assert_eq!(task.company, Organization::ETeam);
        assert_eq!(serde_json::to_value(&task).unwrap()["dueDate"], "");
    }

    #[test]
    fn into_task_keeps_explicit_status() {
        let draft = DraftActionItem {
            title: "Ship".into(),
            assignee: "Ann".into(),
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        assert_eq!(draft.into_task(Organization::HumanizeIq).status, TaskStatus::Done);
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut draft = DraftActionItem {
            title: "Call vendor".into(),
            assignee: "Unassigned".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            status: None,
        };
        draft.apply(DraftEdit {
            assignee: Some("Purva Rao".into()),
            ..Default::default()
        });
        assert_eq!(draft.title, "Call vendor");
        assert_eq!(draft.assignee, "Purva Rao");
        assert!(draft.due_date.is_some());

        draft.apply(DraftEdit {
            clear_due_date: true,
            ..Default::default()
        });
        assert_eq!(draft.due_date, None);
    }
}
