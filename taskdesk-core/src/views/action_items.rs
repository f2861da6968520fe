use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;
use crate::models::*;
use crate::repository::Repository;
use crate::store::Store;

/// Action items belonging to `org`, in insertion order.
pub fn action_items<S: Store>(repo: &Repository<S>, org: Organization) -> Vec<&Task> {
    repo.list_tasks(org)
        .into_iter()
        .filter(|t| t.kind == TaskKind::ActionItem)
        .collect()
}

/// Manual "add action item" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItemForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default, with = "crate::models::due_date")]
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
}

impl ActionItemForm {
    /// Build the task, or `None` when title or assignee is blank.
    pub fn into_task(self, org: Organization) -> Option<Task> {
        let title = non_blank(&self.title)?;
        let assignee = non_blank(&self.assignee)?;
        Some(Task::create(
            CreateTaskInput {
                title,
                assignee,
                due_date: self.due_date,
                status: self.status,
                description: self.description.as_deref().and_then(non_blank),
                project_id: self.project_id,
            },
            org,
            TaskKind::ActionItem,
        ))
    }
}

/// Extraction output awaiting review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftBoard {
    drafts: Vec<DraftActionItem>,
}

impl DraftBoard {
    pub fn new(drafts: Vec<DraftActionItem>) -> Self {
        Self { drafts }
    }

    pub fn drafts(&self) -> &[DraftActionItem] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Returns `false` when `index` is out of range.
    pub fn edit(&mut self, index: usize, edit: DraftEdit) -> bool {
        match self.drafts.get_mut(index) {
            Some(draft) => {
                draft.apply(edit);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<DraftActionItem> {
        (index < self.drafts.len()).then(|| self.drafts.remove(index))
    }

    pub fn discard_all(&mut self) {
        self.drafts.clear();
    }

    /// Promote every draft to a task. The board is emptied only after the
    /// tasks were stored.
    pub fn confirm<S: Store>(
        &mut self,
        repo: &mut Repository<S>,
        org: Organization,
    ) -> Result<Vec<Task>> {
        let tasks = confirm_drafts(repo, self.drafts.clone(), org)?;
        self.drafts.clear();
        Ok(tasks)
    }
}

/// Append one new action item per draft and return the created tasks.
pub fn confirm_drafts<S: Store>(
    repo: &mut Repository<S>,
    drafts: Vec<DraftActionItem>,
    org: Organization,
) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = drafts.into_iter().map(|d| d.into_task(org)).collect();
    repo.add_tasks(tasks.clone())?;
    tracing::info!(count = tasks.len(), organization = %org, "Confirmed drafts");
    Ok(tasks)
}
