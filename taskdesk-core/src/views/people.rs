use serde::Serialize;

use super::{sort_tasks, SortKey};
use crate::models::*;
use crate::repository::Repository;
use crate::store::Store;

/// Sidebar entry: a team member and how many of their tasks are still open.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub name: String,
    pub open_tasks: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PersonStats {
    pub total: usize,
    pub done: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetail<'a> {
    pub name: String,
    pub action_items: Vec<&'a Task>,
    pub project_tasks: Vec<&'a Task>,
    pub stats: PersonStats,
}

/// One entry per team member of `org`, in roster order.
pub fn people<S: Store>(repo: &Repository<S>, org: Organization) -> Vec<PersonSummary> {
    let tasks = repo.list_tasks(org);
    org.team_members()
        .iter()
        .map(|name| PersonSummary {
            name: name.to_string(),
            open_tasks: tasks
                .iter()
                .filter(|t| t.assignee == *name && t.status == TaskStatus::InProgress)
                .count(),
        })
        .collect()
}

/// Everything assigned to `name` in `org`, split by task type.
pub fn person_detail<'a, S: Store>(
    repo: &'a Repository<S>,
    org: Organization,
    name: &str,
    sort: SortKey,
) -> PersonDetail<'a> {
    let mut tasks: Vec<&Task> = repo
        .list_tasks(org)
        .into_iter()
        .filter(|t| t.assignee == name)
        .collect();
    sort_tasks(&mut tasks, sort);

    let done = tasks.iter().filter(|t| t.is_done()).count();
    let stats = PersonStats {
        total: tasks.len(),
        done,
        pending: tasks.len() - done,
    };

    let (action_items, project_tasks): (Vec<&Task>, Vec<&Task>) = tasks
        .into_iter()
        .partition(|t| t.kind == TaskKind::ActionItem);

    PersonDetail {
        name: name.to_string(),
        action_items,
        project_tasks,
        stats,
    }
}
