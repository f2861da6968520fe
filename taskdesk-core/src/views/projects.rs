use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;
use crate::models::*;
use crate::repository::Repository;
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct ProjectGroup<'a> {
    pub project: &'a Project,
    pub tasks: Vec<&'a Task>,
}

/// Project tasks of one organization, grouped by project.
#[derive(Debug, Serialize)]
pub struct ProjectBoard<'a> {
    /// Tasks with no project, or whose project no longer exists.
    pub floating: Vec<&'a Task>,
    pub projects: Vec<ProjectGroup<'a>>,
}

pub fn project_board<S: Store>(repo: &Repository<S>, org: Organization) -> ProjectBoard<'_> {
    let projects = repo.list_projects(org);
    let tasks: Vec<&Task> = repo
        .list_tasks(org)
        .into_iter()
        .filter(|t| t.kind == TaskKind::ProjectTask)
        .collect();

    let floating = tasks
        .iter()
        .copied()
        .filter(|t| match t.project_id {
            Some(id) => !projects.iter().any(|p| p.id == id),
            None => true,
        })
        .collect();

    let groups = projects
        .into_iter()
        .map(|project| ProjectGroup {
            project,
            tasks: tasks
                .iter()
                .copied()
                .filter(|t| t.project_id == Some(project.id))
                .collect(),
        })
        .collect();

    ProjectBoard {
        floating,
        projects: groups,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

impl ProjectForm {
    /// `None` when the name is blank.
    pub fn into_project(self, org: Organization) -> Option<Project> {
        let name = non_blank(&self.name)?;
        Some(Project::create(
            CreateProjectInput {
                name,
                description: self.description.as_deref().and_then(non_blank),
            },
            org,
        ))
    }
}

/// "New task" form on the projects view. New project tasks always start
/// "In Progress".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default, with = "crate::models::due_date")]
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// `None` files the task as floating.
    pub project_id: Option<Uuid>,
}

impl ProjectTaskForm {
    pub fn into_task(self, org: Organization) -> Option<Task> {
        let title = non_blank(&self.title)?;
        let assignee = non_blank(&self.assignee)?;
        Some(Task::create(
            CreateTaskInput {
                title,
                assignee,
                due_date: self.due_date,
                status: Some(TaskStatus::InProgress),
                description: self.description.as_deref().and_then(non_blank),
                project_id: self.project_id,
            },
            org,
            TaskKind::ProjectTask,
        ))
    }
}
