//! Owner of the task and project collections.
//!
//! Every mutation builds the next collection, writes it through to the store
//! and only then replaces the in-memory copy, so a failed write leaves the
//! repository exactly as it was.

use anyhow::Result;
use uuid::Uuid;

use crate::models::*;
use crate::store::{self, Store, ACTIVE_ORGANIZATION_KEY, PROJECTS_KEY, TASKS_KEY};

pub struct Repository<S: Store> {
    store: S,
    tasks: Vec<Task>,
    projects: Vec<Project>,
}

impl<S: Store> Repository<S> {
    /// Load both collections from `store`, starting empty when absent.
    pub fn load(store: S) -> Result<Self> {
        let tasks: Vec<Task> = store.read(TASKS_KEY, Vec::new())?;
        let projects: Vec<Project> = store.read(PROJECTS_KEY, Vec::new())?;
        tracing::debug!(
            tasks = tasks.len(),
            projects = projects.len(),
            "Loaded repository"
        );
        Ok(Self {
            store,
            tasks,
            projects,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All tasks across both organizations, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn list_tasks(&self, org: Organization) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.company == org).collect()
    }

    pub fn list_projects(&self, org: Organization) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.company == org).collect()
    }

    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn add_tasks(&mut self, new_tasks: Vec<Task>) -> Result<()> {
        if new_tasks.is_empty() {
            return Ok(());
        }
        let count = new_tasks.len();
        let mut tasks = self.tasks.clone();
        tasks.extend(new_tasks);
        self.commit_tasks(tasks)?;
        tracing::debug!(count, "Added tasks");
        Ok(())
    }

    pub fn add_task(&mut self, task: Task) -> Result<()> {
        self.add_tasks(vec![task])
    }

    /// Replace the task with the same id.
    ///
    /// Returns `false` without writing anything when no task matches.
    pub fn update_task(&mut self, task: Task) -> Result<bool> {
        let Some(index) = self.tasks.iter().position(|t| t.id == task.id) else {
            tracing::warn!(task_id = %task.id, "Ignoring update for unknown task");
            return Ok(false);
        };
        let mut tasks = self.tasks.clone();
        tasks[index] = task;
        self.commit_tasks(tasks)?;
        Ok(true)
    }

    /// Flip a task between "In Progress" and "Done".
    pub fn toggle_task(&mut self, id: Uuid) -> Result<Option<Task>> {
        self.modify_task(id, Task::toggle_status)
    }

    pub fn edit_task(&mut self, id: Uuid, edit: TaskEdit) -> Result<Option<Task>> {
        self.modify_task(id, |task| task.apply_edit(edit))
    }

    /// Reassign a task to another project, or to none.
    pub fn move_task(&mut self, id: Uuid, project_id: Option<Uuid>) -> Result<Option<Task>> {
        self.modify_task(id, |task| task.project_id = project_id)
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<bool> {
        if self.get_task(id).is_none() {
            return Ok(false);
        }
        let tasks = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit_tasks(tasks)?;
        tracing::debug!(task_id = %id, "Deleted task");
        Ok(true)
    }

    pub fn add_project(&mut self, project: Project) -> Result<()> {
        let mut projects = self.projects.clone();
        let id = project.id;
        projects.push(project);
        self.store.write(PROJECTS_KEY, &projects)?;
        self.projects = projects;
        tracing::debug!(project_id = %id, "Added project");
        Ok(())
    }

    /// Remove a project and detach every task that referenced it.
    ///
    /// Both collections are written in a single store transaction. Returns
    /// whether the project existed; stale references are cleared either way.
    pub fn delete_project(&mut self, id: Uuid) -> Result<bool> {
        let existed = self.get_project(id).is_some();
        let referencing = self
            .tasks
            .iter()
            .filter(|t| t.project_id == Some(id))
            .count();
        if !existed && referencing == 0 {
            return Ok(false);
        }

        let projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        let tasks: Vec<Task> = self
            .tasks
            .iter()
            .cloned()
            .map(|mut t| {
                if t.project_id == Some(id) {
                    t.project_id = None;
                }
                t
            })
            .collect();

        self.store.put_all(&[
            (PROJECTS_KEY, store::encode(PROJECTS_KEY, &projects)?),
            (TASKS_KEY, store::encode(TASKS_KEY, &tasks)?),
        ])?;
        self.projects = projects;
        self.tasks = tasks;

        tracing::debug!(project_id = %id, detached = referencing, "Deleted project");
        Ok(existed)
    }

    /// The persisted organization selector.
    pub fn active_organization(&self) -> Result<Organization> {
        self.store
            .read(ACTIVE_ORGANIZATION_KEY, Organization::default())
    }

    pub fn set_active_organization(&mut self, org: Organization) -> Result<()> {
        self.store.write(ACTIVE_ORGANIZATION_KEY, &org)?;
        tracing::debug!(organization = %org, "Switched active organization");
        Ok(())
    }

    fn modify_task(&mut self, id: Uuid, f: impl FnOnce(&mut Task)) -> Result<Option<Task>> {
        let Some(mut task) = self.get_task(id).cloned() else {
            tracing::warn!(task_id = %id, "Ignoring update for unknown task");
            return Ok(None);
        };
        f(&mut task);
        self.update_task(task.clone())?;
        Ok(Some(task))
    }

    fn commit_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.store.write(TASKS_KEY, &tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}
