use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Earliest due date first; undated tasks last.
    #[default]
    DueDate,
    /// Open tasks first, "Done" last.
    Status,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dueDate" | "due-date" | "due_date" => Some(Self::DueDate),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Stable sort: tasks that compare equal keep their input order.
pub fn sort_tasks<T: Borrow<Task>>(tasks: &mut [T], key: SortKey) {
    match key {
        SortKey::DueDate => {
            tasks.sort_by(|a, b| compare_due_dates(a.borrow().due_date, b.borrow().due_date))
        }
        SortKey::Status => {
            tasks.sort_by_key(|t| t.borrow().status == TaskStatus::Done)
        }
    }
}

fn compare_due_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTaskInput, Organization, TaskKind};

    fn task(title: &str, due: Option<(i32, u32, u32)>, status: TaskStatus) -> Task {
        Task::create(
            CreateTaskInput {
                title: title.into(),
                assignee: "Alice".into(),
                due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                status: Some(status),
                ..Default::default()
            },
            Organization::HumanizeIq,
            TaskKind::ActionItem,
        )
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn due_date_sorts_undated_last() {
        let mut tasks = vec![
            task("none-1", None, TaskStatus::InProgress),
            task("march", Some((2025, 3, 1)), TaskStatus::InProgress),
            task("none-2", None, TaskStatus::InProgress),
            task("january", Some((2025, 1, 1)), TaskStatus::InProgress),
        ];

        sort_tasks(&mut tasks, SortKey::DueDate);

        assert_eq!(titles(&tasks), vec!["january", "march", "none-1", "none-2"]);
    }

    #[test]
    fn equal_due_dates_keep_input_order() {
        let mut tasks = vec![
            task("first", Some((2025, 5, 5)), TaskStatus::InProgress),
            task("earlier", Some((2025, 1, 1)), TaskStatus::InProgress),
            task("second", Some((2025, 5, 5)), TaskStatus::Done),
            task("third", Some((2025, 5, 5)), TaskStatus::InProgress),
        ];

        sort_tasks(&mut tasks, SortKey::DueDate);

        assert_eq!(titles(&tasks), vec!["earlier", "first", "second", "third"]);
    }

    #[test]
    fn status_sorts_done_last_and_is_stable() {
        let mut tasks = vec![
            task("done-1", None, TaskStatus::Done),
            task("open-1", None, TaskStatus::InProgress),
            task("done-2", None, TaskStatus::Done),
            task("open-2", None, TaskStatus::InProgress),
        ];

        sort_tasks(&mut tasks, SortKey::Status);

        assert_eq!(titles(&tasks), vec!["open-1", "open-2", "done-1", "done-2"]);
    }

    #[test]
    fn sorts_borrowed_tasks() {
        let owned = vec![
            task("later", Some((2025, 9, 9)), TaskStatus::InProgress),
            task("sooner", Some((2025, 1, 9)), TaskStatus::InProgress),
        ];
        let mut refs: Vec<&Task> = owned.iter().collect();

        sort_tasks(&mut refs, SortKey::DueDate);

        assert_eq!(refs[0].title, "sooner");
    }
}
