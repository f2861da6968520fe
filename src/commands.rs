//! Terminal rendering and the interactive loops behind the CLI subcommands.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use taskdesk_core::models::{
    DraftActionItem, DraftEdit, Organization, Project, Task, TaskStatus,
};
use taskdesk_core::views::{
    ActionItemForm, DraftBoard, PersonDetail, PersonSummary, ProjectBoard, ProjectTaskForm,
};
use taskdesk_core::{Repository, Store};
use uuid::Uuid;

use crate::ai::Summarizer;
use crate::attachments::load_attachment;
use crate::backend::TicketFiler;
use crate::chat::ChatSession;

pub fn task_line(task: &Task) -> String {
    let check = if task.status == TaskStatus::Done { "x" } else { " " };
    let due = task
        .due_date
        .map(|d| format!(" (due {d})"))
        .unwrap_or_default();
    format!(
        "[{check}] {} - {}{due}  {}",
        task.title, task.assignee, task.id
    )
}

pub fn project_line(project: &Project) -> String {
    match &project.description {
        Some(description) => format!("{}: {description}  {}", project.name, project.id),
        None => format!("{}  {}", project.name, project.id),
    }
}

pub fn render_board(board: &ProjectBoard<'_>) -> String {
    let mut out = String::new();
    for group in &board.projects {
        out.push_str(&format!("== {} ==\n", group.project.name));
        push_tasks(&mut out, &group.tasks);
    }
    if !board.floating.is_empty() {
        out.push_str("== Floating ==\n");
        push_tasks(&mut out, &board.floating);
    }
    out
}

pub fn render_people(people: &[PersonSummary]) -> String {
    people
        .iter()
        .map(|p| format!("{} ({} open)\n", p.name, p.open_tasks))
        .collect()
}

pub fn render_person(detail: &PersonDetail<'_>) -> String {
    let mut out = format!(
        "{}: {} total, {} done, {} pending\n",
        detail.name, detail.stats.total, detail.stats.done, detail.stats.pending
    );
    out.push_str("-- Action items --\n");
    push_tasks(&mut out, &detail.action_items);
    out.push_str("-- Project tasks --\n");
    push_tasks(&mut out, &detail.project_tasks);
    out
}

fn push_tasks(out: &mut String, tasks: &[&Task]) {
    if tasks.is_empty() {
        out.push_str("  (none)\n");
    }
    for task in tasks {
        out.push_str("  ");
        out.push_str(&task_line(task));
        out.push('\n');
    }
}

/// Fields collected by `tasks add`.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub assignee: String,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
    /// Create a project task instead of an action item.
    pub project_task: bool,
}

impl NewTask {
    /// `None` when title or assignee is blank.
    pub fn into_task(self, org: Organization) -> Option<Task> {
        if self.project_task {
            ProjectTaskForm {
                title: self.title,
                assignee: self.assignee,
                due_date: self.due_date,
                description: self.description,
                project_id: self.project_id,
            }
            .into_task(org)
        } else {
            ActionItemForm {
                title: self.title,
                assignee: self.assignee,
                due_date: self.due_date,
                description: self.description,
                project_id: self.project_id,
                ..Default::default()
            }
            .into_task(org)
        }
    }
}

/// Store the task and return the line announcing it.
pub fn add_task<S: Store>(repo: &mut Repository<S>, task: Task) -> Result<String> {
    let line = task_line(&task);
    repo.add_task(task)?;
    Ok(line)
}

/// Store the project and return the line announcing it.
pub fn add_project<S: Store>(repo: &mut Repository<S>, project: Project) -> Result<String> {
    let line = project_line(&project);
    repo.add_project(project)?;
    Ok(line)
}

pub fn draft_line(index: usize, draft: &DraftActionItem) -> String {
    let due = draft
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no due date".to_string());
    let status = draft.status.unwrap_or_default().as_str();
    format!(
        "{}. {} - {} ({due}) [{status}]",
        index + 1,
        draft.title,
        draft.assignee
    )
}

/// Every organization, with `*` beside the active one.
pub fn render_orgs(active: Organization) -> String {
    Organization::ALL
        .iter()
        .map(|org| {
            let marker = if *org == active { "*" } else { " " };
            format!("{marker} {org}\n")
        })
        .collect()
}

pub fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date {raw:?}, expected YYYY-MM-DD"))
}

/// `none` clears the project.
pub fn parse_project_ref(raw: &str) -> Result<Option<Uuid>> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(
        Uuid::parse_str(raw).with_context(|| format!("Invalid project id {raw:?}"))?,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Confirm,
    Discard,
}

/// Parse `edit N key=value ...` into a draft index and edit.
fn parse_draft_edit(args: &str) -> Result<(usize, DraftEdit)> {
    let mut parts = args.split_whitespace();
    let index = parse_index(parts.next())?;
    let mut edit = DraftEdit::default();
    let rest: Vec<&str> = parts.collect();
    for field in rest.join(" ").split(';') {
        let Some((key, value)) = field.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "title" => edit.title = Some(value.to_string()),
            "assignee" => edit.assignee = Some(value.to_string()),
            "due" if value.is_empty() || value == "none" => edit.clear_due_date = true,
            "due" => edit.due_date = Some(parse_due(value)?),
            other => bail!("Unknown field {other:?}"),
        }
    }
    Ok((index, edit))
}

fn parse_index(raw: Option<&str>) -> Result<usize> {
    let raw = raw.context("Missing item number")?;
    let n: usize = raw
        .parse()
        .with_context(|| format!("Invalid item number {raw:?}"))?;
    n.checked_sub(1).context("Item numbers start at 1")
}

/// Review extracted drafts line by line until the user confirms or discards.
///
/// Commands: `y` confirm all, `n` discard all, `drop N`,
/// `edit N title=...; assignee=...; due=YYYY-MM-DD`.
pub fn review_drafts<R: BufRead, W: Write>(
    board: &mut DraftBoard,
    input: R,
    out: &mut W,
) -> Result<ReviewOutcome> {
    let mut lines = input.lines();
    loop {
        if board.is_empty() {
            writeln!(out, "No drafts left.")?;
            return Ok(ReviewOutcome::Discard);
        }
        for (i, draft) in board.drafts().iter().enumerate() {
            writeln!(out, "{}", draft_line(i, draft))?;
        }
        write!(out, "Confirm all? [y/n/drop N/edit N field=value; ...] ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            return Ok(ReviewOutcome::Discard);
        };
        let line = line?;
        let line = line.trim();
        let (command, args) = line.split_once(' ').unwrap_or((line, ""));

        let result = match command {
            "y" | "yes" => return Ok(ReviewOutcome::Confirm),
            "n" | "no" => {
                board.discard_all();
                return Ok(ReviewOutcome::Discard);
            }
            "drop" => parse_index(Some(args.trim())).map(|i| {
                if board.remove(i).is_none() {
                    tracing::warn!(item = i + 1, "No such draft");
                }
            }),
            "edit" => parse_draft_edit(args).map(|(i, edit)| {
                if !board.edit(i, edit) {
                    tracing::warn!(item = i + 1, "No such draft");
                }
            }),
            _ => Err(anyhow::anyhow!("Unknown command {line:?}")),
        };
        if let Err(e) = result {
            writeln!(out, "{e}")?;
        }
    }
}

/// Interactive issue-reporting chat.
///
/// Plain lines are sent as messages; `/attach PATH`, `/issue` and `/quit`
/// are commands.
pub async fn run_chat<R: BufRead, W: Write>(
    session: &mut ChatSession,
    summarizer: &dyn Summarizer,
    filer: &dyn TicketFiler,
    input: R,
    out: &mut W,
) -> Result<()> {
    for message in session.messages() {
        writeln!(out, "{}: {}", message.role.as_str(), message.content)?;
    }

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed == "/quit" {
            break;
        } else if let Some(path) = trimmed.strip_prefix("/attach ") {
            match load_attachment(&PathBuf::from(path.trim())) {
                Ok(attachment) => {
                    writeln!(out, "Attached {}", attachment.name)?;
                    session.attach(attachment);
                }
                Err(e) => writeln!(out, "{e:#}")?,
            }
        } else if trimmed == "/issue" {
            if !session.can_create_issue() {
                writeln!(out, "Describe the problem first.")?;
                continue;
            }
            let before = session.messages().len();
            // Failures are already recorded as an assistant message.
            let _ = session.create_issue(summarizer, filer).await;
            for message in &session.messages()[before..] {
                writeln!(out, "{}: {}", message.role.as_str(), message.content)?;
            }
        } else {
            session.send(trimmed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::fakes::{FakeAi, FakeTickets};
    use std::io::Cursor;
    use taskdesk_core::models::{CreateProjectInput, TaskKind};
    use taskdesk_core::Database;
    use tempfile::TempDir;

    /// Store that starts empty and rejects every write.
    struct ReadOnlyStore;

    impl Store for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn put_all(&self, _entries: &[(&str, String)]) -> Result<()> {
            bail!("database is read-only")
        }
    }

    fn memory_repo() -> Repository<Database> {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        Repository::load(db).unwrap()
    }

    fn new_task(project_id: Option<Uuid>, project_task: bool) -> NewTask {
        NewTask {
            title: "Draft agenda".into(),
            assignee: "Ann".into(),
            project_id,
            project_task,
            ..Default::default()
        }
    }

    fn drafts() -> DraftBoard {
        DraftBoard::new(vec![
            DraftActionItem {
                title: "Fix bug".into(),
                assignee: "Bob".into(),
                due_date: None,
                status: None,
            },
            DraftActionItem {
                title: "Send notes".into(),
                assignee: "Ann".into(),
                due_date: None,
                status: None,
            },
        ])
    }

    #[test]
    fn task_line_marks_done_tasks() {
        let mut task = Task::create(
            taskdesk_core::models::CreateTaskInput {
                title: "Ship".into(),
                assignee: "Ann".into(),
                due_date: NaiveDate::from_ymd_opt(2025, 1, 2),
                ..Default::default()
            },
            Organization::ETeam,
            taskdesk_core::models::TaskKind::ActionItem,
        );
        assert!(task_line(&task).starts_with("[ ] Ship - Ann (due 2025-01-02)"));
        task.toggle_status();
        assert!(task_line(&task).starts_with("[x] Ship"));
    }

    #[test]
    fn review_confirms() {
        let mut board = drafts();
        let mut out = Vec::new();
        let outcome = review_drafts(&mut board, Cursor::new("y\n"), &mut out).unwrap();
        assert_eq!(outcome, ReviewOutcome::Confirm);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn review_drops_and_edits() {
        let mut board = drafts();
        let mut out = Vec::new();
        let input = "drop 1\nedit 1 title=Send minutes; due=2025-05-01\ny\n";

        let outcome = review_drafts(&mut board, Cursor::new(input), &mut out).unwrap();

        assert_eq!(outcome, ReviewOutcome::Confirm);
        assert_eq!(board.len(), 1);
        assert_eq!(board.drafts()[0].title, "Send minutes");
        assert_eq!(board.drafts()[0].due_date, NaiveDate::from_ymd_opt(2025, 5, 1));
    }

    #[test]
    fn review_discard_empties_board() {
        let mut board = drafts();
        let mut out = Vec::new();
        let outcome = review_drafts(&mut board, Cursor::new("n\n"), &mut out).unwrap();
        assert_eq!(outcome, ReviewOutcome::Discard);
        assert!(board.is_empty());
    }

    #[test]
    fn review_reports_bad_input_and_continues() {
        let mut board = drafts();
        let mut out = Vec::new();
        let outcome =
            review_drafts(&mut board, Cursor::new("edit x\nfrobnicate\ny\n"), &mut out).unwrap();
        assert_eq!(outcome, ReviewOutcome::Confirm);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Invalid item number"));
        assert!(printed.contains("Unknown command"));
    }

    #[test]
    fn project_flag_alone_keeps_action_item() {
        let project_id = Uuid::new_v4();

        let task = new_task(Some(project_id), false)
            .into_task(Organization::ETeam)
            .unwrap();

        assert_eq!(task.kind, TaskKind::ActionItem);
        assert_eq!(task.project_id, Some(project_id));
    }

    #[test]
    fn project_task_flag_selects_project_task() {
        let task = new_task(None, true).into_task(Organization::ETeam).unwrap();
        assert_eq!(task.kind, TaskKind::ProjectTask);
        assert_eq!(task.project_id, None);
    }

    #[test]
    fn blank_new_task_is_not_built() {
        let mut fields = new_task(None, true);
        fields.assignee = "  ".into();
        assert!(fields.into_task(Organization::ETeam).is_none());
    }

    #[test]
    fn add_task_reports_after_storing() {
        let mut repo = memory_repo();
        let task = new_task(None, false).into_task(Organization::ETeam).unwrap();

        let line = add_task(&mut repo, task.clone()).unwrap();

        assert_eq!(line, task_line(&task));
        let reloaded = Repository::load(repo.store().clone()).unwrap();
        assert_eq!(reloaded.get_task(task.id), Some(&task));
    }

    #[test]
    fn failed_write_yields_no_task_line() {
        let mut repo = Repository::load(ReadOnlyStore).unwrap();
        let task = new_task(None, false).into_task(Organization::ETeam).unwrap();

        let result = add_task(&mut repo, task);

        assert!(result.is_err());
        assert!(repo.tasks().is_empty());
    }

    #[test]
    fn failed_write_yields_no_project_line() {
        let mut repo = Repository::load(ReadOnlyStore).unwrap();
        let project = Project::create(
            CreateProjectInput {
                name: "Launch".into(),
                description: None,
            },
            Organization::HumanizeIq,
        );

        let result = add_project(&mut repo, project);

        assert!(result.is_err());
        assert!(repo.projects().is_empty());
    }

    #[test]
    fn draft_line_shows_status() {
        let mut draft = drafts().drafts()[0].clone();
        assert_eq!(draft_line(0, &draft), "1. Fix bug - Bob (no due date) [In Progress]");
        draft.status = Some(TaskStatus::Done);
        draft.due_date = NaiveDate::from_ymd_opt(2025, 2, 3);
        assert_eq!(draft_line(1, &draft), "2. Fix bug - Bob (2025-02-03) [Done]");
    }

    #[test]
    fn orgs_mark_the_active_one() {
        assert_eq!(render_orgs(Organization::ETeam), "  HumanizeIQ\n* eTeam\n");
    }

    #[test]
    fn project_ref_accepts_none() {
        assert_eq!(parse_project_ref("none").unwrap(), None);
        assert!(parse_project_ref("not-a-uuid").is_err());
    }

    #[tokio::test]
    async fn chat_files_issue_with_attachment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();
        let input = format!("/issue\nExport crashes\n/attach {}\n/issue\n/quit\n", path.display());

        let ai = FakeAi::default();
        let tickets = FakeTickets::default();
        let mut session = ChatSession::new();
        let mut out = Vec::new();
        run_chat(&mut session, &ai, &tickets, Cursor::new(input), &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Describe the problem first."));
        assert!(printed.contains("Attached shot.png"));
        assert!(printed.contains("Successfully created issue!"));
        assert_eq!(tickets.filed.lock().unwrap()[0].1, 1);
        assert!(session.attachments().is_empty());
    }
}
