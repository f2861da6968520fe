use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdesk::ai::{Extractor, GeminiClient};
use taskdesk::api::{self, AppState};
use taskdesk::backend::BackendClient;
use taskdesk::chat::ChatSession;
use taskdesk::commands::{self, NewTask, ReviewOutcome};
use taskdesk::config::{AppConfig, ConfigInputs, DEFAULT_COOKIE_FILE, DEFAULT_LOCATION};
use taskdesk_core::models::{Organization, TaskEdit, TaskKind};
use taskdesk_core::views::{self, DraftBoard, ProjectForm, SortKey};
use taskdesk_core::{Database, Repository};

#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "Task and project tracking with AI-assisted action items and issue filing")]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Organization to act on (defaults to the active one)
    #[arg(long, global = true)]
    org: Option<String>,

    /// Deployment location URL, used to pick backend and AI endpoints
    #[arg(long, global = true, env = "TASKDESK_LOCATION", default_value = DEFAULT_LOCATION)]
    location: String,

    /// Studio cookie file
    #[arg(long, global = true, default_value = DEFAULT_COOKIE_FILE)]
    cookie_file: PathBuf,

    /// Gemini model
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Show or switch the active organization
    Org { name: Option<String> },
    /// Manage tasks
    #[command(subcommand)]
    Tasks(TaskCommands),
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectCommands),
    /// List team members, or show one person's tasks
    People {
        name: Option<String>,
        /// Sort key: dueDate or status
        #[arg(long, default_value = "dueDate")]
        sort: String,
    },
    /// Extract action items from a meeting transcript
    Extract {
        /// Transcript file (.txt)
        file: Option<PathBuf>,
        /// Transcript text instead of a file
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Confirm every draft without review
        #[arg(short, long)]
        yes: bool,
    },
    /// Report an issue through an interactive chat
    Chat,
    /// List files known to the backend
    Files,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        /// Only action items
        #[arg(long, conflicts_with = "project_tasks")]
        action_items: bool,
        /// Only project tasks
        #[arg(long)]
        project_tasks: bool,
    },
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        assignee: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Project id to attach the task to
        #[arg(long)]
        project: Option<String>,
        /// Add as a project task instead of an action item
        #[arg(long)]
        project_task: bool,
    },
    /// Flip a task between In Progress and Done
    Toggle { id: uuid::Uuid },
    /// Replace a task's title, assignee and due date
    Edit {
        id: uuid::Uuid,
        #[arg(long)]
        title: String,
        #[arg(short, long)]
        assignee: String,
        #[arg(long)]
        due: Option<String>,
    },
    /// Move a task to another project, or `none`
    Move { id: uuid::Uuid, project: String },
    /// Delete a task
    Delete { id: uuid::Uuid },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List projects
    List,
    /// Add a project
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a project; its tasks become floating
    Delete { id: uuid::Uuid },
    /// Show project tasks grouped by project
    Board,
}

fn open_repository(path: Option<&PathBuf>) -> anyhow::Result<Repository<Database>> {
    let db = match path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Repository::load(db)
}

fn resolve_org(repo: &Repository<Database>, flag: Option<&str>) -> anyhow::Result<Organization> {
    match flag {
        Some(raw) => Organization::from_str(raw).with_context(|| format!("Unknown organization {raw:?}")),
        None => repo.active_organization(),
    }
}

fn api_key_from_env() -> Option<String> {
    std::env::var("API_KEY")
        .ok()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "taskdesk=info,taskdesk_core=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(ConfigInputs {
        location: cli.location.clone(),
        api_key: api_key_from_env(),
        model: cli.model.clone(),
        cookie_file: cli.cookie_file.clone(),
    });
    let mut repo = open_repository(cli.db.as_ref())?;
    let org = resolve_org(&repo, cli.org.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve { port: 3000 }) {
        Commands::Serve { port } => {
            let ai = Arc::new(GeminiClient::new(&config.ai));
            let tickets = Arc::new(BackendClient::new(&config));
            let app = api::create_router(AppState::new(repo, ai.clone(), ai, tickets));

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Taskdesk server listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Org { name } => match name {
            Some(name) => {
                let org = Organization::from_str(&name)
                    .with_context(|| format!("Unknown organization {name:?}"))?;
                repo.set_active_organization(org)?;
                println!("Active organization: {org}");
            }
            None => print!("{}", commands::render_orgs(org)),
        },
        Commands::Tasks(command) => run_task_command(&mut repo, org, command)?,
        Commands::Projects(command) => run_project_command(&mut repo, org, command)?,
        Commands::People { name, sort } => {
            let sort = SortKey::from_str(&sort).with_context(|| format!("Unknown sort key {sort:?}"))?;
            match name {
                Some(name) => print!("{}", commands::render_person(&views::person_detail(&repo, org, &name, sort))),
                None => print!("{}", commands::render_people(&views::people(&repo, org))),
            }
        }
        Commands::Extract { file, text, yes } => {
            let transcript = match (file, text) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, Some(text)) => text,
                (None, None) => bail!("Provide a transcript file or --text"),
            };
            let client = GeminiClient::new(&config.ai);
            let drafts = client.extract(&transcript, org.team_members()).await?;
            let mut board = DraftBoard::new(drafts);

            let outcome = if yes {
                ReviewOutcome::Confirm
            } else {
                let stdin = io::stdin();
                commands::review_drafts(&mut board, stdin.lock(), &mut io::stdout())?
            };
            match outcome {
                ReviewOutcome::Confirm => {
                    let created = board.confirm(&mut repo, org)?;
                    println!("Added {} action items to {org}", created.len());
                }
                ReviewOutcome::Discard => println!("Discarded drafts"),
            }
        }
        Commands::Chat => {
            let ai = GeminiClient::new(&config.ai);
            let tickets = BackendClient::new(&config);
            let mut session = ChatSession::new();
            let stdin = BufReader::new(io::stdin());
            commands::run_chat(&mut session, &ai, &tickets, stdin, &mut io::stdout()).await?;
        }
        Commands::Files => {
            let exchange = BackendClient::new(&config).list_files().await?;
            println!("{}", serde_json::to_string_pretty(&exchange)?);
        }
    }

    Ok(())
}

fn run_task_command(
    repo: &mut Repository<Database>,
    org: Organization,
    command: TaskCommands,
) -> anyhow::Result<()> {
    match command {
        TaskCommands::List {
            action_items,
            project_tasks,
        } => {
            for task in repo.list_tasks(org) {
                let shown = match (action_items, project_tasks) {
                    (true, _) => task.kind == TaskKind::ActionItem,
                    (_, true) => task.kind == TaskKind::ProjectTask,
                    _ => true,
                };
                if shown {
                    println!("{}", commands::task_line(task));
                }
            }
        }
        TaskCommands::Add {
            title,
            assignee,
            due,
            description,
            project,
            project_task,
        } => {
            let due_date = due.as_deref().map(commands::parse_due).transpose()?;
            let project_id = match project.as_deref() {
                Some(raw) => commands::parse_project_ref(raw)?,
                None => None,
            };
            let fields = NewTask {
                title,
                assignee,
                due_date,
                description,
                project_id,
                project_task,
            };
            match fields.into_task(org) {
                Some(task) => println!("{}", commands::add_task(repo, task)?),
                None => println!("Title and assignee are required; nothing added"),
            }
        }
        TaskCommands::Toggle { id } => match repo.toggle_task(id)? {
            Some(task) => println!("{}", commands::task_line(&task)),
            None => bail!("Task {id} not found"),
        },
        TaskCommands::Edit {
            id,
            title,
            assignee,
            due,
        } => {
            let due_date = due.as_deref().map(commands::parse_due).transpose()?;
            let edit = TaskEdit {
                title,
                assignee,
                due_date,
            };
            match repo.edit_task(id, edit)? {
                Some(task) => println!("{}", commands::task_line(&task)),
                None => bail!("Task {id} not found"),
            }
        }
        TaskCommands::Move { id, project } => {
            let project_id = commands::parse_project_ref(&project)?;
            match repo.move_task(id, project_id)? {
                Some(task) => println!("{}", commands::task_line(&task)),
                None => bail!("Task {id} not found"),
            }
        }
        TaskCommands::Delete { id } => {
            if !repo.delete_task(id)? {
                bail!("Task {id} not found");
            }
            println!("Deleted task {id}");
        }
    }
    Ok(())
}

fn run_project_command(
    repo: &mut Repository<Database>,
    org: Organization,
    command: ProjectCommands,
) -> anyhow::Result<()> {
    match command {
        ProjectCommands::List => {
            for project in repo.list_projects(org) {
                println!("{}", commands::project_line(project));
            }
        }
        ProjectCommands::Add { name, description } => {
            match (ProjectForm { name, description }).into_project(org) {
                Some(project) => println!("{}", commands::add_project(repo, project)?),
                None => println!("Project name is required; nothing added"),
            }
        }
        ProjectCommands::Delete { id } => {
            if !repo.delete_project(id)? {
                bail!("Project {id} not found");
            }
            println!("Deleted project {id}");
        }
        ProjectCommands::Board => {
            print!("{}", commands::render_board(&views::project_board(repo, org)));
        }
    }
    Ok(())
}
