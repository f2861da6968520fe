//! JSON HTTP API over the repository, views and adapters.
//!
//! The repository lives behind a mutex. Handlers that call the AI or
//! ticketing adapters read what they need, release the lock, await the
//! network, then lock again to merge the result.

mod handlers;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use taskdesk_core::models::Organization;
use taskdesk_core::{Database, Repository};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::{AiError, Extractor, Summarizer};
use crate::backend::TicketFiler;
use crate::chat::IssueError;

#[derive(Clone)]
pub struct AppState {
    repo: Arc<Mutex<Repository<Database>>>,
    summarizer: Arc<dyn Summarizer>,
    extractor: Arc<dyn Extractor>,
    tickets: Arc<dyn TicketFiler>,
}

impl AppState {
    pub fn new(
        repo: Repository<Database>,
        summarizer: Arc<dyn Summarizer>,
        extractor: Arc<dyn Extractor>,
        tickets: Arc<dyn TicketFiler>,
    ) -> Self {
        Self {
            repo: Arc::new(Mutex::new(repo)),
            summarizer,
            extractor,
            tickets,
        }
    }

    fn repo(&self) -> Result<MutexGuard<'_, Repository<Database>>, ApiError> {
        self.repo
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("repository lock poisoned")))
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Unprocessable(String),
    Upstream(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m),
            Self::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            Self::Upstream(m) => (StatusCode::BAD_GATEWAY, m),
            Self::Internal(e) => {
                tracing::error!("Request failed: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<AiError> for ApiError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::EmptyTranscript => Self::Unprocessable(e.to_string()),
            e => {
                tracing::error!("AI adapter failed: {e}");
                Self::Upstream(e.to_string())
            }
        }
    }
}

impl From<IssueError> for ApiError {
    fn from(e: IssueError) -> Self {
        tracing::error!("Issue filing failed: {e}");
        Self::Upstream(e.to_string())
    }
}

pub(crate) fn parse_org(raw: &str) -> Result<Organization, ApiError> {
    Organization::from_str(raw).ok_or_else(|| ApiError::NotFound(format!("unknown organization {raw}")))
}

pub fn create_router(state: AppState) -> Router {
    let org_routes = Router::new()
        .route("/tasks", get(handlers::list_tasks))
        .route(
            "/action-items",
            get(handlers::list_action_items).post(handlers::create_action_item),
        )
        .route("/project-tasks", post(handlers::create_project_task))
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route("/board", get(handlers::project_board))
        .route("/people", get(handlers::list_people))
        .route("/people/{name}", get(handlers::person_detail))
        .route("/extract", post(handlers::extract_drafts))
        .route("/drafts/confirm", post(handlers::confirm_drafts));

    let api = Router::new()
        .route(
            "/organization",
            get(handlers::get_organization).put(handlers::set_organization),
        )
        .nest("/orgs/{org}", org_routes)
        .route(
            "/tasks/{id}",
            put(handlers::replace_task)
                .patch(handlers::edit_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/{id}/toggle", post(handlers::toggle_task))
        .route("/tasks/{id}/project", put(handlers::move_task))
        .route("/projects/{id}", axum::routing::delete(handlers::delete_project))
        .route("/issues", post(handlers::create_issue));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
