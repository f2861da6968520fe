use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use taskdesk_core::models::{
    Attachment, ChatMessage, DraftActionItem, Organization, Project, Task, TaskEdit,
};
use taskdesk_core::views::{
    self, ActionItemForm, PersonSummary, ProjectForm, ProjectTaskForm, SortKey,
};
use uuid::Uuid;

use super::{parse_org, ApiError, AppState};
use crate::chat::{file_issue_from_conversation, has_user_message};

type ApiResult<T> = Result<T, ApiError>;

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.into()))
}

fn created<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

fn task_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("task {id} not found"))
}

#[derive(Debug, Deserialize)]
pub struct OrganizationBody {
    organization: String,
}

pub async fn get_organization(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let org = state.repo()?.active_organization()?;
    Ok(Json(json!({ "organization": org })))
}

pub async fn set_organization(
    State(state): State<AppState>,
    Json(body): Json<OrganizationBody>,
) -> ApiResult<Json<Value>> {
    let org = Organization::from_str(&body.organization).ok_or_else(|| {
        ApiError::Unprocessable(format!("unknown organization {}", body.organization))
    })?;
    state.repo()?.set_active_organization(org)?;
    Ok(Json(json!({ "organization": org })))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let org = parse_org(&org)?;
    let repo = state.repo()?;
    Ok(Json(repo.list_tasks(org).into_iter().cloned().collect()))
}

pub async fn list_action_items(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let org = parse_org(&org)?;
    let repo = state.repo()?;
    Ok(Json(views::action_items(&*repo, org).into_iter().cloned().collect()))
}

/// Blank title or assignee is ignored with 204, matching the form behaviour.
pub async fn create_action_item(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(form): Json<ActionItemForm>,
) -> ApiResult<Response> {
    let org = parse_org(&org)?;
    let Some(task) = form.into_task(org) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    state.repo()?.add_task(task.clone())?;
    Ok(created(task))
}

pub async fn create_project_task(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(form): Json<ProjectTaskForm>,
) -> ApiResult<Response> {
    let org = parse_org(&org)?;
    let Some(task) = form.into_task(org) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    state.repo()?.add_task(task.clone())?;
    Ok(created(task))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<Vec<Project>>> {
    let org = parse_org(&org)?;
    let repo = state.repo()?;
    Ok(Json(repo.list_projects(org).into_iter().cloned().collect()))
}

pub async fn create_project(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(form): Json<ProjectForm>,
) -> ApiResult<Response> {
    let org = parse_org(&org)?;
    let Some(project) = form.into_project(org) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    state.repo()?.add_project(project.clone())?;
    Ok(created(project))
}

pub async fn project_board(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<Value>> {
    let org = parse_org(&org)?;
    let repo = state.repo()?;
    let board = views::project_board(&*repo, org);
    Ok(Json(to_json(&board)?))
}

pub async fn list_people(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<Vec<PersonSummary>>> {
    let org = parse_org(&org)?;
    let repo = state.repo()?;
    Ok(Json(views::people(&*repo, org)))
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonQuery {
    sort: Option<String>,
}

pub async fn person_detail(
    State(state): State<AppState>,
    Path((org, name)): Path<(String, String)>,
    Query(query): Query<PersonQuery>,
) -> ApiResult<Json<Value>> {
    let org = parse_org(&org)?;
    let sort = match query.sort.as_deref() {
        None => SortKey::default(),
        Some(raw) => SortKey::from_str(raw)
            .ok_or_else(|| ApiError::Unprocessable(format!("unknown sort key {raw}")))?,
    };
    let repo = state.repo()?;
    let detail = views::person_detail(&*repo, org, &name, sort);
    Ok(Json(to_json(&detail)?))
}

#[derive(Debug, Deserialize)]
pub struct ExtractBody {
    #[serde(default)]
    transcript: String,
}

/// Returns drafts only; nothing is stored until they are confirmed.
pub async fn extract_drafts(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(body): Json<ExtractBody>,
) -> ApiResult<Json<Vec<DraftActionItem>>> {
    let org = parse_org(&org)?;
    if body.transcript.trim().is_empty() {
        return Err(ApiError::Unprocessable("transcript is empty".to_string()));
    }
    let drafts = state
        .extractor
        .extract(&body.transcript, org.team_members())
        .await?;
    Ok(Json(drafts))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmBody {
    drafts: Vec<DraftActionItem>,
}

pub async fn confirm_drafts(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(body): Json<ConfirmBody>,
) -> ApiResult<Response> {
    let org = parse_org(&org)?;
    let mut repo = state.repo()?;
    let tasks = views::confirm_drafts(&mut *repo, body.drafts, org)?;
    Ok(created(tasks))
}

pub async fn replace_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut task): Json<Task>,
) -> ApiResult<Json<Task>> {
    task.id = id;
    if state.repo()?.update_task(task.clone())? {
        Ok(Json(task))
    } else {
        Err(task_not_found(id))
    }
}

pub async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<TaskEdit>,
) -> ApiResult<Json<Task>> {
    let task = state.repo()?.edit_task(id, edit)?;
    task.map(Json).ok_or_else(|| task_not_found(id))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.repo()?.toggle_task(id)?;
    task.map(Json).ok_or_else(|| task_not_found(id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBody {
    project_id: Option<Uuid>,
}

pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveBody>,
) -> ApiResult<Json<Task>> {
    let task = state.repo()?.move_task(id, body.project_id)?;
    task.map(Json).ok_or_else(|| task_not_found(id))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.repo()?.delete_task(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found(id))
    }
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.repo()?.delete_project(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("project {id} not found")))
    }
}

#[derive(Debug, Deserialize)]
pub struct IssueBody {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

pub async fn create_issue(
    State(state): State<AppState>,
    Json(body): Json<IssueBody>,
) -> ApiResult<Json<Value>> {
    if !has_user_message(&body.messages) {
        return Err(ApiError::Unprocessable(
            "conversation has no user message".to_string(),
        ));
    }
    let response = file_issue_from_conversation(
        state.summarizer.as_ref(),
        state.tickets.as_ref(),
        &body.messages,
        &body.attachments,
    )
    .await?;
    Ok(Json(response))
}
