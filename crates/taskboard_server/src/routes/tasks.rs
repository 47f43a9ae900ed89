//! `/api/tasks` handlers.

use crate::dto::{StatusUpdateRequest, UserTasksResponse};
use crate::error::ApiErrorResponse;
use crate::state::{task_service, AppState};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use taskboard_core::{
    Priority, ServiceError, Task, TaskDraft, TaskId, TaskStatus, UserId, ValidationError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/by-user", get(list_tasks_grouped_by_user))
        .route("/api/tasks/user/{user_id}", get(list_tasks_by_assignee))
        .route("/api/tasks/creator/{user_id}", get(list_tasks_by_creator))
        .route("/api/tasks/tag/{tag}", get(list_tasks_by_tag))
        .route("/api/tasks/status/{status}", get(list_tasks_by_status))
        .route("/api/tasks/priority/{priority}", get(list_tasks_by_priority))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/status", patch(update_task_status))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let tasks = state
        .read(|conn, clock| task_service(conn, clock)?.list_all())
        .await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<TaskId>, PathRejection>,
) -> Result<Json<Task>, ApiErrorResponse> {
    let Path(id) = path?;
    let task = state
        .read(move |conn, clock| {
            task_service(conn, clock)?
                .get_by_id(id)?
                .ok_or(ServiceError::TaskNotFound(id))
        })
        .await?;
    Ok(Json(task))
}

async fn list_tasks_by_assignee(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let Path(user_id) = path?;
    let tasks = state
        .read(move |conn, clock| task_service(conn, clock)?.list_by_assignee(user_id))
        .await?;
    Ok(Json(tasks))
}

async fn list_tasks_by_creator(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let Path(user_id) = path?;
    let tasks = state
        .read(move |conn, clock| task_service(conn, clock)?.list_by_creator(user_id))
        .await?;
    Ok(Json(tasks))
}

async fn list_tasks_by_tag(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let Path(tag) = path?;
    let tasks = state
        .read(move |conn, clock| task_service(conn, clock)?.list_by_tag(&tag))
        .await?;
    Ok(Json(tasks))
}

async fn list_tasks_by_status(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let Path(raw_status) = path?;
    let status = parse_status(Some(&raw_status))?;
    let tasks = state
        .read(move |conn, clock| task_service(conn, clock)?.list_by_status(status))
        .await?;
    Ok(Json(tasks))
}

async fn list_tasks_by_priority(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let Path(raw_priority) = path?;
    let priority = Priority::new(raw_priority)
        .ok_or_else(|| ApiErrorResponse::validation(&ValidationError::PriorityOutOfRange))?;
    let tasks = state
        .read(move |conn, clock| task_service(conn, clock)?.list_by_priority(priority))
        .await?;
    Ok(Json(tasks))
}

async fn list_tasks_grouped_by_user(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserTasksResponse>>, ApiErrorResponse> {
    let groups = state
        .read(|conn, clock| {
            let today = clock.today();
            let groups = task_service(conn, clock)?.list_grouped_by_assignee()?;
            Ok(groups
                .into_iter()
                .map(|group| UserTasksResponse::from_group(group, today))
                .collect())
        })
        .await?;
    Ok(Json(groups))
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiErrorResponse> {
    let Json(draft) = payload?;
    let task = state
        .write(move |conn, clock| task_service(conn, clock)?.create(&draft))
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> Result<Json<Task>, ApiErrorResponse> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let task = state
        .write(move |conn, clock| task_service(conn, clock)?.update(id, patch))
        .await?;
    Ok(Json(task))
}

async fn update_task_status(
    State(state): State<AppState>,
    path: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiErrorResponse> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let status = parse_status(request.status.as_deref())?;
    let task = state
        .write(move |conn, clock| task_service(conn, clock)?.update_status(id, status))
        .await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<TaskId>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let Path(id) = path?;
    state
        .write(move |conn, clock| task_service(conn, clock)?.delete(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_status(raw: Option<&str>) -> Result<TaskStatus, ApiErrorResponse> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiErrorResponse::validation(&ValidationError::StatusMissing))?;
    raw.parse::<TaskStatus>().map_err(|_| {
        ApiErrorResponse::validation(&ValidationError::StatusUnknown(raw.to_string()))
    })
}
