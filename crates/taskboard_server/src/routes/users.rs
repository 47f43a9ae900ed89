//! `/api/users` handlers.

use crate::dto::UserResponse;
use crate::error::ApiErrorResponse;
use crate::state::{user_service, AppState};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use taskboard_core::{ServiceError, UserDraft, UserId};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiErrorResponse> {
    let users = state
        .read(|conn, clock| {
            let today = clock.today();
            Ok(user_service(conn, clock)?
                .list_all()?
                .into_iter()
                .map(|user| UserResponse::from_user(user, today))
                .collect())
        })
        .await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<UserResponse>, ApiErrorResponse> {
    let Path(id) = path?;
    let user = state
        .read(move |conn, clock| {
            let user = user_service(conn, clock)?
                .get_by_id(id)?
                .ok_or(ServiceError::UserNotFound(id))?;
            Ok(UserResponse::from_user(user, clock.today()))
        })
        .await?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiErrorResponse> {
    let Json(draft) = payload?;
    let user = state
        .write(move |conn, clock| {
            let user = user_service(conn, clock)?.create(&draft)?;
            Ok(UserResponse::from_user(user, clock.today()))
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErrorResponse> {
    let Path(id) = path?;
    let Json(draft) = payload?;
    let user = state
        .write(move |conn, clock| {
            let user = user_service(conn, clock)?.update(id, &draft)?;
            Ok(UserResponse::from_user(user, clock.today()))
        })
        .await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let Path(id) = path?;
    state
        .write(move |conn, clock| user_service(conn, clock)?.delete(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
