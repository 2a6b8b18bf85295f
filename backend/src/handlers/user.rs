//! User management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::JsonBody;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{User, UserListItem, UserWithMovements};
use crate::services::user::{CreateUserInput, UpdateUserInput};
use crate::services::UserService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(alias = "busca")]
    pub search: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserListItem>>> {
    let service = UserService::new(state.db);
    let users = service
        .list(user.company_id, query.search.as_deref())
        .await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserWithMovements>> {
    let service = UserService::new(state.db);
    Ok(Json(service.get_with_movements(user.company_id, user_id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(input), _): JsonBody<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let service = UserService::new(state.db);
    let created = service.create(user.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
    WithRejection(Json(input), _): JsonBody<UpdateUserInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    Ok(Json(service.update(user.company_id, user_id, input).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = UserService::new(state.db);
    service.delete(user.company_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
