//! Category handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

use super::JsonBody;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Category, CategoryWithCount};
use crate::services::category::CreateCategoryInput;
use crate::services::CategoryService;
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<CategoryWithCount>>> {
    let service = CategoryService::new(state.db);
    Ok(Json(service.list(user.company_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(input), _): JsonBody<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let service = CategoryService::new(state.db);
    let category = service.create(user.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
