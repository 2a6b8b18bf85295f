//! Company profile handlers

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use super::JsonBody;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Company;
use crate::services::company::UpdateCompanyInput;
use crate::services::CompanyService;
use crate::AppState;

/// The caller's company
pub async fn get_company(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Company>> {
    let service = CompanyService::new(state.db);
    Ok(Json(service.get(user.company_id).await?))
}

pub async fn update_company(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(input), _): JsonBody<UpdateCompanyInput>,
) -> AppResult<Json<Company>> {
    let service = CompanyService::new(state.db);
    Ok(Json(service.update(user.company_id, input).await?))
}
