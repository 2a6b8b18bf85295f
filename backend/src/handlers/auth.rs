//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

use super::JsonBody;
use crate::error::AppResult;
use crate::services::auth::{LoginInput, LoginResponse, RegisterInput, RegisterResponse};
use crate::services::AuthService;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(body).await?;
    Ok(Json(response))
}

/// Register company endpoint handler
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
