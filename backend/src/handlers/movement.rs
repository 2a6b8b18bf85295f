//! Stock movement handlers
//!
//! Generic over the store so the same handlers serve Postgres in production
//! and the in-memory store in tests.

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use shared::MovementFilter;

use super::JsonBody;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::MovementDetail;
use crate::services::{MovementService, NewMovement};
use crate::store::StockStore;

/// Listing filters; the Portuguese names are accepted as aliases
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    #[serde(alias = "busca")]
    pub search: Option<String>,
    #[serde(alias = "categoria")]
    pub category: Option<String>,
    #[serde(alias = "usuario")]
    pub user: Option<String>,
    #[serde(alias = "tipo")]
    pub kind: Option<String>,
}

impl MovementQuery {
    pub fn to_filter(&self) -> MovementFilter {
        MovementFilter::new(
            self.search.as_deref(),
            self.category.as_deref(),
            self.user.as_deref(),
            self.kind.as_deref(),
        )
    }
}

/// Apply a movement for the caller's company
pub async fn create_movement<S>(
    State(service): State<MovementService<S>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(input), _): JsonBody<NewMovement>,
) -> AppResult<(StatusCode, Json<MovementDetail>)>
where
    S: StockStore + Clone,
{
    let movement = service.apply_movement(user.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn list_movements<S>(
    State(service): State<MovementService<S>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<MovementDetail>>>
where
    S: StockStore + Clone,
{
    let movements = service
        .list_movements(user.company_id, &query.to_filter())
        .await?;
    Ok(Json(movements))
}

/// Movement routes for any state that can hand out a [`MovementService`]
pub fn movement_routes<S, T>() -> Router<T>
where
    S: StockStore + Clone,
    MovementService<S>: FromRef<T>,
    T: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(list_movements::<S>).post(create_movement::<S>))
}
