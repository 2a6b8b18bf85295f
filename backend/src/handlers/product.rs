//! Product catalogue handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use shared::{InventoryTotals, ProductFilter};

use super::JsonBody;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::ProductView;
use crate::services::product::{CreateProductInput, UpdateProductInput};
use crate::services::ProductService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(alias = "busca")]
    pub search: Option<String>,
    #[serde(alias = "categoria")]
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<ProductView>>> {
    let filter = ProductFilter::new(query.search.as_deref(), query.category.as_deref());
    let service = ProductService::new(state.db);
    Ok(Json(service.list(user.company_id, &filter).await?))
}

pub async fn product_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<InventoryTotals>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.summary(user.company_id).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.get(user.company_id, product_id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(input), _): JsonBody<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    let service = ProductService::new(state.db);
    let product = service.create(user.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
    WithRejection(Json(input), _): JsonBody<UpdateProductInput>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.update(user.company_id, product_id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    service.delete(user.company_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
