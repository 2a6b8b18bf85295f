use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::StockStatus;
use sqlx::FromRow;

use super::ProductMovement;

/// Movements shown with each product, newest first
pub const RECENT_MOVEMENTS_LIMIT: usize = 5;

/// Column list (aliased `p` / `c`) shared by every query returning [`Product`]
pub const PRODUCT_COLUMNS: &str = "p.id, p.company_id, p.category_id, c.name AS category_name, \
     p.name, p.description, p.price, p.quantity, p.min_quantity, p.created_at, p.updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub company_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub min_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.min_quantity)
    }
}

/// Product as returned by the API, with its stock level classified and its
/// latest movements
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
    pub recent_movements: Vec<ProductMovement>,
}

impl ProductView {
    /// `movements` must be newest first; only the first
    /// [`RECENT_MOVEMENTS_LIMIT`] are kept
    pub fn new(product: Product, mut movements: Vec<ProductMovement>) -> Self {
        movements.truncate(RECENT_MOVEMENTS_LIMIT);
        Self {
            stock_status: product.stock_status(),
            product,
            recent_movements: movements,
        }
    }
}
