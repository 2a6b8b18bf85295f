//! Persistence seam for the movement reconciliation engine
//!
//! The engine never touches a pool directly. It opens a [`StockTx`] through a
//! [`StockStore`], and everything it writes becomes visible on `commit` or not
//! at all. Dropping a transaction without committing rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{MovementFilter, MovementKind};
use thiserror::Error;

use crate::models::{Movement, MovementDetail, UserRef};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStockStore;

/// Persistence faults surfaced by a store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Product row as seen by the engine, read under the transaction's lock
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductStock {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub min_quantity: i32,
}

/// Movement row to insert
#[derive(Debug, Clone)]
pub struct NewMovementRecord {
    pub company_id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub kind: MovementKind,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Store of products, users and the movement log
#[async_trait]
pub trait StockStore: Send + Sync + 'static {
    type Tx: StockTx;

    /// Open a unit of work
    async fn begin(&self) -> StoreResult<Self::Tx>;

    /// Movements of one company matching `filter`, newest first
    async fn list_movements(
        &self,
        company_id: i64,
        filter: &MovementFilter,
    ) -> StoreResult<Vec<MovementDetail>>;
}

/// One unit of work against a [`StockStore`]
#[async_trait]
pub trait StockTx: Send {
    /// Read a product of `company_id` and hold it against concurrent
    /// movements until this transaction ends
    async fn lock_product(
        &mut self,
        company_id: i64,
        product_id: i64,
    ) -> StoreResult<Option<ProductStock>>;

    async fn find_user(&mut self, company_id: i64, user_id: i64) -> StoreResult<Option<UserRef>>;

    async fn insert_movement(&mut self, record: NewMovementRecord) -> StoreResult<Movement>;

    async fn set_product_quantity(
        &mut self,
        product_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Add `quantity` to the user's withdrawn units and stamp their activity
    async fn record_withdrawal(
        &mut self,
        user_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;
}
