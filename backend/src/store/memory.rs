//! In-memory stock store
//!
//! Used by the test suites. A transaction holds the store-wide lock for its
//! whole lifetime and works on a copy of the state, which replaces the shared
//! state on commit. Transactions are therefore fully serialised.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::MovementFilter;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{NewMovementRecord, ProductStock, StockStore, StockTx, StoreError, StoreResult};
use crate::models::{CategoryRef, Movement, MovementDetail, ProductRef, UserRef};

#[derive(Debug, Clone)]
struct MemCategory {
    company_id: i64,
    name: String,
}

#[derive(Debug, Clone)]
struct MemProduct {
    company_id: i64,
    category_id: i64,
    name: String,
    price: Decimal,
    quantity: i32,
    min_quantity: i32,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct MemUser {
    company_id: i64,
    name: String,
    email: String,
    withdrawn_units: i32,
    last_activity_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: i64,
    categories: BTreeMap<i64, MemCategory>,
    products: BTreeMap<i64, MemProduct>,
    users: BTreeMap<i64, MemUser>,
    movements: Vec<Movement>,
    fail_next_commit: bool,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn detail(&self, movement: &Movement) -> Option<MovementDetail> {
        let product = self.products.get(&movement.product_id)?;
        let category = self.categories.get(&product.category_id)?;
        let user = self.users.get(&movement.user_id)?;

        Some(MovementDetail {
            movement: movement.clone(),
            product: ProductRef {
                id: movement.product_id,
                name: product.name.clone(),
                category: CategoryRef {
                    id: product.category_id,
                    name: category.name.clone(),
                },
            },
            user: UserRef {
                id: movement.user_id,
                name: user.name.clone(),
                email: user.email.clone(),
            },
        })
    }
}

/// Store kept entirely in process memory
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a company id; companies carry no other state here
    pub async fn add_company(&self) -> i64 {
        self.state.lock().await.allocate_id()
    }

    pub async fn add_category(&self, company_id: i64, name: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        state.categories.insert(
            id,
            MemCategory {
                company_id,
                name: name.to_string(),
            },
        );
        id
    }

    pub async fn add_product(
        &self,
        company_id: i64,
        category_id: i64,
        name: &str,
        quantity: i32,
        min_quantity: i32,
        price: Decimal,
    ) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        state.products.insert(
            id,
            MemProduct {
                company_id,
                category_id,
                name: name.to_string(),
                price,
                quantity,
                min_quantity,
                updated_at: None,
            },
        );
        id
    }

    pub async fn add_user(&self, company_id: i64, name: &str, email: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        state.users.insert(
            id,
            MemUser {
                company_id,
                name: name.to_string(),
                email: email.to_string(),
                withdrawn_units: 0,
                last_activity_at: None,
            },
        );
        id
    }

    /// Make the next commit fail after all writes were staged
    pub async fn fail_next_commit(&self) {
        self.state.lock().await.fail_next_commit = true;
    }

    pub async fn product_quantity(&self, product_id: i64) -> Option<i32> {
        self.state
            .lock()
            .await
            .products
            .get(&product_id)
            .map(|p| p.quantity)
    }

    pub async fn product_updated_at(&self, product_id: i64) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .await
            .products
            .get(&product_id)
            .and_then(|p| p.updated_at)
    }

    pub async fn user_withdrawn(&self, user_id: i64) -> Option<i32> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .map(|u| u.withdrawn_units)
    }

    pub async fn user_last_activity(&self, user_id: i64) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .and_then(|u| u.last_activity_at)
    }

    pub async fn movement_count(&self) -> usize {
        self.state.lock().await.movements.len()
    }

    /// Every movement ever recorded, in insertion order
    pub async fn movements(&self) -> Vec<Movement> {
        self.state.lock().await.movements.clone()
    }
}

pub struct InMemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl StockStore for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> StoreResult<InMemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTx { guard, staged })
    }

    async fn list_movements(
        &self,
        company_id: i64,
        filter: &MovementFilter,
    ) -> StoreResult<Vec<MovementDetail>> {
        let state = self.state.lock().await;

        let mut details: Vec<MovementDetail> = state
            .movements
            .iter()
            .filter(|m| m.company_id == company_id)
            .filter_map(|m| state.detail(m))
            .filter(|d| {
                filter.matches(
                    &d.product.name,
                    &d.product.category.name,
                    &d.user.name,
                    d.movement.kind,
                )
            })
            .collect();

        details.sort_by(|a, b| {
            b.movement
                .created_at
                .cmp(&a.movement.created_at)
                .then(b.movement.id.cmp(&a.movement.id))
        });

        Ok(details)
    }
}

#[async_trait]
impl StockTx for InMemoryTx {
    async fn lock_product(
        &mut self,
        company_id: i64,
        product_id: i64,
    ) -> StoreResult<Option<ProductStock>> {
        let Some(product) = self
            .staged
            .products
            .get(&product_id)
            .filter(|p| p.company_id == company_id)
        else {
            return Ok(None);
        };

        let category_name = self
            .staged
            .categories
            .get(&product.category_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| {
                StoreError::Unavailable(format!("category {} missing", product.category_id))
            })?;

        Ok(Some(ProductStock {
            id: product_id,
            company_id: product.company_id,
            name: product.name.clone(),
            category_id: product.category_id,
            category_name,
            quantity: product.quantity,
            price: product.price,
            min_quantity: product.min_quantity,
        }))
    }

    async fn find_user(&mut self, company_id: i64, user_id: i64) -> StoreResult<Option<UserRef>> {
        Ok(self
            .staged
            .users
            .get(&user_id)
            .filter(|u| u.company_id == company_id)
            .map(|u| UserRef {
                id: user_id,
                name: u.name.clone(),
                email: u.email.clone(),
            }))
    }

    async fn insert_movement(&mut self, record: NewMovementRecord) -> StoreResult<Movement> {
        let movement = Movement {
            id: self.staged.allocate_id(),
            company_id: record.company_id,
            product_id: record.product_id,
            user_id: record.user_id,
            kind: record.kind,
            quantity: record.quantity,
            unit_price: record.unit_price,
            notes: record.notes,
            created_at: record.created_at,
        };
        self.staged.movements.push(movement.clone());
        Ok(movement)
    }

    async fn set_product_quantity(
        &mut self,
        product_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let product = self
            .staged
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::Unavailable(format!("product {} missing", product_id)))?;
        product.quantity = quantity;
        product.updated_at = Some(now);
        Ok(())
    }

    async fn record_withdrawal(
        &mut self,
        user_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let user = self
            .staged
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Unavailable(format!("user {} missing", user_id)))?;
        user.withdrawn_units = user.withdrawn_units.checked_add(quantity).ok_or_else(|| {
            StoreError::Unavailable(format!("withdrawal counter of user {} overflows", user_id))
        })?;
        user.last_activity_at = Some(now);
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        let InMemoryTx { mut guard, staged } = self;
        if guard.fail_next_commit {
            guard.fail_next_commit = false;
            return Err(StoreError::Unavailable("simulated commit failure".into()));
        }
        *guard = staged;
        Ok(())
    }
}
