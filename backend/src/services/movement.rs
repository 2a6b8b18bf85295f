//! Movement reconciliation engine
//!
//! Applies a stock entry or exit to a product and records it in the movement
//! log as one unit of work. The product quantity, the movement row and the
//! acting user's withdrawal counter either all change or none do.

use std::fmt;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{next_quantity, MovementFilter, MovementKind, StockError};
use thiserror::Error;

use crate::models::{CategoryRef, MovementDetail, ProductRef};
use crate::store::{NewMovementRecord, StockStore, StockTx, StoreError};

/// Entity a movement refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Product,
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Product => f.write_str("Product"),
            Entity::User => f.write_str("User"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MovementError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// A requested stock movement
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovement {
    pub product_id: i64,
    pub user_id: i64,
    pub kind: MovementKind,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
}

/// Applies and lists stock movements through a [`StockStore`]
pub struct MovementService<S> {
    store: S,
}

impl<S: Clone> Clone for MovementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: StockStore> MovementService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate, apply and record one movement for `company_id`
    ///
    /// All checks run before anything is written. The transaction is rolled
    /// back on every early return because it is dropped uncommitted.
    pub async fn apply_movement(
        &self,
        company_id: i64,
        input: NewMovement,
    ) -> Result<MovementDetail, MovementError> {
        shared::validate_movement_quantity(input.quantity)
            .map_err(|msg| MovementError::InvalidInput(msg.to_string()))?;
        shared::validate_price(input.unit_price)
            .map_err(|msg| MovementError::InvalidInput(msg.to_string()))?;

        let mut tx = self.store.begin().await?;

        let product = tx
            .lock_product(company_id, input.product_id)
            .await?
            .ok_or(MovementError::NotFound(Entity::Product))?;

        let user = tx
            .find_user(company_id, input.user_id)
            .await?
            .ok_or(MovementError::NotFound(Entity::User))?;

        let new_quantity = match next_quantity(product.quantity, input.kind, input.quantity) {
            Ok(quantity) => quantity,
            Err(StockError::Insufficient {
                available,
                requested,
            }) => {
                tracing::warn!(
                    product_id = product.id,
                    available,
                    requested,
                    "Rejected exit: insufficient stock"
                );
                return Err(MovementError::InsufficientStock {
                    available,
                    requested,
                });
            }
            Err(e) => return Err(MovementError::InvalidInput(e.to_string())),
        };

        let now = Utc::now();
        let movement = tx
            .insert_movement(NewMovementRecord {
                company_id,
                product_id: product.id,
                user_id: user.id,
                kind: input.kind,
                quantity: input.quantity,
                unit_price: input.unit_price,
                notes: input.notes,
                created_at: now,
            })
            .await?;

        tx.set_product_quantity(product.id, new_quantity, now).await?;

        // Only withdrawals count against the user
        if input.kind == MovementKind::Exit {
            tx.record_withdrawal(user.id, input.quantity, now).await?;
        }

        tx.commit().await?;

        tracing::info!(
            movement_id = movement.id,
            product_id = product.id,
            kind = %movement.kind,
            quantity = movement.quantity,
            new_quantity,
            "Movement applied"
        );

        Ok(MovementDetail {
            movement,
            product: ProductRef {
                id: product.id,
                name: product.name,
                category: CategoryRef {
                    id: product.category_id,
                    name: product.category_name,
                },
            },
            user,
        })
    }

    /// Movements of `company_id` matching `filter`, newest first
    pub async fn list_movements(
        &self,
        company_id: i64,
        filter: &MovementFilter,
    ) -> Result<Vec<MovementDetail>, MovementError> {
        Ok(self.store.list_movements(company_id, filter).await?)
    }
}
