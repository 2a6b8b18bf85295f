//! PostgreSQL-backed stock store
//!
//! One sqlx transaction per movement. The product row is read with
//! `FOR UPDATE`, so concurrent movements on the same product queue behind the
//! first one and each sees the quantity the previous one committed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::MovementFilter;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{NewMovementRecord, ProductStock, StockStore, StockTx, StoreError, StoreResult};
use crate::models::{
    Movement, MovementDetail, MovementDetailRow, UserRef, MOVEMENT_DETAIL_COLUMNS,
};

#[derive(Clone)]
pub struct PgStockStore {
    db: PgPool,
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

pub struct PgStockTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockStore for PgStockStore {
    type Tx = PgStockTx;

    async fn begin(&self) -> StoreResult<PgStockTx> {
        let tx = self.db.begin().await?;
        Ok(PgStockTx { tx })
    }

    async fn list_movements(
        &self,
        company_id: i64,
        filter: &MovementFilter,
    ) -> StoreResult<Vec<MovementDetail>> {
        let mut query = movement_list_query(company_id, filter);

        let rows = query
            .build_query_as::<MovementDetailRow>()
            .fetch_all(&self.db)
            .await?;

        rows.into_iter()
            .map(|row| {
                MovementDetail::try_from(row)
                    .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
            })
            .collect()
    }
}

/// Build the filtered movement listing query
///
/// Text filters use `strpos` so `%` and `_` in user input are matched literally.
fn movement_list_query(company_id: i64, filter: &MovementFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {} FROM movements m \
         JOIN products p ON p.id = m.product_id \
         JOIN categories c ON c.id = p.category_id \
         JOIN users u ON u.id = m.user_id \
         WHERE m.company_id = ",
        MOVEMENT_DETAIL_COLUMNS
    ));
    query.push_bind(company_id);

    if let Some(search) = &filter.search {
        query
            .push(" AND (strpos(p.name, ")
            .push_bind(search.clone())
            .push(") > 0 OR strpos(u.name, ")
            .push_bind(search.clone())
            .push(") > 0)");
    }
    if let Some(category) = &filter.category {
        query.push(" AND c.name = ").push_bind(category.clone());
    }
    if let Some(user) = &filter.user {
        query.push(" AND u.name = ").push_bind(user.clone());
    }
    if let Some(kind) = &filter.kind {
        query.push(" AND m.kind = ").push_bind(kind.clone());
    }

    query.push(" ORDER BY m.created_at DESC, m.id DESC");
    query
}

#[async_trait]
impl StockTx for PgStockTx {
    async fn lock_product(
        &mut self,
        company_id: i64,
        product_id: i64,
    ) -> StoreResult<Option<ProductStock>> {
        let product = sqlx::query_as::<_, ProductStock>(
            r#"
            SELECT p.id, p.company_id, p.name, p.category_id, c.name AS category_name,
                   p.quantity, p.price, p.min_quantity
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1 AND p.company_id = $2
            FOR UPDATE OF p
            "#,
        )
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn find_user(&mut self, company_id: i64, user_id: i64) -> StoreResult<Option<UserRef>> {
        let user = sqlx::query_as::<_, UserRef>(
            "SELECT id, name, email FROM users WHERE id = $1 AND company_id = $2",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(user)
    }

    async fn insert_movement(&mut self, record: NewMovementRecord) -> StoreResult<Movement> {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements (
                company_id, product_id, user_id, kind, quantity, unit_price, notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, company_id, product_id, user_id, kind, quantity, unit_price,
                      notes, created_at
            "#,
        )
        .bind(record.company_id)
        .bind(record.product_id)
        .bind(record.user_id)
        .bind(record.kind.as_str())
        .bind(record.quantity)
        .bind(record.unit_price)
        .bind(&record.notes)
        .bind(record.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(movement)
    }

    async fn set_product_quantity(
        &mut self,
        product_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE products SET quantity = $1, updated_at = $2 WHERE id = $3")
            .bind(quantity)
            .bind(now)
            .bind(product_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn record_withdrawal(
        &mut self,
        user_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET withdrawn_units = withdrawn_units + $1, last_activity_at = $2
            WHERE id = $3
            "#,
        )
        .bind(quantity)
        .bind(now)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_listing_is_scoped_and_ordered() {
        let query = movement_list_query(7, &MovementFilter::default());
        let sql = query.sql();
        assert!(sql.contains("WHERE m.company_id = $1"));
        assert!(sql.ends_with("ORDER BY m.created_at DESC, m.id DESC"));
        assert!(!sql.contains("strpos"));
    }

    #[test]
    fn every_active_filter_adds_a_bound_condition() {
        let filter = MovementFilter::new(Some("Mouse"), Some("Periféricos"), Some("Ana"), Some("SAIDA"));
        let query = movement_list_query(7, &filter);
        let sql = query.sql();

        assert!(sql.contains("strpos(p.name, $2) > 0 OR strpos(u.name, $3) > 0"));
        assert!(sql.contains("c.name = $4"));
        assert!(sql.contains("u.name = $5"));
        assert!(sql.contains("m.kind = $6"));
    }
}
