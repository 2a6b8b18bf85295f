//! Product catalogue service
//!
//! Products are created with an initial quantity; afterwards the quantity only
//! changes through the movement engine, never through [`ProductService::update`].

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{InventoryTotals, ProductFilter};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::validation;
use crate::models::{
    group_by_owner, Product, ProductMovement, ProductView, PRODUCT_COLUMNS, RECENT_MOVEMENTS_LIMIT,
};

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    #[validate(custom = "crate::validation::price")]
    pub price: Decimal,
    pub quantity: i32,
    pub min_quantity: i32,
}

/// Editable product fields; the quantity is deliberately absent
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    #[validate(custom = "crate::validation::price")]
    pub price: Decimal,
    pub min_quantity: i32,
}

/// Price and stock figures of one product, used for the summary
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    quantity: i32,
    min_quantity: i32,
    price: Decimal,
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Products of the company ordered by name, each with its latest movements
    pub async fn list(&self, company_id: i64, filter: &ProductFilter) -> AppResult<Vec<ProductView>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM products p JOIN categories c ON c.id = p.category_id WHERE p.company_id = ",
            PRODUCT_COLUMNS
        ));
        query.push_bind(company_id);

        if let Some(search) = &filter.search {
            query
                .push(" AND (strpos(p.name, ")
                .push_bind(search.clone())
                .push(") > 0 OR strpos(COALESCE(p.description, ''), ")
                .push_bind(search.clone())
                .push(") > 0)");
        }
        if let Some(category) = &filter.category {
            query.push(" AND c.name = ").push_bind(category.clone());
        }
        query.push(" ORDER BY p.name ASC, p.id ASC");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.db)
            .await?;

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let movements = self.recent_movements(company_id, &ids).await?;

        Ok(attach_recent_movements(products, movements))
    }

    /// Latest movements of each listed product, newest first per product
    async fn recent_movements(
        &self,
        company_id: i64,
        product_ids: &[i64],
    ) -> AppResult<Vec<ProductMovement>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let movements = sqlx::query_as::<_, ProductMovement>(
            r#"
            SELECT id, product_id, kind, quantity, created_at, user_name
            FROM (
                SELECT m.id, m.product_id, m.kind, m.quantity, m.created_at,
                       u.name AS user_name,
                       ROW_NUMBER() OVER (
                           PARTITION BY m.product_id ORDER BY m.created_at DESC, m.id DESC
                       ) AS recency
                FROM movements m
                JOIN users u ON u.id = m.user_id
                WHERE m.company_id = $1 AND m.product_id = ANY($2)
            ) ranked
            WHERE recency <= $3
            ORDER BY product_id, created_at DESC, id DESC
            "#,
        )
        .bind(company_id)
        .bind(product_ids)
        .bind(RECENT_MOVEMENTS_LIMIT as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Unit, value and stock-level totals over the company's products
    pub async fn summary(&self, company_id: i64) -> AppResult<InventoryTotals> {
        let rows = sqlx::query_as::<_, StockRow>(
            "SELECT quantity, min_quantity, price FROM products WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.quantity, r.min_quantity, r.price))
            .collect())
    }

    pub async fn get(&self, company_id: i64, product_id: i64) -> AppResult<ProductView> {
        let product = self
            .find(company_id, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let movements = self.recent_movements(company_id, &[product.id]).await?;

        Ok(ProductView::new(product, movements))
    }

    async fn find(&self, company_id: i64, product_id: i64) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p JOIN categories c ON c.id = p.category_id \
             WHERE p.id = $1 AND p.company_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }

    async fn ensure_category(&self, company_id: i64, category_id: i64) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND company_id = $2)",
        )
        .bind(category_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::MissingReference("Category".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, company_id: i64, input: CreateProductInput) -> AppResult<ProductView> {
        input.validate()?;
        validation::stock_level("quantity", input.quantity)?;
        validation::stock_level("minQuantity", input.min_quantity)?;
        self.ensure_category(company_id, input.category_id).await?;

        let product_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (company_id, category_id, name, description, price, quantity,
                                  min_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(company_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.min_quantity)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(company_id, product_id, quantity = input.quantity, "Product created");

        self.get(company_id, product_id).await
    }

    pub async fn update(
        &self,
        company_id: i64,
        product_id: i64,
        input: UpdateProductInput,
    ) -> AppResult<ProductView> {
        input.validate()?;
        validation::stock_level("minQuantity", input.min_quantity)?;
        self.ensure_category(company_id, input.category_id).await?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET name = $3, description = $4, category_id = $5, price = $6, min_quantity = $7,
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(product_id)
        .bind(company_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.min_quantity)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.get(company_id, product_id).await
    }

    /// Delete a product that has no movements
    pub async fn delete(&self, company_id: i64, product_id: i64) -> AppResult<()> {
        let product = self
            .find(company_id, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let has_movements = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM movements WHERE product_id = $1)",
        )
        .bind(product.id)
        .fetch_one(&self.db)
        .await?;

        if has_movements {
            return Err(AppError::HasMovements("Product".to_string()));
        }

        sqlx::query("DELETE FROM products WHERE id = $1 AND company_id = $2")
            .bind(product.id)
            .bind(company_id)
            .execute(&self.db)
            .await?;

        tracing::info!(company_id, product_id, "Product deleted");

        Ok(())
    }
}

/// Pair each product with its movements; `movements` is newest first per product
fn attach_recent_movements(
    products: Vec<Product>,
    movements: Vec<ProductMovement>,
) -> Vec<ProductView> {
    let mut by_product = group_by_owner(movements, |m| m.product_id);
    products
        .into_iter()
        .map(|product| {
            let recent = by_product.remove(&product.id).unwrap_or_default();
            ProductView::new(product, recent)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::{MovementKind, StockStatus};

    fn product(id: i64, quantity: i32) -> Product {
        let now = Utc::now();
        Product {
            id,
            company_id: 1,
            category_id: 1,
            category_name: "Periféricos".to_string(),
            name: format!("Produto {}", id),
            description: None,
            price: Decimal::new(1990, 2),
            quantity,
            min_quantity: 2,
            created_at: now,
            updated_at: now,
        }
    }

    fn movements(product_id: i64, count: i64) -> Vec<ProductMovement> {
        let start = Utc::now();
        (0..count)
            .map(|i| ProductMovement {
                id: product_id * 100 + count - i,
                product_id,
                kind: MovementKind::Entry,
                quantity: 1,
                created_at: start - Duration::minutes(i),
                user_name: "Ana Souza".to_string(),
            })
            .collect()
    }

    #[test]
    fn products_get_their_own_latest_movements() {
        let mut rows = movements(1, 7);
        rows.extend(movements(2, 2));

        let views = attach_recent_movements(vec![product(1, 10), product(2, 0), product(3, 1)], rows);

        assert_eq!(views[0].recent_movements.len(), RECENT_MOVEMENTS_LIMIT);
        let ids: Vec<i64> = views[0].recent_movements.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![107, 106, 105, 104, 103]);
        assert_eq!(views[1].recent_movements.len(), 2);
        assert_eq!(views[1].stock_status, StockStatus::OutOfStock);
        assert!(views[2].recent_movements.is_empty());
        assert_eq!(views[2].stock_status, StockStatus::LowStock);
    }

    #[test]
    fn view_serializes_recent_movements_in_camel_case() {
        let view = ProductView::new(product(4, 5), movements(4, 1));

        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["stockStatus"], "in_stock");
        assert_eq!(json["recentMovements"][0]["userName"], "Ana Souza");
        assert_eq!(json["recentMovements"][0]["kind"], "entrada");
        assert!(json["recentMovements"][0].get("productId").is_none());
    }
}
