//! Category service

use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{map_unique_violation, AppResult};
use crate::models::{Category, CategoryWithCount};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    pub description: Option<String>,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Categories of the company ordered by name, with their product counts
    pub async fn list(&self, company_id: i64) -> AppResult<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, c.company_id, c.name, c.description, c.created_at,
                   COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.company_id = $1
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn create(&self, company_id: i64, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (company_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, company_id, name, description, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "category name"))?;

        tracing::info!(company_id, category_id = category.id, "Category created");

        Ok(category)
    }
}
