use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category as listed, with the number of products filed under it
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub product_count: i64,
}

/// Categories every new company starts with, as (name, description)
pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Eletrônicos", "Produtos eletrônicos"),
    ("Informática", "Produtos de informática"),
    ("Acessórios", "Acessórios diversos"),
    ("Periféricos", "Periféricos de computador"),
    ("Outros", "Outros produtos"),
];
