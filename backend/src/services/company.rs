//! Company profile service

use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::Company;

const COMPANY_COLUMNS: &str =
    "id, name, email, cnpj, phone, address, district, city, state, zip_code, created_at, updated_at";

#[derive(Clone)]
pub struct CompanyService {
    db: PgPool,
}

/// Full replacement of the editable company profile
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyInput {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    #[validate(custom = "crate::validation::email")]
    pub email: String,
    #[validate(custom = "crate::validation::cnpj")]
    pub cnpj: Option<String>,
    #[validate(custom = "crate::validation::phone")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    #[validate(custom = "crate::validation::uf")]
    pub state: Option<String>,
    #[validate(custom = "crate::validation::cep")]
    pub zip_code: Option<String>,
}

impl CompanyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, company_id: i64) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))
    }

    pub async fn update(&self, company_id: i64, input: UpdateCompanyInput) -> AppResult<Company> {
        input.validate()?;

        sqlx::query_as::<_, Company>(&format!(
            r#"
            UPDATE companies
            SET name = $2, email = $3, phone = $4, address = $5, district = $6,
                city = $7, state = $8, zip_code = $9, cnpj = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(company_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.district)
        .bind(&input.city)
        .bind(input.state.as_deref().map(str::to_uppercase))
        .bind(&input.zip_code)
        .bind(&input.cnpj)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "company email"))?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))
    }
}
