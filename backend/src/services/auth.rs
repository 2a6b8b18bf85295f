//! Authentication service for company registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::config::{Config, JwtConfig};
use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::{Company, User, ADMIN_ROLE, DEFAULT_CATEGORIES, USER_COLUMNS};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
}

/// Company part of a registration
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRegistration {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    #[validate(custom = "crate::validation::email")]
    pub email: String,
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

/// Administrator account created together with the company
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistration {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    #[validate(custom = "crate::validation::email")]
    pub email: String,
    #[validate(custom = "crate::validation::password")]
    pub password: String,
    #[validate(custom = "crate::validation::phone")]
    pub phone: Option<String>,
}

/// Input for registering a new company with its administrator
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate]
    pub company: CompanyRegistration,
    #[validate]
    pub admin: AdminRegistration,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub company: Company,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Issued access token together with the logged-in user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // User ID
    pub company_id: i64,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt: config.jwt.clone(),
        }
    }

    /// Register a company, its administrator and the default categories
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResponse> {
        input.validate()?;

        let company_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1)",
        )
        .bind(&input.company.email)
        .fetch_one(&self.db)
        .await?;

        if company_taken {
            return Err(AppError::DuplicateEntry("company email".to_string()));
        }

        let admin_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&input.admin.email)
                .fetch_one(&self.db)
                .await?;

        if admin_taken {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.admin.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let company_input = input.company;
        let admin = input.admin;

        let mut tx = self.db.begin().await?;

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, email, phone, address, district, city, state, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, cnpj, phone, address, district, city, state, zip_code,
                      created_at, updated_at
            "#,
        )
        .bind(&company_input.name)
        .bind(&company_input.email)
        .bind(&company_input.phone)
        .bind(&company_input.address)
        .bind(&company_input.district)
        .bind(&company_input.city)
        .bind(company_input.state.as_deref().map(str::to_uppercase))
        .bind(&company_input.zip_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "company email"))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (company_id, name, email, password_hash, phone, role, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'active')
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(company.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&password_hash)
        .bind(&admin.phone)
        .bind(ADMIN_ROLE)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        for (name, description) in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (company_id, name, description) VALUES ($1, $2, $3)")
                .bind(company.id)
                .bind(name)
                .bind(description)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(company_id = company.id, user_id = user.id, "Company registered");

        Ok(RegisterResponse { company, user })
    }

    /// Authenticate user with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        input.validate()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.status.is_active() {
            return Err(AppError::InactiveUser);
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_activity_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .fetch_one(&self.db)
        .await?;

        let token = issue_token(&self.jwt, &user)?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry,
            user,
        })
    }
}

/// Sign an access token for `user`
pub fn issue_token(jwt: &JwtConfig, user: &User) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        company_id: user.company_id,
        email: user.email.clone(),
        name: user.name.clone(),
        exp: (now + Duration::seconds(jwt.access_token_expiry)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return its claims
pub fn validate_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::UserStatus;

    fn jwt(expiry: i64) -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: expiry,
        }
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 42,
            company_id: 7,
            name: "Ana Souza".to_string(),
            email: "ana@loja.com".to_string(),
            password_hash: String::new(),
            phone: None,
            role: ADMIN_ROLE.to_string(),
            status: UserStatus::Active,
            withdrawn_units: 0,
            last_activity_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trip_keeps_tenant() {
        let token = issue_token(&jwt(3600), &user()).unwrap();
        let claims = validate_token("test-secret", &token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.company_id, 7);
        assert_eq!(claims.name, "Ana Souza");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token(&jwt(3600), &user()).unwrap();
        assert!(matches!(
            validate_token("other-secret", &token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // Beyond the default 60 s leeway
        let token = issue_token(&jwt(-600), &user()).unwrap();
        assert!(matches!(
            validate_token("test-secret", &token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn registration_rejects_short_password() {
        let input: RegisterInput = serde_json::from_value(serde_json::json!({
            "company": { "name": "Tech Store", "email": "contato@techstore.com", "zipCode": "01310-100" },
            "admin": { "name": "Ana", "email": "ana@techstore.com", "password": "123" }
        }))
        .unwrap();

        assert!(input.validate().is_err());
    }

    #[test]
    fn registration_accepts_complete_input() {
        let input: RegisterInput = serde_json::from_value(serde_json::json!({
            "company": { "name": "Tech Store", "email": "contato@techstore.com", "state": "SP" },
            "admin": { "name": "Ana", "email": "ana@techstore.com", "password": "segredo1" }
        }))
        .unwrap();

        assert!(input.validate().is_ok());
    }
}
