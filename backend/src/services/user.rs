//! User management service

use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use shared::{active_filter, UserStatus};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::{
    group_by_owner, MovementDetail, MovementDetailRow, User, UserListItem, UserMovement,
    UserWithMovements, DEFAULT_ROLE, MOVEMENT_DETAIL_COLUMNS, USER_COLUMNS,
};

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(custom = "crate::validation::name")]
    pub name: String,
    #[validate(custom = "crate::validation::email")]
    pub email: String,
    #[validate(custom = "crate::validation::password")]
    pub password: String,
    #[validate(custom = "crate::validation::phone")]
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Partial profile update; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(custom = "crate::validation::name")]
    pub name: Option<String>,
    #[validate(custom = "crate::validation::email")]
    pub email: Option<String>,
    #[validate(custom = "crate::validation::phone")]
    pub phone: Option<String>,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Users of the company, newest first, optionally narrowed by a
    /// substring of name, e-mail or role. Each carries the movements it
    /// performed.
    pub async fn list(&self, company_id: i64, search: Option<&str>) -> AppResult<Vec<UserListItem>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE company_id = ", USER_COLUMNS));
        query.push_bind(company_id);

        if let Some(search) = active_filter(search) {
            query
                .push(" AND (strpos(name, ")
                .push_bind(search.clone())
                .push(") > 0 OR strpos(email, ")
                .push_bind(search.clone())
                .push(") > 0 OR strpos(role, ")
                .push_bind(search)
                .push(") > 0)");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let users = query.build_query_as::<User>().fetch_all(&self.db).await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let movements = sqlx::query_as::<_, UserMovement>(
            r#"
            SELECT id, user_id, kind, quantity, created_at
            FROM movements
            WHERE company_id = $1 AND user_id = ANY($2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(company_id)
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(attach_movements(users, movements))
    }

    pub async fn get(&self, company_id: i64, user_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND company_id = $2",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// User profile with the movements they performed, newest first
    pub async fn get_with_movements(
        &self,
        company_id: i64,
        user_id: i64,
    ) -> AppResult<UserWithMovements> {
        let user = self.get(company_id, user_id).await?;

        let rows = sqlx::query_as::<_, MovementDetailRow>(&format!(
            r#"
            SELECT {}
            FROM movements m
            JOIN products p ON p.id = m.product_id
            JOIN categories c ON c.id = p.category_id
            JOIN users u ON u.id = m.user_id
            WHERE m.company_id = $1 AND m.user_id = $2
            ORDER BY m.created_at DESC, m.id DESC
            "#,
            MOVEMENT_DETAIL_COLUMNS
        ))
        .bind(company_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let movements = rows
            .into_iter()
            .map(MovementDetail::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(UserWithMovements { user, movements })
    }

    pub async fn create(&self, company_id: i64, input: CreateUserInput) -> AppResult<User> {
        input.validate()?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let role = input
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (company_id, name, email, password_hash, phone, role, status,
                               last_activity_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'active', NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(company_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.phone)
        .bind(role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        tracing::info!(company_id, user_id = user.id, "User created");

        Ok(user)
    }

    pub async fn update(
        &self,
        company_id: i64,
        user_id: i64,
        input: UpdateUserInput,
    ) -> AppResult<User> {
        input.validate()?;

        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                role = COALESCE($6, role),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(company_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.role)
        .bind(input.status.map(|s| s.as_str()))
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Delete a user that never performed a movement
    pub async fn delete(&self, company_id: i64, user_id: i64) -> AppResult<()> {
        let user = self.get(company_id, user_id).await?;

        let has_movements =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM movements WHERE user_id = $1)")
                .bind(user.id)
                .fetch_one(&self.db)
                .await?;

        if has_movements {
            return Err(AppError::HasMovements("User".to_string()));
        }

        sqlx::query("DELETE FROM users WHERE id = $1 AND company_id = $2")
            .bind(user.id)
            .bind(company_id)
            .execute(&self.db)
            .await?;

        tracing::info!(company_id, user_id, "User deleted");

        Ok(())
    }
}

/// Pair each user with their movements; `movements` is newest first
fn attach_movements(users: Vec<User>, movements: Vec<UserMovement>) -> Vec<UserListItem> {
    let mut by_user = group_by_owner(movements, |m| m.user_id);
    users
        .into_iter()
        .map(|user| {
            let movements = by_user.remove(&user.id).unwrap_or_default();
            UserListItem { user, movements }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::MovementKind;

    fn user(id: i64, name: &str) -> User {
        let now = Utc::now();
        User {
            id,
            company_id: 1,
            name: name.to_string(),
            email: format!("{}@loja.com", id),
            password_hash: "hash".to_string(),
            phone: None,
            role: DEFAULT_ROLE.to_string(),
            status: UserStatus::Active,
            withdrawn_units: 0,
            last_activity_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn movement(id: i64, user_id: i64, kind: MovementKind) -> UserMovement {
        UserMovement {
            id,
            user_id,
            kind,
            quantity: 2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn listing_carries_each_users_movements() {
        let rows = vec![
            movement(30, 2, MovementKind::Exit),
            movement(20, 1, MovementKind::Entry),
            movement(10, 2, MovementKind::Entry),
        ];

        let items = attach_movements(vec![user(2, "Bruno Lima"), user(1, "Ana Souza"), user(3, "Caio")], rows);

        let ids: Vec<i64> = items[0].movements.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![30, 10]);
        assert_eq!(items[1].movements.len(), 1);
        assert!(items[2].movements.is_empty());

        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["name"], "Bruno Lima");
        assert_eq!(json["movements"][0]["kind"], "saida");
        assert!(json.get("passwordHash").is_none());
    }
}
