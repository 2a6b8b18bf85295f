use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::MovementKind;
use sqlx::FromRow;

/// Immutable movement log entry
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: i64,
    pub company_id: i64,
    pub product_id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub kind: MovementKind,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
    pub category: CategoryRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Movement joined with its product, category and acting user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDetail {
    #[serde(flatten)]
    pub movement: Movement,
    pub product: ProductRef,
    pub user: UserRef,
}

/// Column list shared by every query returning [`MovementDetailRow`]
pub const MOVEMENT_DETAIL_COLUMNS: &str = "m.id, m.company_id, m.product_id, m.user_id, m.kind, \
     m.quantity, m.unit_price, m.notes, m.created_at, \
     p.name AS product_name, c.id AS category_id, c.name AS category_name, \
     u.name AS user_name, u.email AS user_email";

/// Flat row of the movement / product / category / user join
#[derive(Debug, FromRow)]
pub struct MovementDetailRow {
    pub id: i64,
    pub company_id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub kind: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub user_name: String,
    pub user_email: String,
}

impl TryFrom<MovementDetailRow> for MovementDetail {
    type Error = shared::UnknownVariant;

    fn try_from(row: MovementDetailRow) -> Result<Self, Self::Error> {
        Ok(MovementDetail {
            movement: Movement {
                id: row.id,
                company_id: row.company_id,
                product_id: row.product_id,
                user_id: row.user_id,
                kind: row.kind.parse()?,
                quantity: row.quantity,
                unit_price: row.unit_price,
                notes: row.notes,
                created_at: row.created_at,
            },
            product: ProductRef {
                id: row.product_id,
                name: row.product_name,
                category: CategoryRef {
                    id: row.category_id,
                    name: row.category_name,
                },
            },
            user: UserRef {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
        })
    }
}

/// Movement as listed under a product, with the acting user's name
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductMovement {
    pub id: i64,
    #[serde(skip_serializing)]
    pub product_id: i64,
    #[sqlx(try_from = "String")]
    pub kind: MovementKind,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
}

/// Movement as listed under the user who performed it
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserMovement {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub kind: MovementKind,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Group rows by owner id, keeping their order within each group
pub fn group_by_owner<T>(rows: Vec<T>, owner: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut groups: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(owner(&row)).or_default().push(row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_movement(id: i64, user_id: i64) -> UserMovement {
        UserMovement {
            id,
            user_id,
            kind: MovementKind::Exit,
            quantity: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn grouping_keeps_row_order() {
        let rows = vec![user_movement(9, 1), user_movement(8, 2), user_movement(7, 1)];

        let groups = group_by_owner(rows, |m| m.user_id);

        let ids: Vec<i64> = groups[&1].iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![9, 7]);
        assert_eq!(groups[&2].len(), 1);
        assert!(!groups.contains_key(&3));
    }

    #[test]
    fn owner_ids_are_not_serialized() {
        let json = serde_json::to_value(user_movement(4, 1)).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["kind"], "saida");
        assert!(json.get("userId").is_none());
        assert!(json["createdAt"].is_string());
    }
}
