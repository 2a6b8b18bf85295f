//! `validator` adapters over the shared validation rules
//!
//! Request structs reference these through `#[validate(custom = "...")]`.
//! Integer stock fields are checked with [`stock_level`] by the services.

use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::ValidationError;

use crate::error::AppError;

fn to_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn name(value: &str) -> Result<(), ValidationError> {
    shared::validate_name(value).map_err(|m| to_error("name", m))
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    shared::validate_email(value).map_err(|m| to_error("email", m))
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    shared::validate_password(value).map_err(|m| to_error("password", m))
}

pub fn price(value: &Decimal) -> Result<(), ValidationError> {
    shared::validate_price(*value).map_err(|m| to_error("price", m))
}

pub fn uf(value: &str) -> Result<(), ValidationError> {
    shared::validate_uf(value).map_err(|m| to_error("state", m))
}

pub fn cnpj(value: &str) -> Result<(), ValidationError> {
    shared::validate_cnpj(value).map_err(|m| to_error("cnpj", m))
}

pub fn cep(value: &str) -> Result<(), ValidationError> {
    shared::validate_cep(value).map_err(|m| to_error("zip_code", m))
}

pub fn phone(value: &str) -> Result<(), ValidationError> {
    shared::validate_br_phone(value).map_err(|m| to_error("phone", m))
}

/// Reject a negative stock level, reported as a field validation error
pub fn stock_level(field: &str, value: i32) -> Result<(), AppError> {
    shared::validate_stock_level(value).map_err(|m| AppError::Validation {
        field: field.to_string(),
        message: m.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_come_from_shared_rules() {
        let err = password("123").unwrap_err();
        assert_eq!(err.code, "password");
        assert_eq!(
            err.message.as_deref(),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn accepts_valid_values() {
        assert!(email("ana@loja.com.br").is_ok());
        assert!(cep("01310-100").is_ok());
        assert!(uf("MG").is_ok());
        assert!(cnpj("11.222.333/0001-81").is_ok());
        assert!(cnpj("11.222.333/0001-80").is_err());
        assert!(price(&Decimal::new(1999, 2)).is_ok());
        assert!(price(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn negative_stock_level_names_the_field() {
        assert!(stock_level("quantity", 0).is_ok());
        match stock_level("minQuantity", -1) {
            Err(AppError::Validation { field, message }) => {
                assert_eq!(field, "minQuantity");
                assert_eq!(message, "Quantity cannot be negative");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
