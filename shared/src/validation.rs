//! Validation utilities for the stock management platform
//!
//! Includes Brazil-specific checks for company registration data.

use rust_decimal::Decimal;

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate that a movement quantity is a positive integer
pub fn validate_movement_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive integer");
    }
    Ok(())
}

/// Largest price a `NUMERIC(12,2)` column holds
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Validate a unit price (non-negative, at most two decimal places, fits
/// `NUMERIC(12,2)`)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Price cannot be negative");
    }
    if price > max_price() {
        return Err("Price cannot exceed 9999999999.99");
    }
    if price.normalize().scale() > 2 {
        return Err("Price cannot have more than two decimal places");
    }
    Ok(())
}

/// Validate a stock level or minimum threshold
pub fn validate_stock_level(quantity: i32) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate that a display name is not blank
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    if name.chars().count() > 120 {
        return Err("Name must be at most 120 characters");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

// ============================================================================
// Brazil-Specific Validations
// ============================================================================

/// Brazilian federative units (UF)
pub const BRAZILIAN_STATES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Validate a two-letter state code
pub fn validate_uf(uf: &str) -> Result<(), &'static str> {
    let upper = uf.trim().to_ascii_uppercase();
    if BRAZILIAN_STATES.contains(&upper.as_str()) {
        Ok(())
    } else {
        Err("Unknown Brazilian state code")
    }
}

/// Validate a CEP (postal code): 8 digits, optionally written as 00000-000
pub fn validate_cep(cep: &str) -> Result<(), &'static str> {
    let digits: String = cep.chars().filter(|c| c.is_ascii_digit()).collect();
    let separators_ok = cep.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '.');
    if digits.len() != 8 || !separators_ok {
        return Err("CEP must have 8 digits");
    }
    Ok(())
}

/// Validate a Brazilian phone number
/// Accepts: (11) 99999-8888, 1133334444, +55 11 99999-8888
pub fn validate_br_phone(phone: &str) -> Result<(), &'static str> {
    let mut digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if phone.trim_start().starts_with('+') {
        match digits.strip_prefix("55") {
            Some(rest) => digits = rest.to_string(),
            None => return Err("Only Brazilian phone numbers are supported"),
        }
    }
    // Area code + 8-digit landline or 9-digit mobile
    if digits.len() == 10 || digits.len() == 11 {
        return Ok(());
    }
    Err("Invalid Brazilian phone number format")
}

/// Validate a CNPJ (company registry number) including both check digits
pub fn validate_cnpj(cnpj: &str) -> Result<(), &'static str> {
    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 14 {
        return Err("CNPJ must have 14 digits");
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return Err("Invalid CNPJ");
    }

    let check = |len: usize| -> u32 {
        let weights = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
        let offset = weights.len() - len;
        let sum: u32 = digits[..len]
            .iter()
            .zip(&weights[offset..])
            .map(|(d, w)| d * w)
            .sum();
        match sum % 11 {
            0 | 1 => 0,
            r => 11 - r,
        }
    };

    if check(12) != digits[12] || check(13) != digits[13] {
        return Err("Invalid CNPJ check digits");
    }
    Ok(())
}
