//! # Validation Module
//!
//! Input validation for StockSence.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client                                                   │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server commands (Rust)                                       │
//! │  └── THIS MODULE: every rule, before any store call                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  └── CHECK constraints (quantity >= 0, price >= 0, ...)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stocksence_core::validation::{validate_email, validate_password};
//!
//! assert!(validate_email("owner@shop.io").is_ok());
//! assert!(validate_password("12345").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewProduct, ProductUpdate};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted on sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Largest accepted price or cost: $10,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Largest accepted stock level or sale quantity.
///
/// `MAX_PRICE_CENTS * MAX_QUANTITY` stays below `i64::MAX`, so a sale
/// total of any valid product cannot overflow.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_with_max("name", name, 200)
}

/// Validates a product category.
///
/// ## Rules
/// - Must not be empty; free text is allowed
/// - At most 100 characters
pub fn validate_category(category: &str) -> ValidationResult<()> {
    required_with_max("category", category, 100)
}

/// Validates an optional image URL. Empty means "no image".
pub fn validate_image_url(url: Option<&str>) -> ValidationResult<()> {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(());
    };

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ValidationError::InvalidFormat {
            field: "imageUrl".to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }

    if url.len() > 2048 {
        return Err(ValidationError::TooLong {
            field: "imageUrl".to_string(),
            max: 2048,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. Empty means "match everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

fn required_with_max(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    within("price", cents, 0, MAX_PRICE_CENTS)
}

/// Validates a cost in cents.
pub fn validate_cost_cents(cents: i64) -> ValidationResult<()> {
    within("cost", cents, 0, MAX_PRICE_CENTS)
}

/// Validates a stock level (`quantity >= 0`).
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    within("quantity", quantity, 0, MAX_QUANTITY)
}

/// Validates a low-stock threshold.
pub fn validate_min_quantity(min_quantity: i64) -> ValidationResult<()> {
    within("minQuantity", min_quantity, 0, MAX_QUANTITY)
}

/// Validates the number of units in a sale.
///
/// ## User Workflow
/// ```text
/// Sale form: quantity 0
///      │
///      ▼
/// validate_sale_quantity(0) ← THIS FUNCTION
///      │
///      └── qty <= 0? → "quantity must be positive"
/// ```
pub fn validate_sale_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    within("quantity", quantity, 1, MAX_QUANTITY)
}

fn within(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a create-product form. Returns the first failing rule.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_price_cents(input.price_cents)?;
    validate_cost_cents(input.cost_cents)?;
    validate_stock_quantity(input.quantity)?;
    validate_min_quantity(input.min_quantity)?;
    validate_category(&input.category)?;
    validate_image_url(input.image_url.as_deref())?;
    Ok(())
}

/// Validates the fields present in a partial product edit.
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        validate_product_name(name)?;
    }
    if let Some(price) = update.price_cents {
        validate_price_cents(price)?;
    }
    if let Some(cost) = update.cost_cents {
        validate_cost_cents(cost)?;
    }
    if let Some(quantity) = update.quantity {
        validate_stock_quantity(quantity)?;
    }
    if let Some(min_quantity) = update.min_quantity {
        validate_min_quantity(min_quantity)?;
    }
    if let Some(category) = &update.category {
        validate_category(category)?;
    }
    validate_image_url(update.image_url.as_deref())?;
    Ok(())
}

// =============================================================================
// Auth Form Validators
// =============================================================================

/// Validates an email address shape: `local@domain.tld`.
///
/// ## Rules
/// - No whitespace anywhere
/// - Exactly one `@` with a non-empty local part
/// - The domain contains a dot with non-empty labels on both sides
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a password (minimum [`MIN_PASSWORD_LEN`] characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates the full name collected on sign-up.
pub fn validate_full_name(full_name: &str) -> ValidationResult<()> {
    required_with_max("fullName", full_name, 200)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewProduct {
        NewProduct {
            name: "Green Tea".to_string(),
            description: "Loose leaf".to_string(),
            price_cents: 899,
            cost_cents: 300,
            quantity: 24,
            min_quantity: 5,
            category: "Beverages".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Green Tea").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_cost_cents(-100).is_err());
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_numbers_upper_bounds() {
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_cost_cents(4_000_000_000_000_000_000).is_err());
        assert!(validate_stock_quantity(MAX_QUANTITY + 1).is_err());
        assert!(validate_min_quantity(i64::MAX).is_err());
        assert!(validate_sale_quantity(MAX_QUANTITY + 1).is_err());

        let err = validate_price_cents(i64::MAX).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: MAX_PRICE_CENTS,
            }
        );
        // Largest valid sale total fits in i64
        assert!(MAX_PRICE_CENTS.checked_mul(MAX_QUANTITY).is_some());
    }

    #[test]
    fn test_validate_new_product_reports_first_failure() {
        assert!(validate_new_product(&form()).is_ok());

        let mut bad = form();
        bad.category = " ".to_string();
        assert_eq!(
            validate_new_product(&bad),
            Err(ValidationError::Required {
                field: "category".to_string()
            })
        );

        let mut bad = form();
        bad.name = String::new();
        bad.price_cents = -5;
        assert_eq!(
            validate_new_product(&bad),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn test_validate_product_update_checks_present_fields_only() {
        assert!(validate_product_update(&ProductUpdate::default()).is_ok());

        let update = ProductUpdate {
            quantity: Some(-2),
            ..Default::default()
        };
        assert!(validate_product_update(&update).is_err());
    }

    #[test]
    fn test_validate_image_url() {
        assert!(validate_image_url(None).is_ok());
        assert!(validate_image_url(Some("")).is_ok());
        assert!(validate_image_url(Some("https://cdn.example.com/a.png")).is_ok());
        assert!(validate_image_url(Some("ftp://example.com/a.png")).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("owner@shop.io").is_ok());
        assert!(validate_email("a.b@c.d.e").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("owner").is_err());
        assert!(validate_email("owner@shop").is_err());
        assert!(validate_email("@shop.io").is_err());
        assert!(validate_email("own er@shop.io").is_err());
        assert!(validate_email("a@b@c.io").is_err());
        assert!(validate_email("owner@.io").is_err());
    }

    #[test]
    fn test_validate_password_and_full_name() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("12345"),
            Err(ValidationError::TooShort {
                field: "password".to_string(),
                min: 6
            })
        );
        assert!(validate_full_name("Ada Lovelace").is_ok());
        assert!(validate_full_name("  ").is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  lamp ").unwrap(), "lamp");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }
}
