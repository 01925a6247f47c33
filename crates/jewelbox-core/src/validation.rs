//! # Validation Module
//!
//! Field-level input checks for the storefront.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Storefront page (JS)                                          │
//! │  └── Required-field hints, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront commands (Rust)                                   │
//! │  ├── Deserialization                                                   │
//! │  └── THIS MODULE + checkout::validate_order                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / foreign key constraints                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use jewelbox_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("dana@example.com").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE, MIN_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted coupon code.
pub const MAX_COUPON_CODE_LEN: usize = 32;

/// Longest accepted product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an email address of the form `local@domain.tld`.
///
/// ## Rules
/// - Exactly one `@`, no whitespace
/// - Non-empty local part
/// - Domain contains a dot with text on both sides of every dot
///
/// ## Example
/// ```rust
/// use jewelbox_core::validation::validate_email;
///
/// assert!(validate_email("dana@example.co.il").is_ok());
/// assert!(validate_email("dana@example").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits with optional spaces, dashes, parentheses, and a leading `+`
/// - 7 to 15 digits in total
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "may contain only digits, spaces, dashes and parentheses".to_string(),
        });
    }

    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 7 and 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a coupon code and returns it normalized (trimmed, upper-case).
///
/// ## Example
/// ```rust
/// use jewelbox_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code("  spring10 ").unwrap(), "SPRING10");
/// assert!(validate_coupon_code("   ").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.chars().count() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity (1..=10).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < MIN_ITEM_QUANTITY {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_ITEM_QUANTITY,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in agorot (0..=`MAX_UNIT_PRICE`). Zero is allowed (gift items).
pub fn validate_price_minor(minor: i64) -> ValidationResult<()> {
    if !(0..=MAX_UNIT_PRICE.minor()).contains(&minor) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE.minor(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
