//! # Error Types
//!
//! Domain-specific error types for jewelbox-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  jewelbox-core errors (this file)                                      │
//! │  ├── CoreError              - Wraps everything below                   │
//! │  ├── ValidationError        - Field-level input failures               │
//! │  ├── CouponError            - Coupon apply/reject outcomes             │
//! │  └── OrderValidationError   - One reason an order cannot be placed     │
//! │                                                                         │
//! │  jewelbox-db errors (separate crate)                                   │
//! │  └── DbError                - Database operation failures              │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  └── ApiError               - What the JS pages see (serialized)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal: every failure leaves cart and coupon state as it
//! was and is rendered as an inline message.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Coupon could not be applied.
    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    /// Order failed pre-submission validation.
    #[error("Order cannot be placed: {0}")]
    OrderRejected(#[from] OrderValidationErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Coupon Error
// =============================================================================

/// Coupon application failures.
///
/// ## User Workflow
/// ```text
/// Enter code "SPRING10" ──► Apply
///      │
///      ├── a coupon is already applied? → AlreadyApplied
///      ├── blank input?                 → EmptyCode
///      │
///      ▼
/// coupon-validation service
///      │
///      ├── success: false → Rejected("Coupon has expired")  (verbatim)
///      └── success: true  → coupon stored as applied
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// A coupon is already applied; it must be removed first.
    #[error("A coupon is already applied. Remove it before applying another.")]
    AlreadyApplied,

    /// The entered code was blank.
    #[error("Please enter a coupon code")]
    EmptyCode,

    /// The validation service refused the code. The message is its own.
    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// Order Validation
// =============================================================================

/// Contact/shipping form fields checked before an order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    City,
    Street,
    HouseNumber,
}

impl ContactField {
    /// Label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            ContactField::FirstName => "First name",
            ContactField::LastName => "Last name",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
            ContactField::City => "City",
            ContactField::Street => "Street",
            ContactField::HouseNumber => "House number",
        }
    }
}

/// One reason an order cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "field", rename_all = "camelCase")]
pub enum OrderValidationError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please choose pickup or delivery")]
    MissingDeliveryMethod,

    #[error("Please choose a delivery area")]
    MissingArea,

    #[error("{} is required", .0.label())]
    MissingContactField(ContactField),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please choose a payment method")]
    MissingPaymentMethod,
}

/// All validation errors found for an order, in form order.
///
/// Validation is collect-all so the checkout page can render every problem
/// at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderValidationErrors(pub Vec<OrderValidationError>);

impl OrderValidationErrors {
    /// Returns the individual errors.
    pub fn errors(&self) -> &[OrderValidationError] {
        &self.0
    }

    /// Returns true if `error` is among the collected errors.
    pub fn contains(&self, error: &OrderValidationError) -> bool {
        self.0.contains(error)
    }

    /// Messages for each error, in order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for OrderValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for OrderValidationErrors {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 10,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 10");
    }

    #[test]
    fn test_coupon_rejection_is_verbatim() {
        let err = CouponError::Rejected("Coupon has expired".to_string());
        assert_eq!(err.to_string(), "Coupon has expired");
    }

    #[test]
    fn test_order_errors_display() {
        let errors = OrderValidationErrors(vec![
            OrderValidationError::EmptyCart,
            OrderValidationError::MissingContactField(ContactField::HouseNumber),
        ]);
        assert_eq!(errors.to_string(), "Your cart is empty; House number is required");
        assert!(errors.contains(&OrderValidationError::EmptyCart));
    }

    #[test]
    fn test_order_error_serialization() {
        let json = serde_json::to_value(OrderValidationError::MissingContactField(
            ContactField::FirstName,
        ))
        .unwrap();
        assert_eq!(json["kind"], "missingContactField");
        assert_eq!(json["field"], "firstName");
    }

    #[test]
    fn test_conversions_to_core_error() {
        let core: CoreError = CouponError::EmptyCode.into();
        assert!(matches!(core, CoreError::Coupon(CouponError::EmptyCode)));

        let core: CoreError = ValidationError::MustBePositive {
            field: "price".to_string(),
        }
        .into();
        assert!(matches!(core, CoreError::Validation(_)));
    }
}
