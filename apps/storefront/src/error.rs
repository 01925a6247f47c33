//! # API Error Type
//!
//! Unified error type returned by storefront commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  JS page                      Rust command                              │
//! │  ───────                      ────────────                              │
//! │                                                                         │
//! │  apply_coupon("SAVE30")                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │                                                                  │  │
//! │  │  CouponError::Rejected ─────────────► COUPON_ERROR               │  │
//! │  │  OrderValidationErrors ─────────────► ORDER_INVALID + details    │  │
//! │  │  PersistenceError / DbError ────────► PERSISTENCE_ERROR          │  │
//! │  │  no signed-in user ─────────────────► AUTH_REQUIRED              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "COUPON_ERROR", "message": "This coupon has expired" }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::config::ConfigError;
use crate::ports::PersistenceError;
use jewelbox_core::{CoreError, CouponError, OrderValidationErrors, ValidationError};
use jewelbox_db::DbError;

/// Error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "ORDER_INVALID",
///   "message": "Please choose a delivery area; City is required",
///   "details": ["Please choose a delivery area", "City is required"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,

    /// One message per problem when several were found at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad input (400)
    ValidationError,

    /// Coupon refused or already applied
    CouponError,

    /// Order failed pre-submission checks
    OrderInvalid,

    /// A collaborator failed; session state is unchanged
    PersistenceError,

    /// The operation needs a signed-in customer
    AuthRequired,

    /// Resource not found (404)
    NotFound,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn auth_required() -> Self {
        ApiError::new(ErrorCode::AuthRequired, "Please sign in to update your cart")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        ApiError::new(ErrorCode::CouponError, err.to_string())
    }
}

impl From<OrderValidationErrors> for ApiError {
    fn from(errs: OrderValidationErrors) -> Self {
        ApiError {
            code: ErrorCode::OrderInvalid,
            message: errs.to_string(),
            details: Some(errs.messages()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::Coupon(e) => e.into(),
            CoreError::OrderRejected(e) => e.into(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        // the page gets a generic message; the cause goes to the log
        tracing::error!(error = %err, "Store operation failed");
        let message = match err {
            PersistenceError::Unavailable(_) => "The store is unavailable. Please try again.",
            PersistenceError::Rejected(_) => "Could not save your changes. Please try again.",
            PersistenceError::Corrupt(_) => "Stored data could not be read.",
        };
        ApiError::new(ErrorCode::PersistenceError, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other => PersistenceError::from(other).into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration error");
        ApiError::internal(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use jewelbox_core::{ContactField, OrderValidationError};

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CouponError::Rejected("This coupon has expired".into()));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": "COUPON_ERROR", "message": "This coupon has expired" })
        );
    }

    #[test]
    fn test_order_errors_carry_details() {
        let errs = OrderValidationErrors(vec![
            OrderValidationError::MissingArea,
            OrderValidationError::MissingContactField(ContactField::City),
        ]);
        let err = ApiError::from(CoreError::from(errs));

        assert_eq!(err.code, ErrorCode::OrderInvalid);
        assert_eq!(err.message, "Please choose a delivery area; City is required");
        assert_eq!(err.details.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_persistence_errors_are_generic() {
        let err = ApiError::from(PersistenceError::Unavailable("socket closed at 10.0.0.3".into()));
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(!err.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err = ApiError::from(DbError::not_found("Order", "o-9"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: o-9");
    }

    #[test]
    fn test_coupon_error_codes() {
        let err = ApiError::from(CouponError::AlreadyApplied);
        assert_eq!(err.code, ErrorCode::CouponError);
        let json = serde_json::to_string(&ErrorCode::AuthRequired).unwrap();
        assert_eq!(json, "\"AUTH_REQUIRED\"");
    }
}
