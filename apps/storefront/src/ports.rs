//! # Collaborator Ports
//!
//! The three services the storefront depends on but does not implement.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront Ports                                │
//! │                                                                         │
//! │  CartStore        load_cart(user) ─────────► Vec<CartLineItem>          │
//! │                   save_cart(user, items) ──► ()                         │
//! │                                                                         │
//! │  CouponValidator  validate_coupon(code, subtotal, user)                 │
//! │                                    ─────────► CouponValidation          │
//! │                                                                         │
//! │  OrderSink        submit_order(record) ────► order id                   │
//! │                                                                         │
//! │  Every call may fail with PersistenceError. A failure never touches    │
//! │  in-memory session state.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The SQLite implementations live in [`crate::adapters`]. Tests use
//! in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use jewelbox_core::{CartLineItem, CouponValidation, Money, OrderRecord};
use jewelbox_db::DbError;

/// A collaborator call failed.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write.
    #[error("Store rejected the write: {0}")]
    Rejected(String),

    /// The store returned data that could not be read.
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl From<DbError> for PersistenceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(msg) => PersistenceError::Unavailable(msg),
            DbError::PoolExhausted => PersistenceError::Unavailable("connection pool exhausted".into()),
            DbError::InvalidData { entity, reason } => {
                PersistenceError::Corrupt(format!("{entity}: {reason}"))
            }
            other => PersistenceError::Rejected(other.to_string()),
        }
    }
}

/// Per-user persisted carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The user's stored cart; empty when they have none.
    async fn load_cart(&self, user_id: &str) -> PersistenceResult<Vec<CartLineItem>>;

    /// Replaces the user's stored cart.
    async fn save_cart(&self, user_id: &str, items: &[CartLineItem]) -> PersistenceResult<()>;
}

/// Decides whether a coupon code may be used.
#[async_trait]
pub trait CouponValidator: Send + Sync {
    async fn validate_coupon(
        &self,
        code: &str,
        cart_subtotal: Money,
        user_id: Option<&str>,
    ) -> PersistenceResult<CouponValidation>;
}

/// Receives placed orders.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Stores the order and returns the sink's reference for it.
    async fn submit_order(&self, order: &OrderRecord) -> PersistenceResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err = PersistenceError::from(DbError::PoolExhausted);
        assert!(matches!(err, PersistenceError::Unavailable(_)));

        let err = PersistenceError::from(DbError::invalid_data("coupon", "bad kind"));
        assert_eq!(err.to_string(), "Corrupt stored data: coupon: bad kind");

        let err = PersistenceError::from(DbError::not_found("Order", "o-1"));
        assert!(matches!(err, PersistenceError::Rejected(_)));
    }
}
