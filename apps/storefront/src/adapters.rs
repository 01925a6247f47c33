//! # SQLite Adapters
//!
//! Implements the storefront ports on top of `jewelbox-db`, so the shop runs
//! end to end without the hosted backend.
//!
//! | Port              | Implementation                              |
//! |-------------------|---------------------------------------------|
//! | `CartStore`       | `Database` → `CartRepository`               |
//! | `OrderSink`       | `Database` → `OrderRepository::insert`      |
//! | `CouponValidator` | `LocalCouponValidator` (coupons + orders)   |

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::ports::{CartStore, CouponValidator, OrderSink, PersistenceResult};
use jewelbox_core::coupon::check_eligibility;
use jewelbox_core::{CartLineItem, CouponRejection, CouponValidation, Money, OrderRecord};
use jewelbox_db::Database;

#[async_trait]
impl CartStore for Database {
    async fn load_cart(&self, user_id: &str) -> PersistenceResult<Vec<CartLineItem>> {
        Ok(self.carts().load(user_id).await?)
    }

    async fn save_cart(&self, user_id: &str, items: &[CartLineItem]) -> PersistenceResult<()> {
        Ok(self.carts().save(user_id, items).await?)
    }
}

#[async_trait]
impl OrderSink for Database {
    async fn submit_order(&self, order: &OrderRecord) -> PersistenceResult<String> {
        Ok(self.orders().insert(order).await?)
    }
}

/// Validates coupons against the local catalogue.
///
/// First-order coupons are checked against the customer's stored orders.
#[derive(Debug, Clone)]
pub struct LocalCouponValidator {
    db: Database,
}

impl LocalCouponValidator {
    pub fn new(db: Database) -> Self {
        LocalCouponValidator { db }
    }

    /// Validation as of `today`.
    pub async fn validate_on(
        &self,
        code: &str,
        cart_subtotal: Money,
        user_id: Option<&str>,
        today: NaiveDate,
    ) -> PersistenceResult<CouponValidation> {
        let Some(coupon) = self.db.coupons().get_by_code(code).await? else {
            debug!(code = %code, "Unknown coupon code");
            return Ok(CouponValidation::rejected(CouponRejection::NotFound.to_string()));
        };

        let prior_orders = match user_id {
            Some(user) if coupon.first_order_only => Some(self.db.orders().count_for_user(user).await?),
            Some(_) => Some(0),
            None => None,
        };

        match check_eligibility(&coupon, today, prior_orders) {
            Ok(()) => {
                let discount = coupon.discount_for(cart_subtotal);
                debug!(code = %coupon.code, discount = %discount, "Coupon accepted");
                Ok(CouponValidation::accepted(coupon, discount))
            }
            Err(rejection) => {
                debug!(code = %coupon.code, reason = %rejection, "Coupon rejected");
                Ok(CouponValidation::rejected(rejection.to_string()))
            }
        }
    }
}

#[async_trait]
impl CouponValidator for LocalCouponValidator {
    async fn validate_coupon(
        &self,
        code: &str,
        cart_subtotal: Money,
        user_id: Option<&str>,
    ) -> PersistenceResult<CouponValidation> {
        self.validate_on(code, cart_subtotal, user_id, Utc::now().date_naive())
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
