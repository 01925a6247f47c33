//! # Session Commands
//!
//! Sign-in loads the customer's stored cart; sign-out returns to an empty
//! guest session.

use tracing::{debug, info};

use crate::commands::CartResponse;
use crate::error::{ApiError, ApiResult};
use crate::Storefront;
use jewelbox_core::Cart;

impl Storefront {
    /// Signs a customer in and loads their cart.
    ///
    /// Switching to a different customer drops the delivery choice and
    /// coupon. A failed load leaves the previous session in place.
    pub async fn sign_in(&self, user_id: &str) -> ApiResult<CartResponse> {
        debug!(user_id = %user_id, "sign_in command");

        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ApiError::validation("User id is required"));
        }

        let mut session = self.cart.lock().await;
        let items = self.cart_store.load_cart(user_id).await?;

        let mut checkout = self.checkout.lock().await;
        if session.user_id().is_some_and(|previous| previous != user_id) {
            checkout.reset();
        }

        session.sign_in(user_id, Cart::from_items(items));
        info!(user_id = %user_id, items = session.cart().len(), "Signed in");

        Ok(self.cart_response(session.cart(), &checkout))
    }

    /// Clears the cart view, coupon and delivery choice.
    pub async fn sign_out(&self) -> CartResponse {
        debug!("sign_out command");
        let mut session = self.cart.lock().await;
        let mut checkout = self.checkout.lock().await;

        if let Some(user_id) = session.user_id() {
            info!(user_id = %user_id, "Signed out");
        }

        session.sign_out();
        checkout.reset();

        self.cart_response(session.cart(), &checkout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;
    use crate::error::ErrorCode;
    use jewelbox_core::{DeliveryMethod, Money};

    #[tokio::test]
    async fn test_sign_in_loads_and_sanitizes_cart() {
        let h = harness(
            MemoryCartStore::with_cart(
                "u1",
                vec![line("ring", 100, 8), line("ring", 100, 5), line("pin", 10, 0)],
            ),
            FakeCouponValidator::default(),
            RecordingOrderSink::default(),
        );

        let cart = h.storefront.sign_in(" u1 ").await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 10);
        assert_eq!(cart.subtotal, Money::from_major(1000));
    }

    #[tokio::test]
    async fn test_sign_in_requires_id() {
        let h = signed_in("u1", vec![]).await;
        let err = h.storefront.sign_in("  ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_session() {
        let h = signed_in("u1", vec![line("ring", 100, 1)]).await;
        h.store.fail_load_in(1);

        let err = h.storefront.sign_in("u2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert_eq!(h.storefront.get_cart().await.items.len(), 1);
    }

    #[tokio::test]
    async fn test_switching_user_resets_checkout() {
        let h = signed_in("u1", vec![line("ring", 100, 1)]).await;
        h.storefront.select_delivery_method(DeliveryMethod::Pickup).await;

        h.storefront.sign_in("u1").await.unwrap();
        assert!(h.storefront.order_summary().await.delivery.is_some());

        h.storefront.sign_in("u2").await.unwrap();
        assert!(h.storefront.order_summary().await.delivery.is_none());
    }

    #[tokio::test]
    async fn test_sign_out() {
        let h = signed_in("u1", vec![line("ring", 100, 2)]).await;
        h.storefront.select_delivery_method(DeliveryMethod::Pickup).await;

        let cart = h.storefront.sign_out().await;
        assert!(cart.items.is_empty());
        assert!(h.storefront.order_summary().await.delivery.is_none());
        assert_eq!(h.store.stored("u1").len(), 1);
    }
}
