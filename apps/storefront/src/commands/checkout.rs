//! # Checkout Commands
//!
//! Delivery choice, coupon slot, order summary and order placement.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  select_delivery_method ──► select_area ──► apply_coupon (optional)    │
//! │            │                     │                 │                    │
//! │            └─────────────────────┴─────────────────┘                    │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                          order_summary()                                │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  place_order(contact, payment)                                          │
//! │    1. reload cart from store                                            │
//! │    2. validate_order (all problems at once)                             │
//! │    3. compute totals for the chosen delivery                            │
//! │    4. submit to the order sink                                          │
//! │    5. clear stored cart, coupon, delivery                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::CheckoutSession;
use crate::Storefront;
use jewelbox_core::{
    accept_coupon_validation, prepare_coupon_code, Cart, CartLineItem, ContactInfo, DeliveryArea,
    DeliveryMethod, DeliverySelection, Money, OrderRecord, OrderStatus, OrderTotals,
    PaymentMethod, PricingContext,
};

/// Totals as display strings, using the configured currency symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub shipping: String,
    pub discount: String,
    pub total: String,
}

/// Checkout page payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub items: Vec<CartLineItem>,
    pub totals: OrderTotals,
    pub display: TotalsDisplay,
    pub delivery: Option<DeliverySelection>,
    pub coupon_code: Option<String>,
}

/// Returned once the order sink has accepted an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: String,
    /// The sink's own reference (order number)
    pub reference: String,
    pub totals: OrderTotals,
}

impl Storefront {
    fn format(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    fn summary(&self, cart: &Cart, checkout: &CheckoutSession) -> OrderSummary {
        let totals = self.calculator.compute_totals(
            cart,
            &checkout.pricing_context(),
            checkout.coupon.get(),
        );

        OrderSummary {
            items: cart.items().to_vec(),
            display: TotalsDisplay {
                subtotal: self.format(totals.subtotal),
                shipping: self.format(totals.shipping),
                discount: self.format(totals.discount),
                total: self.format(totals.total),
            },
            totals,
            delivery: checkout.delivery().copied(),
            coupon_code: checkout.coupon.code().map(str::to_string),
        }
    }

    /// Totals for the current cart, delivery choice and coupon.
    pub async fn order_summary(&self) -> OrderSummary {
        debug!("order_summary command");
        let session = self.cart.lock().await;
        let checkout = self.checkout.lock().await;
        self.summary(session.cart(), &checkout)
    }

    /// Chooses pickup or delivery. Pickup drops any chosen area.
    pub async fn select_delivery_method(&self, method: DeliveryMethod) -> OrderSummary {
        debug!(method = ?method, "select_delivery_method command");
        let session = self.cart.lock().await;
        let mut checkout = self.checkout.lock().await;

        checkout.select_method(method);
        info!(method = ?method, "Delivery method selected");

        self.summary(session.cart(), &checkout)
    }

    /// Chooses the delivery area. Ignored unless delivery is selected.
    pub async fn select_area(&self, area: DeliveryArea) -> OrderSummary {
        debug!(area = ?area, "select_area command");
        let session = self.cart.lock().await;
        let mut checkout = self.checkout.lock().await;

        if checkout.select_area(area) {
            info!(area = ?area, "Delivery area selected");
        } else {
            warn!(area = ?area, "Area ignored; delivery is not selected");
        }

        self.summary(session.cart(), &checkout)
    }

    /// Asks the coupon validator about `code` and applies the coupon it
    /// returns.
    ///
    /// Signed-in customers' carts are reloaded first so the validator sees
    /// the stored subtotal.
    ///
    /// ## Errors
    /// - `COUPON_ERROR`: already applied, blank code, or refused (the
    ///   validator's message is passed through)
    /// - `PERSISTENCE_ERROR`: the cart could not be reloaded or the
    ///   validator could not be reached
    pub async fn apply_coupon(&self, code: &str) -> ApiResult<OrderSummary> {
        debug!(code = %code, "apply_coupon command");
        let mut session = self.cart.lock().await;
        let mut checkout = self.checkout.lock().await;

        let code = prepare_coupon_code(code, &checkout.coupon)?;

        if let Some(user_id) = session.user_id().map(str::to_string) {
            let items = self.cart_store.load_cart(&user_id).await?;
            session.replace_cart(Cart::from_items(items));
        }
        let subtotal = session.cart().subtotal();

        let outcome = self
            .coupon_validator
            .validate_coupon(&code, subtotal, session.user_id())
            .await?;

        let coupon = accept_coupon_validation(outcome).map_err(|e| {
            info!(code = %code, reason = %e, "Coupon refused");
            e
        })?;

        info!(code = %coupon.code, discount = %coupon.discount, "Coupon applied");
        checkout.coupon.apply(coupon)?;

        Ok(self.summary(session.cart(), &checkout))
    }

    /// Clears the coupon slot. Never fails.
    pub async fn remove_coupon(&self) -> OrderSummary {
        debug!("remove_coupon command");
        let session = self.cart.lock().await;
        let mut checkout = self.checkout.lock().await;

        if let Some(coupon) = checkout.coupon.remove() {
            info!(code = %coupon.code, "Coupon removed");
        }

        self.summary(session.cart(), &checkout)
    }

    /// Validates and submits the order.
    ///
    /// ## Errors
    /// - `ORDER_INVALID` with one detail per problem found
    /// - `PERSISTENCE_ERROR` if the cart could not be loaded or the sink
    ///   refused the order; nothing is cleared in that case
    pub async fn place_order(
        &self,
        contact: ContactInfo,
        payment_method: Option<PaymentMethod>,
    ) -> ApiResult<PlacedOrder> {
        debug!(payment = ?payment_method, "place_order command");
        let mut session = self.cart.lock().await;
        let mut checkout = self.checkout.lock().await;

        let user_id = session.user_id().map(str::to_string);
        let cart = match &user_id {
            Some(user) => Cart::from_items(self.cart_store.load_cart(user).await?),
            None => session.cart().clone(),
        };

        self.calculator
            .validate_order(&cart, checkout.delivery(), &contact, payment_method)
            .map_err(|errs| {
                info!(problems = errs.errors().len(), "Order rejected by validation");
                errs
            })?;

        let (Some(delivery), Some(payment_method)) = (checkout.delivery().copied(), payment_method)
        else {
            return Err(ApiError::internal("Validated order has no delivery or payment method"));
        };

        let record = OrderRecord {
            id: Uuid::new_v4().to_string(),
            user_id,
            contact,
            items: cart.items().to_vec(),
            delivery,
            payment_method,
            coupon_code: checkout.coupon.code().map(str::to_string),
            totals: self.calculator.compute_totals(
                &cart,
                &PricingContext::Checkout(delivery),
                checkout.coupon.get(),
            ),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let reference = self.order_sink.submit_order(&record).await?;

        info!(
            order_id = %record.id,
            reference = %reference,
            total = %record.totals.total,
            "Order placed"
        );

        if let Some(user) = &record.user_id {
            if let Err(e) = self.cart_store.save_cart(user, &[]).await {
                warn!(user_id = %user, error = %e, "Order placed but stored cart was not cleared");
            }
        }

        session.clear_cart();
        checkout.reset();

        Ok(PlacedOrder {
            order_id: record.id,
            reference,
            totals: record.totals,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;
    use crate::error::ErrorCode;
    use jewelbox_core::{Coupon, CouponDiscount, Percentage};

    fn coupons() -> FakeCouponValidator {
        FakeCouponValidator::with(vec![
            Coupon::new("SAVE30", CouponDiscount::Fixed(Money::from_major(30))),
            Coupon::new("FREE", CouponDiscount::Percentage(Percentage::FULL)),
            Coupon::new("TEN", CouponDiscount::Percentage(Percentage::from_percent(10))),
        ])
    }

    async fn checkout_harness(items: Vec<CartLineItem>) -> Harness {
        let h = harness(
            MemoryCartStore::with_cart("u1", items),
            coupons(),
            RecordingOrderSink::default(),
        );
        h.storefront.sign_in("u1").await.unwrap();
        h
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            first_name: "Noa".into(),
            last_name: "Levi".into(),
            email: "noa@example.co.il".into(),
            phone: "050-1234567".into(),
            city: "Haifa".into(),
            street: "Herzl".into(),
            house_number: "12".into(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_local_delivery_with_fixed_coupon() {
        let h = checkout_harness(vec![line("ring", 100, 2)]).await;

        h.storefront.select_delivery_method(DeliveryMethod::Delivery).await;
        h.storefront.select_area(DeliveryArea::Local).await;
        let summary = h.storefront.apply_coupon("SAVE30").await.unwrap();

        assert_eq!(summary.totals.subtotal, Money::from_major(200));
        assert_eq!(summary.totals.shipping, Money::from_major(20));
        assert_eq!(summary.totals.discount, Money::from_major(30));
        assert_eq!(summary.totals.total, Money::from_major(190));
        assert_eq!(summary.display.total, "₪190.00");
        assert_eq!(summary.coupon_code.as_deref(), Some("SAVE30"));
    }

    #[tokio::test]
    async fn test_delivery_without_area_uses_default_rate() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;
        let summary = h.storefront.select_delivery_method(DeliveryMethod::Delivery).await;
        assert_eq!(summary.totals.shipping, Money::from_major(25));
    }

    #[tokio::test]
    async fn test_pickup_is_free_and_ignores_area() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;

        h.storefront.select_delivery_method(DeliveryMethod::Delivery).await;
        h.storefront.select_area(DeliveryArea::Other).await;
        let summary = h.storefront.select_delivery_method(DeliveryMethod::Pickup).await;
        assert_eq!(summary.totals.shipping, Money::zero());
        assert_eq!(summary.delivery.and_then(|d| d.area()), None);

        let summary = h.storefront.select_area(DeliveryArea::Other).await;
        assert_eq!(summary.totals.shipping, Money::zero());
    }

    #[tokio::test]
    async fn test_full_discount_leaves_shipping() {
        let h = checkout_harness(vec![line("ring", 100, 3)]).await;
        h.storefront.select_delivery_method(DeliveryMethod::Delivery).await;
        h.storefront.select_area(DeliveryArea::Other).await;

        let summary = h.storefront.apply_coupon("free").await.unwrap();
        assert_eq!(summary.totals.discount, Money::from_major(300));
        assert_eq!(summary.totals.total, Money::from_major(70));
    }

    #[tokio::test]
    async fn test_second_coupon_rejected_first_kept() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;
        h.storefront.apply_coupon("TEN").await.unwrap();

        let err = h.storefront.apply_coupon("SAVE30").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CouponError);
        assert_eq!(h.validator.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let summary = h.storefront.order_summary().await;
        assert_eq!(summary.coupon_code.as_deref(), Some("TEN"));
    }

    #[tokio::test]
    async fn test_coupon_sees_stored_subtotal() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;
        // another tab added a second ring
        h.store.put("u1", vec![line("ring", 100, 2)]);

        let summary = h.storefront.apply_coupon("TEN").await.unwrap();
        assert_eq!(*h.validator.last_subtotal.lock().unwrap(), Some(Money::from_major(200)));
        assert_eq!(summary.totals.subtotal, Money::from_major(200));
        assert_eq!(summary.totals.discount, Money::from_major(20));
    }

    #[tokio::test]
    async fn test_coupon_reload_failure_applies_nothing() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;
        h.store.fail_load_in(1);

        let err = h.storefront.apply_coupon("TEN").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert_eq!(h.validator.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(h.storefront.order_summary().await.coupon_code.is_none());
    }

    #[tokio::test]
    async fn test_rejection_message_passed_through() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;

        let err = h.storefront.apply_coupon("OLD").await.unwrap_err();
        assert_eq!(err.message, "Coupon has expired");

        let err = h.storefront.apply_coupon("   ").await.unwrap_err();
        assert_eq!(err.message, "Please enter a coupon code");
        assert!(h.storefront.order_summary().await.coupon_code.is_none());
    }

    #[tokio::test]
    async fn test_remove_coupon_never_fails() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;
        let summary = h.storefront.remove_coupon().await;
        assert!(summary.coupon_code.is_none());

        h.storefront.apply_coupon("TEN").await.unwrap();
        let summary = h.storefront.remove_coupon().await;
        assert!(summary.coupon_code.is_none());
        assert_eq!(summary.totals.discount, Money::zero());
    }

    #[tokio::test]
    async fn test_place_order_collects_all_problems() {
        let h = checkout_harness(vec![]).await;
        h.storefront.select_delivery_method(DeliveryMethod::Delivery).await;

        let err = h
            .storefront
            .place_order(ContactInfo::default(), None)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::OrderInvalid);
        let details = err.details.unwrap();
        assert_eq!(details.first().map(String::as_str), Some("Your cart is empty"));
        assert_eq!(details.last().map(String::as_str), Some("Please choose a payment method"));
        assert!(details.iter().any(|d| d == "Please choose a delivery area"));
        assert_eq!(h.sink.count(), 0);
    }

    #[tokio::test]
    async fn test_place_order_success_clears_everything() {
        let h = checkout_harness(vec![line("ring", 100, 2)]).await;
        h.storefront.select_delivery_method(DeliveryMethod::Delivery).await;
        h.storefront.select_area(DeliveryArea::Local).await;
        h.storefront.apply_coupon("SAVE30").await.unwrap();

        let placed = h
            .storefront
            .place_order(contact(), Some(PaymentMethod::CreditCard))
            .await
            .unwrap();

        assert_eq!(placed.reference, "REF-1");
        assert_eq!(placed.totals.total, Money::from_major(190));

        let stored = h.sink.orders.lock().unwrap()[0].clone();
        assert_eq!(stored.id, placed.order_id);
        assert_eq!(stored.coupon_code.as_deref(), Some("SAVE30"));
        assert_eq!(stored.user_id.as_deref(), Some("u1"));
        assert_eq!(stored.status, OrderStatus::Pending);

        assert!(h.store.stored("u1").is_empty());
        let summary = h.storefront.order_summary().await;
        assert!(summary.items.is_empty());
        assert!(summary.delivery.is_none());
        assert!(summary.coupon_code.is_none());
    }

    #[tokio::test]
    async fn test_pickup_order_needs_no_address() {
        let h = checkout_harness(vec![line("ring", 100, 1)]).await;
        h.storefront.select_delivery_method(DeliveryMethod::Pickup).await;

        let mut contact = contact();
        contact.city.clear();
        contact.street.clear();
        contact.house_number.clear();

        let placed = h
            .storefront
            .place_order(contact, Some(PaymentMethod::CashOnDelivery))
            .await
            .unwrap();
        assert_eq!(placed.totals.shipping, Money::zero());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_checkout_state() {
        let h = harness(
            MemoryCartStore::with_cart("u1", vec![line("ring", 100, 1)]),
            coupons(),
            RecordingOrderSink::failing(),
        );
        h.storefront.sign_in("u1").await.unwrap();
        h.storefront.select_delivery_method(DeliveryMethod::Pickup).await;
        h.storefront.apply_coupon("TEN").await.unwrap();

        let err = h
            .storefront
            .place_order(contact(), Some(PaymentMethod::BankTransfer))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);

        let summary = h.storefront.order_summary().await;
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.coupon_code.as_deref(), Some("TEN"));
        assert_eq!(h.store.stored("u1").len(), 1);
    }
}
