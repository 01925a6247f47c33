//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Guest   │────►│ Signed   │────►│ Checkout │────►│  Order   │       │
//! │  │ (empty)  │     │   in     │     │   page   │     │  placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                                  │             │
//! │       │           add_to_cart                             │             │
//! │   sign_out        increase/decrease_item                  │             │
//! │       │           update_cart_item                        ▼             │
//! │       │           remove_from_cart              cart cleared in store  │
//! │       │           clear_cart                                           │
//! │       └────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guests see an always-empty cart. Mutations need a signed-in customer
//! and fail with `AUTH_REQUIRED` otherwise.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{CartSession, CheckoutSession};
use crate::Storefront;
use jewelbox_core::{Cart, CartLineItem, Money, OrderTotals, PricingContext, Product, QuantityOutcome};

/// Cart page payload.
///
/// `totals` is the cart preview: shipping 0, discount from the applied
/// coupon. `shipping_estimate` is the "shipping from" hint shown beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub shipping_estimate: Money,
    pub totals: OrderTotals,
}

impl Storefront {
    pub(crate) fn cart_response(&self, cart: &Cart, checkout: &CheckoutSession) -> CartResponse {
        CartResponse {
            items: cart.items().to_vec(),
            total_quantity: cart.total_item_count(),
            subtotal: cart.subtotal(),
            shipping_estimate: self.calculator.preview_shipping_estimate(),
            totals: self.calculator.compute_totals(
                cart,
                &PricingContext::CartPreview,
                checkout.coupon.get(),
            ),
        }
    }

    async fn respond(&self, session: &CartSession) -> CartResponse {
        let checkout = self.checkout.lock().await;
        self.cart_response(session.cart(), &checkout)
    }

    /// Runs one cart mutation against the stored cart.
    ///
    /// Load, mutate, save, reload. The session view only changes once the
    /// store has accepted the write; if the final reload fails the saved
    /// working copy is shown instead.
    async fn mutate_cart<F>(&self, command: &'static str, mutate: F) -> ApiResult<CartResponse>
    where
        F: FnOnce(&mut Cart) -> ApiResult<QuantityOutcome>,
    {
        let mut session = self.cart.lock().await;
        let user_id = session
            .user_id()
            .map(str::to_string)
            .ok_or_else(ApiError::auth_required)?;

        let mut working = Cart::from_items(self.cart_store.load_cart(&user_id).await?);
        let outcome = mutate(&mut working)?;

        if !outcome.changed() {
            warn!(command, user_id = %user_id, outcome = ?outcome, "Cart unchanged");
            session.replace_cart(working);
            return Ok(self.respond(&session).await);
        }

        self.cart_store.save_cart(&user_id, working.items()).await?;

        let view = match self.cart_store.load_cart(&user_id).await {
            Ok(items) => Cart::from_items(items),
            Err(e) => {
                warn!(command, user_id = %user_id, error = %e, "Reload after save failed; showing saved copy");
                working
            }
        };

        info!(
            command,
            user_id = %user_id,
            outcome = ?outcome,
            items = view.len(),
            subtotal = %view.subtotal(),
            "Cart updated"
        );

        session.replace_cart(view);
        Ok(self.respond(&session).await)
    }

    /// Current cart view without touching the store.
    pub async fn get_cart(&self) -> CartResponse {
        debug!("get_cart command");
        let session = self.cart.lock().await;
        self.respond(&session).await
    }

    /// Reloads the cart from the store. Guests get an empty cart.
    pub async fn refresh_cart(&self) -> ApiResult<CartResponse> {
        debug!("refresh_cart command");
        let mut session = self.cart.lock().await;

        if let Some(user_id) = session.user_id().map(str::to_string) {
            let items = self.cart_store.load_cart(&user_id).await?;
            session.replace_cart(Cart::from_items(items));
        }

        Ok(self.respond(&session).await)
    }

    /// Adds one of `product`, or one more if it is already in the cart.
    pub async fn add_to_cart(&self, product: Product) -> ApiResult<CartResponse> {
        debug!(product_id = %product.id, price = %product.price, "add_to_cart command");
        self.mutate_cart("add_to_cart", |cart| Ok(cart.add_item(&product)?))
            .await
    }

    pub async fn increase_item(&self, product_id: &str) -> ApiResult<CartResponse> {
        debug!(product_id = %product_id, "increase_item command");
        self.mutate_cart("increase_item", |cart| Ok(cart.increase_quantity(product_id)))
            .await
    }

    /// Takes one away; at quantity 1 nothing happens.
    pub async fn decrease_item(&self, product_id: &str) -> ApiResult<CartResponse> {
        debug!(product_id = %product_id, "decrease_item command");
        self.mutate_cart("decrease_item", |cart| Ok(cart.decrease_quantity(product_id)))
            .await
    }

    /// Sets an exact quantity. Zero or less removes the item; above the
    /// maximum clamps.
    pub async fn update_cart_item(&self, product_id: &str, quantity: i64) -> ApiResult<CartResponse> {
        debug!(product_id = %product_id, quantity, "update_cart_item command");
        self.mutate_cart("update_cart_item", |cart| {
            Ok(cart.set_quantity(product_id, quantity))
        })
        .await
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> ApiResult<CartResponse> {
        debug!(product_id = %product_id, "remove_from_cart command");
        self.mutate_cart("remove_from_cart", |cart| Ok(cart.remove_item(product_id)))
            .await
    }

    pub async fn clear_cart(&self) -> ApiResult<CartResponse> {
        debug!("clear_cart command");
        self.mutate_cart("clear_cart", |cart| {
            if cart.is_empty() {
                return Ok(QuantityOutcome::NotInCart);
            }
            cart.clear();
            Ok(QuantityOutcome::Removed)
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
