//! # Commands Module
//!
//! The operations the storefront pages invoke.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Commands                               │
//! │                                                                         │
//! │  SESSION (session.rs)                                                   │
//! │  ─────────────────────                                                  │
//! │  • sign_in(user_id)           → CartResponse                           │
//! │  • sign_out()                 → CartResponse (empty)                   │
//! │                                                                         │
//! │  CART (cart.rs)                                                         │
//! │  ───────────────                                                        │
//! │  • get_cart() / refresh_cart()                                         │
//! │  • add_to_cart(product)                                                │
//! │  • increase_item(id) / decrease_item(id)                               │
//! │  • update_cart_item(id, qty) / remove_from_cart(id)                    │
//! │  • clear_cart()                                                        │
//! │                                                                         │
//! │  CHECKOUT (checkout.rs)                                                 │
//! │  ──────────────────────                                                 │
//! │  • select_delivery_method(method) / select_area(area)                  │
//! │  • apply_coupon(code) / remove_coupon()                                │
//! │  • order_summary()                                                     │
//! │  • place_order(contact, payment)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command is a method on [`crate::Storefront`] and returns
//! `Result<T, ApiError>` where it can fail.

pub mod cart;
pub mod checkout;
pub mod session;

pub use cart::CartResponse;
pub use checkout::{OrderSummary, PlacedOrder, TotalsDisplay};
