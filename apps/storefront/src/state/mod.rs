//! # State Module
//!
//! Session state for the storefront.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │      CartState           │      │     CheckoutState        │        │
//! │  │                          │      │                          │        │
//! │  │  Arc<Mutex<CartSession>> │      │  Arc<Mutex<Checkout-     │        │
//! │  │  • user_id               │      │            Session>>     │        │
//! │  │  • cart view             │      │  • delivery selection    │        │
//! │  │                          │      │  • applied coupon        │        │
//! │  └──────────────────────────┘      └──────────────────────────┘        │
//! │                                                                         │
//! │  LOCK ORDER: cart, then checkout. A command needing both always        │
//! │  takes them in that order, so no two commands can deadlock.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod checkout;

pub use cart::{CartSession, CartState};
pub use checkout::{CheckoutSession, CheckoutState};
