//! # Cart Session
//!
//! The signed-in customer and the last authoritative view of their cart.
//!
//! ## Thread Safety
//! The session sits behind a `tokio::sync::Mutex`. A command holds the lock
//! across its store calls, so two clicks on "+" are applied one after the
//! other, each against a freshly loaded cart.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reload-Before-Mutate                                 │
//! │                                                                         │
//! │  lock session                                                          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  load_cart(user) ──── error ───► return error (view unchanged)         │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  mutate working copy                                                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  save_cart(user) ──── error ───► return error (view unchanged)         │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  load_cart(user) ──── error ───► keep working copy, warn               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  replace view                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use jewelbox_core::Cart;

/// Who is shopping and what their cart looked like after the last command.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    user_id: Option<String>,
    cart: Cart,
}

impl CartSession {
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Installs a signed-in user with their loaded cart.
    pub fn sign_in(&mut self, user_id: impl Into<String>, cart: Cart) {
        self.user_id = Some(user_id.into());
        self.cart = cart;
    }

    /// Back to a guest with an empty cart.
    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.cart.clear();
    }

    /// Replaces the cart view wholesale.
    pub fn replace_cart(&mut self, cart: Cart) {
        self.cart = cart;
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }
}

/// Shared handle to the cart session.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    inner: Arc<Mutex<CartSession>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session for the duration of one command.
    pub async fn lock(&self) -> MutexGuard<'_, CartSession> {
        self.inner.lock().await
    }
}
