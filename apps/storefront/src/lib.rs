//! # Jewelbox Storefront
//!
//! Cart and checkout backend for the jewelry storefront pages.
//!
//! ## Module Organization
//! ```text
//! jewelbox_storefront/
//! ├── lib.rs          ◄─── You are here (Storefront, logging setup)
//! ├── config.rs       ◄─── storefront.toml + JEWELBOX_* overrides
//! ├── ports.rs        ◄─── CartStore / CouponValidator / OrderSink
//! ├── adapters.rs     ◄─── SQLite implementations of the ports
//! ├── state/
//! │   ├── cart.rs     ◄─── Signed-in user + cart view
//! │   └── checkout.rs ◄─── Delivery choice + applied coupon
//! ├── commands/
//! │   ├── session.rs  ◄─── sign_in / sign_out
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   └── checkout.rs ◄─── Delivery, coupon, summary, place_order
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront                                      │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────────────┐    │
//! │  │  CartState   │  │ CheckoutState│  │  CheckoutCalculator        │    │
//! │  └──────────────┘  └──────────────┘  │  (shipping rates)          │    │
//! │                                      └────────────────────────────┘    │
//! │  Arc<dyn CartStore>   Arc<dyn CouponValidator>   Arc<dyn OrderSink>    │
//! │         │                      │                         │              │
//! │         ▼                      ▼                         ▼              │
//! │   Database (SQLite)   LocalCouponValidator         Database (SQLite)   │
//! │                       or a hosted service                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod commands;
pub mod config;
pub mod error;
pub mod ports;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use adapters::LocalCouponValidator;
use config::StorefrontConfig;
use error::ApiResult;
use ports::{CartStore, CouponValidator, OrderSink};
use state::{CartState, CheckoutState};

use jewelbox_core::{CheckoutCalculator, CURRENCY_SYMBOL};
use jewelbox_db::{Database, DbConfig};

pub use commands::{CartResponse, OrderSummary, PlacedOrder, TotalsDisplay};
pub use error::{ApiError, ErrorCode};

/// Installs the fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jewelbox=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// One shopper's storefront session and its collaborators.
pub struct Storefront {
    cart: CartState,
    checkout: CheckoutState,
    cart_store: Arc<dyn CartStore>,
    coupon_validator: Arc<dyn CouponValidator>,
    order_sink: Arc<dyn OrderSink>,
    calculator: CheckoutCalculator,
    currency_symbol: String,
}

impl Storefront {
    /// A guest session over the given collaborators.
    pub fn new(
        cart_store: Arc<dyn CartStore>,
        coupon_validator: Arc<dyn CouponValidator>,
        order_sink: Arc<dyn OrderSink>,
        calculator: CheckoutCalculator,
    ) -> Self {
        Storefront {
            cart: CartState::new(),
            checkout: CheckoutState::new(),
            cart_store,
            coupon_validator,
            order_sink,
            calculator,
            currency_symbol: CURRENCY_SYMBOL.to_string(),
        }
    }

    /// Symbol used in `OrderSummary` display strings.
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Opens the configured SQLite database and wires every port to it.
    ///
    /// ## Startup Sequence
    /// ```text
    /// 1. validate config
    /// 2. connect + migrate (DbConfig from [database])
    /// 3. calculator from [shipping]
    /// 4. Database as CartStore + OrderSink, LocalCouponValidator
    /// ```
    pub async fn open(config: &StorefrontConfig) -> ApiResult<Self> {
        config.validate()?;

        let path = config.database.resolved_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::internal(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }

        info!(path = %path.display(), store = %config.store.name, "Opening storefront");

        let db = Database::new(
            DbConfig::new(&path).max_connections(config.database.max_connections),
        )
        .await?;

        Ok(Self::with_database(db, config))
    }

    /// Wires an already-open database.
    pub fn with_database(db: Database, config: &StorefrontConfig) -> Self {
        let validator = Arc::new(LocalCouponValidator::new(db.clone()));
        let db = Arc::new(db);

        Storefront::new(
            db.clone(),
            validator,
            db,
            CheckoutCalculator::new(config.shipping_rates()),
        )
        .with_currency_symbol(config.store.currency_symbol.clone())
    }
}

// =============================================================================
// Integration Tests (SQLite-backed)
// =============================================================================
