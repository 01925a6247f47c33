//! # jewelbox-core: Pure Business Logic for the Jewelbox Storefront
//!
//! Order-total computation and cart-quantity reconciliation for a small
//! jewelry storefront. Everything here is synchronous and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Jewelbox Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront pages (JS)                          │   │
//! │  │    Product grid ──► Cart page ──► Checkout page ──► Confirm    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON commands                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          jewelbox-storefront (session state, ports)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ jewelbox-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌──────────┐ ┌──────────┐   │   │
//! │  │   │ money  │ │  cart  │ │ coupon │ │ delivery │ │ checkout │   │   │
//! │  │   └────────┘ └────────┘ └────────┘ └──────────┘ └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer agorot with half-up percentage math
//! - [`types`] - Products, line items, contact info, order records
//! - [`cart`] - The cart and its quantity rules
//! - [`coupon`] - Coupon definitions, eligibility, the applied-coupon slot
//! - [`delivery`] - Pickup/delivery selection and shipping rates
//! - [`checkout`] - Totals and pre-submission order validation
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use jewelbox_core::cart::Cart;
//! use jewelbox_core::checkout::CheckoutCalculator;
//! use jewelbox_core::coupon::{Coupon, CouponDiscount};
//! use jewelbox_core::delivery::{DeliveryArea, DeliveryMethod, DeliverySelection};
//! use jewelbox_core::types::{PricingContext, Product};
//! use jewelbox_core::Money;
//!
//! let mut cart = Cart::new();
//! let ring = Product::new("ring-1", "Silver ring", Money::from_major(100));
//! cart.add_item(&ring).unwrap();
//! cart.add_item(&ring).unwrap();
//!
//! let mut delivery = DeliverySelection::new(DeliveryMethod::Delivery);
//! delivery.select_area(DeliveryArea::Local);
//!
//! let coupon = Coupon::new("SAVE30", CouponDiscount::Fixed(Money::from_major(30)));
//! let totals = CheckoutCalculator::default().compute_totals(
//!     &cart,
//!     &PricingContext::Checkout(delivery),
//!     Some(&coupon),
//! );
//!
//! assert_eq!(totals.subtotal, Money::from_major(200));
//! assert_eq!(totals.shipping, Money::from_major(20));
//! assert_eq!(totals.discount, Money::from_major(30));
//! assert_eq!(totals.total, Money::from_major(190));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod delivery;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, QuantityOutcome};
pub use checkout::{accept_coupon_validation, prepare_coupon_code, CheckoutCalculator};
pub use coupon::{AppliedCoupon, Coupon, CouponDiscount, CouponKind, CouponRejection, CouponValidation};
pub use delivery::{DeliveryArea, DeliveryMethod, DeliverySelection, ShippingRates};
pub use error::{
    ContactField, CoreError, CoreResult, CouponError, OrderValidationError, OrderValidationErrors,
    ValidationError,
};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency symbol used by `Money`'s `Display`.
pub const CURRENCY_SYMBOL: &str = "₪";

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Handmade pieces are stocked in small batches; larger orders go through
/// the shop directly.
pub const MAX_ITEM_QUANTITY: i64 = 10;

/// Minimum quantity of a line item that stays in the cart.
pub const MIN_ITEM_QUANTITY: i64 = 1;

/// Highest accepted unit price (₪1,000,000.00).
///
/// At [`MAX_ITEM_QUANTITY`] a line totals at most ₪10,000,000, so subtotals
/// stay far inside `i64` agorot for any realistic cart.
pub const MAX_UNIT_PRICE: Money = Money::from_major(1_000_000);

/// Shipping charged for a delivery order before an area is chosen (₪25.00).
pub const DEFAULT_AREA_SHIPPING: Money = Money::from_minor(2500);

/// "Shipping from" hint shown on the cart page (₪20.00).
///
/// Display only. Never used to compute a checkout total, and distinct from
/// [`DEFAULT_AREA_SHIPPING`].
pub const CART_PREVIEW_SHIPPING_ESTIMATE: Money = Money::from_minor(2000);

/// Default surcharge for the local delivery area (₪20.00).
pub const LOCAL_AREA_SHIPPING: Money = Money::from_minor(2000);

/// Default surcharge for deliveries outside the local area (₪70.00).
pub const OTHER_AREA_SHIPPING: Money = Money::from_minor(7000);
