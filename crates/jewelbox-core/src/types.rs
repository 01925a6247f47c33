//! # Domain Types
//!
//! Core domain types shared by the cart, checkout, and persistence layers.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  CartLineItem   │   │   OrderRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id             │──►│  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  contact        │       │
//! │  │  price          │   │  unit_price     │   │  items          │       │
//! │  └─────────────────┘   │  quantity 1..10 │   │  totals         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │ PaymentMethod   │   │  OrderStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  CashOnDelivery │   │  Pending        │       │
//! │  │  1250 = 12.5%   │   │  CreditCard     │   │  Confirmed ...  │       │
//! │  └─────────────────┘   │  BankTransfer   │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::delivery::DeliverySelection;
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (bps).
///
/// 1 basis point = 0.01%, so 10000 bps = 100% and 1250 bps = 12.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// 100%.
    pub const FULL: Percentage = Percentage(10_000);

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from whole percent.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Percentage(percent * 100)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// True for a usable coupon rate: above 0% and at most 100%.
    #[inline]
    pub const fn is_valid_coupon_rate(&self) -> bool {
        self.0 > 0 && self.0 <= Self::FULL.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

/// Parses `"10"`, `"12.5"`, or `"12.75"` (percent, up to two decimals).
/// A trailing `%` is allowed.
impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "percentage".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let s = s.strip_suffix('%').unwrap_or(s).trim_end();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("must be a decimal number"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most 2 decimal places"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a non-negative decimal number"));
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value is too large"))?
        };
        let frac: u32 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u32>().map_err(|_| invalid("must be a decimal number"))? * 10,
            _ => frac.parse().map_err(|_| invalid("must be a decimal number"))?,
        };

        whole
            .checked_mul(100)
            .and_then(|bps| bps.checked_add(frac))
            .map(Percentage)
            .ok_or_else(|| invalid("value is too large"))
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product snapshot handed to the cart when a customer clicks "add".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One product in the cart.
///
/// Name and unit price are frozen when the item is added; a later price
/// change on the product does not touch carts already holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    /// Always within `MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY` once in a cart.
    pub quantity: i64,
}

impl CartLineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Contact Info
// =============================================================================

/// Customer contact and shipping address from the checkout form.
///
/// Address fields are only required for delivery orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub notes: Option<String>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid to the courier or at pickup.
    CashOnDelivery,
    CreditCard,
    BankTransfer,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of a placed order. New orders start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

// =============================================================================
// Order Totals
// =============================================================================

/// The four numbers shown on the order summary.
///
/// Always recomputed from cart, delivery and coupon; never stored as the
/// source of truth while the customer is still shopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    /// `max(0, subtotal + shipping - discount)`
    pub total: Money,
}

impl OrderTotals {
    /// Builds totals from the three inputs, clamping the total at zero.
    pub fn new(subtotal: Money, shipping: Money, discount: Money) -> Self {
        Self {
            subtotal,
            shipping,
            discount,
            total: (subtotal + shipping - discount).non_negative(),
        }
    }
}

// =============================================================================
// Pricing Context
// =============================================================================

/// Where totals are being computed.
///
/// The cart page shows a preview without shipping; the checkout page prices
/// the chosen delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "context", content = "delivery", rename_all = "snake_case")]
pub enum PricingContext {
    CartPreview,
    Checkout(DeliverySelection),
}

// =============================================================================
// Order Record
// =============================================================================

/// A submitted order, as handed to the order sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub contact: ContactInfo,
    pub items: Vec<CartLineItem>,
    pub delivery: DeliverySelection,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub totals: OrderTotals,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_parse() {
        assert_eq!("10".parse::<Percentage>().unwrap().bps(), 1000);
        assert_eq!("12.5".parse::<Percentage>().unwrap().bps(), 1250);
        assert_eq!("12.75%".parse::<Percentage>().unwrap().bps(), 1275);
        assert_eq!("100".parse::<Percentage>().unwrap(), Percentage::FULL);

        assert!("".parse::<Percentage>().is_err());
        assert!("-5".parse::<Percentage>().is_err());
        assert!("1.234".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_bps(1000).to_string(), "10%");
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.5%");
        assert_eq!(Percentage::from_bps(1275).to_string(), "12.75%");
    }

    #[test]
    fn test_coupon_rate_bounds() {
        assert!(!Percentage::from_bps(0).is_valid_coupon_rate());
        assert!(Percentage::from_bps(1).is_valid_coupon_rate());
        assert!(Percentage::FULL.is_valid_coupon_rate());
        assert!(!Percentage::from_bps(10_001).is_valid_coupon_rate());
    }

    #[test]
    fn test_line_total() {
        let item = CartLineItem::new("ring-1", "Ring", Money::from_minor(14990), 3);
        assert_eq!(item.line_total().minor(), 44970);
    }

    #[test]
    fn test_order_totals_clamp_at_zero() {
        let totals = OrderTotals::new(Money::from_major(10), Money::zero(), Money::from_major(50));
        assert_eq!(totals.total, Money::zero());

        let totals = OrderTotals::new(Money::from_major(200), Money::from_major(20), Money::from_major(30));
        assert_eq!(totals.total, Money::from_major(190));
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
        assert_eq!(serde_json::to_string(&OrderStatus::default()).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_contact_info_deserializes_partial_form() {
        let contact: ContactInfo =
            serde_json::from_str(r#"{"firstName":"Dana","email":"dana@example.com"}"#).unwrap();
        assert_eq!(contact.first_name, "Dana");
        assert!(contact.street.is_empty());
        assert!(contact.notes.is_none());
    }
}
