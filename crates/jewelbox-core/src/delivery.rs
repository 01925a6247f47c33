//! # Delivery Module
//!
//! Pickup/delivery selection and the shipping rates behind it.
//!
//! ## Selection State Machine
//! ```text
//!                 select_method(Pickup)
//!      ┌──────────────────────────────────────────┐
//!      │                                          ▼
//! ┌────┴──────────────┐  select_method(Delivery) ┌──────────────────┐
//! │ Delivery          │◄─────────────────────────│ Pickup           │
//! │ area: None/Some   │                          │ area: None       │
//! └────┬──────────────┘                          └──────────────────┘
//!      │ select_area(a)                            select_area(_) = no-op
//!      ▼
//! ┌───────────────────┐
//! │ Delivery          │
//! │ area: Some(a)     │
//! └───────────────────┘
//! ```
//!
//! Shipping: pickup is free, delivery uses the area surcharge, and a delivery
//! without an area yet uses the default area rate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{
    CART_PREVIEW_SHIPPING_ESTIMATE, DEFAULT_AREA_SHIPPING, LOCAL_AREA_SHIPPING, OTHER_AREA_SHIPPING,
};

// =============================================================================
// Delivery Method & Area
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Customer collects the order from the studio.
    Pickup,
    /// Courier delivery to the customer's address.
    Delivery,
}

/// Delivery zone. Each carries its own surcharge.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryArea {
    Local,
    Other,
}

// =============================================================================
// Delivery Selection
// =============================================================================

/// The customer's delivery choice on the checkout page.
///
/// Invariant: `area` is `None` whenever `method` is `Pickup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliverySelection {
    method: DeliveryMethod,
    area: Option<DeliveryArea>,
}

impl DeliverySelection {
    /// Starts a selection with the given method and no area.
    pub const fn new(method: DeliveryMethod) -> Self {
        Self { method, area: None }
    }

    pub const fn pickup() -> Self {
        Self::new(DeliveryMethod::Pickup)
    }

    /// A delivery selection with the area already chosen.
    pub const fn delivery_to(area: DeliveryArea) -> Self {
        Self {
            method: DeliveryMethod::Delivery,
            area: Some(area),
        }
    }

    #[inline]
    pub const fn method(&self) -> DeliveryMethod {
        self.method
    }

    #[inline]
    pub const fn area(&self) -> Option<DeliveryArea> {
        self.area
    }

    #[inline]
    pub fn is_delivery(&self) -> bool {
        self.method == DeliveryMethod::Delivery
    }

    /// Switches method. Entering pickup clears the area; re-selecting
    /// delivery while already on delivery keeps the chosen area.
    pub fn select_method(&mut self, method: DeliveryMethod) {
        match method {
            DeliveryMethod::Pickup => self.area = None,
            DeliveryMethod::Delivery if self.method == DeliveryMethod::Delivery => {}
            DeliveryMethod::Delivery => self.area = None,
        }
        self.method = method;
    }

    /// Chooses an area. Returns `false` (and changes nothing) in pickup mode.
    pub fn select_area(&mut self, area: DeliveryArea) -> bool {
        if self.method == DeliveryMethod::Pickup {
            return false;
        }
        self.area = Some(area);
        true
    }
}

// =============================================================================
// Shipping Rates
// =============================================================================

/// Shipping price table.
///
/// `default_area` and `cart_preview_estimate` are separate figures: the
/// first is charged, the second is only ever displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRates {
    pub local: Money,
    pub other: Money,
    pub default_area: Money,
    pub cart_preview_estimate: Money,
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            local: LOCAL_AREA_SHIPPING,
            other: OTHER_AREA_SHIPPING,
            default_area: DEFAULT_AREA_SHIPPING,
            cart_preview_estimate: CART_PREVIEW_SHIPPING_ESTIMATE,
        }
    }
}

impl ShippingRates {
    /// Surcharge for a specific area.
    pub fn for_area(&self, area: DeliveryArea) -> Money {
        match area {
            DeliveryArea::Local => self.local,
            DeliveryArea::Other => self.other,
        }
    }

    /// Shipping owed for a selection.
    pub fn for_selection(&self, selection: &DeliverySelection) -> Money {
        match (selection.method(), selection.area()) {
            (DeliveryMethod::Pickup, _) => Money::zero(),
            (DeliveryMethod::Delivery, Some(area)) => self.for_area(area),
            (DeliveryMethod::Delivery, None) => self.default_area,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_clears_area() {
        let mut selection = DeliverySelection::delivery_to(DeliveryArea::Other);
        selection.select_method(DeliveryMethod::Pickup);
        assert_eq!(selection.method(), DeliveryMethod::Pickup);
        assert_eq!(selection.area(), None);
    }

    #[test]
    fn test_area_ignored_in_pickup() {
        let mut selection = DeliverySelection::pickup();
        assert!(!selection.select_area(DeliveryArea::Local));
        assert_eq!(selection.area(), None);
    }

    #[test]
    fn test_entering_delivery_leaves_area_unset() {
        let mut selection = DeliverySelection::pickup();
        selection.select_method(DeliveryMethod::Delivery);
        assert!(selection.is_delivery());
        assert_eq!(selection.area(), None);

        assert!(selection.select_area(DeliveryArea::Local));
        selection.select_method(DeliveryMethod::Delivery);
        assert_eq!(selection.area(), Some(DeliveryArea::Local));
    }

    #[test]
    fn test_shipping_for_selection() {
        let rates = ShippingRates::default();

        assert_eq!(rates.for_selection(&DeliverySelection::pickup()), Money::zero());
        assert_eq!(
            rates.for_selection(&DeliverySelection::delivery_to(DeliveryArea::Local)).minor(),
            2000
        );
        assert_eq!(
            rates.for_selection(&DeliverySelection::delivery_to(DeliveryArea::Other)).minor(),
            7000
        );
        assert_eq!(
            rates.for_selection(&DeliverySelection::new(DeliveryMethod::Delivery)).minor(),
            2500
        );
    }

    #[test]
    fn test_default_and_preview_rates_are_distinct() {
        let rates = ShippingRates::default();
        assert_ne!(rates.default_area, rates.cart_preview_estimate);
    }

    #[test]
    fn test_selection_serialization() {
        let json = serde_json::to_value(DeliverySelection::delivery_to(DeliveryArea::Local)).unwrap();
        assert_eq!(json["method"], "delivery");
        assert_eq!(json["area"], "local");
    }
}
