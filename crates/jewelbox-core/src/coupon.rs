//! # Coupon Module
//!
//! Coupon definitions, eligibility rules, and the single applied-coupon slot.
//!
//! ## Coupon Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored coupon (db)                                                     │
//! │    code "WELCOME10", Percentage(10%), first_order_only, expires_on      │
//! │        │                                                                │
//! │        ▼  check_eligibility(coupon, today, prior_orders)                │
//! │    active? ─► not expired? ─► first order (if required)?                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  CouponValidation { success, coupon, discount_amount, message }         │
//! │        │                                                                │
//! │        ▼  checkout::accept_coupon_validation                            │
//! │  AppliedCoupon slot (at most one)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use crate::error::{CouponError, ValidationError};
use crate::money::Money;
use crate::types::Percentage;
use crate::validation::ValidationResult;

// =============================================================================
// Coupon Kind & Discount
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    Percentage,
    Fixed,
}

impl fmt::Display for CouponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponKind::Percentage => f.write_str("percentage"),
            CouponKind::Fixed => f.write_str("fixed"),
        }
    }
}

/// What a coupon takes off the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CouponDiscount {
    /// A share of the subtotal.
    Percentage(Percentage),
    /// A fixed amount, never more than the subtotal.
    Fixed(Money),
}

impl CouponDiscount {
    /// Builds a discount from a stored `(kind, value)` pair.
    ///
    /// `value` is basis points for percentages and agorot for fixed amounts.
    ///
    /// ## Errors
    /// - value ≤ 0
    /// - a percentage above 100%
    pub fn from_parts(kind: CouponKind, value: i64) -> ValidationResult<Self> {
        if value <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "coupon value".to_string(),
            });
        }

        match kind {
            CouponKind::Fixed => Ok(CouponDiscount::Fixed(Money::from_minor(value))),
            CouponKind::Percentage => {
                let rate = u32::try_from(value)
                    .map(Percentage::from_bps)
                    .ok()
                    .filter(Percentage::is_valid_coupon_rate)
                    .ok_or_else(|| ValidationError::OutOfRange {
                        field: "coupon percentage".to_string(),
                        min: 1,
                        max: i64::from(Percentage::FULL.bps()),
                    })?;
                Ok(CouponDiscount::Percentage(rate))
            }
        }
    }

    pub fn kind(&self) -> CouponKind {
        match self {
            CouponDiscount::Percentage(_) => CouponKind::Percentage,
            CouponDiscount::Fixed(_) => CouponKind::Fixed,
        }
    }

    /// The raw stored value: basis points or agorot.
    pub fn raw_value(&self) -> i64 {
        match self {
            CouponDiscount::Percentage(rate) => i64::from(rate.bps()),
            CouponDiscount::Fixed(amount) => amount.minor(),
        }
    }

    /// Discount on `subtotal`, always within `0..=subtotal`.
    ///
    /// ## Example
    /// ```rust
    /// use jewelbox_core::coupon::CouponDiscount;
    /// use jewelbox_core::Money;
    ///
    /// let fixed = CouponDiscount::Fixed(Money::from_major(50));
    /// assert_eq!(fixed.amount_off(Money::from_major(30)), Money::from_major(30));
    /// ```
    pub fn amount_off(&self, subtotal: Money) -> Money {
        let subtotal = subtotal.non_negative();
        let raw = match self {
            CouponDiscount::Fixed(amount) => *amount,
            CouponDiscount::Percentage(rate) => subtotal.percentage(*rate),
        };
        raw.non_negative().min(subtotal)
    }
}

impl fmt::Display for CouponDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponDiscount::Percentage(rate) => write!(f, "{} off", rate),
            CouponDiscount::Fixed(amount) => write!(f, "{} off", amount),
        }
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount code as defined by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Normalized: trimmed and upper-case.
    pub code: String,
    pub discount: CouponDiscount,
    pub first_order_only: bool,
    pub active: bool,
    /// Last valid day, inclusive.
    #[ts(as = "Option<String>")]
    pub expires_on: Option<NaiveDate>,
}

impl Coupon {
    /// An active, non-expiring coupon open to every customer.
    pub fn new(code: &str, discount: CouponDiscount) -> Self {
        Self {
            code: normalize_code(code),
            discount,
            first_order_only: false,
            active: true,
            expires_on: None,
        }
    }

    pub fn first_order_only(mut self) -> Self {
        self.first_order_only = true;
        self
    }

    pub fn expiring_on(mut self, date: NaiveDate) -> Self {
        self.expires_on = Some(date);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn kind(&self) -> CouponKind {
        self.discount.kind()
    }

    /// True once `today` is past the expiry date.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expires_on.map_or(false, |last_day| today > last_day)
    }

    /// Discount this coupon gives on `subtotal`.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        self.discount.amount_off(subtotal)
    }
}

/// Trims and upper-cases a coupon code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// =============================================================================
// Eligibility
// =============================================================================

/// Why a coupon cannot be used. The message is shown to the customer as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("Coupon not found")]
    NotFound,

    #[error("This coupon is no longer active")]
    Inactive,

    #[error("This coupon has expired")]
    Expired,

    #[error("Please sign in to use this coupon")]
    SignInRequired,

    #[error("This coupon is valid on your first order only")]
    NotFirstOrder,
}

/// Checks whether `coupon` can be used today by this customer.
///
/// `prior_orders` is `None` for a guest. Checks run in this order: active,
/// expiry (the expiry day itself is still valid), first-order restriction.
pub fn check_eligibility(
    coupon: &Coupon,
    today: NaiveDate,
    prior_orders: Option<i64>,
) -> Result<(), CouponRejection> {
    if !coupon.active {
        return Err(CouponRejection::Inactive);
    }
    if coupon.is_expired_on(today) {
        return Err(CouponRejection::Expired);
    }
    if coupon.first_order_only {
        match prior_orders {
            None => return Err(CouponRejection::SignInRequired),
            Some(count) if count > 0 => return Err(CouponRejection::NotFirstOrder),
            Some(_) => {}
        }
    }
    Ok(())
}

// =============================================================================
// Validation Outcome
// =============================================================================

/// Result reported by a coupon-validation service.
///
/// `discount_amount` is informational; totals are always recomputed from
/// the coupon itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub success: bool,
    pub coupon: Option<Coupon>,
    pub discount_amount: Option<Money>,
    pub message: Option<String>,
}

impl CouponValidation {
    pub fn accepted(coupon: Coupon, discount_amount: Money) -> Self {
        Self {
            success: true,
            coupon: Some(coupon),
            discount_amount: Some(discount_amount),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            coupon: None,
            discount_amount: None,
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Applied Coupon Slot
// =============================================================================

/// Holds at most one applied coupon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedCoupon(Option<Coupon>);

impl AppliedCoupon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `coupon`.
    ///
    /// ## Errors
    /// `AlreadyApplied` if a coupon is present; the existing one is kept.
    pub fn apply(&mut self, coupon: Coupon) -> Result<(), CouponError> {
        if self.0.is_some() {
            return Err(CouponError::AlreadyApplied);
        }
        self.0 = Some(coupon);
        Ok(())
    }

    /// Clears the slot, returning what was there.
    pub fn remove(&mut self) -> Option<Coupon> {
        self.0.take()
    }

    pub fn get(&self) -> Option<&Coupon> {
        self.0.as_ref()
    }

    pub fn code(&self) -> Option<&str> {
        self.0.as_ref().map(|coupon| coupon.code.as_str())
    }

    pub fn is_applied(&self) -> bool {
        self.0.is_some()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            CouponDiscount::from_parts(CouponKind::Fixed, 3000).unwrap(),
            CouponDiscount::Fixed(Money::from_major(30))
        );
        assert_eq!(
            CouponDiscount::from_parts(CouponKind::Percentage, 1000).unwrap(),
            CouponDiscount::Percentage(Percentage::from_percent(10))
        );
        assert!(CouponDiscount::from_parts(CouponKind::Fixed, 0).is_err());
        assert!(CouponDiscount::from_parts(CouponKind::Percentage, -5).is_err());
        assert!(CouponDiscount::from_parts(CouponKind::Percentage, 10_001).is_err());
        assert!(CouponDiscount::from_parts(CouponKind::Percentage, 10_000).is_ok());
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let fixed = CouponDiscount::Fixed(Money::from_major(50));
        assert_eq!(fixed.amount_off(Money::from_major(200)), Money::from_major(50));
        assert_eq!(fixed.amount_off(Money::from_major(20)), Money::from_major(20));
        assert_eq!(fixed.amount_off(Money::zero()), Money::zero());
    }

    #[test]
    fn test_percentage_discount() {
        let full = CouponDiscount::Percentage(Percentage::FULL);
        assert_eq!(full.amount_off(Money::from_major(300)), Money::from_major(300));

        let ten = CouponDiscount::Percentage(Percentage::from_percent(10));
        assert_eq!(ten.amount_off(Money::from_minor(14990)).minor(), 1499);
    }

    #[test]
    fn test_code_is_normalized() {
        let coupon = Coupon::new("  welcome10 ", CouponDiscount::Fixed(Money::from_major(10)));
        assert_eq!(coupon.code, "WELCOME10");
        assert_eq!(coupon.kind(), CouponKind::Fixed);
    }

    #[test]
    fn test_eligibility_order() {
        let today = date(2026, 3, 15);
        let coupon = Coupon::new("OLD", CouponDiscount::Fixed(Money::from_major(10)))
            .inactive()
            .expiring_on(date(2026, 1, 1));
        // inactive is reported before expiry
        assert_eq!(check_eligibility(&coupon, today, Some(0)), Err(CouponRejection::Inactive));
    }

    #[test]
    fn test_expiry_day_is_inclusive() {
        let coupon = Coupon::new("SPRING", CouponDiscount::Fixed(Money::from_major(10)))
            .expiring_on(date(2026, 3, 15));

        assert!(check_eligibility(&coupon, date(2026, 3, 15), Some(0)).is_ok());
        assert_eq!(
            check_eligibility(&coupon, date(2026, 3, 16), Some(0)),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn test_first_order_only() {
        let today = date(2026, 3, 15);
        let coupon = Coupon::new("WELCOME", CouponDiscount::Percentage(Percentage::from_percent(10)))
            .first_order_only();

        assert!(check_eligibility(&coupon, today, Some(0)).is_ok());
        assert_eq!(
            check_eligibility(&coupon, today, Some(2)),
            Err(CouponRejection::NotFirstOrder)
        );
        assert_eq!(
            check_eligibility(&coupon, today, None),
            Err(CouponRejection::SignInRequired)
        );
    }

    #[test]
    fn test_applied_slot_keeps_first() {
        let first = Coupon::new("A", CouponDiscount::Fixed(Money::from_major(10)));
        let second = Coupon::new("B", CouponDiscount::Fixed(Money::from_major(20)));

        let mut slot = AppliedCoupon::new();
        slot.apply(first).unwrap();
        assert_eq!(slot.apply(second), Err(CouponError::AlreadyApplied));
        assert_eq!(slot.code(), Some("A"));

        assert_eq!(slot.remove().map(|c| c.code), Some("A".to_string()));
        assert!(!slot.is_applied());
        assert!(slot.remove().is_none());
    }

    #[test]
    fn test_discount_serialization() {
        let json = serde_json::to_value(CouponDiscount::Percentage(Percentage::from_bps(1250))).unwrap();
        assert_eq!(json["kind"], "percentage");
        assert_eq!(json["value"], 1250);
    }
}
