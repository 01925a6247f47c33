//! # Checkout Module
//!
//! One calculator for both the cart page preview and the checkout page.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal = Σ unit_price × quantity                                  │
//! │  2. shipping = CartPreview            → 0                               │
//! │                Checkout(pickup)       → 0                               │
//! │                Checkout(delivery, a)  → rates[a]                        │
//! │                Checkout(delivery, ∅)  → default area rate               │
//! │  3. discount = coupon ? min(coupon on subtotal, subtotal) : 0           │
//! │  4. total    = max(0, subtotal + shipping − discount)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::cart::Cart;
use crate::coupon::{normalize_code, AppliedCoupon, Coupon, CouponValidation};
use crate::delivery::{DeliverySelection, ShippingRates};
use crate::error::{ContactField, CouponError, OrderValidationError, OrderValidationErrors};
use crate::money::Money;
use crate::types::{ContactInfo, OrderTotals, PaymentMethod, PricingContext};
use crate::validation::validate_email;

/// Fallback shown when a service rejects a coupon without saying why.
const GENERIC_COUPON_REJECTION: &str = "Invalid coupon code";

// =============================================================================
// Checkout Calculator
// =============================================================================

/// Computes shipping, discount and totals from a shipping rate table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckoutCalculator {
    rates: ShippingRates,
}

impl CheckoutCalculator {
    pub fn new(rates: ShippingRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &ShippingRates {
        &self.rates
    }

    /// Shipping owed for a delivery selection.
    pub fn resolve_shipping(&self, selection: &DeliverySelection) -> Money {
        self.rates.for_selection(selection)
    }

    /// The "shipping from" figure for the cart page. Display only.
    pub fn preview_shipping_estimate(&self) -> Money {
        self.rates.cart_preview_estimate
    }

    /// Discount `coupon` gives on `subtotal`, never more than the subtotal.
    pub fn apply_coupon(&self, coupon: &Coupon, subtotal: Money) -> Money {
        coupon.discount_for(subtotal)
    }

    /// Computes totals for the given context.
    ///
    /// The cart preview always has zero shipping; the estimate is reported
    /// separately through [`CheckoutCalculator::preview_shipping_estimate`].
    pub fn compute_totals(
        &self,
        cart: &Cart,
        context: &PricingContext,
        coupon: Option<&Coupon>,
    ) -> OrderTotals {
        let subtotal = cart.subtotal();
        let shipping = match context {
            PricingContext::CartPreview => Money::zero(),
            PricingContext::Checkout(selection) => self.resolve_shipping(selection),
        };
        let discount = coupon
            .map(|coupon| self.apply_coupon(coupon, subtotal))
            .unwrap_or_default();

        OrderTotals::new(subtotal, shipping, discount)
    }

    /// Checks that an order can be submitted, collecting every problem.
    ///
    /// Contact name, phone and email are required for pickup orders too.
    ///
    /// ## Check Order
    /// empty cart, delivery method, first/last name, phone, email, then
    /// (for delivery) area, city, street, house number, then payment method.
    pub fn validate_order(
        &self,
        cart: &Cart,
        delivery: Option<&DeliverySelection>,
        contact: &ContactInfo,
        payment: Option<PaymentMethod>,
    ) -> Result<(), OrderValidationErrors> {
        let mut errors = Vec::new();

        if cart.is_empty() {
            errors.push(OrderValidationError::EmptyCart);
        }
        if delivery.is_none() {
            errors.push(OrderValidationError::MissingDeliveryMethod);
        }

        require(&mut errors, &contact.first_name, ContactField::FirstName);
        require(&mut errors, &contact.last_name, ContactField::LastName);
        require(&mut errors, &contact.phone, ContactField::Phone);

        if contact.email.trim().is_empty() {
            errors.push(OrderValidationError::MissingContactField(ContactField::Email));
        } else if validate_email(&contact.email).is_err() {
            errors.push(OrderValidationError::InvalidEmail);
        }

        if let Some(selection) = delivery.filter(|selection| selection.is_delivery()) {
            if selection.area().is_none() {
                errors.push(OrderValidationError::MissingArea);
            }
            require(&mut errors, &contact.city, ContactField::City);
            require(&mut errors, &contact.street, ContactField::Street);
            require(&mut errors, &contact.house_number, ContactField::HouseNumber);
        }

        if payment.is_none() {
            errors.push(OrderValidationError::MissingPaymentMethod);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(OrderValidationErrors(errors))
        }
    }
}

fn require(errors: &mut Vec<OrderValidationError>, value: &str, field: ContactField) {
    if value.trim().is_empty() {
        errors.push(OrderValidationError::MissingContactField(field));
    }
}

// =============================================================================
// Coupon Application Steps
// =============================================================================

/// First step of applying a coupon, before the validation service is asked.
///
/// Returns the normalized code.
///
/// ## Errors
/// - `AlreadyApplied` when the slot is occupied
/// - `EmptyCode` when the input is blank
pub fn prepare_coupon_code(code: &str, applied: &AppliedCoupon) -> Result<String, CouponError> {
    if applied.is_applied() {
        return Err(CouponError::AlreadyApplied);
    }

    let code = normalize_code(code);
    if code.is_empty() {
        return Err(CouponError::EmptyCode);
    }
    Ok(code)
}

/// Second step: turns the service's answer into a coupon or a rejection.
///
/// A rejection carries the service's message verbatim.
pub fn accept_coupon_validation(outcome: CouponValidation) -> Result<Coupon, CouponError> {
    match outcome {
        CouponValidation {
            success: true,
            coupon: Some(coupon),
            ..
        } => Ok(coupon),
        CouponValidation { message, .. } => Err(CouponError::Rejected(
            message.unwrap_or_else(|| GENERIC_COUPON_REJECTION.to_string()),
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
