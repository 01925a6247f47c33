//! # Checkout Session
//!
//! Delivery choice and applied coupon for the order being built.
//! Locked after the cart session, never before it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use jewelbox_core::{AppliedCoupon, DeliveryArea, DeliveryMethod, DeliverySelection, PricingContext};

#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    delivery: Option<DeliverySelection>,
    pub coupon: AppliedCoupon,
}

impl CheckoutSession {
    /// `None` until the customer picks pickup or delivery.
    pub fn delivery(&self) -> Option<&DeliverySelection> {
        self.delivery.as_ref()
    }

    pub fn select_method(&mut self, method: DeliveryMethod) {
        match &mut self.delivery {
            Some(selection) => selection.select_method(method),
            None => self.delivery = Some(DeliverySelection::new(method)),
        }
    }

    /// Returns false when no delivery method is chosen or it is pickup.
    pub fn select_area(&mut self, area: DeliveryArea) -> bool {
        self.delivery
            .as_mut()
            .map_or(false, |selection| selection.select_area(area))
    }

    /// Checkout pricing once a method is chosen, cart preview before that.
    pub fn pricing_context(&self) -> PricingContext {
        match self.delivery {
            Some(selection) => PricingContext::Checkout(selection),
            None => PricingContext::CartPreview,
        }
    }

    pub fn reset(&mut self) {
        self.delivery = None;
        self.coupon.remove();
    }
}

/// Shared handle to the checkout session.
#[derive(Debug, Clone, Default)]
pub struct CheckoutState {
    inner: Arc<Mutex<CheckoutSession>>,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, CheckoutSession> {
        self.inner.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_needs_delivery() {
        let mut session = CheckoutSession::default();
        assert!(!session.select_area(DeliveryArea::Local));
        assert!(session.delivery().is_none());

        session.select_method(DeliveryMethod::Pickup);
        assert!(!session.select_area(DeliveryArea::Local));
        assert_eq!(session.delivery().and_then(|d| d.area()), None);

        session.select_method(DeliveryMethod::Delivery);
        assert!(session.select_area(DeliveryArea::Other));
        assert_eq!(session.delivery().and_then(|d| d.area()), Some(DeliveryArea::Other));
    }

    #[test]
    fn test_pricing_context() {
        let mut session = CheckoutSession::default();
        assert_eq!(session.pricing_context(), PricingContext::CartPreview);

        session.select_method(DeliveryMethod::Pickup);
        assert_eq!(
            session.pricing_context(),
            PricingContext::Checkout(DeliverySelection::pickup())
        );

        session.reset();
        assert!(session.delivery().is_none());
        assert!(!session.coupon.is_applied());
    }
}
