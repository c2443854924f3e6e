//! Checkout orchestration.
//!
//! One `CheckoutOrchestrator` drives one checkout attempt through
//!
//! ```text
//! Idle -> Hydrating -> ReadyToSubmit -> Submitting -> Succeeded
//!                            ^              |
//!                            |              v
//!                            +------ Failed(Retryable)
//! ```
//!
//! Steps run strictly in sequence: hydrate the form, validate it, insert the
//! order, then upsert the profile. A failed order insert never reaches the
//! profile store and leaves the cart untouched. A failed profile upsert is
//! logged and reported on the outcome but does not fail the checkout. An
//! inserted order is never rolled back.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart_store::CartStore;
use crate::domain::aggregates::{CartLine, Order, OrderError};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::pricing::{PricingBreakdown, PricingEngine};
use crate::domain::shipping::{validate_checkout_form, CardDetails, FieldErrors, ShippingProfile};
use crate::domain::value_objects::{Money, PaymentMethod};
use crate::ports::{AuthUser, IdentityProvider, OrderStore, PersistenceError, ProfileStore};

pub const DEFAULT_HYDRATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Collaborators shared by every checkout attempt.
#[derive(Clone)]
pub struct CheckoutServices {
    pub orders: Arc<dyn OrderStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub pricing: PricingEngine,
    pub hydration_timeout: Duration,
}

impl CheckoutServices {
    pub fn new(orders: Arc<dyn OrderStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { orders, profiles, pricing: PricingEngine::default(), hydration_timeout: DEFAULT_HYDRATION_TIMEOUT }
    }

    pub fn with_pricing(mut self, pricing: PricingEngine) -> Self { self.pricing = pricing; self }
    pub fn with_hydration_timeout(mut self, timeout: Duration) -> Self { self.hydration_timeout = timeout; self }
}

impl fmt::Debug for CheckoutServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutServices").field("pricing", &self.pricing).field("hydration_timeout", &self.hydration_timeout).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Retryable {
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Hydrating,
    ReadyToSubmit,
    Submitting,
    Succeeded,
    Failed(Retryable),
}

/// What the shopper has entered so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub shipping: ShippingProfile,
    pub payment_method: PaymentMethod,
    pub card: Option<CardDetails>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutOutcome {
    pub order_id: Uuid,
    pub order_number: String,
    pub pricing: PricingBreakdown,
    pub payment_method: PaymentMethod,
    /// False when the order went through but the profile could not be saved.
    pub profile_synced: bool,
}

impl CheckoutOutcome {
    pub fn pay_on_delivery(&self) -> bool { self.payment_method == PaymentMethod::CashOnDelivery }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to place an order")]
    Unauthenticated,

    #[error("cart is empty")]
    EmptyCart,

    #[error("{0}")]
    Validation(FieldErrors),

    #[error("failed to place order")]
    Persistence(#[source] PersistenceError),

    #[error("checkout already completed")]
    AlreadySubmitted,

    #[error("cannot {action} while checkout is {state:?}")]
    InvalidState { action: &'static str, state: CheckoutState },
}

impl From<OrderError> for CheckoutError {
    fn from(error: OrderError) -> Self {
        match error { OrderError::NoItems => Self::EmptyCart }
    }
}

pub struct CheckoutOrchestrator {
    cart: CartStore,
    identity: Arc<dyn IdentityProvider>,
    services: CheckoutServices,
    state: CheckoutState,
    user: Option<AuthUser>,
    form: CheckoutForm,
    events: Vec<DomainEvent>,
}

impl fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutOrchestrator").field("state", &self.state).field("user", &self.user).field("form", &self.form).finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    pub fn new(cart: CartStore, identity: Arc<dyn IdentityProvider>, services: CheckoutServices) -> Self {
        Self { cart, identity, services, state: CheckoutState::Idle, user: None, form: CheckoutForm::default(), events: vec![] }
    }

    pub fn state(&self) -> &CheckoutState { &self.state }
    pub fn form(&self) -> &CheckoutForm { &self.form }
    pub fn form_mut(&mut self) -> &mut CheckoutForm { &mut self.form }
    pub fn is_submitting(&self) -> bool { self.state == CheckoutState::Submitting }

    /// Live pricing for the current cart and the selected payment method.
    pub async fn pricing(&self) -> PricingBreakdown {
        self.services.pricing.quote(self.cart.total_price().await, self.form.payment_method)
    }

    pub async fn free_shipping_gap(&self) -> Option<Money> {
        self.services.pricing.free_shipping_gap(self.cart.total_price().await)
    }

    /// Enters checkout. Requires a signed-in user and a non-empty cart; no
    /// external store is contacted before both hold.
    pub async fn begin(&mut self) -> Result<(), CheckoutError> {
        self.require(&[CheckoutState::Idle], "begin checkout")?;
        let user = self.identity.current_user().ok_or(CheckoutError::Unauthenticated)?;
        if self.cart.is_empty().await {
            return Err(CheckoutError::EmptyCart);
        }
        self.form.shipping = ShippingProfile::blank(user.email.as_deref());
        self.user = Some(user);
        self.transition(CheckoutState::Hydrating);
        Ok(())
    }

    /// Pre-fills the form from the stored profile.
    ///
    /// A missing profile, a store failure or a timeout all leave the blank
    /// defaults in place. The form is only written after the lookup resolves,
    /// so dropping this future part-way leaves the defaults as well.
    pub async fn hydrate(&mut self) -> Result<(), CheckoutError> {
        self.require(&[CheckoutState::Hydrating], "hydrate")?;
        let Some(user) = self.user.clone() else { return Err(CheckoutError::Unauthenticated) };

        let lookup = self.services.profiles.get_profile(&user.id);
        match tokio::time::timeout(self.services.hydration_timeout, lookup).await {
            Ok(Ok(Some(profile))) => {
                debug!(user_id = %user.id, "hydrated shipping form from stored profile");
                self.form.shipping = profile.with_fallback_email(user.email.as_deref());
            }
            Ok(Ok(None)) => debug!(user_id = %user.id, "no stored profile"),
            Ok(Err(e)) => warn!(user_id = %user.id, error = %e, "profile lookup failed, using blank form"),
            Err(_) => warn!(user_id = %user.id, timeout = ?self.services.hydration_timeout, "profile lookup timed out, using blank form"),
        }
        self.transition(CheckoutState::ReadyToSubmit);
        Ok(())
    }

    /// Moves on without a stored profile, e.g. after an abandoned hydration.
    pub fn skip_hydration(&mut self) -> Result<(), CheckoutError> {
        self.require(&[CheckoutState::Hydrating], "skip hydration")?;
        self.transition(CheckoutState::ReadyToSubmit);
        Ok(())
    }

    /// Validates the form and places the order.
    ///
    /// Allowed from `ReadyToSubmit` and from `Failed`; each retry re-runs the
    /// whole validate and submit sequence.
    ///
    /// Once the order insert has started the future must be driven to
    /// completion. Dropping it after the insert leaves a stored order with an
    /// uncleared cart, so callers that can be cancelled should spawn it.
    ///
    /// On success the whole cart is cleared, including lines added after the
    /// order snapshot was taken.
    pub async fn submit(&mut self) -> Result<CheckoutOutcome, CheckoutError> {
        if self.state == CheckoutState::Succeeded {
            return Err(CheckoutError::AlreadySubmitted);
        }
        if !matches!(self.state, CheckoutState::ReadyToSubmit | CheckoutState::Failed(_)) {
            return Err(CheckoutError::InvalidState { action: "submit", state: self.state.clone() });
        }
        let user = self.identity.current_user().ok_or(CheckoutError::Unauthenticated)?;
        validate_checkout_form(&self.form.shipping, self.form.payment_method, self.form.card.as_ref())
            .map_err(CheckoutError::Validation)?;

        let lines = self.cart.lines().await;
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
        let pricing = self.services.pricing.quote(subtotal, self.form.payment_method);
        let order = Order::place(&user.id, &lines, pricing, self.form.payment_method, self.form.shipping.clone())?;

        self.transition(CheckoutState::Submitting);
        if let Err(e) = self.services.orders.insert_order(&order).await {
            warn!(order_id = %order.id(), user_id = %user.id, error = %e, "order insert failed");
            self.transition(CheckoutState::Failed(Retryable { reason: e.to_string() }));
            return Err(CheckoutError::Persistence(e));
        }
        info!(order_id = %order.id(), order_number = order.order_number(), total = %order.total(), "order placed");
        self.raise_event(CheckoutEvent::OrderPlaced {
            order_id: order.id(), order_number: order.order_number().to_string(), user_id: user.id.clone(), total: order.total(),
        });

        let profile_synced = match self.services.profiles.upsert_profile(&user.id, &self.form.shipping).await {
            Ok(()) => true,
            Err(e) => {
                warn!(order_id = %order.id(), user_id = %user.id, error = %e, "profile upsert failed after order insert");
                self.raise_event(CheckoutEvent::ProfileSyncFailed { order_id: order.id(), user_id: user.id.clone(), reason: e.to_string() });
                false
            }
        };

        self.cart.clear_cart().await;
        self.transition(CheckoutState::Succeeded);
        Ok(CheckoutOutcome {
            order_id: order.id(),
            order_number: order.order_number().to_string(),
            pricing,
            payment_method: order.payment_method(),
            profile_synced,
        })
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn require(&self, allowed: &[CheckoutState], action: &'static str) -> Result<(), CheckoutError> {
        if allowed.contains(&self.state) { return Ok(()); }
        if self.state == CheckoutState::Succeeded { return Err(CheckoutError::AlreadySubmitted); }
        Err(CheckoutError::InvalidState { action, state: self.state.clone() })
    }

    fn transition(&mut self, next: CheckoutState) {
        debug!(from = ?self.state, to = ?next, "checkout transition");
        self.state = next;
    }

    fn raise_event(&mut self, e: CheckoutEvent) { self.events.push(DomainEvent::Checkout(e)); }
}
