use std::sync::Arc;

use axum::{extract::{Path, State}, http::{HeaderMap, StatusCode}, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::checkout::{CheckoutError, CheckoutOrchestrator, CheckoutOutcome};
use crate::domain::shipping::{CardDetails, ShippingProfile};
use crate::domain::value_objects::PaymentMethod;
use crate::infrastructure::SessionIdentity;
use super::{api_error, ApiError, AppState};

/// Set by the identity gateway in front of this service.
pub(super) const USER_ID_HEADER: &str = "x-user-id";
pub(super) const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutRequest {
    /// The form as submitted; omitted means "use my saved details".
    #[serde(default)]
    shipping: Option<ShippingProfile>,
    #[serde(default)]
    payment_method: PaymentMethod,
    #[serde(default)]
    card: Option<CardDetails>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn into_api_error(error: CheckoutError) -> ApiError {
    match error {
        CheckoutError::Unauthenticated => api_error(StatusCode::UNAUTHORIZED, "Please sign in to place an order"),
        CheckoutError::EmptyCart => api_error(StatusCode::CONFLICT, "Your cart is empty"),
        CheckoutError::Validation(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Please complete the highlighted fields", "fields": fields })),
        ),
        CheckoutError::Persistence(_) => api_error(StatusCode::BAD_GATEWAY, "Failed to place order. Please try again."),
        e @ (CheckoutError::AlreadySubmitted | CheckoutError::InvalidState { .. }) => api_error(StatusCode::CONFLICT, e.to_string()),
    }
}

pub(super) async fn checkout(
    State(s): State<AppState>,
    Path(session): Path<String>,
    headers: HeaderMap,
    Json(r): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutOutcome>), ApiError> {
    let identity = SessionIdentity::from_parts(header(&headers, USER_ID_HEADER), header(&headers, USER_EMAIL_HEADER));
    // Unknown sessions get a detached empty cart and fail as EmptyCart.
    let cart = s.carts.get(&session).await.unwrap_or_default();
    let mut checkout = CheckoutOrchestrator::new(cart, Arc::new(identity), s.checkout.clone());

    checkout.begin().await.map_err(into_api_error)?;
    checkout.hydrate().await.map_err(into_api_error)?;

    let form = checkout.form_mut();
    if let Some(shipping) = r.shipping { form.shipping = shipping; }
    form.payment_method = r.payment_method;
    form.card = r.card;

    // Once submitted, the order runs to completion on its own task; a client
    // disconnect drops only the wait below.
    let (carts, events, key) = (s.carts.clone(), s.events.clone(), session.clone());
    let submission = tokio::spawn(async move {
        let result = checkout.submit().await;
        if let Some(events) = &events {
            events.publish(&checkout.take_events()).await;
        }
        if result.is_ok() {
            carts.evict_if_empty(&key).await;
        }
        result
    });

    let outcome = submission
        .await
        .map_err(|e| {
            error!(session = %session, error = %e, "checkout task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Checkout was interrupted")
        })?
        .map_err(into_api_error)?;
    info!(session = %session, order_number = %outcome.order_number, "checkout completed");
    Ok((StatusCode::CREATED, Json(outcome)))
}
