//! HTTP surface: catalog reads, per-session carts and checkout.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::{http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::cart_store::CartStore;
use crate::checkout::CheckoutServices;
use crate::infrastructure::NatsEventPublisher;
use crate::ports::CatalogStore;

mod cart;
mod catalog;
mod checkout;

pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Process-local carts keyed by session id.
///
/// Only writes create an entry. A cart emptied by checkout is evicted.
#[derive(Clone, Debug, Default)]
pub struct SessionCarts {
    carts: Arc<RwLock<HashMap<String, CartStore>>>,
}

impl SessionCarts {
    pub async fn get(&self, session: &str) -> Option<CartStore> {
        self.carts.read().await.get(session).cloned()
    }

    /// Runs `f` against the session's cart, creating it if needed. The map
    /// stays read-locked until `f` finishes, so eviction cannot detach the
    /// cart from the session in between.
    pub async fn with_cart<F, Fut, T>(&self, session: &str, f: F) -> T
    where
        F: FnOnce(CartStore) -> Fut,
        Fut: Future<Output = T>,
    {
        let carts = self.carts.read().await;
        if let Some(cart) = carts.get(session) {
            return f(cart.clone()).await;
        }
        drop(carts);

        let mut carts = self.carts.write().await;
        let cart = carts.entry(session.to_string()).or_default().clone();
        let _carts = carts.downgrade();
        f(cart).await
    }

    /// Drops the session's entry if its cart holds no lines.
    pub async fn evict_if_empty(&self, session: &str) -> bool {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.get(session) else { return false };
        if !cart.is_empty().await { return false; }
        carts.remove(session);
        debug!(session, "evicted empty cart");
        true
    }

    pub async fn len(&self) -> usize { self.carts.read().await.len() }
    pub async fn is_empty(&self) -> bool { self.carts.read().await.is_empty() }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub carts: SessionCarts,
    pub checkout: CheckoutServices,
    pub events: Option<NatsEventPublisher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "storefront"})) }))
        .route("/api/v1/products/:id", get(catalog::get_product))
        .route("/api/v1/categories/:tag/products", get(catalog::list_by_category))
        .route("/api/v1/cart/:session", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/v1/cart/:session/items", post(cart::add_item).put(cart::update_quantity).delete(cart::remove_item))
        .route("/api/v1/checkout/:session", post(checkout::checkout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::domain::aggregates::product::tests::jacket;
    use crate::infrastructure::InMemoryCatalog;
    use crate::ports::{MockOrderStore, MockProfileStore, OrderStore, ProfileStore};

    pub(crate) fn state(orders: MockOrderStore, profiles: MockProfileStore) -> AppState {
        state_with(Arc::new(orders), Arc::new(profiles))
    }

    pub(crate) fn state_with(orders: Arc<dyn OrderStore>, profiles: Arc<dyn ProfileStore>) -> AppState {
        AppState {
            catalog: Arc::new(InMemoryCatalog::new(vec![jacket()]).unwrap()),
            carts: SessionCarts::default(),
            checkout: CheckoutServices::new(orders, profiles),
            events: None,
        }
    }

    pub(crate) async fn send(state: &AppState, method: &str, uri: &str, headers: &[(&str, &str)], body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        for (k, v) in headers { req = req.header(*k, *v); }
        let req = match body {
            Some(body) => req.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = router(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::tests::line;
    use crate::ports::{MockOrderStore, MockProfileStore};

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let carts = SessionCarts::default();
        carts.with_cart("a", |cart| async move { cart.open_cart().await }).await;
        assert!(carts.get("a").await.unwrap().is_open().await);
        assert!(carts.get("b").await.is_none());
        assert_eq!(carts.len().await, 1);
    }

    #[tokio::test]
    async fn test_reads_do_not_create_sessions() {
        let state = test_support::state(MockOrderStore::new(), MockProfileStore::new());
        let (status, body) = test_support::send(&state, "GET", "/api/v1/cart/ghost", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_items"], 0);
        assert_eq!(body["open"], false);

        let key = Some(json!({"product_id": "1", "size": "M", "color": "Black", "quantity": 2}));
        test_support::send(&state, "PUT", "/api/v1/cart/ghost/items", &[], key.clone()).await;
        test_support::send(&state, "DELETE", "/api/v1/cart/ghost/items", &[], key).await;
        let (status, _) = test_support::send(&state, "DELETE", "/api/v1/cart/ghost", &[], None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.carts.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_only_empty_carts() {
        let carts = SessionCarts::default();
        carts.with_cart("a", |cart| async move { cart.add_item(line("1", "M", "Black", 1, 100)).await }).await;
        assert!(!carts.evict_if_empty("a").await);
        carts.get("a").await.unwrap().clear_cart().await;
        assert!(carts.evict_if_empty("a").await);
        assert!(carts.is_empty().await);
        assert!(!carts.evict_if_empty("missing").await);
    }
}
