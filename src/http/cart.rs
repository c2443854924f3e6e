use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Cart, CartView};
use crate::domain::value_objects::{LineKey, Money, Quantity};
use super::{api_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CartResponse {
    #[serde(flatten)]
    cart: CartView,
    /// Present while shipping is still charged.
    free_shipping_gap: Option<Money>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemRequest { product_id: String, size: String, color: String, #[serde(default = "one")] quantity: u32 }

#[derive(Debug, Deserialize)]
pub(super) struct UpdateQuantityRequest { product_id: String, size: String, color: String, quantity: i64 }

#[derive(Debug, Deserialize)]
pub(super) struct LineKeyRequest { product_id: String, size: String, color: String }

fn one() -> u32 { 1 }

fn respond(s: &AppState, view: CartView) -> Json<CartResponse> {
    let free_shipping_gap = s.checkout.pricing.free_shipping_gap(view.total_price);
    Json(CartResponse { cart: view, free_shipping_gap })
}

/// Unknown sessions read as an empty cart and are not registered.
pub(super) async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Json<CartResponse> {
    let view = match s.carts.get(&session).await {
        Some(cart) => cart.view().await,
        None => Cart::new().view(),
    };
    respond(&s, view)
}

pub(super) async fn add_item(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddItemRequest>) -> Result<Json<CartResponse>, ApiError> {
    let quantity = Quantity::new(r.quantity).ok_or_else(|| api_error(StatusCode::UNPROCESSABLE_ENTITY, "quantity must be positive"))?;
    let product = s.catalog.get_by_id(&r.product_id).await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Not found"))?;
    let line = product.line_for(&r.size, &r.color, quantity).map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let view = s.carts.with_cart(&session, |cart| async move {
        cart.add_item(line).await;
        cart.view().await
    }).await;
    Ok(respond(&s, view))
}

pub(super) async fn update_quantity(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<UpdateQuantityRequest>) -> Json<CartResponse> {
    let view = match s.carts.get(&session).await {
        Some(cart) => {
            cart.update_quantity(&LineKey::new(r.product_id, r.size, r.color), r.quantity).await;
            cart.view().await
        }
        None => Cart::new().view(),
    };
    respond(&s, view)
}

pub(super) async fn remove_item(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<LineKeyRequest>) -> Json<CartResponse> {
    let view = match s.carts.get(&session).await {
        Some(cart) => {
            cart.remove_item(&LineKey::new(r.product_id, r.size, r.color)).await;
            cart.view().await
        }
        None => Cart::new().view(),
    };
    respond(&s, view)
}

pub(super) async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> StatusCode {
    if let Some(cart) = s.carts.get(&session).await {
        cart.clear_cart().await;
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use axum::http::StatusCode;

    use crate::http::test_support::{send, state};
    use crate::ports::{MockOrderStore, MockProfileStore};

    #[tokio::test]
    async fn test_add_merge_update_remove() {
        let state = state(MockOrderStore::new(), MockProfileStore::new());
        let item = json!({"product_id": "1", "size": "M", "color": "Black"});

        let (status, body) = send(&state, "POST", "/api/v1/cart/s1/items", &[], Some(item.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["open"], true);
        assert_eq!(body["total_items"], 1);
        assert_eq!(body["total_price"], "107");
        assert_eq!(body["free_shipping_gap"], serde_json::Value::Null);

        let (_, body) = send(&state, "POST", "/api/v1/cart/s1/items", &[], Some(json!({"product_id": "1", "size": "M", "color": "Black", "quantity": 2}))).await;
        assert_eq!(body["lines"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["total_items"], 3);
        assert_eq!(body["total_price"], "321");

        let (_, body) = send(&state, "PUT", "/api/v1/cart/s1/items", &[], Some(json!({"product_id": "1", "size": "M", "color": "Black", "quantity": 0}))).await;
        assert_eq!(body["total_items"], 0);

        send(&state, "POST", "/api/v1/cart/s1/items", &[], Some(item.clone())).await;
        let (_, body) = send(&state, "DELETE", "/api/v1/cart/s1/items", &[], Some(item)).await;
        assert_eq!(body["lines"], json!([]));
        assert_eq!(body["open"], true);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let state = state(MockOrderStore::new(), MockProfileStore::new());
        let (status, _) = send(&state, "POST", "/api/v1/cart/s1/items", &[], Some(json!({"product_id": "404", "size": "M", "color": "Black"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&state, "POST", "/api/v1/cart/s1/items", &[], Some(json!({"product_id": "1", "size": "XXXL", "color": "Black"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = send(&state, "POST", "/api/v1/cart/s1/items", &[], Some(json!({"product_id": "1", "size": "M", "color": "Black", "quantity": 0}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(&state, "GET", "/api/v1/cart/s1", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_items"], 0);
        assert_eq!(body["open"], false);
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let state = state(MockOrderStore::new(), MockProfileStore::new());
        send(&state, "POST", "/api/v1/cart/s2/items", &[], Some(json!({"product_id": "1", "size": "S", "color": "Olive Plaid"}))).await;
        let (status, _) = send(&state, "DELETE", "/api/v1/cart/s2", &[], None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&state, "GET", "/api/v1/cart/s2", &[], None).await;
        assert_eq!(body["total_items"], 0);
    }
}
