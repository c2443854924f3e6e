use axum::{extract::{Path, State}, http::StatusCode, Json};

use crate::domain::aggregates::Product;
use super::{api_error, ApiError, AppState};

pub(super) async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    s.catalog.get_by_id(&id).await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Not found"))
}

pub(super) async fn list_by_category(State(s): State<AppState>, Path(tag): Path<String>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = s.catalog.list_by_category(&tag).await.map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use crate::http::test_support::{send, state};
    use crate::ports::{MockOrderStore, MockProfileStore};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_product_routes() {
        let state = state(MockOrderStore::new(), MockProfileStore::new());
        let (status, body) = send(&state, "GET", "/api/v1/products/1", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "The ReWool Oversized Shirt Jacket");

        let (status, _) = send(&state, "GET", "/api/v1/products/99", &[], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&state, "GET", "/api/v1/categories/outerwear/products", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }
}
