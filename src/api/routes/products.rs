//! Product catalog endpoints
//!
//! Listing is public (the storefront reads it); mutations are admin-only.
//! Delete is a soft deactivation.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::{authorize_admin, ApiError, ApiResult, ApiState};
use crate::models::{CreateProductRequest, Product, UpdateProductRequest};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(deactivate_product))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    include_inactive: bool,
}

async fn list_products(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products.list(!query.include_inactive).await?;
    Ok(Json(products))
}

async fn create_product(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<Json<Product>> {
    authorize_admin(&headers, &state.settings)?;

    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("product title is required".to_string()));
    }
    if request.price < 0.0 {
        return Err(ApiError::BadRequest("price must be non-negative".to_string()));
    }

    let product = state.db.products.create(request).await?;
    Ok(Json(product))
}

async fn update_product(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    authorize_admin(&headers, &state.settings)?;

    let product = state
        .db
        .products
        .update(id, request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {}", id)))?;

    Ok(Json(product))
}

async fn deactivate_product(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    authorize_admin(&headers, &state.settings)?;

    let product = state
        .db
        .products
        .deactivate(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {}", id)))?;

    Ok(Json(product))
}
