//! Storefront (shop WebApp) endpoints
//!
//! The caller is identified by the `X-Telegram-User` header set by the
//! WebApp shell. These routes are open to any Telegram user, not just the
//! admin.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::api::{caller_id, ApiError, ApiResult, ApiState};
use crate::models::{CreateOrderRequest, Order, OrderItem, Product};

const STOREFRONT_CONTEXT: &str = "Заказ из магазина";

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/orders", post(place_order))
}

async fn list_products(State(state): State<ApiState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products.list(true).await?;
    Ok(Json(products))
}

#[derive(Debug, Deserialize)]
struct PlaceOrderBody {
    items: Vec<OrderItem>,
    contact_info: Option<String>,
}

async fn place_order(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<PlaceOrderBody>,
) -> ApiResult<Json<Order>> {
    let user_id = caller_id(&headers)?;

    if body.items.is_empty() {
        return Err(ApiError::BadRequest("order has no items".to_string()));
    }

    // WebApp users may have never talked to the bot directly
    state
        .db
        .initialize_user(user_id, None, None, None, None)
        .await?;

    let request = CreateOrderRequest {
        user_id,
        contact_info: body.contact_info,
        service_context: Some(STOREFRONT_CONTEXT.to_string()),
        items: Some(body.items),
        ..Default::default()
    };

    let order = state
        .services
        .order_service
        .submit_storefront_order(request)
        .await?;

    info!(order_id = order.id, user_id = user_id, "Storefront order placed");
    Ok(Json(order))
}
