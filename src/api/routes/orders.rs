//! Order management endpoints
//!
//! Booking list with search, detail view, the whitelisted detail patch,
//! status changes with client notification, and the negotiation flow.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{authorize_admin, ApiError, ApiResult, ApiState};
use crate::models::{Order, OrderStatus, UpdateOrderDetails};

const BROWSE_LIMIT: i64 = 20;
const SEARCH_LIMIT: i64 = 50;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", post(set_status))
        .route("/orders/{id}/update", post(update_order))
        .route("/orders/{id}/offer", post(send_offer))
        .route("/orders/{id}/negotiate", post(negotiate))
}

#[derive(Debug, Deserialize)]
struct BookingsQuery {
    q: Option<String>,
}

/// Compact row for the dashboard list view
#[derive(Debug, Serialize)]
struct BookingSummary {
    id: i64,
    client: String,
    service: String,
    time: DateTime<Utc>,
    status: OrderStatus,
}

impl From<Order> for BookingSummary {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            client: order.name.unwrap_or_else(|| "Unknown".to_string()),
            service: order
                .service_context
                .unwrap_or_else(|| "Service".to_string()),
            time: order.created_at,
            status: order.status,
        }
    }
}

async fn list_bookings(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> ApiResult<Json<Vec<BookingSummary>>> {
    authorize_admin(&headers, &state.settings)?;

    let search = query.q.as_deref().filter(|s| !s.trim().is_empty());
    // Show more rows when the admin is actively searching
    let limit = if search.is_some() {
        SEARCH_LIMIT
    } else {
        BROWSE_LIMIT
    };

    let orders = state.db.orders.list_recent(limit, search).await?;
    Ok(Json(orders.into_iter().map(BookingSummary::from).collect()))
}

async fn get_order(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    authorize_admin(&headers, &state.settings)?;

    let order = state
        .db
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {}", id)))?;

    Ok(Json(order))
}

async fn update_order(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(details): Json<UpdateOrderDetails>,
) -> ApiResult<Json<Order>> {
    authorize_admin(&headers, &state.settings)?;

    if details.is_empty() {
        return Err(ApiError::BadRequest(
            "no editable fields in patch".to_string(),
        ));
    }

    let order = state
        .db
        .orders
        .update_details(id, details)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {}", id)))?;

    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

async fn set_status(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Order>> {
    authorize_admin(&headers, &state.settings)?;

    let status = OrderStatus::from_str(&body.status)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let order = state
        .services
        .order_service
        .set_status(id, status, true)
        .await?;

    Ok(Json(order))
}

/// Deliver the current offer (items + comment) to the client with
/// accept/reject buttons.
async fn send_offer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    authorize_admin(&headers, &state.settings)?;

    let order = state.services.order_service.send_offer(id).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
struct NegotiateBody {
    accepted: bool,
}

/// Client's answer to an offer. Invoked from the WebApp, so this route is
/// not admin-gated.
async fn negotiate(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<NegotiateBody>,
) -> ApiResult<Json<Order>> {
    let order = state
        .services
        .order_service
        .respond_to_offer(id, body.accepted)
        .await?;

    Ok(Json(order))
}
