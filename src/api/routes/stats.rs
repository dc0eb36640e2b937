//! Dashboard statistics endpoint

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{authorize_admin, ApiResult, ApiState};

// The dashboard chart shows the trailing week unless asked for more
const DEFAULT_WINDOW_DAYS: i64 = 7;
const MAX_WINDOW_DAYS: i64 = 365;

pub fn router() -> Router<ApiState> {
    Router::new().route("/stats", get(stats))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct DailyCount {
    date: NaiveDate,
    count: i64,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    total_users: i64,
    total_orders: i64,
    daily: Vec<DailyCount>,
}

async fn stats(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<StatsResponse>> {
    authorize_admin(&headers, &state.settings)?;

    let window_days = effective_window(query.days);
    let stats = state.db.dashboard_stats(window_days).await?;

    Ok(Json(StatsResponse {
        total_users: stats.total_users,
        total_orders: stats.total_orders,
        daily: stats
            .daily
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
    }))
}

fn effective_window(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_defaults_to_seven_days() {
        assert_eq!(effective_window(None), 7);
    }

    #[test]
    fn test_window_override_is_clamped() {
        assert_eq!(effective_window(Some(30)), 30);
        assert_eq!(effective_window(Some(0)), 1);
        assert_eq!(effective_window(Some(10_000)), MAX_WINDOW_DAYS);
    }
}
