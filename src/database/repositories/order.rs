//! Order repository implementation
//!
//! Absent rows come back as `None`; only connectivity/constraint failures
//! surface as errors.

use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::order::{CreateOrderRequest, Order, OrderStatus, UpdateOrderDetails};
use crate::utils::errors::LeadflowError;

const ORDER_COLUMNS: &str = "id, user_id, name, contact_info, business_type, budget, task_description, service_context, items, admin_comment, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new order with default status `new`
    pub async fn create(&self, request: CreateOrderRequest) -> Result<Order, LeadflowError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (user_id, name, contact_info, business_type, budget, task_description, service_context, items, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'new', $9, $9)
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(request.user_id)
        .bind(request.name)
        .bind(request.contact_info)
        .bind(request.business_type)
        .bind(request.budget)
        .bind(request.task_description)
        .bind(request.service_context)
        .bind(Json(request.items.unwrap_or_default()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find order by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>, LeadflowError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// List recent orders, newest first, optionally filtered by a
    /// case-insensitive match on name or contact info
    pub async fn list_recent(
        &self,
        limit: i64,
        search: Option<&str>,
    ) -> Result<Vec<Order>, LeadflowError> {
        let orders = match search {
            Some(term) => {
                sqlx::query_as::<_, Order>(&format!(
                    r#"
                    SELECT {ORDER_COLUMNS} FROM orders
                    WHERE name ILIKE $1 OR contact_info ILIKE $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#,
                ))
                .bind(format!("%{}%", term))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// Set the order status. Any closed-set value is accepted idempotently.
    pub async fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, LeadflowError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Patch the whitelisted editable fields
    pub async fn update_details(
        &self,
        id: i64,
        details: UpdateOrderDetails,
    ) -> Result<Option<Order>, LeadflowError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET budget = COALESCE($2, budget),
                contact_info = COALESCE($3, contact_info),
                task_description = COALESCE($4, task_description),
                admin_comment = COALESCE($5, admin_comment),
                items = COALESCE($6, items),
                updated_at = $7
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(details.budget)
        .bind(details.contact_info)
        .bind(details.task_description)
        .bind(details.admin_comment)
        .bind(details.items.map(Json))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Count total orders
    pub async fn count(&self) -> Result<i64, LeadflowError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Calendar-day order counts within the window. Days with zero orders
    /// are absent from the result.
    pub async fn daily_counts(
        &self,
        window_days: i64,
    ) -> Result<Vec<(NaiveDate, i64)>, LeadflowError> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT created_at::date AS day, COUNT(*) AS total
            FROM orders
            WHERE created_at >= now() - make_interval(days => $1::int)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(window_days)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Distinct order owners, used as the broadcast recipient list
    pub async fn distinct_user_ids(&self) -> Result<Vec<i64>, LeadflowError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT DISTINCT user_id FROM orders")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
