//! Product repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::product::{CreateProductRequest, Product, UpdateProductRequest};
use crate::utils::errors::LeadflowError;

const PRODUCT_COLUMNS: &str =
    "id, title, price, icon, category, description, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new catalog item
    pub async fn create(&self, request: CreateProductRequest) -> Result<Product, LeadflowError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (title, price, icon, category, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(request.title)
        .bind(request.price)
        .bind(request.icon)
        .bind(request.category)
        .bind(request.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find product by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, LeadflowError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// List catalog items, optionally restricted to active ones
    pub async fn list(&self, active_only: bool) -> Result<Vec<Product>, LeadflowError> {
        let products = if active_only {
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = TRUE ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(products)
    }

    /// Patch product fields
    pub async fn update(
        &self,
        id: i64,
        request: UpdateProductRequest,
    ) -> Result<Option<Product>, LeadflowError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET title = COALESCE($2, title),
                price = COALESCE($3, price),
                icon = COALESCE($4, icon),
                category = COALESCE($5, category),
                description = COALESCE($6, description),
                is_active = COALESCE($7, is_active),
                updated_at = $8
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.price)
        .bind(request.icon)
        .bind(request.category)
        .bind(request.description)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Soft-delete a product by clearing its active flag
    pub async fn deactivate(&self, id: i64) -> Result<Option<Product>, LeadflowError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET is_active = FALSE, updated_at = $2
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}
