// src/db/product_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{on_foreign_key_violation, on_unique_violation},
        error::AppError,
    },
    db::contracts::ProductRepository,
    models::product::{NewProduct, Product, ProductChanges},
};

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, AppError> {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE LOWER(name) = LOWER($1)")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.*
            FROM products p
            JOIN store_products sp ON sp.product_id = p.id
            WHERE sp.store_id = $1
            ORDER BY p.name ASC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let name = product.name.clone();
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, description, base_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, |_| AppError::ProductNameAlreadyExists(name)))
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let name = changes.name.clone().unwrap_or_default();
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                base_price = COALESCE($4, base_price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.base_price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, |_| AppError::ProductNameAlreadyExists(name)))
    }

    async fn count_orders(&self, id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines WHERE product_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        // O catálogo da loja não protege o produto; só os pedidos protegem.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store_products WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| on_foreign_key_violation(e, AppError::ProductHasOrders))?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
