// src/db/store_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{on_foreign_key_violation, on_unique_violation},
        error::AppError,
    },
    db::contracts::StoreRepository,
    models::store::{NewStore, Store, StoreChanges, StoreDependents},
};

#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn list(&self) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>("SELECT * FROM stores ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Store>, AppError> {
        let stores =
            sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = ANY($1) ORDER BY name ASC")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(stores)
    }

    async fn create(&self, store: NewStore) -> Result<Store, AppError> {
        let name = store.name.clone();
        sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (id, name, address, latitude, longitude, qr_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(store.id)
        .bind(&store.name)
        .bind(&store.address)
        .bind(store.latitude)
        .bind(store.longitude)
        .bind(&store.qr_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, |_| AppError::StoreNameAlreadyExists(name)))
    }

    async fn update(&self, id: Uuid, changes: StoreChanges) -> Result<Option<Store>, AppError> {
        let name = changes.name.clone().unwrap_or_default();
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                latitude = COALESCE($4, latitude),
                longitude = COALESCE($5, longitude),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.address)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, |_| AppError::StoreNameAlreadyExists(name)))
    }

    async fn dependents(&self, id: Uuid) -> Result<StoreDependents, AppError> {
        let dependents = sqlx::query_as::<_, StoreDependents>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM visits WHERE store_id = $1) AS visits,
                (SELECT COUNT(*) FROM store_products WHERE store_id = $1) AS products,
                (SELECT COUNT(*) FROM user_stores WHERE store_id = $1) AS users
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(dependents)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_foreign_key_violation(e, AppError::StoreHasDependents))?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_products(&self, store_id: Uuid, product_ids: &[Uuid]) -> Result<u64, AppError> {
        // Um único INSERT ... SELECT: ou entram todos os pares novos ou nenhum
        let result = sqlx::query(
            r#"
            INSERT INTO store_products (store_id, product_id)
            SELECT $1, p.id FROM products p WHERE p.id = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(store_id)
        .bind(product_ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unassign_product(&self, store_id: Uuid, product_id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM store_products WHERE store_id = $1 AND product_id = $2")
                .bind(store_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }
}
