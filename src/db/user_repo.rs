// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{on_foreign_key_violation, on_unique_violation},
        error::AppError,
    },
    db::contracts::UserRepository,
    models::auth::{NewUser, Role, User, UserRow},
};

// A rota vem agregada na mesma leitura, então quem autoriza enxerga
// um retrato consistente do usuário.
const USER_WITH_ROUTE: &str = r#"
    SELECT
        u.id, u.name, u.email, u.password_hash, u.role, u.created_at, u.updated_at,
        COALESCE(
            array_agg(us.store_id) FILTER (WHERE us.store_id IS NOT NULL),
            '{}'
        ) AS route
    FROM users u
    LEFT JOIN user_stores us ON us.user_id = u.id
"#;

// O repositório de usuários: tabela 'users' e a rota em 'user_stores'
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_WITH_ROUTE} WHERE u.id = $1 GROUP BY u.id"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_WITH_ROUTE} WHERE u.email = $1 GROUP BY u.id"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_WITH_ROUTE} WHERE ($1::user_role IS NULL OR u.role = $1) GROUP BY u.id ORDER BY u.name ASC"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id, name, email, password_hash, role, created_at, updated_at,
                '{}'::uuid[] AS route
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, |_| AppError::EmailAlreadyExists))?;

        Ok(row.into())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<User>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(role)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_foreign_key_violation(e, AppError::UserHasDependents))?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO user_stores (user_id, store_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(store_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn unassign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_stores WHERE user_id = $1 AND store_id = $2")
            .bind(user_id)
            .bind(store_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
