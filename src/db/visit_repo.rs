// src/db/visit_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::contracts::VisitRepository,
    models::visit::{OrderLine, OrderLineDetail, Visit, VisitDetail},
};

const VISIT_DETAIL: &str = r#"
    SELECT
        v.id, v.user_id, u.name AS user_name, v.store_id, s.name AS store_name,
        v.visit_date, v.validation, v.photo
    FROM visits v
    JOIN users u ON u.id = v.user_id
    JOIN stores s ON s.id = v.store_id
"#;

#[derive(Clone)]
pub struct PgVisitRepository {
    pool: PgPool,
}

impl PgVisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Preenche os pedidos (com nome do produto) de um lote de visitas
    async fn attach_orders(&self, visits: &mut [VisitDetail]) -> Result<(), AppError> {
        if visits.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = visits.iter().map(|v| v.id).collect();

        let lines = sqlx::query_as::<_, OrderLineDetail>(
            r#"
            SELECT
                o.id, o.visit_id, o.product_id, p.name AS product_name,
                o.quantity, o.unit_price, o.total
            FROM order_lines o
            JOIN products p ON p.id = o.product_id
            WHERE o.visit_id = ANY($1)
            ORDER BY p.name ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_visit: HashMap<Uuid, Vec<OrderLineDetail>> = HashMap::new();
        for line in lines {
            by_visit.entry(line.visit_id).or_default().push(line);
        }
        for visit in visits.iter_mut() {
            visit.orders = by_visit.remove(&visit.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn save(&self, visit: &Visit) -> Result<(), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        // Se qualquer passo falhar, o drop do `tx` faz rollback: nenhuma visita parcial.
        let mut tx = self.pool.begin().await?;

        // 1. Cabeçalho da visita (upsert: salvar de novo substitui os campos mutáveis)
        sqlx::query(
            r#"
            INSERT INTO visits (id, visit_date, photo, validation, user_id, store_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                photo = EXCLUDED.photo,
                validation = EXCLUDED.validation
            "#,
        )
        .bind(visit.id)
        .bind(visit.date)
        .bind(&visit.photo)
        .bind(visit.validation)
        .bind(visit.user_id)
        .bind(visit.store_id)
        .execute(&mut *tx)
        .await?;

        // 2. Substitui o conjunto inteiro de pedidos (órfãos somem aqui)
        sqlx::query("DELETE FROM order_lines WHERE visit_id = $1")
            .bind(visit.id)
            .execute(&mut *tx)
            .await?;

        // 3. Pedidos atuais
        for line in &visit.orders {
            sqlx::query(
                r#"
                INSERT INTO order_lines (id, visit_id, product_id, quantity, unit_price, total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(line.id)
            .bind(visit.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---
        Ok(())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<VisitDetail>, AppError> {
        let visit = sqlx::query_as::<_, VisitDetail>(&format!("{VISIT_DETAIL} WHERE v.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match visit {
            Some(visit) => {
                let mut visits = [visit];
                self.attach_orders(&mut visits).await?;
                let [visit] = visits;
                Ok(Some(visit))
            }
            None => Ok(None),
        }
    }

    async fn list_details(&self) -> Result<Vec<VisitDetail>, AppError> {
        let mut visits = sqlx::query_as::<_, VisitDetail>(&format!(
            "{VISIT_DETAIL} ORDER BY v.visit_date DESC, v.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_orders(&mut visits).await?;
        Ok(visits)
    }

    async fn orders_of(&self, visit_id: Uuid) -> Result<Vec<OrderLine>, AppError> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, visit_id, product_id, quantity, unit_price, total
            FROM order_lines
            WHERE visit_id = $1
            "#,
        )
        .bind(visit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // Pedidos primeiro, depois a visita (a FK também cascateia)
        sqlx::query("DELETE FROM order_lines WHERE visit_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
