// src/services/visit_service.rs

use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, StoreRepository, UserRepository, VisitRepository},
    models::visit::{OrderRequest, Visit, VisitDetail},
    services::{
        evidence::EvidenceStorage,
        order_lines::{build_order_lines, decode_orders_payload, OrderLineError, OrderPayloadError},
        route_auth::user_has_store_in_route,
    },
};

/// Um pedido de registro de visita, já extraído do transporte.
#[derive(Debug, Clone)]
pub struct RegisterVisit {
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub validation: bool,
    pub orders_payload: String,
    pub photo: Vec<u8>,
    pub photo_name: String,
}

/// Estados terminais de falha do registro de visita.
#[derive(Debug, Error)]
pub enum VisitRegistrationError {
    #[error("usuário não encontrado")]
    UserNotFound,

    #[error("loja não encontrada")]
    StoreNotFound,

    #[error("loja fora da rota do usuário")]
    Forbidden,

    #[error("falha ao gravar a evidência: {0}")]
    Evidence(#[source] std::io::Error),

    #[error("pedidos em formato inválido: {0}")]
    Decode(#[from] OrderPayloadError),

    #[error("falha ao persistir a visita: {0}")]
    Persist(#[source] AppError),
}

impl From<VisitRegistrationError> for AppError {
    fn from(e: VisitRegistrationError) -> Self {
        match e {
            VisitRegistrationError::UserNotFound => AppError::UserNotFound,
            VisitRegistrationError::StoreNotFound => AppError::StoreNotFound,
            VisitRegistrationError::Forbidden => AppError::StoreNotInRoute,
            VisitRegistrationError::Evidence(io) => AppError::IoError(io),
            VisitRegistrationError::Decode(reason) => AppError::MalformedOrders(reason.to_string()),
            VisitRegistrationError::Persist(inner) => inner,
        }
    }
}

impl From<OrderLineError> for VisitRegistrationError {
    fn from(e: OrderLineError) -> Self {
        match e {
            OrderLineError::Payload(reason) => VisitRegistrationError::Decode(reason),
            OrderLineError::Repository(inner) => VisitRegistrationError::Persist(inner),
        }
    }
}

#[derive(Clone)]
pub struct VisitService {
    users: Arc<dyn UserRepository>,
    stores: Arc<dyn StoreRepository>,
    products: Arc<dyn ProductRepository>,
    visits: Arc<dyn VisitRepository>,
    evidence: EvidenceStorage,
}

impl VisitService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        stores: Arc<dyn StoreRepository>,
        products: Arc<dyn ProductRepository>,
        visits: Arc<dyn VisitRepository>,
        evidence: EvidenceStorage,
    ) -> Self {
        Self { users, stores, products, visits, evidence }
    }

    /// Registra uma visita com seus pedidos. Devolve o id da visita criada.
    pub async fn register_visit(&self, cmd: RegisterVisit) -> Result<Uuid, VisitRegistrationError> {
        let span = tracing::info_span!(
            "register_visit",
            user_id = %cmd.user_id,
            store_id = %cmd.store_id
        );
        self.register(cmd).instrument(span).await
    }

    async fn register(&self, cmd: RegisterVisit) -> Result<Uuid, VisitRegistrationError> {
        // 1. Usuário
        let user = self
            .users
            .find_by_id(cmd.user_id)
            .await
            .map_err(VisitRegistrationError::Persist)?
            .ok_or(VisitRegistrationError::UserNotFound)?;

        // 2. Loja
        let store = self
            .stores
            .find_by_id(cmd.store_id)
            .await
            .map_err(VisitRegistrationError::Persist)?
            .ok_or(VisitRegistrationError::StoreNotFound)?;

        // 3. Autorização pela rota, antes de qualquer efeito colateral
        if !user_has_store_in_route(&user, store.id) {
            tracing::warn!("Visita recusada: loja fora da rota");
            return Err(VisitRegistrationError::Forbidden);
        }

        // 4. Pedidos decodificados antes de tocar o disco
        let requests = decode_orders_payload(&cmd.orders_payload)?;

        // 5. Evidência
        let photo = self
            .evidence
            .store(&user.name, &store.name, &cmd.photo_name, &cmd.photo)
            .await
            .map_err(VisitRegistrationError::Evidence)?;

        // 6-8. Linhas de pedido + visita numa única gravação
        let mut visit = Visit::new(user.id, store.id, photo, cmd.validation);
        if let Err(e) = self.assemble_and_save(&mut visit, &requests).await {
            tracing::error!("Visita descartada: {}", e);
            self.evidence.remove(&visit.photo).await;
            return Err(e);
        }

        tracing::info!(
            visit_id = %visit.id,
            orders = visit.orders.len(),
            "✅ Visita registrada"
        );
        Ok(visit.id)
    }

    async fn assemble_and_save(
        &self,
        visit: &mut Visit,
        requests: &[OrderRequest],
    ) -> Result<(), VisitRegistrationError> {
        let lines = build_order_lines(self.products.as_ref(), visit.id, requests).await?;
        visit.replace_orders(lines);
        self.visits
            .save(visit)
            .await
            .map_err(VisitRegistrationError::Persist)
    }

    pub async fn get_visit(&self, id: Uuid) -> Result<VisitDetail, AppError> {
        self.visits
            .find_detail(id)
            .await?
            .ok_or(AppError::VisitNotFound)
    }

    pub async fn list_visits(&self) -> Result<Vec<VisitDetail>, AppError> {
        self.visits.list_details().await
    }

    /// Remove a visita e os seus pedidos. A foto permanece no disco.
    pub async fn delete_visit(&self, id: Uuid) -> Result<(), AppError> {
        if !self.visits.delete(id).await? {
            return Err(AppError::VisitNotFound);
        }
        tracing::info!(visit_id = %id, "Visita removida");
        Ok(())
    }
}
