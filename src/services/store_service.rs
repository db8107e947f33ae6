// src/services/store_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, StoreRepository, UserRepository},
    models::{
        auth::{Role, User},
        store::{CreateStorePayload, NewStore, Store, StoreChanges, StoreWithProducts, UpdateStorePayload},
    },
    services::qr::QrRenderer,
};

#[derive(Clone)]
pub struct StoreService {
    stores: Arc<dyn StoreRepository>,
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
    qr: QrRenderer,
    qr_content_base: String,
}

impl StoreService {
    pub fn new(
        stores: Arc<dyn StoreRepository>,
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        qr: QrRenderer,
        qr_content_base: String,
    ) -> Self {
        Self { stores, products, users, qr, qr_content_base }
    }

    async fn with_products(&self, store: Store) -> Result<StoreWithProducts, AppError> {
        let products = self.products.list_by_store(store.id).await?;
        Ok(StoreWithProducts { store, products })
    }

    async fn with_products_all(&self, stores: Vec<Store>) -> Result<Vec<StoreWithProducts>, AppError> {
        let mut result = Vec::with_capacity(stores.len());
        for store in stores {
            result.push(self.with_products(store).await?);
        }
        Ok(result)
    }

    pub async fn create_store(&self, payload: CreateStorePayload) -> Result<Store, AppError> {
        let name = payload.name.trim().to_string();

        // 1. Nome único (o índice do banco ainda cobre a corrida)
        if self.stores.find_by_name(&name).await?.is_some() {
            return Err(AppError::StoreNameAlreadyExists(name));
        }

        // 2. QR com o id da nova loja
        let id = Uuid::new_v4();
        let qr_path = self
            .qr
            .render_qr(&format!("{}{}", self.qr_content_base, id), &format!("store_{id}"))
            .await?;

        // 3. Grava; se falhar, o QR não fica órfão
        let created = self
            .stores
            .create(NewStore {
                id,
                name,
                address: payload.address.trim().to_string(),
                latitude: payload.latitude,
                longitude: payload.longitude,
                qr_code: Some(qr_path.clone()),
            })
            .await;

        match created {
            Ok(store) => {
                tracing::info!(store_id = %store.id, "Loja criada");
                Ok(store)
            }
            Err(e) => {
                self.qr.remove(&qr_path).await;
                Err(e)
            }
        }
    }

    pub async fn get_store(&self, id: Uuid) -> Result<StoreWithProducts, AppError> {
        let store = self
            .stores
            .find_by_id(id)
            .await?
            .ok_or(AppError::StoreNotFound)?;
        self.with_products(store).await
    }

    pub async fn list_stores(&self) -> Result<Vec<StoreWithProducts>, AppError> {
        let stores = self.stores.list().await?;
        self.with_products_all(stores).await
    }

    pub async fn update_store(&self, id: Uuid, payload: UpdateStorePayload) -> Result<Store, AppError> {
        let name = payload
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if let Some(name) = &name {
            if let Some(existing) = self.stores.find_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::StoreNameAlreadyExists(name.clone()));
                }
            }
        }

        let changes = StoreChanges {
            name,
            address: payload
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            latitude: payload.latitude,
            longitude: payload.longitude,
        };

        self.stores
            .update(id, changes)
            .await?
            .ok_or(AppError::StoreNotFound)
    }

    pub async fn delete_store(&self, id: Uuid) -> Result<(), AppError> {
        let store = self
            .stores
            .find_by_id(id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        let dependents = self.stores.dependents(id).await?;
        if !dependents.is_empty() {
            tracing::warn!(store_id = %id, ?dependents, "Remoção de loja bloqueada");
            return Err(AppError::StoreHasDependents);
        }

        if !self.stores.delete(id).await? {
            return Err(AppError::StoreNotFound);
        }
        if let Some(qr) = &store.qr_code {
            self.qr.remove(qr).await;
        }
        tracing::info!(store_id = %id, "Loja removida");
        Ok(())
    }

    // --- Catálogo ---

    pub async fn assign_products(
        &self,
        store_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<StoreWithProducts, AppError> {
        let store = self
            .stores
            .find_by_id(store_id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        // IDs desconhecidos são ignorados; nenhum conhecido é 404
        let mut known = Vec::with_capacity(product_ids.len());
        for id in product_ids {
            if self.products.find_by_id(*id).await?.is_some() {
                known.push(*id);
            } else {
                tracing::warn!(product_id = %id, "Produto inexistente ignorado na atribuição");
            }
        }
        if known.is_empty() {
            return Err(AppError::ProductNotFound);
        }

        let created = self.stores.assign_products(store_id, &known).await?;
        tracing::info!(store_id = %store_id, created, "Produtos atribuídos à loja");

        self.with_products(store).await
    }

    pub async fn unassign_product(&self, store_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        if !self.stores.unassign_product(store_id, product_id).await? {
            return Err(AppError::AssignmentNotFound);
        }
        Ok(())
    }

    /// A rota de um usuário, com o catálogo de cada loja.
    /// Agente de campo só enxerga a própria rota.
    pub async fn stores_of_user(
        &self,
        requester: &User,
        user_id: Uuid,
    ) -> Result<Vec<StoreWithProducts>, AppError> {
        if requester.role != Role::Admin && requester.id != user_id {
            return Err(AppError::AdminOnly);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let ids: Vec<Uuid> = user.route.into_iter().collect();
        let stores = self.stores.list_by_ids(&ids).await?;
        self.with_products_all(stores).await
    }
}
