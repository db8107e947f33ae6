// src/db/contracts.rs
//
// Contratos de persistência dos quais os services dependem.
// O servidor usa as implementações Postgres; os testes usam a versão em memória.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewUser, Role, User},
        product::{NewProduct, Product, ProductChanges},
        store::{NewStore, Store, StoreChanges, StoreDependents},
        visit::{OrderLine, Visit, VisitDetail},
    },
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Usuário com a rota carregada numa única leitura.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<User>, AppError>;

    /// `false` se o usuário não existia. Rota ou visitas remanescentes viram `UserHasDependents`.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Rota (N:N usuário <-> loja) ---

    /// `false` se o par já existia.
    async fn assign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, AppError>;

    /// `false` se o par não existia.
    async fn unassign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, AppError>;

    /// Comparação sem diferenciar maiúsculas/minúsculas.
    async fn find_by_name(&self, name: &str) -> Result<Option<Store>, AppError>;

    async fn list(&self) -> Result<Vec<Store>, AppError>;

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Store>, AppError>;

    async fn create(&self, store: NewStore) -> Result<Store, AppError>;

    async fn update(&self, id: Uuid, changes: StoreChanges) -> Result<Option<Store>, AppError>;

    async fn dependents(&self, id: Uuid) -> Result<StoreDependents, AppError>;

    /// `false` se a loja não existia. Dependentes remanescentes viram `StoreHasDependents`.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Catálogo (N:N loja <-> produto) ---

    /// Retorna quantos pares novos foram criados.
    async fn assign_products(&self, store_id: Uuid, product_ids: &[Uuid]) -> Result<u64, AppError>;

    async fn unassign_product(&self, store_id: Uuid, product_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, AppError>;

    async fn list(&self) -> Result<Vec<Product>, AppError>;

    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Product>, AppError>;

    async fn create(&self, product: NewProduct) -> Result<Product, AppError>;

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, AppError>;

    async fn count_orders(&self, id: Uuid) -> Result<i64, AppError>;

    /// `false` se o produto não existia. Pedidos remanescentes viram `ProductHasOrders`.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Grava a visita e substitui o conjunto de pedidos numa única transação.
    async fn save(&self, visit: &Visit) -> Result<(), AppError>;

    async fn find_detail(&self, id: Uuid) -> Result<Option<VisitDetail>, AppError>;

    async fn list_details(&self) -> Result<Vec<VisitDetail>, AppError>;

    async fn orders_of(&self, visit_id: Uuid) -> Result<Vec<OrderLine>, AppError>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Remove a visita e, em cascata, os seus pedidos. `false` se não existia.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
