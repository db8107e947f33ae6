// src/db/memory.rs
//
// Repositório em memória para os testes dos services.
// Reproduz as mesmas regras que o Postgres garante: nomes únicos sem
// diferenciar maiúsculas, FKs que bloqueiam remoções e a cascata dos pedidos.

use std::{
    collections::{BTreeSet, HashMap},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::contracts::{ProductRepository, StoreRepository, UserRepository, VisitRepository},
    models::{
        auth::{NewUser, Role, User},
        product::{NewProduct, Product, ProductChanges},
        store::{NewStore, Store, StoreChanges, StoreDependents},
        visit::{OrderLine, OrderLineDetail, Visit, VisitDetail},
    },
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    stores: HashMap<Uuid, Store>,
    products: HashMap<Uuid, Product>,
    // (loja, produto)
    catalog: BTreeSet<(Uuid, Uuid)>,
    visits: HashMap<Uuid, Visit>,
    orders: HashMap<Uuid, OrderLine>,
}

#[derive(Default)]
pub struct MemoryDb {
    state: RwLock<State>,
    fail_on_save: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz o próximo `save` de visita falhar como se o banco tivesse caído.
    /// Só o próximo: a marca é consumida pela falha.
    pub fn fail_next_save(&self) {
        self.fail_on_save.store(true, Ordering::SeqCst);
    }

    pub async fn visit_count(&self) -> usize {
        self.state.read().await.visits.len()
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    // --- Atalhos para montar cenários ---

    pub async fn add_user(&self, name: &str, role: Role) -> User {
        let user = NewUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@rutas.test", name.to_lowercase().replace(' ', ".")),
            password_hash: "x".to_string(),
            role,
        };
        UserRepository::create(self, user).await.expect("usuário de teste")
    }

    pub async fn add_store(&self, name: &str) -> Store {
        let store = NewStore {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: "Calle 1".to_string(),
            latitude: 19.43,
            longitude: -99.13,
            qr_code: None,
        };
        StoreRepository::create(self, store).await.expect("loja de teste")
    }

    pub async fn add_product(&self, name: &str, price: rust_decimal::Decimal) -> Product {
        let product = NewProduct {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} (teste)"),
            base_price: price,
        };
        ProductRepository::create(self, product)
            .await
            .expect("produto de teste")
    }

    pub async fn route_of(&self, user_id: Uuid) -> BTreeSet<Uuid> {
        self.state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|u| u.route.clone())
            .unwrap_or_default()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.state.read().await.users.len() as i64)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let now = Utc::now();
        let created = User {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            route: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<User>, AppError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(role) = role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get(&id) else {
            return Ok(false);
        };
        let has_visits = state.visits.values().any(|v| v.user_id == id);
        if !user.route.is_empty() || has_visits {
            return Err(AppError::UserHasDependents);
        }
        state.users.remove(&id);
        Ok(true)
    }

    async fn assign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if !state.stores.contains_key(&store_id) {
            return Err(AppError::StoreNotFound);
        }
        let user = state.users.get_mut(&user_id).ok_or(AppError::UserNotFound)?;
        Ok(user.route.insert(store_id))
    }

    async fn unassign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state
            .users
            .get_mut(&user_id)
            .is_some_and(|u| u.route.remove(&store_id)))
    }
}

#[async_trait]
impl StoreRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        Ok(self.state.read().await.stores.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Store>, AppError> {
        let state = self.state.read().await;
        Ok(state.stores.values().find(|s| same_name(&s.name, name)).cloned())
    }

    async fn list(&self) -> Result<Vec<Store>, AppError> {
        let state = self.state.read().await;
        let mut stores: Vec<Store> = state.stores.values().cloned().collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Store>, AppError> {
        let state = self.state.read().await;
        let mut stores: Vec<Store> = ids
            .iter()
            .filter_map(|id| state.stores.get(id).cloned())
            .collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }

    async fn create(&self, store: NewStore) -> Result<Store, AppError> {
        let mut state = self.state.write().await;
        if state.stores.values().any(|s| same_name(&s.name, &store.name)) {
            return Err(AppError::StoreNameAlreadyExists(store.name));
        }
        let now = Utc::now();
        let created = Store {
            id: store.id,
            name: store.name,
            address: store.address,
            latitude: store.latitude,
            longitude: store.longitude,
            qr_code: store.qr_code,
            created_at: now,
            updated_at: now,
        };
        state.stores.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: StoreChanges) -> Result<Option<Store>, AppError> {
        let mut state = self.state.write().await;
        if let Some(name) = &changes.name {
            if state
                .stores
                .values()
                .any(|s| s.id != id && same_name(&s.name, name))
            {
                return Err(AppError::StoreNameAlreadyExists(name.clone()));
            }
        }
        let Some(store) = state.stores.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            store.name = name;
        }
        if let Some(address) = changes.address {
            store.address = address;
        }
        if let Some(latitude) = changes.latitude {
            store.latitude = latitude;
        }
        if let Some(longitude) = changes.longitude {
            store.longitude = longitude;
        }
        store.updated_at = Utc::now();
        Ok(Some(store.clone()))
    }

    async fn dependents(&self, id: Uuid) -> Result<StoreDependents, AppError> {
        let state = self.state.read().await;
        Ok(StoreDependents {
            visits: state.visits.values().filter(|v| v.store_id == id).count() as i64,
            products: state.catalog.iter().filter(|(s, _)| *s == id).count() as i64,
            users: state.users.values().filter(|u| u.route.contains(&id)).count() as i64,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let dependents = StoreRepository::dependents(self, id).await?;
        let mut state = self.state.write().await;
        if !state.stores.contains_key(&id) {
            return Ok(false);
        }
        if !dependents.is_empty() {
            return Err(AppError::StoreHasDependents);
        }
        state.stores.remove(&id);
        Ok(true)
    }

    async fn assign_products(&self, store_id: Uuid, product_ids: &[Uuid]) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let known: Vec<Uuid> = product_ids
            .iter()
            .copied()
            .filter(|id| state.products.contains_key(id))
            .collect();
        let mut created = 0;
        for product_id in known {
            if state.catalog.insert((store_id, product_id)) {
                created += 1;
            }
        }
        Ok(created)
    }

    async fn unassign_product(&self, store_id: Uuid, product_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state.catalog.remove(&(store_id, product_id)))
    }
}

#[async_trait]
impl ProductRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .find(|p| same_name(&p.name, name))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Product>, AppError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .catalog
            .iter()
            .filter(|(s, _)| *s == store_id)
            .filter_map(|(_, p)| state.products.get(p).cloned())
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let mut state = self.state.write().await;
        if state
            .products
            .values()
            .any(|p| same_name(&p.name, &product.name))
        {
            return Err(AppError::ProductNameAlreadyExists(product.name));
        }
        let now = Utc::now();
        let created = Product {
            id: product.id,
            name: product.name,
            description: product.description,
            base_price: product.base_price,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let mut state = self.state.write().await;
        if let Some(name) = &changes.name {
            if state
                .products
                .values()
                .any(|p| p.id != id && same_name(&p.name, name))
            {
                return Err(AppError::ProductNameAlreadyExists(name.clone()));
            }
        }
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.base_price {
            product.base_price = price;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn count_orders(&self, id: Uuid) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state.orders.values().filter(|o| o.product_id == id).count() as i64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&id) {
            return Ok(false);
        }
        if state.orders.values().any(|o| o.product_id == id) {
            return Err(AppError::ProductHasOrders);
        }
        state.catalog.retain(|(_, p)| *p != id);
        state.products.remove(&id);
        Ok(true)
    }
}

impl State {
    fn detail_of(&self, visit: &Visit) -> VisitDetail {
        let mut orders: Vec<OrderLineDetail> = self
            .orders
            .values()
            .filter(|o| o.visit_id == visit.id)
            .map(|o| OrderLineDetail {
                id: o.id,
                visit_id: o.visit_id,
                product_id: o.product_id,
                product_name: self
                    .products
                    .get(&o.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                quantity: o.quantity,
                unit_price: o.unit_price,
                total: o.total,
            })
            .collect();
        orders.sort_by(|a, b| a.product_name.cmp(&b.product_name));

        VisitDetail {
            id: visit.id,
            user_id: visit.user_id,
            user_name: self
                .users
                .get(&visit.user_id)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            store_id: visit.store_id,
            store_name: self
                .stores
                .get(&visit.store_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            visit_date: visit.date,
            validation: visit.validation,
            photo: visit.photo.clone(),
            orders,
        }
    }
}

#[async_trait]
impl VisitRepository for MemoryDb {
    async fn save(&self, visit: &Visit) -> Result<(), AppError> {
        if self.fail_on_save.swap(false, Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        let mut state = self.state.write().await;
        if !state.users.contains_key(&visit.user_id) || !state.stores.contains_key(&visit.store_id)
        {
            return Err(AppError::DatabaseError(sqlx::Error::RowNotFound));
        }

        let mut header = visit.clone();
        let lines = std::mem::take(&mut header.orders);
        state.orders.retain(|_, o| o.visit_id != visit.id);
        for line in lines {
            state.orders.insert(line.id, line);
        }
        state.visits.insert(header.id, header);
        Ok(())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<VisitDetail>, AppError> {
        let state = self.state.read().await;
        Ok(state.visits.get(&id).map(|v| state.detail_of(v)))
    }

    async fn list_details(&self) -> Result<Vec<VisitDetail>, AppError> {
        let state = self.state.read().await;
        let mut visits: Vec<VisitDetail> = state.visits.values().map(|v| state.detail_of(v)).collect();
        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        Ok(visits)
    }

    async fn orders_of(&self, visit_id: Uuid) -> Result<Vec<OrderLine>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .filter(|o| o.visit_id == visit_id)
            .cloned()
            .collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state.visits.values().filter(|v| v.user_id == user_id).count() as i64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        state.orders.retain(|_, o| o.visit_id != id);
        Ok(state.visits.remove(&id).is_some())
    }
}
