// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{StoreRepository, UserRepository, VisitRepository},
    models::auth::{CreateUserPayload, Role, UpdateUserPayload, User},
    services::auth::AuthService,
};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    stores: Arc<dyn StoreRepository>,
    visits: Arc<dyn VisitRepository>,
    auth: AuthService,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        stores: Arc<dyn StoreRepository>,
        visits: Arc<dyn VisitRepository>,
        auth: AuthService,
    ) -> Self {
        Self { users, stores, visits, auth }
    }

    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        self.users.list(role).await
    }

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        let account = &payload.account;
        self.auth
            .create_account(&account.name, &account.email, &account.password, payload.role)
            .await
    }

    pub async fn update_user(&self, id: Uuid, payload: UpdateUserPayload) -> Result<User, AppError> {
        // Nome em branco é ignorado, não apaga o atual
        let name = payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        self.users
            .update_profile(id, name, payload.role)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.route.is_empty() || self.visits.count_by_user(id).await? > 0 {
            return Err(AppError::UserHasDependents);
        }

        if !self.users.delete(id).await? {
            return Err(AppError::UserNotFound);
        }
        tracing::info!(user_id = %id, "Usuário removido");
        Ok(())
    }

    // --- Rota ---

    pub async fn assign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        self.stores
            .find_by_id(store_id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        if !self.users.assign_store(user_id, store_id).await? {
            return Err(AppError::StoreAlreadyAssigned);
        }
        tracing::info!(user_id = %user_id, store_id = %store_id, "Loja adicionada à rota");

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn unassign_store(&self, user_id: Uuid, store_id: Uuid) -> Result<(), AppError> {
        if !self.users.unassign_store(user_id, store_id).await? {
            return Err(AppError::AssignmentNotFound);
        }
        tracing::info!(user_id = %user_id, store_id = %store_id, "Loja removida da rota");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryDb,
        models::{auth::RegisterUserPayload, visit::Visit},
    };

    fn service(db: &Arc<MemoryDb>) -> UserService {
        let auth = AuthService::new(db.clone(), "segredo".into(), 1).with_bcrypt_cost(4);
        UserService::new(db.clone(), db.clone(), db.clone(), auth)
    }

    #[tokio::test]
    async fn creates_with_explicit_role_and_filters_by_role() {
        let db = Arc::new(MemoryDb::new());
        let users = service(&db);

        let payload = CreateUserPayload {
            account: RegisterUserPayload {
                name: "Chefe".into(),
                email: "chefe@rutas.app".into(),
                password: "Chefe#2024".into(),
            },
            role: Role::Admin,
        };
        let admin = users.create_user(payload).await.unwrap();
        db.add_user("Ana", Role::User).await;

        let admins = users.list_users(Some(Role::Admin)).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, admin.id);
        assert_eq!(users.list_users(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_name_is_ignored_on_update() {
        let db = Arc::new(MemoryDb::new());
        let users = service(&db);
        let ana = db.add_user("Ana", Role::User).await;

        let payload = UpdateUserPayload { name: Some("   ".into()), role: Some(Role::Admin) };
        let updated = users.update_user(ana.id, payload).await.unwrap();
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.role, Role::Admin);

        let missing = UpdateUserPayload { name: Some("X".into()), role: None };
        assert!(matches!(
            users.update_user(Uuid::new_v4(), missing).await,
            Err(AppError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn route_assignment_rules() {
        let db = Arc::new(MemoryDb::new());
        let users = service(&db);
        let ana = db.add_user("Ana", Role::User).await;
        let store = db.add_store("Tienda").await;

        let updated = users.assign_store(ana.id, store.id).await.unwrap();
        assert!(updated.route.contains(&store.id));

        assert!(matches!(
            users.assign_store(ana.id, store.id).await,
            Err(AppError::StoreAlreadyAssigned)
        ));
        assert!(matches!(
            users.assign_store(Uuid::new_v4(), store.id).await,
            Err(AppError::UserNotFound)
        ));
        assert!(matches!(
            users.assign_store(ana.id, Uuid::new_v4()).await,
            Err(AppError::StoreNotFound)
        ));

        users.unassign_store(ana.id, store.id).await.unwrap();
        assert!(db.route_of(ana.id).await.is_empty());
        assert!(matches!(
            users.unassign_store(ana.id, store.id).await,
            Err(AppError::AssignmentNotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_blocked_while_route_exists() {
        let db = Arc::new(MemoryDb::new());
        let users = service(&db);
        let ana = db.add_user("Ana", Role::User).await;
        let store = db.add_store("Tienda").await;
        users.assign_store(ana.id, store.id).await.unwrap();

        assert!(matches!(users.delete_user(ana.id).await, Err(AppError::UserHasDependents)));
        assert_eq!(db.route_of(ana.id).await.len(), 1);

        users.unassign_store(ana.id, store.id).await.unwrap();
        users.delete_user(ana.id).await.unwrap();
        assert!(matches!(users.delete_user(ana.id).await, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn delete_is_blocked_while_visits_reference_the_user() {
        let db = Arc::new(MemoryDb::new());
        let users = service(&db);
        let ana = db.add_user("Ana", Role::User).await;
        let store = db.add_store("Tienda").await;
        users.assign_store(ana.id, store.id).await.unwrap();

        let visit = Visit::new(ana.id, store.id, "foto.jpg".into(), true);
        db.save(&visit).await.unwrap();
        users.unassign_store(ana.id, store.id).await.unwrap();
        assert!(db.route_of(ana.id).await.is_empty());

        assert!(matches!(users.delete_user(ana.id).await, Err(AppError::UserHasDependents)));
        assert!(matches!(
            UserRepository::delete(db.as_ref(), ana.id).await,
            Err(AppError::UserHasDependents)
        ));
        assert!(db.find_by_email(&ana.email).await.unwrap().is_some());
        assert_eq!(db.visit_count().await, 1);

        VisitRepository::delete(db.as_ref(), visit.id).await.unwrap();
        users.delete_user(ana.id).await.unwrap();
    }
}
