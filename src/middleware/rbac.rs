// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
};

/// Guardião das rotas administrativas: exige papel ADMIN.
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A. Usuário já resolvido pelo auth_guard
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Papel
        if user.role != Role::Admin {
            tracing::warn!(user_id = %user.id, "Acesso administrativo negado");
            return Err(AppError::AdminOnly);
        }

        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use axum::http::Request;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn parts_with(role: Option<Role>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(role) = role {
            parts.extensions.insert(User {
                id: Uuid::new_v4(),
                name: "Teste".into(),
                email: "teste@rutas.app".into(),
                password_hash: String::new(),
                role,
                route: BTreeSet::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        }
        parts
    }

    #[tokio::test]
    async fn only_admins_pass() {
        let mut admin = parts_with(Some(Role::Admin));
        assert!(RequireAdmin::from_request_parts(&mut admin, &()).await.is_ok());

        let mut agent = parts_with(Some(Role::User));
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut agent, &()).await,
            Err(AppError::AdminOnly)
        ));

        let mut anonymous = parts_with(None);
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut anonymous, &()).await,
            Err(AppError::InvalidToken)
        ));
    }
}
