// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::SeedAccount,
    db::UserRepository,
    models::auth::{Claims, NewUser, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Auto-cadastro: sempre papel USER. Devolve o token já emitido.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let user = self.create_account(name, email, password, Role::User).await?;
        self.create_token(&user)
    }

    /// Cria uma conta com papel explícito (admin e seed).
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        // 1. Hashing num thread separado
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Grava (e-mail duplicado vira 409 no repositório)
        let user = self
            .user_repo
            .create(NewUser {
                id: Uuid::new_v4(),
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "Conta criada");
        Ok(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Valida o token e recarrega o usuário (com a rota atual).
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Conta removida depois da emissão: o token deixa de valer
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Cria as contas iniciais quando a base ainda não tem nenhum usuário.
    pub async fn seed_initial_users(
        &self,
        admin: Option<&SeedAccount>,
        agent: Option<&SeedAccount>,
    ) -> Result<(), AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(());
        }

        for (account, role) in [(admin, Role::Admin), (agent, Role::User)] {
            if let Some(account) = account {
                self.create_account(&account.name, &account.email, &account.password, role)
                    .await?;
                tracing::info!("🌱 Conta inicial criada: {} ({:?})", account.email, role);
            }
        }
        Ok(())
    }
}
