// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{PgProductRepository, PgStoreRepository, PgUserRepository, PgVisitRepository},
    services::{
        auth::AuthService, evidence::EvidenceStorage, product_service::ProductService,
        qr::QrRenderer, store_service::StoreService, user_service::UserService,
        visit_service::VisitService,
    },
};

// Conta criada na primeira subida, se configurada
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub uploads_dir: String,
    pub qr_dir: String,
    pub qr_content_base: String,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
    pub jwt_ttl_hours: i64,
    pub seed_admin: Option<SeedAccount>,
    pub seed_agent: Option<SeedAccount>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:3000"),
            uploads_dir: or_default("UPLOADS_DIR", "uploads"),
            qr_dir: or_default("QR_DIR", "qr"),
            qr_content_base: or_default("QR_CONTENT_BASE", ""),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", 24 * 7)?,
            seed_admin: seed_account("SEED_ADMIN"),
            seed_agent: seed_account("SEED_AGENT"),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} deve ser definida"))
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn seed_account(prefix: &str) -> Option<SeedAccount> {
    let var = |suffix: &str| env::var(format!("{prefix}_{suffix}")).ok();
    Some(SeedAccount {
        name: var("NAME")?,
        email: var("EMAIL")?,
        password: var("PASSWORD")?,
    })
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub store_service: StoreService,
    pub product_service: ProductService,
    pub visit_service: VisitService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = Arc::new(PgUserRepository::new(db_pool.clone()));
        let store_repo = Arc::new(PgStoreRepository::new(db_pool.clone()));
        let product_repo = Arc::new(PgProductRepository::new(db_pool.clone()));
        let visit_repo = Arc::new(PgVisitRepository::new(db_pool.clone()));

        let auth_service =
            AuthService::new(user_repo.clone(), config.jwt_secret.clone(), config.jwt_ttl_hours);
        let user_service = UserService::new(
            user_repo.clone(),
            store_repo.clone(),
            visit_repo.clone(),
            auth_service.clone(),
        );
        let store_service = StoreService::new(
            store_repo.clone(),
            product_repo.clone(),
            user_repo.clone(),
            QrRenderer::new(&config.qr_dir),
            config.qr_content_base.clone(),
        );
        let product_service = ProductService::new(product_repo.clone());
        let visit_service = VisitService::new(
            user_repo,
            store_repo,
            product_repo,
            visit_repo,
            EvidenceStorage::new(&config.uploads_dir),
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            user_service,
            store_service,
            product_service,
            visit_service,
        })
    }
}
