//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let addr = config.server_addr.clone();
    let max_upload_bytes = config.max_upload_bytes;

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    app_state
        .auth_service
        .seed_initial_users(
            app_state.config.seed_admin.as_ref(),
            app_state.config.seed_agent.as_ref(),
        )
        .await?;

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Tudo abaixo exige um Bearer válido; o papel é checado por rota (RequireAdmin)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/agents", get(handlers::users::list_agents))
        .route("/admins", get(handlers::users::list_admins))
        .route(
            "/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route("/{id}/stores", get(handlers::users::stores_of_user));

    let store_routes = Router::new()
        .route(
            "/",
            get(handlers::stores::list_stores).post(handlers::stores::create_store),
        )
        .route(
            "/{id}",
            get(handlers::stores::get_store)
                .put(handlers::stores::update_store)
                .delete(handlers::stores::delete_store),
        );

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let route_routes = Router::new()
        .route("/assign", post(handlers::assignments::assign_store))
        .route("/unassign", post(handlers::assignments::unassign_store));

    let catalog_routes = Router::new()
        .route("/assign", post(handlers::assignments::assign_products))
        .route("/unassign", post(handlers::assignments::unassign_product));

    let visit_routes = Router::new()
        .route(
            "/",
            get(handlers::visits::list_visits).post(handlers::visits::register_visit),
        )
        .route(
            "/{id}",
            get(handlers::visits::get_visit).delete(handlers::visits::delete_visit),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/stores", store_routes)
        .nest("/products", product_routes)
        .nest("/routes", route_routes)
        .nest("/store-products", catalog_routes)
        .nest("/visits", visit_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
