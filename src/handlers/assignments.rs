// src/handlers/assignments.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::RequireAdmin,
    models::{
        assignment::{AssignProductsPayload, RouteAssignmentPayload, UnassignProductPayload},
        auth::User,
        store::StoreWithProducts,
    },
};

// ---
// Rota (usuário <-> loja)
// ---
#[utoipa::path(
    post,
    path = "/api/routes/assign",
    tag = "Routes",
    request_body = RouteAssignmentPayload,
    responses(
        (status = 200, description = "Loja adicionada à rota", body = User),
        (status = 404, description = "Usuário ou loja não encontrados"),
        (status = 409, description = "Loja já atribuída")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<RouteAssignmentPayload>,
) -> Result<Json<User>, AppError> {
    let user = app_state
        .user_service
        .assign_store(payload.user_id, payload.store_id)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/routes/unassign",
    tag = "Routes",
    request_body = RouteAssignmentPayload,
    responses(
        (status = 204, description = "Loja removida da rota"),
        (status = 404, description = "Atribuição não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<RouteAssignmentPayload>,
) -> Result<StatusCode, AppError> {
    app_state
        .user_service
        .unassign_store(payload.user_id, payload.store_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Catálogo (loja <-> produto)
// ---
#[utoipa::path(
    post,
    path = "/api/store-products/assign",
    tag = "Routes",
    request_body = AssignProductsPayload,
    responses(
        (status = 200, description = "Produtos atribuídos", body = StoreWithProducts),
        (status = 404, description = "Loja ou produtos não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_products(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<AssignProductsPayload>,
) -> Result<Json<StoreWithProducts>, AppError> {
    payload.validate()?;
    let store = app_state
        .store_service
        .assign_products(payload.store_id, &payload.product_ids)
        .await?;
    Ok(Json(store))
}

#[utoipa::path(
    post,
    path = "/api/store-products/unassign",
    tag = "Routes",
    request_body = UnassignProductPayload,
    responses(
        (status = 204, description = "Produto removido do catálogo da loja"),
        (status = 404, description = "Atribuição não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_product(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<UnassignProductPayload>,
) -> Result<StatusCode, AppError> {
    app_state
        .store_service
        .unassign_product(payload.store_id, payload.product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
