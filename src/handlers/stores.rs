// src/handlers/stores.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::RequireAdmin,
    models::store::{CreateStorePayload, Store, StoreWithProducts, UpdateStorePayload},
};

#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Stores",
    request_body = CreateStorePayload,
    responses(
        (status = 201, description = "Loja criada (com QR)", body = Store),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome de loja já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateStorePayload>,
) -> Result<(StatusCode, Json<Store>), AppError> {
    payload.validate()?;
    let store = app_state.store_service.create_store(payload).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Stores",
    responses((status = 200, description = "Lojas com os seus produtos", body = Vec<StoreWithProducts>)),
    security(("api_jwt" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<StoreWithProducts>>, AppError> {
    Ok(Json(app_state.store_service.list_stores().await?))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 200, description = "Loja com os seus produtos", body = StoreWithProducts),
        (status = 404, description = "Loja não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<StoreWithProducts>, AppError> {
    Ok(Json(app_state.store_service.get_store(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    request_body = UpdateStorePayload,
    responses(
        (status = 200, description = "Loja atualizada", body = Store),
        (status = 404, description = "Loja não encontrada"),
        (status = 409, description = "Nome de loja já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStorePayload>,
) -> Result<Json<Store>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.store_service.update_store(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 204, description = "Loja removida"),
        (status = 404, description = "Loja não encontrada"),
        (status = 409, description = "Loja com visitas, produtos ou usuários")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.store_service.delete_store(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
