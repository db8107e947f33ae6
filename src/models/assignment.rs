// src/models/assignment.rs

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Rota: loja <-> usuário
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteAssignmentPayload {
    #[serde(alias = "userUuid")]
    pub user_id: Uuid,
    #[serde(alias = "storeUuid")]
    pub store_id: Uuid,
}

// Catálogo: vários produtos de uma vez para uma loja
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignProductsPayload {
    #[serde(alias = "storeUuid")]
    pub store_id: Uuid,
    #[serde(alias = "productUuids")]
    #[validate(length(min = 1, message = "Informe ao menos um produto."))]
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnassignProductPayload {
    #[serde(alias = "storeUuid")]
    pub store_id: Uuid,
    #[serde(alias = "productUuid")]
    pub product_id: Uuid,
}
