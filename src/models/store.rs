// src/models/store.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::validate_no_angle_brackets, product::Product};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    #[schema(example = "Abarrotes La Esperanza")]
    pub name: String,
    #[schema(example = "Av. Juárez 120, Centro")]
    pub address: String,
    #[schema(example = 19.4326)]
    pub latitude: f64,
    #[schema(example = -99.1332)]
    pub longitude: f64,
    /// Caminho da imagem QR gerada no cadastro.
    pub qr_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Loja + catálogo de produtos atribuídos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithProducts {
    #[serde(flatten)]
    pub store: Store,
    pub products: Vec<Product>,
}

// O que o repositório precisa para inserir uma loja
#[derive(Debug, Clone)]
pub struct NewStore {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub qr_code: Option<String>,
}

// Atualização parcial já resolvida pelo service
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// Contagem de relações que bloqueiam a remoção
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct StoreDependents {
    pub visits: i64,
    pub products: i64,
    pub users: i64,
}

impl StoreDependents {
    pub fn is_empty(&self) -> bool {
        self.visits == 0 && self.products == 0 && self.users == 0
    }
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStorePayload {
    #[validate(
        length(min = 1, message = "O nome é obrigatório."),
        custom(function = "validate_no_angle_brackets")
    )]
    pub name: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude fora do intervalo."))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude fora do intervalo."))]
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStorePayload {
    #[validate(custom(function = "validate_no_angle_brackets"))]
    pub name: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude fora do intervalo."))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude fora do intervalo."))]
    pub longitude: Option<f64>,
}
