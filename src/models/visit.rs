// src/models/visit.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::product::Product;

// --- Linha de pedido ---
// O preço é uma cópia do preço base do produto no momento da visita,
// nunca uma referência viva.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "10.00")]
    pub unit_price: Decimal,
    #[schema(example = "20.00")]
    pub total: Decimal,
}

impl OrderLine {
    /// Congela o preço atual do produto e calcula o total.
    /// `None` quando o total não cabe num `Decimal`.
    pub fn priced(visit_id: Uuid, product: &Product, quantity: i32) -> Option<Self> {
        let unit_price = product.base_price;
        let total = Decimal::from(quantity).checked_mul(unit_price)?;
        Some(Self {
            id: Uuid::new_v4(),
            visit_id,
            product_id: product.id,
            quantity,
            unit_price,
            total,
        })
    }
}

// --- Visita (raiz do agregado) ---
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    #[sqlx(rename = "visit_date")]
    pub date: NaiveDate,
    pub photo: String,
    pub validation: bool,
    pub user_id: Uuid,
    pub store_id: Uuid,
    #[sqlx(skip)]
    pub orders: Vec<OrderLine>,
}

impl Visit {
    /// Visita nova: id gerado aqui, data atribuída pelo servidor.
    pub fn new(user_id: Uuid, store_id: Uuid, photo: String, validation: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            photo,
            validation,
            user_id,
            store_id,
            orders: Vec::new(),
        }
    }

    /// Substitui o conjunto inteiro de pedidos e amarra cada um a esta visita.
    pub fn replace_orders(&mut self, orders: Vec<OrderLine>) {
        self.orders = orders
            .into_iter()
            .map(|mut line| {
                line.visit_id = self.id;
                line
            })
            .collect();
    }
}

// --- Entrada crua de pedido (decodificada do JSON enviado pelo app) ---
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(alias = "productUuid")]
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
}

// --- Leitura ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDetail {
    pub id: Uuid,
    #[serde(skip)]
    pub visit_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub store_id: Uuid,
    pub store_name: String,
    pub visit_date: NaiveDate,
    pub validation: bool,
    pub photo: String,
    #[sqlx(skip)]
    pub orders: Vec<OrderLineDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisitCreated {
    pub id: Uuid,
}

// Formulário multipart do registro de visita
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RegisterVisitForm {
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub validation: bool,
    /// JSON: `[{"productId": "...", "quantity": 2}]`
    #[schema(example = "[{\"productId\":\"6f1c...\",\"quantity\":2}]")]
    pub orders: String,
    #[schema(value_type = String, format = Binary)]
    pub photo: Vec<u8>,
}
