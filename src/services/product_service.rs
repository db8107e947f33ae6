// src/services/product_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::product::{CreateProductPayload, NewProduct, Product, ProductChanges, UpdateProductPayload},
};

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn create_product(&self, payload: CreateProductPayload) -> Result<Product, AppError> {
        let name = payload.name.trim().to_string();
        if self.products.find_by_name(&name).await?.is_some() {
            return Err(AppError::ProductNameAlreadyExists(name));
        }

        let product = self
            .products
            .create(NewProduct {
                id: Uuid::new_v4(),
                name,
                description: payload.description.trim().to_string(),
                base_price: payload.base_price,
            })
            .await?;

        tracing::info!(product_id = %product.id, "Produto criado");
        Ok(product)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.products.list().await
    }

    /// Preço só muda quando o novo valor é positivo.
    /// Linhas de pedido já gravadas mantêm o preço da época.
    pub async fn update_product(
        &self,
        id: Uuid,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        let name = payload
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if let Some(name) = &name {
            if let Some(existing) = self.products.find_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::ProductNameAlreadyExists(name.clone()));
                }
            }
        }

        let changes = ProductChanges {
            name,
            description: payload
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            base_price: payload.base_price.filter(|p| *p > Decimal::ZERO),
        };

        self.products
            .update(id, changes)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        if self.products.count_orders(id).await? > 0 {
            return Err(AppError::ProductHasOrders);
        }

        if !self.products.delete(id).await? {
            return Err(AppError::ProductNotFound);
        }
        tracing::info!(product_id = %id, "Produto removido");
        Ok(())
    }
}
