// src/services/order_lines.rs

use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::visit::{OrderLine, OrderRequest},
};

#[derive(Debug, Error)]
pub enum OrderPayloadError {
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quantidade {quantity} inválida para o produto {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i32 },

    #[error("total fora do limite para o produto {product_id} (quantidade {quantity})")]
    TotalOverflow { product_id: Uuid, quantity: i32 },
}

#[derive(Debug, Error)]
pub enum OrderLineError {
    #[error(transparent)]
    Payload(#[from] OrderPayloadError),

    #[error(transparent)]
    Repository(#[from] AppError),
}

/// Decodifica o texto enviado pelo app: `[{"productId": "...", "quantity": 2}]`.
/// Texto em branco vale como "nenhum pedido".
pub fn decode_orders_payload(raw: &str) -> Result<Vec<OrderRequest>, OrderPayloadError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let requests: Vec<OrderRequest> = serde_json::from_str(raw)?;

    if let Some(bad) = requests.iter().find(|r| r.quantity < 1) {
        return Err(OrderPayloadError::InvalidQuantity {
            product_id: bad.product_id,
            quantity: bad.quantity,
        });
    }
    Ok(requests)
}

/// Monta as linhas de pedido com o preço congelado no momento da visita.
///
/// Produto desconhecido não derruba o lote: a entrada é descartada e registrada
/// no log. Interrompem a montagem os erros do repositório e um total que
/// não cabe num `Decimal`.
pub async fn build_order_lines(
    products: &dyn ProductRepository,
    visit_id: Uuid,
    requests: &[OrderRequest],
) -> Result<Vec<OrderLine>, OrderLineError> {
    let mut lines = Vec::with_capacity(requests.len());

    for request in requests {
        match products.find_by_id(request.product_id).await? {
            Some(product) => {
                let line = OrderLine::priced(visit_id, &product, request.quantity).ok_or(
                    OrderPayloadError::TotalOverflow {
                        product_id: product.id,
                        quantity: request.quantity,
                    },
                )?;
                lines.push(line);
            }
            None => {
                tracing::warn!(
                    product_id = %request.product_id,
                    quantity = request.quantity,
                    "Produto inexistente no pedido; entrada descartada"
                );
            }
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{db::memory::MemoryDb, models::product::ProductChanges};

    #[test]
    fn decodes_current_and_legacy_field_names() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!(
            r#"[{{"productId":"{a}","quantity":2}},{{"productUuid":"{b}","quantity":1}}]"#
        );

        let requests = decode_orders_payload(&raw).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].product_id, a);
        assert_eq!(requests[1].product_id, b);
        assert_eq!(requests[1].quantity, 1);
    }

    #[test]
    fn blank_payload_means_no_orders() {
        assert!(decode_orders_payload("").unwrap().is_empty());
        assert!(decode_orders_payload("  \n").unwrap().is_empty());
        assert!(decode_orders_payload("[]").unwrap().is_empty());
    }

    #[test]
    fn structural_failures_are_rejected() {
        assert!(matches!(
            decode_orders_payload(r#"[{"productId":"#),
            Err(OrderPayloadError::Json(_))
        ));
        assert!(matches!(
            decode_orders_payload(r#"{"productId":"x"}"#),
            Err(OrderPayloadError::Json(_))
        ));

        let raw = format!(r#"[{{"productId":"{}","quantity":0}}]"#, Uuid::new_v4());
        assert!(matches!(
            decode_orders_payload(&raw),
            Err(OrderPayloadError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[tokio::test]
    async fn prices_are_snapshotted_and_unknown_products_dropped() {
        let db = MemoryDb::new();
        let soda = db.add_product("Refresco", Decimal::new(1000, 2)).await;
        let visit_id = Uuid::new_v4();

        let requests = vec![
            OrderRequest { product_id: soda.id, quantity: 2 },
            OrderRequest { product_id: Uuid::new_v4(), quantity: 5 },
        ];
        let lines = build_order_lines(&db, visit_id, &requests).await.unwrap();

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.visit_id, visit_id);
        assert_eq!(line.product_id, soda.id);
        assert_eq!(line.unit_price, Decimal::new(1000, 2));
        assert_eq!(line.total, Decimal::new(2000, 2));
        assert_eq!(line.total, Decimal::from(line.quantity) * line.unit_price);

        // Mudar o preço depois não altera a linha já montada
        let changes = ProductChanges {
            base_price: Some(Decimal::new(1500, 2)),
            ..Default::default()
        };
        ProductRepository::update(&db, soda.id, changes).await.unwrap();
        assert_eq!(line.unit_price, Decimal::new(1000, 2));

        let again = build_order_lines(&db, visit_id, &requests[..1]).await.unwrap();
        assert_eq!(again[0].unit_price, Decimal::new(1500, 2));
        assert_eq!(again[0].total, Decimal::new(3000, 2));
    }

    #[tokio::test]
    async fn all_unknown_products_yield_no_lines() {
        let db = MemoryDb::new();
        let requests = vec![OrderRequest { product_id: Uuid::new_v4(), quantity: 1 }];
        let lines = build_order_lines(&db, Uuid::new_v4(), &requests).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn total_overflow_stops_the_batch() {
        let db = MemoryDb::new();
        let soda = db.add_product("Refresco", Decimal::new(1000, 2)).await;
        let gold = db.add_product("Ouro", Decimal::MAX).await;

        let requests = vec![
            OrderRequest { product_id: soda.id, quantity: 1 },
            OrderRequest { product_id: gold.id, quantity: 2 },
        ];
        let result = build_order_lines(&db, Uuid::new_v4(), &requests).await;

        assert!(matches!(
            result,
            Err(OrderLineError::Payload(OrderPayloadError::TotalOverflow { quantity: 2, .. }))
        ));

        let single = vec![OrderRequest { product_id: gold.id, quantity: 1 }];
        let lines = build_order_lines(&db, Uuid::new_v4(), &single).await.unwrap();
        assert_eq!(lines[0].total, Decimal::MAX);
    }
}
