use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderStatus, PaymentMethod};
use crate::models::{CategoryId, ColorId, Money, OrderId, ProductId, SizeId};

// ============================================================================
// Request Payloads
// ============================================================================
//
// Field names follow the backend's camelCase JSON.
//
// ============================================================================

/// Body of the create-order request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHeader {
    pub customer_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub shipping_cost: Money,
    pub discount: Money,
    pub subtotal: Money,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub ordered_at: DateTime<Utc>,
}

/// One element of the create-line-items batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub color_id: ColorId,
    pub size_id: SizeId,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

/// Body of the create-product request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductHeader {
    pub name: String,
    pub description: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Money>,
    pub category_id: CategoryId,
}

/// One element of the create-variants batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductVariant {
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub size_id: SizeId,
    pub quantity: u32,
    pub price: Money,
}

/// Success body of create-order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedOrder {
    pub order_id: OrderId,
}

/// Success body of create-product
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedProduct {
    pub product_id: ProductId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_line_uses_camel_case() {
        let line = NewOrderLine {
            order_id: OrderId::new("order-1"),
            product_id: None,
            color_id: ColorId::new("c1"),
            size_id: SizeId::new("s1"),
            quantity: 2,
            unit_price: Money::new(10),
            total: Money::new(20),
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["orderId"], "order-1");
        assert_eq!(json["unitPrice"], 10);
        assert!(json.get("productId").is_none());
    }
}
