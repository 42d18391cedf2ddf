use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use crate::models::{Category, Color, OrderId, Page, ProductId, Size};
use super::payloads::{NewOrderLine, NewProductVariant, OrderHeader, ProductHeader};
use super::{AdminApi, ApiError};

// ============================================================================
// In-Memory Admin API
// ============================================================================
//
// Seeded fake backend. Records every call in order, lets callers inject a
// `success: false` response per endpoint, and can hold an endpoint behind a
// gate so a request stays in flight until the gate is released.
//
// Created ids are sequential: order-1, order-2, ..., product-1, ...
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListColors,
    ListSizes,
    ListCategories,
    CreateOrder,
    CreateLineItems,
    DeleteOrder,
    CreateProduct,
    CreateProductVariants,
}

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListColors { page: u32, page_size: u32, search: Option<String> },
    ListSizes { page: u32, page_size: u32 },
    ListCategories { page: u32, page_size: u32 },
    CreateOrder(OrderHeader),
    CreateLineItems { order_id: OrderId, items: Vec<NewOrderLine> },
    DeleteOrder(OrderId),
    CreateProduct(ProductHeader),
    CreateProductVariants { product_id: ProductId, variants: Vec<NewProductVariant> },
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiCall::ListColors { .. } => Endpoint::ListColors,
            ApiCall::ListSizes { .. } => Endpoint::ListSizes,
            ApiCall::ListCategories { .. } => Endpoint::ListCategories,
            ApiCall::CreateOrder(_) => Endpoint::CreateOrder,
            ApiCall::CreateLineItems { .. } => Endpoint::CreateLineItems,
            ApiCall::DeleteOrder(_) => Endpoint::DeleteOrder,
            ApiCall::CreateProduct(_) => Endpoint::CreateProduct,
            ApiCall::CreateProductVariants { .. } => Endpoint::CreateProductVariants,
        }
    }
}

#[derive(Default)]
struct State {
    colors: Vec<Color>,
    sizes: Vec<Size>,
    categories: Vec<Category>,
    calls: Vec<ApiCall>,
    failures: HashMap<Endpoint, String>,
    gates: HashMap<Endpoint, Arc<Notify>>,
    orders: HashMap<OrderId, OrderHeader>,
    order_lines: Vec<NewOrderLine>,
    products: HashMap<ProductId, ProductHeader>,
    product_variants: Vec<NewProductVariant>,
    next_order: u64,
    next_product: u64,
}

#[derive(Default)]
pub struct InMemoryApi {
    state: Mutex<State>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.state.get_mut().colors = colors;
        self
    }

    pub fn with_sizes(mut self, sizes: Vec<Size>) -> Self {
        self.state.get_mut().sizes = sizes;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.state.get_mut().categories = categories;
        self
    }

    /// Make `endpoint` answer `{ success: false, message }` until cleared
    pub async fn fail(&self, endpoint: Endpoint, message: impl Into<String>) {
        self.state.lock().await.failures.insert(endpoint, message.into());
    }

    pub async fn clear_failure(&self, endpoint: Endpoint) {
        self.state.lock().await.failures.remove(&endpoint);
    }

    /// Hold every call to `endpoint` until the returned gate is notified.
    /// Each `notify_one` releases one call.
    pub async fn gate(&self, endpoint: Endpoint) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().await.gates.insert(endpoint, gate.clone());
        gate
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn calls_to(&self, endpoint: Endpoint) -> Vec<ApiCall> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .cloned()
            .collect()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn order_lines(&self) -> Vec<NewOrderLine> {
        self.state.lock().await.order_lines.clone()
    }

    pub async fn product_count(&self) -> usize {
        self.state.lock().await.products.len()
    }

    pub async fn product_variants(&self) -> Vec<NewProductVariant> {
        self.state.lock().await.product_variants.clone()
    }

    /// Record the call, wait on the endpoint's gate if any, then report an
    /// injected failure if one is set
    async fn enter(&self, call: ApiCall) -> Result<(), ApiError> {
        let endpoint = call.endpoint();
        let gate = {
            let mut state = self.state.lock().await;
            state.calls.push(call);
            state.gates.get(&endpoint).cloned()
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.state.lock().await.failures.get(&endpoint) {
            Some(message) => Err(ApiError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AdminApi for InMemoryApi {
    async fn list_colors(&self, page: u32, page_size: u32, search: Option<&str>) -> Result<Page<Color>, ApiError> {
        self.enter(ApiCall::ListColors { page, page_size, search: search.map(str::to_string) })
            .await?;

        let state = self.state.lock().await;
        let needle = search.map(str::to_lowercase);
        let matching: Vec<Color> = state
            .colors
            .iter()
            .filter(|c| match &needle {
                Some(needle) => c.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(Page::slice(&matching, page, page_size))
    }

    async fn list_sizes(&self, page: u32, page_size: u32) -> Result<Page<Size>, ApiError> {
        self.enter(ApiCall::ListSizes { page, page_size }).await?;
        let state = self.state.lock().await;
        Ok(Page::slice(&state.sizes, page, page_size))
    }

    async fn list_categories(&self, page: u32, page_size: u32) -> Result<Page<Category>, ApiError> {
        self.enter(ApiCall::ListCategories { page, page_size }).await?;
        let state = self.state.lock().await;
        Ok(Page::slice(&state.categories, page, page_size))
    }

    async fn create_order(&self, header: &OrderHeader) -> Result<OrderId, ApiError> {
        self.enter(ApiCall::CreateOrder(header.clone())).await?;
        let mut state = self.state.lock().await;
        state.next_order += 1;
        let order_id = OrderId::new(format!("order-{}", state.next_order));
        state.orders.insert(order_id.clone(), header.clone());
        Ok(order_id)
    }

    async fn create_line_items(&self, order_id: &OrderId, items: &[NewOrderLine]) -> Result<(), ApiError> {
        self.enter(ApiCall::CreateLineItems { order_id: order_id.clone(), items: items.to_vec() })
            .await?;
        let mut state = self.state.lock().await;
        if !state.orders.contains_key(order_id) {
            return Err(ApiError::Rejected(format!("Order {} not found", order_id)));
        }
        state.order_lines.extend_from_slice(items);
        Ok(())
    }

    async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError> {
        self.enter(ApiCall::DeleteOrder(order_id.clone())).await?;
        let mut state = self.state.lock().await;
        match state.orders.remove(order_id) {
            Some(_) => {
                state.order_lines.retain(|l| &l.order_id != order_id);
                Ok(())
            }
            None => Err(ApiError::Rejected(format!("Order {} not found", order_id))),
        }
    }

    async fn create_product(&self, header: &ProductHeader) -> Result<ProductId, ApiError> {
        self.enter(ApiCall::CreateProduct(header.clone())).await?;
        let mut state = self.state.lock().await;
        state.next_product += 1;
        let product_id = ProductId::new(format!("product-{}", state.next_product));
        state.products.insert(product_id.clone(), header.clone());
        Ok(product_id)
    }

    async fn create_product_variants(&self, product_id: &ProductId, variants: &[NewProductVariant]) -> Result<(), ApiError> {
        self.enter(ApiCall::CreateProductVariants {
            product_id: product_id.clone(),
            variants: variants.to_vec(),
        })
        .await?;
        let mut state = self.state.lock().await;
        if !state.products.contains_key(product_id) {
            return Err(ApiError::Rejected(format!("Product {} not found", product_id)));
        }
        state.product_variants.extend_from_slice(variants);
        Ok(())
    }
}
