use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{Category, Color, OrderId, Page, ProductId, Size};

// ============================================================================
// Admin API - the backend collaborator
// ============================================================================
//
// Every response uses one envelope: `{ "success": bool, "message"?: string,
// ...payload }`. A `success: false` envelope is turned into
// ApiError::Rejected carrying the backend message unchanged, so it can be
// shown to the user verbatim.
//
// Implementations:
// - RestApi      reqwest client against the real backend
// - InMemoryApi  seeded fake with call recording and failure injection
//
// ============================================================================

mod payloads;
mod rest;
mod memory;

pub use payloads::*;
pub use rest::RestApi;
pub use memory::{ApiCall, Endpoint, InMemoryApi};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected HTTP status {status}")]
    Status { status: u16, body: String },
}

/// The uniform response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

impl Envelope {
    pub fn ok(body: serde_json::Value) -> Self {
        let body = match body {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self { success: true, message: None, body }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), body: serde_json::Map::new() }
    }

    /// Decode the payload, or surface the backend's failure message
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        Ok(serde_json::from_value(serde_json::Value::Object(self.body))?)
    }

    /// Check success without decoding a payload
    pub fn into_unit(self) -> Result<(), ApiError> {
        self.into_result::<serde::de::IgnoredAny>().map(|_| ())
    }
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_colors(&self, page: u32, page_size: u32, search: Option<&str>) -> Result<Page<Color>, ApiError>;

    async fn list_sizes(&self, page: u32, page_size: u32) -> Result<Page<Size>, ApiError>;

    async fn list_categories(&self, page: u32, page_size: u32) -> Result<Page<Category>, ApiError>;

    async fn create_order(&self, header: &OrderHeader) -> Result<OrderId, ApiError>;

    async fn create_line_items(&self, order_id: &OrderId, items: &[NewOrderLine]) -> Result<(), ApiError>;

    /// Only used to compensate a header whose line items could not be saved
    async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError>;

    async fn create_product(&self, header: &ProductHeader) -> Result<ProductId, ApiError>;

    async fn create_product_variants(&self, product_id: &ProductId, variants: &[NewProductVariant]) -> Result<(), ApiError>;
}
