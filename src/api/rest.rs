use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AdminConfig;
use crate::models::{Category, Color, OrderId, Page, ProductId, Size};
use super::payloads::{CreatedOrder, CreatedProduct, NewOrderLine, NewProductVariant, OrderHeader, ProductHeader};
use super::{AdminApi, ApiError, Envelope};

// ============================================================================
// REST Admin API - reqwest client for the dashboard backend
// ============================================================================
//
// Routes:
//   GET    /colors?page=&limit=&search=
//   GET    /sizes?page=&limit=
//   GET    /categories?page=&limit=
//   POST   /orders
//   POST   /order-details          (JSON array of line items)
//   DELETE /orders/{id}
//   POST   /products
//   POST   /product-variants       (JSON array of variants)
//
// Non-2xx responses are still parsed as envelopes first because the backend
// reports validation failures as 4xx with `success: false`.
//
// ============================================================================

pub struct RestApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestApi {
    pub fn new(base_url: impl Into<String>, config: &AdminConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Envelope, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, body)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Page<T>, ApiError> {
        tracing::debug!(path = path, query = ?query, "GET");
        let envelope = self.send(self.request(Method::GET, path).query(query)).await?;
        envelope.into_result()
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope, ApiError> {
        tracing::debug!(path = path, "POST");
        self.send(self.request(Method::POST, path).json(body)).await
    }
}

/// Envelope first regardless of status; a bare status error only when a
/// non-2xx body is not an envelope
fn decode_envelope(status: StatusCode, body: String) -> Result<Envelope, ApiError> {
    match serde_json::from_str::<Envelope>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => {
            tracing::warn!(status = status.as_u16(), "Non-envelope error response");
            Err(ApiError::Status { status: status.as_u16(), body })
        }
        Err(e) => Err(ApiError::Decode(e)),
    }
}

fn paging(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("limit", page_size.to_string())]
}

#[async_trait]
impl AdminApi for RestApi {
    async fn list_colors(&self, page: u32, page_size: u32, search: Option<&str>) -> Result<Page<Color>, ApiError> {
        let mut query = paging(page, page_size);
        if let Some(term) = search {
            query.push(("search", term.to_string()));
        }
        self.get_page("/colors", &query).await
    }

    async fn list_sizes(&self, page: u32, page_size: u32) -> Result<Page<Size>, ApiError> {
        self.get_page("/sizes", &paging(page, page_size)).await
    }

    async fn list_categories(&self, page: u32, page_size: u32) -> Result<Page<Category>, ApiError> {
        self.get_page("/categories", &paging(page, page_size)).await
    }

    async fn create_order(&self, header: &OrderHeader) -> Result<OrderId, ApiError> {
        let created: CreatedOrder = self.post("/orders", header).await?.into_result()?;
        Ok(created.order_id)
    }

    async fn create_line_items(&self, _order_id: &OrderId, items: &[NewOrderLine]) -> Result<(), ApiError> {
        self.post("/order-details", items).await?.into_unit()
    }

    async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError> {
        let path = format!("/orders/{}", order_id);
        tracing::debug!(path = %path, "DELETE");
        self.send(self.request(Method::DELETE, &path)).await?.into_unit()
    }

    async fn create_product(&self, header: &ProductHeader) -> Result<ProductId, ApiError> {
        let created: CreatedProduct = self.post("/products", header).await?.into_result()?;
        Ok(created.product_id)
    }

    async fn create_product_variants(&self, _product_id: &ProductId, variants: &[NewProductVariant]) -> Result<(), ApiError> {
        self.post("/product-variants", variants).await?.into_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = RestApi::new("http://localhost:8080/api/", &AdminConfig::default()).unwrap();
        assert_eq!(api.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_paging_query() {
        assert_eq!(
            paging(2, 8),
            vec![("page", "2".to_string()), ("limit", "8".to_string())]
        );
    }

    #[test]
    fn test_client_error_envelope_surfaces_backend_message() {
        let body = r#"{"success":false,"message":"Phone is required"}"#.to_string();
        let envelope = decode_envelope(StatusCode::BAD_REQUEST, body).unwrap();

        match envelope.into_unit() {
            Err(ApiError::Rejected(message)) => assert_eq!(message, "Phone is required"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_body_becomes_status_error() {
        let result = decode_envelope(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>".to_string());

        match result {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_success_body_is_decode_error() {
        let result = decode_envelope(StatusCode::OK, "not json".to_string());
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_success_envelope_payload_decodes() {
        let body = r#"{"success":true,"id":"order-9"}"#.to_string();
        let envelope = decode_envelope(StatusCode::CREATED, body).unwrap();
        let created: serde_json::Value = envelope.into_result().unwrap();
        assert_eq!(created["id"], "order-9");
    }
}
