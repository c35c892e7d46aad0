//! HTTP client for the store's JSON API.

use async_trait::async_trait;
use domain::Product;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::catalog::CatalogSource;
use super::orders::{OrderConfirmation, OrderRequest, OrderSink};
use crate::config::Config;
use crate::error::{Result, StorefrontError};

/// Paged list envelope returned by the product endpoint.
#[derive(Debug, Deserialize)]
struct ApiListResponse<T> {
    #[allow(dead_code)]
    total: usize,
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Talks to the store over HTTP.
///
/// Serves as both the [`CatalogSource`] and the [`OrderSink`] of a
/// session. Product image paths are rewritten to absolute CDN URLs.
#[derive(Debug, Clone)]
pub struct HttpStoreApi {
    client: Client,
    api_url: String,
    cdn_url: String,
}

impl HttpStoreApi {
    /// Creates a client for the endpoints in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config.api_url(), config.cdn_url())
    }

    /// Creates a client with a preconfigured [`Client`].
    pub fn with_client(client: Client, api_url: impl Into<String>, cdn_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            cdn_url: cdn_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn image_url(&self, image: &str) -> String {
        if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
            return image.to_string();
        }
        if image.starts_with('/') {
            format!("{}{}", self.cdn_url, image)
        } else {
            format!("{}/{}", self.cdn_url, image)
        }
    }

    fn with_cdn_images(&self, products: Vec<Product>) -> Vec<Product> {
        products
            .into_iter()
            .map(|product| Product {
                image: self.image_url(&product.image),
                ..product
            })
            .collect()
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await?;
        Err(error_from_body(status.as_u16(), body))
    }
}

fn error_from_body(status: u16, body: String) -> StorefrontError {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(error) => StorefrontError::Rejected(error.error),
        Err(_) => StorefrontError::UnexpectedStatus { status, body },
    }
}

#[async_trait]
impl CatalogSource for HttpStoreApi {
    #[tracing::instrument(skip(self))]
    async fn fetch_catalog(&self) -> Result<Vec<Product>> {
        let response = self.client.get(self.endpoint("/product/")).send().await?;
        let list: ApiListResponse<Product> = Self::handle_response(response).await?;
        Ok(self.with_cdn_images(list.items))
    }
}

#[async_trait]
impl OrderSink for HttpStoreApi {
    #[tracing::instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    async fn submit_order(&self, order: OrderRequest) -> Result<OrderConfirmation> {
        let response = self
            .client
            .post(self.endpoint("/order"))
            .json(&order)
            .send()
            .await?;
        Self::handle_response(response).await
    }
}
