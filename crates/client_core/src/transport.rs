//! REST transport between the storefront controller and the backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Cart, CartId, Product, ProductId},
    error::ErrorBody,
    protocol::{AddToCartRequest, CheckoutResult},
};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, product_id: ProductId) -> Result<Product, StoreError>;

    async fn session_cart(&self) -> Result<Cart, StoreError>;
    async fn add_to_session_cart(&self, request: &AddToCartRequest) -> Result<Cart, StoreError>;

    async fn create_cart(&self) -> Result<Cart, StoreError>;
    async fn get_cart(&self, cart_id: CartId) -> Result<Cart, StoreError>;
    async fn add_to_cart(
        &self,
        cart_id: CartId,
        request: &AddToCartRequest,
    ) -> Result<Cart, StoreError>;

    async fn checkout(&self, cart_id: CartId) -> Result<CheckoutResult, StoreError>;
}

/// reqwest-backed [`StorefrontApi`]. Keeps a cookie jar so session carts
/// follow the server-issued session cookie across calls.
pub struct HttpStorefrontApi {
    http: Client,
    base_url: Url,
}

impl HttpStorefrontApi {
    pub fn new(server_url: &str, request_timeout: Option<Duration>) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(server_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        Ok(self.base_url.join(path)?)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response
        .text()
        .await
        .ok()
        .and_then(|raw| ErrorBody::parse(&raw));
    debug!(status = status.as_u16(), ?body, "http: non-success response");

    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound { body });
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let response = self
            .http
            .get(self.endpoint("api/products")?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, StoreError> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/products/{product_id}"))?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn session_cart(&self) -> Result<Cart, StoreError> {
        let response = self
            .http
            .get(self.endpoint("api/carts/session")?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn add_to_session_cart(&self, request: &AddToCartRequest) -> Result<Cart, StoreError> {
        let response = self
            .http
            .post(self.endpoint("api/carts/session/add-product")?)
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_cart(&self) -> Result<Cart, StoreError> {
        let response = self
            .http
            .post(self.endpoint("api/carts")?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get_cart(&self, cart_id: CartId) -> Result<Cart, StoreError> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/carts/{cart_id}"))?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn add_to_cart(
        &self,
        cart_id: CartId,
        request: &AddToCartRequest,
    ) -> Result<Cart, StoreError> {
        let response = self
            .http
            .post(self.endpoint(&format!("api/carts/{cart_id}/add-product"))?)
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn checkout(&self, cart_id: CartId) -> Result<CheckoutResult, StoreError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("api/carts/{cart_id}/checkout"))?)
            .send()
            .await?;
        if response.status() != StatusCode::BAD_REQUEST {
            return read_json(response).await;
        }

        // A refused checkout answers 400 with a `CheckoutResult` body.
        let raw = response.text().await?;
        match serde_json::from_str::<CheckoutResult>(&raw) {
            Ok(result) => Ok(result),
            Err(_) => Err(StoreError::Status {
                status: StatusCode::BAD_REQUEST.as_u16(),
                body: ErrorBody::parse(&raw),
            }),
        }
    }
}
