//! User/cart service client.
//!
//! The user/cart service owns authenticated carts and customer sessions. The
//! storefront only calls it:
//!
//! - `POST {base}/users/{uid}/cart/items` - persist a line item
//! - `GET  {base}/users/{uid}/cart` - fetch the current cart
//! - `GET  {base}/session` - resolve a bearer token to an identity

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use raritone_core::{Cart, CartLineItem, Identity, UserId};

use crate::config::CartServiceConfig;

/// Errors that can occur when calling the user/cart service.
#[derive(Debug, Error)]
pub enum CartServiceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service is not reachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl CartServiceError {
    /// Whether the service rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Server-side cart persistence keyed by user identity.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Persist a line item in the user's cart.
    async fn add_to_cart(&self, user_id: &UserId, item: &CartLineItem)
    -> Result<(), CartServiceError>;

    /// Fetch the user's current cart.
    async fn refresh_cart(&self, user_id: &UserId) -> Result<Cart, CartServiceError>;
}

/// Resolves auth-service tokens to identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a bearer token for the identity it belongs to.
    async fn resolve_identity(&self, token: &SecretString) -> Result<Identity, CartServiceError>;
}

/// Session lookup response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    uid: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// HTTP client for the user/cart service.
#[derive(Clone)]
pub struct UserServiceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl UserServiceClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CartServiceConfig) -> Result<Self, CartServiceError> {
        let mut headers = HeaderMap::new();

        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key.expose_secret())
                .map_err(|e| CartServiceError::Config(format!("Invalid API key format: {e}")))?;
            value.set_sensitive(true);
            headers.insert("X-Api-Key", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(config.base_url.clone()),
        })
    }

    /// Resolve a path relative to the service base URL.
    fn endpoint(&self, path: &str) -> Result<Url, CartServiceError> {
        Ok(self.base_url.join(path)?)
    }

    fn cart_path(user_id: &UserId) -> String {
        format!("users/{}/cart", urlencoding::encode(user_id.as_str()))
    }

    /// Turn a non-success response into an API error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CartServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(CartServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CartService for UserServiceClient {
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    async fn add_to_cart(
        &self,
        user_id: &UserId,
        item: &CartLineItem,
    ) -> Result<(), CartServiceError> {
        let url = self.endpoint(&format!("{}/items", Self::cart_path(user_id)))?;
        let response = self.client.post(url).json(item).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn refresh_cart(&self, user_id: &UserId) -> Result<Cart, CartServiceError> {
        let url = self.endpoint(&Self::cart_path(user_id))?;
        let response = Self::check(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for UserServiceClient {
    #[instrument(skip_all)]
    async fn resolve_identity(&self, token: &SecretString) -> Result<Identity, CartServiceError> {
        let url = self.endpoint("session")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let session: SessionResponse = Self::check(response).await?.json().await?;

        Ok(Identity::new(session.uid, session.display_name))
    }
}

/// `Url::join` replaces the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
