//! Marketplace backend client.
//!
//! Uses `reqwest` 0.13 for HTTP and caches product responses with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use crate::cache::{CacheKey, CacheValue};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Paths that authenticate the caller and never carry a bearer token.
const UNAUTHENTICATED_PATHS: &[&str] = &["/auth/login", "/auth/register"];

/// Maximum characters of a response body kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 500;

/// Client for the marketplace backend.
///
/// Cheap to clone; clones share the connection pool, the bearer token and
/// the product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client.
    ///
    /// The configured service token, if any, is used until [`set_token`]
    /// replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    ///
    /// [`set_token`]: Self::set_token
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: RwLock::new(config.service_token.clone()),
                cache,
            }),
        })
    }

    /// Replace the bearer token attached to subsequent requests.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Stop sending a bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    pub(crate) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Start a request to `path`, attaching the bearer token unless the path
    /// is a login or registration endpoint.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ApiError> {
        let mut request = self
            .inner
            .client
            .request(method, self.url(path)?)
            .header(ACCEPT, "application/json");

        let token = self.inner.token.read().await;
        if let Some(token) = token.as_ref()
            && !UNAUTHENTICATED_PATHS.contains(&path)
        {
            request = request.bearer_auth(token.expose_secret());
        }

        Ok(request)
    }

    /// Send a request and return the body of a successful response.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let request = request.build()?;
        let path = request.url().path().to_string();
        let response = self.inner.client.execute(request).await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            tracing::warn!(path = %path, retry_after, "Backend rate limited request");
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let preview = preview(&body);
        match status {
            StatusCode::NOT_FOUND => {
                tracing::debug!(path = %path, "Backend returned not found");
                Err(ApiError::NotFound(path))
            }
            StatusCode::UNAUTHORIZED => {
                tracing::warn!(path = %path, "Backend rejected credentials");
                Err(ApiError::Unauthorized(preview))
            }
            _ => {
                tracing::error!(
                    status = %status,
                    path = %path,
                    body = %preview,
                    "Backend returned non-success status"
                );
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: preview,
                })
            }
        }
    }

    /// Send a request and decode a JSON response body.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await.map(drop)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_url_appends_path_to_base() {
        let api = client("http://127.0.0.1:4000/api/");
        assert_eq!(
            api.url("/products/3").unwrap().as_str(),
            "http://127.0.0.1:4000/api/products/3"
        );
    }

    #[tokio::test]
    async fn test_bearer_token_attached_except_for_auth_paths() {
        let api = client("http://127.0.0.1:4000");
        api.set_token(SecretString::from("tok-123")).await;

        let cart = api.request(Method::GET, "/cart").await.unwrap().build().unwrap();
        assert_eq!(
            cart.headers().get("authorization").unwrap(),
            "Bearer tok-123"
        );

        for path in UNAUTHENTICATED_PATHS {
            let req = api.request(Method::POST, path).await.unwrap().build().unwrap();
            assert!(req.headers().get("authorization").is_none(), "{path}");
        }
    }

    #[tokio::test]
    async fn test_clear_token() {
        let api = client("http://127.0.0.1:4000");
        api.set_token(SecretString::from("tok-123")).await;
        api.clear_token().await;
        assert!(!api.has_token().await);
        let req = api.request(Method::GET, "/orders").await.unwrap().build().unwrap();
        assert!(req.headers().get("authorization").is_none());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(BODY_PREVIEW_CHARS + 10);
        assert_eq!(preview(&long).len(), BODY_PREVIEW_CHARS);
    }
}
