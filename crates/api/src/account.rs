//! Customer authentication and profile endpoints.

use bazaar_core::{CustomerProfile, Email};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest};

impl ApiClient {
    /// Log in and attach the returned token to subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or another error
    /// if the API request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<CustomerProfile, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let request = self.request(Method::POST, "/auth/login").await?.json(&body);
        self.authenticate(request).await
    }

    /// Create an account and attach the returned token.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the API request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<CustomerProfile, ApiError> {
        let body = RegisterRequest {
            name,
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let request = self
            .request(Method::POST, "/auth/register")
            .await?
            .json(&body);
        self.authenticate(request).await
    }

    async fn authenticate(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<CustomerProfile, ApiError> {
        let response: AuthResponse = self.fetch(request).await?;
        self.set_token(SecretString::from(response.token)).await;
        info!(user_id = %response.user.id, "Authenticated");
        Ok(response.user)
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token, or another
    /// error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<CustomerProfile, ApiError> {
        let request = self.request(Method::GET, "/account/profile").await?;
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<CustomerProfile, ApiError> {
        let request = self
            .request(Method::PUT, "/account/profile")
            .await?
            .json(update);
        self.fetch(request).await
    }
}
