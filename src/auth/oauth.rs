//! OAuth2 client-credentials exchange and the token manager

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, RequestTokenError, TokenResponse, TokenUrl};
use std::sync::Arc;
use std::time::Duration;

use super::tokens::{AccessToken, Clock, SystemClock, TokenCache};
use crate::config::{Config, Credentials};
use crate::error::FlightError;

/// Provider lifetime assumed when the token response omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 1799;

/// Bearer token as returned by the provider, before caching.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in_secs: u64,
}

/// Exchanges client credentials for a bearer token.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, credentials: &Credentials) -> Result<IssuedToken, FlightError>;
}

/// Client-credentials grant against the provider token endpoint.
pub struct ClientCredentialsExchange {
    token_url: String,
    timeout: Duration,
}

impl ClientCredentialsExchange {
    pub fn new(token_url: String, timeout: Duration) -> Self {
        Self { token_url, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.token_url(), config.request_timeout())
    }

    /// Build the OAuth2 client. The provider has no authorize endpoint, so
    /// the token URL doubles as the (unused) auth URL.
    fn build_client(&self, credentials: &Credentials) -> Result<BasicClient, FlightError> {
        let invalid_url =
            |e: url::ParseError| FlightError::Configuration(format!("invalid token URL: {}", e));

        let auth_url = AuthUrl::new(self.token_url.clone()).map_err(invalid_url)?;
        let token_url = TokenUrl::new(self.token_url.clone()).map_err(invalid_url)?;

        // Credentials go in the form body alongside grant_type.
        Ok(BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody))
    }
}

#[async_trait]
impl TokenExchange for ClientCredentialsExchange {
    async fn exchange(&self, credentials: &Credentials) -> Result<IssuedToken, FlightError> {
        let client = self.build_client(credentials)?;
        tracing::debug!("Requesting access token from {}", self.token_url);

        let request = client
            .exchange_client_credentials()
            .request_async(oauth2::reqwest::async_http_client);

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(RequestTokenError::ServerResponse(err))) => {
                return Err(FlightError::Authentication(format!(
                    "token endpoint rejected the credentials ({})",
                    err
                )));
            }
            Ok(Err(e)) => {
                return Err(FlightError::Authentication(format!(
                    "token request failed: {}",
                    e
                )));
            }
            Err(_) => {
                return Err(FlightError::Authentication(format!(
                    "token request timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        Ok(IssuedToken {
            token: response.access_token().secret().to_string(),
            expires_in_secs: response
                .expires_in()
                .map(|d| d.as_secs())
                .unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        })
    }
}

/// Hands out a bearer token, reusing the cached one until it nears expiry.
///
/// No retry happens here; any failure goes straight back to the caller.
pub struct TokenManager<E = ClientCredentialsExchange> {
    credentials: Result<Credentials, String>,
    exchange: E,
    cache: TokenCache,
    clock: Arc<dyn Clock>,
}

impl TokenManager<ClientCredentialsExchange> {
    /// Token manager for the configured provider. Missing credentials are
    /// not an error until a token is actually needed.
    pub fn from_config(config: &Config) -> Self {
        let credentials = config.credentials().map_err(|e| match e {
            FlightError::Configuration(msg) => msg,
            other => other.to_string(),
        });
        Self::with_parts(
            credentials,
            ClientCredentialsExchange::from_config(config),
            Arc::new(SystemClock),
        )
    }
}

impl<E: TokenExchange> TokenManager<E> {
    pub fn with_parts(
        credentials: Result<Credentials, String>,
        exchange: E,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            exchange,
            cache: TokenCache::new(),
            clock,
        }
    }

    /// Return a valid bearer token, exchanging credentials when the cached
    /// one is missing or stale.
    pub async fn access_token(&self) -> Result<String, FlightError> {
        let now = self.clock.now();
        if let Some(token) = self.cache.get_valid(now) {
            return Ok(token);
        }

        let credentials = self
            .credentials
            .as_ref()
            .map_err(|msg| FlightError::Configuration(msg.clone()))?;

        tracing::info!("Access token missing or expired, requesting a new one...");
        let issued = self.exchange.exchange(credentials).await?;
        let token = AccessToken::issued(issued.token, issued.expires_in_secs, now);
        tracing::debug!("Access token cached until {}", token.expires_at);

        let bearer = token.token.clone();
        self.cache.store(token);
        Ok(bearer)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}
