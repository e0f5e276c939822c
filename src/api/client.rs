//! Authenticated HTTP client for the Amadeus self-service APIs
//!
//! Wraps reqwest::Client with bearer token injection, an explicit request
//! timeout, and status checking.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::locations::{LocationsResponse, RawLocation};
use super::normalize::OffersResponse;
use super::offers::SearchRequest;
use super::TravelApi;
use crate::auth::{ClientCredentialsExchange, TokenExchange, TokenManager};
use crate::config::Config;
use crate::error::{FlightError, UpstreamError};

const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const LOCATIONS_PATH: &str = "/v1/reference-data/locations";

/// Provider client. Owns the token manager, so every request made through
/// one client shares a single memoized token.
pub struct AmadeusClient<E = ClientCredentialsExchange> {
    http: reqwest::Client,
    base_url: String,
    currency: String,
    max_results: u32,
    tokens: TokenManager<E>,
}

impl AmadeusClient<ClientCredentialsExchange> {
    /// Build a client from configuration. Missing credentials surface on the
    /// first request, not here.
    pub fn from_config(config: &Config) -> Result<Self, FlightError> {
        Self::with_token_manager(config, TokenManager::from_config(config))
    }
}

impl<E: TokenExchange> AmadeusClient<E> {
    pub fn with_token_manager(config: &Config, tokens: TokenManager<E>) -> Result<Self, FlightError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FlightError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            max_results: config.max_results,
            tokens,
        })
    }

    /// GET `path` with bearer auth and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout { url: url.clone() }
                } else {
                    UpstreamError::Http {
                        url: url.clone(),
                        source: e,
                    }
                }
            })?;

        let resp = check_response(resp, &url).await?;
        resp.json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode { url, source: e })
    }

    /// A 401 means the cached token went stale early; drop it so the next
    /// user-initiated attempt re-authenticates.
    fn forget_token_on_unauthorized(&self, err: &UpstreamError) {
        if let UpstreamError::Status { status: 401, .. } = err {
            tracing::warn!("Provider returned 401, discarding cached token");
            self.tokens.invalidate();
        }
    }
}

#[async_trait]
impl<E: TokenExchange> TravelApi for AmadeusClient<E> {
    async fn flight_offers(&self, request: &SearchRequest) -> Result<OffersResponse, FlightError> {
        let token = self.tokens.access_token().await?;

        let query = [
            ("originLocationCode", request.origin_code.clone()),
            ("destinationLocationCode", request.destination_code.clone()),
            ("departureDate", request.date.format("%Y-%m-%d").to_string()),
            ("adults", request.adults.to_string()),
            ("currencyCode", self.currency.clone()),
            ("max", self.max_results.to_string()),
        ];

        self.get_json(&token, FLIGHT_OFFERS_PATH, &query)
            .await
            .map_err(|e| {
                self.forget_token_on_unauthorized(&e);
                FlightError::Search(e)
            })
    }

    async fn locations(&self, keyword: &str, limit: u32) -> Result<Vec<RawLocation>, FlightError> {
        let token = self.tokens.access_token().await?;

        let query = [
            ("subType", "CITY,AIRPORT".to_string()),
            ("keyword", keyword.to_string()),
            ("page[limit]", limit.to_string()),
        ];

        let resp: LocationsResponse = self
            .get_json(&token, LOCATIONS_PATH, &query)
            .await
            .map_err(|e| {
                self.forget_token_on_unauthorized(&e);
                FlightError::Lookup(e)
            })?;
        Ok(resp.data)
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, UpstreamError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body: provider_error_detail(&body),
        });
    }
    Ok(resp)
}

/// Provider errors arrive as `{"errors":[{"title":..,"detail":..}]}`;
/// condense them to one line, otherwise keep the raw body.
fn provider_error_detail(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let messages: Vec<String> = parsed
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(|e| e.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| {
                    let title = e.get("title").and_then(|t| t.as_str());
                    let detail = e.get("detail").and_then(|d| d.as_str());
                    match (title, detail) {
                        (Some(t), Some(d)) => Some(format!("{}: {}", t, d)),
                        (Some(t), None) => Some(t.to_string()),
                        (None, Some(d)) => Some(d.to_string()),
                        (None, None) => None,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        body.trim().to_string()
    } else {
        messages.join("; ")
    }
}
