//! Error taxonomy shared by the provider client, the search gateway and the UI.
//!
//! Each variant maps to a different recovery action in the UI.

use thiserror::Error;

/// Errors surfaced to the UI boundary.
#[derive(Error, Debug)]
pub enum FlightError {
    /// Credentials are missing or still set to a placeholder value.
    #[error("Amadeus API credentials missing: {0}")]
    Configuration(String),

    /// The provider rejected the credential exchange.
    #[error("Failed to authenticate with the Amadeus API: {0}")]
    Authentication(String),

    /// The search request itself is unusable (bad IATA code, zero travelers).
    #[error("Invalid search: {0}")]
    InvalidQuery(String),

    /// The flight-offer query failed upstream.
    #[error("Flight search failed: {0}")]
    Search(#[source] UpstreamError),

    /// The provider answered, but an offer could not be normalized.
    #[error("Provider returned a malformed offer: {0}")]
    MalformedOffer(#[from] NormalizeError),

    /// Location lookup failed. Swallowed by `search_locations`, never shown.
    #[error("Location lookup failed: {0}")]
    Lookup(#[source] UpstreamError),
}

impl FlightError {
    /// One-line recovery hint for the error banner.
    pub fn guidance(&self) -> &'static str {
        match self {
            FlightError::Configuration(_) => {
                "Set AMADEUS_CLIENT_ID and AMADEUS_CLIENT_SECRET, or run 'skybound config --client-id .. --client-secret ..'."
            }
            FlightError::Authentication(_) => {
                "The provider rejected the configured credentials. Check the client secret."
            }
            FlightError::InvalidQuery(_) => "Pick origin and destination from the suggestions.",
            FlightError::Search(_) | FlightError::MalformedOffer(_) => {
                "Go back and search again."
            }
            FlightError::Lookup(_) => "Suggestions are unavailable; type a city or IATA code.",
        }
    }
}

/// Transport-level failure underneath a search or lookup.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Violations found while translating a provider offer into a `Flight`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("offer {offer_id} has no itinerary")]
    NoItinerary { offer_id: String },

    #[error("offer {offer_id} has an itinerary without segments")]
    NoSegments { offer_id: String },

    #[error("offer {offer_id} has non-numeric price {value:?}")]
    InvalidPrice { offer_id: String, value: String },

    #[error("offer {offer_id} has unparsable timestamp {value:?}")]
    InvalidTimestamp { offer_id: String, value: String },

    #[error("offer {offer_id} has a negative layover of {minutes} minutes at {airport}")]
    NegativeLayover {
        offer_id: String,
        airport: String,
        minutes: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_and_authentication_are_distinct() {
        let config = FlightError::Configuration("client id not set".into());
        let auth = FlightError::Authentication("invalid_client".into());

        assert_ne!(config.guidance(), auth.guidance());
        assert!(config.to_string().contains("credentials missing"));
        assert!(auth.to_string().contains("authenticate"));
    }

    #[test]
    fn test_search_error_keeps_upstream_cause() {
        let err = FlightError::Search(UpstreamError::Status {
            status: 500,
            url: "https://test.api.amadeus.com/v2/shopping/flight-offers".into(),
            body: "internal".into(),
        });

        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("HTTP 500 from https://test.api.amadeus.com/v2/shopping/flight-offers: internal")
        );
    }
}
