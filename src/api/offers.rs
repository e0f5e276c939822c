//! Search gateway: token + offer query + normalization
//!
//! The only path from the UI to the flight-offer endpoint. Errors pass
//! through unchanged; the gateway never substitutes cached or mock data.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::normalize::normalize_offer;
use super::TravelApi;
use crate::error::FlightError;
use crate::models::Flight;

static IATA_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]{3})\)").expect("valid IATA regex"));

/// Parameters of one outbound offer search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub origin_code: String,
    pub destination_code: String,
    pub date: NaiveDate,
    pub adults: u8,
}

impl SearchRequest {
    pub fn new(origin_code: &str, destination_code: &str, date: NaiveDate, adults: u8) -> Self {
        Self {
            origin_code: origin_code.to_string(),
            destination_code: destination_code.to_string(),
            date,
            adults,
        }
    }

    /// The gateway's only validation: both codes are three uppercase
    /// letters and at least one traveler is searched for.
    pub fn validate(&self) -> Result<(), FlightError> {
        for (label, code) in [("origin", &self.origin_code), ("destination", &self.destination_code)] {
            if !is_iata_code(code) {
                return Err(FlightError::InvalidQuery(format!(
                    "{} must be a 3-letter IATA code, got {:?}",
                    label, code
                )));
            }
        }
        if self.adults == 0 {
            return Err(FlightError::InvalidQuery(
                "at least one traveler is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_iata_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Code inside a "City Name (XXX)" display string, or "" when absent.
pub fn extract_iata_code(display: &str) -> String {
    IATA_IN_PARENS
        .captures(display)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Like `extract_iata_code`, but also accepts a bare code ("bom", "DXB").
pub fn resolve_code(input: &str) -> String {
    let code = extract_iata_code(input);
    if !code.is_empty() {
        return code;
    }
    let trimmed = input.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return trimmed.to_ascii_uppercase();
    }
    String::new()
}

/// Run an offer search and normalize every returned offer.
pub async fn search_flights<A>(api: &A, request: &SearchRequest) -> Result<Vec<Flight>, FlightError>
where
    A: TravelApi + ?Sized,
{
    request.validate()?;

    tracing::info!(
        "Searching {} -> {} on {} for {} traveler(s)",
        request.origin_code,
        request.destination_code,
        request.date,
        request.adults
    );

    let response = api.flight_offers(request).await?;
    let flights = response
        .data
        .iter()
        .map(|offer| normalize_offer(offer, &response.dictionaries))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("{} offers returned", flights.len());
    Ok(flights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use serde_json::json;

    fn request() -> SearchRequest {
        SearchRequest::new("BOM", "DXB", NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(), 2)
    }

    fn offer_json(id: &str, carrier: &str, total: &str) -> serde_json::Value {
        json!({
            "id": id,
            "itineraries": [{
                "duration": "PT3H15M",
                "segments": [{
                    "departure": { "iataCode": "BOM", "at": "2026-01-20T10:15:00" },
                    "arrival": { "iataCode": "DXB", "at": "2026-01-20T12:00:00" },
                    "carrierCode": carrier,
                    "number": "501",
                    "duration": "PT3H15M"
                }]
            }],
            "price": { "currency": "USD", "total": total }
        })
    }

    #[test]
    fn test_extract_iata_code() {
        assert_eq!(extract_iata_code("Mumbai (BOM)"), "BOM");
        assert_eq!(extract_iata_code("New York (JFK)"), "JFK");
        assert_eq!(extract_iata_code("no code here"), "");
        assert_eq!(extract_iata_code("Mumbai (bom)"), "");
        assert_eq!(extract_iata_code("Mumbai (BOMB)"), "");
        assert_eq!(extract_iata_code(""), "");
    }

    #[test]
    fn test_resolve_code_accepts_bare_codes() {
        assert_eq!(resolve_code("Dubai (DXB)"), "DXB");
        assert_eq!(resolve_code(" lhr "), "LHR");
        assert_eq!(resolve_code("London"), "");
    }

    #[test]
    fn test_validate_rejects_bad_codes() {
        let mut req = request();
        req.origin_code = String::new();
        assert!(matches!(req.validate(), Err(FlightError::InvalidQuery(_))));

        let mut req = request();
        req.destination_code = "dxb".into();
        assert!(matches!(req.validate(), Err(FlightError::InvalidQuery(_))));

        let mut req = request();
        req.adults = 0;
        assert!(matches!(req.validate(), Err(FlightError::InvalidQuery(_))));

        assert!(request().validate().is_ok());
    }

    #[tokio::test]
    async fn test_search_normalizes_every_offer() {
        let api = FakeApi::with_offers(json!({
            "data": [offer_json("1", "EK", "420.50"), offer_json("2", "QR", "380.00")],
            "dictionaries": { "carriers": { "EK": "EMIRATES" } }
        }));

        let flights = search_flights(&api, &request()).await.unwrap();
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].airline, "EMIRATES");
        assert_eq!(flights[1].airline, "QR");
        assert_eq!(api.offer_calls(), 1);
        assert_eq!(api.last_request().unwrap().adults, 2);
    }

    #[tokio::test]
    async fn test_invalid_request_skips_network() {
        let api = FakeApi::with_offers(json!({ "data": [] }));
        let mut req = request();
        req.origin_code = extract_iata_code("Mumbai");

        assert!(search_flights(&api, &req).await.is_err());
        assert_eq!(api.offer_calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_is_surfaced_unchanged() {
        let api = FakeApi::failing_offers(500);

        let err = search_flights(&api, &request()).await.unwrap_err();
        assert!(matches!(
            err,
            FlightError::Search(crate::error::UpstreamError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_offer_fails_the_search() {
        let api = FakeApi::with_offers(json!({
            "data": [offer_json("1", "EK", "420.50"), offer_json("2", "EK", "free")]
        }));

        let err = search_flights(&api, &request()).await.unwrap_err();
        assert!(matches!(err, FlightError::MalformedOffer(_)));
    }
}
