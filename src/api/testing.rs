//! In-memory `TravelApi` for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::locations::{LocationsResponse, RawLocation};
use super::normalize::OffersResponse;
use super::offers::SearchRequest;
use super::TravelApi;
use crate::error::{FlightError, UpstreamError};

enum Reply {
    Json(serde_json::Value),
    Status(u16),
}

/// Serves canned JSON (or a canned HTTP status) and records every call.
pub struct FakeApi {
    offers: Reply,
    locations: Reply,
    offer_calls: AtomicUsize,
    location_calls: AtomicUsize,
    last_request: Mutex<Option<SearchRequest>>,
    last_keyword: Mutex<Option<String>>,
}

impl FakeApi {
    fn new(offers: Reply, locations: Reply) -> Self {
        Self {
            offers,
            locations,
            offer_calls: AtomicUsize::new(0),
            location_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            last_keyword: Mutex::new(None),
        }
    }

    pub fn with_offers(body: serde_json::Value) -> Self {
        Self::new(Reply::Json(body), Reply::Json(serde_json::json!({ "data": [] })))
    }

    pub fn failing_offers(status: u16) -> Self {
        Self::new(Reply::Status(status), Reply::Json(serde_json::json!({ "data": [] })))
    }

    pub fn with_locations(body: serde_json::Value) -> Self {
        Self::new(Reply::Json(serde_json::json!({ "data": [] })), Reply::Json(body))
    }

    pub fn failing_locations(status: u16) -> Self {
        Self::new(Reply::Json(serde_json::json!({ "data": [] })), Reply::Status(status))
    }

    pub fn offer_calls(&self) -> usize {
        self.offer_calls.load(Ordering::SeqCst)
    }

    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SearchRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_keyword(&self) -> Option<String> {
        self.last_keyword.lock().unwrap().clone()
    }
}

fn status_error(status: u16, path: &str) -> UpstreamError {
    UpstreamError::Status {
        status,
        url: format!("https://test.api.amadeus.com{}", path),
        body: "canned failure".to_string(),
    }
}

#[async_trait]
impl TravelApi for FakeApi {
    async fn flight_offers(&self, request: &SearchRequest) -> Result<OffersResponse, FlightError> {
        self.offer_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.offers {
            Reply::Json(body) => Ok(serde_json::from_value(body.clone()).unwrap()),
            Reply::Status(status) => Err(FlightError::Search(status_error(
                *status,
                "/v2/shopping/flight-offers",
            ))),
        }
    }

    async fn locations(&self, keyword: &str, limit: u32) -> Result<Vec<RawLocation>, FlightError> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_keyword.lock().unwrap() = Some(keyword.to_string());

        match &self.locations {
            Reply::Json(body) => {
                let resp: LocationsResponse = serde_json::from_value(body.clone()).unwrap();
                Ok(resp.data.into_iter().take(limit as usize).collect())
            }
            Reply::Status(status) => Err(FlightError::Lookup(status_error(
                *status,
                "/v1/reference-data/locations",
            ))),
        }
    }
}
