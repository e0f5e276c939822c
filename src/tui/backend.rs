//! Async backend: bridges the TUI event loop with provider calls.
//!
//! The TUI sends `BackendCommand` values over an mpsc channel; a tokio task
//! executes them and answers with `BackendResponse` values. Location
//! lookups pass through one debouncer per form field.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::locations::LookupDebouncer;
use crate::api::offers::{search_flights, SearchRequest};
use crate::api::TravelApi;
use crate::error::FlightError;
use crate::models::{Flight, Location};

/// Which form field a lookup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Origin,
    Destination,
}

/// Commands sent from the TUI event loop to the backend.
#[derive(Debug)]
pub enum BackendCommand {
    Search(SearchRequest),
    LookupLocations { field: Field, keyword: String },
    CancelLookup(Field),
}

/// Responses from the backend to the TUI.
#[derive(Debug)]
pub enum BackendResponse {
    Flights {
        request: SearchRequest,
        result: Result<Vec<Flight>, FlightError>,
    },
    Locations {
        field: Field,
        keyword: String,
        results: Vec<Location>,
    },
}

/// Handle for the TUI side of the channel pair.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Spawn the backend task around `api`.
    pub fn start(api: Arc<dyn TravelApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(api, cmd_rx, resp_tx));

        Self { cmd_tx, resp_rx }
    }

    pub fn send(&self, cmd: BackendCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("Backend channel closed -- command dropped");
        }
    }

    /// Next response; `None` once the backend task has exited.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }
}

async fn backend_loop(
    api: Arc<dyn TravelApi>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    let mut origin_lookup = LookupDebouncer::default();
    let mut destination_lookup = LookupDebouncer::default();

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            BackendCommand::Search(request) => {
                let api = Arc::clone(&api);
                let resp_tx = resp_tx.clone();
                tokio::spawn(async move {
                    let result = search_flights(api.as_ref(), &request).await;
                    if let Err(ref e) = result {
                        tracing::error!("Search failed: {:#}", e);
                    }
                    let _ = resp_tx.send(BackendResponse::Flights { request, result });
                });
            }
            BackendCommand::LookupLocations { field, keyword } => {
                let debouncer = match field {
                    Field::Origin => &mut origin_lookup,
                    Field::Destination => &mut destination_lookup,
                };
                let resp_tx = resp_tx.clone();
                debouncer.schedule(Arc::clone(&api), keyword, move |keyword, results| {
                    let _ = resp_tx.send(BackendResponse::Locations {
                        field,
                        keyword,
                        results,
                    });
                });
            }
            BackendCommand::CancelLookup(field) => match field {
                Field::Origin => origin_lookup.cancel(),
                Field::Destination => destination_lookup.cancel(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_search_round_trip() {
        let api = Arc::new(FakeApi::with_offers(json!({
            "data": [{
                "id": "7",
                "itineraries": [{
                    "duration": "PT3H",
                    "segments": [{
                        "departure": { "iataCode": "BOM", "at": "2026-01-20T08:00:00" },
                        "arrival": { "iataCode": "DXB", "at": "2026-01-20T09:30:00" },
                        "carrierCode": "AI",
                        "number": "983",
                        "duration": "PT3H"
                    }]
                }],
                "price": { "currency": "USD", "total": "289.00" }
            }],
            "dictionaries": { "carriers": { "AI": "AIR INDIA" } }
        })));
        let mut backend = Backend::start(api);

        let request = SearchRequest::new("BOM", "DXB", NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(), 1);
        backend.send(BackendCommand::Search(request.clone()));

        match backend.recv().await {
            Some(BackendResponse::Flights { request: echoed, result }) => {
                assert_eq!(echoed, request);
                let flights = tokio_test::assert_ok!(result);
                assert_eq!(flights[0].airline, "AIR INDIA");
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_error_is_forwarded() {
        let mut backend = Backend::start(Arc::new(FakeApi::failing_offers(502)));

        let request = SearchRequest::new("BOM", "DXB", NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(), 1);
        backend.send(BackendCommand::Search(request));

        match backend.recv().await {
            Some(BackendResponse::Flights { result, .. }) => {
                let err = tokio_test::assert_err!(result);
                assert!(matches!(err, FlightError::Search(_)));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_are_debounced_per_field() {
        let api = Arc::new(FakeApi::with_locations(json!({
            "data": [{ "iataCode": "LHR", "name": "HEATHROW", "address": { "cityName": "LONDON" } }]
        })));
        let mut backend = Backend::start(api.clone());

        for keyword in ["lo", "lon", "lond"] {
            backend.send(BackendCommand::LookupLocations {
                field: Field::Destination,
                keyword: keyword.to_string(),
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        backend.send(BackendCommand::LookupLocations {
            field: Field::Origin,
            keyword: "mu".to_string(),
        });

        let mut seen = Vec::new();
        for _ in 0..2 {
            match backend.recv().await {
                Some(BackendResponse::Locations { field, keyword, results }) => {
                    assert_eq!(results[0].code, "LHR");
                    seen.push((field, keyword));
                }
                other => panic!("unexpected response: {:?}", other),
            }
        }
        seen.sort_by_key(|(_, kw)| kw.clone());

        assert_eq!(
            seen,
            vec![(Field::Destination, "lond".to_string()), (Field::Origin, "mu".to_string())]
        );
        assert_eq!(api.location_calls(), 2);
    }
}
