//! Location lookup: free text -> airports and cities
//!
//! Failures never reach the caller; an empty list means "nothing found or
//! the lookup failed", and callers fall back to the static airport set.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::TravelApi;
use crate::models::{search_airports, Location};

/// Keywords shorter than this never reach the network.
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Page size requested from the provider.
pub const PAGE_LIMIT: u32 = 10;

/// Quiet period after the last keystroke before a lookup is sent.
pub const LOOKUP_DEBOUNCE: Duration = Duration::from_millis(300);

// -- Response types for the locations endpoint --

#[derive(Debug, Default, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub data: Vec<RawLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    #[serde(rename = "iataCode")]
    pub iata_code: Option<String>,
    pub name: Option<String>,
    pub address: Option<RawAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAddress {
    #[serde(rename = "cityName")]
    pub city_name: Option<String>,
    #[serde(rename = "countryName")]
    pub country_name: Option<String>,
}

impl RawLocation {
    /// Entries without an IATA code cannot be searched and are dropped.
    fn into_location(self) -> Option<Location> {
        let code = self.iata_code.filter(|c| !c.is_empty())?;
        let (city, country) = match self.address {
            Some(addr) => (addr.city_name, addr.country_name),
            None => (None, None),
        };

        Some(Location {
            city: city.unwrap_or_else(|| code.clone()),
            country: country.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            code,
        })
    }
}

/// Live lookup. Short keywords return empty without a request; provider
/// errors are logged and degrade to an empty list.
pub async fn search_locations<A>(api: &A, keyword: &str) -> Vec<Location>
where
    A: TravelApi + ?Sized,
{
    if keyword.chars().count() < MIN_KEYWORD_CHARS {
        return Vec::new();
    }

    match api.locations(keyword, PAGE_LIMIT).await {
        Ok(raw) => raw.into_iter().filter_map(RawLocation::into_location).collect(),
        Err(e) => {
            tracing::warn!("Location lookup for {:?} failed: {:#}", keyword, e);
            Vec::new()
        }
    }
}

/// Live results when there are any, otherwise the static airport matches.
pub async fn search_locations_or_static<A>(api: &A, keyword: &str, limit: usize) -> Vec<Location>
where
    A: TravelApi + ?Sized,
{
    let live = search_locations(api, keyword).await;
    if !live.is_empty() {
        return live;
    }
    search_airports(keyword, None, limit)
}

/// Delays lookups until typing pauses.
///
/// Each `schedule` aborts the previously scheduled lookup, so only the
/// keyword present after a full quiet period reaches the network.
pub struct LookupDebouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl LookupDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule a lookup for `keyword`; `on_result` receives the keyword and
    /// its results. Keywords below the minimum length only cancel.
    /// Returns whether a lookup was scheduled.
    pub fn schedule<A, F>(&mut self, api: Arc<A>, keyword: String, on_result: F) -> bool
    where
        A: TravelApi + ?Sized + 'static,
        F: FnOnce(String, Vec<Location>) + Send + 'static,
    {
        self.cancel();

        if keyword.chars().count() < MIN_KEYWORD_CHARS {
            return false;
        }

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let results = search_locations(api.as_ref(), &keyword).await;
            on_result(keyword, results);
        }));
        true
    }

    /// Abort the pending lookup, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Default for LookupDebouncer {
    fn default() -> Self {
        Self::new(LOOKUP_DEBOUNCE)
    }
}

impl Drop for LookupDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
