//! Flight-related models

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Departure or arrival point of a whole journey
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub iata: String,
    pub city: String,
    /// Local time of day, "HH:MM"
    pub time: String,
    pub terminal: Option<String>,
}

/// Departure or arrival point of a single leg
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPoint {
    pub iata: String,
    pub time: String,
}

/// One non-stop leg operated by one carrier
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub departure: SegmentPoint,
    pub arrival: SegmentPoint,
    /// Carrier display name (raw carrier code when unknown)
    pub carrier: String,
    /// "{carrierCode} {number}", e.g. "EK 501"
    pub flight_number: String,
    pub duration: String,
}

/// Wait between two consecutive segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layover {
    pub airport: String,
    /// "{hours}h {minutes}m"
    pub duration: String,
    pub duration_minutes: u32,
}

/// A priced outbound itinerary in provider-independent form.
///
/// `stops == segments.len() - 1 == layovers.len()`, and the journey
/// endpoints are the first segment's departure and the last segment's
/// arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub airline_logo: String,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    /// Lowercased ISO-8601 period without the "PT" prefix, e.g. "5h30m"
    pub duration: String,
    pub stops: u32,
    pub price: f64,
    pub currency: String,
    pub date: NaiveDate,
    pub layovers: Vec<Layover>,
    pub segments: Vec<Segment>,
}

impl Flight {
    /// "Non-stop", "1 stop", "2 stops"
    pub fn stops_label(&self) -> String {
        stops_label(self.stops)
    }
}

pub fn stops_label(stops: u32) -> String {
    match stops {
        0 => "Non-stop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}

/// User-chosen constraints on the displayed result list
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Inclusive price ceiling
    pub max_price: f64,
    /// Exact stop count, `None` = any
    pub stops: Option<u32>,
    /// Accepted airline names, empty = any
    pub airlines: BTreeSet<String>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::with_max_price(2000.0)
    }
}

impl FilterParams {
    pub fn with_max_price(max_price: f64) -> Self {
        Self {
            max_price,
            stops: None,
            airlines: BTreeSet::new(),
        }
    }

    /// Add the airline if absent, remove it if present.
    pub fn toggle_airline(&mut self, airline: &str) {
        if !self.airlines.remove(airline) {
            self.airlines.insert(airline.to_string());
        }
    }

    pub fn matches(&self, flight: &Flight) -> bool {
        let matches_price = flight.price <= self.max_price;
        let matches_stops = self.stops.map_or(true, |s| flight.stops == s);
        let matches_airline = self.airlines.is_empty() || self.airlines.contains(&flight.airline);
        matches_price && matches_stops && matches_airline
    }
}

/// Result ordering
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Cheapest,
    Fastest,
}

impl SortKey {
    pub fn toggled(self) -> Self {
        match self {
            SortKey::Cheapest => SortKey::Fastest,
            SortKey::Fastest => SortKey::Cheapest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Cheapest => "Cheapest",
            SortKey::Fastest => "Fastest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Cheapest => write!(f, "cheapest"),
            SortKey::Fastest => write!(f, "fastest"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cheapest" | "price" => Ok(SortKey::Cheapest),
            "fastest" | "duration" => Ok(SortKey::Fastest),
            other => Err(format!("unknown sort key '{}': use cheapest or fastest", other)),
        }
    }
}
