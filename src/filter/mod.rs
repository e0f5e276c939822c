//! Filter/sort engine
//!
//! `derive_view` is recomputed from scratch whenever results, filters or the
//! sort key change. Result sets are capped at a few hundred offers, so no
//! memoization is kept.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::models::{FilterParams, Flight, SortKey};

static HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*h").expect("valid hours regex"));
static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*m").expect("valid minutes regex"));

/// Filtered and sorted copy of `flights`. The input is left untouched and
/// equal keys keep their input order.
pub fn derive_view(flights: &[Flight], filters: &FilterParams, sort_by: SortKey) -> Vec<Flight> {
    let mut view: Vec<Flight> = flights.iter().filter(|f| filters.matches(f)).cloned().collect();

    match sort_by {
        SortKey::Cheapest => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::Fastest => view.sort_by_key(|f| parse_duration_minutes(&f.duration)),
    }

    view
}

/// Total minutes of "5h30m", "2h 30m", "45m" or "11h". Missing parts count
/// as zero.
pub fn parse_duration_minutes(duration: &str) -> u32 {
    let capture = |re: &Regex| -> u32 {
        re.captures(duration)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    capture(&HOURS)
        .saturating_mul(60)
        .saturating_add(capture(&MINUTES))
}

/// Unique airline names in first-seen order, for the airline checkboxes.
pub fn available_airlines(flights: &[Flight]) -> Vec<String> {
    let mut airlines: Vec<String> = Vec::new();
    for flight in flights {
        if !airlines.iter().any(|a| a == &flight.airline) {
            airlines.push(flight.airline.clone());
        }
    }
    airlines
}

/// One bar of the price distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl PriceBucket {
    pub fn label(&self) -> String {
        format!("{:.0}", self.lower)
    }
}

/// Split the price range of `flights` into `buckets` equal-width ranges.
/// The last range is closed so the most expensive flight is counted.
pub fn price_buckets(flights: &[Flight], buckets: usize) -> Vec<PriceBucket> {
    if flights.is_empty() || buckets == 0 {
        return Vec::new();
    }

    let min = flights.iter().map(|f| f.price).fold(f64::INFINITY, f64::min);
    let max = flights.iter().map(|f| f.price).fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![PriceBucket {
            lower: min,
            upper: max,
            count: flights.len(),
        }];
    }

    let width = (max - min) / buckets as f64;
    let mut result: Vec<PriceBucket> = (0..buckets)
        .map(|i| PriceBucket {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for flight in flights {
        let idx = (((flight.price - min) / width) as usize).min(buckets - 1);
        result[idx].count += 1;
    }

    result
}

/// Cheapest price in the list, used for the "from" summary line.
pub fn cheapest(flights: &[Flight]) -> Option<&Flight> {
    flights
        .iter()
        .min_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
}
