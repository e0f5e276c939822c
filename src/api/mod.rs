//! Travel provider access: client, search gateway, normalizer, lookup
//!
//! Everything above this module talks to the provider through [`TravelApi`],
//! which keeps the HTTP client swappable in tests.

pub mod client;
pub mod locations;
pub mod normalize;
pub mod offers;

#[cfg(test)]
pub mod testing;

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::error::FlightError;
use crate::filter::{available_airlines, cheapest, derive_view};
use crate::models::{search_airports, FilterParams, Flight, Location, SortKey, AIRPORTS};
use client::AmadeusClient;
use locations::RawLocation;
use normalize::OffersResponse;
use offers::{resolve_code, search_flights, SearchRequest};

/// Provider operations the gateway and lookup depend on.
#[async_trait]
pub trait TravelApi: Send + Sync {
    /// Raw flight-offer response for one outbound search.
    async fn flight_offers(&self, request: &SearchRequest) -> Result<OffersResponse, FlightError>;

    /// Raw city/airport matches for a keyword.
    async fn locations(&self, keyword: &str, limit: u32) -> Result<Vec<RawLocation>, FlightError>;
}

/// Options of the `search` command after parsing.
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub adults: u8,
    pub max_price: Option<f64>,
    pub stops: Option<u32>,
    pub airlines: Vec<String>,
    pub sort: SortKey,
}

/// Run a search, apply filters and print the result list (prints to stdout).
pub async fn search(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let client = AmadeusClient::from_config(&config)?;

    let request = SearchRequest::new(
        &resolve_code(&args.from),
        &resolve_code(&args.to),
        args.date,
        args.adults,
    );

    let flights = match search_flights(&client, &request).await {
        Ok(flights) => flights,
        Err(e) => {
            let hint = e.guidance();
            return Err(anyhow::Error::new(e).context(hint));
        }
    };

    let mut filters = FilterParams::with_max_price(args.max_price.unwrap_or(config.default_max_price));
    filters.stops = args.stops;
    filters.airlines = airline_selection(&args.airlines, &available_airlines(&flights));

    let view = derive_view(&flights, &filters, args.sort);
    print_flights(&request, &view, flights.len(), args.sort);
    Ok(())
}

fn print_flights(request: &SearchRequest, view: &[Flight], total: usize, sort: SortKey) {
    println!(
        "\n{} -> {} on {} ({} traveler{})",
        request.origin_code,
        request.destination_code,
        request.date.format("%a %d %b %Y"),
        request.adults,
        if request.adults == 1 { "" } else { "s" }
    );
    println!("{:-<72}", "");

    if view.is_empty() {
        if total == 0 {
            println!("  (no flights found)");
        } else {
            println!("  No flights match your filters ({} hidden)", total);
        }
        return;
    }

    println!("{} Flights found, sorted by {}", view.len(), sort.label().to_lowercase());
    if let Some(best) = cheapest(view) {
        println!("From {:.2} {}", best.price, best.currency);
    }
    println!();

    for flight in view {
        println!(
            "{:<24} {} {} -> {} {}  {:>8}  {:<9} {:>10.2} {}",
            flight.airline,
            flight.departure.time,
            flight.departure.iata,
            flight.arrival.time,
            flight.arrival.iata,
            flight.duration,
            flight.stops_label(),
            flight.price,
            flight.currency
        );
        for layover in &flight.layovers {
            println!("    layover {} at {}", layover.duration, layover.airport);
        }
    }
}

/// Live location lookup with static fallback (prints to stdout).
pub async fn lookup_locations(keyword: &str) -> Result<()> {
    let config = Config::load()?;
    let client = AmadeusClient::from_config(&config)?;

    let results =
        locations::search_locations_or_static(&client, keyword, locations::PAGE_LIMIT as usize).await;
    print_locations(&results);
    Ok(())
}

/// Search the built-in airport list (prints to stdout).
pub fn list_airports(query: Option<&str>) -> Result<()> {
    let results = match query {
        Some(q) => search_airports(q, None, AIRPORTS.len()),
        None => AIRPORTS.iter().map(|a| a.to_location()).collect(),
    };
    print_locations(&results);
    Ok(())
}

fn print_locations(results: &[Location]) {
    println!("\nLocations:");
    println!("{:-<60}", "");

    if results.is_empty() {
        println!("  (no matches)");
        return;
    }

    for loc in results {
        println!("{:<5} {:<16} {}", loc.code, loc.city, loc.country);
        if !loc.name.is_empty() {
            println!("      {}", loc.name);
        }
    }
}

/// Map `--airline` values onto the carrier names present in the results.
/// Matching ignores case; repeated names select once. A name matching no
/// carrier is kept as typed, so it filters everything out.
fn airline_selection(requested: &[String], present: &[String]) -> BTreeSet<String> {
    requested
        .iter()
        .map(|wanted| {
            let wanted = wanted.trim();
            match present.iter().find(|name| name.eq_ignore_ascii_case(wanted)) {
                Some(name) => name.clone(),
                None => {
                    tracing::warn!("No offer is operated by airline '{}'", wanted);
                    wanted.to_string()
                }
            }
        })
        .collect()
}

/// Parse a YYYY-MM-DD departure date from the command line.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{}' is not a date in YYYY-MM-DD form", value))
}
