//! Offer normalizer: the only place that knows the provider's offer shape.
//!
//! `normalize_offer` turns one flight-offer object from the search endpoint
//! into a [`Flight`]. Only the first (outbound) itinerary is read.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::NormalizeError;
use crate::models::{airport_by_code, Endpoint, Flight, Layover, Segment, SegmentPoint};

const AIRLINE_LOGO_BASE: &str = "https://www.gstatic.com/flights/airline_logos/70px";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// -- Response types for the flight-offers endpoint --

#[derive(Debug, Default, Deserialize)]
pub struct OffersResponse {
    #[serde(default)]
    pub data: Vec<RawOffer>,
    #[serde(default)]
    pub dictionaries: Dictionaries,
}

#[derive(Debug, Default, Deserialize)]
pub struct Dictionaries {
    /// Carrier code -> display name
    #[serde(default)]
    pub carriers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct RawOffer {
    pub id: String,
    #[serde(default)]
    pub itineraries: Vec<RawItinerary>,
    pub price: RawPrice,
}

#[derive(Debug, Deserialize)]
pub struct RawItinerary {
    pub duration: String,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
pub struct RawSegment {
    pub departure: RawEndpoint,
    pub arrival: RawEndpoint,
    #[serde(rename = "carrierCode")]
    pub carrier_code: String,
    pub number: String,
    pub duration: String,
}

#[derive(Debug, Deserialize)]
pub struct RawEndpoint {
    #[serde(rename = "iataCode")]
    pub iata_code: String,
    pub terminal: Option<String>,
    /// Local timestamp, "2026-01-20T10:15:00"
    pub at: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPrice {
    pub currency: String,
    /// Decimal string, "546.70"
    pub total: String,
}

/// "PT5H30M" -> "5h30m": drop the leading period designator and lowercase
/// the unit letters.
pub fn format_iso_duration(duration: &str) -> String {
    duration
        .strip_prefix("PT")
        .unwrap_or(duration)
        .to_lowercase()
}

/// Minutes rendered as "{hours}h {minutes}m".
pub fn format_minutes(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Translate one provider offer into a `Flight`.
pub fn normalize_offer(
    offer: &RawOffer,
    dictionaries: &Dictionaries,
) -> Result<Flight, NormalizeError> {
    let offer_id = offer.id.as_str();

    let itinerary = offer
        .itineraries
        .first()
        .ok_or_else(|| NormalizeError::NoItinerary {
            offer_id: offer_id.to_string(),
        })?;

    let (first, last) = match (itinerary.segments.first(), itinerary.segments.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(NormalizeError::NoSegments {
                offer_id: offer_id.to_string(),
            })
        }
    };

    let layovers = itinerary
        .segments
        .windows(2)
        .map(|pair| layover_between(offer_id, &pair[0], &pair[1]))
        .collect::<Result<Vec<_>, _>>()?;

    let segments = itinerary
        .segments
        .iter()
        .map(|seg| display_segment(offer_id, seg, dictionaries))
        .collect::<Result<Vec<_>, _>>()?;

    let price = parse_price(offer_id, &offer.price.total)?;
    let date = parse_timestamp(offer_id, &first.departure.at)?.date();

    Ok(Flight {
        id: offer.id.clone(),
        airline: carrier_name(dictionaries, &first.carrier_code),
        airline_logo: format!("{}/{}.png", AIRLINE_LOGO_BASE, first.carrier_code),
        departure: journey_endpoint(offer_id, &first.departure)?,
        arrival: journey_endpoint(offer_id, &last.arrival)?,
        duration: format_iso_duration(&itinerary.duration),
        stops: layovers.len() as u32,
        price,
        currency: offer.price.currency.clone(),
        date,
        layovers,
        segments,
    })
}

/// Dictionary lookup that degrades to the raw code.
fn carrier_name(dictionaries: &Dictionaries, code: &str) -> String {
    dictionaries
        .carriers
        .get(code)
        .cloned()
        .unwrap_or_else(|| code.to_string())
}

fn parse_timestamp(offer_id: &str, at: &str) -> Result<NaiveDateTime, NormalizeError> {
    NaiveDateTime::parse_from_str(at, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M"))
        .map_err(|_| NormalizeError::InvalidTimestamp {
            offer_id: offer_id.to_string(),
            value: at.to_string(),
        })
}

/// "HH:MM" taken from the part after the date/time separator.
fn time_of_day(offer_id: &str, at: &str) -> Result<String, NormalizeError> {
    at.split_once('T')
        .and_then(|(_, time)| time.get(..5))
        .map(String::from)
        .ok_or_else(|| NormalizeError::InvalidTimestamp {
            offer_id: offer_id.to_string(),
            value: at.to_string(),
        })
}

fn parse_price(offer_id: &str, total: &str) -> Result<f64, NormalizeError> {
    total
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| NormalizeError::InvalidPrice {
            offer_id: offer_id.to_string(),
            value: total.to_string(),
        })
}

fn layover_between(
    offer_id: &str,
    inbound: &RawSegment,
    outbound: &RawSegment,
) -> Result<Layover, NormalizeError> {
    let arrived = parse_timestamp(offer_id, &inbound.arrival.at)?;
    let departs = parse_timestamp(offer_id, &outbound.departure.at)?;
    let minutes = (departs - arrived).num_minutes();

    let duration_minutes = u32::try_from(minutes).map_err(|_| NormalizeError::NegativeLayover {
        offer_id: offer_id.to_string(),
        airport: inbound.arrival.iata_code.clone(),
        minutes,
    })?;

    Ok(Layover {
        airport: inbound.arrival.iata_code.clone(),
        duration: format_minutes(duration_minutes),
        duration_minutes,
    })
}

fn display_segment(
    offer_id: &str,
    seg: &RawSegment,
    dictionaries: &Dictionaries,
) -> Result<Segment, NormalizeError> {
    Ok(Segment {
        departure: SegmentPoint {
            iata: seg.departure.iata_code.clone(),
            time: time_of_day(offer_id, &seg.departure.at)?,
        },
        arrival: SegmentPoint {
            iata: seg.arrival.iata_code.clone(),
            time: time_of_day(offer_id, &seg.arrival.at)?,
        },
        carrier: carrier_name(dictionaries, &seg.carrier_code),
        flight_number: format!("{} {}", seg.carrier_code, seg.number),
        duration: format_iso_duration(&seg.duration),
    })
}

fn journey_endpoint(offer_id: &str, point: &RawEndpoint) -> Result<Endpoint, NormalizeError> {
    // The offer carries no city names; use the reference set when it knows the code.
    let city = airport_by_code(&point.iata_code)
        .map(|a| a.city.to_string())
        .unwrap_or_else(|| point.iata_code.clone());

    Ok(Endpoint {
        iata: point.iata_code.clone(),
        city,
        time: time_of_day(offer_id, &point.at)?,
        terminal: point.terminal.clone(),
    })
}
