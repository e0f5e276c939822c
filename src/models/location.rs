//! Airport and city reference data


/// An airport or city a search can start or end at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub code: String,
    pub city: String,
    pub country: String,
    pub name: String,
}

impl Location {
    /// "City (XXX)", the form `extract_iata_code` parses back.
    pub fn display_value(&self) -> String {
        format!("{} ({})", self.city, self.code)
    }
}

/// Static airport entry (compile-time reference set)
#[derive(Debug, Clone, Copy)]
pub struct Airport {
    pub code: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub name: &'static str,
}

impl Airport {
    pub fn to_location(&self) -> Location {
        Location {
            code: self.code.to_string(),
            city: self.city.to_string(),
            country: self.country.to_string(),
            name: self.name.to_string(),
        }
    }
}

/// Offline fallback for location lookup and the initial autocomplete list.
pub const AIRPORTS: &[Airport] = &[
    Airport { code: "BOM", city: "Mumbai", country: "India", name: "Chhatrapati Shivaji Maharaj" },
    Airport { code: "DEL", city: "Delhi", country: "India", name: "Indira Gandhi International" },
    Airport { code: "DXB", city: "Dubai", country: "UAE", name: "Dubai International" },
    Airport { code: "LHR", city: "London", country: "United Kingdom", name: "Heathrow Airport" },
    Airport { code: "LGW", city: "London", country: "United Kingdom", name: "Gatwick Airport" },
    Airport { code: "STN", city: "London", country: "United Kingdom", name: "Stansted Airport" },
    Airport { code: "JFK", city: "New York", country: "USA", name: "John F. Kennedy" },
    Airport { code: "EWR", city: "New York", country: "USA", name: "Newark Liberty" },
    Airport { code: "SIN", city: "Singapore", country: "Singapore", name: "Changi Airport" },
    Airport { code: "CDG", city: "Paris", country: "France", name: "Charles de Gaulle" },
    Airport { code: "HND", city: "Tokyo", country: "Japan", name: "Haneda Airport" },
    Airport { code: "NRT", city: "Tokyo", country: "Japan", name: "Narita Airport" },
];

/// Maximum suggestions shown by the autocomplete dropdown.
pub const AUTOCOMPLETE_LIMIT: usize = 6;

pub fn airport_by_code(code: &str) -> Option<&'static Airport> {
    AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(code))
}

/// Static airports whose city, code or name contains `query`
/// (case-insensitive), skipping the one whose display value equals
/// `exclude` (the airport already chosen in the other field).
pub fn search_airports(query: &str, exclude: Option<&str>, limit: usize) -> Vec<Location> {
    let query = query.trim().to_lowercase();

    AIRPORTS
        .iter()
        .filter(|a| {
            a.city.to_lowercase().contains(&query)
                || a.code.to_lowercase().contains(&query)
                || a.name.to_lowercase().contains(&query)
        })
        .map(Airport::to_location)
        .filter(|loc| exclude.map_or(true, |ex| loc.display_value() != ex))
        .take(limit)
        .collect()
}
