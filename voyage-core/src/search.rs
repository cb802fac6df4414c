use serde::{Deserialize, Serialize};

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderTag {
    Amadeus,
    BookingCom,
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderTag::Amadeus => write!(f, "AMADEUS"),
            ProviderTag::BookingCom => write!(f, "BOOKING_COM"),
        }
    }
}

/// A city/airport entry normalized from a provider location response or the
/// static fallback tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedDestination {
    pub id: String,
    pub display_name: String,
    pub iata_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedFlightOffer {
    pub id: String,
    pub departure_time: chrono::NaiveDateTime,
    pub arrival_time: chrono::NaiveDateTime,
    pub price: f64,
    pub available_seats: i32,
    pub origin_code: String,
    pub destination_code: String,
    pub airline: String,
    pub flight_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedHotelOffer {
    pub id: String,
    pub name: String,
    pub price_per_night: f64,
    pub address: String,
    pub star_rating: i32,
    pub image_url: String,
    pub provider: ProviderTag,
}

/// Search result wrapper that distinguishes "no results" from "upstream
/// failed". Upstream errors are absorbed into a degraded outcome so search
/// endpoints stay available when a vendor is down.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome<T> {
    pub items: Vec<T>,
    pub degraded: bool,
}

impl<T> SearchOutcome<T> {
    pub fn ok(items: Vec<T>) -> Self {
        Self { items, degraded: false }
    }

    /// Empty result produced because the upstream call failed.
    pub fn degraded() -> Self {
        Self { items: Vec::new(), degraded: true }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_outcome_is_empty() {
        let outcome: SearchOutcome<NormalizedDestination> = SearchOutcome::degraded();
        assert!(outcome.is_empty());
        assert!(outcome.degraded);
    }

    #[test]
    fn test_provider_tag_serialization() {
        let json = serde_json::to_string(&ProviderTag::BookingCom).unwrap();
        assert_eq!(json, "\"BOOKING_COM\"");
    }
}
