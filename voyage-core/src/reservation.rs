use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationType {
    Flight,
    Hotel,
    Both,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Failed,
}

impl ReservationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationType::Flight => "FLIGHT",
            ReservationType::Hotel => "HOTEL",
            ReservationType::Both => "BOTH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FLIGHT" => Some(ReservationType::Flight),
            "HOTEL" => Some(ReservationType::Hotel),
            "BOTH" => Some(ReservationType::Both),
            _ => None,
        }
    }
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReservationStatus::Pending),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            "COMPLETED" => Some(ReservationStatus::Completed),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            "FAILED" => Some(ReservationStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flight leg captured at booking time. `itinerary` keeps the raw offer
/// segments as a JSON blob for support/debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightDetails {
    pub external_flight_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub price: f64,
    pub passengers: Option<i32>,
    pub itinerary: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelDetails {
    pub external_hotel_id: String,
    pub hotel_name: String,
    pub city: String,
    pub address: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub room_count: i32,
    pub price_per_night: f64,
    pub total_price: f64,
    pub nights: Option<i32>,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}

/// Curated destination record maintained by administrators, independent of
/// the live provider search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDestination {
    pub id: Uuid,
    pub city: String,
    pub country: String,
    pub description: Option<String>,
}

/// A booked trip. Owns its embedded flight/hotel sub-records; `total_price`
/// is fixed at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    #[serde(rename = "type")]
    pub kind: ReservationType,
    pub status: ReservationStatus,
    pub total_price: f64,
    pub flight: Option<FlightDetails>,
    pub hotel: Option<HotelDetails>,
    pub created_at: DateTime<Utc>,
}
