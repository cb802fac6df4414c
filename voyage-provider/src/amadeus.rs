use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;

use voyage_core::search::{
    NormalizedDestination, NormalizedFlightOffer, NormalizedHotelOffer, ProviderTag, SearchOutcome,
};

use crate::decode;
use crate::token::{AuthError, IssuedToken, TokenCache, TokenSource};
use crate::ProviderError;

/// Step 1 of the hotel flow resolves at most this many hotel ids per city.
const HOTEL_ID_LIMIT: usize = 5;
const FLIGHT_RESULT_LIMIT: usize = 10;
const DEFAULT_STAR_RATING: i32 = 4;
/// Amadeus caps bookable seats at 9; used when the field is absent.
const DEFAULT_BOOKABLE_SEATS: i32 = 9;
const DEFAULT_ADDRESS: &str = "City Center";
const FALLBACK_HOTEL_IMAGE: &str =
    "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800";

#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    pub api_key: String,
    pub api_secret: String,
    pub auth_url: String,
    pub base_url: String,
}

// ============================================================================
// OAuth2 client-credentials source
// ============================================================================

pub struct AmadeusAuth {
    http: reqwest::Client,
    config: AmadeusConfig,
}

impl AmadeusAuth {
    pub fn new(http: reqwest::Client, config: AmadeusConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl TokenSource for AmadeusAuth {
    async fn fetch(&self) -> Result<IssuedToken, AuthError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.api_key.as_str()),
            ("client_secret", self.config.api_secret.as_str()),
        ];

        let body: serde_json::Value = self
            .http
            .post(&self.config.auth_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        // Amadeus reports credential problems as a 200 with an errors array.
        if let Some(errors) = body.get("errors") {
            return Err(AuthError::Rejected(errors.to_string()));
        }

        let access_token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AuthError::Rejected("token response missing access_token".into()))?;
        let expires_in = body
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AuthError::Rejected("token response missing expires_in".into()))?;

        Ok(IssuedToken {
            access_token: access_token.to_string(),
            expires_in,
        })
    }
}

// ============================================================================
// Search client
// ============================================================================

pub struct AmadeusClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl AmadeusClient {
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<TokenCache>) -> Self {
        Self { http, base_url, tokens }
    }

    /// Search cities by keyword. Upstream failures are absorbed into a
    /// degraded empty outcome; search endpoints never fail their caller.
    pub async fn search_locations(&self, keyword: &str) -> SearchOutcome<NormalizedDestination> {
        match self.fetch_locations(keyword).await {
            Ok(items) => {
                tracing::info!(count = items.len(), keyword, "destination search complete");
                SearchOutcome::ok(items)
            }
            Err(err) => {
                tracing::warn!(error = %err, keyword, "destination search failed");
                SearchOutcome::degraded()
            }
        }
    }

    pub async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> SearchOutcome<NormalizedFlightOffer> {
        match self.fetch_flights(origin, destination, date).await {
            Ok(items) => {
                tracing::info!(count = items.len(), origin, destination, "flight search complete");
                SearchOutcome::ok(items)
            }
            Err(err) => {
                tracing::warn!(error = %err, origin, destination, "flight search failed");
                SearchOutcome::degraded()
            }
        }
    }

    /// Two-step hotel search: resolve a bounded list of hotel ids for the
    /// city, then one batched offer lookup joining those ids with the stay
    /// dates. Zero ids short-circuits to an empty result.
    pub async fn search_hotels(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> SearchOutcome<NormalizedHotelOffer> {
        match self.fetch_hotels(city_code, check_in, check_out).await {
            Ok(items) => {
                tracing::info!(count = items.len(), city = city_code, "hotel search complete");
                SearchOutcome::ok(items)
            }
            Err(err) => {
                tracing::warn!(error = %err, city = city_code, "hotel search failed");
                SearchOutcome::degraded()
            }
        }
    }

    async fn fetch_locations(
        &self,
        keyword: &str,
    ) -> Result<Vec<NormalizedDestination>, ProviderError> {
        let body: wire::LocationResponse = self
            .get_json(
                "/v1/reference-data/locations",
                &[
                    ("subType", "CITY".to_string()),
                    ("keyword", keyword.to_string()),
                ],
            )
            .await?;

        Ok(body.data.into_iter().map(normalize_location).collect())
    }

    async fn fetch_flights(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> Result<Vec<NormalizedFlightOffer>, ProviderError> {
        let body: wire::FlightOffersResponse = self
            .get_json(
                "/v2/shopping/flight-offers",
                &[
                    ("originLocationCode", origin.to_string()),
                    ("destinationLocationCode", destination.to_string()),
                    ("departureDate", date.to_string()),
                    ("adults", "1".to_string()),
                    ("max", FLIGHT_RESULT_LIMIT.to_string()),
                ],
            )
            .await?;

        Ok(collect_flight_offers(&body))
    }

    async fn fetch_hotels(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<NormalizedHotelOffer>, ProviderError> {
        let hotel_ids = self.hotel_ids_by_city(city_code).await?;
        if hotel_ids.is_empty() {
            tracing::warn!(city = city_code, "no hotels listed for city");
            return Ok(Vec::new());
        }
        tracing::info!(count = hotel_ids.len(), city = city_code, "resolved hotel ids");

        let body: wire::HotelOffersResponse = self
            .get_json(
                "/v3/shopping/hotel-offers",
                &[
                    ("hotelIds", hotel_ids.join(",")),
                    ("checkInDate", check_in.to_string()),
                    ("checkOutDate", check_out.to_string()),
                    ("adults", "1".to_string()),
                    ("max", "10".to_string()),
                ],
            )
            .await?;

        Ok(collect_hotel_offers(&body))
    }

    async fn hotel_ids_by_city(&self, city_code: &str) -> Result<Vec<String>, ProviderError> {
        let body: wire::HotelListResponse = self
            .get_json(
                "/v1/reference-data/locations/hotels/by-city",
                &[
                    ("cityCode", city_code.to_string()),
                    ("max", HOTEL_ID_LIMIT.to_string()),
                ],
            )
            .await?;

        Ok(body
            .data
            .into_iter()
            .filter_map(|entry| entry.hotel_id)
            .take(HOTEL_ID_LIMIT)
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let token = self.tokens.bearer().await?;

        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        // A revoked token means our cache is stale; drop it so the next
        // call performs a fresh exchange.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }

        Ok(response.error_for_status()?.json().await?)
    }
}

// ============================================================================
// Normalization
// ============================================================================

fn normalize_location(location: wire::Location) -> NormalizedDestination {
    NormalizedDestination {
        id: location.id,
        display_name: location.name,
        iata_code: location.iata_code,
        country: location.address.country_name,
    }
}

pub(crate) fn collect_flight_offers(
    body: &wire::FlightOffersResponse,
) -> Vec<NormalizedFlightOffer> {
    let mut offers = Vec::new();
    for raw in &body.data {
        match normalize_flight_offer(raw) {
            Some(offer) => offers.push(offer),
            None => tracing::warn!(offer_id = %raw.id, "skipping malformed flight offer"),
        }
    }
    offers
}

/// For multi-segment itineraries the representative times are the first
/// segment's departure and the last itinerary's last segment's arrival;
/// layovers are not modeled.
fn normalize_flight_offer(offer: &wire::FlightOffer) -> Option<NormalizedFlightOffer> {
    let first_segment = offer.itineraries.first()?.segments.first()?;
    let last_segment = offer.itineraries.last()?.segments.last()?;

    let departure_time = parse_local_datetime(first_segment.departure.at.as_deref()?)?;
    let arrival_time = parse_local_datetime(last_segment.arrival.at.as_deref()?)?;

    let airline = first_segment
        .operating
        .as_ref()
        .and_then(|o| o.carrier_code.clone())
        .unwrap_or_else(|| first_segment.carrier_code.clone());

    let price = offer
        .price
        .grand_total
        .as_deref()
        .and_then(|total| total.trim().parse().ok())
        .unwrap_or(0.0);

    Some(NormalizedFlightOffer {
        id: offer.id.clone(),
        departure_time,
        arrival_time,
        price,
        available_seats: offer
            .number_of_bookable_seats
            .unwrap_or(DEFAULT_BOOKABLE_SEATS),
        origin_code: first_segment.departure.iata_code.clone(),
        destination_code: last_segment.arrival.iata_code.clone(),
        airline,
        flight_number: first_segment.number.clone(),
    })
}

pub(crate) fn collect_hotel_offers(body: &wire::HotelOffersResponse) -> Vec<NormalizedHotelOffer> {
    let mut offers = Vec::new();
    for (index, raw) in body.data.iter().enumerate() {
        match normalize_hotel_offer(raw, index) {
            Some(offer) => offers.push(offer),
            None => tracing::warn!(index, "skipping malformed hotel offer"),
        }
    }
    offers
}

fn normalize_hotel_offer(
    set: &wire::HotelOfferSet,
    index: usize,
) -> Option<NormalizedHotelOffer> {
    if set.hotel.is_none() && set.offers.is_empty() {
        return None;
    }
    let hotel = set.hotel.clone().unwrap_or_default();

    let price_per_night = set
        .offers
        .first()
        .and_then(|offer| offer.price.as_ref())
        .and_then(|price| price.total.as_deref())
        .and_then(|total| total.trim().parse().ok())
        .unwrap_or(0.0);

    let address = hotel
        .address
        .as_ref()
        .and_then(|a| a.lines.first().cloned())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    Some(NormalizedHotelOffer {
        id: hotel
            .hotel_id
            .unwrap_or_else(|| format!("HOTEL-{}", index + 1)),
        name: hotel.name.unwrap_or_else(|| format!("Hotel {}", index + 1)),
        price_per_night,
        address,
        star_rating: decode::int_field(&hotel.rating)
            .map(|n| n as i32)
            .unwrap_or(DEFAULT_STAR_RATING),
        image_url: FALLBACK_HOTEL_IMAGE.to_string(),
        provider: ProviderTag::Amadeus,
    })
}

fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()
}

// ============================================================================
// Wire format
// ============================================================================

pub(crate) mod wire {
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    pub struct LocationResponse {
        #[serde(default)]
        pub data: Vec<Location>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Location {
        #[serde(default)]
        pub id: String,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub iata_code: String,
        #[serde(default)]
        pub address: Address,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Address {
        #[serde(default)]
        pub country_name: String,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct FlightOffersResponse {
        #[serde(default)]
        pub data: Vec<FlightOffer>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FlightOffer {
        #[serde(default)]
        pub id: String,
        #[serde(default)]
        pub itineraries: Vec<Itinerary>,
        #[serde(default)]
        pub price: OfferPrice,
        pub number_of_bookable_seats: Option<i32>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Itinerary {
        #[serde(default)]
        pub segments: Vec<Segment>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Segment {
        #[serde(default)]
        pub departure: SegmentPoint,
        #[serde(default)]
        pub arrival: SegmentPoint,
        #[serde(default)]
        pub carrier_code: String,
        #[serde(default)]
        pub number: String,
        pub operating: Option<OperatingCarrier>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SegmentPoint {
        #[serde(default)]
        pub iata_code: String,
        pub at: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OperatingCarrier {
        pub carrier_code: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OfferPrice {
        pub grand_total: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct HotelListResponse {
        #[serde(default)]
        pub data: Vec<HotelListEntry>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HotelListEntry {
        pub hotel_id: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct HotelOffersResponse {
        #[serde(default)]
        pub data: Vec<HotelOfferSet>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct HotelOfferSet {
        pub hotel: Option<HotelSummary>,
        #[serde(default)]
        pub offers: Vec<RoomOffer>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HotelSummary {
        pub hotel_id: Option<String>,
        pub name: Option<String>,
        // Rating drifts between "4" and 4 across API versions.
        #[serde(default)]
        pub rating: serde_json::Value,
        pub address: Option<HotelAddress>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct HotelAddress {
        #[serde(default)]
        pub lines: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct RoomOffer {
        pub price: Option<RoomPrice>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct RoomPrice {
        pub total: Option<String>,
    }
}
