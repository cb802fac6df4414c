use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use voyage_core::search::{
    NormalizedDestination, NormalizedFlightOffer, NormalizedHotelOffer, ProviderTag, SearchOutcome,
};

use crate::state::AppState;

/// Search payloads carry the degraded flag so clients can tell "no results"
/// from "upstream failed".
#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    pub data: Vec<T>,
    pub degraded: bool,
}

impl<T> From<SearchOutcome<T>> for SearchResponse<T> {
    fn from(outcome: SearchOutcome<T>) -> Self {
        Self {
            data: outcome.items,
            degraded: outcome.degraded,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DestinationQuery {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct HotelQuery {
    pub city_code: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/search/destinations", get(search_destinations))
        .route("/v1/search/flights", get(search_flights))
        .route("/v1/search/hotels", get(search_hotels))
}

/// GET /v1/search/destinations?keyword=rak
async fn search_destinations(
    State(state): State<AppState>,
    Query(query): Query<DestinationQuery>,
) -> Json<SearchResponse<NormalizedDestination>> {
    let outcome = state.amadeus.search_locations(&query.keyword).await;
    let degraded = outcome.degraded;

    // Static fallback entries cover the region the live API underserves.
    let data = state
        .provider_router
        .supplement_destinations(&query.keyword, outcome.items);

    Json(SearchResponse { data, degraded })
}

/// GET /v1/search/flights?origin=CDG&destination=RAK&departure_date=2026-02-15
async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightQuery>,
) -> Json<SearchResponse<NormalizedFlightOffer>> {
    let outcome = state
        .amadeus
        .search_flights(&query.origin, &query.destination, query.departure_date)
        .await;
    Json(outcome.into())
}

/// GET /v1/search/hotels?city_code=RAK&check_in=2026-02-15&check_out=2026-02-18
async fn search_hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelQuery>,
) -> Json<SearchResponse<NormalizedHotelOffer>> {
    let provider = state.provider_router.resolve_provider(&query.city_code);
    tracing::info!(city = %query.city_code, %provider, "routing hotel search");

    let outcome = match provider {
        ProviderTag::Amadeus => {
            state
                .amadeus
                .search_hotels(&query.city_code, query.check_in, query.check_out)
                .await
        }
        ProviderTag::BookingCom => {
            state
                .booking
                .hotels_by_city(&query.city_code, query.check_in, query.check_out)
                .await
        }
    };
    Json(outcome.into())
}
