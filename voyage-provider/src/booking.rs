use std::sync::Arc;

use chrono::NaiveDate;

use voyage_core::search::{NormalizedHotelOffer, ProviderTag, SearchOutcome};

use crate::decode;
use crate::tables::{BoundingBox, ProviderTables};
use crate::ProviderError;

const RESULT_LIMIT: usize = 6;
const DEFAULT_STAR_RATING: f64 = 4.0;
const DEFAULT_PRICE: f64 = 200.0;
const DEFAULT_ADDRESS: &str = "City Center";
const FALLBACK_HOTEL_IMAGE: &str =
    "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=400&h=300&fit=crop";

#[derive(Debug, Clone)]
pub struct RapidApiConfig {
    pub key: String,
    pub host: String,
    pub base_url: String,
}

/// How a given city is searched against the hotel API.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStrategy {
    /// Destination-id search (`properties/list`).
    ByDestId(String),
    /// Map-based search with a bounding box (`properties/list-by-map`);
    /// destination-id search is unreliable for these cities on the free
    /// tier.
    ByMap(BoundingBox),
}

/// Client for the Booking.com hotel API behind RapidAPI. Authenticates with
/// a static subscription key instead of OAuth2.
pub struct BookingComClient {
    http: reqwest::Client,
    config: RapidApiConfig,
    tables: Arc<ProviderTables>,
}

impl BookingComClient {
    pub fn new(http: reqwest::Client, config: RapidApiConfig, tables: Arc<ProviderTables>) -> Self {
        Self { http, config, tables }
    }

    /// Hotel search by city name or IATA code. Unknown cities and upstream
    /// failures both come back empty; only the latter is flagged degraded.
    pub async fn hotels_by_city(
        &self,
        city: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> SearchOutcome<NormalizedHotelOffer> {
        let city_name = self.canonical_city(city);

        let strategy = match self.search_strategy(&city_name) {
            Some(strategy) => strategy,
            None => {
                tracing::warn!(city = %city_name, "no destination id or bounding box for city");
                return SearchOutcome::ok(Vec::new());
            }
        };

        match self.fetch_hotels(&strategy, check_in, check_out).await {
            Ok(items) => {
                tracing::info!(count = items.len(), city = %city_name, "hotel search complete");
                SearchOutcome::ok(items)
            }
            Err(err) => {
                tracing::warn!(error = %err, city = %city_name, "hotel search failed");
                SearchOutcome::degraded()
            }
        }
    }

    fn canonical_city(&self, city: &str) -> String {
        match self.tables.city_for_iata(city) {
            Some(name) => {
                tracing::debug!(input = city, city = name, "converted IATA code to city name");
                name.to_string()
            }
            None => city.trim().to_uppercase(),
        }
    }

    pub fn search_strategy(&self, city_name: &str) -> Option<SearchStrategy> {
        if let Some(bbox) = self.tables.bounding_box(city_name) {
            return Some(SearchStrategy::ByMap(*bbox));
        }
        self.tables
            .dest_id(city_name)
            .map(|id| SearchStrategy::ByDestId(id.to_string()))
    }

    async fn fetch_hotels(
        &self,
        strategy: &SearchStrategy,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<NormalizedHotelOffer>, ProviderError> {
        let mut query = vec![
            ("arrival_date", check_in.to_string()),
            ("departure_date", check_out.to_string()),
            ("guest_qty", "1".to_string()),
            ("room_qty", "1".to_string()),
            ("order_by", "popularity".to_string()),
            ("languagecode", "en-us".to_string()),
            ("currency_code", "EUR".to_string()),
        ];

        let path = match strategy {
            SearchStrategy::ByDestId(dest_id) => {
                query.push(("offset", "0".to_string()));
                query.push(("dest_ids", dest_id.clone()));
                "/properties/list"
            }
            SearchStrategy::ByMap(bbox) => {
                query.push(("bbox", bbox.as_query_param()));
                "/properties/list-by-map"
            }
        };

        let body: wire::PropertyListResponse = self
            .http
            .get(format!("{}{}", self.config.base_url, path))
            .query(&query)
            .header("x-rapidapi-key", &self.config.key)
            .header("x-rapidapi-host", &self.config.host)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(collect_properties(&body))
    }
}

pub(crate) fn collect_properties(body: &wire::PropertyListResponse) -> Vec<NormalizedHotelOffer> {
    body.result
        .iter()
        .take(RESULT_LIMIT)
        .enumerate()
        .map(|(index, property)| normalize_property(property, index))
        .collect()
}

fn normalize_property(property: &wire::Property, index: usize) -> NormalizedHotelOffer {
    let price_per_night = property
        .price_breakdown
        .as_ref()
        .and_then(|p| decode::number_field(&p.gross_price))
        .or_else(|| decode::number_field(&property.min_total_price))
        .unwrap_or(DEFAULT_PRICE);

    let image_url = property
        .max_photo_url
        .clone()
        .or_else(|| property.main_photo_url.clone())
        .unwrap_or_else(|| FALLBACK_HOTEL_IMAGE.to_string());

    NormalizedHotelOffer {
        id: decode::int_field(&property.hotel_id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| format!("HOTEL-{}", index + 1)),
        name: property
            .hotel_name
            .clone()
            .unwrap_or_else(|| "Unknown Hotel".to_string()),
        price_per_night,
        address: property
            .address
            .clone()
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
        star_rating: star_rating(&property.review_score),
        image_url,
        provider: ProviderTag::BookingCom,
    }
}

/// Review scores usually arrive on a 0-10 scale; anything above 10 is
/// assumed to be doubled and halved back, then capped at 5 stars.
fn star_rating(review_score: &serde_json::Value) -> i32 {
    let mut rating = decode::number_field(review_score).unwrap_or(DEFAULT_STAR_RATING);
    if rating > 10.0 {
        rating /= 2.0;
    }
    rating.min(5.0) as i32
}

pub(crate) mod wire {
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    pub struct PropertyListResponse {
        #[serde(default)]
        pub result: Vec<Property>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Property {
        #[serde(default)]
        pub hotel_id: serde_json::Value,
        pub hotel_name: Option<String>,
        pub address: Option<String>,
        #[serde(default)]
        pub review_score: serde_json::Value,
        #[serde(default)]
        pub min_total_price: serde_json::Value,
        pub price_breakdown: Option<PriceBreakdown>,
        pub max_photo_url: Option<String>,
        pub main_photo_url: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct PriceBreakdown {
        #[serde(default)]
        pub gross_price: serde_json::Value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> BookingComClient {
        BookingComClient::new(
            reqwest::Client::new(),
            RapidApiConfig {
                key: "test-key".to_string(),
                host: "test-host".to_string(),
                base_url: "https://example.invalid".to_string(),
            },
            Arc::new(ProviderTables::builtin()),
        )
    }

    #[test]
    fn test_moroccan_city_uses_map_search() {
        let client = client();
        match client.search_strategy("MARRAKECH") {
            Some(SearchStrategy::ByMap(bbox)) => {
                assert_eq!(bbox.as_query_param(), "-8.050000,31.750000,-7.900000,31.550000");
            }
            other => panic!("expected map strategy, got {:?}", other),
        }
    }

    #[test]
    fn test_known_city_uses_dest_id_search() {
        let client = client();
        assert_eq!(
            client.search_strategy("PARIS"),
            Some(SearchStrategy::ByDestId("-1456928".to_string()))
        );
    }

    #[test]
    fn test_unknown_city_has_no_strategy() {
        let client = client();
        assert_eq!(client.search_strategy("ATLANTIS"), None);
    }

    #[test]
    fn test_iata_code_is_canonicalized() {
        let client = client();
        assert_eq!(client.canonical_city("cdg"), "PARIS");
        assert_eq!(client.canonical_city(" marrakech "), "MARRAKECH");
    }

    #[test]
    fn test_property_normalization_defaults() {
        let body: wire::PropertyListResponse = serde_json::from_value(json!({
            "result": [
                {
                    "hotel_id": 112233,
                    "hotel_name": "Hotel Lutetia",
                    "address": "45 Boulevard Raspail",
                    "review_score": 9.1,
                    "price_breakdown": { "gross_price": "310.50" },
                    "max_photo_url": "https://cf.example/photo.jpg"
                },
                {}
            ]
        }))
        .unwrap();

        let offers = collect_properties(&body);
        assert_eq!(offers.len(), 2);

        assert_eq!(offers[0].id, "112233");
        assert_eq!(offers[0].price_per_night, 310.50);
        assert_eq!(offers[0].star_rating, 5);
        assert_eq!(offers[0].provider, ProviderTag::BookingCom);

        assert_eq!(offers[1].name, "Unknown Hotel");
        assert_eq!(offers[1].price_per_night, DEFAULT_PRICE);
        assert_eq!(offers[1].star_rating, 4);
        assert_eq!(offers[1].address, DEFAULT_ADDRESS);
    }

    #[test]
    fn test_star_rating_rescaling() {
        assert_eq!(star_rating(&json!(18.0)), 5);
        assert_eq!(star_rating(&json!(4.2)), 4);
        assert_eq!(star_rating(&json!("7.8")), 5);
        assert_eq!(star_rating(&json!(null)), 4);
    }

    #[test]
    fn test_result_list_is_capped() {
        let properties: Vec<_> = (0..10)
            .map(|i| json!({ "hotel_id": i, "hotel_name": format!("Hotel {}", i) }))
            .collect();
        let body: wire::PropertyListResponse =
            serde_json::from_value(json!({ "result": properties })).unwrap();

        assert_eq!(collect_properties(&body).len(), RESULT_LIMIT);
    }
}
