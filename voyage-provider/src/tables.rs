use serde::Deserialize;
use std::collections::HashMap;

/// A region the primary location API underserves; doubles as the routing
/// table (hotel search for these cities goes to Amadeus) and as the source
/// of fallback destination records.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackCity {
    pub iata_code: String,
    pub city: String,
    pub airport: String,
}

/// Bounding box for map-based hotel search, as north-east / south-west
/// corners.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub ne_lat: f64,
    pub ne_lon: f64,
    pub sw_lat: f64,
    pub sw_lon: f64,
}

impl BoundingBox {
    /// Booking.com expects `lon_west,lat_north,lon_east,lat_south`.
    pub fn as_query_param(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.sw_lon, self.ne_lat, self.ne_lon, self.sw_lat
        )
    }
}

/// Static provider-routing data, built once at startup and shared read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTables {
    pub fallback_cities: Vec<FallbackCity>,
    /// IATA airport/city code -> canonical city name.
    pub iata_cities: HashMap<String, String>,
    /// Canonical city name -> Booking.com destination id.
    pub booking_dest_ids: HashMap<String, String>,
    /// Canonical city name -> bounding box for map-based search.
    pub bounding_boxes: HashMap<String, BoundingBox>,
}

impl ProviderTables {
    pub fn city_for_iata(&self, code: &str) -> Option<&str> {
        self.iata_cities
            .get(code.trim().to_uppercase().as_str())
            .map(String::as_str)
    }

    /// Exact lookup first, then partial match either way, matching how the
    /// destination-id table was consulted historically.
    pub fn dest_id(&self, city: &str) -> Option<&str> {
        let normalized = city.trim().to_uppercase();
        if let Some(id) = self.booking_dest_ids.get(&normalized) {
            return Some(id);
        }
        self.booking_dest_ids
            .iter()
            .find(|(name, _)| name.contains(&normalized) || normalized.contains(name.as_str()))
            .map(|(_, id)| id.as_str())
    }

    pub fn bounding_box(&self, city: &str) -> Option<&BoundingBox> {
        self.bounding_boxes.get(city.trim().to_uppercase().as_str())
    }

    /// True when the query is one of the fallback-region IATA codes. Keyed
    /// on codes only: the Amadeus hotel endpoint takes IATA city codes, so
    /// name queries for these cities fall through to the map-based
    /// Booking.com search instead.
    pub fn is_amadeus_region(&self, city: &str) -> bool {
        let normalized = city.trim().to_uppercase();
        self.fallback_cities
            .iter()
            .any(|entry| entry.iata_code == normalized)
    }

    /// The built-in tables covering the launch markets.
    pub fn builtin() -> Self {
        let fallback_cities = [
            ("CMN", "Casablanca", "Mohamed V International Airport"),
            ("RAK", "Marrakech", "Marrakech Menara Airport"),
            ("RBA", "Rabat", "Rabat-Salé Airport"),
            ("FEZ", "Fes", "Fès-Saïss Airport"),
            ("TNG", "Tangier", "Tangier Ibn Battouta Airport"),
            ("AGA", "Agadir", "Agadir Al Massira Airport"),
            ("OUD", "Ouarzazate", "Ouarzazate Airport"),
            ("ESU", "Essaouira", "Essaouira-Mogador Airport"),
        ]
        .into_iter()
        .map(|(iata_code, city, airport)| FallbackCity {
            iata_code: iata_code.to_string(),
            city: city.to_string(),
            airport: airport.to_string(),
        })
        .collect();

        let iata_cities = [
            ("PAR", "PARIS"),
            ("CDG", "PARIS"),
            ("ORY", "PARIS"),
            ("LON", "LONDON"),
            ("LHR", "LONDON"),
            ("LGW", "LONDON"),
            ("BCN", "BARCELONA"),
            ("DXB", "DUBAI"),
            ("NYC", "NEW YORK"),
            ("JFK", "NEW YORK"),
            ("EWR", "NEW YORK"),
            ("LGA", "NEW YORK"),
            ("TYO", "TOKYO"),
            ("NRT", "TOKYO"),
            ("HND", "TOKYO"),
            ("ROM", "ROME"),
            ("FCO", "ROME"),
            ("MAD", "MADRID"),
            ("AMS", "AMSTERDAM"),
            ("BER", "BERLIN"),
            ("CMN", "CASABLANCA"),
            ("RAK", "MARRAKECH"),
            ("RBA", "RABAT"),
            ("FEZ", "FES"),
            ("TNG", "TANGIER"),
            ("AGA", "AGADIR"),
            ("OUD", "OUARZAZATE"),
            ("ESU", "ESSAOUIRA"),
        ]
        .into_iter()
        .map(|(code, city)| (code.to_string(), city.to_string()))
        .collect();

        let booking_dest_ids = [
            ("PARIS", "-1456928"),
            ("LONDON", "-2601889"),
            ("BARCELONA", "-372490"),
            ("DUBAI", "-782831"),
            ("NEW YORK", "20088325"),
            ("TOKYO", "-246227"),
            ("ROME", "-126693"),
            ("MADRID", "-390625"),
            ("AMSTERDAM", "-2140479"),
            ("BERLIN", "-1746443"),
        ]
        .into_iter()
        .map(|(city, id)| (city.to_string(), id.to_string()))
        .collect();

        // Free-tier destination-id search is unreliable for Morocco; these
        // cities are searched by map coordinates instead.
        let bounding_boxes = [
            ("CASABLANCA", (33.65, -7.45, 33.50, -7.80)),
            ("MARRAKECH", (31.75, -7.90, 31.55, -8.05)),
            ("MARRAKESH", (31.75, -7.90, 31.55, -8.05)),
            ("RABAT", (34.10, -6.75, 34.00, -6.90)),
            ("FES", (34.10, -4.95, 33.95, -5.10)),
            ("FEZ", (34.10, -4.95, 33.95, -5.10)),
            ("TANGIER", (35.85, -5.70, 35.70, -5.95)),
            ("AGADIR", (30.50, -9.45, 30.35, -9.65)),
            ("OUARZAZATE", (31.00, -6.85, 30.85, -7.00)),
            ("ESSAOUIRA", (31.55, -9.70, 31.45, -9.85)),
            ("CHEFCHAOUEN", (35.25, -5.20, 35.15, -5.35)),
            ("MEKNES", (33.95, -5.50, 33.85, -5.65)),
        ]
        .into_iter()
        .map(|(city, (ne_lat, ne_lon, sw_lat, sw_lon))| {
            (
                city.to_string(),
                BoundingBox { ne_lat, ne_lon, sw_lat, sw_lon },
            )
        })
        .collect();

        Self {
            fallback_cities,
            iata_cities,
            booking_dest_ids,
            bounding_boxes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iata_lookup_is_case_insensitive() {
        let tables = ProviderTables::builtin();
        assert_eq!(tables.city_for_iata("cdg"), Some("PARIS"));
        assert_eq!(tables.city_for_iata("XXX"), None);
    }

    #[test]
    fn test_dest_id_partial_match() {
        let tables = ProviderTables::builtin();
        assert_eq!(tables.dest_id("Paris"), Some("-1456928"));
        // "YORK" is contained in "NEW YORK"
        assert_eq!(tables.dest_id("York"), Some("20088325"));
        assert_eq!(tables.dest_id("Nowhere"), None);
    }

    #[test]
    fn test_amadeus_region_is_keyed_on_iata_codes_only() {
        let tables = ProviderTables::builtin();
        assert!(tables.is_amadeus_region("RAK"));
        assert!(tables.is_amadeus_region(" rak "));
        assert!(!tables.is_amadeus_region("MARRAKECH"));
        assert!(!tables.is_amadeus_region("PAR"));
    }

    #[test]
    fn test_bbox_query_param_order() {
        let tables = ProviderTables::builtin();
        let bbox = tables.bounding_box("MARRAKECH").unwrap();
        assert_eq!(bbox.as_query_param(), "-8.050000,31.750000,-7.900000,31.550000");
    }
}
