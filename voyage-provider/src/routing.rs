use std::sync::Arc;

use voyage_core::search::{NormalizedDestination, ProviderTag};

use crate::tables::ProviderTables;

/// Keywords shorter than this never match fallback entries; substring
/// matching on one or two characters would pull in the whole table.
const MIN_FALLBACK_KEYWORD_LEN: usize = 2;

/// Decides which upstream serves a city and supplies static destination
/// records for the region the live API underserves.
pub struct ProviderRouter {
    tables: Arc<ProviderTables>,
}

impl ProviderRouter {
    pub fn new(tables: Arc<ProviderTables>) -> Self {
        Self { tables }
    }

    /// Hotel searches addressed by a fallback-region IATA code go to
    /// Amadeus; everything else, including name queries for those cities,
    /// is served by Booking.com (which covers them via map search).
    pub fn resolve_provider(&self, city: &str) -> ProviderTag {
        if self.tables.is_amadeus_region(city) {
            ProviderTag::Amadeus
        } else {
            ProviderTag::BookingCom
        }
    }

    /// All fallback entries whose IATA code, city name, or airport name
    /// contains the keyword (case-insensitive). Keywords shorter than two
    /// characters yield nothing.
    pub fn fallback_destinations(&self, keyword: &str) -> Vec<NormalizedDestination> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.chars().count() < MIN_FALLBACK_KEYWORD_LEN {
            return Vec::new();
        }

        self.tables
            .fallback_cities
            .iter()
            .filter(|entry| {
                entry.iata_code.to_lowercase().contains(&keyword)
                    || entry.city.to_lowercase().contains(&keyword)
                    || entry.airport.to_lowercase().contains(&keyword)
            })
            .map(|entry| {
                tracing::debug!(city = %entry.city, code = %entry.iata_code, "fallback destination match");
                NormalizedDestination {
                    id: format!("MOR_{}", entry.iata_code),
                    display_name: entry.city.clone(),
                    iata_code: entry.iata_code.clone(),
                    country: "Morocco".to_string(),
                }
            })
            .collect()
    }

    /// Supplement live results with fallback entries, but only when the live
    /// set has no match for the fallback region. Fallback records are
    /// prepended so they stay visible for short queries.
    pub fn supplement_destinations(
        &self,
        keyword: &str,
        live: Vec<NormalizedDestination>,
    ) -> Vec<NormalizedDestination> {
        let covered = live
            .iter()
            .any(|d| d.country.eq_ignore_ascii_case("Morocco"));
        if covered {
            return live;
        }

        let fallback = self.fallback_destinations(keyword);
        if fallback.is_empty() {
            return live;
        }

        tracing::info!(
            count = fallback.len(),
            keyword,
            "supplementing live results with fallback destinations"
        );
        let mut merged = fallback;
        merged.extend(live);
        merged
    }
}
