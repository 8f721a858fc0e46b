//! Address geocoding via Nominatim.

use dashmap::DashMap;
use serde::Deserialize;

use landmark_core::{LandmarkResult, PipelineError};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "landmark-analysis";

/// A resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    /// The provider's normalized display name.
    pub address_norm: String,
    pub lat: f64,
    pub lon: f64,
    /// Borough-block-lot identifier, when a parcel source supplies one.
    /// Nominatim does not, so zoning lookups are skipped for its results.
    pub bbl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

/// Geocoder with a per-process memo cache.
///
/// Identical address strings within one process hit the provider once.
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    cache: DashMap<String, Option<GeoInfo>>,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: NOMINATIM_URL.to_string(),
            cache: DashMap::new(),
        }
    }

    /// Point a geocoder at a different endpoint. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve an address.
    ///
    /// `Ok(None)` means the provider returned no match; that is not an
    /// error. Transport and decode failures are.
    pub async fn geocode(&self, address: &str) -> LandmarkResult<Option<GeoInfo>> {
        if let Some(cached) = self.cache.get(address) {
            return Ok(cached.value().clone());
        }

        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "json")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| PipelineError::GeocodingFailed {
                address: address.to_string(),
                reason: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| PipelineError::GeocodingFailed {
                address: address.to_string(),
                reason: format!("response decode failed: {}", e),
            })?;

        let info = match places.first() {
            Some(place) => {
                let lat = place.lat.parse::<f64>().map_err(|e| {
                    PipelineError::GeocodingFailed {
                        address: address.to_string(),
                        reason: format!("bad latitude {:?}: {}", place.lat, e),
                    }
                })?;
                let lon = place.lon.parse::<f64>().map_err(|e| {
                    PipelineError::GeocodingFailed {
                        address: address.to_string(),
                        reason: format!("bad longitude {:?}: {}", place.lon, e),
                    }
                })?;
                Some(GeoInfo {
                    address_norm: place.display_name.clone(),
                    lat,
                    lon,
                    bbl: None,
                })
            }
            None => {
                tracing::info!(address, "Geocoder returned no match");
                None
            }
        };

        self.cache.insert(address.to_string(), info.clone());
        Ok(info)
    }
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("base_url", &self.base_url)
            .field("cached", &self.cache.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
