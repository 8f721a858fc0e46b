//! Nearby amenity lookup from a facilities GeoJSON file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use landmark_core::{LandmarkResult, PipelineError};

use super::approx_distance_meters;

/// File name under the data directory.
pub const FACILITIES_FILE: &str = "facilities.geojson";

/// How many named facilities to surface.
const TOP_NAMED_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

/// What surrounds the point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmenitySummary {
    pub nearby_count: u64,
    pub counts_by_group: BTreeMap<String, u64>,
    pub counts_by_domain: BTreeMap<String, u64>,
    pub top_named: Vec<String>,
    pub insight_bullets: Vec<String>,
}

/// Count and summarize facilities within `radius_m` of the point.
///
/// A missing facilities file yields an empty summary with a single bullet
/// saying so.
pub fn nearby_amenities(
    data_dir: &Path,
    lat: f64,
    lon: f64,
    radius_m: u32,
) -> LandmarkResult<AmenitySummary> {
    let path = data_dir.join(FACILITIES_FILE);
    if !path.exists() {
        return Ok(AmenitySummary {
            insight_bullets: vec!["Amenity data not available.".to_string()],
            ..Default::default()
        });
    }

    let bytes = std::fs::read(&path).map_err(|e| PipelineError::DataLookupFailed {
        tool: "amenities".to_string(),
        reason: e.to_string(),
    })?;
    let collection: FeatureCollection =
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::DataLookupFailed {
            tool: "amenities".to_string(),
            reason: format!("facilities file unparseable: {}", e),
        })?;

    let mut summary = AmenitySummary::default();

    for feature in &collection.features {
        let Some((flat, flon)) = point_coordinates(feature) else {
            continue;
        };
        if approx_distance_meters(lat, lon, flat, flon) > radius_m as f64 {
            continue;
        }

        summary.nearby_count += 1;

        if let Some(group) = string_property(feature, "facgroup") {
            *summary.counts_by_group.entry(group).or_insert(0) += 1;
        }
        if let Some(domain) = string_property(feature, "facdomain") {
            *summary.counts_by_domain.entry(domain).or_insert(0) += 1;
        }
        if summary.top_named.len() < TOP_NAMED_LIMIT {
            if let Some(name) = string_property(feature, "facname") {
                summary.top_named.push(name);
            }
        }
    }

    summary.insight_bullets = build_bullets(&summary, radius_m);
    Ok(summary)
}

fn point_coordinates(feature: &Feature) -> Option<(f64, f64)> {
    let geometry = feature.geometry.as_ref()?;
    if geometry.kind != "Point" {
        return None;
    }
    let coords = geometry.coordinates.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Some((lat, lon))
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .properties
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn build_bullets(summary: &AmenitySummary, radius_m: u32) -> Vec<String> {
    if summary.nearby_count == 0 {
        return vec![format!("No mapped facilities within {}m.", radius_m)];
    }

    let mut bullets = vec![format!(
        "{} mapped facilities within {}m.",
        summary.nearby_count, radius_m
    )];

    if let Some((group, count)) = summary
        .counts_by_group
        .iter()
        .max_by_key(|(_, count)| **count)
    {
        bullets.push(format!("Largest facility group: {} ({}).", group, count));
    }
    if !summary.top_named.is_empty() {
        bullets.push(format!("Notable nearby: {}.", summary.top_named.join(", ")));
    }

    bullets
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_facilities(dir: &Path, body: &str) {
        std::fs::write(dir.join(FACILITIES_FILE), body).expect("write");
    }

    fn sample_geojson() -> String {
        // Two points near (40.75, -73.98), one far away in Brooklyn.
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [-73.9805, 40.7503]},
                 "properties": {"facname": "Midtown Library", "facgroup": "Libraries", "facdomain": "Education"}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [-73.9790, 40.7511]},
                 "properties": {"facname": "Herald Sq Station", "facgroup": "Transit", "facdomain": "Transportation"}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [-73.9442, 40.6782]},
                 "properties": {"facname": "Brooklyn Museum", "facgroup": "Museums", "facdomain": "Culture"}}
            ]
        }"#
        .to_string()
    }

    #[test]
    fn test_missing_file_degrades() {
        let dir = TempDir::new().expect("tempdir");
        let summary = nearby_amenities(dir.path(), 40.75, -73.98, 800).expect("summary");
        assert_eq!(summary.nearby_count, 0);
        assert_eq!(
            summary.insight_bullets,
            vec!["Amenity data not available.".to_string()]
        );
    }

    #[test]
    fn test_radius_filter() {
        let dir = TempDir::new().expect("tempdir");
        write_facilities(dir.path(), &sample_geojson());

        let summary = nearby_amenities(dir.path(), 40.7505, -73.9800, 500).expect("summary");
        assert_eq!(summary.nearby_count, 2);
        assert_eq!(summary.counts_by_group.get("Libraries"), Some(&1));
        assert_eq!(summary.counts_by_group.get("Transit"), Some(&1));
        assert!(summary.counts_by_group.get("Museums").is_none());
        assert!(summary
            .top_named
            .contains(&"Midtown Library".to_string()));
    }

    #[test]
    fn test_bullets_mention_counts() {
        let dir = TempDir::new().expect("tempdir");
        write_facilities(dir.path(), &sample_geojson());

        let summary = nearby_amenities(dir.path(), 40.7505, -73.9800, 500).expect("summary");
        assert!(summary.insight_bullets[0].contains("2 mapped facilities"));
    }

    #[test]
    fn test_zero_matches_bullet() {
        let dir = TempDir::new().expect("tempdir");
        write_facilities(dir.path(), &sample_geojson());

        let summary = nearby_amenities(dir.path(), 51.5074, -0.1278, 500).expect("summary");
        assert_eq!(summary.nearby_count, 0);
        assert!(summary.insight_bullets[0].contains("No mapped facilities"));
    }

    #[test]
    fn test_unparseable_file_errors() {
        let dir = TempDir::new().expect("tempdir");
        write_facilities(dir.path(), "{broken");

        assert!(nearby_amenities(dir.path(), 40.75, -73.98, 500).is_err());
    }
}
