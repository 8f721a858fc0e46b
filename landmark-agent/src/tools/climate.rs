//! Flood zone flag from the climate CSV.

use std::path::Path;

use serde::Deserialize;

use landmark_core::{LandmarkResult, PipelineError};

/// File name under the data directory.
pub const FLOOD_FILE: &str = "flood_flags.csv";

#[derive(Debug, Deserialize)]
struct FloodRow {
    latitude: f64,
    longitude: f64,
    in_flood_zone: u8,
}

/// Flood exposure at (approximately) the point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodFlag {
    /// `None` when the data file is absent.
    pub in_flood_zone: Option<bool>,
    pub details: String,
}

impl Default for FloodFlag {
    fn default() -> Self {
        Self {
            in_flood_zone: None,
            details: "Flood data not available.".to_string(),
        }
    }
}

/// Flag from the nearest sampled point.
///
/// Nearest is by squared degree distance, which is fine at city scale where
/// all candidates share a latitude band.
pub fn flood_flag(data_dir: &Path, lat: f64, lon: f64) -> LandmarkResult<FloodFlag> {
    let path = data_dir.join(FLOOD_FILE);
    if !path.exists() {
        return Ok(FloodFlag::default());
    }

    let mut reader =
        csv::Reader::from_path(&path).map_err(|e| PipelineError::DataLookupFailed {
            tool: "climate".to_string(),
            reason: e.to_string(),
        })?;

    let mut nearest: Option<(f64, bool)> = None;

    for row in reader.deserialize() {
        let row: FloodRow = row.map_err(|e| PipelineError::DataLookupFailed {
            tool: "climate".to_string(),
            reason: format!("flood row unreadable: {}", e),
        })?;

        let d_lat = row.latitude - lat;
        let d_lon = row.longitude - lon;
        let distance_sq = d_lat * d_lat + d_lon * d_lon;

        if nearest.map_or(true, |(best, _)| distance_sq < best) {
            nearest = Some((distance_sq, row.in_flood_zone != 0));
        }
    }

    let Some((_, in_zone)) = nearest else {
        return Ok(FloodFlag::default());
    };

    let details = if in_zone {
        "Property is in a designated flood zone.".to_string()
    } else {
        "Property is not in a designated flood zone.".to_string()
    };

    Ok(FloodFlag {
        in_flood_zone: Some(in_zone),
        details,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_flags(dir: &Path) {
        std::fs::write(
            dir.join(FLOOD_FILE),
            "latitude,longitude,in_flood_zone\n\
             40.7500,-73.9800,0\n\
             40.7000,-74.0100,1\n",
        )
        .expect("write");
    }

    #[test]
    fn test_missing_file_degrades() {
        let dir = TempDir::new().expect("tempdir");
        let flag = flood_flag(dir.path(), 40.75, -73.98).expect("flag");
        assert_eq!(flag.in_flood_zone, None);
        assert_eq!(flag.details, "Flood data not available.");
    }

    #[test]
    fn test_nearest_point_wins_dry() {
        let dir = TempDir::new().expect("tempdir");
        write_flags(dir.path());

        let flag = flood_flag(dir.path(), 40.7501, -73.9799).expect("flag");
        assert_eq!(flag.in_flood_zone, Some(false));
        assert!(flag.details.contains("not in a designated"));
    }

    #[test]
    fn test_nearest_point_wins_wet() {
        let dir = TempDir::new().expect("tempdir");
        write_flags(dir.path());

        let flag = flood_flag(dir.path(), 40.7010, -74.0090).expect("flag");
        assert_eq!(flag.in_flood_zone, Some(true));
        assert!(flag.details.contains("is in a designated"));
    }

    #[test]
    fn test_empty_file_degrades() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(FLOOD_FILE),
            "latitude,longitude,in_flood_zone\n",
        )
        .expect("write");

        let flag = flood_flag(dir.path(), 40.75, -73.98).expect("flag");
        assert_eq!(flag.in_flood_zone, None);
    }
}
