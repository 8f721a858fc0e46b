//! Data lookup tools.
//!
//! Each tool answers one question about a point or parcel from a file under
//! the data directory. A missing file produces a neutral summary; a file
//! that exists but cannot be read or parsed is an error.

pub mod amenities;
pub mod climate;
pub mod comps;
pub mod context;
pub mod geocode;
pub mod permits;
pub mod zoning;

pub use amenities::{nearby_amenities, AmenitySummary};
pub use climate::{flood_flag, FloodFlag};
pub use comps::{comps_summary, CompsSummary};
pub use context::long_context_for_area;
pub use geocode::{GeoInfo, Geocoder};
pub use permits::{permits_summary, PermitSummary};
pub use zoning::{zoning_summary, ZoningSummary};

/// Meters per degree of latitude.
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Approximate ground distance in meters between two points.
///
/// Equirectangular approximation, accurate to well under a percent at the
/// hundreds-of-meters radii used here.
pub fn approx_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mid_lat = ((lat1 + lat2) / 2.0).to_radians();
    let dx = (lon2 - lon1) * METERS_PER_DEGREE_LAT * mid_lat.cos();
    let dy = (lat2 - lat1) * METERS_PER_DEGREE_LAT;
    (dx * dx + dy * dy).sqrt()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let d = approx_distance_meters(40.7128, -74.0060, 40.7128, -74.0060);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = approx_distance_meters(40.0, -74.0, 41.0, -74.0);
        assert!((d - METERS_PER_DEGREE_LAT).abs() < 1.0);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        // A degree of longitude is shorter at 60N than at the equator.
        let at_equator = approx_distance_meters(0.0, 0.0, 0.0, 1.0);
        let at_sixty = approx_distance_meters(60.0, 0.0, 60.0, 1.0);
        assert!(at_sixty < at_equator * 0.6);
    }

    #[test]
    fn test_known_manhattan_distance() {
        // Empire State Building to Bryant Park is roughly 550m.
        let d = approx_distance_meters(40.7484, -73.9857, 40.7536, -73.9832);
        assert!((400.0..700.0).contains(&d), "distance was {}", d);
    }
}
