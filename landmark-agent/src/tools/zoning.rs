//! Parcel zoning lookup from the PLUTO CSV.

use std::path::Path;

use serde::Deserialize;

use landmark_core::{LandmarkResult, PipelineError};

/// File name under the data directory.
pub const PLUTO_FILE: &str = "pluto.csv";

#[derive(Debug, Deserialize)]
struct PlutoRow {
    bbl: String,
    zone_dist: String,
    res_far: f64,
    comm_far: f64,
    facil_far: f64,
    lot_area: f64,
}

/// Zoning envelope for one parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoningSummary {
    pub zoning_dist: String,
    pub residential_far: f64,
    pub commercial_far: f64,
    pub facility_far: f64,
    pub max_far: f64,
    pub lot_sqft: f64,
}

/// Look up the parcel by borough-block-lot identifier.
///
/// `Ok(None)` when the PLUTO file is absent or the BBL is not in it.
pub fn zoning_summary(data_dir: &Path, bbl: &str) -> LandmarkResult<Option<ZoningSummary>> {
    let path = data_dir.join(PLUTO_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let mut reader =
        csv::Reader::from_path(&path).map_err(|e| PipelineError::DataLookupFailed {
            tool: "zoning".to_string(),
            reason: e.to_string(),
        })?;

    for row in reader.deserialize() {
        let row: PlutoRow = row.map_err(|e| PipelineError::DataLookupFailed {
            tool: "zoning".to_string(),
            reason: format!("pluto row unreadable: {}", e),
        })?;

        if row.bbl == bbl {
            let max_far = row.res_far.max(row.comm_far).max(row.facil_far);
            return Ok(Some(ZoningSummary {
                zoning_dist: row.zone_dist,
                residential_far: row.res_far,
                commercial_far: row.comm_far,
                facility_far: row.facil_far,
                max_far,
                lot_sqft: row.lot_area,
            }));
        }
    }

    tracing::debug!(bbl, "No zoning row for parcel");
    Ok(None)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pluto(dir: &Path) {
        std::fs::write(
            dir.join(PLUTO_FILE),
            "bbl,zone_dist,res_far,comm_far,facil_far,lot_area\n\
             1008350041,C5-3,10.0,15.0,12.0,21000\n\
             1000010010,R6,2.43,0.0,4.8,2500\n",
        )
        .expect("write");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().expect("tempdir");
        assert_eq!(zoning_summary(dir.path(), "1008350041").expect("ok"), None);
    }

    #[test]
    fn test_lookup_by_bbl() {
        let dir = TempDir::new().expect("tempdir");
        write_pluto(dir.path());

        let summary = zoning_summary(dir.path(), "1008350041")
            .expect("ok")
            .expect("found");
        assert_eq!(summary.zoning_dist, "C5-3");
        assert!((summary.max_far - 15.0).abs() < 1e-9);
        assert!((summary.lot_sqft - 21000.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_far_picks_largest_component() {
        let dir = TempDir::new().expect("tempdir");
        write_pluto(dir.path());

        let summary = zoning_summary(dir.path(), "1000010010")
            .expect("ok")
            .expect("found");
        assert!((summary.max_far - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_bbl_is_none() {
        let dir = TempDir::new().expect("tempdir");
        write_pluto(dir.path());
        assert_eq!(zoning_summary(dir.path(), "9999999999").expect("ok"), None);
    }
}
