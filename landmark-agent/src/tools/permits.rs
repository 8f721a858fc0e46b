//! Construction permit activity from the permits CSV.

use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use landmark_core::{LandmarkResult, PipelineError};

use super::approx_distance_meters;

/// File name under the data directory.
pub const PERMITS_FILE: &str = "permits.csv";

/// Lookback window in months.
const DEFAULT_MONTHS: i64 = 12;

/// How many job descriptions to sample for the memo.
const SAMPLE_LIMIT: usize = 5;

/// Keywords that flag a permit as luxury-oriented work.
const LUX_KEYWORDS: [&str; 4] = ["luxury", "penthouse", "amenity", "renovation"];

#[derive(Debug, Deserialize)]
struct PermitRow {
    issuance_date: String,
    job_description: String,
    latitude: f64,
    longitude: f64,
}

/// Permit activity summary around a point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermitSummary {
    pub permits_per_month: f64,
    pub lux_pct: f64,
    pub sample_descriptions: Vec<String>,
    pub last_permit_date: Option<NaiveDate>,
}

/// Summarize permits issued within `radius_m` over the last 12 months.
///
/// A missing permits file yields the zero summary.
pub fn permits_summary(
    data_dir: &Path,
    lat: f64,
    lon: f64,
    radius_m: u32,
) -> LandmarkResult<PermitSummary> {
    let path = data_dir.join(PERMITS_FILE);
    if !path.exists() {
        return Ok(PermitSummary::default());
    }

    let mut reader =
        csv::Reader::from_path(&path).map_err(|e| PipelineError::DataLookupFailed {
            tool: "permits".to_string(),
            reason: e.to_string(),
        })?;

    let window_start = Utc::now().date_naive() - Duration::days(DEFAULT_MONTHS * 30);

    let mut total = 0u64;
    let mut lux = 0u64;
    let mut sample_descriptions = Vec::new();
    let mut last_permit_date: Option<NaiveDate> = None;

    for row in reader.deserialize() {
        let row: PermitRow = row.map_err(|e| PipelineError::DataLookupFailed {
            tool: "permits".to_string(),
            reason: format!("permit row unreadable: {}", e),
        })?;

        let Ok(date) = NaiveDate::parse_from_str(&row.issuance_date, "%Y-%m-%d") else {
            continue;
        };
        if date < window_start {
            continue;
        }
        if approx_distance_meters(lat, lon, row.latitude, row.longitude) > radius_m as f64 {
            continue;
        }

        total += 1;
        let description = row.job_description.to_lowercase();
        if LUX_KEYWORDS.iter().any(|kw| description.contains(kw)) {
            lux += 1;
        }
        if sample_descriptions.len() < SAMPLE_LIMIT {
            sample_descriptions.push(row.job_description);
        }
        last_permit_date = Some(match last_permit_date {
            Some(current) if current > date => current,
            _ => date,
        });
    }

    if total == 0 {
        return Ok(PermitSummary::default());
    }

    Ok(PermitSummary {
        permits_per_month: total as f64 / DEFAULT_MONTHS as f64,
        lux_pct: lux as f64 / total as f64 * 100.0,
        sample_descriptions,
        last_permit_date,
    })
}

// =============================================================================
// TESTS
// =============================================================================
