//! Sales comparables from the sales CSV.

use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use landmark_core::{LandmarkResult, PipelineError};

use super::approx_distance_meters;

/// File name under the data directory.
pub const SALES_FILE: &str = "sales.csv";

/// Lookback window in months.
const DEFAULT_MONTHS: i64 = 24;

#[derive(Debug, Deserialize)]
struct SaleRow {
    sale_price: f64,
    gross_square_feet: f64,
    sale_date: String,
    latitude: f64,
    longitude: f64,
}

/// Recent-sales summary around a point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompsSummary {
    pub avg_price_per_sqft: f64,
    pub num_sales: u64,
    pub last_sale_date: Option<NaiveDate>,
}

/// Summarize arm's-length sales within `radius_m` over the last 24 months.
///
/// Rows with non-positive price or square footage are excluded, as are rows
/// whose date does not parse. A missing sales file yields the zero summary.
pub fn comps_summary(
    data_dir: &Path,
    lat: f64,
    lon: f64,
    radius_m: u32,
) -> LandmarkResult<CompsSummary> {
    let path = data_dir.join(SALES_FILE);
    if !path.exists() {
        return Ok(CompsSummary::default());
    }

    let mut reader =
        csv::Reader::from_path(&path).map_err(|e| PipelineError::DataLookupFailed {
            tool: "comps".to_string(),
            reason: e.to_string(),
        })?;

    let window_start = Utc::now().date_naive() - Duration::days(DEFAULT_MONTHS * 30);

    let mut num_sales = 0u64;
    let mut price_per_sqft_total = 0.0f64;
    let mut last_sale_date: Option<NaiveDate> = None;

    for row in reader.deserialize() {
        let row: SaleRow = row.map_err(|e| PipelineError::DataLookupFailed {
            tool: "comps".to_string(),
            reason: format!("sales row unreadable: {}", e),
        })?;

        if row.sale_price <= 0.0 || row.gross_square_feet <= 0.0 {
            continue;
        }
        let Ok(date) = NaiveDate::parse_from_str(&row.sale_date, "%Y-%m-%d") else {
            continue;
        };
        if date < window_start {
            continue;
        }
        if approx_distance_meters(lat, lon, row.latitude, row.longitude) > radius_m as f64 {
            continue;
        }

        num_sales += 1;
        price_per_sqft_total += row.sale_price / row.gross_square_feet;
        last_sale_date = Some(match last_sale_date {
            Some(current) if current > date => current,
            _ => date,
        });
    }

    let avg_price_per_sqft = if num_sales > 0 {
        price_per_sqft_total / num_sales as f64
    } else {
        0.0
    };

    Ok(CompsSummary {
        avg_price_per_sqft,
        num_sales,
        last_sale_date,
    })
}

// =============================================================================
// TESTS
// =============================================================================
