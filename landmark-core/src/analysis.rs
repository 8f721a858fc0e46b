//! Analysis request and memo types.

use serde::{Deserialize, Serialize};

/// The immutable parameters of one analysis, captured at enqueue time.
///
/// The address is carried verbatim; no case folding or whitespace trimming
/// happens anywhere downstream, including cache key construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub address: String,
    pub radius_m: u32,
    pub include_long_context: bool,
}

impl AnalysisRequest {
    pub fn new(address: impl Into<String>, radius_m: u32, include_long_context: bool) -> Self {
        Self {
            address: address.into(),
            radius_m,
            include_long_context,
        }
    }
}

/// The finished product of one analysis: a markdown investment memo and the
/// verdict extracted from its closing line.
///
/// A geocoding miss produces a memo with `verdict == "Error"` rather than an
/// error; the pipeline always returns a memo-shaped value for resolvable
/// failures of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMemo {
    pub memo_markdown: String,
    pub verdict: String,
}

impl AnalysisMemo {
    /// The memo returned when the address cannot be geocoded.
    pub fn geocoding_failure() -> Self {
        Self {
            memo_markdown: "Could not geocode address.".to_string(),
            verdict: "Error".to_string(),
        }
    }
}

/// Headline metrics aggregated from the data tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoMetrics {
    pub avg_price_per_sqft: Option<f64>,
    pub num_sales: Option<u64>,
    pub permits_per_month: Option<f64>,
    pub lux_pct: Option<f64>,
    pub max_far: Option<f64>,
}

/// Everything handed to the memo reasoner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoInput {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_m: u32,
    pub metrics: MemoMetrics,
    pub amenities_bullets: Vec<String>,
    pub infra_bullets: Vec<String>,
    pub risk_bullets: Vec<String>,
    pub long_context: Option<String>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serde_round_trip() {
        let request = AnalysisRequest::new("Central Park, New York, NY", 800, false);
        let json = serde_json::to_string(&request).expect("serialize");
        let back: AnalysisRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, request);
    }

    #[test]
    fn test_request_preserves_address_verbatim() {
        let request = AnalysisRequest::new("  350 FIFTH ave ", 400, true);
        assert_eq!(request.address, "  350 FIFTH ave ");
    }

    #[test]
    fn test_geocoding_failure_memo_shape() {
        let memo = AnalysisMemo::geocoding_failure();
        assert_eq!(memo.verdict, "Error");
        assert!(!memo.memo_markdown.is_empty());
    }
}
