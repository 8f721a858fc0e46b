//! The end-to-end analysis pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use landmark_core::{
    AnalysisMemo, AnalysisRequest, Analyzer, LandmarkConfig, LandmarkResult, MemoInput,
    MemoMetrics,
};

use crate::reasoner::{GeminiReasoner, MemoReasoner};
use crate::tools::{
    comps_summary, flood_flag, long_context_for_area, nearby_amenities, permits_summary,
    zoning_summary, Geocoder,
};

/// Geocode, gather, reason. The one [`Analyzer`] implementation that ships.
pub struct AnalysisPipeline {
    geocoder: Geocoder,
    data_dir: PathBuf,
    reasoner: Arc<dyn MemoReasoner>,
}

impl AnalysisPipeline {
    /// Build a pipeline with an explicit reasoner. Tests use this with a
    /// stub.
    pub fn new(data_dir: impl Into<PathBuf>, reasoner: Arc<dyn MemoReasoner>) -> Self {
        Self {
            geocoder: Geocoder::new(),
            data_dir: data_dir.into(),
            reasoner,
        }
    }

    /// Build the production pipeline from configuration.
    ///
    /// # Errors
    /// Fails when no reasoner credential is configured.
    pub fn from_config(config: &LandmarkConfig) -> LandmarkResult<Self> {
        let reasoner = Arc::new(GeminiReasoner::from_config(config)?);
        Ok(Self::new(config.data_dir.clone(), reasoner))
    }

    /// Replace the geocoder. Tests point it at a local endpoint.
    pub fn with_geocoder(mut self, geocoder: Geocoder) -> Self {
        self.geocoder = geocoder;
        self
    }
}

#[async_trait]
impl Analyzer for AnalysisPipeline {
    async fn run(&self, request: &AnalysisRequest) -> LandmarkResult<AnalysisMemo> {
        // 1. Geocode. No match is a resolvable outcome, not an error.
        let Some(geo) = self.geocoder.geocode(&request.address).await? else {
            tracing::info!(address = %request.address, "Returning geocoding-failure memo");
            return Ok(AnalysisMemo::geocoding_failure());
        };

        tracing::debug!(
            address = %request.address,
            lat = geo.lat,
            lon = geo.lon,
            "Geocoded analysis target"
        );

        // 2. Gather data around the point.
        let amenities = nearby_amenities(&self.data_dir, geo.lat, geo.lon, request.radius_m)?;
        let permits = permits_summary(&self.data_dir, geo.lat, geo.lon, request.radius_m)?;
        let comps = comps_summary(&self.data_dir, geo.lat, geo.lon, request.radius_m)?;
        let zoning = match &geo.bbl {
            Some(bbl) => zoning_summary(&self.data_dir, bbl)?,
            None => None,
        };
        let flood = flood_flag(&self.data_dir, geo.lat, geo.lon)?;

        // 3. Aggregate metrics and bullets.
        let metrics = MemoMetrics {
            avg_price_per_sqft: (comps.num_sales > 0).then_some(comps.avg_price_per_sqft),
            num_sales: Some(comps.num_sales),
            permits_per_month: Some(permits.permits_per_month),
            lux_pct: Some(permits.lux_pct),
            max_far: zoning.as_ref().map(|z| z.max_far),
        };

        let infra_bullets = vec![
            format!(
                "Last sale date: {}",
                comps
                    .last_sale_date
                    .map_or_else(|| "n/a".to_string(), |d| d.to_string())
            ),
            format!(
                "Last permit date: {}",
                permits
                    .last_permit_date
                    .map_or_else(|| "n/a".to_string(), |d| d.to_string())
            ),
        ];
        let risk_bullets = vec![flood.details.clone()];

        // 4. Long-form context when requested.
        let long_context = if request.include_long_context {
            let mut keywords: Vec<String> = request
                .address
                .split_whitespace()
                .map(str::to_string)
                .collect();
            keywords.push(geo.address_norm.clone());
            Some(long_context_for_area(&self.data_dir, &keywords))
        } else {
            None
        };

        // 5. Hand everything to the reasoner.
        let input = MemoInput {
            address: request.address.clone(),
            lat: geo.lat,
            lon: geo.lon,
            radius_m: request.radius_m,
            metrics,
            amenities_bullets: amenities.insight_bullets,
            infra_bullets,
            risk_bullets,
            long_context,
        };

        self.reasoner.generate_memo(&input).await
    }
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}
