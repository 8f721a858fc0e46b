//! The LLM memo reasoner.
//!
//! Turns the aggregated [`MemoInput`] into a markdown investment memo via
//! the Gemini `generateContent` endpoint. This is the only place in the
//! system with a retry loop; everything upstream fails fast and records the
//! failure on the job.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use landmark_core::{AnalysisMemo, LandmarkConfig, LandmarkResult, MemoInput, ReasonerError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Verdict used when the memo has no closing verdict line.
const VERDICT_UNKNOWN: &str = "Unknown";

/// The marker line the memo prompt asks the model to end with.
const VERDICT_MARKER: &str = "\nVerdict: ";

/// Writes the investment memo for an aggregated input.
#[async_trait]
pub trait MemoReasoner: Send + Sync {
    async fn generate_memo(&self, input: &MemoInput) -> LandmarkResult<AnalysisMemo>;
}

/// Retry behavior for reasoner requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

// ============================================================================
// GEMINI REASONER
// ============================================================================

/// Gemini-backed [`MemoReasoner`].
pub struct GeminiReasoner {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: Option<String>,
    retry: RetryConfig,
}

impl GeminiReasoner {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            system_prompt: None,
            retry: RetryConfig::default(),
        }
    }

    /// Build from configuration.
    ///
    /// # Errors
    /// `ReasonerError::MissingApiKey` when no credential is configured.
    pub fn from_config(config: &LandmarkConfig) -> LandmarkResult<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(ReasonerError::MissingApiKey)?;
        Ok(Self::new(api_key, config.model_reasoner.clone()))
    }

    /// Attach a system prompt forwarded verbatim with every request.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Override retry behavior.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the reasoner at a different endpoint. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn attempt(&self, body: &GenerateContentRequest) -> Result<String, ReasonerError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| ReasonerError::RequestFailed {
                provider: "gemini".to_string(),
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReasonerError::RequestFailed {
                provider: "gemini".to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let decoded: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ReasonerError::InvalidResponse {
                    provider: "gemini".to_string(),
                    reason: e.to_string(),
                })?;

        extract_memo_text(&decoded).ok_or_else(|| ReasonerError::InvalidResponse {
            provider: "gemini".to_string(),
            reason: "no candidate text in response".to_string(),
        })
    }
}

#[async_trait]
impl MemoReasoner for GeminiReasoner {
    async fn generate_memo(&self, input: &MemoInput) -> LandmarkResult<AnalysisMemo> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: render_user_prompt(input),
                }],
            }],
            system_instruction: self.system_prompt.as_ref().map(|text| Content {
                parts: vec![Part { text: text.clone() }],
            }),
        };

        let mut backoff = self.retry.initial_backoff;
        let mut last_error = ReasonerError::InvalidResponse {
            provider: "gemini".to_string(),
            reason: "no attempts made".to_string(),
        };

        for attempt in 1..=self.retry.max_attempts {
            match self.attempt(&body).await {
                Ok(memo_markdown) => {
                    let verdict = extract_verdict(&memo_markdown);
                    return Ok(AnalysisMemo {
                        memo_markdown,
                        verdict,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %e,
                        "Memo generation attempt failed"
                    );
                    last_error = e;
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff = Duration::from_secs_f64(
                            (backoff.as_secs_f64() * self.retry.backoff_multiplier)
                                .min(self.retry.max_backoff.as_secs_f64()),
                        );
                    }
                }
            }
        }

        Err(last_error.into())
    }
}

impl std::fmt::Debug for GeminiReasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiReasoner")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

fn extract_memo_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .parts
        .first()
        .map(|part| part.text.clone())
}

/// Parse the verdict from the memo's trailing `Verdict:` line.
fn extract_verdict(memo_markdown: &str) -> String {
    if !memo_markdown.contains(VERDICT_MARKER) {
        return VERDICT_UNKNOWN.to_string();
    }
    memo_markdown
        .rsplit(VERDICT_MARKER)
        .next()
        .map(|tail| tail.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| VERDICT_UNKNOWN.to_string())
}

/// Render the aggregated input as the user prompt.
///
/// A plain sectioned rendering; any richer templating belongs to the prompt
/// files shipped alongside the deployment, not to this crate.
fn render_user_prompt(input: &MemoInput) -> String {
    fn fmt_f64(value: Option<f64>) -> String {
        value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
    }

    let mut prompt = format!(
        "Write an investment memo for {address} ({lat:.5}, {lon:.5}), \
         considering everything within {radius}m.\n\n",
        address = input.address,
        lat = input.lat,
        lon = input.lon,
        radius = input.radius_m,
    );

    prompt.push_str("Metrics:\n");
    prompt.push_str(&format!(
        "- Average price per sqft: {}\n",
        fmt_f64(input.metrics.avg_price_per_sqft)
    ));
    prompt.push_str(&format!(
        "- Sales in window: {}\n",
        input
            .metrics
            .num_sales
            .map_or_else(|| "n/a".to_string(), |v| v.to_string())
    ));
    prompt.push_str(&format!(
        "- Permits per month: {}\n",
        fmt_f64(input.metrics.permits_per_month)
    ));
    prompt.push_str(&format!(
        "- Luxury permit share: {}%\n",
        fmt_f64(input.metrics.lux_pct)
    ));
    prompt.push_str(&format!("- Max FAR: {}\n", fmt_f64(input.metrics.max_far)));

    for (heading, bullets) in [
        ("Amenities", &input.amenities_bullets),
        ("Infrastructure", &input.infra_bullets),
        ("Risks", &input.risk_bullets),
    ] {
        if !bullets.is_empty() {
            prompt.push_str(&format!("\n{}:\n", heading));
            for bullet in bullets {
                prompt.push_str(&format!("- {}\n", bullet));
            }
        }
    }

    if let Some(long_context) = input
        .long_context
        .as_ref()
        .filter(|ctx| !ctx.is_empty())
    {
        prompt.push_str("\nLong-form area context:\n\n");
        prompt.push_str(long_context);
    }

    prompt.push_str("\nEnd the memo with a line of the form \"Verdict: <Buy|Hold|Avoid>\".\n");
    prompt
}

// =============================================================================
// TESTS
// =============================================================================
