use crate::config::ClassifierConfig;
use crate::pipeline::AnalysisRequest;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const FALLBACK_SCORE: u8 = 10;
const FALLBACK_CONFIDENCE: f64 = 0.5;
const FALLBACK_REASON: &str = "AI service unavailable, using safety defaults";

/// Uniform classifier output. The pipeline always receives one of these,
/// whether the oracle answered or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierResult {
    pub score: u8,
    pub reasons: Vec<String>,
    pub confidence: f64,
}

impl ClassifierResult {
    /// Safety default used whenever the oracle cannot be consulted.
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            reasons: vec![FALLBACK_REASON.to_string()],
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

/// Seam between the pipeline and whatever produces classifier scores.
/// Implementations must not fail; degraded output is returned instead.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &AnalysisRequest) -> ClassifierResult;
}

#[derive(Debug, Serialize)]
struct OracleRequest<'a> {
    url: &'a str,
}

/// A well-formed oracle answer: the phishing flag and a probability in [0,1].
#[derive(Debug, Clone, Copy, PartialEq)]
struct OracleVerdict {
    phishing: bool,
    probability: f64,
}

/// Adapter for the external classification oracle. Any transport or shape
/// failure is logged and collapsed into the fallback result.
pub struct ClassifierAdapter {
    client: Client,
    endpoint: String,
}

impl ClassifierAdapter {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("PhishGuard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build classifier HTTP client")?;

        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    pub fn with_client(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    async fn query_oracle(&self, url: &str) -> Result<OracleVerdict> {
        let response = self
            .client
            .post(format!("{}/classify", self.endpoint))
            .json(&OracleRequest { url })
            .send()
            .await
            .context("Oracle request failed")?
            .error_for_status()
            .context("Oracle returned an error status")?;

        let body: serde_json::Value = response
            .json()
            .await
            .context("Oracle response was not valid JSON")?;

        parse_verdict(&body)
    }

    fn result_from_verdict(verdict: OracleVerdict) -> ClassifierResult {
        let reason = if verdict.phishing {
            format!(
                "AI detected high intent of credential harvesting (prob: {:.2})",
                verdict.probability
            )
        } else {
            "AI analysis indicates a low-risk informational page".to_string()
        };

        ClassifierResult {
            score: (verdict.probability * 100.0).round() as u8,
            reasons: vec![reason],
            confidence: verdict.probability,
        }
    }
}

#[async_trait]
impl Classifier for ClassifierAdapter {
    async fn classify(&self, request: &AnalysisRequest) -> ClassifierResult {
        log::debug!("Calling AI service at: {}/classify", self.endpoint);

        match self.query_oracle(&request.url).await {
            Ok(verdict) => Self::result_from_verdict(verdict),
            Err(e) => {
                log::error!("AI service call failed: {e:#}. Falling back to safety defaults.");
                ClassifierResult::fallback()
            }
        }
    }
}

/// Validate the oracle's answer field by field. Wrong types, missing fields,
/// and out-of-range probabilities are all rejected the same way.
fn parse_verdict(body: &serde_json::Value) -> Result<OracleVerdict> {
    let phishing = body
        .get("phishing")
        .and_then(serde_json::Value::as_bool)
        .context("Oracle response missing boolean 'phishing' field")?;

    let probability = body
        .get("probability")
        .and_then(serde_json::Value::as_f64)
        .context("Oracle response missing numeric 'probability' field")?;

    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        bail!("Oracle probability out of range: {probability}");
    }

    Ok(OracleVerdict {
        phishing,
        probability,
    })
}
