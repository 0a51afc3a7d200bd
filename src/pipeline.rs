use crate::aggregator::RiskAggregator;
use crate::classifier::{Classifier, ClassifierAdapter};
use crate::config::Config;
use crate::heuristics::HeuristicEvaluator;
use crate::stats::{Counter, StatsStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Final scores at or above this are classified as phishing.
const PHISHING_THRESHOLD: u8 = 50;

/// A page submitted for analysis. The URL is validated as non-blank at the
/// transport boundary before it reaches the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(default)]
    pub page_text: Option<String>,
    #[serde(default)]
    pub has_password_field: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "PHISHING")]
    Phishing,
    #[serde(rename = "SAFE")]
    Safe,
}

impl Classification {
    pub fn from_score(score: u8) -> Self {
        if score >= PHISHING_THRESHOLD {
            Classification::Phishing
        } else {
            Classification::Safe
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Phishing => write!(f, "PHISHING"),
            Classification::Safe => write!(f, "SAFE"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub risk_score: u8,
    pub classification: Classification,
    pub reasons: Vec<String>,
    pub confidence: f64,
}

/// One row of a batch analysis summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub url: String,
    pub classification: Classification,
    pub normalized_score: f64,
}

/// Orchestrates a single analysis: heuristics and the classifier feed the
/// aggregator, the final score is thresholded, and the shared counters are
/// updated.
pub struct AnalysisPipeline {
    heuristics: HeuristicEvaluator,
    classifier: Box<dyn Classifier>,
    aggregator: RiskAggregator,
    stats: Arc<StatsStore>,
}

impl AnalysisPipeline {
    pub fn new(
        classifier: Box<dyn Classifier>,
        aggregator: RiskAggregator,
        stats: Arc<StatsStore>,
    ) -> Self {
        Self {
            heuristics: HeuristicEvaluator::new(),
            classifier,
            aggregator,
            stats,
        }
    }

    /// Pipeline wired to the external oracle named in the configuration.
    pub fn from_config(config: &Config, stats: Arc<StatsStore>) -> anyhow::Result<Self> {
        let adapter = ClassifierAdapter::new(&config.classifier)?;
        Ok(Self::new(
            Box::new(adapter),
            RiskAggregator::new(config.weights),
            stats,
        ))
    }

    /// Analyze one request. Infallible: classifier unavailability degrades to
    /// the fallback result, never an error.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        let start = Instant::now();
        log::info!("Starting analysis for URL: {}", request.url);

        self.stats.increment(Counter::TotalUrlsAnalyzed);

        let heuristic = self.heuristics.evaluate(request);
        let classifier = self.classifier.classify(request).await;

        let risk_score = self
            .aggregator
            .aggregate(heuristic.score, classifier.score);
        let classification = Classification::from_score(risk_score);

        if classification == Classification::Phishing {
            self.stats.increment(Counter::ThreatsBlocked);
            self.stats.increment(Counter::PhishingSites);
        }

        // Heuristic reasons always precede classifier reasons.
        let mut reasons = heuristic.reasons;
        reasons.extend(classifier.reasons);

        log::info!(
            "Analysis completed in {} ms. Risk Score: {}, Classification: {}",
            start.elapsed().as_millis(),
            risk_score,
            classification
        );

        AnalysisResult {
            risk_score,
            classification,
            reasons,
            confidence: classifier.confidence,
        }
    }

    /// Run the single-request path for each URL with empty page context.
    /// Results come back in input order; individual analyses cannot fail.
    pub async fn batch_analyze(&self, urls: &[String]) -> Vec<BatchEntry> {
        let mut results = Vec::with_capacity(urls.len());

        for url in urls {
            let request = AnalysisRequest {
                url: url.clone(),
                page_text: None,
                has_password_field: false,
            };
            let analysis = self.analyze(&request).await;

            results.push(BatchEntry {
                url: url.clone(),
                classification: analysis.classification,
                normalized_score: f64::from(analysis.risk_score) / 100.0,
            });
        }

        results
    }

    /// Fire-and-forget analytics ingestion; no scoring effect.
    pub fn process_analytics(&self, event: &serde_json::Value) {
        log::info!("Processing analytics event: {event}");
    }

    /// Fire-and-forget false positive report; no scoring effect.
    pub fn process_report(&self, report: &serde_json::Value) {
        log::info!("Processing false positive report: {report}");
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierResult;
    use async_trait::async_trait;

    struct FixedClassifier(ClassifierResult);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _request: &AnalysisRequest) -> ClassifierResult {
            self.0.clone()
        }
    }

    fn pipeline_with(result: ClassifierResult) -> AnalysisPipeline {
        AnalysisPipeline::new(
            Box::new(FixedClassifier(result)),
            RiskAggregator::default(),
            Arc::new(StatsStore::new()),
        )
    }

    fn scored(score: u8, confidence: f64) -> ClassifierResult {
        ClassifierResult {
            score,
            reasons: vec!["AI analysis indicates a low-risk informational page".to_string()],
            confidence,
        }
    }

    fn request(url: &str) -> AnalysisRequest {
        AnalysisRequest {
            url: url.to_string(),
            page_text: None,
            has_password_field: false,
        }
    }

    #[test]
    fn test_threshold_is_inclusive_at_50() {
        assert_eq!(Classification::from_score(49), Classification::Safe);
        assert_eq!(Classification::from_score(50), Classification::Phishing);
        assert_eq!(Classification::from_score(0), Classification::Safe);
        assert_eq!(Classification::from_score(100), Classification::Phishing);
    }

    #[tokio::test]
    async fn test_phishing_verdict_updates_threat_counters() {
        // Clean URL: heuristics contribute 0, so 0.6 * 84 rounds to 50.
        let pipeline = pipeline_with(scored(84, 0.84));
        let result = pipeline.analyze(&request("https://a.com")).await;

        assert_eq!(result.risk_score, 50);
        assert_eq!(result.classification, Classification::Phishing);
        assert_eq!(pipeline.stats().get(Counter::TotalUrlsAnalyzed), 1);
        assert_eq!(pipeline.stats().get(Counter::ThreatsBlocked), 1);
        assert_eq!(pipeline.stats().get(Counter::PhishingSites), 1);
    }

    #[tokio::test]
    async fn test_safe_verdict_only_counts_analysis() {
        // 0.6 * 81 rounds to 49, one below the threshold.
        let pipeline = pipeline_with(scored(81, 0.81));
        let result = pipeline.analyze(&request("https://a.com")).await;

        assert_eq!(result.risk_score, 49);
        assert_eq!(result.classification, Classification::Safe);
        assert_eq!(pipeline.stats().get(Counter::TotalUrlsAnalyzed), 1);
        assert_eq!(pipeline.stats().get(Counter::ThreatsBlocked), 0);
        assert_eq!(pipeline.stats().get(Counter::PhishingSites), 0);
    }

    #[tokio::test]
    async fn test_heuristic_reasons_come_first() {
        let pipeline = pipeline_with(scored(20, 0.2));
        let request = AnalysisRequest {
            url: "https://a.b.c.d.example.com".to_string(),
            page_text: Some("verify your account".to_string()),
            has_password_field: false,
        };

        let result = pipeline.analyze(&request).await;
        assert_eq!(
            result.reasons,
            vec![
                "High number of subdomains detected",
                "Urgent or suspicious language detected in page text",
                "AI analysis indicates a low-risk informational page",
            ]
        );
    }

    #[tokio::test]
    async fn test_confidence_passes_through() {
        let pipeline = pipeline_with(scored(30, 0.37));
        let result = pipeline.analyze(&request("https://a.com")).await;
        assert_eq!(result.confidence, 0.37);
    }

    #[tokio::test]
    async fn test_full_heuristic_score_with_fallback_is_safe() {
        // All four rules fire, heuristics clamp at 100; the fallback score of
        // 10 still drags the weighted total below the threshold.
        let pipeline = pipeline_with(ClassifierResult::fallback());
        let request = AnalysisRequest {
            url: "http://a-very-long-domain-that-exceeds-seventy-five-characters-in-total-length.example.com".to_string(),
            page_text: Some("please verify immediately".to_string()),
            has_password_field: true,
        };

        let result = pipeline.analyze(&request).await;
        assert_eq!(result.risk_score, 46);
        assert_eq!(result.classification, Classification::Safe);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(
            result.reasons.last().map(String::as_str),
            Some("AI service unavailable, using safety defaults")
        );
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_normalizes_scores() {
        let pipeline = pipeline_with(scored(84, 0.84));
        let urls = vec!["a.com".to_string(), "b.com".to_string()];

        let results = pipeline.batch_analyze(&urls).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "a.com");
        assert_eq!(results[1].url, "b.com");
        for entry in &results {
            assert_eq!(entry.classification, Classification::Phishing);
            assert_eq!(entry.normalized_score, 0.5);
        }
        assert_eq!(pipeline.stats().get(Counter::TotalUrlsAnalyzed), 2);
    }

    #[test]
    fn test_result_serialization_shape() {
        let result = AnalysisResult {
            risk_score: 46,
            classification: Classification::Safe,
            reasons: vec!["URL length is unusually long".to_string()],
            confidence: 0.5,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["riskScore"], 46);
        assert_eq!(json["classification"], "SAFE");
        assert_eq!(json["confidence"], 0.5);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(request.url, "https://example.com");
        assert!(request.page_text.is_none());
        assert!(!request.has_password_field);
    }
}
