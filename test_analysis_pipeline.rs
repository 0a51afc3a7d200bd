use phishguard::pipeline::{AnalysisPipeline, AnalysisRequest};
use phishguard::threat_index::ThreatIndex;
use phishguard::{Config, StatsStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing the analysis pipeline with the oracle offline (fallback path)...");

    let mut config = Config::default();
    // Nothing listens here; every classify call should hit the fallback.
    config.classifier.endpoint = "http://127.0.0.1:9".to_string();
    config.classifier.timeout_seconds = 1;

    let stats = Arc::new(StatsStore::seeded());
    let pipeline = AnalysisPipeline::from_config(&config, Arc::clone(&stats))?;

    println!("\n=== Suspicious page, all heuristics firing ===");
    let request = AnalysisRequest {
        url: "http://a-very-long-domain-that-exceeds-seventy-five-characters-in-total-length.example.com".to_string(),
        page_text: Some("URGENT: verify your account immediately or it will be suspended".to_string()),
        has_password_field: true,
    };
    let result = pipeline.analyze(&request).await;
    println!("Risk score: {}", result.risk_score);
    println!("Classification: {}", result.classification);
    println!("Confidence: {}", result.confidence);
    for reason in &result.reasons {
        println!("  - {reason}");
    }

    println!("\n=== Clean page ===");
    let request = AnalysisRequest {
        url: "https://example.com".to_string(),
        page_text: Some("Welcome to our documentation".to_string()),
        has_password_field: false,
    };
    let result = pipeline.analyze(&request).await;
    println!("Risk score: {}", result.risk_score);
    println!("Classification: {}", result.classification);

    println!("\n=== Batch of three URLs ===");
    let urls = vec![
        "https://a.com".to_string(),
        "https://login.account.secure.update.example.net".to_string(),
        "https://b.org".to_string(),
    ];
    for entry in pipeline.batch_analyze(&urls).await {
        println!(
            "{} -> {} ({:.2})",
            entry.url, entry.classification, entry.normalized_score
        );
    }

    println!("\n=== Threat database checks ===");
    let threat_index = ThreatIndex::with_known_threats();
    for url in [
        "https://phishing-site-example.com/login",
        "https://example.com",
    ] {
        let check = threat_index.check_url(url);
        println!(
            "{url}: in_database={} risk_level={:?}",
            check.in_database, check.risk_level
        );
    }

    println!("\n=== Statistics after this run ===");
    println!("{}", serde_json::to_string_pretty(&stats.report())?);

    Ok(())
}
