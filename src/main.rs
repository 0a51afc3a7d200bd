use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::pipeline::{AnalysisPipeline, AnalysisRequest};
use phishguard::threat_index::ThreatIndex;
use phishguard::{Config, StatsStore};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing page risk scoring combining heuristic rules with an AI classifier")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishguard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("analyze")
                .long("analyze")
                .value_name("URL")
                .help("Analyze a single URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("page-text")
                .long("page-text")
                .value_name("TEXT")
                .help("Page text to include in the analysis")
                .requires("analyze")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("password-field")
                .long("password-field")
                .help("Mark the page as containing a credential input field")
                .requires("analyze")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Analyze a file of URLs, one per line")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-threat")
                .long("check-threat")
                .value_name("URL")
                .help("Check a URL against the known-threat database")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show analysis statistics")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = Config::default().to_file(generate_path) {
            eprintln!("Error writing configuration: {e}");
            process::exit(1);
        }
        println!("Default configuration written to {generate_path}");
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = load_config(config_path);

    let stats = Arc::new(StatsStore::seeded());
    let threat_index = ThreatIndex::with_known_threats();
    let pipeline = match AnalysisPipeline::from_config(&config, Arc::clone(&stats)) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error initializing analysis pipeline: {e}");
            process::exit(1);
        }
    };

    if let Some(url) = matches.get_one::<String>("analyze") {
        if url.trim().is_empty() {
            eprintln!("Error: URL is required");
            process::exit(1);
        }

        let request = AnalysisRequest {
            url: url.clone(),
            page_text: matches.get_one::<String>("page-text").cloned(),
            has_password_field: matches.get_flag("password-field"),
        };

        let result = pipeline.analyze(&request).await;
        print_json(&result);
        return;
    }

    if let Some(batch_path) = matches.get_one::<String>("batch") {
        let urls = match load_url_list(batch_path) {
            Ok(urls) => urls,
            Err(e) => {
                eprintln!("Error reading URL list: {e}");
                process::exit(1);
            }
        };

        let results = pipeline.batch_analyze(&urls).await;
        print_json(&serde_json::json!({
            "results": results,
            "timestamp": chrono::Utc::now(),
        }));
        return;
    }

    if let Some(url) = matches.get_one::<String>("check-threat") {
        print_json(&threat_index.check_url(url));
        return;
    }

    if matches.get_flag("stats") {
        print_json(&stats.report());
        return;
    }

    eprintln!("No action specified. Try --analyze, --batch, --check-threat, or --stats.");
    process::exit(1);
}

fn load_config(path: &str) -> Config {
    if !std::path::Path::new(path).exists() {
        log::debug!("No configuration file at {path}, using defaults");
        return Config::default();
    }

    match Config::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    }
}

fn load_url_list(path: &str) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            process::exit(1);
        }
    }
}
