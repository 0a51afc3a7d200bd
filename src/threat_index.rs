use serde::Serialize;
use std::collections::HashMap;
use url::Url;

const KNOWN_THREAT_CONFIDENCE: f64 = 0.98;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatRecord {
    pub risk_level: String,
    pub threat_type: String,
}

/// Response shape for a direct threat-database check.
#[derive(Debug, Clone, Serialize)]
pub struct ThreatCheck {
    pub url: String,
    pub in_database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Static hostname -> threat record lookup, populated at start-up and
/// read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct ThreatIndex {
    records: HashMap<String, ThreatRecord>,
}

impl ThreatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index seeded with the known-bad hostnames the service ships with.
    pub fn with_known_threats() -> Self {
        let mut index = Self::new();
        index.insert("phishing-site-example.com", "HIGH", "phishing");
        index.insert("malware-distribution.net", "HIGH", "malware");
        index
    }

    fn insert(&mut self, hostname: &str, risk_level: &str, threat_type: &str) {
        self.records.insert(
            hostname.to_string(),
            ThreatRecord {
                risk_level: risk_level.to_string(),
                threat_type: threat_type.to_string(),
            },
        );
    }

    pub fn lookup(&self, hostname: &str) -> Option<&ThreatRecord> {
        self.records.get(hostname)
    }

    /// Check a full URL against the index. Falls back to the raw input as the
    /// lookup key when the URL does not parse.
    pub fn check_url(&self, url: &str) -> ThreatCheck {
        let hostname = extract_hostname(url);

        match self.lookup(&hostname) {
            Some(record) => ThreatCheck {
                url: url.to_string(),
                in_database: true,
                risk_level: Some(record.risk_level.clone()),
                threat_type: Some(record.threat_type.clone()),
                confidence: Some(KNOWN_THREAT_CONFIDENCE),
            },
            None => ThreatCheck {
                url: url.to_string(),
                in_database: false,
                risk_level: None,
                threat_type: None,
                confidence: None,
            },
        }
    }
}

/// Host component of the URL, or the raw input when parsing fails.
fn extract_hostname(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}
