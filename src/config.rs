use crate::aggregator::ScoringWeights;
use serde::{Deserialize, Serialize};

/// Service configuration, loaded from YAML. Every field has a default so an
/// absent or partial file still yields a runnable service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Base address of the classification oracle.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Upper bound on the outbound classify call.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "http://localhost:5001".to_string()
}

fn default_timeout_seconds() -> u64 {
    5
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
