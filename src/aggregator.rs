use serde::{Deserialize, Serialize};

/// Relative weights applied when combining the heuristic and classifier
/// scores. Defaults favor the classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_heuristic_weight")]
    pub heuristic: f64,
    #[serde(default = "default_classifier_weight")]
    pub classifier: f64,
}

fn default_heuristic_weight() -> f64 {
    0.4
}

fn default_classifier_weight() -> f64 {
    0.6
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            heuristic: default_heuristic_weight(),
            classifier: default_classifier_weight(),
        }
    }
}

/// Combines the two sub-scores into the final risk score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAggregator {
    weights: ScoringWeights,
}

impl RiskAggregator {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Weighted sum rounded half-up. Stays in [0,100] for inputs in [0,100]
    /// under the default weights.
    pub fn aggregate(&self, heuristic_score: u8, classifier_score: u8) -> u8 {
        let combined = f64::from(heuristic_score) * self.weights.heuristic
            + f64::from(classifier_score) * self.weights.classifier;
        combined.round().clamp(0.0, 100.0) as u8
    }
}
