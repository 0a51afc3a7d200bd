pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod heuristics;
pub mod pipeline;
pub mod stats;
pub mod threat_index;

pub use aggregator::{RiskAggregator, ScoringWeights};
pub use classifier::{Classifier, ClassifierAdapter, ClassifierResult};
pub use config::Config;
pub use heuristics::{HeuristicEvaluator, HeuristicResult};
pub use pipeline::{AnalysisPipeline, AnalysisRequest, AnalysisResult, BatchEntry, Classification};
pub use stats::{Counter, StatsStore};
pub use threat_index::{ThreatCheck, ThreatIndex, ThreatRecord};
