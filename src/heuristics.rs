use crate::pipeline::AnalysisRequest;
use lazy_static::lazy_static;
use regex::Regex;

const LONG_URL_THRESHOLD: usize = 75;
const MAX_DOT_COUNT: usize = 3;

const LONG_URL_SCORE: u8 = 20;
const SUBDOMAIN_SCORE: u8 = 20;
const URGENT_LANGUAGE_SCORE: u8 = 30;
const PASSWORD_FIELD_SCORE: u8 = 30;

lazy_static! {
    // Substring containment on the lowercased text, no word boundaries.
    static ref URGENT_LANGUAGE: Regex =
        Regex::new(r"(?i)urgent|verify|suspended|immediately").unwrap();
}

/// Outcome of the rule-based evaluation: a 0-100 point total and one reason
/// per triggered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicResult {
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Rule-based scorer over surface features of the request. Pure and
/// infallible; every rule is additive and independently triggered, with the
/// total clamped to 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, request: &AnalysisRequest) -> HeuristicResult {
        let mut score: u32 = 0;
        let mut reasons = Vec::new();

        if request.url.len() > LONG_URL_THRESHOLD {
            score += u32::from(LONG_URL_SCORE);
            reasons.push("URL length is unusually long".to_string());
        }

        if request.url.matches('.').count() > MAX_DOT_COUNT {
            score += u32::from(SUBDOMAIN_SCORE);
            reasons.push("High number of subdomains detected".to_string());
        }

        if let Some(text) = &request.page_text {
            if URGENT_LANGUAGE.is_match(text) {
                score += u32::from(URGENT_LANGUAGE_SCORE);
                reasons.push("Urgent or suspicious language detected in page text".to_string());
            }
        }

        if request.has_password_field {
            score += u32::from(PASSWORD_FIELD_SCORE);
            reasons.push("Credential input field present on a suspicious page".to_string());
        }

        HeuristicResult {
            score: score.min(100) as u8,
            reasons,
        }
    }
}
