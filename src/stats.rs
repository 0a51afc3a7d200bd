use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed accuracy figure surfaced on statistics reports.
const ACCURACY_RATE: f64 = 0.9945;

/// The counters tracked by the service. Using an enum instead of string keys
/// makes an unknown counter name unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    TotalUrlsAnalyzed,
    ThreatsBlocked,
    PhishingSites,
    MalwareSites,
    SuspiciousSites,
}

/// Concurrency-safe statistics counters. Each counter is an independent
/// atomic so parallel analyses never contend on a shared lock.
#[derive(Debug, Default)]
pub struct StatsStore {
    total_urls_analyzed: AtomicU64,
    threats_blocked: AtomicU64,
    phishing_sites: AtomicU64,
    malware_sites: AtomicU64,
    suspicious_sites: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_urls_analyzed: u64,
    pub threats_blocked: u64,
    pub phishing_sites: u64,
    pub malware_sites: u64,
    pub suspicious_sites: u64,
}

/// Snapshot plus the derived reporting fields expected by the statistics
/// endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    pub accuracy_rate: f64,
    pub last_update: DateTime<Utc>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters pre-loaded with the demo figures the service ships with.
    pub fn seeded() -> Self {
        Self {
            total_urls_analyzed: AtomicU64::new(1_250_000),
            threats_blocked: AtomicU64::new(45_000),
            phishing_sites: AtomicU64::new(28_000),
            malware_sites: AtomicU64::new(12_000),
            suspicious_sites: AtomicU64::new(5_000),
        }
    }

    pub fn increment(&self, counter: Counter) {
        self.cell(counter).fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.cell(counter).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_urls_analyzed: self.total_urls_analyzed.load(Ordering::Relaxed),
            threats_blocked: self.threats_blocked.load(Ordering::Relaxed),
            phishing_sites: self.phishing_sites.load(Ordering::Relaxed),
            malware_sites: self.malware_sites.load(Ordering::Relaxed),
            suspicious_sites: self.suspicious_sites.load(Ordering::Relaxed),
        }
    }

    /// Snapshot with the reporting fields attached; `last_update` is captured
    /// at call time.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            counters: self.snapshot(),
            accuracy_rate: ACCURACY_RATE,
            last_update: Utc::now(),
        }
    }

    fn cell(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::TotalUrlsAnalyzed => &self.total_urls_analyzed,
            Counter::ThreatsBlocked => &self.threats_blocked,
            Counter::PhishingSites => &self.phishing_sites,
            Counter::MalwareSites => &self.malware_sites,
            Counter::SuspiciousSites => &self.suspicious_sites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_increment_and_get() {
        let stats = StatsStore::new();
        assert_eq!(stats.get(Counter::TotalUrlsAnalyzed), 0);

        stats.increment(Counter::TotalUrlsAnalyzed);
        stats.increment(Counter::TotalUrlsAnalyzed);
        stats.increment(Counter::ThreatsBlocked);

        assert_eq!(stats.get(Counter::TotalUrlsAnalyzed), 2);
        assert_eq!(stats.get(Counter::ThreatsBlocked), 1);
        assert_eq!(stats.get(Counter::PhishingSites), 0);
    }

    #[test]
    fn test_seeded_values() {
        let stats = StatsStore::seeded();
        let snapshot = stats.snapshot();

        assert_eq!(snapshot.total_urls_analyzed, 1_250_000);
        assert_eq!(snapshot.threats_blocked, 45_000);
        assert_eq!(snapshot.phishing_sites, 28_000);
        assert_eq!(snapshot.malware_sites, 12_000);
        assert_eq!(snapshot.suspicious_sites, 5_000);
    }

    #[test]
    fn test_report_fields() {
        let stats = StatsStore::seeded();
        let report = stats.report();

        assert_eq!(report.accuracy_rate, 0.9945);
        assert_eq!(report.counters, stats.snapshot());
    }

    #[test]
    fn test_concurrent_increments_lose_no_updates() {
        let stats = Arc::new(StatsStore::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.increment(Counter::TotalUrlsAnalyzed);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.get(Counter::TotalUrlsAnalyzed), 8000);
    }

    #[test]
    fn test_report_serializes_flat() {
        let stats = StatsStore::new();
        let json = serde_json::to_value(stats.report()).unwrap();

        assert_eq!(json["total_urls_analyzed"], 0);
        assert_eq!(json["accuracy_rate"], 0.9945);
        assert!(json["last_update"].is_string());
    }
}
