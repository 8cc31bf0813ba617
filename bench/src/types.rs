use medicine_search::search::types::Strategy;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One labelled query sent to one strategy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkQuery {
    pub label: String,
    pub strategy: Strategy,
    pub text: String,
}

impl BenchmarkQuery {
    pub fn new(label: impl Into<String>, strategy: Strategy, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            strategy,
            text: text.into(),
        }
    }

    /// The queries of the reference benchmark run.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Ava", Strategy::Prefix, "Ava"),
            Self::new("Injection", Strategy::Substring, "Injection"),
            Self::new("antibiotic", Strategy::Fulltext, "antibiotic"),
            Self::new("Avastn", Strategy::Fuzzy, "Avastn"),
        ]
    }
}

impl fmt::Display for BenchmarkQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}:{}", self.label, self.strategy, self.text)
    }
}

/// Parses `label=strategy:text`.
impl FromStr for BenchmarkQuery {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (label, target) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected label=strategy:text, got `{}`", raw))?;
        let (strategy, text) = target
            .split_once(':')
            .ok_or_else(|| format!("expected strategy:text after `{}=`", label))?;

        if label.is_empty() {
            return Err("query label must not be empty".to_string());
        }
        if text.is_empty() {
            return Err(format!("query text for `{}` must not be empty", label));
        }
        let strategy: Strategy = strategy.parse().map_err(|err| format!("{}", err))?;

        Ok(Self::new(label, strategy, text))
    }
}

/// Measurements of one label's concurrent batch.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub label: String,
    pub strategy: Strategy,
    pub endpoint: String,
    pub requests: usize,
    pub failures: usize,
    pub avg_latency_ms: f64,
    pub throughput_rps: f64,
    pub sample_response_count: usize,
    pub sample_response_preview: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub api: String,
    pub requests_per_query: usize,
    pub results: Vec<QueryReport>,
}
