//! Benchmark Harness
//!
//! Fires `requests_per_query` concurrent requests per labelled query at the
//! live search API and summarizes latency and throughput. Labels run one after
//! another, so batches never compete with each other.

use crate::types::{BenchmarkQuery, BenchmarkReport, QueryReport};

use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Fields kept in the response preview.
pub const PREVIEW_FIELDS: [&str; 5] = [
    "name",
    "manufacturer_name",
    "marketer_name",
    "type",
    "price",
];
pub const PREVIEW_ROWS: usize = 5;

pub struct BenchmarkHarness {
    client: reqwest::Client,
    api: String,
    limit: i64,
}

/// Result of one request. `rows` is `None` for transport errors, non-2xx
/// statuses and bodies that are not a JSON array.
struct Sample {
    index: usize,
    elapsed: Duration,
    rows: Option<Vec<Value>>,
}

impl BenchmarkHarness {
    pub fn new(api: &str, limit: i64, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api: api.trim_end_matches('/').to_string(),
            limit,
        })
    }

    pub async fn run(
        &self,
        queries: &[BenchmarkQuery],
        requests_per_query: usize,
    ) -> BenchmarkReport {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            tracing::info!(
                "Benchmarking {} with {} concurrent request(s)",
                query,
                requests_per_query
            );
            results.push(self.benchmark_query(query, requests_per_query).await);
        }

        BenchmarkReport {
            api: self.api.clone(),
            requests_per_query,
            results,
        }
    }

    async fn benchmark_query(&self, query: &BenchmarkQuery, requests: usize) -> QueryReport {
        let endpoint = query.strategy.endpoint();
        let url = format!("{}{}", self.api, endpoint);

        let started = Instant::now();
        let mut batch = JoinSet::new();
        for index in 0..requests {
            let client = self.client.clone();
            let url = url.clone();
            let text = query.text.clone();
            let limit = self.limit;
            batch.spawn(async move { run_one(client, url, text, limit, index).await });
        }

        let mut samples = Vec::with_capacity(requests);
        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok(sample) => samples.push(sample),
                Err(err) => tracing::error!("Benchmark request task failed: {}", err),
            }
        }
        let wall_clock = started.elapsed();
        samples.sort_by_key(|sample| sample.index);

        summarize(query, endpoint, requests, &samples, wall_clock)
    }
}

async fn run_one(
    client: reqwest::Client,
    url: String,
    text: String,
    limit: i64,
    index: usize,
) -> Sample {
    let limit = limit.to_string();
    let started = Instant::now();
    let response = client
        .get(&url)
        .query(&[("q", text.as_str()), ("limit", limit.as_str())])
        .send()
        .await;

    let rows = match response {
        Ok(response) if response.status().is_success() => {
            match response.json::<Vec<Value>>().await {
                Ok(rows) => Some(rows),
                Err(err) => {
                    tracing::debug!("Unreadable response from {}: {}", url, err);
                    None
                }
            }
        }
        Ok(response) => {
            tracing::debug!("{} answered {}", url, response.status());
            None
        }
        Err(err) => {
            tracing::debug!("Request to {} failed: {}", url, err);
            None
        }
    };

    Sample {
        index,
        elapsed: started.elapsed(),
        rows,
    }
}

fn summarize(
    query: &BenchmarkQuery,
    endpoint: String,
    requests: usize,
    samples: &[Sample],
    wall_clock: Duration,
) -> QueryReport {
    // Tasks that never reported back count as failures too.
    let failures = requests - samples.iter().filter(|sample| sample.rows.is_some()).count();

    let avg_latency_ms = if samples.is_empty() {
        0.0
    } else {
        let total: f64 = samples.iter().map(|sample| sample.elapsed.as_secs_f64()).sum();
        total / samples.len() as f64 * 1000.0
    };
    let throughput_rps = if wall_clock.is_zero() {
        0.0
    } else {
        requests as f64 / wall_clock.as_secs_f64()
    };

    let sample_rows: &[Value] = samples
        .first()
        .and_then(|sample| sample.rows.as_deref())
        .unwrap_or(&[]);

    QueryReport {
        label: query.label.clone(),
        strategy: query.strategy,
        endpoint,
        requests,
        failures,
        avg_latency_ms,
        throughput_rps,
        sample_response_count: sample_rows.len(),
        sample_response_preview: preview(sample_rows),
    }
}

/// First [`PREVIEW_ROWS`] rows, each reduced to the [`PREVIEW_FIELDS`] it has.
pub fn preview(rows: &[Value]) -> Vec<Map<String, Value>> {
    rows.iter()
        .take(PREVIEW_ROWS)
        .map(|row| {
            PREVIEW_FIELDS
                .iter()
                .filter_map(|field| row.get(*field).map(|value| (field.to_string(), value.clone())))
                .collect()
        })
        .collect()
}
