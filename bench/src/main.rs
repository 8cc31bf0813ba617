//! Concurrent latency/throughput benchmark for the medicine search API.
//!
//! ```text
//! medicine-bench --api http://localhost:8000 --requests 50 \
//!     --query Ava=prefix:Ava --query Avastn=fuzzy:Avastn
//! ```

mod harness;
mod types;

use clap::Parser;
use harness::BenchmarkHarness;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use types::BenchmarkQuery;

#[derive(Parser, Debug)]
#[command(name = "medicine-bench")]
#[command(author, version, about = "Benchmark the medicine search API", long_about = None)]
struct Cli {
    /// Base URL of the search API
    #[arg(long, env = "MEDSEARCH_API", default_value = "http://localhost:8000")]
    api: String,

    /// Concurrent requests issued per query
    #[arg(long, default_value_t = 50)]
    requests: usize,

    /// `limit` sent with every request
    #[arg(long, default_value_t = 50)]
    limit: i64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30.0)]
    timeout: f64,

    /// Query as `label=strategy:text`; repeatable. Defaults to the reference set.
    #[arg(long = "query", value_name = "LABEL=STRATEGY:TEXT")]
    queries: Vec<BenchmarkQuery>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.requests > 0, "--requests must be at least 1");
    anyhow::ensure!(cli.limit > 0, "--limit must be at least 1");
    let timeout = Duration::try_from_secs_f64(cli.timeout)?;

    let queries = if cli.queries.is_empty() {
        BenchmarkQuery::defaults()
    } else {
        cli.queries
    };

    let harness = BenchmarkHarness::new(&cli.api, cli.limit, timeout)?;
    let report = harness.run(&queries, cli.requests).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
