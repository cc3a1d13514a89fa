// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Submits the geospatial query, lets it run, stops it and measures the
//! results it wrote.

use crate::metrics::{count_result_lines, BenchmarkMetrics};
use crate::rainbow::{rainbow_banner, rainbow_println};
use crate::sampler::tick_count;
use crate::summary::{append_summary, PerformanceSummary};
use humantime::parse_duration;
use lazy_static::lazy_static;
use log::{error, info, warn};
use nebula::prelude::*;
use nebula::workload::sncb::{geospatial_details, geospatial_threshold};
use std::time::Duration;
use structopt::StructOpt;

lazy_static! {
    static ref PERF_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Submits the geospatial query, measures it and appends one summary row per
/// run.
#[derive(Default, Clone, Debug, StructOpt)]
pub struct PerfBenchmarkOpt {
    /// Sets a custom config file
    #[structopt(short = "c", long = "config")]
    pub config: Option<String>,

    /// The coordinator's host
    #[structopt(long = "host")]
    pub host: Option<String>,

    /// The coordinator's REST port
    #[structopt(long = "port")]
    pub port: Option<u16>,

    /// How long the query runs before it is stopped, e.g. 60s
    #[structopt(short = "d", long = "duration", parse(try_from_str = parse_duration))]
    pub duration: Option<Duration>,

    /// Time between two status polls, e.g. 5s
    #[structopt(short = "i", long = "interval", parse(try_from_str = parse_duration))]
    pub interval: Option<Duration>,

    /// The result file the query's sink writes
    #[structopt(short = "f", long = "file")]
    pub output: Option<String>,

    /// The summary file a row is appended to
    #[structopt(long = "summary")]
    pub summary: Option<String>,
}

/// Runs the performance benchmark. Fails when the coordinator cannot be
/// reached; any later error only marks the run as failed.
pub async fn perf_benchmark(opt: PerfBenchmarkOpt) -> Result<BenchmarkMetrics> {
    let conf = NebulaConfig::load(opt.config.as_deref())?;
    let host = opt.host.unwrap_or_else(|| conf.coordinator_host.clone());
    let port = opt.port.unwrap_or(conf.coordinator_port);
    let duration = opt.duration.unwrap_or(conf.benchmark_duration);
    let interval = opt.interval.unwrap_or(conf.sample_interval);
    let output = opt.output.unwrap_or_else(|| conf.perf_output.clone());
    let summary = opt.summary.unwrap_or_else(|| conf.perf_summary.clone());
    let ticks = tick_count(duration, interval)?;

    rainbow_banner("SNCB Query1 Performance Benchmark");
    println!("Connecting to the coordinator at {}:{}", host, port);
    let client = RemoteClient::new(&host, port, *PERF_CONNECT_TIMEOUT)?;
    if !client.test_connection().await {
        return Err(NebulaError::Connection(format!(
            "failed to connect to the coordinator at {}:{}",
            host, port
        )));
    }
    println!("[OK] Connected to the coordinator");

    let details = geospatial_details();
    let query = geospatial_threshold(DataSinkType::csv_file(&output));
    println!("\nCreating geospatial query with:");
    println!("  - Source: {}", details.source);
    println!("  - Filter: {}", details.filter);
    println!("  - Window: {}", details.window);
    println!("  - Aggregation: {}", details.aggregation);

    rainbow_println("\n=== Starting Performance Test ===");
    println!("Test duration: {}", humantime::format_duration(duration));

    let mut metrics = BenchmarkMetrics::start();
    let config = QueryConfig::new(conf.placement);
    if let Err(e) = measure(&client, &query, &config, interval, ticks, &mut metrics).await {
        error!("Performance test failed: {}", e);
        metrics.query_success = false;
    }

    metrics.total_results = count_result_lines(&output).unwrap_or_else(|e| {
        warn!("Failed to read {}: {}", output, e);
        0
    });
    metrics.finish();
    info!(
        "{} results in {:.2}s, {:.2} results/s",
        metrics.total_results, metrics.duration_secs, metrics.throughput
    );

    print_results(&metrics, &details, &output);
    match append_summary(&summary, &PerformanceSummary::new(&metrics, details)) {
        Ok(()) => println!("\n[OK] Results saved to {}", summary),
        Err(e) => error!("Failed to save results to {}: {}", summary, e),
    }
    Ok(metrics)
}

/// Submits the query, polls its status once per interval for `ticks`
/// intervals and stops it. The run succeeds when the coordinator confirms the stop.
async fn measure(
    client: &RemoteClient,
    query: &Query,
    config: &QueryConfig,
    interval: Duration,
    ticks: u32,
    metrics: &mut BenchmarkMetrics,
) -> Result<()> {
    println!("Submitting geospatial query...");
    let id = client.submit_query(query, config).await?;
    println!("[OK] Query submitted with ID: {}", id);

    println!("\nMonitoring query execution...");
    println!("Time(s) | Status");
    println!("--------|--------");
    for tick in 1..=ticks {
        tokio::time::sleep(interval).await;
        let elapsed = (interval * tick).as_secs();
        match client.get_query_status(id).await {
            Ok(status) => println!("{:>7} | {}", elapsed, status),
            Err(e) => println!("{:>7} | ERROR: {}", elapsed, e),
        }
    }
    metrics.processed();

    println!("\nStopping query...");
    metrics.query_success = client.stop_query(id).await?;
    if metrics.query_success {
        println!("[OK] Query stopped successfully");
    } else {
        println!("Failed to stop query properly");
    }
    Ok(())
}

fn print_results(metrics: &BenchmarkMetrics, details: &QueryDetails, output: &str) {
    rainbow_println("\n=== SNCB Query1 Performance Results ===");
    println!(
        "Query Success: {}",
        if metrics.query_success { "YES" } else { "NO" }
    );
    println!("Processing Time: {:.2} ms", metrics.processing_time_ms);
    println!("Total Results: {} tuples", metrics.total_results);
    println!("Throughput: {:.2} results/second", metrics.throughput);
    println!("Average Latency: {:.2} ms", metrics.latency_ms());
    println!("Total Test Duration: {:.2} seconds", metrics.duration_secs);

    rainbow_println("\n=== Query Details ===");
    println!("Source: {}", details.source);
    println!("Filter: {}", details.filter);
    println!("Window: {}", details.window);
    println!("Aggregation: {}", details.aggregation);
    println!("Output: {}", output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::SummaryRecord;
    use nebula::test_util::MockCoordinator;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    async fn coordinator(stop_status: u16) -> Result<MockCoordinator> {
        let mock = MockCoordinator::start().await?;
        mock.respond("GET", &NEBULA_CONNECTIVITY_PATH, 200, json!({ "success": true }))
            .await;
        mock.respond("POST", &NEBULA_EXECUTE_QUERY_PATH, 200, json!({ "queryId": 3 }))
            .await;
        mock.respond("GET", &NEBULA_QUERY_STATUS_PATH, 500, json!({ "message": "busy" }))
            .await;
        mock.respond("GET", &NEBULA_QUERY_STATUS_PATH, 200, json!({ "status": "RUNNING" }))
            .await;
        mock.respond("DELETE", &NEBULA_STOP_QUERY_PATH, stop_status, json!({ "success": true }))
            .await;
        Ok(mock)
    }

    fn opt(dir: &Path, port: u16) -> PerfBenchmarkOpt {
        PerfBenchmarkOpt {
            host:     Some("127.0.0.1".to_string()),
            port:     Some(port),
            duration: Some(Duration::from_millis(30)),
            interval: Some(Duration::from_millis(10)),
            output:   Some(dir.join("results.csv").to_string_lossy().into_owned()),
            summary:  Some(dir.join("summary.csv").to_string_lossy().into_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn measures_a_stopped_query() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("results.csv"), "1,2\n3,4\n")?;
        let mock = coordinator(200).await?;

        let metrics = perf_benchmark(opt(dir.path(), mock.port())).await?;
        assert!(metrics.query_success);
        assert_eq!(2, metrics.total_results);
        assert!(metrics.processing_time_ms >= 30.0);
        assert_eq!(metrics.processing_time_ms, metrics.latency_ms());

        let requests = mock.requests().await;
        let submitted: serde_json::Value = serde_json::from_str(&requests[1].body)?;
        assert!(submitted["userQuery"]
            .as_str()
            .unwrap_or_default()
            .contains("results.csv"));
        assert_eq!(
            3,
            requests
                .iter()
                .filter(|r| r.target.contains("query-status"))
                .count()
        );

        let summary = fs::read_to_string(dir.path().join("summary.csv"))?;
        let rows: Vec<_> = summary.lines().collect();
        assert_eq!(PerformanceSummary::HEADER, rows[0]);
        assert!(rows[1].contains(",true,"));
        assert!(rows[1].ends_with(
            ",sncb,\"(Code1 != 0 || Code2 != 0)\",\"ThresholdWindow(teintersects)\",Sum(speed)"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn failed_stop_still_writes_a_row() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mock = coordinator(500).await?;

        let metrics = perf_benchmark(opt(dir.path(), mock.port())).await?;
        assert!(!metrics.query_success);
        assert_eq!(0, metrics.total_results);

        let summary = fs::read_to_string(dir.path().join("summary.csv"))?;
        assert_eq!(2, summary.lines().count());
        assert!(summary.contains(",false,"));
        Ok(())
    }

    #[tokio::test]
    async fn too_many_polls_are_rejected_before_submitting() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mock = coordinator(200).await?;
        let mut opt = opt(dir.path(), mock.port());
        opt.duration = Some(Duration::from_secs(3600));
        opt.interval = Some(Duration::from_nanos(1));

        let result = perf_benchmark(opt).await;
        assert!(matches!(result, Err(NebulaError::Config(_))));
        assert!(mock.requests().await.is_empty());
        assert!(!dir.path().join("summary.csv").exists());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_coordinator() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let port = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
        let result = perf_benchmark(opt(dir.path(), port)).await;
        assert!(matches!(result, Err(NebulaError::Connection(_))));
        assert!(!dir.path().join("summary.csv").exists());
        Ok(())
    }
}
