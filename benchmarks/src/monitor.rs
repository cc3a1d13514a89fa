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

//! Measures a query started elsewhere by watching the file its sink writes.

use crate::metrics::{sample_lines, BenchmarkMetrics};
use crate::rainbow::{rainbow_banner, rainbow_println};
use crate::sampler::{FileSampler, Sample};
use crate::summary::{append_summary, MonitorSummary};
use humantime::parse_duration;
use log::{error, info};
use nebula::configs::NebulaConfig;
use nebula::error::{NebulaError, Result};
use nebula::workload::sncb::geospatial_details;
use nebula::workload::QueryDetails;
use std::path::Path;
use std::future::Future;
use std::time::Duration;
use structopt::StructOpt;

/// The query type recorded in the monitor summary.
pub const MONITOR_QUERY_TYPE: &str = "SNCB Query1 Geospatial (ThresholdWindow + teintersects)";

/// Watches the result file of a running query and appends one summary row
/// per run.
#[derive(Default, Clone, Debug, StructOpt)]
pub struct MonitorBenchmarkOpt {
    /// Sets a custom config file
    #[structopt(short = "c", long = "config")]
    pub config: Option<String>,

    /// The result file to watch [default: query1.csv]
    #[structopt(short = "f", long = "file")]
    pub output: Option<String>,

    /// The summary file a row is appended to
    #[structopt(long = "summary")]
    pub summary: Option<String>,

    /// How long to watch the result file, e.g. 60s
    #[structopt(short = "d", long = "duration", parse(try_from_str = parse_duration))]
    pub duration: Option<Duration>,

    /// Time between two samples, e.g. 5s
    #[structopt(short = "i", long = "interval", parse(try_from_str = parse_duration))]
    pub interval: Option<Duration>,

    /// Number of result lines shown after the run
    #[structopt(short = "n", long = "lines")]
    pub lines: Option<usize>,

    /// Starts sampling without waiting for ENTER
    #[structopt(long = "no-wait")]
    pub no_wait: bool,
}

/// Runs the monitor benchmark. The returned metrics report success when the
/// result file existed at the end of the run. The clock starts before the
/// ENTER prompt, so the wait counts toward the run duration.
pub async fn monitor_benchmark(opt: MonitorBenchmarkOpt) -> Result<BenchmarkMetrics> {
    monitor(opt, wait_for_enter()).await
}

async fn monitor<W>(opt: MonitorBenchmarkOpt, ready: W) -> Result<BenchmarkMetrics>
where
    W: Future<Output = Result<()>>,
{
    let conf = NebulaConfig::load(opt.config.as_deref())?;
    let output = opt.output.unwrap_or(conf.monitor_output);
    let summary = opt.summary.unwrap_or(conf.monitor_summary);
    let duration = opt.duration.unwrap_or(conf.benchmark_duration);
    let interval = opt.interval.unwrap_or(conf.sample_interval);
    let lines = opt.lines.unwrap_or(conf.sample_lines);

    rainbow_banner("SNCB Query1 Monitor Benchmark");
    println!("Monitoring Query1 output file: {}", output);
    println!("Benchmark duration: {}", humantime::format_duration(duration));

    let sampler = FileSampler::new(&output, duration, interval);
    sampler.ticks()?;
    let mut metrics = BenchmarkMetrics::start();
    sampler.begin(&mut metrics);
    if Path::new(&output).exists() {
        println!("Initial output file size: {} bytes", metrics.initial_file_size);
    } else {
        println!("Output file doesn't exist yet - will be created by Query1");
    }

    if !opt.no_wait {
        print_instructions(duration);
        ready.await?;
    }

    rainbow_println("\n=== Monitoring Query1 Execution ===");
    println!("{}", Sample::HEADER);
    sampler
        .run(&mut metrics, |sample| println!("{}", sample.row()))
        .await?;

    metrics.query_success = sampler.path().exists();
    metrics.finish();
    info!(
        "Monitored {} for {:.2}s: {} results",
        output, metrics.duration_secs, metrics.total_results
    );

    print_results(&metrics, &geospatial_details(), &output);
    show_sample_results(&output, lines);

    match append_summary(&summary, &MonitorSummary::new(&metrics, MONITOR_QUERY_TYPE)) {
        Ok(()) => println!("\n[OK] Results saved to {}", summary),
        Err(e) => error!("Failed to save results to {}: {}", summary, e),
    }

    rainbow_println("\n=== Benchmark Complete ===");
    Ok(metrics)
}

fn print_instructions(duration: Duration) {
    rainbow_println("\n=== Instructions ===");
    println!("1. Start the coordinator");
    println!("2. Start the worker");
    println!("3. Run Query1: nebula-cli query run q1");
    println!(
        "4. This benchmark will monitor the output file for {}",
        humantime::format_duration(duration)
    );
    println!("\nPress ENTER when your Query1 is running...");
}

async fn wait_for_enter() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| ())
    })
    .await
    .map_err(|e| NebulaError::Internal(e.to_string()))??;
    Ok(())
}

fn print_results(metrics: &BenchmarkMetrics, details: &QueryDetails, output: &str) {
    rainbow_println("\n=== SNCB Query1 Performance Results ===");
    println!(
        "Query Success: {}",
        if metrics.query_success { "YES" } else { "NO" }
    );
    println!("Total Duration: {:.2} seconds", metrics.duration_secs);
    println!("Initial File Size: {} bytes", metrics.initial_file_size);
    println!("Final File Size: {} bytes", metrics.final_file_size);
    println!("Data Generated: {} bytes", metrics.data_generated());
    println!("Total Results: {} tuples", metrics.total_results);
    println!("Throughput: {:.2} results/second", metrics.throughput);

    rainbow_println("\n=== Query Details ===");
    println!("Source: {}", details.source);
    println!("Filter: {}", details.filter);
    println!("Window: {}", details.window);
    println!("Aggregation: {}", details.aggregation);
    println!("Output File: {}", output);
}

fn show_sample_results(output: &str, max: usize) {
    if !Path::new(output).exists() {
        println!("\nOutput file not found: {}", output);
        return;
    }
    rainbow_println(&format!(
        "\n=== Sample Query Results (first {} lines) ===",
        max
    ));
    match sample_lines(output, max) {
        Ok(lines) if lines.is_empty() => println!("(No results found in output file)"),
        Ok(lines) => lines.iter().for_each(|l| println!("{}", l)),
        Err(e) => error!("Failed to read {}: {}", output, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn opt(dir: &Path) -> MonitorBenchmarkOpt {
        MonitorBenchmarkOpt {
            output:   Some(dir.join("query1.csv").to_string_lossy().into_owned()),
            summary:  Some(dir.join("summary.csv").to_string_lossy().into_owned()),
            duration: Some(Duration::from_millis(20)),
            interval: Some(Duration::from_millis(10)),
            no_wait:  true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn monitors_an_existing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("query1.csv"), "start,end,speed\n1,2,300\n\n3,4,120\n")?;

        let metrics = monitor_benchmark(opt(dir.path())).await?;
        assert!(metrics.query_success);
        assert_eq!(3, metrics.total_results);
        assert_eq!(0, metrics.data_generated());
        assert!(metrics.duration_secs > 0.0);

        let summary = fs::read_to_string(dir.path().join("summary.csv"))?;
        let rows: Vec<_> = summary.lines().collect();
        assert_eq!(2, rows.len());
        assert!(rows[1].contains(",true,"));
        assert!(rows[1].ends_with(&format!("\"{}\"", MONITOR_QUERY_TYPE)));
        Ok(())
    }

    #[tokio::test]
    async fn prompt_wait_counts_toward_the_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("query1.csv"), "1,2,300\n")?;
        let mut opt = opt(dir.path());
        opt.no_wait = false;

        let ready = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        };
        let metrics = monitor(opt, ready).await?;
        // 200ms at the prompt plus 20ms of sampling
        assert!(metrics.duration_secs >= 0.22);
        assert!(metrics.throughput <= 1.0 / 0.22);
        assert_eq!(1, metrics.total_results);
        Ok(())
    }

    #[tokio::test]
    async fn too_many_samples_fail_before_the_prompt() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut opt = opt(dir.path());
        opt.no_wait = false;
        opt.duration = Some(Duration::from_secs(3600));
        opt.interval = Some(Duration::from_nanos(1));

        let run = monitor(opt, std::future::pending());
        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .map_err(|e| NebulaError::Internal(e.to_string()))?;
        assert!(matches!(result, Err(NebulaError::Config(_))));
        assert!(!dir.path().join("summary.csv").exists());
        Ok(())
    }

    #[tokio::test]
    async fn missing_result_file_fails_the_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let metrics = monitor_benchmark(opt(dir.path())).await?;
        assert!(!metrics.query_success);
        assert_eq!(0, metrics.total_results);
        assert_eq!(0, metrics.final_file_size);

        let summary = fs::read_to_string(dir.path().join("summary.csv"))?;
        assert!(summary.lines().nth(1).unwrap_or_default().contains(",false,"));
        Ok(())
    }
}
