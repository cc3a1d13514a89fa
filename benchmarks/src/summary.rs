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

//! Summary files keep one CSV row per benchmark run. The header is written
//! once, when the file is empty. There is no locking; one run at a time.

use crate::metrics::BenchmarkMetrics;
use chrono::Local;
use nebula::workload::QueryDetails;
use std::fs::OpenOptions;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// A row of a summary file.
pub trait SummaryRecord {
    /// The header line, without newline.
    const HEADER: &'static str;

    /// The formatted fields of the row. Free-text fields are quoted with
    /// [`csv_field`] or [`quoted`].
    fn fields(&self) -> Vec<String>;

    /// The row, without newline.
    fn to_row(&self) -> String {
        self.fields().join(",")
    }
}

/// Quotes a field holding whitespace, commas or quotes.
pub fn csv_field(value: &str) -> String {
    if value.contains(|c: char| c == ',' || c == '"' || c.is_whitespace()) {
        quoted(value)
    } else {
        value.to_string()
    }
}

/// Always quotes a field, doubling embedded quotes.
pub fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// The local time of a run, e.g. `2024-05-01 13:45:00`.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Appends `record` to the summary file at `path`, creating it with a header
/// if needed.
pub fn append_summary<R: SummaryRecord>(path: impl AsRef<Path>, record: &R) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.seek(SeekFrom::End(0))? == 0 {
        writeln!(file, "{}", R::HEADER)?;
    }
    writeln!(file, "{}", record.to_row())?;
    file.flush()
}

/// A run of the result-file monitor.
#[derive(Debug, Clone)]
pub struct MonitorSummary {
    /// Local time of the run.
    pub timestamp:         String,
    /// Whether the result file existed at the end.
    pub query_success:     bool,
    /// Length of the run in seconds.
    pub duration_secs:     f64,
    /// Initial result file size.
    pub initial_file_size: u64,
    /// Final result file size.
    pub final_file_size:   u64,
    /// Records in the result file.
    pub total_results:     usize,
    /// Results per second.
    pub throughput:        f64,
    /// The monitored query.
    pub query_type:        String,
}

impl MonitorSummary {
    /// Summarizes a finished run.
    pub fn new(metrics: &BenchmarkMetrics, query_type: &str) -> Self {
        MonitorSummary {
            timestamp:         timestamp(),
            query_success:     metrics.query_success,
            duration_secs:     metrics.duration_secs,
            initial_file_size: metrics.initial_file_size,
            final_file_size:   metrics.final_file_size,
            total_results:     metrics.total_results,
            throughput:        metrics.throughput,
            query_type:        query_type.to_string(),
        }
    }
}

impl SummaryRecord for MonitorSummary {
    const HEADER: &'static str = "timestamp,query_success,duration_seconds,initial_file_size,\
                                  final_file_size,data_generated_bytes,total_results,\
                                  throughput_results_per_sec,query_type";

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.query_success.to_string(),
            format!("{:.2}", self.duration_secs),
            self.initial_file_size.to_string(),
            self.final_file_size.to_string(),
            self.final_file_size
                .saturating_sub(self.initial_file_size)
                .to_string(),
            self.total_results.to_string(),
            format!("{:.2}", self.throughput),
            csv_field(&self.query_type),
        ]
    }
}

/// A run of the submit-and-measure benchmark.
#[derive(Debug, Clone)]
pub struct PerformanceSummary {
    /// Local time of the run.
    pub timestamp:          String,
    /// Whether the query ran and was stopped.
    pub query_success:      bool,
    /// Time from submission until the stop request.
    pub processing_time_ms: f64,
    /// Records in the result file.
    pub total_results:      usize,
    /// Results per second.
    pub throughput:         f64,
    /// Latency in milliseconds.
    pub latency_ms:         f64,
    /// The measured query.
    pub details:            QueryDetails,
}

impl PerformanceSummary {
    /// Summarizes a finished run.
    pub fn new(metrics: &BenchmarkMetrics, details: QueryDetails) -> Self {
        PerformanceSummary {
            timestamp:          timestamp(),
            query_success:      metrics.query_success,
            processing_time_ms: metrics.processing_time_ms,
            total_results:      metrics.total_results,
            throughput:         metrics.throughput,
            latency_ms:         metrics.latency_ms(),
            details,
        }
    }
}

impl SummaryRecord for PerformanceSummary {
    const HEADER: &'static str = "timestamp,query_success,processing_time_ms,total_results,\
                                  throughput_results_per_sec,latency_ms,source,filter,window,\
                                  aggregation";

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.query_success.to_string(),
            format!("{:.2}", self.processing_time_ms),
            self.total_results.to_string(),
            format!("{:.2}", self.throughput),
            format!("{:.2}", self.latency_ms),
            csv_field(&self.details.source),
            quoted(&self.details.filter),
            quoted(&self.details.window),
            csv_field(&self.details.aggregation),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula::workload::sncb::geospatial_details;
    use std::fs;

    fn monitor_run(total_results: usize, duration_secs: f64) -> MonitorSummary {
        MonitorSummary {
            timestamp:         "2024-05-01 13:45:00".to_string(),
            query_success:     true,
            duration_secs,
            initial_file_size: 0,
            final_file_size:   512,
            total_results,
            throughput:        crate::metrics::throughput(total_results, duration_secs),
            query_type:        "SNCB Query1 Geospatial (ThresholdWindow + teintersects)".to_string(),
        }
    }

    #[test]
    fn quoting() {
        assert_eq!("Sum(speed)", csv_field("Sum(speed)"));
        assert_eq!("\"(Code1 != 0 || Code2 != 0)\"", csv_field("(Code1 != 0 || Code2 != 0)"));
        assert_eq!("\"a,b\"", csv_field("a,b"));
        assert_eq!("\"say \"\"hi\"\"\"", csv_field("say \"hi\""));
        assert_eq!("\"ThresholdWindow(teintersects)\"", quoted("ThresholdWindow(teintersects)"));
        assert_eq!("\"a\"\"b\"", quoted("a\"b"));
    }

    #[test]
    fn first_run_writes_the_header() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("query1_benchmark_results.csv");
        append_summary(&path, &monitor_run(42, 10.0))?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(2, lines.len());
        assert_eq!(MonitorSummary::HEADER, lines[0]);
        assert_eq!(
            "2024-05-01 13:45:00,true,10.00,0,512,512,42,4.20,\
             \"SNCB Query1 Geospatial (ThresholdWindow + teintersects)\"",
            lines[1]
        );
        Ok(())
    }

    #[test]
    fn header_is_written_once() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("summary.csv");
        for i in 0..3 {
            append_summary(&path, &monitor_run(i, 1.0))?;
        }
        let content = fs::read_to_string(&path)?;
        assert_eq!(4, content.lines().count());
        assert_eq!(
            1,
            content
                .lines()
                .filter(|l| l.starts_with("timestamp,"))
                .count()
        );

        // an existing file without header keeps its content
        let existing = dir.path().join("existing.csv");
        fs::write(&existing, "previous row\n")?;
        append_summary(&existing, &monitor_run(1, 1.0))?;
        let content = fs::read_to_string(&existing)?;
        assert_eq!(2, content.lines().count());
        assert!(content.starts_with("previous row\n"));
        Ok(())
    }

    #[test]
    fn performance_row() {
        let mut metrics = BenchmarkMetrics::start();
        metrics.query_success = true;
        metrics.processing_time_ms = 60012.5;
        metrics.total_results = 120;
        metrics.throughput = 2.0;
        let mut row = PerformanceSummary::new(&metrics, geospatial_details());
        row.timestamp = "2024-05-01 13:45:00".to_string();
        assert_eq!(
            "2024-05-01 13:45:00,true,60012.50,120,2.00,60012.50,sncb,\
             \"(Code1 != 0 || Code2 != 0)\",\"ThresholdWindow(teintersects)\",Sum(speed)",
            row.to_row()
        );
        assert_eq!(10, PerformanceSummary::HEADER.split(',').count());
        assert_eq!(9, MonitorSummary::HEADER.split(',').count());
    }

    #[test]
    fn timestamp_format() {
        let ts = timestamp();
        assert_eq!(19, ts.len());
        assert_eq!(Some(' '), ts.chars().nth(10));
    }
}
