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

//! Measurements of one benchmark run and the result-file helpers they are
//! derived from.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// The measurements of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkMetrics {
    /// When the measured interval started.
    pub start:              Instant,
    /// When the measured interval ended.
    pub end:                Instant,
    /// Result records in the output file at the end of the run.
    pub total_results:      usize,
    /// Output file size when the run started.
    pub initial_file_size:  u64,
    /// Output file size when the run ended.
    pub final_file_size:    u64,
    /// Results per second over the whole run.
    pub throughput:         f64,
    /// Length of the run in seconds.
    pub duration_secs:      f64,
    /// Time until the query was about to be stopped, in milliseconds.
    pub processing_time_ms: f64,
    /// Whether the run succeeded.
    pub query_success:      bool,
}

impl BenchmarkMetrics {
    /// Starts measuring now.
    pub fn start() -> Self {
        let now = Instant::now();
        BenchmarkMetrics {
            start:              now,
            end:                now,
            total_results:      0,
            initial_file_size:  0,
            final_file_size:    0,
            throughput:         0.0,
            duration_secs:      0.0,
            processing_time_ms: 0.0,
            query_success:      false,
        }
    }

    /// Marks the end of processing, i.e. the moment before the query is
    /// stopped.
    pub fn processed(&mut self) {
        self.processing_time_ms = self.start.elapsed().as_secs_f64() * 1000.0;
    }

    /// Stops measuring and computes the derived values.
    pub fn finish(&mut self) {
        self.end = Instant::now();
        self.calculate();
    }

    /// Recomputes the duration and throughput from the recorded values.
    pub fn calculate(&mut self) {
        self.duration_secs = self.end.duration_since(self.start).as_secs_f64();
        self.throughput = throughput(self.total_results, self.duration_secs);
    }

    /// Bytes appended to the output file during the run.
    pub fn data_generated(&self) -> u64 {
        self.final_file_size.saturating_sub(self.initial_file_size)
    }

    /// The latency of the query, taken as its processing time.
    pub fn latency_ms(&self) -> f64 {
        self.processing_time_ms
    }

    /// Length of the run.
    pub fn elapsed(&self) -> Duration {
        self.end.duration_since(self.start)
    }
}

/// Results per second; zero when no time has elapsed.
pub fn throughput(total_results: usize, secs: f64) -> f64 {
    if secs > 0.0 {
        total_results as f64 / secs
    } else {
        0.0
    }
}

/// Counts the completed result records: non-empty lines containing at least
/// one comma. A trailing line without a newline counts as well.
pub fn count_results<R: BufRead>(reader: R) -> io::Result<usize> {
    let mut count = 0;
    for line in reader.split(b'\n') {
        let line = line?;
        if !line.is_empty() && line.contains(&b',') {
            count += 1;
        }
    }
    Ok(count)
}

/// Counts the result records of a file; a missing file holds none.
pub fn count_result_lines(path: impl AsRef<Path>) -> io::Result<usize> {
    match File::open(path) {
        Ok(file) => count_results(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// Returns the first `max` non-empty lines of a file.
pub fn sample_lines(path: impl AsRef<Path>, max: usize) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::with_capacity(max);
    for line in reader.split(b'\n') {
        if lines.len() >= max {
            break;
        }
        let line = line?;
        if !line.is_empty() {
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn only_complete_records_count() -> io::Result<()> {
        assert_eq!(2, count_results(Cursor::new("a,b\n\n1,2\n"))?);
        assert_eq!(1, count_results(Cursor::new("header\n1,2"))?);
        assert_eq!(0, count_results(Cursor::new("\n\n\n"))?);
        assert_eq!(0, count_results(Cursor::new(""))?);
        // invalid UTF-8 is still a record
        assert_eq!(1, count_results(Cursor::new(vec![0xff, b',', b'\n']))?);
        Ok(())
    }

    #[test]
    fn missing_file_has_no_results() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(0, count_result_lines(dir.path().join("query1.csv"))?);
        Ok(())
    }

    #[test]
    fn result_file_lines() -> io::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "1,100\n\n2,200\nno separator\n3,300\n")?;
        assert_eq!(3, count_result_lines(file.path())?);
        assert_eq!(
            vec!["1,100", "2,200"],
            sample_lines(file.path(), 2)?
        );
        assert_eq!(4, sample_lines(file.path(), 10)?.len());
        Ok(())
    }

    #[test]
    fn throughput_never_divides_by_zero() {
        assert_eq!(0.0, throughput(42, 0.0));
        assert!((throughput(42, 10.0) - 4.2).abs() < f64::EPSILON);

        let mut metrics = BenchmarkMetrics::start();
        metrics.total_results = 42;
        metrics.end = metrics.start;
        metrics.calculate();
        assert_eq!(0.0, metrics.throughput);

        metrics.end = metrics.start + Duration::from_secs(10);
        metrics.calculate();
        assert_eq!("4.20", format!("{:.2}", metrics.throughput));
    }

    #[test]
    fn data_generated_saturates() {
        let mut metrics = BenchmarkMetrics::start();
        metrics.initial_file_size = 100;
        metrics.final_file_size = 40;
        assert_eq!(0, metrics.data_generated());
        metrics.final_file_size = 160;
        assert_eq!(60, metrics.data_generated());
    }
}
