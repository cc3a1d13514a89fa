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

//! Watches a result file that another process appends to.

use crate::metrics::{count_result_lines, BenchmarkMetrics};
use log::warn;
use nebula::error::{NebulaError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One observation of the result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Time since sampling started, in whole intervals.
    pub elapsed:       Duration,
    /// File size in bytes.
    pub file_size:     u64,
    /// Records added since the previous sample.
    pub new_results:   usize,
    /// Records in the file.
    pub total_results: usize,
}

impl Sample {
    /// Header of the table printed while sampling.
    pub const HEADER: &'static str = "Time(s) | File Size (bytes) | New Results | Cumulative Results\n\
                                      --------|-------------------|-------------|-------------------";

    /// One row of the sampling table.
    pub fn row(&self) -> String {
        format!(
            "{:>7} | {:>17} | {:>11} | {:>17}",
            self.elapsed.as_secs(),
            self.file_size,
            self.new_results,
            self.total_results
        )
    }
}

/// Samples a result file every `interval` for `duration`.
#[derive(Debug, Clone)]
pub struct FileSampler {
    path:     PathBuf,
    duration: Duration,
    interval: Duration,
}

impl FileSampler {
    /// Creates a sampler.
    pub fn new(path: impl AsRef<Path>, duration: Duration, interval: Duration) -> Self {
        FileSampler {
            path: path.as_ref().to_path_buf(),
            duration,
            interval,
        }
    }

    /// The watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of samples taken: `duration / interval`, rounded down.
    pub fn ticks(&self) -> Result<u32> {
        tick_count(self.duration, self.interval)
    }

    /// Size and record count of the file. A missing file is empty.
    pub fn probe(&self) -> io::Result<(u64, usize)> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok((meta.len(), count_result_lines(&self.path)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((0, 0)),
            Err(e) => Err(e),
        }
    }

    fn probe_or_empty(&self) -> (u64, usize) {
        self.probe().unwrap_or_else(|e| {
            warn!("Failed to read {}: {}", self.path.display(), e);
            (0, 0)
        })
    }

    /// Records the initial file size.
    pub fn begin(&self, metrics: &mut BenchmarkMetrics) {
        metrics.initial_file_size = self.probe_or_empty().0;
    }

    /// Samples the file until the duration has elapsed and fills in the final
    /// size and record count. The file is re-read in full on every tick.
    /// `on_sample` sees every sample as soon as it is taken.
    pub async fn run<F>(
        &self,
        metrics: &mut BenchmarkMetrics,
        mut on_sample: F,
    ) -> Result<Vec<Sample>>
    where
        F: FnMut(&Sample),
    {
        let ticks = self.ticks()?;
        let mut samples = vec![];
        let (mut size, mut total) = (0, 0);
        for tick in 1..=ticks {
            tokio::time::sleep(self.interval).await;
            let (current_size, current_total) = self.probe_or_empty();
            let sample = Sample {
                elapsed:       self.interval * tick,
                file_size:     current_size,
                new_results:   current_total.saturating_sub(total),
                total_results: current_total,
            };
            on_sample(&sample);
            samples.push(sample);
            size = current_size;
            total = current_total;
        }
        if samples.is_empty() {
            let (current_size, current_total) = self.probe_or_empty();
            size = current_size;
            total = current_total;
        }
        metrics.final_file_size = size;
        metrics.total_results = total;
        Ok(samples)
    }
}

/// `duration / interval`, rounded down. A zero interval never ticks.
pub fn tick_count(duration: Duration, interval: Duration) -> Result<u32> {
    if interval.is_zero() {
        return Ok(0);
    }
    u32::try_from(duration.as_nanos() / interval.as_nanos()).map_err(|_| {
        NebulaError::Config(format!(
            "{} every {} is too many samples",
            humantime::format_duration(duration),
            humantime::format_duration(interval)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;

    #[test]
    fn tick_count_rounds_down() -> Result<()> {
        let sampler = |d, i| FileSampler::new("r.csv", Duration::from_secs(d), Duration::from_secs(i));
        assert_eq!(12, sampler(60, 5).ticks()?);
        assert_eq!(2, sampler(14, 5).ticks()?);
        assert_eq!(0, sampler(4, 5).ticks()?);
        assert_eq!(0, sampler(10, 0).ticks()?);
        assert_eq!(u32::MAX, sampler(u32::MAX as u64, 1).ticks()?);
        Ok(())
    }

    #[test]
    fn tick_count_out_of_range() {
        let too_long = Duration::from_secs((1 << 32) + 5);
        assert!(matches!(
            tick_count(too_long, Duration::from_secs(1)),
            Err(NebulaError::Config(_))
        ));
        assert!(matches!(
            tick_count(Duration::from_secs(3600), Duration::from_nanos(1)),
            Err(NebulaError::Config(_))
        ));
    }

    #[tokio::test]
    async fn out_of_range_run_fails_before_sampling() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let sampler = FileSampler::new(
            dir.path().join("query1.csv"),
            Duration::from_secs(3600),
            Duration::from_nanos(1),
        );
        let mut metrics = BenchmarkMetrics::start();
        let mut calls = 0;
        assert!(sampler.run(&mut metrics, |_| calls += 1).await.is_err());
        assert_eq!(0, calls);
        Ok(())
    }

    #[test]
    fn missing_file_is_empty() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let sampler = FileSampler::new(
            dir.path().join("query1.csv"),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert_eq!((0, 0), sampler.probe()?);
        Ok(())
    }

    #[tokio::test]
    async fn unchanged_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"1,2\n")?;
        file.flush()?;
        let sampler = FileSampler::new(file.path(), Duration::from_millis(30), Duration::from_millis(10));

        let mut metrics = BenchmarkMetrics::start();
        sampler.begin(&mut metrics);
        assert_eq!(4, metrics.initial_file_size);

        let mut rows = vec![];
        let samples = sampler.run(&mut metrics, |s| rows.push(s.row())).await?;
        assert_eq!(3, samples.len());
        assert_eq!(3, rows.len());
        assert_eq!(1, samples[0].new_results);
        assert_eq!(0, samples[2].new_results);
        assert_eq!(Duration::from_millis(30), samples[2].elapsed);
        assert_eq!(1, metrics.total_results);
        assert_eq!(4, metrics.final_file_size);
        Ok(())
    }

    #[tokio::test]
    async fn file_appears_and_grows_between_ticks() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("query1.csv");
        let sampler = FileSampler::new(&path, Duration::from_millis(40), Duration::from_millis(10));

        let mut metrics = BenchmarkMetrics::start();
        sampler.begin(&mut metrics);
        assert_eq!(0, metrics.initial_file_size);

        // the query starts writing after the first tick and appends after each one
        let batches: [&[u8]; 4] = [b"1,100\n", b"2,200\n3,300\n", b"\nno separator\n", b""];
        let mut tick = 0;
        let samples = sampler
            .run(&mut metrics, |_| {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .unwrap();
                file.write_all(batches[tick]).unwrap();
                tick += 1;
            })
            .await?;

        let totals: Vec<_> = samples.iter().map(|s| s.total_results).collect();
        let deltas: Vec<_> = samples.iter().map(|s| s.new_results).collect();
        assert_eq!(vec![0, 1, 3, 3], totals);
        assert_eq!(vec![0, 1, 2, 0], deltas);
        assert_eq!(0, samples[0].file_size);
        assert_eq!(3, metrics.total_results);
        assert_eq!(fs::metadata(&path)?.len(), metrics.final_file_size);
        assert_eq!(metrics.final_file_size, samples[3].file_size);
        Ok(())
    }

    #[tokio::test]
    async fn no_ticks_still_measures() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"a,b\n\n1,2\n")?;
        file.flush()?;
        let sampler = FileSampler::new(file.path(), Duration::ZERO, Duration::from_secs(5));
        let mut metrics = BenchmarkMetrics::start();
        assert!(sampler.run(&mut metrics, |_| {}).await?.is_empty());
        assert_eq!(2, metrics.total_results);
        Ok(())
    }

    #[test]
    fn table_row() {
        let sample = Sample {
            elapsed:       Duration::from_secs(5),
            file_size:     1024,
            new_results:   3,
            total_results: 10,
        };
        assert_eq!(
            "      5 |              1024 |           3 |                10",
            sample.row()
        );
    }
}
