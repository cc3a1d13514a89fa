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

//! Typed settings layered on top of the bundled `config.toml`.

use crate::client::PlacementStrategy;
use crate::error::{NebulaError, Result};
use humantime::parse_duration;
use ini::Ini;
use lazy_static::lazy_static;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

lazy_static! {
    /// Global settings.
    pub static ref NEBULA_CONF: Ini = Ini::load_from_str(include_str!("../config.toml")).unwrap();
}

/// Settings shared by the command line tools and the benchmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct NebulaConfig {
    /// The coordinator's host name or IP address.
    pub coordinator_host:   String,
    /// The coordinator's REST port.
    pub coordinator_port:   u16,
    /// Timeout applied to every request sent to the coordinator.
    pub request_timeout:    Duration,
    /// Operator placement strategy for submitted queries.
    pub placement:          PlacementStrategy,
    /// Interval between two samples of a result file.
    pub sample_interval:    Duration,
    /// Total duration of a benchmark run.
    pub benchmark_duration: Duration,
    /// Result file watched by the monitor benchmark.
    pub monitor_output:     String,
    /// Summary CSV of the monitor benchmark.
    pub monitor_summary:    String,
    /// Result file written by the query the perf benchmark submits.
    pub perf_output:        String,
    /// Summary CSV of the perf benchmark.
    pub perf_summary:       String,
    /// Number of result lines echoed after a run.
    pub sample_lines:       usize,
}

impl NebulaConfig {
    /// Loads the bundled settings, overridden key by key by the optional INI
    /// file at `path`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                if !Path::new(p).exists() {
                    return Err(NebulaError::Config(format!(
                        "configuration file not found: {}",
                        p
                    )));
                }
                let custom = Ini::load_from_file(p)?;
                Self::try_from_ini(Some(&custom))
            }
            None => Self::try_from_ini(None),
        }
    }

    /// Builds the settings from an optional override file and the bundled
    /// defaults.
    pub fn try_from_ini(custom: Option<&Ini>) -> Result<Self> {
        let layered = Layered { custom };
        Ok(NebulaConfig {
            coordinator_host:   layered.get("coordinator", "host")?,
            coordinator_port:   layered.parse("coordinator", "port")?,
            request_timeout:    layered.duration("coordinator", "timeout")?,
            placement:          layered.parse("coordinator", "placement")?,
            sample_interval:    layered.duration("benchmark", "interval")?,
            benchmark_duration: layered.duration("benchmark", "duration")?,
            monitor_output:     layered.get("benchmark", "monitor_output")?,
            monitor_summary:    layered.get("benchmark", "monitor_summary")?,
            perf_output:        layered.get("benchmark", "perf_output")?,
            perf_summary:       layered.get("benchmark", "perf_summary")?,
            sample_lines:       layered.parse("benchmark", "sample_lines")?,
        })
    }

    /// Returns the coordinator address as `host:port`.
    pub fn coordinator_addr(&self) -> String {
        format!("{}:{}", self.coordinator_host, self.coordinator_port)
    }
}

/// Key lookup that prefers the user file over the bundled one.
struct Layered<'a> {
    custom: Option<&'a Ini>,
}

impl<'a> Layered<'a> {
    fn get(&self, section: &str, key: &str) -> Result<String> {
        self.custom
            .and_then(|ini| ini.get_from(Some(section), key))
            .or_else(|| NEBULA_CONF.get_from(Some(section), key))
            .map(|v| v.trim().to_string())
            .ok_or_else(|| NebulaError::Config(format!("missing setting [{}] {}", section, key)))
    }

    fn parse<T: FromStr>(&self, section: &str, key: &str) -> Result<T> {
        let value = self.get(section, key)?;
        value.parse::<T>().map_err(|_| {
            NebulaError::Config(format!(
                "invalid value for [{}] {}: {}",
                section, key, value
            ))
        })
    }

    fn duration(&self, section: &str, key: &str) -> Result<Duration> {
        Ok(parse_duration(&self.get(section, key)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults() -> Result<()> {
        let conf = NebulaConfig::load(None)?;
        assert_eq!("127.0.0.1", conf.coordinator_host);
        assert_eq!(8081, conf.coordinator_port);
        assert_eq!(Duration::from_secs(20), conf.request_timeout);
        assert_eq!(PlacementStrategy::TopDown, conf.placement);
        assert_eq!(Duration::from_secs(5), conf.sample_interval);
        assert_eq!(Duration::from_secs(60), conf.benchmark_duration);
        assert_eq!("query1.csv", conf.monitor_output);
        assert_eq!("query1_benchmark_results.csv", conf.monitor_summary);
        assert_eq!("query1_performance_results.csv", conf.perf_output);
        assert_eq!("query1_benchmark_summary.csv", conf.perf_summary);
        assert_eq!(10, conf.sample_lines);
        assert_eq!("127.0.0.1:8081", conf.coordinator_addr());
        Ok(())
    }

    #[test]
    fn user_file_overrides_single_keys() -> Result<()> {
        let custom = Ini::load_from_str(
            "[coordinator]\nhost = 192.168.0.238\nplacement = BottomUp\n\n[benchmark]\ninterval = 1s\n",
        )?;
        let conf = NebulaConfig::try_from_ini(Some(&custom))?;
        assert_eq!("192.168.0.238", conf.coordinator_host);
        assert_eq!(PlacementStrategy::BottomUp, conf.placement);
        assert_eq!(Duration::from_secs(1), conf.sample_interval);
        // untouched keys fall back to the bundled file
        assert_eq!(8081, conf.coordinator_port);
        assert_eq!(Duration::from_secs(60), conf.benchmark_duration);
        Ok(())
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let custom = Ini::load_from_str("[coordinator]\nport = eighty\n").unwrap();
        match NebulaConfig::try_from_ini(Some(&custom)) {
            Err(NebulaError::Config(msg)) => assert!(msg.contains("port")),
            other => panic!("unexpected result: {:?}", other),
        }

        let custom = Ini::load_from_str("[benchmark]\ninterval = soon\n").unwrap();
        assert!(matches!(
            NebulaConfig::try_from_ini(Some(&custom)),
            Err(NebulaError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            NebulaConfig::load(Some("/nonexistent/nebula.toml")),
            Err(NebulaError::Config(_))
        ));
    }
}
