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

//! This module runs the Query1 benchmarks.

use anyhow::{bail, Context as _, Result};
use benchmarks::{monitor_benchmark, perf_benchmark, MonitorBenchmarkOpt, PerfBenchmarkOpt};
use clap::{Arg, ArgMatches, Command};
use humantime::parse_duration;
use nebula::configs::NebulaConfig;
use std::time::Duration;

pub async fn command(
    conf: &NebulaConfig,
    config: Option<&str>,
    matches: &ArgMatches,
) -> Result<()> {
    let (command, matches) = match matches.subcommand() {
        Some((command, matches)) => (command, matches),
        None => bail!("missing bench command"),
    };

    let success = match command {
        "monitor" => monitor_benchmark(monitor_opt(config, matches)?).await?.query_success,
        "perf" => perf_benchmark(perf_opt(conf, config, matches)?).await?.query_success,
        _ => bail!("unknown bench command: {}", command),
    };
    if !success {
        bail!("{} command failed: the query did not succeed", command);
    }

    Ok(())
}

pub fn command_args() -> Command<'static> {
    Command::new("bench")
        .about("The SNCB Query1 Benchmark Tool")
        .subcommand_required(true)
        .subcommand(
            Command::new("monitor")
                .about("Watches the result file of a query started elsewhere")
                .args(common_args())
                .arg(
                    Arg::new("lines")
                        .short('n')
                        .long("lines")
                        .help("Number of result lines shown after the run")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("no wait")
                        .long("no-wait")
                        .help("Starts sampling without waiting for ENTER"),
                ),
        )
        .subcommand(
            Command::new("perf")
                .about("Submits the geospatial query and measures it")
                .args(common_args()),
        )
}

fn common_args() -> Vec<Arg<'static>> {
    vec![
        Arg::new("duration")
            .short('d')
            .long("duration")
            .help("How long the benchmark runs, e.g. 60s")
            .takes_value(true),
        Arg::new("interval")
            .short('i')
            .long("interval")
            .help("Time between two samples or status polls, e.g. 5s")
            .takes_value(true),
        Arg::new("file")
            .short('f')
            .long("file")
            .value_name("FILE")
            .help("The result file")
            .takes_value(true),
        Arg::new("summary")
            .long("summary")
            .value_name("FILE")
            .help("The summary file a row is appended to")
            .takes_value(true),
    ]
}

fn duration_of(matches: &ArgMatches, name: &str) -> Result<Option<Duration>> {
    match matches.value_of(name) {
        Some(s) => Ok(Some(
            parse_duration(s).with_context(|| format!("invalid {}: {}", name, s))?,
        )),
        None => Ok(None),
    }
}

fn owned(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.value_of(name).map(|s| s.to_string())
}

fn monitor_opt(config: Option<&str>, matches: &ArgMatches) -> Result<MonitorBenchmarkOpt> {
    let lines = match matches.value_of("lines") {
        Some(n) => Some(n.parse().with_context(|| format!("invalid lines: {}", n))?),
        None => None,
    };
    Ok(MonitorBenchmarkOpt {
        config:   config.map(|c| c.to_string()),
        output:   owned(matches, "file"),
        summary:  owned(matches, "summary"),
        duration: duration_of(matches, "duration")?,
        interval: duration_of(matches, "interval")?,
        lines,
        no_wait:  matches.is_present("no wait"),
    })
}

fn perf_opt(
    conf: &NebulaConfig,
    config: Option<&str>,
    matches: &ArgMatches,
) -> Result<PerfBenchmarkOpt> {
    Ok(PerfBenchmarkOpt {
        config:   config.map(|c| c.to_string()),
        host:     Some(conf.coordinator_host.clone()),
        port:     Some(conf.coordinator_port),
        duration: duration_of(matches, "duration")?,
        interval: duration_of(matches, "interval")?,
        output:   owned(matches, "file"),
        summary:  owned(matches, "summary"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn monitor_arguments() -> Result<()> {
        let matches = command_args().try_get_matches_from(vec![
            "bench", "monitor", "-d", "30s", "-i", "1s", "-n", "3", "--no-wait",
        ])?;
        let (_, monitor) = matches.subcommand().ok_or_else(|| anyhow!("no subcommand"))?;
        let opt = monitor_opt(None, monitor)?;
        assert_eq!(Some(Duration::from_secs(30)), opt.duration);
        assert_eq!(Some(Duration::from_secs(1)), opt.interval);
        assert_eq!(Some(3), opt.lines);
        assert!(opt.no_wait);
        assert_eq!(None, opt.output);
        Ok(())
    }

    #[test]
    fn perf_arguments() -> Result<()> {
        let mut conf = NebulaConfig::load(None)?;
        conf.coordinator_host = "192.168.0.238".to_string();
        let matches = command_args().try_get_matches_from(vec![
            "bench",
            "perf",
            "--file",
            "out.csv",
            "--interval",
            "soon",
        ])?;
        let (_, perf) = matches.subcommand().ok_or_else(|| anyhow!("no subcommand"))?;
        assert!(perf_opt(&conf, None, perf).is_err());

        let matches =
            command_args().try_get_matches_from(vec!["bench", "perf", "--file", "out.csv"])?;
        let (_, perf) = matches.subcommand().ok_or_else(|| anyhow!("no subcommand"))?;
        let opt = perf_opt(&conf, None, perf)?;
        assert_eq!(Some("192.168.0.238".to_string()), opt.host);
        assert_eq!(Some(8081), opt.port);
        assert_eq!(Some("out.csv".to_string()), opt.output);
        Ok(())
    }
}
