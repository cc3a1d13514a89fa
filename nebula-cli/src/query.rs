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

//! Lists, prints and runs the queries of the workload catalog.

use anyhow::{anyhow, bail, Context as _, Result};
use benchmarks::{rainbow_banner, rainbow_println};
use clap::{Arg, ArgMatches, Command};
use nebula::prelude::*;
use std::time::Duration;

pub async fn command(conf: &NebulaConfig, matches: &ArgMatches) -> Result<()> {
    let (command, matches) = match matches.subcommand() {
        Some((command, matches)) => (command, matches),
        None => bail!("missing query command"),
    };

    let result = match command {
        "list" => list(),
        "show" => show(required(matches, "name")?),
        "run" => run(conf, matches).await,
        _ => bail!("unknown query command: {}", command),
    };
    result.with_context(|| anyhow!("{} command failed", command))?;

    Ok(())
}

pub fn command_args() -> Command<'static> {
    Command::new("query")
        .about("Inspects and runs the queries of the workload catalog")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("Lists the workloads"))
        .subcommand(
            Command::new("show")
                .about("Prints the query text sent to the coordinator")
                .arg(workload_arg()),
        )
        .subcommand(run_args())
}

fn workload_arg() -> Arg<'static> {
    Arg::new("name")
        .help("The workload name, e.g. q1")
        .required(true)
        .takes_value(true)
}

fn run_args() -> Command<'static> {
    Command::new("run")
        .about("Submits a workload, lets it run and stops it")
        .arg(workload_arg())
        .arg(
            Arg::new("seconds")
                .short('s')
                .long("seconds")
                .help("Overrides how long the queries run")
                .takes_value(true),
        )
        .arg(
            Arg::new("register")
                .long("register")
                .help("Registers the source schemas before submitting"),
        )
        .arg(
            Arg::new("list sources")
                .long("list-sources")
                .help("Prints the coordinator's logical sources before submitting"),
        )
}

pub fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow!("missing argument: {}", name))
}

fn list() -> Result<()> {
    rainbow_banner("Workloads");
    for w in workloads() {
        println!("{:<8} {}", w.name, w.description);
    }
    Ok(())
}

fn show(name: &str) -> Result<()> {
    let workload = workload(name)?;
    rainbow_println(&format!("{} ({})", workload.name, workload.description));
    println!("placement: {}", workload.placement);
    println!("run time:  {}", humantime::format_duration(workload.wait));
    for query in &workload.queries {
        println!("{}", query);
    }
    Ok(())
}

fn run_options(matches: &ArgMatches) -> Result<RunOptions> {
    let wait = match matches.value_of("seconds") {
        Some(s) => Some(Duration::from_secs(
            s.parse().with_context(|| format!("invalid seconds: {}", s))?,
        )),
        None => None,
    };
    Ok(RunOptions {
        list_sources:     matches.is_present("list sources"),
        register_sources: matches.is_present("register"),
        wait,
    })
}

async fn run(conf: &NebulaConfig, matches: &ArgMatches) -> Result<()> {
    let workload = workload(required(matches, "name")?)?;
    let options = run_options(matches)?;
    let client = RemoteClient::from_config(conf)?;

    rainbow_banner(&format!("Running {}", workload.name));
    let report = run_workload(&client, &workload, &options).await?;

    if let Some(sources) = &report.sources {
        println!("Logical sources: {}", serde_json::to_string_pretty(sources)?);
    }
    for (id, status) in &report.statuses {
        match status {
            Ok(s) => println!("Query {} status: {}", id, s),
            Err(e) => println!("Query {} status: ERROR: {}", id, e),
        }
    }
    for (id, stopped) in &report.stopped {
        println!("Query {} stopped: {}", id, stopped);
    }
    println!(
        "Total elapsed: {}",
        humantime::format_duration(Duration::from_millis(report.elapsed.as_millis() as u64))
    );
    if !report.all_stopped() {
        bail!("not every query of {} was stopped", workload.name);
    }
    for file in workload.output_files() {
        println!("Results are written to {} on the worker", file);
    }
    Ok(())
}
