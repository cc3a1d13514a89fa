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

mod args;
mod bench;
mod query;
mod source;

use anyhow::{bail, Result};
use clap::{crate_version, Command};

fn cli() -> Command<'static> {
    Command::new("Nebula")
        .version(crate_version!())
        .about("Command Line Controller for Nebula stream queries")
        .author("UMD Database Group")
        .args(args::get_args())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(query::command_args())
        .subcommand(source::command_args())
        .subcommand(bench::command_args())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Command line arg parsing and configuration.
    let matches = cli().get_matches();
    args::get_logging(&matches)?.init();
    let conf = args::get_config(&matches)?;
    log::debug!("Coordinator at {}", conf.coordinator_addr());

    match matches.subcommand() {
        Some(("query", query_matches)) => query::command(&conf, query_matches).await,
        Some(("source", source_matches)) => source::command(&conf, source_matches).await,
        Some(("bench", bench_matches)) => {
            bench::command(&conf, matches.value_of("config"), bench_matches).await
        }
        _ => bail!("{}", cli().render_usage()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags() -> Result<()> {
        let matches = cli().try_get_matches_from(vec![
            "nebula-cli",
            "query",
            "list",
            "--host",
            "10.0.0.1",
            "--port",
            "9090",
            "-L",
            "debug",
        ])?;
        let conf = args::get_config(&matches)?;
        assert_eq!("10.0.0.1", conf.coordinator_host);
        assert_eq!(9090, conf.coordinator_port);
        args::get_logging(&matches)?;
        Ok(())
    }

    #[test]
    fn rejected_flags() {
        assert!(cli()
            .try_get_matches_from(vec!["nebula-cli", "-L", "loud", "query", "list"])
            .is_err());
        assert!(cli().try_get_matches_from(vec!["nebula-cli"]).is_err());

        let matches = cli().try_get_matches_from(vec![
            "nebula-cli",
            "--port",
            "http",
            "source",
            "list",
        ]);
        match matches {
            Ok(m) => assert!(args::get_config(&m).is_err()),
            Err(e) => panic!("unexpected parse error: {}", e),
        }
    }

    #[test]
    fn debug_assertions() {
        cli().debug_assert();
    }
}
