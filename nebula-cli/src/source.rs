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

//! Nebula CLI reads and registers the logical sources of the coordinator.

use crate::query::required;
use anyhow::{anyhow, bail, Context as _, Result};
use benchmarks::rainbow_println;
use clap::{Arg, ArgMatches, Command};
use nebula::prelude::*;

pub async fn command(conf: &NebulaConfig, matches: &ArgMatches) -> Result<()> {
    let (command, matches) = match matches.subcommand() {
        Some((command, matches)) => (command, matches),
        None => bail!("missing source command"),
    };

    let result = match command {
        "list" => list(conf).await,
        "register" => register(conf, required(matches, "name")?).await,
        _ => bail!("unknown source command: {}", command),
    };
    result.with_context(|| anyhow!("{} command failed", command))?;

    Ok(())
}

pub fn command_args() -> Command<'static> {
    Command::new("source")
        .about("Lists and registers logical sources")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("Prints the logical sources of the coordinator"))
        .subcommand(
            Command::new("register")
                .about("Registers a source schema with the coordinator")
                .arg(
                    Arg::new("name")
                        .help("The source name")
                        .required(true)
                        .possible_values(sncb::source_names())
                        .takes_value(true),
                ),
        )
}

async fn connect(conf: &NebulaConfig) -> Result<RemoteClient> {
    let client = RemoteClient::from_config(conf)?;
    if !client.test_connection().await {
        bail!("failed to connect to the coordinator at {}", conf.coordinator_addr());
    }
    Ok(client)
}

async fn list(conf: &NebulaConfig) -> Result<()> {
    let sources = connect(conf).await?.get_logical_sources().await?;
    println!("{}", serde_json::to_string_pretty(&sources)?);
    Ok(())
}

async fn register(conf: &NebulaConfig, name: &str) -> Result<()> {
    let source = sncb::source(name)?;
    println!("{}: {}", source.name, source.schema);
    if connect(conf).await?.add_logical_source(&source).await? {
        rainbow_println(&format!("[OK] Registered {}", source.name));
        Ok(())
    } else {
        bail!("the coordinator rejected {}", source.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_arguments() -> Result<()> {
        let matches =
            command_args().try_get_matches_from(vec!["source", "register", "nrok5"])?;
        let (_, register) = matches.subcommand().ok_or_else(|| anyhow!("no subcommand"))?;
        assert_eq!("nrok5", required(register, "name")?);

        assert!(command_args()
            .try_get_matches_from(vec!["source", "register", "kafka"])
            .is_err());
        Ok(())
    }

    #[tokio::test]
    async fn list_fails_without_coordinator() -> Result<()> {
        let mut conf = NebulaConfig::load(None)?;
        conf.coordinator_port = std::net::TcpListener::bind("127.0.0.1:0")?
            .local_addr()?
            .port();
        assert!(list(&conf).await.is_err());
        Ok(())
    }
}
