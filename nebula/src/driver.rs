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

//! The driver runs the life cycle of a workload on the coordinator:
//! connect, register, submit, wait, poll and stop.

use crate::client::{QueryConfig, QueryId, RemoteClient};
use crate::error::{NebulaError, Result};
use crate::workload::Workload;
use log::{info, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Optional steps of a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print the logical sources known to the coordinator before submitting.
    pub list_sources:     bool,
    /// Register the workload's source schemas before submitting.
    pub register_sources: bool,
    /// Overrides the run time of the workload.
    pub wait:             Option<Duration>,
}

/// What happened during a run.
#[derive(Debug)]
pub struct WorkloadReport {
    /// Workload name.
    pub name:     String,
    /// The coordinator's logical sources, if they were listed.
    pub sources:  Option<Value>,
    /// Ids of the submitted queries, in submission order.
    pub ids:      Vec<QueryId>,
    /// Status of every query before it was stopped.
    pub statuses: Vec<(QueryId, Result<String>)>,
    /// Whether the coordinator confirmed each stop.
    pub stopped:  Vec<(QueryId, bool)>,
    /// Wall-clock time from the first submission to the last stop.
    pub elapsed:  Duration,
}

impl WorkloadReport {
    /// True when every query was confirmed stopped.
    pub fn all_stopped(&self) -> bool {
        self.stopped.iter().all(|(_, ok)| *ok)
    }
}

/// Runs `workload` on the coordinator behind `client`.
pub async fn run_workload(
    client: &RemoteClient,
    workload: &Workload,
    options: &RunOptions,
) -> Result<WorkloadReport> {
    if !client.test_connection().await {
        return Err(NebulaError::Connection(format!(
            "failed to connect to the coordinator at {}",
            client.base_url()
        )));
    }
    info!("Connected to the coordinator at {}", client.base_url());

    let sources = if options.list_sources {
        Some(client.get_logical_sources().await?)
    } else {
        None
    };

    if options.register_sources {
        for source in &workload.sources {
            if !client.add_logical_source(source).await? {
                warn!("The coordinator did not accept the schema of {}", source.name);
            }
        }
    }

    let config = QueryConfig::new(workload.placement);
    let start = Instant::now();
    let mut ids = Vec::with_capacity(workload.queries.len());
    for query in &workload.queries {
        ids.push(client.submit_query(query, &config).await?);
    }
    info!("[OK] {} submitted as {:?}", workload.name, ids);

    let wait = options.wait.unwrap_or(workload.wait);
    info!("Running {} for {}", workload.name, humantime::format_duration(wait));
    tokio::time::sleep(wait).await;

    let mut statuses = Vec::with_capacity(ids.len());
    for id in &ids {
        let status = client.get_query_status(*id).await;
        match &status {
            Ok(s) => info!("Query {} status: {}", id, s),
            Err(e) => warn!("Failed to fetch the status of query {}: {}", id, e),
        }
        statuses.push((*id, status));
    }

    let mut stopped = Vec::with_capacity(ids.len());
    for id in &ids {
        stopped.push((*id, client.stop_query(*id).await?));
    }

    Ok(WorkloadReport {
        name:    workload.name.to_string(),
        sources,
        ids,
        statuses,
        stopped,
        elapsed: start.elapsed(),
    })
}
