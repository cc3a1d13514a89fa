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

//! A workload is a fixed set of queries submitted together, with the source
//! schemas they read, the placement they run under and how long they are left
//! running before being stopped.

pub mod sncb;

use crate::client::PlacementStrategy;
use crate::datasource::LogicalSource;
use crate::error::{NebulaError, Result};
use crate::query::Query;
use std::time::Duration;

/// Human-readable summary of a query, used in reports and summary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDetails {
    /// Logical source.
    pub source:      String,
    /// Filter predicate.
    pub filter:      String,
    /// Window definition.
    pub window:      String,
    /// Aggregation.
    pub aggregation: String,
}

impl QueryDetails {
    /// Creates a summary.
    pub fn new(source: &str, filter: &str, window: &str, aggregation: &str) -> Self {
        QueryDetails {
            source:      source.to_string(),
            filter:      filter.to_string(),
            window:      window.to_string(),
            aggregation: aggregation.to_string(),
        }
    }
}

/// A named set of queries.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Catalog name, e.g. `q1`.
    pub name:        &'static str,
    /// One-line description.
    pub description: &'static str,
    /// The queries, submitted in order.
    pub queries:     Vec<Query>,
    /// Schemas of the sources the queries read.
    pub sources:     Vec<LogicalSource>,
    /// Operator placement of every query.
    pub placement:   PlacementStrategy,
    /// How long the queries run before they are stopped.
    pub wait:        Duration,
    /// Summary of the first query.
    pub details:     QueryDetails,
}

impl Workload {
    /// Output files of all file sinks.
    pub fn output_files(&self) -> Vec<&str> {
        self.queries
            .iter()
            .filter_map(|q| q.datasink().and_then(|s| s.path()))
            .collect()
    }
}

/// Every workload of the catalog.
pub fn workloads() -> Vec<Workload> {
    vec![
        sncb::speed(),
        sncb::q1(),
        sncb::q4(),
        sncb::q5(),
        sncb::q6(),
        sncb::cfa(),
        sncb::cfa_cff(),
    ]
}

/// Looks up a workload by name.
pub fn workload(name: &str) -> Result<Workload> {
    workloads()
        .into_iter()
        .find(|w| w.name == name)
        .ok_or_else(|| NebulaError::Plan(format!("Unknown workload: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_consistent() -> Result<()> {
        let all = workloads();
        assert_eq!(7, all.len());
        for w in &all {
            assert!(!w.queries.is_empty(), "{} has no query", w.name);
            for q in &w.queries {
                q.validate()?;
                assert!(
                    w.sources.iter().any(|s| s.name == q.source),
                    "{} reads an unregistered source {}",
                    w.name,
                    q.source
                );
            }
            for s in &w.sources {
                s.validate()?;
            }
            assert_eq!(w.name, workload(w.name)?.name);
        }
        assert!(workload("q2").is_err());
        Ok(())
    }

    #[test]
    fn output_files() -> Result<()> {
        assert_eq!(vec!["outputCFA.csv", "outputCFF.csv"], workload("cfa-cff")?.output_files());
        assert!(workload("q5")?.output_files().is_empty());
        Ok(())
    }
}
