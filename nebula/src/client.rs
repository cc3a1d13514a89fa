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

//! The remote client talks to the coordinator of the stream-processing system
//! through its REST API. Every operation is a single JSON request; failures
//! are reported to the caller and never retried.

use crate::configs::*;
use crate::datasource::LogicalSource;
use crate::error::{NebulaError, Result};
use crate::query::Query;
use log::{debug, info, warn};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The identifier the coordinator assigns to a submitted query.
pub type QueryId = u64;

/// How the coordinator places the operators of a query on its workers.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// Start at the sources and push operators towards the sink.
    BottomUp,
    /// Start at the sink and push operators towards the sources.
    TopDown,
}

impl Default for PlacementStrategy {
    fn default() -> Self {
        PlacementStrategy::TopDown
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementStrategy::BottomUp => write!(f, "BottomUp"),
            PlacementStrategy::TopDown => write!(f, "TopDown"),
        }
    }
}

impl FromStr for PlacementStrategy {
    type Err = NebulaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "BottomUp" | "bottomup" | "bottom-up" => Ok(PlacementStrategy::BottomUp),
            "TopDown" | "topdown" | "top-down" => Ok(PlacementStrategy::TopDown),
            other => Err(NebulaError::Config(format!(
                "unknown placement strategy: {}",
                other
            ))),
        }
    }
}

/// Per-query submission settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Operator placement.
    pub placement: PlacementStrategy,
}

impl QueryConfig {
    /// Creates a configuration with the given placement.
    pub fn new(placement: PlacementStrategy) -> Self {
        QueryConfig { placement }
    }
}

/// HTTP client bound to one coordinator.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    client:   Client,
}

impl RemoteClient {
    /// Creates a client for the coordinator at `host:port`. The timeout
    /// applies to every request.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(NebulaError::Config("empty coordinator host".to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(RemoteClient {
            base_url: format!("http://{}:{}", host, port),
            client,
        })
    }

    /// Creates a client from the coordinator section of the settings.
    pub fn from_config(conf: &NebulaConfig) -> Result<Self> {
        Self::new(
            &conf.coordinator_host,
            conf.coordinator_port,
            conf.request_timeout,
        )
    }

    /// Returns `http://host:port`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<(&str, String)>,
        body: Option<Value>,
    ) -> Result<Value> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(q) = query {
            request = request.query(&[q]);
        }
        if let Some(b) = body {
            request = request.json(&b);
        }
        debug!("{} {}", method, path);
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode(response: Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(NebulaError::Coordinator(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Checks whether the coordinator is reachable. Errors are logged and
    /// reported as `false`.
    pub async fn test_connection(&self) -> bool {
        match self
            .send(Method::GET, &NEBULA_CONNECTIVITY_PATH, None, None)
            .await
        {
            Ok(body) => body
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            Err(e) => {
                warn!("Connectivity check against {} failed: {}", self.base_url, e);
                false
            }
        }
    }

    /// Lists the logical sources known to the coordinator.
    pub async fn get_logical_sources(&self) -> Result<Value> {
        self.send(Method::GET, &NEBULA_ALL_SOURCES_PATH, None, None)
            .await
    }

    /// Registers a logical source and its schema. Returns the coordinator's
    /// `success` flag.
    pub async fn add_logical_source(&self, source: &LogicalSource) -> Result<bool> {
        source.validate()?;
        let body = json!({
            "logicalSourceName": source.name,
            "schema": source.schema.to_string(),
        });
        let reply = self
            .send(Method::POST, &NEBULA_ADD_SOURCE_PATH, None, Some(body))
            .await?;
        let success = flag(&reply, "success")?;
        info!("Registered logical source {}: {}", source.name, success);
        Ok(success)
    }

    /// Validates and submits a query, returning the id the coordinator
    /// assigned to it.
    pub async fn submit_query(&self, query: &Query, config: &QueryConfig) -> Result<QueryId> {
        query.validate()?;
        let body = json!({
            "userQuery": query.to_string(),
            "placement": config.placement.to_string(),
        });
        debug!("Submitting {}", query);
        let reply = self
            .send(Method::POST, &NEBULA_EXECUTE_QUERY_PATH, None, Some(body))
            .await?;
        let id = reply
            .get("queryId")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                NebulaError::Coordinator(format!("missing queryId in reply: {}", reply))
            })?;
        info!("Query {} submitted on {}", id, query.source);
        Ok(id)
    }

    /// Returns the coordinator's status string of a query, e.g. `RUNNING`.
    pub async fn get_query_status(&self, id: QueryId) -> Result<String> {
        let reply = self
            .send(
                Method::GET,
                &NEBULA_QUERY_STATUS_PATH,
                Some(("queryId", id.to_string())),
                None,
            )
            .await?;
        reply
            .get("status")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| NebulaError::Coordinator(format!("missing status in reply: {}", reply)))
    }

    /// Stops a query. Returns the coordinator's `success` flag.
    pub async fn stop_query(&self, id: QueryId) -> Result<bool> {
        let reply = self
            .send(
                Method::DELETE,
                &NEBULA_STOP_QUERY_PATH,
                Some(("queryId", id.to_string())),
                None,
            )
            .await?;
        let success = flag(&reply, "success")?;
        info!("Query {} stopped: {}", id, success);
        Ok(success)
    }
}

fn flag(reply: &Value, key: &str) -> Result<bool> {
    reply
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| NebulaError::Coordinator(format!("missing {} in reply: {}", key, reply)))
}
