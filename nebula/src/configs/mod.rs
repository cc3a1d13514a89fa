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

//! This module provides the default configurations for Nebula.

mod nebula;
pub use self::nebula::{NebulaConfig, NEBULA_CONF};

use lazy_static::lazy_static;

lazy_static! {
    /// Coordinator REST API prefix.
    pub static ref NEBULA_API_PREFIX: String = "/v1/nes".to_string();
    /// Coordinator connectivity check endpoint.
    pub static ref NEBULA_CONNECTIVITY_PATH: String = format!("{}/connectivity/check", *NEBULA_API_PREFIX);
    /// Logical source listing endpoint.
    pub static ref NEBULA_ALL_SOURCES_PATH: String = format!("{}/sourceCatalog/allLogicalSource", *NEBULA_API_PREFIX);
    /// Logical source registration endpoint.
    pub static ref NEBULA_ADD_SOURCE_PATH: String = format!("{}/sourceCatalog/addLogicalSource", *NEBULA_API_PREFIX);
    /// Query submission endpoint.
    pub static ref NEBULA_EXECUTE_QUERY_PATH: String = format!("{}/query/execute-query", *NEBULA_API_PREFIX);
    /// Query status endpoint.
    pub static ref NEBULA_QUERY_STATUS_PATH: String = format!("{}/query/query-status", *NEBULA_API_PREFIX);
    /// Query stop endpoint.
    pub static ref NEBULA_STOP_QUERY_PATH: String = format!("{}/query/stop-query", *NEBULA_API_PREFIX);
}
