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

//! Nebula error types

use std::error;
use std::fmt::{Display, Formatter};
use std::io;
use std::result;

/// Result type for operations that could result in an [NebulaError]
pub type Result<T> = result::Result<T, NebulaError>;

/// Nebula error
#[derive(Debug)]
pub enum NebulaError {
    /// Error associated to I/O operations and associated traits.
    IoError(io::Error),
    /// Error returned by the HTTP transport to the coordinator, including
    /// timeouts and refused connections.
    Http(reqwest::Error),
    /// Error returned when serde_json failed to serialize or deserialize data.
    SerdeJson(serde_json::Error),
    /// Error returned when a configuration file is malformed or a setting
    /// cannot be parsed.
    Config(String),
    /// Error returned when the coordinator cannot be reached.
    Connection(String),
    /// Error returned when the coordinator answers a request with a
    /// non-success status or an unexpected payload.
    Coordinator(String),
    /// This error happens whenever a query descriptor is not valid.
    /// Examples include a missing sink or a window without aggregation.
    Plan(String),
    /// Error returned as a consequence of an error in Nebula.
    /// This error should not happen in normal usage of Nebula.
    Internal(String),
}

impl From<io::Error> for NebulaError {
    fn from(e: io::Error) -> Self {
        NebulaError::IoError(e)
    }
}

impl From<reqwest::Error> for NebulaError {
    fn from(e: reqwest::Error) -> Self {
        NebulaError::Http(e)
    }
}

impl From<serde_json::Error> for NebulaError {
    fn from(e: serde_json::Error) -> Self {
        NebulaError::SerdeJson(e)
    }
}

impl From<ini::ParseError> for NebulaError {
    fn from(e: ini::ParseError) -> Self {
        NebulaError::Config(e.to_string())
    }
}

impl From<ini::Error> for NebulaError {
    fn from(e: ini::Error) -> Self {
        NebulaError::Config(e.to_string())
    }
}

impl From<humantime::DurationError> for NebulaError {
    fn from(e: humantime::DurationError) -> Self {
        NebulaError::Config(e.to_string())
    }
}

impl From<&str> for NebulaError {
    fn from(e: &str) -> Self {
        NebulaError::Internal(e.to_string())
    }
}

impl Display for NebulaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            NebulaError::IoError(ref desc) => write!(f, "IO error: {}", desc),
            NebulaError::Http(ref desc) => write!(f, "HTTP error: {}", desc),
            NebulaError::SerdeJson(ref desc) => write!(f, "serde_json error: {:?}", desc),
            NebulaError::Config(ref desc) => write!(f, "Configuration error: {}", desc),
            NebulaError::Connection(ref desc) => write!(f, "Connection error: {}", desc),
            NebulaError::Coordinator(ref desc) => write!(f, "Coordinator error: {}", desc),
            NebulaError::Plan(ref desc) => write!(f, "Invalid query: {}", desc),
            NebulaError::Internal(ref desc) => write!(
                f,
                "Internal error: {}. This was likely caused by a bug in Nebula's \
                    code and we would welcome that you file an bug report in our issue tracker",
                desc
            ),
        }
    }
}

impl error::Error for NebulaError {}
