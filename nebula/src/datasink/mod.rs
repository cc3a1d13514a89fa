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

//! This module provides the output targets a query can write its results to.
//! The sinks are executed by the workers of the stream-processing system, so
//! a file sink path is a path on the worker that runs the sink operator.

use crate::error::{NebulaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data format for file sinks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataSinkFormat {
    /// Comma separated values, one record per line.
    CSV,
    /// One JSON object per line.
    JSON,
    /// Plain text, one record per line.
    Text,
}

impl Default for DataSinkFormat {
    fn default() -> Self {
        DataSinkFormat::CSV
    }
}

impl fmt::Display for DataSinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataSinkFormat::CSV => "CSV_FORMAT",
            DataSinkFormat::JSON => "JSON_FORMAT",
            DataSinkFormat::Text => "TEXT_FORMAT",
        };
        f.write_str(name)
    }
}

/// Where the results of a query go.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum DataSinkType {
    /// Write to a file on the worker.
    File {
        /// Output path.
        path:   String,
        /// Record encoding.
        format: DataSinkFormat,
        /// Append to an existing file instead of overwriting it.
        append: bool,
    },
    /// Print records on the worker's standard output.
    Print,
    /// Discard all records.
    NullOutput,
}

impl Default for DataSinkType {
    fn default() -> Self {
        DataSinkType::NullOutput
    }
}

impl DataSinkType {
    /// Convert the user input to the corresponding data sink type.
    ///
    /// `file:<path>` creates an appending CSV file sink.
    pub fn new(data_sink: &str) -> Result<DataSinkType> {
        match data_sink {
            "print" => Ok(DataSinkType::Print),
            "null" | "blackhole" => Ok(DataSinkType::NullOutput),
            s if s.starts_with("file:") && s.len() > "file:".len() => {
                Ok(DataSinkType::csv_file(&s["file:".len()..]))
            }
            _ => Err(NebulaError::Plan(format!(
                "Unknown data sink type: {}",
                data_sink
            ))),
        }
    }

    /// An appending CSV file sink.
    pub fn csv_file(path: impl Into<String>) -> Self {
        DataSinkType::File {
            path:   path.into(),
            format: DataSinkFormat::CSV,
            append: true,
        }
    }

    /// Returns the output path of a file sink.
    pub fn path(&self) -> Option<&str> {
        match self {
            DataSinkType::File { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for DataSinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSinkType::File {
                path,
                format,
                append,
            } => write!(
                f,
                "FileSinkDescriptor::create(\"{}\", \"{}\", \"{}\")",
                path,
                format,
                if *append { "APPEND" } else { "OVERWRITE" }
            ),
            DataSinkType::Print => write!(f, "PrintSinkDescriptor::create()"),
            DataSinkType::NullOutput => write!(f, "NullOutputSinkDescriptor::create()"),
        }
    }
}
