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

//! Schemas of the railway telemetry streams: train positions and brake
//! pressures (`sncb`), trackside weather (`weather`) and the pressure feed of
//! a single train set (`nrok5`).

use super::{BasicType, LogicalSource, Schema};
use crate::error::{NebulaError, Result};

/// Train telemetry: GPS position, speed, pressure sensors and status codes.
pub fn sncb() -> LogicalSource {
    LogicalSource::new(
        "sncb",
        Schema::new()
            .field("timestamp", BasicType::UInt64)
            .field("longitude", BasicType::Float64)
            .field("latitude", BasicType::Float64)
            .field("speed", BasicType::Float64)
            .field("Code1", BasicType::Int32)
            .field("Code2", BasicType::Int32)
            .field("T1_bar", BasicType::Float64)
            .field("T2_bar", BasicType::Float64)
            .field("PCF1_bar", BasicType::Float64)
            .field("PCF2_bar", BasicType::Float64),
    )
}

/// Weather observations along the tracks.
pub fn weather() -> LogicalSource {
    LogicalSource::new(
        "weather",
        Schema::new()
            .field("timestamp", BasicType::UInt64)
            .field("temperature", BasicType::Float64)
            .field("gps_lat", BasicType::Float64)
            .field("gps_lon", BasicType::Float64),
    )
}

/// Main and brake pipe pressure of one train set.
pub fn nrok5() -> LogicalSource {
    LogicalSource::new(
        "nrok5",
        Schema::new()
            .field("timestamp", BasicType::UInt64)
            .field("PCFA_bar", BasicType::Float64)
            .field("PCFF_bar", BasicType::Float64),
    )
}

/// Looks up a source schema by name.
pub fn source(name: &str) -> Result<LogicalSource> {
    match name {
        "sncb" => Ok(sncb()),
        "weather" => Ok(weather()),
        "nrok5" => Ok(nrok5()),
        _ => Err(NebulaError::Plan(format!("Unknown logical source: {}", name))),
    }
}

/// Names of all known sources.
pub fn source_names() -> Vec<&'static str> {
    vec!["sncb", "weather", "nrok5"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_is_valid() -> Result<()> {
        for name in source_names() {
            let src = source(name)?;
            assert_eq!(name, src.name);
            src.validate()?;
        }
        assert!(source("kafka").is_err());
        Ok(())
    }
}
