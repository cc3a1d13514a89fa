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

//! Logical sources are named, schema-typed input streams registered with the
//! coordinator. Queries refer to them by name only; the schema is needed when
//! a source has to be registered before the first query runs.

pub mod sncb;

use crate::error::{NebulaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The physical field types understood by the coordinator.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum BasicType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    Char,
    Text,
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BasicType::Int8 => "INT8",
            BasicType::Int16 => "INT16",
            BasicType::Int32 => "INT32",
            BasicType::Int64 => "INT64",
            BasicType::UInt8 => "UINT8",
            BasicType::UInt16 => "UINT16",
            BasicType::UInt32 => "UINT32",
            BasicType::UInt64 => "UINT64",
            BasicType::Float32 => "FLOAT32",
            BasicType::Float64 => "FLOAT64",
            BasicType::Boolean => "BOOLEAN",
            BasicType::Char => "CHAR",
            BasicType::Text => "TEXT",
        };
        write!(f, "BasicType::{}", name)
    }
}

/// A single named column of a schema.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Field {
    /// The field name.
    pub name:      String,
    /// The field type.
    pub data_type: BasicType,
}

/// An ordered list of fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Schema::default()
    }

    /// Appends a field to the schema.
    pub fn field(mut self, name: impl Into<String>, data_type: BasicType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            data_type,
        });
        self
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the type of the named field, if present.
    pub fn data_type(&self, name: &str) -> Option<BasicType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.data_type)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema::create()")?;
        for field in &self.fields {
            write!(f, "->addField(\"{}\", {})", field.name, field.data_type)?;
        }
        Ok(())
    }
}

/// A named, schema-typed input stream.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LogicalSource {
    /// The name queries use in `Query::from`.
    pub name:   String,
    /// The schema of every record on the stream.
    pub schema: Schema,
}

impl LogicalSource {
    /// Creates a new logical source.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        LogicalSource {
            name: name.into(),
            schema,
        }
    }

    /// Checks that the source can be registered.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(NebulaError::Plan("logical source without a name".to_string()));
        }
        if self.schema.fields().is_empty() {
            return Err(NebulaError::Plan(format!(
                "logical source {} has an empty schema",
                self.name
            )));
        }
        let mut names = self
            .schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>();
        names.sort_unstable();
        if let Some(w) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(NebulaError::Plan(format!(
                "logical source {} declares field {} twice",
                self.name, w[0]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_renders_as_builder_chain() {
        let schema = Schema::new()
            .field("timestamp", BasicType::UInt64)
            .field("speed", BasicType::Float64);
        assert_eq!(
            "Schema::create()->addField(\"timestamp\", BasicType::UINT64)\
             ->addField(\"speed\", BasicType::FLOAT64)",
            schema.to_string()
        );
        assert_eq!(Some(BasicType::Float64), schema.data_type("speed"));
        assert_eq!(None, schema.data_type("latitude"));
    }

    #[test]
    fn source_validation() {
        let empty = LogicalSource::new("sncb", Schema::new());
        assert!(matches!(empty.validate(), Err(NebulaError::Plan(_))));

        let duplicated = LogicalSource::new(
            "sncb",
            Schema::new()
                .field("speed", BasicType::Float64)
                .field("speed", BasicType::Float64),
        );
        assert!(matches!(duplicated.validate(), Err(NebulaError::Plan(_))));

        let unnamed = LogicalSource::new(" ", Schema::new().field("a", BasicType::Int32));
        assert!(unnamed.validate().is_err());

        assert!(sncb::sncb().validate().is_ok());
    }
}
