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

//! The query interface describes a streaming query as a linear pipeline of
//! operators over one logical source:
//!
//! ```text
//! source -> filter/map -> window + aggregate -> project -> sink
//! ```
//!
//! The descriptor is only a description. It is rendered into the textual
//! query API of the coordinator and planned, placed and executed remotely.

pub mod aggregation;
pub mod expr;

use crate::datasink::DataSinkType;
use crate::error::{NebulaError, Result};
use crate::stream::Window;
use aggregation::Aggregation;
use expr::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single pipeline step.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum Operator {
    /// Drops records for which the predicate is false.
    Filter(Expr),
    /// Assigns `expr` to `field`, creating the field if needed.
    Map {
        /// Target field.
        field: String,
        /// Value.
        expr:  Expr,
    },
    /// Groups records into windows and emits one aggregated record per
    /// window.
    Window {
        /// The window definition.
        window:       Window,
        /// The aggregates of every window.
        aggregations: Vec<Aggregation>,
    },
    /// Keeps the listed fields only.
    Project(Vec<Expr>),
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Filter(predicate) => write!(f, ".filter({})", predicate),
            Operator::Map { field, expr } => {
                write!(f, ".map(Attribute(\"{}\") = {})", field, expr)
            }
            Operator::Window {
                window,
                aggregations,
            } => {
                write!(f, ".window({}).apply(", window)?;
                write_list(f, aggregations)?;
                write!(f, ")")
            }
            Operator::Project(fields) => {
                write!(f, ".project(")?;
                write_list(f, fields)?;
                write!(f, ")")
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// A query descriptor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Query {
    /// The logical source the query reads from.
    pub source:    String,
    /// The operators in pipeline order.
    pub operators: Vec<Operator>,
    /// The output of the query.
    pub sink:      Option<DataSinkType>,
}

/// A query whose last operator is a window still waiting for its
/// aggregations. Only [`WindowedQuery::apply`] turns it back into a
/// [`Query`].
#[derive(Debug, Clone)]
pub struct WindowedQuery {
    query:  Query,
    window: Window,
}

impl WindowedQuery {
    /// Sets the aggregations computed for every window.
    pub fn apply(mut self, aggregations: Vec<Aggregation>) -> Query {
        self.query.operators.push(Operator::Window {
            window: self.window,
            aggregations,
        });
        self.query
    }
}

impl Query {
    /// Starts a query on the given logical source.
    pub fn from(source: impl Into<String>) -> Self {
        Query {
            source:    source.into(),
            operators: vec![],
            sink:      None,
        }
    }

    /// Appends a filter.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.operators.push(Operator::Filter(predicate));
        self
    }

    /// Appends a map that assigns `expr` to `field`.
    pub fn map(mut self, field: impl Into<String>, expr: Expr) -> Self {
        self.operators.push(Operator::Map {
            field: field.into(),
            expr,
        });
        self
    }

    /// Opens a window; the aggregations follow with `apply`.
    pub fn window(self, window: Window) -> WindowedQuery {
        WindowedQuery {
            query: self,
            window,
        }
    }

    /// Appends a projection.
    pub fn project(mut self, fields: Vec<Expr>) -> Self {
        self.operators.push(Operator::Project(fields));
        self
    }

    /// Sets the sink.
    pub fn sink(mut self, sink: DataSinkType) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the sink, if one has been set.
    pub fn datasink(&self) -> Option<&DataSinkType> {
        self.sink.as_ref()
    }

    /// Checks that the coordinator can accept the query.
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(NebulaError::Plan("query without a source".to_string()));
        }
        for op in &self.operators {
            match op {
                Operator::Window { aggregations, .. } if aggregations.is_empty() => {
                    return Err(NebulaError::Plan(format!(
                        "window on {} without aggregation",
                        self.source
                    )));
                }
                Operator::Project(fields) if fields.is_empty() => {
                    return Err(NebulaError::Plan(format!(
                        "empty projection on {}",
                        self.source
                    )));
                }
                Operator::Map { field, .. } if field.trim().is_empty() => {
                    return Err(NebulaError::Plan(format!(
                        "map without target field on {}",
                        self.source
                    )));
                }
                _ => {}
            }
        }
        if self.sink.is_none() {
            return Err(NebulaError::Plan(format!(
                "query on {} has no sink",
                self.source
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query::from(\"{}\")", self.source)?;
        for op in &self.operators {
            write!(f, "{}", op)?;
        }
        if let Some(sink) = &self.sink {
            write!(f, ".sink({})", sink)?;
        }
        write!(f, ";")
    }
}

#[cfg(test)]
mod tests {
    use super::aggregation::Aggregation;
    use super::expr::{attr, typed_attr};
    use super::*;
    use crate::datasource::BasicType;
    use crate::stream::TimeMeasure;

    #[test]
    fn filter_query_text() -> Result<()> {
        let query = Query::from("sncb")
            .filter(attr("speed").gt(100))
            .sink(DataSinkType::csv_file("query_output.csv"));
        query.validate()?;
        assert_eq!(
            "Query::from(\"sncb\").filter(Attribute(\"speed\") > 100)\
             .sink(FileSinkDescriptor::create(\"query_output.csv\", \"CSV_FORMAT\", \"APPEND\"));",
            query.to_string()
        );
        Ok(())
    }

    #[test]
    fn windowed_pipeline_text() -> Result<()> {
        let query = Query::from("nrok5")
            .window(Window::sliding(
                typed_attr("timestamp", BasicType::UInt64),
                TimeMeasure::Seconds(10),
                TimeMeasure::Seconds(1),
            ))
            .apply(vec![
                Aggregation::min(attr("PCFA_bar")).alias("lo"),
                Aggregation::max(attr("PCFA_bar")).alias("hi"),
            ])
            .map("variation", attr("hi") - attr("lo"))
            .filter(attr("variation").gt(0.4))
            .project(vec![attr("start"), attr("variation")])
            .sink(DataSinkType::Print);
        query.validate()?;

        let text = query.to_string();
        assert!(text.starts_with("Query::from(\"nrok5\").window(SlidingWindow::of("));
        assert!(text.contains(
            ".apply(Min(Attribute(\"PCFA_bar\"))->as(Attribute(\"lo\")), \
             Max(Attribute(\"PCFA_bar\"))->as(Attribute(\"hi\")))"
        ));
        assert!(text.contains(".map(Attribute(\"variation\") = Attribute(\"hi\") - Attribute(\"lo\"))"));
        assert!(text.contains(".filter(Attribute(\"variation\") > 0.4)"));
        assert!(text.contains(".project(Attribute(\"start\"), Attribute(\"variation\"))"));
        assert!(text.ends_with(".sink(PrintSinkDescriptor::create());"));
        Ok(())
    }

    #[test]
    fn invalid_queries() {
        let no_sink = Query::from("sncb").filter(attr("speed").gt(100));
        assert!(matches!(no_sink.validate(), Err(NebulaError::Plan(_))));

        let no_source = Query::from("").sink(DataSinkType::Print);
        assert!(no_source.validate().is_err());

        let no_agg = Query::from("sncb")
            .window(Window::tumbling(attr("timestamp"), TimeMeasure::Seconds(1)))
            .apply(vec![])
            .sink(DataSinkType::Print);
        assert!(no_agg.validate().is_err());

        let empty_projection = Query::from("sncb")
            .project(vec![])
            .sink(DataSinkType::Print);
        assert!(empty_projection.validate().is_err());
    }
}
