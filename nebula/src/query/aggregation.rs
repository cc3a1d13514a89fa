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

//! Aggregates computed once per window.

use crate::query::expr::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Window aggregation functions.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Sum => "Sum",
            AggregateFunction::Avg => "Avg",
            AggregateFunction::Min => "Min",
            AggregateFunction::Max => "Max",
            AggregateFunction::Count => "Count",
        };
        f.write_str(name)
    }
}

/// One aggregate computed per window, optionally renamed in the output.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Aggregation {
    /// The function.
    pub func:  AggregateFunction,
    /// The aggregated field.
    pub field: Expr,
    /// Output field name.
    pub alias: Option<String>,
}

impl Aggregation {
    fn new(func: AggregateFunction, field: Expr) -> Self {
        Aggregation {
            func,
            field,
            alias: None,
        }
    }

    /// `Sum(field)`
    pub fn sum(field: Expr) -> Self {
        Self::new(AggregateFunction::Sum, field)
    }

    /// `Avg(field)`
    pub fn avg(field: Expr) -> Self {
        Self::new(AggregateFunction::Avg, field)
    }

    /// `Min(field)`
    pub fn min(field: Expr) -> Self {
        Self::new(AggregateFunction::Min, field)
    }

    /// `Max(field)`
    pub fn max(field: Expr) -> Self {
        Self::new(AggregateFunction::Max, field)
    }

    /// `Count(field)`
    pub fn count(field: Expr) -> Self {
        Self::new(AggregateFunction::Count, field)
    }

    /// Renames the output field.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }

    /// Short description for reports, e.g. `Sum(speed)`.
    pub fn describe(&self) -> String {
        match self.field.attribute_name() {
            Some(name) => format!("{}({})", self.func, name),
            None => format!("{}({})", self.func, self.field),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.func, self.field)?;
        if let Some(alias) = &self.alias {
            write!(f, "->as(Attribute(\"{}\"))", alias)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::BasicType;
    use crate::query::expr::{attr, typed_attr};

    #[test]
    fn aggregation_rendering() {
        let sum = Aggregation::sum(typed_attr("speed", BasicType::UInt64));
        assert_eq!("Sum(Attribute(\"speed\", BasicType::UINT64))", sum.to_string());
        assert_eq!("Sum(speed)", sum.describe());

        let min = Aggregation::min(attr("PCFA_bar")).alias("PCFA_min_value");
        assert_eq!(
            "Min(Attribute(\"PCFA_bar\"))->as(Attribute(\"PCFA_min_value\"))",
            min.to_string()
        );

        let count = Aggregation::count(attr("speed"));
        assert_eq!("Count(Attribute(\"speed\"))", count.to_string());
        assert_eq!("Count(speed)", count.describe());
    }
}
