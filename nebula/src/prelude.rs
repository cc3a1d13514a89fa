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

//! A "prelude" for users of the nebula crate.
//!
//! Like the standard library's prelude, this module simplifies importing of
//! common items. Unlike the standard prelude, the contents of this module must
//! be imported manually:
//!
//! ```
//! use nebula::prelude::*;
//! ```

pub use crate::client::{PlacementStrategy, QueryConfig, QueryId, RemoteClient};
pub use crate::configs::*;
pub use crate::datasink::{DataSinkFormat, DataSinkType};
pub use crate::datasource::{sncb, BasicType, LogicalSource, Schema};
pub use crate::driver::{run_workload, RunOptions, WorkloadReport};
pub use crate::error::{NebulaError, Result};
pub use crate::query::aggregation::Aggregation;
pub use crate::query::expr::{attr, call, lit, typed_attr, Expr};
pub use crate::query::{Query, WindowedQuery};
pub use crate::stream::{TimeMeasure, Window};
pub use crate::workload::{workload, workloads, QueryDetails, Workload};
