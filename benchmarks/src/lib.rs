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

//! Benchmarks of the geospatial railway query: a monitor that watches the
//! result file of a query started elsewhere, and a performance run that
//! submits, polls and stops the query itself.

pub mod metrics;
pub mod monitor;
pub mod perf;
pub mod rainbow;
pub mod sampler;
pub mod summary;

pub use monitor::{monitor_benchmark, MonitorBenchmarkOpt};
pub use perf::{perf_benchmark, PerfBenchmarkOpt};
pub use rainbow::{rainbow_banner, rainbow_println};
