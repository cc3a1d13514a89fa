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

#![warn(missing_docs, clippy::needless_borrow)]
// Clippy lints, some should be disabled incrementally
#![allow(
    clippy::float_cmp,
    clippy::module_inception,
    clippy::new_without_default,
    clippy::should_implement_trait,
    clippy::upper_case_acronyms
)]

//! Nebula is a client for a distributed stream-processing coordinator. It
//! describes streaming queries with a builder API, submits them over the
//! coordinator's REST interface and drives their life cycle.

pub mod client;
pub mod configs;
pub mod datasink;
pub mod datasource;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod query;
pub mod stream;
pub mod test_util;
pub mod workload;
