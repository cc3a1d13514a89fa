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

use benchmarks::{perf_benchmark, PerfBenchmarkOpt};
use log::error;
use structopt::StructOpt;

#[tokio::main]
async fn main() {
    env_logger::init();
    match perf_benchmark(PerfBenchmarkOpt::from_args()).await {
        Ok(metrics) if metrics.query_success => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            error!("Benchmark error: {}", e);
            std::process::exit(1);
        }
    }
}
