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

//! Railway monitoring queries over the `sncb`, `weather` and `nrok5` streams.

use super::{QueryDetails, Workload};
use crate::client::PlacementStrategy;
use crate::datasink::DataSinkType;
use crate::datasource::{sncb as schemas, BasicType};
use crate::query::aggregation::Aggregation;
use crate::query::expr::{attr, call, lit, typed_attr};
use crate::query::Query;
use crate::stream::{TimeMeasure, Window};
use std::time::Duration;

/// Result file of the geospatial workload.
pub const GEOSPATIAL_OUTPUT: &str = "query1.csv";

/// Trains running faster than 100.
pub fn speed_filter(sink: DataSinkType) -> Query {
    Query::from("sncb").filter(attr("speed").gt(100)).sink(sink)
}

/// Sum of the speed of trains reporting a status code while inside the
/// monitored area. A window lasts as long as consecutive positions intersect
/// the area.
pub fn geospatial_threshold(sink: DataSinkType) -> Query {
    Query::from("sncb")
        .filter(attr("Code1").not_eq(0).or(attr("Code2").not_eq(0)))
        .window(Window::threshold(
            call(
                "teintersects",
                vec![
                    typed_attr("longitude", BasicType::Float64),
                    typed_attr("latitude", BasicType::Float64),
                    typed_attr("timestamp", BasicType::UInt64),
                ],
            )
            .eq(1),
        ))
        .apply(vec![Aggregation::sum(typed_attr("speed", BasicType::UInt64))])
        .sink(sink)
}

/// The summary of [`geospatial_threshold`].
pub fn geospatial_details() -> QueryDetails {
    QueryDetails::new(
        "sncb",
        "(Code1 != 0 || Code2 != 0)",
        "ThresholdWindow(teintersects)",
        "Sum(speed)",
    )
}

fn renamed(source: &str, fields: &[(&str, &str)], sink: DataSinkType) -> Query {
    fields
        .iter()
        .fold(Query::from(source), |q, (to, from)| q.map(*to, attr(*from)))
        .sink(sink)
}

/// Weather observations with prefixed field names.
pub fn weather_feed(sink: DataSinkType) -> Query {
    renamed(
        "weather",
        &[
            ("w_temperature", "temperature"),
            ("w_timestamp", "timestamp"),
            ("w_gps_lat", "gps_lat"),
            ("w_gps_lon", "gps_lon"),
        ],
        sink,
    )
}

/// Train positions and speed with prefixed field names.
pub fn train_feed(sink: DataSinkType) -> Query {
    renamed(
        "sncb",
        &[
            ("t_timestamp", "timestamp"),
            ("t_lat", "latitude"),
            ("t_lon", "longitude"),
            ("t_speed", "speed"),
        ],
        sink,
    )
}

/// Average speed per 500 ms of crowded trains inside the monitored
/// spatio-temporal box.
pub fn passenger_load(sink: DataSinkType) -> Query {
    let load = (attr("T1_bar") + attr("T2_bar") + attr("PCF1_bar") + attr("PCF2_bar")) / 4.0;
    let in_box = call(
        "tpointatstbox",
        vec![
            typed_attr("longitude", BasicType::Float64),
            typed_attr("latitude", BasicType::Float64),
            typed_attr("timestamp", BasicType::UInt64),
        ],
    )
    .eq(1)
    .and(attr("speed").gt(lit(-1)));

    Query::from("sncb")
        .map("passenger_count", load)
        .filter(attr("passenger_count").gt(3.15))
        .filter(in_box)
        .map("adjusted_temp", lit(20.0))
        .map("adjusted_light", lit(80.0))
        .window(Window::tumbling(
            attr("timestamp"),
            TimeMeasure::Milliseconds(500),
        ))
        .apply(vec![Aggregation::avg(attr("speed"))])
        .sink(sink)
}

fn pressure_window(slide: TimeMeasure) -> Window {
    Window::sliding(
        typed_attr("timestamp", BasicType::UInt64),
        TimeMeasure::Seconds(10),
        slide,
    )
}

/// Windows where the main pipe pressure varies while the brake pipe
/// pressure stays flat.
pub fn pressure_variation(sink: DataSinkType) -> Query {
    Query::from("nrok5")
        .window(pressure_window(TimeMeasure::Milliseconds(10)))
        .apply(vec![
            Aggregation::min(attr("PCFA_bar")).alias("PCFA_min_value"),
            Aggregation::max(attr("PCFA_bar")).alias("PCFA_max_value"),
            Aggregation::min(attr("PCFF_bar")).alias("PCFF_min_value"),
            Aggregation::max(attr("PCFF_bar")).alias("PCFF_max_value"),
        ])
        .map("wStart", attr("start"))
        .map("wEnd", attr("end"))
        .map("variationPCFA", attr("PCFA_max_value") - attr("PCFA_min_value"))
        .map("variationPCFF", attr("PCFF_max_value") - attr("PCFF_min_value"))
        .filter(
            attr("variationPCFA")
                .gt(0.4)
                .and(attr("variationPCFF").lt_eq(0.1)),
        )
        .project(vec![
            attr("wStart"),
            attr("wEnd"),
            attr("variationPCFA"),
            attr("variationPCFF"),
        ])
        .sink(sink)
}

/// Windows where the main pipe pressure varies by more than 0.4 bar.
pub fn main_pipe_variation(sink: DataSinkType) -> Query {
    Query::from("nrok5")
        .window(pressure_window(TimeMeasure::Seconds(1)))
        .apply(vec![
            Aggregation::min(attr("PCFA_bar")).alias("PCFA_min_value"),
            Aggregation::max(attr("PCFA_bar")).alias("PCFA_max_value"),
        ])
        .map("wStart", attr("start"))
        .map("wEnd", attr("end"))
        .map("variationPCFA", attr("PCFA_max_value") - attr("PCFA_min_value"))
        .filter(attr("variationPCFA").gt(0.4))
        .project(vec![
            attr("wStart"),
            attr("wEnd"),
            attr("PCFA_min_value"),
            attr("PCFA_max_value"),
            attr("variationPCFA"),
        ])
        .sink(sink)
}

/// Main pipe variation reported at the window end.
pub fn main_pipe_alert(sink: DataSinkType) -> Query {
    Query::from("nrok5")
        .window(pressure_window(TimeMeasure::Seconds(1)))
        .apply(vec![
            Aggregation::min(attr("PCFA_bar")).alias("min_pcfa_bar"),
            Aggregation::max(attr("PCFA_bar")).alias("max_pcfa_bar"),
        ])
        .map("window_end_ts", attr("end"))
        .map("variation", attr("max_pcfa_bar") - attr("min_pcfa_bar"))
        .filter(attr("variation").gt(0.4))
        .project(vec![
            attr("window_end_ts"),
            attr("min_pcfa_bar"),
            attr("max_pcfa_bar"),
            attr("variation"),
        ])
        .sink(sink)
}

/// Windows where the brake pipe pressure varies by less than 0.1 bar.
pub fn brake_pipe_steady(sink: DataSinkType) -> Query {
    Query::from("nrok5")
        .window(pressure_window(TimeMeasure::Seconds(1)))
        .apply(vec![
            Aggregation::min(attr("PCFF_bar")).alias("PCFF_min_value_f"),
            Aggregation::max(attr("PCFF_bar")).alias("PCFF_max_value_f"),
        ])
        .map(
            "variationPCFF_f",
            attr("PCFF_max_value_f") - attr("PCFF_min_value_f"),
        )
        .filter(attr("variationPCFF_f").lt(0.1))
        .project(vec![
            attr("start"),
            attr("end"),
            attr("PCFF_min_value_f"),
            attr("PCFF_max_value_f"),
            attr("variationPCFF_f"),
        ])
        .sink(sink)
}

/// `speed`
pub fn speed() -> Workload {
    Workload {
        name:        "speed",
        description: "Trains faster than 100",
        queries:     vec![speed_filter(DataSinkType::csv_file("query_output.csv"))],
        sources:     vec![schemas::sncb()],
        placement:   PlacementStrategy::BottomUp,
        wait:        Duration::from_secs(10),
        details:     QueryDetails::new("sncb", "speed > 100", "none", "none"),
    }
}

/// `q1`
pub fn q1() -> Workload {
    Workload {
        name:        "q1",
        description: "Speed sum of trains with status codes inside the monitored area",
        queries:     vec![geospatial_threshold(DataSinkType::csv_file(
            GEOSPATIAL_OUTPUT,
        ))],
        sources:     vec![schemas::sncb()],
        placement:   PlacementStrategy::TopDown,
        wait:        Duration::from_secs(60),
        details:     geospatial_details(),
    }
}

/// `q4`
pub fn q4() -> Workload {
    Workload {
        name:        "q4",
        description: "Weather and train feeds with renamed fields",
        queries:     vec![
            weather_feed(DataSinkType::csv_file("weather_data.csv")),
            train_feed(DataSinkType::csv_file("train_data.csv")),
        ],
        sources:     vec![schemas::weather(), schemas::sncb()],
        placement:   PlacementStrategy::TopDown,
        wait:        Duration::from_secs(20),
        details:     QueryDetails::new("weather", "none", "none", "none"),
    }
}

/// `q5`
pub fn q5() -> Workload {
    Workload {
        name:        "q5",
        description: "Average speed of crowded trains inside the monitored box",
        queries:     vec![passenger_load(DataSinkType::Print)],
        sources:     vec![schemas::sncb()],
        placement:   PlacementStrategy::TopDown,
        wait:        Duration::from_secs(10),
        details:     QueryDetails::new(
            "sncb",
            "passenger_count > 3.15 && tpointatstbox",
            "TumblingWindow(500ms)",
            "Avg(speed)",
        ),
    }
}

/// `q6`
pub fn q6() -> Workload {
    Workload {
        name:        "q6",
        description: "Main pipe pressure variation with steady brake pipe",
        queries:     vec![pressure_variation(DataSinkType::csv_file("query6.csv"))],
        sources:     vec![schemas::nrok5()],
        placement:   PlacementStrategy::TopDown,
        wait:        Duration::from_secs(20),
        details:     QueryDetails::new(
            "nrok5",
            "variationPCFA > 0.4 && variationPCFF <= 0.1",
            "SlidingWindow(10s, 10ms)",
            "Min/Max(PCFA_bar, PCFF_bar)",
        ),
    }
}

/// `cfa`
pub fn cfa() -> Workload {
    Workload {
        name:        "cfa",
        description: "Main pipe pressure variation above 0.4 bar",
        queries:     vec![main_pipe_variation(DataSinkType::csv_file(
            "outputFileCFA_nrok5.csv",
        ))],
        sources:     vec![schemas::nrok5()],
        placement:   PlacementStrategy::TopDown,
        wait:        Duration::from_secs(20),
        details:     QueryDetails::new(
            "nrok5",
            "variationPCFA > 0.4",
            "SlidingWindow(10s, 1s)",
            "Min/Max(PCFA_bar)",
        ),
    }
}

/// `cfa-cff`
pub fn cfa_cff() -> Workload {
    Workload {
        name:        "cfa-cff",
        description: "Main pipe alerts and steady brake pipe windows side by side",
        queries:     vec![
            main_pipe_alert(DataSinkType::csv_file("outputCFA.csv")),
            brake_pipe_steady(DataSinkType::csv_file("outputCFF.csv")),
        ],
        sources:     vec![schemas::nrok5()],
        placement:   PlacementStrategy::TopDown,
        wait:        Duration::from_secs(20),
        details:     QueryDetails::new(
            "nrok5",
            "variation > 0.4",
            "SlidingWindow(10s, 1s)",
            "Min/Max(PCFA_bar)",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geospatial_query_text() {
        let q = geospatial_threshold(DataSinkType::csv_file("query1_performance_results.csv"));
        assert_eq!(
            "Query::from(\"sncb\")\
             .filter((Attribute(\"Code1\") != 0) || (Attribute(\"Code2\") != 0))\
             .window(ThresholdWindow::of(teintersects(\
             Attribute(\"longitude\", BasicType::FLOAT64), \
             Attribute(\"latitude\", BasicType::FLOAT64), \
             Attribute(\"timestamp\", BasicType::UINT64)) == 1))\
             .apply(Sum(Attribute(\"speed\", BasicType::UINT64)))\
             .sink(FileSinkDescriptor::create(\"query1_performance_results.csv\", \"CSV_FORMAT\", \"APPEND\"));",
            q.to_string()
        );
    }

    #[test]
    fn details_match_the_plan() {
        let q = geospatial_threshold(DataSinkType::Print);
        let details = geospatial_details();
        assert_eq!(q.source, details.source);
        match &q.operators[1] {
            crate::query::Operator::Window {
                window,
                aggregations,
            } => {
                assert_eq!(details.window, window.describe());
                assert_eq!(details.aggregation, aggregations[0].describe());
            }
            other => panic!("unexpected operator: {:?}", other),
        }
    }

    #[test]
    fn passenger_load_text() {
        let text = passenger_load(DataSinkType::Print).to_string();
        assert!(text.contains(".filter(Attribute(\"passenger_count\") > 3.15)"));
        assert!(text.contains("Attribute(\"speed\") > -1"));
        assert!(text.contains(".map(Attribute(\"adjusted_temp\") = 20.0)"));
        assert!(text.contains(
            ".window(TumblingWindow::of(EventTime(Attribute(\"timestamp\")), Milliseconds(500)))\
             .apply(Avg(Attribute(\"speed\")))"
        ));
    }

    #[test]
    fn renamed_feeds() {
        let text = weather_feed(DataSinkType::csv_file("weather_data.csv")).to_string();
        assert!(text.starts_with(
            "Query::from(\"weather\").map(Attribute(\"w_temperature\") = Attribute(\"temperature\"))"
        ));
        assert_eq!(4, train_feed(DataSinkType::Print).operators.len());
    }
}
