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

//! A stream is unbounded, so aggregations are evaluated over windows. The
//! coordinator supports windows defined in terms of event time and windows
//! whose boundaries are decided by a predicate on the records themselves.
//!
//! - A time-based window is opened and closed by the timestamps carried in
//!   the records (event time), never by the wall clock of the client.
//! - A threshold window stays open while its predicate holds and closes on
//!   the first record for which it does not.

use crate::query::expr::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A window length.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum TimeMeasure {
    /// Milliseconds.
    Milliseconds(u64),
    /// Seconds.
    Seconds(u64),
    /// Minutes.
    Minutes(u64),
}

impl TimeMeasure {
    /// Returns the length as a [`Duration`].
    pub fn as_duration(&self) -> Duration {
        match *self {
            TimeMeasure::Milliseconds(n) => Duration::from_millis(n),
            TimeMeasure::Seconds(n) => Duration::from_secs(n),
            TimeMeasure::Minutes(n) => Duration::from_secs(n * 60),
        }
    }
}

impl fmt::Display for TimeMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeMeasure::Milliseconds(n) => write!(f, "Milliseconds({})", n),
            TimeMeasure::Seconds(n) => write!(f, "Seconds({})", n),
            TimeMeasure::Minutes(n) => write!(f, "Minutes({})", n),
        }
    }
}

/// A enum `Window` to define different window types.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum Window {
    /// Distinct event-time windows that open and close at regular intervals.
    /// Each record belongs to exactly one window.
    Tumbling {
        /// The event-time attribute.
        time: Expr,
        /// Window length.
        size: TimeMeasure,
    },
    /// Overlapping event-time windows of length `size` that start every
    /// `slide`. A record belongs to `size / slide` windows.
    Sliding {
        /// The event-time attribute.
        time:  Expr,
        /// Window length.
        size:  TimeMeasure,
        /// Distance between the starts of two consecutive windows.
        slide: TimeMeasure,
    },
    /// A data-driven window that collects consecutive records while
    /// `predicate` holds.
    Threshold {
        /// Keeps the window open.
        predicate: Expr,
        /// Windows with fewer records are discarded.
        min_count: Option<u64>,
    },
}

impl Window {
    /// A tumbling event-time window.
    pub fn tumbling(time: Expr, size: TimeMeasure) -> Self {
        Window::Tumbling { time, size }
    }

    /// A sliding event-time window.
    pub fn sliding(time: Expr, size: TimeMeasure, slide: TimeMeasure) -> Self {
        Window::Sliding { time, size, slide }
    }

    /// A threshold window without minimum record count.
    pub fn threshold(predicate: Expr) -> Self {
        Window::Threshold {
            predicate,
            min_count: None,
        }
    }

    /// Short description for reports, e.g. `SlidingWindow(10s, 1s)`.
    pub fn describe(&self) -> String {
        match self {
            Window::Tumbling { size, .. } => {
                format!("TumblingWindow({})", humantime::format_duration(size.as_duration()))
            }
            Window::Sliding { size, slide, .. } => format!(
                "SlidingWindow({}, {})",
                humantime::format_duration(size.as_duration()),
                humantime::format_duration(slide.as_duration())
            ),
            Window::Threshold { predicate, .. } => match predicate {
                Expr::Binary { left, .. } => match left.as_ref() {
                    Expr::Call { func, .. } => format!("ThresholdWindow({})", func),
                    _ => "ThresholdWindow".to_string(),
                },
                Expr::Call { func, .. } => format!("ThresholdWindow({})", func),
                _ => "ThresholdWindow".to_string(),
            },
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Tumbling { time, size } => {
                write!(f, "TumblingWindow::of(EventTime({}), {})", time, size)
            }
            Window::Sliding { time, size, slide } => write!(
                f,
                "SlidingWindow::of(EventTime({}), {}, {})",
                time, size, slide
            ),
            Window::Threshold {
                predicate,
                min_count: None,
            } => write!(f, "ThresholdWindow::of({})", predicate),
            Window::Threshold {
                predicate,
                min_count: Some(n),
            } => write!(f, "ThresholdWindow::of({}, {})", predicate, n),
        }
    }
}
