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

//! Rainbow-colored section banners for the console reports.

use std::f64::consts::PI;

const RULE_WIDTH: usize = 60;

/// Colors every visible character of `line` along a rainbow.
pub fn rainbow_string(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 20);
    for (i, c) in line.chars().enumerate() {
        if c.is_whitespace() {
            out.push(c);
        } else {
            let (r, g, b) = rgb(0.1, 3.0, i as f64);
            out.push_str(&format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, c));
        }
    }
    out
}

/// Prints the text in the rainbow fashion.
pub fn rainbow_println(line: &str) {
    println!("{}", rainbow_string(line));
}

/// Prints `title` centered between two rules.
pub fn rainbow_banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    rainbow_println(&rule);
    rainbow_println(&format!("{:^width$}", title, width = RULE_WIDTH));
    rainbow_println(&rule);
}

fn rgb(freq: f64, spread: f64, i: f64) -> (u8, u8, u8) {
    let j = i / spread;
    let red = (freq * j).sin() * 127.0 + 128.0;
    let green = (freq * j + 2.0 * PI / 3.0).sin() * 127.0 + 128.0;
    let blue = (freq * j + 4.0 * PI / 3.0).sin() * 127.0 + 128.0;
    (red as u8, green as u8, blue as u8)
}
