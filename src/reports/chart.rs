/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::reports::assembler::SeriesPoint;
use crate::util::date::Month;
use rust_decimal::prelude::ToPrimitive;

pub const CHART_FILE: &str = "inc_exp.svg";

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const GRID_LINES: usize = 5;

const BAR_COLOR: &str = "#008fd5";
const LINE_COLOR: &str = "#fc4f30";

/// Builds the net bar chart with the cumulative line over it. One builder
/// renders one chart.
pub struct ChartBuilder {
	title: String,
	axis: Vec<Month>,
	series: Vec<SeriesPoint>,
}

impl ChartBuilder {
	/// The x-axis covers the first through last month, widened as needed to
	/// include every month that has data.
	pub fn new(title: &str, first: Month, last: Month) -> Self {
		Self {
			title: title.to_string(),
			axis: first.through(&last),
			series: Vec::new(),
		}
	}

	pub fn series(mut self, series: &[SeriesPoint]) -> Self {
		self.series = series.to_vec();
		if let (Some(first), Some(last)) = (series.first(), series.last()) {
			let start = self.axis.first().map_or(first.month, |m| *m.min(&first.month));
			let end = self.axis.last().map_or(last.month, |m| *m.max(&last.month));
			self.axis = start.through(&end);
		}
		self
	}

	pub fn render(&self) -> String {
		let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
		let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
		let slot = plot_width / self.axis.len().max(1) as f64;

		let values: Vec<(f64, f64)> = self
			.series
			.iter()
			.map(|p| (to_f64(p.net), to_f64(p.cumulative)))
			.collect();
		let (low, high) = value_range(&values);
		let y = |v: f64| MARGIN_TOP + (high - v) / (high - low) * plot_height;
		let x = |month: &Month| {
			let index = self.axis.iter().position(|m| m == month).unwrap_or(0);
			MARGIN_LEFT + slot * (index as f64 + 0.5)
		};

		let mut lines = Vec::new();
		lines.push(format!(
			"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\" font-size=\"11\">"
		));
		lines.push(format!(
			"<rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#f0f0f0\"/>"
		));
		lines.push(format!(
			"<text x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{}</text>",
			WIDTH / 2.0,
			tera::escape_html(&self.title)
		));

		// Horizontal grid with value labels
		for i in 0..=GRID_LINES {
			let value = low + (high - low) * i as f64 / GRID_LINES as f64;
			let gy = y(value);
			lines.push(format!(
				"<line x1=\"{MARGIN_LEFT}\" y1=\"{gy:.1}\" x2=\"{:.1}\" y2=\"{gy:.1}\" stroke=\"#cbcbcb\" stroke-width=\"0.5\"/>",
				WIDTH - MARGIN_RIGHT
			));
			lines.push(format!(
				"<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{:.0}</text>",
				MARGIN_LEFT - 6.0,
				gy + 4.0,
				value
			));
		}

		// Month ticks, with the year under each January and the first month
		for (i, month) in self.axis.iter().enumerate() {
			let mx = x(month);
			lines.push(format!(
				"<text x=\"{mx:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
				HEIGHT - MARGIN_BOTTOM + 16.0,
				month.short_name()
			));
			if i == 0 || month.month() == 1 {
				lines.push(format!(
					"<text x=\"{mx:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
					HEIGHT - MARGIN_BOTTOM + 32.0,
					month.year()
				));
			}
		}

		let bar_width = slot * 0.8;
		for (point, (net, _)) in self.series.iter().zip(&values) {
			let (top, bottom) = if *net >= 0.0 {
				(y(*net), y(0.0))
			} else {
				(y(0.0), y(*net))
			};
			lines.push(format!(
				"<rect class=\"net\" x=\"{:.1}\" y=\"{top:.1}\" width=\"{bar_width:.1}\" height=\"{:.1}\" fill=\"{BAR_COLOR}\"><title>{} {}</title></rect>",
				x(&point.month) - bar_width / 2.0,
				bottom - top,
				point.month,
				point.net
			));
		}

		lines.push(format!(
			"<line class=\"baseline\" x1=\"{MARGIN_LEFT}\" y1=\"{zero:.1}\" x2=\"{:.1}\" y2=\"{zero:.1}\" stroke=\"#000\" stroke-width=\"0.8\"/>",
			WIDTH - MARGIN_RIGHT,
			zero = y(0.0)
		));

		if !self.series.is_empty() {
			let points: Vec<String> = self
				.series
				.iter()
				.zip(&values)
				.map(|(point, (_, cumulative))| {
					format!("{:.1},{:.1}", x(&point.month), y(*cumulative))
				})
				.collect();
			lines.push(format!(
				"<polyline class=\"cumulative\" points=\"{}\" fill=\"none\" stroke=\"{LINE_COLOR}\" stroke-width=\"2\"/>",
				points.join(" ")
			));
		}

		lines.push("</svg>".to_string());
		lines.join("\n") + "\n"
	}
}

fn to_f64(value: rust_decimal::Decimal) -> f64 {
	value.to_f64().unwrap_or_default()
}

/// Bounds of the y-axis. Zero is always in range, and a flat range is
/// widened so the scale never divides by zero.
fn value_range(values: &[(f64, f64)]) -> (f64, f64) {
	let (low, high) = values
		.iter()
		.flat_map(|(a, b)| [*a, *b])
		.fold((0.0_f64, 0.0_f64), |(low, high), v| (low.min(v), high.max(v)));

	if high - low < f64::EPSILON {
		(low - 1.0, high + 1.0)
	} else {
		let pad = (high - low) * 0.05;
		(low - pad, high + pad)
	}
}
