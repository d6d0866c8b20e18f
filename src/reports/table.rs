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
use crate::config::config_file::SummaryFormat;
use crate::reports::assembler::Report;
use anyhow::Error;

/// The Income, Expense and total rows laid out for the terminal.
pub fn summary_table(
	report: &Report,
	format: SummaryFormat,
) -> Result<Table, Error> {
	let header = report.header();
	let mut table = Table::new(header.len());
	table.right_align(1..header.len());
	table.add_header(header);
	table.add_separator();
	for row in report.summary_rows(format)? {
		table.add_row(row);
	}
	Ok(table)
}

/// Plain text table for terminal output, with a centered header and
/// right-aligned numeric columns.
pub struct Table {
	column_count: usize,
	rows: Vec<Row>,
	right_align: Vec<bool>, // indicates columns by index
}

pub enum Row {
	Header(Vec<String>),
	Data(Vec<String>),
	Separator,
}

impl Table {
	pub fn new(column_count: usize) -> Self {
		Self {
			column_count,
			rows: Vec::new(),
			right_align: vec![false; column_count],
		}
	}

	/// Adds a header row.
	pub fn add_header(&mut self, row: Vec<String>) {
		self.rows.push(Row::Header(row));
	}

	/// Adds a data row.
	pub fn add_row(&mut self, row: Vec<String>) {
		self.rows.push(Row::Data(row));
	}

	/// Adds a full separator row.
	pub fn add_separator(&mut self) {
		self.rows.push(Row::Separator);
	}

	/// Specifies columns that should be right-aligned by index.
	pub fn right_align(&mut self, cols: impl IntoIterator<Item = usize>) {
		for col in cols {
			if let Some(flag) = self.right_align.get_mut(col) {
				*flag = true;
			}
		}
	}

	pub fn print(&self) {
		println!();
		print!("{}", self.render());
	}

	pub fn render(&self) -> String {
		let mut max_widths = vec![0; self.column_count];

		// Calculate maximum column widths for proper spacing
		for row in &self.rows {
			if let Row::Data(data_row) | Row::Header(data_row) = row {
				for (i, value) in data_row.iter().enumerate() {
					if i < self.column_count {
						max_widths[i] = max_widths[i].max(value.chars().count());
					}
				}
			}
		}

		let mut out = String::new();
		for row in &self.rows {
			match row {
				Row::Header(header_row) => {
					self.render_centered_row(&mut out, &max_widths, header_row, " | ")
				},
				Row::Data(data_row) => {
					self.render_data_row(&mut out, &max_widths, data_row, "   ")
				},
				Row::Separator => self.render_separator(&mut out, &max_widths),
			}
		}
		out
	}

	fn render_data_row(
		&self,
		out: &mut String,
		max_widths: &[usize],
		data_row: &[String],
		separator: &str,
	) {
		let cells: Vec<String> = data_row
			.iter()
			.zip(max_widths)
			.enumerate()
			.map(|(i, (value, width))| {
				if self.right_align[i] {
					format!("{:>width$}", value, width = width)
				} else {
					format!("{:<width$}", value, width = width)
				}
			})
			.collect();
		out.push_str(cells.join(separator).trim_end());
		out.push('\n');
	}

	fn render_centered_row(
		&self,
		out: &mut String,
		max_widths: &[usize],
		data_row: &[String],
		separator: &str,
	) {
		let cells: Vec<String> = data_row
			.iter()
			.zip(max_widths)
			.map(|(value, width)| Table::center_align(value, *width))
			.collect();
		out.push_str(cells.join(separator).trim_end());
		out.push('\n');
	}

	fn render_separator(&self, out: &mut String, max_widths: &[usize]) {
		let total_width: usize = max_widths.iter().sum::<usize>()
			+ (3 * self.column_count.saturating_sub(1));
		out.push_str(&"-".repeat(total_width));
		out.push('\n');
	}

	fn center_align(value: &str, width: usize) -> String {
		let len = value.chars().count();
		if len >= width {
			return value.to_string();
		}
		let total_padding = width - len;
		let left_padding = total_padding / 2;
		let right_padding = total_padding - left_padding;

		format!(
			"{}{}{}",
			" ".repeat(left_padding),
			value,
			" ".repeat(right_padding)
		)
	}
}
