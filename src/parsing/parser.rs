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
use crate::gl::ledger::Ledger;
use crate::gl::observed_rate::ObservationType;
use crate::parsing::filesystem::Filesystem;
use crate::util::amount::{parse_decimal, Amount, Cost};
use crate::util::date::parse_date;
use anyhow::{anyhow, bail, Error};
use regex::Regex;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::debug;

pub struct Parser {
	fs: Filesystem,
	detail_regex: Regex,

	/// Kept to order transactions on the same date in the order they
	/// appear in the ledger.
	entry_count: usize,
}

impl Parser {
	pub fn new() -> Result<Self, Error> {
		Ok(Self {
			detail_regex: Regex::new(r#""([^"]*)"|(\S+)"#)?,
			fs: Filesystem::new(),
			entry_count: 0,
		})
	}

	/// Reads the ledger at file_path, following includes, and returns it
	/// with every transaction balanced and sorted.
	pub fn load(&mut self, file_path: &Path) -> Result<Ledger, Error> {
		let mut ledger = Ledger::new();
		self.parse_file(file_path, &mut ledger)?;
		ledger.finalize()?;
		Ok(ledger)
	}

	/// Parses one file into the ledger. Includes are resolved relative to the
	/// including file, and each file may only be read once, which also rules
	/// out circular includes.
	fn parse_file(
		&mut self,
		file_path: &Path,
		ledger: &mut Ledger,
	) -> Result<(), Error> {
		debug!("parsing {}", file_path.display());

		self.fs.declare_file(file_path)?;
		let file = self.fs.open(file_path)?;
		let base_dir = file_path.parent().unwrap_or(Path::new(""));

		self.parse_lines(
			io::BufReader::new(file),
			&file_path.display().to_string(),
			base_dir,
			ledger,
		)
	}

	/// Parses ledger content line by line. A blank line ends the current
	/// entry, as does the end of the input.
	pub fn parse_lines<R: BufRead>(
		&mut self,
		reader: R,
		name: &str,
		base_dir: &Path,
		ledger: &mut Ledger,
	) -> Result<(), Error> {
		for (i, line) in reader.lines().enumerate() {
			let at = |e: Error| anyhow!("{} ({}:{})", e, name, i + 1);

			// Chop comments out and remove all commas regardless of position
			let line = line?;
			let l = strip_comment(&line)
				.replace(',', "")
				.trim()
				.to_string();

			// If a line is blank, this entry is over (or we are not in one)
			if l.is_empty() {
				ledger.finish_entry().map_err(at)?;
				continue;
			}

			if let Some(include) = l.strip_prefix("include ") {
				ledger.finish_entry().map_err(at)?;
				let path = base_dir.join(include.trim());
				self.parse_file(&path, ledger)?;
				continue;
			}

			if let Some(directive) = l.strip_prefix('!') {
				ledger.finish_entry().map_err(at)?;
				self.parse_directive(directive, ledger).map_err(at)?;
				continue;
			}

			// Handle entry declaration lines with a date and description
			if let Some((date_str, desc)) = l.split_once(' ') {
				if let Ok(date) = parse_date(date_str.trim()) {
					ledger
						.new_entry(date, desc.trim().to_string(), self.entry_count)
						.map_err(at)?;
					self.entry_count += 1;
					continue;
				}
			}

			// Make sure the line is not a date by itself
			if parse_date(&l).is_ok() {
				bail!("Orphaned date ({}:{}): {}", name, i + 1, l);
			}

			self.parse_posting(&l, ledger).map_err(at)?;
		}

		// Make sure to finish the last entry if the input ends without an
		// empty line
		ledger
			.finish_entry()
			.map_err(|e| anyhow!("{} ({}:eof)", e, name))
	}

	/// Directives are dated lines starting with `!`. The only one that
	/// matters here declares a price: `!DATE rate BASE QUOTE RATE`.
	fn parse_directive(
		&self,
		directive: &str,
		ledger: &mut Ledger,
	) -> Result<(), Error> {
		let parts: Vec<&str> = directive.split_whitespace().collect();

		match parts.as_slice() {
			[date, "rate", base, quote, rate] => ledger.prices.add_rate(
				parse_date(date)?,
				base,
				quote,
				parse_decimal(rate)?,
				ObservationType::Declared,
			),
			_ => bail!("Invalid directive: !{}", directive),
		}
	}

	/// Posting lines have different numbers of terms; with the regex we split
	/// all by whitespace except terms surrounded by quotations, which are for
	/// lot naming.
	fn parse_posting(&self, line: &str, ledger: &mut Ledger) -> Result<(), Error> {
		let parts = self.split_terms(line);

		if parts.len() == 1 {
			return ledger.set_elided_posting(parts[0].clone());
		}

		if parts.len() < 3 {
			bail!("Invalid format: {}", line);
		}

		let account = parts[0].to_string();
		let units = Amount::new(parse_decimal(&parts[1])?, &parts[2]);

		match parts.len() {
			3 => ledger.add_posting(account, units, None, None),
			6 => {
				// inline price, i.e. `@ 20.00 USD` or `@@ 40.00 USD`
				let is_total = match parts[3].as_str() {
					"@" => false,
					"@@" => true,
					_ => bail!("Invalid format: {}", line),
				};

				let mut price = parse_decimal(&parts[4])?;
				if is_total {
					if units.value.is_zero() {
						bail!("Total price on zero units: {}", line);
					}
					price = price
						.checked_div(units.value)
						.ok_or_else(|| anyhow!("Total price out of range: {}", line))?
						.abs();
				}

				let price = Amount::new(price, &parts[5]);
				ledger.add_posting(account, units, Some(price), None)
			},
			7 | 8 => {
				// lot held at cost, i.e. `{ 20.00 USD }` or `{ 20.00 USD "a" }`
				if parts[3] != "{" || parts[parts.len() - 1] != "}" {
					bail!("Invalid format: {}", line);
				}

				let per_unit = Amount::new(parse_decimal(&parts[4])?, &parts[5]);
				let label = if parts.len() == 8 {
					Some(parts[6].to_string())
				} else {
					None
				};

				ledger.add_posting(account, units, None, Some(Cost::new(per_unit, label)))
			},
			_ => bail!("Invalid format: {}", line),
		}
	}

	fn split_terms(&self, input: &str) -> Vec<String> {
		self.detail_regex
			.captures_iter(input)
			.map(|cap| {
				// Capture either the quoted group or the unquoted group
				cap.get(1).map_or_else(
					move || cap[2].to_string(),
					|m| m.as_str().to_string(),
				)
			})
			.collect()
	}
}

/// The line up to the first `#` that is not inside a quoted lot label.
fn strip_comment(line: &str) -> &str {
	let mut quoted = false;
	for (i, c) in line.char_indices() {
		match c {
			'"' => quoted = !quoted,
			'#' if !quoted => return &line[..i],
			_ => {},
		}
	}
	line
}
