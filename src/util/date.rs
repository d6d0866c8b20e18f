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

use anyhow::{anyhow, bail, Error};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parses a string in the "YYYY-mm-dd" format.
pub fn parse_date(date_str: &str) -> Result<NaiveDate, Error> {
	if date_str.split('-').count() != 3 {
		bail!("Date format must be YYYY-MM-DD");
	}

	NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
		.map_err(|_| anyhow!("Invalid date: {}", date_str))
}

pub fn today() -> NaiveDate {
	Local::now().date_naive()
}

/// A calendar month, the time bucket for all monthly aggregation. Orders by
/// year, then month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
	year: i32,
	month: u32,
}

impl Month {
	pub fn new(year: i32, month: u32) -> Result<Self, Error> {
		if !(1..=12).contains(&month) {
			bail!("Invalid month: {}", month);
		}
		Ok(Self { year, month })
	}

	pub fn of(date: &NaiveDate) -> Self {
		Self {
			year: date.year(),
			month: date.month(),
		}
	}

	pub fn year(&self) -> i32 {
		self.year
	}

	pub fn month(&self) -> u32 {
		self.month
	}

	/// Valuation date for everything booked in this month.
	pub fn first_day(&self) -> NaiveDate {
		// year and month are valid by construction
		NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
	}

	pub fn next(&self) -> Self {
		if self.month == 12 {
			Self {
				year: self.year + 1,
				month: 1,
			}
		} else {
			Self {
				year: self.year,
				month: self.month + 1,
			}
		}
	}

	/// Every month from this one through `last`, inclusive. Empty if `last`
	/// precedes this.
	pub fn through(&self, last: &Month) -> Vec<Month> {
		let mut months = vec![];
		let mut current = *self;
		while current <= *last {
			months.push(current);
			current = current.next();
		}
		months
	}

	/// Three letter month name, used for chart axes.
	pub fn short_name(&self) -> &'static str {
		const NAMES: [&str; 12] = [
			"Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep",
			"Oct", "Nov", "Dec",
		];
		NAMES[(self.month - 1) as usize]
	}
}

/// Parses a "YYYY-MM" label.
impl FromStr for Month {
	type Err = Error;

	fn from_str(label: &str) -> Result<Self, Error> {
		let (year, month) = label
			.split_once('-')
			.ok_or_else(|| anyhow!("Month format must be YYYY-MM"))?;
		Month::new(year.parse()?, month.parse()?)
	}
}

impl fmt::Display for Month {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}", self.year, self.month)
	}
}

impl Serialize for Month {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}
