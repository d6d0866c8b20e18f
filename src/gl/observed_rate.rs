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
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A price of one currency in terms of another, observed on a specific date.
/// A value object not intended to have much functionality.
#[derive(Clone, Debug)]
pub struct ObservedRate {
	pub rate: Decimal,
	pub date: NaiveDate,
	pub observation_type: ObservationType,
}

impl ObservedRate {
	pub fn new(
		rate: Decimal,
		date: NaiveDate,
		observation_type: ObservationType,
	) -> Self {
		Self {
			rate,
			date,
			observation_type,
		}
	}
}

/// The nature of an observation of an exchange rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationType {
	/// The user told us this rate in the abstract, so it is gospel
	Declared,
	/// A posting was exchanged or bought at this rate
	Implied,
}
