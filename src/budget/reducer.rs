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
use crate::budget::balance::Balance;
use crate::gl::price_map::PriceSource;
use crate::util::amount::quantize;
use anyhow::{bail, Error};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::error;

/// Collapses a balance into a single number in the reporting currency.
pub struct CurrencyReducer<'a> {
	prices: &'a dyn PriceSource,
	currency: String,
	precision: u32,
}

impl<'a> CurrencyReducer<'a> {
	pub fn new(prices: &'a dyn PriceSource, currency: &str, precision: u32) -> Self {
		Self {
			prices,
			currency: currency.to_string(),
			precision,
		}
	}

	/// Values every position as of the date, converts the values into the
	/// reporting currency, and returns the single remaining quantity rounded
	/// to the configured precision. An empty balance reduces to None.
	///
	/// Anything left in more than one currency means a price is missing, and
	/// fails the reduction rather than dropping a currency.
	pub fn reduce(
		&self,
		balance: &Balance,
		as_of: &NaiveDate,
	) -> Result<Option<Decimal>, Error> {
		let valued = balance.reduce(|p| self.prices.value_of(p, as_of))?;
		let converted = valued
			.reduce(|p| self.prices.convert(&p.units, &self.currency, as_of))?;

		if converted.len() > 1 {
			error!(
				"unreconciled balance {} as of {} (from {})",
				converted, as_of, balance
			);
			bail!(
				"Unreconciled balance as of {}: {} cannot be reduced to {}",
				as_of,
				converted,
				self.currency
			);
		}

		converted
			.only_position()?
			.map(|p| quantize(p.units.value, self.precision))
			.transpose()
	}

	pub fn currency(&self) -> &str {
		&self.currency
	}
}
