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

use crate::gl::observed_rate::{ObservationType, ObservedRate};
use crate::util::amount::{checked_mul, Amount, Position};
use anyhow::{bail, Error};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Point-in-time valuation of amounts. Implementations must tolerate any
/// number of queries in any order.
pub trait PriceSource {
	/// Market value of a position as of a date. Positions held at cost are
	/// valued in their cost currency when a price is known; everything else
	/// is reported as its units.
	fn value_of(
		&self,
		position: &Position,
		as_of: &NaiveDate,
	) -> Result<Amount, Error>;

	/// Converts the amount into the given currency as of a date, or returns
	/// it unchanged if no rate is known.
	fn convert(
		&self,
		amount: &Amount,
		currency: &str,
		as_of: &NaiveDate,
	) -> Result<Amount, Error>;
}

/// Price history for every currency pair observed in the ledger.
#[derive(Debug, Default)]
pub struct PriceMap {
	/// (base, quote) -> observations ascending by date, at most one per date.
	/// Rates are quote units per base unit; both directions are stored.
	rates: BTreeMap<(String, String), Vec<ObservedRate>>,
}

impl PriceMap {
	pub fn new() -> Self {
		Default::default()
	}

	/// Adds a rate in base-quote semantics, along with its inverse.
	pub fn add_rate(
		&mut self,
		date: NaiveDate,
		base: &str,
		quote: &str,
		rate: Decimal,
		observation_type: ObservationType,
	) -> Result<(), Error> {
		if base == quote {
			bail!("Cannot exchange a currency for itself")
		}

		// Zero rates carry no information and have no inverse
		if rate.is_zero() {
			return Ok(());
		}

		self.observe(base, quote, ObservedRate::new(rate, date, observation_type))?;

		if let Some(inverse) = Decimal::ONE.checked_div(rate) {
			self.observe(
				quote,
				base,
				ObservedRate::new(inverse, date, observation_type),
			)?;
		}

		Ok(())
	}

	fn observe(
		&mut self,
		base: &str,
		quote: &str,
		observation: ObservedRate,
	) -> Result<(), Error> {
		let history = self
			.rates
			.entry((base.to_string(), quote.to_string()))
			.or_default();

		let idx = history.partition_point(|o| o.date < observation.date);
		match history.get_mut(idx) {
			Some(existing) if existing.date == observation.date => {
				match (existing.observation_type, observation.observation_type) {
					(ObservationType::Declared, ObservationType::Declared) => {
						bail!(
							"Cannot declare multiple rates on same date ({} {}/{})",
							observation.date,
							base,
							quote
						)
					},
					// declarations outrank anything implied by postings
					(ObservationType::Declared, ObservationType::Implied) => {},
					(ObservationType::Implied, _) => *existing = observation,
				}
			},
			_ => history.insert(idx, observation),
		}

		Ok(())
	}

	/// Retrieves the most recent rate, if any, at or before the given date.
	pub fn rate_as_of(
		&self,
		base: &str,
		quote: &str,
		as_of: &NaiveDate,
	) -> Option<Decimal> {
		if base == quote {
			return Some(Decimal::ONE);
		}

		let history = self.rates.get(&(base.to_string(), quote.to_string()))?;
		let idx = history.partition_point(|o| o.date <= *as_of);
		idx.checked_sub(1).map(|i| history[i].rate)
	}

	pub fn is_empty(&self) -> bool {
		self.rates.is_empty()
	}
}

impl PriceSource for PriceMap {
	fn value_of(
		&self,
		position: &Position,
		as_of: &NaiveDate,
	) -> Result<Amount, Error> {
		let cost = match &position.cost {
			Some(cost) => cost,
			None => return Ok(position.units.clone()),
		};

		let cost_currency = &cost.per_unit.currency;
		match self.rate_as_of(&position.units.currency, cost_currency, as_of) {
			Some(rate) => Ok(Amount::new(
				checked_mul(position.units.value, rate)?,
				cost_currency,
			)),
			None => Ok(position.units.clone()),
		}
	}

	fn convert(
		&self,
		amount: &Amount,
		currency: &str,
		as_of: &NaiveDate,
	) -> Result<Amount, Error> {
		match self.rate_as_of(&amount.currency, currency, as_of) {
			Some(rate) => {
				Ok(Amount::new(checked_mul(amount.value, rate)?, currency))
			},
			None => Ok(amount.clone()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::util::amount::Cost;
	use std::str::FromStr;

	fn dec(s: &str) -> Decimal {
		Decimal::from_str(s).unwrap()
	}

	fn date(s: &str) -> NaiveDate {
		NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
	}

	fn price_map() -> PriceMap {
		let mut prices = PriceMap::new();
		prices
			.add_rate(
				date("2024-01-01"),
				"EUR",
				"USD",
				dec("1.10"),
				ObservationType::Declared,
			)
			.unwrap();
		prices
			.add_rate(
				date("2024-03-01"),
				"EUR",
				"USD",
				dec("1.25"),
				ObservationType::Declared,
			)
			.unwrap();
		prices
	}

	#[test]
	fn test_rate_as_of_uses_latest_prior() {
		let prices = price_map();
		assert_eq!(
			prices.rate_as_of("EUR", "USD", &date("2024-02-15")),
			Some(dec("1.10"))
		);
		assert_eq!(
			prices.rate_as_of("EUR", "USD", &date("2024-03-01")),
			Some(dec("1.25"))
		);
		assert_eq!(
			prices.rate_as_of("EUR", "USD", &date("2030-01-01")),
			Some(dec("1.25"))
		);
	}

	#[test]
	fn test_no_rate_before_first_observation() {
		let prices = price_map();
		assert_eq!(prices.rate_as_of("EUR", "USD", &date("2023-12-31")), None);
		assert_eq!(prices.rate_as_of("GBP", "USD", &date("2024-02-01")), None);
	}

	#[test]
	fn test_inverse_rate() {
		let prices = price_map();
		assert_eq!(
			prices.rate_as_of("USD", "EUR", &date("2024-03-02")),
			Some(Decimal::ONE / dec("1.25"))
		);
	}

	#[test]
	fn test_same_currency_rate() {
		let prices = PriceMap::new();
		assert_eq!(
			prices.rate_as_of("USD", "USD", &date("2024-03-02")),
			Some(Decimal::ONE)
		);
	}

	#[test]
	fn test_declare_self_exchange() {
		let mut prices = PriceMap::new();
		assert!(prices
			.add_rate(
				date("2024-01-01"),
				"USD",
				"USD",
				dec("1"),
				ObservationType::Declared
			)
			.is_err());
	}

	#[test]
	fn test_duplicate_declaration_fails() {
		let mut prices = price_map();
		assert!(prices
			.add_rate(
				date("2024-01-01"),
				"EUR",
				"USD",
				dec("1.11"),
				ObservationType::Declared
			)
			.is_err());
	}

	#[test]
	fn test_declared_outranks_implied() {
		let mut prices = price_map();
		prices
			.add_rate(
				date("2024-01-01"),
				"EUR",
				"USD",
				dec("1.50"),
				ObservationType::Implied,
			)
			.unwrap();
		assert_eq!(
			prices.rate_as_of("EUR", "USD", &date("2024-01-01")),
			Some(dec("1.10"))
		);
	}

	#[test]
	fn test_latest_implied_wins() {
		let mut prices = PriceMap::new();
		for rate in ["1.10", "1.20"] {
			prices
				.add_rate(
					date("2024-01-01"),
					"EUR",
					"USD",
					dec(rate),
					ObservationType::Implied,
				)
				.unwrap();
		}
		assert_eq!(
			prices.rate_as_of("EUR", "USD", &date("2024-01-01")),
			Some(dec("1.20"))
		);
	}

	#[test]
	fn test_zero_rate_ignored() {
		let mut prices = PriceMap::new();
		prices
			.add_rate(
				date("2024-01-01"),
				"EUR",
				"USD",
				Decimal::ZERO,
				ObservationType::Declared,
			)
			.unwrap();
		assert!(prices.is_empty());
	}

	#[test]
	fn test_value_of_position_at_cost() {
		let mut prices = PriceMap::new();
		prices
			.add_rate(
				date("2024-02-01"),
				"ACME",
				"USD",
				dec("60"),
				ObservationType::Declared,
			)
			.unwrap();

		let position = Position::new(
			Amount::new(dec("2"), "ACME"),
			Some(Cost::new(Amount::new(dec("50"), "USD"), None)),
		);
		assert_eq!(
			prices.value_of(&position, &date("2024-02-01")).unwrap(),
			Amount::new(dec("120"), "USD")
		);

		// no price yet, so the units stand
		assert_eq!(
			prices.value_of(&position, &date("2024-01-01")).unwrap(),
			Amount::new(dec("2"), "ACME")
		);
	}

	#[test]
	fn test_value_of_position_without_cost() {
		let prices = price_map();
		let position = Position::new(Amount::new(dec("5"), "EUR"), None);
		assert_eq!(
			prices.value_of(&position, &date("2024-02-01")).unwrap(),
			Amount::new(dec("5"), "EUR")
		);
	}

	#[test]
	fn test_convert() {
		let prices = price_map();
		let eur = Amount::new(dec("10"), "EUR");
		assert_eq!(
			prices.convert(&eur, "USD", &date("2024-02-01")).unwrap(),
			Amount::new(dec("11.00"), "USD")
		);
		assert_eq!(prices.convert(&eur, "GBP", &date("2024-02-01")).unwrap(), eur);
		assert_eq!(prices.convert(&eur, "EUR", &date("2024-02-01")).unwrap(), eur);
	}

	#[test]
	fn test_convert_out_of_range() {
		let prices = price_map();
		let huge = Amount::new(Decimal::MAX, "EUR");
		assert!(prices.convert(&huge, "USD", &date("2024-02-01")).is_err());
	}
}
