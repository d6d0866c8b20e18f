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
use crate::gl::transaction::Posting;
use crate::util::amount::{checked_add, Amount, Cost, Position};
use crate::util::date::Month;
use anyhow::{bail, Error};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Holdings in any number of currencies and lots. Positions are keyed by
/// currency and lot, so adding is commutative; positions that sum to zero
/// disappear.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balance {
	positions: BTreeMap<(String, Option<Cost>), Decimal>,
}

impl Balance {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn add_position(&mut self, position: &Position) -> Result<(), Error> {
		let key = (position.units.currency.clone(), position.cost.clone());
		let value = self.positions.entry(key.clone()).or_insert(Decimal::ZERO);
		*value = checked_add(*value, position.units.value)?;

		if value.is_zero() {
			self.positions.remove(&key);
		}
		Ok(())
	}

	pub fn add_amount(&mut self, amount: &Amount) -> Result<(), Error> {
		self.add_position(&Position::new(amount.clone(), None))
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	pub fn len(&self) -> usize {
		self.positions.len()
	}

	pub fn positions(&self) -> Vec<Position> {
		self.positions
			.iter()
			.map(|((currency, cost), value)| {
				Position::new(Amount::new(*value, currency), cost.clone())
			})
			.collect()
	}

	/// Maps every position to an amount and sums the results into a new
	/// balance without lots.
	pub fn reduce<F>(&self, f: F) -> Result<Balance, Error>
	where
		F: Fn(&Position) -> Result<Amount, Error>,
	{
		let mut reduced = Balance::new();
		for position in self.positions() {
			reduced.add_amount(&f(&position)?)?;
		}
		Ok(reduced)
	}

	/// The single position held, if any. Holding more than one is an error.
	pub fn only_position(&self) -> Result<Option<Position>, Error> {
		match self.len() {
			0 => Ok(None),
			1 => Ok(self.positions().pop()),
			_ => bail!("Balance holds more than one position: {}", self),
		}
	}
}

impl fmt::Display for Balance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let positions: Vec<String> =
			self.positions().iter().map(|p| p.to_string()).collect();
		write!(f, "({})", positions.join(", "))
	}
}

/// Balances for every (account, month) cell of one pass. Cells are created
/// empty on first use.
#[derive(Debug, Default)]
pub struct BalanceAccumulator {
	cells: BTreeMap<(String, Month), Balance>,
}

impl BalanceAccumulator {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn add(
		&mut self,
		account: String,
		month: Month,
		posting: &Posting,
	) -> Result<(), Error> {
		self.cells
			.entry((account, month))
			.or_default()
			.add_position(&Position::new(
				posting.units.clone(),
				posting.cost.clone(),
			))
	}

	/// Cells ordered by account, then month.
	pub fn cells(&self) -> impl Iterator<Item = (&String, &Month, &Balance)> {
		self.cells
			.iter()
			.map(|((account, month), balance)| (account, month, balance))
	}

	pub fn len(&self) -> usize {
		self.cells.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn amount(s: &str, currency: &str) -> Amount {
		Amount::new(Decimal::from_str(s).unwrap(), currency)
	}

	fn month(m: u32) -> Month {
		Month::new(2023, m).unwrap()
	}

	#[test]
	fn test_same_currency_sums() {
		let mut balance = Balance::new();
		balance.add_amount(&amount("10.00", "USD")).unwrap();
		balance.add_amount(&amount("2.50", "USD")).unwrap();
		assert_eq!(balance.len(), 1);
		assert_eq!(
			balance.only_position().unwrap().unwrap().units,
			amount("12.50", "USD")
		);
	}

	#[test]
	fn test_currencies_and_lots_kept_apart() {
		let mut balance = Balance::new();
		balance.add_amount(&amount("10", "USD")).unwrap();
		balance.add_amount(&amount("5", "EUR")).unwrap();
		balance.add_position(&Position::new(
			amount("1", "ACME"),
			Some(Cost::new(amount("50", "USD"), None)),
		))
		.unwrap();
		balance.add_position(&Position::new(
			amount("1", "ACME"),
			Some(Cost::new(amount("60", "USD"), None)),
		))
		.unwrap();
		assert_eq!(balance.len(), 4);
		assert!(balance.only_position().is_err());
	}

	#[test]
	fn test_zero_positions_disappear() {
		let mut balance = Balance::new();
		balance.add_amount(&amount("10", "USD")).unwrap();
		balance.add_amount(&amount("-10", "USD")).unwrap();
		assert!(balance.is_empty());
		assert_eq!(balance.only_position().unwrap(), None);
	}

	#[test]
	fn test_reduce_merges_currencies() {
		let mut balance = Balance::new();
		balance.add_amount(&amount("10", "USD")).unwrap();
		balance.add_amount(&amount("5", "EUR")).unwrap();

		let reduced = balance
			.reduce(|p| {
				Ok(if p.units.currency == "EUR" {
					Amount::new(p.units.value * Decimal::from(2), "USD")
				} else {
					p.units.clone()
				})
			})
			.unwrap();
		assert_eq!(
			reduced.only_position().unwrap().unwrap().units,
			amount("20", "USD")
		);
	}

	#[test]
	fn test_overflow_is_an_error() {
		let mut balance = Balance::new();
		balance.add_amount(&Amount::new(Decimal::MAX, "USD")).unwrap();
		assert!(balance.add_amount(&amount("1", "USD")).is_err());
	}

	#[test]
	fn test_display() {
		let mut balance = Balance::new();
		balance.add_amount(&amount("10", "USD")).unwrap();
		balance.add_amount(&amount("5", "EUR")).unwrap();
		assert_eq!(balance.to_string(), "(5 EUR, 10 USD)");
	}

	#[test]
	fn test_accumulation_order_independent() {
		let postings = vec![
			Posting::new("Expenses:Food", amount("1.10", "USD")),
			Posting::new("Expenses:Food", amount("2.20", "USD")),
			Posting::new("Expenses:Food", amount("-0.30", "USD")),
		];

		let mut forward = BalanceAccumulator::new();
		for p in &postings {
			forward.add(p.account.clone(), month(1), p).unwrap();
		}
		let mut backward = BalanceAccumulator::new();
		for p in postings.iter().rev() {
			backward.add(p.account.clone(), month(1), p).unwrap();
		}

		let f: Vec<_> = forward.cells().map(|(_, _, b)| b.clone()).collect();
		let b: Vec<_> = backward.cells().map(|(_, _, b)| b.clone()).collect();
		assert_eq!(f, b);
	}

	#[test]
	fn test_cells_ordered_by_account_then_month() {
		let mut acc = BalanceAccumulator::new();
		let p = Posting::new("x", amount("1", "USD"));
		acc.add("Expenses:B".into(), month(1), &p).unwrap();
		acc.add("Expenses:A".into(), month(2), &p).unwrap();
		acc.add("Expenses:A".into(), month(1), &p).unwrap();

		let keys: Vec<(String, String)> = acc
			.cells()
			.map(|(a, m, _)| (a.clone(), m.to_string()))
			.collect();
		assert_eq!(
			keys,
			vec![
				("Expenses:A".to_string(), "2023-01".to_string()),
				("Expenses:A".to_string(), "2023-02".to_string()),
				("Expenses:B".to_string(), "2023-01".to_string()),
			]
		);
		assert_eq!(acc.len(), 3);
	}
}
