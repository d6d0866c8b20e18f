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
use crate::util::amount::{checked_add, checked_mul, Amount, Cost};
use anyhow::{bail, Error};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Weights within this distance of zero are considered balanced.
fn balance_tolerance() -> Decimal {
	Decimal::new(5, 3)
}

/// One leg of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
	pub account: String,
	pub units: Amount,

	/// Lot the units are held at, if any
	pub cost: Option<Cost>,

	/// Per-unit price the units were exchanged at, if any
	pub price: Option<Amount>,
}

impl Posting {
	pub fn new(account: &str, units: Amount) -> Self {
		Self {
			account: account.to_string(),
			units,
			cost: None,
			price: None,
		}
	}

	pub fn with_cost(mut self, cost: Cost) -> Self {
		self.cost = Some(cost);
		self
	}

	pub fn with_price(mut self, price: Amount) -> Self {
		self.price = Some(price);
		self
	}

	/// The amount this posting contributes towards balancing its
	/// transaction. A price takes precedence over a cost.
	pub fn weight(&self) -> Result<Amount, Error> {
		if let Some(price) = &self.price {
			return Ok(Amount::new(
				checked_mul(self.units.value, price.value)?,
				&price.currency,
			));
		}
		if let Some(cost) = &self.cost {
			return Ok(Amount::new(
				checked_mul(self.units.value, cost.per_unit.value)?,
				&cost.per_unit.currency,
			));
		}
		Ok(self.units.clone())
	}
}

impl fmt::Display for Posting {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.account, self.units)?;
		if let Some(cost) = &self.cost {
			write!(f, " {}", cost)?;
		}
		if let Some(price) = &self.price {
			write!(f, " @ {}", price)?;
		}
		Ok(())
	}
}

#[derive(Clone, Debug, Eq)]
pub struct Transaction {
	date: NaiveDate,

	/// The position in the ledger of this, relative to other transactions.
	/// Breaks ties between transactions on the same date.
	index: usize,

	desc: String,
	postings: Vec<Posting>,

	/// Account of the one posting written without an amount, if any
	elided_account: Option<String>,
}

impl Transaction {
	pub fn new(date: NaiveDate, desc: String, index: usize) -> Self {
		Self {
			date,
			index,
			desc,
			postings: vec![],
			elided_account: None,
		}
	}

	pub fn add_posting(&mut self, posting: Posting) -> Result<(), Error> {
		if posting.account.is_empty() {
			bail!("Account is empty")
		}

		self.postings.push(posting);
		Ok(())
	}

	pub fn set_elided_posting(&mut self, account: String) -> Result<(), Error> {
		if self.elided_account.is_some() {
			bail!("Only one line per entry may omit amount and currency")
		}

		if account.is_empty() {
			bail!("Account is empty")
		}

		self.elided_account = Some(account);
		Ok(())
	}

	pub fn date(&self) -> &NaiveDate {
		&self.date
	}

	pub fn desc(&self) -> &str {
		&self.desc
	}

	pub fn postings(&self) -> &[Posting] {
		&self.postings
	}

	/// Net weight by currency across all postings.
	fn imbalances(&self) -> Result<BTreeMap<String, Decimal>, Error> {
		let mut net = BTreeMap::new();
		for posting in &self.postings {
			let weight = posting.weight()?;
			let value = net.entry(weight.currency).or_insert(Decimal::ZERO);
			*value = checked_add(*value, weight.value)?;
		}
		net.retain(|_, value| !value.is_zero());
		Ok(net)
	}

	/// Completes the transaction. The elided posting, if any, absorbs every
	/// imbalance, one posting per currency. Otherwise any imbalance beyond
	/// tolerance fails the transaction.
	pub fn finalize(&mut self) -> Result<(), Error> {
		if self.postings.is_empty() && self.elided_account.is_none() {
			bail!("Empty entry")
		}

		let imbalances = self.imbalances()?;

		match self.elided_account.take() {
			Some(account) => {
				for (currency, value) in imbalances {
					self.postings
						.push(Posting::new(&account, Amount::new(-value, &currency)));
				}
			},
			None => {
				if let Some((currency, value)) = imbalances
					.iter()
					.find(|(_, value)| value.abs() > balance_tolerance())
				{
					bail!(
						"Unbalanced entry ({} {}): off by {} {}",
						self.date,
						self.desc,
						value,
						currency
					)
				}
			},
		}

		Ok(())
	}
}

impl PartialEq for Transaction {
	fn eq(&self, other: &Self) -> bool {
		self.index == other.index && self.date == other.date
	}
}

impl PartialOrd for Transaction {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Transaction {
	fn cmp(&self, other: &Self) -> Ordering {
		self.date
			.cmp(&other.date)
			.then_with(|| self.index.cmp(&other.index))
	}
}

/// Renders in the same format the ledger is read in.
impl fmt::Display for Transaction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.desc)?;
		for posting in &self.postings {
			write!(f, "\n\t{}", posting)?;
		}
		Ok(())
	}
}
