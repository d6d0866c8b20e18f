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

use crate::gl::account::AccountType;
use crate::gl::observed_rate::ObservationType;
use crate::gl::price_map::PriceMap;
use crate::gl::transaction::{Posting, Transaction};
use crate::util::amount::{Amount, Cost};
use anyhow::{bail, Error};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Takes input from the parser and assembles it into transactions, while
/// collecting every price the ledger states or implies along the way.
///
/// Prices are collected over the whole file regardless of any later date
/// filtering, so valuation always has the full history available.
#[derive(Debug, Default)]
pub struct Ledger {
	transactions: Vec<Transaction>,
	/// Transaction currently being assembled, if any
	pending: Option<Transaction>,

	pub prices: PriceMap,
}

impl Ledger {
	pub fn new() -> Self {
		Default::default()
	}

	// -----------
	// -- INPUT --
	// -----------

	pub fn new_entry(
		&mut self,
		date: NaiveDate,
		desc: String,
		index: usize,
	) -> Result<(), Error> {
		if self.pending.is_some() {
			self.finish_entry()?;
		}

		self.pending = Some(Transaction::new(date, desc, index));
		Ok(())
	}

	/// Adds a posting to the pending transaction. A per-unit price or a lot
	/// purchase each imply a rate between the units and the price currency
	/// on the transaction's date.
	pub fn add_posting(
		&mut self,
		account: String,
		units: Amount,
		price: Option<Amount>,
		cost: Option<Cost>,
	) -> Result<(), Error> {
		AccountType::of(&account)?;

		let pending = match self.pending.as_mut() {
			Some(p) => p,
			None => bail!("Orphaned entry detail"),
		};
		let date = *pending.date();

		if let Some(price) = &price {
			self.prices.add_rate(
				date,
				&units.currency,
				&price.currency,
				price.value,
				ObservationType::Implied,
			)?;
		}

		// The purchase of a lot implies a rate on that date at its cost
		// basis. The sale of a lot does not.
		if let Some(cost) = &cost {
			if units.value > Decimal::ZERO && price.is_none() {
				self.prices.add_rate(
					date,
					&units.currency,
					&cost.per_unit.currency,
					cost.per_unit.value,
					ObservationType::Implied,
				)?;
			}
		}

		let mut posting = Posting::new(&account, units);
		if let Some(price) = price {
			posting = posting.with_price(price);
		}
		if let Some(cost) = cost {
			posting = posting.with_cost(cost);
		}
		pending.add_posting(posting)
	}

	/// Names the account of the posting with no amount, which balances the
	/// pending transaction.
	pub fn set_elided_posting(&mut self, account: String) -> Result<(), Error> {
		AccountType::of(&account)?;

		match self.pending.as_mut() {
			Some(p) => p.set_elided_posting(account),
			None => bail!("Orphaned entry detail"),
		}
	}

	/// Takes the pending transaction, balances it, and adds it to the set of
	/// transactions on this. No-ops if nothing is pending.
	pub fn finish_entry(&mut self) -> Result<(), Error> {
		match self.pending.take() {
			None => Ok(()),
			Some(mut txn) => {
				txn.finalize()?;
				self.transactions.push(txn);
				Ok(())
			},
		}
	}

	// ----------------
	// -- TABULATING --
	// ----------------

	/// Orders transactions by date, then by appearance in the ledger.
	pub fn finalize(&mut self) -> Result<(), Error> {
		self.finish_entry()?;
		self.transactions.sort();
		Ok(())
	}

	pub fn transactions(&self) -> &[Transaction] {
		&self.transactions
	}

	/// Date of the earliest transaction, if there are any.
	pub fn earliest_date(&self) -> Option<NaiveDate> {
		self.transactions.iter().map(|t| *t.date()).min()
	}
}
