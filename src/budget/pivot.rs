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
use crate::budget::balance::BalanceAccumulator;
use crate::budget::classifier::AccountClassifier;
use crate::budget::reducer::CurrencyReducer;
use crate::gl::account::AccountType;
use crate::gl::transaction::Transaction;
use crate::util::date::Month;
use anyhow::Error;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Dense month by account table of one pass. Rows are sorted by account and
/// every row has exactly one cell per month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PivotTable {
	months: Vec<Month>,
	rows: Vec<PivotRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PivotRow {
	pub account: String,
	/// One per month; None where the account saw no activity
	pub cells: Vec<Option<Decimal>>,
}

impl PivotTable {
	pub fn months(&self) -> &[Month] {
		&self.months
	}

	pub fn rows(&self) -> &[PivotRow] {
		&self.rows
	}

	/// `account` followed by a "YYYY-MM" label per month.
	pub fn header(&self) -> Vec<String> {
		std::iter::once("account".to_string())
			.chain(self.months.iter().map(|m| m.to_string()))
			.collect()
	}

	/// Rows as they are rendered: account name, then each cell as a decimal
	/// string or empty.
	pub fn string_rows(&self) -> Vec<Vec<String>> {
		self.rows
			.iter()
			.map(|row| {
				std::iter::once(row.account.clone())
					.chain(row.cells.iter().map(|c| match c {
						Some(value) => value.to_string(),
						None => String::new(),
					}))
					.collect()
			})
			.collect()
	}
}

/// Runs one classify, accumulate, reduce and pivot pass over transactions.
pub struct MonthlyPivotEngine<'a> {
	classifier: &'a AccountClassifier,
	reducer: &'a CurrencyReducer<'a>,
}

impl<'a> MonthlyPivotEngine<'a> {
	pub fn new(
		classifier: &'a AccountClassifier,
		reducer: &'a CurrencyReducer<'a>,
	) -> Self {
		Self {
			classifier,
			reducer,
		}
	}

	/// Builds the table for postings of the given account type. Each cell is
	/// valued as of the first day of its month. Columns cover the month of
	/// every transaction given, whether or not it had matching postings, so
	/// passes over the same transactions line up.
	pub fn pivot(
		&self,
		transactions: &[Transaction],
		account_type: AccountType,
	) -> Result<PivotTable, Error> {
		let mut accumulator = BalanceAccumulator::new();
		let mut all_months = BTreeSet::new();

		for txn in transactions {
			let month = Month::of(txn.date());
			all_months.insert(month);

			for posting in txn.postings() {
				if let Some(account) = self.classifier.classify(posting, account_type)
				{
					accumulator.add(account, month, posting)?;
				}
			}
		}

		// account -> month -> reduced total
		let mut totals: BTreeMap<&String, BTreeMap<Month, Decimal>> =
			BTreeMap::new();
		for (account, month, balance) in accumulator.cells() {
			let reduced = self.reducer.reduce(balance, &month.first_day())?;
			let row = totals.entry(account).or_default();
			if let Some(total) = reduced {
				row.insert(*month, total);
			}
		}

		let months: Vec<Month> = all_months.into_iter().collect();
		let rows: Vec<PivotRow> = totals
			.into_iter()
			.map(|(account, by_month)| PivotRow {
				account: account.clone(),
				cells: months.iter().map(|m| by_month.get(m).copied()).collect(),
			})
			.collect();

		debug!(
			"{} pivot: {} accounts over {} months ({} cells) in {}",
			account_type,
			rows.len(),
			months.len(),
			accumulator.len(),
			self.reducer.currency()
		);

		Ok(PivotTable { months, rows })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::budget::classifier::AccountRemap;
	use crate::config::config_file::Mapping;
	use crate::gl::observed_rate::ObservationType;
	use crate::gl::price_map::PriceMap;
	use crate::gl::transaction::Posting;
	use crate::util::amount::Amount;
	use chrono::NaiveDate;
	use std::str::FromStr;

	fn txn(date: &str, postings: &[(&str, &str, &str)]) -> Transaction {
		let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
		let mut txn = Transaction::new(date, "test".into(), 0);
		for (account, value, currency) in postings {
			txn.add_posting(Posting::new(
				account,
				Amount::new(Decimal::from_str(value).unwrap(), currency),
			))
			.unwrap();
		}
		txn
	}

	fn run(
		transactions: &[Transaction],
		account_type: AccountType,
		mappings: &[Mapping],
		prices: &PriceMap,
	) -> Result<PivotTable, Error> {
		let classifier =
			AccountClassifier::new(AccountRemap::new(mappings).unwrap(), "USD");
		let reducer = CurrencyReducer::new(prices, "USD", 2);
		MonthlyPivotEngine::new(&classifier, &reducer).pivot(transactions, account_type)
	}

	fn food_transactions() -> Vec<Transaction> {
		vec![
			txn(
				"2023-01-15",
				&[("Expenses:Food", "-10.00", "USD"), ("Assets:Cash", "10.00", "USD")],
			),
			txn(
				"2023-02-15",
				&[("Expenses:Food", "-10.00", "USD"), ("Assets:Cash", "10.00", "USD")],
			),
		]
	}

	#[test]
	fn test_monthly_expense_scenario() {
		let table = run(
			&food_transactions(),
			AccountType::Expenses,
			&[],
			&PriceMap::new(),
		)
		.unwrap();

		assert_eq!(table.header(), vec!["account", "2023-01", "2023-02"]);
		assert_eq!(
			table.string_rows(),
			vec![vec!["Expenses:Food", "-10.00", "-10.00"]]
		);
	}

	#[test]
	fn test_rows_sorted_and_dense() {
		let transactions = vec![
			txn(
				"2023-03-02",
				&[("Expenses:Rent", "900", "USD"), ("Assets:Cash", "-900", "USD")],
			),
			txn(
				"2023-01-10",
				&[("Expenses:Food", "12.5", "USD"), ("Assets:Cash", "-12.5", "USD")],
			),
			txn(
				"2023-02-10",
				&[("Income:Salary", "-1000", "USD"), ("Assets:Cash", "1000", "USD")],
			),
		];
		let table =
			run(&transactions, AccountType::Expenses, &[], &PriceMap::new()).unwrap();

		assert_eq!(
			table.header(),
			vec!["account", "2023-01", "2023-02", "2023-03"]
		);
		assert_eq!(
			table.string_rows(),
			vec![
				vec!["Expenses:Food", "12.50", "", ""],
				vec!["Expenses:Rent", "", "", "900.00"],
			]
		);
		for row in table.string_rows() {
			assert_eq!(row.len(), table.header().len());
		}
	}

	#[test]
	fn test_income_pass() {
		let transactions = vec![txn(
			"2023-02-10",
			&[
				("Income:Salary", "-1000", "USD"),
				("Income:Bonus", "-250.505", "USD"),
				("Assets:Cash", "1250.505", "USD"),
			],
		)];
		let table =
			run(&transactions, AccountType::Income, &[], &PriceMap::new()).unwrap();

		assert_eq!(
			table.string_rows(),
			vec![
				vec!["Income:Bonus", "-250.50"],
				vec!["Income:Salary", "-1000.00"],
			]
		);
	}

	#[test]
	fn test_non_reporting_currency_yields_empty_cell() {
		let mut transactions = food_transactions();
		transactions.push(txn(
			"2023-03-05",
			&[("Expenses:Food", "8.00", "EUR"), ("Assets:Euro", "-8.00", "EUR")],
		));
		let table =
			run(&transactions, AccountType::Expenses, &[], &PriceMap::new()).unwrap();

		assert_eq!(
			table.string_rows(),
			vec![vec!["Expenses:Food", "-10.00", "-10.00", ""]]
		);
	}

	#[test]
	fn test_non_reporting_currency_never_contributes() {
		let base = food_transactions();
		let mut with_euros = base.clone();
		with_euros.push(txn(
			"2023-01-20",
			&[("Expenses:Food", "99.00", "EUR"), ("Assets:Euro", "-99.00", "EUR")],
		));

		// even with a known rate, the posting is excluded before valuation
		let mut prices = PriceMap::new();
		prices
			.add_rate(
				NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
				"EUR",
				"USD",
				Decimal::from(2),
				ObservationType::Declared,
			)
			.unwrap();

		let a = run(&base, AccountType::Expenses, &[], &prices).unwrap();
		let b = run(&with_euros, AccountType::Expenses, &[], &prices).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn test_remapped_into_destination_row() {
		let transactions = vec![txn(
			"2023-01-10",
			&[
				("Expenses:Online:Apps", "3", "USD"),
				("Expenses:Online:Media", "4", "USD"),
				("Assets:Cash", "-7", "USD"),
			],
		)];
		let mappings = vec![
			Mapping {
				source: "Expenses:Online:Apps".into(),
				dest: "Expenses:Subscriptions".into(),
			},
			Mapping {
				source: "Expenses:Online".into(),
				dest: "Expenses:Online".into(),
			},
		];
		let table =
			run(&transactions, AccountType::Expenses, &mappings, &PriceMap::new())
				.unwrap();

		assert_eq!(
			table.string_rows(),
			vec![
				vec!["Expenses:Online", "4.00"],
				vec!["Expenses:Subscriptions", "3.00"],
			]
		);
	}

	#[test]
	fn test_idempotent_and_order_independent() {
		let transactions = food_transactions();
		let mut reversed = transactions.clone();
		reversed.reverse();

		let prices = PriceMap::new();
		let a = run(&transactions, AccountType::Expenses, &[], &prices).unwrap();
		let b = run(&transactions, AccountType::Expenses, &[], &prices).unwrap();
		let c = run(&reversed, AccountType::Expenses, &[], &prices).unwrap();
		assert_eq!(a, b);
		assert_eq!(a.string_rows(), c.string_rows());
		assert_eq!(a.header(), c.header());
	}

	#[test]
	fn test_netting_to_zero_is_empty() {
		let transactions = vec![
			txn(
				"2023-01-10",
				&[("Expenses:Food", "5", "USD"), ("Assets:Cash", "-5", "USD")],
			),
			txn(
				"2023-01-11",
				&[("Expenses:Food", "-5", "USD"), ("Assets:Cash", "5", "USD")],
			),
		];
		let table =
			run(&transactions, AccountType::Expenses, &[], &PriceMap::new()).unwrap();
		assert_eq!(table.string_rows(), vec![vec!["Expenses:Food", ""]]);
	}

	#[test]
	fn test_empty_input() {
		let table = run(&[], AccountType::Expenses, &[], &PriceMap::new()).unwrap();
		assert_eq!(table.header(), vec!["account"]);
		assert!(table.rows().is_empty());
	}

	#[test]
	fn test_transaction_without_postings_is_noop() {
		let mut transactions = food_transactions();
		transactions.push(txn("2023-01-20", &[]));
		let table =
			run(&transactions, AccountType::Expenses, &[], &PriceMap::new()).unwrap();
		assert_eq!(
			table.string_rows(),
			vec![vec!["Expenses:Food", "-10.00", "-10.00"]]
		);
	}
}
