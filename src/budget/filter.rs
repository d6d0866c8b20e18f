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
use crate::gl::transaction::Transaction;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Keeps transactions dated within [start, end], inclusive.
pub fn prune_date_range(
	transactions: &[Transaction],
	start: &NaiveDate,
	end: &NaiveDate,
) -> Vec<Transaction> {
	transactions
		.iter()
		.filter(|t| t.date() >= start && t.date() <= end)
		.cloned()
		.collect()
}

/// Keeps transactions with at least one posting to a budget account. Names
/// must match exactly.
pub fn prune_non_budget_transactions(
	transactions: Vec<Transaction>,
	budget_accounts: &[String],
) -> Vec<Transaction> {
	let accounts: HashSet<&str> =
		budget_accounts.iter().map(|a| a.as_str()).collect();

	transactions
		.into_iter()
		.filter(|t| {
			t.postings()
				.iter()
				.any(|p| accounts.contains(p.account.as_str()))
		})
		.collect()
}
