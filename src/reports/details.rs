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

pub const DETAILS_FILE: &str = "transactions.ledger";

/// The transactions that fed the report, written back out in ledger format
/// for inspection.
pub fn render_details(
	transactions: &[Transaction],
	start_date: &NaiveDate,
	end_date: &NaiveDate,
) -> String {
	let mut out = format!(
		"# {} budget transactions from {} through {}\n",
		transactions.len(),
		start_date,
		end_date
	);
	for txn in transactions {
		out.push_str(&format!("\n{}\n", txn));
	}
	out
}
