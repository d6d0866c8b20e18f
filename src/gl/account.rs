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
use anyhow::{bail, Error};
use std::fmt;

/// The only valid top-level account names. The top-level segment of an
/// account is also what determines its type.
pub const VALID_PREFIXES: [&str; 5] =
	["Assets", "Liabilities", "Equity", "Income", "Expenses"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountType {
	Assets,
	Liabilities,
	Equity,
	Income,
	Expenses,
}

impl AccountType {
	/// Determines the type of an account from its top-level segment.
	pub fn of(account: &str) -> Result<Self, Error> {
		let root = account.split(':').next().unwrap_or_default();
		Ok(match root {
			"Assets" => AccountType::Assets,
			"Liabilities" => AccountType::Liabilities,
			"Equity" => AccountType::Equity,
			"Income" => AccountType::Income,
			"Expenses" => AccountType::Expenses,
			_ => bail!("Invalid account prefix: {}", account),
		})
	}

	/// Like `of`, for names already validated on the way into the ledger.
	pub fn matches(&self, account: &str) -> bool {
		AccountType::of(account).is_ok_and(|t| t == *self)
	}
}

impl fmt::Display for AccountType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			AccountType::Assets => VALID_PREFIXES[0],
			AccountType::Liabilities => VALID_PREFIXES[1],
			AccountType::Equity => VALID_PREFIXES[2],
			AccountType::Income => VALID_PREFIXES[3],
			AccountType::Expenses => VALID_PREFIXES[4],
		};
		write!(f, "{}", name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_account_type_from_root() {
		assert_eq!(AccountType::of("Income:Salary").unwrap(), AccountType::Income);
		assert_eq!(
			AccountType::of("Expenses:Food:Groceries").unwrap(),
			AccountType::Expenses
		);
		assert_eq!(AccountType::of("Assets").unwrap(), AccountType::Assets);
	}

	#[test]
	fn test_invalid_prefix() {
		assert!(AccountType::of("Revenue:Salary").is_err());
		assert!(AccountType::of("IncomeTax:Federal").is_err());
		assert!(AccountType::of("").is_err());
	}

	#[test]
	fn test_matches() {
		assert!(AccountType::Expenses.matches("Expenses:Rent"));
		assert!(!AccountType::Income.matches("Expenses:Rent"));
		assert!(!AccountType::Income.matches("Nonsense"));
	}

	#[test]
	fn test_display_round_trips_prefix() {
		for prefix in VALID_PREFIXES {
			let account_type = AccountType::of(prefix).unwrap();
			assert_eq!(account_type.to_string(), prefix);
		}
	}
}
