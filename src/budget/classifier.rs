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
use crate::config::config_file::Mapping;
use crate::gl::account::AccountType;
use crate::gl::transaction::Posting;
use anyhow::{anyhow, Error};
use regex::Regex;

/// Ordered account renaming rules. Each source pattern is matched against the
/// start of an account name, and the first rule that matches decides the
/// account's new name.
#[derive(Debug, Default)]
pub struct AccountRemap {
	rules: Vec<(Regex, String)>,
}

impl AccountRemap {
	pub fn new(mappings: &[Mapping]) -> Result<Self, Error> {
		let rules = mappings
			.iter()
			.map(|m| {
				Regex::new(&format!("^(?:{})", m.source))
					.map(|re| (re, m.dest.clone()))
					.map_err(|e| anyhow!("Invalid mapping source {}: {}", m.source, e))
			})
			.collect::<Result<Vec<_>, Error>>()?;

		Ok(Self { rules })
	}

	pub fn apply<'a>(&'a self, account: &'a str) -> &'a str {
		self.rules
			.iter()
			.find(|(re, _)| re.is_match(account))
			.map_or(account, |(_, dest)| dest.as_str())
	}
}

/// Decides which postings take part in a pass, and under which account name.
#[derive(Debug)]
pub struct AccountClassifier {
	remap: AccountRemap,
	reporting_currency: String,
}

impl AccountClassifier {
	pub fn new(remap: AccountRemap, reporting_currency: &str) -> Self {
		Self {
			remap,
			reporting_currency: reporting_currency.to_string(),
		}
	}

	/// Returns the account the posting counts towards, or None if the posting
	/// is not of the given account type or not in the reporting currency.
	pub fn classify(
		&self,
		posting: &Posting,
		account_type: AccountType,
	) -> Option<String> {
		if !account_type.matches(&posting.account) {
			return None;
		}

		if posting.units.currency != self.reporting_currency {
			return None;
		}

		Some(self.remap.apply(&posting.account).to_string())
	}
}
