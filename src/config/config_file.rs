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
use crate::budget::classifier::AccountRemap;
use anyhow::{anyhow, bail, Error};
use serde::{Deserialize, Serialize};

/// Decimal places beyond this cannot be represented.
const MAX_PRECISION: u32 = 28;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Transactions touching none of these accounts are left out of the
	/// report entirely.
	#[serde(default)]
	pub budget_accounts: Vec<String>,

	#[serde(default = "default_reporting_currency")]
	pub reporting_currency: String,

	/// Decimal places shown for every amount
	#[serde(default = "default_precision")]
	pub precision: u32,

	#[serde(default)]
	pub summary_format: SummaryFormat,

	/// Ordered account remapping rules; the first matching source wins.
	#[serde(default)]
	pub mappings: Vec<Mapping>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Mapping {
	/// Regular expression matched against the start of an account name
	pub source: String,
	pub dest: String,
}

/// How the summary table renders its values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
	/// Value × 100 with a percent sign
	#[default]
	Percent,
	Plain,
}

fn default_reporting_currency() -> String {
	"USD".to_string()
}

fn default_precision() -> u32 {
	2
}

impl Config {
	/// Parses and validates a config, including every remapping pattern.
	pub fn from_toml(content: &str) -> Result<Self, Error> {
		let config: Config = toml::from_str(content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), Error> {
		if self.reporting_currency.trim().is_empty() {
			bail!("reporting_currency cannot be empty");
		}

		if self.precision > MAX_PRECISION {
			bail!("Maximum precision is {}", MAX_PRECISION);
		}

		AccountRemap::new(&self.mappings)?;
		Ok(())
	}

	/// Normalized form, written alongside the report.
	pub fn to_toml(&self) -> Result<String, Error> {
		toml::to_string_pretty(self)
			.map_err(|e| anyhow!("failed to serialize config: {}", e))
	}
}
