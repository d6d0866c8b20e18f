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
use anyhow::{anyhow, bail, Error};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// A decimal value with a currency.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Amount {
	pub currency: String,
	pub value: Decimal,
}

impl Amount {
	pub fn new(value: Decimal, currency: &str) -> Self {
		Self {
			value,
			currency: currency.to_string(),
		}
	}
}

impl Neg for Amount {
	type Output = Amount;
	fn neg(self) -> Self::Output {
		Self::Output {
			currency: self.currency.to_owned(),
			value: -self.value,
		}
	}
}

impl fmt::Display for Amount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.value, self.currency)
	}
}

/// Cost basis of a lot: the per-unit price paid, and optionally the name the
/// user gave the lot.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Cost {
	pub per_unit: Amount,
	pub label: Option<String>,
}

impl Cost {
	pub fn new(per_unit: Amount, label: Option<String>) -> Self {
		Self { per_unit, label }
	}
}

impl fmt::Display for Cost {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.label {
			Some(label) => write!(f, "{{ {} \"{}\" }}", self.per_unit, label),
			None => write!(f, "{{ {} }}", self.per_unit),
		}
	}
}

/// Units held in one lot, or outside of any lot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
	pub units: Amount,
	pub cost: Option<Cost>,
}

impl Position {
	pub fn new(units: Amount, cost: Option<Cost>) -> Self {
		Self { units, cost }
	}
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.cost {
			Some(cost) => write!(f, "{} {}", self.units, cost),
			None => write!(f, "{}", self.units),
		}
	}
}

/// Parses a number as written in the ledger. Commas are expected to be
/// stripped already.
pub fn parse_decimal(input: &str) -> Result<Decimal, Error> {
	Decimal::from_str(input).map_err(|_| anyhow!("Invalid value: {}", input))
}

/// Rounds to exactly the given number of decimal places, using banker's
/// rounding, and pads with zeroes where the value has fewer places. Fails if
/// the value is too large to carry that many places.
pub fn quantize(value: Decimal, decimal_places: u32) -> Result<Decimal, Error> {
	let mut rounded = value.round_dp_with_strategy(
		decimal_places,
		RoundingStrategy::MidpointNearestEven,
	);
	rounded.rescale(decimal_places);
	if rounded.scale() != decimal_places {
		bail!("{} cannot be shown with {} decimal places", value, decimal_places);
	}
	if rounded.is_zero() {
		rounded.set_sign_positive(true);
	}
	Ok(rounded)
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
	a.checked_add(b)
		.ok_or_else(|| anyhow!("Amount out of range: {} + {}", a, b))
}

pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
	a.checked_mul(b)
		.ok_or_else(|| anyhow!("Amount out of range: {} * {}", a, b))
}
