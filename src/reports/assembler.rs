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
use crate::budget::pivot::PivotTable;
use crate::config::config_file::SummaryFormat;
use crate::util::amount::{checked_add, checked_mul, quantize};
use crate::util::date::Month;
use anyhow::{bail, Error};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One month of the net series for charting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
	pub month: Month,
	/// Income less expenses for the month
	pub net: Decimal,
	/// Sum of net over this and every earlier month
	pub cumulative: Decimal,
}

/// Both pivot tables with their derived totals.
#[derive(Debug)]
pub struct Report {
	pub income: PivotTable,
	pub expenses: PivotTable,

	/// Per month, the negated sum of each table's cells
	pub income_totals: Vec<Decimal>,
	pub expense_totals: Vec<Decimal>,

	pub series: Vec<SeriesPoint>,
	precision: u32,
}

impl Report {
	pub fn header(&self) -> Vec<String> {
		self.income.header()
	}

	/// Income rows followed by their Total row.
	pub fn income_rows(&self) -> Vec<Vec<String>> {
		let mut rows = self.income.string_rows();
		rows.push(self.total_row("Total", &self.income_totals));
		rows
	}

	/// Expense rows followed by their Total row.
	pub fn expense_rows(&self) -> Vec<Vec<String>> {
		let mut rows = self.expenses.string_rows();
		rows.push(self.total_row("Total", &self.expense_totals));
		rows
	}

	/// Income totals, expense totals, and their sum per month.
	pub fn summary_rows(
		&self,
		format: SummaryFormat,
	) -> Result<Vec<Vec<String>>, Error> {
		let net: Vec<Decimal> = self.series.iter().map(|p| p.net).collect();

		[
			("Income", &self.income_totals),
			("Expense", &self.expense_totals),
			("total", &net),
		]
		.into_iter()
		.map(|(label, values)| {
			std::iter::once(Ok(label.to_string()))
				.chain(values.iter().map(|v| self.format_summary(*v, format)))
				.collect()
		})
		.collect()
	}

	fn total_row(&self, label: &str, values: &[Decimal]) -> Vec<String> {
		std::iter::once(label.to_string())
			.chain(values.iter().map(|v| v.to_string()))
			.collect()
	}

	fn format_summary(
		&self,
		value: Decimal,
		format: SummaryFormat,
	) -> Result<String, Error> {
		Ok(match format {
			SummaryFormat::Percent => {
				let percent = checked_mul(value, Decimal::ONE_HUNDRED)?;
				format!("{}%", quantize(percent, 2)?)
			},
			SummaryFormat::Plain => quantize(value, self.precision)?.to_string(),
		})
	}

	/// Machine readable copy of everything the HTML report shows.
	pub fn to_json(
		&self,
		start_date: &NaiveDate,
		end_date: &NaiveDate,
	) -> Result<String, Error> {
		#[derive(Serialize)]
		struct JsonReport<'a> {
			start_date: String,
			end_date: String,
			header: Vec<String>,
			summary: Vec<Vec<String>>,
			income: Vec<Vec<String>>,
			expenses: Vec<Vec<String>>,
			series: &'a [SeriesPoint],
		}

		let report = JsonReport {
			start_date: start_date.to_string(),
			end_date: end_date.to_string(),
			header: self.header(),
			summary: self.summary_rows(SummaryFormat::Plain)?,
			income: self.income_rows(),
			expenses: self.expense_rows(),
			series: &self.series,
		};

		Ok(serde_json::to_string_pretty(&report)?)
	}
}

pub struct ReportAssembler {
	precision: u32,
}

impl ReportAssembler {
	pub fn new(precision: u32) -> Self {
		Self { precision }
	}

	/// Derives totals and the net series from the income and expense tables,
	/// which must cover the same months.
	pub fn assemble(
		&self,
		income: PivotTable,
		expenses: PivotTable,
	) -> Result<Report, Error> {
		if income.months() != expenses.months() {
			bail!(
				"Income and expense tables cover different months ({:?} vs {:?})",
				income.header(),
				expenses.header()
			);
		}

		let income_totals = self.negated_column_sums(&income)?;
		let expense_totals = self.negated_column_sums(&expenses)?;

		let mut running = Decimal::ZERO;
		let series = income
			.months()
			.iter()
			.zip(income_totals.iter().zip(&expense_totals))
			.map(|(month, (income_total, expense_total))| {
				let net = checked_add(*income_total, *expense_total)?;
				running = checked_add(running, net)?;
				Ok(SeriesPoint {
					month: *month,
					net,
					cumulative: running,
				})
			})
			.collect::<Result<Vec<_>, Error>>()?;

		Ok(Report {
			income,
			expenses,
			income_totals,
			expense_totals,
			series,
			precision: self.precision,
		})
	}

	/// Ledger amounts on income and expense accounts carry the opposite sign
	/// to how they are presented, so totals are negated. Empty cells count
	/// as zero.
	fn negated_column_sums(
		&self,
		table: &PivotTable,
	) -> Result<Vec<Decimal>, Error> {
		(0..table.months().len())
			.map(|i| {
				let sum = table
					.rows()
					.iter()
					.filter_map(|row| row.cells[i])
					.try_fold(Decimal::ZERO, checked_add)?;
				quantize(-sum, self.precision)
			})
			.collect()
	}
}
