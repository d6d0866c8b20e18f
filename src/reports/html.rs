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
use crate::config::config_file::SummaryFormat;
use crate::reports::assembler::Report;
use anyhow::Error;
use tera::{Context, Tera};

pub const INDEX_FILE: &str = "index.html";
pub const TITLE: &str = "Income vs Expenses";

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Renders the report page, which references the chart by relative path.
/// Every value is escaped by the template engine.
pub fn render_index(
	report: &Report,
	format: SummaryFormat,
	chart_file: &str,
) -> Result<String, Error> {
	let mut tera = Tera::default();
	tera.add_raw_template(INDEX_FILE, INDEX_TEMPLATE)?;
	tera.autoescape_on(vec![".html"]);

	let mut context = Context::new();
	context.insert("title", TITLE);
	context.insert("chart_file", chart_file);
	context.insert("header", &report.header());
	context.insert("summary", &report.summary_rows(format)?);
	context.insert("income", &report.income_rows());
	context.insert("expenses", &report.expense_rows());

	Ok(tera.render(INDEX_FILE, &context)?)
}
