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
use crate::budget::classifier::{AccountClassifier, AccountRemap};
use crate::budget::filter::{prune_date_range, prune_non_budget_transactions};
use crate::budget::pivot::MonthlyPivotEngine;
use crate::budget::reducer::CurrencyReducer;
use crate::gl::account::AccountType;
use crate::gl::ledger::Ledger;
use crate::parsing::filesystem::Filesystem;
use crate::reports::assembler::ReportAssembler;
use crate::reports::chart::{ChartBuilder, CHART_FILE};
use crate::reports::details::{render_details, DETAILS_FILE};
use crate::reports::html::{render_index, INDEX_FILE, TITLE};
use crate::reports::table::summary_table;
use crate::util::date::{parse_date, today, Month};
use anyhow::{bail, Error};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod budget;
mod config;
mod gl;
mod parsing;
mod reports;
mod util;

const CONFIG_FILE: &str = "config.toml";
const JSON_FILE: &str = "report.json";

#[derive(Parser)]
#[command(
	name = "incexp",
	version,
	about = "Monthly income vs expenses report from a plain text ledger"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// Ledger file to read
	ledger: PathBuf,

	/// Report configuration (TOML)
	config: PathBuf,

	/// Directory the report is written to; created if missing
	output: PathBuf,

	// -----------
	// -- FLAGS --
	// -----------
	/// Log at debug level
	#[arg(short, long)]
	verbose: bool,

	/// Ignore transactions prior to this date (YYYY-MM-DD)
	#[arg(short, long)]
	start_date: Option<String>,

	/// Ignore transactions after this date (YYYY-MM-DD)
	#[arg(short, long)]
	end_date: Option<String>,

	/// Accepted for compatibility; only the HTML report is produced
	#[arg(long, visible_alias = "pdfs")]
	pdf: bool,

	/// Also write the filtered transactions to the output directory
	#[arg(long)]
	details: bool,
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	init_logging(args.verbose);

	if args.pdf {
		warn!("PDF output is not supported; writing the HTML report only");
	}

	// Config problems should stop the run before the ledger is even read
	let fs = Filesystem::new();
	let config = fs.get_config(&args.config)?;

	info!("reading ledger {}", args.ledger.display());
	let ledger = parsing::parser::Parser::new()?.load(&args.ledger)?;
	if ledger.prices.is_empty() {
		debug!("no exchange rates in the ledger");
	}
	let (start_date, end_date) = get_range(&args, &ledger)?;

	let transactions =
		prune_date_range(ledger.transactions(), &start_date, &end_date);
	info!(
		"{} of {} transactions between {} and {}",
		transactions.len(),
		ledger.transactions().len(),
		start_date,
		end_date
	);
	let transactions =
		prune_non_budget_transactions(transactions, &config.budget_accounts);
	info!("{} transactions touch budget accounts", transactions.len());

	let classifier = AccountClassifier::new(
		AccountRemap::new(&config.mappings)?,
		&config.reporting_currency,
	);
	let reducer = CurrencyReducer::new(
		&ledger.prices,
		&config.reporting_currency,
		config.precision,
	);
	let engine = MonthlyPivotEngine::new(&classifier, &reducer);
	let income = engine.pivot(&transactions, AccountType::Income)?;
	let expenses = engine.pivot(&transactions, AccountType::Expenses)?;
	let report = ReportAssembler::new(config.precision).assemble(income, expenses)?;

	// Everything is rendered up front so a failure leaves no partial output
	let chart = ChartBuilder::new(
		TITLE,
		Month::of(&start_date),
		Month::of(&end_date),
	)
	.series(&report.series)
	.render();
	let summary = summary_table(&report, config.summary_format)?;
	let mut outputs = vec![
		(CONFIG_FILE, config.to_toml()?),
		(CHART_FILE, chart),
		(INDEX_FILE, render_index(&report, config.summary_format, CHART_FILE)?),
		(JSON_FILE, report.to_json(&start_date, &end_date)?),
	];
	if args.details {
		outputs.push((
			DETAILS_FILE,
			render_details(&transactions, &start_date, &end_date),
		));
	}

	info!("writing report to {}", args.output.display());
	fs.create_output_dir(&args.output)?;
	for (file_name, contents) in &outputs {
		fs.write_output(&args.output, file_name, contents)?;
	}

	summary.print();
	Ok(())
}

/// `--verbose` wins over `RUST_LOG`, which wins over the default of warnings
/// only. Logs go to stderr so stdout carries just the summary.
fn init_logging(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

/// Defaults to the earliest transaction through today.
fn get_range(args: &Cli, ledger: &Ledger) -> Result<(NaiveDate, NaiveDate), Error> {
	let start_date = match &args.start_date {
		Some(date) => parse_date(date)?,
		None => ledger.earliest_date().unwrap_or_else(today),
	};
	let end_date = match &args.end_date {
		Some(date) => parse_date(date)?,
		None => today(),
	};

	if start_date > end_date {
		bail!("Start date {} is after end date {}", start_date, end_date);
	}

	Ok((start_date, end_date))
}
