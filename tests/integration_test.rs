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
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const DATA: &str = "tests/test_data";
const RANGE: [&str; 4] = ["-s", "2023-01-01", "-e", "2023-06-30"];

/// Dynamically collects test case names from a given directory. A case is a
/// `NAME_in.ledger` with its `NAME_config.toml`.
fn collect_test_cases(subfolder: &str) -> Vec<String> {
	let dir_path = format!("{}/{}", DATA, subfolder);

	let mut test_cases = vec![];

	if let Ok(entries) = fs::read_dir(&dir_path) {
		for entry in entries.flatten() {
			let file_name =
				entry.file_name().into_string().unwrap_or_default();
			if let Some(name) = file_name.strip_suffix("_in.ledger") {
				test_cases.push(name.to_string());
			}
		}
	}

	test_cases.sort();
	test_cases
}

fn case_path(subfolder: &str, name: &str, suffix: &str) -> PathBuf {
	Path::new(DATA).join(subfolder).join(format!("{}{}", name, suffix))
}

fn run(subfolder: &str, name: &str, output: &Path, args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_incexp"))
		.arg(case_path(subfolder, name, "_in.ledger"))
		.arg(case_path(subfolder, name, "_config.toml"))
		.arg(output)
		.args(args)
		.output()
		.expect("Failed to execute process")
}

#[test]
fn test_integration_reports() {
	let test_cases = collect_test_cases("reports");
	assert!(!test_cases.is_empty());

	for name in test_cases {
		println!("running for {}...", name);
		let dir = TempDir::new().unwrap();
		let out = dir.path().join("report");

		let output = run("reports", &name, &out, &RANGE);
		assert!(
			output.status.success(),
			"{} failed processing: {}",
			name,
			String::from_utf8_lossy(&output.stderr)
		);

		let stdout = String::from_utf8_lossy(&output.stdout);
		let expected_output =
			fs::read_to_string(case_path("reports", &name, "_out.txt"))
				.expect("Failed to read expected output file");

		assert_eq!(
			stdout.trim(),
			expected_output.trim(),
			"Output did not match for {}; expected:\n{}\ngot:\n{}",
			name,
			expected_output.trim(),
			stdout.trim()
		);

		for file in ["config.toml", "index.html", "inc_exp.svg", "report.json"] {
			assert!(out.join(file).is_file(), "{} missing {}", name, file);
		}
		assert!(!out.join("transactions.ledger").exists());
	}
}

#[test]
fn test_integration_output_contents() {
	let dir = TempDir::new().unwrap();
	let out = dir.path().join("report");
	let output = run("reports", "household", &out, &RANGE);
	assert!(output.status.success());

	let html = fs::read_to_string(out.join("index.html")).unwrap();
	assert!(html.contains("<img src=\"inc_exp.svg\""));
	assert!(html.contains("<h2>Income vs Expenses</h2>"));
	assert!(html.contains(
		"<tr><td>Expenses:Groceries</td><td>120.50</td><td>30.25</td></tr>"
	));
	assert!(html.contains(
		"<tr><td>Expenses:Rent</td><td>1500.00</td><td></td></tr>"
	));
	assert!(html.contains(
		"<tr><td>Total</td><td>-1620.50</td><td>-30.25</td></tr>"
	));

	let svg = fs::read_to_string(out.join("inc_exp.svg")).unwrap();
	assert!(svg.starts_with("<svg"));
	assert_eq!(svg.matches("class=\"net\"").count(), 2);
	// The axis covers the whole requested range
	assert!(svg.contains(">Jan<") && svg.contains(">Jun<"));

	let json: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap())
			.unwrap();
	assert_eq!(json["start_date"], "2023-01-01");
	assert_eq!(json["end_date"], "2023-06-30");
	assert_eq!(json["series"][0]["cumulative"], "1379.50");
	assert_eq!(json["series"][1]["cumulative"], "4349.25");

	let config = fs::read_to_string(out.join("config.toml")).unwrap();
	assert!(config.contains("reporting_currency = \"USD\""));
	assert!(config.contains("dest = \"Expenses:Groceries\""));
}

#[test]
fn test_integration_details() {
	let dir = TempDir::new().unwrap();
	let out = dir.path().join("report");
	let mut args = RANGE.to_vec();
	args.push("--details");

	let output = run("reports", "household", &out, &args);
	assert!(output.status.success());

	let details = fs::read_to_string(out.join("transactions.ledger")).unwrap();
	assert!(details.starts_with("# 5 budget transactions"));
	assert!(details.contains("2023-02-15 Cafe\n\tExpenses:Food 30.25 USD"));
	assert!(!details.contains("Move to cash"));
	assert!(!details.contains("after the range"));
}

#[test]
fn test_integration_pdf_flag_is_inert() {
	for flag in ["--pdf", "--pdfs"] {
		let dir = TempDir::new().unwrap();
		let out = dir.path().join("report");
		let mut args = RANGE.to_vec();
		args.push(flag);

		let output = run("reports", "household", &out, &args);
		assert!(output.status.success(), "{} rejected", flag);
		assert!(out.join("index.html").is_file());
	}
}

#[test]
fn test_integration_start_after_end() {
	let dir = TempDir::new().unwrap();
	let out = dir.path().join("report");
	let output = run(
		"reports",
		"household",
		&out,
		&["-s", "2023-03-01", "-e", "2023-02-01"],
	);
	assert!(!output.status.success());
	assert!(!out.exists());
}

#[test]
fn test_integration_should_fail() {
	let test_cases = collect_test_cases("failures");
	assert!(!test_cases.is_empty());

	for name in test_cases {
		println!("running for {}...", name);
		let dir = TempDir::new().unwrap();
		let out = dir.path().join("report");

		let output = run("failures", &name, &out, &RANGE);
		assert!(
			!output.status.success(),
			"{} unexpectedly succeeded!",
			name
		);
		assert!(!out.exists(), "{} left partial output", name);
	}
}
