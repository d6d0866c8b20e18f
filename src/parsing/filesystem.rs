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
use crate::config::config_file::Config;
use anyhow::{anyhow, bail, Error};
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct Filesystem {
	/// Set of file paths that have been inspected.
	/// Used to avoid circular includes.
	included_files: HashSet<PathBuf>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self {
			included_files: HashSet::new(),
		}
	}

	pub fn open(&self, file_path: &Path) -> Result<File, Error> {
		File::open(file_path)
			.map_err(|e| anyhow!("Cannot open {}: {}", file_path.display(), e))
	}

	pub fn declare_file(&mut self, file_path: &Path) -> Result<(), Error> {
		let key = fs::canonicalize(file_path)
			.unwrap_or_else(|_| file_path.to_path_buf());
		if !self.included_files.insert(key) {
			bail!("Circular file includes: {}", file_path.display())
		}
		Ok(())
	}

	/// Reads and validates the config at the given path.
	pub fn get_config(&self, config_path: &Path) -> Result<Config, Error> {
		let content = fs::read_to_string(config_path).map_err(|e| {
			anyhow!("Cannot read config {}: {}", config_path.display(), e)
		})?;

		Config::from_toml(&content)
	}

	/// Creates the output directory, and any parents, if missing.
	pub fn create_output_dir(&self, dir: &Path) -> Result<(), Error> {
		fs::create_dir_all(dir).map_err(|e| {
			anyhow!("Cannot create output directory {}: {}", dir.display(), e)
		})
	}

	/// Writes one output file into the output directory.
	pub fn write_output(
		&self,
		dir: &Path,
		file_name: &str,
		contents: &str,
	) -> Result<PathBuf, Error> {
		let path = dir.join(file_name);
		fs::write(&path, contents)
			.map_err(|e| anyhow!("Cannot write {}: {}", path.display(), e))?;
		info!("wrote {}", path.display());
		Ok(path)
	}
}
