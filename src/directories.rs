// Copyright 2025 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Directory utilities for cross-platform data directory management

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the system-wide data directory for decimind
///
/// This function returns the appropriate data directory based on the OS:
/// - macOS: ~/.local/share/decimind
/// - Linux: ~/.local/share/decimind (following XDG Base Directory specification)
/// - Windows: %LOCALAPPDATA%/decimind
pub fn get_decimind_data_dir() -> Result<PathBuf> {
	let data_dir = match dirs::home_dir() {
		Some(home) => {
			#[cfg(target_os = "windows")]
			let path = {
				// On Windows, use %LOCALAPPDATA%/decimind
				match dirs::data_local_dir() {
					Some(dir) => dir.join("decimind"),
					None => home.join("AppData").join("Local").join("decimind"),
				}
			};

			#[cfg(not(target_os = "windows"))]
			let path = home.join(".local").join("share").join("decimind");

			path
		}
		None => {
			return Err(anyhow::anyhow!("Unable to determine home directory"));
		}
	};

	// Ensure the directory exists
	if !data_dir.exists() {
		fs::create_dir_all(&data_dir).context(format!(
			"Failed to create decimind data directory: {}",
			data_dir.display()
		))?;
	}

	Ok(data_dir)
}

/// Get the configuration directory path
pub fn get_config_dir() -> Result<PathBuf> {
	let data_dir = get_decimind_data_dir()?;
	let config_dir = data_dir.join("config");

	if !config_dir.exists() {
		fs::create_dir_all(&config_dir)?;
	}

	Ok(config_dir)
}

/// Get the conversations directory path
pub fn get_conversations_dir() -> Result<PathBuf> {
	let data_dir = get_decimind_data_dir()?;
	let conversations_dir = data_dir.join("conversations");

	if !conversations_dir.exists() {
		fs::create_dir_all(&conversations_dir)?;
	}

	Ok(conversations_dir)
}

/// Get the default configuration file path
pub fn get_config_file_path() -> Result<PathBuf> {
	let config_dir = get_config_dir()?;
	Ok(config_dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_get_decimind_data_dir() {
		let result = get_decimind_data_dir();
		assert!(result.is_ok());

		let path = result.unwrap();
		assert!(path.to_string_lossy().contains("decimind"));

		// The directory should exist after calling the function
		assert!(path.exists());
	}

	#[test]
	fn test_config_file_path() {
		let config_path = get_config_file_path().unwrap();
		assert!(config_path.to_string_lossy().ends_with("config.toml"));
	}
}
