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

use anyhow::{Context, Result};
use std::fs;

use super::Config;

impl Config {
	/// Load configuration from the system-wide config file
	pub fn load() -> Result<Self> {
		let config_path = crate::directories::get_config_file_path()?;

		let mut config = if config_path.exists() {
			let config_str = fs::read_to_string(&config_path).context(format!(
				"Failed to read config from {}",
				config_path.display()
			))?;
			let config: Config =
				toml::from_str(&config_str).context("Failed to parse TOML configuration")?;
			config
		} else {
			Config::default()
		};

		// Store the config path for future saves
		config.config_path = Some(config_path);

		// Environment variables take precedence over config file values
		if let Ok(model) = std::env::var("DECIMIND_MODEL") {
			if !model.is_empty() {
				config.model = model;
			}
		}
		if let Ok(level) = std::env::var("DECIMIND_LOG_LEVEL") {
			match level.as_str() {
				"debug" => config.log_level = super::LogLevel::Debug,
				"info" => config.log_level = super::LogLevel::Info,
				"none" => config.log_level = super::LogLevel::None,
				_ => {}
			}
		}

		Ok(config)
	}

	/// Save the current configuration to its config file
	pub fn save(&self) -> Result<()> {
		let config_path = match &self.config_path {
			Some(path) => path.clone(),
			None => crate::directories::get_config_file_path()?,
		};

		let toml_str = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
		fs::write(&config_path, toml_str).context(format!(
			"Failed to write config to {}",
			config_path.display()
		))?;

		Ok(())
	}

	/// Render the effective configuration as TOML for display
	pub fn to_display_string(&self) -> Result<String> {
		Ok(toml::to_string_pretty(self)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_round_trip_serialization() {
		let config = Config::default();
		let toml_str = toml::to_string_pretty(&config).unwrap();
		let parsed: Config = toml::from_str(&toml_str).unwrap();
		assert_eq!(parsed.model, config.model);
		assert_eq!(parsed.generator_model, config.generator_model);
		assert_eq!(parsed.timeout_seconds, config.timeout_seconds);
	}
}
