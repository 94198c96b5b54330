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

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;

pub mod loading;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum LogLevel {
	#[serde(rename = "none")]
	None,
	#[serde(rename = "info")]
	Info,
	#[serde(rename = "debug")]
	Debug,
}

impl Default for LogLevel {
	fn default() -> Self {
		Self::None
	}
}

impl LogLevel {
	/// Check if info logging is enabled
	pub fn is_info_enabled(&self) -> bool {
		matches!(self, LogLevel::Info | LogLevel::Debug)
	}

	/// Check if debug logging is enabled
	pub fn is_debug_enabled(&self) -> bool {
		matches!(self, LogLevel::Debug)
	}
}

// Default functions
fn default_chat_model() -> String {
	"llama-3.1-8b-instant".to_string()
}

fn default_generator_model() -> String {
	"llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f32 {
	1.0
}

fn default_max_tokens() -> u32 {
	8192
}

fn default_top_p() -> f32 {
	1.0
}

fn default_timeout_seconds() -> u64 {
	120 // Bounded request timeout; there is no retry policy, callers re-invoke
}

fn default_ocr_endpoint() -> String {
	"https://api.ocr.space/parse/image".to_string()
}

fn default_ocr_language() -> String {
	"eng".to_string()
}

/// OCR collaborator settings (API key comes from the environment)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OcrConfig {
	#[serde(default = "default_ocr_endpoint")]
	pub endpoint: String,
	#[serde(default = "default_ocr_language")]
	pub language: String,
}

impl Default for OcrConfig {
	fn default() -> Self {
		Self {
			endpoint: default_ocr_endpoint(),
			language: default_ocr_language(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
	#[serde(default)]
	pub log_level: LogLevel,

	// Conversational model used by the chat pipeline
	#[serde(default = "default_chat_model")]
	pub model: String,

	// Model used by the one-shot quiz/slide generators
	#[serde(default = "default_generator_model")]
	pub generator_model: String,

	// Sampling parameters for the chat pipeline
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	#[serde(default = "default_top_p")]
	pub top_p: f32,

	// Ask the provider to stream the reply instead of returning one body.
	// The pipeline sees the concatenated text either way.
	#[serde(default)]
	pub stream: bool,

	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,

	#[serde(default)]
	pub ocr: OcrConfig,

	#[serde(skip)]
	config_path: Option<PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_level: LogLevel::default(),
			model: default_chat_model(),
			generator_model: default_generator_model(),
			temperature: default_temperature(),
			max_tokens: default_max_tokens(),
			top_p: default_top_p(),
			stream: false,
			timeout_seconds: default_timeout_seconds(),
			ocr: OcrConfig::default(),
			config_path: None,
		}
	}
}

impl Config {
	pub fn get_log_level(&self) -> LogLevel {
		self.log_level.clone()
	}
}

// Logging macros for different log levels
// These macros automatically check the current log level and only print if appropriate

thread_local! {
	static CURRENT_CONFIG: RefCell<Option<Config>> = const { RefCell::new(None) };
}

/// Set the current config for the thread (to be used by logging macros)
pub fn set_thread_config(config: &Config) {
	CURRENT_CONFIG.with(|c| {
		*c.borrow_mut() = Some(config.clone());
	});
}

/// Get the current config for the thread
pub fn with_thread_config<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Config) -> R,
{
	CURRENT_CONFIG.with(|c| (*c.borrow()).as_ref().map(f))
}

/// Info logging macro with automatic cyan coloring
/// Shows info messages when log level is Info OR Debug
#[macro_export]
macro_rules! log_info {
	($fmt:expr) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_info_enabled()) {
		if should_log {
		use colored::Colorize;
		println!("{}", $fmt.cyan());
		}
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_info_enabled()) {
		if should_log {
		use colored::Colorize;
	println!("{}", format!($fmt, $($arg),*).cyan());
	}
	}
	};
}

/// Debug logging macro with automatic bright blue coloring
#[macro_export]
macro_rules! log_debug {
	($fmt:expr) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_debug_enabled()) {
		if should_log {
		use colored::Colorize;
		println!("{}", $fmt.bright_blue());
		}
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_debug_enabled()) {
		if should_log {
		use colored::Colorize;
	println!("{}", format!($fmt, $($arg),*).bright_blue());
	}
	}
	};
}

/// Error logging macro with automatic bright red coloring
/// Always visible regardless of log level (errors should always be shown)
#[macro_export]
macro_rules! log_error {
	($fmt:expr) => {{
		use colored::Colorize;
		eprintln!("{}", $fmt.bright_red());
		}};
	($fmt:expr, $($arg:expr),*) => {{
		use colored::Colorize;
		eprintln!("{}", format!($fmt, $($arg),*).bright_red());
		}};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.model, "llama-3.1-8b-instant");
		assert_eq!(config.generator_model, "llama-3.3-70b-versatile");
		assert_eq!(config.max_tokens, 8192);
		assert_eq!(config.temperature, 1.0);
		assert_eq!(config.top_p, 1.0);
		assert!(!config.stream);
		assert_eq!(config.log_level, LogLevel::None);
	}

	#[test]
	fn test_log_level_gating() {
		assert!(LogLevel::Debug.is_info_enabled());
		assert!(LogLevel::Debug.is_debug_enabled());
		assert!(LogLevel::Info.is_info_enabled());
		assert!(!LogLevel::Info.is_debug_enabled());
		assert!(!LogLevel::None.is_info_enabled());
	}

	#[test]
	fn test_partial_toml_uses_defaults() {
		let config: Config = toml::from_str("model = \"llama-3.1-70b\"").unwrap();
		assert_eq!(config.model, "llama-3.1-70b");
		assert_eq!(config.max_tokens, 8192);
		assert_eq!(config.ocr.language, "eng");
	}
}
