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

// OCR collaborator client (OCR.space-compatible parse API)

use super::attachments::OcrClient;
use crate::config::Config;
use anyhow::Result;
use reqwest::Client;
use std::env;
use std::time::Duration;

pub const OCR_API_KEY_ENV: &str = "OCR_API_KEY";

/// Client for an OCR.space-style image parsing endpoint.
///
/// The service takes a base64 data URL plus a language hint and reports
/// failures through an `IsErroredOnProcessing` flag with a message list
/// rather than HTTP status codes.
pub struct OcrSpaceClient {
	client: Client,
	endpoint: String,
	api_key: Option<String>,
	language: String,
}

impl OcrSpaceClient {
	pub fn new(config: &Config) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()?;

		Ok(Self {
			client,
			endpoint: config.ocr.endpoint.clone(),
			api_key: env::var(OCR_API_KEY_ENV).ok(),
			language: config.ocr.language.clone(),
		})
	}
}

#[async_trait::async_trait]
impl OcrClient for OcrSpaceClient {
	async fn extract_text(&self, mime_type: &str, image_base64: &str) -> Result<String> {
		let api_key = self.api_key.as_deref().ok_or_else(|| {
			anyhow::anyhow!(
				"OCR API key not found in environment variable: {}",
				OCR_API_KEY_ENV
			)
		})?;

		let form = reqwest::multipart::Form::new()
			.text(
				"base64Image",
				format!("data:{};base64,{}", mime_type, image_base64),
			)
			.text("language", self.language.clone())
			.text("isOverlayRequired", "false");

		let response = self
			.client
			.post(&self.endpoint)
			.header("apikey", api_key)
			.multipart(form)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(anyhow::anyhow!(
				"OCR service returned HTTP {}",
				response.status()
			));
		}

		let body: serde_json::Value = response.json().await?;
		if body
			.get("IsErroredOnProcessing")
			.and_then(|v| v.as_bool())
			.unwrap_or(false)
		{
			return Err(anyhow::anyhow!("{}", processing_error_message(&body)));
		}

		Ok(parsed_text(&body))
	}
}

// Flatten the service's error message field, which may be a string or a list
fn processing_error_message(body: &serde_json::Value) -> String {
	match body.get("ErrorMessage") {
		Some(serde_json::Value::String(message)) => message.clone(),
		Some(serde_json::Value::Array(messages)) => {
			let joined = messages
				.iter()
				.filter_map(|m| m.as_str())
				.collect::<Vec<_>>()
				.join("; ");
			if joined.is_empty() {
				"OCR processing failed".to_string()
			} else {
				joined
			}
		}
		_ => "OCR processing failed".to_string(),
	}
}

// Concatenate the parsed text of all result pages
fn parsed_text(body: &serde_json::Value) -> String {
	body.get("ParsedResults")
		.and_then(|results| results.as_array())
		.map(|results| {
			results
				.iter()
				.filter_map(|r| r.get("ParsedText").and_then(|t| t.as_str()))
				.collect::<Vec<_>>()
				.join("\n")
		})
		.unwrap_or_default()
		.trim()
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parsed_text_joins_pages() {
		let body = serde_json::json!({
			"ParsedResults": [
				{ "ParsedText": "page one" },
				{ "ParsedText": "page two" }
			],
			"IsErroredOnProcessing": false
		});
		assert_eq!(parsed_text(&body), "page one\npage two");
	}

	#[test]
	fn test_parsed_text_empty_when_missing() {
		assert_eq!(parsed_text(&serde_json::json!({})), "");
	}

	#[test]
	fn test_processing_error_message_variants() {
		let list = serde_json::json!({ "ErrorMessage": ["bad image", "try again"] });
		assert_eq!(processing_error_message(&list), "bad image; try again");

		let single = serde_json::json!({ "ErrorMessage": "bad image" });
		assert_eq!(processing_error_message(&single), "bad image");

		let missing = serde_json::json!({});
		assert_eq!(processing_error_message(&missing), "OCR processing failed");
	}
}
