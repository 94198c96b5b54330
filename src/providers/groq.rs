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

// Groq provider implementation (OpenAI-compatible chat completions API)

use super::{ChatProvider, CompletionReply, CompletionRequest, ProviderError, TokenUsage};
use crate::config::Config;
use crate::log_debug;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use std::env;
use std::time::Duration;

// Constants
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq provider implementation
pub struct GroqProvider {
	client: Client,
	api_key: Option<String>,
	api_url: String,
}

impl GroqProvider {
	/// Build a provider from config. The API key is captured from the
	/// environment here but only checked when a completion is requested, so a
	/// missing key surfaces as a configuration error instead of a panic.
	pub fn new(config: &Config) -> anyhow::Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()?;

		Ok(Self {
			client,
			api_key: env::var(GROQ_API_KEY_ENV).ok(),
			api_url: GROQ_API_URL.to_string(),
		})
	}

	async fn collect_stream(
		&self,
		response: reqwest::Response,
	) -> Result<CompletionReply, ProviderError> {
		let mut stream = response.bytes_stream().eventsource();
		let mut content = String::new();
		let mut finish_reason: Option<String> = None;

		while let Some(event) = stream.next().await {
			let event = event
				.map_err(|e| ProviderError::Transport(format!("SSE stream error: {}", e)))?;

			if event.data == "[DONE]" {
				break;
			}

			let chunk: serde_json::Value = serde_json::from_str(&event.data).map_err(|e| {
				ProviderError::Transport(format!("SSE parsing error: {}, data: {}", e, event.data))
			})?;

			if chunk.get("error").is_some() {
				return Err(classify_error_body(200, &chunk, &event.data));
			}

			let choice = chunk.get("choices").and_then(|choices| choices.get(0));

			// Fragments are appended in arrival order; the rest of the
			// pipeline never observes partial text
			if let Some(delta) = choice
				.and_then(|choice| choice.get("delta"))
				.and_then(|delta| delta.get("content"))
				.and_then(|content| content.as_str())
			{
				content.push_str(delta);
			}

			if let Some(reason) = choice
				.and_then(|choice| choice.get("finish_reason"))
				.and_then(|reason| reason.as_str())
			{
				finish_reason = Some(reason.to_string());
			}
		}

		Ok(CompletionReply {
			content,
			usage: None,
			finish_reason,
		})
	}
}

#[async_trait::async_trait]
impl ChatProvider for GroqProvider {
	fn name(&self) -> &str {
		"groq"
	}

	async fn chat_completion(
		&self,
		request: &CompletionRequest,
	) -> Result<CompletionReply, ProviderError> {
		// Missing credential short-circuits before any network call
		let api_key = self
			.api_key
			.as_deref()
			.ok_or(ProviderError::MissingApiKey(GROQ_API_KEY_ENV))?;

		let request_body = build_request_body(request);

		let response = self
			.client
			.post(&self.api_url)
			.header("Authorization", format!("Bearer {}", api_key))
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await
			.map_err(|e| ProviderError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let response_text = response
				.text()
				.await
				.map_err(|e| ProviderError::Transport(e.to_string()))?;
			let response_json: serde_json::Value =
				serde_json::from_str(&response_text).unwrap_or(serde_json::Value::Null);
			return Err(classify_error_body(
				status.as_u16(),
				&response_json,
				&response_text,
			));
		}

		if request.stream {
			return self.collect_stream(response).await;
		}

		let response_text = response
			.text()
			.await
			.map_err(|e| ProviderError::Transport(e.to_string()))?;

		let response_json: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
			ProviderError::Transport(format!(
				"Failed to parse response JSON: {}. Response: {}",
				e, response_text
			))
		})?;

		// Some providers report errors with HTTP 200
		if response_json.get("error").is_some() {
			return Err(classify_error_body(
				status.as_u16(),
				&response_json,
				&response_text,
			));
		}

		let reply = extract_reply(&response_json);
		if let Some(ref reason) = reply.finish_reason {
			log_debug!("Finish reason: {}", reason);
		}

		Ok(reply)
	}
}

// Build the JSON request body from the completion request
fn build_request_body(request: &CompletionRequest) -> serde_json::Value {
	let messages = request
		.messages
		.iter()
		.map(|turn| {
			serde_json::json!({
				"role": turn.role.as_str(),
				"content": turn.content,
			})
		})
		.collect::<Vec<_>>();

	let mut body = serde_json::json!({
		"model": request.model,
		"messages": messages,
		"temperature": request.temperature,
		"max_tokens": request.max_tokens,
		"top_p": request.top_p,
		"stream": request.stream,
	});

	if request.json_mode {
		body["response_format"] = serde_json::json!({ "type": "json_object" });
	}

	body
}

// Classify a provider error body into the error taxonomy
fn classify_error_body(
	status: u16,
	response_json: &serde_json::Value,
	response_text: &str,
) -> ProviderError {
	let error_obj = response_json.get("error");

	if let Some(code) = error_obj
		.and_then(|error| error.get("code"))
		.and_then(|code| code.as_str())
	{
		if code == "model_decommissioned" {
			return ProviderError::ModelDecommissioned;
		}
	}

	let message = error_obj
		.and_then(|error| error.get("message"))
		.and_then(|message| message.as_str())
		.map(|message| message.to_string())
		.unwrap_or_else(|| response_text.to_string());

	ProviderError::Api { status, message }
}

// Extract the reply content, usage and finish reason from a completion body
fn extract_reply(response_json: &serde_json::Value) -> CompletionReply {
	let choice = response_json
		.get("choices")
		.and_then(|choices| choices.get(0));

	// Absent content is the empty-reply outcome, not an error
	let content = choice
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(|content| content.as_str())
		.unwrap_or("")
		.to_string();

	let finish_reason = choice
		.and_then(|choice| choice.get("finish_reason"))
		.and_then(|reason| reason.as_str())
		.map(|reason| reason.to_string());

	let usage = response_json.get("usage").map(|usage_obj| TokenUsage {
		prompt_tokens: usage_obj
			.get("prompt_tokens")
			.and_then(|v| v.as_u64())
			.unwrap_or(0),
		completion_tokens: usage_obj
			.get("completion_tokens")
			.and_then(|v| v.as_u64())
			.unwrap_or(0),
		total_tokens: usage_obj
			.get("total_tokens")
			.and_then(|v| v.as_u64())
			.unwrap_or(0),
	});

	CompletionReply {
		content,
		usage,
		finish_reason,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::Turn;

	fn sample_request(json_mode: bool) -> CompletionRequest {
		CompletionRequest {
			messages: vec![Turn::system("You are helpful."), Turn::user("Hello")],
			model: "llama-3.1-8b-instant".to_string(),
			temperature: 1.0,
			max_tokens: 8192,
			top_p: 1.0,
			json_mode,
			stream: false,
		}
	}

	#[test]
	fn test_build_request_body_plain() {
		let body = build_request_body(&sample_request(false));
		assert_eq!(body["model"], "llama-3.1-8b-instant");
		assert_eq!(body["messages"][0]["role"], "system");
		assert_eq!(body["messages"][1]["content"], "Hello");
		assert_eq!(body["max_tokens"], 8192);
		assert!(body.get("response_format").is_none());
	}

	#[test]
	fn test_build_request_body_json_mode() {
		let body = build_request_body(&sample_request(true));
		assert_eq!(body["response_format"]["type"], "json_object");
	}

	#[test]
	fn test_classify_model_decommissioned() {
		let body = serde_json::json!({
			"error": { "message": "model gone", "code": "model_decommissioned" }
		});
		let err = classify_error_body(400, &body, "");
		assert!(matches!(err, ProviderError::ModelDecommissioned));
	}

	#[test]
	fn test_classify_api_error_uses_message() {
		let body = serde_json::json!({
			"error": { "message": "service unavailable", "type": "server_error" }
		});
		let err = classify_error_body(503, &body, "raw body");
		match err {
			ProviderError::Api { status, message } => {
				assert_eq!(status, 503);
				assert_eq!(message, "service unavailable");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_classify_falls_back_to_raw_text() {
		let err = classify_error_body(502, &serde_json::Value::Null, "Bad Gateway");
		match err {
			ProviderError::Api { status, message } => {
				assert_eq!(status, 502);
				assert_eq!(message, "Bad Gateway");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_extract_reply_content_and_usage() {
		let body = serde_json::json!({
			"choices": [{
				"message": { "role": "assistant", "content": "Hi there!" },
				"finish_reason": "stop"
			}],
			"usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
		});
		let reply = extract_reply(&body);
		assert_eq!(reply.content, "Hi there!");
		assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
		assert_eq!(reply.usage.unwrap().total_tokens, 15);
	}

	#[test]
	fn test_extract_reply_missing_content_is_empty() {
		let body = serde_json::json!({ "choices": [{ "message": { "role": "assistant" } }] });
		let reply = extract_reply(&body);
		assert_eq!(reply.content, "");
	}
}
