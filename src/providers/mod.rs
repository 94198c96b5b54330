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

// Provider abstraction layer for remote chat-completion APIs

use crate::session::Turn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod groq;

pub use groq::GroqProvider;

/// Common token usage structure across providers
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TokenUsage {
	pub prompt_tokens: u64,
	pub completion_tokens: u64,
	pub total_tokens: u64,
}

/// The assembled payload sent to the remote completion provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
	pub messages: Vec<Turn>,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub top_p: f32,
	/// Ask the provider for a strictly parseable JSON object instead of free text
	pub json_mode: bool,
	/// Deliver the reply as incremental fragments; the invoker concatenates
	/// them in arrival order, callers always see one string
	pub stream: bool,
}

/// Provider reply with the accumulated completion text.
///
/// `content` is never absent: an empty string is the "no content generated"
/// outcome, distinct from an error.
#[derive(Debug, Clone)]
pub struct CompletionReply {
	pub content: String,
	pub usage: Option<TokenUsage>,
	pub finish_reason: Option<String>,
}

/// Failures at the provider boundary.
///
/// `MissingApiKey` is detected before any network call. Display output is the
/// human-readable message embedded in the result envelope; the HTTP status is
/// kept on the side for logging.
#[derive(Debug, Error)]
pub enum ProviderError {
	#[error("API key not found in environment variable: {0}")]
	MissingApiKey(&'static str),
	#[error("The model is currently decommissioned. Please try another model.")]
	ModelDecommissioned,
	#[error("{message}")]
	Api { status: u16, message: String },
	#[error("{0}")]
	Transport(String),
}

impl ProviderError {
	/// Configuration errors short-circuit with a fixed message; everything
	/// else degrades into error text on the reply
	pub fn is_configuration(&self) -> bool {
		matches!(self, ProviderError::MissingApiKey(_))
	}
}

/// Trait implemented by remote completion providers.
///
/// Implementations are constructed explicitly and passed into the pipeline so
/// tests can inject a fake; there is no process-wide client.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
	/// Get the provider name (e.g., "groq")
	fn name(&self) -> &str;

	/// Send a chat completion request and return the accumulated reply
	async fn chat_completion(
		&self,
		request: &CompletionRequest,
	) -> Result<CompletionReply, ProviderError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_api_error_displays_message_only() {
		let err = ProviderError::Api {
			status: 503,
			message: "service unavailable".to_string(),
		};
		assert_eq!(err.to_string(), "service unavailable");
	}

	#[test]
	fn test_missing_key_is_configuration() {
		assert!(ProviderError::MissingApiKey("GROQ_API_KEY").is_configuration());
		assert!(!ProviderError::ModelDecommissioned.is_configuration());
		assert!(!ProviderError::Transport("boom".to_string()).is_configuration());
	}
}
