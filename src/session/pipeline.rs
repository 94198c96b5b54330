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

// The assistant response pipeline: classify, extract, assemble, invoke, decode

use super::attachments::{Attachment, AttachmentExtractor};
use super::context;
use super::decoder;
use super::mode::{Directive, Mode};
use super::Turn;
use crate::config::Config;
use crate::providers::{ChatProvider, CompletionRequest, ProviderError};
use crate::{log_debug, log_error};
use std::sync::Arc;

/// Fixed message for the missing-credential path
pub const CONFIGURATION_ERROR_RESPONSE: &str =
	"DeciMind is not configured yet: set the GROQ_API_KEY environment variable to enable responses.";

/// One user turn: the raw message plus caller-held state
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
	pub message: String,
	pub chat_history: Vec<Turn>,
	pub files: Vec<Attachment>,
}

impl ChatInput {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			chat_history: Vec::new(),
			files: Vec::new(),
		}
	}
}

/// The envelope returned to the caller. Constructed fresh per request and
/// never mutated after return; failures land in `response`/`error`, never in
/// a panic or an Err.
#[derive(Debug, Clone)]
pub struct ChatOutput {
	pub response: String,
	pub title: Option<String>,
	pub mode: Mode,
	pub is_think_response: bool,
	pub is_study_response: bool,
	pub error: Option<String>,
}

impl ChatOutput {
	fn for_mode(mode: Mode) -> Self {
		Self {
			response: String::new(),
			title: None,
			mode,
			is_think_response: mode == Mode::Think,
			is_study_response: mode == Mode::Study,
			error: None,
		}
	}
}

/// Stateless per-request orchestration over an injected provider.
///
/// All conversation state arrives with each call, so invocations are
/// independent and an abandoned caller cannot corrupt anything shared.
pub struct ChatPipeline {
	provider: Arc<dyn ChatProvider>,
	extractor: AttachmentExtractor,
	config: Config,
}

impl ChatPipeline {
	pub fn new(provider: Arc<dyn ChatProvider>, extractor: AttachmentExtractor, config: Config) -> Self {
		Self {
			provider,
			extractor,
			config,
		}
	}

	/// Process one user turn into a result envelope. Total: never throws.
	pub async fn run(&self, input: ChatInput) -> ChatOutput {
		let directive = Directive::parse(&input.message);
		let mode = directive.mode;

		if !mode.is_conversational() {
			// Quiz/PPT turns are one-shot batch generation jobs; hand the
			// classified topic back so the caller can route it there
			let mut output = ChatOutput::for_mode(mode);
			output.response = directive.message;
			return output;
		}

		let attachment_text = if input.files.is_empty() {
			String::new()
		} else {
			self.extractor.extract_all(&input.files).await
		};

		let is_new_conversation = input.chat_history.is_empty();
		let structured = mode == Mode::Study || is_new_conversation;

		let turns = context::assemble(
			mode,
			&input.chat_history,
			&directive.message,
			&attachment_text,
			is_new_conversation,
		);

		let request = CompletionRequest {
			messages: context::transmissible(turns),
			model: self.config.model.clone(),
			temperature: self.config.temperature,
			max_tokens: self.config.max_tokens,
			top_p: self.config.top_p,
			json_mode: structured,
			stream: self.config.stream,
		};

		log_debug!(
			"Sending {} turns to {} (mode: {}, json: {})",
			request.messages.len(),
			self.provider.name(),
			mode.as_str(),
			structured
		);

		match self.provider.chat_completion(&request).await {
			Ok(reply) => {
				let decoded = decoder::decode_reply(&reply.content, mode, structured);
				let mut output = ChatOutput::for_mode(mode);
				output.response = decoded.response;
				output.title = decoded.title;
				output
			}
			Err(err) => self.error_output(mode, err),
		}
	}

	fn error_output(&self, mode: Mode, err: ProviderError) -> ChatOutput {
		log_error!("Provider call failed: {}", err);

		let mut output = ChatOutput::for_mode(mode);
		output.response = if err.is_configuration() {
			CONFIGURATION_ERROR_RESPONSE.to_string()
		} else {
			format!("Error: {}", err)
		};
		output.error = Some(err.to_string());
		output
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::providers::CompletionReply;
	use crate::session::attachments::{OcrClient, PdfTextExtractor};
	use crate::session::Role;
	use anyhow::Result;
	use std::sync::Mutex;

	enum FakeOutcome {
		Content(String),
		ApiError(u16, String),
		MissingKey,
	}

	struct FakeProvider {
		outcome: FakeOutcome,
		calls: Mutex<Vec<CompletionRequest>>,
	}

	impl FakeProvider {
		fn new(outcome: FakeOutcome) -> Arc<Self> {
			Arc::new(Self {
				outcome,
				calls: Mutex::new(Vec::new()),
			})
		}

		fn calls(&self) -> Vec<CompletionRequest> {
			self.calls.lock().unwrap().clone()
		}
	}

	#[async_trait::async_trait]
	impl ChatProvider for FakeProvider {
		fn name(&self) -> &str {
			"fake"
		}

		async fn chat_completion(
			&self,
			request: &CompletionRequest,
		) -> Result<CompletionReply, ProviderError> {
			self.calls.lock().unwrap().push(request.clone());
			match &self.outcome {
				FakeOutcome::Content(content) => Ok(CompletionReply {
					content: content.clone(),
					usage: None,
					finish_reason: Some("stop".to_string()),
				}),
				FakeOutcome::ApiError(status, message) => Err(ProviderError::Api {
					status: *status,
					message: message.clone(),
				}),
				FakeOutcome::MissingKey => Err(ProviderError::MissingApiKey("GROQ_API_KEY")),
			}
		}
	}

	struct NullOcr;

	#[async_trait::async_trait]
	impl OcrClient for NullOcr {
		async fn extract_text(&self, _mime_type: &str, _image_base64: &str) -> Result<String> {
			Ok("ocr text".to_string())
		}
	}

	struct NullPdf;

	impl PdfTextExtractor for NullPdf {
		fn extract_text(&self, _data: &[u8]) -> Result<String> {
			Ok("pdf text".to_string())
		}
	}

	fn pipeline(provider: Arc<FakeProvider>) -> ChatPipeline {
		let extractor = AttachmentExtractor::new(Arc::new(NullOcr), Arc::new(NullPdf));
		ChatPipeline::new(provider, extractor, Config::default())
	}

	#[tokio::test]
	async fn test_new_conversation_returns_titled_envelope() {
		let provider = FakeProvider::new(FakeOutcome::Content(
			r#"{"title":"Greeting Chat","response":"Hi there!"}"#.to_string(),
		));
		let output = pipeline(provider.clone()).run(ChatInput::new("Hello")).await;

		assert_eq!(output.response, "Hi there!");
		assert_eq!(output.title.as_deref(), Some("Greeting Chat"));
		assert_eq!(output.mode, Mode::Standard);
		assert!(output.error.is_none());

		// One system turn plus one user turn, structured output requested
		let calls = provider.calls();
		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].messages.len(), 2);
		assert_eq!(calls[0].messages[0].role, Role::System);
		assert_eq!(calls[0].messages[1].content, "Hello");
		assert!(calls[0].json_mode);
		assert_eq!(calls[0].model, "llama-3.1-8b-instant");
	}

	#[tokio::test]
	async fn test_quiz_directive_bypasses_provider() {
		let provider = FakeProvider::new(FakeOutcome::Content("unused".to_string()));
		let output = pipeline(provider.clone())
			.run(ChatInput::new("[Quiz: Binary Trees]"))
			.await;

		assert_eq!(output.mode, Mode::Quiz);
		assert_eq!(output.response, "Binary Trees");
		assert!(provider.calls().is_empty());
	}

	#[tokio::test]
	async fn test_provider_error_becomes_envelope_text() {
		let provider = FakeProvider::new(FakeOutcome::ApiError(
			503,
			"service unavailable".to_string(),
		));
		let output = pipeline(provider).run(ChatInput::new("Hello")).await;

		assert_eq!(output.response, "Error: service unavailable");
		assert_eq!(output.error.as_deref(), Some("service unavailable"));
	}

	#[tokio::test]
	async fn test_missing_key_yields_configuration_message() {
		let provider = FakeProvider::new(FakeOutcome::MissingKey);
		let output = pipeline(provider).run(ChatInput::new("Hello")).await;

		assert_eq!(output.response, CONFIGURATION_ERROR_RESPONSE);
		assert!(output.error.is_some());
	}

	#[tokio::test]
	async fn test_continuation_is_plain_text() {
		let provider = FakeProvider::new(FakeOutcome::Content("A plain answer.".to_string()));
		let mut input = ChatInput::new("and then?");
		input.chat_history = vec![Turn::user("Hello"), Turn::assistant("Hi there!")];
		let output = pipeline(provider.clone()).run(input).await;

		assert_eq!(output.response, "A plain answer.");
		assert_eq!(output.title, None);

		let calls = provider.calls();
		assert!(!calls[0].json_mode);
		// system + two history turns + current turn
		assert_eq!(calls[0].messages.len(), 4);
	}

	#[tokio::test]
	async fn test_empty_history_turns_filtered_before_transmission() {
		let provider = FakeProvider::new(FakeOutcome::Content("ok".to_string()));
		let mut input = ChatInput::new("and then?");
		input.chat_history = vec![
			Turn::user("Hello"),
			Turn::assistant(""),
			Turn::assistant("Hi there!"),
		];
		pipeline(provider.clone()).run(input).await;

		let calls = provider.calls();
		assert_eq!(calls[0].messages.len(), 4);
		assert!(calls[0].messages.iter().all(|turn| !turn.content.is_empty()));
	}

	#[tokio::test]
	async fn test_study_mode_always_structured() {
		let provider = FakeProvider::new(FakeOutcome::Content(
			"Sure! {\"detailed_answer\": \"X\"} Let me know more.".to_string(),
		));
		let mut input = ChatInput::new("[Study: Photosynthesis]");
		input.chat_history = vec![Turn::user("earlier"), Turn::assistant("turn")];
		let output = pipeline(provider.clone()).run(input).await;

		assert!(output.is_study_response);
		assert_eq!(output.response, "{\"detailed_answer\": \"X\"}");

		let calls = provider.calls();
		assert!(calls[0].json_mode, "study requests JSON even mid-conversation");
		let user_turn = calls[0].messages.last().unwrap();
		assert!(user_turn.content.contains("Photosynthesis"));
		assert!(user_turn.content.contains("\"detailed_answer\""));
	}

	#[tokio::test]
	async fn test_think_mode_sets_flag() {
		let provider = FakeProvider::new(FakeOutcome::Content(
			r#"{"title":"Sorting","response":"Step by step..."}"#.to_string(),
		));
		let output = pipeline(provider)
			.run(ChatInput::new("[Think: Explain quicksort]"))
			.await;

		assert!(output.is_think_response);
		assert!(!output.is_study_response);
		assert_eq!(output.response, "Step by step...");
	}

	#[tokio::test]
	async fn test_empty_reply_yields_fallback_not_error() {
		let provider = FakeProvider::new(FakeOutcome::Content(String::new()));
		let output = pipeline(provider).run(ChatInput::new("Hello")).await;

		assert_eq!(output.response, decoder::FALLBACK_RESPONSE);
		assert!(output.error.is_none());
	}

	#[tokio::test]
	async fn test_attachment_text_reaches_user_turn() {
		use base64::{engine::general_purpose, Engine as _};

		let provider = FakeProvider::new(FakeOutcome::Content("ok".to_string()));
		let mut input = ChatInput::new("summarize this");
		input.files = vec![Attachment::new(
			"notes.txt",
			"text/plain",
			general_purpose::STANDARD.encode("attachment body"),
		)];
		pipeline(provider.clone()).run(input).await;

		let calls = provider.calls();
		let user_turn = calls[0].messages.last().unwrap();
		assert!(user_turn.content.starts_with("summarize this"));
		assert!(user_turn.content.contains("attachment body"));
	}
}
