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

// One-shot batch generators: quiz, slide deck and score analysis.
//
// These share the assemble-prompt -> invoke -> parse-structured-JSON shape
// of the chat pipeline but run over a single prompt template with no
// conversation history, always on the generator model.

use crate::config::Config;
use crate::providers::{ChatProvider, CompletionRequest};
use crate::session::Turn;
use anyhow::Result;

pub mod analysis;
pub mod quiz;
pub mod slides;

pub use analysis::analyze_quiz;
pub use quiz::{generate_quiz, Quiz, QuizQuestion};
pub use slides::{generate_slides, Slide, SlideDeck};

/// Run a single strict-JSON completion on the generator model
pub(crate) async fn one_shot_completion(
	provider: &dyn ChatProvider,
	config: &Config,
	system: &str,
	prompt: &str,
	temperature: f32,
) -> Result<String> {
	let request = CompletionRequest {
		messages: vec![Turn::system(system), Turn::user(prompt)],
		model: config.generator_model.clone(),
		temperature,
		max_tokens: config.max_tokens,
		top_p: config.top_p,
		json_mode: true,
		stream: false,
	};

	let reply = provider.chat_completion(&request).await?;
	Ok(reply.content)
}
