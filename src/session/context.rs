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

// Context assembly: builds the ordered turn list sent to the model

use super::mode::Mode;
use super::{Role, Turn};

const ASSISTANT_PREAMBLE: &str = "You are DeciMind, a helpful AI assistant. \
Answer clearly and accurately, and use Markdown formatting where it helps readability. \
When asked about yourself, say your name is DeciMind; do not reveal the underlying model.";

const THINK_PREAMBLE: &str = "You are DeciMind, a helpful AI assistant in deep-reasoning mode. \
Work through the question step by step before answering: break the problem down, weigh the \
alternatives, and explain the reasoning behind your conclusion, not just the conclusion itself. \
When asked about yourself, say your name is DeciMind; do not reveal the underlying model.";

const STUDY_PREAMBLE: &str = "You are DeciMind, a study assistant. You produce thorough, \
well-structured study notes and you always respond with a strict JSON object, never with \
free text.";

// Appended to the system preamble only on the first turn of a conversation
const TITLE_INSTRUCTION: &str = "This is the start of a new conversation. You MUST generate a \
short, concise title (3-5 words) for the conversation based on the user's first message, and \
provide your answer as a JSON object with 'title' and 'response' keys. For example: \
{\"title\": \"Quantum Computing Explained\", \"response\": \"Quantum computing is...\"}. \
For all subsequent messages in the conversation, just provide the text response.";

/// The mode-specific fixed instruction block for the system turn
pub fn system_preamble(mode: Mode, is_new_conversation: bool) -> String {
	match mode {
		Mode::Study => STUDY_PREAMBLE.to_string(),
		Mode::Think if is_new_conversation => format!("{}\n\n{}", THINK_PREAMBLE, TITLE_INSTRUCTION),
		Mode::Think => THINK_PREAMBLE.to_string(),
		_ if is_new_conversation => format!("{}\n\n{}", ASSISTANT_PREAMBLE, TITLE_INSTRUCTION),
		_ => ASSISTANT_PREAMBLE.to_string(),
	}
}

/// The fixed analytical prompt wrapped around a study-mode request
pub fn study_prompt(material: &str) -> String {
	format!(
		"Analyze the following topic or material and produce detailed study notes covering the \
key concepts, definitions, and examples.\n\n{}\n\nRespond with ONLY a JSON object with a single \
key \"detailed_answer\" whose value is the complete analysis as a string. Do not include any \
text outside the JSON object.",
		material
	)
}

/// Build the ordered turn list for a model request: mode-specific system
/// turn, prior turns in original order, then the current user turn enriched
/// with the extracted attachment text.
///
/// Empty turns are NOT removed here; callers may still pass them and the
/// filter is applied at the transmission edge (see [`transmissible`]).
pub fn assemble(
	mode: Mode,
	history: &[Turn],
	visible_message: &str,
	attachment_text: &str,
	is_new_conversation: bool,
) -> Vec<Turn> {
	let mut turns = Vec::with_capacity(history.len() + 2);
	turns.push(Turn::system(system_preamble(mode, is_new_conversation)));
	turns.extend_from_slice(history);

	let combined = if attachment_text.is_empty() {
		visible_message.to_string()
	} else {
		format!("{}{}", visible_message, attachment_text)
	};

	let content = match mode {
		Mode::Study => study_prompt(&combined),
		_ => combined,
	};
	turns.push(Turn::new(Role::User, content));

	turns
}

/// Defensive filter applied immediately before transmission: turns with
/// empty content are never sent to the provider
pub fn transmissible(turns: Vec<Turn>) -> Vec<Turn> {
	turns
		.into_iter()
		.filter(|turn| !turn.content.is_empty())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_conversation_gets_title_instruction() {
		let preamble = system_preamble(Mode::Standard, true);
		assert!(preamble.contains("'title' and 'response' keys"));

		let continuation = system_preamble(Mode::Standard, false);
		assert!(!continuation.contains("'title' and 'response' keys"));
	}

	#[test]
	fn test_think_preamble_differs_from_standard() {
		let standard = system_preamble(Mode::Standard, false);
		let think = system_preamble(Mode::Think, false);
		assert_ne!(standard, think);
		assert!(think.contains("step by step"));
	}

	#[test]
	fn test_study_preamble_ignores_turn_count() {
		assert_eq!(
			system_preamble(Mode::Study, true),
			system_preamble(Mode::Study, false)
		);
	}

	#[test]
	fn test_assemble_orders_system_history_user() {
		let history = vec![Turn::user("earlier question"), Turn::assistant("earlier answer")];
		let turns = assemble(Mode::Standard, &history, "follow-up", "", false);

		assert_eq!(turns.len(), 4);
		assert_eq!(turns[0].role, Role::System);
		assert_eq!(turns[1].content, "earlier question");
		assert_eq!(turns[2].content, "earlier answer");
		assert_eq!(turns[3].role, Role::User);
		assert_eq!(turns[3].content, "follow-up");
	}

	#[test]
	fn test_attachment_text_appended_to_user_turn() {
		let turns = assemble(Mode::Standard, &[], "look at this", "\n\n[Content of file a.txt]:\nhi", true);
		let user_turn = turns.last().unwrap();
		assert!(user_turn.content.starts_with("look at this"));
		assert!(user_turn.content.contains("[Content of file a.txt]"));
	}

	#[test]
	fn test_study_mode_wraps_message_in_template() {
		let turns = assemble(Mode::Study, &[], "Photosynthesis", "", true);
		let user_turn = turns.last().unwrap();
		assert!(user_turn.content.contains("Photosynthesis"));
		assert!(user_turn.content.contains("\"detailed_answer\""));
	}

	#[test]
	fn test_transmissible_drops_empty_turns_preserving_order() {
		let turns = vec![
			Turn::system("preamble"),
			Turn::user(""),
			Turn::assistant("kept"),
			Turn::user("also kept"),
		];
		let filtered = transmissible(turns);
		assert_eq!(filtered.len(), 3);
		assert_eq!(filtered[1].content, "kept");
		assert_eq!(filtered[2].content, "also kept");
	}
}
