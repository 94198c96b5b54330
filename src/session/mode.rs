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

// Behavioral mode classification from the raw user message

use serde::{Deserialize, Serialize};

/// The behavioral variant selected for a single request
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	#[serde(rename = "standard")]
	Standard,
	#[serde(rename = "think")]
	Think,
	#[serde(rename = "study")]
	Study,
	#[serde(rename = "ppt")]
	Ppt,
	#[serde(rename = "quiz")]
	Quiz,
}

impl Default for Mode {
	fn default() -> Self {
		Self::Standard
	}
}

impl Mode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Mode::Standard => "standard",
			Mode::Think => "think",
			Mode::Study => "study",
			Mode::Ppt => "ppt",
			Mode::Quiz => "quiz",
		}
	}

	/// Ppt and Quiz are one-shot batch generation jobs; the rest run through
	/// the conversational completion pipeline
	pub fn is_conversational(&self) -> bool {
		matches!(self, Mode::Standard | Mode::Think | Mode::Study)
	}
}

// Recognized directive tags, case-sensitive
const DIRECTIVE_TAGS: &[(&str, Mode)] = &[
	("Think", Mode::Think),
	("Study", Mode::Study),
	("Quiz", Mode::Quiz),
	("PPT", Mode::Ppt),
];

/// The result of classifying a raw message: the active mode plus the
/// user-visible message with any directive wrapper removed.
///
/// Directives look like `[Think: how does TCP work?]`. The tag set is closed
/// and matched exactly; anything else - including messages that merely start
/// with `[` - stays in standard mode with the message untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
	pub mode: Mode,
	pub message: String,
}

impl Directive {
	/// Classify a raw message. Parsed once per request; the rest of the
	/// pipeline dispatches on the returned enum, never on the raw string.
	pub fn parse(raw: &str) -> Self {
		for (tag, mode) in DIRECTIVE_TAGS {
			let prefix = format!("[{}: ", tag);
			if let Some(rest) = raw.strip_prefix(prefix.as_str()) {
				if let Some(end) = rest.rfind(']') {
					return Self {
						mode: *mode,
						message: rest[..end].to_string(),
					};
				}
			}
		}

		Self {
			mode: Mode::Standard,
			message: raw.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_recognized_tags_round_trip() {
		let cases = [
			("[Think: How do neural networks learn?]", Mode::Think, "How do neural networks learn?"),
			("[Study: Photosynthesis]", Mode::Study, "Photosynthesis"),
			("[Quiz: Binary Trees]", Mode::Quiz, "Binary Trees"),
			("[PPT: Climate Change]", Mode::Ppt, "Climate Change"),
		];

		for (raw, mode, message) in cases {
			let directive = Directive::parse(raw);
			assert_eq!(directive.mode, mode, "raw: {}", raw);
			assert_eq!(directive.message, message, "raw: {}", raw);
		}
	}

	#[test]
	fn test_plain_message_is_standard() {
		let directive = Directive::parse("Hello there");
		assert_eq!(directive.mode, Mode::Standard);
		assert_eq!(directive.message, "Hello there");
	}

	#[test]
	fn test_leading_bracket_without_known_tag() {
		for raw in [
			"[note: remember this]",
			"[Thinking: out loud]",
			"[think: lowercase tag]",
			"[Think:no space]",
			"[Just brackets]",
			"[",
		] {
			let directive = Directive::parse(raw);
			assert_eq!(directive.mode, Mode::Standard, "raw: {}", raw);
			assert_eq!(directive.message, raw, "raw: {}", raw);
		}
	}

	#[test]
	fn test_unterminated_directive_is_standard() {
		let directive = Directive::parse("[Think: no closing bracket");
		assert_eq!(directive.mode, Mode::Standard);
		assert_eq!(directive.message, "[Think: no closing bracket");
	}

	#[test]
	fn test_payload_may_contain_brackets() {
		let directive = Directive::parse("[Think: how do [T; N] arrays work?]");
		assert_eq!(directive.mode, Mode::Think);
		assert_eq!(directive.message, "how do [T; N] arrays work?");
	}

	#[test]
	fn test_batch_modes_are_not_conversational() {
		assert!(Mode::Standard.is_conversational());
		assert!(Mode::Think.is_conversational());
		assert!(Mode::Study.is_conversational());
		assert!(!Mode::Ppt.is_conversational());
		assert!(!Mode::Quiz.is_conversational());
	}
}
