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

// Reply decoding: turns the raw model output into {response, title}

use super::mode::Mode;
use super::DEFAULT_TITLE;
use lazy_static::lazy_static;
use regex::Regex;

/// Shown when the model produced no text at all
pub const FALLBACK_RESPONSE: &str = "Sorry, I could not generate a response.";

/// Shown when study mode expected JSON but none could be located
pub const STUDY_FALLBACK_RESPONSE: &str =
	"Sorry, I could not generate structured study notes for this request.";

/// Decoded reply: the user-facing answer plus an optional generated title
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
	pub response: String,
	pub title: Option<String>,
}

lazy_static! {
	static ref FENCE_OPEN: Regex = Regex::new(r"^```(?:json)?\s*").unwrap();
	static ref FENCE_CLOSE: Regex = Regex::new(r"\s*```$").unwrap();
}

/// Strip a surrounding fenced code block (```json ... ``` or ``` ... ```)
/// if present. Unfenced input comes back trimmed but otherwise unchanged.
pub fn strip_code_fence(raw: &str) -> String {
	let trimmed = raw.trim();
	if !trimmed.starts_with("```") {
		return trimmed.to_string();
	}
	let without_open = FENCE_OPEN.replace(trimmed, "");
	FENCE_CLOSE.replace(&without_open, "").trim().to_string()
}

/// Decode the accumulated reply for the active mode.
///
/// `structured` is whether a JSON object was requested for this turn. Every
/// branch has a defined fallback so a formatting slip from the model never
/// loses the turn; the returned response is never empty.
pub fn decode_reply(raw: &str, mode: Mode, structured: bool) -> Decoded {
	if raw.is_empty() {
		return Decoded {
			response: FALLBACK_RESPONSE.to_string(),
			title: None,
		};
	}

	if !structured {
		return Decoded {
			response: raw.to_string(),
			title: None,
		};
	}

	match mode {
		Mode::Study => decode_study(raw),
		_ => decode_titled(raw),
	}
}

// Standard/think first-turn replies carry a {"title", "response"} envelope
fn decode_titled(raw: &str) -> Decoded {
	let unwrapped = strip_code_fence(raw);

	match serde_json::from_str::<serde_json::Value>(&unwrapped) {
		Ok(serde_json::Value::Object(fields)) => Decoded {
			response: fields
				.get("response")
				.and_then(|v| v.as_str())
				.unwrap_or(FALLBACK_RESPONSE)
				.to_string(),
			title: Some(
				fields
					.get("title")
					.and_then(|v| v.as_str())
					.unwrap_or(DEFAULT_TITLE)
					.to_string(),
			),
		},
		// Title extraction failed; keep the whole text as the answer
		_ => Decoded {
			response: if unwrapped.is_empty() {
				FALLBACK_RESPONSE.to_string()
			} else {
				unwrapped
			},
			title: Some(DEFAULT_TITLE.to_string()),
		},
	}
}

// Study replies may carry commentary around the JSON even in json mode;
// slice from the first '{' to the last '}' instead of trusting the fencing
fn decode_study(raw: &str) -> Decoded {
	let unwrapped = strip_code_fence(raw);

	match (unwrapped.find('{'), unwrapped.rfind('}')) {
		(Some(start), Some(end)) if start < end => Decoded {
			response: unwrapped[start..=end].to_string(),
			title: None,
		},
		_ => Decoded {
			response: STUDY_FALLBACK_RESPONSE.to_string(),
			title: None,
		},
	}
}
