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

// Slide-deck generation

use crate::config::Config;
use crate::providers::ChatProvider;
use crate::session::decoder::strip_code_fence;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Slide {
	pub title: String,
	#[serde(default)]
	pub points: Vec<String>,
	/// Search term for a related stock image
	#[serde(rename = "imageKeyword", default)]
	pub image_keyword: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SlideDeck {
	pub title: String,
	pub slides: Vec<Slide>,
}

fn slides_prompt(topic: &str) -> String {
	format!(
		r#"Create a highly detailed 10-slide presentation about "{topic}".
Make each slide comprehensive with 5-6 substantial, descriptive points.
For each slide, also provide a short, descriptive keyword or phrase to search for a related stock image (e.g., "modern office building", "abstract technology network").
Return a JSON object exactly like this, no additional text, markdown formatting or explanations:
{{
  "title": "Presentation Title",
  "slides": [
    {{
      "title": "Slide Title",
      "points": ["Detailed point 1...", "Detailed point 2...", "Detailed point 3...", "Detailed point 4..."],
      "imageKeyword": "relevant image search term"
    }}
  ]
}}"#
	)
}

/// Generate a slide deck on a topic
pub async fn generate_slides(
	provider: &dyn ChatProvider,
	config: &Config,
	topic: &str,
) -> Result<SlideDeck> {
	if topic.trim().is_empty() {
		return Err(anyhow::anyhow!("Topic is required"));
	}

	let content = super::one_shot_completion(
		provider,
		config,
		"You are a presentation expert. Always respond with valid JSON.",
		&slides_prompt(topic),
		0.7,
	)
	.await?;

	parse_slide_deck(topic, &content)
}

// The model does not always honor the envelope exactly: the slide array may
// arrive under "slides", as a bare array, or under some other key
fn parse_slide_deck(topic: &str, content: &str) -> Result<SlideDeck> {
	let value: serde_json::Value =
		serde_json::from_str(&strip_code_fence(content)).context("Invalid JSON from the model")?;

	let slides_value = if value.get("slides").map_or(false, |s| s.is_array()) {
		value["slides"].clone()
	} else if value.is_array() {
		value.clone()
	} else {
		value
			.as_object()
			.and_then(|obj| obj.values().find(|v| v.is_array()))
			.cloned()
			.ok_or_else(|| {
				anyhow::anyhow!("Could not find an array of slides in the model response")
			})?
	};

	let slides: Vec<Slide> =
		serde_json::from_value(slides_value).context("Slide array has an unexpected shape")?;

	let title = value
		.get("title")
		.and_then(|t| t.as_str())
		.map(|t| t.to_string())
		.unwrap_or_else(|| format!("{} Presentation", topic));

	Ok(SlideDeck { title, slides })
}

#[cfg(test)]
mod tests {
	use super::*;

	const SLIDE: &str = r#"{"title": "Intro", "points": ["a", "b"], "imageKeyword": "ocean"}"#;

	#[test]
	fn test_parse_with_slides_key() {
		let content = format!(r#"{{"title": "Oceans", "slides": [{}]}}"#, SLIDE);
		let deck = parse_slide_deck("Oceans", &content).unwrap();
		assert_eq!(deck.title, "Oceans");
		assert_eq!(deck.slides.len(), 1);
		assert_eq!(deck.slides[0].image_keyword, "ocean");
	}

	#[test]
	fn test_parse_bare_array_falls_back_to_topic_title() {
		let content = format!("[{}]", SLIDE);
		let deck = parse_slide_deck("Oceans", &content).unwrap();
		assert_eq!(deck.title, "Oceans Presentation");
		assert_eq!(deck.slides.len(), 1);
	}

	#[test]
	fn test_parse_recovers_array_under_other_key() {
		let content = format!(r#"{{"deck": [{}]}}"#, SLIDE);
		let deck = parse_slide_deck("Oceans", &content).unwrap();
		assert_eq!(deck.slides[0].title, "Intro");
	}

	#[test]
	fn test_parse_fenced_content() {
		let content = format!("```json\n{{\"title\": \"Oceans\", \"slides\": [{}]}}\n```", SLIDE);
		let deck = parse_slide_deck("Oceans", &content).unwrap();
		assert_eq!(deck.slides.len(), 1);
	}

	#[test]
	fn test_parse_without_any_array_is_an_error() {
		assert!(parse_slide_deck("Oceans", r#"{"title": "no slides"}"#).is_err());
	}
}
