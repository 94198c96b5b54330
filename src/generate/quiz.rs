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

// Multiple-choice quiz generation

use crate::config::Config;
use crate::providers::ChatProvider;
use crate::session::decoder::strip_code_fence;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizQuestion {
	pub id: u32,
	pub question: String,
	pub options: Vec<String>,
	/// Index (0-3) of the correct option
	#[serde(rename = "correctAnswer")]
	pub correct_answer: u32,
	#[serde(default)]
	pub explanation: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Quiz {
	pub questions: Vec<QuizQuestion>,
}

fn quiz_prompt(topic: &str, count: u32, difficulty: &str) -> String {
	format!(
		r#"You are an expert college-level exam question generator.

Generate {count} multiple choice questions on the topic:
"{topic}"

Difficulty level: {difficulty}

Rules:
- Each question must have exactly 4 options.
- Only one option must be correct.
- Make questions clear and academically accurate.
- Avoid duplicate questions.
- Make options realistic (no obvious wrong answers).
- Ensure questions test conceptual understanding, not simple memorization.

Return ONLY valid JSON in this exact format:

{{
  "questions": [
    {{
      "id": 1,
      "question": "string",
      "options": [
        "option A",
        "option B",
        "option C",
        "option D"
      ],
      "correctAnswer": 0,
      "explanation": "short explanation"
    }}
  ]
}}

Important:
- correctAnswer must be the index (0-3).
- Do NOT include markdown.
- Do NOT include explanation outside JSON.
- Do NOT include extra text."#
	)
}

/// Generate a multiple-choice quiz on a topic
pub async fn generate_quiz(
	provider: &dyn ChatProvider,
	config: &Config,
	topic: &str,
	count: u32,
	difficulty: &str,
) -> Result<Quiz> {
	if topic.trim().is_empty() {
		return Err(anyhow::anyhow!("Topic is required"));
	}

	let content = super::one_shot_completion(
		provider,
		config,
		"You generate exam questions in strict JSON.",
		&quiz_prompt(topic, count, difficulty),
		0.6,
	)
	.await?;

	parse_quiz(&content)
}

fn parse_quiz(content: &str) -> Result<Quiz> {
	serde_json::from_str(&strip_code_fence(content)).context("Invalid JSON from the model")
}
