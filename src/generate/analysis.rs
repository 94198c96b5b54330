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

// Quiz score analysis: tutoring feedback on a finished quiz

use crate::config::Config;
use crate::providers::ChatProvider;
use crate::session::decoder::strip_code_fence;
use crate::log_debug;
use anyhow::Result;

fn analysis_prompt(topic: &str, score: u32, total: u32) -> String {
	format!(
		r#"Student scored {score}/{total} in quiz on "{topic}".

Analyze performance and suggest:
- Weak areas based on the result
- Study tips specific to this topic
- Next difficulty level recommendation
Return short, highly encouraging, and structured advice for the student.
Ensure the response is a JSON object with an "analysis" field."#
	)
}

/// Analyze a quiz result. Degrades to a fixed encouraging message on any
/// failure; a broken analysis call never surfaces as an error.
pub async fn analyze_quiz(
	provider: &dyn ChatProvider,
	config: &Config,
	topic: &str,
	score: u32,
	total: u32,
) -> String {
	match try_analyze(provider, config, topic, score, total).await {
		Ok(analysis) => analysis,
		Err(e) => {
			log_debug!("Quiz analysis failed: {}", e);
			format!("Great attempt! Keep studying to master {}.", topic)
		}
	}
}

async fn try_analyze(
	provider: &dyn ChatProvider,
	config: &Config,
	topic: &str,
	score: u32,
	total: u32,
) -> Result<String> {
	let content = super::one_shot_completion(
		provider,
		config,
		"You are an intelligent tutor providing feedback.",
		&analysis_prompt(topic, score, total),
		0.7,
	)
	.await?;

	let value: serde_json::Value = serde_json::from_str(&strip_code_fence(&content))?;
	value
		.get("analysis")
		.and_then(|a| a.as_str())
		.map(|a| a.to_string())
		.ok_or_else(|| anyhow::anyhow!("Model reply is missing the analysis field"))
}
