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

// Batch generation commands (quiz and slide deck)

use anyhow::Result;
use clap::Args;

use decimind::config::Config;
use decimind::generate;
use decimind::providers::ChatProvider;

#[derive(Args, Debug)]
pub struct QuizArgs {
	/// Topic to generate questions for
	pub topic: String,

	/// Number of questions to generate
	#[arg(long, default_value = "5")]
	pub count: u32,

	/// Difficulty: easy, medium or hard
	#[arg(long, default_value = "medium")]
	pub difficulty: String,
}

#[derive(Args, Debug)]
pub struct PptArgs {
	/// Topic of the presentation
	pub topic: String,
}

pub async fn run_quiz(
	provider: &dyn ChatProvider,
	config: &Config,
	topic: &str,
	count: u32,
	difficulty: &str,
) -> Result<()> {
	let quiz = generate::generate_quiz(provider, config, topic, count, difficulty).await?;
	println!("{}", serde_json::to_string_pretty(&quiz)?);
	Ok(())
}

pub async fn run_ppt(provider: &dyn ChatProvider, config: &Config, topic: &str) -> Result<()> {
	let deck = generate::generate_slides(provider, config, topic).await?;
	println!("{}", serde_json::to_string_pretty(&deck)?);
	Ok(())
}
