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

// Interactive chat command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

use decimind::config::Config;
use decimind::directories;
use decimind::log_error;
use decimind::providers::{ChatProvider, GroqProvider};
use decimind::session::ocr::OcrSpaceClient;
use decimind::session::pdf::PdfTextReader;
use decimind::session::{
	derive_title, list_conversations, AttachmentExtractor, ChatInput, ChatPipeline, Conversation,
	Directive, Mode, Role,
};

use super::generate::{run_ppt, run_quiz};

#[derive(Args, Debug)]
pub struct ChatArgs {
	/// Name of the conversation to start or resume
	#[arg(long, short, default_value = "default")]
	pub conversation: String,

	/// Use a specific model instead of the one configured in config
	#[arg(long)]
	pub model: Option<String>,

	/// List stored conversations and exit
	#[arg(long)]
	pub list: bool,
}

pub async fn run(args: &ChatArgs, config: &Config) -> Result<()> {
	let mut config = config.clone();
	if let Some(model) = &args.model {
		config.model = model.clone();
	}

	let conversations_dir = directories::get_conversations_dir()?;

	if args.list {
		for info in list_conversations(&conversations_dir)? {
			let when = chrono::DateTime::from_timestamp(info.created_at as i64, 0)
				.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
				.unwrap_or_default();
			println!("{}  {}  {}", when.dimmed(), info.id.bold(), info.title);
		}
		return Ok(());
	}

	let provider: Arc<dyn ChatProvider> = Arc::new(GroqProvider::new(&config)?);
	let extractor = AttachmentExtractor::new(
		Arc::new(OcrSpaceClient::new(&config)?),
		Arc::new(PdfTextReader),
	);
	let pipeline = ChatPipeline::new(provider.clone(), extractor, config.clone());

	let mut conversation =
		Conversation::open_or_create(&conversations_dir, &args.conversation, &config.model)?;
	if !conversation.is_new() {
		println!(
			"{}",
			format!(
				"Resuming '{}' ({} turns)",
				conversation.info.title,
				conversation.turns.len()
			)
			.cyan()
		);
	}

	println!(
		"{}",
		"Message DeciMind (modes: [Think: ...], [Study: ...], [Quiz: ...], [PPT: ...]; /exit to quit)"
			.dimmed()
	);

	let mut rl = DefaultEditor::new()?;
	loop {
		let line = match rl.readline("> ") {
			Ok(line) => line,
			Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
			Err(e) => return Err(e.into()),
		};

		let line = line.trim().to_string();
		if line.is_empty() {
			continue;
		}
		if line == "/exit" || line == "/quit" {
			break;
		}
		let _ = rl.add_history_entry(&line);

		// Quiz/PPT turns are one-shot generation jobs, not conversation turns
		let directive = Directive::parse(&line);
		match directive.mode {
			Mode::Quiz => {
				if let Err(e) =
					run_quiz(provider.as_ref(), &config, &directive.message, 5, "medium").await
				{
					log_error!("Quiz generation failed: {}", e);
				}
				continue;
			}
			Mode::Ppt => {
				if let Err(e) = run_ppt(provider.as_ref(), &config, &directive.message).await {
					log_error!("Presentation generation failed: {}", e);
				}
				continue;
			}
			_ => {}
		}

		let was_new = conversation.is_new();
		let input = ChatInput {
			message: line.clone(),
			chat_history: conversation.turns.clone(),
			files: Vec::new(),
		};
		let output = pipeline.run(input).await;

		conversation.append_turn(Role::User, &directive.message)?;
		conversation.append_turn(Role::Assistant, &output.response)?;

		if was_new {
			let title = derive_title(output.title.as_deref(), &directive.message);
			conversation.set_title(&title)?;
			println!("{}", format!("· {}", title).dimmed());
		}

		println!("{}", output.response);
	}

	Ok(())
}
