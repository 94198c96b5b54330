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

// One-shot ask command

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use decimind::config::Config;
use decimind::providers::{ChatProvider, GroqProvider};
use decimind::session::ocr::OcrSpaceClient;
use decimind::session::pdf::PdfTextReader;
use decimind::session::{
	Attachment, AttachmentExtractor, ChatInput, ChatPipeline, Directive, Mode,
};

use super::generate::{run_ppt, run_quiz};

#[derive(Args, Debug)]
pub struct AskArgs {
	/// Question or message for the assistant
	#[arg(value_name = "MESSAGE")]
	pub message: String,

	/// Attach a file as additional context (can be used multiple times)
	#[arg(short = 'f', long = "file", value_name = "FILE")]
	pub files: Vec<PathBuf>,

	/// Use a specific model instead of the one configured in config
	#[arg(long)]
	pub model: Option<String>,
}

pub async fn run(args: &AskArgs, config: &Config) -> Result<()> {
	let mut config = config.clone();
	if let Some(model) = &args.model {
		config.model = model.clone();
	}

	let provider: Arc<dyn ChatProvider> = Arc::new(GroqProvider::new(&config)?);

	// Quiz/PPT directives route to the batch generators
	let directive = Directive::parse(&args.message);
	match directive.mode {
		Mode::Quiz => return run_quiz(provider.as_ref(), &config, &directive.message, 5, "medium").await,
		Mode::Ppt => return run_ppt(provider.as_ref(), &config, &directive.message).await,
		_ => {}
	}

	let mut files = Vec::new();
	for path in &args.files {
		let attachment = Attachment::from_path(path)
			.context(format!("Failed to read attachment {}", path.display()))?;
		files.push(attachment);
	}

	let extractor = AttachmentExtractor::new(
		Arc::new(OcrSpaceClient::new(&config)?),
		Arc::new(PdfTextReader),
	);
	let pipeline = ChatPipeline::new(provider, extractor, config.clone());

	let input = ChatInput {
		message: args.message.clone(),
		chat_history: Vec::new(),
		files,
	};
	let output = pipeline.run(input).await;

	if let Some(title) = &output.title {
		println!("{}", format!("· {}", title).dimmed());
	}
	println!("{}", output.response);

	Ok(())
}
