// Session module: conversation state, persistence and the chat pipeline

pub mod attachments; // Attachment extraction (images, PDFs, text files)
pub mod context; // Context assembly for the model request
pub mod decoder; // Reply decoding into the result envelope
pub mod mode; // Behavioral mode classification
pub mod ocr; // OCR collaborator client
pub mod pdf; // PDF text collaborator
pub mod pipeline; // Pipeline entry point

pub use attachments::{Attachment, AttachmentExtractor};
pub use decoder::{decode_reply, Decoded};
pub use mode::{Directive, Mode};
pub use pipeline::{ChatInput, ChatOutput, ChatPipeline};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum length of a conversation title derived from the first message
const TITLE_MAX_CHARS: usize = 100;

/// Default title before the first exchange produces one
pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	#[serde(rename = "system")]
	System,
	#[serde(rename = "user")]
	User,
	#[serde(rename = "assistant")]
	Assistant,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::System => "system",
			Role::User => "user",
			Role::Assistant => "assistant",
		}
	}
}

/// One message exchanged in a conversation, tagged with its speaker role
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Turn {
	pub role: Role,
	pub content: String,
	#[serde(default)]
	pub timestamp: u64,
}

fn current_timestamp() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

impl Turn {
	pub fn new(role: Role, content: impl Into<String>) -> Self {
		Self {
			role,
			content: content.into(),
			timestamp: current_timestamp(),
		}
	}

	pub fn system(content: impl Into<String>) -> Self {
		Self::new(Role::System, content)
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self::new(Role::User, content)
	}

	pub fn assistant(content: impl Into<String>) -> Self {
		Self::new(Role::Assistant, content)
	}
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversationInfo {
	pub id: String,
	pub title: String,
	pub created_at: u64,
	pub model: String,
}

/// A persisted conversation: an ordered append-log of turns plus a summary line.
///
/// File format mirrors the session files: the first line is
/// `SUMMARY: <json>` with the conversation info, every following line is one
/// turn as JSON. Appending a turn appends a line; only title changes rewrite
/// the summary line.
#[derive(Debug, Clone)]
pub struct Conversation {
	pub info: ConversationInfo,
	pub turns: Vec<Turn>,
	file: Option<PathBuf>,
}

impl Conversation {
	pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
		Self {
			info: ConversationInfo {
				id: id.into(),
				title: DEFAULT_TITLE.to_string(),
				created_at: current_timestamp(),
				model: model.into(),
			},
			turns: Vec::new(),
			file: None,
		}
	}

	/// Open an existing conversation in `dir` or create a fresh one
	pub fn open_or_create(dir: &Path, id: &str, model: &str) -> Result<Self> {
		let file = dir.join(format!("{}.jsonl", id));
		if file.exists() {
			Self::load(&file)
		} else {
			let mut conversation = Self::new(id, model);
			conversation.file = Some(file);
			conversation.write_all()?;
			Ok(conversation)
		}
	}

	/// Load a conversation from its append-log file
	pub fn load(file: &Path) -> Result<Self> {
		let reader = BufReader::new(File::open(file)?);
		let mut info: Option<ConversationInfo> = None;
		let mut turns = Vec::new();

		for line in reader.lines() {
			let line = line?;
			if let Some(content) = line.strip_prefix("SUMMARY: ") {
				info = Some(serde_json::from_str(content)?);
			} else if !line.is_empty() {
				if let Ok(turn) = serde_json::from_str::<Turn>(&line) {
					turns.push(turn);
				}
			}
		}

		let info = info
			.ok_or_else(|| anyhow::anyhow!("Invalid conversation file: missing summary line"))?;

		Ok(Self {
			info,
			turns,
			file: Some(file.to_path_buf()),
		})
	}

	/// True until the first turn is recorded; gates the structured-output
	/// request and the title instruction in the system preamble
	pub fn is_new(&self) -> bool {
		self.turns.is_empty()
	}

	/// Append a turn to memory and to the log file
	pub fn append_turn(&mut self, role: Role, content: &str) -> Result<()> {
		let turn = Turn::new(role, content);
		if let Some(file) = &self.file {
			let mut f = OpenOptions::new().create(true).append(true).open(file)?;
			writeln!(f, "{}", serde_json::to_string(&turn)?)?;
		}
		self.turns.push(turn);
		Ok(())
	}

	/// Update the title and rewrite the summary line
	pub fn set_title(&mut self, title: &str) -> Result<()> {
		self.info.title = title.to_string();
		self.write_all()
	}

	fn write_all(&self) -> Result<()> {
		let file = match &self.file {
			Some(file) => file,
			None => return Ok(()),
		};
		let tmp = file.with_extension("jsonl.tmp");
		{
			let mut f = File::create(&tmp)?;
			writeln!(f, "SUMMARY: {}", serde_json::to_string(&self.info)?)?;
			for turn in &self.turns {
				writeln!(f, "{}", serde_json::to_string(turn)?)?;
			}
		}
		std::fs::rename(&tmp, file)?;
		Ok(())
	}
}

/// List conversations in `dir`, newest first
pub fn list_conversations(dir: &Path) -> Result<Vec<ConversationInfo>> {
	let mut conversations = Vec::new();

	if !dir.exists() {
		return Ok(conversations);
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() || !path.extension().map_or(false, |ext| ext == "jsonl") {
			continue;
		}
		// Read just the first line to get the summary
		if let Ok(file) = File::open(&path) {
			let reader = BufReader::new(file);
			if let Some(Ok(line)) = reader.lines().next() {
				if let Some(content) = line.strip_prefix("SUMMARY: ") {
					if let Ok(info) = serde_json::from_str::<ConversationInfo>(content) {
						conversations.push(info);
					}
				}
			}
		}
	}

	conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
	Ok(conversations)
}

/// Title for a fresh conversation: prefer the model-generated one, otherwise
/// truncate the user's first visible message
pub fn derive_title(generated: Option<&str>, visible_message: &str) -> String {
	match generated {
		Some(title) if !title.trim().is_empty() => title.to_string(),
		_ => truncate_title(visible_message),
	}
}

fn truncate_title(message: &str) -> String {
	if message.chars().count() <= TITLE_MAX_CHARS {
		message.to_string()
	} else {
		let mut title: String = message.chars().take(TITLE_MAX_CHARS).collect();
		title.push_str("...");
		title
	}
}
