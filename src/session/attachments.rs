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

// Attachment extraction: turns uploaded files into plain text model context

use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// File attachment for a single request. Ephemeral: consumed during context
/// assembly, never persisted by the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Attachment {
	pub name: String,
	pub mime_type: String,
	/// Base64 data, with or without a leading `data:<mime>;base64,` prefix
	pub payload: String,
}

impl Attachment {
	pub fn new(
		name: impl Into<String>,
		mime_type: impl Into<String>,
		payload: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			mime_type: mime_type.into(),
			payload: payload.into(),
		}
	}

	/// Load a file from disk, guessing the mime type from its extension
	pub fn from_path(path: &Path) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		let name = path
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or("attachment")
			.to_string();
		let mime_type = guess_mime_type(path);

		Ok(Self {
			name,
			mime_type,
			payload: general_purpose::STANDARD.encode(&bytes),
		})
	}
}

/// OCR collaborator: extracts text from a base64 image
#[async_trait::async_trait]
pub trait OcrClient: Send + Sync {
	async fn extract_text(&self, mime_type: &str, image_base64: &str) -> Result<String>;
}

/// PDF text collaborator: extracts plain text from a PDF buffer
pub trait PdfTextExtractor: Send + Sync {
	fn extract_text(&self, data: &[u8]) -> Result<String>;
}

/// Extracts text from a batch of attachments.
///
/// Files are handled independently: a failure is recorded inline as a marker
/// for that file only and never aborts the batch. The output block preserves
/// the input order.
pub struct AttachmentExtractor {
	ocr: Arc<dyn OcrClient>,
	pdf: Arc<dyn PdfTextExtractor>,
}

impl AttachmentExtractor {
	pub fn new(ocr: Arc<dyn OcrClient>, pdf: Arc<dyn PdfTextExtractor>) -> Self {
		Self { ocr, pdf }
	}

	/// Produce one appended text block describing each file's content
	pub async fn extract_all(&self, files: &[Attachment]) -> String {
		let mut block = String::new();
		for file in files {
			block.push_str(&self.extract_one(file).await);
		}
		block
	}

	async fn extract_one(&self, file: &Attachment) -> String {
		if file.mime_type.starts_with("image/") {
			match self
				.ocr
				.extract_text(&file.mime_type, strip_data_url(&file.payload))
				.await
			{
				Ok(text) => format!("\n\n[Text extracted from image {}]:\n{}", file.name, text),
				Err(e) => format!("\n\n[Error analyzing image {}: {}]", file.name, e),
			}
		} else if file.mime_type == "application/pdf" {
			let extracted = decode_payload(&file.payload)
				.and_then(|bytes| self.pdf.extract_text(&bytes));
			match extracted {
				Ok(text) => format!("\n\n[Text extracted from PDF {}]:\n{}", file.name, text),
				Err(e) => format!("\n\n[Error extracting text from PDF {}: {}]", file.name, e),
			}
		} else if is_text_attachment(&file.mime_type, &file.name) {
			let decoded = decode_payload(&file.payload)
				.and_then(|bytes| Ok(String::from_utf8(bytes)?));
			match decoded {
				Ok(text) => format!("\n\n[Content of file {}]:\n{}", file.name, text),
				Err(e) => format!("\n\n[Error reading file {}: {}]", file.name, e),
			}
		} else {
			format!(
				"\n\n[Attachment {} ({}) is not a text document and was not analyzed]",
				file.name, file.mime_type
			)
		}
	}
}

// Strip a data-URL scheme prefix, leaving the bare base64 payload
fn strip_data_url(payload: &str) -> &str {
	if payload.starts_with("data:") {
		payload
			.split_once(";base64,")
			.map(|(_, rest)| rest)
			.unwrap_or(payload)
	} else {
		payload
	}
}

fn decode_payload(payload: &str) -> Result<Vec<u8>> {
	Ok(general_purpose::STANDARD.decode(strip_data_url(payload).trim())?)
}

// Source-file extensions treated as text even without a text/* mime type
const SOURCE_EXTENSIONS: &[&str] = &[
	"rs", "py", "js", "jsx", "ts", "tsx", "json", "md", "toml", "yaml", "yml", "c", "cc", "cpp",
	"h", "hpp", "java", "kt", "go", "rb", "php", "sh", "bash", "html", "css", "sql", "xml", "csv",
	"txt", "log",
];

fn is_text_attachment(mime_type: &str, name: &str) -> bool {
	if mime_type.starts_with("text/") {
		return true;
	}
	if let Some(ext) = name.split('.').next_back() {
		SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
	} else {
		false
	}
}

/// Guess a mime type from the file extension
pub fn guess_mime_type(path: &Path) -> String {
	let ext = path
		.extension()
		.and_then(|ext| ext.to_str())
		.unwrap_or("")
		.to_lowercase();

	match ext.as_str() {
		"png" => "image/png",
		"jpg" | "jpeg" => "image/jpeg",
		"gif" => "image/gif",
		"webp" => "image/webp",
		"bmp" => "image/bmp",
		"pdf" => "application/pdf",
		"html" => "text/html",
		"css" => "text/css",
		"csv" => "text/csv",
		"md" | "txt" | "log" => "text/plain",
		ext if SOURCE_EXTENSIONS.contains(&ext) => "text/plain",
		_ => "application/octet-stream",
	}
	.to_string()
}
