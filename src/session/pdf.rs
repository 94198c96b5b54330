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

// PDF text collaborator backed by pdf-extract

use super::attachments::PdfTextExtractor;
use anyhow::Result;

/// Extracts plain text from PDF buffers in-process
pub struct PdfTextReader;

impl PdfTextExtractor for PdfTextReader {
	fn extract_text(&self, data: &[u8]) -> Result<String> {
		let text = pdf_extract::extract_text_from_mem(data)?;
		Ok(text.trim().to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_garbage_buffer_is_an_error() {
		let result = PdfTextReader.extract_text(b"not a pdf at all");
		assert!(result.is_err());
	}
}
