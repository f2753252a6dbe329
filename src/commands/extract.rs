// Copyright 2026 Aworawo Contributors
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


use anyhow::{Context, Result};
use std::path::Path;

use crate::transcript::{extract_identifiers, pdf_file_to_text};

/// Print the course identifiers found in a transcript PDF or in plain text
pub fn execute(pdf: Option<&Path>, text: &str) -> Result<()> {
    let source = match pdf {
        Some(path) => pdf_file_to_text(path)
            .with_context(|| format!("Failed to extract text from {}", path.display()))?,
        None => text.to_string(),
    };

    let identifiers = extract_identifiers(&source);
    if identifiers.is_empty() {
        println!("No course codes found");
    } else {
        println!("Found {} courses: {}", identifiers.len(), identifiers.join(", "));
    }

    Ok(())
}
