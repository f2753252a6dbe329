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

//! Course identifiers from free text and transcript PDFs.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::TranscriptError;

/// Department codes recognised in questions and transcripts
pub const DEPARTMENTS: [&str; 8] = ["MATH", "CISC", "ENGL", "PHYS", "CHEM", "BISC", "GEOL", "UNIV"];

static COURSE_ID: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?i)({})\s*([0-9]+)", DEPARTMENTS.join("|"));
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid course id pattern: {}", e))
});

/// Extract course identifiers like `MATH302` from text.
///
/// Matching ignores case and whitespace between the department and the number,
/// which must be exactly three ASCII digits. Order of first appearance is kept and
/// duplicates are dropped. Never fails: text with no identifiers yields nothing.
pub fn extract_identifiers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();

    for caps in COURSE_ID.captures_iter(text) {
        let number = &caps[2];
        let followed_by_digit = text[caps.get(0).map_or(0, |m| m.end())..]
            .chars()
            .next()
            .is_some_and(char::is_numeric);
        if number.len() != 3 || followed_by_digit {
            continue;
        }
        let id = format!("{}{}", caps[1].to_uppercase(), number);
        if seen.insert(id.clone()) {
            identifiers.push(id);
        }
    }

    identifiers
}

/// Pull all text out of an in-memory PDF
pub fn pdf_to_text(bytes: &[u8]) -> Result<String, TranscriptError> {
    // pdf-extract panics on some malformed documents. The panic hook still
    // runs; in chat it writes to the log file instead of the terminal.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| TranscriptError::Unreadable("PDF parser aborted".to_string()))?
        .map_err(|e| TranscriptError::Unreadable(e.to_string()))?;

    if extracted.trim().is_empty() {
        return Err(TranscriptError::NoText);
    }

    debug!(chars = extracted.len(), "Extracted transcript text");
    Ok(extracted)
}

/// Read a PDF from disk and extract its text
pub fn pdf_file_to_text(path: &Path) -> Result<String, TranscriptError> {
    let bytes = std::fs::read(path)
        .map_err(|e| TranscriptError::Unreadable(format!("{}: {}", path.display(), e)))?;
    pdf_to_text(&bytes)
}

/// Courses a student has reported as completed, in the order first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedCourses {
    courses: Vec<String>,
}

impl TrackedCourses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add identifiers not already tracked; returns how many were new
    pub fn merge<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.courses.len();
        for id in ids {
            let id = id.into();
            if !self.contains(&id) {
                self.courses.push(id);
            }
        }
        self.courses.len() - before
    }

    /// Replace the tracked set, e.g. after a transcript upload
    pub fn replace<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.courses.clear();
        self.merge(ids);
    }

    pub fn clear(&mut self) {
        self.courses.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.courses.iter().any(|c| c == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.courses.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_normalizes_and_dedups() {
        assert_eq!(
            extract_identifiers("I took Math 302 and CISC106 and math302 again"),
            vec!["MATH302", "CISC106"]
        );
    }

    #[test]
    fn test_extract_covers_every_department() {
        let text = "math241 cisc108 engl110 phys207 chem103 bisc207 geol107 univ401";
        assert_eq!(
            extract_identifiers(text),
            vec!["MATH241", "CISC108", "ENGL110", "PHYS207", "CHEM103", "BISC207", "GEOL107", "UNIV401"]
        );
    }

    #[test]
    fn test_extract_requires_exactly_three_digits() {
        assert!(extract_identifiers("MATH30 and MATH3021").is_empty());
        assert_eq!(extract_identifiers("MATH302-010 Lecture"), vec!["MATH302"]);
    }

    #[test]
    fn test_extract_counts_ascii_digits_only() {
        assert!(extract_identifiers("MATH 1\u{0662}").is_empty());
        assert!(extract_identifiers("MATH \u{0663}\u{0660}\u{0662}").is_empty());
        assert!(extract_identifiers("MATH302\u{0663}").is_empty());
        assert_eq!(extract_identifiers("MATH\u{00A0}302 done"), vec!["MATH302"]);
    }

    #[test]
    fn test_extract_ignores_unknown_departments() {
        assert!(extract_identifiers("HIST101 ECON151 STAT200").is_empty());
    }

    #[test]
    fn test_extract_handles_transcript_layout() {
        let transcript = "Term: Fall 2024\nMATH   241  Analytic Geometry  A  4.0\n\tCISC\t108 Intro CS B+ 3.0\n";
        assert_eq!(extract_identifiers(transcript), vec!["MATH241", "CISC108"]);
    }

    #[test]
    fn test_extract_from_empty_text() {
        assert!(extract_identifiers("").is_empty());
        assert!(extract_identifiers("nothing to see here").is_empty());
    }

    #[test]
    fn test_garbage_pdf_is_unreadable() {
        let result = pdf_to_text(b"definitely not a pdf");
        assert!(matches!(result, Err(TranscriptError::Unreadable(_))));
    }

    #[test]
    fn test_missing_pdf_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = pdf_file_to_text(&dir.path().join("missing.pdf"));
        match result {
            Err(TranscriptError::Unreadable(msg)) => assert!(msg.contains("missing.pdf")),
            other => panic!("expected Unreadable, got {:?}", other),
        }
    }

    #[test]
    fn test_tracked_courses_merge_and_replace() {
        let mut tracked = TrackedCourses::new();
        assert_eq!(tracked.merge(["MATH241", "MATH242"]), 2);
        assert_eq!(tracked.merge(["MATH242", "CISC108"]), 1);
        assert_eq!(tracked.as_slice(), ["MATH241", "MATH242", "CISC108"]);

        tracked.replace(vec!["MATH302".to_string()]);
        assert_eq!(tracked.as_slice(), ["MATH302"]);
        assert!(tracked.contains("MATH302"));

        tracked.clear();
        assert!(tracked.is_empty());
    }
}
