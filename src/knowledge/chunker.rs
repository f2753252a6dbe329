use std::collections::VecDeque;

use crate::config::KnowledgeConfig;
use crate::error::RetrievalError;
use crate::knowledge::types::{Fragment, Passage};

/// Split boundaries, coarsest first. A piece still longer than the fragment
/// size is split again at the next level; the last resort is a hard cut.
#[derive(Debug, Clone, Copy)]
enum Separator {
    Literal(&'static str),
    Sentence,
}

const SEPARATORS: [Separator; 6] = [
    Separator::Literal("\n\n"),
    Separator::Literal("\n"),
    Separator::Sentence,
    Separator::Literal("; "),
    Separator::Literal(", "),
    Separator::Literal(" "),
];

impl Separator {
    /// Split keeping the separator attached to the left piece, so the pieces
    /// concatenate back to the input
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Literal(sep) => text.split_inclusive(*sep).collect(),
            Separator::Sentence => split_sentences(text),
        }
    }
}

/// Splits passages into bounded, overlapping fragments. Sizes are in characters.
pub struct Chunker {
    max_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self, RetrievalError> {
        if max_size == 0 || overlap >= max_size {
            return Err(RetrievalError::InvalidChunking { max_size, overlap });
        }
        Ok(Self { max_size, overlap })
    }

    pub fn from_config(config: &KnowledgeConfig) -> Result<Self, RetrievalError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Chunk every passage independently; fragments never span two passages
    pub fn chunk(&self, passages: &[Passage]) -> Vec<Fragment> {
        let mut fragments = Vec::new();

        for passage in passages {
            for (ordinal, text) in self.split_text_with_overlap(&passage.text).into_iter().enumerate() {
                fragments.push(Fragment {
                    passage_id: passage.id.clone(),
                    ordinal,
                    text,
                });
            }
        }

        fragments
    }

    /// Split text into fragments with overlap
    fn split_text_with_overlap(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.max_size {
            return vec![text.to_string()];
        }

        let mut units = Vec::new();
        self.atomize(text, 0, &mut units);
        self.merge_units(&units)
    }

    /// Break text into units no longer than the fragment size, preferring coarse boundaries
    fn atomize<'a>(&self, text: &'a str, level: usize, units: &mut Vec<&'a str>) {
        if char_len(text) <= self.max_size {
            units.push(text);
            return;
        }

        match SEPARATORS.get(level) {
            Some(separator) => {
                for piece in separator.split(text) {
                    self.atomize(piece, level + 1, units);
                }
            }
            None => units.extend(self.hard_split(text)),
        }
    }

    /// Cut text into windows of exactly `max_size` characters (the last may be shorter)
    fn hard_split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut count = 0;

        for (idx, _) in text.char_indices() {
            if count == self.max_size {
                pieces.push(&text[start..idx]);
                start = idx;
                count = 0;
            }
            count += 1;
        }
        if start < text.len() {
            pieces.push(&text[start..]);
        }

        pieces
    }

    /// Greedily pack units into fragments. When a fragment is emitted, its
    /// trailing units (at most `overlap` characters) seed the next one.
    fn merge_units(&self, units: &[&str]) -> Vec<String> {
        let mut fragments = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut window_len = 0;

        for unit in units {
            let unit_len = char_len(unit);

            if window_len + unit_len > self.max_size && !window.is_empty() {
                push_fragment(&mut fragments, &window);

                while window_len > self.overlap
                    || (window_len + unit_len > self.max_size && window_len > 0)
                {
                    match window.pop_front() {
                        Some((_, len)) => window_len -= len,
                        None => break,
                    }
                }
            }

            window.push_back((unit, unit_len));
            window_len += unit_len;
        }

        if !window.is_empty() {
            push_fragment(&mut fragments, &window);
        }

        fragments
    }
}

/// Chunk passages with explicit parameters, `0 <= overlap < max_size`
pub fn chunk(passages: &[Passage], max_size: usize, overlap: usize) -> Result<Vec<Fragment>, RetrievalError> {
    Ok(Chunker::new(max_size, overlap)?.chunk(passages))
}

fn push_fragment(fragments: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let text: String = window.iter().map(|(unit, _)| *unit).collect();
    let text = text.trim();
    if !text.is_empty() && fragments.last().map(String::as_str) != Some(text) {
        fragments.push(text.to_string());
    }
}

/// Split after sentence-ending punctuation followed by whitespace
fn split_sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_idx, next_ch)) = chars.peek() {
            if next_ch.is_whitespace() {
                let end = next_idx + next_ch.len_utf8();
                pieces.push(&text[start..end]);
                start = end;
                chars.next();
            }
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
