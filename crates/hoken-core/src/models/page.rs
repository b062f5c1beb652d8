//! Line-grouped OCR input model.
//!
//! The upstream recognition step delivers a page as an ordered list of lines
//! in top-to-bottom reading order. Each line carries its recognized words
//! (with per-character confidences and positions) plus the concatenated line
//! text. The engine matches and extracts on the concatenated text; word-level
//! geometry is consulted only by the pre-cleanup pass.

use serde::{Deserialize, Serialize};

/// A recognized word inside a line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Word {
    /// Recognized text of the word.
    pub text: String,

    /// Per-character recognition confidences (0.0 - 1.0).
    #[serde(default)]
    pub confidences: Vec<f32>,

    /// Per-character x offsets within the word box.
    #[serde(default)]
    pub positions: Vec<f32>,

    /// Left edge of the word box on the page.
    #[serde(default)]
    pub origin_x: f32,
}

impl Word {
    /// Word with text only, no geometry. Used when word-level detail is
    /// unavailable or irrelevant.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// One line of OCR output: its words and the concatenated text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Line {
    /// Recognized words in left-to-right order.
    #[serde(default)]
    pub words: Vec<Word>,

    /// Concatenated text of the whole line.
    pub text: String,
}

impl Line {
    /// Build a line from words, deriving the concatenated text.
    pub fn new(words: Vec<Word>) -> Self {
        let text = words.iter().map(|w| w.text.as_str()).collect();
        Self { words, text }
    }

    /// Line with text only, no word detail.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            words: Vec::new(),
            text: text.into(),
        }
    }

    /// Copy of this line with the text replaced, words untouched.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            words: self.words.clone(),
            text: text.into(),
        }
    }

    /// Per-character confidences flattened across words.
    pub fn char_confidences(&self) -> Vec<f32> {
        self.words
            .iter()
            .flat_map(|w| w.confidences.iter().copied())
            .collect()
    }
}

/// An immutable page snapshot: lines in reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Page built from plain line texts, no word detail.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self {
            lines: texts
                .iter()
                .map(|t| Line::from_text(t.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line texts in reading order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }

    /// All line texts joined into one string.
    pub fn full_text(&self) -> String {
        self.texts().collect()
    }
}
