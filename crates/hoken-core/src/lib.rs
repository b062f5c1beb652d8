//! Core library for Japanese insurance card OCR field extraction.
//!
//! This crate turns noisy, line-grouped OCR text from insurance cards into
//! structured key/value fields:
//! - a typed pattern-table configuration with edit-distance-tolerant matching
//! - per-line relevance scoring with neighbor extension
//! - value extractors for era dates, identifiers and code pairs
//! - a multi-pass disambiguator for the four competing date roles
//! - per-category analyzers with ordered fallback corrections
//!
//! OCR itself, document classification and line grouping happen upstream;
//! the engine only reads the page snapshot it is given.

pub mod card;
pub mod error;
pub mod models;
pub mod rules;

pub use card::{Analyzer, AnalyzerKind, Field, FieldMap, MatchResult, RoleMatcher};
pub use error::{HokenError, Result};
pub use models::{CalendarDate, Era, Line, Page, Word, LAST_DAY};
pub use rules::{CompiledTable, PatternDef, PatternKind, PatternTable, Role};
