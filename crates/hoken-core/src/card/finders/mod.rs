//! Finders compose a matcher and an extractor into a unit producing one or
//! more field values from a full page. Analyzers own a fixed set of them.

mod code_number;
mod dates;
mod deductible;
mod percentage;
mod simple;
mod wide;

pub use code_number::CodeNumberFinder;
pub use dates::{DatesFinder, DATE_ROLES};
pub use deductible::DeductibleFinder;
pub use percentage::PercentageFinder;
pub use simple::SimpleFinder;
pub use wide::WideFinder;

use crate::models::Page;
use crate::rules::CompiledTable;

use super::extract;
use super::FieldMap;

/// Closed set of finder kinds; dispatch is explicit, nothing is resolved by
/// name at extraction time.
#[derive(Debug, Clone, Copy)]
pub enum FinderKind {
    Simple(SimpleFinder),
    Wide(WideFinder),
    Dates(DatesFinder),
    CodeNumber(CodeNumberFinder),
    Percentage(PercentageFinder),
    Deductible(DeductibleFinder),
}

impl FinderKind {
    /// Produce this finder's field-map fragment for one page.
    pub fn run(&self, table: &CompiledTable, page: &Page) -> FieldMap {
        match self {
            FinderKind::Simple(finder) => finder.run(table, page),
            FinderKind::Wide(finder) => finder.run(table, page),
            FinderKind::Dates(finder) => finder.run(table, page),
            FinderKind::CodeNumber(finder) => finder.run(table, page),
            FinderKind::Percentage(finder) => finder.run(table, page),
            FinderKind::Deductible(finder) => finder.run(table, page),
        }
    }
}

/// Closed set of single-value extractors for simple/wide finders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    /// 6-8 digit insurer number with the punctuation-strip retry.
    InsurerNumber,
    /// First bare digit run.
    Digits,
}

impl ExtractKind {
    pub fn apply(&self, text: &str) -> Option<String> {
        match self {
            ExtractKind::InsurerNumber => extract::extract_insurer_number(text),
            ExtractKind::Digits => extract::extract_digits(text),
        }
    }
}
