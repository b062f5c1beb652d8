//! Per-category analyzers.
//!
//! An analyzer bundles the finders for one document category, runs them over
//! the (preprocessed) page, merges their fragments into one field map and
//! then applies the category's fallback corrections in a fixed order. A
//! correction fires only while its target field is unresolved, so a finder's
//! result is never overwritten -- with one exception on public-aid cards,
//! where multiple tagged validity periods replace the single-date reading.

use tracing::debug;

use crate::error::Result;
use crate::models::{CalendarDate, Page};
use crate::rules::{builtin, CompiledTable, PatternTable, Role};

use super::extract::{extract_aid_code, extract_dates, extract_insurer_number, extract_number};
use super::finders::{
    CodeNumberFinder, DatesFinder, DeductibleFinder, ExtractKind, FinderKind, PercentageFinder,
    SimpleFinder, WideFinder,
};
use super::patterns::BRANCH_PAREN;
use super::preprocess::preprocess;
use super::{Field, FieldMap};

/// Document categories with dedicated analyzers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// 主保険 (main insurance card).
    MainCard,
    /// 公費 (public aid certificate).
    PublicAid,
}

const MAIN_FIELDS: &[Field] = &[
    Field::InsurerNumber,
    Field::Code,
    Field::CodeNumber,
    Field::Branch,
    Field::Birthday,
    Field::ValidFrom,
    Field::ValidUntil,
    Field::IssueDate,
    Field::QualificationDate,
    Field::PercentageCategory,
];

const AID_FIELDS: &[Field] = &[
    Field::InsurerNumber,
    Field::RecipientNumber,
    Field::Code,
    Field::Birthday,
    Field::ValidFrom,
    Field::ValidUntil,
    Field::IssueDate,
    Field::DeductibleLimit,
    Field::PercentageCategory,
];

/// Care-type tags attached to multi-period validity dates.
const CARE_TAGS: &[&str] = &["入院", "入院外", "外来", "通院", "調剤", "無", "1割"];

/// A per-category bundle of finders plus fallback corrections.
#[derive(Debug, Clone)]
pub struct Analyzer {
    kind: AnalyzerKind,
    table: CompiledTable,
    finders: Vec<FinderKind>,
}

impl Analyzer {
    /// Analyzer for a category using the builtin pattern table.
    pub fn new(kind: AnalyzerKind) -> Result<Self> {
        Self::with_table(kind, builtin::insurance_card()?)
    }

    /// Analyzer for 主保険 cards.
    pub fn main_card() -> Result<Self> {
        Self::new(AnalyzerKind::MainCard)
    }

    /// Analyzer for 公費 certificates.
    pub fn public_aid() -> Result<Self> {
        Self::new(AnalyzerKind::PublicAid)
    }

    /// Analyzer with a custom pattern table. The table is validated and
    /// compiled here, once.
    pub fn with_table(kind: AnalyzerKind, table: PatternTable) -> Result<Self> {
        let table = table.compile()?;
        let insurer = FinderKind::Wide(WideFinder {
            field: Field::InsurerNumber,
            role: Role::InsurerNumber,
            extract: ExtractKind::InsurerNumber,
        });
        let finders = match kind {
            AnalyzerKind::MainCard => vec![
                insurer,
                FinderKind::CodeNumber(CodeNumberFinder),
                FinderKind::Dates(DatesFinder),
                FinderKind::Wide(WideFinder {
                    field: Field::Branch,
                    role: Role::Branch,
                    extract: ExtractKind::Digits,
                }),
                FinderKind::Percentage(PercentageFinder),
            ],
            AnalyzerKind::PublicAid => vec![
                insurer,
                FinderKind::Simple(SimpleFinder {
                    field: Field::RecipientNumber,
                    role: Role::RecipientNumber,
                    extract: ExtractKind::Digits,
                }),
                FinderKind::Dates(DatesFinder),
                FinderKind::Deductible(DeductibleFinder),
                FinderKind::Percentage(PercentageFinder),
            ],
        };
        Ok(Self {
            kind,
            table,
            finders,
        })
    }

    pub fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    /// Fields this analyzer resolves, in output order.
    pub fn fields(&self) -> &'static [Field] {
        match self.kind {
            AnalyzerKind::MainCard => MAIN_FIELDS,
            AnalyzerKind::PublicAid => AID_FIELDS,
        }
    }

    /// Extract every field from one page snapshot.
    ///
    /// All working state lives in the returned map; repeated calls over the
    /// same page are independent and yield identical results.
    pub fn analyze(&self, page: &Page) -> FieldMap {
        let page = match self.kind {
            AnalyzerKind::MainCard => preprocess(page),
            AnalyzerKind::PublicAid => page.clone(),
        };

        let mut info = FieldMap::default();
        for finder in &self.finders {
            info.merge(finder.run(&self.table, &page));
        }
        debug!(kind = ?self.kind, resolved = info.iter().count(), "finders done");

        match self.kind {
            AnalyzerKind::MainCard => {
                retry_insurer_on_trailing_lines(&page, &mut info);
                trim_insurer(&page, &mut info);
                retry_branch(&page, &mut info);
                split_code_number(&page, &mut info);
                find_qualification_date(&self.table, &page, &mut info);
                clean_code_number(&mut info);
            }
            AnalyzerKind::PublicAid => {
                split_insurer_recipient(&self.table, &page, &mut info);
                find_aid_code(&page, &mut info);
                multi_period_validity(&page, &mut info);
            }
        }
        info
    }
}

/// Insurer numbers often sit in the card footer; retry the last two lines,
/// then accept any bare 6 or 8 digit line.
fn retry_insurer_on_trailing_lines(page: &Page, info: &mut FieldMap) {
    if info.has(Field::InsurerNumber) {
        return;
    }
    let tail = page.lines.len().saturating_sub(2);
    for line in &page.lines[tail..] {
        if let Some(number) = extract_insurer_number(&line.text) {
            info.set(Field::InsurerNumber, number);
            return;
        }
    }
    for text in page.texts() {
        let count = text.chars().count();
        if (count == 8 || count == 6) && text.chars().all(|c| c.is_ascii_digit()) {
            info.set(Field::InsurerNumber, text);
            return;
        }
    }
}

/// National health insurance numbers are 6 digits, everything else 8; an
/// over-long read is truncated accordingly.
fn trim_insurer(page: &Page, info: &mut FieldMap) {
    let Some(number) = info.get(Field::InsurerNumber) else {
        return;
    };
    if number.chars().count() < 7 {
        return;
    }
    let keep = if page.full_text().contains("国民健康保険") {
        6
    } else {
        8
    };
    let trimmed: String = number.chars().take(keep).collect();
    info.set(Field::InsurerNumber, trimmed);
}

/// 番号 123 番 45 wordings the branch finder misses.
fn retry_branch(page: &Page, info: &mut FieldMap) {
    if info.has(Field::Branch) {
        return;
    }
    for text in page.texts() {
        if !text.contains("番号") {
            continue;
        }
        if let Some(caps) = BRANCH_PAREN.captures(text) {
            info.set(Field::Branch, &caps[1]);
            return;
        }
    }
}

/// 記号 and 番号 separated by an unrelated line in between.
fn split_code_number(page: &Page, info: &mut FieldMap) {
    if info.has(Field::Code) || info.has(Field::CodeNumber) {
        return;
    }
    for index in 0..page.lines.len().saturating_sub(2) {
        let text = &page.lines[index].text;
        let below = &page.lines[index + 2].text;
        if text.contains("記号") && below.contains("番号") {
            if let Some(pos) = text.find("記号") {
                info.set(Field::Code, &text[pos + "記号".len()..]);
            }
            info.set_opt(Field::CodeNumber, extract_number(below));
            return;
        }
    }
}

/// Qualification date from any line carrying its label.
fn find_qualification_date(table: &CompiledTable, page: &Page, info: &mut FieldMap) {
    if info.has(Field::QualificationDate) {
        return;
    }
    let matcher = table.matcher(Role::QualificationDate);
    for text in page.texts() {
        let result = matcher.matches(text);
        if !result.matched {
            continue;
        }
        if let Some(date) = extract_dates(&result.text).first() {
            info.set(Field::QualificationDate, date.canonical());
        }
    }
}

/// Strip stray punctuation from the code and number; an unbalanced opening
/// parenthesis cuts the value.
fn clean_code_number(info: &mut FieldMap) {
    for field in [Field::Code, Field::CodeNumber] {
        let Some(value) = info.get(field) else {
            continue;
        };
        let mut value = value
            .trim_matches('・')
            .trim_matches('-')
            .replace('.', "");
        if (value.contains('(') && !value.contains(')')) || value.contains("()") {
            if let Some(pos) = value.find('(') {
                value.truncate(pos);
            }
        }
        info.set(field, value);
    }
}

/// Insurer and recipient labels on one header line with both numbers run
/// together on the next: split 8 digits for the insurer, rest for the
/// recipient.
fn split_insurer_recipient(table: &CompiledTable, page: &Page, info: &mut FieldMap) {
    if info.has(Field::InsurerNumber) && info.has(Field::RecipientNumber) {
        return;
    }
    let insurer = table.matcher(Role::InsurerNumber);
    let recipient = table.matcher(Role::RecipientNumber);
    for index in 0..page.lines.len().min(5) {
        let text = &page.lines[index].text;
        if !insurer.matches(text).matched || !recipient.matches(text).matched {
            continue;
        }
        let Some(next) = page.lines.get(index + 1) else {
            continue;
        };
        let digits: Vec<char> = next.text.chars().collect();
        if digits.is_empty() || !digits.iter().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let split = digits.len().min(8);
        info.set(Field::InsurerNumber, digits[..split].iter().collect::<String>());
        info.set(
            Field::RecipientNumber,
            digits[split..].iter().collect::<String>(),
        );
    }
}

/// 記号 wording scan for public-aid certificates.
fn find_aid_code(page: &Page, info: &mut FieldMap) {
    if info.has(Field::Code) {
        return;
    }
    for text in page.texts() {
        if let Some(code) = extract_aid_code(text) {
            info.set(Field::Code, code);
        }
    }
}

/// Several care types with their own validity periods: pair the から lines
/// with the まで lines and attach the care-type tag found nearby. The tagged
/// list replaces the single-date reading for both validity fields.
fn multi_period_validity(page: &Page, info: &mut FieldMap) {
    let mut starts: Vec<(usize, CalendarDate)> = Vec::new();
    let mut ends: Vec<(usize, CalendarDate)> = Vec::new();

    for (index, text) in page.texts().enumerate() {
        let chars: Vec<char> = text.chars().collect();
        let has_from =
            text.contains("から") || (chars.len() > 2 && chars[chars.len() - 2] == 'か');
        let has_until = text.contains('迄') || text.contains("まで");
        if !has_from && !has_until {
            continue;
        }
        let dates = extract_dates(text);
        if has_from && has_until && dates.len() == 2 {
            starts.push((index, dates[0].clone()));
            ends.push((index, dates[1].clone()));
            continue;
        }
        if has_from && dates.len() == 1 {
            starts.push((index, dates[0].clone()));
        }
        if has_until && dates.len() == 1 {
            ends.push((index, dates[0].clone()));
        }
    }
    if starts.len() < 2 || ends.len() < 2 {
        return;
    }

    let line_count = page.lines.len();
    let mut tagged_from = String::new();
    let mut tagged_until = String::new();
    for ((from_line, from_date), (until_line, until_date)) in starts.iter().zip(ends.iter()) {
        let window_start = from_line.max(until_line).saturating_sub(2);
        let window_end = (*from_line.min(until_line) + 2).min(line_count - 1);
        for line in window_start..=window_end {
            let text = page.lines[line].text.replace('憮', "無");
            for tag in CARE_TAGS {
                if text.contains(tag) {
                    tagged_from.push_str(&format!("{tag} {};", from_date.canonical()));
                    tagged_until.push_str(&format!("{tag} {};", until_date.canonical()));
                }
            }
        }
    }
    if !tagged_from.is_empty() && !tagged_until.is_empty() {
        debug!("multiple tagged validity periods found");
        info.set(Field::ValidFrom, tagged_from);
        info.set(Field::ValidUntil, tagged_until);
    }
}
