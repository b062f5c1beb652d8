//! Copayment percentage / applicable-category finder.
//!
//! 負担割合 and 適用区分 are reported as one output field. Roman-numeral
//! categories arrive as ASCII letter salad from OCR and are repaired to the
//! proper numeral characters.

use crate::models::Page;
use crate::rules::{fuzzy, CompiledTable};

use super::super::patterns::{CATEGORY_NEAR, ELDERLY_NEAR, PERCENT};
use super::super::{Field, FieldMap};

// Repair tables, longest confusions first.
const CATEGORY_FIX_3: &[(&str, &str)] = &[
    ("iii", "Ⅲ"),
    ("lll", "Ⅲ"),
    ("III", "Ⅲ"),
    ("II", "Ⅱ"),
    ("IV", "Ⅳ"),
    ("VI", "Ⅵ"),
    ("V", "Ⅴ"),
    ("I", "Ⅰ"),
    ("ァ", "ア"),
    ("ィ", "イ"),
    ("ゥ", "ウ"),
    ("ェ", "エ"),
    ("工", "エ"),
    ("ォ", "オ"),
];
const CATEGORY_FIX_2: &[(&str, &str)] = &[
    ("ii", "Ⅱ"),
    ("II", "Ⅱ"),
    ("iv", "Ⅳ"),
    ("1v", "Ⅳ"),
    ("lv", "Ⅳ"),
    ("vi", "Ⅵ"),
    ("v1", "Ⅵ"),
    ("vl", "Ⅵ"),
];
const CATEGORY_FIX_1: &[(&str, &str)] = &[("i", "Ⅰ"), ("1", "Ⅰ"), ("l", "Ⅰ"), ("v", "Ⅴ")];

/// Finder for the copayment percentage or applicable category.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageFinder;

impl PercentageFinder {
    pub fn run(&self, _table: &CompiledTable, page: &Page) -> FieldMap {
        let mut map = FieldMap::default();
        let texts: Vec<&str> = page.texts().collect();

        for (index, text) in texts.iter().enumerate() {
            // 一部負担金 label directly followed by a lone digit at line end
            if let Some((_, end)) = fuzzy::find_within(text, "一部負担金", 1) {
                let mut after = text[end..].chars();
                if let (Some(digit), None) = (after.next(), after.next()) {
                    if digit.is_ascii_digit() {
                        map.set(Field::PercentageCategory, format!("{digit}割"));
                        return map;
                    }
                }
            }

            if let Some(m) = PERCENT.find(text) {
                map.set(Field::PercentageCategory, m.as_str());
                return map;
            }

            // digit displaced onto a neighbor line
            if fuzzy::find_within(text, "一部負担金", 1).is_some() && text.ends_with('割') {
                if index > 0 && is_single_digit(texts[index - 1]) {
                    map.set(
                        Field::PercentageCategory,
                        format!("{}割", texts[index - 1]),
                    );
                    return map;
                }
                if index + 1 < texts.len() && is_single_digit(texts[index + 1]) {
                    map.set(
                        Field::PercentageCategory,
                        format!("{}割", texts[index + 1]),
                    );
                    return map;
                }
            }

            if let Some((_, end)) = fuzzy::find_within(text, "適用区分", 1) {
                if end < text.len() {
                    map.set(Field::PercentageCategory, repair_category(&text[end..]));
                    return map;
                }
                // label alone on its line: the category sits on a neighbor
                if index > 0 {
                    if let Some(category) = category_nearby(texts[index - 1]) {
                        map.set(Field::PercentageCategory, category);
                        return map;
                    }
                }
                if index + 1 < texts.len() {
                    if let Some(category) = category_nearby(texts[index + 1]) {
                        map.set(Field::PercentageCategory, category);
                        return map;
                    }
                }
            }
        }
        map
    }
}

fn is_single_digit(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}

fn category_nearby(text: &str) -> Option<String> {
    CATEGORY_NEAR
        .find(text)
        .or_else(|| ELDERLY_NEAR.find(text))
        .map(|m| repair_category(m.as_str()))
}

/// Repair OCR letter salad into Roman-numeral categories; a katakana
/// category collapses to its single kana.
fn repair_category(raw: &str) -> String {
    let mut category = raw.to_string();
    for table in [CATEGORY_FIX_3, CATEGORY_FIX_2, CATEGORY_FIX_1] {
        for (from, to) in table {
            if category.contains(from) {
                category = category.replace(from, to);
            }
        }
    }
    for kana in ['ア', 'イ', 'ウ', 'エ', 'オ'] {
        if category.contains(kana) {
            return kana.to_string();
        }
    }
    category
}
