//! Payment-cap (限度額) finder.

use crate::models::Page;
use crate::rules::{fuzzy, CompiledTable};

use super::super::patterns::{AMOUNT_TAGGED, AMOUNT_YEN};
use super::super::{Field, FieldMap};

/// Extracts the monthly payment cap: per-care-type amounts joined as
/// `tag amount;` when several exist, otherwise the labeled (or any) yen
/// amount on the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeductibleFinder;

impl DeductibleFinder {
    pub fn run(&self, _table: &CompiledTable, page: &Page) -> FieldMap {
        let mut map = FieldMap::default();

        let tagged = tagged_amounts(page);
        if !tagged.is_empty() {
            map.set(Field::DeductibleLimit, tagged);
            return map;
        }

        for text in page.texts() {
            if fuzzy::find_within(text, "負担上限", 2).is_some() {
                if let Some(amount) = amount_in(text) {
                    map.set(Field::DeductibleLimit, amount);
                    return map;
                }
            }
        }

        for text in page.texts() {
            if let Some(amount) = amount_in(text) {
                map.set(Field::DeductibleLimit, amount);
                return map;
            }
        }
        map
    }
}

/// One amount per care-type tag, first occurrence each.
fn tagged_amounts(page: &Page) -> String {
    let mut needed = vec![true; AMOUNT_TAGGED.len()];
    let mut out = String::new();
    for text in page.texts() {
        for (index, (tag, pattern)) in AMOUNT_TAGGED.iter().enumerate() {
            if !needed[index] {
                continue;
            }
            if let Some(caps) = pattern.captures(text) {
                out.push_str(&format!("{tag} {};", caps[1].replace('o', "0")));
                needed[index] = false;
            }
        }
    }
    out
}

/// Yen amount on one line, with the o-for-0 OCR repair. An amount whose
/// leading digit was read as 0 gets its dropped 1 restored.
fn amount_in(text: &str) -> Option<String> {
    let caps = AMOUNT_YEN.captures(text)?;
    let mut amount = caps[1].replace('o', "0");
    if amount.starts_with('0') && amount.chars().count() > 1 {
        amount.insert(0, '1');
    }
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::insurance_card_compiled;

    fn run(texts: &[&str]) -> FieldMap {
        let table = insurance_card_compiled().unwrap();
        DeductibleFinder.run(&table, &Page::from_texts(texts))
    }

    #[test]
    fn test_labeled_amount() {
        let map = run(&["負担上限額", "負担上限10,000円/月"]);
        assert_eq!(map.get(Field::DeductibleLimit), Some("10,000"));
    }

    #[test]
    fn test_tagged_amounts() {
        let map = run(&["限度額", "通院1,000円/月", "入院2,000円/月"]);
        assert_eq!(map.get(Field::DeductibleLimit), Some("通院 1,000;入院 2,000;"));
    }

    #[test]
    fn test_ocr_o_for_zero() {
        let map = run(&["負担上限5,ooo円"]);
        assert_eq!(map.get(Field::DeductibleLimit), Some("5,000"));
    }

    #[test]
    fn test_leading_zero_restored() {
        let map = run(&["負担上限0,000円"]);
        assert_eq!(map.get(Field::DeductibleLimit), Some("10,000"));
    }

    #[test]
    fn test_bare_amount_fallback() {
        let map = run(&["上限 8,000円"]);
        assert_eq!(map.get(Field::DeductibleLimit), Some("8,000"));
    }

    #[test]
    fn test_nothing() {
        assert!(run(&["金額の記載なし"]).is_empty());
    }
}
