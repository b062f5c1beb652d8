//! 記号/番号 pair finder.

use crate::models::Page;
use crate::rules::CompiledTable;

use super::super::extract::{extract_code, extract_code_pair, extract_number};
use super::super::{Field, FieldMap};

/// Extracts the subscriber code and number: pairs within one line first,
/// then a code line followed directly by a number line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeNumberFinder;

impl CodeNumberFinder {
    pub fn run(&self, _table: &CompiledTable, page: &Page) -> FieldMap {
        let texts: Vec<String> = page.texts().map(normalize_dashes).collect();
        let mut map = FieldMap::default();

        for text in &texts {
            if let Some(pair) = extract_code_pair(text) {
                if let Some(code) = pair.code {
                    map.set(Field::Code, code);
                }
                map.set(Field::CodeNumber, pair.number);
            }
        }
        if map.has(Field::CodeNumber) {
            return map;
        }

        for window in texts.windows(2) {
            if let (Some(code), Some(number)) =
                (extract_code(&window[0]), extract_number(&window[1]))
            {
                map.set(Field::Code, code);
                map.set(Field::CodeNumber, number);
                return map;
            }
        }
        map
    }
}

/// OCR reads the long-vowel and kanji-one dashes for the hyphen inside
/// code values.
fn normalize_dashes(text: &str) -> String {
    text.replace('ー', "-").replace('一', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::insurance_card_compiled;

    fn run(texts: &[&str]) -> FieldMap {
        let table = insurance_card_compiled().unwrap();
        CodeNumberFinder.run(&table, &Page::from_texts(texts))
    }

    #[test]
    fn test_pair_on_one_line() {
        let map = run(&["記号123番号456"]);
        assert_eq!(map.get(Field::Code), Some("123"));
        assert_eq!(map.get(Field::CodeNumber), Some("456"));
    }

    #[test]
    fn test_number_only() {
        let map = run(&["被保険者番号987654"]);
        assert_eq!(map.get(Field::Code), None);
        assert_eq!(map.get(Field::CodeNumber), Some("987654"));
    }

    #[test]
    fn test_pair_split_across_lines() {
        let map = run(&["記号12-34", "番号5678"]);
        assert_eq!(map.get(Field::Code), Some("12-34"));
        assert_eq!(map.get(Field::CodeNumber), Some("5678"));
    }

    #[test]
    fn test_dash_normalization() {
        let map = run(&["記号12ー34", "番号5678"]);
        assert_eq!(map.get(Field::Code), Some("12-34"));
    }

    #[test]
    fn test_nothing_found() {
        assert!(run(&["無関係な行"]).is_empty());
    }
}
