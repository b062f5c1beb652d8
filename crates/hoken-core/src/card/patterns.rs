//! Regex patterns for insurance-card value extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Era;

/// Build one era-tagged date pattern. The year alternation bounds the era to
/// its valid range; separators tolerate up to three stray OCR characters
/// between year and month and one between month and day.
fn era_regex(label: &str, year: &str) -> Regex {
    let tail = r"\D{1,3}(?P<m>0[1-9]|1[0-2]|[1-9])\D(?P<d>0[1-9]|[12][0-9]|3[01]|99|[1-9])(?:\D|$)";
    Regex::new(&format!("{label}(?P<y>{year}){tail}")).unwrap()
}

lazy_static! {
    /// Era-tagged date patterns in extraction order. Era labels include the
    /// recurring OCR misreadings (合和 for 令和, bare 昭/平/成).
    pub static ref DATE_PATTERNS: Vec<(Era, Regex)> = vec![
        (Era::Reiwa, era_regex(r"(?:令和|合和|令)\D?", "0[1-9]|[1-9][0-9]|[1-9]")),
        (Era::Heisei, era_regex(r"(?:平成|平|成)", "0[1-9]|[1-4][0-9]|[1-9]")),
        (Era::Showa, era_regex(r"(?:昭和|昭)", "0[1-9]|[1-5][0-9]|6[0-4]|[1-9]")),
        (Era::Taisho, era_regex(r"(?:大正|大|正)", "0[1-9]|1[0-5]|[1-9]")),
        (Era::Meiji, era_regex(r"(?:明治|明|治)", "0[1-9]|[1-3][0-9]|4[0-5]|[1-9]")),
        (Era::Western, era_regex("", "19[0-9]{2}|2[0-9]{3}")),
    ];

    /// Last-day-of-month wordings, including OCR variants of 末日.
    pub static ref LAST_DAY_MARK: Regex = Regex::new(r"[末未][日目]").unwrap();

    /// Insurer numbers are 6 to 8 digits.
    pub static ref INSURER_NUM: Regex = Regex::new(r"[0-9]{6,8}").unwrap();

    pub static ref PURE_NUM: Regex = Regex::new(r"[0-9]+").unwrap();

    // Phone-number shapes that masquerade as identifiers.
    pub static ref PHONE_PAREN: Regex = Regex::new(r"[0-9]+\([0-9]+\)[0-9]+").unwrap();
    pub static ref PHONE_HYPHEN: Regex = Regex::new(r"[0-9]{2,3}-[0-9]{4}-[0-9]{4}").unwrap();
    pub static ref PHONE_LABEL: Regex = Regex::new(r"電話[0-9]").unwrap();

    /// Stray punctuation OCR injects into digit runs.
    pub static ref STRAY_MARKS: Regex = Regex::new(r"[ｌ\p{P}]+").unwrap();

    /// Garbled spellings of 交付.
    pub static ref KOFU_GARBLE: Regex = Regex::new(r"[交茭].?[付苻]").unwrap();

    /// Truncated から marker at line end.
    pub static ref FROM_TRAILING_KA: Regex = Regex::new(r"か.$").unwrap();

    pub static ref BRANCH_NUM_RUN: Regex = Regex::new(r"番号[0-9]+").unwrap();

    /// 番号 123 番 45 shapes for the branch fallback.
    pub static ref BRANCH_PAREN: Regex = Regex::new(r"番号[0-9]+\(?番\)?([0-9]+)").unwrap();

    /// Copayment percentage, e.g. 3割.
    pub static ref PERCENT: Regex = Regex::new(r"[0-9]割").unwrap();

    /// Category wordings on lines adjacent to a 適用区分 label.
    pub static ref CATEGORY_NEAR: Regex = Regex::new(r"区分\D{1,3}").unwrap();
    pub static ref ELDERLY_NEAR: Regex = Regex::new(r"現役\D{1,3}").unwrap();

    /// Yen amount; o is a common OCR read of 0.
    pub static ref AMOUNT_YEN: Regex = Regex::new(r"([0-9o\p{P}]+)円").unwrap();

    /// Care-type tagged amounts for multi-cap cards.
    pub static ref AMOUNT_TAGGED: Vec<(&'static str, Regex)> = vec![
        ("入院", Regex::new(r"[入人]院([0-9o\p{P}]+)円").unwrap()),
        ("入院外", Regex::new(r"[入人]院外([0-9o\p{P}]+)円").unwrap()),
        ("外来", Regex::new(r"外来([0-9o\p{P}]+)円").unwrap()),
        ("通院", Regex::new(r"通院([0-9o\p{P}]+)円").unwrap()),
        ("調剤", Regex::new(r"調剤([0-9o\p{P}]+)円").unwrap()),
    ];

    /// 記号/番号 pair shapes, tried in order. Two capture groups yield a
    /// (code, number) pair, one group a bare number.
    pub static ref CODE_PAIRS: Vec<Regex> = vec![
        Regex::new(r"^.号([^番号]+)番号[^0-9(]?([0-9(][0-9\p{P}]*)").unwrap(),
        Regex::new(r"記.?号([^枝番号]+)番号?[^0-9(]?([0-9(][0-9\p{P}]*)").unwrap(),
        Regex::new(r"記\D?([0-9\p{P}]+)\D*番号[^0-9(]?([0-9(][0-9\p{P}]*)").unwrap(),
        Regex::new(r"記\D?番号[^0-9(]?([0-9]+)[^0-9枝番]+([0-9]+)").unwrap(),
        Regex::new(r"記\D?番号[^0-9(]?([0-9]+)").unwrap(),
        Regex::new(r"被保険者番号\D*([0-9(][0-9\p{P}]*)").unwrap(),
        Regex::new(r"記\D?([a-zA-Z0-9]+)番号[^0-9(]?([0-9(][0-9\p{P}]*)").unwrap(),
        Regex::new(r"^([0-9-]+)番号[^0-9(]?([0-9(][0-9\p{P}]*)").unwrap(),
    ];

    /// Single-sided 記号 extraction.
    pub static ref CODE_SINGLE: Vec<Regex> = vec![
        Regex::new(r"記号([0-9a-zA-Z-]+)").unwrap(),
        Regex::new(r"記号(.{1,4})$").unwrap(),
    ];

    /// Single-sided 番号 extraction.
    pub static ref NUM_SINGLE: Regex = Regex::new(r"番号([0-9-]+)").unwrap();

    /// 記号 wordings for the public-aid code fallback.
    pub static ref AID_CODE: Vec<Regex> = vec![
        Regex::new(r"記号(.+)番号").unwrap(),
        Regex::new(r"記号([^番]+)$").unwrap(),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_pattern_eras() {
        let hit = |text: &str, era: Era| {
            DATE_PATTERNS
                .iter()
                .any(|(e, re)| *e == era && re.is_match(text))
        };
        assert!(hit("令和2年1月2日", Era::Reiwa));
        assert!(hit("合和2年1月2日", Era::Reiwa));
        assert!(hit("平成31年4月30日", Era::Heisei));
        assert!(hit("昭和64年1月7日", Era::Showa));
        assert!(hit("2021年12月1日", Era::Western));
    }

    #[test]
    fn test_date_pattern_year_bounds() {
        let showa = &DATE_PATTERNS[2].1;
        assert!(showa.is_match("昭和64年1月1日"));
        assert!(!showa.is_match("昭和65年1月1日"));
    }

    #[test]
    fn test_code_pair_shapes() {
        let caps = CODE_PAIRS[1].captures("記号1001番号4214102").unwrap();
        assert_eq!(&caps[1], "1001");
        assert_eq!(&caps[2], "4214102");
    }
}
