//! Value extractors: text in, typed candidates out.
//!
//! Extractors are pure functions. They return nothing rather than failing;
//! "no value" is a normal outcome on noisy lines.

use crate::models::CalendarDate;

use super::patterns::{
    AID_CODE, CODE_PAIRS, CODE_SINGLE, DATE_PATTERNS, INSURER_NUM, LAST_DAY_MARK, NUM_SINGLE,
    PHONE_HYPHEN, PHONE_LABEL, PURE_NUM, STRAY_MARKS,
};

/// Normalize date-bearing text: the first-year marker 元年 becomes 1年 and
/// last-day wordings become the day-99 sentinel.
pub fn normalize_date_text(text: &str) -> String {
    let text = text.replace("元年", "1年");
    LAST_DAY_MARK.replace_all(&text, "99日").into_owned()
}

/// Extract every date in `text`, era-major: all hits of one era system
/// before the next. A line may hold zero, one or several dates.
pub fn extract_dates(text: &str) -> Vec<CalendarDate> {
    let text = normalize_date_text(text);
    let mut dates = Vec::new();
    for (era, pattern) in DATE_PATTERNS.iter() {
        for caps in pattern.captures_iter(&text) {
            let parsed = (
                caps["y"].parse::<u32>(),
                caps["m"].parse::<u32>(),
                caps["d"].parse::<u32>(),
            );
            if let (Ok(y), Ok(m), Ok(d)) = parsed {
                if let Some(date) = CalendarDate::new(*era, y, m, d) {
                    dates.push(date);
                }
            }
        }
    }
    dates
}

/// Extract a 6-8 digit insurer number.
///
/// Regex first; when that fails on a line that is not a phone number, stray
/// punctuation is stripped and the regex retried once.
pub fn extract_insurer_number(text: &str) -> Option<String> {
    if text.chars().count() < 3 {
        return None;
    }
    let mut text = text;
    // recipient labels to the right belong to a different field
    for keyword in ["受給", "資格者"] {
        if let Some(i) = text.find(keyword) {
            text = &text[..i];
        }
    }
    if let Some(m) = INSURER_NUM.find(text) {
        return Some(m.as_str().to_string());
    }
    if PHONE_LABEL.is_match(text) || PHONE_HYPHEN.is_match(text) {
        return None;
    }
    let cleaned = STRAY_MARKS.replace_all(text, "");
    INSURER_NUM.find(&cleaned).map(|m| m.as_str().to_string())
}

/// A 記号/番号 extraction outcome. The code half may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePair {
    pub code: Option<String>,
    pub number: String,
}

/// Extract a 記号/番号 pair (or a bare 番号) from one line.
pub fn extract_code_pair(text: &str) -> Option<CodePair> {
    for re in CODE_PAIRS.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let Some(first) = caps.get(1).filter(|g| !g.as_str().is_empty()) else {
            continue;
        };
        return Some(match caps.get(2) {
            Some(second) => CodePair {
                code: Some(first.as_str().to_string()),
                number: second.as_str().to_string(),
            },
            None => CodePair {
                code: None,
                number: first.as_str().to_string(),
            },
        });
    }
    None
}

/// Extract a bare 記号.
pub fn extract_code(text: &str) -> Option<String> {
    CODE_SINGLE
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

/// Extract a bare 番号.
pub fn extract_number(text: &str) -> Option<String> {
    NUM_SINGLE.captures(text).map(|caps| caps[1].to_string())
}

/// Extract the 記号 wording used on public-aid cards.
pub fn extract_aid_code(text: &str) -> Option<String> {
    AID_CODE
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .filter(|g| !g.as_str().is_empty())
        .map(|g| g.as_str().to_string())
}

/// First bare digit run.
pub fn extract_digits(text: &str) -> Option<String> {
    PURE_NUM.find(text).map(|m| m.as_str().to_string())
}
