//! Pre-cleanup of recognized text before extraction.
//!
//! Fixes recurring recognition defects on 主保険 cards: width-variant and
//! confusable characters, a duplicated digit in the insurer number, hyphens
//! and branch markers dropped by the recognizer. Word-level confidences and
//! geometry drive the last three; a page without word detail passes through
//! the text fixes only. The input page is never mutated.

use crate::models::{Line, Page, Word};
use crate::rules::fuzzy;

/// ASCII replacements for characters OCR confuses with digits.
const DIGIT_FIX: &[(char, &str)] = &[
    ('ｌ', "1"),
    ('ｉ', ""),
    ('Ⅰ', ""),
    ('ｔ', "1"),
    ('」', "1"),
    ('「', "1"),
    ('丁', "1"),
    ('亅', "1"),
    ('｝', "1"),
    ('｛', "1"),
    ('ｏ', "0"),
    ('ｓ', "5"),
    ('ｇ', "9"),
];

/// Produce a cleaned copy of the page.
pub fn preprocess(page: &Page) -> Page {
    let mut lines: Vec<Line> = page.lines.clone();
    for line in &mut lines {
        let mut text = to_half_width(&line.text);
        text = text.replace("令和年", "令和元年");
        text = fix_confusable_digits(&text);
        *line = line.with_text(text);
    }
    fix_doubled_one(&mut lines);
    insert_missing_hyphen(&mut lines);
    mark_branch_digits(&mut lines);
    Page::new(lines)
}

/// Full-width digits and Latin letters to their ASCII forms.
fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            'Ａ'..='Ｚ' => char::from(b'A' + (c as u32 - 'Ａ' as u32) as u8),
            'ａ'..='ｚ' => char::from(b'a' + (c as u32 - 'ａ' as u32) as u8),
            other => other,
        })
        .collect()
}

/// Repair confusable digit characters, but only on lines that plausibly
/// carry numbers: date labels, 番号/記号 lines, and bare percentage lines.
fn fix_confusable_digits(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let numeric_context = fuzzy::find_within(text, "年月日", 1).is_some()
        || text.contains("番号")
        || text.contains("記号")
        || (chars.len() == 2 && chars[1] == '割');
    if !numeric_context {
        return text.to_string();
    }
    let mut fixed = text.to_string();
    for (from, to) in DIGIT_FIX {
        fixed = fixed.replace(*from, to);
    }
    fixed
}

/// The recognizer sometimes doubles a 1 inside the insurer number. A low
/// confidence on one of the pair next to a high confidence on the other
/// marks the duplicate.
fn fix_doubled_one(lines: &mut [Line]) {
    for line in lines {
        if !line.text.contains("保険者番号") || !line.text.contains("11") {
            continue;
        }
        let Some(byte_pos) = line.text.find("11") else {
            continue;
        };
        let pos = line.text[..byte_pos].chars().count();
        let confidences = line.char_confidences();
        if pos + 1 >= confidences.len() {
            continue;
        }
        let (a, b) = (confidences[pos], confidences[pos + 1]);
        if a.min(b) < 0.7 && a.max(b) > 0.9 {
            let text: String = line
                .text
                .chars()
                .enumerate()
                .filter(|&(i, _)| i != pos + 1)
                .map(|(_, c)| c)
                .collect();
            *line = line.with_text(text);
        }
    }
}

/// A wide gap between two digit words in a 記号 line is a dropped hyphen.
fn insert_missing_hyphen(lines: &mut [Line]) {
    for line in lines {
        if !line.text.contains("記号") {
            continue;
        }
        for index in 0..line.words.len().saturating_sub(1) {
            let left = &line.words[index];
            let right = &line.words[index + 1];
            if !is_digit_word(left) || !is_digit_word(right) {
                continue;
            }
            let (Some(gap_left), Some(gap_right)) = (mean_gap(left), mean_gap(right)) else {
                continue;
            };
            let left_edge = left.origin_x + left.positions[left.positions.len() - 1];
            let right_edge = right.origin_x + right.positions[0];
            if right_edge - left_edge > (gap_left + gap_right) / 2.0 * 3.0 {
                let cut: usize = line.words[..=index]
                    .iter()
                    .map(|w| w.text.chars().count())
                    .sum();
                if let Some(text) = insert_at_char(&line.text, cut, "-") {
                    *line = line.with_text(text);
                }
                break;
            }
        }
    }
}

/// A trailing two-digit run far from the rest of a 番号 line is the branch
/// number; mark it so the branch matcher can pick it up.
fn mark_branch_digits(lines: &mut [Line]) {
    for line in lines {
        let chars: Vec<char> = line.text.chars().collect();
        let total = chars.len();
        if total < 3 {
            continue;
        }
        let head: String = chars[..total.saturating_sub(4)].iter().collect();
        if !head.contains("番号") {
            continue;
        }
        if !(chars[total - 1].is_ascii_digit() && chars[total - 2].is_ascii_digit()) {
            continue;
        }
        let Some(last_word) = line.words.last() else {
            continue;
        };

        let insert = if line.words.len() >= 2 && last_word.text.chars().count() == 2 {
            true
        } else if last_word.positions.len() >= 4 {
            let positions = &last_word.positions;
            let body = &positions[..positions.len() - 2];
            let body_gaps: Vec<f32> = body.windows(2).map(|w| w[1] - w[0]).collect();
            let body_mean = body_gaps.iter().sum::<f32>() / body_gaps.len() as f32;
            let space = positions[positions.len() - 2] - positions[positions.len() - 3];
            space > body_mean * 2.0
        } else {
            false
        };

        if insert {
            if let Some(text) = insert_at_char(&line.text, total - 2, "枝番") {
                *line = line.with_text(text);
            }
        }
    }
}

fn is_digit_word(word: &Word) -> bool {
    word.text.chars().count() > 1
        && !word.text.is_empty()
        && word.text.chars().all(|c| c.is_ascii_digit())
        && word.positions.len() >= 2
}

/// Mean spacing between adjacent character positions of a word.
fn mean_gap(word: &Word) -> Option<f32> {
    if word.positions.len() < 2 {
        return None;
    }
    let gaps: Vec<f32> = word.positions.windows(2).map(|w| w[1] - w[0]).collect();
    Some(gaps.iter().sum::<f32>() / gaps.len() as f32)
}

fn insert_at_char(text: &str, char_index: usize, insert: &str) -> Option<String> {
    let byte = if char_index == text.chars().count() {
        text.len()
    } else {
        text.char_indices().nth(char_index)?.0
    };
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..byte]);
    out.push_str(insert);
    out.push_str(&text[byte..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_first_year() {
        let page = preprocess(&Page::from_texts(&["令和年1月2日"]));
        assert_eq!(page.lines[0].text, "令和元年1月2日");
    }

    #[test]
    fn test_half_width_normalization() {
        let page = preprocess(&Page::from_texts(&["番号１２３ＡＢ"]));
        assert_eq!(page.lines[0].text, "番号123AB");
    }

    #[test]
    fn test_confusable_digits_in_number_line() {
        let page = preprocess(&Page::from_texts(&["番号ｌ２ｏ"]));
        assert_eq!(page.lines[0].text, "番号120");
    }

    #[test]
    fn test_confusable_digits_untouched_elsewhere() {
        let page = preprocess(&Page::from_texts(&["丁目ｌ"]));
        assert_eq!(page.lines[0].text, "丁目ｌ");
    }

    #[test]
    fn test_doubled_one_removed() {
        let mut word = Word::from_text("保険者番号112345678");
        word.confidences = vec![0.95; 19];
        word.confidences[5] = 0.95;
        word.confidences[6] = 0.5;
        let page = preprocess(&Page::new(vec![Line::new(vec![word])]));
        assert_eq!(page.lines[0].text, "保険者番号12345678");
    }

    #[test]
    fn test_doubled_one_kept_when_confident() {
        let mut word = Word::from_text("保険者番号11234567");
        word.confidences = vec![0.95; 18];
        let page = preprocess(&Page::new(vec![Line::new(vec![word])]));
        assert_eq!(page.lines[0].text, "保険者番号11234567");
    }

    #[test]
    fn test_hyphen_inserted_on_wide_gap() {
        let label = Word::from_text("記号");
        let mut left = Word {
            text: "12".into(),
            positions: vec![0.0, 10.0],
            origin_x: 100.0,
            ..Word::default()
        };
        left.confidences = vec![0.9, 0.9];
        let right = Word {
            text: "34".into(),
            positions: vec![0.0, 10.0],
            origin_x: 170.0,
            confidences: vec![0.9, 0.9],
        };
        let page = preprocess(&Page::new(vec![Line::new(vec![label, left, right])]));
        assert_eq!(page.lines[0].text, "記号12-34");
    }

    #[test]
    fn test_branch_marker_for_short_trailing_word() {
        let number = Word::from_text("番号12345");
        let branch = Word::from_text("01");
        let page = preprocess(&Page::new(vec![Line::new(vec![number, branch])]));
        assert_eq!(page.lines[0].text, "番号12345枝番01");
    }

    #[test]
    fn test_no_word_detail_passes_through() {
        let page = preprocess(&Page::from_texts(&["番号1234567 01"]));
        assert_eq!(page.lines[0].text, "番号1234567 01");
    }
}
