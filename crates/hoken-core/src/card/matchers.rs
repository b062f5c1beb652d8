//! Role matchers: classify one line as relevant to a semantic role.
//!
//! Each matcher tries its role's pattern-table variants first-match-wins and
//! applies the role's location logic: which side of the label carries the
//! value, which wordings void the match. Matchers are pure functions of the
//! line text and the compiled table.

use super::extract::{extract_dates, extract_insurer_number};
use super::patterns::{FROM_TRAILING_KA, KOFU_GARBLE, PERCENT, PHONE_PAREN};
use crate::rules::{fuzzy, CompiledPattern, CompiledTable, Role};

/// Outcome of matching one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// Located sub-text on a hit; the input passed through otherwise.
    pub text: String,
}

impl MatchResult {
    fn hit(text: impl Into<String>) -> Self {
        Self {
            matched: true,
            text: text.into(),
        }
    }

    fn miss(text: impl Into<String>) -> Self {
        Self {
            matched: false,
            text: text.into(),
        }
    }
}

impl CompiledTable {
    /// Matcher for one role, borrowing this table's compiled variants.
    pub fn matcher(&self, role: Role) -> RoleMatcher<'_> {
        RoleMatcher {
            role,
            patterns: self.patterns(role),
        }
    }
}

/// Matcher for a single role.
#[derive(Debug, Clone, Copy)]
pub struct RoleMatcher<'a> {
    role: Role,
    patterns: &'a [CompiledPattern],
}

impl RoleMatcher<'_> {
    pub fn role(&self) -> Role {
        self.role
    }

    /// Classify a line of text.
    pub fn matches(&self, text: &str) -> MatchResult {
        match self.role {
            Role::Birthday => self.match_birthday(text),
            Role::InsurerNumber => self.match_insurer(text),
            Role::RecipientNumber => self.match_truncating(text),
            Role::ValidFrom => self.match_valid_from(text),
            Role::ValidUntil => self.match_valid_until(text),
            Role::IssueDate => self.match_issue(text),
            Role::QualificationDate => self.match_qualification(text),
            Role::Branch => self.match_branch(text),
        }
    }

    /// First matching variant in table order.
    fn find_first(&self, text: &str) -> Option<(usize, usize)> {
        self.patterns.iter().find_map(|p| p.find(text))
    }

    /// Birth-date label. The text passes through untouched; the date sits on
    /// the same line.
    fn match_birthday(&self, text: &str) -> MatchResult {
        for pattern in self.patterns {
            let hit = match pattern {
                // Fuzzy variants stay anchored at the label's first character
                // so that 有効年月日 and friends cannot drift into a match.
                CompiledPattern::Fuzzy { pattern, max_edits } => {
                    anchored_hit(text, pattern, *max_edits)
                }
                other => other.find(text).is_some(),
            };
            if hit {
                return MatchResult::hit(text);
            }
        }
        MatchResult::miss(text)
    }

    /// Insurer-number label. Keeps whichever side of the label actually
    /// yields a number.
    fn match_insurer(&self, text: &str) -> MatchResult {
        let cleaned = PHONE_PAREN.replace_all(text, "").into_owned();
        let span = self.patterns.iter().find_map(|p| {
            let (start, end) = p.find(&cleaned)?;
            // 被保険者番号 names the insured person, not the insurer
            if cleaned[start..end].starts_with('被')
                || cleaned[..start].chars().next_back() == Some('被')
            {
                return None;
            }
            // 公費負担 followed by 資 starts a qualification wording
            if cleaned[start..end].contains('担') && cleaned[end..].starts_with('資') {
                return None;
            }
            Some(start)
        });
        match span {
            Some(start) if extract_insurer_number(&cleaned[start..]).is_some() => {
                MatchResult::hit(&cleaned[start..])
            }
            Some(start) if extract_insurer_number(&cleaned[..start]).is_some() => {
                MatchResult::hit(&cleaned[..start])
            }
            Some(_) => MatchResult::hit(cleaned),
            None => MatchResult::miss(cleaned),
        }
    }

    /// Label hit truncates the text from the label onward.
    fn match_truncating(&self, text: &str) -> MatchResult {
        match self.find_first(text) {
            Some((start, _)) => MatchResult::hit(&text[start..]),
            None => MatchResult::miss(text),
        }
    }

    /// Validity-start label and the 自/から range markers.
    fn match_valid_from(&self, text: &str) -> MatchResult {
        // a 〜まで line holding a single date is an end date
        for keyword in ["まで", "迄"] {
            if text.contains(keyword) && extract_dates(text).len() == 1 {
                return MatchResult::miss(text);
            }
        }
        // 自〜 range marker, except 自己
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        for (i, &(byte, c)) in chars.iter().enumerate() {
            if c == '自' && chars.get(i + 1).map(|&(_, n)| n) != Some('己') {
                let cut = byte + '自'.len_utf8();
                return MatchResult::hit(&text[cut..]);
            }
        }
        if let Some(m) = FROM_TRAILING_KA.find(text) {
            return MatchResult::hit(&text[..m.start()]);
        }
        if let Some(i) = text.find("から") {
            return MatchResult::hit(&text[..i]);
        }
        if chars.len() > 2 && chars[chars.len() - 2].1 == 'か' {
            if let Some(i) = text.find('か') {
                return MatchResult::hit(&text[..i]);
            }
        }
        if let Some(stripped) = text.strip_suffix("日か") {
            return MatchResult::hit(stripped);
        }
        self.match_truncating(text)
    }

    /// Validity-end label and the 至/まで/迄 range markers. Lines carrying a
    /// copayment percentage never match the markers.
    fn match_valid_until(&self, text: &str) -> MatchResult {
        let text = repair_made_valid(text);
        if !PERCENT.is_match(&text) {
            if let Some(i) = text.find('至') {
                return MatchResult::hit(&text[i + '至'.len_utf8()..]);
            }
            if let Some(i) = text.find("まで") {
                if !text.contains("までは") {
                    return MatchResult::hit(&text[..i]);
                }
            }
            if let Some(i) = text.find("迄有効") {
                return MatchResult::hit(&text[..i]);
            }
        }
        match self.find_first(&text) {
            Some((start, _)) => MatchResult::hit(&text[start..]),
            None => MatchResult::miss(text),
        }
    }

    /// Issue-date label. The date can sit on either side of 交付.
    fn match_issue(&self, text: &str) -> MatchResult {
        let text = KOFU_GARBLE.replace_all(text, "交付").into_owned();
        let Some((start, _)) = self.find_first(&text) else {
            return MatchResult::miss(text);
        };
        if !extract_dates(&text[start..]).is_empty() {
            MatchResult::hit(&text[start..])
        } else if !extract_dates(&text[..start]).is_empty() {
            MatchResult::hit(&text[..start])
        } else {
            MatchResult::hit(text)
        }
    }

    /// Qualification-date label.
    fn match_qualification(&self, text: &str) -> MatchResult {
        if let Some(i) = text.find("認定日") {
            return MatchResult::hit(&text[i + '認'.len_utf8()..]);
        }
        self.match_truncating(text)
    }

    /// Branch-number label; 番号+digits runs are stripped from the located
    /// text so only the branch digits remain.
    fn match_branch(&self, text: &str) -> MatchResult {
        use super::patterns::BRANCH_NUM_RUN;
        let (matched, located) = match self.find_first(text) {
            Some((start, _)) => (true, &text[start..]),
            None => (false, text),
        };
        let stripped = BRANCH_NUM_RUN.replace_all(located, "").into_owned();
        MatchResult {
            matched,
            text: stripped,
        }
    }
}

/// Fuzzy label hit anchored at the label's first character: the tail may
/// drift within the edit budget, the anchor may not.
fn anchored_hit(text: &str, pattern: &str, max_edits: u32) -> bool {
    let Some(anchor) = pattern.chars().next() else {
        return false;
    };
    text.char_indices()
        .filter(|&(_, c)| c == anchor)
        .any(|(i, _)| fuzzy::starts_within(&text[i..], pattern, max_edits))
}

/// Rewrite a garbled 有効 right after 迄 back to 迄有効.
fn repair_made_valid(text: &str) -> String {
    let Some(i) = text.find('迄') else {
        return text.to_string();
    };
    let after = &text[i + '迄'.len_utf8()..];
    let window: String = after.chars().take(2).collect();
    if window.is_empty() || fuzzy::distance(&window, "有効") > 1 {
        return text.to_string();
    }
    format!("{}迄有効{}", &text[..i], &after[window.len()..])
}
